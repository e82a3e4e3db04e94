//! Suggestions and provider responses.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single suggestion.
///
/// Only `value` is interpreted by the controller. Any other fields the
/// provider attaches are carried through untouched for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The text written into the input when this suggestion is chosen.
    pub value: String,
    /// Opaque provider fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Suggestion {
    /// Create a suggestion with no extra fields.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            extra: Map::new(),
        }
    }

    /// Attach an extra field using builder pattern.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl From<&str> for Suggestion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Suggestion {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// What a search provider resolves its sink with.
///
/// `results` may be absent; an absent list and an empty list both mean
/// "nothing to show". Every other top-level field is exposed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Suggestion>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResponse {
    /// A response carrying the given suggestions.
    pub fn new(results: impl IntoIterator<Item = Suggestion>) -> Self {
        Self {
            results: Some(results.into_iter().collect()),
            extra: Map::new(),
        }
    }

    /// A response built from plain values.
    pub fn from_values<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(|value| Suggestion::new(value)))
    }

    /// A response with no `results` field at all.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Parse a response from JSON.
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    /// Attach an extra top-level field using builder pattern.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether there is at least one suggestion to show.
    pub fn has_results(&self) -> bool {
        self.results.as_ref().is_some_and(|results| !results.is_empty())
    }
}

/// If `text` starts with `prefix` (ignoring case), return the byte length of
/// the matching part of `text`.
pub(crate) fn prefix_match_len(text: &str, prefix: &str) -> Option<usize> {
    let mut text_chars = text.char_indices();
    for p in prefix.chars() {
        let (_, t) = text_chars.next()?;
        if !t.to_lowercase().eq(p.to_lowercase()) {
            return None;
        }
    }
    Some(text_chars.next().map_or(text.len(), |(i, _)| i))
}

/// Whether `text` starts with `prefix`, ignoring case.
pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    prefix_match_len(text, prefix).is_some()
}

/// Byte range of the first case-insensitive occurrence of `query` in `value`.
///
/// Renderers use this to emphasize the matched part of a suggestion. An
/// empty query matches nothing.
///
/// ```
/// use typeahead::match_range;
///
/// assert_eq!(match_range("New York", "york"), Some(4..8));
/// assert_eq!(match_range("Paris", "rome"), None);
/// ```
pub fn match_range(value: &str, query: &str) -> Option<Range<usize>> {
    if query.is_empty() {
        return None;
    }
    value.char_indices().find_map(|(start, _)| {
        prefix_match_len(&value[start..], query).map(|len| start..start + len)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_json_keeps_extra_fields() {
        let response = SearchResponse::from_json(
            r#"{
                "results": [{ "value": "london", "country": "GB" }],
                "total": 42
            }"#,
        )
        .unwrap();

        let results = response.results.as_ref().unwrap();
        assert_eq!(results[0].value, "london");
        assert_eq!(results[0].extra["country"], "GB");
        assert_eq!(response.extra["total"], 42);
        assert!(response.has_results());
    }

    #[test]
    fn test_absent_and_empty_results() {
        assert!(!SearchResponse::absent().has_results());
        assert!(!SearchResponse::new([]).has_results());

        let response = SearchResponse::from_json(r#"{ "message": "nothing" }"#).unwrap();
        assert_eq!(response.results, None);
        assert!(!response.has_results());
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("London Bridge", "lond"));
        assert!(starts_with_ignore_case("london", "LONDON"));
        assert!(starts_with_ignore_case("anything", ""));
        assert!(!starts_with_ignore_case("lon", "london"));
        assert!(!starts_with_ignore_case("paris", "lond"));
    }

    #[test]
    fn test_match_range() {
        assert_eq!(match_range("London Bridge", "bri"), Some(7..10));
        assert_eq!(match_range("London", "LON"), Some(0..3));
        assert_eq!(match_range("Zürich", "ÜR"), Some(1..4));
        assert_eq!(match_range("London", ""), None);
        assert_eq!(match_range("Lo", "London"), None);
    }
}
