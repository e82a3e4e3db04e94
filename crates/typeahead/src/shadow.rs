//! Shadow (inline) completion.
//!
//! After a search, the top suggestion becomes the shadow value when it
//! starts with the submitted query. Accepting the shadow either finishes
//! the word being typed or, when that word is already complete, appends
//! the next word of the shadow phrase.

use crate::suggestion::starts_with_ignore_case;

/// What accepting the shadow did to the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShadowEdit {
    /// The last word was completed to the full shadow word.
    CompletedWord(String),
    /// The next shadow word was appended.
    ExtendedPhrase(String),
}

impl ShadowEdit {
    /// The query after the edit.
    pub fn query(&self) -> &str {
        match self {
            Self::CompletedWord(query) | Self::ExtendedPhrase(query) => query,
        }
    }

    /// Consume the edit, returning the new query.
    pub fn into_query(self) -> String {
        match self {
            Self::CompletedWord(query) | Self::ExtendedPhrase(query) => query,
        }
    }
}

/// The shadow value for `query` given the top suggestion's value.
///
/// Returns the suggestion when it starts with the query (ignoring case),
/// otherwise an empty string.
pub fn shadow_value(query: &str, top: &str) -> String {
    if starts_with_ignore_case(top, query) {
        top.to_owned()
    } else {
        String::new()
    }
}

/// Apply the shadow to the query.
///
/// Words are separated by single spaces on both sides, so the word positions
/// of the query and the shadow line up. Returns `None` when neither a word
/// completion nor a phrase extension applies.
pub fn accept(query: &str, shadow: &str) -> Option<ShadowEdit> {
    if shadow.is_empty() {
        return None;
    }

    let shadow_words: Vec<&str> = shadow.split(' ').collect();
    let mut query_words: Vec<&str> = query.split(' ').collect();
    let last = query_words.len() - 1;

    if let Some(shadow_word) = shadow_words.get(last) {
        if query_words[last].chars().count() < shadow_word.chars().count() {
            query_words[last] = *shadow_word;
            return Some(ShadowEdit::CompletedWord(query_words.join(" ")));
        }
    }

    match shadow_words.get(last + 1) {
        Some(next) if !next.is_empty() => {
            query_words.push(*next);
            Some(ShadowEdit::ExtendedPhrase(query_words.join(" ")))
        }
        _ => None,
    }
}
