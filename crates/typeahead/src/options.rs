//! Controller configuration.
//!
//! [`AutocompleteOptions`] is the resolved, validated configuration a
//! controller is built with. It is immutable once the controller is attached.
//!
//! Options may come from several places at once. Each source is expressed
//! as an [`OptionsLayer`] in which every field is optional; layers are merged
//! so that the first layer that sets a field wins and anything left unset
//! falls back to the defaults. A typical embedding passes per-element
//! overrides first and a shared configuration document second:
//!
//! ```
//! use typeahead::{AutocompleteOptions, OptionsLayer};
//!
//! let shared = OptionsLayer::from_json(r#"{ "delay": 250, "highlightFirst": true }"#).unwrap();
//! let element = OptionsLayer {
//!     delay: Some(50),
//!     ..OptionsLayer::default()
//! };
//!
//! let options = AutocompleteOptions::from_layers([element, shared]).unwrap();
//! assert_eq!(options.delay_ms, 50);
//! assert!(options.highlight_first);
//! assert_eq!(options.min_length, 1);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Template reference used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "typeahead/template/default";

/// Upper bound on the debounce delay.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Resolved controller options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteOptions {
    /// Opaque template reference handed to the renderer.
    #[serde(rename = "templateUrl")]
    pub template: String,
    /// Highlight the first suggestion as soon as results arrive.
    pub highlight_first: bool,
    /// Compute and accept inline shadow completions.
    #[serde(rename = "shadowInput")]
    pub shadow_input: bool,
    /// Selector of the element the popup is placed in. `None` means the
    /// input's own parent.
    #[serde(rename = "parentElm")]
    pub parent_anchor: Option<String>,
    /// Debounce delay in milliseconds.
    #[serde(rename = "delay")]
    pub delay_ms: u64,
    /// Minimum number of characters before searching.
    pub min_length: usize,
    /// Identifier attached to every emitted event.
    #[serde(rename = "uniqueId")]
    pub instance_id: Option<String>,
    /// Ask the renderer to emphasize query matches.
    pub bold_matches: bool,
}

impl Default for AutocompleteOptions {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            highlight_first: false,
            shadow_input: false,
            parent_anchor: None,
            delay_ms: 100,
            min_length: 1,
            instance_id: None,
            bold_matches: true,
        }
    }
}

impl AutocompleteOptions {
    /// Resolve options from layers in priority order and validate them.
    pub fn from_layers(layers: impl IntoIterator<Item = OptionsLayer>) -> Result<Self> {
        let merged = layers
            .into_iter()
            .fold(OptionsLayer::default(), OptionsLayer::or);
        let options = merged.resolve();
        options.validate()?;
        Ok(options)
    }

    /// Check that every option is usable.
    pub fn validate(&self) -> Result<()> {
        if self.delay_ms > MAX_DELAY_MS {
            return Err(ConfigError::invalid_option(
                "delay",
                format!("{} ms exceeds the maximum of {MAX_DELAY_MS} ms", self.delay_ms),
            ));
        }
        if self.template.trim().is_empty() {
            return Err(ConfigError::invalid_option(
                "templateUrl",
                "template reference must not be empty",
            ));
        }
        if let Some(anchor) = &self.parent_anchor {
            if anchor.trim().is_empty() {
                return Err(ConfigError::invalid_option(
                    "parentElm",
                    "anchor selector must not be empty",
                ));
            }
        }
        Ok(())
    }

    /// The debounce delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Set the debounce delay using builder pattern.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the minimum query length using builder pattern.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Enable or disable automatic first-item highlighting.
    pub fn with_highlight_first(mut self, enabled: bool) -> Self {
        self.highlight_first = enabled;
        self
    }

    /// Enable or disable shadow completion.
    pub fn with_shadow_input(mut self, enabled: bool) -> Self {
        self.shadow_input = enabled;
        self
    }

    /// Set the instance identifier carried by events.
    pub fn with_instance_id(mut self, id: impl Into<String>) -> Self {
        self.instance_id = Some(id.into());
        self
    }

    /// Set the popup anchor selector.
    pub fn with_parent_anchor(mut self, selector: impl Into<String>) -> Self {
        self.parent_anchor = Some(selector.into());
        self
    }

    /// Set the template reference.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}

/// One source of options, with every field optional.
///
/// Keys use the camelCase names of the configuration surface
/// (`highlightFirst`, `minLength`, ...). Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsLayer {
    #[serde(alias = "templateRef")]
    pub template_url: Option<String>,
    pub highlight_first: Option<bool>,
    pub shadow_input: Option<bool>,
    pub parent_elm: Option<String>,
    pub delay: Option<u64>,
    pub min_length: Option<usize>,
    pub unique_id: Option<String>,
    pub bold_matches: Option<bool>,
}

impl OptionsLayer {
    /// Parse a layer from a JSON object.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|err| ConfigError::Parse {
            format: "JSON",
            message: err.to_string(),
        })
    }

    /// Parse a layer from a TOML table.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|err| ConfigError::Parse {
            format: "TOML",
            message: err.to_string(),
        })
    }

    /// Fill every unset field of `self` from `lower`.
    pub fn or(self, lower: OptionsLayer) -> OptionsLayer {
        OptionsLayer {
            template_url: self.template_url.or(lower.template_url),
            highlight_first: self.highlight_first.or(lower.highlight_first),
            shadow_input: self.shadow_input.or(lower.shadow_input),
            parent_elm: self.parent_elm.or(lower.parent_elm),
            delay: self.delay.or(lower.delay),
            min_length: self.min_length.or(lower.min_length),
            unique_id: self.unique_id.or(lower.unique_id),
            bold_matches: self.bold_matches.or(lower.bold_matches),
        }
    }

    /// Apply defaults to every unset field.
    pub fn resolve(self) -> AutocompleteOptions {
        let defaults = AutocompleteOptions::default();
        AutocompleteOptions {
            template: self.template_url.unwrap_or(defaults.template),
            highlight_first: self.highlight_first.unwrap_or(defaults.highlight_first),
            shadow_input: self.shadow_input.unwrap_or(defaults.shadow_input),
            parent_anchor: self.parent_elm.or(defaults.parent_anchor),
            delay_ms: self.delay.unwrap_or(defaults.delay_ms),
            min_length: self.min_length.unwrap_or(defaults.min_length),
            instance_id: self.unique_id.or(defaults.instance_id),
            bold_matches: self.bold_matches.unwrap_or(defaults.bold_matches),
        }
    }
}
