//! Error types for the autocomplete controller.
//!
//! Only construction can fail. Once a controller is attached, every entry
//! point absorbs its own failures (provider rejections collapse to a hidden
//! popup, stale results are dropped) and nothing is returned to the caller.

/// Result type alias for controller construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fatal configuration errors reported when attaching a controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No search provider was supplied.
    #[error("No search provider configured")]
    MissingSearchProvider,

    /// The popup anchor selector did not resolve to an element.
    #[error("Popup anchor '{selector}' does not match any element")]
    UnresolvedAnchor { selector: String },

    /// The renderer could not load its popup template.
    #[error("Failed to load template '{template}': {message}")]
    TemplateLoad { template: String, message: String },

    /// An options document could not be parsed.
    #[error("Failed to parse {format} options: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// An option has an unusable value.
    #[error("Invalid value for option '{option}': {message}")]
    InvalidOption {
        option: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Create an invalid option error.
    pub fn invalid_option(option: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            message: message.into(),
        }
    }
}

/// Errors a renderer may report from [`Renderer::attach`](crate::Renderer::attach).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The popup anchor selector did not resolve to an element.
    #[error("Popup anchor '{selector}' does not match any element")]
    UnresolvedAnchor { selector: String },

    /// The popup template could not be loaded.
    #[error("Failed to load template '{template}': {message}")]
    TemplateLoad { template: String, message: String },
}

impl From<RenderError> for ConfigError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::UnresolvedAnchor { selector } => Self::UnresolvedAnchor { selector },
            RenderError::TemplateLoad { template, message } => {
                Self::TemplateLoad { template, message }
            }
        }
    }
}
