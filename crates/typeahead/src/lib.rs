//! Typeahead: an autocomplete interaction controller for text inputs.
//!
//! The controller sits between a text input, a search provider and a
//! renderer. It turns keystrokes into debounced queries, makes sure only the
//! newest answer is ever shown, and drives keyboard and pointer navigation,
//! inline "shadow" completion and popup visibility.
//!
//! # Getting Started
//!
//! ```
//! use std::sync::Arc;
//! use typeahead::{
//!     AutocompleteController, AutocompleteEvent, AutocompleteOptions, Key, ResultSink,
//!     SearchResponse,
//! };
//! use typeahead_core::{ManualClock, Signal};
//!
//! let events = Arc::new(Signal::<AutocompleteEvent>::new());
//! events.connect(|event| println!("{}", event.name()));
//!
//! let clock = Arc::new(ManualClock::new());
//! let options = AutocompleteOptions::default()
//!     .with_instance_id("city")
//!     .with_shadow_input(true);
//!
//! let mut controller = AutocompleteController::builder(options)
//!     .search_provider(|query: &str, sink: ResultSink| {
//!         sink.resolve(SearchResponse::from_values([format!("{query}on bridge")]));
//!     })
//!     .notifier(events.clone())
//!     .clock(clock.clone())
//!     .attach()
//!     .unwrap();
//!
//! controller.handle_key(Key::Other(68), "lond");
//! clock.advance_ms(100);
//! controller.tick();
//! assert_eq!(controller.state().shadow_value, "london bridge");
//!
//! // Right arrow completes the current word from the shadow.
//! controller.handle_key(Key::ArrowRight, "lond");
//! assert_eq!(controller.query(), "london");
//! ```
//!
//! # Driving the Controller
//!
//! Everything happens on the thread that owns the controller. Input events
//! are applied as they are reported. Timers and provider answers are applied
//! by [`AutocompleteController::tick`]; call it when
//! [`next_deadline`](AutocompleteController::next_deadline) elapses or when
//! the builder's wakeup callback fires.
//!
//! # Feature Flags
//!
//! - `tokio`: [`TokioSearchProvider`], which runs async searches as tokio
//!   tasks and aborts them when they are superseded.

#[cfg(feature = "tokio")]
mod async_provider;
mod controller;
mod error;
mod events;
mod fetch;
mod keys;
mod navigation;
mod options;
mod render;
mod scheduler;
mod shadow;
mod state;
mod suggestion;

#[cfg(feature = "tokio")]
pub use async_provider::TokioSearchProvider;
pub use controller::{AutocompleteBuilder, AutocompleteController, BLUR_GRACE, HideReason};
pub use error::{ConfigError, RenderError, Result};
pub use events::{AutocompleteEvent, Notifier};
pub use fetch::{
    FetchCoordinator, FetchOutcome, FetchResult, RequestToken, ResultSink, SearchProvider, Wakeup,
};
pub use keys::{IGNORED_KEY_CODES, Key, KeyClass, NAVIGATION_KEY_CODES};
pub use navigation::{Direction, is_valid_highlight, next_index};
pub use options::{AutocompleteOptions, DEFAULT_TEMPLATE, MAX_DELAY_MS, OptionsLayer};
pub use render::{AttachContext, NullRenderer, Renderer};
pub use scheduler::{DebounceScheduler, Keystroke};
pub use shadow::{ShadowEdit, accept as accept_shadow, shadow_value};
pub use state::{ControllerState, Phase};
pub use suggestion::{SearchResponse, Suggestion, match_range, starts_with_ignore_case};
