//! Core systems for Typeahead.
//!
//! This crate provides the foundation the autocomplete controller is built on:
//!
//! - **Signal/Slot System**: Type-safe notifications to any number of listeners
//! - **Timers**: A polled one-shot timer queue with typed payloads
//! - **Clocks**: Injectable time sources, including a manual clock for tests
//! - **Cancellation**: Shared cooperative cancellation flags
//!
//! # Timer Example
//!
//! ```
//! use std::time::Duration;
//! use typeahead_core::{Clock, ManualClock, TimerManager};
//!
//! let clock = ManualClock::new();
//! let mut timers = TimerManager::new();
//! timers.start_one_shot(clock.now(), Duration::from_millis(100), "search");
//!
//! clock.advance_ms(100);
//! let fired = timers.process_expired(clock.now());
//! assert_eq!(fired.len(), 1);
//! assert_eq!(fired[0].1, "search");
//! ```

mod cancellation;
mod clock;
mod error;
pub mod logging;
pub mod signal;
mod timer;

pub use cancellation::CancellationToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result, SignalError, TimerError};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{TimerId, TimerManager};
