//! Logging facilities for Typeahead.
//!
//! Typeahead uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("typeahead=debug,typeahead_core=info")
//!     .init();
//! ```
//!
//! State transitions are logged at `debug`; per-keystroke and per-emit
//! details at `trace`. Provider rejections and dropped stale results are
//! expected events and are never logged above `debug`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "typeahead_core::signal";
    /// Timer system target.
    pub const TIMER: &str = "typeahead_core::timer";
    /// Keystroke debouncing target.
    pub const SCHEDULER: &str = "typeahead::scheduler";
    /// Request issue, completion and supersession target.
    pub const FETCH: &str = "typeahead::fetch";
    /// Visibility, navigation and selection target.
    pub const CONTROLLER: &str = "typeahead::controller";
}
