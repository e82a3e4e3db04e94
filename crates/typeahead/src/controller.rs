//! The autocomplete controller.
//!
//! [`AutocompleteController`] is attached to one text input. It owns the
//! query text, the debounce timer, the in-flight request and the popup state,
//! and coordinates them:
//!
//! ```text
//!   keystroke ──► DebounceScheduler ──(quiet period)──► FetchCoordinator ──► SearchProvider
//!                                                              │
//!   tick() ◄──────────────── queued answer ◄───── ResultSink ◄─┘
//!     │
//!     └─► Hidden / Loading / Visible ──► Renderer, Notifier
//! ```
//!
//! The controller is driven entirely from the thread that owns it. Keys,
//! pointer gestures and focus changes are applied immediately. Timers and
//! provider answers are applied by [`tick`](AutocompleteController::tick),
//! which the host calls from its event loop (use
//! [`next_deadline`](AutocompleteController::next_deadline) and a
//! [`Wakeup`] to know when).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use typeahead::{AutocompleteController, AutocompleteOptions, Key, SearchResponse};
//! use typeahead_core::ManualClock;
//!
//! let clock = Arc::new(ManualClock::new());
//! let mut controller = AutocompleteController::builder(AutocompleteOptions::default())
//!     .search_provider(|query: &str, sink: typeahead::ResultSink| {
//!         let cities = ["london", "lyon", "paris"];
//!         let hits = cities.iter().copied().filter(|city| city.starts_with(query));
//!         sink.resolve(SearchResponse::from_values(hits));
//!     })
//!     .clock(clock.clone())
//!     .attach()
//!     .unwrap();
//!
//! controller.handle_key(Key::Other(76), "l");
//! clock.advance_ms(100);
//! controller.tick();
//!
//! assert!(controller.state().visible);
//! assert_eq!(controller.state().suggestions.len(), 2);
//!
//! controller.handle_key(Key::ArrowDown, "l");
//! assert_eq!(controller.query(), "london");
//! ```

use std::sync::Arc;
use std::time::Duration;

use typeahead_core::logging::targets;
use typeahead_core::{Clock, SystemClock, TimerId, TimerManager};

use crate::error::{ConfigError, Result};
use crate::events::{AutocompleteEvent, Notifier};
use crate::fetch::{FetchCoordinator, FetchOutcome, FetchResult, SearchProvider, Wakeup};
use crate::keys::{Key, KeyClass};
use crate::navigation::{Direction, is_valid_highlight, next_index};
use crate::options::AutocompleteOptions;
use crate::render::{AttachContext, NullRenderer, Renderer};
use crate::scheduler::{DebounceScheduler, Keystroke};
use crate::shadow;
use crate::state::{ControllerState, Phase};

/// How long after a blur the popup stays up, so a click on a suggestion
/// that caused the blur can still select it.
pub const BLUR_GRACE: Duration = Duration::from_millis(200);

/// Why the popup is being hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideReason {
    /// The query became shorter than the minimum length.
    TooShort,
    /// The input lost focus and the grace period elapsed.
    Blur,
    /// The user pressed Escape.
    Escape,
    /// A suggestion was selected.
    Selected,
    /// The provider answered with no suggestions.
    NoResults,
    /// The provider rejected the request.
    Rejected,
}

impl HideReason {
    /// Hides caused by a fetch answer leave a newer pending search alone;
    /// every other hide also drops the pending search.
    fn cancels_pending_search(self) -> bool {
        !matches!(self, Self::NoResults | Self::Rejected)
    }
}

/// Builds and attaches an [`AutocompleteController`].
pub struct AutocompleteBuilder {
    options: AutocompleteOptions,
    provider: Option<Box<dyn SearchProvider>>,
    renderer: Box<dyn Renderer>,
    notifier: Box<dyn Notifier>,
    on_select: Option<Box<dyn FnMut()>>,
    clock: Arc<dyn Clock>,
    wakeup: Option<Wakeup>,
}

impl AutocompleteBuilder {
    /// Start building with the given options.
    pub fn new(options: AutocompleteOptions) -> Self {
        Self {
            options,
            provider: None,
            renderer: Box::new(NullRenderer),
            notifier: Box::new(()),
            on_select: None,
            clock: Arc::new(SystemClock),
            wakeup: None,
        }
    }

    /// Set the search provider. Required.
    pub fn search_provider(mut self, provider: impl SearchProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Set the renderer. Defaults to [`NullRenderer`].
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Set the notification channel. Defaults to discarding events.
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Set a callback invoked after each selection, once the popup is hidden.
    pub fn on_select(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    /// Set the time source. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set a callback invoked (from any thread) when a provider answer is
    /// queued and [`AutocompleteController::tick`] should run.
    pub fn wakeup(mut self, wakeup: impl Fn() + Send + Sync + 'static) -> Self {
        self.wakeup = Some(Arc::new(wakeup));
        self
    }

    /// Validate the configuration, attach the renderer and emit `init`.
    pub fn attach(self) -> Result<AutocompleteController> {
        self.options.validate()?;
        let provider = self.provider.ok_or(ConfigError::MissingSearchProvider)?;

        let mut renderer = self.renderer;
        renderer.attach(&AttachContext {
            template: &self.options.template,
            anchor: self.options.parent_anchor.as_deref(),
            shadow_input: self.options.shadow_input,
            bold_matches: self.options.bold_matches,
        })?;

        let mut fetch = FetchCoordinator::new();
        fetch.set_wakeup(self.wakeup);

        let mut controller = AutocompleteController {
            scheduler: DebounceScheduler::new(self.options.delay(), self.options.min_length),
            options: self.options,
            provider,
            renderer,
            notifier: self.notifier,
            on_select: self.on_select,
            clock: self.clock,
            fetch,
            blur_timers: TimerManager::new(),
            blur_timer: None,
            state: ControllerState::default(),
            query: String::new(),
            attached: true,
        };

        tracing::debug!(target: targets::CONTROLLER, instance_id = ?controller.options.instance_id, "controller attached");
        controller.emit(AutocompleteEvent::Init {
            instance_id: controller.options.instance_id.clone(),
        });
        controller.render();
        Ok(controller)
    }
}

impl std::fmt::Debug for AutocompleteBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteBuilder")
            .field("options", &self.options)
            .field("has_provider", &self.provider.is_some())
            .field("has_on_select", &self.on_select.is_some())
            .finish()
    }
}

/// Autocomplete controller for a single text input.
pub struct AutocompleteController {
    options: AutocompleteOptions,
    provider: Box<dyn SearchProvider>,
    renderer: Box<dyn Renderer>,
    notifier: Box<dyn Notifier>,
    on_select: Option<Box<dyn FnMut()>>,
    clock: Arc<dyn Clock>,
    scheduler: DebounceScheduler,
    fetch: FetchCoordinator,
    blur_timers: TimerManager<()>,
    blur_timer: Option<TimerId>,
    state: ControllerState,
    query: String,
    attached: bool,
}

impl AutocompleteController {
    /// Start building a controller.
    pub fn builder(options: AutocompleteOptions) -> AutocompleteBuilder {
        AutocompleteBuilder::new(options)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The current popup state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// The current query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// The resolved options.
    pub fn options(&self) -> &AutocompleteOptions {
        &self.options
    }

    /// Whether the controller is still attached.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Time until the next timer (debounce or blur) fires, if any.
    ///
    /// Hosts without their own timers can sleep this long and then call
    /// [`tick`](Self::tick).
    pub fn next_deadline(&mut self) -> Option<Duration> {
        let now = self.clock.now();
        let search = self.scheduler.time_until_fire(now);
        let blur = self.blur_timers.time_until_next(now);
        match (search, blur) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // =========================================================================
    // Input entry points
    // =========================================================================

    /// Handle a key event. `text` is the input's content after the key.
    ///
    /// Returns `true` if the key was consumed as navigation, in which case
    /// the host should suppress its default action. Tab and Right arrow are
    /// only consumed when they accepted part of the shadow.
    #[tracing::instrument(skip(self, text), target = "typeahead::controller", level = "trace")]
    pub fn handle_key(&mut self, key: Key, text: &str) -> bool {
        if !self.attached {
            return false;
        }
        match key.class() {
            KeyClass::Ignored => false,
            KeyClass::Navigation => self.navigate(Key::from_code(key.code())),
            KeyClass::Text => {
                self.input(text);
                false
            }
        }
    }

    /// Handle a change of the input's text from typing.
    pub fn input(&mut self, text: &str) {
        if !self.attached {
            return;
        }
        self.query.clear();
        self.query.push_str(text);

        let now = self.clock.now();
        match self.scheduler.on_keystroke(now, text) {
            Keystroke::TooShort => self.hide(HideReason::TooShort),
            Keystroke::Scheduled => {}
        }
    }

    /// Apply a navigation key. Only acts while the popup is visible.
    fn navigate(&mut self, key: Key) -> bool {
        if !self.state.visible {
            return false;
        }
        match key {
            Key::Escape => self.hide(HideReason::Escape),
            Key::Enter => self.select(None),
            Key::ArrowUp => self.move_highlight(Direction::Up),
            Key::ArrowDown => self.move_highlight(Direction::Down),
            Key::ArrowRight | Key::Tab => return self.accept_shadow(),
            _ => return false,
        }
        true
    }

    /// The input lost focus. The popup hides after [`BLUR_GRACE`].
    pub fn blur(&mut self) {
        if !self.attached {
            return;
        }
        self.cancel_blur();
        let now = self.clock.now();
        self.blur_timer = Some(self.blur_timers.start_one_shot(now, BLUR_GRACE, ()));
        tracing::trace!(target: targets::CONTROLLER, "blur hide scheduled");
    }

    /// The input regained focus; a pending blur hide is cancelled.
    pub fn focus(&mut self) {
        if self.cancel_blur() {
            tracing::trace!(target: targets::CONTROLLER, "blur hide cancelled by focus");
        }
    }

    fn cancel_blur(&mut self) -> bool {
        match self.blur_timer.take() {
            Some(id) => self.blur_timers.stop(id).is_ok(),
            None => false,
        }
    }

    // =========================================================================
    // Pointer entry points
    // =========================================================================

    /// The pointer moved over suggestion `index`.
    pub fn pointer_enter(&mut self, index: usize) {
        if self.state.highlight_index != Some(index) {
            self.highlight(Some(index));
        }
    }

    /// The pointer left suggestion `index`.
    ///
    /// The highlight only clears when it is on a different item, so the item
    /// the pointer just left stays highlighted.
    pub fn pointer_leave(&mut self, index: usize) {
        if self.state.highlight_index != Some(index) {
            self.highlight(None);
        }
    }

    /// Suggestion `index` was clicked.
    pub fn pointer_click(&mut self, index: usize) {
        if !self.state.visible {
            return;
        }
        let Some(value) = self.state.suggestions.get(index).map(|s| s.value.clone()) else {
            tracing::debug!(target: targets::CONTROLLER, index, "click outside the suggestion list ignored");
            return;
        };
        self.select(Some(&value));
    }

    // =========================================================================
    // Event loop
    // =========================================================================

    /// Fire due timers and apply queued provider answers.
    #[tracing::instrument(skip(self), target = "typeahead::controller", level = "trace")]
    pub fn tick(&mut self) {
        if !self.attached {
            return;
        }
        let now = self.clock.now();

        if let Some(query) = self.scheduler.poll(now) {
            self.fetch(query);
        }

        if !self.blur_timers.process_expired(now).is_empty() {
            self.blur_timer = None;
            self.hide(HideReason::Blur);
        }

        self.process_completions();
    }

    /// Apply a queued provider answer, if the current request has one.
    pub fn process_completions(&mut self) {
        if !self.attached {
            return;
        }
        if let Some(result) = self.fetch.drain() {
            self.apply(result);
        }
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Search for `query` now, superseding any request in flight.
    fn fetch(&mut self, query: String) {
        let sink = self.fetch.begin(&query);
        self.state.loading = true;
        tracing::debug!(target: targets::CONTROLLER, ?query, token = sink.token().as_u64(), "loading");
        self.render();

        self.provider.search(&query, sink);
        self.process_completions();
    }

    fn apply(&mut self, result: FetchResult) {
        let FetchResult { query, outcome, .. } = result;
        let response = match outcome {
            FetchOutcome::Rejected => {
                tracing::debug!(target: targets::CONTROLLER, %query, "provider rejected request");
                self.hide(HideReason::Rejected);
                return;
            }
            FetchOutcome::Resolved(response) => response,
        };

        let results = match response.results {
            Some(results) if !results.is_empty() => results,
            _ => {
                tracing::debug!(target: targets::CONTROLLER, %query, "no results");
                self.hide(HideReason::NoResults);
                return;
            }
        };

        self.state.shadow_value = if self.options.shadow_input {
            shadow::shadow_value(&query, &results[0].value)
        } else {
            String::new()
        };
        self.state.highlight_index = self.options.highlight_first.then_some(0);
        self.state.suggestions = results;
        self.state.extra = response.extra;
        self.state.results_query = query;
        self.state.loading = false;

        if !self.state.visible {
            self.state.visible = true;
            tracing::debug!(target: targets::CONTROLLER, count = self.state.suggestions.len(), "popup shown");
            self.emit(AutocompleteEvent::Show {
                instance_id: self.options.instance_id.clone(),
            });
        }
        self.render();
    }

    // =========================================================================
    // Navigation & shadow completion
    // =========================================================================

    /// Move the highlight one step and copy the highlighted value into the query.
    pub fn move_highlight(&mut self, direction: Direction) {
        if !self.state.visible {
            return;
        }
        let Some(index) = next_index(
            self.state.highlight_index,
            direction,
            self.state.suggestions.len(),
        ) else {
            return;
        };

        self.state.shadow_value.clear();
        self.state.highlight_index = Some(index);
        self.query.clone_from(&self.state.suggestions[index].value);
        tracing::trace!(target: targets::CONTROLLER, index, step = direction.offset(), "highlight moved");
        self.render();
    }

    /// Highlight suggestion `index`, or clear the highlight with `None`.
    ///
    /// Returns `false` (and changes nothing) if the index is out of range.
    pub fn highlight(&mut self, index: Option<usize>) -> bool {
        if !self.attached {
            return false;
        }
        if !is_valid_highlight(index, self.state.suggestions.len())
            || (index.is_some() && !self.state.visible)
        {
            tracing::debug!(target: targets::CONTROLLER, ?index, "highlight out of range ignored");
            return false;
        }
        self.state.highlight_index = index;
        self.render();
        true
    }

    /// Complete the current word, or append the next word, from the shadow.
    ///
    /// On success a search for the new query starts immediately, without
    /// waiting for the debounce delay. Returns whether the query changed.
    pub fn accept_shadow(&mut self) -> bool {
        if !self.attached || !self.options.shadow_input || self.state.shadow_value.is_empty() {
            return false;
        }
        let Some(edit) = shadow::accept(&self.query, &self.state.shadow_value) else {
            return false;
        };

        self.query = edit.into_query();
        tracing::debug!(target: targets::CONTROLLER, query = %self.query, "shadow accepted");
        self.scheduler.cancel();
        self.fetch(self.query.clone());
        true
    }

    // =========================================================================
    // Visibility & selection
    // =========================================================================

    /// Select a value and close the popup.
    ///
    /// A non-empty `value` replaces the query first. Emits `select` with the
    /// final query, hides the popup, then runs the `on_select` callback.
    pub fn select(&mut self, value: Option<&str>) {
        if !self.attached {
            return;
        }
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.query.clear();
            self.query.push_str(value);
        }

        tracing::debug!(target: targets::CONTROLLER, value = %self.query, "selected");
        self.emit(AutocompleteEvent::Select {
            instance_id: self.options.instance_id.clone(),
            value: self.query.clone(),
        });
        self.hide(HideReason::Selected);

        if let Some(on_select) = self.on_select.as_mut() {
            on_select();
        }
    }

    /// Hide the popup (the Escape action).
    pub fn escape(&mut self) {
        if self.attached {
            self.hide(HideReason::Escape);
        }
    }

    fn hide(&mut self, reason: HideReason) {
        if reason.cancels_pending_search() {
            self.scheduler.cancel();
        }
        self.fetch.cancel();

        let was_visible = self.state.visible;
        let was_loading = self.state.loading;
        self.state.reset_hidden();

        if was_visible {
            tracing::debug!(target: targets::CONTROLLER, ?reason, "popup hidden");
            self.emit(AutocompleteEvent::Hide {
                instance_id: self.options.instance_id.clone(),
            });
        }
        if was_visible || was_loading {
            self.render();
        }
    }

    /// Detach from the input: cancel every timer and the request in flight.
    ///
    /// Afterwards every entry point is a no-op. Also runs on drop.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.scheduler.cancel();
        self.blur_timers.clear();
        self.blur_timer = None;
        self.fetch.cancel();
        self.attached = false;
        self.renderer.detach();
        tracing::debug!(target: targets::CONTROLLER, instance_id = ?self.options.instance_id, "controller detached");
    }

    // =========================================================================
    // Collaborators
    // =========================================================================

    fn render(&mut self) {
        debug_assert!(self.state.invariants_hold(), "inconsistent state: {:?}", self.state);
        self.renderer.render(&self.state, &self.query);
    }

    fn emit(&self, event: AutocompleteEvent) {
        tracing::trace!(target: targets::CONTROLLER, event = event.name(), "notify");
        self.notifier.notify(&event);
    }
}

impl Drop for AutocompleteController {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for AutocompleteController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteController")
            .field("instance_id", &self.options.instance_id)
            .field("query", &self.query)
            .field("phase", &self.state.phase())
            .field("suggestions", &self.state.suggestions.len())
            .field("highlight_index", &self.state.highlight_index)
            .field("attached", &self.attached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ResultSink;
    use crate::suggestion::SearchResponse;
    use std::cell::RefCell;
    use std::rc::Rc;
    use typeahead_core::ManualClock;

    fn controller_with(
        options: AutocompleteOptions,
    ) -> (AutocompleteController, Arc<ManualClock>, Rc<RefCell<Vec<ResultSink>>>) {
        let clock = Arc::new(ManualClock::new());
        let sinks = Rc::new(RefCell::new(Vec::new()));
        let sinks_clone = sinks.clone();
        let controller = AutocompleteController::builder(options)
            .search_provider(move |_query: &str, sink: ResultSink| {
                sinks_clone.borrow_mut().push(sink);
            })
            .clock(clock.clone())
            .attach()
            .unwrap();
        (controller, clock, sinks)
    }

    #[test]
    fn test_fetch_hides_keep_pending_search() {
        assert!(HideReason::Escape.cancels_pending_search());
        assert!(HideReason::Blur.cancels_pending_search());
        assert!(HideReason::TooShort.cancels_pending_search());
        assert!(HideReason::Selected.cancels_pending_search());
        assert!(!HideReason::NoResults.cancels_pending_search());
        assert!(!HideReason::Rejected.cancels_pending_search());
    }

    #[test]
    fn test_next_deadline_tracks_debounce_and_blur() {
        let (mut controller, clock, _sinks) = controller_with(AutocompleteOptions::default());
        assert_eq!(controller.next_deadline(), None);

        controller.input("pa");
        assert_eq!(controller.next_deadline(), Some(Duration::from_millis(100)));

        clock.advance_ms(40);
        controller.blur();
        assert_eq!(controller.next_deadline(), Some(Duration::from_millis(60)));

        controller.focus();
        clock.advance_ms(60);
        assert_eq!(controller.next_deadline(), Some(Duration::ZERO));
        controller.tick();
        assert_eq!(controller.next_deadline(), None);
    }

    #[test]
    fn test_loading_phase_while_fetch_in_flight() {
        let (mut controller, clock, sinks) = controller_with(AutocompleteOptions::default());
        controller.input("pa");
        clock.advance_ms(100);
        controller.tick();

        assert_eq!(controller.phase(), Phase::Loading);
        assert_eq!(sinks.borrow().len(), 1);

        let sink = sinks.borrow_mut().remove(0);
        sink.resolve(SearchResponse::from_values(["paris"]));
        controller.tick();
        assert_eq!(controller.phase(), Phase::Visible);
    }

    #[test]
    fn test_highlight_out_of_range_is_rejected() {
        let (mut controller, clock, sinks) = controller_with(AutocompleteOptions::default());
        controller.input("pa");
        clock.advance_ms(100);
        controller.tick();
        let sink = sinks.borrow_mut().remove(0);
        sink.resolve(SearchResponse::from_values(["paris", "parma"]));
        controller.tick();

        assert!(controller.highlight(Some(1)));
        assert!(!controller.highlight(Some(2)));
        assert_eq!(controller.state().highlight_index, Some(1));
        assert!(controller.highlight(None));
        assert_eq!(controller.state().highlight_index, None);
    }

    #[test]
    fn test_detach_cancels_in_flight_request() {
        let (mut controller, clock, sinks) = controller_with(AutocompleteOptions::default());
        controller.input("pa");
        clock.advance_ms(100);
        controller.tick();

        controller.detach();
        assert!(!controller.is_attached());
        assert!(sinks.borrow()[0].is_cancelled());

        controller.input("par");
        assert_eq!(controller.next_deadline(), None);
    }

    #[test]
    fn test_builder_debug_omits_collaborators() {
        let builder = AutocompleteController::builder(AutocompleteOptions::default());
        let debug = format!("{builder:?}");
        assert!(debug.contains("has_provider: false"));
    }
}
