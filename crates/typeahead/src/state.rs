//! Controller state handed to renderers.

use serde_json::{Map, Value};

use crate::navigation::is_valid_highlight;
use crate::suggestion::Suggestion;

/// Where the popup is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing shown, nothing pending.
    Hidden,
    /// A fetch is in flight. The popup may still show earlier results.
    Loading,
    /// Results are shown.
    Visible,
}

/// Everything a renderer needs to draw the popup.
///
/// The controller owns this value and hands it out by shared reference after
/// every transition. Invariants:
///
/// - `highlight_index` is `None` or a valid index into `suggestions`.
/// - When `visible` is false, `highlight_index` is `None` and `shadow_value`
///   is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    /// Whether the popup is shown.
    pub visible: bool,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// The highlighted suggestion, if any.
    pub highlight_index: Option<usize>,
    /// The most recent non-empty result list.
    pub suggestions: Vec<Suggestion>,
    /// Inline completion of the query, or empty.
    pub shadow_value: String,
    /// The query `suggestions` were fetched for, for match emphasis.
    pub results_query: String,
    /// Extra top-level fields of the provider response.
    pub extra: Map<String, Value>,
}

impl ControllerState {
    /// The lifecycle phase this state represents.
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.visible {
            Phase::Visible
        } else {
            Phase::Hidden
        }
    }

    /// The highlighted suggestion, if any.
    pub fn highlighted(&self) -> Option<&Suggestion> {
        self.highlight_index.and_then(|i| self.suggestions.get(i))
    }

    /// The first suggestion, used for shadow completion.
    pub fn top(&self) -> Option<&Suggestion> {
        self.suggestions.first()
    }

    /// Check the documented invariants.
    pub fn invariants_hold(&self) -> bool {
        let highlight_ok = is_valid_highlight(self.highlight_index, self.suggestions.len());
        let hidden_ok =
            self.visible || (self.highlight_index.is_none() && self.shadow_value.is_empty());
        highlight_ok && hidden_ok
    }

    /// Reset the popup fields for a hidden popup. The last result list is kept.
    pub(crate) fn reset_hidden(&mut self) {
        self.visible = false;
        self.loading = false;
        self.highlight_index = None;
        self.shadow_value.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_state() -> ControllerState {
        ControllerState {
            visible: true,
            suggestions: vec!["paris".into(), "parma".into()],
            highlight_index: Some(1),
            shadow_value: "paris".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_state_is_hidden() {
        let state = ControllerState::default();
        assert_eq!(state.phase(), Phase::Hidden);
        assert!(state.invariants_hold());
    }

    #[test]
    fn test_phase() {
        let mut state = visible_state();
        assert_eq!(state.phase(), Phase::Visible);
        state.loading = true;
        assert_eq!(state.phase(), Phase::Loading);
    }

    #[test]
    fn test_reset_hidden_keeps_suggestions() {
        let mut state = visible_state();
        assert_eq!(state.highlighted().map(|s| s.value.as_str()), Some("parma"));

        state.reset_hidden();
        assert_eq!(state.phase(), Phase::Hidden);
        assert_eq!(state.suggestions.len(), 2);
        assert!(state.invariants_hold());
    }

    #[test]
    fn test_invariant_violations_detected() {
        let mut state = visible_state();
        state.highlight_index = Some(5);
        assert!(!state.invariants_hold());

        let mut state = visible_state();
        state.visible = false;
        assert!(!state.invariants_hold());
    }
}
