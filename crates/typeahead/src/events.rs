//! Lifecycle notifications.

use std::sync::Arc;

use serde::Serialize;
use typeahead_core::Signal;

/// A notification emitted by the controller.
///
/// Every event carries the configured instance identifier so listeners
/// shared by several inputs can tell them apart. Serialized, events look like
/// `{"event":"select","instanceId":"x1","value":"paris"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum AutocompleteEvent {
    /// The controller attached to its input.
    Init {
        #[serde(rename = "instanceId")]
        instance_id: Option<String>,
    },
    /// The popup became visible.
    Show {
        #[serde(rename = "instanceId")]
        instance_id: Option<String>,
    },
    /// The popup was hidden.
    Hide {
        #[serde(rename = "instanceId")]
        instance_id: Option<String>,
    },
    /// A value was selected.
    Select {
        #[serde(rename = "instanceId")]
        instance_id: Option<String>,
        value: String,
    },
}

impl AutocompleteEvent {
    /// The event name: `init`, `show`, `hide` or `select`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Show { .. } => "show",
            Self::Hide { .. } => "hide",
            Self::Select { .. } => "select",
        }
    }

    /// The instance identifier carried by the event.
    pub fn instance_id(&self) -> Option<&str> {
        match self {
            Self::Init { instance_id }
            | Self::Show { instance_id }
            | Self::Hide { instance_id }
            | Self::Select { instance_id, .. } => instance_id.as_deref(),
        }
    }
}

/// Receives controller notifications.
pub trait Notifier {
    /// Deliver one event.
    fn notify(&self, event: &AutocompleteEvent);
}

impl Notifier for Signal<AutocompleteEvent> {
    fn notify(&self, event: &AutocompleteEvent) {
        self.emit(event.clone());
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, event: &AutocompleteEvent) {
        (**self).notify(event);
    }
}

/// Discards every event.
impl Notifier for () {
    fn notify(&self, _event: &AutocompleteEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_select_serializes_with_instance_id() {
        let event = AutocompleteEvent::Select {
            instance_id: Some("x1".into()),
            value: "paris".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "event": "select", "instanceId": "x1", "value": "paris" })
        );
        assert_eq!(event.name(), "select");
        assert_eq!(event.instance_id(), Some("x1"));
    }

    #[test]
    fn test_signal_notifier_forwards_events() {
        let signal = Arc::new(Signal::<AutocompleteEvent>::new());
        let names = Arc::new(Mutex::new(Vec::new()));

        let names_clone = names.clone();
        signal.connect(move |event| names_clone.lock().push(event.name()));

        let notifier: Box<dyn Notifier> = Box::new(signal.clone());
        notifier.notify(&AutocompleteEvent::Init { instance_id: None });
        notifier.notify(&AutocompleteEvent::Show { instance_id: None });

        assert_eq!(*names.lock(), vec!["init", "show"]);
    }
}
