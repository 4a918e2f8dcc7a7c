use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use super::events::SessionEvent;

pub type EventSender = UnboundedSender<SessionEvent>;

/// Hand an event to the consumer.
///
/// A dropped receiver only means nobody is listening anymore, so it is logged and ignored.
pub fn emit_event(events: &EventSender, event: SessionEvent) {
    if let Err(e) = events.send(event) {
        let name = match &e.0 {
            SessionEvent::Translated(_) => "translation://ready",
            SessionEvent::UnsupportedLanguage { .. } => "translation://unsupported-language",
        };
        warn!(event = name, "Failed to emit event: receiver dropped");
    }
}
