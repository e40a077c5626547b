//! Reporting channel boundary.
//!
//! The controller pushes [`WorkflowEvent`]s through an [`EventSink`]; the
//! sink never blocks the workflow and no acknowledgment is expected. The
//! presentation layer (dashboard, websocket fan-out) lives entirely on the
//! other side of this boundary.

use ol_types::WorkflowEvent;
use tokio::sync::mpsc;
use tracing::info;

/// One-way, fire-and-forget event consumer.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: WorkflowEvent);
}

/// Forwards events into a tokio channel for an external consumer.
///
/// A dropped receiver is not an error: the workflow keeps running and the
/// events are discarded, matching the fire-and-forget contract.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<WorkflowEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WorkflowEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: WorkflowEvent) {
        let _ = self.tx.send(event);
    }
}

/// Logs each event through `tracing` instead of forwarding it.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: WorkflowEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(kind = event.kind(), %payload, "workflow event"),
            Err(_) => info!(kind = event.kind(), "workflow event"),
        }
    }
}

/// Discards all events.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: WorkflowEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use ol_types::Phase;

    #[test]
    fn channel_sink_delivers_events_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(WorkflowEvent::PhaseChanged { phase: Phase::Doe });
        sink.emit(WorkflowEvent::ResetComplete);

        assert_eq!(
            rx.try_recv().unwrap(),
            WorkflowEvent::PhaseChanged { phase: Phase::Doe }
        );
        assert_eq!(rx.try_recv().unwrap(), WorkflowEvent::ResetComplete);
    }

    #[test]
    fn channel_sink_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        // Must not panic or block.
        sink.emit(WorkflowEvent::ResetComplete);
    }
}
