//! Events handed from the sessions to their consumer
//!
//! Sessions run on tokio tasks; the consumer (typically a UI thread) lives
//! elsewhere. Sessions only ever call [`EventSink::deliver`], which must be
//! thread-safe and must keep the order in which one session emitted events.
//! How and when the consumer drains them is up to the consumer.
//!
//! [`channel`] gives the default hand-off: an unbounded queue whose
//! [`EventQueue::drain`] is meant to be called from the consumer's own loop
//! (e.g. once per frame or from a repeating UI timer).

use tokio::sync::mpsc;
use tracing::debug;

use crate::protocol::ResultLine;

/// Event from a host or guest session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Human-readable status line
    Status(String),
    /// Lobby composition changed. `guest` is `None` while nobody has joined.
    Players { host: String, guest: Option<String> },
    /// Match started
    StartGame,
    /// A round was resolved
    RoundResult(ResultLine),
}

/// Thread-safe destination for session events
pub trait EventSink: Send + Sync + 'static {
    fn deliver(&self, event: SessionEvent);
}

/// Any thread-safe callback can act as a sink, e.g. one that forwards onto
/// a UI toolkit's event loop.
impl<F> EventSink for F
where
    F: Fn(SessionEvent) + Send + Sync + 'static,
{
    fn deliver(&self, event: SessionEvent) {
        self(event)
    }
}

/// Producer half of [`channel`]
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink for EventSender {
    fn deliver(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event queue dropped, discarding event");
        }
    }
}

/// Consumer half of [`channel`]. Dropping it unsubscribes: later events
/// are discarded by the sender.
#[derive(Debug)]
pub struct EventQueue {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl EventQueue {
    /// Wait for the next event. `None` once every sender is gone.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    /// Get the next event without waiting
    pub fn try_recv_event(&mut self) -> Option<SessionEvent> {
        self.rx.try_recv().ok()
    }

    /// Hand every queued event to `handler` in emission order.
    /// Returns how many were handled.
    pub fn drain(&mut self, mut handler: impl FnMut(SessionEvent)) -> usize {
        let mut handled = 0;
        while let Some(event) = self.try_recv_event() {
            handler(event);
            handled += 1;
        }
        handled
    }
}

/// Create a connected sender/queue pair
pub fn channel() -> (EventSender, EventQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventQueue { rx })
}
