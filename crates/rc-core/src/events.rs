//! Queue events for the display surface.
//!
//! [`EventBus`] wraps a `tokio::sync::broadcast` channel with a bounded
//! ring-buffer of recent events so that a late subscriber can still see what
//! the queue has been doing.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::sync::broadcast;

/// Maximum number of events retained in the ring buffer.
const MAX_RECENT_EVENTS: usize = 100;

/// Something that happened to the conversion queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A job was appended to the tail.
    Queued { path: PathBuf, depth: usize },
    /// The head job was handed to the pipeline.
    Started { path: PathBuf },
    /// The head job finished and was removed from the queue.
    Finished {
        path: PathBuf,
        error: Option<String>,
        depth: usize,
    },
    /// The drain loop emptied the queue and stopped.
    Idle,
}

impl QueueEvent {
    /// Queue depth carried by this event, if any.
    pub fn depth(&self) -> Option<usize> {
        match self {
            QueueEvent::Queued { depth, .. } | QueueEvent::Finished { depth, .. } => Some(*depth),
            QueueEvent::Idle => Some(0),
            QueueEvent::Started { .. } => None,
        }
    }
}

/// Broadcast channel with a bounded ring buffer of recent events.
pub struct EventBus {
    tx: broadcast::Sender<QueueEvent>,
    recent: RwLock<VecDeque<QueueEvent>>,
}

impl EventBus {
    /// Create a new event bus.
    ///
    /// `capacity` controls the broadcast channel buffer size (not the ring
    /// buffer, which is always [`MAX_RECENT_EVENTS`]).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            recent: RwLock::new(VecDeque::with_capacity(MAX_RECENT_EVENTS)),
        }
    }

    /// Subscribe to the broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event to all current subscribers and store it in the
    /// ring buffer.
    pub fn broadcast(&self, event: QueueEvent) {
        {
            let mut recent = self.recent.write();
            if recent.len() >= MAX_RECENT_EVENTS {
                recent.pop_back();
            }
            recent.push_front(event.clone());
        }

        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    /// Return the `n` most recent events (newest first).
    pub fn recent_events(&self, n: usize) -> Vec<QueueEvent> {
        let recent = self.recent.read();
        recent.iter().take(n).cloned().collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
