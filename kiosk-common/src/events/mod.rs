//! Event types for the kiosk event system
//!
//! Provides the shared event definitions and the EventBus used by the
//! rotation engine and the status surface.

mod rotation_types;

pub use rotation_types::{CompletionOutcome, FetchKind, InterstitialReason};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Kiosk event types
///
/// Events are broadcast via EventBus and can be serialized for SSE
/// transmission. The rendering layer and operators only observe them; no
/// event is ever fed back into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum KioskEvent {
    /// A group's queue became the active playback queue
    GroupActivated {
        /// Group name
        group: String,
        /// Identifies this traversal of the group's queue
        cycle_id: Uuid,
        /// Number of items in the activated queue
        item_count: usize,
        /// When the group was activated
        timestamp: DateTime<Utc>,
    },

    /// An item began playing
    ItemStarted {
        group: String,
        /// Position in the queue (or grid cell)
        index: usize,
        item_id: String,
        title: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// An item finished, ended, or was skipped after a load failure
    ///
    /// Triggers:
    /// - Playback: advance to the next item
    /// - SSE: update progress displays
    ItemCompleted {
        group: String,
        index: usize,
        item_id: String,
        outcome: CompletionOutcome,
        timestamp: DateTime<Utc>,
    },

    /// Every item of the active queue has completed
    ///
    /// Emitted exactly once per traversal.
    QueueCompleted {
        group: String,
        cycle_id: Uuid,
        /// Items completed during the traversal
        items_played: usize,
        timestamp: DateTime<Utc>,
    },

    /// Interstitial screen shown
    InterstitialEntered {
        /// Group that will be activated when the interstitial ends
        next_group: String,
        /// Fixed interstitial duration
        duration_secs: u64,
        timestamp: DateTime<Utc>,
    },

    /// Interstitial deadline passed but no queue is ready yet
    InterstitialExtended {
        group: String,
        reason: InterstitialReason,
        timestamp: DateTime<Utc>,
    },

    /// A catalog fetch resolved successfully
    FetchCompleted {
        group: String,
        kind: FetchKind,
        item_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A catalog fetch failed; recovered locally
    FetchFailed {
        group: String,
        kind: FetchKind,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// A grid cell observed its progress wrap around
    PlayCountChanged {
        group: String,
        index: usize,
        item_id: String,
        play_count: u32,
        timestamp: DateTime<Utc>,
    },
}

impl KioskEvent {
    /// Variant name, used as the SSE event field
    pub fn event_type(&self) -> &'static str {
        match self {
            KioskEvent::GroupActivated { .. } => "GroupActivated",
            KioskEvent::ItemStarted { .. } => "ItemStarted",
            KioskEvent::ItemCompleted { .. } => "ItemCompleted",
            KioskEvent::QueueCompleted { .. } => "QueueCompleted",
            KioskEvent::InterstitialEntered { .. } => "InterstitialEntered",
            KioskEvent::InterstitialExtended { .. } => "InterstitialExtended",
            KioskEvent::FetchCompleted { .. } => "FetchCompleted",
            KioskEvent::FetchFailed { .. } => "FetchFailed",
            KioskEvent::PlayCountChanged { .. } => "PlayCountChanged",
        }
    }
}

/// One-to-many event broadcaster
///
/// Thin wrapper over `tokio::sync::broadcast`. Slow subscribers lag and
/// lose the oldest events instead of blocking the engine.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<KioskEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use kiosk_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(256);
    /// assert_eq!(event_bus.capacity(), 256);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<KioskEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: KioskEvent,
    ) -> Result<usize, broadcast::error::SendError<KioskEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: KioskEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
