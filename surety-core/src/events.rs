//! Domain events emitted after a transaction commits
//!
//! The core publishes on an in-process broadcast bus; external collaborators
//! (the oracle-response simulator, status watchers) subscribe and issue their
//! own calls back into the core. Subscribers get no ordering guarantee
//! relative to each other.

use crate::types::FlightKey;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Domain event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SuretyEvent {
    /// A flight-status request was opened; oracles holding the index respond
    StatusRequested {
        /// Index bucket selected for this request
        index: u8,
        /// Flight the status is requested for
        flight: FlightKey,
    },

    /// A LateAirline resolution credited the flight's policies
    FlightCredited {
        /// Resolved flight
        flight: FlightKey,
        /// Policies credited by this resolution
        policies_credited: usize,
        /// Sum of credits issued
        total_credited: Decimal,
    },
}

/// Event envelope (UUIDv7 for time-ordering)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique event ID
    pub event_id: Uuid,

    /// Commit timestamp
    pub occurred_at: DateTime<Utc>,

    /// The event
    pub event: SuretyEvent,
}

impl Envelope {
    /// Wrap an event for publication
    pub fn new(event: SuretyEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            event,
        }
    }
}

/// In-process broadcast event bus
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Envelope>,
}

impl EventBus {
    /// Create bus with the given buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }

    /// Publish an event; a bus with no subscribers drops it silently
    pub fn publish(&self, event: SuretyEvent) {
        let envelope = Envelope::new(event);
        tracing::debug!(event_id = %envelope.event_id, "Publishing event");
        let _ = self.sender.send(envelope);
    }
}
