//! # Store Events
//!
//! Change notifications emitted after table-cart writes commit.
//!
//! ## Invalidation Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Event Flow                                        │
//! │                                                                         │
//! │  Terminal A                       Terminal B                           │
//! │       │                                │                                │
//! │  save_table(7, cart, v3) ──► COMMIT    │                                │
//! │       │                                │                                │
//! │       └──► StoreEvent::TableSaved ────►│ (broadcast receiver)           │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                            reload mesa 7 snapshot,                      │
//! │                            CartShelf::replace(...)                      │
//! │                                                                         │
//! │  Events are emitted only after the transaction commits, so a           │
//! │  subscriber that reloads on receipt always sees the new state.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Delivery is best-effort per receiver: a lagging subscriber may miss
//! intermediate events (tokio broadcast semantics), which is fine because
//! every event is a cue to reload, not a state delta.

use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Writes are human-paced (one per
/// waiter action), so a small buffer is plenty.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A committed change to the table-cart store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A table snapshot was written (new or replaced) at `version`.
    TableSaved { table: u8, version: i64 },

    /// A table snapshot was deleted (cleared or submitted as a sale).
    TableCleared { table: u8 },
}

pub(crate) fn channel() -> broadcast::Sender<StoreEvent> {
    broadcast::channel(EVENT_CHANNEL_CAPACITY).0
}
