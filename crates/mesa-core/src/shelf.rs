//! # Cart Shelf
//!
//! The locally known collection of saved cart snapshots, keyed by
//! [`CartId`]. This is the client-side cache of the Multi-Cart Store: the
//! Reservation Tracker scans it to compute cross-cart claims, so its
//! freshness bounds how honest the availability ceiling is.
//!
//! ## Freshness
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Store (SQLite / remote)          CartShelf (this module)           │
//! │                                                                     │
//! │  save/clear ──► StoreEvent ──────► replace()/remove()               │
//! │                 (any transport:    │                                │
//! │                  poll, push,       ▼                                │
//! │                  manual refresh)   others(editing) ──► Reservation  │
//! │                                                        Tracker     │
//! │                                                                     │
//! │  The shelf never fetches anything itself - a transport drives it    │
//! │  through the explicit replace/remove entry points.                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::reservation::OtherCarts;
use crate::types::CartId;

// =============================================================================
// Saved Cart
// =============================================================================

/// A cart snapshot as persisted by the Multi-Cart Store.
///
/// `version` is the optimistic-concurrency token: a save must present the
/// version it loaded, and the store rejects the write when they differ.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SavedCart {
    /// Identity of the snapshot (table number or ephemeral id).
    pub id: CartId,

    /// The full cart payload.
    pub cart: Cart,

    /// Monotonically increasing snapshot version (starts at 1).
    pub version: i64,

    /// When the snapshot was last saved.
    #[ts(as = "String")]
    pub saved_at: DateTime<Utc>,
}

// =============================================================================
// Cart Shelf
// =============================================================================

/// Keyed collection of locally known saved carts.
#[derive(Debug, Clone, Default)]
pub struct CartShelf {
    carts: BTreeMap<CartId, SavedCart>,
}

impl CartShelf {
    /// Creates an empty shelf.
    pub fn new() -> Self {
        CartShelf {
            carts: BTreeMap::new(),
        }
    }

    /// Inserts or replaces a snapshot (transport-driven refresh).
    pub fn replace(&mut self, saved: SavedCart) {
        self.carts.insert(saved.id.clone(), saved);
    }

    /// Replaces the whole shelf with a freshly loaded set of snapshots.
    pub fn replace_all(&mut self, saved: impl IntoIterator<Item = SavedCart>) {
        self.carts = saved.into_iter().map(|s| (s.id.clone(), s)).collect();
    }

    /// Removes a snapshot (table cleared / cart submitted).
    pub fn remove(&mut self, id: &CartId) -> Option<SavedCart> {
        self.carts.remove(id)
    }

    /// Looks up a snapshot.
    pub fn get(&self, id: &CartId) -> Option<&SavedCart> {
        self.carts.get(id)
    }

    /// The version token to present when saving `id`, 0 for a fresh table.
    pub fn version_of(&self, id: &CartId) -> i64 {
        self.carts.get(id).map(|s| s.version).unwrap_or(0)
    }

    /// Number of snapshots on the shelf.
    pub fn len(&self) -> usize {
        self.carts.len()
    }

    /// Whether the shelf is empty.
    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }

    /// Iterates all snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &SavedCart> {
        self.carts.values()
    }

    /// A reservation view of every cart except the one being edited.
    ///
    /// The exclusion is structural: the returned view simply never contains
    /// `editing`, so a cart can never reserve against itself.
    pub fn others(&self, editing: &CartId) -> OtherCarts<'_> {
        OtherCarts::from_carts(
            self.carts
                .iter()
                .filter(|(id, _)| *id != editing)
                .map(|(_, saved)| &saved.cart),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
