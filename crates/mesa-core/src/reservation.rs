//! # Reservation Tracker
//!
//! Answers "how many units of barcode X for product P are already committed
//! in *other* carts" from whatever saved-cart snapshots are locally known.
//!
//! ## Computed, Not Locked
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   Availability Computation                          │
//! │                                                                     │
//! │  Batch "B1" qty: 5                                                  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Scan other carts:   mesa 4 holds 3 × B1   ──► reserved = 3         │
//! │       │              mesa 9 holds 0 × B1                            │
//! │       ▼                                                             │
//! │  available = max(0, 5 - 3) = 2                                      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  can_increase = line.quantity < total_available                     │
//! │                                                                     │
//! │  There is NO cross-cart mutex. Two operators can race to claim the  │
//! │  same unit; the ceiling only bounds THIS operator at check time.    │
//! │  Best-effort policy, not a correctness guarantee.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure function over explicit inputs: the cart line
//! under edit and a view of every *other* known cart. No caching beyond the
//! caller's own scope; recomputed on every mutation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{BarcodeRef, Cart};

// =============================================================================
// Other-Carts View
// =============================================================================

/// A borrowed view of every known cart *except* the one being edited.
///
/// Constructed by [`crate::shelf::CartShelf::others`], which performs the
/// exclusion structurally - the excluded cart's lines can never leak into a
/// reservation sum (self-exclusion property).
#[derive(Debug, Clone, Default)]
pub struct OtherCarts<'a> {
    carts: Vec<&'a Cart>,
}

impl<'a> OtherCarts<'a> {
    /// An empty view: nothing reserved anywhere.
    pub fn none() -> Self {
        OtherCarts { carts: Vec::new() }
    }

    /// Builds a view from an iterator of carts (exclusion already applied).
    pub fn from_carts(carts: impl IntoIterator<Item = &'a Cart>) -> Self {
        OtherCarts {
            carts: carts.into_iter().collect(),
        }
    }

    /// Number of carts in the view.
    pub fn len(&self) -> usize {
        self.carts.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }

    /// Sums quantities committed to `(product_id, code)` across the view.
    ///
    /// A line counts when its product matches and its barcode set contains
    /// `code`; the whole line quantity is counted against that code.
    pub fn reserved_elsewhere(&self, code: &str, product_id: &str) -> i64 {
        self.carts
            .iter()
            .flat_map(|cart| cart.lines.iter())
            .filter(|line| {
                line.product_id == product_id && line.codes.iter().any(|b| b.code == code)
            })
            .map(|line| line.quantity)
            .sum()
    }
}

// =============================================================================
// Availability
// =============================================================================

/// Per-barcode availability of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeAvailability {
    /// The scannable code.
    pub code: String,
    /// Quantity on hand in this batch (last known).
    pub batch_qty: i64,
    /// Units claimed by other carts.
    pub reserved: i64,
    /// `max(0, batch_qty - reserved)`.
    pub available: i64,
}

/// Availability summary for a cart line, recomputed on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Breakdown per barcode attached to the line.
    pub per_barcode: Vec<BarcodeAvailability>,
    /// Sum of per-barcode `available`.
    pub total_available: i64,
    /// Headroom left for the line: `max(0, total_available - quantity)`.
    pub remaining: i64,
    /// Whether the line's current quantity may grow by one.
    pub can_increase: bool,
}

/// Computes availability for an arbitrary (product, barcode set, quantity)
/// triple against a view of the other carts.
///
/// Used both for existing lines and for the prospective line of an
/// `add_item` before it exists.
pub fn availability_for(
    product_id: &str,
    codes: &[BarcodeRef],
    quantity: i64,
    others: &OtherCarts<'_>,
) -> Availability {
    let per_barcode: Vec<BarcodeAvailability> = codes
        .iter()
        .map(|b| {
            let reserved = others.reserved_elsewhere(&b.code, product_id);
            BarcodeAvailability {
                code: b.code.clone(),
                batch_qty: b.batch_qty,
                reserved,
                available: (b.batch_qty - reserved).max(0),
            }
        })
        .collect();

    let total_available: i64 = per_barcode.iter().map(|b| b.available).sum();

    Availability {
        per_barcode,
        total_available,
        remaining: (total_available - quantity).max(0),
        can_increase: quantity < total_available,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::test_support::{cart_with_line, line_with_codes};

    #[test]
    fn test_reserved_elsewhere_sums_matching_lines() {
        let cart_a = cart_with_line(line_with_codes("p1", &[("B1", 5)], 3));
        let cart_b = cart_with_line(line_with_codes("p1", &[("B1", 5)], 1));
        let others = OtherCarts::from_carts([&cart_a, &cart_b]);

        assert_eq!(others.reserved_elsewhere("B1", "p1"), 4);
    }

    #[test]
    fn test_reserved_elsewhere_ignores_other_products_and_codes() {
        let cart = cart_with_line(line_with_codes("p2", &[("B1", 5)], 3));
        let others = OtherCarts::from_carts([&cart]);

        assert_eq!(others.reserved_elsewhere("B1", "p1"), 0);
        assert_eq!(others.reserved_elsewhere("B2", "p2"), 0);
    }

    /// Batch qty 5, another cart holds 3 → availability 2.
    #[test]
    fn test_availability_scenario_b() {
        let cart_a = cart_with_line(line_with_codes("p1", &[("B1", 5)], 3));
        let others = OtherCarts::from_carts([&cart_a]);

        let line = line_with_codes("p1", &[("B1", 5)], 0);
        let avail = availability_for("p1", &line.codes, line.quantity, &others);

        assert_eq!(avail.per_barcode[0].reserved, 3);
        assert_eq!(avail.per_barcode[0].available, 2);
        assert_eq!(avail.total_available, 2);
        assert!(avail.can_increase);
    }

    #[test]
    fn test_availability_floors_at_zero() {
        // Over-reserved batch: 7 claimed elsewhere against a qty-5 batch.
        let cart_a = cart_with_line(line_with_codes("p1", &[("B1", 5)], 7));
        let others = OtherCarts::from_carts([&cart_a]);

        let line = line_with_codes("p1", &[("B1", 5)], 0);
        let avail = availability_for("p1", &line.codes, line.quantity, &others);

        assert_eq!(avail.per_barcode[0].available, 0);
        assert_eq!(avail.total_available, 0);
        assert!(!avail.can_increase);
    }

    #[test]
    fn test_availability_sums_across_barcodes() {
        let cart_a = cart_with_line(line_with_codes("p1", &[("B1", 5)], 4));
        let others = OtherCarts::from_carts([&cart_a]);

        let line = line_with_codes("p1", &[("B1", 5), ("B2", 3)], 2);
        let avail = availability_for("p1", &line.codes, line.quantity, &others);

        // B1: 5 - 4 = 1, B2: 3 - 0 = 3 → total 4
        assert_eq!(avail.total_available, 4);
        assert!(avail.can_increase);
    }
}
