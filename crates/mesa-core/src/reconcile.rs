//! # Stock Reconciliation
//!
//! Detects and surfaces - never silently fixes - mismatches between a
//! product's authoritative `stock` and the sum of its barcode-batch
//! quantities.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Reconciliation Outcomes                          │
//! │                                                                     │
//! │  stock = 10, batches Σ = 10   →  consistent                         │
//! │  stock = 10, batches Σ = 7    →  difference +3 (batches under-      │
//! │                                  represent; operator adds qty)      │
//! │  stock = 10, batches Σ = 12   →  difference -2 (batches over-       │
//! │                                  represent; operator trims qty)     │
//! │  stock = 5,  no batches       →  inconsistent (stock exists but no  │
//! │                                  batch was ever recorded - likely a │
//! │                                  deleted-sale side effect)          │
//! │  stock = 0,  no batches       →  consistent (nothing to sell)       │
//! │                                                                     │
//! │  Resolution is ALWAYS a manual operator action through the product  │
//! │  edit screen. This module never mutates anything.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{BarcodeBatch, Product};

// =============================================================================
// Stock Audit
// =============================================================================

/// Diagnostic result of comparing a product's stock against its batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockAudit {
    /// `stock - Σ batch quantities`. Positive: batches under-represent
    /// stock; negative: batches over-represent it.
    pub difference: i64,
    /// Whether the product needs operator attention.
    pub inconsistent: bool,
    /// Whether the product has any recorded batches at all.
    pub has_batches: bool,
}

/// Audits one product against its known batches.
///
/// For products with at least one batch, `difference == 0` holds exactly
/// when `inconsistent == false` (reconciliation symmetry).
pub fn audit(product: &Product, batches: &[BarcodeBatch]) -> StockAudit {
    let batch_total: i64 = batches.iter().map(|b| b.quantity).sum();
    let difference = product.stock - batch_total;

    let inconsistent = if batches.is_empty() {
        product.stock > 0
    } else {
        difference != 0
    };

    StockAudit {
        difference,
        inconsistent,
        has_batches: !batches.is_empty(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
