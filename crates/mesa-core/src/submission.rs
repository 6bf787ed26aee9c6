//! # Sale Submission Adapter
//!
//! Turns a finalized cart into the sale-creation request the backend (and,
//! through it, the invoicing collaborator) consumes. Pure glue: the request
//! is a snapshot of the cart at submission time, totals included, so the
//! backend can cross-check the client's arithmetic before issuing a
//! document.
//!
//! Everything past the DTO - storage, stock decrement, the SUNAT submission
//! itself - belongs to mesa-store and the invoicing collaborator.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartTotals};
use crate::error::{CartError, CartResult};
use crate::types::{DocumentInfo, PaymentMethod, PriceMode};

// =============================================================================
// Sale Request
// =============================================================================

/// One line of a sale-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    /// Product the line sells.
    pub product_id: String,
    /// Barcode the backend decrements first (the line's primary code).
    pub code: String,
    /// Every code attached to the line, decrement order.
    pub codes: Vec<String>,
    /// Quantity sold.
    pub quantity: i64,
    /// Whether the wholesale price was in effect.
    pub wholesale: bool,
    /// Manual price override, present only for variable-price lines.
    pub manual_price_cents: Option<i64>,
    /// Effective IGV-inclusive unit price at submission time.
    pub unit_price_cents: i64,
    /// Line subtotal, IGV-inclusive.
    pub line_total_cents: i64,
}

/// A sale-creation request built from a finalized cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub lines: Vec<SaleLineRequest>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Document block (boleta/factura with customer tax-id details).
    pub document: Option<DocumentInfo>,
    /// Discount's pre-tax equivalent, céntimos.
    pub discount_base_cents: i64,
    /// Totals as the client computed them, for backend cross-checking.
    pub totals: CartTotals,
}

impl SaleRequest {
    /// Builds the request from a finalized cart. Rejects an empty cart.
    pub fn from_cart(cart: &Cart) -> CartResult<SaleRequest> {
        if cart.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let totals = cart.totals();

        let lines = cart
            .lines
            .iter()
            .map(|line| SaleLineRequest {
                product_id: line.product_id.clone(),
                code: line
                    .codes
                    .first()
                    .map(|b| b.code.clone())
                    .unwrap_or_else(|| line.sku.clone()),
                codes: line.codes.iter().map(|b| b.code.clone()).collect(),
                quantity: line.quantity,
                wholesale: line.price_mode == PriceMode::Wholesale,
                manual_price_cents: line.manual_price_cents,
                unit_price_cents: line.effective_unit_price().cents(),
                line_total_cents: line.subtotal().cents(),
            })
            .collect();

        Ok(SaleRequest {
            lines,
            payment_method: cart.payment_method,
            notes: cart.notes.clone(),
            document: cart.document.clone(),
            discount_base_cents: totals.discount_base_cents,
            totals,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
