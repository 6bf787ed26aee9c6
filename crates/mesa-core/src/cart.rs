//! # Cart Aggregate
//!
//! The mutable working set for one sale: an ordered sequence of line items
//! plus cart-level metadata (payment method, notes, document selection,
//! discount).
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Cart State Operations                           │
//! │                                                                     │
//! │  Operator Action        Mutation                Availability check  │
//! │  ───────────────        ────────                ──────────────────  │
//! │  Scan barcode ────────► add_item() ───────────► can_increase?       │
//! │  Change quantity ─────► set_quantity() ───────► ≤ total_available?  │
//! │  Click remove ────────► remove_item() ────────► (unconditional)     │
//! │  Toggle mayorista ────► toggle_wholesale() ───► price configured?   │
//! │  Manager override ────► set_variable_price() ─► (role: caller)      │
//! │  Apply discount ──────► set_discount() ───────► ≤ total / ≤ 100%    │
//! │                                                                     │
//! │  Every rejected mutation returns a typed CartError and leaves the   │
//! │  cart unchanged; the operator sees it as a transient notification.  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Discount Rounding
//! `totals()` replicates the invoicing backend's allocation exactly: the
//! discount's pre-tax equivalent is spread across line bases proportionally,
//! floor-rounded to céntimos, and the last line absorbs the residual (capped
//! at its base, with overflow spilling backwards). The scheme is
//! order-dependent; a mismatch here is a direct source of invoice-total
//! discrepancies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::reservation::{availability_for, Availability, OtherCarts};
use crate::types::{
    BarcodeBatch, Discount, DocumentInfo, PaymentMethod, PriceMode, Product,
};
use crate::MAX_CART_LINES;

// =============================================================================
// Barcode Reference
// =============================================================================

/// A barcode attached to a cart line, with the batch quantity known at the
/// time it was attached (refreshed in place by the inventory ledger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeRef {
    /// The scannable code.
    pub code: String,
    /// Last known quantity on hand of the backing batch.
    pub batch_qty: i64,
}

impl From<&BarcodeBatch> for BarcodeRef {
    fn from(batch: &BarcodeBatch) -> Self {
        BarcodeRef {
            code: batch.code.clone(),
            batch_qty: batch.quantity,
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One line item in a cart.
///
/// ## Snapshot Pattern
/// Product fields (sku, name, the three price variants) are frozen at add
/// time so the cart displays consistent data even if the product is edited
/// afterwards. Only batch quantities are refreshed in place, because the
/// availability ceiling must track the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product ID (UUID).
    pub product_id: String,

    /// SKU at time of adding (frozen).
    pub sku: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Regular unit price at time of adding, IGV-inclusive céntimos (frozen).
    pub unit_price_cents: i64,

    /// Wholesale price at time of adding (frozen).
    pub wholesale_price_cents: Option<i64>,

    /// Promotional price at time of adding (frozen).
    pub promo_price_cents: Option<i64>,

    /// Barcodes feeding this line, with their last known batch quantities.
    pub codes: Vec<BarcodeRef>,

    /// Quantity on the line (≥ 1, bounded by availability).
    pub quantity: i64,

    /// Which price variant is in effect.
    pub price_mode: PriceMode,

    /// Manual override price, present only in `PriceMode::Variable`.
    pub manual_price_cents: Option<i64>,

    /// The mode in effect before a manual override, so it can be restored.
    pub prior_price_mode: Option<PriceMode>,

    /// When this line was added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a line from a product snapshot with quantity 1.
    fn from_product(product: &Product, code: BarcodeRef, price_mode: PriceMode) -> Self {
        CartLine {
            product_id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit_price_cents: product.unit_price_cents,
            wholesale_price_cents: product.wholesale_price_cents,
            promo_price_cents: product.promo_price_cents,
            codes: vec![code],
            quantity: 1,
            price_mode,
            manual_price_cents: None,
            prior_price_mode: None,
            added_at: Utc::now(),
        }
    }

    /// The effective IGV-inclusive unit price for the current mode.
    ///
    /// Falls back to the regular unit price when the selected variant is
    /// missing (a snapshot of a price that was unset cannot be charged).
    pub fn effective_unit_price(&self) -> Money {
        let cents = match self.price_mode {
            PriceMode::Unit => self.unit_price_cents,
            PriceMode::Wholesale => self.wholesale_price_cents.unwrap_or(self.unit_price_cents),
            PriceMode::Promotional => self.promo_price_cents.unwrap_or(self.unit_price_cents),
            PriceMode::Variable => self.manual_price_cents.unwrap_or(self.unit_price_cents),
        };
        Money::from_cents(cents)
    }

    /// Line subtotal: `quantity × effective unit price`, IGV-inclusive.
    pub fn subtotal(&self) -> Money {
        self.effective_unit_price().multiply_quantity(self.quantity)
    }

    /// Pre-tax base of the line: `round2(unit / 1.18) × quantity`.
    pub fn base(&self) -> Money {
        self.effective_unit_price()
            .base_from_inclusive()
            .multiply_quantity(self.quantity)
    }

    /// The code shown on availability warnings: the first attached barcode,
    /// or the SKU when the line somehow carries none.
    fn display_code(&self) -> String {
        self.codes
            .first()
            .map(|b| b.code.clone())
            .unwrap_or_else(|| self.sku.clone())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart aggregate (one in-progress sale or table).
///
/// ## Invariants
/// - Every line quantity is ≥ 1 and ≤ its computed availability at the time
///   of the mutation that set it
/// - Line count ≤ `MAX_CART_LINES`
/// - A failed mutation leaves the cart bit-for-bit unchanged
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Line items, in insertion order.
    pub lines: Vec<CartLine>,

    /// Selected payment method.
    pub payment_method: PaymentMethod,

    /// Free-text notes (kitchen remarks, delivery details).
    pub notes: Option<String>,

    /// Document selection (ticket / boleta / factura plus customer).
    pub document: Option<DocumentInfo>,

    /// Cart-level discount.
    pub discount: Option<Discount>,

    /// When the cart was created/last cleared.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            payment_method: PaymentMethod::default(),
            notes: None,
            document: None,
            discount: None,
            created_at: Utc::now(),
        }
    }

    /// Adds a scanned product to the cart.
    ///
    /// ## Behavior
    /// - An existing `(product, price mode)` line that already carries `code`
    ///   is incremented by 1, provided availability allows the increase
    /// - An existing line without `code` gets the barcode appended (quantity
    ///   unchanged; the new batch raises the line's ceiling)
    /// - Otherwise a new line with quantity 1 is created, selecting the price
    ///   variant: wholesale if requested and configured; else promotional if
    ///   configured; else the regular unit price
    ///
    /// ## Arguments
    /// * `product` - the product being added (snapshot source)
    /// * `batches` - known batches for the product, normally from
    ///   `InventoryLedger::batches_or_fallback`
    /// * `code` - the scanned/selected barcode
    /// * `wholesale` - whether the operator asked for the wholesale price
    /// * `others` - every other known cart, for the availability ceiling
    pub fn add_item(
        &mut self,
        product: &Product,
        batches: &[BarcodeBatch],
        code: &str,
        wholesale: bool,
        others: &OtherCarts<'_>,
    ) -> CartResult<()> {
        let batch = batches
            .iter()
            .find(|b| b.code == code)
            .ok_or_else(|| CartError::NoBarcode {
                sku: product.sku.clone(),
            })?;
        let barcode = BarcodeRef::from(batch);

        let price_mode = if wholesale && product.wholesale_price().is_some() {
            PriceMode::Wholesale
        } else if !wholesale && product.promo_price().is_some() {
            PriceMode::Promotional
        } else {
            PriceMode::Unit
        };

        // Merge into an existing line of the same product and mode.
        if let Some(index) = self
            .lines
            .iter()
            .position(|l| l.product_id == product.id && l.price_mode == price_mode)
        {
            let line = &self.lines[index];
            if line.codes.iter().any(|b| b.code == code) {
                let avail = availability_for(&line.product_id, &line.codes, line.quantity, others);
                if !avail.can_increase {
                    return Err(CartError::InsufficientStock {
                        code: code.to_string(),
                        available: avail.total_available,
                        requested: line.quantity + 1,
                    });
                }
                self.lines[index].quantity += 1;
            } else {
                self.lines[index].codes.push(barcode);
            }
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CartError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        // Fresh line: the prospective quantity of 1 must fit the ceiling.
        let codes = vec![barcode.clone()];
        let avail = availability_for(&product.id, &codes, 0, others);
        if !avail.can_increase {
            return Err(CartError::InsufficientStock {
                code: code.to_string(),
                available: avail.total_available,
                requested: 1,
            });
        }

        self.lines
            .push(CartLine::from_product(product, barcode, price_mode));
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// Rejects values below 1 or above the line's `total_available`; the
    /// line is left unchanged on rejection.
    pub fn set_quantity(
        &mut self,
        index: usize,
        quantity: i64,
        others: &OtherCarts<'_>,
    ) -> CartResult<()> {
        let line = self
            .lines
            .get(index)
            .ok_or(CartError::LineNotFound { index })?;

        if quantity < 1 {
            return Err(CartError::QuantityBelowMinimum {
                requested: quantity,
            });
        }

        let avail = availability_for(&line.product_id, &line.codes, line.quantity, others);
        if quantity > avail.total_available {
            return Err(CartError::InsufficientStock {
                code: line.display_code(),
                available: avail.total_available,
                requested: quantity,
            });
        }

        self.lines[index].quantity = quantity;
        Ok(())
    }

    /// Removes a line unconditionally.
    pub fn remove_item(&mut self, index: usize) -> CartResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CartError::LineNotFound { index });
        }
        Ok(self.lines.remove(index))
    }

    /// Swaps a line between wholesale and the unit-or-promotional price.
    ///
    /// Rejects when the product has no wholesale price configured.
    pub fn toggle_wholesale(&mut self, index: usize) -> CartResult<()> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound { index })?;

        match line.price_mode {
            PriceMode::Wholesale => {
                line.price_mode = if line.promo_price_cents.unwrap_or(0) > 0 {
                    PriceMode::Promotional
                } else {
                    PriceMode::Unit
                };
            }
            _ => {
                if line.wholesale_price_cents.unwrap_or(0) <= 0 {
                    return Err(CartError::NoWholesalePrice {
                        name: line.name.clone(),
                    });
                }
                line.price_mode = PriceMode::Wholesale;
            }
        }
        Ok(())
    }

    /// Overrides a line's effective price with an arbitrary tax-inclusive
    /// value ("precio variable").
    ///
    /// Permitted only for elevated roles - enforced by the caller, not here.
    /// The mode in effect before the first override is retained so
    /// [`Cart::clear_variable_price`] can restore it.
    pub fn set_variable_price(&mut self, index: usize, cents: i64) -> CartResult<()> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound { index })?;

        if line.price_mode != PriceMode::Variable {
            line.prior_price_mode = Some(line.price_mode);
        }
        line.price_mode = PriceMode::Variable;
        line.manual_price_cents = Some(cents);
        Ok(())
    }

    /// Removes a manual price override, restoring the prior price mode.
    pub fn clear_variable_price(&mut self, index: usize) -> CartResult<()> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound { index })?;

        if line.price_mode != PriceMode::Variable {
            return Err(CartError::NoManualPrice { index });
        }
        line.price_mode = line.prior_price_mode.take().unwrap_or(PriceMode::Unit);
        line.manual_price_cents = None;
        Ok(())
    }

    /// Sets the cart-level discount.
    ///
    /// Percentage discounts may not exceed 100%; fixed discounts are
    /// tax-inclusive, must be positive and may not exceed the current total.
    pub fn set_discount(&mut self, discount: Discount) -> CartResult<()> {
        match discount {
            Discount::Percentage { bps } => {
                if bps > 10_000 {
                    return Err(CartError::DiscountPercentTooLarge { bps });
                }
            }
            Discount::Fixed { cents } => {
                if cents <= 0 {
                    return Err(CartError::InvalidDiscount {
                        reason: "fixed discount must be positive".to_string(),
                    });
                }
                let total = self.totals_without_discount().total_cents;
                if cents > total {
                    return Err(CartError::DiscountExceedsTotal {
                        discount: Money::from_cents(cents).to_string(),
                        total: Money::from_cents(total).to_string(),
                    });
                }
            }
        }
        self.discount = Some(discount);
        Ok(())
    }

    /// Removes the cart-level discount.
    pub fn clear_discount(&mut self) {
        self.discount = None;
    }

    /// Clears all lines and metadata, starting a fresh cart.
    pub fn clear(&mut self) {
        *self = Cart::new();
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Availability of an existing line against the other carts.
    pub fn availability(&self, index: usize, others: &OtherCarts<'_>) -> CartResult<Availability> {
        let line = self
            .lines
            .get(index)
            .ok_or(CartError::LineNotFound { index })?;
        Ok(availability_for(
            &line.product_id,
            &line.codes,
            line.quantity,
            others,
        ))
    }

    /// Computes the cart totals with the discount allocation of §"Discount
    /// Rounding" above.
    ///
    /// ## Algorithm
    /// 1. Per line: `base = round2(unit / 1.18) × qty`
    /// 2. Discount pre-tax equivalent: percentage → `round2(Σbase × pct)`;
    ///    fixed (tax-inclusive) → `round2(fixed / 1.18)`; clamped to `Σbase`
    /// 3. Allocate across lines proportionally to their base share,
    ///    floor-rounded; the last line absorbs `discount - Σallocated`,
    ///    capped at its base, spilling any overflow to the previous lines
    ///    so no line's adjusted base goes negative
    /// 4. Per line IGV: `round2(adjusted × 0.18)`
    /// 5. `total = Σadjusted + Σigv`
    ///
    /// This is a pure recomputation from current state: applying the same
    /// discount twice cannot drift (rounding idempotence).
    pub fn totals(&self) -> CartTotals {
        self.compute_totals(self.discount)
    }

    fn totals_without_discount(&self) -> CartTotals {
        self.compute_totals(None)
    }

    fn compute_totals(&self, discount: Option<Discount>) -> CartTotals {
        let line_bases: Vec<i64> = self.lines.iter().map(|l| l.base().cents()).collect();
        let total_base: i64 = line_bases.iter().sum();

        if total_base == 0 {
            return CartTotals {
                line_count: self.lines.len(),
                total_quantity: self.total_quantity(),
                gross_cents: 0,
                subtotal_base_cents: 0,
                discount_base_cents: 0,
                igv_cents: 0,
                total_cents: 0,
            };
        }

        let discount_base = match discount {
            None => 0,
            Some(Discount::Percentage { bps }) => {
                Money::from_cents(total_base).percent_of(bps).cents()
            }
            Some(Discount::Fixed { cents }) => {
                Money::from_cents(cents).base_from_inclusive().cents()
            }
        }
        .min(total_base);

        // Floor-rounded proportional shares. Because the discount base is
        // clamped to the total base, no floor share exceeds its line's base.
        let mut shares: Vec<i64> = line_bases
            .iter()
            .map(|base| (*base as i128 * discount_base as i128 / total_base as i128) as i64)
            .collect();

        // The last line absorbs the rounding residual, capped at its own
        // base; overflow spills backwards so no adjusted base goes negative.
        let mut allocated: i64 = shares.iter().sum();
        for i in (0..shares.len()).rev() {
            if allocated == discount_base {
                break;
            }
            let add = (discount_base - allocated).min(line_bases[i] - shares[i]);
            shares[i] += add;
            allocated += add;
        }

        let mut subtotal_base: i64 = 0;
        let mut igv: i64 = 0;
        for (base, share) in line_bases.iter().zip(&shares) {
            let adjusted = base - share;
            subtotal_base += adjusted;
            igv += Money::from_cents(adjusted).igv_on_base().cents();
        }

        CartTotals {
            line_count: self.lines.len(),
            total_quantity: self.total_quantity(),
            gross_cents: self.lines.iter().map(|l| l.subtotal().cents()).sum(),
            subtotal_base_cents: subtotal_base,
            discount_base_cents: discount_base,
            igv_cents: igv,
            total_cents: subtotal_base + igv,
        }
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary for display and sale submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Number of lines.
    pub line_count: usize,
    /// Total quantity across lines.
    pub total_quantity: i64,
    /// Σ line subtotals, tax-inclusive, before discount.
    pub gross_cents: i64,
    /// Σ adjusted (post-discount) pre-tax bases.
    pub subtotal_base_cents: i64,
    /// The discount's pre-tax equivalent that was allocated.
    pub discount_base_cents: i64,
    /// Σ per-line IGV on adjusted bases.
    pub igv_cents: i64,
    /// `subtotal_base + igv`.
    pub total_cents: i64,
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Builds a bare line for reservation/shelf tests.
    pub fn line_with_codes(product_id: &str, codes: &[(&str, i64)], quantity: i64) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            sku: format!("SKU-{}", product_id),
            name: format!("Product {}", product_id),
            unit_price_cents: 1180,
            wholesale_price_cents: None,
            promo_price_cents: None,
            codes: codes
                .iter()
                .map(|(code, qty)| BarcodeRef {
                    code: code.to_string(),
                    batch_qty: *qty,
                })
                .collect(),
            quantity,
            price_mode: PriceMode::Unit,
            manual_price_cents: None,
            prior_price_mode: None,
            added_at: Utc::now(),
        }
    }

    /// Wraps a single line in a cart.
    pub fn cart_with_line(line: CartLine) -> Cart {
        let mut cart = Cart::new();
        cart.lines.push(line);
        cart
    }

    /// A product with one batch covering its whole stock.
    pub fn product_with_batch(id: &str, stock: i64, code: &str) -> (Product, Vec<BarcodeBatch>) {
        let product = Product {
            id: id.to_string(),
            sku: format!("SKU-{}", id),
            name: format!("Product {}", id),
            unit_price_cents: 1180,
            wholesale_price_cents: None,
            promo_price_cents: None,
            stock,
            category_id: None,
            image_ref: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let batches = vec![BarcodeBatch {
            id: format!("b-{}", code),
            product_id: id.to_string(),
            code: code.to_string(),
            quantity: stock,
            created_at: Utc::now(),
        }];
        (product, batches)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    /// Stock 10, one batch "B1". Add → available 9 more,
    /// raise to 10 → ok, raise to 11 → rejected, quantity unchanged.
    #[test]
    fn test_stock_ceiling_scenario_a() {
        let (product, batches) = product_with_batch("p1", 10, "B1");
        let others = OtherCarts::none();
        let mut cart = Cart::new();

        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();
        let avail = cart.availability(0, &others).unwrap();
        assert_eq!(avail.total_available, 10);
        assert_eq!(avail.remaining, 9);
        assert_eq!(cart.lines[0].quantity, 1);

        cart.set_quantity(0, 10, &others).unwrap();
        assert_eq!(cart.lines[0].quantity, 10);

        let err = cart.set_quantity(0, 11, &others).unwrap_err();
        assert_eq!(
            err,
            CartError::InsufficientStock {
                code: "B1".to_string(),
                available: 10,
                requested: 11,
            }
        );
        // Failed mutation leaves quantity unchanged.
        assert_eq!(cart.lines[0].quantity, 10);
    }

    #[test]
    fn test_add_same_code_increments() {
        let (product, batches) = product_with_batch("p1", 5, "B1");
        let others = OtherCarts::none();
        let mut cart = Cart::new();

        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();
        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[test]
    fn test_add_new_code_appends_to_line() {
        let (product, mut batches) = product_with_batch("p1", 5, "B1");
        batches.push(BarcodeBatch {
            id: "b-B2".to_string(),
            product_id: "p1".to_string(),
            code: "B2".to_string(),
            quantity: 3,
            created_at: Utc::now(),
        });
        let others = OtherCarts::none();
        let mut cart = Cart::new();

        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();
        cart.add_item(&product, &batches, "B2", false, &others)
            .unwrap();

        // Same line, second barcode attached, quantity untouched.
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].codes.len(), 2);
        assert_eq!(cart.lines[0].quantity, 1);

        // The ceiling now spans both batches.
        let avail = cart.availability(0, &others).unwrap();
        assert_eq!(avail.total_available, 8);
    }

    #[test]
    fn test_add_rejected_when_exhausted() {
        let (product, batches) = product_with_batch("p1", 1, "B1");
        // Another cart already claims the single unit.
        let other = cart_with_line(line_with_codes("p1", &[("B1", 1)], 1));
        let others = OtherCarts::from_carts([&other]);
        let mut cart = Cart::new();

        let err = cart
            .add_item(&product, &batches, "B1", false, &others)
            .unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_unknown_code_rejected() {
        let (product, batches) = product_with_batch("p1", 5, "B1");
        let others = OtherCarts::none();
        let mut cart = Cart::new();

        let err = cart
            .add_item(&product, &batches, "NOPE", false, &others)
            .unwrap_err();
        assert_eq!(
            err,
            CartError::NoBarcode {
                sku: "SKU-p1".to_string()
            }
        );
    }

    #[test]
    fn test_price_selection() {
        let others = OtherCarts::none();

        // Promo wins when wholesale is not requested.
        let (mut product, batches) = product_with_batch("p1", 10, "B1");
        product.promo_price_cents = Some(1000);
        product.wholesale_price_cents = Some(900);
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();
        assert_eq!(cart.lines[0].price_mode, PriceMode::Promotional);
        assert_eq!(cart.lines[0].effective_unit_price().cents(), 1000);

        // Wholesale wins when requested and configured.
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", true, &others)
            .unwrap();
        assert_eq!(cart.lines[0].price_mode, PriceMode::Wholesale);
        assert_eq!(cart.lines[0].effective_unit_price().cents(), 900);

        // Unit when nothing else configured.
        product.promo_price_cents = None;
        product.wholesale_price_cents = None;
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", true, &others)
            .unwrap();
        assert_eq!(cart.lines[0].price_mode, PriceMode::Unit);
    }

    #[test]
    fn test_wholesale_and_promo_lines_stay_separate() {
        let (mut product, batches) = product_with_batch("p1", 10, "B1");
        product.wholesale_price_cents = Some(900);
        let others = OtherCarts::none();
        let mut cart = Cart::new();

        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();
        cart.add_item(&product, &batches, "B1", true, &others)
            .unwrap();

        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_toggle_wholesale() {
        let (mut product, batches) = product_with_batch("p1", 10, "B1");
        product.wholesale_price_cents = Some(900);
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();

        cart.toggle_wholesale(0).unwrap();
        assert_eq!(cart.lines[0].price_mode, PriceMode::Wholesale);

        cart.toggle_wholesale(0).unwrap();
        assert_eq!(cart.lines[0].price_mode, PriceMode::Unit);
    }

    #[test]
    fn test_toggle_wholesale_unconfigured_rejected() {
        let (product, batches) = product_with_batch("p1", 10, "B1");
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();

        let err = cart.toggle_wholesale(0).unwrap_err();
        assert!(matches!(err, CartError::NoWholesalePrice { .. }));
        assert_eq!(cart.lines[0].price_mode, PriceMode::Unit);
    }

    #[test]
    fn test_variable_price_override_and_restore() {
        let (product, batches) = product_with_batch("p1", 10, "B1");
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();

        cart.set_variable_price(0, 500).unwrap();
        assert_eq!(cart.lines[0].price_mode, PriceMode::Variable);
        assert_eq!(cart.lines[0].effective_unit_price().cents(), 500);

        // Second override must not clobber the remembered prior mode.
        cart.set_variable_price(0, 600).unwrap();
        assert_eq!(cart.lines[0].effective_unit_price().cents(), 600);

        cart.clear_variable_price(0).unwrap();
        assert_eq!(cart.lines[0].price_mode, PriceMode::Unit);
        assert_eq!(cart.lines[0].effective_unit_price().cents(), 1180);
    }

    #[test]
    fn test_remove_item() {
        let (product, batches) = product_with_batch("p1", 10, "B1");
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();

        let removed = cart.remove_item(0).unwrap();
        assert_eq!(removed.product_id, "p1");
        assert!(cart.is_empty());

        assert!(matches!(
            cart.remove_item(0),
            Err(CartError::LineNotFound { index: 0 })
        ));
    }

    /// One line S/ 11.80 × 10 with a 10% discount → base 90.00,
    /// IGV 16.20, total 106.20.
    #[test]
    fn test_totals_scenario_c() {
        let (product, batches) = product_with_batch("p1", 20, "B1");
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();
        cart.set_quantity(0, 10, &others).unwrap();

        let before = cart.totals();
        assert_eq!(before.subtotal_base_cents, 10_000); // S/ 100.00
        assert_eq!(before.igv_cents, 1_800);
        assert_eq!(before.total_cents, 11_800);

        cart.set_discount(Discount::Percentage { bps: 1000 }).unwrap();
        let totals = cart.totals();
        assert_eq!(totals.discount_base_cents, 1_000); // S/ 10.00
        assert_eq!(totals.subtotal_base_cents, 9_000); // S/ 90.00
        assert_eq!(totals.igv_cents, 1_620); // S/ 16.20
        assert_eq!(totals.total_cents, 10_620); // S/ 106.20
    }

    /// Rounding idempotence: reapplying the same discount twice must equal
    /// the single-application result.
    #[test]
    fn test_discount_rounding_idempotence() {
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        for (id, code, price) in [("p1", "B1", 333), ("p2", "B2", 777), ("p3", "B3", 1299)] {
            let (mut product, batches) = product_with_batch(id, 10, code);
            product.unit_price_cents = price;
            cart.add_item(&product, &batches, code, false, &others)
                .unwrap();
            cart.set_quantity(cart.line_count() - 1, 3, &others).unwrap();
        }

        cart.set_discount(Discount::Percentage { bps: 1550 }).unwrap();
        let once = cart.totals();

        cart.set_discount(Discount::Percentage { bps: 1550 }).unwrap();
        let twice = cart.totals();

        assert_eq!(once, twice);
    }

    /// The last line absorbs the allocation residual so the allocated total
    /// equals the discount base exactly.
    #[test]
    fn test_discount_allocation_residual_on_last_line() {
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        // Three lines with bases that do not divide evenly.
        for (id, code, price) in [("p1", "B1", 118), ("p2", "B2", 118), ("p3", "B3", 118)] {
            let (mut product, batches) = product_with_batch(id, 10, code);
            product.unit_price_cents = price;
            cart.add_item(&product, &batches, code, false, &others)
                .unwrap();
        }
        // Bases: 100 + 100 + 100 = 300; 10% → 30, splits 10/10/10.
        // 33.33% → 999.9/10000·300 = 100 (rounded), splits 33/33/34.
        cart.set_discount(Discount::Percentage { bps: 3333 }).unwrap();
        let totals = cart.totals();

        assert_eq!(totals.discount_base_cents, 100);
        assert_eq!(totals.subtotal_base_cents, 200);
    }

    /// A near-total fixed discount over skewed bases: the residual the last
    /// line would absorb exceeds its base, so the overflow spills to the
    /// line before it instead of driving an adjusted base negative.
    #[test]
    fn test_discount_residual_spills_when_last_base_too_small() {
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        // Bases 1000 + 1000 + 10 = 2010.
        for (id, code, price) in [("p1", "B1", 1180), ("p2", "B2", 1180), ("p3", "B3", 12)] {
            let (mut product, batches) = product_with_batch(id, 10, code);
            product.unit_price_cents = price;
            cart.add_item(&product, &batches, code, false, &others)
                .unwrap();
        }

        // Fixed S/ 23.66 → pre-tax equivalent 2005. Floor shares are
        // 997/997/9; the residual of 2 exceeds the last line's headroom of
        // 1, so one céntimo spills to the second line: shares 997/998/10,
        // adjusted bases 3/2/0.
        cart.set_discount(Discount::Fixed { cents: 2366 }).unwrap();
        let totals = cart.totals();

        assert_eq!(totals.discount_base_cents, 2005);
        assert_eq!(totals.subtotal_base_cents, 5);
        assert_eq!(totals.igv_cents, 1);
        assert_eq!(totals.total_cents, 6);
    }

    #[test]
    fn test_fixed_discount_is_tax_inclusive() {
        let (product, batches) = product_with_batch("p1", 20, "B1");
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();
        cart.set_quantity(0, 10, &others).unwrap();

        // S/ 11.80 fixed → pre-tax equivalent S/ 10.00.
        cart.set_discount(Discount::Fixed { cents: 1180 }).unwrap();
        let totals = cart.totals();
        assert_eq!(totals.discount_base_cents, 1_000);
        assert_eq!(totals.subtotal_base_cents, 9_000);
        assert_eq!(totals.total_cents, 10_620);
    }

    #[test]
    fn test_discount_bounds() {
        let (product, batches) = product_with_batch("p1", 10, "B1");
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();
        // Total: S/ 11.80.

        assert!(matches!(
            cart.set_discount(Discount::Percentage { bps: 10_001 }),
            Err(CartError::DiscountPercentTooLarge { bps: 10_001 })
        ));
        assert!(matches!(
            cart.set_discount(Discount::Fixed { cents: 1181 }),
            Err(CartError::DiscountExceedsTotal { .. })
        ));
        assert!(matches!(
            cart.set_discount(Discount::Fixed { cents: 0 }),
            Err(CartError::InvalidDiscount { .. })
        ));
        assert!(cart.discount.is_none());

        cart.set_discount(Discount::Fixed { cents: 1180 }).unwrap();
        assert!(cart.discount.is_some());
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let cart = Cart::new();
        let totals = cart.totals();
        assert_eq!(totals.total_cents, 0);
        assert_eq!(totals.subtotal_base_cents, 0);
        assert_eq!(totals.igv_cents, 0);
    }

    #[test]
    fn test_clear_resets_everything() {
        let (product, batches) = product_with_batch("p1", 10, "B1");
        let others = OtherCarts::none();
        let mut cart = Cart::new();
        cart.add_item(&product, &batches, "B1", false, &others)
            .unwrap();
        cart.notes = Some("sin ají".to_string());
        cart.set_discount(Discount::Percentage { bps: 500 }).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.notes.is_none());
        assert!(cart.discount.is_none());
    }
}
