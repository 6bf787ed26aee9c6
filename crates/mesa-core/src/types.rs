//! # Domain Types
//!
//! Core domain types used throughout Mesa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐    │
//! │  │    Product      │   │  BarcodeBatch   │   │    Discount     │    │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │    │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  Percentage     │    │
//! │  │  sku (business) │   │  product_id(FK) │   │  Fixed          │    │
//! │  │  3 price fields │   │  code (unique)  │   └─────────────────┘    │
//! │  │  stock (server) │   │  quantity       │                          │
//! │  └─────────────────┘   └─────────────────┘                          │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐    │
//! │  │   TableNumber   │   │    PriceMode    │   │  PaymentMethod  │    │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │    │
//! │  │  1..=15         │   │  Unit           │   │  Cash           │    │
//! │  └─────────────────┘   │  Wholesale      │   │  Card           │    │
//! │                        │  Promotional    │   │  Transfer       │    │
//! │  ┌─────────────────┐   │  Variable       │   │  Yape           │    │
//! │  │     CartId      │   └─────────────────┘   └─────────────────┘    │
//! │  │  Table | Local  │                                                │
//! │  └─────────────────┘                                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every stored entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, barcode code, table number) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{TABLE_MAX, TABLE_MIN};

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// All prices are IGV-inclusive céntimos. `stock` is server-owned: it is
/// mutated only by server-side sale/void operations and reaches this type as
/// a read-only cache value, never written back by the client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, also the code of the
    /// synthesized fallback batch when no barcodes are recorded.
    pub sku: String,

    /// Display name shown on the sales grid and the ticket.
    pub name: String,

    /// Regular unit price, IGV-inclusive céntimos.
    pub unit_price_cents: i64,

    /// Optional wholesale ("mayorista") price, IGV-inclusive céntimos.
    /// Zero and None both mean "not configured".
    pub wholesale_price_cents: Option<i64>,

    /// Optional promotional price, IGV-inclusive céntimos.
    pub promo_price_cents: Option<i64>,

    /// Authoritative stock level. Server-owned.
    pub stock: i64,

    /// Category reference.
    pub category_id: Option<String>,

    /// Image reference (object-storage key or URL), display only.
    pub image_ref: Option<String>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the regular unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the wholesale price, treating zero as "not configured".
    pub fn wholesale_price(&self) -> Option<Money> {
        match self.wholesale_price_cents {
            Some(cents) if cents > 0 => Some(Money::from_cents(cents)),
            _ => None,
        }
    }

    /// Returns the promotional price, treating zero as "not configured".
    pub fn promo_price(&self) -> Option<Money> {
        match self.promo_price_cents {
            Some(cents) if cents > 0 => Some(Money::from_cents(cents)),
            _ => None,
        }
    }
}

// =============================================================================
// Barcode Batch
// =============================================================================

/// A quantity-bearing unit record attached to a product, addressable by a
/// scannable code. Codes are unique across **all** products.
///
/// The sum of batch quantities for a product *should* equal the product's
/// `stock`, but nothing enforces that transactionally; the gap is surfaced by
/// [`crate::reconcile::StockAudit`], never silently corrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BarcodeBatch {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product this batch belongs to.
    pub product_id: String,

    /// Scannable code, globally unique.
    pub code: String,

    /// Quantity on hand in this batch.
    pub quantity: i64,

    /// When the batch was recorded.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Price Mode
// =============================================================================

/// Which price variant a cart line is currently using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    /// Regular unit price.
    Unit,
    /// Wholesale price.
    Wholesale,
    /// Promotional price.
    Promotional,
    /// Manually overridden price (manager/admin only; role enforced by the
    /// caller, not this crate).
    Variable,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Bank transfer.
    Transfer,
    /// Yape mobile wallet.
    Yape,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Electronic Document
// =============================================================================

/// Kind of document issued for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Internal ticket, not submitted to the tax authority.
    Ticket,
    /// Boleta de venta electrónica (consumer receipt).
    Boleta,
    /// Factura electrónica (business invoice, requires RUC).
    Factura,
}

/// Customer tax-id document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerDocType {
    /// National identity document (8 digits).
    Dni,
    /// Tax registration number (11 digits), required for facturas.
    Ruc,
}

/// Customer record attached to a boleta/factura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub doc_type: CustomerDocType,
    pub doc_number: String,
    pub name: String,
    pub address: Option<String>,
}

/// Document selection for a cart: what to issue and for whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub kind: DocumentKind,
    pub customer: Option<Customer>,
}

// =============================================================================
// Discount
// =============================================================================

/// Cart-level discount.
///
/// Percentage discounts apply against the **pre-tax** subtotal. Fixed
/// discounts are specified in tax-inclusive céntimos and converted to a
/// pre-tax equivalent by dividing by 1.18 (see `Cart::totals`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the pre-tax subtotal, in basis points (1000 = 10%).
    Percentage { bps: u32 },
    /// Fixed amount in tax-inclusive céntimos.
    Fixed { cents: i64 },
}

// =============================================================================
// Table Number
// =============================================================================

/// A numbered "mesa" in the dining room, 1..=15.
///
/// The backend-persisted Multi-Cart Store keys snapshots by this number;
/// ad-hoc carts use [`CartId::Local`] instead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct TableNumber(u8);

impl TableNumber {
    /// Creates a table number, rejecting values outside 1..=15.
    pub fn new(n: u8) -> Result<Self, ValidationError> {
        if !(TABLE_MIN..=TABLE_MAX).contains(&n) {
            return Err(ValidationError::OutOfRange {
                field: "table".to_string(),
                min: TABLE_MIN as i64,
                max: TABLE_MAX as i64,
            });
        }
        Ok(TableNumber(n))
    }

    /// Returns the raw table number.
    #[inline]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for TableNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mesa {}", self.0)
    }
}

// =============================================================================
// Cart Identity
// =============================================================================

/// Identity of a cart: a stable table number for the backend-persisted
/// variant, or an ephemeral client-side id for legacy "saved carts".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CartId {
    Table(TableNumber),
    Local(String),
}

impl std::fmt::Display for CartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartId::Table(t) => write!(f, "{}", t),
            CartId::Local(id) => write!(f, "local:{}", id),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_number_range() {
        assert!(TableNumber::new(1).is_ok());
        assert!(TableNumber::new(15).is_ok());
        assert!(TableNumber::new(0).is_err());
        assert!(TableNumber::new(16).is_err());
    }

    #[test]
    fn test_wholesale_price_zero_means_unset() {
        let mut product = test_product();
        product.wholesale_price_cents = Some(0);
        assert!(product.wholesale_price().is_none());

        product.wholesale_price_cents = Some(900);
        assert_eq!(product.wholesale_price().unwrap().cents(), 900);
    }

    #[test]
    fn test_cart_id_display() {
        let table = CartId::Table(TableNumber::new(7).unwrap());
        assert_eq!(table.to_string(), "mesa 7");
        assert_eq!(CartId::Local("abc".into()).to_string(), "local:abc");
    }

    fn test_product() -> Product {
        Product {
            id: "p1".to_string(),
            sku: "SKU-1".to_string(),
            name: "Inca Kola 500ml".to_string(),
            unit_price_cents: 1180,
            wholesale_price_cents: None,
            promo_price_cents: None,
            stock: 10,
            category_id: None,
            image_ref: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
