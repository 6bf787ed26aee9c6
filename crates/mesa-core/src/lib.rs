//! # mesa-core: Pure Business Logic for Mesa POS
//!
//! This crate is the **heart** of the sales floor: the shopping-cart ("mesa")
//! bookkeeping, barcode-batch reservations and stock reconciliation that the
//! web frontend drives. All of it is pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Mesa POS Architecture                         │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                    Frontend (React SPA)                       │  │
//! │  │   Scan input ──► Cart UI ──► Table grid ──► Checkout dialog   │  │
//! │  └───────────────────────────────┬───────────────────────────────┘  │
//! │                                  │ REST / generated TS types        │
//! │  ┌───────────────────────────────▼───────────────────────────────┐  │
//! │  │                ★ mesa-core (THIS CRATE) ★                     │  │
//! │  │                                                               │  │
//! │  │  ┌────────┐ ┌────────┐ ┌─────────────┐ ┌───────────────────┐  │  │
//! │  │  │ money  │ │  cart  │ │ reservation │ │     reconcile     │  │  │
//! │  │  │ Money  │ │  Cart  │ │Availability │ │    StockAudit     │  │  │
//! │  │  │  IGV   │ │CartLine│ │ OtherCarts  │ │                   │  │  │
//! │  │  └────────┘ └────────┘ └─────────────┘ └───────────────────┘  │  │
//! │  │                                                               │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │  │
//! │  └───────────────────────────────┬───────────────────────────────┘  │
//! │                                  │                                  │
//! │  ┌───────────────────────────────▼───────────────────────────────┐  │
//! │  │                 mesa-store (Persistence Layer)                │  │
//! │  │     SQLite: table-cart snapshots, products, barcodes, sales   │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, BarcodeBatch, Discount, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`ledger`] - Client-side cache of stock and barcode batches
//! - [`reservation`] - Cross-cart availability computation
//! - [`cart`] - The cart aggregate and its mutations
//! - [`shelf`] - Local collection of saved cart snapshots
//! - [`reconcile`] - Stock-vs-batches consistency audit
//! - [`scan`] - Duplicate-scan suppression
//! - [`submission`] - Finalized cart → sale request DTO
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in céntimos (i64), prices tax-inclusive
//! 4. **Explicit Errors**: rejected mutations are typed errors, never panics;
//!    the UI shows them as transient notifications
//!
//! ## Example Usage
//!
//! ```rust
//! use mesa_core::money::Money;
//!
//! // S/ 11.80 tax-inclusive
//! let price = Money::from_cents(1180);
//!
//! // Pre-tax base at 18% IGV: S/ 10.00
//! assert_eq!(price.base_from_inclusive().cents(), 1000);
//!
//! // IGV on that base: S/ 1.80
//! assert_eq!(price.base_from_inclusive().igv_on_base().cents(), 180);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod ledger;
pub mod money;
pub mod reconcile;
pub mod reservation;
pub mod scan;
pub mod shelf;
pub mod submission;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use mesa_core::Money` instead of
// `use mesa_core::money::Money`.

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CartError, CoreError, ValidationError};
pub use ledger::InventoryLedger;
pub use money::Money;
pub use reconcile::StockAudit;
pub use reservation::{Availability, OtherCarts};
pub use shelf::{CartShelf, SavedCart};
pub use submission::{SaleLineRequest, SaleRequest};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// IGV (Peruvian VAT) rate in basis points: 18%.
///
/// ## Why a constant?
/// Every price in the system is tax-inclusive at this single rate; the
/// gravada base and the IGV line on a receipt are both derived from it.
/// A rate change is a legal event, not per-product configuration.
pub const IGV_BPS: u32 = 1800;

/// Lowest numbered table ("mesa") in the dining room.
pub const TABLE_MIN: u8 = 1;

/// Highest numbered table ("mesa") in the dining room.
///
/// Saved carts keyed by table number live in this fixed 1..=15 range;
/// ad-hoc carts use ephemeral string ids instead.
pub const TABLE_MAX: u8 = 15;

/// Maximum line items allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps snapshot payloads bounded.
pub const MAX_CART_LINES: usize = 100;

/// Default duplicate-scan suppression window, in milliseconds.
///
/// Hardware scanners reporting as keyboards routinely deliver the same code
/// two or three times within a few hundred milliseconds; repeats inside this
/// window are dropped as noise, not treated as errors.
pub const SCAN_DEDUP_WINDOW_MS: i64 = 800;
