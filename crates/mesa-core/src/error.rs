//! # Error Types
//!
//! Domain-specific error types for mesa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                │
//! │                                                                     │
//! │  mesa-core errors (this file)                                       │
//! │  ├── CartError        - Rejected cart mutations (shown as toasts)   │
//! │  ├── ValidationError  - Input validation failures                   │
//! │  └── CoreError        - General domain errors                       │
//! │                                                                     │
//! │  mesa-store errors (separate crate)                                 │
//! │  └── StoreError       - Persistence failures, version conflicts     │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError, CartError → notification;       │
//! │        no error in this crate is ever fatal to the process          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, available, requested)
//! 3. Errors are enum variants, never String
//! 4. A rejected mutation leaves the cart untouched; the message is what
//!    the operator sees in the transient notification

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Rejected cart mutations.
///
/// Validation rejections and availability conflicts:
/// the mutation is refused, cart state is left unchanged, and the caller
/// surfaces the message as a transient notification. Never a panic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// No barcode could be resolved for the product being added.
    ///
    /// ## When This Occurs
    /// - Product has no recorded batches and its stock is zero, so even the
    ///   SKU-fallback batch is empty
    #[error("No barcode available for {sku}")]
    NoBarcode { sku: String },

    /// Requested quantity exceeds the computed availability ceiling.
    ///
    /// ## User Workflow
    /// ```text
    /// Scan "B1" (batch qty 5, 3 reserved on mesa 4)
    ///      │
    ///      ▼
    /// availability = 2; cart already holds 2
    ///      │
    ///      ▼
    /// InsufficientStock { code: "B1", available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Only 2 units of B1 available"
    /// ```
    #[error("Insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Quantity below the minimum of 1.
    #[error("Quantity must be at least 1, got {requested}")]
    QuantityBelowMinimum { requested: i64 },

    /// Line index does not exist in the cart.
    #[error("No cart line at index {index}")]
    LineNotFound { index: usize },

    /// Wholesale toggle requested on a product with no wholesale price.
    #[error("{name} has no wholesale price configured")]
    NoWholesalePrice { name: String },

    /// No manual price override to restore.
    #[error("Line {index} has no manual price override")]
    NoManualPrice { index: usize },

    /// Fixed discount larger than the current cart total.
    #[error("Discount {discount} exceeds cart total {total}")]
    DiscountExceedsTotal { discount: String, total: String },

    /// Percentage discount above 100%.
    #[error("Discount percentage cannot exceed 100%, got {bps} bps")]
    DiscountPercentTooLarge { bps: u32 },

    /// Discount value is malformed (negative or zero fixed amount).
    #[error("Invalid discount: {reason}")]
    InvalidDiscount { reason: String },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Operation requires a non-empty cart.
    #[error("Cart is empty")]
    EmptyCart,
}

// =============================================================================
// Core Error
// =============================================================================

/// General domain errors outside the cart mutation path.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the ledger cache.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Rejected cart mutation (wraps CartError).
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid barcode characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate barcode code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for cart mutation results.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_messages() {
        let err = CartError::InsufficientStock {
            code: "775012345".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for 775012345: available 2, requested 3"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::OutOfRange {
            field: "table".to_string(),
            min: 1,
            max: 15,
        };
        assert_eq!(err.to_string(), "table must be between 1 and 15");
    }

    #[test]
    fn test_cart_error_converts_to_core_error() {
        let cart_err = CartError::EmptyCart;
        let core_err: CoreError = cart_err.into();
        assert!(matches!(core_err, CoreError::Cart(_)));
    }
}
