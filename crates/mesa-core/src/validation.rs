//! # Validation Module
//!
//! Input validation utilities for Mesa POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Validation Layers                             │
//! │                                                                     │
//! │  Layer 1: Frontend (TypeScript)                                     │
//! │  ├── Basic format checks (empty, length)                            │
//! │  └── Immediate user feedback                                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - business rule validation                    │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL / CHECK constraints                                   │
//! │  └── UNIQUE constraints (barcode codes, SKUs)                       │
//! │                                                                     │
//! │  Defense in depth: multiple layers catch different errors           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use mesa_core::validation::validate_sku;
///
/// assert!(validate_sku("GASEOSA-500").is_ok());
/// assert!(validate_sku("").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a barcode code.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters
/// - No whitespace (a scanned code never contains spaces; one here means a
///   mis-keyed manual entry)
pub fn validate_barcode_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 64,
        });
    }

    if code.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a customer document number against its type.
///
/// DNI: 8 digits. RUC: 11 digits.
pub fn validate_customer_doc(doc_type: crate::types::CustomerDocType, number: &str) -> ValidationResult<()> {
    use crate::types::CustomerDocType;

    let number = number.trim();
    let expected = match doc_type {
        CustomerDocType::Dni => 8,
        CustomerDocType::Ruc => 11,
    };

    if number.len() != expected || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "doc_number".to_string(),
            reason: format!("must be exactly {} digits", expected),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value (≥ 1; the availability ceiling is enforced
/// separately by the cart against the Reservation Tracker).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in céntimos (non-negative; zero allowed for free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerDocType;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("GASEOSA-500").is_ok());
        assert!(validate_sku("ABC123").is_ok());
        assert!(validate_sku("producto_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_barcode_code() {
        assert!(validate_barcode_code("7750182001234").is_ok());
        assert!(validate_barcode_code("B1").is_ok());

        assert!(validate_barcode_code("").is_err());
        assert!(validate_barcode_code("with space").is_err());
        assert!(validate_barcode_code(&"9".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Inca Kola 500ml").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_customer_doc() {
        assert!(validate_customer_doc(CustomerDocType::Dni, "12345678").is_ok());
        assert!(validate_customer_doc(CustomerDocType::Ruc, "20123456789").is_ok());

        assert!(validate_customer_doc(CustomerDocType::Dni, "1234567").is_err());
        assert!(validate_customer_doc(CustomerDocType::Ruc, "2012345678").is_err());
        assert!(validate_customer_doc(CustomerDocType::Dni, "1234567a").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
