//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In JavaScript/floating point:                                      │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  On an invoice, a one-céntimo drift between the cart total and the  │
//! │  tax authority's recomputation is a rejected document.              │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Céntimos                                     │
//! │    S/ 11.80 = 1180 céntimos; every rounding step is explicit        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tax-Inclusive Pricing
//! Every price in the system is IGV-inclusive (Peru model). The pre-tax
//! "gravada" base is *derived* from the inclusive price, never stored:
//! `base = round2(inclusive / 1.18)`. The rounding is half-up, implemented
//! with the integer idiom `(a * k + half) / den`, and replicated here exactly
//! because the invoicing backend recomputes the same figures - any deviation
//! shows up as an invoice-total discrepancy.
//!
//! ## Usage
//! ```rust
//! use mesa_core::money::Money;
//!
//! let price = Money::from_cents(1180); // S/ 11.80 inclusive
//! let base = price.base_from_inclusive();
//! assert_eq!(base.cents(), 1000);      // S/ 10.00
//! assert_eq!(base.igv_on_base().cents(), 180); // S/ 1.80
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::IGV_BPS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in céntimos (hundredths of a sol).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for discounts and corrections
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from céntimos (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // S/ 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in céntimos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-soles portion.
    #[inline]
    pub const fn soles(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the céntimos portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Derives the pre-tax ("gravada") base from a tax-inclusive amount.
    ///
    /// `round2(inclusive / 1.18)`, half-up. Integer form:
    /// `(cents * 100 + 59) / 118` (59 is half of 118, rounded up so .5 goes up).
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1180).base_from_inclusive().cents(), 1000);
    /// assert_eq!(Money::from_cents(100).base_from_inclusive().cents(), 85);
    /// ```
    pub fn base_from_inclusive(&self) -> Money {
        // i128 to prevent overflow on large carts
        let base = (self.0 as i128 * 100 + 59) / 118;
        Money::from_cents(base as i64)
    }

    /// Computes IGV on a pre-tax base: `round2(base × 0.18)`, half-up.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(9000).igv_on_base().cents(), 1620);
    /// ```
    pub fn igv_on_base(&self) -> Money {
        let igv = (self.0 as i128 * IGV_BPS as i128 + 5000) / 10000;
        Money::from_cents(igv as i64)
    }

    /// Computes a percentage of this amount, half-up rounded to céntimos.
    ///
    /// ## Arguments
    /// * `bps` - Percentage in basis points (1000 = 10%)
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(10000); // S/ 100.00
    /// assert_eq!(subtotal.percent_of(1000).cents(), 1000); // 10% = S/ 10.00
    /// ```
    pub fn percent_of(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(part as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_core::money::Money;
    ///
    /// let unit = Money::from_cents(299); // S/ 2.99
    /// assert_eq!(unit.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. The frontend does its own formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}S/ {}.{:02}", sign, self.soles().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.soles(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "S/ 10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "S/ 5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-S/ 5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "S/ 0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_base_from_inclusive_exact() {
        // S/ 11.80 / 1.18 = S/ 10.00 exactly
        assert_eq!(Money::from_cents(1180).base_from_inclusive().cents(), 1000);
    }

    #[test]
    fn test_base_from_inclusive_rounds_half_up() {
        // 100 / 1.18 = 84.745... → 85
        assert_eq!(Money::from_cents(100).base_from_inclusive().cents(), 85);
        // 59 / 1.18 = 50.0 exactly
        assert_eq!(Money::from_cents(59).base_from_inclusive().cents(), 50);
        // 177 / 1.18 = 150.0 exactly
        assert_eq!(Money::from_cents(177).base_from_inclusive().cents(), 150);
    }

    #[test]
    fn test_igv_on_base() {
        // S/ 90.00 × 18% = S/ 16.20
        assert_eq!(Money::from_cents(9000).igv_on_base().cents(), 1620);
        // S/ 10.00 × 18% = S/ 1.80
        assert_eq!(Money::from_cents(1000).igv_on_base().cents(), 180);
        // 3 × 18% = 0.54 → 1 (half-up)
        assert_eq!(Money::from_cents(3).igv_on_base().cents(), 1);
    }

    #[test]
    fn test_percent_of() {
        let subtotal = Money::from_cents(10000);
        assert_eq!(subtotal.percent_of(1000).cents(), 1000); // 10%
        assert_eq!(subtotal.percent_of(50).cents(), 50); // 0.5%
        // 999 × 10% = 99.9 → 100 (half-up)
        assert_eq!(Money::from_cents(999).percent_of(1000).cents(), 100);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        assert_eq!(Money::from_cents(299).multiply_quantity(3).cents(), 897);
    }

    /// Base-then-IGV must reconstruct the inclusive price for exact amounts.
    #[test]
    fn test_inclusive_round_trip_exact_amounts() {
        for cents in [118, 590, 1180, 2360, 11800] {
            let inclusive = Money::from_cents(cents);
            let base = inclusive.base_from_inclusive();
            assert_eq!((base + base.igv_on_base()).cents(), cents);
        }
    }
}
