//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every amount is an i64 count of minor units (pence).                  │
//! │                                                                         │
//! │    "35.00"  ──parse_decimal──►  Money(3500)                            │
//! │    Money(3500) × 3333 bps  ──apply_rate──►  Money(1166)  (Down)        │
//! │    Money(1166)  ──to_decimal_string──►  "11.66"                        │
//! │                                                                         │
//! │  Decimal strings exist only at the boundary. Arithmetic is integer.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use booking_core::money::{Money, Rate, RoundingMode};
//!
//! let base = Money::parse_decimal("35.00").unwrap();
//! let coupon = base.apply_rate(Rate::from_bps(2000), RoundingMode::HalfUp);
//! assert_eq!(coupon.to_decimal_string(), "7.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

/// Minor units per major unit (pence per pound).
pub const MINOR_PER_MAJOR: i64 = 100;

/// Denominator of a [`Rate`]: 10000 bps = 100%.
pub const BPS_DENOMINATOR: i64 = 10_000;

// =============================================================================
// Rounding
// =============================================================================

/// How a fractional minor unit is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round half away from zero: 0.5 → 1, 1.49 → 1.
    #[default]
    HalfUp,
    /// Truncate toward zero: 1.99 → 1.
    Down,
}

/// Divides `numerator` by a positive `denominator` using `mode`.
fn divide_rounded(numerator: i128, denominator: i128, mode: RoundingMode) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    match mode {
        RoundingMode::Down => quotient,
        RoundingMode::HalfUp => {
            if remainder.abs() * 2 >= denominator {
                quotient + numerator.signum()
            } else {
                quotient
            }
        }
    }
}

// =============================================================================
// Rate
// =============================================================================

/// A multiplier expressed in basis points (1 bps = 1/10000).
///
/// 3333 bps = 0.3333, 2000 bps = 20%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate differences may be negative; the pricing
///   code is responsible for never persisting a negative final amount
/// - **Transparent in SQLite**: stored as a plain INTEGER column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use booking_core::money::Money;
    ///
    /// let price = Money::from_minor(2000); // £20.00
    /// assert_eq!(price.minor(), 2000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
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

    /// Multiplies a unit price by a quantity, `None` on overflow.
    ///
    /// ```rust
    /// use booking_core::money::Money;
    ///
    /// let unit = Money::from_minor(500);
    /// assert_eq!(unit.checked_mul_quantity(3), Some(Money::from_minor(1500)));
    /// assert_eq!(Money::from_minor(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Applies a rate and resolves the fractional minor unit with `mode`.
    ///
    /// ## Implementation
    /// `amount × bps / 10000` in i128, one rounding step at the end. Rates
    /// above 100% can exceed the i64 range; the result saturates.
    ///
    /// ```rust
    /// use booking_core::money::{Money, Rate, RoundingMode};
    ///
    /// let base = Money::from_minor(3500);
    /// // 35.00 × 0.3333 = 11.6655
    /// assert_eq!(base.apply_rate(Rate::from_bps(3333), RoundingMode::Down).minor(), 1166);
    /// assert_eq!(base.apply_rate(Rate::from_bps(3333), RoundingMode::HalfUp).minor(), 1167);
    /// ```
    pub fn apply_rate(&self, rate: Rate, mode: RoundingMode) -> Money {
        let scaled = self.0 as i128 * rate.bps() as i128;
        let rounded = divide_rounded(scaled, BPS_DENOMINATOR as i128, mode);
        Money(i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX }))
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }

    /// Subtracts `other`, flooring the result at zero.
    #[inline]
    pub fn saturating_sub_floor(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// Parses a decimal string such as `"20"`, `"20.5"` or `"19.999"`.
    ///
    /// ## Rules
    /// - optional leading `-`
    /// - at least one integer digit
    /// - more than two fractional digits round half-up to the minor unit
    ///
    /// ```rust
    /// use booking_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("35").unwrap().minor(), 3500);
    /// assert_eq!(Money::parse_decimal("11.665").unwrap().minor(), 1167);
    /// assert!(Money::parse_decimal("abc").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected digits before the decimal point"));
        }
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected digits after the decimal point"));
        }

        let whole: i64 = whole
            .parse()
            .map_err(|_| invalid("amount is too large"))?;

        let digits: Vec<i64> = fraction
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(i64::from)
            .collect();
        let tenths = digits.first().copied().unwrap_or(0);
        let hundredths = digits.get(1).copied().unwrap_or(0);
        let round_up = digits.get(2).is_some_and(|d| *d >= 5);

        let minor = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -minor } else { minor }))
    }

    /// Formats as a plain two-decimal string (`"23.34"`).
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!(
            "{}{}.{:02}",
            sign,
            abs / MINOR_PER_MAJOR as u64,
            abs % MINOR_PER_MAJOR as u64
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("20.00").unwrap().minor(), 2000);
        assert_eq!(Money::parse_decimal("5").unwrap().minor(), 500);
        assert_eq!(Money::parse_decimal("0.5").unwrap().minor(), 50);
        assert_eq!(Money::parse_decimal(" 12.34 ").unwrap().minor(), 1234);
        assert_eq!(Money::parse_decimal("-5.50").unwrap().minor(), -550);
    }

    #[test]
    fn test_parse_decimal_rounds_half_up() {
        assert_eq!(Money::parse_decimal("11.665").unwrap().minor(), 1167);
        assert_eq!(Money::parse_decimal("11.6649").unwrap().minor(), 1166);
        assert_eq!(Money::parse_decimal("0.995").unwrap().minor(), 100);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal(".50").is_err());
        assert!(Money::parse_decimal("1.2.3").is_err());
        assert!(Money::parse_decimal("£5").is_err());
        assert!(Money::parse_decimal("99999999999999999999").is_err());
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_minor(2334).to_decimal_string(), "23.34");
        assert_eq!(Money::from_minor(5).to_decimal_string(), "0.05");
        assert_eq!(Money::from_minor(-550).to_decimal_string(), "-5.50");
        assert_eq!(format!("{}", Money::zero()), "0.00");
    }

    #[test]
    fn test_apply_rate_rounding_modes() {
        let base = Money::from_minor(3500);
        let third = Rate::from_bps(3333);
        assert_eq!(base.apply_rate(third, RoundingMode::Down).minor(), 1166);
        assert_eq!(base.apply_rate(third, RoundingMode::HalfUp).minor(), 1167);

        // exact tie: 0.05 × 50% = 0.025
        let tie = Money::from_minor(5).apply_rate(Rate::from_bps(5000), RoundingMode::HalfUp);
        assert_eq!(tie.minor(), 3);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let total: Money = [2000, 1500].into_iter().map(Money::from_minor).sum();
        assert_eq!(total.minor(), 3500);
        assert_eq!((total - Money::from_minor(1166)).minor(), 2334);
        assert_eq!(Money::from_minor(100).saturating_sub_floor(Money::from_minor(300)), Money::zero());
        assert_eq!(Money::from_minor(700).min(Money::from_minor(300)).minor(), 300);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let unit = Money::from_minor(i64::MAX / 100);
        assert_eq!(unit.checked_mul_quantity(100).map(|m| m.minor()), Some(i64::MAX / 100 * 100));
        assert_eq!(unit.checked_mul_quantity(200), None);
        assert_eq!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)), None);
        assert_eq!(Money::from_minor(1).checked_add(Money::from_minor(2)), Some(Money::from_minor(3)));
    }

    #[test]
    fn test_apply_rate_saturates_above_full_rate() {
        let huge = Money::from_minor(i64::MAX);
        assert_eq!(huge.apply_rate(Rate::from_bps(20_000), RoundingMode::Down).minor(), i64::MAX);
        assert_eq!(
            Money::from_minor(i64::MIN).apply_rate(Rate::from_bps(20_000), RoundingMode::Down).minor(),
            i64::MIN
        );
        assert_eq!(
            Money::from_minor(i64::MIN).saturating_sub_floor(Money::from_minor(1)),
            Money::zero()
        );
    }

    #[test]
    fn test_rate_percentage() {
        assert!((Rate::from_bps(3333).percentage() - 33.33).abs() < 0.001);
    }
}
