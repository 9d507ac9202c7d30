//! # Coupon Discount Calculator
//!
//! Turns a coupon definition and a base amount into a discount, or a
//! rejection reason.
//!
//! ## Checks (in order)
//! ```text
//! active? ──no──► Inactive
//!    │
//! now < valid_from? ──yes──► NotYetValid
//!    │
//! now > valid_until? ──yes──► Expired
//!    │
//! usage_count >= usage_limit? ──yes──► UsageExhausted   (skipped when the
//!    │                                                   booking already
//!    ▼                                                   holds a usage)
//! percentage: base × value / 100   (HalfUp to minor units)
//! fixed:      min(value, base)
//! ```
//!
//! The calculator reads `usage_count` but never writes it; only the
//! database ledger moves the counter.

use chrono::{DateTime, Utc};

use crate::error::CouponRejection;
use crate::money::{Money, RoundingMode};
use crate::types::{Coupon, CouponKind};

/// Whether the remaining-usage constraint applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageCheck {
    /// A new association: the coupon must have a use left.
    Enforce,
    /// The booking being re-priced already holds one counted use.
    AlreadyCounted,
}

/// Pure coupon pricing.
#[derive(Debug, Clone, Copy)]
pub struct CouponDiscountCalculator {
    rounding: RoundingMode,
}

impl Default for CouponDiscountCalculator {
    fn default() -> Self {
        CouponDiscountCalculator {
            rounding: RoundingMode::HalfUp,
        }
    }
}

impl CouponDiscountCalculator {
    /// Calculator rounding percentage discounts with `rounding`.
    pub fn new(rounding: RoundingMode) -> Self {
        CouponDiscountCalculator { rounding }
    }

    /// Checks the coupon at `now` and prices it against `base_amount`.
    ///
    /// ## Returns
    /// * `Ok(Money)` - discount, never above `base_amount`
    /// * `Err(CouponRejection)` - why the coupon contributes nothing
    pub fn calculate(
        &self,
        coupon: &Coupon,
        base_amount: Money,
        now: DateTime<Utc>,
        usage: UsageCheck,
    ) -> Result<Money, CouponRejection> {
        if !coupon.is_active {
            return Err(CouponRejection::Inactive);
        }

        if coupon.valid_from.is_some_and(|from| now < from) {
            return Err(CouponRejection::NotYetValid);
        }

        if coupon.valid_until.is_some_and(|until| now > until) {
            return Err(CouponRejection::Expired);
        }

        if usage == UsageCheck::Enforce && coupon.is_exhausted() {
            return Err(CouponRejection::UsageExhausted);
        }

        let base = base_amount.max(Money::zero());
        let discount = match coupon.kind {
            CouponKind::Percentage => base.apply_rate(coupon.rate(), self.rounding),
            CouponKind::Fixed => coupon.fixed_amount().max(Money::zero()),
        };

        Ok(discount.min(base))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(kind: CouponKind, value: i64) -> Coupon {
        let created = Utc::now() - Duration::days(30);
        Coupon {
            id: "cpn".to_string(),
            code: "CODE".to_string(),
            kind,
            value,
            usage_limit: None,
            usage_count: 0,
            valid_from: None,
            valid_until: None,
            is_active: true,
            created_at: created,
            updated_at: created,
        }
    }

    fn calc(c: &Coupon, base: i64) -> Result<Money, CouponRejection> {
        CouponDiscountCalculator::default().calculate(c, Money::from_minor(base), Utc::now(), UsageCheck::Enforce)
    }

    #[test]
    fn test_percentage_coupon() {
        let c = coupon(CouponKind::Percentage, 2000);
        assert_eq!(calc(&c, 3500).unwrap().minor(), 700);

        // 12.5% of 0.99 = 0.12375 → 0.12
        let c = coupon(CouponKind::Percentage, 1250);
        assert_eq!(calc(&c, 99).unwrap().minor(), 12);

        // 15% of 0.50 = 0.075 → 0.08
        let c = coupon(CouponKind::Percentage, 1500);
        assert_eq!(calc(&c, 50).unwrap().minor(), 8);
    }

    #[test]
    fn test_fixed_coupon_capped_at_base() {
        let c = coupon(CouponKind::Fixed, 5000);
        assert_eq!(calc(&c, 3500).unwrap().minor(), 3500);
        assert_eq!(calc(&c, 9000).unwrap().minor(), 5000);
    }

    #[test]
    fn test_rejections() {
        let now = Utc::now();

        let mut c = coupon(CouponKind::Fixed, 500);
        c.is_active = false;
        assert_eq!(calc(&c, 1000), Err(CouponRejection::Inactive));

        let mut c = coupon(CouponKind::Fixed, 500);
        c.valid_from = Some(now + Duration::hours(1));
        assert_eq!(calc(&c, 1000), Err(CouponRejection::NotYetValid));

        let mut c = coupon(CouponKind::Fixed, 500);
        c.valid_until = Some(now - Duration::hours(1));
        assert_eq!(calc(&c, 1000), Err(CouponRejection::Expired));

        let mut c = coupon(CouponKind::Fixed, 500);
        c.usage_limit = Some(2);
        c.usage_count = 2;
        assert_eq!(calc(&c, 1000), Err(CouponRejection::UsageExhausted));
    }

    #[test]
    fn test_inactive_reported_before_window() {
        let mut c = coupon(CouponKind::Fixed, 500);
        c.is_active = false;
        c.valid_until = Some(Utc::now() - Duration::days(1));
        assert_eq!(calc(&c, 1000), Err(CouponRejection::Inactive));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let now = Utc::now();
        let mut c = coupon(CouponKind::Fixed, 500);
        c.valid_from = Some(now);
        c.valid_until = Some(now);

        let discount = CouponDiscountCalculator::default().calculate(&c, Money::from_minor(1000), now, UsageCheck::Enforce);
        assert_eq!(discount, Ok(Money::from_minor(500)));
    }

    #[test]
    fn test_already_counted_usage_skips_exhaustion() {
        let mut c = coupon(CouponKind::Percentage, 1000);
        c.usage_limit = Some(1);
        c.usage_count = 1;

        let discount = CouponDiscountCalculator::default().calculate(
            &c,
            Money::from_minor(2000),
            Utc::now(),
            UsageCheck::AlreadyCounted,
        );
        assert_eq!(discount, Ok(Money::from_minor(200)));
    }

    #[test]
    fn test_zero_limit_is_exhausted_immediately() {
        let mut c = coupon(CouponKind::Fixed, 100);
        c.usage_limit = Some(0);
        assert_eq!(calc(&c, 1000), Err(CouponRejection::UsageExhausted));
    }
}
