//! # Discount Policy
//!
//! Combines the bulk discount and the coupon discount.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base_amount ──┬──► bulk   = base × 0.3333   (only if bulk_eligible)   │
//! │                │                                                        │
//! │                └──► coupon = calculator(coupon, base)                   │
//! │                                                                         │
//! │  Both are taken from the SAME base, never from a discounted remainder. │
//! │                                                                         │
//! │  Clamp: bulk + coupon > base  ──►  coupon = base - bulk                 │
//! │         so discount_amount = bulk + coupon <= base, final >= 0          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CouponRejection;
use crate::money::Money;
use crate::pricing::coupon::{CouponDiscountCalculator, UsageCheck};
use crate::pricing::policy::PricingPolicy;
use crate::types::Coupon;

/// What the caller found for the requested coupon code.
#[derive(Debug, Clone, Copy)]
pub enum CouponLookup<'a> {
    /// No code was supplied.
    NotRequested,
    /// A code was supplied but the repository has no such coupon.
    Missing { code: &'a str },
    /// The coupon definition for the supplied code.
    Found { coupon: &'a Coupon, usage: UsageCheck },
}

/// How the coupon part of a quote ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CouponOutcome {
    NotRequested,
    /// Accepted; the booking associates this coupon (even at zero discount).
    Applied { coupon_id: String, code: String },
    /// Advisory rejection; the quote carries no coupon discount.
    Rejected { code: String, reason: CouponRejection },
}

impl CouponOutcome {
    /// The accepted coupon's id.
    pub fn applied_coupon_id(&self) -> Option<&str> {
        match self {
            CouponOutcome::Applied { coupon_id, .. } => Some(coupon_id),
            _ => None,
        }
    }

    /// The advisory rejection reason, if any.
    pub fn rejection(&self) -> Option<CouponRejection> {
        match self {
            CouponOutcome::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// The two discount components after clamping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discounts {
    pub bulk_discount: Money,
    pub coupon_discount: Money,
    pub coupon: CouponOutcome,
}

impl Discounts {
    /// `bulk_discount + coupon_discount`.
    pub fn total(&self) -> Money {
        self.bulk_discount + self.coupon_discount
    }
}

/// Applies the configured bulk rule and delegates coupons to the calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountPolicy {
    policy: PricingPolicy,
}

impl DiscountPolicy {
    pub fn new(policy: PricingPolicy) -> Self {
        DiscountPolicy { policy }
    }

    /// Flat bulk discount: one application of the configured rate.
    pub fn bulk_discount(&self, base_amount: Money, bulk_eligible: bool) -> Money {
        if !bulk_eligible || !base_amount.is_positive() {
            return Money::zero();
        }

        base_amount
            .apply_rate(self.policy.bulk_discount_rate, self.policy.bulk_rounding)
            .min(base_amount)
    }

    /// Computes both discounts against `base_amount`.
    ///
    /// Coupon problems never fail this call; they come back as
    /// [`CouponOutcome::Rejected`].
    pub fn apply(
        &self,
        base_amount: Money,
        bulk_eligible: bool,
        coupon: CouponLookup<'_>,
        now: DateTime<Utc>,
    ) -> Discounts {
        let bulk_discount = self.bulk_discount(base_amount, bulk_eligible);
        let calculator = CouponDiscountCalculator::new(self.policy.coupon_rounding);

        let (coupon_discount, outcome) = match coupon {
            CouponLookup::NotRequested => (Money::zero(), CouponOutcome::NotRequested),
            CouponLookup::Missing { code } => (
                Money::zero(),
                CouponOutcome::Rejected {
                    code: code.to_string(),
                    reason: CouponRejection::NotFound,
                },
            ),
            CouponLookup::Found { coupon, usage } => {
                match calculator.calculate(coupon, base_amount, now, usage) {
                    Ok(discount) => (
                        discount,
                        CouponOutcome::Applied {
                            coupon_id: coupon.id.clone(),
                            code: coupon.code.clone(),
                        },
                    ),
                    Err(reason) => (
                        Money::zero(),
                        CouponOutcome::Rejected {
                            code: coupon.code.clone(),
                            reason,
                        },
                    ),
                }
            }
        };

        // The coupon absorbs any excess so the sum never passes the base.
        let headroom = base_amount.saturating_sub_floor(bulk_discount);

        Discounts {
            bulk_discount,
            coupon_discount: coupon_discount.min(headroom),
            coupon: outcome,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Rate, RoundingMode};
    use crate::types::CouponKind;

    fn coupon(kind: CouponKind, value: i64) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: "cpn-1".to_string(),
            code: "SAVE".to_string(),
            kind,
            value,
            usage_limit: Some(5),
            usage_count: 0,
            valid_from: None,
            valid_until: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_bulk_discount_scenario() {
        let policy = DiscountPolicy::default();
        assert_eq!(policy.bulk_discount(Money::from_minor(3500), true).minor(), 1166);
        assert_eq!(policy.bulk_discount(Money::from_minor(3500), false).minor(), 0);
    }

    #[test]
    fn test_bulk_rate_is_configurable() {
        let policy = DiscountPolicy::new(
            PricingPolicy::default()
                .bulk_discount_rate(Rate::from_bps(2500))
                .bulk_rounding(RoundingMode::HalfUp),
        );
        assert_eq!(policy.bulk_discount(Money::from_minor(1001), true).minor(), 250);
    }

    #[test]
    fn test_both_discounts_use_same_base() {
        let c = coupon(CouponKind::Percentage, 2000);
        let discounts = DiscountPolicy::default().apply(
            Money::from_minor(3500),
            true,
            CouponLookup::Found { coupon: &c, usage: UsageCheck::Enforce },
            Utc::now(),
        );

        assert_eq!(discounts.bulk_discount.minor(), 1166);
        assert_eq!(discounts.coupon_discount.minor(), 700);
        assert_eq!(discounts.total().minor(), 1866);
        assert_eq!(discounts.coupon.applied_coupon_id(), Some("cpn-1"));
    }

    #[test]
    fn test_combined_discount_clamped_to_base() {
        let c = coupon(CouponKind::Fixed, 5000);
        let discounts = DiscountPolicy::default().apply(
            Money::from_minor(3500),
            true,
            CouponLookup::Found { coupon: &c, usage: UsageCheck::Enforce },
            Utc::now(),
        );

        assert_eq!(discounts.bulk_discount.minor(), 1166);
        assert_eq!(discounts.coupon_discount.minor(), 2334);
        assert_eq!(discounts.total().minor(), 3500);
    }

    #[test]
    fn test_missing_coupon_is_advisory() {
        let discounts = DiscountPolicy::default().apply(
            Money::from_minor(3500),
            false,
            CouponLookup::Missing { code: "NOPE" },
            Utc::now(),
        );

        assert!(discounts.total().is_zero());
        assert_eq!(discounts.coupon.rejection(), Some(CouponRejection::NotFound));
        assert_eq!(discounts.coupon.applied_coupon_id(), None);
    }

    #[test]
    fn test_rejected_coupon_is_advisory() {
        let mut c = coupon(CouponKind::Fixed, 500);
        c.usage_count = 5;
        let discounts = DiscountPolicy::default().apply(
            Money::from_minor(3500),
            true,
            CouponLookup::Found { coupon: &c, usage: UsageCheck::Enforce },
            Utc::now(),
        );

        assert_eq!(discounts.bulk_discount.minor(), 1166);
        assert!(discounts.coupon_discount.is_zero());
        assert_eq!(
            discounts.coupon,
            CouponOutcome::Rejected {
                code: "SAVE".to_string(),
                reason: CouponRejection::UsageExhausted
            }
        );
    }

    #[test]
    fn test_zero_discount_coupon_still_applied() {
        let c = coupon(CouponKind::Percentage, 0);
        let discounts = DiscountPolicy::default().apply(
            Money::from_minor(3500),
            false,
            CouponLookup::Found { coupon: &c, usage: UsageCheck::Enforce },
            Utc::now(),
        );

        assert!(discounts.coupon_discount.is_zero());
        assert!(matches!(discounts.coupon, CouponOutcome::Applied { .. }));
    }
}
