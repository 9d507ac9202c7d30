//! Pricing policy constants.

use serde::{Deserialize, Serialize};

use crate::money::{Rate, RoundingMode, BPS_DENOMINATOR};
use crate::DEFAULT_BULK_DISCOUNT_BPS;

/// Tunable pricing rules.
///
/// ## Defaults
/// - bulk discount: 3333 bps (0.3333 of the base amount)
/// - bulk rounding: `Down`, which reproduces the published quotes
///   (35.00 → 11.66)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub bulk_discount_rate: Rate,
    pub bulk_rounding: RoundingMode,
    /// Rounding for percentage coupons.
    pub coupon_rounding: RoundingMode,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            bulk_discount_rate: Rate::from_bps(DEFAULT_BULK_DISCOUNT_BPS),
            bulk_rounding: RoundingMode::Down,
            coupon_rounding: RoundingMode::HalfUp,
        }
    }
}

impl PricingPolicy {
    /// Sets the bulk discount rate, capped at 100%.
    pub fn bulk_discount_rate(mut self, rate: Rate) -> Self {
        self.bulk_discount_rate = Rate::from_bps(rate.bps().min(BPS_DENOMINATOR as u32));
        self
    }

    /// Sets how the bulk discount is rounded.
    pub fn bulk_rounding(mut self, mode: RoundingMode) -> Self {
        self.bulk_rounding = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_bulk_rate_capped_at_full_rate() {
        let policy = PricingPolicy::default().bulk_discount_rate(Rate::from_bps(25_000));
        assert_eq!(policy.bulk_discount_rate, Rate::from_bps(10_000));

        let base = Money::from_minor(3500);
        assert_eq!(base.apply_rate(policy.bulk_discount_rate, policy.bulk_rounding), base);
    }

    #[test]
    fn test_builder_keeps_other_fields() {
        let policy = PricingPolicy::default()
            .bulk_discount_rate(Rate::from_bps(2500))
            .bulk_rounding(RoundingMode::HalfUp);

        assert_eq!(policy.bulk_discount_rate.bps(), 2500);
        assert_eq!(policy.bulk_rounding, RoundingMode::HalfUp);
        assert_eq!(policy.coupon_rounding, RoundingMode::HalfUp);
    }
}
