//! # Pricing
//!
//! Pure price computation for a booking request.
//!
//! ## Pipeline
//! ```text
//! ┌────────────────────┐    ┌────────────────────┐    ┌────────────────────┐
//! │ SelectionResolver  │───►│  DiscountPolicy    │───►│   PricingResult    │
//! │ lines, base_amount │    │ bulk + coupon,     │    │ base, discounts,   │
//! │ bulk_eligible      │    │ clamped to base    │    │ final >= 0         │
//! └────────────────────┘    └────────────────────┘    └────────────────────┘
//! ```
//!
//! Nothing here touches storage. The caller looks up the coupon, passes the
//! lookup in, and decides what to persist from the returned [`Quote`].

pub mod coupon;
pub mod discount;
pub mod policy;
pub mod resolver;

pub use coupon::{CouponDiscountCalculator, UsageCheck};
pub use discount::{CouponLookup, CouponOutcome, DiscountPolicy, Discounts};
pub use policy::PricingPolicy;
pub use resolver::{Resolution, SelectionResolver};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::ServiceCatalog;
use crate::error::{CouponRejection, CoreResult};
use crate::types::{PricedLine, PricingResult, Selection};

/// A fully priced request, ready to display or persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub service_id: String,
    pub lines: Vec<PricedLine>,
    pub bulk_eligible: bool,
    pub pricing: PricingResult,
    pub coupon: CouponOutcome,
}

impl Quote {
    /// The coupon the booking should be associated with, if any.
    pub fn applied_coupon_id(&self) -> Option<&str> {
        self.coupon.applied_coupon_id()
    }

    /// Advisory coupon rejection, if any.
    pub fn coupon_rejection(&self) -> Option<CouponRejection> {
        self.coupon.rejection()
    }
}

/// Prices `selections` against `catalog`.
///
/// ## Returns
/// * `Ok(Quote)` - priced, possibly with an advisory coupon rejection
/// * `Err(CoreError)` - the selections themselves are not bookable
///
/// ## Example
/// ```rust
/// use booking_core::catalog::ServiceCatalog;
/// use booking_core::money::Money;
/// use booking_core::pricing::{quote, CouponLookup, PricingPolicy};
/// use booking_core::types::{Selection, ServiceOption};
///
/// let catalog = ServiceCatalog::new("clean", vec![ServiceOption {
///     id: "room".to_string(),
///     service_id: "clean".to_string(),
///     label: "Room".to_string(),
///     unit_price: Money::from_minor(500),
///     min_qty: 1,
///     max_qty: None,
///     is_variable: true,
///     is_active: true,
/// }]);
///
/// let q = quote(
///     &catalog,
///     &[Selection::new("room", 2)],
///     CouponLookup::NotRequested,
///     chrono::Utc::now(),
///     &PricingPolicy::default(),
/// ).unwrap();
/// assert_eq!(q.pricing.final_amount.to_decimal_string(), "6.67");
/// ```
pub fn quote(
    catalog: &ServiceCatalog,
    selections: &[Selection],
    coupon: CouponLookup<'_>,
    now: DateTime<Utc>,
    policy: &PricingPolicy,
) -> CoreResult<Quote> {
    let resolution = SelectionResolver::resolve(catalog, selections)?;

    let discounts = DiscountPolicy::new(*policy).apply(
        resolution.base_amount,
        resolution.bulk_eligible,
        coupon,
        now,
    );

    let pricing = PricingResult::from_components(
        resolution.base_amount,
        discounts.bulk_discount,
        discounts.coupon_discount,
    );

    Ok(Quote {
        service_id: catalog.service_id().to_string(),
        lines: resolution.lines,
        bulk_eligible: resolution.bulk_eligible,
        pricing,
        coupon: discounts.coupon,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
