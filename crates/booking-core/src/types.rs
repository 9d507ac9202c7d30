//! # Domain Types
//!
//! Core domain types shared by pricing, the ledger and the lifecycle.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ServiceOption   │   │    Booking      │   │     Coupon      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  unit_price     │   │  reference      │   │  code (unique)  │       │
//! │  │  min/max_qty    │   │  status         │   │  kind / value   │       │
//! │  │  is_variable    │   │  lines          │   │  usage_limit    │       │
//! │  │  is_active      │   │  pricing        │   │  usage_count    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Selection     │   │   PricedLine    │   │ PricingResult   │       │
//! │  │  option_id      │──►│  line_amount    │──►│  base/discounts │       │
//! │  │  quantity?      │   │  (snapshot)     │   │  final_amount   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog and coupon definitions are owned by external collaborators;
//! this crate only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::{Money, Rate};

// =============================================================================
// Service Option
// =============================================================================

/// A bookable option of a service, as supplied by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ServiceOption {
    pub id: String,
    pub service_id: String,
    /// Display label ("Extra bedroom", "Oven clean").
    pub label: String,
    pub unit_price: Money,
    /// Lower quantity bound, only enforced for variable options.
    pub min_qty: i64,
    /// Upper quantity bound, only enforced for variable options.
    pub max_qty: Option<i64>,
    /// Variable options are priced per unit; flat options once.
    pub is_variable: bool,
    pub is_active: bool,
}

// =============================================================================
// Selection & Priced Line
// =============================================================================

/// One requested option. `quantity` is ignored for flat options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Selection {
    pub option_id: String,
    pub quantity: Option<i64>,
}

impl Selection {
    /// Selection with an explicit quantity.
    pub fn new(option_id: impl Into<String>, quantity: i64) -> Self {
        Selection {
            option_id: option_id.into(),
            quantity: Some(quantity),
        }
    }

    /// Selection without a quantity (defaults to 1).
    pub fn single(option_id: impl Into<String>) -> Self {
        Selection {
            option_id: option_id.into(),
            quantity: None,
        }
    }
}

/// A resolved selection.
///
/// Uses the snapshot pattern: label and unit price are frozen at pricing
/// time so the booking history survives catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PricedLine {
    pub option_id: String,
    pub label: String,
    pub unit_price: Money,
    /// Effective quantity (always 1 for flat options).
    pub quantity: i64,
    pub line_amount: Money,
}

// =============================================================================
// Pricing Result
// =============================================================================

/// The five persisted amounts of a priced booking.
///
/// ## Invariants
/// - `discount_amount == bulk_discount + coupon_discount`
/// - `final_amount == base_amount - discount_amount >= 0`
///
/// Field names are the durable contract read by reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingResult {
    pub base_amount: Money,
    pub bulk_discount: Money,
    pub coupon_discount: Money,
    pub discount_amount: Money,
    pub final_amount: Money,
}

impl PricingResult {
    /// Builds the result from already-clamped components.
    pub fn from_components(base_amount: Money, bulk_discount: Money, coupon_discount: Money) -> Self {
        let discount_amount = bulk_discount + coupon_discount;
        PricingResult {
            base_amount,
            bulk_discount,
            coupon_discount,
            discount_amount,
            final_amount: base_amount - discount_amount,
        }
    }

    /// Checks both invariants.
    pub fn is_consistent(&self) -> bool {
        self.discount_amount == self.bulk_discount + self.coupon_discount
            && self.final_amount == self.base_amount - self.discount_amount
            && !self.final_amount.is_negative()
            && !self.bulk_discount.is_negative()
            && !self.coupon_discount.is_negative()
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// How a coupon's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// `value` is hundredths of a percent (2000 = 20%).
    Percentage,
    /// `value` is minor units (5000 = £50.00).
    Fixed,
}

impl CouponKind {
    /// Storage/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponKind::Percentage => "percentage",
            CouponKind::Fixed => "fixed",
        }
    }
}

/// A coupon definition with its usage counter.
///
/// `usage_count` is only ever moved by the coupon usage ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    pub id: String,
    /// Case-sensitive unique code.
    pub code: String,
    pub kind: CouponKind,
    /// Decimal value × 100 (see [`CouponKind`]).
    pub value: i64,
    pub usage_limit: Option<i64>,
    pub usage_count: i64,
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Percentage value as a rate (hundredths of a percent are basis points).
    #[inline]
    pub fn rate(&self) -> Rate {
        Rate::from_bps(self.value.clamp(0, u32::MAX as i64) as u32)
    }

    /// Fixed value as money.
    #[inline]
    pub fn fixed_amount(&self) -> Money {
        Money::from_minor(self.value)
    }

    /// True when a limit is set and fully consumed.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .map(|limit| self.usage_count >= limit)
            .unwrap_or(false)
    }
}

// =============================================================================
// Booking Status
// =============================================================================

/// Lifecycle state of a booking. See [`crate::lifecycle`] for transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Storage/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Customer fields. Opaque to pricing; only their shape is validated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Booking
// =============================================================================

/// A priced booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Booking {
    pub id: String,
    /// Human-facing reference (`BK-20261019-000042`).
    pub reference: String,
    pub status: BookingStatus,
    pub service_id: String,
    /// Ordered priced lines.
    pub lines: Vec<PricedLine>,
    /// Weak reference; the booking does not own the coupon.
    pub coupon_id: Option<String>,
    pub coupon_code: Option<String>,
    pub pricing: PricingResult,
    pub customer: CustomerDetails,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Re-derives the selections this booking was priced from.
    pub fn selections(&self) -> Vec<Selection> {
        self.lines
            .iter()
            .map(|line| Selection::new(line.option_id.clone(), line.quantity))
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
