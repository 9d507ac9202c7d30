//! # booking-core: Pure Pricing and Lifecycle Rules
//!
//! This crate holds the booking engine's business rules as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Booking Engine Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Collaborators (site forms, admin, reporting)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               booking-db (BookingEngine, ledger)                │   │
//! │  │      transactions, coupon usage counter, persistence            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ booking-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │  pricing  │  │ lifecycle │  │ validation│  │   │
//! │  │   │   Money   │  │  Quote    │  │  status   │  │   rules   │  │   │
//! │  │   │   Rate    │  │ discounts │  │  table    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK (callers pass `now`)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ServiceOption, Coupon, Booking, etc.)
//! - [`money`] - Money and Rate with integer arithmetic
//! - [`catalog`] - Read-only view of a service's options
//! - [`pricing`] - Selection resolution, bulk and coupon discounts
//! - [`lifecycle`] - Booking status transitions
//! - [`error`] - Domain error types
//! - [`validation`] - Input and definition validation
//!
//! ## Example Usage
//!
//! ```rust
//! use booking_core::money::{Money, Rate, RoundingMode};
//!
//! let base = Money::from_minor(3500); // £35.00
//! let bulk = base.apply_rate(Rate::from_bps(3333), RoundingMode::Down);
//! assert_eq!((base - bulk).to_decimal_string(), "23.34");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::ServiceCatalog;
pub use error::{CoreError, CoreResult, CouponRejection, ValidationError};
pub use lifecycle::{transition, BookingAction};
pub use money::{Money, Rate, RoundingMode};
pub use pricing::{quote, CouponLookup, CouponOutcome, PricingPolicy, Quote, UsageCheck};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default bulk discount in basis points (0.3333 of the base amount).
pub const DEFAULT_BULK_DISCOUNT_BPS: u32 = 3333;

/// Maximum selections in a single request.
pub const MAX_SELECTIONS: usize = 50;

/// Quantity cap for variable options without their own `max_qty`.
///
/// ## Business Reason
/// Catches typos such as 1000 instead of 10.
pub const MAX_OPTION_QUANTITY: i64 = 999;

/// Upper bound on an option's unit price in minor units (1,000,000.00).
///
/// `MAX_UNIT_PRICE × MAX_OPTION_QUANTITY × MAX_SELECTIONS` stays well inside
/// i64, so a catalog that passes validation always prices.
pub const MAX_UNIT_PRICE: i64 = 100_000_000;
