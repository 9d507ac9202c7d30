//! # Error Types
//!
//! Domain-specific error types for booking-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  booking-core errors (this file)                                       │
//! │  ├── CoreError        - Validation / State / Concurrency failures      │
//! │  ├── ValidationError  - Field-level input failures                     │
//! │  └── CouponRejection  - Advisory only, never aborts a quote            │
//! │                                                                         │
//! │  booking-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── BookingError     - What BookingEngine callers see                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BookingError → collaborator       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::types::BookingStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The option is unknown, inactive, or belongs to another service.
    #[error("Option {option_id} is not an active option of this service")]
    InvalidOption { option_id: String },

    /// A variable option was requested below its minimum quantity.
    #[error("Option {option_id} requires a quantity of at least {min}, requested {requested}")]
    QuantityTooLow {
        option_id: String,
        min: i64,
        requested: i64,
    },

    /// A variable option was requested above its maximum quantity.
    #[error("Option {option_id} allows a quantity of at most {max}, requested {requested}")]
    QuantityTooHigh {
        option_id: String,
        max: i64,
        requested: i64,
    },

    /// A line or the base amount does not fit in the money range.
    #[error("Option {option_id} takes the booking total out of range")]
    AmountOutOfRange { option_id: String },

    /// The transition table forbids moving from `from` to `to`.
    ///
    /// ## User Workflow
    /// ```text
    /// Admin clicks "Cancel" on a completed booking
    ///      │
    ///      ▼
    /// IllegalTransition { from: Completed, to: Cancelled }
    ///      │
    ///      ▼
    /// UI shows: "This booking cannot be cancelled"
    /// ```
    #[error("Booking cannot move from {from} to {to}")]
    IllegalTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// Pricing of a booking in a terminal state cannot be changed.
    #[error("Booking is {status} and can no longer be modified")]
    NotEditable { status: BookingStatus },

    /// The ledger's conditional increment found no remaining uses.
    ///
    /// Only raised at commit time; aborts the enclosing unit of work.
    #[error("Coupon {code} has no remaining uses")]
    UsageExhausted { code: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Name of the offending input, for form rendering.
    pub fn field(&self) -> Option<&str> {
        match self {
            CoreError::InvalidOption { option_id }
            | CoreError::QuantityTooLow { option_id, .. }
            | CoreError::QuantityTooHigh { option_id, .. }
            | CoreError::AmountOutOfRange { option_id } => Some(option_id),
            CoreError::Validation(err) => Some(err.field()),
            CoreError::UsageExhausted { .. } => Some("coupon_code"),
            CoreError::IllegalTransition { .. } | CoreError::NotEditable { .. } => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
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

    /// Invalid format (e.g., invalid UUID, invalid amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// The field this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Coupon Rejection (advisory)
// =============================================================================

/// Why a supplied coupon contributed no discount.
///
/// Attached to a quote as an advisory; the quote itself still succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponRejection {
    /// No coupon has this code.
    #[error("coupon code not recognised")]
    NotFound,
    /// Coupon is switched off.
    #[error("coupon is not active")]
    Inactive,
    /// `now` is before the coupon's `valid_from`.
    #[error("coupon is not valid yet")]
    NotYetValid,
    /// `now` is after the coupon's `valid_until`.
    #[error("coupon has expired")]
    Expired,
    /// `usage_count` has reached `usage_limit`.
    #[error("coupon usage limit reached")]
    UsageExhausted,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityTooLow {
            option_id: "extra-room".to_string(),
            min: 2,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "Option extra-room requires a quantity of at least 2, requested 1"
        );

        let err = CoreError::IllegalTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Cancelled,
        };
        assert_eq!(err.to_string(), "Booking cannot move from completed to cancelled");
    }

    #[test]
    fn test_field_names_offending_input() {
        let err = CoreError::QuantityTooHigh {
            option_id: "opt-b".to_string(),
            max: 10,
            requested: 11,
        };
        assert_eq!(err.field(), Some("opt-b"));

        let err: CoreError = ValidationError::Required {
            field: "customer.name".to_string(),
        }
        .into();
        assert_eq!(err.field(), Some("customer.name"));
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_rejection_serializes_snake_case() {
        let json = serde_json::to_string(&CouponRejection::NotYetValid).unwrap();
        assert_eq!(json, "\"not_yet_valid\"");
    }
}
