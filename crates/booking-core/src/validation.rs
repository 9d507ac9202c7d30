//! # Validation Module
//!
//! Input validation for booking requests and for the definitions the
//! admin collaborator hands to the database layer.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Site / admin forms (external)                                │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Customer fields, coupon definitions, option definitions           │
//! │  └── Quantity bounds are checked by the SelectionResolver              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── UNIQUE (coupon code), CHECK (usage_count >= 0)                    │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::money::BPS_DENOMINATOR;
use crate::types::{CouponKind, CustomerDetails, Selection, ServiceOption};
use crate::{MAX_OPTION_QUANTITY, MAX_SELECTIONS, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn optional(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a coupon code.
///
/// ## Rules
/// - 1 to 50 characters
/// - letters, digits, hyphens, underscores (case is significant)
///
/// ```rust
/// use booking_core::validation::validate_coupon_code;
///
/// assert!(validate_coupon_code("SPRING-20").is_ok());
/// assert!(validate_coupon_code("spring 20").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<()> {
    required("code", code, 50)?;

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates the customer fields attached to a booking.
///
/// ## Rules
/// - name: required, at most 200 characters
/// - email: required, at most 254 characters, `local@domain.tld`
/// - phone: optional, at most 32 characters of digits, spaces, `+ - ( )`
/// - notes: optional, at most 2000 characters
pub fn validate_customer(customer: &CustomerDetails) -> ValidationResult<()> {
    required("customer.name", &customer.name, 200)?;
    required("customer.email", &customer.email, 254)?;

    let email = customer.email.trim();
    let well_formed = email
        .split_once('@')
        .map(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        })
        .unwrap_or(false);
    if !well_formed || email.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "customer.email".to_string(),
            reason: "must be an email address".to_string(),
        });
    }

    optional("customer.phone", customer.phone.as_deref(), 32)?;
    if let Some(phone) = customer.phone.as_deref() {
        if !phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
        {
            return Err(ValidationError::InvalidFormat {
                field: "customer.phone".to_string(),
                reason: "must contain only digits, spaces and + - ( )".to_string(),
            });
        }
    }

    optional("customer.notes", customer.notes.as_deref(), 2000)
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates the shape of a selection list (not its catalog membership).
///
/// ## Rules
/// - at least one selection
/// - at most MAX_SELECTIONS (50)
pub fn validate_selections(selections: &[Selection]) -> ValidationResult<()> {
    if selections.is_empty() {
        return Err(ValidationError::Required {
            field: "selections".to_string(),
        });
    }

    if selections.len() > MAX_SELECTIONS {
        return Err(ValidationError::OutOfRange {
            field: "selections".to_string(),
            min: 1,
            max: MAX_SELECTIONS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Definition Validators
// =============================================================================

/// Validates a coupon's value for its kind.
///
/// ## Rules
/// - percentage: 0 to 10000 hundredths of a percent (0% to 100%)
/// - fixed: non-negative minor units
pub fn validate_coupon_value(kind: CouponKind, value: i64) -> ValidationResult<()> {
    match kind {
        CouponKind::Percentage if !(0..=BPS_DENOMINATOR).contains(&value) => {
            Err(ValidationError::OutOfRange {
                field: "value".to_string(),
                min: 0,
                max: BPS_DENOMINATOR,
            })
        }
        CouponKind::Fixed if value < 0 => Err(ValidationError::OutOfRange {
            field: "value".to_string(),
            min: 0,
            max: i64::MAX,
        }),
        _ => Ok(()),
    }
}

/// Validates a coupon's usage limit and validity window.
pub fn validate_coupon_limits(
    usage_limit: Option<i64>,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    if let Some(limit) = usage_limit {
        if limit < 0 {
            return Err(ValidationError::OutOfRange {
                field: "usage_limit".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    if let (Some(from), Some(until)) = (valid_from, valid_until) {
        if from > until {
            return Err(ValidationError::InvalidFormat {
                field: "valid_until".to_string(),
                reason: "must not be before valid_from".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a service option definition.
///
/// ## Rules
/// - label: required, at most 200 characters
/// - unit price: 0 to MAX_UNIT_PRICE
/// - min_qty: 1 to MAX_OPTION_QUANTITY
/// - max_qty (if set): min_qty to MAX_OPTION_QUANTITY
pub fn validate_option(option: &ServiceOption) -> ValidationResult<()> {
    required("label", &option.label, 200)?;

    if !(0..=MAX_UNIT_PRICE).contains(&option.unit_price.minor()) {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE,
        });
    }

    if !(1..=MAX_OPTION_QUANTITY).contains(&option.min_qty) {
        return Err(ValidationError::OutOfRange {
            field: "min_qty".to_string(),
            min: 1,
            max: MAX_OPTION_QUANTITY,
        });
    }

    if let Some(max) = option.max_qty {
        if !(option.min_qty..=MAX_OPTION_QUANTITY).contains(&max) {
            return Err(ValidationError::OutOfRange {
                field: "max_qty".to_string(),
                min: option.min_qty,
                max: MAX_OPTION_QUANTITY,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
