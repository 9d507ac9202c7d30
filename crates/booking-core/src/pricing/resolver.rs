//! # Selection Resolver
//!
//! Validates requested selections against the catalog and prices each line.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each Selection (in request order)                                  │
//! │       │                                                                 │
//! │       ├── not active / not in service ──► InvalidOption                 │
//! │       │                                                                 │
//! │       ├── flat option ──► qty = 1, line = unit_price                   │
//! │       │                                                                 │
//! │       └── variable option ──► qty = requested (default 1)              │
//! │               ├── qty < min_qty ──► QuantityTooLow                      │
//! │               ├── qty > max_qty ──► QuantityTooHigh                     │
//! │               └── line = unit_price × qty                              │
//! │                                                                         │
//! │  base_amount = Σ line_amount      (single rounding point)              │
//! │  bulk_eligible = any variable qty > 1                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are in integer minor units, so the sum is exact and the single
//! rounding point is the unit price itself.

use crate::catalog::ServiceCatalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PricedLine, Selection};
use crate::validation::validate_selections;
use crate::MAX_OPTION_QUANTITY;

/// Output of [`SelectionResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub base_amount: Money,
    pub lines: Vec<PricedLine>,
    /// True when any variable option's effective quantity exceeds 1.
    pub bulk_eligible: bool,
}

/// Turns selections into priced lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionResolver;

impl SelectionResolver {
    /// Resolves `selections` against `catalog`.
    ///
    /// ## Returns
    /// * `Ok(Resolution)` - every selection is bookable
    /// * `Err(CoreError::InvalidOption)` - unknown or inactive option
    /// * `Err(CoreError::QuantityTooLow | QuantityTooHigh)` - variable bound
    /// * `Err(CoreError::AmountOutOfRange)` - the total overflows
    /// * `Err(CoreError::Validation)` - empty or oversized request
    pub fn resolve(catalog: &ServiceCatalog, selections: &[Selection]) -> CoreResult<Resolution> {
        validate_selections(selections)?;

        let mut lines = Vec::with_capacity(selections.len());
        let mut bulk_eligible = false;
        let mut base_amount = Money::zero();

        for selection in selections {
            let option = catalog.active_option(&selection.option_id).ok_or_else(|| {
                CoreError::InvalidOption {
                    option_id: selection.option_id.clone(),
                }
            })?;

            let quantity = if option.is_variable {
                let requested = selection.quantity.unwrap_or(1);

                if requested < option.min_qty {
                    return Err(CoreError::QuantityTooLow {
                        option_id: option.id.clone(),
                        min: option.min_qty,
                        requested,
                    });
                }

                let max = option.max_qty.unwrap_or(MAX_OPTION_QUANTITY);
                if requested > max {
                    return Err(CoreError::QuantityTooHigh {
                        option_id: option.id.clone(),
                        max,
                        requested,
                    });
                }

                if requested > 1 {
                    bulk_eligible = true;
                }
                requested
            } else {
                1
            };

            let out_of_range = || CoreError::AmountOutOfRange {
                option_id: option.id.clone(),
            };
            let line_amount = option
                .unit_price
                .checked_mul_quantity(quantity)
                .ok_or_else(out_of_range)?;
            base_amount = base_amount.checked_add(line_amount).ok_or_else(out_of_range)?;

            lines.push(PricedLine {
                option_id: option.id.clone(),
                label: option.label.clone(),
                unit_price: option.unit_price,
                quantity,
                line_amount,
            });
        }

        Ok(Resolution {
            base_amount,
            lines,
            bulk_eligible,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
