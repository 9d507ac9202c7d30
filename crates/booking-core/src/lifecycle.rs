//! # Booking Lifecycle
//!
//! The legal status transitions of a booking.
//!
//! ## State Machine
//! ```text
//!            confirm              complete
//! Pending ───────────► Confirmed ───────────► Completed
//!    │                     │
//!    │ cancel              │ cancel
//!    ▼                     ▼
//! Cancelled ◄──────────────┘
//! ```
//!
//! Completed and Cancelled are terminal. Cancelling releases the booking's
//! coupon use; the database layer does that inside the same transaction.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::BookingStatus;

/// Transitions allowed out of each status.
const TRANSITIONS: &[(BookingStatus, &[BookingStatus])] = &[
    (
        BookingStatus::Pending,
        &[BookingStatus::Confirmed, BookingStatus::Cancelled],
    ),
    (
        BookingStatus::Confirmed,
        &[BookingStatus::Completed, BookingStatus::Cancelled],
    ),
    (BookingStatus::Completed, &[]),
    (BookingStatus::Cancelled, &[]),
];

impl BookingStatus {
    /// Statuses reachable in one step.
    pub fn allowed_transitions(&self) -> &'static [BookingStatus] {
        TRANSITIONS
            .iter()
            .find(|(from, _)| from == self)
            .map(|(_, to)| *to)
            .unwrap_or(&[])
    }

    pub fn can_transition_to(&self, to: BookingStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// No transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Whether selections and coupon may still change.
    pub fn is_editable(&self) -> bool {
        !self.is_terminal()
    }

    /// Entering this status gives the booking's coupon use back.
    pub fn releases_coupon(&self) -> bool {
        matches!(self, BookingStatus::Cancelled)
    }
}

/// Checks a transition against the table.
///
/// ## Returns
/// * `Ok(to)` - the move is legal
/// * `Err(CoreError::IllegalTransition)` - otherwise, including `to == from`
pub fn transition(from: BookingStatus, to: BookingStatus) -> CoreResult<BookingStatus> {
    if from.can_transition_to(to) {
        Ok(to)
    } else {
        Err(CoreError::IllegalTransition { from, to })
    }
}

/// Named lifecycle actions exposed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Confirm,
    Complete,
    Cancel,
}

impl BookingAction {
    /// The status this action moves a booking to.
    pub fn target(&self) -> BookingStatus {
        match self {
            BookingAction::Confirm => BookingStatus::Confirmed,
            BookingAction::Complete => BookingStatus::Completed,
            BookingAction::Cancel => BookingStatus::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        assert_eq!(
            transition(BookingStatus::Pending, BookingStatus::Confirmed).unwrap(),
            BookingStatus::Confirmed
        );
        assert_eq!(
            transition(BookingStatus::Confirmed, BookingStatus::Completed).unwrap(),
            BookingStatus::Completed
        );
    }

    #[test]
    fn test_cancel_allowed_before_completion() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_completed_cannot_be_cancelled() {
        let err = transition(BookingStatus::Completed, BookingStatus::Cancelled).unwrap_err();
        assert!(matches!(
            err,
            CoreError::IllegalTransition {
                from: BookingStatus::Completed,
                to: BookingStatus::Cancelled
            }
        ));
    }

    #[test]
    fn test_no_skipping_or_self_transitions() {
        assert!(transition(BookingStatus::Pending, BookingStatus::Completed).is_err());
        assert!(transition(BookingStatus::Cancelled, BookingStatus::Cancelled).is_err());
        assert!(transition(BookingStatus::Confirmed, BookingStatus::Pending).is_err());
    }

    #[test]
    fn test_terminal_and_editable() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Pending.is_editable());
        assert!(BookingStatus::Confirmed.is_editable());
        assert!(!BookingStatus::Cancelled.is_editable());
    }

    #[test]
    fn test_action_targets() {
        assert_eq!(BookingAction::Confirm.target(), BookingStatus::Confirmed);
        assert_eq!(BookingAction::Cancel.target(), BookingStatus::Cancelled);
        assert!(BookingAction::Cancel.target().releases_coupon());
        assert!(!BookingAction::Complete.target().releases_coupon());
    }
}
