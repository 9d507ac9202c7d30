//! # Booking Engine
//!
//! The four call contracts collaborators use, each one unit of work.
//!
//! ## Units of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  preview_price      read-only connection, no ledger                     │
//! │                                                                         │
//! │  create_booking     BEGIN IMMEDIATE                                     │
//! │                     ├── catalog + coupon lookup                         │
//! │                     ├── quote (booking-core)                            │
//! │                     ├── ledger.increment (if coupon applied)            │
//! │                     ├── next reference + insert booking/lines           │
//! │                     └── COMMIT                                          │
//! │                                                                         │
//! │  update_booking     BEGIN IMMEDIATE                                     │
//! │                     ├── same code:    quote (usage already counted)     │
//! │                     ├── changed code: ledger.decrement(old)             │
//! │                     │                 quote, ledger.increment(new)      │
//! │                     ├── rewrite booking/lines                           │
//! │                     └── COMMIT                                          │
//! │                                                                         │
//! │  transition_booking BEGIN IMMEDIATE                                     │
//! │                     ├── transition table check                          │
//! │                     ├── conditional status update                       │
//! │                     ├── ledger.decrement (on cancel, floored)           │
//! │                     └── COMMIT                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error drops the transaction, which rolls back every statement in it.
//! `BEGIN IMMEDIATE` takes the write lock up front, so concurrent writers
//! queue on `busy_timeout` instead of failing on a stale read snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{BookingError, BookingResult, DbError};
use crate::repository::booking::BookingRepository;
use crate::repository::catalog::CatalogRepository;
use crate::repository::coupon::CouponRepository;
use crate::repository::ledger::CouponUsageLedger;
use booking_core::lifecycle::transition;
use booking_core::validation::validate_customer;
use booking_core::{
    quote, Booking, BookingAction, BookingStatus, CoreError, Coupon, CouponLookup, CouponOutcome,
    CouponRejection, CustomerDetails, PricingPolicy, Quote, Selection, UsageCheck,
};

// =============================================================================
// Requests & Responses
// =============================================================================

/// `CreateBooking` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub service_id: String,
    pub selections: Vec<Selection>,
    pub coupon_code: Option<String>,
    pub customer: CustomerDetails,
}

/// `UpdateBooking` input. Customer fields are not re-priced and not changed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingChanges {
    pub service_id: String,
    pub selections: Vec<Selection>,
    pub coupon_code: Option<String>,
}

/// A persisted booking plus the coupon advisory from its pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub booking: Booking,
    pub coupon: CouponOutcome,
}

impl BookingReceipt {
    /// Advisory coupon rejection, if any.
    pub fn coupon_rejection(&self) -> Option<CouponRejection> {
        self.coupon.rejection()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Orchestrates pricing, the usage ledger and the lifecycle.
///
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct BookingEngine {
    pool: SqlitePool,
    policy: PricingPolicy,
}

impl BookingEngine {
    /// Creates an engine over `pool` using `policy`.
    pub fn new(pool: SqlitePool, policy: PricingPolicy) -> Self {
        BookingEngine { pool, policy }
    }

    /// The pricing policy in force.
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// `PreviewPrice`: quote without persisting or touching the ledger.
    pub async fn preview_price(
        &self,
        service_id: &str,
        selections: &[Selection],
        coupon_code: Option<&str>,
        now: DateTime<Utc>,
    ) -> BookingResult<Quote> {
        let code = normalize_code(coupon_code);
        let mut conn = self.pool.acquire().await?;

        let catalog = CatalogRepository::fetch_catalog(&mut conn, service_id).await?;
        let coupon = match code {
            Some(code) => CouponRepository::find_by_code(&mut conn, code).await?,
            None => None,
        };

        let quote = quote(
            &catalog,
            selections,
            coupon_lookup(code, coupon.as_ref(), UsageCheck::Enforce),
            now,
            &self.policy,
        )?;

        debug!(
            service_id = %service_id,
            base = %quote.pricing.base_amount,
            final_amount = %quote.pricing.final_amount,
            "Previewed price"
        );

        Ok(quote)
    }

    /// `CreateBooking`: prices, counts the coupon use and persists a
    /// `Pending` booking, all or nothing.
    ///
    /// ## Returns
    /// * `Ok(BookingReceipt)` - persisted, possibly with a coupon advisory
    /// * `Err(Core(UsageExhausted))` - the coupon has no uses left; nothing
    ///   was persisted
    /// * `Err(Core(..))` - invalid selections or customer fields
    pub async fn create_booking(&self, request: &NewBooking, now: DateTime<Utc>) -> BookingResult<BookingReceipt> {
        validate_customer(&request.customer)?;
        let code = normalize_code(request.coupon_code.as_deref());

        let mut tx = self.begin_write().await?;

        let catalog = CatalogRepository::fetch_catalog(&mut tx, &request.service_id).await?;
        let coupon = match code {
            Some(code) => CouponRepository::find_by_code(&mut tx, code).await?,
            None => None,
        };

        let quote = quote(
            &catalog,
            &request.selections,
            coupon_lookup(code, coupon.as_ref(), UsageCheck::Enforce),
            now,
            &self.policy,
        )?;
        ensure_not_exhausted(&quote.coupon)?;

        let (coupon_id, coupon_code) = match &quote.coupon {
            CouponOutcome::Applied { coupon_id, code } => {
                CouponUsageLedger::increment(&mut tx, coupon_id, code, now).await?;
                (Some(coupon_id.clone()), Some(code.clone()))
            }
            _ => (None, None),
        };

        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            reference: BookingRepository::next_reference(&mut tx, now).await?,
            status: BookingStatus::Pending,
            service_id: quote.service_id,
            lines: quote.lines,
            coupon_id,
            coupon_code,
            pricing: quote.pricing,
            customer: request.customer.clone(),
            created_at: now,
            updated_at: now,
        };

        BookingRepository::insert(&mut tx, &booking).await?;
        tx.commit().await?;

        info!(
            id = %booking.id,
            reference = %booking.reference,
            final_amount = %booking.pricing.final_amount,
            coupon = booking.coupon_code.as_deref().unwrap_or("-"),
            "Booking created"
        );

        Ok(BookingReceipt {
            booking,
            coupon: quote.coupon,
        })
    }

    /// `UpdateBooking`: re-prices an editable booking.
    ///
    /// ## Coupon Handling
    /// - same code as the associated coupon: discount recomputed, ledger untouched
    /// - code changed or removed: old use released, new use counted, in one
    ///   transaction (an exhausted new coupon rolls the release back too)
    pub async fn update_booking(
        &self,
        booking_id: &str,
        changes: &BookingChanges,
        now: DateTime<Utc>,
    ) -> BookingResult<BookingReceipt> {
        let code = normalize_code(changes.coupon_code.as_deref());

        let mut tx = self.begin_write().await?;

        let existing = BookingRepository::fetch(&mut tx, booking_id)
            .await?
            .ok_or_else(|| BookingError::BookingNotFound(booking_id.to_string()))?;

        if !existing.status.is_editable() {
            return Err(CoreError::NotEditable {
                status: existing.status,
            }
            .into());
        }

        let catalog = CatalogRepository::fetch_catalog(&mut tx, &changes.service_id).await?;

        let keeps_coupon = existing.coupon_id.is_some() && code.is_some() && existing.coupon_code.as_deref() == code;

        let (quote, coupon_id, coupon_code) = if keeps_coupon {
            let held = match existing.coupon_id.as_deref() {
                Some(id) => CouponRepository::find_by_id(&mut tx, id).await?,
                None => None,
            };

            let quote = quote(
                &catalog,
                &changes.selections,
                coupon_lookup(code, held.as_ref(), UsageCheck::AlreadyCounted),
                now,
                &self.policy,
            )?;

            (quote, existing.coupon_id.clone(), existing.coupon_code.clone())
        } else {
            if let Some(old) = existing.coupon_id.as_deref() {
                CouponUsageLedger::decrement(&mut tx, old, now).await?;
            }

            let coupon = match code {
                Some(code) => CouponRepository::find_by_code(&mut tx, code).await?,
                None => None,
            };

            let quote = quote(
                &catalog,
                &changes.selections,
                coupon_lookup(code, coupon.as_ref(), UsageCheck::Enforce),
                now,
                &self.policy,
            )?;
            ensure_not_exhausted(&quote.coupon)?;

            let (coupon_id, coupon_code) = match &quote.coupon {
                CouponOutcome::Applied { coupon_id, code } => {
                    CouponUsageLedger::increment(&mut tx, coupon_id, code, now).await?;
                    (Some(coupon_id.clone()), Some(code.clone()))
                }
                _ => (None, None),
            };

            (quote, coupon_id, coupon_code)
        };

        let booking = Booking {
            service_id: quote.service_id,
            lines: quote.lines,
            coupon_id,
            coupon_code,
            pricing: quote.pricing,
            updated_at: now,
            ..existing
        };

        BookingRepository::update_pricing(&mut tx, &booking).await?;
        tx.commit().await?;

        info!(
            id = %booking.id,
            reference = %booking.reference,
            final_amount = %booking.pricing.final_amount,
            coupon_kept = keeps_coupon,
            "Booking updated"
        );

        Ok(BookingReceipt {
            booking,
            coupon: quote.coupon,
        })
    }

    /// `TransitionBooking`: moves a booking to `target` if the transition
    /// table allows it. Cancelling releases the associated coupon use.
    pub async fn transition_booking(
        &self,
        booking_id: &str,
        target: BookingStatus,
        now: DateTime<Utc>,
    ) -> BookingResult<Booking> {
        let mut tx = self.begin_write().await?;

        let existing = BookingRepository::fetch(&mut tx, booking_id)
            .await?
            .ok_or_else(|| BookingError::BookingNotFound(booking_id.to_string()))?;

        let from = existing.status;
        let to = transition(from, target)?;

        if !BookingRepository::update_status(&mut tx, &existing.id, from, to, now).await? {
            return Err(DbError::not_found("Booking", booking_id).into());
        }

        if to.releases_coupon() {
            if let Some(coupon_id) = existing.coupon_id.as_deref() {
                CouponUsageLedger::decrement(&mut tx, coupon_id, now).await?;
            }
        }

        tx.commit().await?;

        info!(
            id = %existing.id,
            reference = %existing.reference,
            from = %from,
            to = %to,
            "Booking status changed"
        );

        Ok(Booking {
            status: to,
            updated_at: now,
            ..existing
        })
    }

    /// Applies a named lifecycle action.
    pub async fn apply(&self, booking_id: &str, action: BookingAction, now: DateTime<Utc>) -> BookingResult<Booking> {
        self.transition_booking(booking_id, action.target(), now).await
    }

    /// Pending → Confirmed.
    pub async fn confirm(&self, booking_id: &str, now: DateTime<Utc>) -> BookingResult<Booking> {
        self.apply(booking_id, BookingAction::Confirm, now).await
    }

    /// Confirmed → Completed.
    pub async fn complete(&self, booking_id: &str, now: DateTime<Utc>) -> BookingResult<Booking> {
        self.apply(booking_id, BookingAction::Complete, now).await
    }

    /// Pending | Confirmed → Cancelled.
    pub async fn cancel(&self, booking_id: &str, now: DateTime<Utc>) -> BookingResult<Booking> {
        self.apply(booking_id, BookingAction::Cancel, now).await
    }

    /// Loads a booking for display.
    pub async fn get_booking(&self, booking_id: &str) -> BookingResult<Booking> {
        let mut conn = self.pool.acquire().await?;

        BookingRepository::fetch(&mut conn, booking_id)
            .await?
            .ok_or_else(|| BookingError::BookingNotFound(booking_id.to_string()))
    }

    /// Bookings in `status`, newest first.
    pub async fn list_bookings(&self, status: BookingStatus, limit: i64) -> BookingResult<Vec<Booking>> {
        let bookings = BookingRepository::new(self.pool.clone())
            .list_by_status(status, limit)
            .await?;

        Ok(bookings)
    }

    async fn begin_write(&self) -> BookingResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Blank codes count as no code.
fn normalize_code(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}

fn coupon_lookup<'a>(code: Option<&'a str>, coupon: Option<&'a Coupon>, usage: UsageCheck) -> CouponLookup<'a> {
    match (code, coupon) {
        (None, _) => CouponLookup::NotRequested,
        (Some(_), Some(coupon)) => CouponLookup::Found { coupon, usage },
        (Some(code), None) => CouponLookup::Missing { code },
    }
}

/// An exhausted coupon is advisory in a preview but aborts a write: the
/// caller asked for a discount that can no longer be counted.
fn ensure_not_exhausted(outcome: &CouponOutcome) -> BookingResult<()> {
    if let CouponOutcome::Rejected {
        code,
        reason: CouponRejection::UsageExhausted,
    } = outcome
    {
        warn!(code = %code, "Coupon exhausted, booking write aborted");
        return Err(CoreError::UsageExhausted { code: code.clone() }.into());
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
