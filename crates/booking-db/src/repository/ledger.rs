//! # Coupon Usage Ledger
//!
//! The only code that moves `coupons.usage_count`.
//!
//! ## Atomic Primitives
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  increment                                                              │
//! │    UPDATE coupons SET usage_count = usage_count + 1                     │
//! │    WHERE id = ? AND (usage_limit IS NULL OR usage_count < usage_limit)  │
//! │    RETURNING usage_count                                                │
//! │                                                                         │
//! │    row returned  ──► counted                                            │
//! │    no row        ──► UsageExhausted, caller's transaction rolls back    │
//! │                                                                         │
//! │  decrement                                                              │
//! │    UPDATE coupons SET usage_count = usage_count - 1                     │
//! │    WHERE id = ? AND usage_count > 0                                     │
//! │    RETURNING usage_count                                                │
//! │                                                                         │
//! │    no row        ──► already at zero, no-op (not an error)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each primitive is one statement: the condition is evaluated and applied
//! by SQLite, never read into Rust and written back. Both take the caller's
//! connection so they join the booking write's transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use crate::error::{BookingError, BookingResult, DbError, DbResult};
use booking_core::CoreError;

/// Result of a decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// Counter moved down to this value.
    Released(i64),
    /// Counter was already zero (or the coupon is gone); nothing changed.
    Floored,
}

/// Guarded mutations of a coupon's usage counter.
#[derive(Debug, Clone)]
pub struct CouponUsageLedger {
    pool: SqlitePool,
}

impl CouponUsageLedger {
    /// Creates a new CouponUsageLedger.
    pub fn new(pool: SqlitePool) -> Self {
        CouponUsageLedger { pool }
    }

    /// Current usage of a coupon.
    pub async fn usage_count(&self, coupon_id: &str) -> DbResult<i64> {
        let count: Option<i64> = sqlx::query_scalar("SELECT usage_count FROM coupons WHERE id = ?1")
            .bind(coupon_id)
            .fetch_optional(&self.pool)
            .await?;

        count.ok_or_else(|| DbError::not_found("Coupon", coupon_id))
    }

    /// Counts one use of `coupon_id` if it has uses left.
    ///
    /// ## Returns
    /// * `Ok(n)` - the new usage count
    /// * `Err(CoreError::UsageExhausted)` - limit reached; the caller must
    ///   abort its transaction
    pub async fn increment(
        conn: &mut SqliteConnection,
        coupon_id: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> BookingResult<i64> {
        let counted: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE coupons
            SET usage_count = usage_count + 1, updated_at = ?2
            WHERE id = ?1 AND (usage_limit IS NULL OR usage_count < usage_limit)
            RETURNING usage_count
            "#,
        )
        .bind(coupon_id)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        match counted {
            Some(usage_count) => {
                info!(coupon_id = %coupon_id, code = %code, usage_count, "Coupon use counted");
                Ok(usage_count)
            }
            None => {
                warn!(coupon_id = %coupon_id, code = %code, "Coupon usage limit reached at commit");
                Err(BookingError::Core(CoreError::UsageExhausted {
                    code: code.to_string(),
                }))
            }
        }
    }

    /// Releases one use of `coupon_id`, floored at zero.
    pub async fn decrement(
        conn: &mut SqliteConnection,
        coupon_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Decrement> {
        let released: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE coupons
            SET usage_count = usage_count - 1, updated_at = ?2
            WHERE id = ?1 AND usage_count > 0
            RETURNING usage_count
            "#,
        )
        .bind(coupon_id)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        match released {
            Some(usage_count) => {
                info!(coupon_id = %coupon_id, usage_count, "Coupon use released");
                Ok(Decrement::Released(usage_count))
            }
            None => {
                warn!(coupon_id = %coupon_id, "Coupon usage already at zero, decrement skipped");
                Ok(Decrement::Floored)
            }
        }
    }
}

impl Decrement {
    /// True when the counter actually moved.
    pub fn is_released(&self) -> bool {
        matches!(self, Decrement::Released(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::coupon::NewCoupon;
    use crate::test_support::seeded_db;

    #[tokio::test]
    async fn test_increment_stops_at_limit() {
        let db = seeded_db().await;
        let coupon = db.coupons().insert(&NewCoupon::fixed("TWICE", 100).usage_limit(2)).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let now = Utc::now();

        assert_eq!(CouponUsageLedger::increment(&mut conn, &coupon.id, "TWICE", now).await.unwrap(), 1);
        assert_eq!(CouponUsageLedger::increment(&mut conn, &coupon.id, "TWICE", now).await.unwrap(), 2);

        let err = CouponUsageLedger::increment(&mut conn, &coupon.id, "TWICE", now).await.unwrap_err();
        assert!(err.is_usage_exhausted());
        drop(conn);

        assert_eq!(db.ledger().usage_count(&coupon.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unlimited_coupon_always_counts() {
        let db = seeded_db().await;
        let coupon = db.coupons().insert(&NewCoupon::percentage("OPEN", 500)).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        for expected in 1..=5 {
            let count = CouponUsageLedger::increment(&mut conn, &coupon.id, "OPEN", Utc::now())
                .await
                .unwrap();
            assert_eq!(count, expected);
        }
    }

    #[tokio::test]
    async fn test_decrement_floors_at_zero() {
        let db = seeded_db().await;
        let coupon = db.coupons().insert(&NewCoupon::fixed("ONE", 100).usage_limit(1)).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let now = Utc::now();

        CouponUsageLedger::increment(&mut conn, &coupon.id, "ONE", now).await.unwrap();

        let first = CouponUsageLedger::decrement(&mut conn, &coupon.id, now).await.unwrap();
        assert_eq!(first, Decrement::Released(0));

        let second = CouponUsageLedger::decrement(&mut conn, &coupon.id, now).await.unwrap();
        assert_eq!(second, Decrement::Floored);
        assert!(!second.is_released());
        drop(conn);

        assert_eq!(db.ledger().usage_count(&coupon.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_limit_never_counts() {
        let db = seeded_db().await;
        let coupon = db.coupons().insert(&NewCoupon::fixed("NONE", 100).usage_limit(0)).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let err = CouponUsageLedger::increment(&mut conn, &coupon.id, "NONE", Utc::now())
            .await
            .unwrap_err();
        assert!(err.is_usage_exhausted());
    }

    #[tokio::test]
    async fn test_rollback_discards_increment() {
        let db = seeded_db().await;
        let coupon = db.coupons().insert(&NewCoupon::fixed("ROLL", 100).usage_limit(5)).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        CouponUsageLedger::increment(&mut tx, &coupon.id, "ROLL", Utc::now()).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(db.ledger().usage_count(&coupon.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_usage_count_of_missing_coupon() {
        let db = seeded_db().await;
        let err = db.ledger().usage_count("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
