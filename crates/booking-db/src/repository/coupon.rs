//! # Coupon Repository
//!
//! Coupon definitions, as provisioned by the admin collaborator.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Column          Written by                                             │
//! │  ────────────    ──────────────────────────────────────────────────     │
//! │  code, kind,     CouponRepository::insert / set_active (admin)          │
//! │  value, window,                                                         │
//! │  limit, active                                                          │
//! │                                                                         │
//! │  usage_count     CouponUsageLedger ONLY (see ledger.rs)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use booking_core::validation::{validate_coupon_code, validate_coupon_limits, validate_coupon_value};
use booking_core::{Coupon, CouponKind};

const COUPON_COLUMNS: &str = r#"
    id, code, kind, value, usage_limit, usage_count,
    valid_from, valid_until, is_active, created_at, updated_at
"#;

/// A coupon definition to provision.
///
/// `value` is the decimal value × 100: hundredths of a percent for
/// percentage coupons (`2000` = 20%), minor units for fixed coupons
/// (`5000` = £50.00).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCoupon {
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    pub usage_limit: Option<i64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl NewCoupon {
    /// An active percentage coupon with no limit or window.
    pub fn percentage(code: impl Into<String>, hundredths_of_percent: i64) -> Self {
        NewCoupon {
            code: code.into(),
            kind: CouponKind::Percentage,
            value: hundredths_of_percent,
            usage_limit: None,
            valid_from: None,
            valid_until: None,
            is_active: true,
        }
    }

    /// An active fixed-amount coupon with no limit or window.
    pub fn fixed(code: impl Into<String>, minor_units: i64) -> Self {
        NewCoupon {
            code: code.into(),
            kind: CouponKind::Fixed,
            value: minor_units,
            usage_limit: None,
            valid_from: None,
            valid_until: None,
            is_active: true,
        }
    }

    /// Sets the usage limit.
    pub fn usage_limit(mut self, limit: i64) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Sets the validity window (either bound may be open).
    pub fn valid_between(mut self, from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        self.valid_from = from;
        self.valid_until = until;
        self
    }
}

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Validates and inserts a coupon definition with `usage_count = 0`.
    ///
    /// ## Returns
    /// * `Ok(Coupon)` - the stored coupon
    /// * `Err(DbError::InvalidDefinition)` - bad code, value, limit or window
    /// * `Err(DbError::UniqueViolation)` - the code is taken
    pub async fn insert(&self, new: &NewCoupon) -> DbResult<Coupon> {
        validate_coupon_code(&new.code)?;
        validate_coupon_value(new.kind, new.value)?;
        validate_coupon_limits(new.usage_limit, new.valid_from, new.valid_until)?;

        let now = Utc::now();
        let coupon = Coupon {
            id: Uuid::new_v4().to_string(),
            code: new.code.clone(),
            kind: new.kind,
            value: new.value,
            usage_limit: new.usage_limit,
            usage_count: 0,
            valid_from: new.valid_from,
            valid_until: new.valid_until,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %coupon.id, code = %coupon.code, kind = coupon.kind.as_str(), "Inserting coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, kind, value, usage_limit, usage_count,
                valid_from, valid_until, is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, 0,
                ?6, ?7, ?8, ?9, ?10
            )
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.kind)
        .bind(coupon.value)
        .bind(coupon.usage_limit)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.is_active)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, coupon.code.clone()),
            other => other,
        })?;

        Ok(coupon)
    }

    /// `GetCoupon(code)`: case-sensitive lookup.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_code(&mut conn, code).await
    }

    /// Gets a coupon by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Coupon>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id(&mut conn, id).await
    }

    /// Switches a coupon on or off.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        debug!(id = %id, active, "Setting coupon active flag");

        let result = sqlx::query("UPDATE coupons SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        Ok(())
    }

    // =========================================================================
    // Connection-level queries (usable inside a transaction)
    // =========================================================================

    /// Case-sensitive lookup by code (SQLite's default BINARY collation).
    pub async fn find_by_code(conn: &mut SqliteConnection, code: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1");
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(code)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(coupon)
    }

    /// Lookup by ID.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1");
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(coupon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_db;
    use chrono::Duration;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = seeded_db().await;
        let now = Utc::now();

        let inserted = db
            .coupons()
            .insert(
                &NewCoupon::percentage("SPRING20", 2000)
                    .usage_limit(3)
                    .valid_between(Some(now - Duration::days(1)), Some(now + Duration::days(30))),
            )
            .await
            .unwrap();

        let by_code = db.coupons().get_by_code("SPRING20").await.unwrap().unwrap();
        assert_eq!(by_code.id, inserted.id);
        assert_eq!(by_code.kind, CouponKind::Percentage);
        assert_eq!(by_code.value, 2000);
        assert_eq!(by_code.usage_limit, Some(3));
        assert_eq!(by_code.usage_count, 0);
        assert!(by_code.valid_until.is_some());

        let by_id = db.coupons().get_by_id(&inserted.id).await.unwrap();
        assert!(by_id.is_some());
    }

    #[tokio::test]
    async fn test_code_lookup_is_case_sensitive() {
        let db = seeded_db().await;
        db.coupons().insert(&NewCoupon::fixed("Welcome5", 500)).await.unwrap();

        assert!(db.coupons().get_by_code("Welcome5").await.unwrap().is_some());
        assert!(db.coupons().get_by_code("WELCOME5").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = seeded_db().await;
        db.coupons().insert(&NewCoupon::fixed("ONCE", 100)).await.unwrap();

        let err = db.coupons().insert(&NewCoupon::fixed("ONCE", 200)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "ONCE"));
    }

    #[tokio::test]
    async fn test_invalid_definitions_rejected() {
        let db = seeded_db().await;
        let now = Utc::now();

        let cases = vec![
            NewCoupon::percentage("TOO-MUCH", 10_001),
            NewCoupon::fixed("NEGATIVE", -1),
            NewCoupon::fixed("bad code", 100),
            NewCoupon::fixed("NEG-LIMIT", 100).usage_limit(-1),
            NewCoupon::fixed("BACKWARDS", 100).valid_between(Some(now), Some(now - Duration::days(1))),
        ];

        for case in cases {
            let err = db.coupons().insert(&case).await.unwrap_err();
            assert!(matches!(err, DbError::InvalidDefinition(_)), "{} accepted", case.code);
        }
    }

    #[tokio::test]
    async fn test_set_active() {
        let db = seeded_db().await;
        let coupon = db.coupons().insert(&NewCoupon::fixed("OFF", 100)).await.unwrap();

        db.coupons().set_active(&coupon.id, false).await.unwrap();
        let stored = db.coupons().get_by_id(&coupon.id).await.unwrap().unwrap();
        assert!(!stored.is_active);

        let err = db.coupons().set_active("missing", true).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
