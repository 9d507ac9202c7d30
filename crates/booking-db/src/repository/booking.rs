//! # Booking Repository
//!
//! Persistence for priced bookings and their line snapshots.
//!
//! ## Stored Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bookings                                                               │
//! │  ├── id, reference (BK-YYYYMMDD-NNNNNN), status                         │
//! │  ├── service_id, coupon_id (weak, ON DELETE SET NULL), coupon_code      │
//! │  ├── base_amount, bulk_discount, coupon_discount,                       │
//! │  │   discount_amount, final_amount           ◄── read by reporting      │
//! │  └── customer_json                                                      │
//! │                                                                         │
//! │  booking_lines (ordered by position)                                    │
//! │  └── option_id, label, unit_price, quantity, line_amount (snapshot)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes take a `&mut SqliteConnection` so the engine can run them inside
//! its transaction next to the ledger statements.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use booking_core::{Booking, BookingStatus, CustomerDetails, Money, PricedLine, PricingResult};

const BOOKING_COLUMNS: &str = r#"
    id, reference, status, service_id, coupon_id, coupon_code,
    base_amount, bulk_discount, coupon_discount, discount_amount, final_amount,
    customer_json, created_at, updated_at
"#;

/// Row shape of `bookings`.
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: String,
    reference: String,
    status: BookingStatus,
    service_id: String,
    coupon_id: Option<String>,
    coupon_code: Option<String>,
    base_amount: Money,
    bulk_discount: Money,
    coupon_discount: Money,
    discount_amount: Money,
    final_amount: Money,
    customer_json: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self, lines: Vec<PricedLine>) -> DbResult<Booking> {
        let customer: CustomerDetails = serde_json::from_str(&self.customer_json)?;

        Ok(Booking {
            id: self.id,
            reference: self.reference,
            status: self.status,
            service_id: self.service_id,
            lines,
            coupon_id: self.coupon_id,
            coupon_code: self.coupon_code,
            pricing: PricingResult {
                base_amount: self.base_amount,
                bulk_discount: self.bulk_discount,
                coupon_discount: self.coupon_discount,
                discount_amount: self.discount_amount,
                final_amount: self.final_amount,
            },
            customer,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Gets a booking (with lines) by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    /// Gets a booking by its human-facing reference.
    pub async fn get_by_reference(&self, reference: &str) -> DbResult<Option<Booking>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE reference = ?1");
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(reference)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => {
                let lines = Self::fetch_lines(&mut conn, &row.id).await?;
                Ok(Some(row.into_booking(lines)?))
            }
            None => Ok(None),
        }
    }

    /// Lists bookings in `status`, newest first.
    pub async fn list_by_status(&self, status: BookingStatus, limit: i64) -> DbResult<Vec<Booking>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = ?1 ORDER BY created_at DESC, reference DESC LIMIT ?2"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(status)
            .bind(limit)
            .fetch_all(&mut *conn)
            .await?;

        debug!(status = %status, count = rows.len(), "Listed bookings");

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = Self::fetch_lines(&mut conn, &row.id).await?;
            bookings.push(row.into_booking(lines)?);
        }

        Ok(bookings)
    }

    // =========================================================================
    // Connection-level queries (usable inside a transaction)
    // =========================================================================

    /// Loads a booking and its lines.
    pub async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => {
                let lines = Self::fetch_lines(conn, &row.id).await?;
                Ok(Some(row.into_booking(lines)?))
            }
            None => Ok(None),
        }
    }

    /// Draws the next reference from `booking_sequence`.
    ///
    /// ## Format
    /// `BK-YYYYMMDD-NNNNNN`, the number is global and monotonic (it does not
    /// reset daily), so references never collide.
    pub async fn next_reference(conn: &mut SqliteConnection, now: DateTime<Utc>) -> DbResult<String> {
        let seq: i64 = sqlx::query_scalar(
            "UPDATE booking_sequence SET last_value = last_value + 1 WHERE id = 1 RETURNING last_value",
        )
        .fetch_one(&mut *conn)
        .await?;

        Ok(format!("BK-{}-{:06}", now.format("%Y%m%d"), seq))
    }

    /// Inserts a booking and its lines.
    pub async fn insert(conn: &mut SqliteConnection, booking: &Booking) -> DbResult<()> {
        debug!(id = %booking.id, reference = %booking.reference, "Inserting booking");

        let customer_json = serde_json::to_string(&booking.customer)?;
        let pricing = &booking.pricing;

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, reference, status, service_id, coupon_id, coupon_code,
                base_amount, bulk_discount, coupon_discount, discount_amount, final_amount,
                customer_json, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14
            )
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.reference)
        .bind(booking.status)
        .bind(&booking.service_id)
        .bind(&booking.coupon_id)
        .bind(&booking.coupon_code)
        .bind(pricing.base_amount)
        .bind(pricing.bulk_discount)
        .bind(pricing.coupon_discount)
        .bind(pricing.discount_amount)
        .bind(pricing.final_amount)
        .bind(customer_json)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *conn)
        .await?;

        Self::insert_lines(conn, &booking.id, &booking.lines).await
    }

    /// Rewrites the priced part of a booking: service, lines, coupon
    /// association and amounts.
    ///
    /// Only succeeds while the stored status still equals `booking.status`.
    pub async fn update_pricing(conn: &mut SqliteConnection, booking: &Booking) -> DbResult<()> {
        debug!(id = %booking.id, "Updating booking pricing");

        let pricing = &booking.pricing;

        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                service_id = ?3,
                coupon_id = ?4,
                coupon_code = ?5,
                base_amount = ?6,
                bulk_discount = ?7,
                coupon_discount = ?8,
                discount_amount = ?9,
                final_amount = ?10,
                updated_at = ?11
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(&booking.id)
        .bind(booking.status)
        .bind(&booking.service_id)
        .bind(&booking.coupon_id)
        .bind(&booking.coupon_code)
        .bind(pricing.base_amount)
        .bind(pricing.bulk_discount)
        .bind(pricing.coupon_discount)
        .bind(pricing.discount_amount)
        .bind(pricing.final_amount)
        .bind(booking.updated_at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Booking", &booking.id));
        }

        sqlx::query("DELETE FROM booking_lines WHERE booking_id = ?1")
            .bind(&booking.id)
            .execute(&mut *conn)
            .await?;

        Self::insert_lines(conn, &booking.id, &booking.lines).await
    }

    /// Moves a booking from `from` to `to`.
    ///
    /// ## Returns
    /// * `Ok(true)` - the row was in `from` and now is in `to`
    /// * `Ok(false)` - the row was not in `from` (or does not exist)
    pub async fn update_status(
        conn: &mut SqliteConnection,
        id: &str,
        from: BookingStatus,
        to: BookingStatus,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        debug!(id = %id, from = %from, to = %to, "Updating booking status");

        let result = sqlx::query(
            "UPDATE bookings SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn fetch_lines(conn: &mut SqliteConnection, booking_id: &str) -> DbResult<Vec<PricedLine>> {
        let lines = sqlx::query_as::<_, PricedLine>(
            r#"
            SELECT option_id, label, unit_price, quantity, line_amount
            FROM booking_lines
            WHERE booking_id = ?1
            ORDER BY position
            "#,
        )
        .bind(booking_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(lines)
    }

    async fn insert_lines(conn: &mut SqliteConnection, booking_id: &str, lines: &[PricedLine]) -> DbResult<()> {
        for (position, line) in lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO booking_lines (
                    booking_id, position, option_id, label,
                    unit_price, quantity, line_amount
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(booking_id)
            .bind(position as i64)
            .bind(&line.option_id)
            .bind(&line.label)
            .bind(line.unit_price)
            .bind(line.quantity)
            .bind(line.line_amount)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{customer, seeded_db, SERVICE_ID};
    use uuid::Uuid;

    fn booking(reference: &str) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4().to_string(),
            reference: reference.to_string(),
            status: BookingStatus::Pending,
            service_id: SERVICE_ID.to_string(),
            lines: vec![
                PricedLine {
                    option_id: "opt-a".to_string(),
                    label: "Deep clean".to_string(),
                    unit_price: Money::from_minor(2000),
                    quantity: 1,
                    line_amount: Money::from_minor(2000),
                },
                PricedLine {
                    option_id: "opt-b".to_string(),
                    label: "Extra room".to_string(),
                    unit_price: Money::from_minor(500),
                    quantity: 3,
                    line_amount: Money::from_minor(1500),
                },
            ],
            coupon_id: None,
            coupon_code: None,
            pricing: PricingResult::from_components(
                Money::from_minor(3500),
                Money::from_minor(1166),
                Money::zero(),
            ),
            customer: customer(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_round_trip() {
        let db = seeded_db().await;
        let original = booking("BK-20260101-000001");

        let mut conn = db.pool().acquire().await.unwrap();
        BookingRepository::insert(&mut conn, &original).await.unwrap();
        drop(conn);

        let stored = db.bookings().get_by_id(&original.id).await.unwrap().unwrap();
        assert_eq!(stored.reference, original.reference);
        assert_eq!(stored.lines, original.lines);
        assert_eq!(stored.pricing, original.pricing);
        assert_eq!(stored.customer, original.customer);
        assert_eq!(stored.status, BookingStatus::Pending);

        let by_ref = db.bookings().get_by_reference("BK-20260101-000001").await.unwrap();
        assert_eq!(by_ref.map(|b| b.id), Some(original.id));
    }

    #[tokio::test]
    async fn test_references_are_monotonic() {
        let db = seeded_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let now = Utc::now();

        let first = BookingRepository::next_reference(&mut conn, now).await.unwrap();
        let second = BookingRepository::next_reference(&mut conn, now).await.unwrap();

        let date = now.format("%Y%m%d").to_string();
        assert_eq!(first, format!("BK-{date}-000001"));
        assert_eq!(second, format!("BK-{date}-000002"));
    }

    #[tokio::test]
    async fn test_status_update_is_conditional() {
        let db = seeded_db().await;
        let original = booking("BK-20260101-000002");
        let mut conn = db.pool().acquire().await.unwrap();
        BookingRepository::insert(&mut conn, &original).await.unwrap();

        let now = Utc::now();
        let moved = BookingRepository::update_status(
            &mut conn,
            &original.id,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            now,
        )
        .await
        .unwrap();
        assert!(moved);

        let stale = BookingRepository::update_status(
            &mut conn,
            &original.id,
            BookingStatus::Pending,
            BookingStatus::Cancelled,
            now,
        )
        .await
        .unwrap();
        assert!(!stale);
    }

    #[tokio::test]
    async fn test_update_pricing_replaces_lines() {
        let db = seeded_db().await;
        let mut updated = booking("BK-20260101-000003");
        let mut conn = db.pool().acquire().await.unwrap();
        BookingRepository::insert(&mut conn, &updated).await.unwrap();

        updated.lines.truncate(1);
        updated.pricing = PricingResult::from_components(Money::from_minor(2000), Money::zero(), Money::zero());
        BookingRepository::update_pricing(&mut conn, &updated).await.unwrap();

        let stored = BookingRepository::fetch(&mut conn, &updated.id).await.unwrap().unwrap();
        assert_eq!(stored.lines.len(), 1);
        assert_eq!(stored.pricing.final_amount, Money::from_minor(2000));
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let db = seeded_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        for n in 1..=3 {
            BookingRepository::insert(&mut conn, &booking(&format!("BK-20260101-00001{n}")))
                .await
                .unwrap();
        }
        drop(conn);

        let pending = db.bookings().list_by_status(BookingStatus::Pending, 10).await.unwrap();
        assert_eq!(pending.len(), 3);
        assert!(pending.iter().all(|b| b.lines.len() == 2));

        let cancelled = db.bookings().list_by_status(BookingStatus::Cancelled, 10).await.unwrap();
        assert!(cancelled.is_empty());
    }

    #[tokio::test]
    async fn test_inconsistent_amounts_rejected_by_schema() {
        let db = seeded_db().await;
        let mut bad = booking("BK-20260101-000099");
        bad.pricing.final_amount = Money::from_minor(1);

        let mut conn = db.pool().acquire().await.unwrap();
        let err = BookingRepository::insert(&mut conn, &bad).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }
}
