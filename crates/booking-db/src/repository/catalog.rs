//! # Catalog Repository
//!
//! Services and their bookable options.
//!
//! The admin collaborator owns these rows; the engine only ever reads
//! `GetActiveOptions(service_id)` through [`CatalogRepository::fetch_catalog`].
//! The insert helpers exist for provisioning (seed binary, tests).

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use booking_core::validation::validate_option;
use booking_core::{ServiceCatalog, ServiceOption, ValidationError};

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Inserts a service.
    pub async fn insert_service(&self, id: &str, name: &str) -> DbResult<()> {
        if name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            }
            .into());
        }

        debug!(id = %id, name = %name, "Inserting service");

        sqlx::query(
            r#"
            INSERT INTO services (id, name, is_active, created_at)
            VALUES (?1, ?2, 1, ?3)
            "#,
        )
        .bind(id)
        .bind(name.trim())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts an option after validating its definition.
    ///
    /// Options are listed in insertion order.
    pub async fn insert_option(&self, option: &ServiceOption) -> DbResult<()> {
        validate_option(option)?;

        debug!(id = %option.id, service_id = %option.service_id, "Inserting service option");

        sqlx::query(
            r#"
            INSERT INTO service_options (
                id, service_id, label, unit_price,
                min_qty, max_qty, is_variable, is_active, position
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM service_options WHERE service_id = ?2)
            )
            "#,
        )
        .bind(&option.id)
        .bind(&option.service_id)
        .bind(option.label.trim())
        .bind(option.unit_price)
        .bind(option.min_qty)
        .bind(option.max_qty)
        .bind(option.is_variable)
        .bind(option.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Switches an option on or off.
    pub async fn set_option_active(&self, id: &str, active: bool) -> DbResult<()> {
        debug!(id = %id, active, "Setting option active flag");

        let result = sqlx::query("UPDATE service_options SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ServiceOption", id));
        }

        Ok(())
    }

    /// `GetActiveOptions(service_id)`: active options of an active service.
    pub async fn get_active_options(&self, service_id: &str) -> DbResult<Vec<ServiceOption>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_active_options(&mut conn, service_id).await
    }

    /// Loads the priceable catalog for `service_id`.
    pub async fn load(&self, service_id: &str) -> DbResult<ServiceCatalog> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_catalog(&mut conn, service_id).await
    }

    /// Counts active services (for diagnostics and the seed binary).
    pub async fn count_services(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Connection-level queries (usable inside a transaction)
    // =========================================================================

    /// Active options of `service_id`, empty when the service is unknown or
    /// switched off.
    pub async fn fetch_active_options(
        conn: &mut SqliteConnection,
        service_id: &str,
    ) -> DbResult<Vec<ServiceOption>> {
        let options = sqlx::query_as::<_, ServiceOption>(
            r#"
            SELECT
                o.id, o.service_id, o.label, o.unit_price,
                o.min_qty, o.max_qty, o.is_variable, o.is_active
            FROM service_options o
            JOIN services s ON s.id = o.service_id
            WHERE o.service_id = ?1 AND o.is_active = 1 AND s.is_active = 1
            ORDER BY o.position, o.id
            "#,
        )
        .bind(service_id)
        .fetch_all(&mut *conn)
        .await?;

        debug!(service_id = %service_id, count = options.len(), "Fetched active options");

        Ok(options)
    }

    /// Wraps [`Self::fetch_active_options`] in a [`ServiceCatalog`].
    pub async fn fetch_catalog(conn: &mut SqliteConnection, service_id: &str) -> DbResult<ServiceCatalog> {
        let options = Self::fetch_active_options(conn, service_id).await?;
        Ok(ServiceCatalog::new(service_id, options))
    }
}

/// Helper to generate a new catalog ID.
pub fn generate_catalog_id() -> String {
    Uuid::new_v4().to_string()
}
