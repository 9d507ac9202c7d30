//! Shared fixtures for the database tests.
//!
//! The seeded catalog is the reference example used throughout:
//! `opt-a` flat £20.00, `opt-b` variable £5.00/unit (1..=10).

use booking_core::{CustomerDetails, Money, ServiceOption};

use crate::pool::{Database, DbConfig};

pub const SERVICE_ID: &str = "svc-clean";

pub fn option(id: &str, price: i64, variable: bool, max_qty: Option<i64>) -> ServiceOption {
    ServiceOption {
        id: id.to_string(),
        service_id: SERVICE_ID.to_string(),
        label: id.to_string(),
        unit_price: Money::from_minor(price),
        min_qty: 1,
        max_qty,
        is_variable: variable,
        is_active: true,
    }
}

pub fn customer() -> CustomerDetails {
    CustomerDetails {
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        phone: Some("+44 7700 900123".to_string()),
        notes: Some("Side gate code 1234".to_string()),
    }
}

async fn seed(db: &Database) {
    db.catalog().insert_service(SERVICE_ID, "Home cleaning").await.unwrap();

    let mut flat = option("opt-a", 2000, false, None);
    flat.label = "Deep clean".to_string();
    db.catalog().insert_option(&flat).await.unwrap();

    let mut variable = option("opt-b", 500, true, Some(10));
    variable.label = "Extra room".to_string();
    db.catalog().insert_option(&variable).await.unwrap();
}

/// In-memory database holding the reference catalog.
pub async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    seed(&db).await;
    db
}

/// On-disk WAL database holding the reference catalog, for tests that need
/// several connections at once. Keep the returned directory alive.
pub async fn seeded_file_db(max_connections: u32) -> (Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("bookings.db")).max_connections(max_connections);

    let db = Database::new(config).await.unwrap();
    seed(&db).await;
    (db, dir)
}
