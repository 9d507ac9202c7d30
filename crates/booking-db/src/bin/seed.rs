//! # Seed Data Generator
//!
//! Provisions a demo catalog and coupons for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by BOOKING_DATABASE_PATH (default ./bookings.db)
//! cargo run -p booking-db --bin seed
//!
//! # Specify database path
//! cargo run -p booking-db --bin seed -- --db ./data/bookings.db
//! ```
//!
//! ## Seeded Data
//! - One cleaning service with a flat "Deep clean" and per-unit rooms/extras
//! - Coupons: `SPRING20` (20%, 100 uses), `WELCOME5` (5.00 off, unlimited),
//!   `EXPIRED10` (10%, ended yesterday)
//!
//! Finishes by previewing the reference quote (deep clean + 3 extra rooms),
//! with and without `SPRING20`.

use chrono::{Duration, Utc};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

use booking_core::{Money, Selection, ServiceOption};
use booking_db::repository::catalog::generate_catalog_id;
use booking_db::{Database, EngineConfig, NewCoupon};

const SERVICE_ID: &str = "svc-home-clean";

/// (label, unit price in pence, variable, max quantity)
const OPTIONS: &[(&str, i64, bool, Option<i64>)] = &[
    ("Deep clean", 2000, false, None),
    ("Extra room", 500, true, Some(10)),
    ("Oven clean", 1500, false, None),
    ("Window panel", 150, true, Some(40)),
    ("Carpet shampoo (per room)", 1200, true, Some(8)),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config = EngineConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.db.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Booking Engine Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $BOOKING_DATABASE_PATH or ./bookings.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Booking Engine Seed Data Generator");
    println!("==================================");
    println!("Database: {}", config.db.database_path.display());
    println!();

    let db = Database::new(config.db.clone()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count_services().await?;
    if existing > 0 {
        println!("⚠ Database already has {} services", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    db.catalog().insert_service(SERVICE_ID, "Home cleaning").await?;

    let mut option_ids = Vec::with_capacity(OPTIONS.len());
    for (label, price, variable, max_qty) in OPTIONS {
        let option = ServiceOption {
            id: generate_catalog_id(),
            service_id: SERVICE_ID.to_string(),
            label: label.to_string(),
            unit_price: Money::from_minor(*price),
            min_qty: 1,
            max_qty: *max_qty,
            is_variable: *variable,
            is_active: true,
        };
        db.catalog().insert_option(&option).await?;
        option_ids.push(option.id);
    }
    println!("✓ Seeded {} options for {}", option_ids.len(), SERVICE_ID);

    let now = Utc::now();
    let coupons = [
        NewCoupon::percentage("SPRING20", 2000).usage_limit(100),
        NewCoupon::fixed("WELCOME5", 500),
        NewCoupon::percentage("EXPIRED10", 1000).valid_between(
            Some(now - Duration::days(30)),
            Some(now - Duration::days(1)),
        ),
    ];
    for coupon in &coupons {
        let stored = db.coupons().insert(coupon).await?;
        info!(code = %stored.code, kind = %stored.kind.as_str(), "Seeded coupon");
    }
    println!("✓ Seeded {} coupons", coupons.len());

    // Reference quote: deep clean + 3 extra rooms
    let engine = db.engine(config.policy);
    let selections = [
        Selection::single(option_ids[0].clone()),
        Selection::new(option_ids[1].clone(), 3),
    ];

    println!();
    for code in [None, Some("SPRING20"), Some("EXPIRED10")] {
        let quote = engine.preview_price(SERVICE_ID, &selections, code, now).await?;
        let p = &quote.pricing;
        println!(
            "  {:<10} base {} - bulk {} - coupon {} = {}{}",
            code.unwrap_or("(none)"),
            p.base_amount,
            p.bulk_discount,
            p.coupon_discount,
            p.final_amount,
            quote
                .coupon_rejection()
                .map(|r| format!("  [{r}]"))
                .unwrap_or_default(),
        );
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
