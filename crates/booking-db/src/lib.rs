//! # booking-db: Database Layer and Booking Engine
//!
//! SQLite storage for the booking engine, and the units of work that keep
//! pricing, the coupon usage ledger and booking state consistent.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Booking Data Flow                                │
//! │                                                                         │
//! │  Site controller / admin console                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     booking-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ BookingEngine │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (engine.rs)  │───►│ Catalog       │    │  (embedded)  │  │   │
//! │  │   │               │    │ Coupon        │    │              │  │   │
//! │  │   │ BEGIN         │    │ Booking       │    │ 001_initial  │  │   │
//! │  │   │ IMMEDIATE     │    │ UsageLedger   │    │ _schema.sql  │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │ quote()                                            │   │
//! │  │           ▼                                                    │   │
//! │  │   booking-core (pure pricing + lifecycle)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and engine error types
//! - [`repository`] - Catalog, coupon, booking repositories and the usage ledger
//! - [`engine`] - The booking units of work
//! - [`config`] - Environment configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use booking_db::{Database, EngineConfig, NewBooking};
//!
//! let config = EngineConfig::from_env()?;
//! let db = Database::new(config.db).await?;
//! let engine = db.engine(config.policy);
//!
//! let receipt = engine.create_booking(&request, Utc::now()).await?;
//! println!("{}", receipt.booking.reference);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, EngineConfig};
pub use engine::{BookingChanges, BookingEngine, BookingReceipt, NewBooking};
pub use error::{BookingError, BookingResult, DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::booking::BookingRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::coupon::{CouponRepository, NewCoupon};
pub use repository::ledger::{CouponUsageLedger, Decrement};
