//! # Repository Module
//!
//! Database repository implementations for the booking engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways In                                          │
//! │                                                                         │
//! │  1. Pool-backed methods (&self)                                        │
//! │     db.coupons().get_by_code("SPRING20")                               │
//! │     → acquires a connection, runs, releases                            │
//! │                                                                         │
//! │  2. Connection-level functions (conn: &mut SqliteConnection)           │
//! │     CouponRepository::find_by_code(&mut tx, "SPRING20")                │
//! │     → runs on the caller's connection, usually inside the              │
//! │       BookingEngine's BEGIN IMMEDIATE transaction                      │
//! │                                                                         │
//! │  The engine only uses (2) for anything that writes.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Services and options (read by pricing)
//! - [`coupon::CouponRepository`] - Coupon definitions
//! - [`booking::BookingRepository`] - Bookings and line snapshots
//! - [`ledger::CouponUsageLedger`] - Atomic coupon usage counter

pub mod booking;
pub mod catalog;
pub mod coupon;
pub mod ledger;
