//! # khata-db: Database Layer for Khata
//!
//! This crate provides database access for the Khata billing engine.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Khata Data Flow                                  │
//! │                                                                         │
//! │  BillingService::create(request)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     khata-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ Restaurants   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Orders        │    │ 001_initial_ │  │   │
//! │  │   │ BillingTx     │    │ Bills         │    │   schema.sql │  │   │
//! │  │   │   (tx.rs)     │    │ Sequences     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │                     $KHATA_DATABASE_PATH                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`tx`] - Transaction scope shared by one billing operation
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use khata_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//!
//! let config = db.restaurants().get_tax_config("rest-1").await?;
//! let bills = db.bills().list_by_range("rest-1", from, to).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod tx;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use tx::BillingTx;

// Repository re-exports for convenience
pub use repository::bill::BillRepository;
pub use repository::order::OrderRepository;
pub use repository::restaurant::{Restaurant, RestaurantRepository};
pub use repository::sequence::SequenceRepository;
