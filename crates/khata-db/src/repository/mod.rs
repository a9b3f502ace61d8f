//! # Repository Module
//!
//! Database repository implementations for Khata.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  BillingService                                                        │
//! │       │                                                                 │
//! │       ├── db.restaurants().get_tax_config(id)      pool, read          │
//! │       ├── db.orders().list_billable(id, ids)       pool, read          │
//! │       ├── db.bills().get_by_id(id, bill_id)        pool, read          │
//! │       ├── db.bills().save_payment(&bill)           pool, 1 statement   │
//! │       │                                                                 │
//! │       └── db.begin() → BillingTx                   multi-statement     │
//! │              claim / allocate / insert / cancel / release              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Statements that must run inside a transaction are `pub(crate)` functions
//! generic over the executor, so [`crate::tx::BillingTx`] can call them on
//! its connection while the repositories call them on the pool.
//!
//! ## Available Repositories
//!
//! - [`restaurant::RestaurantRepository`] - Tax configuration
//! - [`order::OrderRepository`] - Orders and their bill links
//! - [`bill::BillRepository`] - Bill queries and payment updates
//! - [`sequence::SequenceRepository`] - Advisory next-number reads

pub mod bill;
pub mod order;
pub mod restaurant;
pub mod sequence;
