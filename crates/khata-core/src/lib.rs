//! # khata-core: Pure Billing Logic for Khata
//!
//! This crate turns kitchen orders into GST invoices. It holds every rule
//! about money, discounts, tax and numbering as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Khata Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               khata-billing (Bill Lifecycle)                    │   │
//! │  │    create, update_payment, cancel, preview, summary            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ khata-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐ ┌──────────┐ ┌──────────┐ ┌───────────────┐  │   │
//! │  │   │consolidate │ │ discount │ │   tax    │ │    fiscal     │  │   │
//! │  │   │ orders →   │ │ item +   │ │ service, │ │ FY + bill     │  │   │
//! │  │   │ bill items │ │ bill     │ │ GST, R/O │ │ numbers       │  │   │
//! │  │   └────────────┘ └──────────┘ └──────────┘ └───────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    khata-db (Database Layer)                    │   │
//! │  │         SQLite queries, migrations, sequences, repositories     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Bill, TaxConfig, status enums)
//! - [`money`] - Money type with integer paise arithmetic
//! - [`consolidate`] - Orders to bill items
//! - [`discount`] - Item and bill discounts
//! - [`tax`] - Service charge, packaging, GST, round-off
//! - [`fiscal`] - Indian fiscal years and bill numbers
//! - [`summary`] - Sales summary over a date range
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use khata_core::consolidate::ItemDiscounts;
//! use khata_core::tax::calculate_for_orders;
//! use khata_core::{Money, Order, OrderLine, OrderStatus, OrderType, TaxConfig};
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let order = Order {
//!     id: "o1".into(),
//!     restaurant_id: "r1".into(),
//!     table_number: "T4".into(),
//!     order_type: OrderType::DineIn,
//!     status: OrderStatus::Served,
//!     items: vec![
//!         OrderLine { item_id: "a".into(), name: "Paneer".into(), quantity: 2, unit_price: Money::from_rupees(100) },
//!         OrderLine { item_id: "b".into(), name: "Lassi".into(), quantity: 1, unit_price: Money::from_rupees(50) },
//!     ],
//!     bill_id: None,
//!     created_at: now,
//!     updated_at: now,
//! };
//!
//! let calc = calculate_for_orders(
//!     &[order],
//!     &ItemDiscounts::new(),
//!     &TaxConfig::default(),
//!     None,
//!     OrderType::DineIn,
//!     None,
//! );
//!
//! // 250.00 + 6.25 CGST + 6.25 SGST = 262.50, rounded to 263
//! assert_eq!(calc.grand_total, Money::from_rupees(263));
//! assert_eq!(calc.round_off.paise(), 50);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod consolidate;
pub mod discount;
pub mod error;
pub mod fiscal;
pub mod money;
pub mod summary;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use fiscal::FiscalYear;
pub use money::Money;
pub use summary::SalesSummary;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a formatted bill number (`INV/2526/0001` is 13).
pub const MAX_BILL_NUMBER_LEN: usize = 16;

/// Longest bill prefix that still fits a four-digit sequence.
pub const MAX_BILL_PREFIX_LEN: usize = 6;

/// Split entries may differ from the amount they cover by at most one paisa.
pub const SPLIT_TOLERANCE: Money = Money::from_paise(1);

/// Largest amount accepted for a price, charge, discount or payment (₹10 crore).
pub const MAX_AMOUNT: Money = Money::from_rupees(100_000_000);

/// Largest quantity accepted on an order line.
pub const MAX_QUANTITY: i64 = 10_000;

/// A split payment needs at least this many entries.
pub const MIN_SPLIT_ENTRIES: usize = 2;

/// Maximum length of notes, discount reasons and cancellation reasons.
pub const MAX_TEXT_LEN: usize = 500;
