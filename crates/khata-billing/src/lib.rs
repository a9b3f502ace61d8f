//! # khata-billing: Bill Lifecycle Manager
//!
//! Turns served restaurant orders into numbered GST invoices, and records
//! payments and cancellations against them.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        khata-billing                                    │
//! │                                                                         │
//! │   caller (HTTP handler, Tauri command, test)                            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────────────┐    pure math     ┌──────────────────────────┐   │
//! │   │  BillingService  │ ───────────────► │ khata-core               │   │
//! │   │                  │                  │ consolidate/discount/tax │   │
//! │   │  create          │                  └──────────────────────────┘   │
//! │   │  update_payment  │    BillingTx     ┌──────────────────────────┐   │
//! │   │  cancel          │ ───────────────► │ khata-db                 │   │
//! │   │  preview_*       │                  │ orders/sequences/bills   │   │
//! │   │  get_summary     │                  └──────────────────────────┘   │
//! │   └────────┬─────────┘                                                  │
//! │            │ after commit                                               │
//! │            ▼                                                            │
//! │   ┌──────────────────┐                                                  │
//! │   │    EventSink     │  NoopSink / LogSink / ChannelSink                │
//! │   └──────────────────┘                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use khata_billing::{BillingService, CreateBillRequest, LogSink, ServiceConfig};
//! use khata_db::{Database, DbConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DbConfig::from_env()).await?;
//! let billing = BillingService::new(db, ServiceConfig::from_env())
//!     .with_sink(Arc::new(LogSink));
//!
//! let request = CreateBillRequest::new("rest-demo", vec!["order-1".into()], "T1", "staff-1");
//! let bill = billing.create(&request).await?;
//! println!("{} {}", bill.bill_number, bill.grand_total);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod requests;
pub mod service;

pub use config::ServiceConfig;
pub use error::{BillingError, BillingResult, ErrorCode};
pub use events::{BillSnapshot, BillingEvent, ChannelSink, EventSink, LogSink, NoopSink, SinkError};
pub use requests::{CreateBillRequest, PreviewRequest, UpdatePaymentRequest};
pub use service::BillingService;
