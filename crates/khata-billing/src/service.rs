//! # Bill Lifecycle Manager
//!
//! [`BillingService`] is the only writer of bills. Each operation is at most
//! one database transaction, committed or rolled back exactly once.
//!
//! ## State Machine
//! ```text
//!            create
//!               │
//!               ▼
//!  ┌────────┐  pay   ┌────────────────┐  pay   ┌──────┐
//!  │ unpaid │ ─────► │ partially_paid │ ─────► │ paid │
//!  └───┬────┘        └───────┬────────┘        └──┬───┘
//!      │ cancel              │ cancel             │ cancel
//!      └─────────────────────┴──────────┬─────────┘
//!                                       ▼
//!                                ┌───────────┐
//!                                │ cancelled │  terminal, number kept
//!                                └───────────┘
//! ```
//!
//! ## Create Transaction
//! ```text
//! validate request ──► read tax config ──► BEGIN
//!     claim orders (guarded UPDATE)      count ≠ requested → ROLLBACK, Validation
//!     read claimed orders
//!     single table?                      no → ROLLBACK, Validation
//!     consolidate / discount / tax
//!     split sum = grand total?           no → ROLLBACK, Validation
//!     allocate sequence (upsert)
//!     format number                      > 16 chars → ROLLBACK, FatalConfiguration
//!     insert bill                        duplicate → ROLLBACK, Conflict
//! COMMIT ──► notify sink (failures logged only)
//! ```
//!
//! The pool is never touched while a transaction is open: with a single
//! connection (in-memory databases) that would wait on itself.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use khata_core::consolidate::single_table;
use khata_core::fiscal::format_bill_number;
use khata_core::summary::summarize;
use khata_core::tax::calculate_for_orders;
use khata_core::validation::{
    validate_cancel_reason, validate_gstin, validate_order_lines, validate_split_payments,
    validate_tax_config, validate_uuid,
};
use khata_core::{
    Bill, BillNumber, Calculation, Money, PaymentMode, PaymentStatus, SalesSummary, TaxConfig,
    ValidationError,
};
use khata_db::{BillingTx, Database, Restaurant};

use crate::config::ServiceConfig;
use crate::error::{BillingError, BillingResult};
use crate::events::{BillingEvent, EventSink, NoopSink};
use crate::requests::{CreateBillRequest, PreviewRequest, UpdatePaymentRequest};

/// Bill lifecycle operations over one database.
#[derive(Clone)]
pub struct BillingService {
    db: Database,
    config: ServiceConfig,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for BillingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BillingService {
    /// Creates a service that publishes nothing.
    pub fn new(db: Database, config: ServiceConfig) -> Self {
        BillingService {
            db,
            config,
            sink: Arc::new(NoopSink),
        }
    }

    /// Replaces the event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Restaurant Configuration
    // =========================================================================

    /// Validates and stores a restaurant's tax configuration.
    ///
    /// Rejects odd GST rates (they cannot split into equal CGST/SGST),
    /// rates above 100%, and prefixes that cannot fit a bill number.
    pub async fn save_restaurant(&self, restaurant: &Restaurant) -> BillingResult<Restaurant> {
        if restaurant.id.trim().is_empty() {
            return Err(ValidationError::required("restaurant_id").into());
        }
        validate_tax_config(&restaurant.tax_config)?;

        let mut restaurant = restaurant.clone();
        restaurant.gstin = match restaurant.gstin.as_deref().map(str::trim) {
            Some(gstin) if !gstin.is_empty() => Some(validate_gstin(gstin)?),
            _ => None,
        };
        restaurant.updated_at = Utc::now();

        self.db.restaurants().upsert(&restaurant).await?;
        info!(restaurant_id = %restaurant.id, prefix = %restaurant.tax_config.bill_prefix, "Restaurant configuration saved");

        Ok(restaurant)
    }

    async fn tax_config(&self, restaurant_id: &str) -> BillingResult<TaxConfig> {
        Ok(self.db.restaurants().get_tax_config(restaurant_id).await?)
    }

    // =========================================================================
    // Preview
    // =========================================================================

    /// Calculates a bill for the orders without writing anything or
    /// allocating a number.
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id))]
    pub async fn preview_calculation(&self, request: &PreviewRequest) -> BillingResult<Calculation> {
        request.validate()?;
        let config = self.tax_config(&request.restaurant_id).await?;

        let orders = self
            .db
            .orders()
            .list_billable(&request.restaurant_id, &request.order_ids)
            .await?;
        if orders.len() != request.order_ids.len() {
            return Err(ValidationError::OrdersUnavailable {
                requested: request.order_ids.len(),
                found: orders.len(),
            }
            .into());
        }
        single_table(&orders)?;
        validate_order_lines(&orders)?;

        let calculation = calculate_for_orders(
            &orders,
            &request.item_discounts,
            &config,
            request.bill_discount.as_ref(),
            request.order_type,
            request.packaging_charge,
        );
        debug!(grand_total = %calculation.grand_total, "Preview calculated");

        Ok(calculation)
    }

    /// The number the next bill would get.
    ///
    /// Advisory only: nothing is reserved, and a concurrent `create` may
    /// take this number first. Never use it to label a bill.
    pub async fn next_number_preview(&self, restaurant_id: &str) -> BillingResult<BillNumber> {
        let config = self.tax_config(restaurant_id).await?;
        let fiscal_year = self.config.fiscal_year(Utc::now());
        let label = fiscal_year.label();

        let sequence_number = self.db.sequences().peek_next(restaurant_id, &label).await?;
        let bill_number = format_bill_number(&config.bill_prefix, fiscal_year, sequence_number)?;

        Ok(BillNumber {
            bill_number,
            fiscal_year: label,
            sequence_number,
        })
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a bill for a table's served orders.
    ///
    /// Either the bill, its number and the order links all commit, or
    /// nothing does.
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id, table = %request.table_number))]
    pub async fn create(&self, request: &CreateBillRequest) -> BillingResult<Bill> {
        let (customer_gstin, notes) = request.validate()?;
        let config = self.tax_config(&request.restaurant_id).await?;

        let draft = BillDraft {
            id: Uuid::new_v4().to_string(),
            customer_gstin,
            notes,
            now: Utc::now(),
        };

        let mut tx = self.db.begin().await?;
        let bill = match self.create_in(&mut tx, request, &config, draft).await {
            Ok(bill) => {
                tx.commit().await?;
                bill
            }
            Err(err) => {
                rollback(tx).await;
                return Err(err);
            }
        };

        info!(
            bill_id = %bill.id,
            bill_number = %bill.bill_number,
            grand_total = %bill.grand_total,
            status = %bill.payment_status,
            "Bill created"
        );
        self.publish(BillingEvent::BillCreated((&bill).into()));

        Ok(bill)
    }

    async fn create_in(
        &self,
        tx: &mut BillingTx,
        request: &CreateBillRequest,
        config: &TaxConfig,
        draft: BillDraft,
    ) -> BillingResult<Bill> {
        let restaurant_id = request.restaurant_id.as_str();

        // First statement is a write: the transaction holds the write lock
        // from here on, so the billable check cannot go stale.
        let claimed = tx
            .claim_orders(restaurant_id, &draft.id, &request.order_ids, draft.now)
            .await?;
        if claimed as usize != request.order_ids.len() {
            return Err(ValidationError::OrdersUnavailable {
                requested: request.order_ids.len(),
                found: claimed as usize,
            }
            .into());
        }

        let orders = tx.claimed_orders(&draft.id).await?;
        validate_order_lines(&orders)?;
        let table_number = single_table(&orders)?;
        if table_number != request.table_number.trim() {
            return Err(ValidationError::MixedTables {
                tables: vec![request.table_number.trim().to_string(), table_number],
            }
            .into());
        }

        let calculation = calculate_for_orders(
            &orders,
            &request.item_discounts,
            config,
            request.bill_discount.as_ref(),
            request.order_type,
            request.packaging_charge,
        );

        if request.payment_mode == PaymentMode::Split {
            validate_split_payments(&request.split_payments, calculation.grand_total)?;
        }

        let fiscal_year = self.config.fiscal_year(draft.now);
        let label = fiscal_year.label();
        let sequence_number = tx.allocate_sequence(restaurant_id, &label, draft.now).await?;
        let bill_number = format_bill_number(&config.bill_prefix, fiscal_year, sequence_number)?;

        let bill = assemble_bill(
            request,
            draft,
            BillNumber {
                bill_number,
                fiscal_year: label,
                sequence_number,
            },
            table_number,
            calculation,
        );

        tx.insert_bill(&bill).await?;
        Ok(bill)
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Records a declared payment and recomputes status and due amount.
    ///
    /// Fails with a validation error on cancelled bills.
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id, bill_id = %request.bill_id))]
    pub async fn update_payment(&self, request: &UpdatePaymentRequest) -> BillingResult<Bill> {
        validate_uuid(&request.bill_id)?;
        request.validate()?;
        if request.payment_mode == PaymentMode::Split {
            validate_split_payments(&request.split_payments, request.paid_amount)?;
        }

        let mut bill = self.load_bill(&request.restaurant_id, &request.bill_id).await?;
        bill.record_payment(
            request.payment_mode,
            request.paid_amount,
            request.split_payments.clone(),
            Utc::now(),
        )?;

        // Guarded on the stored status: a cancel that landed after our read wins.
        if !self.db.bills().save_payment(&bill).await? {
            return Err(ValidationError::BillCancelled {
                bill_number: bill.bill_number,
            }
            .into());
        }

        info!(
            bill_number = %bill.bill_number,
            paid = %bill.paid_amount,
            due = %bill.due_amount,
            status = %bill.payment_status,
            "Payment updated"
        );
        self.publish(BillingEvent::PaymentUpdated((&bill).into()));

        Ok(bill)
    }

    // =========================================================================
    // Cancel
    // =========================================================================

    /// Cancels a bill and releases its orders for re-billing.
    ///
    /// The bill number stays allocated; sequences are never reused.
    #[instrument(skip(self, reason))]
    pub async fn cancel(&self, restaurant_id: &str, bill_id: &str, reason: &str) -> BillingResult<Bill> {
        validate_uuid(bill_id)?;
        let reason = validate_cancel_reason(reason)?;

        let mut bill = self.load_bill(restaurant_id, bill_id).await?;
        let now = Utc::now();
        bill.cancel(reason, now)?;

        let mut tx = self.db.begin().await?;
        let released = match cancel_in(&mut tx, &bill, now).await {
            Ok(released) => {
                tx.commit().await?;
                released
            }
            Err(err) => {
                rollback(tx).await;
                return Err(err);
            }
        };

        info!(bill_number = %bill.bill_number, released, "Bill cancelled");
        self.publish(BillingEvent::BillCancelled((&bill).into()));

        Ok(bill)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets a bill, failing with `NotFound` if it does not exist.
    pub async fn get_bill(&self, restaurant_id: &str, bill_id: &str) -> BillingResult<Bill> {
        self.load_bill(restaurant_id, bill_id).await
    }

    /// Gets a bill by its printed number.
    pub async fn get_bill_by_number(&self, restaurant_id: &str, bill_number: &str) -> BillingResult<Bill> {
        self.db
            .bills()
            .get_by_number(restaurant_id, bill_number)
            .await?
            .ok_or_else(|| BillingError::not_found("Bill", bill_number))
    }

    /// Every bill that ever included the order, cancelled ones too.
    pub async fn bills_for_order(&self, restaurant_id: &str, order_id: &str) -> BillingResult<Vec<Bill>> {
        Ok(self.db.bills().list_for_order(restaurant_id, order_id).await?)
    }

    /// Aggregates bills created in `[from, to)`.
    ///
    /// Cancelled bills are counted but excluded from every money total.
    #[instrument(skip(self))]
    pub async fn get_summary(
        &self,
        restaurant_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BillingResult<SalesSummary> {
        if from >= to {
            return Err(ValidationError::invalid_format("to", "must be after from").into());
        }
        if self.db.restaurants().get(restaurant_id).await?.is_none() {
            return Err(BillingError::not_found("Restaurant", restaurant_id));
        }

        let bills = self.db.bills().list_by_range(restaurant_id, from, to).await?;
        Ok(summarize(&bills, from, to))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn load_bill(&self, restaurant_id: &str, bill_id: &str) -> BillingResult<Bill> {
        self.db
            .bills()
            .get_by_id(restaurant_id, bill_id)
            .await?
            .ok_or_else(|| BillingError::not_found("Bill", bill_id))
    }

    /// Hands the event to the sink. Failures are logged, never returned.
    fn publish(&self, event: BillingEvent) {
        if let Err(err) = self.sink.notify(&event) {
            warn!(event = event.name(), error = %err, "Event sink failed");
        }
    }
}

/// Values fixed before the create transaction starts.
struct BillDraft {
    id: String,
    customer_gstin: Option<String>,
    notes: Option<String>,
    now: DateTime<Utc>,
}

async fn cancel_in(tx: &mut BillingTx, bill: &Bill, now: DateTime<Utc>) -> BillingResult<u64> {
    if !tx.mark_cancelled(bill).await? {
        return Err(BillingError::Conflict(format!(
            "Bill {} is already cancelled",
            bill.bill_number
        )));
    }
    Ok(tx.release_orders(&bill.id, now).await?)
}

async fn rollback(tx: BillingTx) {
    if let Err(err) = tx.rollback().await {
        warn!(error = %err, "Rollback failed; the transaction is discarded on drop");
    }
}

fn assemble_bill(
    request: &CreateBillRequest,
    draft: BillDraft,
    number: BillNumber,
    table_number: String,
    calc: Calculation,
) -> Bill {
    // A new bill is paid only when the cashier says so, even at a zero total.
    let (payment_status, paid_amount, paid_at) = if request.mark_as_paid {
        (PaymentStatus::Paid, calc.grand_total, Some(draft.now))
    } else {
        (PaymentStatus::Unpaid, Money::zero(), None)
    };

    Bill {
        id: draft.id,
        restaurant_id: request.restaurant_id.clone(),
        bill_number: number.bill_number,
        fiscal_year: number.fiscal_year,
        sequence_number: number.sequence_number,
        table_number,
        order_type: request.order_type,
        order_ids: request.order_ids.clone(),
        items: calc.items,
        subtotal: calc.subtotal,
        total_item_discount: calc.total_item_discount,
        bill_discount: calc.bill_discount,
        bill_discount_amount: calc.bill_discount_amount,
        after_all_discounts: calc.after_all_discounts,
        service_charge_rate: calc.service_charge_rate,
        service_charge_amount: calc.service_charge_amount,
        packaging_charge: calc.packaging_charge,
        taxable_amount: calc.taxable_amount,
        gst_scheme: calc.gst_scheme,
        cgst_rate: calc.cgst_rate,
        sgst_rate: calc.sgst_rate,
        cgst_amount: calc.cgst_amount,
        sgst_amount: calc.sgst_amount,
        total_tax: calc.total_tax,
        round_off: calc.round_off,
        grand_total: calc.grand_total,
        payment_mode: request.payment_mode,
        payment_status,
        paid_amount,
        due_amount: (calc.grand_total - paid_amount).non_negative(),
        split_payments: request.split_payments.clone(),
        customer_gstin: draft.customer_gstin,
        notes: draft.notes,
        created_by: request.actor_id.trim().to_string(),
        created_at: draft.now,
        updated_at: draft.now,
        paid_at,
        cancelled_at: None,
        cancel_reason: None,
    }
}
