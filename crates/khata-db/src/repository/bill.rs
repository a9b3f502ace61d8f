//! # Bill Repository
//!
//! Database operations for persisted bills (GST invoices).
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bills                                                                  │
//! │  ├── scalar columns   money in paise, rates in bps, enums as TEXT      │
//! │  ├── items            JSON snapshot of every BillItem                  │
//! │  ├── order_ids        JSON array (traceability, survives cancellation) │
//! │  ├── bill_discount    JSON DiscountSpec or NULL                        │
//! │  └── split_payments   JSON array                                       │
//! │                                                                         │
//! │  UNIQUE (restaurant_id, bill_number)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inserts and cancellations go through [`crate::tx::BillingTx`]; this
//! repository serves reads and the single-statement payment update.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use khata_core::{Bill, Money, PaymentStatus, Rate};

/// Repository for bill database operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Gets a bill by ID, scoped to a restaurant.
    pub async fn get_by_id(&self, restaurant_id: &str, bill_id: &str) -> DbResult<Option<Bill>> {
        let row: Option<BillRow> = sqlx::query_as(
            "SELECT * FROM bills WHERE restaurant_id = ?1 AND id = ?2",
        )
        .bind(restaurant_id)
        .bind(bill_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Bill::try_from).transpose()
    }

    /// Gets a bill by its printed number.
    pub async fn get_by_number(
        &self,
        restaurant_id: &str,
        bill_number: &str,
    ) -> DbResult<Option<Bill>> {
        let row: Option<BillRow> = sqlx::query_as(
            "SELECT * FROM bills WHERE restaurant_id = ?1 AND bill_number = ?2",
        )
        .bind(restaurant_id)
        .bind(bill_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Bill::try_from).transpose()
    }

    /// Lists bills created in `[from, to)`, oldest first. Includes cancelled bills.
    pub async fn list_by_range(
        &self,
        restaurant_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Bill>> {
        debug!(restaurant_id = %restaurant_id, %from, %to, "Listing bills");

        let rows: Vec<BillRow> = sqlx::query_as(
            r#"
            SELECT * FROM bills
            WHERE restaurant_id = ?1 AND created_at >= ?2 AND created_at < ?3
            ORDER BY created_at, sequence_number
            "#,
        )
        .bind(restaurant_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Bill::try_from).collect()
    }

    /// Lists every bill that ever consumed an order, oldest first.
    ///
    /// A cancelled bill keeps its `order_ids`, so an order that was billed,
    /// cancelled and re-billed shows up twice.
    pub async fn list_for_order(&self, restaurant_id: &str, order_id: &str) -> DbResult<Vec<Bill>> {
        let rows: Vec<BillRow> = sqlx::query_as(
            r#"
            SELECT bills.* FROM bills, json_each(bills.order_ids) AS linked
            WHERE bills.restaurant_id = ?1 AND linked.value = ?2
            ORDER BY bills.created_at
            "#,
        )
        .bind(restaurant_id)
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Bill::try_from).collect()
    }

    /// Writes the payment fields of a bill.
    ///
    /// Guarded on the stored status: returns `false` (and writes nothing)
    /// when the bill was cancelled in the meantime.
    pub async fn save_payment(&self, bill: &Bill) -> DbResult<bool> {
        debug!(
            bill_id = %bill.id,
            status = %bill.payment_status,
            paid = %bill.paid_amount,
            "Saving bill payment"
        );

        let result = sqlx::query(
            r#"
            UPDATE bills SET
                payment_mode = ?3,
                payment_status = ?4,
                paid_paise = ?5,
                due_paise = ?6,
                split_payments = ?7,
                paid_at = ?8,
                updated_at = ?9
            WHERE restaurant_id = ?1 AND id = ?2 AND payment_status != ?10
            "#,
        )
        .bind(&bill.restaurant_id)
        .bind(&bill.id)
        .bind(bill.payment_mode.as_str())
        .bind(bill.payment_status.as_str())
        .bind(bill.paid_amount.paise())
        .bind(bill.due_amount.paise())
        .bind(to_json("split_payments", &bill.split_payments)?)
        .bind(bill.paid_at)
        .bind(bill.updated_at)
        .bind(PaymentStatus::Cancelled.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Shared Statements (pool or transaction)
// =============================================================================

/// Inserts a complete bill row.
pub(crate) async fn insert<'e, E: SqliteExecutor<'e>>(executor: E, bill: &Bill) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO bills (
            id, restaurant_id, bill_number, fiscal_year, sequence_number,
            table_number, order_type, order_ids, items,
            subtotal_paise, total_item_discount_paise, bill_discount, bill_discount_paise,
            after_all_discounts_paise, service_charge_rate_bps, service_charge_paise,
            packaging_charge_paise, taxable_amount_paise, gst_scheme,
            cgst_rate_bps, sgst_rate_bps, cgst_paise, sgst_paise, total_tax_paise,
            round_off_paise, grand_total_paise,
            payment_mode, payment_status, paid_paise, due_paise, split_payments,
            customer_gstin, notes, created_by,
            created_at, updated_at, paid_at, cancelled_at, cancel_reason
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9,
            ?10, ?11, ?12, ?13,
            ?14, ?15, ?16,
            ?17, ?18, ?19,
            ?20, ?21, ?22, ?23, ?24,
            ?25, ?26,
            ?27, ?28, ?29, ?30, ?31,
            ?32, ?33, ?34,
            ?35, ?36, ?37, ?38, ?39
        )
        "#,
    )
    .bind(&bill.id)
    .bind(&bill.restaurant_id)
    .bind(&bill.bill_number)
    .bind(&bill.fiscal_year)
    .bind(bill.sequence_number)
    .bind(&bill.table_number)
    .bind(bill.order_type.as_str())
    .bind(to_json("order_ids", &bill.order_ids)?)
    .bind(to_json("items", &bill.items)?)
    .bind(bill.subtotal.paise())
    .bind(bill.total_item_discount.paise())
    .bind(
        bill.bill_discount
            .as_ref()
            .map(|d| to_json("bill_discount", d))
            .transpose()?,
    )
    .bind(bill.bill_discount_amount.paise())
    .bind(bill.after_all_discounts.paise())
    .bind(bill.service_charge_rate.bps() as i64)
    .bind(bill.service_charge_amount.paise())
    .bind(bill.packaging_charge.paise())
    .bind(bill.taxable_amount.paise())
    .bind(bill.gst_scheme.as_str())
    .bind(bill.cgst_rate.bps() as i64)
    .bind(bill.sgst_rate.bps() as i64)
    .bind(bill.cgst_amount.paise())
    .bind(bill.sgst_amount.paise())
    .bind(bill.total_tax.paise())
    .bind(bill.round_off.paise())
    .bind(bill.grand_total.paise())
    .bind(bill.payment_mode.as_str())
    .bind(bill.payment_status.as_str())
    .bind(bill.paid_amount.paise())
    .bind(bill.due_amount.paise())
    .bind(to_json("split_payments", &bill.split_payments)?)
    .bind(&bill.customer_gstin)
    .bind(&bill.notes)
    .bind(&bill.created_by)
    .bind(bill.created_at)
    .bind(bill.updated_at)
    .bind(bill.paid_at)
    .bind(bill.cancelled_at)
    .bind(&bill.cancel_reason)
    .execute(executor)
    .await?;

    Ok(())
}

/// Writes the cancellation fields, guarded on the bill not being cancelled.
///
/// Returns `false` when another writer cancelled it first.
pub(crate) async fn mark_cancelled<'e, E: SqliteExecutor<'e>>(
    executor: E,
    bill: &Bill,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE bills SET
            payment_status = ?3,
            cancel_reason = ?4,
            cancelled_at = ?5,
            updated_at = ?6
        WHERE restaurant_id = ?1 AND id = ?2 AND payment_status != ?3
        "#,
    )
    .bind(&bill.restaurant_id)
    .bind(&bill.id)
    .bind(PaymentStatus::Cancelled.as_str())
    .bind(&bill.cancel_reason)
    .bind(bill.cancelled_at)
    .bind(bill.updated_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `bills` row.
#[derive(Debug, sqlx::FromRow)]
struct BillRow {
    id: String,
    restaurant_id: String,
    bill_number: String,
    fiscal_year: String,
    sequence_number: i64,
    table_number: String,
    order_type: String,
    order_ids: String,
    items: String,
    subtotal_paise: i64,
    total_item_discount_paise: i64,
    bill_discount: Option<String>,
    bill_discount_paise: i64,
    after_all_discounts_paise: i64,
    service_charge_rate_bps: i64,
    service_charge_paise: i64,
    packaging_charge_paise: i64,
    taxable_amount_paise: i64,
    gst_scheme: String,
    cgst_rate_bps: i64,
    sgst_rate_bps: i64,
    cgst_paise: i64,
    sgst_paise: i64,
    total_tax_paise: i64,
    round_off_paise: i64,
    grand_total_paise: i64,
    payment_mode: String,
    payment_status: String,
    paid_paise: i64,
    due_paise: i64,
    split_payments: String,
    customer_gstin: Option<String>,
    notes: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    cancel_reason: Option<String>,
}

impl TryFrom<BillRow> for Bill {
    type Error = DbError;

    fn try_from(row: BillRow) -> DbResult<Self> {
        Ok(Bill {
            id: row.id,
            restaurant_id: row.restaurant_id,
            bill_number: row.bill_number,
            fiscal_year: row.fiscal_year,
            sequence_number: row.sequence_number,
            table_number: row.table_number,
            order_type: parse_enum("bills.order_type", &row.order_type)?,
            order_ids: from_json("bills.order_ids", &row.order_ids)?,
            items: from_json("bills.items", &row.items)?,
            subtotal: Money::from_paise(row.subtotal_paise),
            total_item_discount: Money::from_paise(row.total_item_discount_paise),
            bill_discount: row
                .bill_discount
                .as_deref()
                .map(|raw| from_json("bills.bill_discount", raw))
                .transpose()?,
            bill_discount_amount: Money::from_paise(row.bill_discount_paise),
            after_all_discounts: Money::from_paise(row.after_all_discounts_paise),
            service_charge_rate: rate("bills.service_charge_rate_bps", row.service_charge_rate_bps)?,
            service_charge_amount: Money::from_paise(row.service_charge_paise),
            packaging_charge: Money::from_paise(row.packaging_charge_paise),
            taxable_amount: Money::from_paise(row.taxable_amount_paise),
            gst_scheme: parse_enum("bills.gst_scheme", &row.gst_scheme)?,
            cgst_rate: rate("bills.cgst_rate_bps", row.cgst_rate_bps)?,
            sgst_rate: rate("bills.sgst_rate_bps", row.sgst_rate_bps)?,
            cgst_amount: Money::from_paise(row.cgst_paise),
            sgst_amount: Money::from_paise(row.sgst_paise),
            total_tax: Money::from_paise(row.total_tax_paise),
            round_off: Money::from_paise(row.round_off_paise),
            grand_total: Money::from_paise(row.grand_total_paise),
            payment_mode: parse_enum("bills.payment_mode", &row.payment_mode)?,
            payment_status: parse_enum("bills.payment_status", &row.payment_status)?,
            paid_amount: Money::from_paise(row.paid_paise),
            due_amount: Money::from_paise(row.due_paise),
            split_payments: from_json("bills.split_payments", &row.split_payments)?,
            customer_gstin: row.customer_gstin,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            paid_at: row.paid_at,
            cancelled_at: row.cancelled_at,
            cancel_reason: row.cancel_reason,
        })
    }
}

// =============================================================================
// Column Helpers
// =============================================================================

pub(crate) fn parse_enum<T>(column: &str, raw: &str) -> DbResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| DbError::decode(column, e))
}

pub(crate) fn from_json<T: DeserializeOwned>(column: &str, raw: &str) -> DbResult<T> {
    serde_json::from_str(raw).map_err(|e| DbError::decode(column, e))
}

pub(crate) fn to_json<T: serde::Serialize + ?Sized>(column: &str, value: &T) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DbError::decode(column, e))
}

pub(crate) fn rate(column: &str, bps: i64) -> DbResult<Rate> {
    u32::try_from(bps)
        .map(Rate::from_bps)
        .map_err(|e| DbError::decode(column, e))
}
