//! # Order Repository
//!
//! Orders belong to the ordering workflow. Billing reads them and moves
//! them between "unbilled" and "billed" through `bill_id`.
//!
//! ## Billing Link
//! ```text
//!            claim (create bill)
//!  unbilled ───────────────────────► billed
//!  bill_id = NULL                    bill_id = <bill>
//!      ▲                                 │
//!      └─────────────────────────────────┘
//!            release (cancel bill)
//! ```
//!
//! Claiming is a single conditional UPDATE: only rows that are still
//! unbilled and in a billable status are linked, so two concurrent bills
//! can never both take the same order.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::bill::{from_json, parse_enum, to_json};
use khata_core::{Order, OrderStatus};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order (used by the ordering workflow, seeding and tests).
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, table = %order.table_number, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, restaurant_id, table_number, order_type, status,
                items, bill_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&order.id)
        .bind(&order.restaurant_id)
        .bind(&order.table_number)
        .bind(order.order_type.as_str())
        .bind(order.status.as_str())
        .bind(to_json("items", &order.items)?)
        .bind(&order.bill_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Updates the kitchen status of an order.
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> DbResult<bool> {
        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Fetches the named orders that are billable right now: in this
    /// restaurant, unbilled, and served or completed.
    ///
    /// Used for previews. Bill creation re-checks the same conditions
    /// inside its transaction through [`claim`].
    pub async fn list_billable(&self, restaurant_id: &str, ids: &[String]) -> DbResult<Vec<Order>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT * FROM orders
            WHERE restaurant_id = ?1 AND bill_id IS NULL
              AND status IN (?2, ?3)
              AND id IN ({})
            ORDER BY created_at, id
            "#,
            placeholders(4, ids.len())
        );

        let mut query = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(restaurant_id)
            .bind(OrderStatus::BILLABLE[0].as_str())
            .bind(OrderStatus::BILLABLE[1].as_str());
        for id in ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    /// Lists unbilled orders for a table (what the cashier would bill next).
    pub async fn list_unbilled_for_table(
        &self,
        restaurant_id: &str,
        table_number: &str,
    ) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT * FROM orders
            WHERE restaurant_id = ?1 AND table_number = ?2 AND bill_id IS NULL
            ORDER BY created_at, id
            "#,
        )
        .bind(restaurant_id)
        .bind(table_number)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Lists the orders currently linked to a bill.
    pub async fn list_for_bill(&self, bill_id: &str) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT * FROM orders WHERE bill_id = ?1 ORDER BY created_at, id",
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }
}

// =============================================================================
// Shared Statements (pool or transaction)
// =============================================================================

/// Links every still-billable order in `ids` to `bill_id`.
///
/// Returns the number of orders linked; fewer than `ids.len()` means some
/// were already billed, not yet served, or belong elsewhere.
pub(crate) async fn claim<'e, E: SqliteExecutor<'e>>(
    executor: E,
    restaurant_id: &str,
    bill_id: &str,
    ids: &[String],
    now: DateTime<Utc>,
) -> DbResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        r#"
        UPDATE orders SET bill_id = ?1, updated_at = ?2
        WHERE restaurant_id = ?3 AND bill_id IS NULL
          AND status IN (?4, ?5)
          AND id IN ({})
        "#,
        placeholders(6, ids.len())
    );

    let mut query = sqlx::query(&sql)
        .bind(bill_id)
        .bind(now)
        .bind(restaurant_id)
        .bind(OrderStatus::BILLABLE[0].as_str())
        .bind(OrderStatus::BILLABLE[1].as_str());
    for id in ids {
        query = query.bind(id);
    }

    let result = query.execute(executor).await?;
    Ok(result.rows_affected())
}

/// Unlinks every order pointing at `bill_id`. Returns how many were released.
pub(crate) async fn release<'e, E: SqliteExecutor<'e>>(
    executor: E,
    bill_id: &str,
    now: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query("UPDATE orders SET bill_id = NULL, updated_at = ?2 WHERE bill_id = ?1")
        .bind(bill_id)
        .bind(now)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Fetches the orders linked to `bill_id`.
pub(crate) async fn linked_to<'e, E: SqliteExecutor<'e>>(
    executor: E,
    bill_id: &str,
) -> DbResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(
        "SELECT * FROM orders WHERE bill_id = ?1 ORDER BY created_at, id",
    )
    .bind(bill_id)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(Order::try_from).collect()
}

/// `?first, ?first+1, ...` for `count` parameters.
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|n| format!("?{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    restaurant_id: String,
    table_number: String,
    order_type: String,
    status: String,
    items: String,
    bill_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = crate::error::DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        Ok(Order {
            id: row.id,
            restaurant_id: row.restaurant_id,
            table_number: row.table_number,
            order_type: parse_enum("orders.order_type", &row.order_type)?,
            status: parse_enum("orders.status", &row.status)?,
            items: from_json("orders.items", &row.items)?,
            bill_id: row.bill_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
