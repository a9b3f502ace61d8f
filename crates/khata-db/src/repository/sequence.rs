//! # Bill Sequence Repository
//!
//! Per-restaurant, per-fiscal-year invoice counters.
//!
//! ## Allocation
//! ```text
//! INSERT (restaurant, FY, 1)
//!     │
//!     ├── no row yet ──────────► row created at 1 ──► RETURNING 1
//!     │
//!     └── ON CONFLICT ─────────► last_sequence + 1 ──► RETURNING n+1
//! ```
//!
//! One statement does the read-modify-write, and SQLite runs it under the
//! database write lock, so concurrent callers can never receive the same
//! value. A rolled-back transaction takes its increment with it, which
//! keeps the sequence gap-free.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::DbResult;

/// Read-only access to bill sequences.
///
/// Allocation is only available inside a [`crate::tx::BillingTx`].
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    /// Creates a new SequenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SequenceRepository { pool }
    }

    /// Last allocated sequence, or `None` before the first bill of the year.
    pub async fn current(&self, restaurant_id: &str, fiscal_year: &str) -> DbResult<Option<i64>> {
        let last: Option<i64> = sqlx::query_scalar(
            "SELECT last_sequence FROM bill_sequences WHERE restaurant_id = ?1 AND fiscal_year = ?2",
        )
        .bind(restaurant_id)
        .bind(fiscal_year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(last)
    }

    /// The sequence the next bill would get if nobody else bills first.
    ///
    /// Advisory only: it reserves nothing, and a concurrent create may
    /// consume the number before the caller does.
    pub async fn peek_next(&self, restaurant_id: &str, fiscal_year: &str) -> DbResult<i64> {
        Ok(self.current(restaurant_id, fiscal_year).await?.unwrap_or(0) + 1)
    }
}

/// Atomically allocates the next sequence for `(restaurant_id, fiscal_year)`.
pub(crate) async fn allocate<'e, E: SqliteExecutor<'e>>(
    executor: E,
    restaurant_id: &str,
    fiscal_year: &str,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    let next: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO bill_sequences (restaurant_id, fiscal_year, last_sequence, updated_at)
        VALUES (?1, ?2, 1, ?3)
        ON CONFLICT (restaurant_id, fiscal_year) DO UPDATE SET
            last_sequence = last_sequence + 1,
            updated_at = excluded.updated_at
        RETURNING last_sequence
        "#,
    )
    .bind(restaurant_id)
    .bind(fiscal_year)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(next)
}
