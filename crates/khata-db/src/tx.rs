//! # Transaction Scope
//!
//! [`BillingTx`] is the single transactional handle shared by the sequence
//! allocator, the order links and the bill writes of one lifecycle call.
//!
//! ## Bill Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.begin()                                                             │
//! │    │                                                                    │
//! │    ├── claim_orders()       UPDATE orders ... WHERE bill_id IS NULL    │
//! │    │                        (first statement is a write: the           │
//! │    │                         transaction holds the write lock from     │
//! │    │                         here on)                                  │
//! │    ├── claimed_orders()     SELECT the rows just linked                │
//! │    ├── allocate_sequence()  upsert + increment, RETURNING              │
//! │    ├── insert_bill()                                                   │
//! │    │                                                                    │
//! │    ├── commit()    ──► number, bill and links become visible together  │
//! │    └── drop / rollback() ──► none of them ever happened                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping a `BillingTx` without committing rolls it back.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{bill, order, sequence};
use khata_core::{Bill, Order};

/// An open write transaction for one billing operation.
pub struct BillingTx {
    tx: Transaction<'static, Sqlite>,
}

impl BillingTx {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        BillingTx { tx }
    }

    /// Links the still-billable orders in `ids` to `bill_id`.
    ///
    /// Returns how many were linked. The caller compares it to `ids.len()`.
    pub async fn claim_orders(
        &mut self,
        restaurant_id: &str,
        bill_id: &str,
        ids: &[String],
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        let claimed = order::claim(&mut *self.tx, restaurant_id, bill_id, ids, now).await?;
        debug!(bill_id = %bill_id, requested = ids.len(), claimed, "Claimed orders");
        Ok(claimed)
    }

    /// Orders currently linked to `bill_id` as seen by this transaction.
    pub async fn claimed_orders(&mut self, bill_id: &str) -> DbResult<Vec<Order>> {
        order::linked_to(&mut *self.tx, bill_id).await
    }

    /// Unlinks every order of `bill_id`.
    pub async fn release_orders(&mut self, bill_id: &str, now: DateTime<Utc>) -> DbResult<u64> {
        let released = order::release(&mut *self.tx, bill_id, now).await?;
        debug!(bill_id = %bill_id, released, "Released orders");
        Ok(released)
    }

    /// Allocates the next bill sequence for the fiscal year.
    pub async fn allocate_sequence(
        &mut self,
        restaurant_id: &str,
        fiscal_year: &str,
        now: DateTime<Utc>,
    ) -> DbResult<i64> {
        let next = sequence::allocate(&mut *self.tx, restaurant_id, fiscal_year, now).await?;
        debug!(restaurant_id = %restaurant_id, fiscal_year = %fiscal_year, next, "Allocated sequence");
        Ok(next)
    }

    /// Inserts a fully computed bill.
    pub async fn insert_bill(&mut self, bill: &Bill) -> DbResult<()> {
        debug!(bill_id = %bill.id, bill_number = %bill.bill_number, "Inserting bill");
        bill::insert(&mut *self.tx, bill).await
    }

    /// Writes the cancellation fields of `bill`.
    ///
    /// Returns `false` when the stored bill was already cancelled.
    pub async fn mark_cancelled(&mut self, bill: &Bill) -> DbResult<bool> {
        bill::mark_cancelled(&mut *self.tx, bill).await
    }

    /// Commits every write made through this handle.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    /// Discards every write made through this handle.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::restaurant::Restaurant;
    use khata_core::{Money, OrderLine, OrderStatus, OrderType};
    use uuid::Uuid;

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.restaurants()
            .upsert(&Restaurant::new("rest-1", "Test Kitchen"))
            .await
            .unwrap();
        db
    }

    fn order(id: &str, status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: id.to_string(),
            restaurant_id: "rest-1".to_string(),
            table_number: "T1".to_string(),
            order_type: OrderType::DineIn,
            status,
            items: vec![OrderLine {
                item_id: "chai".to_string(),
                name: "Masala Chai".to_string(),
                quantity: 2,
                unit_price: Money::from_rupees(30),
            }],
            bill_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_sequence_increments_and_rolls_back() {
        let db = setup().await;

        let mut tx = db.begin().await.unwrap();
        assert_eq!(tx.allocate_sequence("rest-1", "2025-26", Utc::now()).await.unwrap(), 1);
        assert_eq!(tx.allocate_sequence("rest-1", "2025-26", Utc::now()).await.unwrap(), 2);
        assert_eq!(tx.allocate_sequence("rest-1", "2026-27", Utc::now()).await.unwrap(), 1);
        tx.commit().await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert_eq!(tx.allocate_sequence("rest-1", "2025-26", Utc::now()).await.unwrap(), 3);
        tx.rollback().await.unwrap();

        assert_eq!(db.sequences().current("rest-1", "2025-26").await.unwrap(), Some(2));
        assert_eq!(db.sequences().peek_next("rest-1", "2025-26").await.unwrap(), 3);
        assert_eq!(db.sequences().peek_next("rest-1", "2027-28").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_claim_only_takes_billable_unbilled_orders() {
        let db = setup().await;
        db.orders().insert(&order("o1", OrderStatus::Served)).await.unwrap();
        db.orders().insert(&order("o2", OrderStatus::Completed)).await.unwrap();
        db.orders().insert(&order("o3", OrderStatus::Preparing)).await.unwrap();

        let ids: Vec<String> = ["o1", "o2", "o3"].iter().map(|s| s.to_string()).collect();
        let bill_id = Uuid::new_v4().to_string();

        let mut tx = db.begin().await.unwrap();
        let claimed = tx.claim_orders("rest-1", &bill_id, &ids, Utc::now()).await.unwrap();
        assert_eq!(claimed, 2);
        tx.rollback().await.unwrap();

        // Rolled back: nothing linked
        assert!(db.orders().get("o1").await.unwrap().unwrap().bill_id.is_none());

        let billable = db.orders().list_billable("rest-1", &ids).await.unwrap();
        assert_eq!(billable.len(), 2);
    }

    #[tokio::test]
    async fn test_release_unlinks_orders() {
        let db = setup().await;
        db.orders().insert(&order("o1", OrderStatus::Served)).await.unwrap();
        let ids = vec!["o1".to_string()];

        // Deferred FK: the bill row must exist by commit time, so release
        // inside the same transaction before committing.
        let mut tx = db.begin().await.unwrap();
        assert_eq!(tx.claim_orders("rest-1", "bill-x", &ids, Utc::now()).await.unwrap(), 1);
        let claimed = tx.claimed_orders("bill-x").await.unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].bill_id.as_deref(), Some("bill-x"));
        assert_eq!(tx.release_orders("bill-x", Utc::now()).await.unwrap(), 1);
        tx.commit().await.unwrap();

        let o1 = db.orders().get("o1").await.unwrap().unwrap();
        assert!(o1.bill_id.is_none());
        assert_eq!(db.orders().list_unbilled_for_table("rest-1", "T1").await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_allocation_is_unique_and_contiguous() {
        let path = std::env::temp_dir().join(format!("khata-seq-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(8))
            .await
            .unwrap();
        db.restaurants()
            .upsert(&Restaurant::new("rest-1", "Test Kitchen"))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                let mut tx = db.begin().await.unwrap();
                let seq = tx
                    .allocate_sequence("rest-1", "2025-26", Utc::now())
                    .await
                    .unwrap();
                tx.commit().await.unwrap();
                seq
            }));
        }

        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_unstable();

        assert_eq!(seen, (1..=20).collect::<Vec<i64>>());

        db.close().await;
        let _ = std::fs::remove_file(&path);
    }
}
