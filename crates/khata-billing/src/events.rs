//! # Billing Events
//!
//! Notifications published after a lifecycle operation commits.
//!
//! ## Delivery
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BillingService                                                         │
//! │    │                                                                    │
//! │    ├── tx.commit() ──► bill is durable                                  │
//! │    │                                                                    │
//! │    └── sink.notify(&event)                                              │
//! │             │                                                           │
//! │             ├── Ok  ──► done                                            │
//! │             └── Err ──► warn! and carry on (the bill is already saved)  │
//! │                                                                         │
//! │  Sinks:                                                                 │
//! │  ├── NoopSink     drop everything                                       │
//! │  ├── LogSink      one info! line per event                              │
//! │  └── ChannelSink  tokio broadcast to any number of subscribers         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Adjacently tagged, like every other message the UI receives:
//! `{ "type": "BillCreated", "payload": { "billId": "...", ... } }`

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};
use ts_rs::TS;

use khata_core::{Bill, Money, PaymentMode, PaymentStatus};

/// Default buffer of the broadcast channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// Events
// =============================================================================

/// Something that happened to a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload")]
#[ts(export)]
pub enum BillingEvent {
    /// A bill was created and its orders linked.
    BillCreated(BillSnapshot),

    /// A payment was recorded against a bill.
    PaymentUpdated(BillSnapshot),

    /// A bill was cancelled and its orders released.
    BillCancelled(BillSnapshot),
}

/// The bill fields a listener needs to refresh its screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillSnapshot {
    pub bill_id: String,
    pub restaurant_id: String,
    pub bill_number: String,
    pub table_number: String,
    pub order_ids: Vec<String>,
    pub grand_total: Money,
    pub payment_mode: PaymentMode,
    pub payment_status: PaymentStatus,
    pub paid_amount: Money,
    pub due_amount: Money,
    pub cancel_reason: Option<String>,
}

impl From<&Bill> for BillSnapshot {
    fn from(bill: &Bill) -> Self {
        BillSnapshot {
            bill_id: bill.id.clone(),
            restaurant_id: bill.restaurant_id.clone(),
            bill_number: bill.bill_number.clone(),
            table_number: bill.table_number.clone(),
            order_ids: bill.order_ids.clone(),
            grand_total: bill.grand_total,
            payment_mode: bill.payment_mode,
            payment_status: bill.payment_status,
            paid_amount: bill.paid_amount,
            due_amount: bill.due_amount,
            cancel_reason: bill.cancel_reason.clone(),
        }
    }
}

impl BillingEvent {
    /// Dotted event name, e.g. `bill.created`.
    pub fn name(&self) -> &'static str {
        match self {
            BillingEvent::BillCreated(_) => "bill.created",
            BillingEvent::PaymentUpdated(_) => "bill.payment_updated",
            BillingEvent::BillCancelled(_) => "bill.cancelled",
        }
    }

    /// The bill this event is about.
    pub fn snapshot(&self) -> &BillSnapshot {
        match self {
            BillingEvent::BillCreated(s)
            | BillingEvent::PaymentUpdated(s)
            | BillingEvent::BillCancelled(s) => s,
        }
    }

    /// JSON payload for transports that take `(event, payload)`.
    pub fn payload(&self) -> Result<serde_json::Value, SinkError> {
        serde_json::to_value(self.snapshot()).map_err(|e| SinkError::Encode(e.to_string()))
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Errors a sink may report. The billing service only logs them.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to encode event: {0}")]
    Encode(String),

    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// Receives billing events after commit.
///
/// Implementations must not block: `notify` runs on the request path.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &BillingEvent) -> Result<(), SinkError>;
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn notify(&self, _event: &BillingEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes one structured log line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn notify(&self, event: &BillingEvent) -> Result<(), SinkError> {
        let bill = event.snapshot();
        info!(
            event = event.name(),
            restaurant_id = %bill.restaurant_id,
            bill_id = %bill.bill_id,
            bill_number = %bill.bill_number,
            status = %bill.payment_status,
            grand_total = %bill.grand_total,
            "Billing event"
        );
        Ok(())
    }
}

/// Fans events out over a tokio broadcast channel.
///
/// Having no subscribers is not an error; slow subscribers lag and lose
/// the oldest events rather than holding up billing.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: broadcast::Sender<BillingEvent>,
}

impl ChannelSink {
    /// Creates a sink with its own channel of `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        ChannelSink { tx }
    }

    /// New receiver that sees every event sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BillingEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChannelSink {
    fn default() -> Self {
        ChannelSink::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl EventSink for ChannelSink {
    fn notify(&self, event: &BillingEvent) -> Result<(), SinkError> {
        match self.tx.send(event.clone()) {
            Ok(receivers) => debug!(event = event.name(), receivers, "Broadcast billing event"),
            Err(_) => debug!(event = event.name(), "No subscribers for billing event"),
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> BillSnapshot {
        BillSnapshot {
            bill_id: "b-1".to_string(),
            restaurant_id: "rest-1".to_string(),
            bill_number: "INV/2526/0001".to_string(),
            table_number: "T4".to_string(),
            order_ids: vec!["o1".to_string()],
            grand_total: Money::from_rupees(263),
            payment_mode: PaymentMode::Cash,
            payment_status: PaymentStatus::Unpaid,
            paid_amount: Money::zero(),
            due_amount: Money::from_rupees(263),
            cancel_reason: None,
        }
    }

    #[test]
    fn test_wire_format_is_adjacently_tagged() {
        let event = BillingEvent::BillCreated(snapshot());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "BillCreated");
        assert_eq!(json["payload"]["billNumber"], "INV/2526/0001");
        assert_eq!(event.name(), "bill.created");
        assert_eq!(event.payload().unwrap()["tableNumber"], "T4");
    }

    #[tokio::test]
    async fn test_channel_sink_delivers_to_subscribers() {
        let sink = ChannelSink::new(8);
        assert!(sink.notify(&BillingEvent::BillCreated(snapshot())).is_ok());

        let mut rx = sink.subscribe();
        assert_eq!(sink.receiver_count(), 1);

        sink.notify(&BillingEvent::BillCancelled(snapshot())).unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received.name(), "bill.cancelled");
    }
}
