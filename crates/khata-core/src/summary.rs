//! # Sales Summary
//!
//! Read-only projection over persisted bills for a date range.
//!
//! ## What Counts
//! - Money totals include only active (non-cancelled) bills
//! - Cancelled bills are counted separately and never contribute revenue
//! - The payment-mode breakdown is based on amounts collected: split bills
//!   contribute each entry to its own mode

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::{round_half_up, Money};
use crate::types::{Bill, OrderType, PaymentMode};

/// Collected amount per payment mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentModeTotal {
    pub mode: PaymentMode,
    pub amount: Money,
    /// Bills that received money through this mode.
    pub bill_count: i64,
}

/// Sales per order type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTypeTotal {
    pub order_type: OrderType,
    pub bill_count: i64,
    pub net_sales: Money,
}

/// Aggregated sales figures for `[from, to)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    #[ts(as = "String")]
    pub from: DateTime<Utc>,
    #[ts(as = "String")]
    pub to: DateTime<Utc>,
    pub bill_count: i64,
    pub cancelled_count: i64,
    /// Σ subtotal (before any discount).
    pub gross_sales: Money,
    pub item_discounts: Money,
    pub bill_discounts: Money,
    pub total_discount: Money,
    pub service_charge: Money,
    pub packaging_charge: Money,
    pub taxable_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub total_tax: Money,
    pub round_off: Money,
    /// Σ grand_total.
    pub net_sales: Money,
    pub collected: Money,
    pub outstanding: Money,
    pub average_bill_value: Money,
    pub by_payment_mode: Vec<PaymentModeTotal>,
    pub by_order_type: Vec<OrderTypeTotal>,
}

impl SalesSummary {
    fn empty(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        SalesSummary {
            from,
            to,
            bill_count: 0,
            cancelled_count: 0,
            gross_sales: Money::zero(),
            item_discounts: Money::zero(),
            bill_discounts: Money::zero(),
            total_discount: Money::zero(),
            service_charge: Money::zero(),
            packaging_charge: Money::zero(),
            taxable_amount: Money::zero(),
            cgst: Money::zero(),
            sgst: Money::zero(),
            total_tax: Money::zero(),
            round_off: Money::zero(),
            net_sales: Money::zero(),
            collected: Money::zero(),
            outstanding: Money::zero(),
            average_bill_value: Money::zero(),
            by_payment_mode: Vec::new(),
            by_order_type: Vec::new(),
        }
    }
}

/// Aggregates the bills created in `[from, to)`.
pub fn summarize(bills: &[Bill], from: DateTime<Utc>, to: DateTime<Utc>) -> SalesSummary {
    let mut summary = SalesSummary::empty(from, to);
    let mut by_mode: BTreeMap<PaymentMode, (Money, i64)> = BTreeMap::new();
    let mut by_type: BTreeMap<OrderType, (i64, Money)> = BTreeMap::new();

    for bill in bills.iter().filter(|b| b.created_at >= from && b.created_at < to) {
        if bill.is_cancelled() {
            summary.cancelled_count += 1;
            continue;
        }

        summary.bill_count += 1;
        summary.gross_sales += bill.subtotal;
        summary.item_discounts += bill.total_item_discount;
        summary.bill_discounts += bill.bill_discount_amount;
        summary.service_charge += bill.service_charge_amount;
        summary.packaging_charge += bill.packaging_charge;
        summary.taxable_amount += bill.taxable_amount;
        summary.cgst += bill.cgst_amount;
        summary.sgst += bill.sgst_amount;
        summary.total_tax += bill.total_tax;
        summary.round_off += bill.round_off;
        summary.net_sales += bill.grand_total;
        summary.collected += bill.paid_amount;
        summary.outstanding += bill.due_amount;

        // Split entries on a bill nobody has paid yet are not collections.
        if bill.paid_amount.is_positive() && bill.split_payments.is_empty() {
            let entry = by_mode.entry(bill.payment_mode).or_default();
            entry.0 += bill.paid_amount;
            entry.1 += 1;
        } else if bill.paid_amount.is_positive() {
            let mut seen: Vec<PaymentMode> = Vec::new();
            for split in &bill.split_payments {
                let entry = by_mode.entry(split.mode).or_default();
                entry.0 += split.amount;
                if !seen.contains(&split.mode) {
                    entry.1 += 1;
                    seen.push(split.mode);
                }
            }
        }

        let entry = by_type.entry(bill.order_type).or_default();
        entry.0 += 1;
        entry.1 += bill.grand_total;
    }

    summary.total_discount = summary.item_discounts + summary.bill_discounts;
    if summary.bill_count > 0 {
        summary.average_bill_value = Money::from_paise(round_half_up(
            summary.net_sales.paise() as i128,
            summary.bill_count as i128,
        ));
    }
    summary.by_payment_mode = by_mode
        .into_iter()
        .map(|(mode, (amount, bill_count))| PaymentModeTotal {
            mode,
            amount,
            bill_count,
        })
        .collect();
    summary.by_order_type = by_type
        .into_iter()
        .map(|(order_type, (bill_count, net_sales))| OrderTypeTotal {
            order_type,
            bill_count,
            net_sales,
        })
        .collect();

    summary
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::sample_bill;
    use crate::types::{PaymentStatus, SplitPayment};
    use chrono::Duration;

    #[test]
    fn test_summary_totals() {
        let now = Utc::now();
        let from = now - Duration::hours(1);
        let to = now + Duration::hours(1);

        let mut paid_cash = sample_bill(Money::from_paise(26300));
        paid_cash.payment_status = PaymentStatus::Paid;
        paid_cash.paid_amount = Money::from_paise(26300);
        paid_cash.due_amount = Money::zero();
        paid_cash.total_tax = Money::from_paise(1250);

        let mut split = sample_bill(Money::from_paise(10000));
        split.payment_mode = PaymentMode::Split;
        split.payment_status = PaymentStatus::Paid;
        split.paid_amount = Money::from_paise(10000);
        split.due_amount = Money::zero();
        split.order_type = OrderType::Takeaway;
        split.split_payments = vec![
            SplitPayment::new(PaymentMode::Cash, Money::from_paise(4000)),
            SplitPayment::new(PaymentMode::Upi, Money::from_paise(6000)),
        ];

        let mut unpaid = sample_bill(Money::from_paise(5000));
        unpaid.split_payments = vec![
            SplitPayment::new(PaymentMode::Card, Money::from_paise(2500)),
            SplitPayment::new(PaymentMode::Cash, Money::from_paise(2500)),
        ];

        let mut cancelled = sample_bill(Money::from_paise(99900));
        cancelled.payment_status = PaymentStatus::Cancelled;

        let mut outside = sample_bill(Money::from_paise(77700));
        outside.created_at = now - Duration::days(2);

        let summary = summarize(&[paid_cash, split, unpaid, cancelled, outside], from, to);

        assert_eq!(summary.bill_count, 3);
        assert_eq!(summary.cancelled_count, 1);
        assert_eq!(summary.net_sales.paise(), 41300);
        assert_eq!(summary.collected.paise(), 36300);
        assert_eq!(summary.outstanding.paise(), 5000);
        assert_eq!(summary.total_tax.paise(), 1250);
        assert_eq!(summary.average_bill_value.paise(), 13767);

        assert_eq!(
            summary.by_payment_mode,
            vec![
                PaymentModeTotal {
                    mode: PaymentMode::Cash,
                    amount: Money::from_paise(30300),
                    bill_count: 2,
                },
                PaymentModeTotal {
                    mode: PaymentMode::Upi,
                    amount: Money::from_paise(6000),
                    bill_count: 1,
                },
            ]
        );

        assert_eq!(summary.by_order_type.len(), 2);
        assert_eq!(summary.by_order_type[0].order_type, OrderType::DineIn);
        assert_eq!(summary.by_order_type[0].bill_count, 2);
        assert_eq!(summary.by_order_type[1].net_sales.paise(), 10000);
    }

    #[test]
    fn test_empty_summary() {
        let now = Utc::now();
        let summary = summarize(&[], now, now);

        assert_eq!(summary.bill_count, 0);
        assert_eq!(summary.net_sales, Money::zero());
        assert_eq!(summary.average_bill_value, Money::zero());
        assert!(summary.by_payment_mode.is_empty());
    }
}
