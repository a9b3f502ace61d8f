//! # Domain Types
//!
//! Core domain types used throughout Khata.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │    BillItem     │   │      Bill       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  order_id       │──►│  id (UUID)      │       │
//! │  │  table_number   │   │  line_total     │   │  bill_number    │       │
//! │  │  items          │   │  item discount  │   │  GST breakdown  │       │
//! │  │  bill_id        │   │  taxable_value  │   │  payment_status │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rate       │   │  PaymentStatus  │   │   TaxConfig     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Unpaid         │   │  gst_scheme     │       │
//! │  │  500 = 5%       │   │  PartiallyPaid  │   │  gst_rate       │       │
//! │  └─────────────────┘   │  Paid           │   │  bill_prefix    │       │
//! │                        │  Cancelled      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Spellings
//! Every status-like enum is declared once through `spelled_enum!`, which
//! pairs each variant with its storage spelling and its display label. Serde,
//! the database layer and the TypeScript bindings all read the same table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Spelling Table Macro
// =============================================================================

macro_rules! spelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => ($wire:tt, $label:tt),
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
        #[ts(export)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant with its storage spelling and display label.
            pub const SPELLINGS: &'static [($name, &'static str, &'static str)] = &[
                $(($name::$variant, $wire, $label),)+
            ];

            /// Storage / wire spelling (`"partially_paid"`).
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Human-readable label (`"Partially Paid"`).
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Looks up a variant by storage spelling or display label
            /// (case-insensitive).
            pub fn lookup(input: &str) -> Option<Self> {
                let input = input.trim();
                Self::SPELLINGS
                    .iter()
                    .find(|(_, wire, label)| {
                        wire.eq_ignore_ascii_case(input) || label.eq_ignore_ascii_case(input)
                    })
                    .map(|(variant, _, _)| *variant)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::lookup(s).ok_or_else(|| ValidationError::NotAllowed {
                    field: stringify!($name).to_string(),
                    allowed: Self::SPELLINGS
                        .iter()
                        .map(|(_, wire, _)| wire.to_string())
                        .collect(),
                })
            }
        }
    };
}

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5% GST, 250 bps = 2.5% CGST
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// 100%.
    pub const FULL: Rate = Rate(10_000);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage (`5` → 5%).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        Rate(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Caps the rate at 100%.
    #[inline]
    pub fn capped(self) -> Self {
        self.min(Rate::FULL)
    }

    /// Half of this rate (CGST / SGST share of GST).
    ///
    /// GST rates are validated to an even number of basis points, so the
    /// halves are exact.
    #[inline]
    pub const fn half(&self) -> Self {
        Rate(self.0 / 2)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Status Enums
// =============================================================================

spelled_enum! {
    /// Kitchen workflow status of an order.
    ///
    /// Only `Served` and `Completed` orders may be billed.
    pub enum OrderStatus {
        Pending => ("pending", "Pending"),
        Confirmed => ("confirmed", "Confirmed"),
        Preparing => ("preparing", "Preparing"),
        Ready => ("ready", "Ready"),
        Served => ("served", "Served"),
        Completed => ("completed", "Completed"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

impl OrderStatus {
    /// Statuses that make an order eligible for billing.
    pub const BILLABLE: [OrderStatus; 2] = [OrderStatus::Served, OrderStatus::Completed];

    /// Checks if an order in this status can be billed.
    pub fn is_billable(&self) -> bool {
        Self::BILLABLE.contains(self)
    }
}

spelled_enum! {
    /// How the order is fulfilled. Packaging is only charged off-premises.
    pub enum OrderType {
        DineIn => ("dine_in", "Dine In"),
        Takeaway => ("takeaway", "Takeaway"),
        Delivery => ("delivery", "Delivery"),
    }
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::DineIn
    }
}

spelled_enum! {
    /// Declared payment mode. No gateway integration; amounts are recorded as given.
    pub enum PaymentMode {
        Cash => ("cash", "Cash"),
        Card => ("card", "Card"),
        Upi => ("upi", "UPI"),
        Split => ("split", "Split"),
    }
}

spelled_enum! {
    /// Payment lifecycle of a bill.
    ///
    /// ```text
    /// Unpaid ──► PartiallyPaid ──► Paid
    ///   │             │             │
    ///   └─────────────┴─────────────┴──► Cancelled (terminal)
    /// ```
    pub enum PaymentStatus {
        Unpaid => ("unpaid", "Unpaid"),
        PartiallyPaid => ("partially_paid", "Partially Paid"),
        Paid => ("paid", "Paid"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

impl PaymentStatus {
    /// Derives the status from the amount paid against the grand total.
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::{Money, PaymentStatus};
    ///
    /// let grand = Money::from_paise(26300);
    /// assert_eq!(PaymentStatus::for_amount(Money::zero(), grand), PaymentStatus::Unpaid);
    /// assert_eq!(PaymentStatus::for_amount(Money::from_paise(100), grand), PaymentStatus::PartiallyPaid);
    /// assert_eq!(PaymentStatus::for_amount(grand, grand), PaymentStatus::Paid);
    /// ```
    pub fn for_amount(paid: Money, grand_total: Money) -> Self {
        if paid >= grand_total {
            PaymentStatus::Paid
        } else if paid.is_positive() {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::Unpaid
        }
    }

    /// Cancelled bills accept no further changes.
    pub fn is_terminal(&self) -> bool {
        *self == PaymentStatus::Cancelled
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

spelled_enum! {
    /// GST registration type of the restaurant.
    pub enum GstScheme {
        /// Tax collected as equal CGST + SGST halves.
        Regular => ("regular", "Regular"),
        /// No tax is collected on the invoice.
        Composition => ("composition", "Composition"),
    }
}

impl Default for GstScheme {
    fn default() -> Self {
        GstScheme::Regular
    }
}

spelled_enum! {
    /// How a discount value is interpreted.
    pub enum DiscountKind {
        /// `value` is in basis points (1000 = 10%), capped at 100%.
        Percentage => ("percentage", "Percentage"),
        /// `value` is in paise, capped at the amount it applies to.
        Flat => ("flat", "Flat"),
    }
}

// =============================================================================
// Discount Spec
// =============================================================================

/// A discount requested for an item or for the whole bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSpec {
    pub kind: DiscountKind,
    /// Basis points for `Percentage`, paise for `Flat`.
    pub value: i64,
    pub reason: Option<String>,
}

impl DiscountSpec {
    /// Percentage discount in basis points.
    pub fn percentage(bps: u32) -> Self {
        DiscountSpec {
            kind: DiscountKind::Percentage,
            value: bps as i64,
            reason: None,
        }
    }

    /// Flat discount.
    pub fn flat(amount: Money) -> Self {
        DiscountSpec {
            kind: DiscountKind::Flat,
            value: amount.paise(),
            reason: None,
        }
    }

    /// Attaches a reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

// =============================================================================
// Order
// =============================================================================

/// One line of a kitchen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Menu item identifier.
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// A kitchen order. Owned by the ordering workflow; billing only reads it
/// and sets or clears `bill_id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    pub table_number: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    /// The bill that consumed this order, if any.
    pub bill_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Billable status and not yet linked to a bill.
    pub fn is_billable(&self) -> bool {
        self.bill_id.is_none() && self.status.is_billable()
    }
}

// =============================================================================
// Bill Item
// =============================================================================

/// A line on the bill. Snapshot pattern: frozen copy of the order line at
/// the time of billing, never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    /// Source order, kept for traceability.
    pub order_id: String,
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// unit_price × quantity.
    pub line_total: Money,
    /// Discount requested for this item, if any.
    pub discount: Option<DiscountSpec>,
    pub item_discount_amount: Money,
    /// line_total − item_discount_amount.
    pub taxable_value: Money,
}

// =============================================================================
// Split Payment
// =============================================================================

/// One part of a payment divided across modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SplitPayment {
    pub mode: PaymentMode,
    pub amount: Money,
}

impl SplitPayment {
    pub fn new(mode: PaymentMode, amount: Money) -> Self {
        SplitPayment { mode, amount }
    }
}

// =============================================================================
// Tax Configuration
// =============================================================================

/// Per-restaurant tax configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxConfig {
    pub gst_scheme: GstScheme,
    /// Combined GST rate; split equally into CGST and SGST.
    pub gst_rate: Rate,
    pub service_charge_enabled: bool,
    pub service_charge_rate: Rate,
    pub round_off_enabled: bool,
    pub packaging_enabled: bool,
    pub default_packaging_charge: Money,
    /// First segment of the bill number (`INV` in `INV/2526/0001`).
    pub bill_prefix: String,
}

impl Default for TaxConfig {
    /// Regular scheme at 5% GST (restaurant rate), round-off on,
    /// service charge and packaging off, prefix `INV`.
    fn default() -> Self {
        TaxConfig {
            gst_scheme: GstScheme::Regular,
            gst_rate: Rate::from_percent(5),
            service_charge_enabled: false,
            service_charge_rate: Rate::zero(),
            round_off_enabled: true,
            packaging_enabled: false,
            default_packaging_charge: Money::zero(),
            bill_prefix: "INV".to_string(),
        }
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Full price breakdown produced by the tax calculator.
///
/// ## Invariants
/// - `taxable_amount = after_all_discounts + service_charge_amount + packaging_charge`
/// - `grand_total = taxable_amount + total_tax + round_off`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    pub items: Vec<BillItem>,
    pub subtotal: Money,
    pub total_item_discount: Money,
    pub after_item_discount: Money,
    /// `None` when nothing was actually deducted.
    pub bill_discount: Option<DiscountSpec>,
    pub bill_discount_amount: Money,
    pub after_all_discounts: Money,
    pub service_charge_rate: Rate,
    pub service_charge_amount: Money,
    pub packaging_charge: Money,
    pub taxable_amount: Money,
    pub gst_scheme: GstScheme,
    pub cgst_rate: Rate,
    pub sgst_rate: Rate,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub total_tax: Money,
    pub round_off: Money,
    pub grand_total: Money,
}

// =============================================================================
// Bill Number
// =============================================================================

/// A bill number together with the fiscal year and sequence behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillNumber {
    /// `INV/2526/0001`
    pub bill_number: String,
    /// `2025-26`
    pub fiscal_year: String,
    pub sequence_number: i64,
}

// =============================================================================
// Bill
// =============================================================================

/// A GST invoice. Immutable once created, except for the payment fields and
/// the cancellation fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub restaurant_id: String,
    pub bill_number: String,
    pub fiscal_year: String,
    pub sequence_number: i64,
    pub table_number: String,
    pub order_type: OrderType,
    pub order_ids: Vec<String>,
    pub items: Vec<BillItem>,

    pub subtotal: Money,
    pub total_item_discount: Money,
    pub bill_discount: Option<DiscountSpec>,
    pub bill_discount_amount: Money,
    pub after_all_discounts: Money,
    pub service_charge_rate: Rate,
    pub service_charge_amount: Money,
    pub packaging_charge: Money,
    pub taxable_amount: Money,
    pub gst_scheme: GstScheme,
    pub cgst_rate: Rate,
    pub sgst_rate: Rate,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub total_tax: Money,
    pub round_off: Money,
    pub grand_total: Money,

    pub payment_mode: PaymentMode,
    pub payment_status: PaymentStatus,
    pub paid_amount: Money,
    pub due_amount: Money,
    pub split_payments: Vec<SplitPayment>,

    pub customer_gstin: Option<String>,
    pub notes: Option<String>,
    /// Staff member who created the bill.
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
}

impl Bill {
    /// Records a declared payment and recomputes status and due amount.
    ///
    /// ## Rules
    /// - Cancelled bills reject payments
    /// - `due = max(0, grand_total − paid)`
    /// - `paid_at` keeps the moment the bill became fully paid, and is
    ///   cleared when a later correction leaves it short again
    pub fn record_payment(
        &mut self,
        mode: PaymentMode,
        paid_amount: Money,
        split_payments: Vec<SplitPayment>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if self.payment_status.is_terminal() {
            return Err(ValidationError::BillCancelled {
                bill_number: self.bill_number.clone(),
            }
            .into());
        }

        self.payment_mode = mode;
        self.paid_amount = paid_amount;
        self.due_amount = (self.grand_total - paid_amount).non_negative();
        self.payment_status = PaymentStatus::for_amount(paid_amount, self.grand_total);
        self.split_payments = split_payments;
        if self.payment_status == PaymentStatus::Paid {
            self.paid_at.get_or_insert(now);
        } else {
            self.paid_at = None;
        }
        self.updated_at = now;

        Ok(())
    }

    /// Marks the bill cancelled. The bill number stays allocated.
    pub fn cancel(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> CoreResult<()> {
        if self.payment_status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                bill_number: self.bill_number.clone(),
                status: self.payment_status,
                operation: "cancel",
            });
        }

        self.payment_status = PaymentStatus::Cancelled;
        self.cancel_reason = Some(reason.into());
        self.cancelled_at = Some(now);
        self.updated_at = now;

        Ok(())
    }

    /// Checks if the bill has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.payment_status.is_terminal()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_bill(grand_total: Money) -> Bill {
        let now = Utc::now();
        Bill {
            id: "bill-1".to_string(),
            restaurant_id: "rest-1".to_string(),
            bill_number: "INV/2526/0001".to_string(),
            fiscal_year: "2025-26".to_string(),
            sequence_number: 1,
            table_number: "T1".to_string(),
            order_type: OrderType::DineIn,
            order_ids: vec!["order-1".to_string()],
            items: Vec::new(),
            subtotal: grand_total,
            total_item_discount: Money::zero(),
            bill_discount: None,
            bill_discount_amount: Money::zero(),
            after_all_discounts: grand_total,
            service_charge_rate: Rate::zero(),
            service_charge_amount: Money::zero(),
            packaging_charge: Money::zero(),
            taxable_amount: grand_total,
            gst_scheme: GstScheme::Composition,
            cgst_rate: Rate::zero(),
            sgst_rate: Rate::zero(),
            cgst_amount: Money::zero(),
            sgst_amount: Money::zero(),
            total_tax: Money::zero(),
            round_off: Money::zero(),
            grand_total,
            payment_mode: PaymentMode::Cash,
            payment_status: PaymentStatus::Unpaid,
            paid_amount: Money::zero(),
            due_amount: grand_total,
            split_payments: Vec::new(),
            customer_gstin: None,
            notes: None,
            created_by: "staff-1".to_string(),
            created_at: now,
            updated_at: now,
            paid_at: None,
            cancelled_at: None,
            cancel_reason: None,
        }
    }

    #[test]
    fn test_rate_helpers() {
        assert_eq!(Rate::from_percent(5).bps(), 500);
        assert_eq!(Rate::from_percent(5).half().bps(), 250);
        assert_eq!(Rate::from_bps(15_000).capped(), Rate::FULL);
        assert!((Rate::from_bps(825).percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_spelling_table_round_trips() {
        for (status, wire, label) in PaymentStatus::SPELLINGS {
            assert_eq!(status.as_str(), *wire);
            assert_eq!(status.label(), *label);
            assert_eq!(PaymentStatus::lookup(wire), Some(*status));
            assert_eq!(PaymentStatus::lookup(label), Some(*status));
            assert_eq!(
                serde_json::to_string(status).unwrap(),
                format!("\"{wire}\"")
            );
        }

        assert_eq!(
            "Partially Paid".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::PartiallyPaid
        );
        assert_eq!("DINE_IN".parse::<OrderType>().unwrap(), OrderType::DineIn);
        assert!("bitcoin".parse::<PaymentMode>().is_err());
    }

    #[test]
    fn test_order_status_billable() {
        assert!(OrderStatus::Served.is_billable());
        assert!(OrderStatus::Completed.is_billable());
        assert!(!OrderStatus::Ready.is_billable());
        assert!(!OrderStatus::Cancelled.is_billable());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
        assert_eq!(GstScheme::default(), GstScheme::Regular);
        assert_eq!(OrderType::default(), OrderType::DineIn);

        let config = TaxConfig::default();
        assert_eq!(config.gst_rate.bps(), 500);
        assert!(config.round_off_enabled);
        assert_eq!(config.bill_prefix, "INV");
    }

    #[test]
    fn test_record_payment_transitions() {
        let grand = Money::from_paise(26300);
        let mut bill = sample_bill(grand);
        let now = Utc::now();

        bill.record_payment(PaymentMode::Cash, Money::from_paise(10000), vec![], now)
            .unwrap();
        assert_eq!(bill.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(bill.due_amount.paise(), 16300);
        assert!(bill.paid_at.is_none());

        bill.record_payment(PaymentMode::Upi, Money::from_paise(30000), vec![], now)
            .unwrap();
        assert_eq!(bill.payment_status, PaymentStatus::Paid);
        assert_eq!(bill.due_amount, Money::zero());
        assert_eq!(bill.paid_at, Some(now));

        let later = now + chrono::Duration::minutes(5);
        bill.record_payment(PaymentMode::Upi, grand, vec![], later).unwrap();
        assert_eq!(bill.paid_at, Some(now));

        bill.record_payment(PaymentMode::Cash, Money::zero(), vec![], later)
            .unwrap();
        assert_eq!(bill.payment_status, PaymentStatus::Unpaid);
        assert_eq!(bill.due_amount, grand);
        assert!(bill.paid_at.is_none());
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut bill = sample_bill(Money::from_paise(26300));
        let now = Utc::now();

        bill.cancel("Customer walked out", now).unwrap();
        assert!(bill.is_cancelled());
        assert_eq!(bill.cancel_reason.as_deref(), Some("Customer walked out"));
        assert_eq!(bill.cancelled_at, Some(now));

        let err = bill.cancel("again", now).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        let err = bill
            .record_payment(PaymentMode::Cash, Money::from_paise(100), vec![], now)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::BillCancelled { .. })
        ));
    }
}
