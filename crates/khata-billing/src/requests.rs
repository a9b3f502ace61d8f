//! # Request Types
//!
//! Inputs of the [`crate::BillingService`] operations, in the shape the
//! billing screens send them (camelCase JSON).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use khata_core::consolidate::ItemDiscounts;
use khata_core::validation::{
    validate_amount, validate_discount, validate_gstin, validate_order_ids, validate_paid_amount,
    validate_text, ValidationResult,
};
use khata_core::{DiscountSpec, Money, OrderType, PaymentMode, SplitPayment, ValidationError};

/// "What will this cost" for a set of orders. Nothing is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PreviewRequest {
    pub restaurant_id: String,
    pub order_ids: Vec<String>,
    #[serde(default)]
    pub item_discounts: ItemDiscounts,
    #[serde(default)]
    pub bill_discount: Option<DiscountSpec>,
    pub order_type: OrderType,
    /// Overrides the restaurant's default packaging charge.
    #[serde(default)]
    pub packaging_charge: Option<Money>,
}

impl PreviewRequest {
    /// Dine-in preview without discounts.
    pub fn new(restaurant_id: impl Into<String>, order_ids: Vec<String>) -> Self {
        PreviewRequest {
            restaurant_id: restaurant_id.into(),
            order_ids,
            item_discounts: ItemDiscounts::new(),
            bill_discount: None,
            order_type: OrderType::DineIn,
            packaging_charge: None,
        }
    }

    pub(crate) fn validate(&self) -> ValidationResult<()> {
        validate_order_ids(&self.order_ids)?;
        validate_discounts(&self.item_discounts, self.bill_discount.as_ref())?;
        validate_packaging(self.packaging_charge)
    }
}

/// Bill a table's served orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateBillRequest {
    pub restaurant_id: String,
    pub order_ids: Vec<String>,
    /// Every order must belong to this table.
    pub table_number: String,
    pub order_type: OrderType,
    #[serde(default)]
    pub item_discounts: ItemDiscounts,
    #[serde(default)]
    pub bill_discount: Option<DiscountSpec>,
    pub payment_mode: PaymentMode,
    /// Required (two or more entries) when `payment_mode` is `split`.
    #[serde(default)]
    pub split_payments: Vec<SplitPayment>,
    /// Record the grand total as paid right away.
    #[serde(default)]
    pub mark_as_paid: bool,
    #[serde(default)]
    pub customer_gstin: Option<String>,
    #[serde(default)]
    pub packaging_charge: Option<Money>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Staff member creating the bill.
    pub actor_id: String,
}

impl CreateBillRequest {
    /// Unpaid dine-in cash bill without discounts.
    pub fn new(
        restaurant_id: impl Into<String>,
        order_ids: Vec<String>,
        table_number: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        CreateBillRequest {
            restaurant_id: restaurant_id.into(),
            order_ids,
            table_number: table_number.into(),
            order_type: OrderType::DineIn,
            item_discounts: ItemDiscounts::new(),
            bill_discount: None,
            payment_mode: PaymentMode::Cash,
            split_payments: Vec::new(),
            mark_as_paid: false,
            customer_gstin: None,
            packaging_charge: None,
            notes: None,
            actor_id: actor_id.into(),
        }
    }

    /// Checks everything that does not need the database and returns the
    /// normalized customer GSTIN and notes.
    ///
    /// Split amounts are checked later, against the computed grand total.
    pub(crate) fn validate(&self) -> ValidationResult<(Option<String>, Option<String>)> {
        validate_order_ids(&self.order_ids)?;
        if self.table_number.trim().is_empty() {
            return Err(ValidationError::required("table_number"));
        }
        if self.actor_id.trim().is_empty() {
            return Err(ValidationError::required("actor_id"));
        }
        validate_discounts(&self.item_discounts, self.bill_discount.as_ref())?;
        validate_packaging(self.packaging_charge)?;
        validate_split_mode(self.payment_mode, &self.split_payments)?;

        let customer_gstin = match self.customer_gstin.as_deref().map(str::trim) {
            Some(gstin) if !gstin.is_empty() => Some(validate_gstin(gstin)?),
            _ => None,
        };

        let notes = match self.notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => {
                validate_text("notes", notes)?;
                Some(notes.to_string())
            }
            _ => None,
        };

        Ok((customer_gstin, notes))
    }
}

/// Record a declared payment on an existing bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePaymentRequest {
    pub restaurant_id: String,
    pub bill_id: String,
    pub payment_mode: PaymentMode,
    /// Entries must add up to `paid_amount` when the mode is `split`.
    #[serde(default)]
    pub split_payments: Vec<SplitPayment>,
    pub paid_amount: Money,
}

impl UpdatePaymentRequest {
    /// Single-mode payment of `paid_amount`.
    pub fn new(
        restaurant_id: impl Into<String>,
        bill_id: impl Into<String>,
        payment_mode: PaymentMode,
        paid_amount: Money,
    ) -> Self {
        UpdatePaymentRequest {
            restaurant_id: restaurant_id.into(),
            bill_id: bill_id.into(),
            payment_mode,
            split_payments: Vec::new(),
            paid_amount,
        }
    }

    /// Split payment; `paid_amount` is the sum of the entries.
    pub fn split(
        restaurant_id: impl Into<String>,
        bill_id: impl Into<String>,
        split_payments: Vec<SplitPayment>,
    ) -> Self {
        let paid_amount = split_payments.iter().map(|s| s.amount).sum();
        UpdatePaymentRequest {
            restaurant_id: restaurant_id.into(),
            bill_id: bill_id.into(),
            payment_mode: PaymentMode::Split,
            split_payments,
            paid_amount,
        }
    }

    pub(crate) fn validate(&self) -> ValidationResult<()> {
        validate_paid_amount(self.paid_amount)?;
        validate_split_mode(self.payment_mode, &self.split_payments)
    }
}

// =============================================================================
// Shared Checks
// =============================================================================

fn validate_discounts(
    item_discounts: &ItemDiscounts,
    bill_discount: Option<&DiscountSpec>,
) -> ValidationResult<()> {
    for (item_id, spec) in item_discounts {
        validate_discount(&format!("item_discounts.{item_id}"), spec)?;
    }
    if let Some(spec) = bill_discount {
        validate_discount("bill_discount", spec)?;
    }
    Ok(())
}

fn validate_packaging(packaging_charge: Option<Money>) -> ValidationResult<()> {
    match packaging_charge {
        Some(charge) => validate_amount("packaging_charge", charge),
        None => Ok(()),
    }
}

/// Split entries only make sense with the `split` mode, and that mode
/// cannot go without them.
fn validate_split_mode(mode: PaymentMode, splits: &[SplitPayment]) -> ValidationResult<()> {
    match (mode, splits.is_empty()) {
        (PaymentMode::Split, true) => Err(ValidationError::required("split_payments")),
        (PaymentMode::Split, false) => Ok(()),
        (_, false) => Err(ValidationError::invalid_format(
            "split_payments",
            "only allowed when payment mode is split",
        )),
        (_, true) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> CreateBillRequest {
        CreateBillRequest::new("rest-1", vec!["o1".to_string()], "T4", "staff-1")
    }

    #[test]
    fn test_create_normalizes_gstin_and_notes() {
        let mut request = create();
        request.customer_gstin = Some(" 27aapfu0939f1zv ".to_string());
        request.notes = Some("   ".to_string());

        let (gstin, notes) = request.validate().unwrap();
        assert_eq!(gstin.as_deref(), Some("27AAPFU0939F1ZV"));
        assert_eq!(notes, None);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let mut request = create();
        request.order_ids = vec!["o1".to_string(), "o1".to_string()];
        assert!(matches!(request.validate(), Err(ValidationError::Duplicate { .. })));

        let mut request = create();
        request.table_number = " ".to_string();
        assert!(matches!(request.validate(), Err(ValidationError::Required { .. })));

        let mut request = create();
        request.customer_gstin = Some("27AAPFU0939F1ZX".to_string());
        assert!(matches!(request.validate(), Err(ValidationError::InvalidFormat { .. })));

        let mut request = create();
        request.bill_discount = Some(DiscountSpec::flat(Money::from_paise(-100)));
        assert!(matches!(request.validate(), Err(ValidationError::OutOfRange { .. })));

        let mut request = create();
        request.packaging_charge = Some(Money::from_paise(i64::MAX));
        assert!(matches!(request.validate(), Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn test_split_entries_require_split_mode() {
        let mut request = create();
        request.payment_mode = PaymentMode::Split;
        assert!(request.validate().is_err());

        request.split_payments = vec![
            SplitPayment::new(PaymentMode::Cash, Money::from_rupees(100)),
            SplitPayment::new(PaymentMode::Upi, Money::from_rupees(163)),
        ];
        assert!(request.validate().is_ok());

        request.payment_mode = PaymentMode::Card;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_split_payment_request_sums_entries() {
        let request = UpdatePaymentRequest::split(
            "rest-1",
            "b-1",
            vec![
                SplitPayment::new(PaymentMode::Cash, Money::from_paise(13000)),
                SplitPayment::new(PaymentMode::Card, Money::from_paise(13299)),
            ],
        );
        assert_eq!(request.paid_amount, Money::from_paise(26299));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let json = r#"{
            "restaurantId": "rest-1",
            "orderIds": ["o1", "o2"],
            "tableNumber": "T4",
            "orderType": "dine_in",
            "paymentMode": "cash",
            "actorId": "staff-1"
        }"#;
        let request: CreateBillRequest = serde_json::from_str(json).unwrap();
        assert!(!request.mark_as_paid);
        assert!(request.item_discounts.is_empty());
        assert_eq!(request.order_ids.len(), 2);
    }
}
