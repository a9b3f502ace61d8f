//! End-to-end lifecycle tests against an in-memory database.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use khata_billing::{
    BillingError, BillingEvent, BillingService, ChannelSink, CreateBillRequest, ErrorCode,
    EventSink, PreviewRequest, ServiceConfig, SinkError, UpdatePaymentRequest,
};
use khata_core::{
    DiscountSpec, Money, Order, OrderLine, OrderStatus, OrderType, PaymentMode, PaymentStatus,
    Rate, SplitPayment, TaxConfig, ValidationError,
};
use khata_db::{Database, DbConfig, Restaurant};

const RESTAURANT: &str = "rest-1";

// =============================================================================
// Fixtures
// =============================================================================

async fn setup_with(tax_config: TaxConfig) -> BillingService {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.restaurants()
        .upsert(&Restaurant::new(RESTAURANT, "Spice Route").with_tax_config(tax_config))
        .await
        .unwrap();
    BillingService::new(db, ServiceConfig::default())
}

async fn setup() -> BillingService {
    setup_with(TaxConfig::default()).await
}

fn order(id: &str, table: &str, status: OrderStatus, lines: &[(&str, i64, i64)]) -> Order {
    let now = Utc::now();
    Order {
        id: id.to_string(),
        restaurant_id: RESTAURANT.to_string(),
        table_number: table.to_string(),
        order_type: OrderType::DineIn,
        status,
        items: lines
            .iter()
            .map(|(item, qty, paise)| OrderLine {
                item_id: item.to_string(),
                name: item.to_string(),
                quantity: *qty,
                unit_price: Money::from_paise(*paise),
            })
            .collect(),
        bill_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// Two thalis at ₹100 and a lassi at ₹50 on table T1: the ₹263.00 invoice.
async fn seed_reference_order(service: &BillingService, id: &str) {
    service
        .database()
        .orders()
        .insert(&order(
            id,
            "T1",
            OrderStatus::Served,
            &[("thali", 2, 10000), ("lassi", 1, 5000)],
        ))
        .await
        .unwrap();
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn create_request(order_ids: &[&str]) -> CreateBillRequest {
    CreateBillRequest::new(RESTAURANT, ids(order_ids), "T1", "staff-1")
}

fn fiscal_label() -> String {
    ServiceConfig::default().fiscal_year(Utc::now()).label()
}

fn expected_number(sequence: i64) -> String {
    let short = ServiceConfig::default().fiscal_year(Utc::now()).short_code();
    format!("INV/{short}/{sequence:04}")
}

fn assert_validation(err: BillingError) -> ValidationError {
    match err {
        BillingError::Validation(inner) => inner,
        other => panic!("expected validation error, got {other:?}"),
    }
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_reference_invoice() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;

    let bill = service.create(&create_request(&["o1"])).await.unwrap();

    assert_eq!(bill.bill_number, expected_number(1));
    assert_eq!(bill.fiscal_year, fiscal_label());
    assert_eq!(bill.sequence_number, 1);
    assert_eq!(bill.subtotal, Money::from_paise(25000));
    assert_eq!(bill.after_all_discounts, Money::from_paise(25000));
    assert_eq!(bill.taxable_amount, Money::from_paise(25000));
    assert_eq!(bill.cgst_amount, Money::from_paise(625));
    assert_eq!(bill.sgst_amount, Money::from_paise(625));
    assert_eq!(bill.total_tax, Money::from_paise(1250));
    assert_eq!(bill.round_off, Money::from_paise(50));
    assert_eq!(bill.grand_total, Money::from_paise(26300));
    assert_eq!(bill.payment_status, PaymentStatus::Unpaid);
    assert_eq!(bill.due_amount, Money::from_paise(26300));
    assert_eq!(bill.created_by, "staff-1");

    let stored = service.get_bill(RESTAURANT, &bill.id).await.unwrap();
    assert_eq!(stored.bill_number, bill.bill_number);
    assert_eq!(stored.items, bill.items);
    assert_eq!(stored.grand_total, bill.grand_total);
    assert_eq!(stored.order_ids, vec!["o1".to_string()]);

    let linked = service.database().orders().get("o1").await.unwrap().unwrap();
    assert_eq!(linked.bill_id.as_deref(), Some(bill.id.as_str()));
}

#[tokio::test]
async fn test_bill_discount_and_mark_as_paid() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;

    let mut request = create_request(&["o1"]);
    request.bill_discount = Some(DiscountSpec::percentage(1000).with_reason("regular"));
    request.mark_as_paid = true;
    request.payment_mode = PaymentMode::Upi;

    let bill = service.create(&request).await.unwrap();

    assert_eq!(bill.bill_discount_amount, Money::from_paise(2500));
    assert_eq!(bill.after_all_discounts, Money::from_paise(22500));
    assert_eq!(bill.payment_status, PaymentStatus::Paid);
    assert_eq!(bill.paid_amount, bill.grand_total);
    assert_eq!(bill.due_amount, Money::zero());
    assert!(bill.paid_at.is_some());
}

#[tokio::test]
async fn test_fully_discounted_bill_stays_unpaid_until_marked() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;

    let mut request = create_request(&["o1"]);
    request.bill_discount = Some(DiscountSpec::percentage(10_000).with_reason("staff meal"));

    let bill = service.create(&request).await.unwrap();

    assert_eq!(bill.grand_total, Money::zero());
    assert_eq!(bill.payment_status, PaymentStatus::Unpaid);
    assert_eq!(bill.paid_amount, Money::zero());
    assert!(bill.paid_at.is_none());

    let stored = service.get_bill(RESTAURANT, &bill.id).await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Unpaid);
    assert!(stored.paid_at.is_none());
}

#[tokio::test]
async fn test_takeaway_with_service_charge_and_packaging() {
    let config = TaxConfig {
        service_charge_enabled: true,
        service_charge_rate: Rate::from_percent(10),
        packaging_enabled: true,
        default_packaging_charge: Money::from_rupees(20),
        ..TaxConfig::default()
    };
    let service = setup_with(config).await;
    seed_reference_order(&service, "o1").await;

    let mut request = create_request(&["o1"]);
    request.order_type = OrderType::Takeaway;

    let bill = service.create(&request).await.unwrap();

    // 250 + 25 service + 20 packaging = 295 taxable
    assert_eq!(bill.service_charge_amount, Money::from_paise(2500));
    assert_eq!(bill.packaging_charge, Money::from_paise(2000));
    assert_eq!(bill.taxable_amount, Money::from_paise(29500));
    assert_eq!(bill.order_type, OrderType::Takeaway);
}

#[tokio::test]
async fn test_customer_gstin_is_normalized() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;

    let mut request = create_request(&["o1"]);
    request.customer_gstin = Some("27aapfu0939f1zv".to_string());
    request.notes = Some("  corporate lunch ".to_string());

    let bill = service.create(&request).await.unwrap();
    assert_eq!(bill.customer_gstin.as_deref(), Some("27AAPFU0939F1ZV"));
    assert_eq!(bill.notes.as_deref(), Some("corporate lunch"));

    seed_reference_order(&service, "o2").await;
    let mut request = create_request(&["o2"]);
    request.customer_gstin = Some("27AAPFU0939F1Z".to_string());
    let err = service.create(&request).await.unwrap_err();
    assert!(matches!(assert_validation(err), ValidationError::InvalidFormat { .. }));
}

#[tokio::test]
async fn test_split_payment_within_tolerance_is_accepted() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;

    let mut request = create_request(&["o1"]);
    request.payment_mode = PaymentMode::Split;
    request.mark_as_paid = true;
    request.split_payments = vec![
        SplitPayment::new(PaymentMode::Cash, Money::from_paise(13000)),
        SplitPayment::new(PaymentMode::Upi, Money::from_paise(13299)),
    ];

    let bill = service.create(&request).await.unwrap();
    assert_eq!(bill.payment_status, PaymentStatus::Paid);
    assert_eq!(bill.split_payments.len(), 2);
}

#[tokio::test]
async fn test_split_payment_mismatch_rolls_back_everything() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;

    let mut request = create_request(&["o1"]);
    request.payment_mode = PaymentMode::Split;
    request.split_payments = vec![
        SplitPayment::new(PaymentMode::Cash, Money::from_paise(13000)),
        SplitPayment::new(PaymentMode::Card, Money::from_paise(13000)),
    ];

    let err = service.create(&request).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
    assert!(matches!(
        assert_validation(err),
        ValidationError::SplitPaymentMismatch { .. }
    ));

    // No number consumed, no order linked
    let db = service.database();
    assert_eq!(db.sequences().current(RESTAURANT, &fiscal_label()).await.unwrap(), None);
    assert!(db.orders().get("o1").await.unwrap().unwrap().bill_id.is_none());
}

#[tokio::test]
async fn test_orders_cannot_be_billed_twice() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;

    service.create(&create_request(&["o1"])).await.unwrap();
    let err = service.create(&create_request(&["o1"])).await.unwrap_err();

    assert!(matches!(
        assert_validation(err),
        ValidationError::OrdersUnavailable { requested: 1, found: 0 }
    ));
}

#[tokio::test]
async fn test_unserved_and_unknown_orders_are_rejected() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;
    service
        .database()
        .orders()
        .insert(&order("o2", "T1", OrderStatus::Preparing, &[("chai", 1, 3000)]))
        .await
        .unwrap();

    let err = service.create(&create_request(&["o1", "o2"])).await.unwrap_err();
    assert!(matches!(
        assert_validation(err),
        ValidationError::OrdersUnavailable { requested: 2, found: 1 }
    ));

    let err = service.create(&create_request(&["o1", "missing"])).await.unwrap_err();
    assert!(err.is_validation());

    // o1 was claimed and released again by the rollback
    let o1 = service.database().orders().get("o1").await.unwrap().unwrap();
    assert!(o1.bill_id.is_none());
}

#[tokio::test]
async fn test_orders_from_different_tables_are_rejected() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;
    service
        .database()
        .orders()
        .insert(&order("o2", "T2", OrderStatus::Served, &[("chai", 1, 3000)]))
        .await
        .unwrap();

    let err = service.create(&create_request(&["o1", "o2"])).await.unwrap_err();
    assert!(matches!(assert_validation(err), ValidationError::MixedTables { .. }));

    // Requested table must match the orders' table
    let mut request = create_request(&["o2"]);
    request.table_number = "T9".to_string();
    let err = service.create(&request).await.unwrap_err();
    assert!(matches!(assert_validation(err), ValidationError::MixedTables { .. }));
}

#[tokio::test]
async fn test_long_prefix_is_fatal_configuration() {
    let config = TaxConfig {
        bill_prefix: "LONGPREFIX".to_string(),
        ..TaxConfig::default()
    };
    let service = setup_with(config).await;
    seed_reference_order(&service, "o1").await;

    let err = service.create(&create_request(&["o1"])).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::FatalConfiguration);

    let db = service.database();
    assert_eq!(db.sequences().current(RESTAURANT, &fiscal_label()).await.unwrap(), None);
    assert!(db.orders().get("o1").await.unwrap().unwrap().bill_id.is_none());

    let err = service.next_number_preview(RESTAURANT).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::FatalConfiguration);
}

#[tokio::test]
async fn test_unknown_restaurant_is_not_found() {
    let service = setup().await;

    let request = CreateBillRequest::new("nowhere", ids(&["o1"]), "T1", "staff-1");
    let err = service.create(&request).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);

    let err = service
        .get_summary("nowhere", Utc::now() - Duration::days(1), Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_creates_bill_an_order_once() {
    let path = std::env::temp_dir().join(format!("khata-billing-{}.db", Uuid::new_v4()));
    let db = Database::new(DbConfig::new(&path).max_connections(4)).await.unwrap();
    db.restaurants()
        .upsert(&Restaurant::new(RESTAURANT, "Spice Route"))
        .await
        .unwrap();
    let service = BillingService::new(db.clone(), ServiceConfig::default());
    seed_reference_order(&service, "o1").await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.create(&create_request(&["o1"])).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(bill) => {
                created += 1;
                assert_eq!(bill.sequence_number, 1);
            }
            Err(err) => assert!(err.is_validation(), "unexpected error: {err:?}"),
        }
    }
    assert_eq!(created, 1);

    db.close().await;
    let _ = std::fs::remove_file(&path);
}

// =============================================================================
// Payment
// =============================================================================

#[tokio::test]
async fn test_payment_progression() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;
    let bill = service.create(&create_request(&["o1"])).await.unwrap();

    let partial = UpdatePaymentRequest::new(RESTAURANT, &bill.id, PaymentMode::Cash, Money::from_rupees(100));
    let bill = service.update_payment(&partial).await.unwrap();
    assert_eq!(bill.payment_status, PaymentStatus::PartiallyPaid);
    assert_eq!(bill.due_amount, Money::from_paise(16300));
    assert!(bill.paid_at.is_none());

    let full = UpdatePaymentRequest::split(
        RESTAURANT,
        &bill.id,
        vec![
            SplitPayment::new(PaymentMode::Cash, Money::from_rupees(100)),
            SplitPayment::new(PaymentMode::Card, Money::from_rupees(163)),
        ],
    );
    let bill = service.update_payment(&full).await.unwrap();
    assert_eq!(bill.payment_status, PaymentStatus::Paid);
    assert_eq!(bill.due_amount, Money::zero());
    assert!(bill.paid_at.is_some());

    let stored = service.get_bill(RESTAURANT, &bill.id).await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(stored.split_payments.len(), 2);
}

#[tokio::test]
async fn test_split_payment_must_match_paid_amount() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;
    let bill = service.create(&create_request(&["o1"])).await.unwrap();

    let mut request = UpdatePaymentRequest::split(
        RESTAURANT,
        &bill.id,
        vec![
            SplitPayment::new(PaymentMode::Cash, Money::from_rupees(100)),
            SplitPayment::new(PaymentMode::Upi, Money::from_rupees(100)),
        ],
    );
    request.paid_amount = Money::from_rupees(263);

    let err = service.update_payment(&request).await.unwrap_err();
    assert!(matches!(
        assert_validation(err),
        ValidationError::SplitPaymentMismatch { .. }
    ));
}

#[tokio::test]
async fn test_oversized_split_amounts_are_rejected() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;
    let bill = service.create(&create_request(&["o1"])).await.unwrap();

    let mut request = UpdatePaymentRequest::split(
        RESTAURANT,
        &bill.id,
        vec![
            SplitPayment::new(PaymentMode::Cash, Money::from_paise(i64::MAX)),
            SplitPayment::new(PaymentMode::Upi, Money::from_paise(1)),
        ],
    );
    let err = service.update_payment(&request).await.unwrap_err();
    assert!(matches!(assert_validation(err), ValidationError::OutOfRange { .. }));

    request.paid_amount = Money::from_rupees(263);
    let err = service.update_payment(&request).await.unwrap_err();
    assert!(matches!(assert_validation(err), ValidationError::OutOfRange { .. }));

    let stored = service.get_bill(RESTAURANT, &bill.id).await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn test_unknown_bill_is_not_found() {
    let service = setup().await;
    let missing = Uuid::new_v4().to_string();

    let request = UpdatePaymentRequest::new(RESTAURANT, &missing, PaymentMode::Cash, Money::from_rupees(1));
    assert_eq!(service.update_payment(&request).await.unwrap_err().code(), ErrorCode::NotFound);
    assert_eq!(
        service.cancel(RESTAURANT, &missing, "typo").await.unwrap_err().code(),
        ErrorCode::NotFound
    );
}

// =============================================================================
// Cancel
// =============================================================================

#[tokio::test]
async fn test_cancel_releases_orders_for_rebilling() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;
    let first = service.create(&create_request(&["o1"])).await.unwrap();

    let cancelled = service.cancel(RESTAURANT, &first.id, "  wrong table  ").await.unwrap();
    assert_eq!(cancelled.payment_status, PaymentStatus::Cancelled);
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("wrong table"));
    assert!(cancelled.cancelled_at.is_some());

    let o1 = service.database().orders().get("o1").await.unwrap().unwrap();
    assert!(o1.bill_id.is_none());

    // The cancelled number is never reused
    let second = service.create(&create_request(&["o1"])).await.unwrap();
    assert_eq!(second.sequence_number, 2);
    assert_eq!(second.bill_number, expected_number(2));

    let history = service.bills_for_order(RESTAURANT, "o1").await.unwrap();
    assert_eq!(history.len(), 2);

    let stored = service.get_bill_by_number(RESTAURANT, &first.bill_number).await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Cancelled);
}

#[tokio::test]
async fn test_cancelled_bill_rejects_payment_and_second_cancel() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;
    let bill = service.create(&create_request(&["o1"])).await.unwrap();
    service.cancel(RESTAURANT, &bill.id, "customer left").await.unwrap();

    let request = UpdatePaymentRequest::new(RESTAURANT, &bill.id, PaymentMode::Cash, Money::from_rupees(263));
    let err = service.update_payment(&request).await.unwrap_err();
    assert!(matches!(assert_validation(err), ValidationError::BillCancelled { .. }));

    let err = service.cancel(RESTAURANT, &bill.id, "again").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn test_cancel_requires_reason() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;
    let bill = service.create(&create_request(&["o1"])).await.unwrap();

    let err = service.cancel(RESTAURANT, &bill.id, "   ").await.unwrap_err();
    assert!(matches!(assert_validation(err), ValidationError::Required { .. }));
}

// =============================================================================
// Preview
// =============================================================================

#[tokio::test]
async fn test_preview_writes_nothing() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;

    let calc = service
        .preview_calculation(&PreviewRequest::new(RESTAURANT, ids(&["o1"])))
        .await
        .unwrap();
    assert_eq!(calc.grand_total, Money::from_paise(26300));

    let db = service.database();
    assert!(db.orders().get("o1").await.unwrap().unwrap().bill_id.is_none());
    assert_eq!(db.sequences().current(RESTAURANT, &fiscal_label()).await.unwrap(), None);
}

#[tokio::test]
async fn test_preview_rejects_billed_orders() {
    let service = setup().await;
    seed_reference_order(&service, "o1").await;
    service.create(&create_request(&["o1"])).await.unwrap();

    let err = service
        .preview_calculation(&PreviewRequest::new(RESTAURANT, ids(&["o1"])))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_next_number_preview_is_advisory() {
    let service = setup().await;

    let preview = service.next_number_preview(RESTAURANT).await.unwrap();
    assert_eq!(preview.bill_number, expected_number(1));
    assert_eq!(preview.fiscal_year, fiscal_label());

    // Previewing twice reserves nothing
    let again = service.next_number_preview(RESTAURANT).await.unwrap();
    assert_eq!(again, preview);

    seed_reference_order(&service, "o1").await;
    let bill = service.create(&create_request(&["o1"])).await.unwrap();
    assert_eq!(bill.bill_number, preview.bill_number);

    let next = service.next_number_preview(RESTAURANT).await.unwrap();
    assert_eq!(next.sequence_number, 2);
}

// =============================================================================
// Events
// =============================================================================

struct FailingSink;

impl EventSink for FailingSink {
    fn notify(&self, _event: &BillingEvent) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("socket closed".to_string()))
    }
}

#[tokio::test]
async fn test_sink_failure_does_not_fail_billing() {
    let service = setup().await.with_sink(Arc::new(FailingSink));
    seed_reference_order(&service, "o1").await;

    let bill = service.create(&create_request(&["o1"])).await.unwrap();
    let request = UpdatePaymentRequest::new(RESTAURANT, &bill.id, PaymentMode::Cash, Money::from_rupees(263));
    assert!(service.update_payment(&request).await.is_ok());
    assert!(service.cancel(RESTAURANT, &bill.id, "test").await.is_ok());
}

#[tokio::test]
async fn test_events_are_published_after_commit() {
    let sink = ChannelSink::new(16);
    let mut events = sink.subscribe();
    let service = setup().await.with_sink(Arc::new(sink));
    seed_reference_order(&service, "o1").await;

    // A failed create publishes nothing
    let mut bad = create_request(&["o1"]);
    bad.table_number = "T9".to_string();
    assert!(service.create(&bad).await.is_err());

    let bill = service.create(&create_request(&["o1"])).await.unwrap();
    let request = UpdatePaymentRequest::new(RESTAURANT, &bill.id, PaymentMode::Upi, Money::from_rupees(263));
    service.update_payment(&request).await.unwrap();
    service.cancel(RESTAURANT, &bill.id, "refund").await.unwrap();

    let names: Vec<&str> = (0..3).map(|_| events.try_recv().unwrap().name()).collect();
    assert_eq!(names, vec!["bill.created", "bill.payment_updated", "bill.cancelled"]);
    assert!(events.try_recv().is_err());
}

// =============================================================================
// Summary & Configuration
// =============================================================================

#[tokio::test]
async fn test_summary_excludes_cancelled_bills() {
    let service = setup().await;
    let from = Utc::now() - Duration::minutes(1);

    seed_reference_order(&service, "o1").await;
    seed_reference_order(&service, "o2").await;
    service
        .database()
        .orders()
        .insert(&order("o3", "T2", OrderStatus::Completed, &[("chai", 2, 3000)]))
        .await
        .unwrap();

    let mut paid = create_request(&["o1"]);
    paid.mark_as_paid = true;
    service.create(&paid).await.unwrap();

    let cancelled = service.create(&create_request(&["o2"])).await.unwrap();
    service.cancel(RESTAURANT, &cancelled.id, "duplicate").await.unwrap();

    let mut takeaway = CreateBillRequest::new(RESTAURANT, ids(&["o3"]), "T2", "staff-2");
    takeaway.order_type = OrderType::Takeaway;
    service.create(&takeaway).await.unwrap();

    let summary = service
        .get_summary(RESTAURANT, from, Utc::now() + Duration::minutes(1))
        .await
        .unwrap();

    // 263.00 + (60.00 + 3.00 GST = 63.00)
    assert_eq!(summary.bill_count, 2);
    assert_eq!(summary.cancelled_count, 1);
    assert_eq!(summary.net_sales, Money::from_paise(32600));
    assert_eq!(summary.collected, Money::from_paise(26300));
    assert_eq!(summary.outstanding, Money::from_paise(6300));
    assert_eq!(summary.by_order_type.len(), 2);

    let err = service.get_summary(RESTAURANT, from, from).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_save_restaurant_validates_configuration() {
    let service = setup().await;

    let mut restaurant = Restaurant::new("rest-2", "Chaat Corner");
    restaurant.gstin = Some(" 27aapfu0939f1zv".to_string());
    let saved = service.save_restaurant(&restaurant).await.unwrap();
    assert_eq!(saved.gstin.as_deref(), Some("27AAPFU0939F1ZV"));

    let long_prefix = restaurant.clone().with_tax_config(TaxConfig {
        bill_prefix: "LONGPREFIX".to_string(),
        ..TaxConfig::default()
    });
    assert!(service.save_restaurant(&long_prefix).await.unwrap_err().is_validation());

    let odd_gst = restaurant.with_tax_config(TaxConfig {
        gst_rate: Rate::from_bps(501),
        ..TaxConfig::default()
    });
    assert!(service.save_restaurant(&odd_gst).await.unwrap_err().is_validation());
}
