//! # Tax Calculator
//!
//! Turns discounted bill items and a restaurant's tax configuration into the
//! full GST breakdown. Pure and deterministic: same input, same invoice.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. subtotal            = Σ line_total                                  │
//! │     after_item_discount = subtotal − Σ item discounts                  │
//! │  2. after_all_discounts = after_item_discount − bill discount          │
//! │  3. service_charge      = after_all_discounts × rate   (if enabled)    │
//! │  4. packaging           = override | default  (not dine-in, enabled)   │
//! │  5. taxable_amount      = after_all_discounts + service + packaging    │
//! │  6. CGST = SGST         = taxable_amount × gst_rate / 2 (regular)      │
//! │                         = 0                            (composition)   │
//! │  7. round_off           = round(taxable + tax) − (taxable + tax)       │
//! │  8. grand_total         = taxable + tax + round_off                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Service charge and packaging are part of the consideration for supply,
//! so they sit inside the taxable base rather than being added after tax.

use crate::consolidate::{consolidate, ItemDiscounts};
use crate::discount::{apply_bill_discount, apply_item_discounts};
use crate::money::Money;
use crate::types::{BillItem, Calculation, DiscountSpec, GstScheme, Order, OrderType, Rate, TaxConfig};

/// Calculates the invoice breakdown for already-discounted items.
///
/// ## Example
/// ```rust
/// use khata_core::tax::calculate;
/// use khata_core::{Money, OrderType, TaxConfig};
///
/// let calc = calculate(Vec::new(), &TaxConfig::default(), None, OrderType::DineIn, None);
/// assert_eq!(calc.grand_total, Money::zero());
/// ```
pub fn calculate(
    items: Vec<BillItem>,
    config: &TaxConfig,
    bill_discount: Option<&DiscountSpec>,
    order_type: OrderType,
    packaging_override: Option<Money>,
) -> Calculation {
    // 1. Item totals
    let subtotal: Money = items.iter().map(|i| i.line_total).sum();
    let total_item_discount: Money = items.iter().map(|i| i.item_discount_amount).sum();
    let after_item_discount = subtotal - total_item_discount;

    // 2. Bill discount
    let discount = apply_bill_discount(bill_discount, after_item_discount);
    let after_all_discounts = discount.after_all_discounts;
    let bill_discount = if discount.amount.is_zero() {
        None
    } else {
        bill_discount.cloned()
    };

    // 3. Service charge
    let service_charge_rate = if config.service_charge_enabled {
        config.service_charge_rate
    } else {
        Rate::zero()
    };
    let service_charge_amount = after_all_discounts.percent_of(service_charge_rate);

    // 4. Packaging
    let packaging_charge = if order_type != OrderType::DineIn && config.packaging_enabled {
        packaging_override
            .unwrap_or(config.default_packaging_charge)
            .non_negative()
    } else {
        Money::zero()
    };

    // 5. Taxable base
    let taxable_amount = after_all_discounts + service_charge_amount + packaging_charge;

    // 6. GST
    let (cgst_rate, sgst_rate) = match config.gst_scheme {
        GstScheme::Regular => (config.gst_rate.half(), config.gst_rate.half()),
        GstScheme::Composition => (Rate::zero(), Rate::zero()),
    };
    let cgst_amount = taxable_amount.percent_of(cgst_rate);
    let sgst_amount = taxable_amount.percent_of(sgst_rate);
    let total_tax = cgst_amount + sgst_amount;

    // 7. Round-off
    let raw_total = taxable_amount + total_tax;
    let round_off = if config.round_off_enabled {
        raw_total.round_to_rupee() - raw_total
    } else {
        Money::zero()
    };

    // 8. Grand total
    let grand_total = raw_total + round_off;

    Calculation {
        items,
        subtotal,
        total_item_discount,
        after_item_discount,
        bill_discount,
        bill_discount_amount: discount.amount,
        after_all_discounts,
        service_charge_rate,
        service_charge_amount,
        packaging_charge,
        taxable_amount,
        gst_scheme: config.gst_scheme,
        cgst_rate,
        sgst_rate,
        cgst_amount,
        sgst_amount,
        total_tax,
        round_off,
        grand_total,
    }
}

/// Runs consolidation, item discounts and [`calculate`] for a set of orders.
pub fn calculate_for_orders(
    orders: &[Order],
    item_discounts: &ItemDiscounts,
    config: &TaxConfig,
    bill_discount: Option<&DiscountSpec>,
    order_type: OrderType,
    packaging_override: Option<Money>,
) -> Calculation {
    let mut items = consolidate(orders, item_discounts);
    apply_item_discounts(&mut items);
    calculate(items, config, bill_discount, order_type, packaging_override)
}

// =============================================================================
// Unit Tests
// =============================================================================
