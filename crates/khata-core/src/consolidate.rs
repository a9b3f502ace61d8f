//! # Item Consolidator
//!
//! Flattens the lines of several orders for one table into a single list of
//! bill items, attaching any per-item discount the cashier entered.
//!
//! ```text
//! Order A: [Paneer ×2, Naan ×4]  ──┐
//!                                  ├──► [Paneer ×2 (A), Naan ×4 (A), Lassi ×1 (B)]
//! Order B: [Lassi ×1]            ──┘
//! ```
//!
//! Lines are kept per order (not merged by item) so every bill line can be
//! traced back to the order it came from.

use std::collections::{BTreeSet, HashMap};

use crate::error::ValidationError;
use crate::types::{BillItem, DiscountSpec, Order};

/// Per-item discounts keyed by menu item id.
pub type ItemDiscounts = HashMap<String, DiscountSpec>;

/// Builds bill items from orders, in order and line order.
///
/// `line_total` is `unit_price × quantity`; discount amounts are left at zero
/// for the discount engine to fill in.
pub fn consolidate(orders: &[Order], item_discounts: &ItemDiscounts) -> Vec<BillItem> {
    orders
        .iter()
        .flat_map(|order| {
            order.items.iter().map(move |line| {
                let line_total = line.unit_price.multiply_quantity(line.quantity);
                BillItem {
                    order_id: order.id.clone(),
                    item_id: line.item_id.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total,
                    discount: item_discounts.get(&line.item_id).cloned(),
                    item_discount_amount: Default::default(),
                    taxable_value: line_total,
                }
            })
        })
        .collect()
}

/// Returns the shared table number, or `MixedTables` if the orders span
/// more than one table.
pub fn single_table(orders: &[Order]) -> Result<String, ValidationError> {
    let tables: BTreeSet<&str> = orders.iter().map(|o| o.table_number.as_str()).collect();

    match tables.len() {
        0 => Err(ValidationError::required("order_ids")),
        1 => Ok(tables.into_iter().next().unwrap_or_default().to_string()),
        _ => Err(ValidationError::MixedTables {
            tables: tables.into_iter().map(str::to_string).collect(),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
