//! # Discount Engine
//!
//! Item-level discounts are applied line by line; the bill-level discount is
//! applied once to what is left after item discounts.
//!
//! ## Caps
//! ```text
//! percentage: amount = base × min(value, 100%)
//! flat:       amount = min(value, base)
//!
//! Either way: 0 ≤ amount ≤ base
//! ```

use crate::money::Money;
use crate::types::{BillItem, DiscountKind, DiscountSpec, Rate};

/// Discount amount for `spec` on `base`, capped to `[0, base]`.
///
/// ## Example
/// ```rust
/// use khata_core::discount::discount_amount;
/// use khata_core::{DiscountSpec, Money};
///
/// let base = Money::from_rupees(250);
/// assert_eq!(discount_amount(&DiscountSpec::percentage(1000), base), Money::from_rupees(25));
/// assert_eq!(discount_amount(&DiscountSpec::flat(Money::from_rupees(400)), base), base);
/// ```
pub fn discount_amount(spec: &DiscountSpec, base: Money) -> Money {
    let base = base.non_negative();
    let value = spec.value.max(0);

    let amount = match spec.kind {
        DiscountKind::Percentage => {
            let bps = u32::try_from(value).unwrap_or(u32::MAX);
            base.percent_of(Rate::from_bps(bps).capped())
        }
        DiscountKind::Flat => Money::from_paise(value),
    };

    amount.min(base)
}

/// Fills in `item_discount_amount` and `taxable_value` for every item.
pub fn apply_item_discounts(items: &mut [BillItem]) {
    for item in items.iter_mut() {
        item.line_total = item.unit_price.multiply_quantity(item.quantity);
        item.item_discount_amount = item
            .discount
            .as_ref()
            .map(|spec| discount_amount(spec, item.line_total))
            .unwrap_or_default();
        item.taxable_value = item.line_total - item.item_discount_amount;
    }
}

/// Result of applying the bill-level discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillDiscount {
    pub amount: Money,
    pub after_all_discounts: Money,
}

/// Applies the optional bill-level discount to `after_item_discount`.
pub fn apply_bill_discount(spec: Option<&DiscountSpec>, after_item_discount: Money) -> BillDiscount {
    let amount = spec
        .map(|s| discount_amount(s, after_item_discount))
        .unwrap_or_default();

    BillDiscount {
        amount,
        after_all_discounts: after_item_discount - amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
