//! # Validation Module
//!
//! Input validation for billing requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Controller (out of scope)                                    │
//! │  └── Deserialization, request shape                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Order ids, discounts, split payments                              │
//! │  └── GSTIN format + checksum, tax configuration                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── Transactional re-check of billable orders                         │
//! │  └── UNIQUE (restaurant_id, bill_number)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khata_core::validation::{validate_gstin, validate_order_ids};
//!
//! validate_gstin("27AAPFU0939F1ZV").unwrap();
//! validate_order_ids(&["a".to_string(), "b".to_string()]).unwrap();
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{DiscountKind, DiscountSpec, Order, PaymentMode, Rate, SplitPayment, TaxConfig};
use crate::{
    MAX_AMOUNT, MAX_BILL_PREFIX_LEN, MAX_QUANTITY, MAX_TEXT_LEN, MIN_SPLIT_ENTRIES, SPLIT_TOLERANCE,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// GSTIN checksum alphabet.
const GSTIN_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates the list of orders to bill.
///
/// ## Rules
/// - At least one order
/// - No blank ids
/// - No id listed twice (a duplicate would make the fetched count mismatch)
pub fn validate_order_ids(order_ids: &[String]) -> ValidationResult<()> {
    if order_ids.is_empty() {
        return Err(ValidationError::required("order_ids"));
    }

    let mut seen = HashSet::with_capacity(order_ids.len());
    for id in order_ids {
        if id.trim().is_empty() {
            return Err(ValidationError::required("order_id"));
        }
        if !seen.insert(id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "order_id".to_string(),
                value: id.clone(),
            });
        }
    }

    Ok(())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use khata_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    uuid::Uuid::parse_str(id)
        .map_err(|_| ValidationError::invalid_format("id", "must be a valid UUID"))?;

    Ok(())
}

// =============================================================================
// GSTIN
// =============================================================================

/// Validates and normalises a customer GSTIN (upper-cased, trimmed).
///
/// ## Format
/// ```text
/// 27 AAPFU0939F 1 Z V
/// │  │          │ │ └── checksum (mod 36)
/// │  │          │ └──── always 'Z'
/// │  │          └────── entity number (1-9, A-Z)
/// │  └───────────────── PAN (5 letters, 4 digits, 1 letter)
/// └──────────────────── state code (01-38, 97, 99)
/// ```
///
/// ## Example
/// ```rust
/// use khata_core::validation::validate_gstin;
///
/// assert_eq!(validate_gstin(" 29aagcb7383j1z4 ").unwrap(), "29AAGCB7383J1Z4");
/// assert!(validate_gstin("29AAGCB7383J1Z5").is_err()); // bad checksum
/// ```
pub fn validate_gstin(gstin: &str) -> ValidationResult<String> {
    let gstin = gstin.trim().to_ascii_uppercase();
    let invalid = |reason: &str| ValidationError::invalid_format("customer_gstin", reason);

    if gstin.len() != 15 || !gstin.is_ascii() {
        return Err(invalid("must be 15 characters"));
    }

    let bytes = gstin.as_bytes();

    let state: u32 = gstin[0..2]
        .parse()
        .map_err(|_| invalid("must start with a 2-digit state code"))?;
    if !((1..=38).contains(&state) || state == 97 || state == 99) {
        return Err(invalid("unknown state code"));
    }

    let pan_ok = bytes[2..7].iter().all(u8::is_ascii_uppercase)
        && bytes[7..11].iter().all(u8::is_ascii_digit)
        && bytes[11].is_ascii_uppercase();
    if !pan_ok {
        return Err(invalid("characters 3-12 must be a valid PAN"));
    }

    if !(bytes[12].is_ascii_uppercase() || (b'1'..=b'9').contains(&bytes[12])) {
        return Err(invalid("entity number must be 1-9 or A-Z"));
    }

    if bytes[13] != b'Z' {
        return Err(invalid("14th character must be 'Z'"));
    }

    if gstin_checksum(&bytes[..14]) != Some(bytes[14]) {
        return Err(invalid("checksum does not match"));
    }

    Ok(gstin)
}

/// Mod-36 checksum over the first 14 characters.
fn gstin_checksum(body: &[u8]) -> Option<u8> {
    let mut sum = 0usize;
    for (i, c) in body.iter().enumerate() {
        let value = GSTIN_ALPHABET.iter().position(|a| a == c)?;
        let product = value * if i % 2 == 0 { 1 } else { 2 };
        sum += product / 36 + product % 36;
    }
    Some(GSTIN_ALPHABET[(36 - sum % 36) % 36])
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an amount of money in `[0, MAX_AMOUNT]`.
///
/// Everything that feeds the bill arithmetic goes through here, so line
/// totals and sums stay far from `i64` overflow.
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT.paise(),
        });
    }
    Ok(())
}

/// Validates an order line quantity (1 to 10,000).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a unit price (zero allowed for complimentary items).
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    validate_amount("unit_price", price)
}

/// Validates every line of the orders about to be billed.
pub fn validate_order_lines(orders: &[Order]) -> ValidationResult<()> {
    for line in orders.iter().flat_map(|o| &o.items) {
        validate_quantity(line.quantity)?;
        validate_unit_price(line.unit_price)?;
    }
    Ok(())
}

/// Validates a discount request.
///
/// ## Rules
/// - Value must be non-negative
/// - Percentages above 100% are accepted here and capped by the engine
pub fn validate_discount(field: &str, spec: &DiscountSpec) -> ValidationResult<()> {
    let max = match spec.kind {
        DiscountKind::Percentage => Rate::FULL.bps() as i64,
        DiscountKind::Flat => MAX_AMOUNT.paise(),
    };
    if spec.value < 0 || (spec.kind == DiscountKind::Flat && spec.value > max) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max,
        });
    }
    if let Some(reason) = &spec.reason {
        validate_text(&format!("{field}.reason"), reason)?;
    }
    Ok(())
}

/// Validates a rate in basis points (0% to 100%).
pub fn validate_rate_bps(field: &str, rate: Rate) -> ValidationResult<()> {
    if rate > Rate::FULL {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: Rate::FULL.bps() as i64,
        });
    }
    Ok(())
}

/// Validates a declared paid amount.
pub fn validate_paid_amount(amount: Money) -> ValidationResult<()> {
    validate_amount("paid_amount", amount)
}

// =============================================================================
// Split Payments
// =============================================================================

/// Validates split entries against the amount they must add up to.
///
/// ## Rules
/// - At least two entries
/// - Every entry positive and not itself `split`
/// - |Σ entries − expected| ≤ 0.01
///
/// ## Example
/// ```rust
/// use khata_core::validation::validate_split_payments;
/// use khata_core::{Money, PaymentMode, SplitPayment};
///
/// let splits = vec![
///     SplitPayment::new(PaymentMode::Cash, Money::from_paise(13000)),
///     SplitPayment::new(PaymentMode::Upi, Money::from_paise(13299)),
/// ];
/// assert!(validate_split_payments(&splits, Money::from_paise(26300)).is_ok());
/// ```
pub fn validate_split_payments(splits: &[SplitPayment], expected: Money) -> ValidationResult<()> {
    if splits.len() < MIN_SPLIT_ENTRIES {
        return Err(ValidationError::TooFewSplitEntries {
            min: MIN_SPLIT_ENTRIES,
            count: splits.len(),
        });
    }

    for split in splits {
        if split.mode == PaymentMode::Split {
            return Err(ValidationError::NotAllowed {
                field: "split_payments.mode".to_string(),
                allowed: PaymentMode::SPELLINGS
                    .iter()
                    .filter(|(mode, _, _)| *mode != PaymentMode::Split)
                    .map(|(_, wire, _)| wire.to_string())
                    .collect(),
            });
        }
        if !split.amount.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "split_payments.amount".to_string(),
            });
        }
        validate_amount("split_payments.amount", split.amount)?;
    }

    let actual = Money::checked_sum(splits.iter().map(|s| s.amount)).ok_or_else(|| {
        ValidationError::OutOfRange {
            field: "split_payments".to_string(),
            min: 0,
            max: i64::MAX,
        }
    })?;
    if actual.abs_diff(expected) > SPLIT_TOLERANCE {
        return Err(ValidationError::SplitPaymentMismatch { expected, actual });
    }

    Ok(())
}

// =============================================================================
// Text Validators
// =============================================================================

/// Validates free text such as notes (≤ 500 characters).
pub fn validate_text(field: &str, text: &str) -> ValidationResult<()> {
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }
    Ok(())
}

/// Validates and trims a cancellation reason (required, ≤ 500 characters).
pub fn validate_cancel_reason(reason: &str) -> ValidationResult<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ValidationError::required("cancel_reason"));
    }
    validate_text("cancel_reason", reason)?;
    Ok(reason.to_string())
}

// =============================================================================
// Configuration Validators
// =============================================================================

/// Validates the bill prefix.
///
/// ## Rules
/// - 1 to 6 characters (longer prefixes cannot fit the 16-character number)
/// - Letters, digits, hyphens only (the `/` separator is reserved)
pub fn validate_bill_prefix(prefix: &str) -> ValidationResult<()> {
    if prefix.is_empty() {
        return Err(ValidationError::required("bill_prefix"));
    }
    if prefix.chars().count() > MAX_BILL_PREFIX_LEN {
        return Err(ValidationError::TooLong {
            field: "bill_prefix".to_string(),
            max: MAX_BILL_PREFIX_LEN,
        });
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::invalid_format(
            "bill_prefix",
            "must contain only letters, numbers, and hyphens",
        ));
    }
    Ok(())
}

/// Validates a restaurant tax configuration before it is stored.
///
/// GST rates must be an even number of basis points so CGST and SGST are
/// exact halves.
pub fn validate_tax_config(config: &TaxConfig) -> ValidationResult<()> {
    validate_rate_bps("gst_rate", config.gst_rate)?;
    if config.gst_rate.bps() % 2 != 0 {
        return Err(ValidationError::invalid_format(
            "gst_rate",
            "must split into two equal halves (even basis points)",
        ));
    }
    validate_rate_bps("service_charge_rate", config.service_charge_rate)?;
    validate_amount("default_packaging_charge", config.default_packaging_charge)?;
    validate_bill_prefix(&config.bill_prefix)
}

// =============================================================================
// Unit Tests
// =============================================================================
