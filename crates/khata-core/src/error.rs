//! # Error Types
//!
//! Domain-specific error types for khata-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  khata-core errors (this file)                                         │
//! │  ├── CoreError        - Billing rule violations                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  khata-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  khata-billing errors                                                  │
//! │  └── BillingError     - What callers see (with an error code)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BillingError ← DbError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;
use crate::types::PaymentStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core billing errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The generated bill number is longer than GST rules allow.
    ///
    /// ## When This Occurs
    /// The configured prefix is too long for `{prefix}/{YYYY}/{NNNN}`.
    /// This needs an operator to shorten the prefix; retrying cannot help.
    #[error("Bill number '{bill_number}' exceeds {max} characters; shorten the bill prefix")]
    BillNumberTooLong { bill_number: String, max: usize },

    /// The bill's payment status does not allow the requested operation.
    ///
    /// ## When This Occurs
    /// - Recording a payment on a cancelled bill
    /// - Cancelling an already cancelled bill
    #[error("Bill {bill_number} is {status}, cannot {operation}")]
    InvalidTransition {
        bill_number: String,
        status: PaymentStatus,
        operation: &'static str,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are surfaced to the caller unmodified and never retried.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid GSTIN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value in a list that must be unique.
    #[error("{field} '{value}' is listed more than once")]
    Duplicate { field: String, value: String },

    /// Some requested orders are missing, already billed, or not yet served.
    ///
    /// ## When This Occurs
    /// ```text
    /// create(orderIds: [A, B, C])
    ///      │
    ///      ▼
    /// Fetch orders WHERE bill_id IS NULL AND status IN (served, completed)
    ///      │
    ///      ▼
    /// Found [A, C] → OrdersUnavailable { requested: 3, found: 2 }
    /// ```
    #[error("Some orders are invalid, already billed, or not yet served (requested {requested}, billable {found})")]
    OrdersUnavailable { requested: usize, found: usize },

    /// Orders from more than one table were combined.
    #[error("All orders on a bill must belong to the same table (found {tables:?})")]
    MixedTables { tables: Vec<String> },

    /// Split payment needs at least two entries.
    #[error("Split payment needs at least {min} entries, got {count}")]
    TooFewSplitEntries { min: usize, count: usize },

    /// Split entries do not add up to the expected amount.
    #[error("Split payments total {actual} but must equal {expected}")]
    SplitPaymentMismatch { expected: Money, actual: Money },

    /// Payment on a cancelled bill.
    #[error("Bill {bill_number} is cancelled; payments cannot be recorded")]
    BillCancelled { bill_number: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
