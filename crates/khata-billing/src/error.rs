//! # Billing Error Type
//!
//! The single error type returned by [`crate::BillingService`].
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Khata                                  │
//! │                                                                         │
//! │  ValidationError ───────────────────────────► Validation                │
//! │                                                (VALIDATION_ERROR)       │
//! │  CoreError                                                              │
//! │  ├── Validation(..) ────────────────────────► Validation                │
//! │  ├── InvalidTransition (double cancel) ─────► Conflict (CONFLICT)       │
//! │  └── BillNumberTooLong ─────────────────────► FatalConfiguration        │
//! │                                                (FATAL_CONFIGURATION)    │
//! │  DbError                                                                │
//! │  ├── NotFound ──────────────────────────────► NotFound (NOT_FOUND)      │
//! │  ├── UniqueViolation (bill number) ─────────► Conflict (CONFLICT)       │
//! │  └── everything else ───────────────────────► Database (DATABASE_ERROR) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Callers receive a machine-readable code plus a human-readable message:
//! ```json
//! {
//!   "code": "CONFLICT",
//!   "message": "Bill INV/2526/0001 is cancelled, cannot cancel"
//! }
//! ```
//! Database failures are logged in full and reported with a generic message.

use serde::{Serialize, Serializer};
use thiserror::Error;
use ts_rs::TS;

use khata_core::{CoreError, ValidationError};
use khata_db::DbError;

/// Errors returned by billing operations.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Bad input or a billing rule the request breaks. Never retried.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Bill or restaurant absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The stored state moved underneath the request.
    ///
    /// ## When This Occurs
    /// - Cancelling a bill that is already cancelled
    /// - A bill number collision reported by the store's uniqueness constraint
    #[error("{0}")]
    Conflict(String),

    /// Configuration an operator has to fix (e.g. a bill prefix so long the
    /// number exceeds 16 characters). Retrying cannot help.
    #[error("{0}")]
    FatalConfiguration(String),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(DbError),
}

/// Error codes for billing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// State conflict (409)
    Conflict,

    /// Operator must change configuration (500, not retried)
    FatalConfiguration,

    /// Database operation failed (500)
    DatabaseError,
}

impl BillingError {
    /// Creates a not found error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        BillingError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::Validation(_) => ErrorCode::ValidationError,
            BillingError::NotFound { .. } => ErrorCode::NotFound,
            BillingError::Conflict(_) => ErrorCode::Conflict,
            BillingError::FatalConfiguration(_) => ErrorCode::FatalConfiguration,
            BillingError::Database(_) => ErrorCode::DatabaseError,
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            BillingError::Database(_) => "Database operation failed".to_string(),
            other => other.to_string(),
        }
    }

    /// Checks if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, BillingError::Validation(_))
    }
}

impl Serialize for BillingError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body {
            code: ErrorCode,
            message: String,
        }

        Body {
            code: self.code(),
            message: self.public_message(),
        }
        .serialize(serializer)
    }
}

/// Converts core errors to billing errors.
impl From<CoreError> for BillingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => BillingError::Validation(e),
            err @ CoreError::InvalidTransition { .. } => BillingError::Conflict(err.to_string()),
            err @ CoreError::BillNumberTooLong { .. } => {
                tracing::error!(error = %err, "Bill prefix misconfigured");
                BillingError::FatalConfiguration(err.to_string())
            }
        }
    }
}

/// Converts database errors to billing errors.
impl From<DbError> for BillingError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => BillingError::NotFound { entity, id },
            DbError::UniqueViolation { field, value } => {
                BillingError::Conflict(format!("{field} '{value}' already exists"))
            }
            other => {
                tracing::error!(error = %other, "Database operation failed");
                BillingError::Database(other)
            }
        }
    }
}

/// Convenience type alias for Results with BillingError.
pub type BillingResult<T> = Result<T, BillingError>;

// =============================================================================
// Unit Tests
// =============================================================================
