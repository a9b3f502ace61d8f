//! # Service Configuration
//!
//! Settings for [`crate::BillingService`] that are not per-restaurant.
//!
//! ## Environment Variables
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `KHATA_UTC_OFFSET_MINUTES` | `330` (IST) | Offset used for "today" and the fiscal year |
//!
//! The fiscal year flips at local midnight on April 1, not UTC midnight:
//! a bill created at 2026-03-31T20:00Z is already in 2026-27 in India.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tracing::warn;

use khata_core::FiscalYear;

/// Indian Standard Time, UTC+05:30.
pub const IST_OFFSET_MINUTES: i32 = 330;

/// Largest offset in use anywhere (UTC±14:00).
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Billing service configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Fixed offset from UTC in minutes.
    pub utc_offset_minutes: i32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            utc_offset_minutes: IST_OFFSET_MINUTES,
        }
    }
}

impl ServiceConfig {
    /// Reads configuration from the environment.
    ///
    /// Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = ServiceConfig::default();

        if let Ok(raw) = std::env::var("KHATA_UTC_OFFSET_MINUTES") {
            match raw.trim().parse::<i32>() {
                Ok(minutes) if minutes.abs() <= MAX_OFFSET_MINUTES => {
                    config.utc_offset_minutes = minutes;
                }
                _ => warn!(value = %raw, "Ignoring invalid KHATA_UTC_OFFSET_MINUTES"),
            }
        }

        config
    }

    /// Sets the UTC offset (clamped to ±14:00).
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes.clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
        self
    }

    /// The configured offset.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// The calendar date at `now` in the configured offset.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset()).date_naive()
    }

    /// The fiscal year that `now` falls in.
    pub fn fiscal_year(&self, now: DateTime<Utc>) -> FiscalYear {
        FiscalYear::containing(self.local_date(now))
    }
}
