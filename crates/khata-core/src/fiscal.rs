//! # Fiscal Years and Bill Numbers
//!
//! Invoice sequences restart every Indian fiscal year (1 April – 31 March).
//!
//! ## Bill Number Format
//! ```text
//! INV / 2526 / 0001
//!  │     │      │
//!  │     │      └── sequence, zero-padded to 4 digits (grows past 9999)
//!  │     └───────── fiscal year short code (2025-26)
//!  └─────────────── restaurant's configured prefix
//!
//! Hard ceiling: 16 characters in total.
//! ```

use chrono::{Datelike, NaiveDate};

use crate::error::{CoreError, CoreResult};
use crate::MAX_BILL_NUMBER_LEN;

/// First month of the fiscal year (April).
const FISCAL_YEAR_START_MONTH: u32 = 4;

/// An April–March fiscal year, identified by the calendar year it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    /// The fiscal year starting in April of `start_year`.
    pub const fn starting(start_year: i32) -> Self {
        FiscalYear { start_year }
    }

    /// The fiscal year a date falls in.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use khata_core::fiscal::FiscalYear;
    ///
    /// let march = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
    /// let april = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
    /// assert_eq!(FiscalYear::containing(march).label(), "2025-26");
    /// assert_eq!(FiscalYear::containing(april).label(), "2026-27");
    /// ```
    pub fn containing(date: NaiveDate) -> Self {
        let start_year = if date.month() >= FISCAL_YEAR_START_MONTH {
            date.year()
        } else {
            date.year() - 1
        };
        FiscalYear { start_year }
    }

    /// Calendar year the fiscal year starts in.
    pub const fn start_year(&self) -> i32 {
        self.start_year
    }

    /// `"2025-26"`: the key of the bill sequence row.
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.start_year, (self.start_year + 1).rem_euclid(100))
    }

    /// `"2526"`: the middle segment of the bill number.
    pub fn short_code(&self) -> String {
        format!(
            "{:02}{:02}",
            self.start_year.rem_euclid(100),
            (self.start_year + 1).rem_euclid(100)
        )
    }

    /// 1 April of the start year.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year, FISCAL_YEAR_START_MONTH, 1)
    }

    /// 31 March of the following year.
    pub fn last_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year + 1, FISCAL_YEAR_START_MONTH, 1)
            .and_then(|d| d.pred_opt())
    }
}

/// Formats `{prefix}/{short_code}/{sequence:04}` and enforces the
/// 16-character ceiling.
///
/// ## Example
/// ```rust
/// use khata_core::fiscal::{format_bill_number, FiscalYear};
///
/// let fy = FiscalYear::starting(2025);
/// assert_eq!(format_bill_number("INV", fy, 1).unwrap(), "INV/2526/0001");
/// assert!(format_bill_number("RESTAURANT", fy, 1).is_err());
/// ```
pub fn format_bill_number(prefix: &str, fiscal_year: FiscalYear, sequence: i64) -> CoreResult<String> {
    let bill_number = format!("{}/{}/{:04}", prefix, fiscal_year.short_code(), sequence);

    if bill_number.chars().count() > MAX_BILL_NUMBER_LEN {
        return Err(CoreError::BillNumberTooLong {
            bill_number,
            max: MAX_BILL_NUMBER_LEN,
        });
    }

    Ok(bill_number)
}

// =============================================================================
// Unit Tests
// =============================================================================
