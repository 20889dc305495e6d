//! `MM-YYYY` month/year validation
//!
//! Subscription start and end dates are stored as `MM-YYYY` text. This module
//! checks that format and reports what exactly is wrong with a rejected value.
//!
//! # Rules
//!
//! - `MM` is two ASCII digits, `01` through `12`
//! - `YYYY` is four ASCII digits, `1900` through `9999`
//! - The two parts are separated by a single `-`
//! - The empty string means "not provided" and is accepted by
//!   [`validate_month_year`]
//!
//! # Example
//!
//! ```
//! use subtrack_shared::validation::date::{validate_month_year, DateFormatError};
//!
//! assert!(validate_month_year("07-2025").is_ok());
//! assert!(validate_month_year("").is_ok());
//! assert!(matches!(
//!     validate_month_year("13-2025"),
//!     Err(DateFormatError::MonthOutOfRange { .. })
//! ));
//! ```

/// Earliest accepted year
pub const MIN_YEAR: u16 = 1900;

/// Latest accepted year
pub const MAX_YEAR: u16 = 9999;

/// Reason a date string was rejected
///
/// Every variant carries the offending value so it can be echoed back to
/// the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateFormatError {
    /// Missing separator or wrong number of segments
    #[error("invalid date format '{value}': expected 'MM-YYYY'")]
    Structure { value: String },

    /// Month segment is not a number
    #[error("invalid month in '{value}': not a number")]
    NonNumericMonth { value: String },

    /// Year segment is not a number
    #[error("invalid year in '{value}': not a number")]
    NonNumericYear { value: String },

    /// Month outside 1..=12
    #[error("invalid month in '{value}': must be between 1 and 12")]
    MonthOutOfRange { value: String },

    /// Year outside 1900..=9999
    #[error("invalid year in '{value}': must be between 1900 and 9999")]
    YearOutOfRange { value: String },

    /// Numerically valid, but not written as exactly `MM-YYYY`
    #[error("invalid date format '{value}': month must have 2 digits and year 4 digits")]
    Width { value: String },
}

impl DateFormatError {
    /// The rejected input
    pub fn value(&self) -> &str {
        match self {
            DateFormatError::Structure { value }
            | DateFormatError::NonNumericMonth { value }
            | DateFormatError::NonNumericYear { value }
            | DateFormatError::MonthOutOfRange { value }
            | DateFormatError::YearOutOfRange { value }
            | DateFormatError::Width { value } => value,
        }
    }
}

/// Checks a non-empty `MM-YYYY` string
///
/// Checks run in a fixed order (structure, numeric month, numeric year,
/// month range, year range, digit width) and the first failure wins, so
/// `02-20000` is reported as an out-of-range year and `1-2025` as a
/// width problem.
fn parse_month_year(s: &str) -> Result<(), DateFormatError> {
    let err_value = || s.to_string();

    let mut parts = s.split('-');
    let (month_part, year_part) = match (parts.next(), parts.next(), parts.next()) {
        (Some(month), Some(year), None) => (month, year),
        _ => return Err(DateFormatError::Structure { value: err_value() }),
    };

    let month: u32 = month_part
        .parse()
        .map_err(|_| DateFormatError::NonNumericMonth { value: err_value() })?;

    let year: u32 = year_part
        .parse()
        .map_err(|_| DateFormatError::NonNumericYear { value: err_value() })?;

    if !(1..=12).contains(&month) {
        return Err(DateFormatError::MonthOutOfRange { value: err_value() });
    }

    if !(u32::from(MIN_YEAR)..=u32::from(MAX_YEAR)).contains(&year) {
        return Err(DateFormatError::YearOutOfRange { value: err_value() });
    }

    if !is_digits(month_part, 2) || !is_digits(year_part, 4) {
        return Err(DateFormatError::Width { value: err_value() });
    }

    Ok(())
}

fn is_digits(segment: &str, width: usize) -> bool {
    segment.len() == width && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Validates an optional `MM-YYYY` string
///
/// The empty string passes: it stands for a field that was not provided.
/// Whether such a field is allowed to be missing is decided by the caller.
pub fn validate_month_year(s: &str) -> Result<(), DateFormatError> {
    if s.is_empty() {
        return Ok(());
    }

    parse_month_year(s)
}
