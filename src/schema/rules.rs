//! Field predicates shared by every validation pass

use chrono::{Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Minimum stay on Mars, counted from launch date to return date
pub const MIN_STAY_DAYS: u64 = 28;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("static date pattern"));

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+]?[\s0-9]+)?([0-9]{3}|[(]?[0-9]+[)])?([-]?[\s]?[0-9])+$")
        .expect("static phone pattern")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_%+-]+(\.[A-Za-z0-9_%+-]+)*@([A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .expect("static email pattern")
});

/// Why a date string was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateIssue {
    /// Not shaped like `yyyy-mm-dd`
    Format,
    /// Shaped correctly but not a real calendar day (e.g. 2023-02-30)
    Calendar,
}

pub fn non_empty(value: &str) -> bool {
    !value.is_empty()
}

/// Length check in characters, not bytes
pub fn min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Permissive phone pattern: optional leading `+`, digits, and optional
/// grouping with parentheses, hyphens or spaces
pub fn is_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, DateIssue> {
    if !DATE_RE.is_match(value) {
        return Err(DateIssue::Format);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DateIssue::Calendar)
}

/// True when `return_date` is at least [`MIN_STAY_DAYS`] after `departure`
pub fn stay_long_enough(departure: NaiveDate, return_date: NaiveDate) -> bool {
    match departure.checked_add_days(Days::new(MIN_STAY_DAYS)) {
        Some(earliest) => return_date >= earliest,
        None => false,
    }
}
