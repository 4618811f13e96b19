//! Normalized application record

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An application that passed validation, with dates parsed.
///
/// Serializes back to the same camelCase shape the endpoint accepts, dates as
/// `yyyy-mm-dd`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedRecord {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub nationality: String,
    pub email: String,
    pub phone_number: String,

    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub departure_hub: String,
    pub martian_lodgings: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,

    #[serde(default)]
    pub health_declaration: bool,
    pub emergency_contact_name: String,
    pub emergency_contact_email: String,
    pub emergency_contact_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
}

impl ValidatedRecord {
    /// Full name as shown on the receipt
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Length of the stay on Mars in days
    pub fn stay_days(&self) -> i64 {
        (self.return_date - self.departure_date).num_days()
    }
}
