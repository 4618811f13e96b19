//! Application validation shared by the wizard and the endpoint
//!
//! Validation runs in two passes over the fields in declaration order: the
//! structural pass from the embedded JSON Schema (wrong JSON types), then the
//! field rules. A field reports at most one error, its first failing check.
//! Cross-field rules run last and report against their owning field.

use chrono::{NaiveDate, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::schema::field::{Field, FieldKind};
use crate::schema::record::ValidatedRecord;
use crate::schema::registry::check_structure;
use crate::schema::rules::{self, DateIssue};

/// One violated rule: the field path and a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            path: field.as_str().to_string(),
            message: message.into(),
        }
    }

    /// Error about the document as a whole rather than one field
    pub fn document(message: impl Into<String>) -> Self {
        Self {
            path: String::new(),
            message: message.into(),
        }
    }

    /// The field this error is attached to, if the path names one
    pub fn field(&self) -> Option<Field> {
        self.path.parse().ok()
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Non-empty, ordered list of rule violations
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("Application validation failed: {summary}")]
#[diagnostic(
    code(hmv::schema::validation_error),
    help("Fix the listed fields and submit again")
)]
pub struct ValidationErrors {
    summary: String,
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        let count = errors.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self { summary, errors }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message attached to a field, if any
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field() == Some(field))
            .map(|e| e.message.as_str())
    }
}

/// Choice lists the selection fields must come from.
///
/// An empty list disables the membership check for that field; the value
/// then only has to be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choices {
    pub departure_hubs: Vec<String>,
    pub martian_lodgings: Vec<String>,
}

impl Choices {
    /// Options for a choice field, empty for any other field
    pub fn for_field(&self, field: Field) -> &[String] {
        match field {
            Field::DepartureHub => &self.departure_hubs,
            Field::MartianLodgings => &self.martian_lodgings,
            _ => &[],
        }
    }
}

/// A constraint spanning several fields, reported against `owner`
pub struct CrossFieldRule {
    pub fields: &'static [Field],
    pub owner: Field,
    check: fn(&Map<String, Value>) -> Option<&'static str>,
}

impl CrossFieldRule {
    fn evaluate(&self, record: &Map<String, Value>) -> Option<FieldError> {
        (self.check)(record).map(|message| FieldError::new(self.owner, message))
    }
}

static CROSS_FIELD_RULES: &[CrossFieldRule] = &[CrossFieldRule {
    fields: &[Field::DepartureDate, Field::ReturnDate],
    owner: Field::ReturnDate,
    check: check_stay_window,
}];

/// All cross-field rules, in evaluation order
pub fn cross_field_rules() -> &'static [CrossFieldRule] {
    CROSS_FIELD_RULES
}

fn check_stay_window(record: &Map<String, Value>) -> Option<&'static str> {
    let date = |field: Field| {
        record
            .get(field.as_str())
            .and_then(Value::as_str)
            .and_then(|s| rules::parse_date(s).ok())
    };
    let (departure, return_date) = (date(Field::DepartureDate)?, date(Field::ReturnDate)?);
    if rules::stay_long_enough(departure, return_date) {
        None
    } else {
        Some("Return date must be at least 28 days after the launch date")
    }
}

/// Today's date on the UTC clock
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The application schema: field rules plus the configured choice lists
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    choices: Choices,
}

impl FormSchema {
    /// Schema that only requires the selection fields to be non-empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema that also requires selections to come from `choices`
    pub fn with_choices(choices: Choices) -> Self {
        Self { choices }
    }

    pub fn choices(&self) -> &Choices {
        &self.choices
    }

    /// Validate a candidate record against today's date
    pub fn validate(&self, record: &Value) -> Result<ValidatedRecord, ValidationErrors> {
        self.validate_on(record, today())
    }

    /// Validate a candidate record, treating `today` as the current date
    pub fn validate_on(
        &self,
        record: &Value,
        today: NaiveDate,
    ) -> Result<ValidatedRecord, ValidationErrors> {
        let Some(map) = record.as_object() else {
            return Err(ValidationErrors::new(vec![FieldError::document(
                "Application must be a JSON object",
            )]));
        };

        let mut errors = self.validate_fields_on(record, Field::all(), today);
        errors.extend(self.cross_field_errors(record, |_| true));
        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }

        normalize(map).map_err(|e| {
            ValidationErrors::new(vec![FieldError::document(format!(
                "Could not normalize application: {}",
                e
            ))])
        })
    }

    /// Errors for `fields` only, in the order given
    pub fn validate_fields(&self, record: &Value, fields: &[Field]) -> Vec<FieldError> {
        self.validate_fields_on(record, fields, today())
    }

    pub fn validate_fields_on(
        &self,
        record: &Value,
        fields: &[Field],
        today: NaiveDate,
    ) -> Vec<FieldError> {
        let structure = check_structure(record);
        if structure.not_an_object {
            return vec![FieldError::document("Application must be a JSON object")];
        }

        fields
            .iter()
            .filter_map(|&field| {
                if let Some(message) = structure.fields.get(&field) {
                    return Some(FieldError::new(field, message.clone()));
                }
                let value = record.get(field.as_str()).filter(|v| !v.is_null());
                self.check_field(field, value, today)
                    .map(|message| FieldError::new(field, message))
            })
            .collect()
    }

    /// Errors from cross-field rules whose fields all satisfy `applicable`
    pub fn cross_field_errors(
        &self,
        record: &Value,
        applicable: impl Fn(Field) -> bool,
    ) -> Vec<FieldError> {
        let Some(map) = record.as_object() else {
            return Vec::new();
        };
        cross_field_rules()
            .iter()
            .filter(|rule| rule.fields.iter().all(|f| applicable(*f)))
            .filter_map(|rule| rule.evaluate(map))
            .collect()
    }

    fn check_field(&self, field: Field, value: Option<&Value>, today: NaiveDate) -> Option<String> {
        if field.kind() == FieldKind::Boolean {
            let affirmed = match value {
                None => false,
                Some(Value::Bool(b)) => *b,
                Some(_) => return Some("Expected true or false".to_string()),
            };
            return (!affirmed)
                .then(|| "You must affirm the health declaration to continue".to_string());
        }

        let text = match value {
            None if field.is_optional() => return None,
            None => return Some(required_message(field).to_string()),
            Some(Value::String(s)) => s.as_str(),
            Some(_) => return Some("Expected a text value".to_string()),
        };

        match field {
            Field::FirstName | Field::LastName | Field::Nationality => {
                (!rules::non_empty(text)).then(|| required_message(field).to_string())
            }
            Field::Email | Field::EmergencyContactEmail => (!rules::is_email(text))
                .then(|| "Please enter a valid email address".to_string()),
            Field::PhoneNumber | Field::EmergencyContactPhone => (!rules::is_phone(text))
                .then(|| "Please enter a valid phone number".to_string()),
            Field::BirthDate => match rules::parse_date(text) {
                Err(issue) => Some(date_issue_message("Birth date", issue)),
                Ok(date) if date >= today => Some("Birth date must be in the past".to_string()),
                Ok(_) => None,
            },
            Field::DepartureDate => match rules::parse_date(text) {
                Err(issue) => Some(date_issue_message("Launch date", issue)),
                Ok(date) if date <= today => {
                    Some("Launch date must be in the future".to_string())
                }
                Ok(_) => None,
            },
            Field::ReturnDate => rules::parse_date(text)
                .err()
                .map(|issue| date_issue_message("Return date", issue)),
            Field::DepartureHub | Field::MartianLodgings => self.check_choice(field, text),
            Field::EmergencyContactName => (!rules::min_chars(text, 3)).then(|| {
                "Name of emergency contact must be at least 3 characters".to_string()
            }),
            Field::AdditionalNotes | Field::MedicalConditions | Field::HealthDeclaration => None,
        }
    }

    fn check_choice(&self, field: Field, value: &str) -> Option<String> {
        if !rules::non_empty(value) {
            return Some(required_message(field).to_string());
        }
        let options = self.choices.for_field(field);
        if options.is_empty() || options.iter().any(|o| o == value) {
            return None;
        }
        Some(match field {
            Field::DepartureHub => "Departure hub must be one of the listed launch pads".to_string(),
            _ => "Martian lodgings must be one of the listed lodgings".to_string(),
        })
    }
}

/// Validate with the default schema (no choice lists) against today's date
pub fn validate(record: &Value) -> Result<ValidatedRecord, ValidationErrors> {
    FormSchema::default().validate(record)
}

fn required_message(field: Field) -> &'static str {
    match field {
        Field::FirstName => "First name is required",
        Field::LastName => "Last name is required",
        Field::BirthDate => "Birth date is required",
        Field::Nationality => "Nationality is required",
        Field::Email => "Email is required",
        Field::PhoneNumber => "Phone number is required",
        Field::DepartureDate => "Launch date is required",
        Field::ReturnDate => "Return date is required",
        Field::DepartureHub => "Departure hub is required",
        Field::MartianLodgings => "Martian lodgings is required",
        Field::HealthDeclaration => "Health declaration is required",
        Field::EmergencyContactName => "Name of emergency contact is required",
        Field::EmergencyContactEmail => "Emergency contact email is required",
        Field::EmergencyContactPhone => "Emergency contact phone number is required",
        Field::AdditionalNotes | Field::MedicalConditions => "This field is required",
    }
}

fn date_issue_message(name: &str, issue: DateIssue) -> String {
    match issue {
        DateIssue::Format => format!("{} must be in the format yyyy-mm-dd", name),
        DateIssue::Calendar => "Invalid date".to_string(),
    }
}

/// Coerce a record that passed every rule into its typed form
fn normalize(map: &Map<String, Value>) -> Result<ValidatedRecord, serde_json::Error> {
    let known: Map<String, Value> = Field::all()
        .iter()
        .filter_map(|f| {
            map.get(f.as_str())
                .filter(|v| !v.is_null())
                .map(|v| (f.as_str().to_string(), v.clone()))
        })
        .collect();
    serde_json::from_value(Value::Object(known))
}
