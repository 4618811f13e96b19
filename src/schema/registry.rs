//! Embedded JSON Schema for the application record
//!
//! The published schema documents the record shape for outside consumers
//! (`hmv schema show --raw`). Inside the crate it backs the structural pass of
//! validation: values of the wrong JSON type are caught here before the field
//! rules run.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, Validator as JsonValidator};
use rust_embed::Embed;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

use crate::schema::field::{Field, FieldKind};

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

const FORM_RECORD: &str = "form_record.schema.json";

static STRUCTURE: LazyLock<Option<JsonValidator>> = LazyLock::new(|| {
    let raw = SchemaRegistry::form_record().ok()?;
    let json: Value = serde_json::from_str(&raw).ok()?;
    validator_for(&json).ok()
});

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Embedded schema not found: {0}")]
    NotFound(String),

    #[error("Embedded schema is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Access to the schemas compiled into the binary
pub struct SchemaRegistry;

impl SchemaRegistry {
    /// Raw JSON text of the application record schema
    pub fn form_record() -> Result<String, RegistryError> {
        let file = EmbeddedSchemas::get(FORM_RECORD)
            .ok_or_else(|| RegistryError::NotFound(FORM_RECORD.to_string()))?;
        String::from_utf8(file.data.into_owned())
            .map_err(|_| RegistryError::Encoding(FORM_RECORD.to_string()))
    }

    /// Parsed application record schema
    pub fn form_record_json() -> Result<Value, RegistryError> {
        let raw = Self::form_record()?;
        serde_json::from_str(&raw).map_err(|e| RegistryError::Encoding(e.to_string()))
    }

    /// Whether the embedded schema compiled
    pub fn is_available() -> bool {
        STRUCTURE.is_some()
    }
}

/// Outcome of the structural pass
#[derive(Debug, Default)]
pub struct StructuralReport {
    /// The document itself is not a JSON object
    pub not_an_object: bool,
    /// First type violation per field
    pub fields: BTreeMap<Field, String>,
}

/// Run the type checks of the embedded schema against a candidate record.
///
/// Only type violations are reported; required-ness, lengths and formats are
/// left to the field rules, which carry the user-facing messages.
pub fn check_structure(record: &Value) -> StructuralReport {
    let mut report = StructuralReport::default();

    if !record.is_object() {
        report.not_an_object = true;
        return report;
    }

    let Some(validator) = STRUCTURE.as_ref() else {
        tracing::warn!("embedded form schema unavailable, skipping structural checks");
        return report;
    };

    for error in validator.iter_errors(record) {
        if !matches!(error.kind, ValidationErrorKind::Type { .. }) {
            continue;
        }
        let path = error.instance_path.to_string();
        let Some(field) = path
            .trim_start_matches('/')
            .split('/')
            .next()
            .and_then(|name| name.parse::<Field>().ok())
        else {
            continue;
        };
        report
            .fields
            .entry(field)
            .or_insert_with(|| type_message(field).to_string());
    }

    report
}

fn type_message(field: Field) -> &'static str {
    match field.kind() {
        FieldKind::Boolean => "Expected true or false",
        _ => "Expected a text value",
    }
}
