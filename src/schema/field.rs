//! Field catalogue for the visitor application record

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every field of the application record, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    BirthDate,
    Nationality,
    Email,
    PhoneNumber,
    DepartureDate,
    ReturnDate,
    DepartureHub,
    MartianLodgings,
    AdditionalNotes,
    HealthDeclaration,
    EmergencyContactName,
    EmergencyContactEmail,
    EmergencyContactPhone,
    MedicalConditions,
}

/// How a field is entered and what JSON type it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text
    Text,
    /// Calendar date as `yyyy-mm-dd`
    Date,
    /// One value out of a configured choice list
    Choice,
    /// Free-form multi-line text
    LongText,
    /// Yes/no flag
    Boolean,
}

#[derive(Debug, Error)]
#[error("Unknown field: {0}")]
pub struct UnknownField(pub String);

impl Field {
    /// Wire name used in JSON bodies and error paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::BirthDate => "birthDate",
            Field::Nationality => "nationality",
            Field::Email => "email",
            Field::PhoneNumber => "phoneNumber",
            Field::DepartureDate => "departureDate",
            Field::ReturnDate => "returnDate",
            Field::DepartureHub => "departureHub",
            Field::MartianLodgings => "martianLodgings",
            Field::AdditionalNotes => "additionalNotes",
            Field::HealthDeclaration => "healthDeclaration",
            Field::EmergencyContactName => "emergencyContactName",
            Field::EmergencyContactEmail => "emergencyContactEmail",
            Field::EmergencyContactPhone => "emergencyContactPhone",
            Field::MedicalConditions => "medicalConditions",
        }
    }

    /// Human-readable label shown next to the input
    pub fn label(&self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::BirthDate => "Date of Birth",
            Field::Nationality => "Nationality",
            Field::Email => "Email",
            Field::PhoneNumber => "Phone number",
            Field::DepartureDate => "Launch Date",
            Field::ReturnDate => "Return Date",
            Field::DepartureHub => "Launch Pad",
            Field::MartianLodgings => "Martian Lodgings",
            Field::AdditionalNotes => "Additional Notes",
            Field::HealthDeclaration => "Health Declaration",
            Field::EmergencyContactName => "Name of Emergency Contact",
            Field::EmergencyContactEmail => "Emergency Contact Email",
            Field::EmergencyContactPhone => "Emergency Contact Phone number",
            Field::MedicalConditions => "Medical Conditions",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::BirthDate | Field::DepartureDate | Field::ReturnDate => FieldKind::Date,
            Field::DepartureHub | Field::MartianLodgings => FieldKind::Choice,
            Field::AdditionalNotes | Field::MedicalConditions => FieldKind::LongText,
            Field::HealthDeclaration => FieldKind::Boolean,
            _ => FieldKind::Text,
        }
    }

    /// Whether a missing value is acceptable
    pub fn is_optional(&self) -> bool {
        matches!(self, Field::AdditionalNotes | Field::MedicalConditions)
    }

    /// Get all fields in declaration order
    pub fn all() -> &'static [Field] {
        &[
            Field::FirstName,
            Field::LastName,
            Field::BirthDate,
            Field::Nationality,
            Field::Email,
            Field::PhoneNumber,
            Field::DepartureDate,
            Field::ReturnDate,
            Field::DepartureHub,
            Field::MartianLodgings,
            Field::AdditionalNotes,
            Field::HealthDeclaration,
            Field::EmergencyContactName,
            Field::EmergencyContactEmail,
            Field::EmergencyContactPhone,
            Field::MedicalConditions,
        ]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_parse() {
        for field in Field::all() {
            let parsed: Field = field.as_str().parse().unwrap();
            assert_eq!(parsed, *field);
        }
    }

    #[test]
    fn test_unknown_field() {
        assert!("first_name".parse::<Field>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Field::EmergencyContactPhone).unwrap();
        assert_eq!(json, "\"emergencyContactPhone\"");
    }

    #[test]
    fn test_declaration_order_matches_ord() {
        let mut sorted = Field::all().to_vec();
        sorted.sort();
        assert_eq!(sorted, Field::all());
    }
}
