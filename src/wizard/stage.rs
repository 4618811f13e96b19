//! Stage layout and wizard configuration

use miette::Diagnostic;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::schema::{Choices, Field, FormSchema};

/// Delay before the success screen returns to the first stage
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(8);

/// Launch pads offered when no list is configured
pub const DEFAULT_DEPARTURE_HUBS: &[&str] = &[
    "Pacific Spaceport Complex – Alaska",
    "Tanegashima Space Center - Japan",
    "Kool Keith Cosmodrome - New York",
    "Alcântara Launch Center - Brasil",
];

/// Lodgings offered when no list is configured
pub const DEFAULT_MARTIAN_LODGINGS: &[&str] = &[
    "Olympus Mons Biosphere",
    "Valles Marineris Casino",
    "Hellas Planitia Edge Base",
    "Elysium Planitia Spa",
];

/// One step of the wizard and the fields it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDef {
    pub name: String,
    pub fields: Vec<Field>,
}

impl StageDef {
    pub fn new(name: impl Into<String>, fields: impl Into<Vec<Field>>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into(),
        }
    }

    /// The success screen owns no fields
    pub fn is_terminal(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Invalid stage layout
#[derive(Debug, Error, Diagnostic)]
pub enum LayoutError {
    #[error("A wizard needs at least one data stage followed by a success stage")]
    #[diagnostic(code(hmv::wizard::too_few_stages))]
    TooFewStages,

    #[error("The last stage ('{0}') must not own any fields")]
    #[diagnostic(code(hmv::wizard::terminal_stage_has_fields))]
    TerminalStageHasFields(String),

    #[error("Stage '{0}' owns no fields; only the last stage may be empty")]
    #[diagnostic(code(hmv::wizard::empty_stage))]
    EmptyStage(String),

    #[error("Field '{field}' is owned by both '{first}' and '{second}'")]
    #[diagnostic(code(hmv::wizard::duplicate_field))]
    DuplicateField {
        field: Field,
        first: String,
        second: String,
    },

    #[error("Field '{0}' is not owned by any stage")]
    #[diagnostic(code(hmv::wizard::unassigned_field))]
    UnassignedField(Field),
}

/// Everything the wizard needs, passed in at construction
#[derive(Debug, Clone)]
pub struct WizardConfig {
    stages: Vec<StageDef>,
    owners: HashMap<Field, usize>,
    choices: Choices,
    reset_delay: Duration,
}

impl WizardConfig {
    /// Build a configuration, checking that every field belongs to exactly
    /// one data stage and that the layout ends with an empty success stage
    pub fn new(
        stages: Vec<StageDef>,
        choices: Choices,
        reset_delay: Duration,
    ) -> Result<Self, LayoutError> {
        if stages.len() < 2 {
            return Err(LayoutError::TooFewStages);
        }

        let last = stages.len() - 1;
        if !stages[last].is_terminal() {
            return Err(LayoutError::TerminalStageHasFields(stages[last].name.clone()));
        }

        let mut owners: HashMap<Field, usize> = HashMap::new();
        for (idx, stage) in stages[..last].iter().enumerate() {
            if stage.is_terminal() {
                return Err(LayoutError::EmptyStage(stage.name.clone()));
            }
            for field in &stage.fields {
                if let Some(&prev) = owners.get(field) {
                    return Err(LayoutError::DuplicateField {
                        field: *field,
                        first: stages[prev].name.clone(),
                        second: stage.name.clone(),
                    });
                }
                owners.insert(*field, idx);
            }
        }

        if let Some(missing) = Field::all().iter().find(|f| !owners.contains_key(f)) {
            return Err(LayoutError::UnassignedField(*missing));
        }

        Ok(Self {
            stages,
            owners,
            choices,
            reset_delay,
        })
    }

    /// The standard four-stage visitor application
    pub fn standard() -> Self {
        Self {
            owners: owners_of(&standard_stages()),
            stages: standard_stages(),
            choices: default_choices(),
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }

    pub fn with_choices(mut self, choices: Choices) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn stages(&self) -> &[StageDef] {
        &self.stages
    }

    pub fn stage(&self, index: usize) -> Option<&StageDef> {
        self.stages.get(index)
    }

    pub fn choices(&self) -> &Choices {
        &self.choices
    }

    pub fn reset_delay(&self) -> Duration {
        self.reset_delay
    }

    /// Index of the terminal success stage
    pub fn success_index(&self) -> usize {
        self.stages.len() - 1
    }

    /// Index of the stage that carries the submit action
    pub fn last_data_index(&self) -> usize {
        self.stages.len() - 2
    }

    /// Stage that owns `field`
    pub fn stage_of(&self, field: Field) -> Option<usize> {
        self.owners.get(&field).copied()
    }

    /// Schema configured with this wizard's choice lists
    pub fn schema(&self) -> FormSchema {
        FormSchema::with_choices(self.choices.clone())
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn default_choices() -> Choices {
    Choices {
        departure_hubs: DEFAULT_DEPARTURE_HUBS.iter().map(|s| s.to_string()).collect(),
        martian_lodgings: DEFAULT_MARTIAN_LODGINGS.iter().map(|s| s.to_string()).collect(),
    }
}

fn standard_stages() -> Vec<StageDef> {
    vec![
        StageDef::new(
            "Personal Information",
            [
                Field::FirstName,
                Field::LastName,
                Field::BirthDate,
                Field::Nationality,
                Field::Email,
                Field::PhoneNumber,
            ],
        ),
        StageDef::new(
            "Travel Preferences",
            [
                Field::DepartureDate,
                Field::ReturnDate,
                Field::DepartureHub,
                Field::MartianLodgings,
                Field::AdditionalNotes,
            ],
        ),
        StageDef::new(
            "Health and Safety",
            [
                Field::HealthDeclaration,
                Field::EmergencyContactName,
                Field::EmergencyContactEmail,
                Field::EmergencyContactPhone,
                Field::MedicalConditions,
            ],
        ),
        StageDef::new("Success", Vec::new()),
    ]
}

fn owners_of(stages: &[StageDef]) -> HashMap<Field, usize> {
    stages
        .iter()
        .enumerate()
        .flat_map(|(idx, stage)| stage.fields.iter().map(move |f| (*f, idx)))
        .collect()
}
