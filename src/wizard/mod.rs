//! Multi-stage application wizard
//!
//! [`Wizard`] owns the navigation state machine: which stage is current, the
//! partially filled record and the per-field error messages.
//!
//! ```text
//!  Personal --advance--> Travel --advance--> Health --submit--> Success
//!     ^  <----retreat----   ^  <----retreat---                    |
//!     +----------------------------- auto-reset ------------------+
//! ```
//!
//! Field edits never validate. `advance` validates the current stage (plus
//! cross-field rules whose fields are all on this or earlier stages);
//! `submit` validates everything and hands the normalized record to a
//! [`Submitter`]. Validation failures, local or from the endpoint, land the
//! wizard on the earliest stage owning an invalid field with focus on it.

pub mod prompt;
pub mod stage;
pub mod submit;
pub mod timer;

use chrono::NaiveDate;
use miette::Diagnostic;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::protocol::Acknowledgment;
use crate::schema::validator::today;
use crate::schema::{Field, FieldError, FormSchema};

pub use stage::{LayoutError, StageDef, WizardConfig};
pub use submit::{DryRunSubmitter, HttpSubmitter, SubmitError, Submitter};
pub use timer::{ResetTimer, WizardEvent};

#[derive(Debug, Error, Diagnostic)]
pub enum WizardError {
    #[error("{stage}: {count} field(s) need attention")]
    #[diagnostic(code(hmv::wizard::invalid))]
    Invalid {
        stage: String,
        count: usize,
        focus: Field,
    },

    #[error("Cannot advance from '{stage}'")]
    #[diagnostic(
        code(hmv::wizard::advance_blocked),
        help("The success screen is reached only by submitting the application")
    )]
    AdvanceBlocked { stage: String },

    #[error("Cannot submit from '{stage}'")]
    #[diagnostic(
        code(hmv::wizard::submit_blocked),
        help("Complete the remaining stages; the application is submitted from the last one")
    )]
    SubmitBlocked { stage: String },

    #[error("Application already submitted")]
    #[diagnostic(code(hmv::wizard::already_submitted))]
    AlreadySubmitted,

    #[error("Application rejected by the server: {message}")]
    #[diagnostic(code(hmv::wizard::rejected))]
    Rejected {
        message: String,
        count: usize,
        focus: Option<Field>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Submit(SubmitError),
}

/// Current stage, values entered so far and outstanding errors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    stage: usize,
    values: Map<String, Value>,
    errors: BTreeMap<Field, String>,
    focus: Option<Field>,
    failure: Option<String>,
}

impl WizardState {
    pub fn stage_index(&self) -> usize {
        self.stage
    }

    /// Values entered so far, keyed by wire name
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn value(&self, field: Field) -> Option<&Value> {
        self.values.get(field.as_str())
    }

    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Field that should receive input focus
    pub fn focus(&self) -> Option<Field> {
        self.focus
    }

    /// Last submission failure not tied to a field
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// The partial record as a JSON object
    pub fn record(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

/// The wizard state machine
pub struct Wizard {
    config: WizardConfig,
    schema: FormSchema,
    state: WizardState,
    events: UnboundedSender<WizardEvent>,
    reset: Option<ResetTimer>,
    generation: u64,
}

impl Wizard {
    /// Create a wizard on its first stage with an empty record.
    ///
    /// The receiver yields timer events; hand each one back to
    /// [`Wizard::handle_event`].
    pub fn new(config: WizardConfig) -> (Self, UnboundedReceiver<WizardEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let wizard = Self {
            schema: config.schema(),
            config,
            state: WizardState::default(),
            events,
            reset: None,
            generation: 0,
        };
        (wizard, receiver)
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn stage_index(&self) -> usize {
        self.state.stage
    }

    pub fn stage(&self) -> &StageDef {
        &self.config.stages()[self.state.stage]
    }

    /// On the success screen
    pub fn is_complete(&self) -> bool {
        self.state.stage == self.config.success_index()
    }

    /// Whether an auto-reset is pending
    pub fn reset_pending(&self) -> bool {
        self.reset.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<Value>) {
        self.state
            .values
            .insert(field.as_str().to_string(), value.into());
    }

    pub fn clear_field(&mut self, field: Field) {
        self.state.values.remove(field.as_str());
    }

    /// Validate the current stage and move forward one stage.
    ///
    /// Returns the new stage index. Advancing from the last data stage is
    /// refused; only [`Wizard::submit`] reaches the success screen.
    pub fn advance(&mut self) -> Result<usize, WizardError> {
        self.advance_on(today())
    }

    /// [`Wizard::advance`] with an explicit current date
    pub fn advance_on(&mut self, today: NaiveDate) -> Result<usize, WizardError> {
        let idx = self.state.stage;
        if idx >= self.config.last_data_index() {
            return Err(WizardError::AdvanceBlocked {
                stage: self.stage().name.clone(),
            });
        }

        let fields = self.stage().fields.clone();
        let record = self.state.record();
        let mut errors = self.schema.validate_fields_on(&record, &fields, today);
        errors.extend(self.schema.cross_field_errors(&record, |f| {
            self.config.stage_of(f).is_some_and(|s| s <= idx)
        }));

        for field in &fields {
            self.state.errors.remove(field);
        }
        self.state.failure = None;

        if errors.is_empty() {
            self.state.focus = None;
            self.move_to(idx + 1);
            return Ok(idx + 1);
        }

        let mut flagged = Vec::new();
        for e in errors {
            if let Some(field) = e.field() {
                if !flagged.contains(&field) {
                    flagged.push(field);
                }
                self.state.errors.entry(field).or_insert(e.message);
            }
        }

        // A cross-field error may belong to a field on an earlier stage
        let target = flagged
            .iter()
            .filter_map(|f| self.config.stage_of(*f))
            .min()
            .unwrap_or(idx);
        let focus = self.config.stages()[target]
            .fields
            .iter()
            .copied()
            .find(|f| flagged.contains(f))
            .unwrap_or(fields[0]);
        let count = flagged.len();
        self.move_to(target);
        self.state.focus = Some(focus);
        debug!(stage = target, count, focus = %focus, "advance blocked");

        Err(WizardError::Invalid {
            stage: self.stage().name.clone(),
            count,
            focus,
        })
    }

    /// Move back one stage. Values and errors are kept; no-op on the first
    /// stage. Returns the resulting stage index.
    pub fn retreat(&mut self) -> usize {
        if self.state.stage > 0 {
            self.move_to(self.state.stage - 1);
        }
        self.state.stage
    }

    /// Validate the whole record and send it. Only the last data stage
    /// submits; any other stage is refused.
    ///
    /// On acknowledgment the record is cleared, the wizard shows the success
    /// stage and the auto-reset is scheduled. Rejections are mapped back onto
    /// the stages like local errors. Transport failures leave the stage alone
    /// and are kept in [`WizardState::failure`]. There is no retry.
    pub async fn submit(&mut self, submitter: &dyn Submitter) -> Result<Acknowledgment, WizardError> {
        self.submit_on(submitter, today()).await
    }

    /// [`Wizard::submit`] with an explicit current date
    pub async fn submit_on(
        &mut self,
        submitter: &dyn Submitter,
        today: NaiveDate,
    ) -> Result<Acknowledgment, WizardError> {
        if self.is_complete() {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.state.stage != self.config.last_data_index() {
            return Err(WizardError::SubmitBlocked {
                stage: self.stage().name.clone(),
            });
        }

        let validated = match self.schema.validate_on(&self.state.record(), today) {
            Ok(validated) => validated,
            Err(errors) => {
                let count = errors.len();
                let focus = self.apply_errors(errors.into_errors());
                debug!(count, stage = self.state.stage, "submit blocked by validation");
                return Err(match focus {
                    Some(focus) => WizardError::Invalid {
                        stage: self.stage().name.clone(),
                        count,
                        focus,
                    },
                    None => WizardError::Rejected {
                        message: self.state.failure.clone().unwrap_or_default(),
                        count,
                        focus: None,
                    },
                });
            }
        };

        self.state.failure = None;
        match submitter.submit(&validated).await {
            Ok(ack) => {
                info!(reference = ?ack.reference, "application accepted");
                self.state.values.clear();
                self.state.errors.clear();
                self.state.focus = None;
                self.move_to(self.config.success_index());
                self.schedule_reset();
                Ok(ack)
            }
            Err(SubmitError::Rejected { message, errors }) => {
                warn!(count = errors.len(), %message, "application rejected by endpoint");
                let count = errors.len();
                let focus = self.apply_errors(errors);
                if self.state.failure.is_none() && focus.is_none() {
                    self.state.failure = Some(message.clone());
                }
                Err(WizardError::Rejected {
                    message,
                    count,
                    focus,
                })
            }
            Err(e) => {
                error!(error = %e, "application submission failed");
                self.state.failure = Some(e.to_string());
                Err(WizardError::Submit(e))
            }
        }
    }

    /// Return to the first stage with an empty record
    pub fn reset(&mut self) {
        self.reset = None;
        self.state = WizardState::default();
        debug!("wizard reset");
    }

    /// Apply an event from the wizard's event channel.
    ///
    /// Returns false for stale events, e.g. from a timer that was cancelled
    /// after it had already fired.
    pub fn handle_event(&mut self, event: WizardEvent) -> bool {
        match event {
            WizardEvent::ResetElapsed { generation } => {
                let current = self.reset.as_ref().map(ResetTimer::generation);
                if current != Some(generation) || !self.is_complete() {
                    debug!(generation, ?current, "ignoring stale reset event");
                    return false;
                }
                self.reset();
                true
            }
        }
    }

    fn move_to(&mut self, stage: usize) {
        if stage != self.state.stage {
            debug!(from = self.state.stage, to = stage, "stage change");
        }
        if stage != self.config.success_index() {
            // Leaving the success screen cancels its pending reset
            self.reset = None;
        }
        self.state.stage = stage;
    }

    fn schedule_reset(&mut self) {
        self.generation += 1;
        self.reset = ResetTimer::schedule(
            self.config.reset_delay(),
            self.generation,
            self.events.clone(),
        );
    }

    /// Record a full set of errors, jump to the earliest stage owning one and
    /// focus its first invalid field. Errors without a known field are kept
    /// as the general failure message.
    fn apply_errors(&mut self, errors: Vec<FieldError>) -> Option<Field> {
        self.state.errors.clear();
        self.state.focus = None;

        let mut general = Vec::new();
        for e in errors {
            match e.field() {
                Some(field) => {
                    self.state.errors.entry(field).or_insert(e.message);
                }
                None => general.push(e.to_string()),
            }
        }
        self.state.failure = (!general.is_empty()).then(|| general.join("; "));

        let stage = self
            .state
            .errors
            .keys()
            .filter_map(|f| self.config.stage_of(*f))
            .min()?;
        let focus = self.config.stages()[stage]
            .fields
            .iter()
            .copied()
            .find(|f| self.state.errors.contains_key(f));
        self.move_to(stage);
        self.state.focus = focus;
        focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidatedRecord;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn wizard() -> Wizard {
        Wizard::new(WizardConfig::standard()).0
    }

    fn fill_personal(w: &mut Wizard) {
        w.set_field(Field::FirstName, "John");
        w.set_field(Field::LastName, "Doe");
        w.set_field(Field::BirthDate, "2000-01-01");
        w.set_field(Field::Nationality, "American");
        w.set_field(Field::Email, "john.doe@example.com");
        w.set_field(Field::PhoneNumber, "1234567890");
    }

    fn fill_travel(w: &mut Wizard) {
        w.set_field(Field::DepartureDate, "2027-01-01");
        w.set_field(Field::ReturnDate, "2027-01-31");
        w.set_field(Field::DepartureHub, "Pacific Spaceport Complex – Alaska");
        w.set_field(Field::MartianLodgings, "Olympus Mons Biosphere");
    }

    fn fill_health(w: &mut Wizard) {
        w.set_field(Field::HealthDeclaration, true);
        w.set_field(Field::EmergencyContactName, "Jane Doe");
        w.set_field(Field::EmergencyContactEmail, "jane.doe@example.com");
        w.set_field(Field::EmergencyContactPhone, "0987654321");
    }

    /// Fill every stage and walk to the last data stage
    fn fill_to_health(w: &mut Wizard) {
        fill_personal(w);
        w.advance_on(today()).unwrap();
        fill_travel(w);
        w.advance_on(today()).unwrap();
        fill_health(w);
    }

    struct Accepting(AtomicUsize);

    #[async_trait]
    impl Submitter for Accepting {
        async fn submit(&self, _record: &ValidatedRecord) -> Result<Acknowledgment, SubmitError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Acknowledgment::ok("01TEST"))
        }
    }

    struct Failing;

    #[async_trait]
    impl Submitter for Failing {
        async fn submit(&self, _record: &ValidatedRecord) -> Result<Acknowledgment, SubmitError> {
            Err(SubmitError::Transport("connection refused".into()))
        }
    }

    struct RejectingEmail;

    #[async_trait]
    impl Submitter for RejectingEmail {
        async fn submit(&self, _record: &ValidatedRecord) -> Result<Acknowledgment, SubmitError> {
            Err(SubmitError::Rejected {
                message: "Invalid data".into(),
                errors: vec![FieldError::new(Field::Email, "Email is blocked")],
            })
        }
    }

    #[test]
    fn test_starts_on_first_stage() {
        let w = wizard();
        assert_eq!(w.stage_index(), 0);
        assert_eq!(w.stage().name, "Personal Information");
        assert!(w.state().values().is_empty());
        assert!(w.state().errors().is_empty());
    }

    #[test]
    fn test_advance_with_valid_personal_fields() {
        let mut w = wizard();
        fill_personal(&mut w);
        assert_eq!(w.advance_on(today()).unwrap(), 1);
        assert_eq!(w.stage().name, "Travel Preferences");
    }

    #[test]
    fn test_advance_blocked_by_one_invalid_field() {
        let mut w = wizard();
        fill_personal(&mut w);
        w.set_field(Field::Email, "not-an-email");
        let err = w.advance_on(today()).unwrap_err();
        assert!(matches!(err, WizardError::Invalid { count: 1, focus: Field::Email, .. }));
        assert_eq!(w.stage_index(), 0);
        assert_eq!(
            w.state().error(Field::Email),
            Some("Please enter a valid email address")
        );
        assert_eq!(w.state().focus(), Some(Field::Email));
    }

    #[test]
    fn test_focus_is_first_invalid_field_in_stage_order() {
        let mut w = wizard();
        w.set_field(Field::Email, "john.doe@example.com");
        let err = w.advance_on(today()).unwrap_err();
        assert!(matches!(err, WizardError::Invalid { count: 5, focus: Field::FirstName, .. }));
    }

    #[test]
    fn test_fixing_errors_clears_them() {
        let mut w = wizard();
        fill_personal(&mut w);
        w.set_field(Field::PhoneNumber, "call me");
        assert!(w.advance_on(today()).is_err());
        w.set_field(Field::PhoneNumber, "+1 555 123 4567");
        assert_eq!(w.advance_on(today()).unwrap(), 1);
        assert!(w.state().errors().is_empty());
        assert_eq!(w.state().focus(), None);
    }

    #[test]
    fn test_travel_stage_checks_stay_window() {
        let mut w = wizard();
        fill_personal(&mut w);
        w.advance_on(today()).unwrap();
        fill_travel(&mut w);
        w.set_field(Field::ReturnDate, "2027-01-10");
        let err = w.advance_on(today()).unwrap_err();
        assert!(matches!(err, WizardError::Invalid { focus: Field::ReturnDate, .. }));
        assert_eq!(
            w.state().error(Field::ReturnDate),
            Some("Return date must be at least 28 days after the launch date")
        );
        assert_eq!(w.stage_index(), 1);
    }

    #[test]
    fn test_cannot_advance_into_success() {
        let mut w = wizard();
        fill_personal(&mut w);
        fill_travel(&mut w);
        fill_health(&mut w);
        w.advance_on(today()).unwrap();
        w.advance_on(today()).unwrap();
        let err = w.advance_on(today()).unwrap_err();
        assert!(matches!(err, WizardError::AdvanceBlocked { .. }));
        assert_eq!(w.stage_index(), 2);
    }

    #[test]
    fn test_retreat() {
        let mut w = wizard();
        assert_eq!(w.retreat(), 0);

        fill_personal(&mut w);
        fill_travel(&mut w);
        w.advance_on(today()).unwrap();
        w.advance_on(today()).unwrap();
        // Health fields are empty and invalid; going back is still allowed
        assert_eq!(w.retreat(), 1);
        assert_eq!(w.retreat(), 0);
        assert_eq!(w.retreat(), 0);
        assert_eq!(
            w.state().value(Field::DepartureHub),
            Some(&json!("Pacific Spaceport Complex – Alaska"))
        );
    }

    #[test]
    fn test_retreat_keeps_errors() {
        let mut w = wizard();
        fill_personal(&mut w);
        w.advance_on(today()).unwrap();
        assert!(w.advance_on(today()).is_err());
        let errors = w.state().errors().clone();
        w.retreat();
        assert_eq!(w.state().errors(), &errors);
    }

    #[tokio::test]
    async fn test_full_submission_reaches_success_with_empty_record() {
        let (mut w, _events) = Wizard::new(WizardConfig::standard());
        let submitter = Accepting(AtomicUsize::new(0));

        fill_personal(&mut w);
        w.advance_on(today()).unwrap();
        fill_travel(&mut w);
        w.advance_on(today()).unwrap();
        fill_health(&mut w);
        let ack = w.submit_on(&submitter, today()).await.unwrap();

        assert_eq!(ack.reference.as_deref(), Some("01TEST"));
        assert!(w.is_complete());
        assert_eq!(w.stage().name, "Success");
        assert!(w.state().values().is_empty());
        assert!(w.reset_pending());
        assert_eq!(submitter.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_invalid_jumps_to_earliest_stage() {
        let (mut w, _events) = Wizard::new(WizardConfig::standard());
        let submitter = Accepting(AtomicUsize::new(0));
        fill_personal(&mut w);
        w.advance_on(today()).unwrap();
        fill_travel(&mut w);
        w.advance_on(today()).unwrap();
        fill_health(&mut w);
        w.set_field(Field::LastName, "");
        w.set_field(Field::EmergencyContactName, "Al");

        let err = w.submit_on(&submitter, today()).await.unwrap_err();
        assert!(matches!(err, WizardError::Invalid { count: 2, focus: Field::LastName, .. }));
        assert_eq!(w.stage_index(), 0);
        assert!(w.state().error(Field::EmergencyContactName).is_some());
        assert_eq!(submitter.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_health_declaration_blocks_submit() {
        let (mut w, _events) = Wizard::new(WizardConfig::standard());
        fill_to_health(&mut w);
        w.clear_field(Field::HealthDeclaration);
        let err = w
            .submit_on(&Accepting(AtomicUsize::new(0)), today())
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::Invalid { focus: Field::HealthDeclaration, .. }));
        assert_eq!(w.stage_index(), 2);
    }

    #[tokio::test]
    async fn test_server_rejection_returns_to_owning_stage() {
        let (mut w, _events) = Wizard::new(WizardConfig::standard());
        fill_personal(&mut w);
        w.advance_on(today()).unwrap();
        fill_travel(&mut w);
        w.advance_on(today()).unwrap();
        fill_health(&mut w);

        let err = w.submit_on(&RejectingEmail, today()).await.unwrap_err();
        assert!(matches!(
            err,
            WizardError::Rejected { count: 1, focus: Some(Field::Email), .. }
        ));
        assert_eq!(w.stage_index(), 0);
        assert_eq!(w.state().error(Field::Email), Some("Email is blocked"));
        assert_eq!(w.state().value(Field::FirstName), Some(&json!("John")));
    }

    #[tokio::test]
    async fn test_transport_failure_stays_put() {
        let (mut w, _events) = Wizard::new(WizardConfig::standard());
        fill_personal(&mut w);
        w.advance_on(today()).unwrap();
        fill_travel(&mut w);
        w.advance_on(today()).unwrap();
        fill_health(&mut w);

        let err = w.submit_on(&Failing, today()).await.unwrap_err();
        assert!(matches!(err, WizardError::Submit(SubmitError::Transport(_))));
        assert_eq!(w.stage_index(), 2);
        assert!(w.state().failure().unwrap().contains("connection refused"));
        assert!(w.state().errors().is_empty());
        assert!(!w.state().values().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_reset_returns_to_first_stage() {
        let config = WizardConfig::standard().with_reset_delay(Duration::from_secs(8));
        let (mut w, mut events) = Wizard::new(config);
        fill_to_health(&mut w);
        w.submit_on(&Accepting(AtomicUsize::new(0)), today()).await.unwrap();
        assert!(w.is_complete());

        let event = events.recv().await.unwrap();
        assert!(w.handle_event(event));
        assert_eq!(w.stage_index(), 0);
        assert!(!w.reset_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_success_cancels_auto_reset() {
        let (mut w, mut events) = Wizard::new(WizardConfig::standard());
        fill_to_health(&mut w);
        w.submit_on(&Accepting(AtomicUsize::new(0)), today()).await.unwrap();

        assert_eq!(w.retreat(), 2);
        assert!(!w.reset_pending());
        let waited = tokio::time::timeout(Duration::from_secs(30), events.recv()).await;
        assert!(waited.is_err(), "cancelled timer must not fire");
    }

    #[tokio::test]
    async fn test_stale_reset_event_ignored() {
        let (mut w, _events) = Wizard::new(WizardConfig::standard());
        fill_personal(&mut w);
        assert!(!w.handle_event(WizardEvent::ResetElapsed { generation: 1 }));
        assert_eq!(w.state().value(Field::FirstName), Some(&json!("John")));
    }

    #[tokio::test]
    async fn test_submit_after_success_refused() {
        let (mut w, _events) = Wizard::new(WizardConfig::standard());
        let submitter = Accepting(AtomicUsize::new(0));
        fill_to_health(&mut w);
        w.submit_on(&submitter, today()).await.unwrap();
        let err = w.submit_on(&submitter, today()).await.unwrap_err();
        assert!(matches!(err, WizardError::AlreadySubmitted));
        assert_eq!(submitter.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_refused_before_last_stage() {
        let (mut w, _events) = Wizard::new(WizardConfig::standard());
        let submitter = Accepting(AtomicUsize::new(0));
        fill_personal(&mut w);
        fill_travel(&mut w);
        fill_health(&mut w);

        let err = w.submit_on(&submitter, today()).await.unwrap_err();
        assert!(matches!(err, WizardError::SubmitBlocked { .. }));
        assert_eq!(w.stage_index(), 0);
        assert!(!w.reset_pending());
        assert_eq!(submitter.0.load(Ordering::SeqCst), 0);

        w.advance_on(today()).unwrap();
        let err = w.submit_on(&submitter, today()).await.unwrap_err();
        assert!(matches!(err, WizardError::SubmitBlocked { .. }));
        assert_eq!(w.stage_index(), 1);
        assert_eq!(submitter.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cross_field_error_on_earlier_stage_moves_back() {
        // Return date asked up front, launch date only on the second stage
        let stages = vec![
            StageDef::new(
                "Personal Information",
                [
                    Field::FirstName,
                    Field::LastName,
                    Field::BirthDate,
                    Field::Nationality,
                    Field::Email,
                    Field::PhoneNumber,
                    Field::ReturnDate,
                ],
            ),
            StageDef::new(
                "Travel Preferences",
                [
                    Field::DepartureDate,
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
        ];
        let config = WizardConfig::new(
            stages,
            crate::wizard::stage::default_choices(),
            Duration::from_secs(8),
        )
        .unwrap();
        let (mut w, _events) = Wizard::new(config);

        fill_personal(&mut w);
        w.set_field(Field::ReturnDate, "2027-01-10");
        w.advance_on(today()).unwrap();
        fill_travel(&mut w);
        w.set_field(Field::ReturnDate, "2027-01-10");

        let err = w.advance_on(today()).unwrap_err();
        assert!(matches!(
            err,
            WizardError::Invalid { count: 1, focus: Field::ReturnDate, .. }
        ));
        assert_eq!(w.stage_index(), 0);
        assert_eq!(w.state().focus(), Some(Field::ReturnDate));
        assert_eq!(
            w.state().error(Field::ReturnDate),
            Some("Return date must be at least 28 days after the launch date")
        );
    }

    #[test]
    fn test_explicit_reset() {
        let mut w = wizard();
        fill_personal(&mut w);
        w.advance_on(today()).unwrap();
        w.reset();
        assert_eq!(w.stage_index(), 0);
        assert!(w.state().values().is_empty());
    }
}
