//! Terminal front end for the wizard
//!
//! Renders the current stage with dialoguer prompts, writes the answers into
//! the wizard and asks which navigation action to take next. All validation
//! stays in [`Wizard`]; the prompts accept anything.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};
use serde_json::Value;

use crate::schema::{Field, FieldKind};
use crate::wizard::Wizard;

const DECLARATION: &str = "I hereby declare that I have been approved for spaceflight by a \
board-certified Doctor. I will provide the physicians pre-flight report upon confirmation of my trip.";

/// Navigation chosen at the bottom of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Back,
    Submit,
    Quit,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Action::Next => "Next",
            Action::Back => "Back",
            Action::Submit => "Submit",
            Action::Quit => "Quit",
        }
    }
}

/// Actions offered on a data stage. Back is disabled on the first stage and
/// Submit replaces Next on the last data stage.
pub fn available_actions(wizard: &Wizard) -> Vec<Action> {
    let idx = wizard.stage_index();
    let mut actions = Vec::new();
    if idx == wizard.config().last_data_index() {
        actions.push(Action::Submit);
    } else {
        actions.push(Action::Next);
    }
    if idx > 0 {
        actions.push(Action::Back);
    }
    actions.push(Action::Quit);
    actions
}

/// Fields of the current stage in prompt order: the focused field first,
/// then the rest in stage order
pub fn prompt_order(wizard: &Wizard) -> Vec<Field> {
    let fields = &wizard.stage().fields;
    match wizard.state().focus().filter(|f| fields.contains(f)) {
        Some(focus) => std::iter::once(focus)
            .chain(fields.iter().copied().filter(|f| *f != focus))
            .collect(),
        None => fields.clone(),
    }
}

/// Dialoguer-driven renderer for one wizard
pub struct TerminalWizard {
    theme: ColorfulTheme,
}

impl TerminalWizard {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Print the stage header, any outstanding errors and the last failure
    pub fn render_header(&self, wizard: &Wizard) {
        let stage_count = wizard.config().success_index();
        println!();
        println!(
            "{} {} {}",
            style("◆").cyan(),
            style(&wizard.stage().name).bold(),
            style(format!("({} of {})", wizard.stage_index() + 1, stage_count)).dim()
        );
        println!("{}", style("─".repeat(50)).dim());

        if let Some(failure) = wizard.state().failure() {
            println!("{} {}", style("✗").red(), style(failure).red());
        }
        for field in &wizard.stage().fields {
            if let Some(message) = wizard.state().error(*field) {
                println!(
                    "{} {}: {}",
                    style("✗").red(),
                    field.label(),
                    style(message).red()
                );
            }
        }
    }

    /// Prompt every field of the current stage and store the answers
    pub fn prompt_stage(&self, wizard: &mut Wizard) -> Result<()> {
        for field in prompt_order(wizard) {
            let current = wizard.state().value(field).cloned();
            let options = wizard.config().choices().for_field(field).to_vec();
            match self.prompt_field(field, current.as_ref(), &options)? {
                Some(value) => wizard.set_field(field, value),
                None => wizard.clear_field(field),
            }
        }
        Ok(())
    }

    /// Ask which action to take
    pub fn choose_action(&self, wizard: &Wizard) -> Result<Action> {
        let actions = available_actions(wizard);
        let labels: Vec<&str> = actions.iter().map(Action::label).collect();
        let selection = Select::with_theme(&self.theme)
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;
        Ok(actions[selection])
    }

    /// Prompt for one field, pre-filled with its current value
    fn prompt_field(
        &self,
        field: Field,
        current: Option<&Value>,
        options: &[String],
    ) -> Result<Option<Value>> {
        match field.kind() {
            FieldKind::Choice if !options.is_empty() => {
                let default_idx = current
                    .and_then(Value::as_str)
                    .and_then(|c| options.iter().position(|o| o == c))
                    .unwrap_or(0);

                let selection = Select::with_theme(&self.theme)
                    .with_prompt(field.label())
                    .items(options)
                    .default(default_idx)
                    .interact()
                    .into_diagnostic()?;

                Ok(Some(Value::String(options[selection].clone())))
            }

            FieldKind::Boolean => {
                println!("{}", style(DECLARATION).bold());
                let affirmed = Confirm::with_theme(&self.theme)
                    .with_prompt("Affirmative")
                    .default(current.and_then(Value::as_bool).unwrap_or(false))
                    .interact()
                    .into_diagnostic()?;
                Ok(Some(Value::Bool(affirmed)))
            }

            kind => {
                let prompt = match kind {
                    FieldKind::Date => format!("{} (yyyy-mm-dd)", field.label()),
                    _ => field.label().to_string(),
                };
                let initial = current.and_then(Value::as_str).unwrap_or("");
                let value: String = Input::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .with_initial_text(initial)
                    .allow_empty(true)
                    .interact_text()
                    .into_diagnostic()?;

                if value.is_empty() && field.is_optional() {
                    Ok(None)
                } else {
                    Ok(Some(Value::String(value)))
                }
            }
        }
    }
}

impl Default for TerminalWizard {
    fn default() -> Self {
        Self::new()
    }
}
