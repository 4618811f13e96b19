//! `hmv apply` command - Fill in and submit an application

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::cli::helpers::{load_config, runtime};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::protocol::Acknowledgment;
use crate::schema::{Field, FieldError, ReceiptContext, ReceiptRenderer, ValidatedRecord};
use crate::wizard::prompt::{Action, TerminalWizard};
use crate::wizard::{DryRunSubmitter, HttpSubmitter, Submitter, Wizard};
use crate::yaml::{parse_record, RecordDiagnostic};

#[derive(clap::Args, Debug)]
pub struct ApplyArgs {
    /// Submission endpoint URL (default: from config)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Acknowledge locally instead of contacting the endpoint
    #[arg(long)]
    pub dry_run: bool,

    /// Submit the application stored in a JSON or YAML file
    #[arg(long, value_name = "FILE", conflicts_with = "kiosk")]
    pub from: Option<PathBuf>,

    /// Start a fresh application after each success screen
    #[arg(long)]
    pub kiosk: bool,
}

pub fn run(args: ApplyArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let submitter: Box<dyn Submitter> = if args.dry_run {
        Box::new(DryRunSubmitter)
    } else {
        let endpoint = args.endpoint.clone().unwrap_or_else(|| config.endpoint());
        debug!(%endpoint, "submitting over HTTP");
        Box::new(HttpSubmitter::new(endpoint))
    };
    let renderer = ReceiptRenderer::new().map_err(|e| miette::miette!("{}", e))?;

    let rt = runtime()?;
    rt.block_on(async {
        match &args.from {
            Some(path) => apply_from_file(path, &config, submitter.as_ref(), &renderer).await,
            None => {
                apply_interactive(&config, submitter.as_ref(), &renderer, args.kiosk, global.quiet)
                    .await
            }
        }
    })
}

/// Drive the wizard through a file's record without prompting
async fn apply_from_file(
    path: &Path,
    config: &Config,
    submitter: &dyn Submitter,
    renderer: &ReceiptRenderer,
) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;
    let value = parse_record(&source, path)?;
    let fields = value
        .as_object()
        .ok_or_else(|| miette::miette!("{} must contain a map of application fields", path.display()))?;

    let (mut wizard, _events) = Wizard::new(config.wizard_config());
    for (key, value) in fields {
        match key.parse::<Field>() {
            Ok(_) if value.is_null() => {}
            Ok(field) => wizard.set_field(field, value.clone()),
            Err(_) => warn!(field = %key, "ignoring unknown field"),
        }
    }

    let filename = path.display().to_string();
    while wizard.stage_index() < wizard.config().last_data_index() {
        if let Err(e) = wizard.advance() {
            report_state_errors(&wizard, &filename, &source);
            return Err(e.into());
        }
    }

    let pending = pending_record(&wizard);
    match wizard.submit(submitter).await {
        Ok(ack) => print_receipt(renderer, &ack, pending.as_ref()),
        Err(e) => {
            report_state_errors(&wizard, &filename, &source);
            Err(e.into())
        }
    }
}

/// Prompt stage by stage until the application is submitted or abandoned
async fn apply_interactive(
    config: &Config,
    submitter: &dyn Submitter,
    renderer: &ReceiptRenderer,
    kiosk: bool,
    quiet: bool,
) -> Result<()> {
    let terminal = TerminalWizard::new();
    let (mut wizard, mut events) = Wizard::new(config.wizard_config());

    if !quiet {
        println!(
            "{} Welcome to the Horizon Mars Visitor application",
            style("◆").cyan()
        );
    }

    loop {
        if wizard.is_complete() {
            if !kiosk {
                return Ok(());
            }
            println!(
                "{}",
                style(format!(
                    "A new application starts in {} seconds...",
                    wizard.config().reset_delay().as_secs()
                ))
                .dim()
            );
            match events.recv().await {
                Some(event) => {
                    wizard.handle_event(event);
                }
                None => return Ok(()),
            }
            continue;
        }

        terminal.render_header(&wizard);
        terminal.prompt_stage(&mut wizard)?;

        match terminal.choose_action(&wizard)? {
            Action::Next => {
                if let Err(e) = wizard.advance() {
                    debug!(error = %e, "stage not complete");
                }
            }
            Action::Back => {
                wizard.retreat();
            }
            Action::Submit => {
                let pending = pending_record(&wizard);
                match wizard.submit(submitter).await {
                    Ok(ack) => print_receipt(renderer, &ack, pending.as_ref())?,
                    Err(e) => debug!(error = %e, "submission did not complete"),
                }
            }
            Action::Quit => {
                if !quiet {
                    println!("{} Application discarded", style("→").blue());
                }
                return Ok(());
            }
        }
    }
}

/// The record as it will be submitted, for the receipt
fn pending_record(wizard: &Wizard) -> Option<ValidatedRecord> {
    wizard
        .config()
        .schema()
        .validate(&wizard.state().record())
        .ok()
}

fn print_receipt(
    renderer: &ReceiptRenderer,
    ack: &Acknowledgment,
    record: Option<&ValidatedRecord>,
) -> Result<()> {
    let reference = ack.reference.clone().unwrap_or_else(|| "-".to_string());
    match record {
        Some(record) => {
            let receipt = renderer
                .render(&ReceiptContext::new(reference, record))
                .map_err(|e| miette::miette!("{}", e))?;
            println!();
            print!("{}", receipt);
        }
        None => {
            println!();
            println!("{}", style("Success!").green().bold());
            println!("Your form has been submitted. Reference: {}", reference);
        }
    }
    std::io::Write::flush(&mut std::io::stdout()).into_diagnostic()?;
    Ok(())
}

/// Print the wizard's per-field errors against the source file
fn report_state_errors(wizard: &Wizard, filename: &str, source: &str) {
    let mut errors: Vec<FieldError> = wizard
        .state()
        .errors()
        .iter()
        .map(|(field, message)| FieldError::new(*field, message.clone()))
        .collect();
    if let Some(failure) = wizard.state().failure() {
        errors.push(FieldError::document(failure));
    }
    if errors.is_empty() {
        return;
    }
    let diagnostic = RecordDiagnostic::new(filename, source, &errors);
    eprintln!("{:?}", miette::Report::new(diagnostic));
}
