//! `hmv validate` command - Validate application files against the form schema

use console::style;
use miette::Result;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::cli::helpers::{load_config, plural};
use crate::cli::GlobalOpts;
use crate::yaml::{is_record_path, parse_record, RecordDiagnostic};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Application files or directories to validate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let schema = load_config(global)?.schema();
    let files = expand_paths(&args.paths);
    let mut stats = ValidationStats::default();

    if files.is_empty() {
        return Err(miette::miette!("No application files found"));
    }

    if !global.quiet {
        println!(
            "{} Validating {}...\n",
            style("→").blue(),
            plural(files.len(), "file")
        );
    }

    for path in &files {
        stats.files_checked += 1;
        let filename = path.display().to_string();

        let outcome = std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("{} - {}", filename, e))
            .and_then(|source| {
                let value = parse_record(&source, path)?;
                Ok((source, value))
            });

        let (source, value) = match outcome {
            Ok(parsed) => parsed,
            Err(report) => {
                stats.files_failed += 1;
                stats.total_errors += 1;
                if !args.summary {
                    println!("{} {}", style("✗").red(), filename);
                    println!("{:?}", report);
                }
                if !args.keep_going {
                    break;
                }
                continue;
            }
        };

        match schema.validate(&value) {
            Ok(_) => {
                stats.files_passed += 1;
                if !args.summary {
                    println!("{} {}", style("✓").green(), filename);
                }
            }
            Err(errors) => {
                stats.files_failed += 1;
                stats.total_errors += errors.len();

                if !args.summary {
                    println!(
                        "{} {} - {}",
                        style("✗").red(),
                        filename,
                        plural(errors.len(), "error")
                    );
                    let report =
                        miette::Report::new(RecordDiagnostic::new(&filename, &source, errors.errors()));
                    println!("{:?}", report);
                }

                if !args.keep_going {
                    break;
                }
            }
        }
    }

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());
    println!();

    if stats.files_failed > 0 {
        Err(miette::miette!(
            "Validation failed: {} with errors",
            plural(stats.files_failed, "file")
        ))
    } else {
        println!("{} All applications are valid!", style("✓").green().bold());
        Ok(())
    }
}

/// Expand paths - if a directory is given, find all JSON/YAML files in it
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.path().to_path_buf())
                .filter(|p| is_record_path(p))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            // Missing files are reported as read failures
            files.push(path.clone());
        }
    }

    files
}
