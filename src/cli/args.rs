//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    apply::ApplyArgs, completions::CompletionsArgs, config::ConfigCommands,
    schema::SchemaCommands, serve::ServeArgs, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "hmv")]
#[command(author, version, about = "Horizon Mars Visitor application wizard")]
#[command(long_about = "Apply for a visit to Mars through a staged wizard, validate application files, or host the submission endpoint.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file (default: ./hmv.yaml)
    #[arg(long, global = true, env = "HMV_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in and submit a visitor application
    Apply(ApplyArgs),

    /// Validate application files against the form schema
    Validate(ValidateArgs),

    /// Host the submission endpoint
    Serve(ServeArgs),

    /// Inspect the form schema and stage layout
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Show the effective configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
