//! `hmv config` command - Inspect configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::core::{Config, LOCAL_CONFIG_FILE};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration as YAML
    Show,

    /// Show paths to configuration files
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = load_config(global)?;
            let yaml = serde_yml::to_string(&config.resolved()).into_diagnostic()?;
            print!("{}", yaml);
            Ok(())
        }
        ConfigCommands::Path => {
            let describe = |path: &std::path::Path| {
                if path.exists() {
                    style("(exists)").green().to_string()
                } else {
                    style("(not found)").dim().to_string()
                }
            };
            match Config::global_config_path() {
                Some(path) => println!("Global: {} {}", path.display(), describe(path.as_path())),
                None => println!("Global: {}", style("(no config directory)").dim()),
            }
            let local = global
                .config
                .clone()
                .unwrap_or_else(|| LOCAL_CONFIG_FILE.into());
            println!("Local:  {} {}", local.display(), describe(local.as_path()));
            Ok(())
        }
    }
}
