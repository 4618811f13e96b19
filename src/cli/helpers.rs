//! Shared helper functions for CLI commands

use miette::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::GlobalOpts;
use crate::core::Config;

/// Default filter directive for the given verbosity flags
pub fn default_directive(global: &GlobalOpts) -> &'static str {
    if global.verbose {
        "info"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    }
}

/// Install the stderr tracing subscriber. `RUST_LOG` wins over the flags.
pub fn init_tracing(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global)));
    // A second install (e.g. in tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the layered configuration for a command
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Ok(Config::load(global.config.as_deref())?)
}

/// Multi-threaded runtime for commands that do network I/O
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| miette::miette!("Failed to start async runtime: {}", e))
}

/// Pluralize a noun for summary lines
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        let mut global = GlobalOpts::default();
        assert_eq!(default_directive(&global), "warn");
        global.verbose = true;
        assert_eq!(default_directive(&global), "info");
        global.verbose = false;
        global.quiet = true;
        assert_eq!(default_directive(&global), "error");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "error"), "1 error");
        assert_eq!(plural(3, "file"), "3 files");
    }
}
