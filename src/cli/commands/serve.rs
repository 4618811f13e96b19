//! `hmv serve` command - Host the submission endpoint

use console::style;
use miette::Result;

use crate::cli::helpers::{load_config, runtime};
use crate::cli::GlobalOpts;
use crate::protocol::SUBMISSION_PATH;
use crate::server::{self, AppState};

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (default: from config)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}

pub fn run(args: ServeArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let address = args.bind.unwrap_or_else(|| config.bind());
    let state = AppState::new(config.schema());

    if !global.quiet {
        eprintln!(
            "{} Accepting applications on http://{}{} (Ctrl+C to stop)",
            style("→").blue(),
            address,
            SUBMISSION_PATH
        );
    }

    let rt = runtime()?;
    rt.block_on(server::serve(&address, state))?;
    Ok(())
}
