use clap::Parser;
use hmv::cli::helpers::init_tracing;
use hmv::cli::{Cli, Commands};
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Apply(args) => hmv::cli::commands::apply::run(args, &global),
        Commands::Validate(args) => hmv::cli::commands::validate::run(args, &global),
        Commands::Serve(args) => hmv::cli::commands::serve::run(args, &global),
        Commands::Schema(cmd) => hmv::cli::commands::schema::run(cmd, &global),
        Commands::Config(cmd) => hmv::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => hmv::cli::commands::completions::run(args),
    }
}
