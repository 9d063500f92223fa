mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "vid2aud=info,vid2aud_core=warn",
        1 => "vid2aud=debug,vid2aud_core=info",
        2 => "vid2aud=debug,vid2aud_core=debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Some(Commands::Batch { input, options }) => {
            commands::batch::run(&input, &options, cli.config.as_deref()).await
        }
        Some(Commands::Doctor) => commands::doctor::run(cli.config.as_deref()).await,
        Some(Commands::Config) => commands::config::run(cli.config.as_deref()).await,
        None => match cli.list {
            // A file argument selects batch mode
            Some(list) => commands::batch::run(&list, &cli.options, cli.config.as_deref()).await,
            None => commands::interactive::run(&cli.options, cli.config.as_deref()).await,
        },
    }
}
