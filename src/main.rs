mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;
use config::app_config::BackupConfig;

fn main() {
    let args = Cli::parse();

    let filter = EnvFilter::try_from_env("SECRETS_BACKUP_LOG").unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("secrets_backup=debug")
        } else {
            EnvFilter::new("secrets_backup=info")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let result =
        BackupConfig::from_cli(&args).and_then(|config| cli::commands::backup::execute(&config));

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
