#![deny(clippy::all)]

mod commands;
mod panel;

use std::io;
use std::process::ExitCode;

use clap::CommandFactory;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;
use crate::commands::Command;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Record(args) => panel::record(args).await,
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "recap", &mut io::stdout());
            ExitCode::SUCCESS
        }
    }
}
