pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod export;
pub mod fetchers;
pub mod http;
pub mod location;
pub mod rate_limiter;
pub mod reconcile;
pub mod services;
pub mod text;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::Cli;
use clap_complete::Shell;

use crate::cli::{Command, IngestArgs, ProcessArgs};
use crate::config::settings::AppConfig;
use crate::services::{IngestionService, ProcessingService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_ingest(args: &IngestArgs) -> Result<()> {
    let mut config = AppConfig::new();
    args.apply(&mut config);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut service = IngestionService::new(config, args.options())?;
        service.run().await.map(|_| ())
    })
}

pub fn handle_process(args: &ProcessArgs) -> Result<()> {
    let mut config = AppConfig::new();
    args.apply(&mut config);

    let service = ProcessingService::new(config)?;
    service.run().map(|_| ())
}

pub fn handle_run(ingest: &IngestArgs, process: &ProcessArgs) -> Result<()> {
    handle_ingest(ingest)?;
    handle_process(process)
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
