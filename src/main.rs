use anyhow::Result;

use pool_calendar::cli::Command;
use pool_calendar::{handle_completions, handle_ingest, handle_process, handle_run, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Ingest(args) => handle_ingest(args),
        Command::Process(args) => handle_process(args),
        Command::Run { ingest, process } => handle_run(ingest, process),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
