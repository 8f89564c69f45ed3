//! DFA State Editor

use clap::Parser;
use dfa_state_editor::{Config, Result, VERSION, cli, init_file_logging, init_logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        Config::load()?
    };

    // The TUI owns the terminal, so it logs to a file
    if args.command.is_interactive() {
        init_file_logging(&config.logging.level, &config.log_file())?;
    } else {
        init_logging(&config.logging.level);
    }

    tracing::info!("DFA State Editor v{}", VERSION);
    tracing::debug!("Parsed arguments: {:?}", args);
    tracing::debug!("Loaded configuration: {:?}", config);

    cli::execute(args, config)?;

    Ok(())
}
