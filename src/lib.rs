//! DFA State Editor
//!
//! An editable model of a deterministic finite automaton, built for a
//! graphical editor to bind to.
//!
//! This library provides functionality for:
//! - Keeping each state's symbol table, arrows and adjacency caches consistent
//!   under interactive edits
//! - Deriving node and arrow geometry from state positions
//! - Drawing states and arrows through an abstract surface
//! - Structural analysis (reachability, dead states, completeness)
//! - An interactive terminal editor

pub mod automaton;
pub mod cli;
pub mod config;
pub mod error;
pub mod render;
pub mod tui;

pub use config::Config;
pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging to stderr with the given log level
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging to a file, for when the terminal belongs to the TUI
pub fn init_file_logging(level: &str, path: &std::path::Path) -> Result<()> {
    use std::sync::Mutex;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "dfa-state-editor");
    }
}
