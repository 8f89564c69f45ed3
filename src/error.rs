//! Error types for the automaton model, its config and the editor.

use crate::automaton::StateId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A transition index that no longer (or never) referred to a transition
    #[error("Invalid transition index {index} (state has {len} transitions)")]
    InvalidTransitionIndex { index: usize, len: usize },

    /// No state with this id in the automaton
    #[error("State {0} not found")]
    StateNotFound(StateId),

    /// No transition between the two states
    #[error("No transition from state {from} to state {to}")]
    TransitionNotFound { from: StateId, to: StateId },

    /// A second arrow for a (from, to) pair that already has one
    #[error("Transition from state {from} to state {to} already exists")]
    DuplicateTransition { from: StateId, to: StateId },

    /// The transition already carries this symbol
    #[error("Transition already carries symbol '{0}'")]
    DuplicateSymbol(char),

    /// Another transition of the same state already routes this symbol
    #[error("Symbol '{symbol}' already leads to state {existing}")]
    SymbolConflict { symbol: char, existing: StateId },

    /// Terminal setup, drawing or input failed
    #[error("Terminal error: {0}")]
    Tui(String),

    /// Unreadable or invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Config file could not be parsed
    #[error("Configuration parse error in {file:?}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    #[error("{0}")]
    Custom(String),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a terminal backend error; usable directly in `map_err`
    pub fn tui(err: impl std::fmt::Display) -> Self {
        Self::Tui(err.to_string())
    }

    /// Whether the error only means "the thing you pointed at is gone".
    /// The editor treats these as harmless: retrying or ignoring is fine.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::InvalidTransitionIndex { .. }
                | Error::StateNotFound(_)
                | Error::TransitionNotFound { .. }
        )
    }
}

/// Create a custom error with formatting
#[macro_export]
macro_rules! custom_error {
    ($($arg:tt)*) => {
        $crate::error::Error::Custom(format!($($arg)*))
    };
}

/// Bail with a custom error message
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::custom_error!($($arg)*))
    };
}

/// Ensure a condition is true or return error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(Error::custom("boom").to_string(), "boom");

        let err = Error::SymbolConflict {
            symbol: 'a',
            existing: 3,
        };
        assert_eq!(err.to_string(), "Symbol 'a' already leads to state 3");
    }

    #[test]
    fn test_tui_wraps_display() {
        let err = Error::tui(std::io::Error::other("no tty"));
        assert_eq!(err.to_string(), "Terminal error: no tty");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(Error::InvalidTransitionIndex { index: 4, len: 1 }.is_not_found());
        assert!(Error::StateNotFound(7).is_not_found());
        assert!(!Error::DuplicateSymbol('x').is_not_found());
    }

    #[test]
    fn test_ensure_macro() {
        fn check(value: usize) -> Result<usize> {
            crate::ensure!(value < 3, "value {} too large", value);
            Ok(value)
        }

        assert_eq!(check(1).unwrap(), 1);
        assert_eq!(check(5).unwrap_err().to_string(), "value 5 too large");
    }
}
