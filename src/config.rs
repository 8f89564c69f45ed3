//! Editor configuration
//!
//! A TOML file picked by `--config` / `DFA_EDITOR_CONFIG`, else the first of
//! the default locations that exists. Every key is optional.

use crate::automaton::Dimensions;
use crate::error::{Error, Result};
use crate::render::{Palette, Theme};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub dimensions: Dimensions,

    #[serde(default)]
    pub palette: PaletteConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Editor canvas settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Width of the drawing area in model units
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,

    /// Height of the drawing area in model units
    #[serde(default = "default_canvas_height")]
    pub canvas_height: f64,

    /// Distance a state or the cursor moves per arrow key press
    #[serde(default = "default_move_step")]
    pub move_step: f64,
}

/// Colour names, parsed with ratatui's `Color::from_str`
/// (`"white"`, `"lightblue"`, `"#ff8800"`, `"42"`, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default = "default_state_fill")]
    pub state_fill: String,

    #[serde(default = "default_accepted_fill")]
    pub accepted_fill: String,

    #[serde(default = "default_declined_fill")]
    pub declined_fill: String,

    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default = "default_selection_ring")]
    pub selection_ring: String,

    #[serde(default = "default_accepting_ring")]
    pub accepting_ring: String,

    #[serde(default = "default_start_arrow")]
    pub start_arrow: String,

    #[serde(default = "default_transition")]
    pub transition: String,

    #[serde(default = "default_transition_highlight")]
    pub transition_highlight: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path; the TUI logs here instead of the terminal
    pub file: Option<PathBuf>,
}

// Default value functions

fn default_canvas_width() -> f64 {
    800.0
}

fn default_canvas_height() -> f64 {
    600.0
}

fn default_move_step() -> f64 {
    20.0
}

fn default_state_fill() -> String {
    "white".to_string()
}

fn default_accepted_fill() -> String {
    "green".to_string()
}

fn default_declined_fill() -> String {
    "red".to_string()
}

fn default_label() -> String {
    "black".to_string()
}

fn default_selection_ring() -> String {
    "red".to_string()
}

fn default_accepting_ring() -> String {
    "black".to_string()
}

fn default_start_arrow() -> String {
    "white".to_string()
}

fn default_transition() -> String {
    "white".to_string()
}

fn default_transition_highlight() -> String {
    "yellow".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            move_step: default_move_step(),
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            state_fill: default_state_fill(),
            accepted_fill: default_accepted_fill(),
            declined_fill: default_declined_fill(),
            label: default_label(),
            selection_ring: default_selection_ring(),
            accepting_ring: default_accepting_ring(),
            start_arrow: default_start_arrow(),
            transition: default_transition(),
            transition_highlight: default_transition_highlight(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn parse_color(field: &str, value: &str) -> Result<Color> {
    Color::from_str(value)
        .map_err(|_| Error::config(format!("Invalid colour {:?} for palette.{}", value, field)))
}

impl PaletteConfig {
    /// Resolve every colour name
    pub fn resolve(&self) -> Result<Palette> {
        Ok(Palette {
            state_fill: parse_color("state_fill", &self.state_fill)?,
            accepted_fill: parse_color("accepted_fill", &self.accepted_fill)?,
            declined_fill: parse_color("declined_fill", &self.declined_fill)?,
            label: parse_color("label", &self.label)?,
            selection_ring: parse_color("selection_ring", &self.selection_ring)?,
            accepting_ring: parse_color("accepting_ring", &self.accepting_ring)?,
            start_arrow: parse_color("start_arrow", &self.start_arrow)?,
            transition: parse_color("transition", &self.transition)?,
            transition_highlight: parse_color("transition_highlight", &self.transition_highlight)?,
        })
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents).map_err(|e| Error::ConfigParse {
            file: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./dfa-editor.toml
    /// 2. ~/.dfa-editor/config.toml
    /// 3. /etc/dfa-editor/config.toml
    pub fn load() -> Result<Self> {
        let paths = vec![
            PathBuf::from("dfa-editor.toml"),
            dirs::home_dir()
                .map(|h| h.join(".dfa-editor").join("config.toml"))
                .unwrap_or_else(|| PathBuf::from("/dev/null")),
            PathBuf::from("/etc/dfa-editor/config.toml"),
        ];

        for path in paths {
            if path.exists() {
                tracing::info!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Sizes and colours for a new automaton
    pub fn theme(&self) -> Result<Theme> {
        Ok(Theme {
            dimensions: self.dimensions,
            palette: self.palette.resolve()?,
        })
    }

    /// Log file with fallback to the default location
    pub fn log_file(&self) -> PathBuf {
        self.logging.file.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".dfa-editor").join("editor.log"))
                .unwrap_or_else(|| PathBuf::from("/tmp/dfa-editor.log"))
        })
    }
}
