//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::automaton::{Automaton, Point};
use crate::render::{CellMetrics, Theme};
use crate::{Config, Result};
use std::sync::Arc;

/// Binary strings whose value is divisible by three: `q0` is the remainder 0
/// state, `q1` and `q2` the other remainders.
pub fn demo_automaton(theme: Theme) -> Result<Automaton> {
    let mut automaton = Automaton::new(theme, Arc::new(CellMetrics::default()));

    let q0 = automaton.add_state(Point::new(150.0, 300.0));
    let q1 = automaton.add_state(Point::new(400.0, 300.0));
    let q2 = automaton.add_state(Point::new(650.0, 300.0));

    for (from, to, symbol) in [
        (q0, q0, '0'),
        (q0, q1, '1'),
        (q1, q0, '1'),
        (q1, q2, '0'),
        (q2, q1, '0'),
        (q2, q2, '1'),
    ] {
        let index = automaton.connect(from, to)?;
        automaton.assign_symbol(from, index, symbol)?;
    }

    automaton.set_start(q0)?;
    automaton.state_mut(q0)?.set_accepting(true);
    Ok(automaton)
}

/// Edit command implementation
pub mod edit {
    use super::*;

    /// Execute the edit command
    pub fn execute(demo: bool, config: Config) -> Result<()> {
        let theme = config.theme()?;
        let automaton = if demo {
            tracing::info!("Opening the demo automaton");
            demo_automaton(theme)?
        } else {
            Automaton::new(theme, Arc::new(CellMetrics::default()))
        };

        crate::tui::run(automaton, config.editor)
    }
}

/// Demo command implementation
pub mod demo {
    use super::*;
    use crate::automaton::analyzer::analyze;
    use crate::cli::{OutputFormat, output};

    /// Execute the demo command
    pub fn execute(format: OutputFormat, config: Config) -> Result<()> {
        let automaton = demo_automaton(config.theme()?)?;
        let summary = automaton.summary();
        let report = analyze(&automaton);
        tracing::info!(
            "Demo automaton: {} states, {} transitions",
            summary.states,
            summary.transitions
        );

        let stdout = std::io::stdout();
        let mut w = stdout.lock();
        match format {
            OutputFormat::Json => output::output_json(&mut w, &summary, &report),
            OutputFormat::Table => output::output_table(&mut w, &summary, &report),
        }
    }
}

/// Config validation command implementation
pub mod config_validate {
    use super::*;
    use std::path::PathBuf;

    /// Execute the config-validate command
    pub fn execute(path: PathBuf) -> Result<()> {
        tracing::info!("Validating config file {:?}", path);
        let config = Config::from_file(&path)?;
        let theme = config.theme()?;

        let dims = theme.dimensions;
        crate::ensure!(
            dims.state_radius > 0.0,
            "dimensions.state_radius must be positive, got {}",
            dims.state_radius
        );
        crate::ensure!(
            dims.selection_radius < dims.state_radius && dims.accepting_radius < dims.state_radius,
            "selection and accepting rings must fit inside the state (radius {})",
            dims.state_radius
        );

        println!("✓ Config is valid: {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::analyzer::analyze;

    #[test]
    fn test_demo_automaton_is_complete() {
        let automaton = demo_automaton(Theme::default()).unwrap();
        assert_eq!(automaton.len(), 3);
        assert_eq!(automaton.transition_count(), 6);
        assert!(automaton.adjacency_drift().is_empty());

        let report = analyze(&automaton);
        assert!(report.is_complete());
        assert!(report.unreachable.is_empty());
        assert!(report.dead.is_empty());
    }

    #[test]
    fn test_demo_automaton_divides_by_three() {
        let automaton = demo_automaton(Theme::default()).unwrap();
        let start = automaton.start().unwrap();

        // Follow the symbol tables by hand for 110 (six) and 111 (seven)
        let run = |input: &str| {
            let mut current = start;
            for symbol in input.chars() {
                current = automaton
                    .state(current)
                    .and_then(|s| s.destination(symbol))
                    .unwrap();
            }
            automaton.state(current).unwrap().is_accepting()
        };
        assert!(run("110"));
        assert!(!run("111"));
        assert!(run(""));
    }
}
