//! Output formatting module
//!
//! This module handles formatting automaton summaries and analysis reports for
//! different output formats.

use crate::{
    Result,
    automaton::{AutomatonSummary, StateId, analyzer::AnalysisReport},
};
use serde_json::json;

/// Output the summary and analysis as JSON
pub fn output_json(
    w: &mut impl std::io::Write,
    summary: &AutomatonSummary,
    report: &AnalysisReport,
) -> Result<()> {
    let output = json!({
        "summary": summary,
        "analysis": {
            "complete": report.is_complete(),
            "has_cycles": report.has_cycles,
            "unreachable": report.unreachable,
            "dead": report.dead,
            "missing": report.missing,
        },
    });

    serde_json::to_writer_pretty(&mut *w, &output)?;
    writeln!(w)?; // Add trailing newline
    Ok(())
}

fn join_ids(ids: &[StateId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(|id| format!("q{}", id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Output the summary and analysis as a text table
pub fn output_table(
    w: &mut impl std::io::Write,
    summary: &AutomatonSummary,
    report: &AnalysisReport,
) -> Result<()> {
    writeln!(w, "DFA State Editor - Automaton Summary")?;
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w)?;

    writeln!(w, "Summary:")?;
    writeln!(w, "  States:       {}", summary.states)?;
    writeln!(w, "  Transitions:  {}", summary.transitions)?;
    writeln!(w, "  Alphabet:     {{{}}}", summary.alphabet)?;
    writeln!(
        w,
        "  Start:        {}",
        summary
            .start
            .map(|s| format!("q{}", s))
            .unwrap_or_else(|| "-".to_string())
    )?;
    writeln!(w, "  Accepting:    {}", join_ids(&summary.accepting))?;
    writeln!(w)?;

    if !summary.rows.is_empty() {
        writeln!(w, "Transitions:")?;
        writeln!(w, "{:-<60}", "")?;
        writeln!(w, "{:<8} {:<8} {:<40}", "From", "To", "Symbols")?;
        writeln!(w, "{:-<60}", "")?;
        for row in &summary.rows {
            let symbols = if row.symbols.is_empty() {
                "(unassigned)".to_string()
            } else {
                row.symbols.clone()
            };
            writeln!(
                w,
                "{:<8} {:<8} {:<40}",
                format!("q{}", row.from),
                format!("q{}", row.to),
                symbols
            )?;
        }
        writeln!(w)?;
    }

    writeln!(w, "Analysis:")?;
    writeln!(
        w,
        "  Complete:     {}",
        if report.is_complete() { "yes" } else { "no" }
    )?;
    writeln!(
        w,
        "  Cycles:       {}",
        if report.has_cycles { "yes" } else { "no" }
    )?;
    writeln!(w, "  Unreachable:  {}", join_ids(&report.unreachable))?;
    writeln!(w, "  Dead:         {}", join_ids(&report.dead))?;
    for missing in &report.missing {
        writeln!(w, "  q{} has no arrow for {{{}}}", missing.state, missing.symbols)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::analyzer::analyze;
    use crate::cli::commands::demo_automaton;
    use crate::render::Theme;

    #[test]
    fn test_output_json() {
        let automaton = demo_automaton(Theme::default()).unwrap();
        let mut buffer = Vec::new();
        output_json(&mut buffer, &automaton.summary(), &analyze(&automaton)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["summary"]["states"], 3);
        assert_eq!(value["summary"]["alphabet"], "01");
        assert_eq!(value["summary"]["start"], 0);
        assert_eq!(value["analysis"]["complete"], true);
        assert_eq!(value["analysis"]["has_cycles"], true);
    }

    #[test]
    fn test_output_table() {
        let automaton = demo_automaton(Theme::default()).unwrap();
        let mut buffer = Vec::new();
        output_table(&mut buffer, &automaton.summary(), &analyze(&automaton)).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Transitions:  6"));
        assert!(text.contains("Alphabet:     {01}"));
        assert!(text.contains("Start:        q0"));
        assert!(text.contains("Complete:     yes"));
    }
}
