use colored::Colorize;
use std::io::Write;

use crate::classify::BatchReport;

use super::summary::{print_batch_stats, print_header, print_summary_pills};
use super::tables::{print_flagged_events, print_signature_overview, print_skipped};

/// Print the full human-readable report.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
pub fn print_report(writer: &mut impl Write, report: &BatchReport) -> std::io::Result<()> {
    print_header(writer)?;
    print_summary_pills(writer, report)?;
    print_batch_stats(writer, report)?;

    print_diagnostics(writer, report)?;

    if report.aggregate.flagged() == 0 && report.skipped.is_empty() {
        writeln!(writer, "{}", "✓ All acquire events cleanly paired.".green())?;
        return Ok(());
    }

    print_signature_overview(writer, &report.signatures)?;
    for sig in &report.signatures {
        print_flagged_events(writer, sig)?;
    }
    print_skipped(writer, &report.skipped)?;
    Ok(())
}

fn print_diagnostics(writer: &mut impl Write, report: &BatchReport) -> std::io::Result<()> {
    for sig in &report.signatures {
        for note in &sig.diagnostics {
            writeln!(writer, "{} {}: {}", "note:".yellow(), sig.signature, note)?;
        }
    }
    Ok(())
}

/// Print the report as one pretty-printed JSON document.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn print_json(writer: &mut impl Write, report: &BatchReport) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report).map_err(std::io::Error::other)?;
    writeln!(writer)?;
    Ok(())
}
