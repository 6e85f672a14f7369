use colored::Colorize;
use std::io::Write;

use crate::classify::BatchReport;

/// Print the main header with box-drawing characters.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        "╔════════════════════════════════════════╗".cyan()
    )?;
    writeln!(
        writer,
        "{}",
        "║  Lock Pairing Verification Results     ║".cyan().bold()
    )?;
    writeln!(
        writer,
        "{}",
        "╚════════════════════════════════════════╝".cyan()
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Print the aggregate classification counts as colored "pills".
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_pills(writer: &mut impl Write, report: &BatchReport) -> std::io::Result<()> {
    fn pill(label: &str, count: usize) -> String {
        if count == 0 {
            format!("{}: {}", label, count.to_string().green())
        } else {
            format!("{}: {}", label, count.to_string().red().bold())
        }
    }

    let counts = &report.aggregate;
    writeln!(
        writer,
        "{}  {}  {}  {}",
        format!("Paired: {}", counts.paired.to_string().green().bold()),
        pill("Partially Paired", counts.partially_paired),
        pill("Deadlock", counts.deadlock),
        pill("Unpaired", counts.unpaired),
    )?;

    if !report.skipped.is_empty() {
        writeln!(
            writer,
            "{}",
            format!("Skipped signatures: {}", report.skipped.len()).yellow()
        )?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Print batch statistics (signatures and events processed).
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_batch_stats(writer: &mut impl Write, report: &BatchReport) -> std::io::Result<()> {
    let pairs: usize = report
        .signatures
        .iter()
        .map(|s| s.intraprocedural_pairs + s.interprocedural_pairs)
        .sum();
    writeln!(
        writer,
        "{}",
        format!(
            "Verified {} signatures ({} acquire events, {} safe pairs)",
            report.signatures.len().to_string().bold(),
            report.aggregate.total.to_string().bold(),
            pairs.to_string().bold()
        )
        .dimmed()
    )?;
    writeln!(writer)?;
    Ok(())
}
