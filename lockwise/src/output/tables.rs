use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use std::io::Write;

use crate::classify::{EventClass, SignatureReport, SkippedSignature};

fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);

    if cfg!(test) {
        table.set_width(120);
    }
    table
}

fn class_color(class: EventClass) -> Color {
    match class {
        EventClass::Paired => Color::Green,
        EventClass::PartiallyPaired => Color::Yellow,
        EventClass::Deadlock => Color::Red,
        EventClass::Unpaired => Color::Magenta,
    }
}

fn class_label(class: EventClass) -> &'static str {
    match class {
        EventClass::Paired => "PAIRED",
        EventClass::PartiallyPaired => "PARTIAL",
        EventClass::Deadlock => "DEADLOCK",
        EventClass::Unpaired => "UNPAIRED",
    }
}

/// Print the per-signature overview table.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_signature_overview(
    writer: &mut impl Write,
    signatures: &[SignatureReport],
) -> std::io::Result<()> {
    if signatures.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", "Signatures".bold().underline())?;
    let mut table = create_table(vec![
        "Signature",
        "Paired",
        "Partial",
        "Deadlock",
        "Unpaired",
        "Intra",
        "Inter",
    ]);

    for sig in signatures {
        table.add_row(vec![
            Cell::new(&sig.signature).add_attribute(Attribute::Bold),
            Cell::new(sig.counts.paired),
            Cell::new(sig.counts.partially_paired),
            Cell::new(sig.counts.deadlock),
            Cell::new(sig.counts.unpaired),
            Cell::new(sig.intraprocedural_pairs),
            Cell::new(sig.interprocedural_pairs),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the flagged events of one signature. Cleanly paired events are
/// omitted.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_flagged_events(
    writer: &mut impl Write,
    report: &SignatureReport,
) -> std::io::Result<()> {
    let flagged: Vec<_> = report
        .events
        .iter()
        .filter(|e| e.class != EventClass::Paired)
        .collect();
    if flagged.is_empty() {
        return Ok(());
    }

    writeln!(
        writer,
        "\n{}",
        format!("Flagged events for `{}`", report.signature)
            .bold()
            .underline()
    )?;
    let mut table = create_table(vec!["Function", "Acquire", "Location", "Matched", "Class"]);

    for event in flagged {
        table.add_row(vec![
            Cell::new(&event.function),
            Cell::new(&event.label).add_attribute(Attribute::Bold),
            Cell::new(&event.location),
            Cell::new(&event.matched),
            Cell::new(class_label(event.class)).fg(class_color(event.class)),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the skipped signatures with their reasons.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_skipped(
    writer: &mut impl Write,
    skipped: &[SkippedSignature],
) -> std::io::Result<()> {
    if skipped.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", "Skipped Signatures".bold().underline().yellow())?;
    let mut table = create_table(vec!["Signature", "Reason"]);

    for skip in skipped {
        table.add_row(vec![
            Cell::new(&skip.signature).add_attribute(Attribute::Bold),
            Cell::new(&skip.reason).fg(Color::Yellow),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}
