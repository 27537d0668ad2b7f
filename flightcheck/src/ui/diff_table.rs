// flightcheck/src/ui/diff_table.rs
//! Table rendering of a parameter diff.
//!
//! Rows are sorted by parameter name. Each row shows the status, the name and the
//! reference and current values, so a change reads left to right as old then new.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use std::io::{self, Write};

use flightcheck_core::DiffResult;

use crate::ui::output_format::paint;
use crate::ui::theme::{color_for, ThemeEntry, ThemeMap};

const MISSING: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Added,
    Removed,
    Changed,
}

impl RowKind {
    fn label(self) -> &'static str {
        match self {
            RowKind::Added => "added",
            RowKind::Removed => "removed",
            RowKind::Changed => "changed",
        }
    }

    fn theme_entry(self) -> ThemeEntry {
        match self {
            RowKind::Added => ThemeEntry::DiffAdded,
            RowKind::Removed => ThemeEntry::DiffRemoved,
            RowKind::Changed => ThemeEntry::DiffChanged,
        }
    }
}

struct Row<'a> {
    kind: RowKind,
    name: &'a str,
    reference: &'a str,
    current: &'a str,
}

fn collect_rows(diff: &DiffResult) -> Vec<Row<'_>> {
    let mut rows: Vec<Row<'_>> = diff
        .changed
        .iter()
        .map(|(name, (reference, current))| Row {
            kind: RowKind::Changed,
            name,
            reference,
            current,
        })
        .chain(diff.added.iter().map(|(name, current)| Row {
            kind: RowKind::Added,
            name,
            reference: MISSING,
            current,
        }))
        .chain(diff.removed.iter().map(|(name, reference)| Row {
            kind: RowKind::Removed,
            name,
            reference,
            current: MISSING,
        }))
        .collect();
    rows.sort_by(|a, b| a.name.cmp(b.name));
    rows
}

fn styled(text: &str, entry: ThemeEntry, theme: &ThemeMap, supports_color: bool) -> Cell {
    let cell = Cell::new(text);
    match color_for(theme, entry) {
        Some(color) if supports_color => cell.fg(color.to_table_color()),
        _ => cell,
    }
}

/// Builds the diff table.
pub fn build_diff_table(diff: &DiffResult, theme: &ThemeMap, supports_color: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    if !supports_color {
        table.force_no_tty();
    }

    table.set_header(
        ["Status", "Parameter", "Reference", "Current"]
            .into_iter()
            .map(|h| styled(h, ThemeEntry::Header, theme, supports_color).add_attribute(Attribute::Bold)),
    );

    for row in collect_rows(diff) {
        let entry = row.kind.theme_entry();
        table.add_row(vec![
            styled(row.kind.label(), entry, theme, supports_color),
            styled(row.name, ThemeEntry::ParamName, theme, supports_color),
            Cell::new(row.reference),
            styled(row.current, entry, theme, supports_color),
        ]);
    }
    table
}

/// One-line summary, e.g. `3 difference(s): 1 changed, 1 added, 1 removed.`
pub fn summary_line(diff: &DiffResult) -> String {
    if diff.is_empty() {
        return "No differences found.".to_string();
    }
    format!(
        "{} difference(s): {} changed, {} added, {} removed.",
        diff.total(),
        diff.changed.len(),
        diff.added.len(),
        diff.removed.len()
    )
}

/// Prints the table (if there is anything to show) followed by the summary line.
pub fn print_diff(
    diff: &DiffResult,
    writer: &mut dyn Write,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    if !diff.is_empty() {
        writeln!(writer, "{}", build_diff_table(diff, theme, supports_color))?;
    }
    let entry = if diff.is_empty() { ThemeEntry::Success } else { ThemeEntry::Warn };
    writeln!(writer, "{}", paint(&summary_line(diff), entry, theme, supports_color))
}
