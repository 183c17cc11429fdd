//! Terminal summaries rendered with `comfy-table`.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tabload_ingest::{InferredSchema, SourceFile};
use tabload_load::{LoadOutcome, RunReport};

/// Print the run summary to stdout and the failed table names to stderr.
pub fn print_summary(report: &RunReport) {
    println!("{}", summary_table(report));
    let failed = failed_tables(report);
    if !failed.is_empty() {
        eprintln!("Failed tables:");
        for table in failed {
            eprintln!("- {table}");
        }
    }
}

/// One row per discovered table plus a totals row.
pub fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Outcome"),
        header_cell("Rows"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);

    let outcomes = report.outcomes();
    let mut total_rows = 0usize;
    let mut failures = 0usize;
    for entry in &outcomes {
        total_rows += entry.rows;
        if entry.outcome.is_failure() {
            failures += 1;
        }
        table.add_row(vec![
            Cell::new(&entry.table)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            outcome_cell(entry.outcome),
            rows_cell(entry.outcome, entry.rows),
        ]);
    }
    let totals = if failures > 0 {
        Cell::new(format!("{} tables, {failures} failed", outcomes.len()))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(format!("{} tables", outcomes.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold)
    };
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        totals,
        Cell::new(total_rows).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Names of every table whose creation or insertion failed.
pub fn failed_tables(report: &RunReport) -> Vec<String> {
    report
        .outcomes()
        .into_iter()
        .filter(|entry| entry.outcome.is_failure())
        .map(|entry| entry.table)
        .collect()
}

/// Column listing for one inferred source file.
pub fn schema_table(file: &SourceFile, schema: &InferredSchema) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(&file.table_name),
        header_cell("Domain"),
        header_cell("SQL type"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
    for column in schema.iter() {
        table.add_row(vec![
            Cell::new(&column.name),
            Cell::new(column.domain),
            Cell::new(column.sql_type.as_sql()).fg(Color::Green),
        ]);
    }
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn outcome_cell(outcome: LoadOutcome) -> Cell {
    let cell = Cell::new(outcome.label());
    match outcome {
        LoadOutcome::Loaded => cell.fg(Color::Green),
        LoadOutcome::Created => cell.fg(Color::Cyan),
        LoadOutcome::SkippedAlreadyLoaded => cell.fg(Color::Yellow),
        LoadOutcome::CreationFailed | LoadOutcome::InsertionFailed => {
            cell.fg(Color::Red).add_attribute(Attribute::Bold)
        }
    }
}

fn rows_cell(outcome: LoadOutcome, rows: usize) -> Cell {
    match outcome {
        LoadOutcome::Loaded => Cell::new(rows),
        _ => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
