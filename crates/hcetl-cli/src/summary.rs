use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use hcetl_core::RunReport;
use hcetl_model::Diagnostics;

use hcetl_cli::commands::NormalizeOutcome;

pub fn print_run_summary(report: &RunReport) {
    println!("Source: {}", report.source);
    println!(
        "Rows: {} read, {} normalized, {} facts",
        report.rows_read, report.rows_normalized, report.fact_rows
    );
    if report.load.is_none() {
        println!("Dry run: nothing was loaded");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Kind"),
        header_cell("Rows"),
        header_cell("Loaded"),
        header_cell("Attempts"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    let loaded = |name: &str| {
        report.load.as_ref().and_then(|load| {
            load.tables
                .iter()
                .find(|t| t.table.rsplit('.').next() == Some(name))
        })
    };
    for dimension in &report.dimensions {
        let load = loaded(&dimension.table);
        table.add_row(vec![
            Cell::new(&dimension.table)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&dimension.dimension),
            Cell::new(dimension.rows),
            optional_cell(load.map(|l| l.rows)),
            optional_cell(load.map(|l| l.attempts)),
        ]);
    }
    let fact_load = report
        .load
        .as_ref()
        .and_then(|load| load.tables.last());
    table.add_row(vec![
        Cell::new("facts")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new("admissions"),
        Cell::new(report.fact_rows).add_attribute(Attribute::Bold),
        optional_cell(fact_load.map(|l| l.rows)),
        optional_cell(fact_load.map(|l| l.attempts)),
    ]);
    println!("{table}");

    if !report.field_issues.is_empty() || !report.unmatched.is_empty() {
        let mut issues = Table::new();
        issues.set_header(vec![
            header_cell("Issue"),
            header_cell("Where"),
            header_cell("Count"),
        ]);
        apply_summary_table_style(&mut issues);
        align_column(&mut issues, 2, CellAlignment::Right);
        for (column, count) in &report.field_issues {
            issues.add_row(vec![
                Cell::new("nulled field").fg(Color::Yellow),
                Cell::new(column),
                count_cell(*count, Color::Yellow),
            ]);
        }
        for (dimension, count) in &report.unmatched {
            issues.add_row(vec![
                Cell::new("unresolved key").fg(Color::Red),
                Cell::new(dimension),
                count_cell(*count, Color::Red),
            ]);
        }
        println!();
        println!("Issues:");
        println!("{issues}");
    }

    let timings: Vec<String> = report
        .stages
        .iter()
        .map(|s| format!("{} {}ms", s.stage, s.duration_ms))
        .collect();
    println!("Stages: {}", timings.join(", "));
}

pub fn print_normalize_summary(outcome: &NormalizeOutcome, show_issues: usize) {
    println!("Source: {}", outcome.source);
    println!(
        "Rows: {} read, {} normalized",
        outcome.rows_read,
        outcome.dataset.len()
    );
    if let Some(path) = &outcome.output {
        println!("Output: {}", path.display());
    }
    print_diagnostics(&outcome.dataset.diagnostics, show_issues);
}

fn print_diagnostics(diagnostics: &Diagnostics, show_issues: usize) {
    if diagnostics.is_empty() {
        println!("No field-level issues");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Column"), header_cell("Nulled fields")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (column, count) in diagnostics.by_column() {
        table.add_row(vec![Cell::new(column), count_cell(*count, Color::Yellow)]);
    }
    println!("{table}");

    if show_issues == 0 {
        return;
    }
    let mut issues = Table::new();
    issues.set_header(vec![
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Reason"),
    ]);
    apply_summary_table_style(&mut issues);
    align_column(&mut issues, 0, CellAlignment::Right);
    for issue in diagnostics.issues().iter().take(show_issues) {
        issues.add_row(vec![
            // One-based, counting the header line as row 1.
            Cell::new(issue.row + 2),
            Cell::new(issue.column),
            Cell::new(issue.reason),
        ]);
    }
    println!("{issues}");
    let hidden = diagnostics.total().saturating_sub(show_issues);
    if hidden > 0 {
        println!("... and {hidden} more");
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn optional_cell<T: ToString>(value: Option<T>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
