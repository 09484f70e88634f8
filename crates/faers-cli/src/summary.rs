//! Human-readable run summaries.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use faers_analysis::insights::SpikeSummary;
use faers_etl::diagnostics::LossSeverity;

use crate::types::BuildResult;

pub fn print_build_summary(result: &BuildResult) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        header_cell("Quarter"),
        header_cell("Demo rows"),
        header_cell("Events"),
        header_cell("Loss %"),
        header_cell("Severity"),
    ]);
    for idx in 1..=3 {
        align_column(&mut table, idx, CellAlignment::Right);
    }

    let mut total_demo = 0usize;
    let mut total_events = 0usize;
    for row in &result.quarters {
        if row.skipped {
            table.add_row(vec![
                Cell::new(&row.name),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("skipped"),
            ]);
            continue;
        }
        total_demo += row.demo_rows;
        total_events += row.events;
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(row.demo_rows),
            Cell::new(row.events),
            Cell::new(format!("{:.1}", row.loss_percent)),
            severity_cell(row.severity),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        Cell::new(total_demo).add_attribute(Attribute::Bold),
        Cell::new(total_events).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");

    if result.cross_quarter_duplicates > 0 {
        println!(
            "Cross-quarter duplicates removed: {}",
            result.cross_quarter_duplicates
        );
    }
    let stats = &result.stats;
    println!("Total events: {}", stats.total_events);
    match (stats.date_min, stats.date_max) {
        (Some(min), Some(max)) => println!("Date range: {min} to {max}"),
        _ => println!("Date range: no valid dates"),
    }
    println!("Unique drugs: {}", stats.unique_drugs);
    println!("Unique reactions: {}", stats.unique_reactions);
    println!(
        "Serious events: {} ({:.1}%)",
        stats.serious_events,
        stats.serious_percent()
    );

    if let Some(outputs) = &result.outputs {
        println!("Events: {}", outputs.events_parquet.display());
        println!("Monthly counts: {}", outputs.monthly_counts.display());
        println!("Monthly by reaction: {}", outputs.monthly_by_reaction.display());
        println!("Monthly by drug: {}", outputs.monthly_by_drug.display());
    }
    for error in &result.errors {
        println!("error: {error}");
    }
}

pub fn print_spike_summary(summary: &SpikeSummary) {
    if let Some(drug) = &summary.drug {
        println!("Drug: {drug}");
    }
    if let Some(reaction) = &summary.reaction {
        println!("Reaction: {reaction}");
    }
    println!("Method: {}", summary.method);
    println!("Months analyzed: {}", summary.n_months);

    if summary.top_spikes.is_empty() {
        println!("No spikes detected.");
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            header_cell("Rank"),
            header_cell("Month"),
            header_cell("Count"),
            header_cell("Z-score"),
        ]);
        for idx in [0usize, 2, 3] {
            align_column(&mut table, idx, CellAlignment::Right);
        }
        for spike in &summary.top_spikes {
            table.add_row(vec![
                Cell::new(spike.rank),
                Cell::new(&spike.date),
                Cell::new(spike.value),
                Cell::new(format!("{:.2}", spike.z)),
            ]);
        }
        println!("{table}");
    }
    println!("Note: {}", summary.note);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn dim_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Dim)
}

fn severity_cell(severity: Option<LossSeverity>) -> Cell {
    match severity {
        Some(LossSeverity::High) => Cell::new("HIGH").fg(Color::Red),
        Some(LossSeverity::Moderate) => Cell::new("MODERATE").fg(Color::Yellow),
        Some(LossSeverity::Minor) => Cell::new("MINOR"),
        Some(LossSeverity::Perfect) => Cell::new("PERFECT").fg(Color::Green),
        None => dim_cell("-"),
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
