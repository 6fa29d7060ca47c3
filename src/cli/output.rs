/// Terminal output helpers shared by the commands
use crate::core::pipeline::BatchResult;
use colored::*;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};

pub fn section_header(title: &str) {
    println!("\n{}", title.bold().cyan());
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn info(message: &str) {
    println!("{} {}", "●".blue(), message);
}

pub fn tree_item(is_last: bool, label: &str, value: Option<&str>) {
    let prefix = if is_last { "└─" } else { "├─" };
    if let Some(val) = value {
        println!("{} {}: {}", prefix.dimmed(), label, val);
    } else {
        println!("{} {}", prefix.dimmed(), label);
    }
}

pub fn create_standard_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .add_attribute(Attribute::Bold)
        .fg(TableColor::Cyan)
}

pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Shorten long sequences for display, keeping both ends.
pub fn abbreviate_sequence(sequence: &str, max: usize) -> String {
    if sequence.len() <= max || max < 8 {
        return sequence.to_string();
    }
    let half = (max - 3) / 2;
    format!("{}...{}", &sequence[..half], &sequence[sequence.len() - half..])
}

/// One row per group: id, members, authors, length, sequence preview.
pub fn groups_table(result: &BatchResult) -> Table {
    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Fragments"),
        header_cell("Authors"),
        header_cell("Length"),
        header_cell("Sequence"),
    ]);

    for record in &result.records {
        table.add_row(vec![
            Cell::new(record.group_id).set_alignment(CellAlignment::Right),
            Cell::new(record.names.join(", ")),
            Cell::new(record.authors.join(", ")),
            Cell::new(format_number(record.len())).set_alignment(CellAlignment::Right),
            Cell::new(abbreviate_sequence(&record.sequence, 40)),
        ]);
    }

    table
}

pub fn print_summary(result: &BatchResult) {
    section_header("Grouping summary");
    tree_item(false, "Fragments", Some(format_number(result.fragment_count()).as_str()));
    tree_item(false, "Clusters", Some(format_number(result.clusters.len()).as_str()));
    tree_item(false, "Standalone", Some(format_number(result.standalone.len()).as_str()));
    tree_item(
        false,
        "Iterations",
        Some(
            format!(
                "{} ({})",
                result.iterations,
                if result.converged { "converged" } else { "not converged" }
            )
            .as_str(),
        ),
    );
    tree_item(true, "Groups", Some(format_number(result.group_count()).as_str()));

    if !result.records.is_empty() {
        println!("\n{}", groups_table(result));
    }
}
