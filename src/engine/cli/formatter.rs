//! CLI Output Formatting Module
//! Provides consistent, colorized output for terminal UX

use colored::Colorize;

pub struct CliFormatter;

impl CliFormatter {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message);
    }

    /// Print a section header
    pub fn header(title: &str) {
        println!("\n{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(title.chars().count()).bright_black());
    }

    /// Print a key-value pair
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", key.bright_white().bold(), value);
    }

    /// Print a list item
    pub fn item(text: &str) {
        println!("  {} {}", "•".bright_black(), text);
    }

    /// Print a table header, padding each column to its width
    pub fn table_header(columns: &[(&str, usize)]) {
        let cells: Vec<String> = columns.iter().map(|(c, w)| pad(c, *w)).collect();
        let width = cells.iter().map(|c| c.chars().count()).sum::<usize>() + 3 * cells.len().saturating_sub(1);
        let header = cells
            .iter()
            .map(|c| c.bright_white().bold().to_string())
            .collect::<Vec<_>>()
            .join(" │ ");
        println!("  {}", header);
        println!("  {}", "─".repeat(width).bright_black());
    }

    /// Print a table row, padding each cell to its column width
    pub fn table_row(values: &[(&str, usize)]) {
        let row = values
            .iter()
            .map(|(v, w)| pad(v, *w))
            .collect::<Vec<_>>()
            .join(" │ ");
        println!("  {}", row);
    }

    /// Print a grid row of granted/denied cells after a label column
    pub fn grant_row(label: &str, label_width: usize, cells: &[(bool, usize)]) {
        let mut row = vec![pad(label, label_width)];
        for (granted, width) in cells {
            let symbol = pad(grant_symbol(*granted), *width);
            row.push(if *granted {
                symbol.green().to_string()
            } else {
                symbol.bright_black().to_string()
            });
        }
        println!("  {}", row.join(" │ "));
    }

    /// Print an empty line
    pub fn blank() {
        println!();
    }
}

/// Cell symbol for a permission
pub fn grant_symbol(granted: bool) -> &'static str {
    if granted {
        "✓"
    } else {
        "·"
    }
}

/// Left-align text in a column of `width` characters
pub fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}
