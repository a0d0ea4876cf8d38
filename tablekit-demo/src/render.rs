//! Plain-text table rendering.
//!
//! Draws a [`Table`] as lines of text: a header with the sort indicator, a
//! rule, then one line per row with a selection box and row number. Icon
//! columns draw a colored dot instead of their text.

use std::collections::BTreeSet;

use crossterm::style::{self, Stylize};
use tablekit::{Alignment, Color, ControlState, ItemAction, SortState, Table};

use crate::text::{display_width, fit};

const MARKER: &str = "●";

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Emit ANSI colors for icon columns.
    pub color: bool,
}

fn selection_indicator(selected: bool) -> &'static str {
    if selected { "■" } else { "□" }
}

fn sort_indicator(sort: SortState, column: usize) -> &'static str {
    match sort.column {
        Some(active) if active == column && sort.ascending => " ▲",
        Some(active) if active == column => " ▼",
        _ => "",
    }
}

fn marker(color: Color, width: usize, options: RenderOptions) -> String {
    let Some(rgb) = color.to_rgb() else {
        return " ".repeat(width);
    };
    let padded = fit(MARKER, width, Alignment::Center);
    if !options.color {
        return padded;
    }
    let dot = MARKER.with(style::Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    });
    padded.replacen(MARKER, &dot.to_string(), 1)
}

/// Render the table to lines. Row numbers are 1-based.
pub fn render_table<T: Clone + 'static>(table: &Table<T>, options: RenderOptions) -> Vec<String> {
    let columns = table.columns();
    let sort = table.sort_state();
    let selected: BTreeSet<usize> = table.selected_indices().into_iter().collect();
    let number_width = table.len().max(1).to_string().len();

    let mut lines = Vec::new();

    let mut header = format!("  {} ", " ".repeat(number_width));
    for (i, column) in columns.iter().enumerate() {
        let label = format!("{}{}", column.label(), sort_indicator(sort, i));
        header.push_str(&fit(&label, column.width() as usize, column.alignment()));
        header.push(' ');
    }
    let header = header.trim_end().to_string();
    lines.push(header.clone());
    lines.push("─".repeat(display_width(&header)));

    table.with_data(|rows| {
        for (index, record) in rows.iter().enumerate() {
            let mut line = format!(
                "{} {:>number_width$} ",
                selection_indicator(selected.contains(&index)),
                index + 1
            );
            for column in &columns {
                let width = column.width() as usize;
                let cell = match column.color_for(record) {
                    Some(color) => marker(color, width, options),
                    None => fit(&column.string_value_for(record), width, column.alignment()),
                };
                line.push_str(&cell);
                line.push(' ');
            }
            lines.push(line.trim_end().to_string());
        }
    });

    if table.is_empty() {
        lines.push("  (no rows)".to_string());
    }
    lines
}

/// One-line summary of the controls; disabled ones are bracketed.
pub fn render_controls<T>(controls: &ControlState, actions: &[ItemAction<T>]) -> String {
    fn control(label: &str, enabled: bool) -> String {
        if enabled {
            label.to_string()
        } else {
            format!("[{label}]")
        }
    }

    let mut parts = vec![
        control("add", controls.add),
        control("edit", controls.edit),
        control("delete", controls.delete),
    ];
    for (i, action) in actions.iter().enumerate() {
        let label = match action.icon_name() {
            Some(icon) => format!("{}:{} ({icon})", i + 1, action.label()),
            None => format!("{}:{}", i + 1, action.label()),
        };
        parts.push(control(&label, controls.custom.get(i).copied().unwrap_or(false)));
    }
    parts.join("  ")
}
