//! Terminal rendering using comfy-table.
//!
//! Layout mirrors the page: selection chips, workload line, then the
//! pivoted table with each ranked cell painted in its gradient color.

use std::io::{self, Write};

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::colorize::{CellStyle, Rgb};
use crate::logging::log_render;
use crate::pivot::{ChartBar, PivotTable};
use crate::record::{DatasetType, RunMetric};
use crate::shell::{Dashboard, Selection};

const CHART_WIDTH: usize = 40;

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.0,
        g: rgb.1,
        b: rgb.2,
    }
}

/// Every value cell is painted, ranked or not.
fn styled_cell(text: &str, style: &CellStyle) -> Cell {
    Cell::new(text)
        .set_alignment(CellAlignment::Right)
        .bg(color(style.background()))
        .fg(color(style.text_color()))
}

/// Build the table for one bucket. `ansi` forces colors even off a tty.
pub fn render_table(table: &PivotTable, ansi: bool) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    if ansi {
        out.enforce_styling();
    } else {
        out.force_no_tty();
    }

    let mut header = vec![Cell::new("#").add_attribute(Attribute::Bold), Cell::new("")];
    header.extend(
        table
            .columns
            .iter()
            .map(|c| Cell::new(&c.header).add_attribute(Attribute::Bold)),
    );
    out.set_header(header);

    for row in &table.rows {
        let mut cells = vec![
            Cell::new(row.id).set_alignment(CellAlignment::Right),
            Cell::new(&row.label).set_alignment(CellAlignment::Right),
        ];
        cells.extend(row.cells.iter().map(|c| styled_cell(c.display(), &c.style)));
        out.add_row(cells);
    }
    out
}

fn chip<T: PartialEq>(label: &str, value: T, selected: T) -> String {
    if value == selected {
        format!("[{}]", label)
    } else {
        format!(" {} ", label)
    }
}

fn selection_lines(selection: Selection) -> String {
    let types: Vec<String> = DatasetType::ALL
        .iter()
        .map(|t| chip(t.label(), *t, selection.dataset_type))
        .collect();
    let metrics: Vec<String> = RunMetric::ALL
        .iter()
        .map(|m| chip(m.label(), *m, selection.run_metric))
        .collect();
    format!("Type: {}\nMetric: {}", types.join(" "), metrics.join(" "))
}

/// Horizontal bar chart, scaled to the largest bar.
pub fn render_chart(title: &str, bars: &[ChartBar]) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    if bars.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let label_width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    let max = bars.iter().map(|b| b.value.abs()).fold(0.0, f64::max);
    for bar in bars {
        let len = if max > 0.0 {
            ((bar.value.abs() / max) * CHART_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "  {:<width$} │{:<bar_width$}│ {}\n",
            bar.label,
            "█".repeat(len.max(1)),
            bar.value,
            width = label_width,
            bar_width = CHART_WIDTH,
        ));
    }
    out
}

/// Print the current view: chips, workload, table or placeholder.
pub fn write_dashboard<W: Write>(out: &mut W, dashboard: &Dashboard, ansi: bool) -> io::Result<()> {
    writeln!(out, "{}", selection_lines(dashboard.selection()))?;
    writeln!(out, "The used benchmark workload: {}", dashboard.workload().name)?;

    match dashboard.visible() {
        Some(table) => {
            let rendered = render_table(table, ansi);
            log_render("terminal", &table.key.to_string(), table.rows.len(), table.columns.len());
            writeln!(out, "{}", rendered)?;
        }
        None => writeln!(out, "{}", dashboard.overlay_text())?,
    }
    Ok(())
}
