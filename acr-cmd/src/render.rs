//! Plain-text rendering of reports as grid tables.

use acr_core::AcrConfig;
use acr_data::{FeatureReport, SpanMatrix};

const MISSING: &str = "-";

/// Format an optional number with fixed decimals, `-` for a gap.
pub fn format_value(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => MISSING.to_string(),
    }
}

/// Render a grid table with centred cells.
pub fn grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = |fill: char| {
        let mut line = String::from("+");
        for width in &widths {
            line.extend(std::iter::repeat(fill).take(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };
    let row_line = |cells: &[String]| {
        let mut line = String::from("|");
        for (index, &width) in widths.iter().enumerate() {
            let cell = cells.get(index).map(String::as_str).unwrap_or("");
            line.push_str(&format!(" {cell:^width$} |"));
        }
        line.push('\n');
        line
    };

    let mut out = border('-');
    out.push_str(&row_line(headers));
    out.push_str(&border('='));
    for row in rows {
        out.push_str(&row_line(row));
        out.push_str(&border('-'));
    }
    if rows.is_empty() {
        out.push_str(&border('-'));
    }
    out
}

pub fn feature_report_table(report: &FeatureReport) -> String {
    let headers = [
        "feature",
        "predicted",
        "threshold",
        "% of threshold",
        "historical exceedances",
    ]
    .map(String::from);
    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|row| {
            vec![
                row.feature.clone(),
                format!("{:.2}", row.display_predicted()),
                row.threshold.to_string(),
                format!("{:.1}", row.display_percent()),
                format!("{} / {}", row.historical_exceedances, report.historical_days),
            ]
        })
        .collect();
    grid(&headers, &rows)
}

/// The span matrix with dates as columns. The last row is the
/// probability row and is shown with one decimal.
pub fn span_matrix_table(matrix: &SpanMatrix) -> String {
    let mut headers = vec![String::new()];
    headers.extend(matrix.column_labels.iter().cloned());
    let last = matrix.rows.len().saturating_sub(1);
    let rows: Vec<Vec<String>> = matrix
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let decimals = if index == last { 1 } else { 2 };
            let mut cells = vec![row.label.clone()];
            cells.extend(row.values.iter().map(|v| format_value(*v, decimals)));
            cells
        })
        .collect();
    grid(&headers, &rows)
}

pub fn airports_table(config: &AcrConfig) -> String {
    let headers = ["code", "name", "history"].map(String::from);
    let rows: Vec<Vec<String>> = config
        .airports
        .iter()
        .map(|a| vec![a.code.clone(), a.name.clone(), a.history.clone()])
        .collect();
    grid(&headers, &rows)
}
