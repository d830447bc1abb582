//! SVG line chart of cancellation probability over a span.

use acr_data::ProbabilityChart;
use anyhow::{anyhow, bail, Context, Result};
use plotters::prelude::*;
use std::path::Path;

pub const CHART_SIZE: (u32, u32) = (1000, 500);

/// Render `chart` as an SVG document.
///
/// One marker per date with a forecast, labelled with its percentage.
/// The line is broken at dates without a forecast.
pub fn render_svg(chart: &ProbabilityChart, size: (u32, u32)) -> Result<String> {
    if chart.labels.is_empty() {
        bail!("nothing to plot: the span has no dates");
    }
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("failed to fill chart background: {e}"))?;

        let count = chart.labels.len();
        let x_points: Vec<f64> = (0..count).map(|i| i as f64).collect();
        let y_points: Vec<f64> = chart.y_ticks.iter().map(|&t| f64::from(t)).collect();
        let x_range = (-0.5..count as f64 - 0.5).with_key_points(x_points);
        let y_range = (0.0..f64::from(chart.y_max)).with_key_points(y_points);

        let mut plot = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24).into_font())
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| anyhow!("failed to build chart: {e}"))?;

        plot.configure_mesh()
            .x_desc("Date")
            .y_desc("Cancellation probability (%)")
            .x_label_formatter(&|x| {
                chart
                    .labels
                    .get(x.round() as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .y_label_formatter(&|y| format!("{y:.0}"))
            .draw()
            .map_err(|e| anyhow!("failed to draw chart mesh: {e}"))?;

        for run in segments(&chart.values) {
            plot.draw_series(LineSeries::new(run, &BLUE))
                .map_err(|e| anyhow!("failed to draw probability line: {e}"))?;
        }

        let points = chart
            .values
            .iter()
            .enumerate()
            .filter_map(|(i, value)| value.map(|v| (i as f64, v)));
        plot.draw_series(points.map(|(x, y)| {
            EmptyElement::at((x, y))
                + Circle::new((0, 0), 4, BLUE.filled())
                + Text::new(format!("{y:.1}%"), (-14, -20), ("sans-serif", 14).into_font())
        }))
        .map_err(|e| anyhow!("failed to draw probability markers: {e}"))?;

        root.present()
            .map_err(|e| anyhow!("failed to finish chart: {e}"))?;
    }
    Ok(svg)
}

/// Render `chart` and write it to `path`.
pub fn write_svg(chart: &ProbabilityChart, path: &Path) -> Result<()> {
    let svg = render_svg(chart, CHART_SIZE)?;
    std::fs::write(path, svg).with_context(|| format!("writing chart {}", path.display()))
}

/// Consecutive runs of present values as `(index, value)` points.
fn segments(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push((i as f64, *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(values: Vec<Option<f64>>) -> ProbabilityChart {
        let labels = (0..values.len()).map(|i| format!("1/{}", 28 + i)).collect();
        ProbabilityChart::new(labels, values)
    }

    #[test]
    fn test_segments_break_at_gaps() {
        let runs = segments(&[Some(1.0), Some(2.0), None, None, Some(5.0)]);
        assert_eq!(runs, vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(4.0, 5.0)]]);
        assert!(segments(&[None, None]).is_empty());
    }

    #[test]
    fn test_render_svg_draws_title_markers_and_labels() {
        let svg = render_svg(&chart(vec![Some(22.0), None, Some(35.0)]), (800, 400)).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Period: 1/28 ~ 1/30"));
        assert!(svg.contains("22.0%"));
        assert!(svg.contains("35.0%"));
        // no marker for the gap
        assert_eq!(svg.matches("<circle").count(), 2);
        // y-axis labelled through 40
        assert!(svg.contains(">40<"));
    }

    #[test]
    fn test_render_all_missing_span() {
        let svg = render_svg(&chart(vec![None, None, None]), (800, 400)).unwrap();
        assert_eq!(svg.matches("<circle").count(), 0);
        assert!(svg.contains(">20<"));
    }

    #[test]
    fn test_empty_chart_is_an_error() {
        assert!(render_svg(&chart(vec![]), (800, 400)).is_err());
    }

    #[test]
    fn test_write_svg_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probability.svg");
        write_svg(&chart(vec![Some(10.0)]), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("10.0%"));
    }
}
