//! `day` and `span` subcommands.

use crate::{plot, render};
use crate::session::{parse_target_date, Session};
use crate::SourceArgs;
use acr_data::{
    DailyAssessment, DayOutcome, ExceedanceEstimator, ProbabilityChart, SpanAggregator,
    SpanMatrix, SpanReport,
};
use acr_utils::dates::month_day_label;
use log::info;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct DayOutput<'a> {
    airport: &'a str,
    outcome: &'a DayOutcome,
    /// Historical view for a day without a forecast.
    #[serde(skip_serializing_if = "Option::is_none")]
    history_only: Option<&'a DailyAssessment>,
}

#[derive(Serialize)]
struct SpanOutput<'a> {
    airport: &'a str,
    days: &'a SpanReport,
    matrix: SpanMatrix,
    chart: ProbabilityChart,
}

/// Assess a single date and print the per-feature report and probability.
pub fn run_day(source: &SourceArgs, date: &str, json: bool) -> anyhow::Result<()> {
    let date = parse_target_date(date)?;
    let session = Session::open(source)?;
    let estimator = ExceedanceEstimator::from_config(&session.config, &session.store)?;
    let aggregator = SpanAggregator::new(&estimator, &session.forecaster);

    let outcome = aggregator.assess_day(date);
    let history_only = match &outcome {
        DayOutcome::Assessed { .. } => None,
        DayOutcome::Unavailable { .. } => Some(estimator.assess(date, None)?),
    };

    if json {
        let output = DayOutput {
            airport: &session.label,
            outcome: &outcome,
            history_only: history_only.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "\n=== {} forecast and cancellation thresholds ({}) ===",
        session.label,
        month_day_label(&date)
    );
    let assessment = match &outcome {
        DayOutcome::Assessed { assessment, report } => {
            print!("{}", render::feature_report_table(report));
            assessment
        }
        DayOutcome::Unavailable { reason, .. } => {
            println!("no forecast for {date}: {reason}");
            history_only
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("missing historical assessment for {date}"))?
        }
    };
    print_probability(assessment);
    Ok(())
}

fn print_probability(assessment: &DailyAssessment) {
    let label = month_day_label(&assessment.date);
    if !assessment.has_history() {
        println!("no historical records for {label}; probability shown as 0.0%");
    }
    println!(
        "cancellation probability for {}: {:.1}% ({} of {} recorded days)",
        label,
        assessment.probability(),
        assessment.historical.cancellation_days,
        assessment.historical.matching_days
    );
    if let Some(advisory) = assessment.advisory() {
        println!("{advisory}");
    }
}

/// Assess consecutive dates, print the span table and optionally write the
/// probability chart.
pub fn run_span(
    source: &SourceArgs,
    date: &str,
    days: Option<usize>,
    chart_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let start = parse_target_date(date)?;
    let session = Session::open(source)?;
    let span = days.unwrap_or(session.config.span_length);
    let estimator = ExceedanceEstimator::from_config(&session.config, &session.store)?;
    let aggregator = SpanAggregator::new(&estimator, &session.forecaster);

    let report = aggregator.run(start, span)?;
    let matrix = report.matrix();
    let chart = report.chart();
    info!(
        "{}: {} of {} days have a forecast",
        session.label,
        report.available_days(),
        report.days.len()
    );
    if let Some(path) = chart_path {
        plot::write_svg(&chart, path)?;
        info!("wrote probability chart to {}", path.display());
    }

    if json {
        let output = SpanOutput {
            airport: &session.label,
            days: &report,
            matrix,
            chart,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let labels = &matrix.column_labels;
    if let (Some(first), Some(last)) = (labels.first(), labels.last()) {
        println!("\n=== {} span table ({} ~ {}) ===", session.label, first, last);
    }
    print!("{}", render::span_matrix_table(&matrix));
    for day in &report.days {
        if let DayOutcome::Unavailable { date, reason } = day {
            println!("{}: {}", month_day_label(date), reason);
        }
    }
    if let Some(path) = chart_path {
        println!("{}: chart written to {}", chart.title, path.display());
    }
    Ok(())
}
