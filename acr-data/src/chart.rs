//! Chart-ready probability series and the y-axis scale rule.

use serde::Serialize;

/// The y-axis upper bound is always a multiple of this.
pub const Y_AXIS_STEP: u32 = 20;

/// Spacing of y-axis ticks.
pub const Y_TICK_STEP: u32 = 10;

/// Upper bound of the probability axis for `series`.
///
/// With `m` the largest non-null value: `m` itself when it is an exact
/// multiple of 20, otherwise the next multiple of 20 above it. Never
/// below 20, so an empty or all-null series gets 20.
pub fn y_axis_upper_bound(series: &[Option<f64>]) -> u32 {
    let max = series
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let step = f64::from(Y_AXIS_STEP);
    let bound = if max % step == 0.0 {
        max as u32
    } else {
        (max.floor() as u32 / Y_AXIS_STEP + 1) * Y_AXIS_STEP
    };
    bound.max(Y_AXIS_STEP)
}

/// Ticks from 0 through `upper` inclusive.
pub fn y_axis_ticks(upper: u32) -> Vec<u32> {
    (0..=upper).step_by(Y_TICK_STEP as usize).collect()
}

/// A line chart of cancellation probability over a span of dates.
///
/// `values[i]` is `None` for a date without a forecast; renderers should
/// leave a gap rather than plot zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityChart {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub y_max: u32,
    pub y_ticks: Vec<u32>,
}

impl ProbabilityChart {
    pub fn new(labels: Vec<String>, values: Vec<Option<f64>>) -> Self {
        let title = match (labels.first(), labels.last()) {
            (Some(first), Some(last)) => format!("Period: {first} ~ {last}"),
            _ => "Period: -".to_string(),
        };
        let y_max = y_axis_upper_bound(&values);
        ProbabilityChart {
            title,
            labels,
            values,
            y_max,
            y_ticks: y_axis_ticks(y_max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_upper_bound_examples() {
        assert_eq!(y_axis_upper_bound(&some(&[5.0, 12.0, 0.0])), 20);
        assert_eq!(y_axis_upper_bound(&some(&[22.0, 35.0])), 40);
        assert_eq!(y_axis_upper_bound(&some(&[40.0, 40.0])), 40);
        assert_eq!(y_axis_upper_bound(&some(&[45.0])), 60);
        assert_eq!(y_axis_upper_bound(&some(&[0.0])), 20);
        assert_eq!(y_axis_upper_bound(&some(&[100.0])), 100);
        assert_eq!(y_axis_upper_bound(&some(&[39.9])), 40);
        assert_eq!(y_axis_upper_bound(&some(&[40.1])), 60);
    }

    #[test]
    fn test_upper_bound_ignores_nulls() {
        assert_eq!(y_axis_upper_bound(&[]), 20);
        assert_eq!(y_axis_upper_bound(&[None, None]), 20);
        assert_eq!(y_axis_upper_bound(&[None, Some(61.5), None]), 80);
    }

    #[test]
    fn test_ticks() {
        assert_eq!(y_axis_ticks(20), vec![0, 10, 20]);
        assert_eq!(y_axis_ticks(60).len(), 7);
    }

    #[test]
    fn test_chart_title_and_scale() {
        let chart = ProbabilityChart::new(
            vec!["1/28".to_string(), "1/29".to_string(), "1/30".to_string()],
            vec![Some(22.0), None, Some(35.0)],
        );
        assert_eq!(chart.title, "Period: 1/28 ~ 1/30");
        assert_eq!(chart.y_max, 40);
        assert_eq!(chart.y_ticks, vec![0, 10, 20, 30, 40]);
    }
}
