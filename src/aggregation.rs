//! Series math behind the chart and the statistics panel.
//!
//! Every function takes a person's series ordered by date ascending and is
//! pure. Out-of-domain input yields `None` or an `AggregationError` value.

use crate::models::WeightPoint;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("moving average window must be at least 1, got {0}")]
    InvalidWindow(usize),
}

/// Trailing moving average. Near the start of the series the window shrinks
/// to the points available, so the output always matches the input length.
pub fn moving_average(
    series: &[WeightPoint],
    window: usize,
) -> Result<Vec<WeightPoint>, AggregationError> {
    if window == 0 {
        return Err(AggregationError::InvalidWindow(window));
    }

    let averaged = series
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let start = (index + 1).saturating_sub(window);
            let slice = &series[start..=index];
            let sum: f64 = slice.iter().map(|p| p.weight).sum();
            WeightPoint::new(point.date, sum / slice.len() as f64)
        })
        .collect();

    Ok(averaged)
}

/// Mean of the last `min(window, len)` weights.
pub fn trailing_average(
    series: &[WeightPoint],
    window: usize,
) -> Result<Option<f64>, AggregationError> {
    if window == 0 {
        return Err(AggregationError::InvalidWindow(window));
    }
    if series.is_empty() {
        return Ok(None);
    }

    let start = series.len().saturating_sub(window);
    let slice = &series[start..];
    let sum: f64 = slice.iter().map(|p| p.weight).sum();
    Ok(Some(sum / slice.len() as f64))
}

pub fn latest(series: &[WeightPoint]) -> Option<f64> {
    series.last().map(|point| point.weight)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

impl Extremum {
    fn prefers(self, candidate: f64, current: f64) -> bool {
        let ordering = candidate.total_cmp(&current);
        match self {
            Extremum::Max => ordering == Ordering::Greater,
            Extremum::Min => ordering == Ordering::Less,
        }
    }
}

pub fn extremum(series: &[WeightPoint], which: Extremum) -> Option<WeightPoint> {
    let mut points = series.iter().copied();
    let first = points.next()?;
    Some(points.fold(first, |best, point| {
        if which.prefers(point.weight, best.weight) {
            point
        } else {
            best
        }
    }))
}

/// Returns the greatest point under `compare`; on ties the earliest point wins.
pub fn extremum_by<F>(series: &[WeightPoint], mut compare: F) -> Option<WeightPoint>
where
    F: FnMut(&WeightPoint, &WeightPoint) -> Ordering,
{
    let mut points = series.iter().copied();
    let first = points.next()?;
    Some(points.fold(first, |best, point| {
        if compare(&point, &best) == Ordering::Greater {
            point
        } else {
            best
        }
    }))
}

pub const AXIS_UPPER_LIMIT: f64 = 100.0;
pub const AXIS_MIN_SPAN: f64 = 2.0;
const AXIS_PADDING_RATIO: f64 = 0.05;

/// Y-axis bounds of the weight chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl AxisRange {
    pub const DEFAULT: AxisRange = AxisRange { min: 50.0, max: 80.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn stride(&self) -> f64 {
        axis_stride(self.min, self.max)
    }

    /// Applies a user request, keeping the current range when it is rejected.
    /// Returns whether the request took effect.
    pub fn apply(
        &mut self,
        requested_min: f64,
        requested_max: f64,
        data_min: Option<f64>,
        data_max: Option<f64>,
    ) -> bool {
        match normalize_axis_range(requested_min, requested_max, data_min, data_max) {
            Some(range) => {
                *self = range;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        *self = reset_axis_range();
    }
}

/// Validates a requested Y range and widens it so every data point sits at
/// least 5% of the requested span inside the bounds. `None` means the request
/// is rejected.
pub fn normalize_axis_range(
    requested_min: f64,
    requested_max: f64,
    data_min: Option<f64>,
    data_max: Option<f64>,
) -> Option<AxisRange> {
    let accepted = 0.0 <= requested_min
        && requested_max <= AXIS_UPPER_LIMIT
        && requested_min < requested_max
        && requested_max - requested_min >= AXIS_MIN_SPAN;
    if !accepted {
        return None;
    }

    let padding = (requested_max - requested_min) * AXIS_PADDING_RATIO;
    let min = match data_min {
        Some(low) => requested_min.min(low - padding),
        None => requested_min,
    };
    let max = match data_max {
        Some(high) => requested_max.max(high + padding),
        None => requested_max,
    };

    Some(AxisRange { min, max })
}

pub fn reset_axis_range() -> AxisRange {
    AxisRange::DEFAULT
}

/// Tick spacing for the Y axis.
pub fn axis_stride(range_min: f64, range_max: f64) -> f64 {
    let range = range_max - range_min;
    if range <= 5.0 {
        1.0
    } else if range <= 10.0 {
        2.0
    } else if range <= 20.0 {
        5.0
    } else {
        10.0
    }
}

/// Number of days the statistics panel averages over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AveragingWindow(u32);

impl AveragingWindow {
    pub const CHOICES: [u32; 8] = [3, 4, 5, 6, 7, 10, 14, 30];

    pub fn new(days: u32) -> Option<Self> {
        Self::CHOICES.contains(&days).then_some(Self(days))
    }

    pub fn days(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for AveragingWindow {
    fn default() -> Self {
        Self(7)
    }
}

impl TryFrom<u32> for AveragingWindow {
    type Error = String;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        Self::new(days).ok_or_else(|| format!("unsupported averaging window: {days} days"))
    }
}

impl From<AveragingWindow> for u32 {
    fn from(window: AveragingWindow) -> Self {
        window.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(weights: &[f64]) -> Vec<WeightPoint> {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        weights
            .iter()
            .enumerate()
            .map(|(offset, weight)| {
                WeightPoint::new(start + Duration::days(offset as i64), *weight)
            })
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn moving_average_keeps_length_and_dates() {
        let input = series(&[70.0, 71.0, 69.5, 72.0, 70.2]);
        let output = moving_average(&input, 3).unwrap();
        assert_eq!(output.len(), input.len());
        for (raw, averaged) in input.iter().zip(&output) {
            assert_eq!(raw.date, averaged.date);
        }
    }

    #[test]
    fn moving_average_window_shrinks_at_start() {
        let output = moving_average(&series(&[70.0, 72.0, 74.0, 76.0]), 3).unwrap();
        let values: Vec<f64> = output.iter().map(|p| p.weight).collect();
        assert_close(values[0], 70.0);
        assert_close(values[1], 71.0);
        assert_close(values[2], 72.0);
        assert_close(values[3], 74.0);
    }

    #[test]
    fn moving_average_window_one_is_identity() {
        let input = series(&[70.1, 68.3, 75.9, 71.7]);
        assert_eq!(moving_average(&input, 1).unwrap(), input);
    }

    #[test]
    fn moving_average_last_value_is_mean_of_tail() {
        let input = series(&[70.0, 68.0, 75.0, 71.0, 69.0]);
        for window in 1..=8 {
            let output = moving_average(&input, window).unwrap();
            let take = window.min(input.len());
            let tail = &input[input.len() - take..];
            let expected = tail.iter().map(|p| p.weight).sum::<f64>() / take as f64;
            assert_close(output.last().unwrap().weight, expected);
            assert_close(trailing_average(&input, window).unwrap().unwrap(), expected);
        }
    }

    #[test]
    fn moving_average_rejects_zero_window() {
        assert_eq!(
            moving_average(&series(&[70.0]), 0),
            Err(AggregationError::InvalidWindow(0))
        );
        assert_eq!(
            trailing_average(&[], 0),
            Err(AggregationError::InvalidWindow(0))
        );
    }

    #[test]
    fn empty_series_yields_no_data() {
        assert!(moving_average(&[], 7).unwrap().is_empty());
        assert_eq!(trailing_average(&[], 7), Ok(None));
        assert_eq!(latest(&[]), None);
        assert_eq!(extremum(&[], Extremum::Max), None);
        assert_eq!(extremum(&[], Extremum::Min), None);
    }

    #[test]
    fn latest_is_last_weight() {
        assert_eq!(latest(&series(&[70.0, 72.0])), Some(72.0));
    }

    #[test]
    fn extremum_finds_max_and_min() {
        let input = series(&[70.0, 68.0, 75.0, 71.0]);
        assert_eq!(extremum(&input, Extremum::Max).map(|p| p.weight), Some(75.0));
        assert_eq!(extremum(&input, Extremum::Min).map(|p| p.weight), Some(68.0));
    }

    #[test]
    fn extremum_ties_go_to_first_occurrence() {
        let input = series(&[72.0, 68.0, 72.0, 68.0]);
        assert_eq!(extremum(&input, Extremum::Max), Some(input[0]));
        assert_eq!(extremum(&input, Extremum::Min), Some(input[1]));

        let by_weight = extremum_by(&input, |a, b| a.weight.total_cmp(&b.weight));
        assert_eq!(by_weight, Some(input[0]));
    }

    #[test]
    fn normalize_keeps_request_when_data_is_inside_padding() {
        let range = normalize_axis_range(50.0, 80.0, Some(55.0), Some(78.0)).unwrap();
        assert_eq!(range, AxisRange::new(50.0, 80.0));
    }

    #[test]
    fn normalize_widens_around_data_near_edges() {
        let range = normalize_axis_range(50.0, 80.0, Some(50.5), Some(79.0)).unwrap();
        assert_close(range.min, 50.5 - 1.5);
        assert_close(range.max, 79.0 + 1.5);
    }

    #[test]
    fn normalize_without_data_uses_request() {
        let range = normalize_axis_range(60.0, 70.0, None, None).unwrap();
        assert_eq!(range, AxisRange::new(60.0, 70.0));
    }

    #[test]
    fn normalize_rejects_out_of_bounds_requests() {
        assert_eq!(normalize_axis_range(-1.0, 80.0, Some(55.0), Some(78.0)), None);
        assert_eq!(normalize_axis_range(50.0, 101.0, None, None), None);
        assert_eq!(normalize_axis_range(70.0, 60.0, None, None), None);
        assert_eq!(normalize_axis_range(60.0, 61.5, None, None), None);
        assert_eq!(normalize_axis_range(f64::NAN, 80.0, None, None), None);
    }

    #[test]
    fn rejected_apply_retains_previous_range() {
        let mut range = AxisRange::new(55.0, 75.0);
        assert!(!range.apply(-1.0, 80.0, Some(60.0), Some(70.0)));
        assert_eq!(range, AxisRange::new(55.0, 75.0));

        assert!(range.apply(60.0, 70.0, Some(62.0), Some(68.0)));
        assert_eq!(range, AxisRange::new(60.0, 70.0));

        range.reset();
        assert_eq!(range, AxisRange::new(50.0, 80.0));
    }

    #[test]
    fn axis_stride_steps() {
        assert_eq!(axis_stride(50.0, 54.0), 1.0);
        assert_eq!(axis_stride(50.0, 55.0), 1.0);
        assert_eq!(axis_stride(50.0, 58.0), 2.0);
        assert_eq!(axis_stride(50.0, 65.0), 5.0);
        assert_eq!(axis_stride(50.0, 90.0), 10.0);
    }

    #[test]
    fn averaging_window_accepts_only_fixed_choices() {
        assert_eq!(AveragingWindow::default().days(), 7);
        assert_eq!(AveragingWindow::new(14).map(AveragingWindow::days), Some(14));
        assert_eq!(AveragingWindow::new(8), None);
        assert_eq!(AveragingWindow::new(0), None);
    }
}
