//! Numeric transforms shared by the pipelines.
//!
//! This module provides the unit conversions, the elementwise power and
//! cumulative-sum transforms, time-step estimation, and the nearest-timestamp
//! merge of two time-sorted captures.

use nalgebra::Vector3;
use thiserror::Error;

use super::loaders::CsvTable;

/// Errors raised by transforms on malformed input.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("length mismatch: left has {left} samples, right has {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("{name}: timestamps are not sorted (row {row})")]
    UnsortedTimes { name: String, row: usize },
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[inline]
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

#[inline]
pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Convert a 3-axis angular rate from degrees/s to radians/s.
pub fn rate_to_rad(rate_deg: [f64; 3]) -> Vector3<f64> {
    Vector3::new(
        deg_to_rad(rate_deg[0]),
        deg_to_rad(rate_deg[1]),
        deg_to_rad(rate_deg[2]),
    )
}

/// Multiply two equal-length sequences elementwise.
///
/// # Example
///
/// ```ignore
/// let power = elementwise_product(&[1.0, 2.0], &[5.0, 4.0])?;
/// assert_eq!(power, vec![5.0, 8.0]);
/// ```
pub fn elementwise_product(left: &[f64], right: &[f64]) -> Result<Vec<f64>> {
    if left.len() != right.len() {
        return Err(TransformError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(left.iter().zip(right).map(|(a, b)| a * b).collect())
}

/// Running sum: element `k` is the sum of `values[0..=k]`.
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, &v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Mean of successive timestamp differences.
///
/// Returns `None` with fewer than two samples, or when the timestamps do not
/// yield a positive finite step (non-numeric or constant time column).
pub fn mean_time_step(times: &[f64]) -> Option<f64> {
    if times.len() < 2 {
        return None;
    }
    let total: f64 = times.windows(2).map(|w| w[1] - w[0]).sum();
    let dt = total / (times.len() - 1) as f64;
    if dt.is_finite() && dt > 0.0 {
        Some(dt)
    } else {
        None
    }
}

fn check_sorted(name: &str, times: &[f64]) -> Result<()> {
    for (i, w) in times.windows(2).enumerate() {
        if w[0].is_nan() || w[1].is_nan() || w[1] < w[0] {
            return Err(TransformError::UnsortedTimes {
                name: name.to_string(),
                row: i + 2,
            });
        }
    }
    Ok(())
}

/// Index of the entry in sorted `times` closest to `target`.
/// Ties resolve to the earlier entry.
fn nearest_index(times: &[f64], target: f64) -> usize {
    let upper = times.partition_point(|&t| t < target);
    if upper == 0 {
        return 0;
    }
    if upper == times.len() {
        return times.len() - 1;
    }
    let before = upper - 1;
    if (target - times[before]) <= (times[upper] - target) {
        before
    } else {
        upper
    }
}

/// Join each row of `left` with the row of `right` whose time (column 0) is
/// nearest.
///
/// The merged table keeps every `left` column followed by every `right`
/// column except its time column, and has one row per `left` row.
///
/// # Errors
///
/// Returns `UnsortedTimes` if either table is not sorted by time.
pub fn merge_nearest(left: &CsvTable, right: &CsvTable) -> Result<CsvTable> {
    let left_times = left.times();
    let right_times = right.times();
    check_sorted(&left.display_name(), &left_times)?;
    check_sorted(&right.display_name(), &right_times)?;

    let mut headers = left.headers.clone();
    headers.extend(right.headers.iter().skip(1).cloned());

    let rows = if right.is_empty() {
        Vec::new()
    } else {
        left.rows
            .iter()
            .zip(&left_times)
            .map(|(left_row, &t)| {
                let matched = &right.rows[nearest_index(&right_times, t)];
                let mut row = left_row.clone();
                row.extend(matched.iter().skip(1));
                row
            })
            .collect()
    };

    Ok(CsvTable {
        headers,
        rows,
        source_path: left.source_path.clone(),
    })
}
