//! Solar panel power estimation from paired voltage and current captures.

use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::config::SolarConfig;
use crate::core::loaders::{self, LoaderError};
use crate::core::transforms::{self, TransformError};
use super::discovery::{self, DiscoveryError, MeasurementKey, MeasurementPair};

/// Errors that can occur while estimating power.
#[derive(Debug, Error)]
pub enum SolarError {
    #[error("File not found: {0}")]
    MissingFile(PathBuf),

    #[error(
        "{voltage} has {voltage_rows} rows but {current} has {current_rows}: \
         paired captures must have the same number of rows"
    )]
    RowCountMismatch {
        voltage: PathBuf,
        current: PathBuf,
        voltage_rows: usize,
        current_rows: usize,
    },

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Result type for solar operations.
pub type Result<T> = std::result::Result<T, SolarError>;

/// Instantaneous and cumulative power for one measurement key.
#[derive(Debug, Clone)]
pub struct PowerSeries {
    pub key: MeasurementKey,
    pub power: Vec<f64>,
    pub cumulative: Vec<f64>,
}

impl PowerSeries {
    /// Build a series from instantaneous power samples.
    pub fn from_power(key: MeasurementKey, power: Vec<f64>) -> Self {
        let cumulative = transforms::cumulative_sum(&power);
        Self {
            key,
            power,
            cumulative,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.power.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    /// Energy-like total over all samples (last cumulative value).
    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }
}

/// Compute `voltage[i] * current[i]` from two captures.
///
/// Only `column` is read from each capture.
///
/// # Errors
///
/// - `MissingFile` if either capture does not exist
/// - `RowCountMismatch` if the captures differ in row count
pub fn calculate_power(voltage_path: &Path, current_path: &Path, column: usize) -> Result<Vec<f64>> {
    for path in [voltage_path, current_path] {
        if !path.exists() {
            return Err(SolarError::MissingFile(path.to_path_buf()));
        }
    }

    let voltage = loaders::load_value_column(voltage_path, column)?;
    let current = loaders::load_value_column(current_path, column)?;

    if voltage.len() != current.len() {
        return Err(SolarError::RowCountMismatch {
            voltage: voltage_path.to_path_buf(),
            current: current_path.to_path_buf(),
            voltage_rows: voltage.len(),
            current_rows: current.len(),
        });
    }

    Ok(transforms::elementwise_product(&voltage, &current)?)
}

/// Power series for every complete pair.
///
/// A pair whose capture is missing is skipped with a warning. A row-count
/// mismatch aborts the whole estimation.
pub fn estimate_pairs(pairs: &[MeasurementPair], config: &SolarConfig) -> Result<Vec<PowerSeries>> {
    let mut series = Vec::with_capacity(pairs.len());

    for pair in pairs {
        match calculate_power(&pair.voltage, &pair.current, config.value_column) {
            Ok(power) => {
                let estimate = PowerSeries::from_power(pair.key.clone(), power);
                info!(
                    "{}: {} samples, cumulative power {:.3}",
                    pair.key,
                    estimate.len(),
                    estimate.total()
                );
                series.push(estimate);
            }
            Err(SolarError::MissingFile(path)) => {
                warn!("File not found: {}, skipping {}", path.display(), pair.key);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(series)
}

/// Discover, pair and estimate every capture in `directory`.
pub fn estimate_directory(directory: &Path, config: &SolarConfig) -> Result<Vec<PowerSeries>> {
    let groups = discovery::group_measurement_files(directory, config)?;
    let pairs = discovery::complete_pairs(groups);
    info!("{} complete voltage/current pairs in {}", pairs.len(), directory.display());
    estimate_pairs(&pairs, config)
}
