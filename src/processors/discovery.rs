//! Capture discovery and pairing by filename.
//!
//! Solar captures are grouped by the `(sign, axis)` tokens at the start of the
//! file name and split into voltage and current by a filename substring. IMU
//! captures are split into accelerometer and gyroscope lists and paired by a
//! shared key, never by their position in the directory listing.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;
use thiserror::Error;

use crate::config::{ImuConfig, SolarConfig};

/// Errors that can occur while scanning the data directory.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("No input files found in directory: {0}")]
    NoInputFiles(PathBuf),

    #[error("No accelerometer or gyroscope files found in directory: {0}")]
    NoImuFiles(PathBuf),
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

fn lowercase_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// List every regular file in `directory`, sorted by path.
pub fn list_files(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(DiscoveryError::DirectoryNotFound(directory.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(directory)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    files.sort();
    Ok(files)
}

/// List the `.csv` files in `directory`, sorted by path.
pub fn list_csv_files(directory: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_files(directory)?
        .into_iter()
        .filter(|path| is_csv(path))
        .collect())
}

/// Grouping key of a solar capture: the sign and axis filename tokens.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeasurementKey {
    pub sign: String,
    pub axis: String,
}

impl fmt::Display for MeasurementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.sign, self.axis)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementKind {
    Voltage,
    Current,
}

/// Voltage and current paths collected for one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementPaths {
    pub voltage: Option<PathBuf>,
    pub current: Option<PathBuf>,
}

/// A key with both captures present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementPair {
    pub key: MeasurementKey,
    pub voltage: PathBuf,
    pub current: PathBuf,
}

/// `<sign>_<axis>` at the start of a file stem.
fn key_pattern() -> &'static Regex {
    static KEY_PATTERN: OnceLock<Regex> = OnceLock::new();
    KEY_PATTERN.get_or_init(|| Regex::new(r"^([^_]+)_([^_]+)").unwrap())
}

/// Extract the `(sign, axis)` key from a file name like `plus_x_volt.csv`.
///
/// Returns `None` when the stem has fewer than two `_`-separated tokens.
pub fn parse_measurement_key(file_name: &str) -> Option<MeasurementKey> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let captures = key_pattern().captures(stem)?;
    Some(MeasurementKey {
        sign: captures.get(1)?.as_str().to_string(),
        axis: captures.get(2)?.as_str().to_string(),
    })
}

/// Classify a file name as voltage or current by its configured substrings.
pub fn measurement_kind(file_name: &str, config: &SolarConfig) -> Option<MeasurementKind> {
    let lower = file_name.to_lowercase();
    if lower.contains(&config.voltage_token.to_lowercase()) {
        Some(MeasurementKind::Voltage)
    } else if lower.contains(&config.current_token.to_lowercase()) {
        Some(MeasurementKind::Current)
    } else {
        None
    }
}

/// Group the CSV captures of `directory` by measurement key.
///
/// Files without a key are skipped with a warning. A later file of the same
/// key and kind replaces an earlier one.
pub fn group_measurement_files(
    directory: &Path,
    config: &SolarConfig,
) -> Result<BTreeMap<MeasurementKey, MeasurementPaths>> {
    let mut groups: BTreeMap<MeasurementKey, MeasurementPaths> = BTreeMap::new();

    for path in list_csv_files(directory)? {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let key = match parse_measurement_key(&file_name) {
            Some(key) => key,
            None => {
                warn!("Skipping {}: expected <sign>_<axis>_... file name", file_name);
                continue;
            }
        };

        let entry = groups.entry(key).or_default();
        match measurement_kind(&file_name, config) {
            Some(MeasurementKind::Voltage) => entry.voltage = Some(path),
            Some(MeasurementKind::Current) => entry.current = Some(path),
            None => debug!("{}: neither voltage nor current capture", file_name),
        }
    }

    Ok(groups)
}

/// Keep the groups holding both a voltage and a current capture.
///
/// Incomplete groups are dropped with a warning.
pub fn complete_pairs(groups: BTreeMap<MeasurementKey, MeasurementPaths>) -> Vec<MeasurementPair> {
    let mut pairs = Vec::with_capacity(groups.len());

    for (key, paths) in groups {
        match (paths.voltage, paths.current) {
            (Some(voltage), Some(current)) => pairs.push(MeasurementPair {
                key,
                voltage,
                current,
            }),
            (voltage, _) => {
                let missing = if voltage.is_none() { "voltage" } else { "current" };
                warn!("Dropping {}: no {} capture", key, missing);
            }
        }
    }

    pairs
}

/// Accelerometer and gyroscope captures found in the data directory.
#[derive(Debug, Clone, Default)]
pub struct ImuFiles {
    pub accel: Vec<PathBuf>,
    pub gyro: Vec<PathBuf>,
}

/// One accelerometer capture matched to one gyroscope capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImuPair {
    pub key: String,
    pub accel: PathBuf,
    pub gyro: PathBuf,
}

/// Find IMU captures and split them into accelerometer and gyroscope lists.
///
/// # Errors
///
/// Returns `NoImuFiles` if either list is empty.
pub fn find_imu_files(directory: &Path, config: &ImuConfig) -> Result<ImuFiles> {
    let imu_token = config.file_token.to_lowercase();
    let accel_token = config.accel_token.to_lowercase();
    let gyro_token = config.gyro_token.to_lowercase();

    let mut files = ImuFiles::default();
    for path in list_files(directory)? {
        let name = lowercase_name(&path);
        if !name.contains(&imu_token) {
            continue;
        }
        if name.contains(&accel_token) {
            files.accel.push(path.clone());
        }
        if name.contains(&gyro_token) {
            files.gyro.push(path);
        }
    }

    if files.accel.is_empty() || files.gyro.is_empty() {
        return Err(DiscoveryError::NoImuFiles(directory.to_path_buf()));
    }

    Ok(files)
}

/// Pairing key of an IMU capture: the lowercase stem without the
/// accelerometer and gyroscope tokens.
///
/// `imu_acc_run1.csv` and `IMU-gyro-run1.csv` share the key `imu_run1`.
pub fn imu_pair_key(path: &Path, config: &ImuConfig) -> String {
    let accel_token = config.accel_token.to_lowercase();
    let gyro_token = config.gyro_token.to_lowercase();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    stem.split(|c: char| c == '_' || c == '-' || c == ' ' || c == '.')
        .filter(|token| !token.is_empty())
        .filter(|token| !token.contains(&accel_token) && !token.contains(&gyro_token))
        .collect::<Vec<_>>()
        .join("_")
}

/// Pair accelerometer and gyroscope captures that share a key.
///
/// Captures without a partner, and duplicates of an already used key, are
/// reported with a warning and left out.
pub fn pair_imu_files(files: &ImuFiles, config: &ImuConfig) -> Vec<ImuPair> {
    let mut gyro_by_key: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in &files.gyro {
        let key = imu_pair_key(path, config);
        if gyro_by_key.contains_key(&key) {
            warn!("Ignoring {}: another gyroscope capture has key '{}'", path.display(), key);
            continue;
        }
        gyro_by_key.insert(key, path.clone());
    }

    let mut pairs = Vec::with_capacity(files.accel.len());
    for accel in &files.accel {
        let key = imu_pair_key(accel, config);
        match gyro_by_key.remove(&key) {
            Some(gyro) => pairs.push(ImuPair {
                key,
                accel: accel.clone(),
                gyro,
            }),
            None => warn!("No gyroscope capture matches {} (key '{}')", accel.display(), key),
        }
    }

    for (key, gyro) in gyro_by_key {
        warn!("No accelerometer capture matches {} (key '{}')", gyro.display(), key);
    }

    pairs
}
