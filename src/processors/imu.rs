//! IMU capture loading for the orientation visualizations.
//!
//! Two input layouts are supported:
//! - accelerometer and gyroscope captures merged by nearest timestamp into
//!   [`ImuSample`] rows (cube animation)
//! - three single-axis gyroscope captures named in the configuration
//!   (roll/pitch/yaw plot)

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::{ImuAnglesConfig, ImuConfig};
use crate::core::loaders::{self, CsvTable, LoaderError};
use crate::core::transforms::{self, TransformError};
use super::discovery::ImuPair;
use super::orientation::{self, EulerAngleSeries};

/// Errors that can occur while loading IMU captures.
#[derive(Debug, Error)]
pub enum ImuError {
    #[error("File not found: {0}")]
    MissingFile(PathBuf),

    #[error(
        "{accel} and {gyro} do not have enough columns for Time, AccX, AccY, AccZ, GyroX, GyroY, GyroZ \
         (need {required}, found {found})"
    )]
    InsufficientColumns {
        accel: PathBuf,
        gyro: PathBuf,
        required: usize,
        found: usize,
    },

    #[error("gyroscope channels differ in length: x={x}, y={y}, z={z}")]
    ChannelLengthMismatch { x: usize, y: usize, z: usize },

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Result type for IMU operations.
pub type Result<T> = std::result::Result<T, ImuError>;

/// Time, AccX, AccY, AccZ, GyroX, GyroY, GyroZ.
pub const MERGED_COLUMNS: usize = 7;

/// Time plus three axes.
const CAPTURE_COLUMNS: usize = 4;

/// One merged accelerometer + gyroscope row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    pub time: f64,
    /// Acceleration [x, y, z].
    pub accel: [f64; 3],
    /// Angular rate [x, y, z] in degrees/second.
    pub gyro: [f64; 3],
}

impl ImuSample {
    /// Read a sample from the first seven columns of a merged row.
    pub fn from_row(row: &[f64]) -> Option<Self> {
        if row.len() < MERGED_COLUMNS {
            return None;
        }
        Some(Self {
            time: row[0],
            accel: [row[1], row[2], row[3]],
            gyro: [row[4], row[5], row[6]],
        })
    }
}

/// A merged pair ready for integration.
#[derive(Debug, Clone)]
pub struct ImuRecording {
    pub pair: ImuPair,
    pub samples: Vec<ImuSample>,
    /// Time step in seconds.
    pub dt: f64,
}

impl ImuRecording {
    /// Angular rates in degrees/second, one per sample.
    pub fn gyro_rates(&self) -> Vec<[f64; 3]> {
        self.samples.iter().map(|s| s.gyro).collect()
    }

    /// File names used in titles and summaries.
    pub fn label(&self) -> (String, String) {
        (file_name(&self.pair.accel), file_name(&self.pair.gyro))
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Time step from timestamps, or `fallback` when they cannot provide one.
pub fn resolve_dt(times: Option<&[f64]>, fallback: f64) -> f64 {
    match times.and_then(transforms::mean_time_step) {
        Some(dt) => dt,
        None => {
            warn!("Timestamps unavailable, using fixed time step {} s", fallback);
            fallback
        }
    }
}

/// Convert a merged table into samples, checking the column count.
pub fn samples_from_merged(merged: &CsvTable, pair: &ImuPair, min_columns: usize) -> Result<Vec<ImuSample>> {
    let required = min_columns.max(MERGED_COLUMNS);
    if merged.num_columns() < required {
        return Err(ImuError::InsufficientColumns {
            accel: pair.accel.clone(),
            gyro: pair.gyro.clone(),
            required,
            found: merged.num_columns(),
        });
    }

    Ok(merged
        .rows
        .iter()
        .filter_map(|row| ImuSample::from_row(row))
        .collect())
}

/// Load, merge and validate one accelerometer/gyroscope pair.
///
/// Only the time and axis columns are read; trailing columns may hold text.
pub fn load_recording(pair: &ImuPair, config: &ImuConfig) -> Result<ImuRecording> {
    let gyro_columns = config.min_columns.max(MERGED_COLUMNS) - (CAPTURE_COLUMNS - 1);
    let accel = loaders::load_leading_columns(&pair.accel, CAPTURE_COLUMNS)?;
    let gyro = loaders::load_leading_columns(&pair.gyro, gyro_columns)?;
    debug!(
        "{}: {} accel rows, {} gyro rows",
        pair.key,
        accel.num_rows(),
        gyro.num_rows()
    );

    let merged = transforms::merge_nearest(&accel, &gyro)?;
    let samples = samples_from_merged(&merged, pair, config.min_columns)?;

    let times: Vec<f64> = samples.iter().map(|s| s.time).collect();
    let dt = resolve_dt(Some(&times), config.fallback_dt);
    info!("{}: {} merged samples, dt = {:.6} s", pair.key, samples.len(), dt);

    Ok(ImuRecording {
        pair: pair.clone(),
        samples,
        dt,
    })
}

/// Load every pair, skipping pairs whose merged data lacks the IMU columns.
///
/// Returns the recordings in pair order and the number of skipped pairs. Any
/// other error aborts.
pub fn load_recordings(pairs: &[ImuPair], config: &ImuConfig) -> Result<(Vec<ImuRecording>, usize)> {
    let mut recordings = Vec::with_capacity(pairs.len());
    let mut skipped = 0;

    for pair in pairs {
        match load_recording(pair, config) {
            Ok(recording) => recordings.push(recording),
            Err(e @ ImuError::InsufficientColumns { .. }) => {
                warn!("Skipping {}: {}", pair.key, e);
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok((recordings, skipped))
}

/// Angular rates of the three configured gyroscope channels.
#[derive(Debug, Clone)]
pub struct GyroChannels {
    /// Rates in degrees/second, [x, y, z] per sample.
    pub rates: Vec<[f64; 3]>,
    pub dt: f64,
    pub sources: [PathBuf; 3],
}

/// Load the channel files named in `config` from `directory`.
///
/// # Errors
///
/// Returns `MissingFile` for the first channel file that does not exist, and
/// `ChannelLengthMismatch` when the channels differ in sample count.
pub fn load_gyro_channels(directory: &Path, config: &ImuAnglesConfig) -> Result<GyroChannels> {
    let paths = config.channels.ordered().map(|(_, name)| directory.join(name));
    if let Some(missing) = paths.iter().find(|path| !path.exists()) {
        return Err(ImuError::MissingFile(missing.clone()));
    }

    let x = loaders::load_channel_series(&paths[0], config.value_column)?;
    let y = loaders::load_channel_series(&paths[1], config.value_column)?;
    let z = loaders::load_channel_series(&paths[2], config.value_column)?;

    if x.len() != y.len() || x.len() != z.len() {
        return Err(ImuError::ChannelLengthMismatch {
            x: x.len(),
            y: y.len(),
            z: z.len(),
        });
    }

    let dt = match config.dt {
        Some(dt) => dt,
        None => {
            let times = x.has_timestamps().then_some(x.time.as_slice());
            resolve_dt(times, config.fallback_dt)
        }
    };

    let rates = (0..x.len())
        .map(|i| [x.values[i], y.values[i], z.values[i]])
        .collect();

    Ok(GyroChannels {
        rates,
        dt,
        sources: paths,
    })
}

/// Load the configured channels and integrate them to roll/pitch/yaw.
pub fn compute_angles(directory: &Path, config: &ImuAnglesConfig) -> Result<(EulerAngleSeries, f64)> {
    let channels = load_gyro_channels(directory, config)?;
    info!(
        "Integrating {} gyroscope samples with dt = {:.6} s",
        channels.rates.len(),
        channels.dt
    );
    let angles = orientation::integrate_euler_angles(&channels.rates, channels.dt);
    Ok((angles, channels.dt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelFiles;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_lines(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn write_channel(dir: &Path, name: &str, values: &[f64]) -> PathBuf {
        let mut lines = vec!["time,rate".to_string()];
        lines.extend(values.iter().enumerate().map(|(i, v)| format!("{},{}", i as f64 * 0.02, v)));
        write_lines(dir, name, &lines)
    }

    fn pair(dir: &Path) -> ImuPair {
        ImuPair {
            key: "imu".to_string(),
            accel: dir.join("imu_acc.csv"),
            gyro: dir.join("imu_gyro.csv"),
        }
    }

    #[test]
    fn test_load_recording_merges_pair() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_lines(dir, "imu_acc.csv", &[
            "time,ax,ay,az".to_string(),
            "0.00,0,0,9.8".to_string(),
            "0.01,0,0,9.8".to_string(),
            "0.02,0,0,9.8".to_string(),
        ]);
        write_lines(dir, "imu_gyro.csv", &[
            "time,gx,gy,gz".to_string(),
            "0.001,1,2,3".to_string(),
            "0.011,4,5,6".to_string(),
            "0.021,7,8,9".to_string(),
        ]);

        let recording = load_recording(&pair(dir), &ImuConfig::default()).unwrap();
        assert_eq!(recording.samples.len(), 3);
        assert_eq!(recording.samples[1].gyro, [4.0, 5.0, 6.0]);
        assert_eq!(recording.samples[2].accel, [0.0, 0.0, 9.8]);
        assert!((recording.dt - 0.01).abs() < 1e-12);
        assert_eq!(recording.gyro_rates().len(), 3);
    }

    #[test]
    fn test_load_recording_insufficient_columns() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_lines(dir, "imu_acc.csv", &["time,ax".to_string(), "0,1".to_string()]);
        write_lines(dir, "imu_gyro.csv", &["time,gx,gy".to_string(), "0,1,2".to_string()]);

        let err = load_recording(&pair(dir), &ImuConfig::default()).unwrap_err();
        assert!(matches!(err, ImuError::InsufficientColumns { required: 7, found: 4, .. }));
    }

    #[test]
    fn test_load_recording_ignores_trailing_text() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_lines(dir, "imu_acc.csv", &[
            "time,ax,ay,az,status".to_string(),
            "0.00,0,0,9.8,ok".to_string(),
            "0.01,0,0,9.8,ok".to_string(),
        ]);
        write_lines(dir, "imu_gyro.csv", &[
            "time,gx,gy,gz,status".to_string(),
            "0.00,1,2,3,ok".to_string(),
            "0.01,4,5,6,saturated".to_string(),
        ]);

        let recording = load_recording(&pair(dir), &ImuConfig::default()).unwrap();
        assert_eq!(recording.samples.len(), 2);
        assert_eq!(recording.samples[1].gyro, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_load_recordings_skips_narrow_pair() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_lines(dir, "imu_a_acc.csv", &["time,ax".to_string(), "0,1".to_string()]);
        write_lines(dir, "imu_a_gyro.csv", &["time,gx".to_string(), "0,1".to_string()]);
        write_lines(dir, "imu_b_acc.csv", &["time,ax,ay,az".to_string(), "0,0,0,1".to_string()]);
        write_lines(dir, "imu_b_gyro.csv", &["time,gx,gy,gz".to_string(), "0,7,8,9".to_string()]);

        let pairs = ["a", "b"].map(|run| ImuPair {
            key: format!("imu_{}", run),
            accel: dir.join(format!("imu_{}_acc.csv", run)),
            gyro: dir.join(format!("imu_{}_gyro.csv", run)),
        });

        let (recordings, skipped) = load_recordings(&pairs, &ImuConfig::default()).unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(recordings.len(), 1);
        assert_eq!(recordings[0].pair.key, "imu_b");
        assert_eq!(recordings[0].samples[0].gyro, [7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_load_recordings_propagates_other_errors() {
        let temp_dir = TempDir::new().unwrap();
        let pairs = [pair(temp_dir.path())];

        let err = load_recordings(&pairs, &ImuConfig::default()).unwrap_err();
        assert!(matches!(err, ImuError::Loader(_)));
    }

    #[test]
    fn test_resolve_dt_fallback() {
        assert_eq!(resolve_dt(None, 0.01), 0.01);
        assert_eq!(resolve_dt(Some(&[1.0]), 0.05), 0.05);
        assert!((resolve_dt(Some(&[0.0, 0.5, 1.0]), 0.01) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_compute_angles_zero_rates() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in ["gyro_x.csv", "gyro_y.csv", "gyro_z.csv"] {
            write_channel(dir, name, &[0.0, 0.0, 0.0, 0.0]);
        }

        let config = ImuAnglesConfig {
            dt: Some(0.01),
            ..ImuAnglesConfig::default()
        };
        let (angles, dt) = compute_angles(dir, &config).unwrap();
        assert_eq!(dt, 0.01);
        assert_eq!(angles.len(), 4);
        assert!(angles.axes().iter().all(|axis| axis.iter().all(|&a| a == 0.0)));
    }

    #[test]
    fn test_load_gyro_channels_uses_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_channel(dir, "gyro_x.csv", &[1.0, 2.0, 3.0]);
        write_channel(dir, "gyro_y.csv", &[4.0, 5.0, 6.0]);
        write_channel(dir, "gyro_z.csv", &[7.0, 8.0, 9.0]);

        let channels = load_gyro_channels(dir, &ImuAnglesConfig::default()).unwrap();
        assert!((channels.dt - 0.02).abs() < 1e-12);
        assert_eq!(channels.rates[1], [2.0, 5.0, 8.0]);
    }

    #[test]
    fn test_load_gyro_channels_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_channel(dir, "gyro_x.csv", &[1.0]);
        write_channel(dir, "gyro_z.csv", &[1.0]);

        let err = load_gyro_channels(dir, &ImuAnglesConfig::default()).unwrap_err();
        assert!(matches!(err, ImuError::MissingFile(p) if p.ends_with("gyro_y.csv")));
    }

    #[test]
    fn test_load_gyro_channels_length_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_channel(dir, "roll.csv", &[1.0, 2.0]);
        write_channel(dir, "pitch.csv", &[1.0, 2.0]);
        write_channel(dir, "yaw.csv", &[1.0]);

        let config = ImuAnglesConfig {
            channels: ChannelFiles {
                x: "roll.csv".to_string(),
                y: "pitch.csv".to_string(),
                z: "yaw.csv".to_string(),
            },
            ..ImuAnglesConfig::default()
        };
        let err = load_gyro_channels(dir, &config).unwrap_err();
        assert!(matches!(err, ImuError::ChannelLengthMismatch { x: 2, y: 2, z: 1 }));
    }
}
