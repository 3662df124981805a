//! Configuration types for the lab plotting pipelines.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input and output locations shared by every pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the captured CSV files
    #[serde(default = "default_data_directory")]
    pub directory: PathBuf,

    /// Directory where rendered images are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_data_directory() -> PathBuf {
    PathBuf::from("../CSV_Files")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("plots")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: default_data_directory(),
            output_dir: default_output_dir(),
        }
    }
}

/// Configuration for the CSV grid plotter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of subplot columns
    #[serde(default = "default_grid_columns")]
    pub columns: usize,

    /// Column position used for the x axis
    #[serde(default = "default_x_column")]
    pub x_column: usize,

    /// Column position used for the y axis
    #[serde(default = "default_y_column")]
    pub y_column: usize,

    /// Pixel width of one grid cell
    #[serde(default = "default_grid_cell_width")]
    pub cell_width: u32,

    /// Pixel height of one grid cell
    #[serde(default = "default_grid_cell_height")]
    pub cell_height: u32,
}

fn default_grid_columns() -> usize {
    2
}

fn default_x_column() -> usize {
    1
}

fn default_y_column() -> usize {
    2
}

fn default_grid_cell_width() -> u32 {
    600
}

fn default_grid_cell_height() -> u32 {
    450
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: default_grid_columns(),
            x_column: default_x_column(),
            y_column: default_y_column(),
            cell_width: default_grid_cell_width(),
            cell_height: default_grid_cell_height(),
        }
    }
}

/// Configuration for the solar power estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarConfig {
    /// Column position holding the measured value in both voltage and current files
    #[serde(default = "default_solar_value_column")]
    pub value_column: usize,

    /// Rows of the fixed subplot grid
    #[serde(default = "default_solar_rows")]
    pub rows: usize,

    /// Columns of the fixed subplot grid
    #[serde(default = "default_solar_columns")]
    pub columns: usize,

    /// Filename substring marking a voltage capture
    #[serde(default = "default_voltage_token")]
    pub voltage_token: String,

    /// Filename substring marking a current capture
    #[serde(default = "default_current_token")]
    pub current_token: String,

    #[serde(default = "default_solar_width")]
    pub width: u32,

    #[serde(default = "default_solar_height")]
    pub height: u32,
}

fn default_solar_value_column() -> usize {
    2
}

fn default_solar_rows() -> usize {
    3
}

fn default_solar_columns() -> usize {
    2
}

fn default_voltage_token() -> String {
    "volt".to_string()
}

fn default_current_token() -> String {
    "curr".to_string()
}

fn default_solar_width() -> u32 {
    1500
}

fn default_solar_height() -> u32 {
    2000
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            value_column: default_solar_value_column(),
            rows: default_solar_rows(),
            columns: default_solar_columns(),
            voltage_token: default_voltage_token(),
            current_token: default_current_token(),
            width: default_solar_width(),
            height: default_solar_height(),
        }
    }
}

/// Configuration for the IMU cube animation (accelerometer + gyroscope pairs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImuConfig {
    /// Filename substring selecting IMU captures
    #[serde(default = "default_imu_token")]
    pub file_token: String,

    /// Filename substring marking accelerometer captures
    #[serde(default = "default_accel_token")]
    pub accel_token: String,

    /// Filename substring marking gyroscope captures
    #[serde(default = "default_gyro_token")]
    pub gyro_token: String,

    /// Minimum merged column count: time, 3 accel axes, 3 gyro axes
    #[serde(default = "default_min_columns")]
    pub min_columns: usize,

    /// Time step in seconds used when timestamps cannot provide one
    #[serde(default = "default_fallback_dt")]
    pub fallback_dt: f64,

    /// Delay between animation frames in milliseconds
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u32,

    /// Half-extent of every axis of the 3D view
    #[serde(default = "default_axis_limit")]
    pub axis_limit: f64,

    #[serde(default = "default_imu_width")]
    pub width: u32,

    #[serde(default = "default_imu_height")]
    pub height: u32,
}

fn default_imu_token() -> String {
    "imu".to_string()
}

fn default_accel_token() -> String {
    "acc".to_string()
}

fn default_gyro_token() -> String {
    "gyro".to_string()
}

fn default_min_columns() -> usize {
    7
}

fn default_fallback_dt() -> f64 {
    0.01
}

fn default_frame_delay_ms() -> u32 {
    10
}

fn default_axis_limit() -> f64 {
    2.0
}

fn default_imu_width() -> u32 {
    1000
}

fn default_imu_height() -> u32 {
    800
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            file_token: default_imu_token(),
            accel_token: default_accel_token(),
            gyro_token: default_gyro_token(),
            min_columns: default_min_columns(),
            fallback_dt: default_fallback_dt(),
            frame_delay_ms: default_frame_delay_ms(),
            axis_limit: default_axis_limit(),
            width: default_imu_width(),
            height: default_imu_height(),
        }
    }
}

/// Logical gyroscope channel to filename mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFiles {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl ChannelFiles {
    /// Channels in roll, pitch, yaw order.
    pub fn ordered(&self) -> [(&'static str, &str); 3] {
        [("x", &self.x), ("y", &self.y), ("z", &self.z)]
    }
}

impl Default for ChannelFiles {
    fn default() -> Self {
        Self {
            x: "gyro_x.csv".to_string(),
            y: "gyro_y.csv".to_string(),
            z: "gyro_z.csv".to_string(),
        }
    }
}

/// Configuration for the roll/pitch/yaw time-series plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImuAnglesConfig {
    #[serde(default)]
    pub channels: ChannelFiles,

    /// Column position holding the angular rate in each channel file
    #[serde(default = "default_angles_value_column")]
    pub value_column: usize,

    /// Fixed time step in seconds; overrides the timestamp estimate when set
    #[serde(default)]
    pub dt: Option<f64>,

    /// Time step in seconds used when timestamps are unavailable
    #[serde(default = "default_fallback_dt")]
    pub fallback_dt: f64,

    #[serde(default = "default_angles_width")]
    pub width: u32,

    #[serde(default = "default_angles_height")]
    pub height: u32,
}

fn default_angles_value_column() -> usize {
    1
}

fn default_angles_width() -> u32 {
    1920
}

fn default_angles_height() -> u32 {
    1080
}

impl Default for ImuAnglesConfig {
    fn default() -> Self {
        Self {
            channels: ChannelFiles::default(),
            value_column: default_angles_value_column(),
            dt: None,
            fallback_dt: default_fallback_dt(),
            width: default_angles_width(),
            height: default_angles_height(),
        }
    }
}

/// Main configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub solar: SolarConfig,

    #[serde(default)]
    pub imu: ImuConfig,

    #[serde(default)]
    pub imu_angles: ImuAnglesConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.data.directory, PathBuf::from("../CSV_Files"));
        assert_eq!(config.grid.columns, 2);
        assert_eq!(config.solar.value_column, 2);
        assert_eq!(config.imu.min_columns, 7);
        assert_eq!(config.imu_angles.dt, None);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "data:\n  directory: /tmp/lab\nimu_angles:\n  dt: 0.02\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.data.directory, PathBuf::from("/tmp/lab"));
        assert_eq!(config.data.output_dir, PathBuf::from("plots"));
        assert_eq!(config.imu_angles.dt, Some(0.02));
        assert_eq!(config.imu_angles.channels, ChannelFiles::default());
        assert_eq!(config.solar.voltage_token, "volt");
    }

    #[test]
    fn test_yaml_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");

        let mut config = PipelineConfig::default();
        config.imu_angles.channels.z = "yaw_rate.csv".to_string();
        config.to_yaml(&path).unwrap();

        let loaded = PipelineConfig::from_yaml(&path).unwrap();
        assert_eq!(loaded.imu_angles.channels.z, "yaw_rate.csv");
        assert_eq!(loaded.grid.cell_width, config.grid.cell_width);
    }
}
