//! Batch plotting pipelines for lab sensor captures.
//!
//! This crate provides tools for:
//! - Plotting every CSV capture of a directory on one grid
//! - Estimating solar panel power from paired voltage/current captures
//! - Integrating IMU gyroscope rates into orientation (quaternion and
//!   roll/pitch/yaw) and rendering a rotating cube animation
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use sensor_lab_plots::{config::SolarConfig, processors::solar::estimate_directory};
//!
//! let series = estimate_directory(Path::new("CSV_Files"), &SolarConfig::default()).unwrap();
//! for s in &series {
//!     println!("{}: {:.3} W", s.key, s.total());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{DataConfig, GridConfig, ImuAnglesConfig, ImuConfig, PipelineConfig, SolarConfig};
pub use core::loaders::{ChannelSeries, CsvTable, XySeries};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
