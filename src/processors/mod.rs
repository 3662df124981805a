//! Data processing modules.

pub mod cube;
pub mod discovery;
pub mod grid;
pub mod imu;
pub mod orientation;
pub mod solar;

// Re-export key types for convenience
pub use cube::{cube_faces, rotated_vertices, CUBE_FACES, CUBE_VERTICES};
pub use discovery::{
    find_imu_files, group_measurement_files, pair_imu_files, DiscoveryError, ImuPair,
    MeasurementKey, MeasurementPair,
};
pub use grid::{load_grid_cells, GridCell};
pub use imu::{compute_angles, load_gyro_channels, load_recording, ImuError, ImuRecording, ImuSample};
pub use orientation::{integrate_euler_angles, integrate_orientation, EulerAngleSeries, OrientationIntegrator};
pub use solar::{calculate_power, estimate_directory, PowerSeries, SolarError};
