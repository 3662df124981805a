//! Gyroscope angular-rate integration.
//!
//! Rates arrive in degrees/second and are converted to radians/second before
//! integration. Both integrators are zero-order-hold: each sample's rate is
//! held constant over one time step `dt`, so drift accumulates over long
//! captures.
//!
//! - [`integrate_orientation`] composes unit quaternions, applying the first
//!   sample immediately (one state per sample).
//! - [`integrate_euler_angles`] accumulates roll/pitch/yaw independently,
//!   leaving index 0 at zero and starting at the second sample.

use nalgebra::UnitQuaternion;

use crate::core::transforms::{deg_to_rad, rate_to_rad};

/// Rotation over one step of `dt` seconds at `rate_deg` degrees/second.
pub fn incremental_rotation(rate_deg: [f64; 3], dt: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_scaled_axis(rate_to_rad(rate_deg) * dt)
}

/// Compose one step into `orientation` (the step is applied in the fixed frame).
#[inline]
pub fn apply_step(orientation: UnitQuaternion<f64>, rate_deg: [f64; 3], dt: f64) -> UnitQuaternion<f64> {
    incremental_rotation(rate_deg, dt) * orientation
}

/// Orientation after each sample, starting from the identity.
pub fn integrate_orientation(rates_deg: &[[f64; 3]], dt: f64) -> Vec<UnitQuaternion<f64>> {
    rates_deg
        .iter()
        .scan(UnitQuaternion::identity(), |orientation, &rate| {
            *orientation = apply_step(*orientation, rate, dt);
            Some(*orientation)
        })
        .collect()
}

/// Stepping form of [`integrate_orientation`] for frame-by-frame consumers.
#[derive(Debug, Clone)]
pub struct OrientationIntegrator {
    orientation: UnitQuaternion<f64>,
    dt: f64,
    steps: usize,
}

impl OrientationIntegrator {
    pub fn new(dt: f64) -> Self {
        Self {
            orientation: UnitQuaternion::identity(),
            dt,
            steps: 0,
        }
    }

    /// Advance by one angular-rate sample and return the new orientation.
    pub fn step(&mut self, rate_deg: [f64; 3]) -> UnitQuaternion<f64> {
        self.orientation = apply_step(self.orientation, rate_deg, self.dt);
        self.steps += 1;
        self.orientation
    }

    #[inline]
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.orientation
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }
}

/// Roll, pitch and yaw in radians, one entry per input sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EulerAngleSeries {
    pub roll: Vec<f64>,
    pub pitch: Vec<f64>,
    pub yaw: Vec<f64>,
}

impl EulerAngleSeries {
    #[inline]
    pub fn len(&self) -> usize {
        self.roll.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roll.is_empty()
    }

    /// Angles in roll, pitch, yaw order.
    pub fn axes(&self) -> [&[f64]; 3] {
        [&self.roll, &self.pitch, &self.yaw]
    }
}

/// Accumulate each axis as `angle[i] = angle[i-1] + rad(rate[i]) * dt`.
///
/// Index 0 stays at zero; the first sample's rate is not integrated.
pub fn integrate_euler_angles(rates_deg: &[[f64; 3]], dt: f64) -> EulerAngleSeries {
    let mut series = EulerAngleSeries {
        roll: Vec::with_capacity(rates_deg.len()),
        pitch: Vec::with_capacity(rates_deg.len()),
        yaw: Vec::with_capacity(rates_deg.len()),
    };
    if rates_deg.is_empty() {
        return series;
    }

    let start = [0.0_f64; 3];
    let angles = std::iter::once(start).chain(rates_deg.iter().skip(1).scan(start, |angle, rate| {
        for axis in 0..3 {
            angle[axis] += deg_to_rad(rate[axis]) * dt;
        }
        Some(*angle)
    }));

    for [roll, pitch, yaw] in angles {
        series.roll.push(roll);
        series.pitch.push(pitch);
        series.yaw.push(yaw);
    }
    series
}
