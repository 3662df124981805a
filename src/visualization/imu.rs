//! IMU orientation figures: the rotating cube animation and the stacked
//! roll/pitch/yaw plot.

use std::iter;
use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;

use crate::config::{ImuAnglesConfig, ImuConfig};
use crate::core::transforms::rad_to_deg;
use crate::processors::cube::{self, Face};
use crate::processors::imu::ImuRecording;
use crate::processors::orientation::{EulerAngleSeries, OrientationIntegrator};
use super::{
    draw_unavailable_message, ensure_parent, value_range, Result, VisualizationError, FONT, FONT_SIZE_LABEL,
    FONT_SIZE_TITLE,
};

const AXIS_NAMES: [&str; 3] = ["Roll", "Pitch", "Yaw"];

/// Title of a cube animation.
pub fn cube_title(recording: &ImuRecording) -> String {
    let (accel, gyro) = recording.label();
    format!("Orientation Visualization for {} and {}", accel, gyro)
}

// plotters draws its second 3D axis vertically; swap y and z so z points up.
#[inline]
fn to_chart(point: (f64, f64, f64)) -> (f64, f64, f64) {
    (point.0, point.2, point.1)
}

fn face_outline(face: &Face) -> Vec<(f64, f64, f64)> {
    face.iter()
        .chain(iter::once(&face[0]))
        .map(|&p| to_chart(p))
        .collect()
}

/// Render one GIF frame per sample of `recording`.
///
/// The orientation is integrated while drawing, so every frame shows the
/// state after its sample. `on_frame` is called with the frame index after
/// each frame is written.
///
/// Returns the number of frames written.
pub fn render_cube_animation<F>(
    output_path: &Path,
    recording: &ImuRecording,
    config: &ImuConfig,
    mut on_frame: F,
) -> Result<usize>
where
    F: FnMut(usize),
{
    if recording.samples.is_empty() {
        return Err(VisualizationError::EmptySeries);
    }

    ensure_parent(output_path)?;
    let root = BitMapBackend::gif(output_path, (config.width, config.height), config.frame_delay_ms)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?
        .into_drawing_area();

    let title = cube_title(recording);
    let limit = config.axis_limit;
    let label_style = (FONT, FONT_SIZE_LABEL).into_font().color(&BLACK);
    let mut integrator = OrientationIntegrator::new(recording.dt);

    for (frame, sample) in recording.samples.iter().enumerate() {
        let orientation = integrator.step(sample.gyro);

        root.fill(&WHITE)
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, (FONT, FONT_SIZE_TITLE))
            .margin(20)
            .build_cartesian_3d(-limit..limit, -limit..limit, -limit..limit)
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

        chart.with_projection(|mut projection| {
            projection.pitch = 0.5;
            projection.yaw = 0.8;
            projection.scale = 0.8;
            projection.into_matrix()
        });

        chart
            .configure_axes()
            .label_style((FONT, FONT_SIZE_LABEL))
            .draw()
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

        chart
            .draw_series([
                Text::new("X", to_chart((limit, -limit, -limit)), label_style.clone()),
                Text::new("Y", to_chart((-limit, limit, -limit)), label_style.clone()),
                Text::new("Z", to_chart((-limit, -limit, limit)), label_style.clone()),
            ])
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

        let faces = cube::cube_faces(&orientation);
        chart
            .draw_series(faces.iter().map(|face| {
                let corners = face.iter().map(|&p| to_chart(p)).collect::<Vec<_>>();
                Polygon::new(corners, CYAN.mix(0.25).filled())
            }))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
        chart
            .draw_series(faces.iter().map(|face| PathElement::new(face_outline(face), RED)))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

        root.present()
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
        on_frame(frame);
    }

    Ok(integrator.steps())
}

/// Plot roll, pitch and yaw in degrees against time `i * dt`, stacked in
/// three rows.
pub fn plot_euler_angles(
    output_path: &Path,
    angles: &EulerAngleSeries,
    dt: f64,
    config: &ImuAnglesConfig,
) -> Result<()> {
    if angles.is_empty() {
        return Err(VisualizationError::EmptySeries);
    }

    ensure_parent(output_path)?;
    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let t_end = (angles.len().saturating_sub(1) as f64 * dt).max(dt);
    let areas = root.split_evenly((3, 1));

    for ((name, axis), area) in AXIS_NAMES.iter().zip(angles.axes()).zip(areas.iter()) {
        let degrees: Vec<f64> = axis.iter().map(|&a| rad_to_deg(a)).collect();
        let Some((y_min, y_max)) = value_range(&degrees) else {
            draw_unavailable_message(area, name, "no finite samples")?;
            continue;
        };

        let mut chart = ChartBuilder::on(area)
            .caption(*name, (FONT, FONT_SIZE_TITLE))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..t_end, y_min..y_max)
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

        chart
            .configure_mesh()
            .x_desc("Time (s)")
            .y_desc(format!("{} (deg)", name))
            .label_style((FONT, FONT_SIZE_LABEL))
            .light_line_style(WHITE.mix(0.7))
            .draw()
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

        chart
            .draw_series(LineSeries::new(
                degrees.iter().enumerate().map(|(i, &d)| (i as f64 * dt, d)),
                &BLUE,
            ))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}
