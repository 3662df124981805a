//! Power and cumulative power plots.

use std::path::Path;

use log::warn;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;

use crate::config::SolarConfig;
use crate::processors::solar::PowerSeries;
use super::{ensure_parent, value_range, GridLayout, Result, VisualizationError, FONT, FONT_SIZE_LABEL, FONT_SIZE_TITLE};

/// Title of one power cell.
pub fn power_title(series: &PowerSeries) -> String {
    format!(
        "Power Calculation - {} Direction ({})",
        series.key, series.key.axis
    )
}

fn draw_power_cell(area: &DrawingArea<BitMapBackend, plotters::coord::Shift>, series: &PowerSeries) -> Result<()> {
    let samples = series.len().max(1) as f64;
    let (y_min, y_max) = value_range(series.power.iter().chain(series.cumulative.iter()))
        .ok_or(VisualizationError::EmptySeries)?;

    let mut chart = ChartBuilder::on(area)
        .caption(power_title(series), (FONT, FONT_SIZE_TITLE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..samples - 0.5, y_min..y_max)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Sample Time")
        .y_desc("Power (Watts)")
        .label_style((FONT, FONT_SIZE_LABEL))
        .light_line_style(WHITE.mix(0.7))
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let power: Vec<(f64, f64)> = series.power.iter().enumerate().map(|(i, &p)| (i as f64, p)).collect();
    let cumulative: Vec<(f64, f64)> = series
        .cumulative
        .iter()
        .enumerate()
        .map(|(i, &c)| (i as f64, c))
        .collect();

    chart
        .draw_series(LineSeries::new(power.iter().copied(), &BLUE))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?
        .label("Power")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_series(power.iter().map(|&point| Circle::new(point, 3, BLUE.filled())))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(cumulative.iter().copied(), &RED))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?
        .label("Cumulative Power")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    chart
        .draw_series(cumulative.iter().map(|&point| Cross::new(point, 4, RED)))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((FONT, FONT_SIZE_LABEL))
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Draw one power cell per series into a fixed `rows x columns` PNG.
///
/// Series beyond the number of cells are not drawn.
pub fn plot_power_grid(output_path: &Path, series: &[PowerSeries], config: &SolarConfig) -> Result<GridLayout> {
    if series.is_empty() {
        return Err(VisualizationError::EmptySeries);
    }

    let layout = GridLayout::fixed(config.rows, config.columns, series.len());
    if series.len() > layout.cells() {
        warn!(
            "{} measurement groups but only {} plot cells, {} not drawn",
            series.len(),
            layout.cells(),
            series.len() - layout.cells()
        );
    }

    ensure_parent(output_path)?;
    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let areas = root.split_evenly((layout.rows, layout.cols));
    for (estimate, area) in series.iter().zip(areas.iter()) {
        if estimate.is_empty() {
            warn!("{}: no samples, cell left blank", estimate.key);
            continue;
        }
        draw_power_cell(area, estimate)?;
    }

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::discovery::MeasurementKey;
    use tempfile::TempDir;

    fn series(sign: &str, axis: &str) -> PowerSeries {
        let key = MeasurementKey {
            sign: sign.to_string(),
            axis: axis.to_string(),
        };
        PowerSeries::from_power(key, vec![5.0, 8.0, 9.0, 8.0, 5.0])
    }

    fn small_config() -> SolarConfig {
        SolarConfig {
            width: 600,
            height: 800,
            ..SolarConfig::default()
        }
    }

    #[test]
    fn test_plot_power_grid_single_group() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("solar_power.png");

        let layout = plot_power_grid(&output_path, &[series("plus", "x")], &small_config()).unwrap();
        assert_eq!((layout.rows, layout.cols, layout.used), (3, 2, 1));
        assert_eq!(layout.hidden(), 5);
        assert!(output_path.is_file());
    }

    #[test]
    fn test_plot_power_grid_caps_at_cell_count() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("solar_power.png");
        let groups: Vec<PowerSeries> = [
            ("minus", "x"),
            ("minus", "y"),
            ("minus", "z"),
            ("plus", "x"),
            ("plus", "y"),
            ("plus", "z"),
            ("tilt", "x"),
        ]
        .iter()
        .map(|(sign, axis)| series(sign, axis))
        .collect();

        let layout = plot_power_grid(&output_path, &groups, &small_config()).unwrap();
        assert_eq!(layout.used, 6);
        assert_eq!(layout.hidden(), 0);
        assert!(output_path.is_file());
    }

    #[test]
    fn test_plot_power_grid_empty() {
        let temp_dir = TempDir::new().unwrap();
        let err = plot_power_grid(&temp_dir.path().join("p.png"), &[], &small_config()).unwrap_err();
        assert!(matches!(err, VisualizationError::EmptySeries));
    }

    #[test]
    fn test_power_title() {
        let key = MeasurementKey {
            sign: "minus".to_string(),
            axis: "y".to_string(),
        };
        let series = PowerSeries::from_power(key, vec![1.0]);
        assert_eq!(power_title(&series), "Power Calculation - minus_y Direction (y)");
    }
}
