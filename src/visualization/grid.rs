//! Grid of x/y line plots, one cell per capture.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;

use crate::config::GridConfig;
use crate::core::loaders::XySeries;
use crate::processors::grid::GridCell;
use super::{
    calculate_range, draw_unavailable_message, ensure_parent, GridLayout, Result, VisualizationError,
    FONT, FONT_SIZE_LABEL, FONT_SIZE_TITLE,
};

fn draw_series_cell(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    title: &str,
    series: &XySeries,
) -> Result<()> {
    let (x_min, x_max) = super::value_range(series.points.iter().map(|(x, _)| x))
        .unwrap_or_else(|| calculate_range(0.0, 0.0));
    let (y_min, y_max) = super::value_range(series.points.iter().map(|(_, y)| y))
        .unwrap_or_else(|| calculate_range(0.0, 0.0));

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, FONT_SIZE_TITLE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(series.x_label.as_str())
        .y_desc(series.y_label.as_str())
        .label_style((FONT, FONT_SIZE_LABEL))
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(series.points.iter().copied(), &BLUE))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(
            series
                .points
                .iter()
                .map(|&point| Circle::new(point, 3, BLUE.filled())),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Draw every cell into one PNG.
///
/// Layout is `ceil(n / columns)` rows; trailing cells stay blank. Cells whose
/// file failed to load show the load error instead of a chart.
///
/// # Errors
///
/// Returns `EmptySeries` if `cells` is empty.
pub fn plot_grid(output_path: &Path, cells: &[GridCell], config: &GridConfig) -> Result<GridLayout> {
    if cells.is_empty() {
        return Err(VisualizationError::EmptySeries);
    }

    let layout = GridLayout::for_count(cells.len(), config.columns);
    let size = (
        config.cell_width * layout.cols as u32,
        config.cell_height * layout.rows as u32,
    );

    ensure_parent(output_path)?;
    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let areas = root.split_evenly((layout.rows, layout.cols));
    for (cell, area) in cells.iter().zip(areas.iter()) {
        let title = cell.title();
        match &cell.series {
            Ok(series) if !series.is_empty() => draw_series_cell(area, &title, series)?,
            Ok(_) => draw_unavailable_message(area, &title, "no data rows")?,
            Err(e) => draw_unavailable_message(area, &title, &e.to_string())?,
        }
    }

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loaders::LoaderError;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn loaded_cell(name: &str) -> GridCell {
        GridCell {
            path: PathBuf::from(name),
            series: Ok(XySeries {
                x_label: "time".to_string(),
                y_label: "value".to_string(),
                points: vec![(0.0, 1.0), (0.5, 3.0), (1.0, 2.0)],
                source_path: Some(PathBuf::from(name)),
            }),
        }
    }

    #[test]
    fn test_plot_grid_writes_png() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("plots").join("csv_grid.png");
        let cells = vec![
            loaded_cell("a.csv"),
            GridCell {
                path: PathBuf::from("b.csv"),
                series: Err(LoaderError::EmptyFile(PathBuf::from("b.csv"))),
            },
            loaded_cell("c.csv"),
        ];
        let config = GridConfig {
            cell_width: 300,
            cell_height: 200,
            ..GridConfig::default()
        };

        let layout = plot_grid(&output_path, &cells, &config).unwrap();
        assert_eq!((layout.rows, layout.cols, layout.used), (2, 2, 3));
        assert_eq!(layout.hidden(), 1);
        assert!(output_path.is_file());
    }

    #[test]
    fn test_plot_grid_empty() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("csv_grid.png");

        let err = plot_grid(&output_path, &[], &GridConfig::default()).unwrap_err();
        assert!(matches!(err, VisualizationError::EmptySeries));
        assert!(!output_path.exists());
    }
}
