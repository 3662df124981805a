//! Plot rendering for lab captures.
//!
//! This module renders PNG figures (grid, solar, roll/pitch/yaw) and animated
//! GIFs (cube orientation) with the plotters library.

use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

pub mod grid;
pub mod imu;
pub mod solar;

pub use grid::plot_grid;
pub use imu::{plot_euler_angles, render_cube_animation};
pub use solar::plot_power_grid;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing to plot")]
    EmptySeries,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

pub(crate) const FONT: &str = "sans-serif";
pub(crate) const FONT_SIZE_TITLE: u32 = 20;
pub(crate) const FONT_SIZE_LABEL: u32 = 14;

/// Rows and columns of a subplot grid and how many cells hold a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub used: usize,
}

impl GridLayout {
    /// Smallest grid with `cols` columns that fits `count` plots.
    pub fn for_count(count: usize, cols: usize) -> Self {
        let cols = cols.max(1);
        Self {
            rows: count.div_ceil(cols),
            cols,
            used: count,
        }
    }

    /// Fixed grid; `used` is capped at the number of cells.
    pub fn fixed(rows: usize, cols: usize, used: usize) -> Self {
        Self {
            rows,
            cols,
            used: used.min(rows * cols),
        }
    }

    #[inline]
    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Cells left blank.
    #[inline]
    pub fn hidden(&self) -> usize {
        self.cells() - self.used
    }
}

/// Plot range with 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Padded range over the finite values, `None` if there are none.
pub fn value_range<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min > max {
        return None;
    }
    Some(calculate_range(min, max))
}

/// Write a placeholder message into a cell whose data could not be plotted.
pub(crate) fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, Shift>,
    title: &str,
    reason: &str,
) -> Result<()> {
    let (x_range, y_range) = area.get_pixel_range();
    let center = (
        (x_range.end - x_range.start) / 2,
        (y_range.end - y_range.start) / 2,
    );
    let style = (FONT, FONT_SIZE_LABEL)
        .into_font()
        .color(&RED)
        .pos(Pos::new(HPos::Center, VPos::Center));

    area.draw(&Text::new(format!("{} unavailable", title), (center.0, center.1 - 12), style.clone()))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    area.draw(&Text::new(reason.to_string(), (center.0, center.1 + 12), style))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    Ok(())
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
