//! Input collection for the CSV grid plot.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::GridConfig;
use crate::core::loaders::{self, LoaderError, XySeries};
use super::discovery::{self, DiscoveryError};

/// One grid cell: a file and its loaded series, or the reason it failed.
#[derive(Debug)]
pub struct GridCell {
    pub path: PathBuf,
    pub series: Result<XySeries, LoaderError>,
}

impl GridCell {
    /// File name shown as the cell title.
    pub fn title(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.series.is_ok()
    }
}

/// Load every file in `directory` as an x/y series, one cell per file.
///
/// Files that fail to load keep their cell so the layout matches the
/// directory listing.
///
/// # Errors
///
/// Returns `DirectoryNotFound` or `NoInputFiles` when there is nothing to plot.
pub fn load_grid_cells(directory: &Path, config: &GridConfig) -> Result<Vec<GridCell>, DiscoveryError> {
    let files = discovery::list_files(directory)?;
    if files.is_empty() {
        return Err(DiscoveryError::NoInputFiles(directory.to_path_buf()));
    }

    let cells = files
        .into_iter()
        .map(|path| {
            let series = loaders::load_xy_series(&path, config.x_column, config.y_column);
            match &series {
                Ok(s) => debug!("{}: {} points", path.display(), s.len()),
                Err(e) => warn!("Cannot plot {}: {}", path.display(), e),
            }
            GridCell { path, series }
        })
        .collect();

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_grid_cells_keeps_failed_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("a.csv"), "id,time,value\n0,0.0,1.5\n1,0.5,2.5\n").unwrap();
        fs::write(dir.join("b.csv"), "id,time\n0,0.0\n").unwrap();
        fs::write(dir.join("c.csv"), "id,time,value\n0,0.0,abc\n").unwrap();

        let cells = load_grid_cells(dir, &GridConfig::default()).unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].title(), "a.csv");

        let series = cells[0].series.as_ref().unwrap();
        assert_eq!(series.x_label, "time");
        assert_eq!(series.y_label, "value");
        assert_eq!(series.points, vec![(0.0, 1.5), (0.5, 2.5)]);

        assert!(matches!(cells[1].series, Err(LoaderError::MissingColumns { .. })));
        assert!(matches!(cells[2].series, Err(LoaderError::ParseError { .. })));
    }

    #[test]
    fn test_load_grid_cells_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_grid_cells(temp_dir.path(), &GridConfig::default()).unwrap_err();
        assert!(matches!(err, DiscoveryError::NoInputFiles(_)));
    }
}
