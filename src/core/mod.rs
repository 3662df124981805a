//! Core data types, CSV loading and numeric transforms.

pub mod loaders;
pub mod transforms;

pub use loaders::{ChannelSeries, CsvTable, LoaderError, XySeries};
pub use transforms::TransformError;
