//! Rendering contract: colors and GeoJSON features for a map renderer
//!
//! Nothing here draws; every function produces plain values or
//! `serde_json` documents that a renderer can display as-is.

pub mod cells;
pub mod color;
pub mod gridlines;

/// `[x, y]` map coordinate
pub type Point = [f64; 2];

pub use cells::{apply_values, build_cell_features, cells_to_feature_collection, color_cells, CellFeature};
pub use color::{
    gradient_color, kg_m2_s_to_inches_per_hour, legend_entries, noaa_threshold_color, ColorMethod,
    Rgba, THRESHOLD_LEGEND,
};
pub use gridlines::{region_outline, to_feature_collection, Gridlines, LineAxis, LineFeature};
