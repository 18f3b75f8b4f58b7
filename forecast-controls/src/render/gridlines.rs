//! Forecast grid lines and region outlines
//!
//! The backend returns one polyline per grid row boundary and one per column
//! boundary, at the current scale. A region is outlined by picking the lines
//! at its first and last row and column.

use crate::range::Bounds;
use crate::render::color::Rgba;
use crate::render::Point;
use crate::types::{RegionBounds, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Color of the full grid
pub const GRID_COLOR: Rgba = Rgba::opaque(0, 0, 255);
/// Outline color of the committed region
pub const REGION_COLOR: Rgba = Rgba::opaque(255, 0, 0);
/// Outline color of the uncommitted selection
pub const CANDIDATE_COLOR: Rgba = Rgba::opaque(255, 0, 255);

/// Grid line response from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gridlines {
    pub horiz_gridlines: Vec<Vec<Point>>,
    pub vert_gridlines: Vec<Vec<Point>>,
    #[serde(rename = "scaleX", default = "default_scale")]
    pub scale_x: i64,
    #[serde(rename = "scaleY", default = "default_scale")]
    pub scale_y: i64,
}

fn default_scale() -> i64 {
    16
}

impl Gridlines {
    /// Region slider domains implied by the grid: `(rows, cols)`
    ///
    /// Each line stands for `scale` cells, and the sliders step by the scale.
    pub fn region_domain(&self) -> Result<(Bounds, Bounds)> {
        let rows = Bounds::new(
            0,
            self.horiz_gridlines.len() as i64 * self.scale_y,
            self.scale_y,
        )?;
        let cols = Bounds::new(
            0,
            self.vert_gridlines.len() as i64 * self.scale_x,
            self.scale_x,
        )?;
        Ok((rows, cols))
    }

    /// Every grid line, in `color`
    pub fn features(&self, color: Rgba) -> Vec<LineFeature> {
        let horiz = self
            .horiz_gridlines
            .iter()
            .enumerate()
            .map(|(i, line)| LineFeature::new(LineAxis::Horizontal, i, line.clone(), color));
        let vert = self
            .vert_gridlines
            .iter()
            .enumerate()
            .map(|(i, line)| LineFeature::new(LineAxis::Vertical, i, line.clone(), color));
        horiz.chain(vert).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAxis {
    Horizontal,
    Vertical,
}

impl LineAxis {
    fn prefix(&self) -> &'static str {
        match self {
            LineAxis::Horizontal => "horiz",
            LineAxis::Vertical => "vert",
        }
    }
}

/// A single colored grid line
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeature {
    pub axis: LineAxis,
    pub index: usize,
    pub coordinates: Vec<Point>,
    pub color: Rgba,
}

impl LineFeature {
    pub fn new(axis: LineAxis, index: usize, coordinates: Vec<Point>, color: Rgba) -> Self {
        Self {
            axis,
            index,
            coordinates,
            color,
        }
    }

    /// Feature id, `horiz-{i}` or `vert-{i}`
    pub fn id(&self) -> String {
        format!("{}-{}", self.axis.prefix(), self.index)
    }

    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Feature",
            "id": self.id(),
            "geometry": {
                "type": "LineString",
                "coordinates": self.coordinates,
            },
            "properties": {
                "color": self.color.css(),
            },
        })
    }
}

/// Lines bounding `bounds`, recolored with `color`
///
/// Cell indices are converted to line indices by dividing by the slider
/// step. The first and last row/column line of the region are selected;
/// bounds that do not fall on a step select nothing on that side.
pub fn region_outline(
    gridlines: &Gridlines,
    bounds: &RegionBounds,
    row_step: i64,
    col_step: i64,
    color: Rgba,
) -> Vec<LineFeature> {
    let rows = edge_indices(bounds.row_min, bounds.row_max, row_step);
    let cols = edge_indices(bounds.col_min, bounds.col_max, col_step);
    gridlines
        .features(color)
        .into_iter()
        .filter(|line| {
            let wanted = match line.axis {
                LineAxis::Horizontal => &rows,
                LineAxis::Vertical => &cols,
            };
            wanted.contains(&Some(line.index as i64))
        })
        .collect()
}

fn edge_indices(min: i64, max: i64, step: i64) -> [Option<i64>; 2] {
    [line_index(min, step), line_index(max, step).map(|i| i - 1)]
}

fn line_index(cell: i64, step: i64) -> Option<i64> {
    if step <= 0 || cell % step != 0 {
        return None;
    }
    Some(cell / step)
}

/// GeoJSON `FeatureCollection` of line features
pub fn to_feature_collection(features: &[LineFeature]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features.iter().map(LineFeature::to_geojson).collect::<Vec<_>>(),
    })
}
