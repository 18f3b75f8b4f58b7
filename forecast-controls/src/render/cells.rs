//! Forecast cell polygons carrying a value and a display color

use crate::render::color::{
    gradient_color, kg_m2_s_to_inches_per_hour, noaa_threshold_color, ColorMethod, Rgba,
};
use crate::render::Point;
use serde_json::{json, Value};

/// One rectangular forecast cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellFeature {
    /// Closed ring: the four corners followed by the first corner again
    pub ring: Vec<Point>,
    /// Midpoint of the first and third corner
    pub center: Point,
    /// Raw value in kg/m²/s
    pub value: f64,
    /// Value in inches per hour, set by threshold coloring
    pub value_inches: Option<f64>,
    pub color: Rgba,
}

impl CellFeature {
    fn from_corners(corners: &[Point]) -> Self {
        let ring = vec![corners[0], corners[1], corners[2], corners[3], corners[0]];
        let center = [
            (corners[0][0] + corners[2][0]) / 2.0,
            (corners[0][1] + corners[2][1]) / 2.0,
        ];
        Self {
            ring,
            center,
            value: 0.0,
            value_inches: None,
            color: Rgba::TRANSPARENT,
        }
    }

    pub fn to_geojson(&self) -> Value {
        let mut properties = json!({
            "color": self.color.css(),
            "value": self.value,
            "center": self.center,
        });
        if let Some(inches) = self.value_inches {
            properties["value_inches"] = json!(inches);
        }
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [self.ring],
            },
            "properties": properties,
        })
    }
}

/// Build one cell per geometry of at least four corners
///
/// Shorter geometries are skipped with a warning.
pub fn build_cell_features(geometries: &[Vec<Point>]) -> Vec<CellFeature> {
    geometries
        .iter()
        .filter_map(|corners| {
            if corners.len() < 4 {
                log::warn!("Geometry has less than 4 points, skipping: {corners:?}");
                return None;
            }
            Some(CellFeature::from_corners(corners))
        })
        .collect()
}

/// Assign values to cells in order
///
/// Cells without a matching value are marked as missing (NaN).
pub fn apply_values(cells: &mut [CellFeature], values: &[f64]) {
    if cells.len() != values.len() {
        log::warn!(
            "{} values for {} cells, unmatched cells will show as missing",
            values.len(),
            cells.len()
        );
    }
    for (i, cell) in cells.iter_mut().enumerate() {
        cell.value = values.get(i).copied().unwrap_or(f64::NAN);
    }
}

/// Color every cell from its value
pub fn color_cells(cells: &mut [CellFeature], method: ColorMethod) {
    match method {
        ColorMethod::Thresholds => {
            for cell in cells.iter_mut() {
                let inches = kg_m2_s_to_inches_per_hour(cell.value);
                cell.value_inches = Some(inches);
                cell.color = noaa_threshold_color(inches, 1.0);
            }
        }
        ColorMethod::Gradient => {
            let finite = cells.iter().map(|c| c.value).filter(|v| v.is_finite());
            let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
            for cell in cells.iter_mut() {
                cell.color = gradient_color(cell.value, min, max);
            }
        }
    }
}

/// GeoJSON `FeatureCollection` of cells
pub fn cells_to_feature_collection(cells: &[CellFeature]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": cells.iter().map(CellFeature::to_geojson).collect::<Vec<_>>(),
    })
}
