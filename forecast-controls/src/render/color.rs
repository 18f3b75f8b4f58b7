//! Precipitation color scales
//!
//! The threshold scale follows the NOAA precipitation legend, in inches.
//! Backend values arrive as a rate in kg/m²/s and are converted to inches
//! per hour first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color with 8-bit channels and a fractional alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgb(r, g, b)` form, alpha dropped
    pub fn css_rgb(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// CSS `rgba(r, g, b, a)` form
    pub fn css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// One bucket of the threshold scale: values `>= min` inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub min: f64,
    pub label: &'static str,
    pub rgb: (u8, u8, u8),
}

impl Threshold {
    pub fn color(&self, alpha: f64) -> Rgba {
        let (r, g, b) = self.rgb;
        Rgba::new(r, g, b, alpha)
    }
}

const fn threshold(min: f64, label: &'static str, r: u8, g: u8, b: u8) -> Threshold {
    Threshold {
        min,
        label,
        rgb: (r, g, b),
    }
}

/// Threshold buckets, highest first
pub const THRESHOLD_LEGEND: [Threshold; 15] = [
    threshold(10.0, "≥ 10 in", 215, 215, 215),
    threshold(8.0, "8 - 10 in", 114, 64, 214),
    threshold(6.0, "6 - 8 in", 246, 0, 242),
    threshold(5.0, "5 - 6 in", 112, 2, 9),
    threshold(4.0, "4 - 5 in", 162, 3, 17),
    threshold(3.0, "3 - 4 in", 245, 7, 25),
    threshold(2.5, "2.5 - 3 in", 246, 140, 40),
    threshold(2.0, "2 - 2.5 in", 253, 212, 105),
    threshold(1.5, "1.5 - 2 in", 248, 250, 61),
    threshold(1.0, "1 - 1.5 in", 14, 89, 24),
    threshold(0.75, "0.75 - 1 in", 24, 150, 36),
    threshold(0.5, "0.5 - 0.75 in", 40, 250, 59),
    threshold(0.25, "0.25 - 0.5 in", 12, 18, 135),
    threshold(0.1, "0.1 - 0.25 in", 59, 121, 187),
    threshold(0.01, "0.01 - 0.1 in", 43, 192, 245),
];

/// Color for missing or invalid values
pub const ERROR_RGB: (u8, u8, u8) = (114, 114, 114);

pub const ERROR_LABEL: &str = "No data";

/// Legend entries as `(label, color)`, error entry last
pub fn legend_entries() -> Vec<(&'static str, Rgba)> {
    let (r, g, b) = ERROR_RGB;
    THRESHOLD_LEGEND
        .iter()
        .map(|t| (t.label, t.color(1.0)))
        .chain(std::iter::once((ERROR_LABEL, Rgba::opaque(r, g, b))))
        .collect()
}

/// Color a precipitation amount in inches
///
/// Values below the lowest bucket but above zero reuse its color with the
/// alpha scaled down towards zero. Non-finite and non-positive values get
/// the error color.
pub fn noaa_threshold_color(value_in: f64, alpha: f64) -> Rgba {
    let (r, g, b) = ERROR_RGB;
    let error = Rgba::new(r, g, b, alpha);
    if !value_in.is_finite() {
        return error;
    }
    if let Some(bucket) = THRESHOLD_LEGEND.iter().find(|t| value_in >= t.min) {
        return bucket.color(alpha);
    }
    let lowest = &THRESHOLD_LEGEND[THRESHOLD_LEGEND.len() - 1];
    if value_in > 0.0 {
        return lowest.color(alpha * (value_in / lowest.min));
    }
    error
}

/// Convert a rate in kg/m²/s to inches per hour
pub fn kg_m2_s_to_inches_per_hour(value: f64) -> f64 {
    value * 0.0393701 * 3600.0
}

/// Green to red gradient between `min` and `max`
///
/// The minimum itself is fully transparent; alpha grows with the square
/// root of the position.
pub fn gradient_color(value: f64, min: f64, max: f64) -> Rgba {
    if (value - min).abs() < 1e-6 || max <= min {
        return Rgba::TRANSPARENT;
    }
    let ratio = ((value - min) / (max - min)).clamp(0.0, 1.0);
    let r = (255.0 * ratio).floor() as u8;
    let g = (255.0 * (1.0 - ratio)).floor() as u8;
    Rgba::new(r, g, 0, ratio.sqrt())
}

/// How cell values are turned into colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMethod {
    /// NOAA buckets on the value converted to inches per hour
    #[default]
    Thresholds,
    /// Relative gradient between the smallest and largest value
    Gradient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_buckets() {
        assert_eq!(noaa_threshold_color(12.0, 1.0), Rgba::opaque(215, 215, 215));
        assert_eq!(noaa_threshold_color(10.0, 1.0), Rgba::opaque(215, 215, 215));
        assert_eq!(noaa_threshold_color(7.5, 1.0), Rgba::opaque(246, 0, 242));
        assert_eq!(noaa_threshold_color(7.5, 1.0).css_rgb(), "rgb(246, 0, 242)");
        assert_eq!(noaa_threshold_color(2.7, 1.0), Rgba::opaque(246, 140, 40));
        assert_eq!(noaa_threshold_color(0.3, 0.5), Rgba::new(12, 18, 135, 0.5));
        // 0.05 in falls inside the lowest bucket
        assert_eq!(noaa_threshold_color(0.05, 1.0), Rgba::opaque(43, 192, 245));
    }

    #[test]
    fn test_below_lowest_bucket_scales_alpha() {
        let color = noaa_threshold_color(0.005, 1.0);
        assert_eq!((color.r, color.g, color.b), (43, 192, 245));
        assert!((color.a - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_values_get_error_color() {
        let error = Rgba::opaque(114, 114, 114);
        assert_eq!(noaa_threshold_color(f64::NAN, 1.0), error);
        assert_eq!(noaa_threshold_color(0.0, 1.0), error);
        assert_eq!(noaa_threshold_color(-1.0, 1.0), error);
        assert_eq!(noaa_threshold_color(f64::NAN, 1.0).css_rgb(), "rgb(114, 114, 114)");
    }

    #[test]
    fn test_unit_conversion() {
        let inches = kg_m2_s_to_inches_per_hour(0.001);
        assert!((inches - 0.14173236).abs() < 1e-9);
    }

    #[test]
    fn test_gradient() {
        assert_eq!(gradient_color(1.0, 1.0, 5.0), Rgba::TRANSPARENT);
        let top = gradient_color(5.0, 1.0, 5.0);
        assert_eq!((top.r, top.g, top.b), (255, 0, 0));
        assert!((top.a - 1.0).abs() < 1e-9);
        let quarter = gradient_color(2.0, 1.0, 5.0);
        assert_eq!((quarter.r, quarter.g), (63, 191));
        assert!((quarter.a - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_css_formatting() {
        assert_eq!(Rgba::opaque(255, 0, 0).css(), "rgba(255, 0, 0, 1)");
        assert_eq!(Rgba::new(1, 2, 3, 0.5).to_string(), "rgba(1, 2, 3, 0.5)");
        assert_eq!(Rgba::opaque(1, 2, 3).css_rgb(), "rgb(1, 2, 3)");
    }

    #[test]
    fn test_legend_has_error_entry_last() {
        let entries = legend_entries();
        assert_eq!(entries.len(), 16);
        assert_eq!(entries[0].0, "≥ 10 in");
        assert_eq!(entries[15], (ERROR_LABEL, Rgba::opaque(114, 114, 114)));
    }
}
