//! Control configuration types
//!
//! Defaults for every widget: slider domains, initial values, coupling
//! policy and playback interval. Everything deserializes from TOML with
//! per-field defaults, so a config file only needs the values it changes.

use crate::range::{Bounds, ResolutionPolicy};
use crate::types::{parse_date, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Domain and initial value of a single slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub min: i64,
    pub max: i64,
    #[serde(default = "default_step")]
    pub step: i64,
    pub value: i64,
}

impl SliderConfig {
    pub fn new(min: i64, max: i64, step: i64, value: i64) -> Self {
        Self {
            min,
            max,
            step,
            value,
        }
    }

    /// Validated bounds for this slider
    pub fn bounds(&self) -> Result<Bounds> {
        Bounds::new(self.min, self.max, self.step)
    }
}

/// Domain and initial values of a start/end slider pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub min: i64,
    pub max: i64,
    #[serde(default = "default_step")]
    pub step: i64,
    pub start: i64,
    pub end: i64,
}

impl RangeConfig {
    pub fn new(min: i64, max: i64, step: i64, start: i64, end: i64) -> Self {
        Self {
            min,
            max,
            step,
            start,
            end,
        }
    }

    pub fn bounds(&self) -> Result<Bounds> {
        Bounds::new(self.min, self.max, self.step)
    }
}

fn default_step() -> i64 {
    1
}

/// Scale widget defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleConfigDefaults {
    /// Applies to both the x and y scale sliders
    #[serde(default = "default_scale_slider")]
    pub slider: SliderConfig,

    /// Whether x and y start locked together
    #[serde(default = "default_true")]
    pub locked: bool,
}

impl Default for ScaleConfigDefaults {
    fn default() -> Self {
        Self {
            slider: default_scale_slider(),
            locked: true,
        }
    }
}

fn default_scale_slider() -> SliderConfig {
    SliderConfig::new(1, 64, 1, 16)
}

fn default_true() -> bool {
    true
}

/// Region selector defaults, in grid cell indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfigDefaults {
    #[serde(default = "default_region_rows")]
    pub rows: RangeConfig,

    #[serde(default = "default_region_cols")]
    pub cols: RangeConfig,

    /// Minimum distance between min and max, in steps
    #[serde(default = "default_region_spacing")]
    pub spacing_steps: i64,

    #[serde(default = "default_region_policy")]
    pub policy: ResolutionPolicy,
}

impl Default for RegionConfigDefaults {
    fn default() -> Self {
        Self {
            rows: default_region_rows(),
            cols: default_region_cols(),
            spacing_steps: default_region_spacing(),
            policy: default_region_policy(),
        }
    }
}

fn default_region_rows() -> RangeConfig {
    RangeConfig::new(0, 3840, 16, 656, 1264)
}

fn default_region_cols() -> RangeConfig {
    RangeConfig::new(0, 4608, 16, 1952, 2416)
}

fn default_region_spacing() -> i64 {
    2
}

fn default_region_policy() -> ResolutionPolicy {
    ResolutionPolicy::Constrain
}

/// Time widget defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeConfigDefaults {
    #[serde(default = "default_target_date")]
    pub target_date: NaiveDate,

    /// Earliest date with forecast data
    #[serde(default = "default_min_date")]
    pub min_date: NaiveDate,

    /// Lead time in hours; `value` seeds both lead time and lead time end
    #[serde(default = "default_lead_time")]
    pub lead_time: SliderConfig,

    #[serde(default = "default_forecast_cycle")]
    pub forecast_cycle: SliderConfig,

    #[serde(default)]
    pub range_mode: bool,

    /// How lead time and lead time end resolve crossings
    #[serde(default)]
    pub lead_policy: ResolutionPolicy,
}

impl Default for TimeConfigDefaults {
    fn default() -> Self {
        Self {
            target_date: default_target_date(),
            min_date: default_min_date(),
            lead_time: default_lead_time(),
            forecast_cycle: default_forecast_cycle(),
            range_mode: false,
            lead_policy: ResolutionPolicy::default(),
        }
    }
}

fn default_target_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 4).unwrap_or_default()
}

fn default_min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 9, 17).unwrap_or_default()
}

fn default_lead_time() -> SliderConfig {
    SliderConfig::new(1, 18, 1, 1)
}

fn default_forecast_cycle() -> SliderConfig {
    SliderConfig::new(0, 23, 1, 0)
}

/// Animation playback defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationConfigDefaults {
    /// Delay between playback ticks in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: i64,
}

impl Default for AnimationConfigDefaults {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> i64 {
    1000
}

/// Configuration for every control widget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlsConfig {
    #[serde(default)]
    pub time: TimeConfigDefaults,

    #[serde(default)]
    pub scale: ScaleConfigDefaults,

    #[serde(default)]
    pub region: RegionConfigDefaults,

    #[serde(default)]
    pub animation: AnimationConfigDefaults,
}

impl ControlsConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the initial target date (`YYYYMMDD` or `YYYY-MM-DD`)
    pub fn with_target_date(mut self, date: &str) -> Result<Self> {
        self.time.target_date = parse_date(date)?;
        Ok(self)
    }

    /// Builder method: choose how lead time crossings resolve
    pub fn with_lead_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.time.lead_policy = policy;
        self
    }

    /// Builder method: start in range mode
    pub fn with_range_mode(mut self, enabled: bool) -> Self {
        self.time.range_mode = enabled;
        self
    }

    /// Builder method: set the initial scale for both axes
    pub fn with_scale(mut self, value: i64) -> Self {
        self.scale.slider.value = value;
        self
    }

    /// Builder method: start with the scale axes unlocked
    pub fn with_scale_lock(mut self, locked: bool) -> Self {
        self.scale.locked = locked;
        self
    }

    /// Builder method: set the initial region selection
    pub fn with_region(mut self, row_min: i64, row_max: i64, col_min: i64, col_max: i64) -> Self {
        self.region.rows.start = row_min;
        self.region.rows.end = row_max;
        self.region.cols.start = col_min;
        self.region.cols.end = col_max;
        self
    }

    /// Builder method: set the playback interval
    pub fn with_interval_ms(mut self, interval_ms: i64) -> Self {
        self.animation.interval_ms = interval_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControlsConfig::default();
        assert_eq!(config.scale.slider, SliderConfig::new(1, 64, 1, 16));
        assert!(config.scale.locked);
        assert_eq!(config.region.rows, RangeConfig::new(0, 3840, 16, 656, 1264));
        assert_eq!(config.region.cols, RangeConfig::new(0, 4608, 16, 1952, 2416));
        assert_eq!(config.region.spacing_steps, 2);
        assert_eq!(config.region.policy, ResolutionPolicy::Constrain);
        assert_eq!(config.time.lead_policy, ResolutionPolicy::Propagate);
        assert_eq!(
            config.time.target_date,
            NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()
        );
        assert_eq!(config.animation.interval_ms, 1000);
    }

    #[test]
    fn test_builder() {
        let config = ControlsConfig::new()
            .with_target_date("20240115")
            .unwrap()
            .with_lead_policy(ResolutionPolicy::Constrain)
            .with_scale(8)
            .with_scale_lock(false)
            .with_region(0, 64, 16, 128);

        assert_eq!(
            config.time.target_date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(config.time.lead_policy, ResolutionPolicy::Constrain);
        assert_eq!(config.scale.slider.value, 8);
        assert!(!config.scale.locked);
        assert_eq!(config.region.rows.end, 64);
        assert_eq!(config.region.cols.start, 16);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ControlsConfig =
            serde_json::from_str(r#"{"time": {"lead_policy": "constrain"}}"#).unwrap();
        assert_eq!(config.time.lead_policy, ResolutionPolicy::Constrain);
        assert_eq!(config.time.lead_time, SliderConfig::new(1, 18, 1, 1));
        assert_eq!(config.region, RegionConfigDefaults::default());
    }
}
