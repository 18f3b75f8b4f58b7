//! Application state shared by the widgets
//!
//! [`AppState`] holds what the backend requests are built from: the last
//! submitted time selection, the committed scales and region, and the
//! forecast data received for them.

use crate::render::Point;
use crate::requests::{ForecastRequest, ForecastResponse, SetScalesRequest, SetTimeRequest};
use crate::types::{ControlError, RegionBoundArgs, RegionBounds, Result, ScaleArgs, TimeSelection};
use serde::Serialize;
use std::collections::BTreeMap;

/// Forecast data for the current request parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataCache {
    pub geometry: Vec<Vec<Point>>,
    /// Cell values per lead time
    pub timestep_values: BTreeMap<i64, Vec<f64>>,
}

impl DataCache {
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }

    pub fn values_for(&self, lead_time: i64) -> Option<&[f64]> {
        self.timestep_values.get(&lead_time).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    /// Set by the first submit
    pub time: Option<TimeSelection>,
    pub scale_x: i64,
    pub scale_y: i64,
    pub region: RegionBounds,
    /// Lead time picked on the animation slider
    pub displayed_lead_time: Option<i64>,
    pub data: DataCache,
}

impl AppState {
    pub fn new(scale_x: i64, scale_y: i64, region: RegionBounds) -> Self {
        Self {
            time: None,
            scale_x,
            scale_y,
            region,
            displayed_lead_time: None,
            data: DataCache::default(),
        }
    }

    pub fn apply_time_selection(&mut self, selection: &TimeSelection) {
        log::debug!("State time updated to {selection}");
        self.time = Some(*selection);
        self.displayed_lead_time = None;
    }

    pub fn apply_scales(&mut self, args: ScaleArgs) {
        if let Some(x) = args.x_scale {
            log::debug!("State scaleX updated from {} to {}", self.scale_x, x);
            self.scale_x = x;
        }
        if let Some(y) = args.y_scale {
            log::debug!("State scaleY updated from {} to {}", self.scale_y, y);
            self.scale_y = y;
        }
    }

    pub fn apply_region(&mut self, args: RegionBoundArgs) {
        let region = &mut self.region;
        if let Some(v) = args.row_min {
            region.row_min = v;
        }
        if let Some(v) = args.row_max {
            region.row_max = v;
        }
        if let Some(v) = args.col_min {
            region.col_min = v;
        }
        if let Some(v) = args.col_max {
            region.col_max = v;
        }
        log::debug!("State region updated to {:?}", self.region);
    }

    /// Replace the cached forecast data
    ///
    /// A response without per-timestep values is stored under `lead_time`.
    pub fn store_forecast(&mut self, response: ForecastResponse, lead_time: i64) {
        let timestep_values = match (response.timestep_values, response.values) {
            (Some(steps), _) => steps,
            (None, Some(values)) => BTreeMap::from([(lead_time, values)]),
            (None, None) => {
                log::warn!("Forecast response carried no values");
                BTreeMap::new()
            }
        };
        self.data = DataCache {
            geometry: response.geometries,
            timestep_values,
        };
        log::info!(
            "Cached {} cells over {} lead time(s)",
            self.data.geometry.len(),
            self.data.timestep_values.len()
        );
    }

    /// Lead time whose values should be shown
    pub fn display_lead_time(&self) -> Option<i64> {
        self.displayed_lead_time
            .or_else(|| self.time.map(|t| t.lead_time))
    }

    fn submitted_time(&self, operation: &str) -> Result<TimeSelection> {
        self.time.ok_or_else(|| {
            let message = format!("{operation} requires a prior time submit");
            log::error!("{message}");
            ControlError::PreconditionFailed(message)
        })
    }

    pub fn set_time_request(&self) -> Result<SetTimeRequest> {
        let time = self.submitted_time("set_time")?;
        Ok(SetTimeRequest {
            target_time: time.target_time_compact(),
            lead_time: time.lead_time,
            forecast_cycle: time.forecast_cycle,
        })
    }

    pub fn set_scales_request(&self) -> Result<SetScalesRequest> {
        SetScalesRequest::new(self.scale_x, self.scale_y)
    }

    /// Body for a forecast overlay or download request
    pub fn forecast_request(&self) -> Result<ForecastRequest> {
        let time = self.submitted_time("forecast request")?;
        Ok(ForecastRequest {
            selected_time: time.target_time_compact(),
            lead_time: time.lead_time,
            forecast_cycle: time.forecast_cycle,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            row_min: self.region.row_min,
            row_max: self.region.row_max,
            col_min: self.region.col_min,
            col_max: self.region.col_max,
            lead_time_end: time.lead_time_end,
            range_mode: time.range_mode,
        })
    }
}
