//! Backend request contract
//!
//! Typed request and response bodies (field names match the backend), the
//! endpoint table, and [`RequestTracker`], which enforces at most one live
//! request per logical resource.

use crate::render::Point;
use crate::types::{ControlError, RegionBounds, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

/// Timeout applied to every backend request unless configured otherwise
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of `POST /set_time`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTimeRequest {
    /// `YYYYMMDD`
    pub target_time: String,
    pub lead_time: i64,
    pub forecast_cycle: i64,
}

/// Body of `POST /set_scales`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScalesRequest {
    #[serde(rename = "scaleX")]
    pub scale_x: i64,
    #[serde(rename = "scaleY")]
    pub scale_y: i64,
}

impl SetScalesRequest {
    pub fn new(scale_x: i64, scale_y: i64) -> Result<Self> {
        if scale_x <= 0 || scale_y <= 0 {
            return Err(ControlError::InvalidRange(format!(
                "scales must be positive, got {scale_x}x{scale_y}"
            )));
        }
        Ok(Self { scale_x, scale_y })
    }
}

/// Body of `POST /set_region_bounds`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetRegionRequest(pub RegionBounds);

/// Body of `POST /get_forecast_precip` and `POST /download_forecast_precip`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// `YYYYMMDD`
    pub selected_time: String,
    pub lead_time: i64,
    pub forecast_cycle: i64,
    #[serde(rename = "scaleX")]
    pub scale_x: i64,
    #[serde(rename = "scaleY")]
    pub scale_y: i64,
    #[serde(rename = "rowMin")]
    pub row_min: i64,
    #[serde(rename = "rowMax")]
    pub row_max: i64,
    #[serde(rename = "colMin")]
    pub col_min: i64,
    #[serde(rename = "colMax")]
    pub col_max: i64,
    pub lead_time_end: Option<i64>,
    pub range_mode: bool,
}

/// Forecast values for a set of cell geometries
///
/// Either a single `values` list or `timestep_values` keyed by lead time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub geometries: Vec<Vec<Point>>,
    #[serde(default)]
    pub values: Option<Vec<f64>>,
    #[serde(default)]
    pub timestep_values: Option<BTreeMap<i64, Vec<f64>>>,
}

impl ForecastResponse {
    /// Parse a response body, which may itself be a JSON-encoded string
    pub fn from_json(value: serde_json::Value) -> std::result::Result<Self, serde_json::Error> {
        match value {
            serde_json::Value::String(inner) => serde_json::from_str(&inner),
            other => serde_json::from_value(other),
        }
    }
}

/// Response of `GET /tryget_resume_session`
///
/// Every field is optional; only the present ones are restored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeSession {
    /// `YYYYMMDD`
    pub selected_time: Option<String>,
    pub lead_time: Option<i64>,
    pub forecast_cycle: Option<i64>,
    pub range_mode: Option<bool>,
    pub lead_time_end: Option<i64>,
    #[serde(rename = "scaleX")]
    pub scale_x: Option<i64>,
    #[serde(rename = "scaleY")]
    pub scale_y: Option<i64>,
    #[serde(rename = "rowMin")]
    pub row_min: Option<i64>,
    #[serde(rename = "rowMax")]
    pub row_max: Option<i64>,
    #[serde(rename = "colMin")]
    pub col_min: Option<i64>,
    #[serde(rename = "colMax")]
    pub col_max: Option<i64>,
    /// Region slider domain
    #[serde(rename = "regionRowMin")]
    pub region_row_min: Option<i64>,
    #[serde(rename = "regionRowMax")]
    pub region_row_max: Option<i64>,
    #[serde(rename = "regionColMin")]
    pub region_col_min: Option<i64>,
    #[serde(rename = "regionColMax")]
    pub region_col_max: Option<i64>,
    /// JSON-encoded [`ForecastResponse`]
    pub forecasted_forcing_data_dict: Option<String>,
}

impl ResumeSession {
    pub fn region(&self) -> Option<RegionBounds> {
        Some(RegionBounds::new(
            self.row_min?,
            self.row_max?,
            self.col_min?,
            self.col_max?,
        ))
    }

    pub fn region_domain(&self) -> Option<RegionBounds> {
        Some(RegionBounds::new(
            self.region_row_min?,
            self.region_row_max?,
            self.region_col_min?,
            self.region_col_max?,
        ))
    }

    /// Decode the embedded forecast data, if any
    pub fn forecast(&self) -> Option<std::result::Result<ForecastResponse, serde_json::Error>> {
        self.forecasted_forcing_data_dict
            .as_deref()
            .map(serde_json::from_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A logical backend resource; requests to one resource supersede each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    SetTime,
    SetScales,
    SetRegion,
    ForecastOverlay,
    Gridlines,
    Download,
    ResumeSession,
}

impl ResourceKind {
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::SetTime => "/set_time",
            ResourceKind::SetScales => "/set_scales",
            ResourceKind::SetRegion => "/set_region_bounds",
            ResourceKind::ForecastOverlay => "/get_forecast_precip",
            ResourceKind::Gridlines => "/get_forecasted_forcing_grid",
            ResourceKind::Download => "/download_forecast_precip",
            ResourceKind::ResumeSession => "/tryget_resume_session",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            ResourceKind::Gridlines | ResourceKind::ResumeSession => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Handle for one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    kind: ResourceKind,
    generation: u64,
}

impl RequestToken {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Tracks the latest request per resource
///
/// Starting a request supersedes any earlier one for the same resource:
/// its result is dropped when it arrives.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: HashMap<ResourceKind, u64>,
    pending: HashMap<ResourceKind, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request for `kind`
    pub fn begin(&mut self, kind: ResourceKind) -> RequestToken {
        let generation = self.latest.get(&kind).map_or(1, |g| g + 1);
        if self.pending.contains_key(&kind) {
            log::debug!("Request to {kind} superseded by generation {generation}");
        }
        self.latest.insert(kind, generation);
        self.pending.insert(kind, generation);
        RequestToken { kind, generation }
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.latest.get(&token.kind) == Some(&token.generation)
    }

    /// Whether a request for `kind` is still outstanding
    pub fn is_pending(&self, kind: ResourceKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Complete a request, keeping its result only if it is still current
    pub fn finish<T>(&mut self, token: RequestToken, value: T) -> Option<T> {
        if !self.is_current(&token) {
            log::info!(
                "Ignoring stale response from {} (generation {})",
                token.kind,
                token.generation
            );
            return None;
        }
        self.pending.remove(&token.kind);
        Some(value)
    }

    /// Abandon a request without a result
    pub fn cancel(&mut self, token: RequestToken) {
        if self.is_current(&token) {
            self.pending.remove(&token.kind);
        }
    }
}
