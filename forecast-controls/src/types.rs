//! Core types for the forecast control library
//!
//! This module defines the error type shared by every component and the
//! plain value types that flow through callbacks: applied range values,
//! region bounds, scale arguments and submitted time selections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur while manipulating controls
///
/// Usage errors (duplicate keys, empty updates) are "soft": the operation is
/// a no-op and the error is both logged and returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("Callback with key '{0}' already exists")]
    DuplicateCallback(String),

    #[error("No callback found for key '{0}'")]
    MissingCallback(String),

    #[error("No values or configuration provided to {0}")]
    EmptyUpdate(&'static str),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid playback interval: {0} ms")]
    InvalidInterval(i64),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
}

/// Both values of a paired range after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedValues {
    pub start: i64,
    pub end: i64,
}

impl AppliedValues {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for AppliedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

/// A complete region selection in grid cell indices
///
/// Minimums are inclusive, maximums exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionBounds {
    pub row_min: i64,
    pub row_max: i64,
    pub col_min: i64,
    pub col_max: i64,
}

impl RegionBounds {
    pub fn new(row_min: i64, row_max: i64, col_min: i64, col_max: i64) -> Self {
        Self {
            row_min,
            row_max,
            col_min,
            col_max,
        }
    }

    pub fn rows(&self) -> i64 {
        self.row_max - self.row_min
    }

    pub fn cols(&self) -> i64 {
        self.col_max - self.col_min
    }
}

/// A partial region update, `None` meaning "unchanged"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionBoundArgs {
    pub row_min: Option<i64>,
    pub row_max: Option<i64>,
    pub col_min: Option<i64>,
    pub col_max: Option<i64>,
}

impl RegionBoundArgs {
    pub fn is_empty(&self) -> bool {
        self.row_min.is_none()
            && self.row_max.is_none()
            && self.col_min.is_none()
            && self.col_max.is_none()
    }
}

impl From<RegionBounds> for RegionBoundArgs {
    fn from(bounds: RegionBounds) -> Self {
        Self {
            row_min: Some(bounds.row_min),
            row_max: Some(bounds.row_max),
            col_min: Some(bounds.col_min),
            col_max: Some(bounds.col_max),
        }
    }
}

/// Scale factors, `None` meaning "unchanged"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleArgs {
    pub x_scale: Option<i64>,
    pub y_scale: Option<i64>,
}

impl ScaleArgs {
    pub fn both(value: i64) -> Self {
        Self {
            x_scale: Some(value),
            y_scale: Some(value),
        }
    }
}

/// The time parameters locked in by a submit action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSelection {
    pub target_time: NaiveDate,
    pub lead_time: i64,
    /// Only present when the selection was submitted in range mode
    pub lead_time_end: Option<i64>,
    pub forecast_cycle: i64,
    pub range_mode: bool,
}

impl TimeSelection {
    /// Target date in the `YYYYMMDD` form the backend expects
    pub fn target_time_compact(&self) -> String {
        format_compact_date(self.target_time)
    }

    /// True when more than one lead time is covered
    pub fn is_span(&self) -> bool {
        match self.lead_time_end {
            Some(end) => self.range_mode && self.lead_time < end,
            None => false,
        }
    }
}

impl fmt::Display for TimeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cycle {:02}z ", self.target_time, self.forecast_cycle)?;
        match self.lead_time_end {
            Some(end) if self.is_span() => write!(f, "lead {} to {}", self.lead_time, end),
            _ => write!(f, "lead {}", self.lead_time),
        }
    }
}

/// Format a date as `YYYYMMDD`
pub fn format_compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse a date given either as `YYYYMMDD` or `YYYY-MM-DD`
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    // Inputs like "2025-07-04T00:00" carry a time part we ignore
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y-%m-%d"))
        .map_err(|e| ControlError::InvalidDate(format!("{value}: {e}")))
}
