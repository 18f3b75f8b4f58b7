//! Scripted session replay
//!
//! A script is a list of [`Action`]s, each standing for one user gesture on
//! the controls. Committing actions also inform the backend when one is
//! configured, the same way the viewer pushes committed values to its
//! server. A failing step is logged and recorded; the replay continues.

use crate::backend::Backend;
use anyhow::{anyhow, Context, Result};
use forecast_controls::render::{ColorMethod, Gridlines};
use forecast_controls::requests::SetRegionRequest;
use forecast_controls::types::parse_date;
use forecast_controls::{Controller, ForecastResponse, ResourceKind, ResumeSession};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// One user gesture
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    // Time settings
    SelectTargetDate { date: String },
    SelectLeadTime { value: i64 },
    SelectLeadTimeEnd { value: i64 },
    SelectForecastCycle { value: i64 },
    SetRangeMode { enabled: bool },
    SubmitTime,

    // Scale
    SelectScaleX { value: i64 },
    SelectScaleY { value: i64 },
    LockScales { locked: bool },
    SetScales,

    // Region
    SelectRegion {
        row_min: Option<i64>,
        row_max: Option<i64>,
        col_min: Option<i64>,
        col_max: Option<i64>,
    },
    SetRegion,

    // Animation
    SetAnimationValue { value: i64 },
    Play,
    Stop,
    Wait { ms: i64 },
    SetInterval { ms: i64 },

    // Backend data
    FetchGridlines,
    FetchForecast,
    Download { path: PathBuf },
    Resume,

    SetColorMethod { method: ColorMethod },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum StepOutcome {
    Done(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub action: Action,
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn failed(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed(_))
    }
}

/// A controller driven by scripted actions
pub struct Session {
    controller: Controller,
    backend: Option<Backend>,
    steps: Vec<StepRecord>,
}

impl Session {
    pub fn new(controller: Controller, backend: Option<Backend>) -> Self {
        Self {
            controller,
            backend,
            steps: Vec::new(),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| s.failed()).count()
    }

    /// Replay `actions` in order
    pub fn run(&mut self, actions: &[Action]) {
        for action in actions {
            let index = self.steps.len() + 1;
            let outcome = match self.apply(action) {
                Ok(detail) => {
                    log::info!("Step {index}: {detail}");
                    StepOutcome::Done(detail)
                }
                Err(e) => {
                    log::error!("Step {index} ({action:?}) failed: {e:#}");
                    StepOutcome::Failed(format!("{e:#}"))
                }
            };
            self.steps.push(StepRecord {
                index,
                action: action.clone(),
                outcome,
            });
        }
    }

    /// Perform one action, returning a short description of the result
    pub fn apply(&mut self, action: &Action) -> Result<String> {
        let c = &mut self.controller;
        match action {
            Action::SelectTargetDate { date } => {
                let date = c.time_mut().select_target_time(parse_date(date)?);
                Ok(format!("target date {date}"))
            }
            Action::SelectLeadTime { value } => {
                let applied = c.time_mut().select_lead_time(*value);
                Ok(format!("lead time {applied}"))
            }
            Action::SelectLeadTimeEnd { value } => {
                let applied = c.time_mut().select_lead_time_end(*value);
                Ok(format!("lead time end {applied}"))
            }
            Action::SelectForecastCycle { value } => {
                let applied = c.time_mut().select_forecast_cycle(*value);
                Ok(format!("forecast cycle {applied}"))
            }
            Action::SetRangeMode { enabled } => {
                c.time_mut().set_range_mode(*enabled);
                Ok(format!("range mode {enabled}"))
            }
            Action::SubmitTime => {
                let selection = c.time_mut().submit();
                let body = serde_json::to_value(c.state().set_time_request()?)?;
                self.push(ResourceKind::SetTime, &body)?;
                Ok(format!("submitted {selection}"))
            }
            Action::SelectScaleX { value } => {
                let applied = c.scale_mut().select_x(*value);
                Ok(format!("scale x {applied}"))
            }
            Action::SelectScaleY { value } => {
                let applied = c.scale_mut().select_y(*value);
                Ok(format!("scale y {applied}"))
            }
            Action::LockScales { locked } => {
                c.scale_mut().toggle_lock(*locked);
                Ok(format!("scale lock {locked}"))
            }
            Action::SetScales => {
                c.scale_mut().commit();
                let request = c.state().set_scales_request()?;
                let body = serde_json::to_value(request)?;
                self.push(ResourceKind::SetScales, &body)?;
                Ok(format!("scales {}x{}", request.scale_x, request.scale_y))
            }
            Action::SelectRegion {
                row_min,
                row_max,
                col_min,
                col_max,
            } => {
                let region = c.region_mut();
                if let Some(v) = row_min {
                    region.select_row_min(*v);
                }
                if let Some(v) = row_max {
                    region.select_row_max(*v);
                }
                if let Some(v) = col_min {
                    region.select_col_min(*v);
                }
                if let Some(v) = col_max {
                    region.select_col_max(*v);
                }
                Ok(format!("region selection {:?}", region.selection()))
            }
            Action::SetRegion => {
                let region = c.region_mut().commit();
                let body = serde_json::to_value(SetRegionRequest(region))?;
                self.push(ResourceKind::SetRegion, &body)?;
                Ok(format!("region {region:?}"))
            }
            Action::SetAnimationValue { value } => {
                let applied = c.animation_mut().change_value(*value);
                Ok(format!("animation at lead time {applied}"))
            }
            Action::Play => {
                let mut animation = c.animation_mut();
                if !animation.is_visible() {
                    return Err(anyhow!("no lead time span submitted to animate"));
                }
                animation.start_playback();
                Ok("playback started".to_string())
            }
            Action::Stop => {
                c.animation_mut().stop_playback();
                Ok("playback stopped".to_string())
            }
            Action::Wait { ms } => {
                let ticks = c.animation_mut().advance_ms(*ms)?;
                Ok(format!(
                    "waited {ms} ms, {ticks} tick(s), showing lead time {}",
                    c.animation().value()
                ))
            }
            Action::SetInterval { ms } => {
                c.animation_mut().set_interval_ms(*ms)?;
                Ok(format!("interval {ms} ms"))
            }
            Action::FetchGridlines => {
                let value = self
                    .fetch(ResourceKind::Gridlines, None)?
                    .ok_or_else(|| anyhow!("empty gridline response"))?;
                let gridlines: Gridlines =
                    serde_json::from_value(value).context("Malformed gridline response")?;
                self.controller.apply_gridlines(gridlines)?;
                let rows = self.controller.region().rows().bounds();
                let cols = self.controller.region().cols().bounds();
                Ok(format!("gridlines loaded, rows {rows} cols {cols}"))
            }
            Action::FetchForecast => {
                let body = serde_json::to_value(self.controller.forecast_request()?)?;
                let value = self
                    .fetch(ResourceKind::ForecastOverlay, Some(&body))?
                    .ok_or_else(|| anyhow!("empty forecast response"))?;
                let response =
                    ForecastResponse::from_json(value).context("Malformed forecast response")?;
                let cells = response.geometries.len();
                self.controller.store_forecast(response);
                Ok(format!("forecast for {cells} cells"))
            }
            Action::Download { path } => {
                let body = serde_json::to_value(self.controller.forecast_request()?)?;
                let backend = self.backend()?;
                let token = self.controller.requests_mut().begin(ResourceKind::Download);
                let bytes = match backend.download(&body) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        self.controller.requests_mut().cancel(token);
                        return Err(e.into());
                    }
                };
                let Some(bytes) = self.controller.requests_mut().finish(token, bytes) else {
                    return Ok("download superseded".to_string());
                };
                fs::write(path, &bytes)
                    .with_context(|| format!("Failed to write download to {:?}", path))?;
                Ok(format!("downloaded {} bytes to {:?}", bytes.len(), path))
            }
            Action::Resume => match self.fetch(ResourceKind::ResumeSession, None)? {
                None => Ok("nothing to resume".to_string()),
                Some(value) => {
                    let session: ResumeSession =
                        serde_json::from_value(value).context("Malformed resume session")?;
                    self.controller.resume(session)?;
                    Ok("session resumed".to_string())
                }
            },
            Action::SetColorMethod { method } => {
                c.set_color_method(*method);
                Ok(format!("color method {method:?}"))
            }
        }
    }

    fn backend(&self) -> Result<Backend> {
        self.backend
            .clone()
            .ok_or_else(|| anyhow!("no backend configured"))
    }

    /// Request data the step cannot continue without
    fn fetch(&mut self, kind: ResourceKind, body: Option<&Value>) -> Result<Option<Value>> {
        let backend = self.backend()?;
        let token = self.controller.requests_mut().begin(kind);
        match backend.call(kind, body) {
            Ok(value) => Ok(self.controller.requests_mut().finish(token, value).flatten()),
            Err(e) => {
                self.controller.requests_mut().cancel(token);
                Err(e.into())
            }
        }
    }

    /// Inform the backend of a committed value; offline sessions skip this
    fn push(&mut self, kind: ResourceKind, body: &Value) -> Result<()> {
        if self.backend.is_none() {
            log::debug!("Offline, {kind} not sent");
            return Ok(());
        }
        self.fetch(kind, Some(body)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_controls::{ControlsConfig, RegionBounds};

    fn session() -> Session {
        Session::new(Controller::new(&ControlsConfig::default()).unwrap(), None)
    }

    #[test]
    fn test_offline_replay_updates_state() {
        let mut s = session();
        s.run(&[
            Action::SetRangeMode { enabled: true },
            Action::SelectLeadTime { value: 2 },
            Action::SelectLeadTimeEnd { value: 4 },
            Action::SubmitTime,
            Action::SelectScaleX { value: 8 },
            Action::SetScales,
            Action::SelectRegion {
                row_min: Some(640),
                row_max: None,
                col_min: None,
                col_max: Some(2432),
            },
            Action::SetRegion,
        ]);

        assert_eq!(s.failures(), 0);
        let state = s.controller().state();
        let time = state.time.unwrap();
        assert_eq!((time.lead_time, time.lead_time_end), (2, Some(4)));
        assert_eq!((state.scale_x, state.scale_y), (8, 8));
        assert_eq!(state.region, RegionBounds::new(640, 1264, 1952, 2432));
    }

    #[test]
    fn test_failed_step_does_not_stop_replay() {
        let mut s = session();
        s.run(&[
            Action::FetchForecast,
            Action::SubmitTime,
            Action::FetchForecast,
            Action::SelectForecastCycle { value: 6 },
        ]);

        let steps = s.steps();
        assert_eq!(steps.len(), 4);
        // No submit yet
        assert!(steps[0].failed());
        assert!(!steps[1].failed());
        // Submitted, but no backend to ask
        assert!(matches!(&steps[2].outcome, StepOutcome::Failed(msg) if msg.contains("no backend")));
        assert!(!steps[3].failed());
        assert_eq!(s.failures(), 2);
    }

    #[test]
    fn test_animation_script() {
        let mut s = session();
        s.run(&[
            Action::Play,
            Action::SetRangeMode { enabled: true },
            Action::SelectLeadTimeEnd { value: 3 },
            Action::SubmitTime,
            Action::SetInterval { ms: 500 },
            Action::Play,
            Action::Wait { ms: 1000 },
        ]);

        // Nothing to animate before a span is submitted
        assert!(s.steps()[0].failed());
        assert_eq!(s.failures(), 1);
        assert_eq!(s.controller().animation().value(), 3);
        assert_eq!(s.controller().state().displayed_lead_time, Some(3));
    }

    #[test]
    fn test_invalid_date_fails_step() {
        let mut s = session();
        s.run(&[Action::SelectTargetDate {
            date: "not-a-date".to_string(),
        }]);
        assert!(s.steps()[0].failed());
    }
}
