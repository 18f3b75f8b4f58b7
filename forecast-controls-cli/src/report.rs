//! Report generation
//!
//! Summarizes a replayed session: every step with its outcome, the final
//! control values and the state the backend requests are built from.

use crate::session::{Session, StepOutcome, StepRecord};
use anyhow::Result;
use forecast_controls::render::{
    cells_to_feature_collection, legend_entries, to_feature_collection,
};
use forecast_controls::AppState;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct AnimationSummary {
    pub visible: bool,
    pub playing: bool,
    pub lead_time: i64,
    pub interval_ms: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub version: &'static str,
    pub steps: Vec<StepRecord>,
    pub failures: usize,
    pub state: AppState,
    pub animation: AnimationSummary,
    /// Forecast cells and region outline as GeoJSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Value>,
}

impl Report {
    pub fn new(session: &Session, include_features: bool) -> Self {
        let controller = session.controller();
        let animation = controller.animation();
        let features = include_features.then(|| {
            serde_json::json!({
                "forecast": cells_to_feature_collection(&controller.forecast_cells()),
                "region": to_feature_collection(&controller.region_outline()),
                "legend": legend_entries()
                    .into_iter()
                    .map(|(label, color)| serde_json::json!({"label": label, "color": color.css()}))
                    .collect::<Vec<_>>(),
            })
        });
        Self {
            version: forecast_controls::VERSION,
            steps: session.steps().to_vec(),
            failures: session.failures(),
            state: controller.state(),
            animation: AnimationSummary {
                visible: animation.is_visible(),
                playing: animation.is_playing(),
                lead_time: animation.value(),
                interval_ms: animation.interval_ms(),
            },
            features,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "═══════════════════════════════════════════════")?;
        writeln!(f, "  Forecast Controls - Session Report")?;
        writeln!(f, "═══════════════════════════════════════════════")?;
        writeln!(f)?;

        writeln!(f, "Steps ({} failed):", self.failures)?;
        for step in &self.steps {
            match &step.outcome {
                StepOutcome::Done(detail) => writeln!(f, "  {:>3}. ✓ {}", step.index, detail)?,
                StepOutcome::Failed(reason) => {
                    writeln!(f, "  {:>3}. ✗ {:?}: {}", step.index, step.action, reason)?
                }
            }
        }
        writeln!(f)?;

        writeln!(f, "Time:")?;
        match &self.state.time {
            Some(time) => {
                writeln!(f, "  Target date:    {}", time.target_time)?;
                match time.lead_time_end {
                    Some(end) if time.range_mode => {
                        writeln!(f, "  Lead time:      {}..{} h", time.lead_time, end)?
                    }
                    _ => writeln!(f, "  Lead time:      {} h", time.lead_time)?,
                }
                writeln!(f, "  Forecast cycle: {:02}z", time.forecast_cycle)?;
            }
            None => writeln!(f, "  (not submitted)")?,
        }

        writeln!(f, "Scale:            {}x{}", self.state.scale_x, self.state.scale_y)?;
        let region = &self.state.region;
        writeln!(
            f,
            "Region:           rows {}..{}, cols {}..{}",
            region.row_min, region.row_max, region.col_min, region.col_max
        )?;

        let animation = &self.animation;
        if animation.visible {
            writeln!(
                f,
                "Animation:        lead time {} ({}, {} ms)",
                animation.lead_time,
                if animation.playing { "playing" } else { "paused" },
                animation.interval_ms
            )?;
        }

        let data = &self.state.data;
        if data.is_empty() {
            writeln!(f, "Forecast data:    none")?;
        } else {
            let leads: Vec<String> = data.timestep_values.keys().map(i64::to_string).collect();
            writeln!(
                f,
                "Forecast data:    {} cells, lead time(s) {}",
                data.geometry.len(),
                leads.join(", ")
            )?;
        }
        Ok(())
    }
}
