//! Mediator wiring the widgets to the shared application state
//!
//! The [`Controller`] owns every widget and registers the couplings between
//! them at construction:
//!
//! | Producer                         | Key                            | Effect                         |
//! |----------------------------------|--------------------------------|--------------------------------|
//! | `ScaleConfig::on_set`            | `scale-config-cache-update`    | committed scales into state    |
//! | `RegionSelector::on_set`         | `region-selector-cache-update` | committed region into state    |
//! | `TimeConfig::on_submit`          | `time-config-cache-update`     | submitted time into state      |
//! | `TimeConfig::display_select`     | `animation-control-sync`       | animation slider follows span  |
//! | `AnimationControl::on_range_change` | `forecast-layer-timestep`   | displayed lead time into state |
//!
//! Widgets update their own values before firing, so handlers always see
//! the new state.

use crate::callbacks::CallbackRegistry;
use crate::config::ControlsConfig;
use crate::render::color::ColorMethod;
use crate::render::gridlines::{CANDIDATE_COLOR, REGION_COLOR};
use crate::render::{
    apply_values, build_cell_features, color_cells, region_outline, CellFeature, Gridlines,
    LineFeature,
};
use crate::requests::{ForecastRequest, ForecastResponse, RequestTracker, ResumeSession};
use crate::state::AppState;
use crate::range::Bounds;
use crate::types::{parse_date, RegionBoundArgs, Result, ScaleArgs, TimeSelection};
use crate::widgets::{AnimationControl, RegionSelector, ScaleConfig, TimeArgs, TimeConfig};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

pub const SCALE_CACHE_KEY: &str = "scale-config-cache-update";
pub const REGION_CACHE_KEY: &str = "region-selector-cache-update";
pub const TIME_CACHE_KEY: &str = "time-config-cache-update";
pub const ANIMATION_SYNC_KEY: &str = "animation-control-sync";
pub const TIMESTEP_KEY: &str = "forecast-layer-timestep";

/// Owner of all widgets and the shared [`AppState`]
#[derive(Debug)]
pub struct Controller {
    state: Rc<RefCell<AppState>>,
    scale: ScaleConfig,
    region: RegionSelector,
    time: TimeConfig,
    animation: Rc<RefCell<AnimationControl>>,
    requests: RequestTracker,
    gridlines: Option<Gridlines>,
    color_method: ColorMethod,
}

impl Controller {
    /// Build every widget from `config` and wire them together
    pub fn new(config: &ControlsConfig) -> Result<Self> {
        let mut scale = ScaleConfig::new(&config.scale)?;
        let mut region = RegionSelector::new(&config.region)?;
        let mut time = TimeConfig::new(&config.time)?;
        let animation = Rc::new(RefCell::new(AnimationControl::new(&config.animation)?));

        let (scale_x, scale_y) = scale.committed();
        let state = Rc::new(RefCell::new(AppState::new(
            scale_x,
            scale_y,
            region.committed(),
        )));

        let s = state.clone();
        scale.on_set.add(SCALE_CACHE_KEY, move |args: &ScaleArgs| {
            s.borrow_mut().apply_scales(*args)
        })?;

        let s = state.clone();
        region.on_set.add(REGION_CACHE_KEY, move |args: &RegionBoundArgs| {
            s.borrow_mut().apply_region(*args)
        })?;

        let s = state.clone();
        time.on_submit.add(TIME_CACHE_KEY, move |selection: &TimeSelection| {
            s.borrow_mut().apply_time_selection(selection)
        })?;

        let a = animation.clone();
        let lead_step = time.lead_range().bounds().step;
        time.display_select.add(ANIMATION_SYNC_KEY, move |selection: &TimeSelection| {
            a.borrow_mut().sync_with(selection, lead_step)
        })?;

        let s = state.clone();
        animation
            .borrow_mut()
            .on_range_change
            .add(TIMESTEP_KEY, move |lead: &i64| {
                s.borrow_mut().displayed_lead_time = Some(*lead)
            })?;

        log::info!("Controller ready");
        Ok(Self {
            state,
            scale,
            region,
            time,
            animation,
            requests: RequestTracker::new(),
            gridlines: None,
            color_method: ColorMethod::default(),
        })
    }

    pub fn scale(&self) -> &ScaleConfig {
        &self.scale
    }

    pub fn scale_mut(&mut self) -> &mut ScaleConfig {
        &mut self.scale
    }

    pub fn region(&self) -> &RegionSelector {
        &self.region
    }

    pub fn region_mut(&mut self) -> &mut RegionSelector {
        &mut self.region
    }

    pub fn time(&self) -> &TimeConfig {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut TimeConfig {
        &mut self.time
    }

    pub fn animation(&self) -> Ref<'_, AnimationControl> {
        self.animation.borrow()
    }

    pub fn animation_mut(&mut self) -> RefMut<'_, AnimationControl> {
        self.animation.borrow_mut()
    }

    pub fn requests_mut(&mut self) -> &mut RequestTracker {
        &mut self.requests
    }

    pub fn set_color_method(&mut self, method: ColorMethod) {
        self.color_method = method;
    }

    /// Snapshot of the shared state
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Register an extra subscriber for committed scale changes
    pub fn scale_set_callbacks(&mut self) -> &mut CallbackRegistry<ScaleArgs> {
        &mut self.scale.on_set
    }

    pub fn forecast_request(&self) -> Result<ForecastRequest> {
        self.state.borrow().forecast_request()
    }

    /// Cache a forecast response for the submitted lead time
    pub fn store_forecast(&mut self, response: ForecastResponse) {
        let mut state = self.state.borrow_mut();
        let lead_time = state.time.map_or(self.time.lead_time(), |t| t.lead_time);
        state.store_forecast(response, lead_time);
    }

    /// Adopt a new grid: region slider domains follow its size and scale
    pub fn apply_gridlines(&mut self, gridlines: Gridlines) -> Result<()> {
        let (rows, cols) = gridlines.region_domain()?;
        self.region.set_slider_bounds(rows, cols)?;
        log::info!(
            "Grid loaded: {} horizontal, {} vertical lines",
            gridlines.horiz_gridlines.len(),
            gridlines.vert_gridlines.len()
        );
        self.gridlines = Some(gridlines);
        Ok(())
    }

    pub fn gridlines(&self) -> Option<&Gridlines> {
        self.gridlines.as_ref()
    }

    /// Outline of the committed region on the current grid
    pub fn region_outline(&self) -> Vec<LineFeature> {
        self.outline(false)
    }

    /// Outline of the uncommitted selection on the current grid
    pub fn candidate_outline(&self) -> Vec<LineFeature> {
        self.outline(true)
    }

    fn outline(&self, candidate: bool) -> Vec<LineFeature> {
        let Some(gridlines) = &self.gridlines else {
            return Vec::new();
        };
        let (bounds, color) = if candidate {
            (self.region.selection(), CANDIDATE_COLOR)
        } else {
            (self.region.committed(), REGION_COLOR)
        };
        region_outline(
            gridlines,
            &bounds,
            self.region.rows().bounds().step,
            self.region.cols().bounds().step,
            color,
        )
    }

    /// Cached cell values for one lead time
    pub fn timestep_values_for(&self, lead_time: i64) -> Option<Vec<f64>> {
        let state = self.state.borrow();
        let values = state.data.values_for(lead_time).map(<[f64]>::to_vec);
        if values.is_none() {
            log::warn!("Timestep {lead_time} not found in cached forecast data");
        }
        values
    }

    /// Colored cells for the lead time currently on display
    pub fn forecast_cells(&self) -> Vec<CellFeature> {
        let state = self.state.borrow();
        let mut cells = build_cell_features(&state.data.geometry);
        let values = state
            .display_lead_time()
            .and_then(|lead| state.data.values_for(lead));
        match values {
            Some(values) => apply_values(&mut cells, values),
            None => apply_values(&mut cells, &[]),
        }
        color_cells(&mut cells, self.color_method);
        cells
    }

    /// Restore a previous session into the widgets and the state
    ///
    /// Widget values are set programmatically so no submit is triggered;
    /// committed values reach the state through the usual set handlers.
    pub fn resume(&mut self, session: ResumeSession) -> Result<()> {
        if let Some(selected_time) = &session.selected_time {
            let args = TimeArgs {
                target_time: parse_date(selected_time)?,
                lead_time: session.lead_time.unwrap_or(self.time.lead_time()),
                forecast_cycle: session
                    .forecast_cycle
                    .unwrap_or(self.time.forecast_cycle()),
                range_mode: session.range_mode,
                lead_time_end: session.lead_time_end,
            };
            log::info!("Resuming time selection {:?}", args);
            self.time.externally_set_full(args);
            if let Some(selection) = self.time.selected() {
                self.state.borrow_mut().apply_time_selection(selection);
            }
        }

        if session.scale_x.is_some() || session.scale_y.is_some() {
            self.scale.set_full(ScaleArgs {
                x_scale: session.scale_x,
                y_scale: session.scale_y,
            })?;
        }

        if let Some(region) = session.region() {
            if let Some(domain) = session.region_domain() {
                // Rows step by the y scale and columns by the x scale, as on the grid
                let (scale_x, scale_y) = self.scale.committed();
                self.region.set_slider_bounds(
                    Bounds::new(domain.row_min, domain.row_max, scale_y)?,
                    Bounds::new(domain.col_min, domain.col_max, scale_x)?,
                )?;
            }
            self.region.set_full(region.into())?;
        }

        if let Some(forecast) = session.forecast() {
            match forecast {
                Ok(response) => self.store_forecast(response),
                Err(e) => log::error!("Could not decode resumed forecast data: {e}"),
            }
        }
        Ok(())
    }
}
