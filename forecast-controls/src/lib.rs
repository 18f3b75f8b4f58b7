//! Forecast Controls Library
//!
//! The control core of a gridded precipitation forecast viewer: the widgets
//! a user drives to pick a forecast time, a grid scale and a region of
//! interest, and the state and requests derived from those choices.
//!
//! # Architecture
//!
//! - [`CallbackRegistry`] is the keyed fan-out every widget publishes through
//! - [`PairedRange`] keeps a `[start, end]` pair aligned and spaced
//! - [`CommitSlider`] separates a tentative selection from a committed value
//! - The widgets ([`ScaleConfig`], [`RegionSelector`], [`TimeConfig`],
//!   [`AnimationControl`]) are built from these pieces
//! - [`Controller`] owns the widgets and routes committed values into the
//!   shared [`AppState`]
//!
//! The library does NOT:
//! - Talk to the backend (request bodies are plain serde types)
//! - Draw anything (the `render` module produces colors and GeoJSON)
//! - Run timers (animation playback is driven by elapsed time)
//!
//! # Example Usage
//!
//! ```no_run
//! use forecast_controls::{Controller, ControlsConfig};
//!
//! let config = ControlsConfig::new().with_target_date("2025-07-04").unwrap();
//! let mut controller = Controller::new(&config).unwrap();
//!
//! controller.time_mut().select_lead_time(3);
//! controller.time_mut().submit();
//! controller.region_mut().select_row_max(1280);
//! controller.region_mut().commit();
//!
//! let request = controller.forecast_request().unwrap();
//! println!("{}", serde_json::to_string(&request).unwrap());
//! ```

// Public modules
pub mod callbacks;
pub mod config;
pub mod controller;
pub mod range;
pub mod render;
pub mod requests;
pub mod slider;
pub mod state;
pub mod types;
pub mod widgets;

// Re-export main types for convenience
pub use callbacks::{CallbackKey, CallbackRegistry, Handler};
pub use config::{
    AnimationConfigDefaults, ControlsConfig, RangeConfig, RegionConfigDefaults,
    ScaleConfigDefaults, SliderConfig, TimeConfigDefaults,
};
pub use controller::Controller;
pub use range::{Bounds, PairedRange, ResolutionPolicy};
pub use requests::{
    ForecastRequest, ForecastResponse, RequestToken, RequestTracker, ResourceKind, ResumeSession,
};
pub use slider::{CommitSlider, ExternalUpdate};
pub use state::{AppState, DataCache};
pub use types::{
    AppliedValues, ControlError, RegionBoundArgs, RegionBounds, Result, ScaleArgs, TimeSelection,
};
pub use widgets::{AnimationControl, Axis, RegionSelector, ScaleConfig, TimeArgs, TimeConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: default controls build and wire up
        let controller = Controller::new(&ControlsConfig::default()).unwrap();
        assert_eq!(controller.state().scale_x, 16);
        assert!(controller.state().time.is_none());
    }
}
