//! Widget models built on the core primitives
//!
//! Each widget owns its sliders and exposes selection/set registries.
//! Programmatic setters update the inner sliders silently and then fire a
//! single widget-level event, so couplings between widgets never loop.

pub mod animation;
pub mod region;
pub mod scale;
pub mod time;

pub use animation::AnimationControl;
pub use region::RegionSelector;
pub use scale::{Axis, ScaleConfig};
pub use time::{TimeArgs, TimeConfig};
