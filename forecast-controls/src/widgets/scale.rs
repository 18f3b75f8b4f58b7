//! Data scale settings: x/y block sizes with an optional axis lock

use crate::callbacks::CallbackRegistry;
use crate::config::ScaleConfigDefaults;
use crate::slider::CommitSlider;
use crate::types::{ControlError, Result, ScaleArgs};

/// Scale axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// X and Y scale sliders that can be locked together
///
/// Both sliders are driven silently; subscribers listen on the widget's own
/// `on_selection` and `on_set`, which carry both axes in one event. The
/// per-slider registries stay empty.
#[derive(Debug)]
pub struct ScaleConfig {
    x: CommitSlider,
    y: CommitSlider,
    locked: bool,
    /// Axis moved last while unlocked; `None` once both moved together
    most_recently_set: Option<Axis>,
    pub on_selection: CallbackRegistry<ScaleArgs>,
    pub on_set: CallbackRegistry<ScaleArgs>,
}

impl ScaleConfig {
    pub fn new(defaults: &ScaleConfigDefaults) -> Result<Self> {
        let bounds = defaults.slider.bounds()?;
        Ok(Self {
            x: CommitSlider::new("x-scale", bounds, defaults.slider.value),
            y: CommitSlider::new("y-scale", bounds, defaults.slider.value),
            locked: defaults.locked,
            most_recently_set: None,
            on_selection: CallbackRegistry::new("ScaleConfig.on_selection"),
            on_set: CallbackRegistry::new("ScaleConfig.on_set"),
        })
    }

    pub fn x(&self) -> &CommitSlider {
        &self.x
    }

    pub fn y(&self) -> &CommitSlider {
        &self.y
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn most_recently_set(&self) -> Option<Axis> {
        self.most_recently_set
    }

    /// Current selection as `(x, y)`
    pub fn selection(&self) -> (i64, i64) {
        (self.x.selection(), self.y.selection())
    }

    /// Committed scales as `(x, y)`
    pub fn committed(&self) -> (i64, i64) {
        (self.x.committed(), self.y.committed())
    }

    /// User moves one axis; with the lock on both axes follow
    pub fn select(&mut self, axis: Axis, value: i64) -> i64 {
        if self.locked {
            let value = self.x.set_selection_silently(value);
            self.y.set_selection_silently(value);
            self.most_recently_set = None;
            self.on_selection.trigger(&ScaleArgs::both(value));
            return value;
        }

        let args = match axis {
            Axis::X => ScaleArgs {
                x_scale: Some(self.x.set_selection_silently(value)),
                y_scale: None,
            },
            Axis::Y => ScaleArgs {
                x_scale: None,
                y_scale: Some(self.y.set_selection_silently(value)),
            },
        };
        let value = args.x_scale.or(args.y_scale).unwrap_or(value);
        self.most_recently_set = Some(axis);
        self.on_selection.trigger(&args);
        value
    }

    pub fn select_x(&mut self, value: i64) -> i64 {
        self.select(Axis::X, value)
    }

    pub fn select_y(&mut self, value: i64) -> i64 {
        self.select(Axis::Y, value)
    }

    /// Toggle the axis lock
    ///
    /// Locking copies the most recently moved axis onto the other one.
    pub fn toggle_lock(&mut self, locked: bool) {
        self.locked = locked;
        if !locked {
            return;
        }
        let source = match self.most_recently_set {
            Some(Axis::X) => Some(self.x.selection()),
            Some(Axis::Y) => Some(self.y.selection()),
            None => None,
        };
        if let Some(value) = source {
            self.x.set_selection_silently(value);
            self.y.set_selection_silently(value);
            self.on_selection.trigger(&ScaleArgs::both(value));
        }
        self.most_recently_set = None;
    }

    /// The "Set Scale" action: commit both axes and publish them together
    pub fn commit(&mut self) -> ScaleArgs {
        self.x.set_committed_silently(self.x.selection());
        self.y.set_committed_silently(self.y.selection());
        let args = ScaleArgs {
            x_scale: Some(self.x.committed()),
            y_scale: Some(self.y.committed()),
        };
        log::info!(
            "Scale set to {}x{}",
            self.x.committed(),
            self.y.committed()
        );
        self.on_set.trigger(&args);
        args
    }

    /// Replace selection values without touching committed ones
    pub fn set_selection(&mut self, args: ScaleArgs) -> Result<()> {
        check_args(&args, "ScaleConfig::set_selection")?;
        let applied = ScaleArgs {
            x_scale: args.x_scale.map(|x| self.x.set_selection_silently(x)),
            y_scale: args.y_scale.map(|y| self.y.set_selection_silently(y)),
        };
        self.on_selection.trigger(&applied);
        Ok(())
    }

    /// Replace committed values without touching selections
    pub fn set_committed(&mut self, args: ScaleArgs) -> Result<()> {
        check_args(&args, "ScaleConfig::set_committed")?;
        let applied = ScaleArgs {
            x_scale: args.x_scale.map(|x| self.x.set_committed_silently(x)),
            y_scale: args.y_scale.map(|y| self.y.set_committed_silently(y)),
        };
        self.on_set.trigger(&applied);
        Ok(())
    }

    /// Replace both selection and committed values
    pub fn set_full(&mut self, args: ScaleArgs) -> Result<()> {
        self.set_selection(args)?;
        self.set_committed(args)
    }
}

fn check_args(args: &ScaleArgs, operation: &'static str) -> Result<()> {
    if args.x_scale.is_none() && args.y_scale.is_none() {
        log::error!("No scale values provided to {operation}");
        return Err(ControlError::EmptyUpdate(operation));
    }
    Ok(())
}
