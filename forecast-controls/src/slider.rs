//! Slider with a live selection value and a committed value
//!
//! The selection follows the user continuously; the committed value only
//! changes when the user commits (the "Set" action) or when a caller sets it
//! explicitly. Downstream consumers treat the committed value as the
//! locked-in configuration.

use crate::callbacks::CallbackRegistry;
use crate::range::Bounds;
use crate::types::{ControlError, Result};

/// Batch update for [`CommitSlider::externally_set`]
///
/// Every field is optional, but at least one must be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternalUpdate {
    pub selection: Option<i64>,
    pub committed: Option<i64>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub step: Option<i64>,
    /// Suppress change/set notifications
    pub silent: bool,
}

impl ExternalUpdate {
    pub fn selection(value: i64) -> Self {
        Self {
            selection: Some(value),
            ..Self::default()
        }
    }

    pub fn committed(value: i64) -> Self {
        Self {
            committed: Some(value),
            ..Self::default()
        }
    }

    pub fn bounds(min: Option<i64>, max: Option<i64>, step: Option<i64>) -> Self {
        Self {
            min,
            max,
            step,
            ..Self::default()
        }
    }

    pub fn silently(mut self) -> Self {
        self.silent = true;
        self
    }

    fn has_values(&self) -> bool {
        self.selection.is_some() || self.committed.is_some()
    }

    fn has_bounds(&self) -> bool {
        self.min.is_some() || self.max.is_some() || self.step.is_some()
    }
}

/// A selection/commit value pair over a bounded, stepped domain
#[derive(Debug)]
pub struct CommitSlider {
    label: String,
    bounds: Bounds,
    selection: i64,
    committed: i64,
    /// Fired with the new selection on live adjustment
    pub on_change: CallbackRegistry<i64>,
    /// Fired with the new committed value
    pub on_set: CallbackRegistry<i64>,
}

impl CommitSlider {
    /// Create a slider whose selection and committed value both start at `value`
    pub fn new(label: impl Into<String>, bounds: Bounds, value: i64) -> Self {
        let value = bounds.align(value);
        Self {
            label: label.into(),
            bounds,
            selection: value,
            committed: value,
            on_change: CallbackRegistry::new("CommitSlider.on_change"),
            on_set: CallbackRegistry::new("CommitSlider.on_set"),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn selection(&self) -> i64 {
        self.selection
    }

    pub fn committed(&self) -> i64 {
        self.committed
    }

    /// True when the selection differs from what was last committed
    pub fn is_dirty(&self) -> bool {
        self.selection != self.committed
    }

    /// Live user adjustment; notifies change subscribers
    pub fn select(&mut self, value: i64) -> i64 {
        self.selection = self.clamp(value);
        self.on_change.trigger(&self.selection);
        self.selection
    }

    /// Lock in the current selection; notifies set subscribers
    pub fn commit(&mut self) -> i64 {
        self.committed = self.selection;
        log::debug!("{}: committed {}", self.label, self.committed);
        self.on_set.trigger(&self.committed);
        self.committed
    }

    /// Move the selection without notifying anyone
    pub fn set_selection_silently(&mut self, value: i64) -> i64 {
        self.selection = self.clamp(value);
        self.selection
    }

    /// Move the committed value without notifying anyone
    pub fn set_committed_silently(&mut self, value: i64) -> i64 {
        self.committed = self.clamp(value);
        self.committed
    }

    /// Replace the domain, re-clamping both values
    pub fn configure(&mut self, min: i64, max: i64, step: i64) -> Result<()> {
        self.bounds = Bounds::new(min, max, step)?;
        self.selection = self.bounds.align(self.selection);
        self.committed = self.bounds.align(self.committed);
        Ok(())
    }

    /// Programmatic batch update of values and/or bounds
    ///
    /// Bounds are applied first so the values land inside the new domain.
    /// With `silent` set no subscriber is notified, which keeps
    /// widget-to-widget couplings from feeding back into each other.
    pub fn externally_set(&mut self, update: ExternalUpdate) -> Result<()> {
        if !update.has_values() && !update.has_bounds() {
            log::error!(
                "{}: no values or configuration provided to externally_set",
                self.label
            );
            return Err(ControlError::EmptyUpdate("externally_set"));
        }

        if update.has_bounds() {
            self.configure(
                update.min.unwrap_or(self.bounds.min),
                update.max.unwrap_or(self.bounds.max),
                update.step.unwrap_or(self.bounds.step),
            )?;
        }
        if let Some(selection) = update.selection {
            self.set_selection_silently(selection);
        }
        if let Some(committed) = update.committed {
            self.set_committed_silently(committed);
        }

        if !update.silent {
            if update.selection.is_some() {
                self.on_change.trigger(&self.selection);
            }
            if update.committed.is_some() {
                self.on_set.trigger(&self.committed);
            }
        }
        Ok(())
    }

    fn clamp(&self, value: i64) -> i64 {
        let aligned = self.bounds.align(value);
        if aligned != value {
            log::debug!(
                "{}: clamped {} to {} within {}",
                self.label,
                value,
                aligned,
                self.bounds
            );
        }
        aligned
    }
}
