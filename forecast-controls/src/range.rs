//! Paired start/end range with an ordering and spacing invariant
//!
//! A [`PairedRange`] keeps `min <= start`, `start + spacing <= end` and
//! `end <= max` at all times. Spacing is expressed in steps, so it follows
//! the step size when bounds are reconfigured.
//!
//! When an update would break the invariant, the [`ResolutionPolicy`]
//! decides who gives way:
//! - `Constrain`: the moved value stops next to its counterpart.
//! - `Propagate`: the moved value is accepted and pushes its counterpart.

use crate::types::{AppliedValues, ControlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain of a slider: `[min, max]` in increments of `step` from `min`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl Bounds {
    /// Create validated bounds
    pub fn new(min: i64, max: i64, step: i64) -> Result<Self> {
        if step <= 0 {
            return Err(ControlError::InvalidBounds(format!(
                "step must be positive, got {step}"
            )));
        }
        if min > max {
            return Err(ControlError::InvalidBounds(format!(
                "min {min} is greater than max {max}"
            )));
        }
        Ok(Self { min, max, step })
    }

    /// Largest value reachable from `min` in whole steps
    pub fn top(&self) -> i64 {
        self.min + ((self.max - self.min) / self.step) * self.step
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Clamp into the domain and snap to the nearest step (halves round up)
    pub fn align(&self, value: i64) -> i64 {
        let clamped = value.clamp(self.min, self.max);
        let offset = clamped - self.min;
        let steps = (offset + self.step / 2) / self.step;
        let aligned = self.min + steps * self.step;
        if aligned > self.max {
            aligned - self.step
        } else {
            aligned
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] step {}", self.min, self.max, self.step)
    }
}

/// What happens when an update would violate the spacing invariant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPolicy {
    /// Reject the offending delta; the counterpart does not move
    Constrain,
    /// Accept the moved value and push the counterpart along
    #[default]
    Propagate,
}

/// Two coupled values kept in order with a minimum spacing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedRange {
    bounds: Bounds,
    start: i64,
    end: i64,
    spacing_steps: i64,
    policy: ResolutionPolicy,
}

impl PairedRange {
    /// Create a range and normalize the initial pair into the invariant
    ///
    /// Fails if the domain is too narrow to hold the required spacing.
    pub fn new(
        bounds: Bounds,
        start: i64,
        end: i64,
        spacing_steps: i64,
        policy: ResolutionPolicy,
    ) -> Result<Self> {
        if spacing_steps < 0 {
            return Err(ControlError::InvalidRange(format!(
                "spacing must not be negative, got {spacing_steps} steps"
            )));
        }
        check_width(&bounds, spacing_steps)?;
        let mut range = Self {
            bounds,
            start: bounds.align(start),
            end: bounds.align(end),
            spacing_steps,
            policy,
        };
        range.repair();
        Ok(range)
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ResolutionPolicy) {
        self.policy = policy;
    }

    /// Minimum distance between start and end
    pub fn spacing(&self) -> i64 {
        self.spacing_steps * self.bounds.step
    }

    pub fn applied(&self) -> AppliedValues {
        AppliedValues::new(self.start, self.end)
    }

    /// Replace the domain, re-clamping and re-aligning both values
    ///
    /// Calling this twice with the same arguments is the same as once.
    pub fn configure_bounds(&mut self, min: i64, max: i64, step: i64) -> Result<()> {
        let bounds = Bounds::new(min, max, step)?;
        check_width(&bounds, self.spacing_steps)?;

        self.bounds = bounds;
        self.start = bounds.align(self.start);
        self.end = bounds.align(self.end);
        self.repair();
        log::debug!("Range reconfigured to {}: {}", bounds, self.applied());
        Ok(())
    }

    /// Move the start value, resolving conflicts per the policy
    pub fn set_start(&mut self, value: i64) -> AppliedValues {
        let candidate = self.align_logged(value);
        let spacing = self.spacing();
        match self.policy {
            ResolutionPolicy::Constrain => {
                self.start = candidate.min(self.end - spacing);
            }
            ResolutionPolicy::Propagate => {
                self.start = candidate.min(self.bounds.top() - spacing);
                if self.start + spacing > self.end {
                    self.end = self.start + spacing;
                }
            }
        }
        self.applied()
    }

    /// Move the end value, resolving conflicts per the policy
    pub fn set_end(&mut self, value: i64) -> AppliedValues {
        let candidate = self.align_logged(value);
        let spacing = self.spacing();
        match self.policy {
            ResolutionPolicy::Constrain => {
                self.end = candidate.max(self.start + spacing);
            }
            ResolutionPolicy::Propagate => {
                self.end = candidate.max(self.bounds.min + spacing);
                if self.end - spacing < self.start {
                    self.start = self.end - spacing;
                }
            }
        }
        self.applied()
    }

    /// Move both values to `value`, keeping the minimum spacing above it
    pub fn set_point(&mut self, value: i64) -> AppliedValues {
        let spacing = self.spacing();
        let start = self.align_logged(value).min(self.bounds.top() - spacing);
        self.start = start;
        self.end = start + spacing;
        self.applied()
    }

    /// Replace both values at once, then restore the invariant
    pub fn set_both(&mut self, start: i64, end: i64) -> AppliedValues {
        self.start = self.align_logged(start);
        self.end = self.align_logged(end);
        self.repair();
        self.applied()
    }

    fn align_logged(&self, value: i64) -> i64 {
        let aligned = self.bounds.align(value);
        if aligned != value {
            log::debug!("Clamped {} to {} within {}", value, aligned, self.bounds);
        }
        aligned
    }

    /// Restore `start + spacing <= end` after both values were aligned
    fn repair(&mut self) {
        let spacing = self.spacing();
        if self.start > self.end {
            std::mem::swap(&mut self.start, &mut self.end);
        }
        if self.start + spacing > self.end {
            self.end = (self.start + spacing).min(self.bounds.top());
        }
        if self.start + spacing > self.end {
            self.start = self.end - spacing;
        }
    }
}

fn check_width(bounds: &Bounds, spacing_steps: i64) -> Result<()> {
    let spacing = spacing_steps * bounds.step;
    if bounds.top() - bounds.min < spacing {
        return Err(ControlError::InvalidBounds(format!(
            "{bounds} cannot hold a spacing of {spacing}"
        )));
    }
    Ok(())
}
