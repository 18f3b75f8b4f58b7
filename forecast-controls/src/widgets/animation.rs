//! Lead time animation over a submitted lead time span
//!
//! The slider only exists while the submitted selection covers more than
//! one lead time. Playback advances it one step per interval and wraps
//! around at the end. Time is fed in by the caller through
//! [`AnimationControl::advance_ms`], so the widget never owns a timer.

use crate::callbacks::CallbackRegistry;
use crate::config::AnimationConfigDefaults;
use crate::range::Bounds;
use crate::types::{ControlError, Result, TimeSelection};

#[derive(Debug)]
pub struct AnimationControl {
    visible: bool,
    bounds: Bounds,
    value: i64,
    playing: bool,
    interval_ms: i64,
    /// Time accumulated towards the next tick while playing
    elapsed_ms: i64,
    /// Fired with the lead time to display
    pub on_range_change: CallbackRegistry<i64>,
}

impl AnimationControl {
    pub fn new(defaults: &AnimationConfigDefaults) -> Result<Self> {
        check_interval(defaults.interval_ms)?;
        Ok(Self {
            visible: false,
            bounds: Bounds::new(0, 1, 1)?,
            value: 0,
            playing: false,
            interval_ms: defaults.interval_ms,
            elapsed_ms: 0,
            on_range_change: CallbackRegistry::new("AnimationControl.on_range_change"),
        })
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    /// Follow a newly displayed time selection
    ///
    /// Shows the slider over `[lead_time, lead_time_end]` when the selection
    /// is a span and resets it to the first lead time. Otherwise hides it,
    /// which also stops playback.
    pub fn sync_with(&mut self, selection: &TimeSelection, step: i64) {
        let span = match selection.lead_time_end {
            Some(end) if selection.is_span() => {
                Bounds::new(selection.lead_time, end, step.max(1)).ok()
            }
            _ => None,
        };
        match span {
            Some(bounds) => {
                self.visible = true;
                self.bounds = bounds;
                self.value = bounds.min;
                log::debug!("Animation slider shown over {bounds}");
            }
            None => {
                self.visible = false;
                if self.playing {
                    self.stop_playback();
                }
            }
        }
    }

    /// Move the slider and notify subscribers
    pub fn change_value(&mut self, value: i64) -> i64 {
        self.value = self.bounds.align(value);
        log::trace!("Animation slider changed to {}", self.value);
        self.on_range_change.trigger(&self.value);
        self.value
    }

    /// Advance one step, wrapping back to the first lead time
    pub fn tick(&mut self) -> Result<i64> {
        if self.bounds.min >= self.bounds.max {
            log::error!("Playback tick error: {} has no room to advance", self.bounds);
            return Err(ControlError::InvalidRange(format!(
                "cannot advance within {}",
                self.bounds
            )));
        }
        let mut next = self.value + self.bounds.step;
        if next > self.bounds.max {
            next = self.bounds.min;
        }
        Ok(self.change_value(next))
    }

    pub fn start_playback(&mut self) {
        if self.playing {
            return;
        }
        log::info!("Playback started");
        self.playing = true;
        self.elapsed_ms = 0;
    }

    pub fn stop_playback(&mut self) {
        if !self.playing {
            return;
        }
        log::info!("Playback stopped");
        self.playing = false;
        self.elapsed_ms = 0;
    }

    /// Change the delay between ticks; any running playback stops
    pub fn set_interval_ms(&mut self, interval_ms: i64) -> Result<()> {
        check_interval(interval_ms)?;
        self.interval_ms = interval_ms;
        log::info!("Playback interval set to {interval_ms} ms");
        self.stop_playback();
        Ok(())
    }

    /// Let `elapsed_ms` pass, ticking once per full interval while playing
    ///
    /// Returns the number of intervals that elapsed. Playback wraps, so only
    /// the ticks past the last full lap are performed.
    pub fn advance_ms(&mut self, elapsed_ms: i64) -> Result<usize> {
        if !self.playing {
            return Ok(0);
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms.max(0));
        let due = self.elapsed_ms / self.interval_ms;
        self.elapsed_ms %= self.interval_ms;
        if due == 0 {
            return Ok(0);
        }

        let lap = (self.bounds.max - self.bounds.min) / self.bounds.step + 1;
        let steps = (due - 1) % lap + 1;
        for _ in 0..steps {
            self.tick()?;
        }
        if steps < due {
            log::debug!("Skipped {} full playback lap(s)", (due - steps) / lap);
        }
        Ok(usize::try_from(due).unwrap_or(usize::MAX))
    }
}

fn check_interval(interval_ms: i64) -> Result<()> {
    if interval_ms <= 0 {
        log::error!("Invalid playback interval: {interval_ms}");
        return Err(ControlError::InvalidInterval(interval_ms));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn selection(lead: i64, end: Option<i64>, range_mode: bool) -> TimeSelection {
        TimeSelection {
            target_time: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            lead_time: lead,
            lead_time_end: end,
            forecast_cycle: 0,
            range_mode,
        }
    }

    fn control() -> AnimationControl {
        AnimationControl::new(&AnimationConfigDefaults::default()).unwrap()
    }

    #[test]
    fn test_visibility_follows_span() {
        let mut a = control();
        a.sync_with(&selection(3, Some(6), true), 1);
        assert!(a.is_visible());
        assert_eq!(a.value(), 3);
        assert_eq!(a.bounds(), Bounds::new(3, 6, 1).unwrap());

        a.sync_with(&selection(3, Some(3), true), 1);
        assert!(!a.is_visible());
        a.sync_with(&selection(3, None, false), 1);
        assert!(!a.is_visible());
    }

    #[test]
    fn test_tick_wraps_to_start() {
        let mut a = control();
        a.sync_with(&selection(3, Some(5), true), 1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        a.on_range_change
            .add("layer", move |v: &i64| sink.borrow_mut().push(*v))
            .unwrap();

        for _ in 0..4 {
            a.tick().unwrap();
        }
        assert_eq!(*seen.borrow(), vec![4, 5, 3, 4]);
    }

    #[test]
    fn test_tick_without_room_is_an_error() {
        let mut a = control();
        a.bounds = Bounds::new(4, 4, 1).unwrap();
        a.value = 4;
        assert!(matches!(a.tick(), Err(ControlError::InvalidRange(_))));
        assert_eq!(a.value(), 4);
    }

    #[test]
    fn test_interval_validation_stops_playback() {
        let mut a = control();
        a.start_playback();
        assert_eq!(a.set_interval_ms(0), Err(ControlError::InvalidInterval(0)));
        assert!(a.is_playing());
        assert_eq!(a.interval_ms(), 1000);

        a.set_interval_ms(250).unwrap();
        assert!(!a.is_playing());
        assert_eq!(a.interval_ms(), 250);
    }

    #[test]
    fn test_hiding_stops_playback() {
        let mut a = control();
        a.sync_with(&selection(1, Some(4), true), 1);
        a.start_playback();
        a.sync_with(&selection(1, None, false), 1);
        assert!(!a.is_playing());
    }

    #[test]
    fn test_advance_ticks_per_interval() {
        let mut a = control();
        a.sync_with(&selection(1, Some(4), true), 1);
        assert_eq!(a.advance_ms(5000).unwrap(), 0);

        a.start_playback();
        assert_eq!(a.advance_ms(2500).unwrap(), 2);
        assert_eq!(a.value(), 3);
        assert_eq!(a.advance_ms(500).unwrap(), 1);
        assert_eq!(a.value(), 4);
        assert_eq!(a.advance_ms(1000).unwrap(), 1);
        assert_eq!(a.value(), 1);
    }

    #[test]
    fn test_long_wait_skips_whole_laps() {
        let mut a = control();
        a.sync_with(&selection(1, Some(4), true), 1);
        a.set_interval_ms(1).unwrap();
        a.start_playback();

        // Four positions per lap, so a wait of 9 intervals lands one step on
        assert_eq!(a.advance_ms(9).unwrap(), 9);
        assert_eq!(a.value(), 2);

        let due = a.advance_ms(i64::MAX).unwrap();
        assert_eq!(due, usize::try_from(i64::MAX).unwrap_or(usize::MAX));
        assert_eq!(a.value(), 1);
        assert!(a.is_playing());
    }
}
