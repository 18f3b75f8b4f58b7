//! Time settings: target date, lead time (or lead time span), forecast cycle
//!
//! Input values change freely; [`TimeConfig::submit`] locks them into a
//! [`TimeSelection`] that the rest of the application reads.

use crate::callbacks::CallbackRegistry;
use crate::config::TimeConfigDefaults;
use crate::range::{Bounds, PairedRange};
use crate::types::{Result, TimeSelection};
use chrono::NaiveDate;

/// Values restored from a previous session
///
/// `range_mode` and `lead_time_end` are optional; absent means "keep".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeArgs {
    pub target_time: NaiveDate,
    pub lead_time: i64,
    pub forecast_cycle: i64,
    pub range_mode: Option<bool>,
    pub lead_time_end: Option<i64>,
}

/// Time selection widget
#[derive(Debug)]
pub struct TimeConfig {
    target_time: NaiveDate,
    min_date: NaiveDate,
    range_mode: bool,
    /// Lead time (start) and lead time end
    lead: PairedRange,
    cycle_bounds: Bounds,
    forecast_cycle: i64,
    selected: Option<TimeSelection>,
    /// Fired with the submitted selection
    pub on_submit: CallbackRegistry<TimeSelection>,
    /// Fired whenever the displayed "selected values" change
    pub display_select: CallbackRegistry<TimeSelection>,
}

impl TimeConfig {
    pub fn new(defaults: &TimeConfigDefaults) -> Result<Self> {
        let lead_bounds = defaults.lead_time.bounds()?;
        let cycle_bounds = defaults.forecast_cycle.bounds()?;
        let lead_time = defaults.lead_time.value;
        Ok(Self {
            target_time: defaults.target_date.max(defaults.min_date),
            min_date: defaults.min_date,
            range_mode: defaults.range_mode,
            lead: PairedRange::new(lead_bounds, lead_time, lead_time, 0, defaults.lead_policy)?,
            cycle_bounds,
            forecast_cycle: cycle_bounds.align(defaults.forecast_cycle.value),
            selected: None,
            on_submit: CallbackRegistry::new("TimeConfig.on_submit"),
            display_select: CallbackRegistry::new("TimeConfig.display_select"),
        })
    }

    pub fn target_time(&self) -> NaiveDate {
        self.target_time
    }

    pub fn min_date(&self) -> NaiveDate {
        self.min_date
    }

    pub fn lead_time(&self) -> i64 {
        self.lead.start()
    }

    pub fn lead_time_end(&self) -> i64 {
        self.lead.end()
    }

    pub fn lead_range(&self) -> &PairedRange {
        &self.lead
    }

    pub fn forecast_cycle(&self) -> i64 {
        self.forecast_cycle
    }

    pub fn range_mode(&self) -> bool {
        self.range_mode
    }

    /// Last submitted (or restored) selection
    pub fn selected(&self) -> Option<&TimeSelection> {
        self.selected.as_ref()
    }

    /// Dates before the earliest available forecast are moved up to it
    pub fn select_target_time(&mut self, date: NaiveDate) -> NaiveDate {
        if date < self.min_date {
            log::debug!(
                "Target date {} is before {}, using the earliest date",
                date,
                self.min_date
            );
        }
        self.target_time = date.max(self.min_date);
        self.target_time
    }

    /// Move the lead time
    ///
    /// Outside range mode the lead time end follows, so enabling range mode
    /// later starts from a single-hour span.
    pub fn select_lead_time(&mut self, value: i64) -> i64 {
        if self.range_mode {
            self.lead.set_start(value).start
        } else {
            self.lead.set_point(value).start
        }
    }

    pub fn select_lead_time_end(&mut self, value: i64) -> i64 {
        self.lead.set_end(value).end
    }

    pub fn select_forecast_cycle(&mut self, value: i64) -> i64 {
        self.forecast_cycle = self.cycle_bounds.align(value);
        self.forecast_cycle
    }

    /// Switch between single lead time and lead time span selection
    ///
    /// Returns whether the mode changed. Enabling collapses the lead time end
    /// onto the lead time.
    pub fn set_range_mode(&mut self, mode: bool) -> bool {
        if self.range_mode == mode {
            log::warn!("Range mode already set to {mode}");
            return false;
        }
        self.range_mode = mode;
        if mode {
            self.lead.set_end(self.lead.start());
        }
        true
    }

    /// The "Get Data" action
    ///
    /// The lead time end is only part of the selection in range mode.
    pub fn submit(&mut self) -> TimeSelection {
        let selection = TimeSelection {
            target_time: self.target_time,
            lead_time: self.lead.start(),
            lead_time_end: self.range_mode.then(|| self.lead.end()),
            forecast_cycle: self.forecast_cycle,
            range_mode: self.range_mode,
        };
        self.selected = Some(selection);
        log::info!("Time submitted: {selection}");
        self.on_submit.trigger(&selection);
        self.display_select.trigger(&selection);
        selection
    }

    /// Restore the submitted values without submitting
    ///
    /// Values outside their domains are clamped like user input.
    pub fn externally_set_previous(&mut self, args: TimeArgs) {
        let previous = self.selected;
        let range_mode = args
            .range_mode
            .or(previous.map(|s| s.range_mode))
            .unwrap_or(false);

        let bounds = self.lead.bounds();
        let spacing = self.lead.spacing();
        let lead_time = bounds.align(args.lead_time).min(bounds.top() - spacing);
        let lead_time_end = args
            .lead_time_end
            .or(previous.and_then(|s| s.lead_time_end))
            .map(|end| bounds.align(end).max(lead_time + spacing));

        let selection = TimeSelection {
            target_time: args.target_time.max(self.min_date),
            lead_time,
            lead_time_end,
            forecast_cycle: self.cycle_bounds.align(args.forecast_cycle),
            range_mode,
        };
        if selection.lead_time != args.lead_time
            || selection.forecast_cycle != args.forecast_cycle
            || selection.target_time != args.target_time
        {
            log::debug!("Restored time selection clamped to {selection}");
        }
        self.selected = Some(selection);
        self.display_select.trigger(&selection);
    }

    /// Restore the input values
    pub fn externally_set_input(&mut self, args: TimeArgs) {
        self.select_target_time(args.target_time);
        self.select_lead_time(args.lead_time);
        self.select_forecast_cycle(args.forecast_cycle);
        if let Some(mode) = args.range_mode {
            if mode != self.range_mode {
                self.set_range_mode(mode);
            }
        }
        if let Some(end) = args.lead_time_end {
            self.select_lead_time_end(end);
        }
    }

    /// Restore both the submitted and the input values
    pub fn externally_set_full(&mut self, args: TimeArgs) {
        self.externally_set_previous(args);
        self.externally_set_input(args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::ResolutionPolicy;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn time() -> TimeConfig {
        TimeConfig::new(&TimeConfigDefaults::default()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults() {
        let t = time();
        assert_eq!(t.target_time(), date(2025, 7, 4));
        assert_eq!(t.lead_time(), 1);
        assert_eq!(t.forecast_cycle(), 0);
        assert!(!t.range_mode());
        assert!(t.selected().is_none());
    }

    #[test]
    fn test_single_mode_submit_omits_lead_time_end() {
        let mut t = time();
        t.select_lead_time(6);
        t.select_forecast_cycle(12);
        let selection = t.submit();
        assert_eq!(selection.lead_time, 6);
        assert_eq!(selection.lead_time_end, None);
        assert_eq!(selection.forecast_cycle, 12);
        assert_eq!(t.selected(), Some(&selection));
    }

    #[test]
    fn test_range_mode_submit() {
        let mut t = time();
        t.select_lead_time(3);
        assert!(t.set_range_mode(true));
        assert_eq!(t.lead_time_end(), 3);
        t.select_lead_time_end(9);

        let selection = t.submit();
        assert_eq!(selection.lead_time_end, Some(9));
        assert!(selection.is_span());
    }

    #[test]
    fn test_setting_same_range_mode_is_noop() {
        let mut t = time();
        assert!(!t.set_range_mode(false));
        t.set_range_mode(true);
        assert!(!t.set_range_mode(true));
    }

    #[test]
    fn test_lead_time_crossing_follows_policy() {
        let mut t = time();
        t.set_range_mode(true);
        t.select_lead_time_end(5);
        // Propagate: the end is pushed along
        assert_eq!(t.select_lead_time(8), 8);
        assert_eq!(t.lead_time_end(), 8);

        let defaults = TimeConfigDefaults {
            lead_policy: ResolutionPolicy::Constrain,
            range_mode: true,
            ..TimeConfigDefaults::default()
        };
        let mut t = TimeConfig::new(&defaults).unwrap();
        t.select_lead_time_end(5);
        assert_eq!(t.select_lead_time(8), 5);
        assert_eq!(t.select_lead_time_end(2), 5);
    }

    #[test]
    fn test_target_date_floor() {
        let mut t = time();
        assert_eq!(t.select_target_time(date(2010, 1, 1)), date(2018, 9, 17));
        assert_eq!(t.select_target_time(date(2024, 2, 29)), date(2024, 2, 29));
    }

    #[test]
    fn test_submit_fires_submit_then_display() {
        let mut t = time();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o = order.clone();
        t.on_submit
            .add("cache", move |_: &TimeSelection| o.borrow_mut().push("submit"))
            .unwrap();
        let o = order.clone();
        t.display_select
            .add("display", move |_: &TimeSelection| o.borrow_mut().push("display"))
            .unwrap();

        t.submit();
        assert_eq!(*order.borrow(), vec!["submit", "display"]);
    }

    #[test]
    fn test_externally_set_full_restores_without_submitting() {
        let mut t = time();
        let submits = Rc::new(RefCell::new(0));
        let s = submits.clone();
        t.on_submit
            .add("count", move |_: &TimeSelection| *s.borrow_mut() += 1)
            .unwrap();

        t.externally_set_full(TimeArgs {
            target_time: date(2024, 6, 1),
            lead_time: 2,
            forecast_cycle: 6,
            range_mode: Some(true),
            lead_time_end: Some(12),
        });

        let selected = t.selected().copied().unwrap();
        assert_eq!(selected.lead_time_end, Some(12));
        assert!(selected.range_mode);
        assert_eq!(t.target_time(), date(2024, 6, 1));
        assert_eq!((t.lead_time(), t.lead_time_end()), (2, 12));
        assert!(t.range_mode());
        assert_eq!(*submits.borrow(), 0);
    }

    #[test]
    fn test_restored_selection_is_clamped() {
        let mut t = time();
        let displayed = Rc::new(RefCell::new(Vec::new()));
        let d = displayed.clone();
        t.display_select
            .add("display", move |s: &TimeSelection| d.borrow_mut().push(*s))
            .unwrap();

        t.externally_set_full(TimeArgs {
            target_time: date(2010, 1, 1),
            lead_time: 99,
            forecast_cycle: 40,
            range_mode: Some(true),
            lead_time_end: Some(40),
        });

        let selected = t.selected().copied().unwrap();
        assert_eq!(selected.target_time, date(2018, 9, 17));
        assert_eq!(selected.lead_time, 18);
        assert_eq!(selected.lead_time_end, Some(18));
        assert_eq!(selected.forecast_cycle, 23);
        assert_eq!(selected.forecast_cycle, t.forecast_cycle());
        assert_eq!(selected.lead_time, t.lead_time());
        assert_eq!(*displayed.borrow(), vec![selected]);
    }
}
