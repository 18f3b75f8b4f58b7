//! Region selection over the forecast grid
//!
//! Rows and columns are each a [`PairedRange`] of selection values. The
//! committed [`RegionBounds`] only change on [`RegionSelector::commit`] or
//! an explicit programmatic set.

use crate::callbacks::CallbackRegistry;
use crate::config::RegionConfigDefaults;
use crate::range::{Bounds, PairedRange, ResolutionPolicy};
use crate::types::{AppliedValues, ControlError, RegionBoundArgs, RegionBounds, Result};

/// Row and column range selection with a committed region
#[derive(Debug)]
pub struct RegionSelector {
    rows: PairedRange,
    cols: PairedRange,
    committed: RegionBounds,
    pub on_selection: CallbackRegistry<RegionBoundArgs>,
    pub on_set: CallbackRegistry<RegionBoundArgs>,
}

impl RegionSelector {
    pub fn new(defaults: &RegionConfigDefaults) -> Result<Self> {
        let rows = PairedRange::new(
            defaults.rows.bounds()?,
            defaults.rows.start,
            defaults.rows.end,
            defaults.spacing_steps,
            defaults.policy,
        )?;
        let cols = PairedRange::new(
            defaults.cols.bounds()?,
            defaults.cols.start,
            defaults.cols.end,
            defaults.spacing_steps,
            defaults.policy,
        )?;
        let committed = bounds_of(&rows, &cols);
        Ok(Self {
            rows,
            cols,
            committed,
            on_selection: CallbackRegistry::new("RegionSelector.on_selection"),
            on_set: CallbackRegistry::new("RegionSelector.on_set"),
        })
    }

    pub fn rows(&self) -> &PairedRange {
        &self.rows
    }

    pub fn cols(&self) -> &PairedRange {
        &self.cols
    }

    /// Current (uncommitted) selection
    pub fn selection(&self) -> RegionBounds {
        bounds_of(&self.rows, &self.cols)
    }

    /// Last committed region
    pub fn committed(&self) -> RegionBounds {
        self.committed
    }

    pub fn select_row_min(&mut self, value: i64) -> AppliedValues {
        let expected = self.rows.bounds().align(value);
        let applied = self.rows.set_start(value);
        self.publish_selection(
            applied.start == expected,
            RegionBoundArgs {
                row_min: Some(applied.start),
                ..RegionBoundArgs::default()
            },
        );
        applied
    }

    pub fn select_row_max(&mut self, value: i64) -> AppliedValues {
        let expected = self.rows.bounds().align(value);
        let applied = self.rows.set_end(value);
        self.publish_selection(
            applied.end == expected,
            RegionBoundArgs {
                row_max: Some(applied.end),
                ..RegionBoundArgs::default()
            },
        );
        applied
    }

    pub fn select_col_min(&mut self, value: i64) -> AppliedValues {
        let expected = self.cols.bounds().align(value);
        let applied = self.cols.set_start(value);
        self.publish_selection(
            applied.start == expected,
            RegionBoundArgs {
                col_min: Some(applied.start),
                ..RegionBoundArgs::default()
            },
        );
        applied
    }

    pub fn select_col_max(&mut self, value: i64) -> AppliedValues {
        let expected = self.cols.bounds().align(value);
        let applied = self.cols.set_end(value);
        self.publish_selection(
            applied.end == expected,
            RegionBoundArgs {
                col_max: Some(applied.end),
                ..RegionBoundArgs::default()
            },
        );
        applied
    }

    // A move pushed back by the spacing rule is corrected in place, not announced
    fn publish_selection(&mut self, accepted: bool, args: RegionBoundArgs) {
        if accepted {
            self.on_selection.trigger(&args);
        } else {
            log::debug!("Region selection corrected to {:?}", self.selection());
        }
    }

    /// The "Set Region" action
    ///
    /// Copies the selection into the committed region and publishes all four
    /// values in a single event.
    pub fn commit(&mut self) -> RegionBounds {
        self.committed = self.selection();
        log::info!(
            "Region set to rows {}..{} cols {}..{}",
            self.committed.row_min,
            self.committed.row_max,
            self.committed.col_min,
            self.committed.col_max
        );
        self.on_set.trigger(&RegionBoundArgs::from(self.committed));
        self.committed
    }

    /// Replace selection values without touching the committed region
    ///
    /// A value given alone is constrained by its partner; subscribers see
    /// the values that were applied.
    pub fn set_selection(&mut self, args: RegionBoundArgs) -> Result<()> {
        check_args(&args, "RegionSelector::set_selection")?;
        let rows = apply_pair(&mut self.rows, args.row_min, args.row_max);
        let cols = apply_pair(&mut self.cols, args.col_min, args.col_max);
        self.on_selection.trigger(&applied_args(&args, rows, cols));
        Ok(())
    }

    /// Replace committed values without touching the selection
    ///
    /// Committed values obey the same spacing and order as the selection.
    pub fn set_committed(&mut self, args: RegionBoundArgs) -> Result<()> {
        check_args(&args, "RegionSelector::set_committed")?;
        let mut rows = self.rows.clone();
        rows.set_both(self.committed.row_min, self.committed.row_max);
        let mut cols = self.cols.clone();
        cols.set_both(self.committed.col_min, self.committed.col_max);

        let row_values = apply_pair(&mut rows, args.row_min, args.row_max);
        let col_values = apply_pair(&mut cols, args.col_min, args.col_max);
        self.committed = bounds_of(&rows, &cols);
        self.on_set.trigger(&applied_args(&args, row_values, col_values));
        Ok(())
    }

    /// Replace both selection and committed values
    pub fn set_full(&mut self, args: RegionBoundArgs) -> Result<()> {
        self.set_selection(args)?;
        self.set_committed(args)
    }

    /// Replace the slider domains
    ///
    /// The re-aligned selection becomes the committed region and is
    /// published to set subscribers.
    pub fn set_slider_bounds(&mut self, rows: Bounds, cols: Bounds) -> Result<()> {
        self.rows.configure_bounds(rows.min, rows.max, rows.step)?;
        self.cols.configure_bounds(cols.min, cols.max, cols.step)?;
        log::info!("Region slider bounds set to rows {} cols {}", rows, cols);
        self.commit();
        Ok(())
    }
}

fn bounds_of(rows: &PairedRange, cols: &PairedRange) -> RegionBounds {
    RegionBounds::new(rows.start(), rows.end(), cols.start(), cols.end())
}

/// Apply a possibly partial update, holding the missing side in place
fn apply_pair(range: &mut PairedRange, start: Option<i64>, end: Option<i64>) -> AppliedValues {
    let policy = range.policy();
    range.set_policy(ResolutionPolicy::Constrain);
    let applied = match (start, end) {
        (Some(start), Some(end)) => range.set_both(start, end),
        (Some(start), None) => range.set_start(start),
        (None, Some(end)) => range.set_end(end),
        (None, None) => range.applied(),
    };
    range.set_policy(policy);
    applied
}

// Only the fields the caller provided are announced
fn applied_args(
    args: &RegionBoundArgs,
    rows: AppliedValues,
    cols: AppliedValues,
) -> RegionBoundArgs {
    RegionBoundArgs {
        row_min: args.row_min.map(|_| rows.start),
        row_max: args.row_max.map(|_| rows.end),
        col_min: args.col_min.map(|_| cols.start),
        col_max: args.col_max.map(|_| cols.end),
    }
}

fn check_args(args: &RegionBoundArgs, operation: &'static str) -> Result<()> {
    if args.is_empty() {
        log::error!("No region values provided to {operation}");
        return Err(ControlError::EmptyUpdate(operation));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn selector() -> RegionSelector {
        RegionSelector::new(&RegionConfigDefaults::default()).unwrap()
    }

    fn record(
        registry: &mut CallbackRegistry<RegionBoundArgs>,
    ) -> Rc<RefCell<Vec<RegionBoundArgs>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        registry
            .add("record", move |args: &RegionBoundArgs| {
                sink.borrow_mut().push(*args)
            })
            .unwrap();
        seen
    }

    #[test]
    fn test_defaults() {
        let r = selector();
        assert_eq!(r.selection(), RegionBounds::new(656, 1264, 1952, 2416));
        assert_eq!(r.committed(), r.selection());
        assert_eq!(r.rows().spacing(), 32);
    }

    #[test]
    fn test_commit_fires_single_event_with_all_values() {
        let mut r = selector();
        let sets = record(&mut r.on_set);

        let committed = r.commit();
        assert_eq!(committed, RegionBounds::new(656, 1264, 1952, 2416));
        assert_eq!(sets.borrow().len(), 1);
        assert_eq!(
            sets.borrow()[0],
            RegionBoundArgs {
                row_min: Some(656),
                row_max: Some(1264),
                col_min: Some(1952),
                col_max: Some(2416),
            }
        );
    }

    #[test]
    fn test_accepted_move_is_published() {
        let mut r = selector();
        let selections = record(&mut r.on_selection);

        let applied = r.select_row_min(800);
        assert_eq!(applied, AppliedValues::new(800, 1264));
        assert_eq!(
            *selections.borrow(),
            vec![RegionBoundArgs {
                row_min: Some(800),
                ..RegionBoundArgs::default()
            }]
        );
        // Selection moves do not change the committed region
        assert_eq!(r.committed().row_min, 656);
    }

    #[test]
    fn test_crossing_move_is_corrected_silently() {
        let mut r = selector();
        let selections = record(&mut r.on_selection);

        // Row max may not come within two steps of row min
        let applied = r.select_row_max(600);
        assert_eq!(applied, AppliedValues::new(656, 688));
        let applied = r.select_col_min(3000);
        assert_eq!(applied, AppliedValues::new(2384, 2416));
        assert!(selections.borrow().is_empty());
    }

    #[test]
    fn test_set_committed_leaves_selection() {
        let mut r = selector();
        let sets = record(&mut r.on_set);
        let args = RegionBoundArgs {
            col_max: Some(3000),
            ..RegionBoundArgs::default()
        };
        r.set_committed(args).unwrap();
        assert_eq!(r.committed().col_max, 3008);
        assert_eq!(r.selection().col_max, 2416);
        // Subscribers see the aligned value
        assert_eq!(
            *sets.borrow(),
            vec![RegionBoundArgs {
                col_max: Some(3008),
                ..RegionBoundArgs::default()
            }]
        );
    }

    #[test]
    fn test_set_full_updates_both() {
        let mut r = selector();
        let full = RegionBounds::new(0, 64, 16, 128);
        r.set_full(full.into()).unwrap();
        assert_eq!(r.selection(), full);
        assert_eq!(r.committed(), full);
        assert!(r.set_full(RegionBoundArgs::default()).is_err());
    }

    #[test]
    fn test_partial_update_past_partner_is_constrained() {
        let mut r = selector();
        let selections = record(&mut r.on_selection);
        let sets = record(&mut r.on_set);

        // Row min beyond the current row max stops two steps below it
        r.set_full(RegionBoundArgs {
            row_min: Some(2000),
            ..RegionBoundArgs::default()
        })
        .unwrap();
        let expected = RegionBounds::new(1232, 1264, 1952, 2416);
        assert_eq!(r.selection(), expected);
        assert_eq!(r.committed(), expected);

        let published = RegionBoundArgs {
            row_min: Some(1232),
            ..RegionBoundArgs::default()
        };
        assert_eq!(*selections.borrow(), vec![published]);
        assert_eq!(*sets.borrow(), vec![published]);

        r.set_committed(RegionBoundArgs {
            col_max: Some(0),
            ..RegionBoundArgs::default()
        })
        .unwrap();
        assert_eq!(r.committed().col_max, 1984);
        assert!(r.committed().col_min + r.cols().spacing() <= r.committed().col_max);
    }

    #[test]
    fn test_new_slider_bounds_recommit() {
        let mut r = selector();
        let sets = record(&mut r.on_set);

        r.set_slider_bounds(
            Bounds::new(0, 1024, 16).unwrap(),
            Bounds::new(0, 2048, 16).unwrap(),
        )
        .unwrap();
        assert_eq!(r.selection(), RegionBounds::new(656, 1024, 1952, 2048));
        assert_eq!(r.committed(), r.selection());
        assert_eq!(sets.borrow().len(), 1);
    }
}
