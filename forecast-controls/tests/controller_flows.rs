//! End-to-end flows through the controller and its widgets

use forecast_controls::render::{Gridlines, Rgba};
use forecast_controls::{
    ControlError, Controller, ControlsConfig, RegionBoundArgs, RegionBounds,
    ResolutionPolicy, ResumeSession, ScaleArgs,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn controller() -> Controller {
    init_logging();
    Controller::new(&ControlsConfig::default()).unwrap()
}

#[test]
fn test_region_commit_publishes_once() {
    let mut c = controller();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    c.region_mut()
        .on_set
        .add("test-listener", move |args: &RegionBoundArgs| {
            sink.borrow_mut().push(*args)
        })
        .unwrap();

    c.region_mut().commit();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0],
        RegionBoundArgs::from(RegionBounds::new(656, 1264, 1952, 2416))
    );
}

#[test]
fn test_region_selection_does_not_touch_state() {
    let mut c = controller();
    c.region_mut().select_row_min(800);
    assert_eq!(c.region().selection().row_min, 800);
    assert_eq!(c.state().region.row_min, 656);

    c.region_mut().commit();
    assert_eq!(c.state().region.row_min, 800);
}

#[test]
fn test_forecast_request_requires_submit() {
    let c = controller();
    assert!(matches!(
        c.forecast_request(),
        Err(ControlError::PreconditionFailed(_))
    ));
}

#[test]
fn test_submit_builds_forecast_request() {
    let mut c = controller();
    c.time_mut().select_lead_time(3);
    c.time_mut().select_forecast_cycle(12);
    c.time_mut().submit();
    c.scale_mut().select_x(8);
    c.scale_mut().commit();

    let request = c.forecast_request().unwrap();
    assert_eq!(request.selected_time, "20250704");
    assert_eq!(request.lead_time, 3);
    assert_eq!(request.forecast_cycle, 12);
    assert_eq!((request.scale_x, request.scale_y), (8, 8));
    assert_eq!(request.lead_time_end, None);
    assert!(!request.range_mode);

    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["scaleX"], 8);
    assert_eq!(body["rowMin"], 656);
}

#[test]
fn test_span_submit_drives_animation() {
    let mut c = controller();
    c.time_mut().set_range_mode(true);
    c.time_mut().select_lead_time(2);
    c.time_mut().select_lead_time_end(5);
    c.time_mut().submit();

    {
        let animation = c.animation();
        assert!(animation.is_visible());
        assert_eq!((animation.bounds().min, animation.bounds().max), (2, 5));
        assert_eq!(animation.value(), 2);
    }

    c.animation_mut().start_playback();
    assert_eq!(c.animation_mut().advance_ms(2500).unwrap(), 2);
    assert_eq!(c.animation().value(), 4);
    assert_eq!(c.state().displayed_lead_time, Some(4));

    // Two more ticks wrap back to the first lead time
    c.animation_mut().advance_ms(2000).unwrap();
    assert_eq!(c.animation().value(), 2);
}

#[test]
fn test_single_lead_submit_hides_animation() {
    let mut c = controller();
    c.time_mut().set_range_mode(true);
    c.time_mut().select_lead_time_end(4);
    c.time_mut().submit();
    c.animation_mut().start_playback();

    c.time_mut().set_range_mode(false);
    c.time_mut().submit();
    assert!(!c.animation().is_visible());
    assert!(!c.animation().is_playing());
}

#[test]
fn test_lead_time_propagates_in_range_mode() {
    let config = ControlsConfig::new().with_lead_policy(ResolutionPolicy::Propagate);
    init_logging();
    let mut c = Controller::new(&config).unwrap();
    c.time_mut().set_range_mode(true);
    c.time_mut().select_lead_time_end(4);

    // Start pushed past the end drags the end along
    assert_eq!(c.time_mut().select_lead_time(7), 7);
    assert_eq!(c.time().lead_time_end(), 7);

    // End pulled below the start drags the start along
    assert_eq!(c.time_mut().select_lead_time_end(3), 3);
    assert_eq!(c.time().lead_time(), 3);
}

#[test]
fn test_scale_external_update_is_silent_for_selection_listeners() {
    let mut c = controller();
    let fired = Rc::new(RefCell::new(0));
    let counter = fired.clone();
    c.scale_mut()
        .on_selection
        .add("test-listener", move |_: &ScaleArgs| *counter.borrow_mut() += 1)
        .unwrap();

    c.scale_mut()
        .set_committed(ScaleArgs {
            x_scale: Some(4),
            y_scale: None,
        })
        .unwrap();
    assert_eq!(*fired.borrow(), 0);
    assert_eq!(c.state().scale_x, 4);
    assert_eq!(c.state().scale_y, 16);
}

#[test]
fn test_empty_external_update_is_rejected() {
    let mut c = controller();
    assert!(matches!(
        c.scale_mut().set_full(ScaleArgs::default()),
        Err(ControlError::EmptyUpdate(_))
    ));
    assert!(matches!(
        c.region_mut().set_selection(RegionBoundArgs::default()),
        Err(ControlError::EmptyUpdate(_))
    ));
}

#[test]
fn test_gridlines_resize_region_domain() {
    let mut c = controller();
    let gridlines: Gridlines = serde_json::from_value(json!({
        "horiz_gridlines": [[[0.0, 0.0], [10.0, 0.0]], [[0.0, 1.0], [10.0, 1.0]]],
        "vert_gridlines": [[[0.0, 0.0], [0.0, 1.0]], [[1.0, 0.0], [1.0, 1.0]], [[2.0, 0.0], [2.0, 1.0]]],
        "scaleX": 16,
        "scaleY": 16
    }))
    .unwrap();
    c.apply_gridlines(gridlines).unwrap();

    let rows = c.region().rows().bounds();
    assert_eq!((rows.min, rows.max, rows.step), (0, 32, 16));
    let cols = c.region().cols().bounds();
    assert_eq!((cols.min, cols.max, cols.step), (0, 48, 16));
    assert_eq!(c.state().region, c.region().committed());
    assert!(!c.region_outline().is_empty());
}

#[test]
fn test_resume_restores_session() {
    let mut c = controller();
    let forecast = json!({
        "geometries": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]],
        "values": [0.001]
    });
    let session: ResumeSession = serde_json::from_value(json!({
        "selected_time": "20250610",
        "lead_time": 3,
        "forecast_cycle": 12,
        "range_mode": true,
        "lead_time_end": 6,
        "scaleX": 8,
        "scaleY": 8,
        "rowMin": 640,
        "rowMax": 1280,
        "colMin": 1920,
        "colMax": 2432,
        "regionRowMin": 0,
        "regionRowMax": 3840,
        "regionColMin": 0,
        "regionColMax": 4608,
        "forecasted_forcing_data_dict": forecast.to_string()
    }))
    .unwrap();

    c.resume(session).unwrap();

    let state = c.state();
    let time = state.time.unwrap();
    assert_eq!(time.target_time_compact(), "20250610");
    assert_eq!((time.lead_time, time.lead_time_end), (3, Some(6)));
    assert!(time.range_mode);
    assert_eq!((state.scale_x, state.scale_y), (8, 8));
    assert_eq!(state.region, RegionBounds::new(640, 1280, 1920, 2432));
    assert_eq!(c.region().selection(), state.region);
    assert!(c.animation().is_visible());

    assert_eq!(c.timestep_values_for(3), Some(vec![0.001]));
    let cells = c.forecast_cells();
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].color, Rgba::opaque(59, 121, 187));
}

#[test]
fn test_resume_with_empty_session_changes_nothing() {
    let mut c = controller();
    let before = c.state();
    c.resume(ResumeSession::default()).unwrap();
    assert_eq!(c.state(), before);
}

#[test]
fn test_resume_region_domain_steps_follow_scales() {
    let mut c = controller();
    let session: ResumeSession = serde_json::from_value(json!({
        "scaleX": 4,
        "scaleY": 8,
        "rowMin": 640,
        "rowMax": 1280,
        "colMin": 1924,
        "colMax": 2432,
        "regionRowMin": 0,
        "regionRowMax": 3840,
        "regionColMin": 0,
        "regionColMax": 4608
    }))
    .unwrap();

    c.resume(session).unwrap();

    assert_eq!(c.region().rows().bounds().step, 8);
    assert_eq!(c.region().cols().bounds().step, 4);
    assert_eq!(c.state().region, RegionBounds::new(640, 1280, 1924, 2432));
}

#[test]
fn test_resume_clamps_time_into_state() {
    let mut c = controller();
    let session: ResumeSession = serde_json::from_value(json!({
        "selected_time": "20100101",
        "lead_time": 99,
        "forecast_cycle": 40
    }))
    .unwrap();

    c.resume(session).unwrap();

    let time = c.state().time.unwrap();
    assert_eq!(time.target_time_compact(), "20180917");
    assert_eq!((time.lead_time, time.forecast_cycle), (18, 23));
    assert_eq!(time.lead_time, c.time().lead_time());
    assert_eq!(time.forecast_cycle, c.time().forecast_cycle());
    assert_eq!(c.time().selected(), Some(&time));
}

#[test]
fn test_partial_region_update_keeps_state_ordered() {
    let mut c = controller();
    c.region_mut()
        .set_full(RegionBoundArgs {
            row_min: Some(2000),
            ..RegionBoundArgs::default()
        })
        .unwrap();

    let region = c.state().region;
    assert_eq!(region, c.region().committed());
    assert_eq!((region.row_min, region.row_max), (1232, 1264));
    assert!(region.row_min + c.region().rows().spacing() <= region.row_max);
}

#[test]
fn test_external_scales_reach_state_clamped() {
    let mut c = controller();
    c.scale_mut()
        .set_full(ScaleArgs {
            x_scale: Some(0),
            y_scale: Some(500),
        })
        .unwrap();

    assert_eq!((c.state().scale_x, c.state().scale_y), (1, 64));
    assert_eq!(c.scale().committed(), (1, 64));
}
