extern crate helmsman;
extern crate nalgebra as na;

use self::helmsman::guidance::{PreviewSample, SchedulePreview};
use self::helmsman::linalg::UnitQuaternion;
use self::helmsman::time::{Epoch, Unit};
use self::helmsman::{ControlSchedule, ControlSegment, OrbitalState, Setpoint, SteeringFrame};
use crate::{canonical_state, test_epoch};

use rstest::*;

/// Analytic circular orbit propagator: rotates the position and velocity about
/// the orbit normal at the constant rate of the canonical orbit.
fn circular_propagator() -> impl FnMut(&OrbitalState, Epoch) -> OrbitalState {
    |state: &OrbitalState, to: Epoch| {
        let rate_rad_s = state.vmag_km_s() / state.rmag_km();
        let angle = rate_rad_s * (to - state.epoch).to_seconds();
        let axis = na::Unit::new_normalize(state.hvec());
        let rot = UnitQuaternion::from_axis_angle(&axis, angle);
        OrbitalState::from_vectors(rot * state.radius(), rot * state.velocity(), to)
    }
}

#[fixture]
fn scenario() -> ControlSchedule {
    let thrust = ControlSegment::new(
        Setpoint::new(SteeringFrame::Rtn, &[90.0, 0.0, 0.0], 1.0, true).unwrap(),
        1.0 * Unit::Hour,
    )
    .unwrap();
    let coast = ControlSegment::new(
        Setpoint::new(SteeringFrame::Icn, &[0.0, 0.0, 0.0], 0.0, false).unwrap(),
        30.0 * Unit::Minute,
    )
    .unwrap();
    let default = Setpoint::new(SteeringFrame::World, &[0.0, 90.0, 0.0], 0.0, false).unwrap();
    ControlSchedule::from_segments(test_epoch(), vec![thrust, coast], default).unwrap()
}

#[rstest]
fn preview_samples_the_whole_window(scenario: ControlSchedule) {
    let state = canonical_state();
    let samples: Vec<PreviewSample> = SchedulePreview::new(
        &scenario,
        state,
        2.0 * Unit::Hour,
        10.0 * Unit::Minute,
        circular_propagator(),
    )
    .collect();

    // Inclusive window: both endpoints are sampled
    assert_eq!(samples.len(), 13);
    assert_eq!(samples.first().unwrap().epoch, state.epoch);
    assert_eq!(
        samples.last().unwrap().epoch,
        state.epoch + 2.0 * Unit::Hour
    );

    // The first sample matches a direct resolution of the initial state
    let direct = scenario.command_at(&state).unwrap();
    assert_eq!(samples[0].command, direct);
}

#[rstest]
fn preview_tracks_segment_transitions(scenario: ControlSchedule) {
    let state = canonical_state();
    let samples: Vec<PreviewSample> = SchedulePreview::new(
        &scenario,
        state,
        2.0 * Unit::Hour,
        10.0 * Unit::Minute,
        circular_propagator(),
    )
    .collect();

    for sample in &samples {
        let offset = sample.epoch - state.epoch;
        if offset < 1.0 * Unit::Hour {
            assert_eq!(sample.command.throttle, 1.0);
            assert!(sample.command.propulsion_on);
        } else {
            // Coast segment, then the inertial default: no thrust either way
            assert_eq!(sample.command.throttle, 0.0);
            assert!(!sample.command.propulsion_on);
        }
    }
}

#[rstest]
fn preview_is_restartable(scenario: ControlSchedule) {
    let state = canonical_state();
    let first: Vec<PreviewSample> = SchedulePreview::new(
        &scenario,
        state,
        1.0 * Unit::Hour,
        5.0 * Unit::Minute,
        circular_propagator(),
    )
    .collect();
    let again: Vec<PreviewSample> = SchedulePreview::new(
        &scenario,
        state,
        1.0 * Unit::Hour,
        5.0 * Unit::Minute,
        circular_propagator(),
    )
    .collect();
    assert_eq!(first, again);
}

#[rstest]
fn preview_stops_on_unresolvable_states(scenario: ControlSchedule) {
    let _ = pretty_env_logger::try_init();

    // A propagator which collapses the orbit after twenty minutes: the preview
    // reports what it could resolve and ends instead of panicking.
    let state = canonical_state();
    let start = state.epoch;
    let mut inner = circular_propagator();
    let collapsing = move |state: &OrbitalState, to: Epoch| {
        if to - start > 20.0 * Unit::Minute {
            OrbitalState::cartesian(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, to)
        } else {
            inner(state, to)
        }
    };

    let samples: Vec<PreviewSample> = SchedulePreview::new(
        &scenario,
        state,
        1.0 * Unit::Hour,
        10.0 * Unit::Minute,
        collapsing,
    )
    .collect();
    assert_eq!(samples.len(), 3); // 0, 10 and 20 minutes
}
