//! Journey tests for the motion core: controller and tick monitor wired
//! together, driven poll by poll the way the firmware drives them.
//!
//! Unit tests in `src/motion/` cover single operations; these cover whole
//! travel missions with the sensor line simulated across many samples.

use skylift::config::LiftConfig;
use skylift::motion::monitor::{PollStatus, TickMonitor};
use skylift::motion::state::{Line, Movement, SwitchState};
use skylift::motion::LiftController;

use crate::mock_hw::{MockHardware, RecordingSink};

/// Controller at `position` plus an armed monitor seeded from a low line.
fn rig_at(position: i16) -> (LiftController, TickMonitor, MockHardware, RecordingSink) {
    let config = LiftConfig {
        initial_position: position,
        ..LiftConfig::default()
    };
    let ctrl = LiftController::new(&config);
    let monitor = TickMonitor::new(config.stall_sample_threshold());
    (ctrl, monitor, MockHardware::new(), RecordingSink::new())
}

/// One motion poll with the sensor line toggled first, as one spindle
/// half-turn between samples would leave it.
fn poll_with_edge(
    ctrl: &mut LiftController,
    monitor: &mut TickMonitor,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
) -> PollStatus {
    hw.toggle_level();
    let level = hw.level();
    monitor.poll(level, ctrl, hw, sink)
}

#[test]
fn poll_driven_travel_reaches_target() {
    let (mut ctrl, mut monitor, mut hw, mut sink) = rig_at(500);

    ctrl.set_target(508, &mut hw, &mut sink);
    monitor.arm(hw.level(), ctrl.position());
    assert!(hw.line(Line::Up));

    for expected in 501..=507 {
        let status = poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);
        assert_eq!(status, PollStatus::Watching);
        assert_eq!(ctrl.position(), expected);
        assert_eq!(ctrl.movement(), Movement::Up);
    }

    // Final tick: position lands, the drive disengages.
    let status = poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);
    assert_eq!(status, PollStatus::Watching);
    assert_eq!(ctrl.position(), 508);
    assert_eq!(ctrl.movement(), Movement::None);
    assert_eq!(ctrl.target(), None);
    assert!(!hw.line(Line::Up));
    assert!(!hw.line(Line::Down));

    // One snapshot per observable change: engage, 8 ticks, stop.
    assert_eq!(sink.snapshots.len(), 10);
    let last = sink.last().expect("no snapshot published");
    assert_eq!(last.position, 508);
    assert_eq!(last.movement, Movement::None);
}

#[test]
fn frozen_line_mid_travel_aborts_the_move() {
    let (mut ctrl, mut monitor, mut hw, mut sink) = rig_at(500);

    ctrl.set_target(800, &mut hw, &mut sink);
    monitor.arm(hw.level(), ctrl.position());

    // Two good samples, then the carriage jams.
    poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);
    poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);
    assert_eq!(ctrl.position(), 502);

    let level = hw.level();
    for _ in 0..7 {
        let status = monitor.poll(level, &mut ctrl, &mut hw, &mut sink);
        assert_eq!(status, PollStatus::Watching);
    }
    let status = monitor.poll(level, &mut ctrl, &mut hw, &mut sink);

    assert_eq!(status, PollStatus::Stalled);
    assert_eq!(ctrl.position(), 502, "position keeps the progress made");
    assert_eq!(ctrl.movement(), Movement::None);
    assert_eq!(ctrl.target(), None);
    assert!(!hw.line(Line::Up));
    assert!(!monitor.is_armed());
}

#[test]
fn descending_jam_near_the_bottom_keeps_position_in_range() {
    let (mut ctrl, mut monitor, mut hw, mut sink) = rig_at(10);

    ctrl.move_dir(Movement::Down, &mut hw, &mut sink);
    monitor.arm(hw.level(), ctrl.position());

    // The sensor never toggles again.
    let level = hw.level();
    let mut status = PollStatus::Watching;
    for _ in 0..8 {
        status = monitor.poll(level, &mut ctrl, &mut hw, &mut sink);
    }

    assert_eq!(status, PollStatus::Stalled);
    assert_eq!(ctrl.position(), 10);
    assert_eq!(ctrl.movement(), Movement::None);
    assert_eq!(ctrl.target(), None);
    assert!(!hw.line(Line::Down));
}

#[test]
fn retarget_mid_flight_reverses_and_lands() {
    let (mut ctrl, mut monitor, mut hw, mut sink) = rig_at(500);

    ctrl.set_target(600, &mut hw, &mut sink);
    monitor.arm(hw.level(), ctrl.position());
    poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);
    poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);
    assert_eq!(ctrl.position(), 502);

    // The operator changes their mind; the drive reverses in place.
    ctrl.set_target(498, &mut hw, &mut sink);
    assert_eq!(ctrl.movement(), Movement::Down);
    assert!(hw.line(Line::Down));
    assert!(!hw.line(Line::Up));

    for expected in (498..=501).rev() {
        poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);
        assert_eq!(ctrl.position(), expected);
    }
    assert_eq!(ctrl.movement(), Movement::None);
    assert_eq!(ctrl.target(), None);
}

#[test]
fn free_run_lands_on_the_limit() {
    let (mut ctrl, mut monitor, mut hw, mut sink) = rig_at(997);

    ctrl.move_dir(Movement::Up, &mut hw, &mut sink);
    monitor.arm(hw.level(), ctrl.position());

    for _ in 0..3 {
        let status = poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);
        assert_eq!(status, PollStatus::Watching);
    }

    assert_eq!(ctrl.position(), 1000);
    assert_eq!(ctrl.movement(), Movement::None);
    assert!(!hw.line(Line::Up));
}

#[test]
fn switch_toggle_leaves_the_mission_untouched() {
    let (mut ctrl, mut monitor, mut hw, mut sink) = rig_at(500);

    ctrl.set_target(600, &mut hw, &mut sink);
    monitor.arm(hw.level(), ctrl.position());
    poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);

    ctrl.set_switch(SwitchState::On, &mut hw, &mut sink);

    let snap = sink.last().expect("no snapshot published");
    assert_eq!(snap.switch, SwitchState::On);
    assert_eq!(snap.target, Some(600), "mission survives the lamp toggle");
    assert_eq!(snap.movement, Movement::Up);
    assert!(hw.line(Line::Up));
    assert!(hw.line(Line::Switch));

    // And the journey carries on.
    poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);
    assert_eq!(ctrl.position(), 502);
}

#[test]
fn high_travel_profile_runs_the_same_machine() {
    let config = LiftConfig {
        initial_position: 810,
        ..LiftConfig::high_travel()
    };
    let mut ctrl = LiftController::new(&config);
    let mut monitor = TickMonitor::new(config.stall_sample_threshold());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    // 816 is the cargo mast's upper stop.
    ctrl.set_target(900, &mut hw, &mut sink);
    assert_eq!(ctrl.target(), Some(816));

    monitor.arm(hw.level(), ctrl.position());
    for _ in 0..6 {
        poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);
    }
    assert_eq!(ctrl.position(), 816);
    assert_eq!(ctrl.movement(), Movement::None);
}

#[test]
fn stall_after_stop_command_never_fires() {
    let (mut ctrl, mut monitor, mut hw, mut sink) = rig_at(500);

    ctrl.set_target(800, &mut hw, &mut sink);
    monitor.arm(hw.level(), ctrl.position());
    poll_with_edge(&mut ctrl, &mut monitor, &mut hw, &mut sink);

    ctrl.stop(&mut hw, &mut sink);
    monitor.disarm();

    // A long quiet stretch on an idle lift is not a stall.
    let level = hw.level();
    for _ in 0..20 {
        let status = monitor.poll(level, &mut ctrl, &mut hw, &mut sink);
        assert_eq!(status, PollStatus::Disarmed);
    }
    assert_eq!(ctrl.position(), 501);
}
