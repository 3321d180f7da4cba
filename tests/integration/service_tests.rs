//! Scenario tests for [`LiftService`]: decoded commands in, line levels and
//! status snapshots out, with the stall watchdog and pulse generator
//! following the drive exactly as they do on the unit.
//!
//! Each QA block below mirrors one bench acceptance scenario.

use skylift::app::commands::{Extremum, LiftCommand};
use skylift::app::service::LiftService;
use skylift::config::{LiftConfig, TickMode};
use skylift::motion::state::{Line, Movement, SwitchState};

use crate::mock_hw::{MockHardware, MotorCall, RecordingSink};

fn make_app(config: LiftConfig) -> (LiftService, MockHardware, RecordingSink) {
    (
        LiftService::new(config),
        MockHardware::new(),
        RecordingSink::new(),
    )
}

fn desk_at(position: i16) -> LiftConfig {
    LiftConfig {
        initial_position: position,
        ..LiftConfig::default()
    }
}

// ── QA-01: boot snapshot ──────────────────────────────────────

#[test]
fn boot_publishes_one_complete_snapshot() {
    let (mut app, _hw, mut sink) = make_app(desk_at(120));

    app.start(&mut sink);

    assert_eq!(sink.snapshots.len(), 1);
    let snap = &sink.snapshots[0];
    assert_eq!(snap.position, 120);
    assert_eq!(snap.target, None);
    assert_eq!(snap.movement, Movement::None);
    assert!(!app.watchdog_armed());
}

// ── QA-02: target mission, poll-driven to arrival ─────────────

#[test]
fn target_command_drives_to_arrival_and_disarms() {
    let (mut app, mut hw, mut sink) = make_app(desk_at(500));

    app.handle_command(LiftCommand::SetTarget(503), &mut hw, &mut sink);
    assert_eq!(app.state().movement, Movement::Up);
    assert!(hw.line(Line::Up));
    assert!(app.watchdog_armed(), "watchdog arms with the drive");

    for _ in 0..3 {
        hw.toggle_level();
        app.poll_motion(&mut hw, &mut sink);
    }

    let state = app.state();
    assert_eq!(state.position, 503);
    assert_eq!(state.movement, Movement::None);
    assert_eq!(state.target, None);
    assert!(!hw.line(Line::Up));
    assert!(!app.watchdog_armed(), "watchdog stands down with the drive");
}

// ── QA-03: jammed carriage aborts the move ────────────────────

#[test]
fn jam_aborts_after_the_stall_budget() {
    let (mut app, mut hw, mut sink) = make_app(desk_at(500));

    app.handle_command(LiftCommand::Move(Movement::Up), &mut hw, &mut sink);
    assert!(app.watchdog_armed());

    // The line never moves again.  Default budget: 1200 / 150 = 8 samples.
    for i in 1..8 {
        app.poll_motion(&mut hw, &mut sink);
        assert_eq!(
            app.state().movement,
            Movement::Up,
            "sample {i} is inside the stall budget"
        );
    }
    app.poll_motion(&mut hw, &mut sink);

    let state = app.state();
    assert_eq!(state.movement, Movement::None);
    assert_eq!(state.target, None);
    assert_eq!(state.position, 500);
    assert!(!hw.line(Line::Up));
    assert!(!app.watchdog_armed());
    // Engage snapshot plus the abort snapshot, nothing in between.
    assert_eq!(sink.snapshots.len(), 2);
}

#[test]
fn progress_keeps_resetting_the_stall_budget() {
    let (mut app, mut hw, mut sink) = make_app(desk_at(500));
    app.handle_command(LiftCommand::Move(Movement::Up), &mut hw, &mut sink);

    // Seven frozen samples, then one real edge, three times over.
    for _ in 0..3 {
        for _ in 0..7 {
            app.poll_motion(&mut hw, &mut sink);
        }
        hw.toggle_level();
        app.poll_motion(&mut hw, &mut sink);
        assert_eq!(app.state().movement, Movement::Up);
    }
    assert_eq!(app.state().position, 503);
}

// ── QA-04: aux switch fit-out gating ──────────────────────────

#[test]
fn switch_command_works_on_the_desk_profile() {
    let (mut app, mut hw, mut sink) = make_app(desk_at(0));

    app.handle_command(LiftCommand::SetSwitch(SwitchState::On), &mut hw, &mut sink);

    assert!(hw.line(Line::Switch));
    assert_eq!(sink.snapshots.len(), 1);
    assert_eq!(app.state().switch, SwitchState::On);
}

#[test]
fn switch_command_dropped_without_the_relay_fitted() {
    let (mut app, mut hw, mut sink) = make_app(LiftConfig::high_travel());

    app.handle_command(LiftCommand::SetSwitch(SwitchState::On), &mut hw, &mut sink);

    assert!(hw.calls.is_empty(), "no line may move");
    assert!(sink.snapshots.is_empty());
    assert_eq!(app.state().switch, SwitchState::Off);
}

// ── QA-05: extremum commands map to the travel limits ─────────

#[test]
fn extremum_commands_head_for_the_stops() {
    let (mut app, mut hw, mut sink) = make_app(desk_at(500));

    app.handle_command(
        LiftCommand::SetExtremum(Extremum::Top),
        &mut hw,
        &mut sink,
    );
    assert_eq!(app.state().target, Some(1000));
    assert_eq!(app.state().movement, Movement::Up);

    app.handle_command(
        LiftCommand::SetExtremum(Extremum::Bottom),
        &mut hw,
        &mut sink,
    );
    assert_eq!(app.state().target, Some(0));
    assert_eq!(app.state().movement, Movement::Down);
    assert!(hw.line(Line::Down));
    assert!(!hw.line(Line::Up));
}

// ── QA-06: bench pulse generator follows the drive ────────────

#[test]
fn pulse_generator_tracks_the_drive() {
    let config = LiftConfig {
        use_pulse_generator: true,
        ..desk_at(500)
    };
    let (mut app, mut hw, mut sink) = make_app(config);

    app.handle_command(LiftCommand::Move(Movement::Up), &mut hw, &mut sink);
    assert!(hw.pulse_running());

    app.handle_command(LiftCommand::ForceStop, &mut hw, &mut sink);
    assert!(!hw.pulse_running());

    let pulse_calls: Vec<_> = hw
        .calls
        .iter()
        .filter(|c| matches!(c, MotorCall::PulseStart | MotorCall::PulseStop))
        .collect();
    assert_eq!(pulse_calls, [&MotorCall::PulseStart, &MotorCall::PulseStop]);
}

#[test]
fn real_sensor_units_never_touch_the_pulse_port() {
    let (mut app, mut hw, mut sink) = make_app(desk_at(500));

    app.handle_command(LiftCommand::Move(Movement::Up), &mut hw, &mut sink);
    app.handle_command(LiftCommand::ForceStop, &mut hw, &mut sink);

    assert!(!hw
        .calls
        .iter()
        .any(|c| matches!(c, MotorCall::PulseStart | MotorCall::PulseStop)));
}

// ── QA-07: edge-interrupt profile ─────────────────────────────

#[test]
fn edge_profile_ignores_the_poll_timer() {
    let config = LiftConfig {
        tick_mode: TickMode::EdgeInterrupt,
        ..desk_at(500)
    };
    let (mut app, mut hw, mut sink) = make_app(config);

    app.handle_command(LiftCommand::SetTarget(502), &mut hw, &mut sink);
    assert!(
        !app.watchdog_armed(),
        "no stall watch without the sampling loop"
    );

    // Poll ticks do nothing on this profile, however many arrive.
    for _ in 0..10 {
        hw.toggle_level();
        app.poll_motion(&mut hw, &mut sink);
    }
    assert_eq!(app.state().position, 500);

    // Spindle edges do the travelling instead.
    app.on_tick_edge(&mut hw, &mut sink);
    app.on_tick_edge(&mut hw, &mut sink);

    let state = app.state();
    assert_eq!(state.position, 502);
    assert_eq!(state.movement, Movement::None);
}

// ── QA-08: stop commands stand the watchdog down ──────────────

#[test]
fn stop_command_disarms_the_watchdog() {
    let (mut app, mut hw, mut sink) = make_app(desk_at(500));

    app.handle_command(LiftCommand::Move(Movement::Down), &mut hw, &mut sink);
    assert!(app.watchdog_armed());

    app.handle_command(LiftCommand::Move(Movement::None), &mut hw, &mut sink);
    assert!(!app.watchdog_armed());
    assert_eq!(app.state().movement, Movement::None);
}

// ── QA-09: status report speaks millimetres ───────────────────

#[test]
fn status_report_converts_with_the_profile_scale() {
    let (mut app, mut hw, mut sink) = make_app(desk_at(500));
    app.handle_command(LiftCommand::SetTarget(506), &mut hw, &mut sink);

    let report = app.status_report();
    // (500·525 + 834 000) / 1000 = 1096 mm.
    assert_eq!(report.height_mm, 1096);
    assert_eq!(report.target_mm, Some(1099));
    assert_eq!(report.movement, Movement::Up);
}
