//! Wire-level journeys: raw control frames decoded, dispatched into the
//! service, and read back as status frames — the full BLE byte path minus
//! the radio.
//!
//! Field-by-field decode coverage lives with the `protocol` module; these
//! tests check that what goes over the wire round-trips through a live
//! service.

use skylift::app::service::LiftService;
use skylift::config::LiftConfig;
use skylift::motion::state::Movement;
use skylift::protocol::{
    self, CMD_FORCE_STOP, CMD_MOVE, CMD_SET_EXTREMUM, CMD_SET_TARGET, DIR_NONE, DIR_UP,
    EXTREMUM_BOTTOM, TARGET_SET, TARGET_UNSET,
};

use crate::mock_hw::{MockHardware, RecordingSink};

/// Decode `frame` against the service's profile and dispatch it.
/// Panics on frames the firmware would drop; tests send only legal ones.
fn send(app: &mut LiftService, hw: &mut MockHardware, sink: &mut RecordingSink, frame: &[u8]) {
    let command = protocol::decode_command(frame, app.config())
        .unwrap_or_else(|| panic!("frame {frame:02x?} did not decode"));
    app.handle_command(command, hw, sink);
}

fn status_frame(app: &LiftService) -> [u8; protocol::STATUS_FRAME_LEN] {
    protocol::encode_status(&app.state(), app.config())
}

fn rig() -> (LiftService, MockHardware, RecordingSink) {
    let config = LiftConfig {
        initial_position: 500,
        ..LiftConfig::default()
    };
    (
        LiftService::new(config),
        MockHardware::new(),
        RecordingSink::new(),
    )
}

#[test]
fn move_frame_shows_up_in_the_status_frame() {
    let (mut app, mut hw, mut sink) = rig();

    send(&mut app, &mut hw, &mut sink, &[CMD_MOVE, DIR_UP]);

    let frame = status_frame(&app);
    assert_eq!(frame[5], DIR_UP);
    assert_eq!(frame[4], TARGET_UNSET, "free run carries no mission");

    send(&mut app, &mut hw, &mut sink, &[CMD_MOVE, DIR_NONE]);
    assert_eq!(status_frame(&app)[5], DIR_NONE);
}

#[test]
fn target_frame_round_trips_through_a_full_mission() {
    let (mut app, mut hw, mut sink) = rig();

    // 1107 mm sits exactly on tick 520 of the desk profile, so the
    // frames read back without truncation drift.
    let mm = 1107i16.to_le_bytes();
    send(&mut app, &mut hw, &mut sink, &[CMD_SET_TARGET, mm[0], mm[1]]);

    let frame = status_frame(&app);
    assert_eq!(i16::from_le_bytes([frame[2], frame[3]]), 1107);
    assert_eq!(frame[4], TARGET_SET);
    assert_eq!(frame[5], DIR_UP);

    // Drive the spindle the whole way up.
    while app.state().movement != Movement::None {
        hw.toggle_level();
        app.poll_motion(&mut hw, &mut sink);
    }

    let frame = status_frame(&app);
    assert_eq!(i16::from_le_bytes([frame[0], frame[1]]), 1107);
    assert_eq!(i16::from_le_bytes([frame[2], frame[3]]), 0);
    assert_eq!(frame[4], TARGET_UNSET);
    assert_eq!(frame[5], DIR_NONE);
}

#[test]
fn extremum_frame_lands_on_the_bottom_stop() {
    let (mut app, mut hw, mut sink) = rig();

    send(
        &mut app,
        &mut hw,
        &mut sink,
        &[CMD_SET_EXTREMUM, EXTREMUM_BOTTOM],
    );
    assert_eq!(app.state().target, Some(0));

    while app.state().movement != Movement::None {
        hw.toggle_level();
        app.poll_motion(&mut hw, &mut sink);
    }

    // Position 0 on the desk profile is the 834 mm base height.
    let frame = status_frame(&app);
    assert_eq!(i16::from_le_bytes([frame[0], frame[1]]), 834);
}

#[test]
fn force_stop_frame_abandons_the_mission() {
    let (mut app, mut hw, mut sink) = rig();

    let mm = 1200i16.to_le_bytes();
    send(&mut app, &mut hw, &mut sink, &[CMD_SET_TARGET, mm[0], mm[1]]);
    hw.toggle_level();
    app.poll_motion(&mut hw, &mut sink);

    send(&mut app, &mut hw, &mut sink, &[CMD_FORCE_STOP]);

    let frame = status_frame(&app);
    assert_eq!(frame[4], TARGET_UNSET);
    assert_eq!(frame[5], DIR_NONE);
    assert!(!app.watchdog_armed());
}

#[test]
fn same_height_decodes_differently_per_profile() {
    let desk = LiftConfig::default();
    let cargo = LiftConfig::high_travel();
    let mm = 1500i16.to_le_bytes();
    let frame = [CMD_SET_TARGET, mm[0], mm[1]];

    let on_desk = protocol::decode_command(&frame, &desk);
    let on_cargo = protocol::decode_command(&frame, &cargo);

    // 1500 mm of height is many more fine-pitch ticks than coarse ones.
    use skylift::app::commands::LiftCommand;
    match (on_desk, on_cargo) {
        (Some(LiftCommand::SetTarget(d)), Some(LiftCommand::SetTarget(c))) => {
            assert_eq!(d, 1268);
            assert_eq!(c, 169);
        }
        other => panic!("unexpected decode {other:?}"),
    }
}

#[test]
fn dropped_frames_leave_the_service_untouched() {
    let (mut app, mut hw, mut sink) = rig();
    let before = app.state();

    for frame in [
        &[0x02u8, 0x00] as &[u8],
        &[CMD_MOVE, 0x55],
        &[CMD_SET_TARGET, 0x00],
        &[CMD_FORCE_STOP, 0x00],
        &[],
    ] {
        assert_eq!(protocol::decode_command(frame, app.config()), None);
    }

    assert_eq!(app.state(), before);
    assert!(hw.calls.is_empty());
    assert!(sink.snapshots.is_empty());
}
