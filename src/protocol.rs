//! Control and status wire protocol.
//!
//! Command frames (written to the control characteristic):
//! ```text
//! ┌────────┬───────────────────────────┐
//! │ Opcode │ Payload                   │
//! ├────────┼───────────────────────────┤
//! │ 0x01   │ direction byte            │  MOVE
//! │ 0x03   │ switch byte (0x00/0x01)   │  SET_SWITCH
//! │ 0x60   │ height, mm, LE i16        │  SET_TARGET
//! │ 0x6E   │ 0x01 = top, 0x02 = bottom │  SET_EXTREMUM
//! │ 0xAA   │ —                         │  FORCE_STOP
//! └────────┴───────────────────────────┘
//! ```
//!
//! Status frame (notified / read back, 6 bytes):
//! ```text
//! ┌──────────────┬──────────────┬────────────┬──────────┐
//! │ height mm    │ target mm    │ target set │ movement │
//! │ LE i16       │ LE i16       │ u8         │ u8       │
//! └──────────────┴──────────────┴────────────┴──────────┘
//! ```
//!
//! Frame lengths are exact: a recognised opcode with the wrong payload
//! length is treated the same as an unknown opcode — dropped without a
//! reply.  Heights cross this boundary in millimetres; everything behind
//! it works in tick units, converted here with the profile's spindle
//! scale.  The motion core never sees a raw byte.

use crate::app::commands::{Extremum, LiftCommand};
use crate::config::LiftConfig;
use crate::motion::state::{Movement, SwitchState};

// ---------------------------------------------------------------------------
// Wire constants
// ---------------------------------------------------------------------------

pub const CMD_MOVE: u8 = 0x01;
pub const CMD_SET_SWITCH: u8 = 0x03;
pub const CMD_SET_TARGET: u8 = 0x60;
pub const CMD_SET_EXTREMUM: u8 = 0x6E;
pub const CMD_FORCE_STOP: u8 = 0xAA;

/// Direction bytes are sparse on purpose: a flipped bit in flight turns a
/// MOVE into garbage, not into the opposite direction.
pub const DIR_UP: u8 = 0xCB;
pub const DIR_DOWN: u8 = 0x92;
pub const DIR_NONE: u8 = 0xA1;

pub const SWITCH_OFF: u8 = 0x00;
pub const SWITCH_ON: u8 = 0x01;

pub const EXTREMUM_TOP: u8 = 0x01;
pub const EXTREMUM_BOTTOM: u8 = 0x02;

pub const TARGET_UNSET: u8 = 0x00;
pub const TARGET_SET: u8 = 0x01;

/// Longest legal command frame (SET_TARGET).
pub const MAX_COMMAND_LEN: usize = 3;
/// Fixed status frame length.
pub const STATUS_FRAME_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Height scale
// ---------------------------------------------------------------------------

/// Tick position → absolute height in millimetres.
pub fn ticks_to_mm(ticks: i16, cfg: &LiftConfig) -> i16 {
    let um = i64::from(ticks) * i64::from(cfg.tick_to_um) + i64::from(cfg.base_height_um);
    (um / 1000).clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

/// Absolute height in millimetres → tick position.
///
/// Truncates toward zero; heights below the base come out negative and are
/// left for the motion core to clamp into the travel range.
pub fn mm_to_ticks(mm: i16, cfg: &LiftConfig) -> i16 {
    let um = i64::from(mm) * 1000 - i64::from(cfg.base_height_um);
    (um / i64::from(cfg.tick_to_um)).clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

// ---------------------------------------------------------------------------
// Command decoding
// ---------------------------------------------------------------------------

/// Decode one command frame.
///
/// Returns `None` for anything malformed — unknown opcode, bad payload
/// byte, wrong length.  Callers drop such frames silently; a remote that
/// speaks a newer protocol revision must not wedge the lift.
pub fn decode_command(data: &[u8], cfg: &LiftConfig) -> Option<LiftCommand> {
    match (*data.first()?, data.len()) {
        (CMD_MOVE, 2) => movement_from_wire(data[1]).map(LiftCommand::Move),
        (CMD_SET_SWITCH, 2) => match data[1] {
            SWITCH_OFF => Some(LiftCommand::SetSwitch(SwitchState::Off)),
            SWITCH_ON => Some(LiftCommand::SetSwitch(SwitchState::On)),
            _ => None,
        },
        (CMD_SET_TARGET, 3) => {
            let mm = i16::from_le_bytes([data[1], data[2]]);
            Some(LiftCommand::SetTarget(mm_to_ticks(mm, cfg)))
        }
        (CMD_SET_EXTREMUM, 2) => match data[1] {
            EXTREMUM_TOP => Some(LiftCommand::SetExtremum(Extremum::Top)),
            EXTREMUM_BOTTOM => Some(LiftCommand::SetExtremum(Extremum::Bottom)),
            _ => None,
        },
        (CMD_FORCE_STOP, 1) => Some(LiftCommand::ForceStop),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Status encoding
// ---------------------------------------------------------------------------

/// Encode the 6-byte status frame from a state snapshot.
/// The target field reads as zero millimetres while no mission is active;
/// the `target set` flag disambiguates.
pub fn encode_status(
    state: &crate::motion::state::LiftState,
    cfg: &LiftConfig,
) -> [u8; STATUS_FRAME_LEN] {
    let mut frame = [0u8; STATUS_FRAME_LEN];
    frame[0..2].copy_from_slice(&ticks_to_mm(state.position, cfg).to_le_bytes());

    let (target_mm, flag) = match state.target {
        Some(t) => (ticks_to_mm(t, cfg), TARGET_SET),
        None => (0, TARGET_UNSET),
    };
    frame[2..4].copy_from_slice(&target_mm.to_le_bytes());
    frame[4] = flag;
    frame[5] = movement_to_wire(state.movement);
    frame
}

pub fn movement_to_wire(movement: Movement) -> u8 {
    match movement {
        Movement::Up => DIR_UP,
        Movement::Down => DIR_DOWN,
        Movement::None => DIR_NONE,
    }
}

pub fn movement_from_wire(byte: u8) -> Option<Movement> {
    match byte {
        DIR_UP => Some(Movement::Up),
        DIR_DOWN => Some(Movement::Down),
        DIR_NONE => Some(Movement::None),
        _ => None,
    }
}
