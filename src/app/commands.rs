//! Inbound commands to the lift service.
//!
//! These represent actions requested by the outside world (BLE today,
//! serial tooling on the bench) that the
//! [`LiftService`](super::service::LiftService) interprets and acts upon.
//! They carry tick-unit values only; millimetre conversion happens at the
//! wire boundary in [`protocol`](crate::protocol).

use crate::motion::state::{Movement, SwitchState};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiftCommand {
    /// Engage the drive in a direction, or stop it (`Movement::None`).
    Move(Movement),

    /// Head for an absolute position (tick units, clamped to the travel
    /// range).
    SetTarget(i16),

    /// Head for a travel limit without knowing the profile's range.
    SetExtremum(Extremum),

    /// Drive the auxiliary switched line.  Dropped on profiles without
    /// the line fitted.
    SetSwitch(SwitchState),

    /// Disengage the drive and abandon any active mission.
    ForceStop,
}

/// Travel limit selector for [`LiftCommand::SetExtremum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    /// `max_position`.
    Top,
    /// `min_position`.
    Bottom,
}
