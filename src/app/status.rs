//! Height-domain view of a state snapshot.
//!
//! The motion core thinks in tick units; everything a human or a remote
//! sees is millimetres above the floor.  `StatusReport` is the converted
//! view, built once per snapshot with the profile's spindle scale.

use core::fmt;

use crate::config::LiftConfig;
use crate::motion::state::{LiftState, Movement, SwitchState};
use crate::protocol;

/// A snapshot converted into height units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    /// Current height above the floor, millimetres.
    pub height_mm: i16,
    /// Mission height, millimetres, while a mission is active.
    pub target_mm: Option<i16>,
    pub movement: Movement,
    pub switch: SwitchState,
}

impl StatusReport {
    pub fn from_state(state: &LiftState, cfg: &LiftConfig) -> Self {
        Self {
            height_mm: protocol::ticks_to_mm(state.position, cfg),
            target_mm: state.target.map(|t| protocol::ticks_to_mm(t, cfg)),
            movement: state.movement,
            switch: state.switch,
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target_mm {
            Some(t) => write!(f, "{} mm -> {} mm [{}]", self.height_mm, t, self.movement),
            None => write!(f, "{} mm [{}]", self.height_mm, self.movement),
        }?;
        if self.switch == SwitchState::On {
            write!(f, " +switch")?;
        }
        Ok(())
    }
}
