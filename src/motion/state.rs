//! Plain data types shared by the motion core and every port behind it.

use core::fmt;

// ---------------------------------------------------------------------------
// Direction of travel
// ---------------------------------------------------------------------------

/// Which way the drive is currently engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Movement {
    /// Driving toward `max_position`.
    Up,
    /// Driving toward `min_position`.
    Down,
    /// No drive line asserted.
    #[default]
    None,
}

impl Movement {
    /// Position delta contributed by one tick in this direction.
    pub const fn step(self) -> i16 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
            Self::None => 0,
        }
    }

    /// True for either driven direction.
    pub const fn is_moving(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
            Self::None => write!(f, "IDLE"),
        }
    }
}

// ---------------------------------------------------------------------------
// Auxiliary switched line
// ---------------------------------------------------------------------------

/// Commanded state of the auxiliary line (lamp relay on desk variants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchState {
    On,
    #[default]
    Off,
}

impl SwitchState {
    /// Output level the line is held at for this state.
    pub const fn level(self) -> bool {
        matches!(self, Self::On)
    }
}

// ---------------------------------------------------------------------------
// Output lines
// ---------------------------------------------------------------------------

/// The three level-held output lines the motion core drives through
/// `MotorPort`.  Exactly one of `Up`/`Down` may be asserted at a time;
/// the core clears both before asserting either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Up,
    Down,
    Switch,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A complete point-in-time view of the lift, published to the status sink
/// after every observable change.  `Copy` so sinks can stash it freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiftState {
    /// Current position in tick units.  Always within the configured
    /// travel range.
    pub position: i16,
    /// Position the drive is heading for, if any.  `None` whenever no
    /// mission is active; never a sentinel value (negative positions are
    /// legal).
    pub target: Option<i16>,
    /// Currently engaged direction.
    pub movement: Movement,
    /// Commanded auxiliary line state.
    pub switch: SwitchState,
}

impl LiftState {
    /// Idle snapshot at the given position.
    pub fn new(position: i16) -> Self {
        Self {
            position,
            target: None,
            movement: Movement::None,
            switch: SwitchState::Off,
        }
    }
}
