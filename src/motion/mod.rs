//! Motion core: the lift state machine.
//!
//! `LiftController` owns the canonical `LiftState` and is the only place that
//! mutates it.  It drives the relay lines through `MotorPort`, publishes a
//! complete snapshot through `StatusSink` after every observable change, and
//! never blocks, allocates, or fails: every operation either applies, clamps,
//! or no-ops.
//!
//! Tick accounting (debounce, stall watch) lives in [`monitor`]; the
//! controller only ever hears "one tick of travel happened".

pub mod monitor;
pub mod state;

use log::debug;

use crate::app::ports::{MotorPort, StatusSink};
use crate::config::LiftConfig;
use state::{Line, LiftState, Movement, SwitchState};

/// The lift state machine.
///
/// Invariants upheld by every operation:
/// - `position` stays within `[min, max]`.
/// - At most one of the UP/DOWN lines is asserted, and both are cleared
///   before `movement` changes, so the recorded state never claims a
///   direction the pins contradict.
/// - `movement == None` implies `target == None`: an idle lift has no
///   pending mission.
pub struct LiftController {
    state: LiftState,
    min: i16,
    max: i16,
}

impl LiftController {
    /// Build a controller from a validated config.  The assumed power-on
    /// position is clamped into the travel range.
    pub fn new(config: &LiftConfig) -> Self {
        let position = config
            .initial_position
            .clamp(config.min_position, config.max_position);
        Self {
            state: LiftState::new(position),
            min: config.min_position,
            max: config.max_position,
        }
    }

    pub fn state(&self) -> LiftState {
        self.state
    }

    pub fn position(&self) -> i16 {
        self.state.position
    }

    pub fn target(&self) -> Option<i16> {
        self.state.target
    }

    pub fn movement(&self) -> Movement {
        self.state.movement
    }

    pub fn is_moving(&self) -> bool {
        self.state.movement.is_moving()
    }

    /// Aim the lift at an absolute position (tick units).
    ///
    /// The value is clamped into the travel range.  Asking for the spot the
    /// lift already occupies, or re-sending the active target, is silent.
    /// Otherwise the target is recorded and the drive engages toward it;
    /// if the drive is already running the right way only the snapshot
    /// changes.
    pub fn set_target(
        &mut self,
        requested: i16,
        hw: &mut impl MotorPort,
        sink: &mut impl StatusSink,
    ) {
        let t = requested.clamp(self.min, self.max);
        if t == self.state.position || Some(t) == self.state.target {
            return;
        }

        self.state.target = Some(t);
        let dir = if t < self.state.position {
            Movement::Down
        } else {
            Movement::Up
        };

        if dir == self.state.movement {
            // Already heading the right way; the mission just got longer
            // or shorter.
            self.publish(sink);
        } else {
            self.move_dir(dir, hw, sink);
        }
    }

    /// Engage the drive in `dir`, or stop it with `Movement::None`.
    ///
    /// Re-requesting the current direction is a strict no-op.  A request
    /// that would push past a travel limit is rejected: the lines stay
    /// clear and the lift ends up idle.  Any path that ends idle also
    /// drops the target.
    pub fn move_dir(
        &mut self,
        dir: Movement,
        hw: &mut impl MotorPort,
        sink: &mut impl StatusSink,
    ) {
        if dir == self.state.movement {
            return;
        }

        // Both lines go low before the state admits to any change of
        // direction.  A crash between these two steps leaves the motor
        // safely stopped rather than the state lying about a live line.
        hw.clear_line(Line::Up);
        hw.clear_line(Line::Down);

        let engaged = match dir {
            Movement::Up if self.state.position < self.max => {
                hw.assert_line(Line::Up);
                Movement::Up
            }
            Movement::Down if self.state.position > self.min => {
                hw.assert_line(Line::Down);
                Movement::Down
            }
            // Stop request, or a move rejected at the travel limit.
            _ => Movement::None,
        };

        debug!("drive {} -> {}", self.state.movement, engaged);
        self.state.movement = engaged;
        if engaged == Movement::None {
            self.state.target = None;
        }
        self.publish(sink);
    }

    /// Disengage the drive.  Equivalent to `move_dir(Movement::None)`.
    pub fn stop(&mut self, hw: &mut impl MotorPort, sink: &mut impl StatusSink) {
        self.move_dir(Movement::None, hw, sink);
    }

    /// Account one tick of travel in the engaged direction.
    ///
    /// Ignored while idle.  Publishes the moved position, then checks
    /// arrival: reaching the target (direction-aware, so a missed exact
    /// match still lands) or a travel limit stops the drive.
    pub fn on_tick(&mut self, hw: &mut impl MotorPort, sink: &mut impl StatusSink) {
        let step = self.state.movement.step();
        if step == 0 {
            return;
        }

        self.state.position = self
            .state
            .position
            .saturating_add(step)
            .clamp(self.min, self.max);
        self.publish(sink);

        let reached_target = match (self.state.movement, self.state.target) {
            (Movement::Down, Some(t)) => self.state.position <= t,
            (Movement::Up, Some(t)) => self.state.position >= t,
            _ => false,
        };
        let reached_limit = match self.state.movement {
            Movement::Down => self.state.position <= self.min,
            Movement::Up => self.state.position >= self.max,
            Movement::None => false,
        };

        if reached_target || reached_limit {
            self.stop(hw, sink);
        }
    }

    /// Drive the auxiliary switched line.
    ///
    /// Silent only when the tracked state **and** the observed line level
    /// both already match; a line that drifted out of sync (brown-out,
    /// external meddling) gets rewritten.
    pub fn set_switch(
        &mut self,
        requested: SwitchState,
        hw: &mut impl MotorPort,
        sink: &mut impl StatusSink,
    ) {
        let line_matches = hw.line_asserted(Line::Switch) == requested.level();
        if requested == self.state.switch && line_matches {
            return;
        }

        if requested.level() {
            hw.assert_line(Line::Switch);
        } else {
            hw.clear_line(Line::Switch);
        }
        self.state.switch = requested;
        self.publish(sink);
    }

    /// Emergency idle, used by the stall watchdog.  Bypasses the usual
    /// limit bookkeeping: lines cleared, mission dropped, position kept
    /// (clamped) wherever the lift ground to a halt.
    pub fn force_stall_stop(&mut self, hw: &mut impl MotorPort, sink: &mut impl StatusSink) {
        hw.clear_line(Line::Up);
        hw.clear_line(Line::Down);
        self.state.position = self.state.position.clamp(self.min, self.max);
        self.state.target = None;
        self.state.movement = Movement::None;
        self.publish(sink);
    }

    fn publish(&self, sink: &mut impl StatusSink) {
        sink.publish(&self.state);
    }
}
