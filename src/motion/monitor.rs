//! Debounced tick sampling and the stall watchdog.
//!
//! On polled profiles the spindle sensor line is sampled every
//! `poll_interval_ms`.  A level change since the previous sample counts as
//! exactly one tick of travel; a line that bounces several times inside one
//! period still yields a single tick.
//!
//! The same sampling loop doubles as the stall watchdog: while the drive is
//! engaged, every sample that leaves the position unchanged is counted, and
//! hitting the configured threshold aborts the move.  A seized spindle,
//! a broken sensor and a jammed carriage all look identical from here, and
//! all three end the same way: drive off, mission dropped.
//!
//! The monitor is armed when movement starts and disarmed when it ends, so
//! an idle lift pays nothing for the free-running poll timer.

use log::{debug, warn};

use super::LiftController;
use crate::app::ports::{MotorPort, StatusSink};

/// What a single poll concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// Monitor not armed; the sample was discarded.
    Disarmed,
    /// Sample accounted, move still in progress (or just completed).
    Watching,
    /// Stall threshold hit; the move was aborted this sample.
    Stalled,
}

pub struct TickMonitor {
    /// Consecutive no-progress samples that trigger the stall abort.
    threshold: u32,
    armed: bool,
    last_level: bool,
    last_position: i16,
    idle_samples: u32,
}

impl TickMonitor {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            armed: false,
            last_level: false,
            last_position: 0,
            idle_samples: 0,
        }
    }

    /// Start watching a move.  Seeding `level` from a fresh line read kills
    /// the spurious tick a stale comparison level would produce on the
    /// first sample.
    pub fn arm(&mut self, level: bool, position: i16) {
        self.armed = true;
        self.last_level = level;
        self.last_position = position;
        self.idle_samples = 0;
        debug!("tick monitor armed at position {position}");
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Account one sample of the tick line.
    ///
    /// Order matters: the tick is applied first so a sample that moved the
    /// carriage resets the stall count instead of feeding it.
    pub fn poll(
        &mut self,
        level: bool,
        ctrl: &mut LiftController,
        hw: &mut impl MotorPort,
        sink: &mut impl StatusSink,
    ) -> PollStatus {
        if !self.armed {
            return PollStatus::Disarmed;
        }

        if level != self.last_level {
            self.last_level = level;
            ctrl.on_tick(hw, sink);
        }

        if ctrl.position() != self.last_position {
            self.last_position = ctrl.position();
            self.idle_samples = 0;
        } else if ctrl.is_moving() {
            self.idle_samples += 1;
            if self.idle_samples >= self.threshold {
                warn!(
                    "stall: no progress at position {} for {} samples, aborting move",
                    ctrl.position(),
                    self.idle_samples
                );
                ctrl.force_stall_stop(hw, sink);
                self.disarm();
                return PollStatus::Stalled;
            }
        }

        PollStatus::Watching
    }
}
