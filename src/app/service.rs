//! Application service — the hexagonal core.
//!
//! [`LiftService`] owns the motion controller and its tick monitor.  It
//! exposes a clean, hardware-agnostic API.  All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!    TickPort ──▶ ┌────────────────────────┐ ──▶ StatusSink
//!                 │      LiftService        │
//!   MotorPort ◀── │  Controller · Monitor   │ ──▶ PulsePort
//!                 └────────────────────────┘
//! ```
//!
//! The service is also where the stall watchdog and the bench pulse
//! generator follow the drive: after every dispatched operation it
//! reconciles "is the lift moving?" with "is the monitor armed / the
//! wave running?".  The motion core itself never learns either exists.

use log::{debug, info};

use crate::config::{LiftConfig, TickMode};
use crate::motion::monitor::TickMonitor;
use crate::motion::state::LiftState;
use crate::motion::LiftController;

use super::commands::{Extremum, LiftCommand};
use super::ports::{MotorPort, PulsePort, StatusSink, TickPort};
use super::status::StatusReport;

// ───────────────────────────────────────────────────────────────
// LiftService
// ───────────────────────────────────────────────────────────────

/// Orchestrates the motion core for one lift unit.
pub struct LiftService {
    ctrl: LiftController,
    monitor: TickMonitor,
    config: LiftConfig,
    pulse_running: bool,
}

impl LiftService {
    /// Construct the service from a validated configuration.
    pub fn new(config: LiftConfig) -> Self {
        let ctrl = LiftController::new(&config);
        let monitor = TickMonitor::new(config.stall_sample_threshold());
        Self {
            ctrl,
            monitor,
            config,
            pulse_running: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Publish the boot snapshot so every sink starts from known state.
    pub fn start(&mut self, sink: &mut impl StatusSink) {
        sink.publish(&self.ctrl.state());
        info!(
            "LiftService up at position {} (range {}..={}, {:?})",
            self.ctrl.position(),
            self.config.min_position,
            self.config.max_position,
            self.config.tick_mode,
        );
    }

    // ── Command handling ──────────────────────────────────────

    /// Dispatch one decoded command into the motion core.
    ///
    /// The `hw` parameter satisfies all three hardware-facing ports —
    /// this avoids a double mutable borrow while keeping the boundary
    /// explicit.
    pub fn handle_command(
        &mut self,
        command: LiftCommand,
        hw: &mut (impl MotorPort + TickPort + PulsePort),
        sink: &mut impl StatusSink,
    ) {
        debug!("command: {:?}", command);
        match command {
            LiftCommand::Move(dir) => self.ctrl.move_dir(dir, hw, sink),
            LiftCommand::SetTarget(ticks) => self.ctrl.set_target(ticks, hw, sink),
            LiftCommand::SetExtremum(Extremum::Top) => {
                self.ctrl.set_target(self.config.max_position, hw, sink);
            }
            LiftCommand::SetExtremum(Extremum::Bottom) => {
                self.ctrl.set_target(self.config.min_position, hw, sink);
            }
            LiftCommand::ForceStop => self.ctrl.stop(hw, sink),
            LiftCommand::SetSwitch(requested) => {
                if self.config.has_aux_switch {
                    self.ctrl.set_switch(requested, hw, sink);
                } else {
                    debug!("aux switch not fitted on this profile, command dropped");
                }
            }
        }
        self.follow_drive(hw);
    }

    // ── Position feedback ─────────────────────────────────────

    /// One sample of the tick line (polled profiles; driven by the
    /// motion poll timer).
    pub fn poll_motion(
        &mut self,
        hw: &mut (impl MotorPort + TickPort + PulsePort),
        sink: &mut impl StatusSink,
    ) {
        if self.config.tick_mode != TickMode::Polled {
            return;
        }
        let level = hw.tick_level();
        self.monitor.poll(level, &mut self.ctrl, hw, sink);
        self.follow_drive(hw);
    }

    /// One spindle edge (edge-interrupt profiles; driven by the GPIO ISR
    /// through the event queue).
    pub fn on_tick_edge(
        &mut self,
        hw: &mut (impl MotorPort + TickPort + PulsePort),
        sink: &mut impl StatusSink,
    ) {
        self.ctrl.on_tick(hw, sink);
        self.follow_drive(hw);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current state snapshot.
    pub fn state(&self) -> LiftState {
        self.ctrl.state()
    }

    /// Current snapshot converted to height units.
    pub fn status_report(&self) -> StatusReport {
        StatusReport::from_state(&self.ctrl.state(), &self.config)
    }

    pub fn config(&self) -> &LiftConfig {
        &self.config
    }

    /// Whether the stall watchdog is currently watching a move.
    pub fn watchdog_armed(&self) -> bool {
        self.monitor.is_armed()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Reconcile the stall watchdog and the bench pulse source with the
    /// drive state.  Arming seeds the monitor from a fresh line read so
    /// the first sample cannot produce a phantom tick.
    fn follow_drive(&mut self, hw: &mut (impl MotorPort + TickPort + PulsePort)) {
        let moving = self.ctrl.is_moving();

        if self.config.tick_mode == TickMode::Polled {
            if moving && !self.monitor.is_armed() {
                let level = hw.tick_level();
                self.monitor.arm(level, self.ctrl.position());
            } else if !moving && self.monitor.is_armed() {
                self.monitor.disarm();
            }
        }

        if self.config.use_pulse_generator {
            if moving && !self.pulse_running {
                hw.pulse_start();
                self.pulse_running = true;
            } else if !moving && self.pulse_running {
                hw.pulse_stop();
                self.pulse_running = false;
            }
        }
    }
}
