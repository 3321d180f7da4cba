//! Mock hardware adapter for integration tests.
//!
//! Records every line transition so tests can assert on the full command
//! history without touching real GPIO/LEDC registers.

use skylift::app::ports::{ConfigError, ConfigPort, MotorPort, PulsePort, StatusSink, TickPort};
use skylift::config::LiftConfig;
use skylift::motion::state::{Line, LiftState};
use std::cell::RefCell;

// ── Motor call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCall {
    Assert(Line),
    Clear(Line),
    PulseStart,
    PulseStop,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<MotorCall>,
    lines: [bool; 3],
    level: bool,
    pulse_on: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            lines: [false; 3],
            level: false,
            pulse_on: false,
        }
    }

    fn idx(line: Line) -> usize {
        match line {
            Line::Up => 0,
            Line::Down => 1,
            Line::Switch => 2,
        }
    }

    pub fn line(&self, line: Line) -> bool {
        self.lines[Self::idx(line)]
    }

    /// Drive the simulated tick sensor line (spindle rotation).
    pub fn set_level(&mut self, level: bool) {
        self.level = level;
    }

    pub fn level(&self) -> bool {
        self.level
    }

    /// Invert the simulated tick sensor line, as one spindle half-turn would.
    pub fn toggle_level(&mut self) {
        self.level = !self.level;
    }

    pub fn pulse_running(&self) -> bool {
        self.pulse_on
    }

    pub fn last_call(&self) -> Option<&MotorCall> {
        self.calls.last()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorPort for MockHardware {
    fn assert_line(&mut self, line: Line) {
        self.lines[Self::idx(line)] = true;
        self.calls.push(MotorCall::Assert(line));
    }

    fn clear_line(&mut self, line: Line) {
        self.lines[Self::idx(line)] = false;
        self.calls.push(MotorCall::Clear(line));
    }

    fn line_asserted(&self, line: Line) -> bool {
        self.lines[Self::idx(line)]
    }
}

impl TickPort for MockHardware {
    fn tick_level(&mut self) -> bool {
        self.level
    }
}

impl PulsePort for MockHardware {
    fn pulse_start(&mut self) {
        self.pulse_on = true;
        self.calls.push(MotorCall::PulseStart);
    }

    fn pulse_stop(&mut self) {
        self.pulse_on = false;
        self.calls.push(MotorCall::PulseStop);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Captures every published snapshot in order.
pub struct RecordingSink {
    pub snapshots: Vec<LiftState>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self {
            snapshots: Vec::new(),
        }
    }

    pub fn last(&self) -> Option<&LiftState> {
        self.snapshots.last()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for RecordingSink {
    fn publish(&mut self, state: &LiftState) {
        self.snapshots.push(*state);
    }
}

// ── MockNvs ───────────────────────────────────────────────────

/// In-memory [`ConfigPort`] holding at most one stored profile.
pub struct MockNvs {
    stored: RefCell<Option<LiftConfig>>,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self {
            stored: RefCell::new(None),
        }
    }
}

impl Default for MockNvs {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<LiftConfig, ConfigError> {
        Ok(self.stored.borrow().clone().unwrap_or_default())
    }

    fn save(&self, config: &LiftConfig) -> Result<(), ConfigError> {
        *self.stored.borrow_mut() = Some(config.clone());
        Ok(())
    }
}
