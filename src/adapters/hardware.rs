//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the relay driver, the tick sensor, and whichever pulse source the
//! profile calls for, exposing them through [`MotorPort`], [`TickPort`]
//! and [`PulsePort`].  This is the only module besides the drivers that
//! touches actual hardware.  On non-espidf targets the underlying
//! drivers use cfg-gated simulation stubs.

use crate::app::ports::{MotorPort, PulsePort, TickPort};
use crate::drivers::motor::MotorDriver;
use crate::drivers::pulse::PulseSource;
use crate::drivers::tick_sensor::TickSensor;
use crate::motion::state::Line;

/// Concrete adapter that combines all hardware behind port traits.
///
/// Generic over the pulse source so bench rigs get the LEDC wave and
/// production units get a no-op, decided once at construction.
pub struct HardwareAdapter<P: PulseSource> {
    motor: MotorDriver,
    tick: TickSensor,
    pulse: P,
}

impl<P: PulseSource> HardwareAdapter<P> {
    pub fn new(motor: MotorDriver, tick: TickSensor, pulse: P) -> Self {
        Self { motor, tick, pulse }
    }
}

// ── MotorPort implementation ──────────────────────────────────

impl<P: PulseSource> MotorPort for HardwareAdapter<P> {
    fn assert_line(&mut self, line: Line) {
        self.motor.set_line(line, true);
    }

    fn clear_line(&mut self, line: Line) {
        self.motor.set_line(line, false);
    }

    fn line_asserted(&self, line: Line) -> bool {
        self.motor.line(line)
    }
}

// ── TickPort implementation ───────────────────────────────────

impl<P: PulseSource> TickPort for HardwareAdapter<P> {
    fn tick_level(&mut self) -> bool {
        self.tick.level()
    }
}

// ── PulsePort implementation ──────────────────────────────────

impl<P: PulseSource> PulsePort for HardwareAdapter<P> {
    fn pulse_start(&mut self) {
        self.pulse.start();
    }

    fn pulse_stop(&mut self) {
        self.pulse.stop();
    }
}
