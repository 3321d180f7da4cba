//! Lift drive relay driver.
//!
//! Three level-held output lines: UP, DOWN, and the auxiliary switch
//! relay.  Each line stays at its last written level until rewritten.
//!
//! ## Safety contract
//!
//! UP and DOWN must never be high together; the motion core enforces this
//! by clearing both before asserting either.  This driver is a dumb
//! actuator and does not second-guess the sequence it is given.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real GPIO via hw_init helpers.
//! On host/test: tracks shadow state in-memory only.

use crate::drivers::hw_init;
use crate::motion::state::Line;
use crate::pins;

pub struct MotorDriver {
    up: bool,
    down: bool,
    switch: bool,
}

impl MotorDriver {
    /// All lines assumed low; `hw_init` parks the outputs there at boot.
    pub fn new() -> Self {
        Self {
            up: false,
            down: false,
            switch: false,
        }
    }

    pub fn set_line(&mut self, line: Line, high: bool) {
        hw_init::gpio_write(Self::gpio_for(line), high);
        match line {
            Line::Up => self.up = high,
            Line::Down => self.down = high,
            Line::Switch => self.switch = high,
        }
    }

    /// Last written level (shadow state; GPIO is write-only here).
    pub fn line(&self, line: Line) -> bool {
        match line {
            Line::Up => self.up,
            Line::Down => self.down,
            Line::Switch => self.switch,
        }
    }

    /// True while either direction line is high.
    pub fn is_driving(&self) -> bool {
        self.up || self.down
    }

    const fn gpio_for(line: Line) -> i32 {
        match line {
            Line::Up => pins::MOTOR_UP_GPIO,
            Line::Down => pins::MOTOR_DOWN_GPIO,
            Line::Switch => pins::AUX_SWITCH_GPIO,
        }
    }
}
