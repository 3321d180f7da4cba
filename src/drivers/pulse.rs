//! Bench pulse generator.
//!
//! Bench rigs have no spindle to tick, so an LEDC square wave on
//! [`pins::PULSE_GEN_GPIO`] is jumpered onto the tick input and run
//! whenever the drive is engaged.  Production units use
//! [`NoopPulseSource`] and the trait call disappears into nothing.

use log::debug;

use crate::drivers::hw_init;

/// Something that can fake spindle ticks on demand.
pub trait PulseSource {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// LEDC-backed square wave at [`crate::pins::PULSE_GEN_FREQ_HZ`].
pub struct PwmPulseGenerator {
    running: bool,
}

impl PwmPulseGenerator {
    pub fn new() -> Self {
        Self { running: false }
    }
}

impl PulseSource for PwmPulseGenerator {
    fn start(&mut self) {
        if self.running {
            return;
        }
        // 50 % duty square wave; the poll loop sees alternating levels.
        hw_init::ledc_set(hw_init::LEDC_CH_PULSE, 128);
        self.running = true;
        debug!("pulse generator running");
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        // Park the line low so the last sampled level is stable.
        hw_init::ledc_set(hw_init::LEDC_CH_PULSE, 0);
        self.running = false;
        debug!("pulse generator stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Production units with a real spindle sensor.
pub struct NoopPulseSource;

impl PulseSource for NoopPulseSource {
    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn is_running(&self) -> bool {
        false
    }
}
