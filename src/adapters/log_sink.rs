//! Log-based status sink adapter.
//!
//! Implements [`StatusSink`] by writing every snapshot to the ESP-IDF
//! logger (which goes to UART / USB-CDC in production).  Positions are
//! shown both in raw ticks and through the profile's height scale so a
//! serial trace is readable without a calculator.

use log::info;

use crate::app::ports::StatusSink;
use crate::app::status::StatusReport;
use crate::config::LiftConfig;
use crate::motion::state::LiftState;

/// Adapter that logs every snapshot to the serial console.
pub struct LogStatusSink {
    config: LiftConfig,
}

impl LogStatusSink {
    pub fn new(config: &LiftConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl StatusSink for LogStatusSink {
    fn publish(&mut self, state: &LiftState) {
        let report = StatusReport::from_state(state, &self.config);
        match state.target {
            Some(t) => info!("LIFT | tick {} -> {} | {}", state.position, t, report),
            None => info!("LIFT | tick {} | {}", state.position, report),
        }
    }
}
