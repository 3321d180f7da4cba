//! System configuration parameters
//!
//! All tunable parameters for a SkyLift unit.  Values are loaded from NVS at
//! boot and fall back to the profile defaults below on first flash.

use serde::{Deserialize, Serialize};

/// How the spindle tick sensor is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickMode {
    /// Sample the line every `poll_interval_ms` and count debounced level
    /// changes.  Enables the stall watchdog.
    Polled,
    /// GPIO interrupt on every edge.  No stall watchdog.
    EdgeInterrupt,
}

/// Core lift configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftConfig {
    // --- Travel ---
    /// Lowest reachable position (tick units, may be negative after
    /// recalibration).
    pub min_position: i16,
    /// Highest reachable position (tick units).
    pub max_position: i16,
    /// Position assumed at power-on (the lift parks at the bottom stop).
    pub initial_position: i16,

    // --- Position feedback ---
    /// Tick sensor read strategy.
    pub tick_mode: TickMode,
    /// Polling cadence for `TickMode::Polled` (milliseconds).
    pub poll_interval_ms: u32,
    /// How long the position may stay frozen while driving before the
    /// stall watchdog aborts the move (milliseconds).
    pub stall_timeout_ms: u32,

    // --- Height scale ---
    /// Travel per tick in micrometres (gearbox-dependent).
    pub tick_to_um: i32,
    /// Height of position 0 above the floor, in micrometres.
    pub base_height_um: i32,

    // --- Fit-out ---
    /// Whether the auxiliary switched line (lamp relay) is fitted.
    pub has_aux_switch: bool,
    /// Whether the bench pulse generator feeds the tick input.
    pub use_pulse_generator: bool,
}

impl Default for LiftConfig {
    fn default() -> Self {
        // Desk variant: short mast, fine-pitch spindle, lamp relay fitted.
        Self {
            min_position: 0,
            max_position: 1000,
            initial_position: 0,

            tick_mode: TickMode::Polled,
            poll_interval_ms: 150,
            stall_timeout_ms: 1200,

            tick_to_um: 525,
            base_height_um: 834_000,

            has_aux_switch: true,
            use_pulse_generator: false,
        }
    }
}

impl LiftConfig {
    /// Cargo variant: long mast, coarse spindle, no lamp relay.
    pub fn high_travel() -> Self {
        Self {
            max_position: 816,
            tick_to_um: 3935,
            has_aux_switch: false,
            ..Self::default()
        }
    }

    /// Consecutive unchanged-position samples tolerated before the stall
    /// watchdog aborts a move.  Defaults work out to 1200 / 150 = 8.
    pub fn stall_sample_threshold(&self) -> u32 {
        (self.stall_timeout_ms / self.poll_interval_ms).max(1)
    }
}
