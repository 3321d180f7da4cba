//! GPIO / peripheral pin assignments for the SkyLift controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Actuator relay lines (level-held, one per direction)
// ---------------------------------------------------------------------------

/// Digital output: drives the lift upward while HIGH.
pub const MOTOR_UP_GPIO: i32 = 16;
/// Digital output: drives the lift downward while HIGH.
pub const MOTOR_DOWN_GPIO: i32 = 15;

/// Digital output: auxiliary switched line (lamp relay on desk variants).
/// Fitted only when the profile sets `has_aux_switch`.
pub const AUX_SWITCH_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Position feedback
// ---------------------------------------------------------------------------

/// Hall-effect rotation sensor on the spindle — one edge per tick of travel.
/// Read either as a debounced level (polled mode) or via GPIO interrupt.
pub const TICK_SENSOR_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Bench pulse generator (feeds TICK_SENSOR_GPIO through a jumper)
// ---------------------------------------------------------------------------

/// LEDC square-wave output used on bench rigs without a real spindle sensor.
pub const PULSE_GEN_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC frequency for the bench pulse generator.  4 Hz keeps successive
/// 150 ms samples seeing alternating levels.
pub const PULSE_GEN_FREQ_HZ: u32 = 4;
