//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LiftService / LiftController (domain)
//! ```
//!
//! Driven adapters (relay board, tick sensor, pulse generator, status sinks,
//! storage) implement these traits.  The domain consumes them via generics,
//! so the motion core never touches hardware directly — and the whole state
//! machine runs on the host under test.

use crate::config::LiftConfig;
use crate::motion::state::{Line, LiftState};

// ───────────────────────────────────────────────────────────────
// Motor port (domain → relay lines)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the three level-held output lines.
///
/// Implementations hold each line at its last commanded level; the domain
/// guarantees it clears both direction lines before asserting either.
pub trait MotorPort {
    /// Drive a line high.
    fn assert_line(&mut self, line: Line);

    /// Drive a line low.
    fn clear_line(&mut self, line: Line);

    /// Last commanded level of a line.  Used to detect a line that
    /// drifted out of sync with the tracked state.
    fn line_asserted(&self, line: Line) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Tick port (spindle sensor → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the spindle tick line (polled profiles).
pub trait TickPort {
    /// Instantaneous level of the tick sensor line.
    fn tick_level(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Pulse port (domain → bench pulse generator)
// ───────────────────────────────────────────────────────────────

/// Bench rigs without a real spindle sensor jumper a square-wave output
/// onto the tick input.  The service starts the wave while the drive is
/// engaged and stops it when the lift idles; units with a real sensor use
/// a no-op implementation.
pub trait PulsePort {
    fn pulse_start(&mut self);
    fn pulse_stop(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Status sink (domain → telemetry)
// ───────────────────────────────────────────────────────────────

/// The single observer of the motion core.
///
/// Called synchronously with a complete snapshot after every observable
/// change; one command may produce more than one call.  Implementations
/// must not block and must not call back into the domain.
pub trait StatusSink {
    fn publish(&mut self, state: &LiftState);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the lift configuration.
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped —
/// a garbage travel range or a zero poll interval must never reach flash.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`LiftConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<LiftConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &LiftConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
