//! SkyLift firmware library.
//!
//! Host-visible crate root: the motion core, wire codec and app service
//! are pure logic and fully testable off-target. Anything that touches
//! ESP-IDF is fenced behind `#[cfg(target_os = "espidf")]` inside its
//! own module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod events;
pub mod motion;
pub mod protocol;

mod error;
mod pins;

// Declared here too so host builds type-check the adapter layer; the
// hardware-facing halves are cfg-gated within each file.
pub mod adapters;
pub mod drivers;
