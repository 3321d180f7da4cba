//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for a SkyLift unit: command
//! dispatch into the motion core, stall-watch supervision, and status
//! reporting.  All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod commands;
pub mod ports;
pub mod service;
pub mod status;
