//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod hw_timer;
pub mod motor;
pub mod pulse;
pub mod tick_sensor;
pub mod watchdog;
