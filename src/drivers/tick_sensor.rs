//! Spindle tick input.
//!
//! One hall-effect edge per tick of travel.  Polled profiles read the raw
//! level from the motion poll timer and debounce in
//! [`TickMonitor`](crate::motion::monitor::TickMonitor); edge-interrupt
//! profiles register [`tick_isr_handler`] so each hardware edge lands in
//! the event queue.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::drivers::hw_init;
use crate::events::{push_event, Event};
use crate::pins;

pub struct TickSensor;

impl TickSensor {
    pub fn new() -> Self {
        Self
    }

    /// Instantaneous line level.
    pub fn level(&mut self) -> bool {
        hw_init::gpio_read(pins::TICK_SENSOR_GPIO)
    }
}

// ── ISR side (edge-interrupt profiles) ────────────────────────

/// Edges seen since the main loop last drained them.  A burst of edges
/// between two loop iterations collapses into one queue event but keeps
/// its full count here.
static TICK_EDGES: AtomicU32 = AtomicU32::new(0);

/// Called from the GPIO ISR on every spindle edge.
/// ISR context: touches only the counter and the lock-free queue.
pub fn tick_isr_handler() {
    TICK_EDGES.fetch_add(1, Ordering::Relaxed);
    push_event(Event::TickEdge);
}

/// Take and reset the accumulated edge count.  Main-loop side.
pub fn take_pending_edges() -> u32 {
    TICK_EDGES.swap(0, Ordering::AcqRel)
}
