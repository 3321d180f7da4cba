//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - The tick sensor GPIO ISR (edge-interrupt profiles)
//! - The motion poll timer (polled profiles)
//! - Bluedroid GATT callbacks (writes, connect / disconnect)
//!
//! Events are consumed by the main control loop, which drains the queue in
//! arrival order.  All lift state lives in that loop; producers never touch
//! it directly.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Tick ISR    │────▶│              │     │              │
//! │ Poll timer  │────▶│  Event Queue │────▶│  Main Loop   │
//! │ BLE stack   │────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicUsize, Ordering};

/// Maximum number of pending events.  Must be a power of two: the ring
/// indices free-run and are masked on use.
const EVENT_QUEUE_CAP: usize = 32;
const SLOT_MASK: usize = EVENT_QUEUE_CAP - 1;

/// System event types.
///
/// Discriminants are spaced in blocks so new events can slot into their
/// group without renumbering the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    // ── Position integrity ────────────────────────────────
    /// Spindle sensor edge fired (edge-interrupt profiles only).
    TickEdge          = 0,
    /// Motion poll timer fired (debounced sampling + stall watch).
    MotionPoll        = 1,

    // ── Communication ─────────────────────────────────────
    /// A control frame landed in the BLE command mailbox.
    CommandReceived   = 20,
    /// A central connected to the GATT server.
    BleConnected      = 30,
    /// The central disconnected; advertising was restarted.
    BleDisconnected   = 31,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// ISRs and stack callbacks produce, the main loop consumes.  The indices
// count pushes and pops monotonically (wrapping); a slot is occupied
// while its index sits in the half-open window [tail, head).

static QUEUE_HEAD: AtomicUsize = AtomicUsize::new(0);
static QUEUE_TAIL: AtomicUsize = AtomicUsize::new(0);
// SAFETY: slot `i & SLOT_MASK` is written by the single producer before
// the Release store that moves QUEUE_HEAD past `i`, and read by the
// single consumer only after its Acquire load observed that store.  The
// full-queue check keeps the window at most EVENT_QUEUE_CAP wide, so a
// slot is never written while still unread.
static mut EVENT_SLOTS: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from ISR context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = QUEUE_HEAD.load(Ordering::Relaxed);
    let tail = QUEUE_TAIL.load(Ordering::Acquire);

    if head.wrapping_sub(tail) == EVENT_QUEUE_CAP {
        return false; // Full: the consumer has fallen behind.
    }

    // SAFETY: single producer; this slot left the occupied window when
    // the consumer advanced QUEUE_TAIL past it.
    unsafe {
        EVENT_SLOTS[head & SLOT_MASK] = event as u8;
    }
    QUEUE_HEAD.store(head.wrapping_add(1), Ordering::Release);
    true
}

/// Pop the oldest pending event.
/// Called from the main loop (single consumer).
pub fn pop_event() -> Option<Event> {
    let tail = QUEUE_TAIL.load(Ordering::Relaxed);
    let head = QUEUE_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None;
    }

    // SAFETY: single consumer; the producer published this slot before
    // moving QUEUE_HEAD past it.
    let raw = unsafe { EVENT_SLOTS[tail & SLOT_MASK] };
    QUEUE_TAIL.store(tail.wrapping_add(1), Ordering::Release);

    event_from_u8(raw)
}

/// Drain every pending event into a callback, oldest first.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

pub fn queue_is_empty() -> bool {
    queue_len() == 0
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let tail = QUEUE_TAIL.load(Ordering::Relaxed);
    let head = QUEUE_HEAD.load(Ordering::Acquire);
    head.wrapping_sub(tail)
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0  => Some(Event::TickEdge),
        1  => Some(Event::MotionPoll),
        20 => Some(Event::CommandReceived),
        30 => Some(Event::BleConnected),
        31 => Some(Event::BleDisconnected),
        _  => None,
    }
}
