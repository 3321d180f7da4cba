//! Hardware timer module using ESP-IDF's esp_timer API.
//!
//! Creates the periodic motion poll timer that pushes events into the
//! lock-free SPSC queue.  The timer free-runs from boot; whether a poll
//! does anything is decided by the tick monitor's armed flag, so an idle
//! lift pays a few loads per period.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! they can safely call push_event() which uses AtomicU8.

use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut POLL_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: POLL_TIMER is written once in `start_timers()` before any
/// timer callbacks fire.  Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn poll_timer() -> esp_timer_handle_t {
    unsafe { POLL_TIMER }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn motion_poll_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::MotionPoll);
}

/// Start the motion poll timer at the configured cadence
/// (150 ms on the stock profiles).
#[cfg(target_os = "espidf")]
pub fn start_timers(poll_interval_ms: u32) {
    // SAFETY: POLL_TIMER is written here once at boot from the single
    // main-task context before any timer callbacks fire.  The callback
    // itself only calls push_event(), which is ISR-safe.
    unsafe {
        let poll_args = esp_timer_create_args_t {
            callback: Some(motion_poll_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"motion_poll\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&poll_args, &raw mut POLL_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: poll timer create failed (rc={}) — position feedback dead",
                ret
            );
            return;
        }
        let ret = esp_timer_start_periodic(POLL_TIMER, u64::from(poll_interval_ms) * 1000);
        if ret != ESP_OK {
            log::error!("hw_timer: poll timer start failed (rc={})", ret);
            return;
        }

        info!("hw_timer: motion poll started @ {poll_interval_ms} ms");
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(poll_interval_ms: u32) {
    log::info!("hw_timer(sim): poll timer not started ({poll_interval_ms} ms requested)");
}

/// Stop the motion poll timer (shutdown path).
#[cfg(target_os = "espidf")]
pub fn stop_timers() {
    // SAFETY: POLL_TIMER is a valid handle if start_timers() succeeded;
    // null-check prevents touching a never-created timer.
    unsafe {
        let pt = poll_timer();
        if !pt.is_null() {
            esp_timer_stop(pt);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_timers() {}
