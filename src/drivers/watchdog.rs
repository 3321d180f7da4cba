//! Task Watchdog Timer (TWDT) driver.
//!
//! Subscribes the lift's event-loop task to the ESP-IDF TWDT so a wedged
//! loop (deadlocked BLE callback, runaway log flood) reboots the unit
//! instead of leaving a motor line held high forever.
//!
//! The event loop feeds once per iteration; the budget is generous
//! because a healthy iteration completes in well under a millisecond.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Loop-stall budget before the TWDT panics the unit.
#[cfg(target_os = "espidf")]
const TWDT_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            let cfg = esp_task_wdt_config_t {
                timeout_ms: TWDT_TIMEOUT_MS,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            // SAFETY: reconfigure/add are called once from the main task
            // before the event loop; the TWDT API is internally locked.
            let subscribed = unsafe {
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("TWDT reconfigure returned {ret} (already configured?)");
                }
                esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
            };

            if subscribed {
                log::info!("Watchdog: event loop subscribed ({TWDT_TIMEOUT_MS} ms, panic on stall)");
            } else {
                log::warn!("Watchdog: subscribe failed, running unsupervised");
            }
            Self { subscribed }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op");
            Self {}
        }
    }

    /// Feed the watchdog.  Called once per event-loop iteration.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: esp_task_wdt_reset only touches the calling task's
            // TWDT entry.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
