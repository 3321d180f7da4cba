//! SkyLift Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      LogStatusSink      NvsConfigStore        │
//! │  (Motor+Tick+Pulse)   (StatusSink)       (ConfigPort)          │
//! │  BleAdapter                                                    │
//! │  (GATT control + status)                                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             LiftService (pure logic)                   │    │
//! │  │  Motion controller · Stall watchdog                    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod events;
mod pins;

pub mod app;
mod adapters;
mod drivers;
pub mod motion;
pub mod protocol;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::ble::{BleAdapter, BleState};
use adapters::device_id;
use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogStatusSink;
use adapters::nvs::NvsConfigStore;
use app::ports::{ConfigPort, MotorPort, PulsePort, StatusSink, TickPort};
use app::service::LiftService;
use config::{LiftConfig, TickMode};
use drivers::motor::MotorDriver;
use drivers::pulse::{NoopPulseSource, PwmPulseGenerator};
use drivers::tick_sensor::TickSensor;
use drivers::watchdog::Watchdog;
use error::{CommsError, Error};
use events::Event;
use motion::state::LiftState;

// ── Status fan-out ────────────────────────────────────────────
//
// Bridges the motion core (which knows only the StatusSink trait) to
// both observers: the serial log and the BLE status characteristic.
// Keeping this in main means the core never learns BLE exists.

struct TelemetrySink {
    log: LogStatusSink,
    config: LiftConfig,
}

impl StatusSink for TelemetrySink {
    fn publish(&mut self, state: &LiftState) {
        self.log.publish(state);
        adapters::ble::notify_status(&protocol::encode_status(state, &self.config));
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SkyLift v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    // Config comes before peripheral bring-up: the tick mode decides
    // whether the edge ISR is installed, and the poll cadence
    // parametrises the motion timer.
    let nvs = match NvsConfigStore::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            None
        }
    };
    let config = match &nvs {
        Some(store) => match store.load() {
            Ok(cfg) => {
                info!("Config loaded from NVS");
                cfg
            }
            Err(e) => {
                warn!("NVS config load failed ({}), using defaults", e);
                LiftConfig::default()
            }
        },
        None => LiftConfig::default(),
    };
    // A blob written by older firmware may carry ranges this build
    // refuses; never let one reach the motor lines.
    let config = match adapters::nvs::validate_config(&config) {
        Ok(()) => config,
        Err(e) => {
            warn!("Stored config invalid ({}), using defaults", e);
            LiftConfig::default()
        }
    };

    // ── 3. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical: log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    if let Err(e) =
        drivers::hw_init::init_isr_service(config.tick_mode == TickMode::EdgeInterrupt)
    {
        log::error!("ISR service init failed: {} — continuing with polled ticks", e);
    }
    drivers::hw_timer::start_timers(config.poll_interval_ms);
    let watchdog = Watchdog::new();

    // ── 4. Device identity ────────────────────────────────────
    let identity = device_id::DeviceIdentity::from_efuse();
    info!(
        "Unit {} (BLE name: {})",
        identity.short_id(),
        identity.ble_name()
    );

    // ── 5. Construct adapters ─────────────────────────────────
    let motor = MotorDriver::new();
    let tick = TickSensor::new();
    let sink = TelemetrySink {
        log: LogStatusSink::new(&config),
        config: config.clone(),
    };

    // ── 6. BLE control surface ────────────────────────────────
    let mut ble = BleAdapter::new(identity.ble_name());
    ble.start();
    if ble.state() == BleState::Failed {
        // A lift nobody can talk to is a brick; reboot and retry.
        return Err(anyhow::anyhow!(Error::Comms(CommsError::BleInitFailed)));
    }

    // ── 7. App service ────────────────────────────────────────
    let app = LiftService::new(config.clone());

    info!("System ready. Entering event loop.");

    // ── 8. Event loop ─────────────────────────────────────────
    // The two pulse-source variants monomorphise to different adapter
    // types, so the loop itself is generic over the combined hw ports.
    if config.use_pulse_generator {
        run(
            HardwareAdapter::new(motor, tick, PwmPulseGenerator::new()),
            app,
            ble,
            sink,
            watchdog,
        )
    } else {
        run(
            HardwareAdapter::new(motor, tick, NoopPulseSource),
            app,
            ble,
            sink,
            watchdog,
        )
    }
}

fn run(
    mut hw: impl MotorPort + TickPort + PulsePort,
    mut app: LiftService,
    mut ble: BleAdapter,
    mut sink: TelemetrySink,
    watchdog: Watchdog,
) -> Result<()> {
    info!(
        "Event loop: {} ms poll cadence, stall budget {} samples",
        app.config().poll_interval_ms,
        app.config().stall_sample_threshold(),
    );
    app.start(&mut sink);

    loop {
        // Simulate the motion poll timer via sleep on non-espidf targets.
        // On real hardware the esp_timer callback paces the loop instead.
        #[cfg(not(target_os = "espidf"))]
        {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(
                app.config().poll_interval_ms,
            )));
            events::push_event(Event::MotionPoll);
        }
        // Yield between drains so the idle task runs; every event source
        // is interrupt- or callback-driven, nothing is lost while asleep.
        #[cfg(target_os = "espidf")]
        std::thread::sleep(std::time::Duration::from_millis(10));

        // Process all pending events.
        events::drain_events(|event| match event {
            Event::TickEdge => {
                // The ISR counts edges; replay each one so a burst between
                // drains still moves the position the full distance.
                let edges = drivers::tick_sensor::take_pending_edges();
                for _ in 0..edges {
                    app.on_tick_edge(&mut hw, &mut sink);
                }
            }

            Event::MotionPoll => {
                app.poll_motion(&mut hw, &mut sink);
            }

            Event::CommandReceived => {
                while let Some(raw) = adapters::ble::take_command_data() {
                    match protocol::decode_command(&raw, app.config()) {
                        Some(command) => app.handle_command(command, &mut hw, &mut sink),
                        None => warn!("BLE: undecodable control frame {:02x?}", raw.as_slice()),
                    }
                }
            }

            Event::BleConnected => {
                ble.on_central_connected();
                // A fresh central gets the current picture immediately.
                adapters::ble::notify_status(&protocol::encode_status(
                    &app.state(),
                    app.config(),
                ));
            }

            Event::BleDisconnected => {
                ble.on_central_disconnected();
            }
        });

        // Feed watchdog on every iteration.
        watchdog.feed();
    }
}
