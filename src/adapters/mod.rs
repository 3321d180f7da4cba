//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements             | Connects to              |
//! |-------------|------------------------|--------------------------|
//! | `ble`       | (driving side)         | Bluedroid GATT server    |
//! | `hardware`  | MotorPort              | ESP32 relay GPIOs        |
//! |             | TickPort               | ESP32 sensor GPIO        |
//! |             | PulsePort              | ESP32 LEDC PWM           |
//! | `log_sink`  | StatusSink             | Serial log output        |
//! | `nvs`       | ConfigPort             | NVS / in-memory store    |
//! | `device_id` | —                      | eFuse MAC                |

pub mod ble;
pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
