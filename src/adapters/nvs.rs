//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] over the ESP-IDF NVS API.  The lift stores a
//! single postcard-encoded [`LiftConfig`] blob under the `skylift`
//! namespace; commands never write to flash mid-motion, so one blob with
//! atomic `nvs_commit` semantics is all the persistence the unit needs.
//!
//! All fields are range-checked before persistence.  A garbage travel
//! range or a zero poll interval must never reach flash: the next boot
//! would drive the motor on bad limits.

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::LiftConfig;
use log::{info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "skylift";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"liftcfg\0";

/// A postcard-encoded LiftConfig is ~30 bytes; anything bigger is garbage.
#[allow(dead_code)]
const MAX_BLOB_SIZE: usize = 256;

pub struct NvsConfigStore {
    #[cfg(not(target_os = "espidf"))]
    blob: std::cell::RefCell<Option<Vec<u8>>>,
}

impl NvsConfigStore {
    /// Create the store and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably.  On first boot or after a partition-format version
    /// bump the NVS partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                let ret2 = unsafe { nvs_flash_erase() };
                if ret2 != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                let ret3 = unsafe { nvs_flash_init() };
                if ret3 != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsConfigStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsConfigStore: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            blob: std::cell::RefCell::new(None),
        })
    }

    /// Open the lift namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = CONFIG_NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

pub fn validate_config(cfg: &LiftConfig) -> Result<(), ConfigError> {
    if cfg.min_position >= cfg.max_position {
        return Err(ConfigError::ValidationFailed(
            "min_position must be < max_position",
        ));
    }
    if !(cfg.min_position..=cfg.max_position).contains(&cfg.initial_position) {
        return Err(ConfigError::ValidationFailed(
            "initial_position must lie within the travel limits",
        ));
    }
    if !(50..=1000).contains(&cfg.poll_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "poll_interval_ms must be 50–1000",
        ));
    }
    if cfg.stall_timeout_ms < cfg.poll_interval_ms {
        return Err(ConfigError::ValidationFailed(
            "stall_timeout_ms must be >= poll_interval_ms",
        ));
    }
    if !(1..=100_000).contains(&cfg.tick_to_um) {
        return Err(ConfigError::ValidationFailed(
            "tick_to_um must be 1–100000",
        ));
    }
    if !(0..=10_000_000).contains(&cfg.base_height_um) {
        return Err(ConfigError::ValidationFailed(
            "base_height_um must be 0–10000000",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsConfigStore {
    fn load(&self) -> Result<LiftConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            if let Some(bytes) = self.blob.borrow().as_deref() {
                let cfg: LiftConfig = postcard::from_bytes(bytes).map_err(|_| {
                    warn!("NvsConfigStore: stored blob failed to decode");
                    ConfigError::Corrupted
                })?;
                info!("NvsConfigStore: loaded config from store");
                Ok(cfg)
            } else {
                info!("NvsConfigStore: no stored config, using defaults");
                Ok(LiftConfig::default())
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(false, |handle| {
                let mut size: usize = 0;

                // First call: get size
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        CONFIG_KEY.as_ptr() as *const _,
                        core::ptr::null_mut(),
                        &mut size,
                    )
                };
                if ret == ESP_ERR_NVS_NOT_FOUND {
                    return Err(ESP_ERR_NVS_NOT_FOUND);
                }
                if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ret);
                }

                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        CONFIG_KEY.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }

                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    let cfg: LiftConfig = postcard::from_bytes(&bytes).map_err(|_| {
                        warn!("NvsConfigStore: stored blob failed to decode");
                        ConfigError::Corrupted
                    })?;
                    info!(
                        "NvsConfigStore: loaded config from NVS ({} bytes)",
                        bytes.len()
                    );
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("NvsConfigStore: no stored config, using defaults");
                    Ok(LiftConfig::default())
                }
                Err(e) => {
                    warn!("NvsConfigStore: NVS read error {}, using defaults", e);
                    Ok(LiftConfig::default())
                }
            }
        }
    }

    fn save(&self, config: &LiftConfig) -> Result<(), ConfigError> {
        validate_config(config)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
            *self.blob.borrow_mut() = Some(bytes);
            info!("NvsConfigStore: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
            let result = Self::with_nvs_handle(true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        CONFIG_KEY.as_ptr() as *const _,
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsConfigStore: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsConfigStore: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}
