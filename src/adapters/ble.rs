//! BLE control adapter.
//!
//! Hosts the GATT server a handheld remote or phone app talks to.  Inbound
//! command frames land in a mailbox drained by the main loop; outbound
//! status frames are pushed over a notify characteristic after every state
//! change.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid BLE GATT server via `esp_idf_svc::sys`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## GATT Service Layout
//!
//! | Characteristic | UUID                      | Perms        |
//! |----------------|---------------------------|--------------|
//! | Lift Control   | `0000beef-…-785f19900523` | Write        |
//! | Lift Status    | `0000feed-…-785f19900523` | Read+Notify  |
//!
//! Control frames are the short opcode-first encoding defined in
//! [`crate::protocol`]; the status characteristic always holds the latest
//! 6-byte state frame so late readers see the same picture as subscribers.

use core::fmt;
use log::{debug, info, warn};

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x0000b00b_1212_efde_1523_785f19900523;
pub const CHAR_CONTROL_UUID: u128 = 0x0000beef_1212_efde_1523_785f19900523;
pub const CHAR_STATUS_UUID: u128 = 0x0000feed_1212_efde_1523_785f19900523;

/// Mailbox capacity.  Command frames are at most 3 bytes on the wire; the
/// decoder, not the transport, owns frame validation, so the mailbox only
/// caps what a client can shove in.
const MAX_COMMAND_BYTES: usize = 8;

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWriteError {
    Empty,
    TooLong,
}

impl fmt::Display for ControlWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty control write"),
            Self::TooLong => write!(f, "control write exceeds {} bytes", MAX_COMMAND_BYTES),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Idle,
    Advertising,
    Connected,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

// ── ESP-IDF BLE static state ──────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures.  These statics bridge the callback context to the main loop.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};

#[cfg(target_os = "espidf")]
static BLE_GATTS_IF: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONN_ID: AtomicU32 = AtomicU32::new(0);
// conn_id 0 is a legal Bluedroid connection id, so presence is tracked
// separately instead of treating 0 as a sentinel.
#[cfg(target_os = "espidf")]
static BLE_CONNECTED: AtomicBool = AtomicBool::new(false);
#[cfg(target_os = "espidf")]
static BLE_SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CTRL_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_STATUS_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CHAR_STEP: AtomicU32 = AtomicU32::new(0);

// Command bytes bridging the GATTS write callback → main loop.
// GATTS callbacks run in the Bluedroid task (not ISR), so std Mutex is safe.
#[cfg(target_os = "espidf")]
static BLE_CMD_BUF: std::sync::Mutex<heapless::Vec<u8, 8>> =
    std::sync::Mutex::new(heapless::Vec::new());

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    unsafe {
        t.uuid.uuid128 = uuid.to_le_bytes();
    }
    t
}

#[cfg(target_os = "espidf")]
unsafe fn add_gatt_char(svc_handle: u16, uuid: u128, perm: u32, prop: u32) {
    use esp_idf_svc::sys::*;
    let mut char_uuid = uuid128_to_esp(uuid);
    unsafe {
        esp_ble_gatts_add_char(
            svc_handle,
            &mut char_uuid,
            perm as esp_gatt_perm_t,
            prop as esp_gatt_char_prop_t,
            core::ptr::null_mut(),
            core::ptr::null_mut(),
        );
    }
}

/// Consume a command frame written by a BLE client via GATT.
#[cfg(target_os = "espidf")]
pub fn take_command_data() -> Option<heapless::Vec<u8, 8>> {
    BLE_CMD_BUF.lock().ok().and_then(|mut buf| {
        if buf.is_empty() {
            return None;
        }
        let data = buf.clone();
        buf.clear();
        Some(data)
    })
}

#[cfg(not(target_os = "espidf"))]
pub fn take_command_data() -> Option<heapless::Vec<u8, 8>> {
    None
}

/// Push a status frame to the connected central and refresh the readable
/// characteristic value.  No-op before the GATT table is registered.
#[cfg(target_os = "espidf")]
pub fn notify_status(frame: &[u8]) {
    use esp_idf_svc::sys::*;
    let handle = BLE_STATUS_CHAR_HANDLE.load(AtomicOrdering::Relaxed);
    if handle == 0 {
        return;
    }
    // Keep the readable value current even with nobody subscribed, so a
    // central that connects later can read the state without waiting for
    // the next motion.
    unsafe {
        esp_ble_gatts_set_attr_value(handle as u16, frame.len() as u16, frame.as_ptr());
    }
    if !BLE_CONNECTED.load(AtomicOrdering::Relaxed) {
        return;
    }
    unsafe {
        esp_ble_gatts_send_indicate(
            BLE_GATTS_IF.load(AtomicOrdering::Relaxed) as u8,
            BLE_CONN_ID.load(AtomicOrdering::Relaxed) as u16,
            handle as u16,
            frame.len() as u16,
            frame.as_ptr() as *mut u8,
            false,
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn notify_status(frame: &[u8]) {
    debug!("BLE(sim): status frame {:02x?}", frame);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising started");
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_SEC_REQ_EVT => {
            // SAFETY: param is valid for the duration of the callback.
            unsafe {
                esp_ble_gap_security_rsp((*param).ble_security.ble_req.bd_addr.as_mut_ptr(), true);
            }
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_AUTH_CMPL_EVT => {
            // SAFETY: param is valid for the duration of the callback.
            let p = unsafe { &(*param).ble_security.auth_cmpl };
            if p.success {
                log::info!("BLE GAP: authentication complete (bonded)");
            } else {
                log::warn!("BLE GAP: authentication failed (reason={})", p.fail_reason);
            }
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    BLE_GATTS_IF.store(gatts_if as u32, AtomicOrdering::Relaxed);

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            log::info!("BLE GATTS: app registered (if={})", gatts_if);
            let svc_uuid = uuid128_to_esp(SERVICE_UUID);
            let mut svc_id = esp_gatt_srvc_id_t {
                id: esp_gatt_id_t {
                    uuid: svc_uuid,
                    inst_id: 0,
                },
                is_primary: true,
            };
            // 1 service + 2 characteristics at 2 attributes each, plus headroom.
            unsafe {
                esp_ble_gatts_create_service(gatts_if, &mut svc_id, 8);
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            // SAFETY: param is valid for the duration of the callback.
            let p = unsafe { &(*param).create };
            let svc_handle = p.service_handle;
            BLE_SVC_HANDLE.store(svc_handle as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: service created (handle={})", svc_handle);
            unsafe {
                esp_ble_gatts_start_service(svc_handle);
            }
            BLE_CHAR_STEP.store(1, AtomicOrdering::Relaxed);
            unsafe {
                add_gatt_char(
                    svc_handle,
                    CHAR_CONTROL_UUID,
                    ESP_GATT_PERM_WRITE,
                    ESP_GATT_CHAR_PROP_BIT_WRITE | ESP_GATT_CHAR_PROP_BIT_WRITE_NR,
                );
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            // SAFETY: param is valid for the duration of the callback.
            let p = unsafe { &(*param).add_char };
            let handle = p.attr_handle;
            let step = BLE_CHAR_STEP.load(AtomicOrdering::Relaxed);
            let svc_handle = BLE_SVC_HANDLE.load(AtomicOrdering::Relaxed) as u16;
            match step {
                1 => {
                    BLE_CTRL_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: control char (handle={})", handle);
                    BLE_CHAR_STEP.store(2, AtomicOrdering::Relaxed);
                    unsafe {
                        add_gatt_char(
                            svc_handle,
                            CHAR_STATUS_UUID,
                            ESP_GATT_PERM_READ,
                            ESP_GATT_CHAR_PROP_BIT_READ | ESP_GATT_CHAR_PROP_BIT_NOTIFY,
                        );
                    }
                }
                2 => {
                    BLE_STATUS_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                    BLE_CHAR_STEP.store(3, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: status char (handle={}) — all registered", handle);
                }
                _ => {}
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            // SAFETY: param is valid for the duration of the callback.
            let p = unsafe { &(*param).connect };
            BLE_CONN_ID.store(p.conn_id as u32, AtomicOrdering::Relaxed);
            BLE_CONNECTED.store(true, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: client connected (conn_id={})", p.conn_id);
            crate::events::push_event(crate::events::Event::BleConnected);
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            BLE_CONNECTED.store(false, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: client disconnected");
            crate::events::push_event(crate::events::Event::BleDisconnected);
            // Restart advertising after disconnect.
            unsafe {
                let mut adv_params = esp_ble_adv_params_t {
                    adv_int_min: 0x20,
                    adv_int_max: 0x40,
                    adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
                    own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
                    channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
                    adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
                    ..core::mem::zeroed()
                };
                esp_ble_gap_start_advertising(&mut adv_params);
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            // SAFETY: param is valid for the duration of the callback.
            let p = unsafe { &(*param).write };
            if p.handle as u32 == BLE_CTRL_CHAR_HANDLE.load(AtomicOrdering::Relaxed) {
                // SAFETY: Bluedroid guarantees value points at len bytes.
                let data = unsafe { core::slice::from_raw_parts(p.value, p.len as usize) };
                if data.is_empty() || data.len() > MAX_COMMAND_BYTES {
                    log::warn!("BLE GATTS: control write dropped ({} bytes)", data.len());
                } else if let Ok(mut buf) = BLE_CMD_BUF.lock() {
                    buf.clear();
                    let _ = buf.extend_from_slice(data);
                    crate::events::push_event(crate::events::Event::CommandReceived);
                }
            }
            if p.need_rsp {
                unsafe {
                    esp_ble_gatts_send_response(
                        gatts_if,
                        p.conn_id,
                        p.trans_id,
                        esp_gatt_status_t_ESP_GATT_OK,
                        core::ptr::null_mut(),
                    );
                }
            }
        }
        _ => {}
    }
}

pub struct BleAdapter {
    state: BleState,
    device_name: heapless::String<24>,
    pending_command: Option<heapless::Vec<u8, 8>>,
}

impl BleAdapter {
    pub fn new(device_name: heapless::String<24>) -> Self {
        Self {
            state: BleState::Idle,
            device_name,
            pending_command: None,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, BleState::Advertising | BleState::Connected)
    }

    pub fn start(&mut self) {
        info!("BLE: starting advertising as '{}'", self.device_name);
        self.platform_start();
        if self.state != BleState::Failed {
            self.state = BleState::Advertising;
        }
    }

    pub fn stop(&mut self) {
        self.platform_stop();
        self.state = BleState::Idle;
        self.pending_command = None;
        info!("BLE: stopped");
    }

    /// Validate and queue a raw control frame.
    ///
    /// Only transport-level checks happen here; opcode and length-per-opcode
    /// validation belongs to the command decoder.
    pub fn on_control_write(&mut self, raw: &[u8]) -> Result<(), ControlWriteError> {
        if raw.is_empty() {
            warn!("BLE: empty control write dropped");
            return Err(ControlWriteError::Empty);
        }
        if raw.len() > MAX_COMMAND_BYTES {
            warn!("BLE: oversized control write dropped ({} bytes)", raw.len());
            return Err(ControlWriteError::TooLong);
        }
        let mut cmd = heapless::Vec::new();
        let _ = cmd.extend_from_slice(raw);
        self.pending_command = Some(cmd);
        debug!("BLE: control frame queued ({} bytes)", raw.len());
        Ok(())
    }

    /// Consume the most recent queued control frame.  Last write wins; a
    /// second frame arriving before the first is drained replaces it.
    pub fn take_pending_command(&mut self) -> Option<heapless::Vec<u8, 8>> {
        self.pending_command.take()
    }

    pub fn on_central_connected(&mut self) {
        info!("BLE: central connected");
        self.state = BleState::Connected;
    }

    pub fn on_central_disconnected(&mut self) {
        info!("BLE: central disconnected");
        if self.state != BleState::Idle {
            self.state = BleState::Advertising;
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) {
        use esp_idf_svc::sys::*;
        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            let ret = esp_bt_controller_init(&mut bt_cfg);
            if ret != ESP_OK as i32 {
                log::error!("BLE: bt_controller_init failed ({})", ret);
                self.state = BleState::Failed;
                return;
            }

            let ret = esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE);
            if ret != ESP_OK as i32 {
                log::error!("BLE: bt_controller_enable failed ({})", ret);
                self.state = BleState::Failed;
                return;
            }

            let ret = esp_bluedroid_init();
            if ret != ESP_OK as i32 {
                log::error!("BLE: bluedroid_init failed ({})", ret);
                self.state = BleState::Failed;
                return;
            }

            let ret = esp_bluedroid_enable();
            if ret != ESP_OK as i32 {
                log::error!("BLE: bluedroid_enable failed ({})", ret);
                self.state = BleState::Failed;
                return;
            }

            // Register GAP and GATTS callbacks.  The handlers post events to
            // the main queue; nothing is processed in the Bluedroid task.
            esp_ble_gap_register_callback(Some(ble_gap_event_handler));
            esp_ble_gatts_register_callback(Some(ble_gatts_event_handler));
            esp_ble_gatts_app_register(0);

            // Just-works pairing with bonding, so only a paired remote can
            // drive the motor.
            let auth_req = esp_ble_auth_req_t_ESP_LE_AUTH_REQ_SC_BOND;
            let iocap = esp_ble_io_cap_t_ESP_IO_CAP_NONE;
            let key_size: u8 = 16;
            let init_key: u8 = (ESP_BLE_ENC_KEY_MASK | ESP_BLE_ID_KEY_MASK) as u8;
            let rsp_key: u8 = (ESP_BLE_ENC_KEY_MASK | ESP_BLE_ID_KEY_MASK) as u8;
            esp_ble_gap_set_security_param(
                esp_ble_sm_param_t_ESP_BLE_SM_AUTHEN_REQ_MODE,
                &auth_req as *const _ as *mut _,
                core::mem::size_of_val(&auth_req) as u32,
            );
            esp_ble_gap_set_security_param(
                esp_ble_sm_param_t_ESP_BLE_SM_IOCAP_MODE,
                &iocap as *const _ as *mut _,
                core::mem::size_of_val(&iocap) as u32,
            );
            esp_ble_gap_set_security_param(
                esp_ble_sm_param_t_ESP_BLE_SM_MAX_KEY_SIZE,
                &key_size as *const _ as *mut _,
                1,
            );
            esp_ble_gap_set_security_param(
                esp_ble_sm_param_t_ESP_BLE_SM_SET_INIT_KEY,
                &init_key as *const _ as *mut _,
                1,
            );
            esp_ble_gap_set_security_param(
                esp_ble_sm_param_t_ESP_BLE_SM_SET_RSP_KEY,
                &rsp_key as *const _ as *mut _,
                1,
            );

            // Advertised name must be NUL-terminated for the C API.
            let mut name_buf = [0u8; 25];
            let n = self.device_name.len().min(24);
            name_buf[..n].copy_from_slice(&self.device_name.as_bytes()[..n]);
            esp_ble_gap_set_device_name(name_buf.as_ptr() as *const _);

            let mut adv_params = esp_ble_adv_params_t {
                adv_int_min: 0x20,
                adv_int_max: 0x40,
                adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
                own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
                channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
                adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
                ..core::mem::zeroed()
            };
            esp_ble_gap_start_advertising(&mut adv_params);

            log::info!(
                "BLE(espidf): Bluedroid stack initialised, advertising as '{}'",
                self.device_name
            );
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) {
        info!(
            "BLE(sim): advertising '{}' (service {:032x})",
            self.device_name, SERVICE_UUID
        );
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&mut self) {
        use esp_idf_svc::sys::*;
        unsafe {
            esp_ble_gap_stop_advertising();
            esp_bluedroid_disable();
            esp_bluedroid_deinit();
            esp_bt_controller_disable();
            esp_bt_controller_deinit();
        }
        log::info!("BLE(espidf): stack shut down");
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&mut self) {
        info!("BLE(sim): stopped");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
