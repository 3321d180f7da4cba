//! Device identity derived from the ESP32 factory MAC address.
//!
//! Every unit ships the same firmware image; the only per-device data is
//! the eFuse MAC burned at the factory.  Its last three bytes name the
//! unit everywhere an installer meets it: the boot banner on the serial
//! log and the BLE local name the commissioning app scans for.

use core::fmt::Write;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Identity of this unit, read once at boot.
#[derive(Debug, Clone, Copy)]
pub struct DeviceIdentity {
    mac: MacAddress,
}

impl DeviceIdentity {
    /// Read the factory MAC from eFuse.
    #[cfg(target_os = "espidf")]
    pub fn from_efuse() -> Self {
        let mut mac: MacAddress = [0u8; 6];
        // SAFETY: esp_efuse_mac_get_default writes exactly 6 bytes.
        unsafe {
            esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
        }
        Self { mac }
    }

    /// Simulation: a fixed MAC under the Espressif OUI.
    #[cfg(not(target_os = "espidf"))]
    pub fn from_efuse() -> Self {
        Self {
            mac: [0x24, 0x6F, 0x28, 0x4C, 0x1F, 0x7E],
        }
    }

    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    /// Short unit ID for logs and installer paperwork, e.g. `SL-4C1F7E`.
    pub fn short_id(&self) -> heapless::String<16> {
        let [_, _, _, a, b, c] = self.mac;
        let mut id = heapless::String::new();
        let _ = write!(id, "SL-{a:02X}{b:02X}{c:02X}");
        id
    }

    /// BLE local name, e.g. `skylift-4c1f7e`.  Sized for the 24-byte cap
    /// the GAP layer advertises with.
    pub fn ble_name(&self) -> heapless::String<24> {
        let [_, _, _, a, b, c] = self.mac;
        let mut name = heapless::String::new();
        let _ = write!(name, "skylift-{a:02x}{b:02x}{c:02x}");
        name
    }
}
