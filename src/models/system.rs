//! Identity, localization and the alarm/warning journals.

use serde::{Deserialize, Serialize};

use crate::filetime::FileTime;
use crate::models::codes::UnitsMode;

/// `system.info`: versions and identity of the control software and board.
///
/// Compared as a whole to detect a different machine behind the same
/// endpoint after a reconnect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(rename = "machine.name")]
    pub machine_name: String,
    #[serde(rename = "control.software.version")]
    pub control_software_version: String,
    #[serde(rename = "core.version")]
    pub core_version: String,
    #[serde(rename = "api.server.version")]
    pub api_server_version: String,
    #[serde(rename = "firmware.version")]
    pub firmware_version: String,
    #[serde(rename = "firmware.version.tag")]
    pub firmware_version_tag: String,
    #[serde(rename = "firmware.interface.level")]
    pub firmware_interface_level: String,
    #[serde(rename = "order.code")]
    pub order_code: String,
    #[serde(rename = "customer.id")]
    pub customer_id: String,
    #[serde(rename = "serial.number")]
    pub serial_number: String,
    #[serde(rename = "part.number")]
    pub part_number: String,
    #[serde(rename = "customization.number")]
    pub customization_number: String,
    #[serde(rename = "hardware.version")]
    pub hardware_version: String,
    #[serde(rename = "operative.system")]
    pub operative_system: String,
    #[serde(rename = "operative.system.crc")]
    pub operative_system_crc: String,
    #[serde(rename = "pld.version")]
    pub pld_version: String,
}

/// `localization.info`: active units and language plus installed locales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationInfo {
    #[serde(rename = "units.mode")]
    pub units_mode: i32,
    #[serde(rename = "locale.name")]
    pub locale_name: String,
    pub description: String,
    pub list: Vec<LocaleEntry>,
}

impl LocalizationInfo {
    pub fn units(&self) -> UnitsMode {
        UnitsMode::from(self.units_mode)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleEntry {
    #[serde(rename = "locale.name")]
    pub locale_name: String,
    pub description: String,
    pub owner: String,
    pub revisor: String,
    pub version: String,
    pub date: String,
    pub program: String,
}

/// Result of the four `*.current.list` / `*.history.list` queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmsWarningsList {
    pub list: Vec<AlarmWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmWarning {
    pub code: i32,
    #[serde(rename = "info.1")]
    pub info_1: i32,
    #[serde(rename = "info.2")]
    pub info_2: i32,
    pub text: String,
    pub datetime: FileTime,
}
