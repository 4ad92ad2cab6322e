//! Control channel messages, in the JSON shape external callers send.

use serde::{Deserialize, Serialize};
use sweeper_core_types::ObserverConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlRequest {
    /// Toggles the diagnostics overlay.
    SetHighlight { value: bool },
    /// Toggles suppression globally.
    SetDisable { value: bool },
    GetStatus,
}

/// Acknowledgement echoing the flag a toggle set, or both flags for a status
/// query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlResponse {
    Status {
        #[serde(rename = "diagnosticsEnabled")]
        diagnostics_enabled: bool,
        #[serde(rename = "globallyDisabled")]
        globally_disabled: bool,
    },
    Diagnostics {
        #[serde(rename = "diagnosticsEnabled")]
        diagnostics_enabled: bool,
    },
    Disabled {
        #[serde(rename = "globallyDisabled")]
        globally_disabled: bool,
    },
}

impl ControlResponse {
    pub fn status(config: &ObserverConfig) -> Self {
        ControlResponse::Status {
            diagnostics_enabled: config.diagnostics_enabled,
            globally_disabled: config.globally_disabled,
        }
    }
}
