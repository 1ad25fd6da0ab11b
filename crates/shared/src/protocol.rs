use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        AccessLogEntry, ConsentSummary, CountdownTick, EmergencyAccessState, HospitalSummary,
    },
    error::PortalError,
};

/// Events emitted to presentation layers, one JSON object per line in
/// machine-readable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PortalEvent {
    EmergencyStateChanged(EmergencyAccessState),
    EmergencyTick(CountdownTick),
    EmergencyExpired,
    ConsentChanged {
        consent: ConsentSummary,
        notification: String,
    },
    HospitalAccessChanged {
        hospital: HospitalSummary,
        notification: String,
    },
    AccessLogged(AccessLogEntry),
    Error(PortalError),
}

impl PortalEvent {
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
