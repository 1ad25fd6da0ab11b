//! In-memory consent toggles, hospital access grants and the access log.

use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    domain::{AccessLogEntry, AccessLogId, ConsentId, ConsentSummary, HospitalId, HospitalSummary},
    protocol::PortalEvent,
};
use tracing::info;

pub mod error;
mod seed;

pub use error::ConsentError;

pub const HOSPITAL_ACCESS_TYPE: &str = "Hospital Access";
pub const HOSPITAL_ACCESS_GRANTED_ACTION: &str = "Access granted to medical records";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentChange {
    pub consent: ConsentSummary,
    pub previously_enabled: bool,
}

impl ConsentChange {
    pub fn notification(&self) -> String {
        let verb = if self.consent.enabled {
            "enabled"
        } else {
            "disabled"
        };
        format!("{} has been {verb}", self.consent.title)
    }

    pub fn to_event(&self) -> PortalEvent {
        PortalEvent::ConsentChanged {
            consent: self.consent.clone(),
            notification: self.notification(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HospitalAccessChange {
    pub hospital: HospitalSummary,
    pub previously_granted: bool,
    /// Entry prepended to the access log when access went from revoked to granted.
    pub logged: Option<AccessLogEntry>,
}

impl HospitalAccessChange {
    pub fn notification(&self) -> String {
        if self.hospital.has_access {
            format!("✓ Access granted for {}", self.hospital.name)
        } else {
            format!("✗ Access revoked for {}", self.hospital.name)
        }
    }

    pub fn to_events(&self) -> Vec<PortalEvent> {
        let mut events = vec![PortalEvent::HospitalAccessChanged {
            hospital: self.hospital.clone(),
            notification: self.notification(),
        }];
        if let Some(entry) = &self.logged {
            events.push(PortalEvent::AccessLogged(entry.clone()));
        }
        events
    }
}

#[derive(Debug, Clone)]
pub struct ConsentRegistry {
    consents: Vec<ConsentSummary>,
    hospitals: Vec<HospitalSummary>,
    access_log: Vec<AccessLogEntry>,
    next_log_id: i64,
}

impl Default for ConsentRegistry {
    fn default() -> Self {
        Self::seeded()
    }
}

impl ConsentRegistry {
    pub fn new(
        consents: Vec<ConsentSummary>,
        hospitals: Vec<HospitalSummary>,
        access_log: Vec<AccessLogEntry>,
    ) -> Self {
        let next_log_id = access_log
            .iter()
            .map(|entry| entry.log_id.0)
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            consents,
            hospitals,
            access_log,
            next_log_id,
        }
    }

    /// Registry populated with the portal's mock patient data.
    pub fn seeded() -> Self {
        Self::new(seed::consents(), seed::hospitals(), seed::access_log())
    }

    pub fn consents(&self) -> &[ConsentSummary] {
        &self.consents
    }

    pub fn consent(&self, consent_id: ConsentId) -> Option<&ConsentSummary> {
        self.consents
            .iter()
            .find(|consent| consent.consent_id == consent_id)
    }

    pub fn hospitals(&self) -> &[HospitalSummary] {
        &self.hospitals
    }

    pub fn hospital(&self, hospital_id: HospitalId) -> Option<&HospitalSummary> {
        self.hospitals
            .iter()
            .find(|hospital| hospital.hospital_id == hospital_id)
    }

    /// Newest entry first.
    pub fn access_log(&self) -> &[AccessLogEntry] {
        &self.access_log
    }

    /// Sets a consent flag and stamps its modification date, even when the
    /// flag already had the requested value.
    pub fn set_consent(
        &mut self,
        consent_id: ConsentId,
        enabled: bool,
        today: NaiveDate,
    ) -> Result<ConsentChange, ConsentError> {
        let consent = self
            .consents
            .iter_mut()
            .find(|consent| consent.consent_id == consent_id)
            .ok_or(ConsentError::UnknownConsent(consent_id))?;

        let previously_enabled = consent.enabled;
        consent.enabled = enabled;
        consent.last_modified = today;
        info!(consent = %consent_id, enabled, "consent: updated");

        Ok(ConsentChange {
            consent: consent.clone(),
            previously_enabled,
        })
    }

    pub fn set_hospital_access(
        &mut self,
        hospital_id: HospitalId,
        has_access: bool,
        now: DateTime<Utc>,
    ) -> Result<HospitalAccessChange, ConsentError> {
        let hospital = self
            .hospitals
            .iter_mut()
            .find(|hospital| hospital.hospital_id == hospital_id)
            .ok_or(ConsentError::UnknownHospital(hospital_id))?;

        let previously_granted = hospital.has_access;
        hospital.has_access = has_access;
        if has_access {
            hospital.last_access = Some(now.date_naive());
        }
        let hospital = hospital.clone();
        info!(hospital = %hospital_id, has_access, "hospital access: updated");

        let logged = (has_access && !previously_granted).then(|| {
            self.record_access(
                &hospital.name,
                HOSPITAL_ACCESS_TYPE,
                HOSPITAL_ACCESS_GRANTED_ACTION,
                now,
            )
        });

        Ok(HospitalAccessChange {
            hospital,
            previously_granted,
            logged,
        })
    }

    /// Prepends an entry to the access log and returns it.
    pub fn record_access(
        &mut self,
        entity: &str,
        access_type: &str,
        action: &str,
        now: DateTime<Utc>,
    ) -> AccessLogEntry {
        let entry = AccessLogEntry {
            log_id: AccessLogId(self.next_log_id),
            entity: entity.to_string(),
            access_type: access_type.to_string(),
            timestamp: now,
            action: action.to_string(),
        };
        self.next_log_id += 1;
        self.access_log.insert(0, entry.clone());
        info!(log = %entry.log_id, entity, access_type, "access log: recorded");
        entry
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
