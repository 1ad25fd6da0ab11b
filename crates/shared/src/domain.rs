use std::{fmt, str::FromStr, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id '{raw}'")]
pub struct ParseIdError {
    pub kind: &'static str,
    pub raw: String,
}

macro_rules! id_newtype {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        /// Accepts both `prefix-N` and a bare `N`.
        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                let digits = trimmed
                    .strip_prefix(concat!($prefix, "-"))
                    .unwrap_or(trimmed);
                digits.parse::<i64>().map($name).map_err(|_| ParseIdError {
                    kind: $prefix,
                    raw: raw.to_string(),
                })
            }
        }
    };
}

id_newtype!(ConsentId, "consent");
id_newtype!(HospitalId, "hospital");
id_newtype!(AccessLogId, "log");
id_newtype!(RecordId, "record");

const MILLIS_PER_MINUTE: u128 = 60_000;
const MILLIS_PER_SECOND: u128 = 1_000;
/// Countdowns below this remaining time are flagged as a warning.
pub const COUNTDOWN_WARNING_THRESHOLD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyAccessStatus {
    #[default]
    Inactive,
    Active,
    Expired,
}

/// Snapshot of the emergency-access lifecycle.
///
/// `ends_at` is present exactly when `status` is [`EmergencyAccessStatus::Active`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EmergencyAccessState {
    pub status: EmergencyAccessStatus,
    pub activated_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl EmergencyAccessState {
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn active(activated_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self {
            status: EmergencyAccessStatus::Active,
            activated_at: Some(activated_at),
            ends_at: Some(ends_at),
        }
    }

    pub fn expired() -> Self {
        Self {
            status: EmergencyAccessStatus::Expired,
            activated_at: None,
            ends_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EmergencyAccessStatus::Active
    }

    /// Label for the activation control in the current state.
    pub fn button_label(&self) -> &'static str {
        if self.is_active() {
            "Emergency Access Active"
        } else {
            "Activate Emergency Access"
        }
    }

    pub fn banner(&self) -> &'static str {
        match self.status {
            EmergencyAccessStatus::Active => "Emergency access is currently active",
            EmergencyAccessStatus::Expired => "Emergency access has expired",
            EmergencyAccessStatus::Inactive => "Emergency access is not active",
        }
    }
}

/// One countdown notification while emergency access is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownTick {
    pub minutes: u64,
    pub seconds: u64,
    #[serde(with = "duration_millis")]
    pub remaining: Duration,
    pub is_warning: bool,
}

impl CountdownTick {
    pub fn from_remaining(remaining: Duration) -> Self {
        let millis = remaining.as_millis();
        Self {
            minutes: (millis / MILLIS_PER_MINUTE) as u64,
            seconds: ((millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND) as u64,
            remaining,
            is_warning: remaining < COUNTDOWN_WARNING_THRESHOLD,
        }
    }

    pub fn accessible_label(&self) -> String {
        format!(
            "Time remaining: {} minutes and {} seconds",
            self.minutes, self.seconds
        )
    }
}

impl fmt::Display for CountdownTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentSummary {
    pub consent_id: ConsentId,
    pub title: String,
    pub description: String,
    pub enabled: bool,
    pub last_modified: NaiveDate,
}

impl ConsentSummary {
    pub fn status_label(&self) -> &'static str {
        if self.enabled {
            "Active"
        } else {
            "Inactive"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalSummary {
    pub hospital_id: HospitalId,
    pub name: String,
    pub location: String,
    pub kind: String,
    pub has_access: bool,
    pub last_access: Option<NaiveDate>,
}

impl HospitalSummary {
    pub fn access_label(&self) -> &'static str {
        if self.has_access {
            "Access Granted"
        } else {
            "Access Revoked"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub log_id: AccessLogId,
    pub entity: String,
    pub access_type: String,
    pub timestamp: DateTime<Utc>,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown record category '{0}'")]
pub struct ParseCategoryError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordCategory {
    Diagnosis,
    Medication,
    Test,
    Consultation,
    Imaging,
}

impl RecordCategory {
    pub const ALL: [RecordCategory; 5] = [
        Self::Diagnosis,
        Self::Medication,
        Self::Test,
        Self::Consultation,
        Self::Imaging,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diagnosis => "diagnosis",
            Self::Medication => "medication",
            Self::Test => "test",
            Self::Consultation => "consultation",
            Self::Imaging => "imaging",
        }
    }
}

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordCategory {
    type Err = ParseCategoryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| ParseCategoryError(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabResult {
    pub label: String,
    pub value: String,
}

/// Type-specific content attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordDetail {
    Results { results: Vec<LabResult> },
    Medication { medication: String, dosage: String },
    Findings { findings: String },
    Diagnosis { diagnosis: String },
    Notes { notes: String },
}

/// One entry of the patient's medical history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub record_id: RecordId,
    pub date: NaiveDate,
    pub record_type: String,
    pub title: String,
    pub doctor: String,
    pub description: String,
    pub category: RecordCategory,
    pub detail: Option<RecordDetail>,
}

/// Records of one calendar month, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineGroup {
    pub year: i32,
    pub month: String,
    pub records: Vec<MedicalRecord>,
}

/// Format a hospital delivered a record in before it was unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceFormat {
    Json,
    Xml,
    Csv,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::Csv => "CSV",
        })
    }
}

/// A record received from an external hospital, shown in the unified view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub record_id: RecordId,
    pub hospital: String,
    pub format: SourceFormat,
    pub date: NaiveDate,
    pub record_type: String,
    pub title: String,
    pub doctor: String,
    pub detail: Option<RecordDetail>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub hospital: String,
    pub formats: Vec<SourceFormat>,
    pub record_count: usize,
}

impl SourceSummary {
    pub fn record_count_label(&self) -> String {
        match self.record_count {
            1 => "1 record".to_string(),
            count => format!("{count} records"),
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
