//! Mock portal data the registry starts from.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use shared::domain::{
    AccessLogEntry, AccessLogId, ConsentId, ConsentSummary, HospitalId, HospitalSummary,
};

// Seed values are literals; the defaults below are unreachable.
fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn timestamp(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn consent(
    id: i64,
    title: &str,
    description: &str,
    enabled: bool,
    last_modified: NaiveDate,
) -> ConsentSummary {
    ConsentSummary {
        consent_id: ConsentId(id),
        title: title.to_string(),
        description: description.to_string(),
        enabled,
        last_modified,
    }
}

fn hospital(
    id: i64,
    name: &str,
    location: &str,
    kind: &str,
    last_access: Option<NaiveDate>,
) -> HospitalSummary {
    HospitalSummary {
        hospital_id: HospitalId(id),
        name: name.to_string(),
        location: location.to_string(),
        kind: kind.to_string(),
        has_access: last_access.is_some(),
        last_access,
    }
}

pub(crate) fn consents() -> Vec<ConsentSummary> {
    vec![
        consent(
            1,
            "Share with Primary Care Physician",
            "Allow your primary care doctor to access your medical records",
            true,
            date(2024, 1, 15),
        ),
        consent(
            2,
            "Share with Specialists",
            "Allow specialist doctors to view your records when referred",
            false,
            date(2024, 1, 10),
        ),
        consent(
            3,
            "Share with Emergency Services",
            "Allow emergency medical services to access critical information",
            true,
            date(2024, 1, 20),
        ),
        consent(
            4,
            "Share with Family Members",
            "Allow designated family members to view your records",
            false,
            date(2024, 1, 5),
        ),
        consent(
            5,
            "Share for Research Purposes",
            "Allow anonymized data to be used for medical research",
            false,
            date(2024, 1, 1),
        ),
    ]
}

pub(crate) fn hospitals() -> Vec<HospitalSummary> {
    vec![
        hospital(
            1,
            "City General Hospital",
            "Downtown Medical District",
            "General Hospital",
            Some(date(2024, 1, 20)),
        ),
        hospital(2, "Regional Medical Center", "Northside", "Teaching Hospital", None),
        hospital(
            3,
            "Community Health Clinic",
            "Eastside",
            "Community Clinic",
            Some(date(2024, 2, 5)),
        ),
        hospital(4, "Specialty Care Hospital", "Medical Park", "Specialty Hospital", None),
        hospital(
            5,
            "University Medical Center",
            "Campus Area",
            "Academic Medical Center",
            Some(date(2024, 1, 15)),
        ),
        hospital(6, "Riverside Hospital", "Riverside District", "General Hospital", None),
    ]
}

/// Newest first.
pub(crate) fn access_log() -> Vec<AccessLogEntry> {
    vec![
        AccessLogEntry {
            log_id: AccessLogId(1),
            entity: "Dr. Sarah Johnson".to_string(),
            access_type: "Primary Care Physician".to_string(),
            timestamp: timestamp(2024, 2, 1, 14, 30),
            action: "Viewed medical records".to_string(),
        },
        AccessLogEntry {
            log_id: AccessLogId(2),
            entity: "Emergency Services".to_string(),
            access_type: "Emergency Access".to_string(),
            timestamp: timestamp(2024, 1, 28, 9, 15),
            action: "Accessed critical information".to_string(),
        },
        AccessLogEntry {
            log_id: AccessLogId(3),
            entity: "Dr. Michael Chen".to_string(),
            access_type: "Specialist".to_string(),
            timestamp: timestamp(2024, 1, 25, 11, 20),
            action: "Viewed diagnostic reports".to_string(),
        },
    ]
}
