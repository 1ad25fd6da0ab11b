use super::*;
use chrono::TimeZone;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 10, 45, 0)
        .single()
        .expect("valid timestamp")
}

#[test]
fn seeded_registry_matches_portal_mock_data() {
    let registry = ConsentRegistry::seeded();
    assert_eq!(registry.consents().len(), 5);
    assert_eq!(registry.hospitals().len(), 6);
    assert_eq!(registry.access_log().len(), 3);

    let emergency = registry.consent(ConsentId(3)).expect("consent-3");
    assert_eq!(emergency.title, "Share with Emergency Services");
    assert!(emergency.enabled);

    let granted: Vec<_> = registry
        .hospitals()
        .iter()
        .filter(|hospital| hospital.has_access)
        .map(|hospital| hospital.hospital_id.0)
        .collect();
    assert_eq!(granted, vec![1, 3, 5]);
    assert!(registry
        .hospitals()
        .iter()
        .all(|hospital| hospital.has_access == hospital.last_access.is_some()));

    assert_eq!(registry.access_log()[0].entity, "Dr. Sarah Johnson");
}

#[test]
fn toggling_consent_updates_flag_and_date() {
    let mut registry = ConsentRegistry::seeded();
    let today = now().date_naive();

    let change = registry
        .set_consent(ConsentId(2), true, today)
        .expect("consent-2");
    assert!(!change.previously_enabled);
    assert!(change.consent.enabled);
    assert_eq!(change.consent.last_modified, today);
    assert_eq!(
        change.notification(),
        "Share with Specialists has been enabled"
    );
    assert_eq!(registry.consent(ConsentId(2)), Some(&change.consent));

    let change = registry
        .set_consent(ConsentId(2), false, today)
        .expect("consent-2");
    assert_eq!(
        change.notification(),
        "Share with Specialists has been disabled"
    );
}

#[test]
fn unknown_consent_is_reported() {
    let mut registry = ConsentRegistry::seeded();
    let before = registry.consents().to_vec();
    let err = registry
        .set_consent(ConsentId(42), true, now().date_naive())
        .expect_err("unknown");
    assert_eq!(err, ConsentError::UnknownConsent(ConsentId(42)));
    assert_eq!(err.to_string(), "unknown consent consent-42");
    assert_eq!(registry.consents(), before.as_slice());
}

#[test]
fn granting_hospital_access_logs_entry_once() {
    let mut registry = ConsentRegistry::seeded();

    let change = registry
        .set_hospital_access(HospitalId(2), true, now())
        .expect("hospital-2");
    assert!(!change.previously_granted);
    assert_eq!(change.hospital.last_access, Some(now().date_naive()));
    assert_eq!(
        change.notification(),
        "✓ Access granted for Regional Medical Center"
    );

    let logged = change.logged.clone().expect("log entry");
    assert_eq!(logged.log_id, AccessLogId(4));
    assert_eq!(logged.entity, "Regional Medical Center");
    assert_eq!(logged.access_type, HOSPITAL_ACCESS_TYPE);
    assert_eq!(logged.action, HOSPITAL_ACCESS_GRANTED_ACTION);
    assert_eq!(registry.access_log()[0], logged);
    assert_eq!(registry.access_log().len(), 4);
    assert_eq!(change.to_events().len(), 2);

    let again = registry
        .set_hospital_access(HospitalId(2), true, now())
        .expect("hospital-2");
    assert!(again.logged.is_none());
    assert_eq!(registry.access_log().len(), 4);
}

#[test]
fn revoking_hospital_access_keeps_last_access_and_log() {
    let mut registry = ConsentRegistry::seeded();
    let change = registry
        .set_hospital_access(HospitalId(1), false, now())
        .expect("hospital-1");

    assert!(change.previously_granted);
    assert!(!change.hospital.has_access);
    assert_eq!(change.hospital.access_label(), "Access Revoked");
    assert_eq!(
        change.hospital.last_access,
        NaiveDate::from_ymd_opt(2024, 1, 20)
    );
    assert!(change.logged.is_none());
    assert_eq!(
        change.notification(),
        "✗ Access revoked for City General Hospital"
    );
    assert_eq!(registry.access_log().len(), 3);

    let err = registry
        .set_hospital_access(HospitalId(9), true, now())
        .expect_err("unknown");
    assert_eq!(err, ConsentError::UnknownHospital(HospitalId(9)));
}

#[test]
fn recorded_access_is_prepended_with_fresh_ids() {
    let mut registry = ConsentRegistry::new(Vec::new(), Vec::new(), Vec::new());
    let first = registry.record_access("Dr. A", "Specialist", "Viewed labs", now());
    let second = registry.record_access("Dr. B", "Specialist", "Viewed imaging", now());

    assert_eq!(first.log_id, AccessLogId(1));
    assert_eq!(second.log_id, AccessLogId(2));
    assert_eq!(registry.access_log(), &[second, first]);
}

#[test]
fn consent_change_event_serializes_notification() {
    let mut registry = ConsentRegistry::seeded();
    let change = registry
        .set_consent(ConsentId(5), true, now().date_naive())
        .expect("consent-5");
    let value: serde_json::Value =
        serde_json::from_str(&change.to_event().to_json_line().expect("json")).expect("parse");
    assert_eq!(value["type"], "consent_changed");
    assert_eq!(
        value["payload"]["notification"],
        "Share for Research Purposes has been enabled"
    );
    assert_eq!(value["payload"]["consent"]["last_modified"], "2024-03-09");
}
