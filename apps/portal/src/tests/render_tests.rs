use super::*;
use std::time::Duration;

use chrono::TimeZone;

fn rendered(renderer: TerminalRenderer<Vec<u8>>) -> String {
    String::from_utf8(renderer.into_inner()).expect("utf8")
}

#[test]
fn dates_render_like_the_portal() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 5).expect("date");
    assert_eq!(format_date(date), "January 5, 2024");

    let timestamp = Utc
        .with_ymd_and_hms(2024, 2, 1, 14, 30, 0)
        .single()
        .expect("timestamp");
    assert_eq!(format_date_time(timestamp), "Feb 1, 2024, 02:30 PM");
}

#[test]
fn countdown_redraws_in_place_until_next_line() {
    let renderer = TerminalRenderer::new(Vec::new(), OutputFormat::Text);
    renderer.on_tick(&CountdownTick::from_remaining(Duration::from_secs(61)));
    renderer.on_tick(&CountdownTick::from_remaining(Duration::from_secs(45)));
    renderer.on_expired();
    renderer.on_state_change(&EmergencyAccessState::inactive());

    assert_eq!(
        rendered(renderer),
        "\rTime remaining 01:01   \
         \rTime remaining 00:45 (less than a minute left)   \
         \nTime remaining Expired\n\
         [Activate Emergency Access] Emergency access is not active\n"
    );
}

#[test]
fn active_state_shows_button_and_deadline() {
    let renderer = TerminalRenderer::new(Vec::new(), OutputFormat::Text);
    let activated_at = Utc
        .with_ymd_and_hms(2024, 2, 1, 9, 0, 0)
        .single()
        .expect("timestamp");
    renderer.on_state_change(&EmergencyAccessState::active(
        activated_at,
        activated_at + chrono::Duration::minutes(15),
    ));

    assert_eq!(
        rendered(renderer),
        "[Emergency Access Active] Emergency access is currently active until 09:15:00 UTC\n"
    );
}

#[test]
fn json_mode_emits_one_event_per_line() {
    let renderer = TerminalRenderer::new(Vec::new(), OutputFormat::Json);
    renderer.on_tick(&CountdownTick::from_remaining(Duration::from_secs(125)));
    renderer.on_expired();

    let output = rendered(renderer);
    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["type"], "emergency_tick");
    assert_eq!(lines[0]["payload"]["minutes"], 2);
    assert_eq!(lines[0]["payload"]["seconds"], 5);
    assert_eq!(lines[1]["type"], "emergency_expired");
}

#[test]
fn hospital_listing_mentions_missing_access() {
    let renderer = TerminalRenderer::new(Vec::new(), OutputFormat::Text);
    let registry = consent::ConsentRegistry::seeded();
    let hospital = registry
        .hospital(shared::domain::HospitalId(2))
        .expect("hospital-2")
        .clone();
    renderer.hospitals(&[hospital]);

    let output = rendered(renderer);
    assert!(output.starts_with("hospital-2  [Access Revoked] Regional Medical Center"));
    assert!(output.contains("No previous access"));
}

#[test]
fn text_header_names_patient() {
    let renderer = TerminalRenderer::new(Vec::new(), OutputFormat::Text);
    renderer.header(&Settings::default());
    assert_eq!(rendered(renderer), "John Doe (ID: P-2024-001234)\n");

    let renderer = TerminalRenderer::new(Vec::new(), OutputFormat::Json);
    renderer.header(&Settings::default());
    assert!(rendered(renderer).is_empty());
}

#[test]
fn timeline_renders_month_headers_and_details() {
    let renderer = TerminalRenderer::new(Vec::new(), OutputFormat::Text);
    let store = records::RecordStore::seeded();
    let filter = records::RecordFilter::Category(shared::domain::RecordCategory::Medication);
    renderer.timeline(&store.timeline(filter));

    assert_eq!(
        rendered(renderer),
        "2024 January\n  \
         Sat, Jan 20, 2024  Medication: Prescription: Antibiotics\n    \
         By Dr. Sarah Johnson\n    \
         Prescribed Amoxicillin 500mg, twice daily for 7 days for bacterial infection treatment.\n    \
         Amoxicillin 500mg, Twice daily for 7 days\n"
    );
}

#[test]
fn empty_timeline_says_so_in_text_only() {
    let renderer = TerminalRenderer::new(Vec::new(), OutputFormat::Text);
    renderer.timeline(&[]);
    assert_eq!(
        rendered(renderer),
        "No records found for the selected filter.\n"
    );

    let renderer = TerminalRenderer::new(Vec::new(), OutputFormat::Json);
    renderer.timeline(&[]);
    assert!(rendered(renderer).is_empty());
}

#[test]
fn sources_list_hospitals_then_unified_records() {
    let renderer = TerminalRenderer::new(Vec::new(), OutputFormat::Text);
    let store = records::RecordStore::seeded();
    let unified = store.unified_records();
    renderer.sources(&store.source_summaries()[..1], &unified[..1]);

    assert_eq!(
        rendered(renderer),
        "City General Hospital (1 record) [JSON]\n    \
         ✓ Automatically converted to unified format\n\
         [JSON] Blood Test: Complete Blood Count (Normal)\n    \
         Hospital: City General Hospital\n    \
         Date: February 10, 2024\n    \
         Doctor: Dr. Sarah Johnson\n    \
         Hemoglobin: 14.2 g/dL\n    \
         White Blood Cells: 6.5\n    \
         Platelets: 250,000\n"
    );
}
