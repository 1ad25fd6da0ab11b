//! Mock medical history and external hospital records.

use chrono::NaiveDate;
use shared::domain::{
    LabResult, MedicalRecord, RecordCategory, RecordDetail, RecordId, SourceFormat, SourceRecord,
};

// Seed values are literals; the default below is unreachable.
fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn results(pairs: &[(&str, &str)]) -> Option<RecordDetail> {
    Some(RecordDetail::Results {
        results: pairs
            .iter()
            .map(|(label, value)| LabResult {
                label: label.to_string(),
                value: value.to_string(),
            })
            .collect(),
    })
}

fn antibiotics() -> Option<RecordDetail> {
    Some(RecordDetail::Medication {
        medication: "Amoxicillin 500mg".to_string(),
        dosage: "Twice daily for 7 days".to_string(),
    })
}

fn cbc() -> Option<RecordDetail> {
    results(&[
        ("Hemoglobin", "14.2 g/dL"),
        ("White Blood Cells", "6.5"),
        ("Platelets", "250,000"),
    ])
}

fn lipid_panel() -> Option<RecordDetail> {
    results(&[
        ("Total Cholesterol", "180 mg/dL"),
        ("LDL", "110 mg/dL"),
        ("HDL", "55 mg/dL"),
    ])
}

fn record(
    id: i64,
    date: NaiveDate,
    record_type: &str,
    title: &str,
    doctor: &str,
    description: &str,
    category: RecordCategory,
    detail: Option<RecordDetail>,
) -> MedicalRecord {
    MedicalRecord {
        record_id: RecordId(id),
        date,
        record_type: record_type.to_string(),
        title: title.to_string(),
        doctor: doctor.to_string(),
        description: description.to_string(),
        category,
        detail,
    }
}

/// Newest first.
pub(crate) fn medical_records() -> Vec<MedicalRecord> {
    use RecordCategory::*;

    vec![
        record(
            1,
            date(2024, 2, 15),
            "Consultation",
            "Annual Physical Examination",
            "Dr. Sarah Johnson",
            "Routine annual checkup. Patient is in good health. Blood pressure normal, heart rate regular.",
            Consultation,
            None,
        ),
        record(
            2,
            date(2024, 2, 10),
            "Blood Test",
            "Complete Blood Count (CBC)",
            "Dr. Michael Chen",
            "Blood test results: Hemoglobin 14.2 g/dL (normal), White blood cells 6.5 (normal), Platelets 250,000 (normal).",
            Test,
            cbc(),
        ),
        record(
            3,
            date(2024, 1, 28),
            "X-Ray",
            "Chest X-Ray",
            "Dr. Emily Rodriguez",
            "Chest X-ray examination. No abnormalities detected. Lungs clear, heart size normal.",
            Imaging,
            None,
        ),
        record(
            4,
            date(2024, 1, 20),
            "Medication",
            "Prescription: Antibiotics",
            "Dr. Sarah Johnson",
            "Prescribed Amoxicillin 500mg, twice daily for 7 days for bacterial infection treatment.",
            Medication,
            antibiotics(),
        ),
        record(
            5,
            date(2024, 1, 15),
            "Diagnosis",
            "Upper Respiratory Infection",
            "Dr. Sarah Johnson",
            "Diagnosed with mild upper respiratory infection. Symptoms include cough and congestion.",
            Diagnosis,
            None,
        ),
        record(
            6,
            date(2024, 1, 5),
            "Blood Test",
            "Lipid Panel",
            "Dr. Michael Chen",
            "Cholesterol levels: Total 180 mg/dL (normal), LDL 110 mg/dL (normal), HDL 55 mg/dL (good).",
            Test,
            lipid_panel(),
        ),
        record(
            7,
            date(2023, 12, 20),
            "Consultation",
            "Follow-up Visit",
            "Dr. Sarah Johnson",
            "Follow-up appointment to review medication effectiveness. Patient reports improvement.",
            Consultation,
            None,
        ),
        record(
            8,
            date(2023, 12, 10),
            "X-Ray",
            "Knee X-Ray",
            "Dr. Emily Rodriguez",
            "X-ray of right knee. No fractures detected. Minor inflammation noted.",
            Imaging,
            None,
        ),
        record(
            9,
            date(2023, 11, 25),
            "Blood Test",
            "Blood Glucose Test",
            "Dr. Michael Chen",
            "Fasting blood glucose: 95 mg/dL (normal range). No signs of diabetes.",
            Test,
            results(&[("Blood Glucose", "95 mg/dL")]),
        ),
        record(
            10,
            date(2023, 11, 15),
            "Consultation",
            "Cardiology Consultation",
            "Dr. James Wilson",
            "Cardiology consultation for routine heart health check. EKG performed, results normal.",
            Consultation,
            None,
        ),
    ]
}

fn source(
    id: i64,
    hospital: &str,
    format: SourceFormat,
    date: NaiveDate,
    record_type: &str,
    title: &str,
    doctor: &str,
    detail: Option<RecordDetail>,
    status: &str,
) -> SourceRecord {
    SourceRecord {
        record_id: RecordId(id),
        hospital: hospital.to_string(),
        format,
        date,
        record_type: record_type.to_string(),
        title: title.to_string(),
        doctor: doctor.to_string(),
        detail,
        status: status.to_string(),
    }
}

pub(crate) fn source_records() -> Vec<SourceRecord> {
    use SourceFormat::*;

    vec![
        source(
            1,
            "City General Hospital",
            Json,
            date(2024, 2, 10),
            "Blood Test",
            "Complete Blood Count",
            "Dr. Sarah Johnson",
            cbc(),
            "Normal",
        ),
        source(
            2,
            "Regional Medical Center",
            Xml,
            date(2024, 1, 28),
            "X-Ray",
            "Chest X-Ray Examination",
            "Dr. Michael Chen",
            Some(RecordDetail::Findings {
                findings: "No abnormalities detected. Lungs clear.".to_string(),
            }),
            "Normal",
        ),
        source(
            3,
            "Community Health Clinic",
            Csv,
            date(2024, 1, 15),
            "Consultation",
            "Annual Physical Examination",
            "Dr. Emily Rodriguez",
            Some(RecordDetail::Notes {
                notes: "Patient in good health. Blood pressure normal.".to_string(),
            }),
            "Completed",
        ),
        source(
            4,
            "University Medical Center",
            Json,
            date(2024, 1, 5),
            "Blood Test",
            "Lipid Panel",
            "Dr. James Wilson",
            lipid_panel(),
            "Normal",
        ),
        source(
            5,
            "Specialty Care Hospital",
            Xml,
            date(2023, 12, 20),
            "Medication",
            "Prescription: Antibiotics",
            "Dr. Lisa Anderson",
            antibiotics(),
            "Active",
        ),
        source(
            6,
            "Riverside Hospital",
            Csv,
            date(2023, 12, 10),
            "Diagnosis",
            "Upper Respiratory Infection",
            "Dr. Robert Brown",
            Some(RecordDetail::Diagnosis {
                diagnosis: "Mild upper respiratory infection".to_string(),
            }),
            "Resolved",
        ),
    ]
}
