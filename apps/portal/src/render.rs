//! Terminal presentation for portal events and records.

use std::{
    io::Write,
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, NaiveDate, Utc};
use emergency_access::EmergencyAccessObserver;
use serde::Serialize;
use shared::{
    domain::{
        AccessLogEntry, ConsentSummary, CountdownTick, EmergencyAccessState, HospitalSummary,
        RecordDetail, SourceRecord, SourceSummary, TimelineGroup,
    },
    protocol::PortalEvent,
};
use tracing::warn;

use crate::config::{OutputFormat, Settings};

pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn format_date_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y, %I:%M %p").to_string()
}

pub fn format_timeline_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}

const NO_MATCHING_RECORDS: &str = "No records found for the selected filter.";

struct Output<W> {
    writer: W,
    // A countdown line is being redrawn in place and has no newline yet.
    countdown_open: bool,
}

pub struct TerminalRenderer<W> {
    format: OutputFormat,
    out: Mutex<Output<W>>,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            format,
            out: Mutex::new(Output {
                writer,
                countdown_open: false,
            }),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .writer
    }

    pub fn header(&self, settings: &Settings) {
        if self.format == OutputFormat::Text {
            self.line(&format!(
                "{} (ID: {})",
                settings.patient_name, settings.patient_id
            ));
        }
    }

    pub fn event(&self, event: &PortalEvent) {
        match self.format {
            OutputFormat::Json => self.json(event),
            OutputFormat::Text => match event {
                PortalEvent::EmergencyTick(tick) => self.countdown(tick),
                other => self.line(&describe(other)),
            },
        }
    }

    pub fn consents(&self, consents: &[ConsentSummary]) {
        for consent in consents {
            match self.format {
                OutputFormat::Json => self.json(consent),
                OutputFormat::Text => self.line(&format!(
                    "{:<11} [{}] {}\n            {}\n            Last modified: {}",
                    consent.consent_id.to_string(),
                    consent.status_label(),
                    consent.title,
                    consent.description,
                    format_date(consent.last_modified)
                )),
            }
        }
    }

    pub fn hospitals(&self, hospitals: &[HospitalSummary]) {
        for hospital in hospitals {
            match self.format {
                OutputFormat::Json => self.json(hospital),
                OutputFormat::Text => {
                    let last_access = hospital
                        .last_access
                        .map(|date| format!("Last access: {}", format_date(date)))
                        .unwrap_or_else(|| "No previous access".to_string());
                    self.line(&format!(
                        "{:<11} [{}] {} - {} ({})\n            {last_access}",
                        hospital.hospital_id.to_string(),
                        hospital.access_label(),
                        hospital.name,
                        hospital.location,
                        hospital.kind
                    ));
                }
            }
        }
    }

    pub fn access_log(&self, entries: &[AccessLogEntry]) {
        for entry in entries {
            match self.format {
                OutputFormat::Json => self.json(entry),
                OutputFormat::Text => self.line(&describe_log_entry(entry)),
            }
        }
    }

    pub fn timeline(&self, groups: &[TimelineGroup]) {
        if self.format == OutputFormat::Text && groups.is_empty() {
            self.line(NO_MATCHING_RECORDS);
            return;
        }
        for group in groups {
            match self.format {
                OutputFormat::Json => self.json(group),
                OutputFormat::Text => {
                    let mut text = format!("{} {}", group.year, group.month);
                    for record in &group.records {
                        text.push_str(&format!(
                            "\n  {}  {}: {}\n    By {}\n    {}",
                            format_timeline_date(record.date),
                            record.record_type,
                            record.title,
                            record.doctor,
                            record.description
                        ));
                        push_detail(&mut text, record.detail.as_ref());
                    }
                    self.line(&text);
                }
            }
        }
    }

    pub fn sources(&self, summaries: &[SourceSummary], records: &[&SourceRecord]) {
        for summary in summaries {
            match self.format {
                OutputFormat::Json => self.json(summary),
                OutputFormat::Text => {
                    let formats: Vec<_> = summary.formats.iter().map(ToString::to_string).collect();
                    self.line(&format!(
                        "{} ({}) [{}]\n    ✓ Automatically converted to unified format",
                        summary.hospital,
                        summary.record_count_label(),
                        formats.join(", ")
                    ));
                }
            }
        }
        for record in records {
            match self.format {
                OutputFormat::Json => self.json(record),
                OutputFormat::Text => {
                    let mut text = format!(
                        "[{}] {}: {} ({})\n    Hospital: {}\n    Date: {}\n    Doctor: {}",
                        record.format,
                        record.record_type,
                        record.title,
                        record.status,
                        record.hospital,
                        format_date(record.date),
                        record.doctor
                    );
                    push_detail(&mut text, record.detail.as_ref());
                    self.line(&text);
                }
            }
        }
    }

    fn countdown(&self, tick: &CountdownTick) {
        let warning = if tick.is_warning {
            " (less than a minute left)"
        } else {
            ""
        };
        let mut out = self.lock();
        out.countdown_open = true;
        let writer = &mut out.writer;
        let result = write!(writer, "\rTime remaining {tick}{warning}   ")
            .and_then(|()| writer.flush());
        if let Err(err) = result {
            warn!("render: failed to write countdown: {err}");
        }
    }

    fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string(value) {
            Ok(line) => self.line(&line),
            Err(err) => warn!("render: failed to serialize output: {err}"),
        }
    }

    fn line(&self, text: &str) {
        let mut out = self.lock();
        let prefix = if std::mem::take(&mut out.countdown_open) {
            "\n"
        } else {
            ""
        };
        let writer = &mut out.writer;
        let result = writeln!(writer, "{prefix}{text}").and_then(|()| writer.flush());
        if let Err(err) = result {
            warn!("render: failed to write output: {err}");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Output<W>> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn describe(event: &PortalEvent) -> String {
    match event {
        PortalEvent::EmergencyStateChanged(state) => describe_state(state),
        PortalEvent::EmergencyTick(tick) => format!("Time remaining {tick}"),
        PortalEvent::EmergencyExpired => "Time remaining Expired".to_string(),
        PortalEvent::ConsentChanged { notification, .. }
        | PortalEvent::HospitalAccessChanged { notification, .. } => notification.clone(),
        PortalEvent::AccessLogged(entry) => format!("Logged: {}", describe_log_entry(entry)),
        PortalEvent::Error(body) => format!("error: {}", body.message),
    }
}

fn describe_state(state: &EmergencyAccessState) -> String {
    match state.ends_at {
        Some(ends_at) => format!(
            "[{}] {} until {}",
            state.button_label(),
            state.banner(),
            ends_at.format("%H:%M:%S UTC")
        ),
        None => format!("[{}] {}", state.button_label(), state.banner()),
    }
}

fn push_detail(text: &mut String, detail: Option<&RecordDetail>) {
    let lines: Vec<String> = match detail {
        None => return,
        Some(RecordDetail::Results { results }) => results
            .iter()
            .map(|result| format!("{}: {}", result.label, result.value))
            .collect(),
        Some(RecordDetail::Medication { medication, dosage }) => {
            vec![format!("{medication}, {dosage}")]
        }
        Some(RecordDetail::Findings { findings }) => vec![findings.clone()],
        Some(RecordDetail::Diagnosis { diagnosis }) => vec![format!("Diagnosis: {diagnosis}")],
        Some(RecordDetail::Notes { notes }) => vec![notes.clone()],
    };
    for line in lines {
        text.push_str("\n    ");
        text.push_str(&line);
    }
}

fn describe_log_entry(entry: &AccessLogEntry) -> String {
    format!(
        "{} ({}): {} at {}",
        entry.entity,
        entry.access_type,
        entry.action,
        format_date_time(entry.timestamp)
    )
}

impl<W: Write + Send> EmergencyAccessObserver for TerminalRenderer<W> {
    fn on_state_change(&self, state: &EmergencyAccessState) {
        self.event(&PortalEvent::EmergencyStateChanged(state.clone()));
    }

    fn on_tick(&self, tick: &CountdownTick) {
        self.event(&PortalEvent::EmergencyTick(*tick));
    }

    fn on_expired(&self) {
        self.event(&PortalEvent::EmergencyExpired);
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
