//! Medical history timeline and the unified view of records received from
//! other hospitals.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::Datelike;
use shared::domain::{
    MedicalRecord, ParseCategoryError, RecordCategory, SourceRecord, SourceSummary, TimelineGroup,
};
use tracing::debug;

mod seed;

/// Which records the timeline shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordFilter {
    #[default]
    All,
    Category(RecordCategory),
}

impl RecordFilter {
    pub fn matches(self, record: &MedicalRecord) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => record.category == category,
        }
    }
}

impl FromStr for RecordFilter {
    type Err = ParseCategoryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        raw.parse().map(Self::Category)
    }
}

impl fmt::Display for RecordFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Category(category) => fmt::Display::fmt(category, f),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<MedicalRecord>,
    source_records: Vec<SourceRecord>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl RecordStore {
    pub fn new(records: Vec<MedicalRecord>, source_records: Vec<SourceRecord>) -> Self {
        Self {
            records,
            source_records,
        }
    }

    /// Store populated with the portal's mock patient history.
    pub fn seeded() -> Self {
        Self::new(seed::medical_records(), seed::source_records())
    }

    pub fn records(&self) -> &[MedicalRecord] {
        &self.records
    }

    pub fn filtered(&self, filter: RecordFilter) -> impl Iterator<Item = &MedicalRecord> + '_ {
        self.records
            .iter()
            .filter(move |record| filter.matches(record))
    }

    /// Matching records grouped by calendar month, newest month first and
    /// newest record first within each month. Empty when nothing matches.
    pub fn timeline(&self, filter: RecordFilter) -> Vec<TimelineGroup> {
        let mut months: BTreeMap<(i32, u32), Vec<MedicalRecord>> = BTreeMap::new();
        for record in self.filtered(filter) {
            months
                .entry((record.date.year(), record.date.month()))
                .or_default()
                .push(record.clone());
        }
        debug!(%filter, months = months.len(), "timeline: grouped records");

        months
            .into_iter()
            .rev()
            .map(|((year, _), mut records)| {
                records.sort_by(|a, b| b.date.cmp(&a.date));
                let month = records
                    .first()
                    .map(|record| record.date.format("%B").to_string())
                    .unwrap_or_default();
                TimelineGroup {
                    year,
                    month,
                    records,
                }
            })
            .collect()
    }

    /// External records, newest first.
    pub fn unified_records(&self) -> Vec<&SourceRecord> {
        let mut records: Vec<_> = self.source_records.iter().collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records
    }

    pub fn records_by_hospital<'a>(
        &'a self,
        hospital: &'a str,
    ) -> impl Iterator<Item = &'a SourceRecord> + 'a {
        self.source_records
            .iter()
            .filter(move |record| record.hospital == hospital)
    }

    /// One summary per source hospital in order of first appearance, listing
    /// the distinct formats it sent.
    pub fn source_summaries(&self) -> Vec<SourceSummary> {
        let mut summaries: Vec<SourceSummary> = Vec::new();
        for record in &self.source_records {
            if summaries
                .iter()
                .any(|summary| summary.hospital == record.hospital)
            {
                continue;
            }
            let mut formats = Vec::new();
            let mut record_count = 0;
            for sent in self.records_by_hospital(&record.hospital) {
                record_count += 1;
                if !formats.contains(&sent.format) {
                    formats.push(sent.format);
                }
            }
            summaries.push(SourceSummary {
                hospital: record.hospital.clone(),
                formats,
                record_count,
            });
        }
        summaries
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
