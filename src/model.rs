use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::calendar::TermStart;

/// One week of work for one subject, as extracted from a model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub subject: String,
    pub term: u32,
    pub week: u32,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectSchedule {
    pub subject: String,
    pub items: Vec<ScheduleItem>,
}

/// Subject → items, serialized as a JSON object in configured subject order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDump(pub Vec<SubjectSchedule>);

impl Serialize for ScheduleDump {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for schedule in &self.0 {
            map.serialize_entry(&schedule.subject, &schedule.items)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubjectCounts {
    pub subject: String,
    pub section_lines: usize,
    pub used_whole_document: bool,
    pub chunks: usize,
    pub requests: usize,
    pub retries: usize,
    pub skipped_chunks: usize,
    pub blank_chunks: usize,
    pub raw_records: usize,
    pub other_subject_records: usize,
    pub unusable_records: usize,
    pub extracted_items: usize,
    pub deduplicated_items: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub kind: String,
    pub identifier: String,
    pub title: Option<String>,
    pub sha256: String,
    pub line_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractSettings {
    pub model: String,
    pub academic_level: String,
    pub subjects: Vec<String>,
    pub chunk_char_limit: usize,
    pub request_delay_secs: f64,
    pub on_decode_error: String,
    pub max_retries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractPaths {
    pub report_path: String,
    pub dump_path: Option<String>,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub failure_reason: Option<String>,
    pub command: String,
    pub settings: ExtractSettings,
    pub source: Option<SourceInfo>,
    pub term_starts: Vec<TermStart>,
    pub paths: ExtractPaths,
    pub subjects: Vec<SubjectCounts>,
    pub warnings: Vec<String>,
}
