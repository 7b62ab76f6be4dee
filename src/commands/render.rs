use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::calendar::AcademicCalendar;
use crate::cli::RenderArgs;
use crate::commands::extract::write_report;
use crate::model::{ScheduleItem, SubjectSchedule};
use crate::scheme::{normalize_subjects, render_report};
use crate::util::read_text;

pub fn run(args: RenderArgs) -> Result<()> {
    let subjects = normalize_subjects(&args.subjects)?;
    let raw = read_text(&args.dump_path)?;
    let dump: HashMap<String, Vec<ScheduleItem>> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", args.dump_path.display()))?;

    let schedules = order_schedules(dump, &subjects);
    let items = schedules.iter().map(|schedule| schedule.items.len()).sum::<usize>();
    info!(subjects = schedules.len(), items, "loaded schedule dump");

    let calendar = AcademicCalendar::from_args(&args.calendar);
    write_report(&args.report_path, &render_report(&calendar, &schedules))
}

/// Lays dump entries out in `subjects` order; subjects absent from the dump
/// render as empty and dump entries for unlisted subjects are dropped.
fn order_schedules(
    mut dump: HashMap<String, Vec<ScheduleItem>>,
    subjects: &[String],
) -> Vec<SubjectSchedule> {
    let schedules = subjects
        .iter()
        .map(|subject| SubjectSchedule {
            subject: subject.clone(),
            items: dump.remove(subject).unwrap_or_default(),
        })
        .collect();

    let mut ignored = dump.into_keys().collect::<Vec<_>>();
    ignored.sort();
    for subject in ignored {
        warn!(subject = %subject, "dump subject not in --subject list, ignoring");
    }

    schedules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_schedules_follows_subject_list() {
        let dump: HashMap<String, Vec<ScheduleItem>> = serde_json::from_str(
            r#"{
                "Physics H2": [{"subject": "Physics H2", "term": 1, "week": 2, "tasks": ["Read Ch.1"]}],
                "Art": [{"subject": "Art", "term": 1, "week": 2, "tasks": ["Sketch"]}]
            }"#,
        )
        .unwrap();
        let subjects = vec!["Mathematics H2".to_string(), "Physics H2".to_string()];

        let schedules = order_schedules(dump, &subjects);

        assert_eq!(schedules.len(), 2);
        assert_eq!(schedules[0].subject, "Mathematics H2");
        assert!(schedules[0].items.is_empty());
        assert_eq!(schedules[1].items.len(), 1);
        assert_eq!(schedules[1].items[0].tasks, vec!["Read Ch.1".to_string()]);
    }
}
