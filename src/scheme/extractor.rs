use super::*;

/// Result of one chunk request after subject filtering and normalisation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkOutcome {
    pub items: Vec<ScheduleItem>,
    pub raw_records: usize,
    pub other_subject_records: usize,
    pub unusable_records: usize,
}

pub fn system_instruction(config: &ExtractConfig) -> String {
    format!(
        "Extract a Scheme of Work as JSON, under {level}. \
         Return ONLY a JSON array of objects with keys: subject, term, week, tasks. \
         tasks must ALWAYS be a JSON array of strings; if there is only one task, use a single-item list. \
         Use double quotes for all keys and strings. Do not use code fences. \
         Use only the chunk content. If there are no items for this subject, return []. \
         {calendar}",
        level = config.academic_level,
        calendar = config.calendar.prompt_clause(),
    )
}

pub fn user_message(subject: &str, chunk: &str) -> String {
    format!("Subject: {subject}\n\nChunk:\n{chunk}")
}

/// Sends one chunk to the model at temperature 0 and returns the records that
/// belong to `subject`. A response that cannot be decoded fails with
/// [`DecodeError`].
pub fn extract_chunk(
    generator: &dyn TextGenerator,
    config: &ExtractConfig,
    subject: &str,
    chunk: &str,
) -> Result<ChunkOutcome> {
    let system = system_instruction(config);
    let user = user_message(subject, chunk);
    let request = GenerationRequest {
        model: &config.model,
        system: &system,
        user: &user,
        temperature: 0.0,
    };

    let raw = generator.generate(&request)?;
    let records = decode_records(&raw)?;

    let mut outcome = ChunkOutcome {
        raw_records: records.len(),
        ..ChunkOutcome::default()
    };

    for record in records {
        if !record_matches_subject(&record, subject) {
            info!(subject = %subject, reported = ?record.get("subject"), "dropping record for another subject");
            outcome.other_subject_records += 1;
            continue;
        }

        match schedule_item_from_record(&record, subject) {
            Some(item) if config.calendar.contains(item.term, item.week) => outcome.items.push(item),
            Some(item) => {
                warn!(
                    subject = %subject,
                    term = item.term,
                    week = item.week,
                    "dropping record outside the term/week grid"
                );
                outcome.unusable_records += 1;
            }
            None => {
                let record = Value::Object(record);
                warn!(subject = %subject, record = %record, "dropping record without usable term/week");
                outcome.unusable_records += 1;
            }
        }
    }

    Ok(outcome)
}

/// Records without a `subject` (or with a blank one) are kept.
pub(super) fn record_matches_subject(record: &Record, subject: &str) -> bool {
    let reported = match record.get("subject") {
        // JSON null names no subject, same as a missing key; it is not the
        // string "null".
        None | Some(Value::Null) => return true,
        Some(Value::String(value)) => value.trim().to_lowercase(),
        Some(other) => other.to_string().trim().to_lowercase(),
    };

    reported.is_empty() || reported == subject.trim().to_lowercase()
}

pub(super) fn schedule_item_from_record(record: &Record, subject: &str) -> Option<ScheduleItem> {
    Some(ScheduleItem {
        subject: subject.to_string(),
        term: slot_number(record.get("term")?)?,
        week: slot_number(record.get("week")?)?,
        tasks: record.get("tasks").map(task_list).unwrap_or_default(),
    })
}

fn slot_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.fract() == 0.0 && *value >= 0.0)
                    .map(|value| value as u64)
            })
            .and_then(|value| u32::try_from(value).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn task_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(values) => values.iter().filter_map(task_text).collect(),
        other => task_text(other).into_iter().collect(),
    }
}

fn task_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}
