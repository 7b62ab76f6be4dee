use super::*;

#[derive(Debug, Clone)]
pub struct SubjectExtraction {
    pub schedule: SubjectSchedule,
    pub counts: SubjectCounts,
}

/// Runs every non-blank chunk of `text` through the model in order, pausing
/// `config.request_delay` before each request after the first, then dedupes
/// the concatenated results.
pub fn aggregate_subject(
    generator: &dyn TextGenerator,
    config: &ExtractConfig,
    subject: &str,
    text: &str,
) -> Result<SubjectExtraction> {
    let chunks = segment_text(text, config.chunk_char_limit);
    let mut counts = SubjectCounts {
        subject: subject.to_string(),
        chunks: chunks.len(),
        ..SubjectCounts::default()
    };
    let mut items = Vec::<ScheduleItem>::new();

    info!(subject = %subject, chunks = chunks.len(), "extracting subject");

    for (index, chunk) in chunks.iter().enumerate() {
        let chunk_label = format!("{}/{}", index + 1, chunks.len());
        if chunk.is_empty() {
            debug!(subject = %subject, chunk = %chunk_label, "blank chunk, not sent");
            counts.blank_chunks += 1;
            continue;
        }
        let mut attempt = 0usize;

        let outcome = loop {
            if counts.requests > 0 && !config.request_delay.is_zero() {
                thread::sleep(config.request_delay);
            }
            counts.requests += 1;

            let error = match extract_chunk(generator, config, subject, chunk) {
                Ok(outcome) => break Some(outcome),
                Err(error) => error,
            };

            let Some(decode_error) = error.downcast_ref::<DecodeError>() else {
                return Err(error.context(format!("subject {subject}: chunk {chunk_label} request failed")));
            };

            if attempt < config.max_retries {
                attempt += 1;
                counts.retries += 1;
                warn!(
                    subject = %subject,
                    chunk = %chunk_label,
                    attempt,
                    preview = %decode_error.preview,
                    "undecodable response, retrying"
                );
                continue;
            }

            match config.on_decode_error {
                DecodeFailurePolicy::Abort => {
                    return Err(error.context(format!(
                        "subject {subject}: chunk {chunk_label} could not be decoded"
                    )));
                }
                DecodeFailurePolicy::Skip => {
                    warn!(
                        subject = %subject,
                        chunk = %chunk_label,
                        preview = %decode_error.preview,
                        "undecodable response, skipping chunk"
                    );
                    counts.skipped_chunks += 1;
                    break None;
                }
            }
        };

        let Some(outcome) = outcome else {
            continue;
        };

        info!(
            subject = %subject,
            chunk = %chunk_label,
            records = outcome.raw_records,
            kept = outcome.items.len(),
            "chunk extracted"
        );
        counts.raw_records += outcome.raw_records;
        counts.other_subject_records += outcome.other_subject_records;
        counts.unusable_records += outcome.unusable_records;
        items.extend(outcome.items);
    }

    counts.extracted_items = items.len();
    let items = dedupe_items(items);
    counts.deduplicated_items = items.len();

    info!(
        subject = %subject,
        extracted = counts.extracted_items,
        kept = counts.deduplicated_items,
        "subject extracted"
    );

    Ok(SubjectExtraction {
        schedule: SubjectSchedule {
            subject: subject.to_string(),
            items,
        },
        counts,
    })
}

/// Keeps the first item for each (subject, term, week, task set) signature,
/// preserving input order.
pub fn dedupe_items(items: Vec<ScheduleItem>) -> Vec<ScheduleItem> {
    let mut seen = HashSet::<(String, u32, u32, String)>::new();

    items
        .into_iter()
        .filter(|item| {
            seen.insert((
                item.subject.clone(),
                item.term,
                item.week,
                canonical_tasks(&item.tasks),
            ))
        })
        .collect()
}

fn canonical_tasks(tasks: &[String]) -> String {
    let mut normalized = tasks.iter().map(|task| task.trim()).collect::<Vec<_>>();
    normalized.sort_unstable();
    normalized.dedup();
    serde_json::to_string(&normalized).unwrap_or_default()
}
