use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::SectionsArgs;
use crate::commands::load_source;
use crate::scheme::{normalize_subjects, split_subject_sections};

#[derive(Debug, Serialize)]
struct SectionSummary {
    subject: String,
    line_count: usize,
    char_count: usize,
    falls_back_to_document: bool,
    text: String,
}

pub fn run(args: SectionsArgs) -> Result<()> {
    let subjects = normalize_subjects(&args.subjects)?;
    let source = load_source(&args.source, &args.docs)?;
    let mut sections = split_subject_sections(&source.text, &subjects);

    let summaries = subjects
        .iter()
        .map(|subject| {
            let text = sections.remove(subject).unwrap_or_default();
            SectionSummary {
                subject: subject.clone(),
                line_count: text.lines().count(),
                char_count: text.chars().count(),
                falls_back_to_document: text.is_empty(),
                text,
            }
        })
        .collect::<Vec<_>>();

    info!(
        subjects = summaries.len(),
        matched = summaries.iter().filter(|summary| !summary.falls_back_to_document).count(),
        "split document into subject sections"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &summaries)
            .context("failed to serialize sections json output")?;
        writeln!(output)?;
    } else {
        for summary in &summaries {
            let note = if summary.falls_back_to_document {
                "\t(no heading; whole document used)"
            } else {
                ""
            };
            writeln!(
                output,
                "{}\tlines={}\tchars={}{}",
                summary.subject, summary.line_count, summary.char_count, note
            )?;
        }
    }
    output.flush()?;

    Ok(())
}
