use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::ExtractArgs;
use crate::commands::load_source;
use crate::llm::{ChatCompletionsClient, TextGenerator};
use crate::model::{
    ExtractPaths, ExtractRunManifest, ExtractSettings, ScheduleDump, SourceInfo, SubjectCounts,
};
use crate::scheme::{
    ExtractConfig, aggregate_subject, render_report, section_or_document, split_subject_sections,
};
use crate::util::{now_utc_string, utc_compact_string, write_atomic, write_json_pretty};

/// What the run has learned so far; recorded in the manifest whether or not
/// the run completes.
#[derive(Default)]
struct RunProgress {
    source: Option<SourceInfo>,
    subjects: Vec<SubjectCounts>,
    warnings: Vec<String>,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    run_with(&args, connect_generator)
}

/// Full extract run with the model client supplied by `connect`, which is only
/// called once the source document has loaded.
fn run_with<F>(args: &ExtractArgs, connect: F) -> Result<()>
where
    F: FnOnce(&ExtractArgs) -> Result<Box<dyn TextGenerator>>,
{
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("extract-{}", utc_compact_string(started_ts));

    let config = ExtractConfig::from_args(args)?;
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        args.cache_root
            .join("manifests")
            .join(format!("extract_run_{}.json", utc_compact_string(started_ts)))
    });

    info!(
        run_id = %run_id,
        subjects = config.subjects.len(),
        model = %config.model,
        "starting extraction"
    );

    let mut progress = RunProgress::default();
    let outcome = execute(args, &config, connect, &mut progress);

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id,
        status: (if outcome.is_ok() { "completed" } else { "failed" }).to_string(),
        started_at,
        updated_at: now_utc_string(),
        failure_reason: outcome.as_ref().err().map(|err| format!("{err:#}")),
        command: render_extract_command(args),
        settings: ExtractSettings {
            model: config.model.clone(),
            academic_level: config.academic_level.clone(),
            subjects: config.subjects.clone(),
            chunk_char_limit: config.chunk_char_limit,
            request_delay_secs: config.request_delay.as_secs_f64(),
            on_decode_error: config.on_decode_error.as_str().to_string(),
            max_retries: config.max_retries,
        },
        source: progress.source,
        term_starts: config.calendar.term_starts(),
        paths: ExtractPaths {
            report_path: args.report_path.display().to_string(),
            dump_path: args.dump_path.as_ref().map(|path| path.display().to_string()),
            manifest_path: manifest_path.display().to_string(),
        },
        subjects: progress.subjects,
        warnings: progress.warnings,
    };

    match outcome {
        Ok(()) => {
            write_json_pretty(&manifest_path, &manifest)?;
            info!(path = %manifest_path.display(), "wrote extract run manifest");
            Ok(())
        }
        Err(err) => {
            if let Err(write_err) = write_json_pretty(&manifest_path, &manifest) {
                warn!(error = %write_err, "failed to write extract run manifest");
            } else {
                info!(path = %manifest_path.display(), "wrote failed extract run manifest");
            }
            Err(err)
        }
    }
}

fn connect_generator(args: &ExtractArgs) -> Result<Box<dyn TextGenerator>> {
    let api_key = args
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .context("GROQ_API_KEY (or --api-key) is required")?;

    let client =
        ChatCompletionsClient::new(&args.api_base, api_key, Duration::from_secs(args.timeout_secs))?;
    Ok(Box::new(client))
}

fn execute<F>(
    args: &ExtractArgs,
    config: &ExtractConfig,
    connect: F,
    progress: &mut RunProgress,
) -> Result<()>
where
    F: FnOnce(&ExtractArgs) -> Result<Box<dyn TextGenerator>>,
{
    let source = load_source(&args.source, &args.docs)?;
    progress.source = Some(source.info());

    let generator = connect(args)?;
    let sections = split_subject_sections(&source.text, &config.subjects);

    let mut dump = ScheduleDump::default();
    for subject in &config.subjects {
        let section_lines = sections
            .get(subject)
            .map(|section| section.lines().count())
            .unwrap_or(0);
        let used_whole_document = section_lines == 0;
        if used_whole_document {
            warn!(subject = %subject, "no section heading found, using whole document");
            progress
                .warnings
                .push(format!("{subject}: no section heading found, used whole document"));
        }

        let text = section_or_document(&sections, subject, &source.text);
        let extraction = aggregate_subject(generator.as_ref(), config, subject, text)?;

        if extraction.counts.skipped_chunks > 0 {
            progress.warnings.push(format!(
                "{subject}: skipped {} undecodable chunk(s)",
                extraction.counts.skipped_chunks
            ));
        }
        progress.subjects.push(SubjectCounts {
            section_lines,
            used_whole_document,
            ..extraction.counts
        });
        dump.0.push(extraction.schedule);
    }

    print_dump(&dump)?;
    if let Some(dump_path) = &args.dump_path {
        write_json_pretty(dump_path, &dump)?;
        info!(path = %dump_path.display(), "wrote schedule dump");
    }

    write_report(&args.report_path, &render_report(&config.calendar, &dump.0))
}

fn print_dump(dump: &ScheduleDump) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, dump).context("failed to serialize schedule dump")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

pub fn write_report(path: &Path, report: &str) -> Result<()> {
    write_atomic(path, report.as_bytes())?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}

fn render_extract_command(args: &ExtractArgs) -> String {
    let mut parts = vec!["schemework".to_string(), "extract".to_string()];

    if let Some(url) = &args.source.source_url {
        parts.push(format!("--source-url {url}"));
    }
    if let Some(path) = &args.source.document_json {
        parts.push(format!("--document-json {}", path.display()));
    }
    if let Some(path) = &args.source.source_text {
        parts.push(format!("--source-text {}", path.display()));
    }
    for subject in &args.subjects {
        parts.push(format!("--subject '{subject}'"));
    }
    parts.push(format!("--academic-level '{}'", args.academic_level));
    parts.push(format!("--chunk-char-limit {}", args.chunk_char_limit));
    parts.push(format!("--request-delay-secs {}", args.request_delay_secs));
    parts.push(format!("--model {}", args.model));
    parts.push(format!("--on-decode-error {}", args.on_decode_error.as_str()));
    parts.push(format!("--max-retries {}", args.max_retries));
    parts.push(format!("--report-path {}", args.report_path.display()));
    if let Some(path) = &args.dump_path {
        parts.push(format!("--dump-path {}", path.display()));
    }

    parts.join(" ")
}
