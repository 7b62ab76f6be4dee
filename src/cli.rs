use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

pub const DEFAULT_SUBJECTS: [&str; 4] = [
    "Mathematics H2",
    "Physics H2",
    "Computing H2",
    "Economics H2",
];

#[derive(Parser, Debug)]
#[command(
    name = "schemework",
    version,
    about = "Extract a term/week scheme of work from a loosely formatted document"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract every subject's schedule and write the calendar report.
    Extract(ExtractArgs),
    /// Show how the document splits into subject sections.
    Sections(SectionsArgs),
    /// Re-render the calendar report from a saved diagnostic dump.
    Render(RenderArgs),
}

#[derive(Args, Debug, Clone)]
#[group(multiple = false)]
pub struct SourceArgs {
    /// Google Docs URL; the document id is taken from its `/d/<id>` segment
    #[arg(long)]
    pub source_url: Option<String>,

    /// Saved Docs API response (JSON) to flatten instead of fetching
    #[arg(long)]
    pub document_json: Option<PathBuf>,

    /// Plain UTF-8 text file used as the document text as-is
    #[arg(long)]
    pub source_text: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DocsArgs {
    #[arg(long, env = "GOOGLE_DOCS_TOKEN", hide_env_values = true)]
    pub docs_token: Option<String>,

    #[arg(long, default_value = "https://docs.googleapis.com/v1")]
    pub docs_api_base: String,

    #[arg(long, default_value_t = 60)]
    pub docs_timeout_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct CalendarArgs {
    /// First day of term 1 week 1
    #[arg(long, default_value = "2025-01-05")]
    pub term_start: NaiveDate,

    #[arg(long, default_value_t = 4)]
    pub terms: u32,

    #[arg(long, default_value_t = 10)]
    pub weeks_per_term: u32,

    /// Break length after terms 1 and 3
    #[arg(long, default_value_t = 1)]
    pub short_break_weeks: u32,

    /// Break length after term 2
    #[arg(long, default_value_t = 4)]
    pub long_break_weeks: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DecodeFailurePolicy {
    Abort,
    Skip,
}

impl DecodeFailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Skip => "skip",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub docs: DocsArgs,

    #[command(flatten)]
    pub calendar: CalendarArgs,

    #[arg(long = "subject", default_values_t = default_subjects())]
    pub subjects: Vec<String>,

    #[arg(long, default_value = "JC2 (2025 Cohort)")]
    pub academic_level: String,

    #[arg(long, default_value_t = 8000)]
    pub chunk_char_limit: usize,

    /// Pause before every model request after the first, per subject
    #[arg(long, default_value_t = 2.0)]
    pub request_delay_secs: f64,

    #[arg(long, env = "GROQ_MODEL", default_value = "openai/gpt-oss-safeguard-20b")]
    pub model: String,

    #[arg(long, default_value = "https://api.groq.com/openai/v1")]
    pub api_base: String,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = DecodeFailurePolicy::Abort)]
    pub on_decode_error: DecodeFailurePolicy,

    /// Extra attempts for a chunk whose response cannot be decoded
    #[arg(long, default_value_t = 0)]
    pub max_retries: usize,

    #[arg(long, default_value = "output.md")]
    pub report_path: PathBuf,

    #[arg(long)]
    pub dump_path: Option<PathBuf>,

    #[arg(long, default_value = ".cache/schemework")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SectionsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub docs: DocsArgs,

    #[arg(long = "subject", default_values_t = default_subjects())]
    pub subjects: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Diagnostic dump written by `extract --dump-path`
    #[arg(long)]
    pub dump_path: PathBuf,

    #[command(flatten)]
    pub calendar: CalendarArgs,

    #[arg(long = "subject", default_values_t = default_subjects())]
    pub subjects: Vec<String>,

    #[arg(long, default_value = "output.md")]
    pub report_path: PathBuf,
}

fn default_subjects() -> Vec<String> {
    DEFAULT_SUBJECTS.iter().map(|value| value.to_string()).collect()
}
