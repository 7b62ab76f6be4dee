use super::*;

/// Immutable run settings shared by the extractor and aggregator.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub subjects: Vec<String>,
    pub academic_level: String,
    pub calendar: AcademicCalendar,
    pub chunk_char_limit: usize,
    pub request_delay: Duration,
    pub model: String,
    pub on_decode_error: DecodeFailurePolicy,
    pub max_retries: usize,
}

impl ExtractConfig {
    pub fn from_args(args: &ExtractArgs) -> Result<Self> {
        let subjects = normalize_subjects(&args.subjects)?;

        if args.chunk_char_limit == 0 {
            bail!("--chunk-char-limit must be positive");
        }

        let request_delay = Duration::try_from_secs_f64(args.request_delay_secs)
            .with_context(|| format!("invalid --request-delay-secs: {}", args.request_delay_secs))?;

        Ok(Self {
            subjects,
            academic_level: args.academic_level.trim().to_string(),
            calendar: AcademicCalendar::from_args(&args.calendar),
            chunk_char_limit: args.chunk_char_limit,
            request_delay,
            model: args.model.clone(),
            on_decode_error: args.on_decode_error,
            max_retries: args.max_retries,
        })
    }
}

/// Trims names and drops blanks; an empty result is an input error.
pub fn normalize_subjects(subjects: &[String]) -> Result<Vec<String>> {
    let subjects = subjects
        .iter()
        .map(|subject| subject.trim().to_string())
        .filter(|subject| !subject.is_empty())
        .collect::<Vec<_>>();

    if subjects.is_empty() {
        return Err(InputError::NoSubjects.into());
    }

    Ok(subjects)
}
