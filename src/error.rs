use thiserror::Error;

/// The configured source cannot identify a document. Raised before any
/// network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("no source given; pass --source-url, --document-json or --source-text")]
    MissingSource,
    #[error("could not parse document id from URL: {0}")]
    MissingDocumentId(String),
    #[error("no subjects configured")]
    NoSubjects,
}

/// A model response that yielded no usable records after every recovery
/// strategy was tried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("model did not return valid JSON")]
pub struct DecodeError {
    pub preview: String,
}

impl DecodeError {
    const PREVIEW_CHARS: usize = 200;

    pub fn from_response(raw: &str) -> Self {
        Self {
            preview: raw.trim().chars().take(Self::PREVIEW_CHARS).collect(),
        }
    }
}
