use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{DocsArgs, SourceArgs};
use crate::document::{DocsClient, Document, extract_document_id, flatten_document};
use crate::error::InputError;
use crate::model::SourceInfo;
use crate::util::{read_text, sha256_text};

pub mod extract;
pub mod render;
pub mod sections;

/// Plain text of the source document plus where it came from.
pub struct LoadedSource {
    pub kind: &'static str,
    pub identifier: String,
    pub title: Option<String>,
    pub text: String,
}

impl LoadedSource {
    pub fn info(&self) -> SourceInfo {
        SourceInfo {
            kind: self.kind.to_string(),
            identifier: self.identifier.clone(),
            title: self.title.clone(),
            sha256: sha256_text(&self.text),
            line_count: self.text.lines().count(),
        }
    }
}

/// Resolves the configured source to text. The document id is parsed (and the
/// token checked) before any request is sent.
pub fn load_source(source: &SourceArgs, docs: &DocsArgs) -> Result<LoadedSource> {
    let loaded = if let Some(url) = &source.source_url {
        let document_id = extract_document_id(url)?;
        let token = docs
            .docs_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .context("GOOGLE_DOCS_TOKEN (or --docs-token) is required to fetch --source-url")?;

        let client = DocsClient::new(
            &docs.docs_api_base,
            token,
            Duration::from_secs(docs.docs_timeout_secs),
        )?;
        let document = client.fetch(&document_id)?;

        LoadedSource {
            kind: "google_docs",
            identifier: document_id,
            title: document.title.clone(),
            text: flatten_document(&document),
        }
    } else if let Some(path) = &source.document_json {
        let raw = read_text(path)?;
        let document: Document = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        LoadedSource {
            kind: "document_json",
            identifier: path.display().to_string(),
            title: document.title.clone(),
            text: flatten_document(&document),
        }
    } else if let Some(path) = &source.source_text {
        LoadedSource {
            kind: "text",
            identifier: path.display().to_string(),
            title: None,
            text: read_text(path)?,
        }
    } else {
        return Err(InputError::MissingSource.into());
    };

    info!(
        kind = loaded.kind,
        source = %loaded.identifier,
        title = %loaded.title.as_deref().unwrap_or_default(),
        lines = loaded.text.lines().count(),
        "loaded source document"
    );

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn docs() -> DocsArgs {
        DocsArgs {
            docs_token: None,
            docs_api_base: "http://127.0.0.1:9".to_string(),
            docs_timeout_secs: 1,
        }
    }

    #[test]
    fn load_source_without_any_source_is_input_error() {
        let source = SourceArgs {
            source_url: None,
            document_json: None,
            source_text: None,
        };

        let err = load_source(&source, &docs()).err().unwrap();
        assert_eq!(err.downcast_ref::<InputError>(), Some(&InputError::MissingSource));
    }

    #[test]
    fn load_source_rejects_url_without_document_id_before_fetching() {
        let source = SourceArgs {
            source_url: Some("https://docs.google.com/document/edit".to_string()),
            document_json: None,
            source_text: None,
        };

        let err = load_source(&source, &docs()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::MissingDocumentId(_))
        ));
    }

    #[test]
    fn load_source_flattens_saved_document_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(
            &path,
            r#"{"title":"SOW","body":{"content":[{"paragraph":{"elements":[{"textRun":{"content":"Physics H2\n"}}]}}]}}"#,
        )
        .unwrap();
        let source = SourceArgs {
            source_url: None,
            document_json: Some(path),
            source_text: None,
        };

        let loaded = load_source(&source, &docs()).unwrap();
        assert_eq!(loaded.kind, "document_json");
        assert_eq!(loaded.title.as_deref(), Some("SOW"));
        assert_eq!(loaded.text, "Physics H2");
        assert_eq!(loaded.info().line_count, 1);
    }
}
