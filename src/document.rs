//! Source documents: locating a Google Docs document, fetching it and
//! flattening its structured body into line-oriented plain text.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use regex::Regex;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use tracing::info;

use crate::error::InputError;

pub fn extract_document_id(url: &str) -> Result<String> {
    let pattern = Regex::new(r"/d/([A-Za-z0-9_-]+)").context("failed to compile document id regex")?;

    let Some(captures) = pattern.captures(url) else {
        return Err(InputError::MissingDocumentId(url.to_string()).into());
    };

    captures
        .get(1)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| InputError::MissingDocumentId(url.to_string()).into())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Document {
    pub title: Option<String>,
    pub body: Body,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Body {
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StructuralElement {
    pub paragraph: Option<Paragraph>,
    pub table: Option<Table>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Paragraph {
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParagraphElement {
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextRun {
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Table {
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableRow {
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableCell {
    pub content: Vec<StructuralElement>,
}

impl Paragraph {
    fn runs(&self) -> impl Iterator<Item = &str> {
        self.elements
            .iter()
            .filter_map(|element| element.text_run.as_ref())
            .map(|run| run.content.trim())
            .filter(|text| !text.is_empty())
    }
}

/// Each non-blank paragraph text run becomes one line; each table row becomes
/// one line of ` | `-joined cells.
pub fn flatten_document(document: &Document) -> String {
    let mut lines = Vec::<String>::new();

    for element in &document.body.content {
        if let Some(paragraph) = &element.paragraph {
            lines.extend(paragraph.runs().map(ToOwned::to_owned));
        } else if let Some(table) = &element.table {
            for row in &table.table_rows {
                let cells = row
                    .table_cells
                    .iter()
                    .map(|cell| {
                        cell.content
                            .iter()
                            .filter_map(|content| content.paragraph.as_ref())
                            .flat_map(Paragraph::runs)
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .collect::<Vec<_>>();
                lines.push(cells.join(" | "));
            }
        }
    }

    lines.join("\n")
}

pub struct DocsClient {
    client: HttpClient,
    api_base: String,
    token: String,
}

impl DocsClient {
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("failed to build docs http client")?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn fetch(&self, document_id: &str) -> Result<Document> {
        let url = format!("{}/documents/{}", self.api_base, document_id);
        info!(document_id = %document_id, "fetching source document");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .with_context(|| format!("failed to request document {document_id}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("document fetch failed ({status}): {}", body.trim());
        }

        response
            .json::<Document>()
            .with_context(|| format!("failed to parse document {document_id}"))
    }
}
