pub mod archive;
#[cfg(test)]
pub mod fake;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type PaperId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperType {
    #[default]
    QuestionPaper,
    MarkingScheme,
}

impl PaperType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperType::QuestionPaper => "question_paper",
            PaperType::MarkingScheme => "marking_scheme",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaperType::QuestionPaper => "Question Paper",
            PaperType::MarkingScheme => "Marking Scheme",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "question_paper" => Some(PaperType::QuestionPaper),
            "marking_scheme" => Some(PaperType::MarkingScheme),
            _ => None,
        }
    }
}

/// One archived document as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: PaperId,
    pub title: String,
    pub subject_name: String,
    pub region_name: String,
    pub year: u32,
    #[serde(default)]
    pub paper_type: PaperType,
    #[serde(default)]
    pub set_code: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub subject_id: Option<u64>,
    #[serde(default)]
    pub year_id: Option<u64>,
    #[serde(default)]
    pub region_id: Option<u64>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: u64,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Year {
    pub id: u64,
    pub year: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: u64,
    pub display_name: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_papers: u64,
    #[serde(default)]
    pub by_subject: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_year: BTreeMap<String, u64>,
}

/// Undecoded response from a download endpoint.
///
/// Download endpoints answer with either a binary document or a JSON payload,
/// so the caller inspects status and headers before deciding how to read the body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Substring match on the Content-Type header, as browsers report it.
    pub fn content_type_contains(&self, needle: &str) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains(needle))
            .unwrap_or(false)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("API error: {0}")]
    Api(String),
}

/// The archive backend. Everything the browsing session knows comes through here.
#[async_trait]
pub trait ArchiveApi: Send + Sync {
    async fn subjects(&self) -> Result<Vec<Subject>, ApiError>;
    async fn years(&self) -> Result<Vec<Year>, ApiError>;
    async fn regions(&self) -> Result<Vec<Region>, ApiError>;
    async fn papers(&self, query: &[(&'static str, String)]) -> Result<Vec<Paper>, ApiError>;
    async fn paper(&self, id: PaperId) -> Result<Option<Paper>, ApiError>;
    async fn stats(&self) -> Result<Stats, ApiError>;
    async fn download(&self, id: PaperId) -> Result<RawResponse, ApiError>;
    async fn download_multiple(&self, ids: &[PaperId]) -> Result<RawResponse, ApiError>;
}
