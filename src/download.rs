use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::apis::{ArchiveApi, PaperId, RawResponse};

pub const DEFAULT_PDF_FILENAME: &str = "paper.pdf";
pub const ARCHIVE_FILENAME: &str = "cbse_papers.zip";

const PDF_CONTENT_TYPE: &str = "application/pdf";
const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Something the user should see once a download settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Success { message: String },
    Error { message: String },
    /// Direct delivery failed; the user has to fetch the document from `url` themselves.
    Fallback { url: String },
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice::Success { message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::Error { message: message.into() }
    }
}

/// Where download progress and outcomes are reported.
pub trait DownloadView: Send + Sync {
    fn show_loading(&self, message: &str);
    fn hide_loading(&self);
    fn notify(&self, notice: Notice);
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid filename: {0}")]
    InvalidName(String),
}

/// The save-as step: hand a finished blob to the user under `filename`.
#[async_trait]
pub trait SaveAs: Send + Sync {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, SaveError>;
}

/// JSON body returned instead of a document.
#[derive(Debug, Default, Deserialize)]
struct FallbackPayload {
    source_url: Option<String>,
    error: Option<String>,
    #[serde(default)]
    failed_papers: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    /// Archive saved; the caller clears the selection.
    Saved(PathBuf),
    Failed,
    /// Nothing was selected, no request was made.
    Rejected,
}

fn filename_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // A quoted value (either quote style) or everything up to the next ';'
        Regex::new(r#"filename[^;=\n]*=("[^"\n]*"|'[^'\n]*'|[^;\n]*)"#)
            .unwrap_or_else(|e| panic!("invalid filename pattern: {}", e))
    })
}

/// Filename from a Content-Disposition value with quote characters stripped,
/// or `paper.pdf` when absent or empty.
pub fn disposition_filename(header: Option<&str>) -> String {
    header
        .and_then(|h| filename_regex().captures(h))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace(['"', '\''], ""))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_PDF_FILENAME.to_string())
}

/// Runs single and bulk downloads against the archive and reports to a view.
pub struct DownloadOrchestrator {
    api: Arc<dyn ArchiveApi>,
    saver: Arc<dyn SaveAs>,
}

impl DownloadOrchestrator {
    pub fn new(api: Arc<dyn ArchiveApi>, saver: Arc<dyn SaveAs>) -> Self {
        Self { api, saver }
    }

    /// Download one paper. Returns the saved path when a PDF was delivered.
    pub async fn download(&self, paper_id: PaperId, view: &dyn DownloadView) -> Option<PathBuf> {
        view.show_loading("Downloading PDF...");
        let outcome = self.download_inner(paper_id).await;
        view.hide_loading();

        match outcome {
            Ok(SingleOutcome::Saved(path)) => {
                tracing::info!("Saved paper {} to {}", paper_id, path.display());
                view.notify(Notice::success("PDF downloaded successfully!"));
                Some(path)
            }
            Ok(SingleOutcome::Notice(notice)) => {
                view.notify(notice);
                None
            }
            Ok(SingleOutcome::Silent) => {
                tracing::warn!("Download of paper {} returned neither a PDF nor an error", paper_id);
                None
            }
            Err(e) => {
                tracing::warn!("Error downloading paper {}: {}", paper_id, e);
                view.notify(Notice::error("Failed to download paper. Please try again."));
                None
            }
        }
    }

    async fn download_inner(&self, paper_id: PaperId) -> Result<SingleOutcome, DownloadFailure> {
        let resp = self.api.download(paper_id).await?;

        if resp.is_success() && resp.content_type_contains(PDF_CONTENT_TYPE) {
            let filename = disposition_filename(resp.content_disposition.as_deref());
            let path = self.saver.save(&filename, &resp.body).await?;
            return Ok(SingleOutcome::Saved(path));
        }

        let payload: FallbackPayload = resp.json()?;
        if let Some(url) = payload.source_url {
            return Ok(SingleOutcome::Notice(Notice::Fallback { url }));
        }
        if resp.is_success() {
            Ok(payload
                .error
                .map(|e| SingleOutcome::Notice(Notice::error(e)))
                .unwrap_or(SingleOutcome::Silent))
        } else {
            let message = payload
                .error
                .unwrap_or_else(|| "Failed to download paper".to_string());
            Ok(SingleOutcome::Notice(Notice::error(message)))
        }
    }

    /// Download `ids` as one ZIP archive.
    pub async fn download_multiple(&self, ids: &[PaperId], view: &dyn DownloadView) -> BulkOutcome {
        if ids.is_empty() {
            view.notify(Notice::error("No papers selected"));
            return BulkOutcome::Rejected;
        }

        view.show_loading(&format!(
            "Downloading {} papers as ZIP... This may take a moment.",
            ids.len()
        ));
        let resp = self.api.download_multiple(ids).await;
        view.hide_loading();

        match self.settle_bulk(resp).await {
            Ok(Ok(path)) => {
                tracing::info!("Saved {} papers to {}", ids.len(), path.display());
                view.notify(Notice::success("ZIP file downloaded successfully!"));
                BulkOutcome::Saved(path)
            }
            Ok(Err(notice)) => {
                view.notify(notice);
                BulkOutcome::Failed
            }
            Err(e) => {
                tracing::warn!("Error downloading {} papers: {}", ids.len(), e);
                view.notify(Notice::error("Failed to download papers. Please try again."));
                BulkOutcome::Failed
            }
        }
    }

    async fn settle_bulk(
        &self,
        resp: Result<RawResponse, crate::apis::ApiError>,
    ) -> Result<Result<PathBuf, Notice>, DownloadFailure> {
        let resp = resp?;

        if !resp.is_success() {
            let payload: FallbackPayload = resp.json()?;
            let message = payload
                .error
                .unwrap_or_else(|| "Failed to download papers".to_string());
            return Ok(Err(Notice::error(message)));
        }

        if resp.content_type_contains(ZIP_CONTENT_TYPE) {
            let path = self.saver.save(ARCHIVE_FILENAME, &resp.body).await?;
            return Ok(Ok(path));
        }

        let payload: FallbackPayload = resp.json()?;
        if !payload.failed_papers.is_empty() {
            tracing::warn!("Archive reported {} failed papers", payload.failed_papers.len());
            return Ok(Err(Notice::error(
                "Could not download some papers. Please try downloading them individually.",
            )));
        }
        let message = payload
            .error
            .unwrap_or_else(|| "Failed to create ZIP file".to_string());
        Ok(Err(Notice::error(message)))
    }
}

enum SingleOutcome {
    Saved(PathBuf),
    Notice(Notice),
    Silent,
}

#[derive(Debug, Error)]
enum DownloadFailure {
    #[error(transparent)]
    Api(#[from] crate::apis::ApiError),
    #[error(transparent)]
    Save(#[from] SaveError),
}
