use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::apis::{archive::ArchiveClient, ApiError};
use crate::debounce::{SearchDebouncer, DEFAULT_SEARCH_DEBOUNCE};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::save::DirectorySaver;

const DEFAULT_API_URL: &str = "http://localhost:12000";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub download_dir: PathBuf,
    pub page_size: usize,
    pub search_debounce: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = var("PAPER_ARCHIVE_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let download_dir = var("PAPER_ARCHIVE_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                home_or_default(var("HOME")).join("Downloads").join("paper-archive")
            });

        let page_size = var("PAPER_ARCHIVE_PAGE_SIZE")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let search_debounce = var("PAPER_ARCHIVE_SEARCH_DEBOUNCE_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SEARCH_DEBOUNCE);

        Self {
            api_url,
            download_dir,
            page_size,
            search_debounce,
        }
    }

    pub fn build_client(&self) -> Result<Arc<ArchiveClient>, ApiError> {
        Ok(Arc::new(ArchiveClient::new(&self.api_url)?))
    }

    pub fn build_saver(&self) -> Arc<DirectorySaver> {
        Arc::new(DirectorySaver::new(self.download_dir.clone()))
    }

    pub fn build_debouncer(&self) -> SearchDebouncer {
        SearchDebouncer::new(self.search_debounce)
    }
}

fn home_or_default(home: Option<String>) -> PathBuf {
    home.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
}
