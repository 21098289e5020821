use std::sync::Mutex;

use serde::Serialize;

use crate::apis::{Paper, PaperId};
use crate::download::{DownloadView, Notice};
use crate::pagination::PageItem;
use crate::query::FilterSelection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            _ => None,
        }
    }
}

/// Loading signals and notices, in the order they were raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "detail", rename_all = "snake_case")]
pub enum ViewEvent {
    Loading(String),
    LoadingCleared,
    Notice(Notice),
}

/// A `DownloadView` that records what it was told, for the tool response to relay.
#[derive(Debug, Default)]
pub struct ViewLog {
    events: Mutex<Vec<ViewEvent>>,
}

impl ViewLog {
    fn push(&self, event: ViewEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    /// Drain recorded events.
    pub fn take(&self) -> Vec<ViewEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    /// Whether the last loading signal is still showing.
    pub fn is_loading(&self) -> bool {
        self.events
            .lock()
            .map(|events| {
                events
                    .iter()
                    .rev()
                    .find_map(|e| match e {
                        ViewEvent::Loading(_) => Some(true),
                        ViewEvent::LoadingCleared => Some(false),
                        ViewEvent::Notice(_) => None,
                    })
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }
}

impl DownloadView for ViewLog {
    fn show_loading(&self, message: &str) {
        self.push(ViewEvent::Loading(message.to_string()));
    }

    fn hide_loading(&self) {
        self.push(ViewEvent::LoadingCleared);
    }

    fn notify(&self, notice: Notice) {
        self.push(ViewEvent::Notice(notice));
    }
}

/// One paper on the visible page.
#[derive(Debug, Clone, Serialize)]
pub struct PaperCard {
    #[serde(flatten)]
    pub paper: Paper,
    pub selected: bool,
    pub type_label: &'static str,
    pub set_label: String,
}

impl PaperCard {
    pub fn new(paper: &Paper, selected: bool) -> Self {
        Self {
            type_label: paper.paper_type.label(),
            set_label: paper
                .set_code
                .clone()
                .unwrap_or_else(|| "Standard".to_string()),
            paper: paper.clone(),
            selected,
        }
    }
}

/// Snapshot of everything a view needs to draw the current page.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedView {
    pub view_mode: ViewMode,
    pub filters: FilterSelection,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub filtered_count: usize,
    pub selected_count: usize,
    pub selected_ids: Vec<PaperId>,
    pub no_results: bool,
    pub papers: Vec<PaperCard>,
    pub page_bar: Vec<PageItem>,
}
