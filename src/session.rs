use tokio::sync::Mutex;

use crate::apis::{ApiError, ArchiveApi, Paper, PaperId, Region, Stats, Subject, Year};
use crate::download::{BulkOutcome, DownloadOrchestrator, DownloadView};
use crate::pagination::{self, PageItem, Pagination};
use crate::query::{self, FilterError, FilterField, FilterSelection};
use crate::refine::refine;
use crate::selection::SelectionSet;
use crate::view::{PaperCard, RenderedView, ViewMode};

/// A listing request issued by the session.
///
/// The token orders requests: only the response to the most recently issued
/// ticket is applied, so a slow stale listing cannot overwrite a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTicket {
    pub token: u64,
    pub query: Vec<(&'static str, String)>,
}

/// User intents the view binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SetFilter { field: FilterField, value: Option<String> },
    FilterBySubject(String),
    SetSearch(String),
    ChangePage(usize),
    ToggleSelection(PaperId),
    SelectAllVisible,
    SelectAllFiltered,
    ClearSelection,
    SetViewMode(ViewMode),
}

/// What the caller must do after an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Render,
    Reload(ListingTicket),
    /// The intent was rejected and state is unchanged.
    Ignored,
}

/// Filter options for the filter controls.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FilterOptions {
    pub subjects: Vec<Subject>,
    pub years: Vec<Year>,
    pub regions: Vec<Region>,
}

/// All browsing state for one session.
#[derive(Debug)]
pub struct Session {
    papers: Vec<Paper>,
    filtered: Vec<Paper>,
    filters: FilterSelection,
    pagination: Pagination,
    selection: SelectionSet,
    view_mode: ViewMode,
    options: FilterOptions,
    stats: Option<Stats>,
    latest_listing: u64,
}

impl Session {
    pub fn new(page_size: usize) -> Self {
        Self {
            papers: Vec::new(),
            filtered: Vec::new(),
            filters: FilterSelection::default(),
            pagination: Pagination::new(page_size),
            selection: SelectionSet::new(),
            view_mode: ViewMode::default(),
            options: FilterOptions::default(),
            stats: None,
            latest_listing: 0,
        }
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<Effect, FilterError> {
        let effect = match intent {
            Intent::SetFilter { field, value } => {
                self.filters.set(field, value.as_deref())?;
                self.pagination.reset();
                Effect::Reload(self.begin_listing())
            }
            Intent::FilterBySubject(name) => match self.filter_by_subject_name(&name) {
                Some(ticket) => Effect::Reload(ticket),
                None => Effect::Ignored,
            },
            Intent::SetSearch(search) => {
                self.set_search(search);
                Effect::Render
            }
            Intent::ChangePage(page) => {
                if self.change_page(page) {
                    Effect::Render
                } else {
                    Effect::Ignored
                }
            }
            Intent::ToggleSelection(id) => {
                // Only ids from the current listing can be added; any id can be removed.
                if !self.selection.contains(id) && !self.papers.iter().any(|p| p.id == id) {
                    Effect::Ignored
                } else {
                    self.selection.toggle(id);
                    Effect::Render
                }
            }
            Intent::SelectAllVisible => {
                self.select_all_visible();
                Effect::Render
            }
            Intent::SelectAllFiltered => {
                self.select_all_filtered();
                Effect::Render
            }
            Intent::ClearSelection => {
                self.selection.clear();
                Effect::Render
            }
            Intent::SetViewMode(mode) => {
                self.view_mode = mode;
                Effect::Render
            }
        };
        Ok(effect)
    }

    /// Issue a listing request for the current filters.
    pub fn begin_listing(&mut self) -> ListingTicket {
        self.latest_listing += 1;
        ListingTicket {
            token: self.latest_listing,
            query: query::build_query(&self.filters),
        }
    }

    /// Replace the paper list with a listing response. Returns false, leaving
    /// state untouched, when a newer listing has been issued since `token`.
    pub fn finish_listing(&mut self, token: u64, papers: Vec<Paper>) -> bool {
        if token != self.latest_listing {
            tracing::debug!(
                "Discarding stale listing {} (latest is {})",
                token,
                self.latest_listing
            );
            return false;
        }
        self.papers = papers;
        self.apply_search();
        // A page change may have landed while this listing was in flight.
        self.pagination.clamp(self.filtered.len());
        true
    }

    pub fn set_search(&mut self, search: String) {
        self.filters.search = search;
        self.pagination.reset();
        self.apply_search();
    }

    fn apply_search(&mut self) {
        self.filtered = refine(&self.papers, &self.filters.search);
    }

    /// Select the subject whose `name` matches, as the subject cards do.
    pub fn filter_by_subject_name(&mut self, name: &str) -> Option<ListingTicket> {
        let subject_id = self.options.subjects.iter().find(|s| s.name == name)?.id;
        self.filters.subject_id = Some(subject_id);
        self.pagination.reset();
        Some(self.begin_listing())
    }

    pub fn change_page(&mut self, page: usize) -> bool {
        self.pagination.change_page(page, self.filtered.len())
    }

    pub fn select_all_visible(&mut self) {
        let ids: Vec<PaperId> = self.visible().iter().map(|p| p.id).collect();
        self.selection.extend(ids);
    }

    pub fn select_all_filtered(&mut self) {
        self.selection.extend(self.filtered.iter().map(|p| p.id));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current()
    }

    pub fn filtered(&self) -> &[Paper] {
        &self.filtered
    }

    pub fn visible(&self) -> &[Paper] {
        pagination::page_slice(
            &self.filtered,
            self.pagination.current(),
            self.pagination.page_size(),
        )
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.filtered.len(), self.pagination.page_size())
    }

    pub fn page_bar(&self) -> Vec<PageItem> {
        pagination::page_bar(self.pagination.current(), self.total_pages())
    }

    pub fn set_options(&mut self, options: FilterOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn set_stats(&mut self, stats: Stats) {
        self.stats = Some(stats);
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn render(&self) -> RenderedView {
        let visible = self.visible();
        RenderedView {
            view_mode: self.view_mode,
            filters: self.filters().clone(),
            current_page: self.current_page(),
            total_pages: self.total_pages(),
            total_count: self.papers.len(),
            filtered_count: self.filtered().len(),
            selected_count: self.selection.len(),
            selected_ids: self.selection.ids().to_vec(),
            no_results: visible.is_empty(),
            papers: visible
                .iter()
                .map(|p| PaperCard::new(p, self.selection.contains(p.id)))
                .collect(),
            page_bar: self.page_bar(),
        }
    }
}

/// Fetch the listing for `ticket` and apply it if still current.
///
/// The session lock is released while the request is in flight.
pub async fn load_papers(
    session: &Mutex<Session>,
    api: &dyn ArchiveApi,
    ticket: ListingTicket,
) -> Result<bool, ApiError> {
    let papers = api.papers(&ticket.query).await?;
    let count = papers.len();
    let applied = session.lock().await.finish_listing(ticket.token, papers);
    if applied {
        tracing::info!("Loaded {} papers for {:?}", count, ticket.query);
    }
    Ok(applied)
}

/// Load filter options and the unfiltered listing together, then stats best-effort.
pub async fn initialize(session: &Mutex<Session>, api: &dyn ArchiveApi) -> Result<(), ApiError> {
    let ticket = session.lock().await.begin_listing();
    let (subjects, years, regions, _) = futures::try_join!(
        api.subjects(),
        api.years(),
        api.regions(),
        load_papers(session, api, ticket),
    )?;
    session.lock().await.set_options(FilterOptions {
        subjects,
        years,
        regions,
    });

    match api.stats().await {
        Ok(stats) => session.lock().await.set_stats(stats),
        Err(e) => tracing::warn!("Error loading stats: {}", e),
    }
    Ok(())
}

/// Download the current selection as one archive. The selection is cleared
/// only when the archive was saved.
pub async fn download_selected(
    session: &Mutex<Session>,
    downloads: &DownloadOrchestrator,
    view: &dyn DownloadView,
) -> BulkOutcome {
    let ids = session.lock().await.selection().ids().to_vec();
    let outcome = downloads.download_multiple(&ids, view).await;
    if let BulkOutcome::Saved(_) = outcome {
        session.lock().await.clear_selection();
    }
    outcome
}
