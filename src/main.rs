use std::sync::Arc;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters,
    model::*, tool, tool_handler, tool_router,
    transport::stdio, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod apis;
mod config;
mod debounce;
mod download;
mod pagination;
mod query;
mod refine;
mod save;
mod selection;
mod session;
mod view;

use apis::{ArchiveApi, PaperId};
use config::Config;
use debounce::SearchDebouncer;
use download::{BulkOutcome, DownloadOrchestrator, Notice};
use query::{FilterError, FilterField};
use session::{Effect, Intent, Session};
use view::{RenderedView, ViewEvent, ViewLog, ViewMode};

// ── Parameter structs ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
struct SetFilterParams {
    #[schemars(description = "Filter to change: 'subject', 'year', 'region' or 'paper_type'")]
    field: String,
    #[schemars(description = "Id from list_filters (or 'question_paper' / 'marking_scheme' for paper_type). Omit or leave empty to clear.")]
    value: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct FilterBySubjectParams {
    #[schemars(description = "Subject name as listed in list_filters (e.g. \"Economics\")")]
    name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchParams {
    #[schemars(description = "Substring to match against title, subject, region or year. Empty clears the search.")]
    query: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ChangePageParams {
    #[schemars(description = "1-based page number")]
    page: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ViewModeParams {
    #[schemars(description = "'grid' or 'list'")]
    mode: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PaperIdParams {
    #[schemars(description = "Paper id")]
    id: PaperId,
}

// ── Responses ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ToolResponse {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<ViewEvent>,
    /// True when the intent was rejected and nothing changed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    ignored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<RenderedView>,
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ── Server ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ArchiveServer {
    tool_router: ToolRouter<Self>,
    session: Arc<Mutex<Session>>,
    api: Arc<dyn ArchiveApi>,
    downloads: Arc<DownloadOrchestrator>,
    debouncer: SearchDebouncer,
}

#[tool_router]
impl ArchiveServer {
    pub async fn create() -> anyhow::Result<Self> {
        let config = Config::from_env();
        let api: Arc<dyn ArchiveApi> = config.build_client()?;
        let saver = config.build_saver();

        tracing::info!(
            "Archive at {}, downloads to {}, page size {}",
            config.api_url,
            saver.dir().display(),
            config.page_size
        );

        let session = Arc::new(Mutex::new(Session::new(config.page_size)));
        if let Err(e) = session::initialize(&session, api.as_ref()).await {
            // Keep serving; the next filter change retries the listing.
            tracing::error!("Failed to load data: {}", e);
        }

        Ok(Self {
            tool_router: Self::tool_router(),
            session,
            downloads: Arc::new(DownloadOrchestrator::new(Arc::clone(&api), saver)),
            api,
            debouncer: config.build_debouncer(),
        })
    }

    #[tool(description = "List the subjects, years and regions available as filters")]
    async fn list_filters(&self) -> Result<CallToolResult, McpError> {
        let session = self.session.lock().await;
        json_result(session.options())
    }

    #[tool(description = "Archive statistics: total papers, counts by subject and by year")]
    async fn get_stats(&self) -> Result<CallToolResult, McpError> {
        if let Some(stats) = self.session.lock().await.stats() {
            return json_result(stats);
        }
        let stats = self
            .api
            .stats()
            .await
            .map_err(|e| McpError::internal_error(format!("Failed to load stats: {}", e), None))?;
        self.session.lock().await.set_stats(stats.clone());
        json_result(&stats)
    }

    #[tool(description = "Get full metadata for one paper by id")]
    async fn get_paper(
        &self,
        Parameters(params): Parameters<PaperIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.api.paper(params.id).await {
            Ok(Some(paper)) => json_result(&paper),
            Ok(None) => Ok(CallToolResult::success(vec![Content::text(
                format!("Paper not found: {}", params.id),
            )])),
            Err(e) => Err(McpError::internal_error(format!("Failed to load paper: {}", e), None)),
        }
    }

    #[tool(description = "Set or clear a subject, year, region or paper type filter. Reloads the listing and returns page 1.")]
    async fn set_filter(
        &self,
        Parameters(params): Parameters<SetFilterParams>,
    ) -> Result<CallToolResult, McpError> {
        let field: FilterField = params
            .field
            .parse()
            .map_err(|e: FilterError| McpError::invalid_params(e.to_string(), None))?;
        self.apply(Intent::SetFilter { field, value: params.value }).await
    }

    #[tool(description = "Filter by subject name instead of id")]
    async fn filter_by_subject(
        &self,
        Parameters(params): Parameters<FilterBySubjectParams>,
    ) -> Result<CallToolResult, McpError> {
        self.apply(Intent::FilterBySubject(params.name)).await
    }

    #[tool(description = "Search the current listing. Rapid successive calls are debounced; superseded calls return ignored.")]
    async fn search(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.debouncer.submit(params.query).await {
            Some(query) => self.apply(Intent::SetSearch(query)).await,
            None => self.respond(Vec::new(), true, None).await,
        }
    }

    #[tool(description = "Show the current page, page bar and selection")]
    async fn show_page(&self) -> Result<CallToolResult, McpError> {
        self.respond(Vec::new(), false, None).await
    }

    #[tool(description = "Go to a page. Out-of-range pages are ignored.")]
    async fn change_page(
        &self,
        Parameters(params): Parameters<ChangePageParams>,
    ) -> Result<CallToolResult, McpError> {
        self.apply(Intent::ChangePage(params.page)).await
    }

    #[tool(description = "Switch between 'grid' and 'list' presentation")]
    async fn set_view_mode(
        &self,
        Parameters(params): Parameters<ViewModeParams>,
    ) -> Result<CallToolResult, McpError> {
        let mode = ViewMode::parse(&params.mode).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown view mode: {}", params.mode), None)
        })?;
        self.apply(Intent::SetViewMode(mode)).await
    }

    #[tool(description = "Select or deselect a paper for bulk download")]
    async fn toggle_selection(
        &self,
        Parameters(params): Parameters<PaperIdParams>,
    ) -> Result<CallToolResult, McpError> {
        self.apply(Intent::ToggleSelection(params.id)).await
    }

    #[tool(description = "Select every paper on the current page")]
    async fn select_all_visible(&self) -> Result<CallToolResult, McpError> {
        self.apply(Intent::SelectAllVisible).await
    }

    #[tool(description = "Select every paper matching the current filters and search, across all pages")]
    async fn select_all_filtered(&self) -> Result<CallToolResult, McpError> {
        self.apply(Intent::SelectAllFiltered).await
    }

    #[tool(description = "Clear the selection")]
    async fn clear_selection(&self) -> Result<CallToolResult, McpError> {
        self.apply(Intent::ClearSelection).await
    }

    #[tool(description = "Download one paper's PDF into the download directory")]
    async fn download_paper(
        &self,
        Parameters(params): Parameters<PaperIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let log = ViewLog::default();
        let saved = self.downloads.download(params.id, &log).await;
        json_result(&ToolResponse {
            events: log.take(),
            ignored: false,
            saved_to: saved.map(|p| p.display().to_string()),
            view: None,
        })
    }

    #[tool(description = "Download all selected papers as one ZIP archive. Clears the selection on success.")]
    async fn download_selected(&self) -> Result<CallToolResult, McpError> {
        let log = ViewLog::default();
        let outcome = session::download_selected(&self.session, &self.downloads, &log).await;
        let saved_to = match outcome {
            BulkOutcome::Saved(path) => Some(path.display().to_string()),
            BulkOutcome::Failed | BulkOutcome::Rejected => None,
        };
        self.respond(log.take(), false, saved_to).await
    }
}

impl ArchiveServer {
    /// Dispatch an intent, run any listing reload it asks for, and render.
    async fn apply(&self, intent: Intent) -> Result<CallToolResult, McpError> {
        let effect = self
            .session
            .lock()
            .await
            .dispatch(intent)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let mut events = Vec::new();
        let ignored = effect == Effect::Ignored;
        if let Effect::Reload(ticket) = effect {
            if let Err(e) = session::load_papers(&self.session, self.api.as_ref(), ticket).await {
                tracing::warn!("Error loading papers: {}", e);
                events.push(ViewEvent::Notice(Notice::error(
                    "Failed to load papers. Please try again.",
                )));
            }
        }
        self.respond(events, ignored, None).await
    }

    async fn respond(
        &self,
        events: Vec<ViewEvent>,
        ignored: bool,
        saved_to: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        let view = self.session.lock().await.render();
        json_result(&ToolResponse {
            events,
            ignored,
            saved_to,
            view: Some(view),
        })
    }
}

#[tool_handler]
impl ServerHandler for ArchiveServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Browse an exam paper archive. Filter by subject, year, region and \
                 paper type, search within the results, page through them, select \
                 papers and download them singly as PDF or together as a ZIP."
                    .into(),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting paper-archive MCP server");

    let server = ArchiveServer::create().await?;
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
