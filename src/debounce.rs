use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Defers search evaluation until input has been quiet for `window`.
///
/// Every submission bumps a generation counter. A pending evaluation only
/// fires if no newer submission arrived while it waited.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    window: Duration,
    generation: Arc<AtomicU64>,
}

impl SearchDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Resolves to `Some(input)` after the window, or `None` if superseded.
    pub fn submit(&self, input: String) -> impl Future<Output = Option<String>> + Send + 'static {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let window = self.window;
        async move {
            tokio::time::sleep(window).await;
            if generation.load(Ordering::SeqCst) == ticket {
                Some(input)
            } else {
                tracing::debug!("Search input superseded before window elapsed");
                None
            }
        }
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}
