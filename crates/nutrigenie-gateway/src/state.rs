use std::sync::Arc;

use nutrigenie_config::AppConfig;
use nutrigenie_db::HistoryStore;
use nutrigenie_providers::GenerationProvider;
use tracing::warn;

/// Shared application state accessible from all request handlers.
pub struct AppState {
    pub config: AppConfig,
    pub provider: Arc<dyn GenerationProvider>,
    pub history: HistoryStore,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn GenerationProvider>,
        history: HistoryStore,
    ) -> Self {
        Self {
            config,
            provider,
            history,
        }
    }

    /// Append to history. A failed write is surfaced in the log only; the
    /// caller already holds the response and must still see it.
    pub fn record_search(&self, query: &str, response: &str) {
        if let Err(e) = self.history.record(query, response) {
            warn!("failed to record search history: {e}");
        }
    }
}

pub type SharedState = Arc<AppState>;
