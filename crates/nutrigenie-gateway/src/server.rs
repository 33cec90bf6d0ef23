use std::path::PathBuf;
use std::sync::Arc;

use nutrigenie_common::Result;
use nutrigenie_config::AppConfig;
use nutrigenie_db::HistoryStore;
use tokio::net::TcpListener;
use tracing::info;

use crate::bootstrap;
use crate::router::build_router;
use crate::state::AppState;

/// The main gateway server that binds to a port and serves the API.
pub struct GatewayServer {
    config: AppConfig,
    data_dir: PathBuf,
}

impl GatewayServer {
    pub fn new(config: AppConfig, data_dir: PathBuf) -> Self {
        Self { config, data_dir }
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.gateway.host, self.config.gateway.port);

        let provider = bootstrap::build_provider(&self.config)?;
        let history = HistoryStore::open(&bootstrap::history_db_path(&self.data_dir))?;

        let state = Arc::new(AppState::new(self.config, provider, history));
        let app = build_router(state);

        let listener = TcpListener::bind(&addr).await?;
        info!("NutriGenie gateway listening on {}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| nutrigenie_common::Error::Gateway(format!("server error: {e}")))?;

        Ok(())
    }
}
