//! Application wiring: configuration, inference client and web server.

use crate::ai::{AnalysisService, GeminiAnalysisClient};
use crate::config::{load_credential, AnalysisConfig, Settings};
use crate::ui::{self, AppState};
use crate::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Serves the analysis page backed by one shared inference client.
pub struct App {
    service: Arc<dyn AnalysisService>,
    settings: Settings,
}

impl App {
    /// Build an app around any [`AnalysisService`].
    ///
    /// Used by integration tests and local harnesses to inject mocks.
    pub fn with_service(service: Arc<dyn AnalysisService>, settings: Settings) -> Self {
        Self { service, settings }
    }

    /// Construct an app from the environment.
    ///
    /// Fails before any client exists when the credential is missing.
    pub fn from_env() -> Result<Self> {
        let credential = load_credential()?;
        let settings = Settings::from_env()?;
        let config = AnalysisConfig::new(credential, &settings);
        let client = GeminiAnalysisClient::new(&config)?;

        info!(
            model = client.model(),
            timeout_secs = settings.request_timeout.as_secs(),
            max_upload_bytes = settings.max_upload_bytes,
            prompt_version = crate::prompts::ANALYSIS_PROMPT_VERSION,
            "Inference client ready"
        );

        Ok(Self::with_service(Arc::new(client), settings))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn router(&self) -> Router {
        ui::router(AppState {
            service: Arc::clone(&self.service),
            max_upload_bytes: self.settings.max_upload_bytes,
        })
    }

    /// Serve on an already-bound listener until the process is stopped.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        info!("Medical image analysis listening on http://{}", addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }
}
