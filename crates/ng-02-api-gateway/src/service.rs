//! Gateway service: wires adapters into the router and serves it.

use crate::adapters::{DefaultSettingsCatalog, FileSettingsStore, FileTokenProvider, ReverseProxy};
use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::domain::upstream::UpstreamTable;
use crate::middleware::GatewayMetrics;
use crate::router::{build_router, AppState};
use axum::Router;
use ng_01_supervisor::{RestartOrchestrator, SupervisorApi, SupervisorClient};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Node gateway service state
pub struct GatewayService {
    state: AppState,
}

impl GatewayService {
    /// Create a gateway talking to the configured supervisord.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let supervisor = SupervisorClient::new(
            &config.supervisor_endpoint(),
            config.supervisor.call_timeout,
        )
        .map_err(|e| GatewayError::Client(e.to_string()))?;
        Self::with_supervisor(config, Arc::new(supervisor))
    }

    /// Create a gateway with a caller-provided supervisor.
    pub fn with_supervisor(
        config: GatewayConfig,
        supervisor: Arc<dyn SupervisorApi>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        let tokens = Arc::new(FileTokenProvider::new(
            config.upstreams.keymanager_token_path.clone(),
        ));
        let proxy = ReverseProxy::new(config.timeouts.upstream, tokens)
            .map_err(|e| GatewayError::Client(e.to_string()))?;
        let orchestrator =
            RestartOrchestrator::new(Arc::clone(&supervisor), config.restart_plan());

        let state = AppState {
            upstreams: Arc::new(UpstreamTable::from_config(&config.upstreams)),
            proxy: Arc::new(proxy),
            supervisor,
            orchestrator: Arc::new(orchestrator),
            settings: Arc::new(FileSettingsStore::new(config.settings.path.clone())),
            defaults: Arc::new(DefaultSettingsCatalog::new(
                config.settings.defaults_dir.clone(),
            )),
            metrics: Arc::new(GatewayMetrics::new()),
            config: Arc::new(config),
        };
        Ok(Self { state })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.state.config
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.state.metrics)
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {}", addr, e)))?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: Option<SocketAddr> = listener.local_addr().ok();
        info!(
            addr = ?addr,
            network = %self.state.config.node.network,
            programs = ?self.state.config.supervisor.programs,
            "Node gateway listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Serve(e.to_string()))?;

        info!("Node gateway stopped");
        Ok(())
    }
}
