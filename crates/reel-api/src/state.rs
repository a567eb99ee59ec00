//! Application state.

use std::sync::Arc;

use reel_pipeline::JobOrchestrator;
use reel_publisher::AccountConnector;

use crate::config::ApiConfig;
use crate::error::ApiResult;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub orchestrator: Arc<JobOrchestrator>,
    pub connector: Arc<AccountConnector>,
}

impl AppState {
    /// Create state from environment variables. The orchestrator publishes
    /// through the same connector the account routes manage.
    pub fn from_env(config: ApiConfig) -> ApiResult<Self> {
        let connector = Arc::new(AccountConnector::from_env()?);
        let orchestrator = JobOrchestrator::from_env()?.with_connector(Arc::clone(&connector));

        Ok(Self::new(config, Arc::new(orchestrator), connector))
    }

    pub fn new(
        config: ApiConfig,
        orchestrator: Arc<JobOrchestrator>,
        connector: Arc<AccountConnector>,
    ) -> Self {
        Self {
            config,
            orchestrator,
            connector,
        }
    }
}
