use std::sync::Arc;

use relay_core::Config;
use relay_providers::ProviderRouter;
use relay_queue::{KvGateway, WorkerRegistry};

/// Shared state for every handler: the queue gateway, the local worker
/// registry, the provider router, and the resolved configuration.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<KvGateway>,
    pub registry: Arc<WorkerRegistry>,
    pub router: Arc<ProviderRouter>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        gateway: Arc<KvGateway>,
        registry: Arc<WorkerRegistry>,
        router: Arc<ProviderRouter>,
        config: Arc<Config>,
    ) -> Self {
        Self { gateway, registry, router, config }
    }
}
