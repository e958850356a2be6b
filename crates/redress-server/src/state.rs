use std::sync::Arc;

use redress_core::config::RedressConfig;
use redress_core::events::ActivityBus;
use redress_core::integrations::{commerce_from_config, MockSearch, MockTracking};
use redress_core::monitor::Monitor;
use redress_core::pipeline::{DecisionService, Pipeline};
use redress_core::store::MemoryGraph;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RedressConfig>,
    pub store: Arc<MemoryGraph>,
    pub bus: ActivityBus,
    pub pipeline: Arc<Pipeline>,
    pub monitor: Arc<Monitor>,
}

impl AppState {
    /// Wire the full component graph from configuration. The decision
    /// service is injected so tests can run without a live endpoint.
    pub fn build(config: RedressConfig, decision: Arc<dyn DecisionService>) -> Self {
        let store = Arc::new(MemoryGraph::seeded());
        let bus = ActivityBus::default();
        let tracking = Arc::new(MockTracking::new());
        let commerce = commerce_from_config(&config.adapters);

        let pipeline = Arc::new(Pipeline::new(
            store.clone(),
            decision,
            commerce,
            Arc::new(MockSearch),
            bus.clone(),
            config.policy.clone(),
            config.adapters.brand_name.clone(),
        ));

        let monitor = Arc::new(Monitor::new(
            store.clone(),
            tracking,
            pipeline.clone(),
            bus.clone(),
            config.monitor.interval(),
        ));

        Self {
            config: Arc::new(config),
            store,
            bus,
            pipeline,
            monitor,
        }
    }
}
