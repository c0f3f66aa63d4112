//! Server state shared across requests

use std::sync::Arc;
use viewcounter_core::catalog::VideoCatalog;
use viewcounter_core::health::HealthChecker;
use viewcounter_core::service::ViewCounterService;

/// Everything the handlers need, one instance per process
pub struct AppState {
    /// Replicated counter service behind the HTTP surface
    pub service: Arc<ViewCounterService>,

    /// Video existence verdicts and the listing probe
    pub catalog: Arc<dyn VideoCatalog>,

    /// Liveness reporting
    pub health: HealthChecker,
}

impl AppState {
    pub fn new(
        service: Arc<ViewCounterService>,
        catalog: Arc<dyn VideoCatalog>,
        health: HealthChecker,
    ) -> Self {
        Self { service, catalog, health }
    }
}
