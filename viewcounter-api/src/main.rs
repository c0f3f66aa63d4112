use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

mod api;
mod error;
mod handlers;
mod server;
mod state;
mod types;

use state::AppState;
use viewcounter_core::catalog::{StaticCatalog, VideoCatalog};
use viewcounter_core::counter::CounterStore;
use viewcounter_core::health::HealthChecker;
use viewcounter_core::logging::{init_logging_with_config, LogConfig};
use viewcounter_core::service::ViewCounterService;
use viewcounter_core::shutdown::ShutdownCoordinator;
use viewcounter_core::sync::anti_entropy::{AntiEntropyConfig, AntiEntropyTask};
use viewcounter_core::sync::transport::{HttpSyncTransport, Peer};
use viewcounter_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration: explicit file when given, environment otherwise
    let config = match std::env::var("VIEWCOUNTER_CONFIG") {
        Ok(path) => Config::from_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        Err(_) => Config::from_env().context("loading configuration from environment")?,
    };

    init_logging_with_config(LogConfig {
        level: config.logging.level.clone(),
        with_target: config.logging.with_target,
        json_format: config.logging.json_format,
    })
    .context("initializing logging")?;

    let replica_id = config.replica.resolve_id();
    info!(
        replica_id = %replica_id,
        bind = %config.server.bind_address,
        peers = config.replica.peers.len(),
        "view counter replica starting"
    );
    if config.replica.peers.is_empty() {
        warn!("no peers configured; running as a standalone replica");
    }

    let store = Arc::new(CounterStore::new(&replica_id));
    let catalog: Arc<dyn VideoCatalog> =
        Arc::new(StaticCatalog::from_ids(config.catalog.video_ids.iter().copied()));
    let transport = Arc::new(
        HttpSyncTransport::new(config.sync.push_timeout, config.sync.pull_timeout)
            .context("building sync transport")?,
    );
    let peers: Vec<Peer> = config
        .replica
        .peers
        .iter()
        .map(|p| Peer { replica_id: p.id.clone(), base_url: p.url.clone() })
        .collect();

    let service = Arc::new(ViewCounterService::new(
        store,
        catalog.clone(),
        transport,
        peers,
        config.sync.push_enabled,
    ));

    let shutdown = Arc::new(ShutdownCoordinator::new());

    let anti_entropy = AntiEntropyTask::new(
        service.clone(),
        AntiEntropyConfig {
            enabled: config.sync.periodic_enabled,
            interval: config.sync.interval,
            initial_delay: config.sync.initial_delay,
        },
        shutdown.clone(),
    );
    let anti_entropy_handle = tokio::spawn(anti_entropy.run());

    // Ctrl-C turns into a coordinated shutdown of server and loop
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.trigger().await;
            }
        });
    }

    let health = HealthChecker::new(&replica_id, env!("CARGO_PKG_VERSION"));
    let app_state = Arc::new(AppState::new(service, catalog, health));

    let server = server::ApiServer::new(app_state, config.server.bind_address, shutdown);
    server.run().await?;

    anti_entropy_handle.await.ok();
    info!("view counter replica stopped");
    Ok(())
}
