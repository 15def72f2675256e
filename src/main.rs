use clap::Parser;
use ring_cache::config::{Config, DiscoveryMode};
use ring_cache::membership::discovery::{
    Discovery, HealthCheckDiscovery, RosterInventory, StaticDiscovery,
};
use ring_cache::membership::service::MembershipService;
use ring_cache::routing::handlers::app;
use ring_cache::routing::relay::RelayClient;
use ring_cache::routing::router::Router;
use ring_cache::storage::memory::LocalStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let node_id = config.node_id();
    tracing::info!("Starting cache node {} on {}", node_id, config.bind);
    if !config.in_roster() {
        tracing::warn!(
            "Node {} is not listed in the roster; peers will never route keys to it",
            node_id
        );
    }

    // 1. Membership (discovery + inventory):
    let discovery: Arc<dyn Discovery> = match config.discovery {
        DiscoveryMode::Static => Arc::new(StaticDiscovery::new(
            config.peers.iter().map(|entry| entry.id.clone()).collect(),
        )),
        DiscoveryMode::HealthCheck => Arc::new(HealthCheckDiscovery::new(
            config.peers.clone(),
            config.relay_connect_timeout(),
        )?),
    };
    let inventory = Arc::new(RosterInventory::new(&config.peers));

    let membership = MembershipService::with_schedule(
        node_id,
        discovery,
        inventory,
        config.refresh_interval(),
        !config.no_minute_alignment,
    );

    // 2. Storage and routing:
    let store = Arc::new(LocalStore::new());
    let relay = RelayClient::new(config.relay_connect_timeout(), config.relay_timeout())?;
    let router = Arc::new(Router::new(membership.clone(), store, relay));

    // 3. Bind before the first refresh so this node's own health check can answer:
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("HTTP server listening on {}", config.bind);

    // 4. Spawn membership refresh:
    let _refresh_handle = membership.clone().start();

    // 5. Serve:
    axum::serve(listener, app(router)).await?;

    Ok(())
}
