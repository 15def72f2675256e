use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

use crate::membership::discovery::RosterEntry;
use crate::membership::types::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiscoveryMode {
    /// Every roster member is considered live.
    Static,
    /// Roster members are live while their `/health-check` answers.
    HealthCheck,
}

/// One node of the replicated in-memory cache.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Identifier of this node; must match its entry in the roster
    #[arg(long, env = "CACHE_NODE_ID")]
    pub node_id: String,

    /// Address the HTTP server listens on
    #[arg(long, env = "CACHE_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Cluster members as <id>=<host:port>, repeated or comma separated
    #[arg(long = "peer", env = "CACHE_PEERS", value_delimiter = ',', required = true)]
    pub peers: Vec<RosterEntry>,

    /// How live members are discovered
    #[arg(long, value_enum, default_value_t = DiscoveryMode::HealthCheck)]
    pub discovery: DiscoveryMode,

    /// Seconds between membership refreshes
    #[arg(long, default_value = "60")]
    pub refresh_interval_secs: u64,

    /// Refresh immediately instead of waiting for the next wall-clock minute
    #[arg(long)]
    pub no_minute_alignment: bool,

    /// Connect timeout for relays and health probes, in milliseconds
    #[arg(long, default_value = "500")]
    pub relay_connect_timeout_ms: u64,

    /// Whole-request timeout for relays, in milliseconds
    #[arg(long, default_value = "2000")]
    pub relay_timeout_ms: u64,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, env = "CACHE_LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,
}

impl Config {
    pub fn node_id(&self) -> NodeId {
        NodeId::new(self.node_id.clone())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn relay_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.relay_connect_timeout_ms)
    }

    pub fn relay_timeout(&self) -> Duration {
        Duration::from_millis(self.relay_timeout_ms)
    }

    pub fn in_roster(&self) -> bool {
        let me = self.node_id();
        self.peers.iter().any(|entry| entry.id == me)
    }
}
