//! Collaborators the membership view is built from.
//!
//! Discovery answers "who is alive", the inventory answers "where does it
//! live". Both are polled once per refresh and may fail transiently; the
//! membership service keeps its previous view when they do.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tokio::task::JoinSet;

use super::types::NodeId;
use crate::error::MembershipError;
use crate::routing::protocol::ENDPOINT_HEALTH_CHECK;

#[async_trait]
pub trait Discovery: Send + Sync {
    async fn live_members(&self) -> Result<Vec<NodeId>, MembershipError>;
}

#[async_trait]
pub trait Inventory: Send + Sync {
    /// `Ok(None)` means the identifier is unknown to the inventory.
    async fn resolve(&self, id: &NodeId) -> Result<Option<SocketAddr>, MembershipError>;
}

/// One configured cluster member: `id=host:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: NodeId,
    pub endpoint: String,
}

impl FromStr for RosterEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, endpoint) = s
            .split_once('=')
            .ok_or_else(|| format!("expected <id>=<host:port>, got '{}'", s))?;
        let id = id.trim();
        let endpoint = endpoint.trim();
        if id.is_empty() || endpoint.is_empty() {
            return Err(format!("empty id or endpoint in '{}'", s));
        }
        if !endpoint.contains(':') {
            return Err(format!("endpoint '{}' is missing a port", endpoint));
        }
        Ok(Self {
            id: NodeId::new(id),
            endpoint: endpoint.to_string(),
        })
    }
}

/// Reports every roster member as live.
pub struct StaticDiscovery {
    members: Vec<NodeId>,
}

impl StaticDiscovery {
    pub fn new(members: Vec<NodeId>) -> Self {
        Self { members }
    }
}

#[async_trait]
impl Discovery for StaticDiscovery {
    async fn live_members(&self) -> Result<Vec<NodeId>, MembershipError> {
        Ok(self.members.clone())
    }
}

/// Mirrors a load balancer's target health: a member is live when its
/// `/health-check` endpoint answers with a success status.
pub struct HealthCheckDiscovery {
    roster: Vec<RosterEntry>,
    http_client: reqwest::Client,
}

impl HealthCheckDiscovery {
    pub fn new(roster: Vec<RosterEntry>, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            roster,
            http_client,
        })
    }
}

#[async_trait]
impl Discovery for HealthCheckDiscovery {
    async fn live_members(&self) -> Result<Vec<NodeId>, MembershipError> {
        let mut probes = JoinSet::new();

        for entry in self.roster.iter().cloned() {
            let client = self.http_client.clone();
            probes.spawn(async move {
                let url = format!("http://{}{}", entry.endpoint, ENDPOINT_HEALTH_CHECK);
                match client.get(url).send().await {
                    Ok(resp) if resp.status().is_success() => Some(entry.id),
                    Ok(resp) => {
                        tracing::debug!("Target {} unhealthy: {}", entry.id, resp.status());
                        None
                    }
                    Err(e) => {
                        tracing::debug!("Target {} unreachable: {}", entry.id, e);
                        None
                    }
                }
            });
        }

        let mut healthy = Vec::new();
        while let Some(probe) = probes.join_next().await {
            match probe {
                Ok(Some(id)) => healthy.push(id),
                Ok(None) => {}
                Err(e) => return Err(MembershipError::Discovery(e.to_string())),
            }
        }

        if healthy.is_empty() {
            return Err(MembershipError::NoLiveMembers);
        }
        Ok(healthy)
    }
}

/// Resolves members through the endpoints listed in the roster.
pub struct RosterInventory {
    endpoints: HashMap<NodeId, String>,
}

impl RosterInventory {
    pub fn new(roster: &[RosterEntry]) -> Self {
        Self {
            endpoints: roster
                .iter()
                .map(|entry| (entry.id.clone(), entry.endpoint.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl Inventory for RosterInventory {
    async fn resolve(&self, id: &NodeId) -> Result<Option<SocketAddr>, MembershipError> {
        let Some(endpoint) = self.endpoints.get(id) else {
            return Ok(None);
        };

        let mut addrs = tokio::net::lookup_host(endpoint.as_str()).await.map_err(|e| {
            MembershipError::Inventory {
                id: id.clone(),
                reason: e.to_string(),
            }
        })?;

        match addrs.next() {
            Some(addr) => Ok(Some(addr)),
            None => Err(MembershipError::Inventory {
                id: id.clone(),
                reason: format!("'{}' resolved to no addresses", endpoint),
            }),
        }
    }
}
