use bytes::Bytes;
use std::sync::Arc;

use super::protocol::is_empty_payload;
use super::relay::RelayClient;
use crate::error::CacheError;
use crate::membership::service::MembershipService;
use crate::membership::types::{MembershipView, NodeId};
use crate::storage::memory::LocalStore;
use crate::storage::partitioner::{ReplicaSet, Role, place};

/// Per-request routing of cache reads and writes.
///
/// Each request is classified by this node's role for the key (primary,
/// secondary or neither) and by whether it was relayed here by another
/// node. That pair selects between answering locally, asking the replicas
/// directly, or continuing the ring sweep.
pub struct Router {
    membership: Arc<MembershipService>,
    store: Arc<LocalStore>,
    relay: RelayClient,
}

/// Outcome of a replicated write, one flag per replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub primary: bool,
    pub secondary: bool,
}

impl WriteOutcome {
    pub fn succeeded(&self) -> bool {
        self.primary || self.secondary
    }
}

impl Router {
    pub fn new(
        membership: Arc<MembershipService>,
        store: Arc<LocalStore>,
        relay: RelayClient,
    ) -> Self {
        Self {
            membership,
            store,
            relay,
        }
    }

    pub fn membership(&self) -> &Arc<MembershipService> {
        &self.membership
    }

    pub fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    /// Looks a key up. `Ok(None)` is "not found".
    pub async fn get(
        &self,
        key: &str,
        relayed: bool,
        hops: usize,
    ) -> Result<Option<Bytes>, CacheError> {
        let (view, replicas) = self.placement(key)?;
        let me = self.membership.local_id();
        let role = replicas.role_of(me);

        tracing::debug!(
            "GET {} as {:?} (relayed={}, hops={}) primary={} secondary={}",
            key,
            role,
            relayed,
            hops,
            replicas.primary,
            replicas.secondary
        );

        let found = match (role, relayed) {
            (Role::Other, false) => {
                let (from_primary, from_secondary) = tokio::join!(
                    self.relay_get(&view, &replicas.primary, key, 0),
                    self.relay_get(&view, &replicas.secondary, key, 0),
                );
                from_primary.or(from_secondary)
            }
            (Role::Other, true) | (Role::Secondary, true) => match self.local_get(key) {
                Some(value) => Some(value),
                None => self.sweep(&view, key, hops).await,
            },
            (Role::Primary, true) => self.local_get(key),
            (Role::Primary, false) => match self.local_get(key) {
                Some(value) => Some(value),
                None if !replicas.is_single() => {
                    self.relay_get(&view, &replicas.secondary, key, 0).await
                }
                None => None,
            },
            (Role::Secondary, false) => match self.local_get(key) {
                Some(value) => Some(value),
                None => match self.relay_get(&view, &replicas.primary, key, 0).await {
                    Some(value) => Some(value),
                    None => self.sweep(&view, key, 0).await,
                },
            },
        };

        Ok(found)
    }

    /// Writes a key to both replicas. Succeeds if at least one accepted it.
    pub async fn put(&self, key: &str, value: Bytes, relayed: bool) -> Result<(), CacheError> {
        let (view, replicas) = self.placement(key)?;
        let me = self.membership.local_id();

        let to_primary = async {
            if me == &replicas.primary {
                self.store.put(key.to_string(), value.clone());
                true
            } else if !relayed {
                self.relay_put(&view, &replicas.primary, key, value.clone()).await
            } else {
                false
            }
        };

        let to_secondary = async {
            if me == &replicas.secondary {
                if !replicas.is_single() {
                    self.store.put(key.to_string(), value.clone());
                    true
                } else {
                    // Already written as primary.
                    false
                }
            } else if !relayed {
                self.relay_put(&view, &replicas.secondary, key, value.clone()).await
            } else {
                false
            }
        };

        let (primary, secondary) = tokio::join!(to_primary, to_secondary);
        let outcome = WriteOutcome { primary, secondary };

        tracing::debug!(
            "PUT {} (relayed={}) primary {}={} secondary {}={}",
            key,
            relayed,
            replicas.primary,
            outcome.primary,
            replicas.secondary,
            outcome.secondary
        );

        if outcome.succeeded() {
            Ok(())
        } else {
            tracing::error!(
                "PUT {} failed on both replicas ({} and {})",
                key,
                replicas.primary,
                replicas.secondary
            );
            Err(CacheError::WriteFailed(key.to_string()))
        }
    }

    fn placement(&self, key: &str) -> Result<(Arc<MembershipView>, ReplicaSet), CacheError> {
        let view = self.membership.current().ok_or(CacheError::NotSynchronized)?;
        let replicas = place(&view, key).ok_or(CacheError::NotSynchronized)?;
        Ok((view, replicas))
    }

    fn local_get(&self, key: &str) -> Option<Bytes> {
        self.store.get(key).filter(|value| !is_empty_payload(value))
    }

    /// Continues the ring sweep by handing the lookup to the next member.
    ///
    /// `hops` counts the forwards already made. A sweep never makes more than
    /// `len - 1` forwards, which is enough to reach every other member once,
    /// so it ends even when no member holds the key.
    async fn sweep(&self, view: &MembershipView, key: &str, hops: usize) -> Option<Bytes> {
        let next_hops = hops.saturating_add(1);
        if next_hops >= view.len() {
            tracing::debug!("Sweep for {} stopped after {} hops", key, hops);
            return None;
        }

        let me = self.membership.local_id();
        let Some(next) = view.successor(me) else {
            tracing::debug!("Sweep for {} has no successor: {} is not in the view", key, me);
            return None;
        };
        if next == me {
            return None;
        }

        self.relay_get(view, next, key, next_hops).await
    }

    async fn relay_get(
        &self,
        view: &MembershipView,
        target: &NodeId,
        key: &str,
        hops: usize,
    ) -> Option<Bytes> {
        let Some(addr) = view.address(target) else {
            tracing::warn!("No address for {}, treating as no data", target);
            return None;
        };
        self.relay.get(addr, key, hops).await
    }

    async fn relay_put(&self, view: &MembershipView, target: &NodeId, key: &str, value: Bytes) -> bool {
        let Some(addr) = view.address(target) else {
            tracing::warn!("No address for {}, treating write as failed", target);
            return false;
        };
        self.relay.put(addr, key, value).await
    }
}
