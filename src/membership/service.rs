use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::discovery::{Discovery, Inventory};
use super::types::{MembershipView, Node, NodeId};
use crate::error::MembershipError;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Owns the node's view of the cluster and keeps it fresh.
///
/// The view is published through a watch channel as an `Arc` snapshot.
/// A refresh builds a whole new view and swaps it in, so routing always
/// reads either the old or the new ring, never something in between.
/// `None` in the channel means the first refresh has not completed yet.
pub struct MembershipService {
    local_id: NodeId,
    discovery: Arc<dyn Discovery>,
    inventory: Arc<dyn Inventory>,
    view: watch::Sender<Option<Arc<MembershipView>>>,
    refresh_interval: Duration,
    align_to_minute: bool,
}

impl MembershipService {
    pub fn new(
        local_id: NodeId,
        discovery: Arc<dyn Discovery>,
        inventory: Arc<dyn Inventory>,
    ) -> Arc<Self> {
        Self::with_schedule(local_id, discovery, inventory, REFRESH_INTERVAL, true)
    }

    pub fn with_schedule(
        local_id: NodeId,
        discovery: Arc<dyn Discovery>,
        inventory: Arc<dyn Inventory>,
        refresh_interval: Duration,
        align_to_minute: bool,
    ) -> Arc<Self> {
        let (view, _) = watch::channel(None);
        Arc::new(Self {
            local_id,
            discovery,
            inventory,
            view,
            refresh_interval,
            align_to_minute,
        })
    }

    pub fn local_id(&self) -> &NodeId {
        &self.local_id
    }

    /// Latest view, or `None` until the first refresh has completed.
    pub fn current(&self) -> Option<Arc<MembershipView>> {
        self.view.borrow().clone()
    }

    pub fn is_synchronized(&self) -> bool {
        self.view.borrow().is_some()
    }

    /// Resolves once a view has been published.
    pub async fn wait_synchronized(&self) {
        let mut rx = self.view.subscribe();
        // The sender lives as long as `self`, so this only fails if we are being dropped.
        let _ = rx.wait_for(|view| view.is_some()).await;
    }

    /// Rebuilds the view from the collaborators and swaps it in.
    ///
    /// On any collaborator error the previous view stays in place.
    pub async fn refresh(&self) -> Result<Arc<MembershipView>, MembershipError> {
        let live = self.discovery.live_members().await?;
        if live.is_empty() {
            return Err(MembershipError::NoLiveMembers);
        }

        let mut nodes = Vec::with_capacity(live.len());
        for id in live {
            match self.inventory.resolve(&id).await? {
                Some(addr) => nodes.push(Node { id, addr }),
                None => tracing::warn!("Live member {} is unknown to the inventory, skipping", id),
            }
        }

        if nodes.is_empty() {
            return Err(MembershipError::NoLiveMembers);
        }

        let view = Arc::new(MembershipView::new(nodes));
        let previous = self.view.send_replace(Some(view.clone()));

        if previous.as_deref() != Some(view.as_ref()) {
            info!(
                "Membership changed: {} live nodes {:?}",
                view.len(),
                view.members()
            );
        }
        if !view.contains(&self.local_id) {
            tracing::warn!(
                "Local node {} is not part of the live view; acting as a relay only",
                self.local_id
            );
        }

        Ok(view)
    }

    /// Spawns the refresh loop.
    ///
    /// The first refresh waits for the next wall-clock minute so that every
    /// node in the cluster refreshes at (roughly) the same moment.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if self.align_to_minute {
                let wait = until_next_minute(SystemTime::now());
                info!("Waiting {:?} for the first membership sync", wait);
                tokio::time::sleep(wait).await;
            }

            let mut interval = tokio::time::interval(self.refresh_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                info!("Syncing live nodes");
                match self.refresh().await {
                    Ok(view) => {
                        for node in view.nodes() {
                            info!("  - {} at {}", node.id, node.addr);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Membership refresh failed, keeping previous view: {}", e);
                    }
                }
            }
        })
    }
}

fn until_next_minute(now: SystemTime) -> Duration {
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    let into_minute = Duration::from_millis((since_epoch.as_millis() % 60_000) as u64);
    Duration::from_secs(60) - into_minute
}
