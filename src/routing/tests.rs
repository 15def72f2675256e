//! Routing Module Tests
//!
//! Exercises the routing decisions that can be settled without a live peer:
//! the synchronization gate, single-node operation, relayed requests that must
//! not fan out, and the sweep hop ceiling.
//!
//! *Note: Multi-node flows over HTTP are covered in `tests/cluster.rs`.*

#[cfg(test)]
mod tests {
    use crate::error::CacheError;
    use crate::membership::discovery::{RosterEntry, RosterInventory, StaticDiscovery};
    use crate::membership::service::MembershipService;
    use crate::membership::types::NodeId;
    use crate::routing::protocol::{NO_DATA, is_empty_payload};
    use crate::routing::relay::RelayClient;
    use crate::routing::router::{Router, WriteOutcome};
    use crate::storage::memory::LocalStore;
    use crate::storage::partitioner::{Role, place};
    use bytes::Bytes;
    use std::sync::Arc;
    use std::time::Duration;

    /// An address nothing listens on.
    async fn dead_endpoint() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr.to_string()
    }

    /// Router for `me` inside a ring of `ids`; every other member is unreachable.
    async fn router_in_ring(me: &str, ids: &[&str], synced: bool) -> Router {
        let mut roster = Vec::new();
        for id in ids {
            roster.push(RosterEntry {
                id: NodeId::new(*id),
                endpoint: dead_endpoint().await,
            });
        }

        let membership = MembershipService::new(
            NodeId::new(me),
            Arc::new(StaticDiscovery::new(roster.iter().map(|e| e.id.clone()).collect())),
            Arc::new(RosterInventory::new(&roster)),
        );
        if synced {
            membership.refresh().await.unwrap();
        }

        let relay = RelayClient::new(Duration::from_millis(200), Duration::from_millis(500)).unwrap();
        Router::new(membership, Arc::new(LocalStore::new()), relay)
    }

    /// First key for which `me` has the wanted role.
    fn key_with_role(router: &Router, me: &str, role: Role) -> String {
        let view = router.membership().current().unwrap();
        (0..10_000)
            .map(|i| format!("key-{}", i))
            .find(|key| place(&view, key).unwrap().role_of(&NodeId::new(me)) == role)
            .expect("some key should map to every role")
    }

    // ============================================================
    // SYNCHRONIZATION GATE
    // ============================================================

    #[tokio::test]
    async fn test_requests_rejected_before_sync() {
        let router = router_in_ring("a", &["a"], false).await;

        for key in ["k1", "k2", "another"] {
            assert!(matches!(
                router.get(key, false, 0).await,
                Err(CacheError::NotSynchronized)
            ));
            assert!(matches!(
                router.get(key, true, 0).await,
                Err(CacheError::NotSynchronized)
            ));
            assert!(matches!(
                router.put(key, Bytes::from_static(b"v"), false).await,
                Err(CacheError::NotSynchronized)
            ));
        }
        assert!(router.store().is_empty());
    }

    // ============================================================
    // SINGLE NODE
    // ============================================================

    #[tokio::test]
    async fn test_single_node_put_then_get() {
        let router = router_in_ring("solo", &["solo"], true).await;

        router
            .put("user-1", Bytes::from_static(b"session-data"), false)
            .await
            .unwrap();

        assert_eq!(
            router.get("user-1", false, 0).await.unwrap(),
            Some(Bytes::from_static(b"session-data"))
        );
        assert_eq!(
            router.get("user-1", true, 0).await.unwrap(),
            Some(Bytes::from_static(b"session-data"))
        );
        assert_eq!(router.store().len(), 1);
    }

    #[tokio::test]
    async fn test_single_node_missing_key() {
        let router = router_in_ring("solo", &["solo"], true).await;
        assert_eq!(router.get("nobody", false, 0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_single_node_relayed_put_is_stored() {
        let router = router_in_ring("solo", &["solo"], true).await;

        router
            .put("user-2", Bytes::from_static(b"v"), true)
            .await
            .unwrap();
        assert_eq!(router.store().get("user-2"), Some(Bytes::from_static(b"v")));
    }

    #[tokio::test]
    async fn test_empty_and_sentinel_values_read_as_not_found() {
        let router = router_in_ring("solo", &["solo"], true).await;

        router.put("empty", Bytes::new(), false).await.unwrap();
        router
            .put("sentinel", Bytes::from_static(NO_DATA), false)
            .await
            .unwrap();

        assert_eq!(router.get("empty", false, 0).await.unwrap(), None);
        assert_eq!(router.get("sentinel", false, 0).await.unwrap(), None);
    }

    // ============================================================
    // RELAYED REQUESTS
    // ============================================================

    #[tokio::test]
    async fn test_relayed_put_at_primary_writes_only_locally() {
        let router = router_in_ring("a", &["a", "b", "c"], true).await;
        let key = key_with_role(&router, "a", Role::Primary);

        router
            .put(&key, Bytes::from_static(b"v1"), true)
            .await
            .unwrap();
        assert_eq!(router.store().get(&key), Some(Bytes::from_static(b"v1")));
    }

    #[tokio::test]
    async fn test_relayed_put_at_secondary_writes_only_locally() {
        let router = router_in_ring("a", &["a", "b", "c"], true).await;
        let key = key_with_role(&router, "a", Role::Secondary);

        router
            .put(&key, Bytes::from_static(b"v1"), true)
            .await
            .unwrap();
        assert_eq!(router.store().get(&key), Some(Bytes::from_static(b"v1")));
    }

    #[tokio::test]
    async fn test_relayed_put_at_other_fails_without_writing() {
        let router = router_in_ring("a", &["a", "b", "c"], true).await;
        let key = key_with_role(&router, "a", Role::Other);

        let result = router.put(&key, Bytes::from_static(b"v1"), true).await;
        assert!(matches!(result, Err(CacheError::WriteFailed(k)) if k == key));
        assert!(router.store().is_empty());
    }

    #[tokio::test]
    async fn test_put_succeeds_when_only_local_replica_accepts() {
        let router = router_in_ring("a", &["a", "b", "c"], true).await;
        let key = key_with_role(&router, "a", Role::Primary);

        // The secondary is unreachable; the local primary write carries the request.
        router
            .put(&key, Bytes::from_static(b"v1"), false)
            .await
            .unwrap();
        assert_eq!(router.store().get(&key), Some(Bytes::from_static(b"v1")));
    }

    #[tokio::test]
    async fn test_put_fails_when_both_remote_replicas_unreachable() {
        let router = router_in_ring("a", &["a", "b", "c"], true).await;
        let key = key_with_role(&router, "a", Role::Other);

        let result = router.put(&key, Bytes::from_static(b"v1"), false).await;
        assert!(matches!(result, Err(CacheError::WriteFailed(_))));
    }

    #[tokio::test]
    async fn test_relayed_get_at_primary_does_not_forward() {
        let router = router_in_ring("a", &["a", "b", "c"], true).await;
        let key = key_with_role(&router, "a", Role::Primary);

        assert_eq!(router.get(&key, true, 0).await.unwrap(), None);

        router.store().put(key.clone(), Bytes::from_static(b"here"));
        assert_eq!(
            router.get(&key, true, 0).await.unwrap(),
            Some(Bytes::from_static(b"here"))
        );
    }

    #[tokio::test]
    async fn test_unreachable_replicas_read_as_not_found() {
        let router = router_in_ring("a", &["a", "b", "c"], true).await;
        let key = key_with_role(&router, "a", Role::Other);

        assert_eq!(router.get(&key, false, 0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sweep_stops_at_hop_ceiling() {
        let router = router_in_ring("a", &["a", "b", "c"], true).await;
        let key = key_with_role(&router, "a", Role::Other);

        // Two hops already taken in a ring of three: nobody is left to ask.
        let started = std::time::Instant::now();
        assert_eq!(router.get(&key, true, 2).await.unwrap(), None);
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_sweep_with_huge_hop_count_ends_without_forwarding() {
        let router = router_in_ring("a", &["a", "b", "c"], true).await;
        let key = key_with_role(&router, "a", Role::Other);

        let started = std::time::Instant::now();
        assert_eq!(router.get(&key, true, usize::MAX).await.unwrap(), None);
        assert_eq!(router.get(&key, true, usize::MAX - 1).await.unwrap(), None);
        assert!(started.elapsed() < Duration::from_millis(200));

        router.store().put(key.clone(), Bytes::from_static(b"local"));
        assert_eq!(
            router.get(&key, true, usize::MAX).await.unwrap(),
            Some(Bytes::from_static(b"local"))
        );
    }

    #[tokio::test]
    async fn test_node_outside_view_acts_as_relay_only() {
        let router = router_in_ring("outsider", &["a", "b"], true).await;

        assert_eq!(router.get("k", true, 0).await.unwrap(), None);
        assert!(matches!(
            router.put("k", Bytes::from_static(b"v"), true).await,
            Err(CacheError::WriteFailed(_))
        ));
    }

    // ============================================================
    // PROTOCOL HELPERS
    // ============================================================

    #[test]
    fn test_is_empty_payload() {
        assert!(is_empty_payload(b""));
        assert!(is_empty_payload(NO_DATA));
        assert!(!is_empty_payload(b"No data!"));
        assert!(!is_empty_payload(b"0"));
    }

    #[test]
    fn test_write_outcome() {
        let both = WriteOutcome {
            primary: true,
            secondary: true,
        };
        let one = WriteOutcome {
            primary: false,
            secondary: true,
        };
        let none = WriteOutcome {
            primary: false,
            secondary: false,
        };

        assert!(both.succeeded());
        assert!(one.succeeded());
        assert!(!none.succeeded());
    }
}
