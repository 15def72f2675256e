use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A live cluster member together with the address it was resolved to
/// during the refresh that produced the current view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub addr: SocketAddr,
}

/// Immutable snapshot of the live cluster.
///
/// Members are kept sorted by identifier with duplicates removed, so two
/// nodes that observe the same live set always build the same ring. That
/// ordering is what lets every node agree on key placement without talking
/// to each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipView {
    members: Vec<NodeId>,
    addresses: HashMap<NodeId, SocketAddr>,
}

impl MembershipView {
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut addresses = HashMap::new();
        for node in nodes {
            addresses.insert(node.id, node.addr);
        }

        let mut members: Vec<NodeId> = addresses.keys().cloned().collect();
        members.sort();

        Self { members, addresses }
    }

    /// Ring order.
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.addresses.contains_key(id)
    }

    pub fn address(&self, id: &NodeId) -> Option<SocketAddr> {
        self.addresses.get(id).copied()
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.members
            .iter()
            .filter_map(|id| {
                self.address(id).map(|addr| Node {
                    id: id.clone(),
                    addr,
                })
            })
            .collect()
    }

    /// The member that follows `id` in ring order, wrapping around.
    /// `None` when `id` is not part of this view.
    pub fn successor(&self, id: &NodeId) -> Option<&NodeId> {
        let idx = self.members.iter().position(|member| member == id)?;
        self.members.get((idx + 1) % self.members.len())
    }
}
