//! Routing Network Protocol
//!
//! The HTTP surface shared by clients and by nodes relaying to each other.
//! Client and relay requests use the same endpoints; a relayed request is
//! marked with `relayed=true`.

use serde::{Deserialize, Serialize};

use crate::membership::types::Node;

// --- API Endpoints ---

/// Liveness probe polled by the discovery facility.
pub const ENDPOINT_HEALTH_CHECK: &str = "/health-check";
/// Read a key.
pub const ENDPOINT_GET: &str = "/get";
/// Write a key; the request body is the value.
pub const ENDPOINT_PUT: &str = "/put";
/// Snapshot of this node's membership view.
pub const ENDPOINT_CLUSTER: &str = "/cluster";

/// Legacy "not found" body some peers send instead of an empty one.
/// Treated as empty wherever a payload is inspected.
pub const NO_DATA: &[u8] = b"No data";

pub fn is_empty_payload(payload: &[u8]) -> bool {
    payload.is_empty() || payload == NO_DATA
}

// --- Query Parameters ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetQuery {
    pub key: String,
    /// Set when another cluster node forwarded this request.
    #[serde(default)]
    pub relayed: bool,
    /// Ring-sweep hops already taken before this request.
    #[serde(default)]
    pub hops: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutQuery {
    pub key: String,
    #[serde(default)]
    pub relayed: bool,
}

// --- Responses ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterStatus {
    pub node_id: String,
    pub synchronized: bool,
    /// Live members in ring order.
    pub members: Vec<Node>,
    pub local_entries: usize,
}
