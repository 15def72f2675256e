use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::membership::types::NodeId;

/// Errors surfaced to clients of the cache.
///
/// Peer failures never show up here: the relay client turns them into
/// "no data" or a failed write before the router sees them.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Not all instances are synchronized yet, please retry in less than a minute")]
    NotSynchronized,

    #[error("Neither replica accepted the write for key {0}")]
    WriteFailed(String),
}

impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        match self {
            CacheError::NotSynchronized => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::RETRY_AFTER, "60")],
                CacheError::NotSynchronized.to_string(),
            )
                .into_response(),
            // The body carries the key so the client can correlate the failure.
            CacheError::WriteFailed(key) => (StatusCode::INTERNAL_SERVER_ERROR, key).into_response(),
        }
    }
}

/// Failures of the external discovery and inventory collaborators.
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    #[error("Discovery failed: {0}")]
    Discovery(String),

    #[error("Could not resolve address of {id}: {reason}")]
    Inventory { id: NodeId, reason: String },

    #[error("Discovery reported no live members")]
    NoLiveMembers,
}
