use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

use super::protocol::{
    ClusterStatus, ENDPOINT_CLUSTER, ENDPOINT_GET, ENDPOINT_HEALTH_CHECK, ENDPOINT_PUT, GetQuery,
    PutQuery,
};
use super::router::Router;
use crate::error::CacheError;

/// The node's HTTP surface.
///
/// `/put` accepts both GET and POST since clients of the cache send the
/// value as a body on either.
pub fn app(router: Arc<Router>) -> axum::Router {
    axum::Router::new()
        .route(ENDPOINT_HEALTH_CHECK, get(handle_health_check))
        .route(ENDPOINT_GET, get(handle_get))
        .route(ENDPOINT_PUT, get(handle_put).post(handle_put))
        .route(ENDPOINT_CLUSTER, get(handle_cluster))
        .layer(Extension(router))
}

pub async fn handle_health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Instance is healthy")
}

pub async fn handle_get(
    Extension(router): Extension<Arc<Router>>,
    Query(req): Query<GetQuery>,
) -> Result<Response, CacheError> {
    match router.get(&req.key, req.relayed, req.hops).await? {
        Some(value) => Ok((StatusCode::OK, value).into_response()),
        None => {
            tracing::debug!("GET {}: not found", req.key);
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

pub async fn handle_put(
    Extension(router): Extension<Arc<Router>>,
    Query(req): Query<PutQuery>,
    body: Bytes,
) -> Result<(StatusCode, String), CacheError> {
    router.put(&req.key, body, req.relayed).await?;
    Ok((StatusCode::OK, req.key))
}

pub async fn handle_cluster(Extension(router): Extension<Arc<Router>>) -> Json<ClusterStatus> {
    let membership = router.membership();
    let view = membership.current();

    Json(ClusterStatus {
        node_id: membership.local_id().to_string(),
        synchronized: view.is_some(),
        members: view.map(|view| view.nodes()).unwrap_or_default(),
        local_entries: router.store().len(),
    })
}
