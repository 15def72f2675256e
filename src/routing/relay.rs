use anyhow::Result;
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::Duration;

use super::protocol::{ENDPOINT_GET, ENDPOINT_PUT, GetQuery, PutQuery, is_empty_payload};

/// Forwards GET/PUT requests to peer nodes with the relay flag set.
///
/// Exactly one attempt per call. Any failure (refused connection, timeout,
/// unexpected status) is logged and reported as "no data" for reads or as a
/// failed write, so the router only ever deals with data outcomes.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http_client: reqwest::Client,
}

impl RelayClient {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { http_client })
    }

    /// Returns the peer's payload, or `None` if it had nothing or could not be reached.
    pub async fn get(&self, addr: SocketAddr, key: &str, hops: usize) -> Option<Bytes> {
        match self.try_get(addr, key, hops).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Relay GET {} to {} failed: {}", key, addr, e);
                None
            }
        }
    }

    /// Returns whether the peer accepted the write.
    pub async fn put(&self, addr: SocketAddr, key: &str, value: Bytes) -> bool {
        match self.try_put(addr, key, value).await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("Relay PUT {} to {} failed: {}", key, addr, e);
                false
            }
        }
    }

    async fn try_get(&self, addr: SocketAddr, key: &str, hops: usize) -> Result<Option<Bytes>> {
        let query = GetQuery {
            key: key.to_string(),
            relayed: true,
            hops,
        };
        let response = self
            .http_client
            .get(format!("http://{}{}", addr, ENDPOINT_GET))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("GET answered {}", status));
        }

        let payload = response.bytes().await?;
        if status == reqwest::StatusCode::NO_CONTENT || is_empty_payload(&payload) {
            return Ok(None);
        }
        Ok(Some(payload))
    }

    async fn try_put(&self, addr: SocketAddr, key: &str, value: Bytes) -> Result<bool> {
        let query = PutQuery {
            key: key.to_string(),
            relayed: true,
        };
        let response = self
            .http_client
            .post(format!("http://{}{}", addr, ENDPOINT_PUT))
            .query(&query)
            .body(value)
            .send()
            .await?;

        tracing::debug!("Relay PUT {} to {} answered {}", key, addr, response.status());
        Ok(response.status() == reqwest::StatusCode::OK)
    }
}
