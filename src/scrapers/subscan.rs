//! Subscan Block-Hash Resolver
//!
//! Maps a block number to its historical state identifier via the Subscan
//! block endpoint. Resolution is deliberately fail-soft: any transport or
//! decoding failure logs and yields `None`, and downstream snapshot reads
//! then degrade to zero-valued quantities so delta arithmetic stays total
//! over the whole target set.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct BlockRequest {
    block_num: u64,
    only_head: bool,
}

#[derive(Debug, Deserialize)]
struct BlockResponse {
    data: Option<BlockData>,
}

#[derive(Debug, Deserialize)]
struct BlockData {
    hash: Option<String>,
}

pub struct SubscanClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl SubscanClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        // A hung lookup would stall the whole sequential run; expiry is
        // treated identically to a failed lookup.
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Resolve a block number to its block hash.
    ///
    /// Returns `None` on any failure; callers treat that as "snapshot
    /// unavailable for this block" and continue with degraded data.
    pub async fn resolve_block_hash(&self, block: u64) -> Option<String> {
        match self.try_resolve(block).await {
            Ok(hash) => {
                debug!(block, hash = %hash, "resolved block hash");
                Some(hash)
            }
            Err(e) => {
                error!(block, error = %e, "failed to resolve block hash");
                None
            }
        }
    }

    async fn try_resolve(&self, block: u64) -> Result<String> {
        let body = BlockRequest {
            block_num: block,
            only_head: true,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request
            .send()
            .await
            .context("block lookup request failed")?
            .error_for_status()
            .context("block lookup returned error status")?;

        let parsed: BlockResponse = response
            .json()
            .await
            .context("failed to decode block lookup response")?;

        parsed
            .data
            .and_then(|d| d.hash)
            .context("block lookup response had no data.hash")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = BlockRequest {
            block_num: 69_558_413,
            only_head: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["block_num"], 69_558_413u64);
        assert_eq!(json["only_head"], true);
    }

    #[test]
    fn test_response_hash_extraction() {
        let parsed: BlockResponse =
            serde_json::from_str(r#"{"code":0,"data":{"hash":"0x6d72"}}"#).unwrap();
        assert_eq!(parsed.data.unwrap().hash.as_deref(), Some("0x6d72"));
    }

    #[test]
    fn test_response_without_hash() {
        let parsed: BlockResponse = serde_json::from_str(r#"{"code":0,"data":{}}"#).unwrap();
        assert!(parsed.data.unwrap().hash.is_none());

        let parsed: BlockResponse = serde_json::from_str(r#"{"code":10004}"#).unwrap();
        assert!(parsed.data.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_none() {
        // Reserved TEST-NET-1 address; the request fails fast or times out,
        // and either way resolution degrades to None instead of propagating.
        let client = SubscanClient {
            client: Client::builder()
                .timeout(Duration::from_millis(200))
                .build()
                .unwrap(),
            endpoint: "http://192.0.2.1:1/api/scan/block".to_string(),
            api_key: None,
        };
        assert_eq!(client.resolve_block_hash(100).await, None);
    }
}
