use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::ChainError;
use crate::networks::NetworkDescriptor;

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Parse a JSON-RPC hex quantity such as `"0x61"`.
pub fn parse_quantity(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x")?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Ask the endpoint at `url` for its chain ID via `eth_chainId`.
///
/// `display_url` is what errors and logs name instead of `url`, which may
/// embed the provider key.
pub async fn fetch_chain_id(
    url: &str,
    display_url: &str,
    timeout: Duration,
) -> Result<u64, ChainError> {
    let rpc_err = |reason: String| ChainError::Rpc {
        url: display_url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| rpc_err(format!("client setup failed: {}", e.without_url())))?;

    let resp = client
        .post(url)
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_chainId",
            "params": [],
        }))
        .send()
        .await
        .map_err(|e| rpc_err(format!("network error: {}", e.without_url())))?;

    if !resp.status().is_success() {
        return Err(rpc_err(format!("endpoint returned {}", resp.status())));
    }

    let body: RpcResponse = resp
        .json()
        .await
        .map_err(|e| rpc_err(format!("JSON parse error: {}", e.without_url())))?;

    if let Some(err) = body.error {
        return Err(rpc_err(format!("error {}: {}", err.code, err.message)));
    }
    let raw = body
        .result
        .ok_or_else(|| rpc_err("response has no result".into()))?;
    debug!(url = display_url, result = %raw, "eth_chainId response");

    parse_quantity(&raw).ok_or_else(|| rpc_err(format!("invalid chain id quantity '{raw}'")))
}

/// Confirm that the network's endpoint reports the configured chain ID.
/// Returns the reported ID on success.
pub async fn check_network(
    network: &NetworkDescriptor,
    provider_key: &str,
    timeout: Duration,
) -> Result<u64, ChainError> {
    let display_url = network.display_url(provider_key);
    let actual = fetch_chain_id(&network.url, &display_url, timeout).await?;
    if actual != network.chain_id {
        warn!(
            network = %network.name,
            expected = network.chain_id,
            actual,
            "chain id mismatch"
        );
        return Err(ChainError::ChainIdMismatch {
            expected: network.chain_id,
            actual,
        });
    }
    info!(network = %network.name, chain_id = actual, "chain id confirmed");
    Ok(actual)
}
