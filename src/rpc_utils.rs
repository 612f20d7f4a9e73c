use crate::constants::rpc::RETRY_BACKOFF_MS;
use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::sync::OnceLock;
use tokio::time::{sleep, Duration};

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

pub(crate) fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Connection settings shared by every call against one node.
#[derive(Clone, Debug)]
pub struct RpcEndpoint {
    pub url: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub auth_token: Option<String>,
}

pub async fn rpc_post(endpoint: &RpcEndpoint, method: &str, params: Value) -> Result<Value> {
    let body = json!({"jsonrpc":"2.0","id":"ethx","method":method,"params":params});

    // Small, bounded retry on transient HTTP failures
    let mut attempt = 0u32;
    loop {
        let mut req = http_client()
            .post(&endpoint.url)
            .json(&body)
            .timeout(Duration::from_millis(endpoint.timeout_ms));

        if let Some(token) = endpoint.auth_token.as_deref() {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let res = req.send().await?;
        if res.status().is_success() {
            let v: Value = res.json().await?;
            if let Some(err) = v.get("error") {
                let code = err.get("code").and_then(|c| c.as_i64()).unwrap_or_default();
                let msg = err
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("rpc error");
                return Err(anyhow!("rpc {method}: {code} {msg}"));
            }
            if let Some(r) = v.get("result") {
                return Ok(r.clone());
            }
            return Err(anyhow!("invalid rpc payload for {method} (no result)"));
        } else {
            // Retry only on transient statuses
            if matches!(res.status().as_u16(), 429 | 500 | 502 | 503 | 504)
                && attempt < endpoint.retries
            {
                attempt += 1;
                log::warn!(
                    "{method}: http {} retry={attempt}/{}",
                    res.status(),
                    endpoint.retries
                );
                sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64)).await;
                continue;
            }
            return Err(anyhow!("{method}: http {}", res.status()));
        }
    }
}

/// `ots_searchTransactionsBefore`: page of `address` transactions strictly
/// older than `block` (block 0 starts from the newest end).
pub async fn search_transactions_before(
    endpoint: &RpcEndpoint,
    address: &str,
    block: u64,
    page_size: usize,
) -> Result<Value> {
    rpc_post(
        endpoint,
        "ots_searchTransactionsBefore",
        json!([address, block, page_size]),
    )
    .await
}

/// `ots_searchTransactionsAfter`: page of `address` transactions strictly
/// newer than `block`.
pub async fn search_transactions_after(
    endpoint: &RpcEndpoint,
    address: &str,
    block: u64,
    page_size: usize,
) -> Result<Value> {
    rpc_post(
        endpoint,
        "ots_searchTransactionsAfter",
        json!([address, block, page_size]),
    )
    .await
}

/// `eth_getTransactionByHash`; `Value::Null` when the node does not know it.
pub async fn get_transaction_by_hash(endpoint: &RpcEndpoint, hash: &str) -> Result<Value> {
    rpc_post(endpoint, "eth_getTransactionByHash", json!([hash])).await
}
