use crate::config::Config;
use crate::error::FetchError;
use crate::rpc_utils::{self, RpcEndpoint};
use crate::tx_mapping::process_search_page;
use crate::types::{Chunk, Direction};
use async_trait::async_trait;
use serde_json::Value;

/// Remote source of address transaction chunks.
///
/// Both fetches are relative to a block number and exclusive of it. Chunks
/// are ordered oldest first and contain whole blocks, so they may hold more
/// than `page_size` records.
#[async_trait]
pub trait ChunkFetcher: Send + Sync {
    /// Transactions strictly before `block`; `block == 0` starts from the
    /// newest end of the history.
    async fn fetch_before(
        &self,
        address: &str,
        block: u64,
        page_size: usize,
    ) -> Result<Chunk, FetchError>;

    /// Transactions strictly after `block`.
    async fn fetch_after(
        &self,
        address: &str,
        block: u64,
        page_size: usize,
    ) -> Result<Chunk, FetchError>;

    /// Block number of a mined transaction, `None` if unknown or pending.
    async fn locate_transaction(&self, hash: &str) -> Result<Option<u64>, FetchError>;

    async fn fetch(
        &self,
        address: &str,
        direction: Direction,
        block: u64,
        page_size: usize,
    ) -> Result<Chunk, FetchError> {
        match direction {
            Direction::Before => self.fetch_before(address, block, page_size).await,
            Direction::After => self.fetch_after(address, block, page_size).await,
        }
    }
}

/// [`ChunkFetcher`] backed by a node exposing the `ots_` search namespace.
#[derive(Clone, Debug)]
pub struct RpcChunkFetcher {
    endpoint: RpcEndpoint,
}

impl RpcChunkFetcher {
    pub fn new(endpoint: RpcEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(RpcEndpoint {
            url: cfg.node_url.clone(),
            timeout_ms: cfg.rpc_timeout_ms,
            retries: cfg.rpc_retries,
            auth_token: cfg.rpc_auth_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl ChunkFetcher for RpcChunkFetcher {
    async fn fetch_before(
        &self,
        address: &str,
        block: u64,
        page_size: usize,
    ) -> Result<Chunk, FetchError> {
        let raw =
            rpc_utils::search_transactions_before(&self.endpoint, address, block, page_size)
                .await?;
        let chunk = process_search_page(&raw)?;
        log::debug!(
            "fetched {} txs before block {block} for {address} (first={}, last={})",
            chunk.txs.len(),
            chunk.touches_first,
            chunk.touches_last
        );
        Ok(chunk)
    }

    async fn fetch_after(
        &self,
        address: &str,
        block: u64,
        page_size: usize,
    ) -> Result<Chunk, FetchError> {
        let raw =
            rpc_utils::search_transactions_after(&self.endpoint, address, block, page_size)
                .await?;
        let chunk = process_search_page(&raw)?;
        log::debug!(
            "fetched {} txs after block {block} for {address} (first={}, last={})",
            chunk.txs.len(),
            chunk.touches_first,
            chunk.touches_last
        );
        Ok(chunk)
    }

    async fn locate_transaction(&self, hash: &str) -> Result<Option<u64>, FetchError> {
        let raw = rpc_utils::get_transaction_by_hash(&self.endpoint, hash).await?;
        block_number_of(&raw)
    }
}

fn block_number_of(raw: &Value) -> Result<Option<u64>, FetchError> {
    match raw {
        Value::Null => Ok(None),
        Value::Object(tx) => match tx.get("blockNumber") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => {
                u64::from_str_radix(crate::util_text::strip_hex_prefix(s), 16)
                    .map(Some)
                    .map_err(|e| FetchError::shape(format!("bad blockNumber {s}: {e}")))
            }
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| FetchError::shape(format!("bad blockNumber {n}"))),
            Some(other) => Err(FetchError::shape(format!("bad blockNumber {other}"))),
        },
        other => Err(FetchError::shape(format!(
            "unexpected eth_getTransactionByHash result: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_number_of() {
        assert_eq!(block_number_of(&Value::Null).unwrap(), None);
        assert_eq!(
            block_number_of(&json!({"hash": "0xaa", "blockNumber": "0x1e"})).unwrap(),
            Some(30)
        );
        // pending transaction
        assert_eq!(
            block_number_of(&json!({"hash": "0xaa", "blockNumber": null})).unwrap(),
            None
        );
        assert!(block_number_of(&json!("0xaa")).is_err());
        assert!(block_number_of(&json!({"blockNumber": "0xzz"})).is_err());
    }
}
