//! Application constants
//!
//! Page sizing and RPC defaults shared by the library and the `ethx` binary.

/// Address search paging
pub mod search {
    /// Transactions per page when nothing else is configured
    pub const DEFAULT_PAGE_SIZE: usize = 25;

    /// Largest page a node will be asked for
    pub const MAX_PAGE_SIZE: usize = 100;

    /// Block argument meaning "start from the newest end" for `fetch_before`
    pub const NEWEST_BLOCK_SENTINEL: u64 = 0;
}

/// JSON-RPC transport
pub mod rpc {
    /// Default node endpoint
    pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:8545";

    /// Per-request timeout (milliseconds)
    pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

    /// Retries on 429/5xx before giving up
    pub const DEFAULT_RETRIES: u32 = 2;

    /// Linear backoff step between retries (milliseconds)
    pub const RETRY_BACKOFF_MS: u64 = 150;
}
