//! ethx - bidirectional transaction search for one address
//!
//! Pages through the full transaction history of an address on a node that
//! serves the `ots_searchTransactionsBefore/After` methods.
//!
//! ## Architecture
//!
//! - [`fetcher`]: the [`ChunkFetcher`] seam and its JSON-RPC implementation
//! - [`tx_mapping`]: raw node replies → [`TransactionRecord`]s
//! - [`search`]: [`SearchCursor`], immutable page snapshots with next/previous
//! - [`session`]: latest-intent-wins wrapper for interactive callers
//! - [`router`]: `ethx://v1/...` deep links ↔ [`PageRequest`]
//!
//! ## Usage
//!
//! ```bash
//! ETH_NODE_URL=http://127.0.0.1:8545 cargo run -- 0xabc...
//! ```

// Core modules
pub mod constants;
pub mod error;
pub mod types;
pub mod util_text;

// Configuration (CLI args > env > defaults)
pub mod config;

// Direct JSON-RPC transport and reply normalization
pub mod rpc_utils;
pub mod tx_mapping;

pub mod fetcher;
pub mod search;
pub mod session;

// Deep link router
pub mod router;

pub use config::Config;
pub use error::{FetchError, SearchError};
pub use fetcher::{ChunkFetcher, RpcChunkFetcher};
pub use search::SearchCursor;
pub use session::{PageRequest, SearchSession};
pub use types::{Chunk, Direction, TransactionRecord};
