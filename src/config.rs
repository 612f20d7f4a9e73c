use crate::constants::rpc::{DEFAULT_NODE_URL, DEFAULT_RETRIES, DEFAULT_TIMEOUT_MS};
use crate::constants::search::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use anyhow::{anyhow, Result};
use clap::Parser;
use std::env;

/// ethx - address transaction history explorer
///
/// Pages through every transaction of an address on a node that serves the
/// `ots_searchTransactions*` methods.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "ethx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Address transaction history explorer", long_about = None)]
pub struct CliArgs {
    /// Address (0x...) or deep link (ethx://v1/address/<addr>?p=...)
    #[arg(env = "TARGET")]
    pub target: Option<String>,

    /// JSON-RPC endpoint URL
    #[arg(long, env = "ETH_NODE_URL")]
    pub node_url: Option<String>,

    /// Bearer token sent with every RPC request
    #[arg(long, env = "RPC_AUTH_TOKEN")]
    pub rpc_auth_token: Option<String>,

    /// RPC request timeout in milliseconds (1000-60000)
    #[arg(long, env = "RPC_TIMEOUT_MS")]
    pub rpc_timeout_ms: Option<u64>,

    /// Retry attempts on transient HTTP failures (0-10)
    #[arg(long, env = "RPC_RETRIES")]
    pub rpc_retries: Option<u32>,

    /// Transactions per page (1-100)
    #[arg(long, env = "PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Extra pages to walk after the first one (0-1000)
    #[arg(long, env = "WALK_PAGES")]
    pub walk_pages: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub target: Option<String>,
    pub node_url: String,
    pub rpc_auth_token: Option<String>,
    pub rpc_timeout_ms: u64,
    pub rpc_retries: u32,
    pub page_size: usize,
    pub walk_pages: usize,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Load configuration from CLI args and environment variables
/// Priority: CLI args > Environment variables > Defaults
pub fn load() -> Result<Config> {
    from_args(CliArgs::parse())
}

/// Build a validated [`Config`] from already-parsed arguments.
pub fn from_args(args: CliArgs) -> Result<Config> {
    let node_url = args
        .node_url
        .or_else(|| env::var("ETH_NODE_URL").ok())
        .unwrap_or_else(|| DEFAULT_NODE_URL.to_string());
    validate_url(&node_url, "ETH_NODE_URL")?;

    let rpc_timeout_ms = args
        .rpc_timeout_ms
        .or_else(|| env_parsed("RPC_TIMEOUT_MS"))
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    let rpc_timeout_ms = validate_in_range(rpc_timeout_ms, 1000, 60000, "RPC_TIMEOUT_MS")?;

    let rpc_retries = args
        .rpc_retries
        .or_else(|| env_parsed("RPC_RETRIES"))
        .unwrap_or(DEFAULT_RETRIES);
    let rpc_retries = validate_in_range(rpc_retries, 0, 10, "RPC_RETRIES")?;

    let page_size = args
        .page_size
        .or_else(|| env_parsed("PAGE_SIZE"))
        .unwrap_or(DEFAULT_PAGE_SIZE);
    let page_size = validate_in_range(page_size, 1, MAX_PAGE_SIZE, "PAGE_SIZE")?;

    let walk_pages = args
        .walk_pages
        .or_else(|| env_parsed("WALK_PAGES"))
        .unwrap_or(0);
    let walk_pages = validate_in_range(walk_pages, 0, 1000, "WALK_PAGES")?;

    Ok(Config {
        target: args.target.filter(|t| !t.trim().is_empty()),
        node_url,
        rpc_auth_token: args
            .rpc_auth_token
            .or_else(|| env::var("RPC_AUTH_TOKEN").ok())
            .filter(|t| !t.is_empty()),
        rpc_timeout_ms,
        rpc_retries,
        page_size,
        walk_pages,
    })
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

impl Config {
    /// Log the effective configuration (token redacted)
    pub fn log_summary(&self) {
        log::info!("ethx configuration:");
        log::info!("  RPC URL: {}", self.node_url);
        log::info!("  RPC Timeout: {}ms", self.rpc_timeout_ms);
        log::info!("  RPC Retries: {}", self.rpc_retries);
        log::info!("  Page Size: {}", self.page_size);
        log::info!("  Walk Pages: {}", self.walk_pages);
        if self.rpc_auth_token.is_some() {
            log::info!("  RPC Auth: Configured");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_in_range() {
        assert_eq!(validate_in_range(25usize, 1, 100, "PAGE_SIZE").unwrap(), 25);
        assert_eq!(validate_in_range(1usize, 1, 100, "PAGE_SIZE").unwrap(), 1);
        let err = validate_in_range(0usize, 1, 100, "PAGE_SIZE").unwrap_err();
        assert_eq!(err.to_string(), "PAGE_SIZE must be in range [1, 100], got 0");
        assert!(validate_in_range(60001u64, 1000, 60000, "RPC_TIMEOUT_MS").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("http://127.0.0.1:8545", "ETH_NODE_URL").is_ok());
        assert!(validate_url("https://node.example", "ETH_NODE_URL").is_ok());
        assert!(validate_url("", "ETH_NODE_URL").is_err());
        assert!(validate_url("ws://127.0.0.1:8546", "ETH_NODE_URL").is_err());
    }

    #[test]
    fn test_explicit_args_win() {
        let args = CliArgs::parse_from([
            "ethx",
            "0x00000000219ab540356cBB839Cbe05303d7705Fa",
            "--node-url",
            "https://node.example",
            "--page-size",
            "10",
            "--walk-pages",
            "3",
            "--rpc-timeout-ms",
            "2000",
            "--rpc-retries",
            "0",
        ]);
        let cfg = from_args(args).unwrap();
        assert_eq!(cfg.node_url, "https://node.example");
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.walk_pages, 3);
        assert_eq!(cfg.rpc_timeout_ms, 2000);
        assert_eq!(cfg.rpc_retries, 0);
        assert_eq!(
            cfg.target.as_deref(),
            Some("0x00000000219ab540356cBB839Cbe05303d7705Fa")
        );
    }

    #[test]
    fn test_out_of_range_page_size_is_rejected() {
        let args = CliArgs::parse_from(["ethx", "--page-size", "1000"]);
        let err = from_args(args).unwrap_err();
        assert!(err.to_string().contains("PAGE_SIZE"));
    }
}
