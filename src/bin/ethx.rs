// Native binary for ethx - prints address transaction pages as JSON lines

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;

use ethx::{
    config::load,
    router::{self, Route, RouteV1},
    util_text, PageRequest, RpcChunkFetcher, SearchCursor, SearchSession,
};

/// Which way `WALK_PAGES` keeps going after the opening page
fn walks_forward(request: &PageRequest) -> bool {
    match request {
        PageRequest::First | PageRequest::Next { .. } => true,
        PageRequest::Last | PageRequest::Previous { .. } => false,
        PageRequest::Around { seek_forward, .. } => *seek_forward,
    }
}

fn resolve_target(target: &str) -> Result<(String, PageRequest)> {
    if util_text::is_address(target) {
        return Ok((target.to_string(), PageRequest::Last));
    }
    match router::parse(target) {
        Some(Route::V1(RouteV1::Address { address, request })) => {
            if let PageRequest::Next { anchor }
            | PageRequest::Previous { anchor }
            | PageRequest::Around { anchor, .. } = &request
            {
                if !util_text::is_tx_hash(anchor) {
                    return Err(anyhow!("not a transaction hash: {anchor}"));
                }
            }
            Ok((address, request))
        }
        Some(Route::V1(RouteV1::Home)) => Err(anyhow!("deep link names no address: {target}")),
        None => Err(anyhow!("not an address or ethx:// link: {target}")),
    }
}

fn print_page(cursor: &SearchCursor) -> Result<()> {
    for tx in cursor.page() {
        println!("{}", serde_json::to_string(tx)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = load().context("Failed to load configuration")?;
    cfg.log_summary();

    let target = cfg
        .target
        .as_deref()
        .ok_or_else(|| anyhow!("missing TARGET (address or ethx:// link)"))?;
    let (address, request) = resolve_target(target)?;
    let forward = walks_forward(&request);

    let fetcher = Arc::new(RpcChunkFetcher::from_config(&cfg));
    let session = SearchSession::new(fetcher, address.clone(), cfg.page_size);

    let mut cursor = session
        .navigate(request)
        .await
        .context("Failed to open page")?
        .ok_or_else(|| anyhow!("navigation superseded"))?;
    print_page(&cursor)?;

    for walked in 0..cfg.walk_pages {
        let next = if forward {
            if cursor.is_last() {
                break;
            }
            cursor.last_anchor().map(|anchor| PageRequest::Next {
                anchor: anchor.to_string(),
            })
        } else {
            if cursor.is_first() {
                break;
            }
            cursor.first_anchor().map(|anchor| PageRequest::Previous {
                anchor: anchor.to_string(),
            })
        };
        let Some(next) = next else { break };

        let moved = session
            .navigate(next)
            .await
            .with_context(|| format!("Failed to walk page {}", walked + 1))?
            .ok_or_else(|| anyhow!("navigation superseded"))?;
        if Arc::ptr_eq(&moved, &cursor) {
            break;
        }
        cursor = moved;
        print_page(&cursor)?;
    }

    log::info!(
        "{address}: {} txs on final page (first={}, last={})",
        cursor.page().len(),
        cursor.is_first(),
        cursor.is_last()
    );
    let continue_at = if forward {
        cursor
            .last_anchor()
            .filter(|_| !cursor.is_last())
            .map(|anchor| PageRequest::Next {
                anchor: anchor.to_string(),
            })
    } else {
        cursor
            .first_anchor()
            .filter(|_| !cursor.is_first())
            .map(|anchor| PageRequest::Previous {
                anchor: anchor.to_string(),
            })
    };
    if let Some(request) = continue_at {
        eprintln!("continue: {}", router::address_link(&address, &request));
    }
    Ok(())
}
