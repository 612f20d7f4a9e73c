//! In-memory `ChunkFetcher` for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use ethx::{Chunk, ChunkFetcher, FetchError, TransactionRecord};
use num_bigint::BigUint;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

pub const ADDR: &str = "0x00000000219ab540356cbb839cbe05303d7705fa";

pub fn record(block: u64, idx: u64) -> TransactionRecord {
    TransactionRecord {
        block_number: block,
        timestamp: 1_600_000_000 + block * 12,
        index_in_block: idx,
        hash: format!("0x{block:032x}{idx:032x}"),
        from: ADDR.to_string(),
        to: Some("0x1111111111111111111111111111111111111111".to_string()),
        created_contract_address: None,
        value: BigUint::from(block),
        fee: BigUint::from(21_000u32),
        gas_price: BigUint::from(1u32),
        data: Vec::new(),
        status: true,
    }
}

/// History where block `i + 1` holds `sizes[i]` transactions.
pub fn history_in_blocks(sizes: &[usize]) -> Vec<TransactionRecord> {
    sizes
        .iter()
        .enumerate()
        .flat_map(|(i, &n)| (0..n as u64).map(move |idx| record(i as u64 + 1, idx)))
        .collect()
}

/// `n` transactions, one per block, in blocks `1..=n`.
pub fn linear_history(n: usize) -> Vec<TransactionRecord> {
    history_in_blocks(&vec![1; n])
}

pub fn hashes(txs: &[TransactionRecord]) -> Vec<String> {
    txs.iter().map(|t| t.hash.clone()).collect()
}

/// Serves `ots_searchTransactions*`-shaped chunks out of a fixed history:
/// at least `page_size` records when available, extended to whole blocks.
pub struct MockFetcher {
    history: Vec<TransactionRecord>,
    /// Mined transactions of other addresses: (hash, block)
    unrelated: Vec<(String, u64)>,
    fetches: AtomicUsize,
    fail_next: AtomicBool,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MockFetcher {
    pub fn new(history: Vec<TransactionRecord>) -> Self {
        Self {
            history,
            unrelated: Vec::new(),
            fetches: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            gate: Mutex::new(None),
        }
    }

    /// Make `hash` resolvable to `block` without it belonging to the history.
    pub fn with_unrelated_tx(mut self, hash: &str, block: u64) -> Self {
        self.unrelated.push((hash.to_string(), block));
        self
    }

    pub fn history(&self) -> &[TransactionRecord] {
        &self.history
    }

    /// Chunk fetches served so far (lookups not included).
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Make the next chunk fetch fail with a transport error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// The next call (of any kind) waits until the returned sender fires.
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }

    fn chunk(&self, range: std::ops::Range<usize>) -> Chunk {
        Chunk {
            touches_first: range.start == 0,
            touches_last: range.end == self.history.len(),
            txs: self.history[range].to_vec(),
        }
    }

    fn begin_fetch(&self) -> Result<(), FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(FetchError::Transport(anyhow::anyhow!("connection refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl ChunkFetcher for MockFetcher {
    async fn fetch_before(
        &self,
        _address: &str,
        block: u64,
        page_size: usize,
    ) -> Result<Chunk, FetchError> {
        self.pass_gate().await;
        self.begin_fetch()?;
        if self.history.is_empty() {
            return Ok(Chunk::empty_history());
        }
        let end = if block == 0 {
            self.history.len()
        } else {
            self.history.partition_point(|t| t.block_number < block)
        };
        let mut start = end.saturating_sub(page_size);
        while start > 0
            && start < end
            && self.history[start - 1].block_number == self.history[start].block_number
        {
            start -= 1;
        }
        if start == end {
            return Ok(Chunk {
                txs: Vec::new(),
                touches_first: true,
                touches_last: end == self.history.len(),
            });
        }
        Ok(self.chunk(start..end))
    }

    async fn fetch_after(
        &self,
        _address: &str,
        block: u64,
        page_size: usize,
    ) -> Result<Chunk, FetchError> {
        self.pass_gate().await;
        self.begin_fetch()?;
        if self.history.is_empty() {
            return Ok(Chunk::empty_history());
        }
        let start = self.history.partition_point(|t| t.block_number <= block);
        let mut end = (start + page_size).min(self.history.len());
        while end > start
            && end < self.history.len()
            && self.history[end].block_number == self.history[end - 1].block_number
        {
            end += 1;
        }
        if start == end {
            return Ok(Chunk {
                txs: Vec::new(),
                touches_first: start == 0,
                touches_last: true,
            });
        }
        Ok(self.chunk(start..end))
    }

    async fn locate_transaction(&self, hash: &str) -> Result<Option<u64>, FetchError> {
        self.pass_gate().await;
        Ok(self
            .history
            .iter()
            .find(|t| t.hash.eq_ignore_ascii_case(hash))
            .map(|t| t.block_number)
            .or_else(|| {
                self.unrelated
                    .iter()
                    .find(|(h, _)| h.eq_ignore_ascii_case(hash))
                    .map(|&(_, block)| block)
            }))
    }
}
