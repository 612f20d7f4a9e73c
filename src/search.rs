//! Bidirectional paginated search over one address's transaction history.
//!
//! The node can only be asked for "the transactions of this address
//! before/after block B", so pages have no global index. A [`SearchCursor`]
//! keeps a small window of buffered records: the visible page, the page it
//! was reached from, and whatever the last fetch returned beyond it. The
//! neighbouring page comes from that overflow when it is large enough,
//! otherwise from a fetch relative to the farthest buffered block.
//!
//! Pages are ordered oldest → newest: the first page holds the oldest
//! transactions, [`SearchCursor::next_page`] moves towards newer ones.
//!
//! Cursors are immutable snapshots. Navigation returns the same `Arc` when
//! nothing changes, otherwise a fresh cursor; older cursors stay valid.
//!
//! ```rust,ignore
//! let cursor = SearchCursor::open_first_page(&fetcher, addr, 25).await?;
//! let anchor = cursor.last_anchor().unwrap().to_string();
//! let cursor = cursor.next_page(&fetcher, &anchor).await?;
//! ```

use crate::constants::search::NEWEST_BLOCK_SENTINEL;
use crate::error::SearchError;
use crate::fetcher::ChunkFetcher;
use crate::types::{Chunk, Direction, TransactionRecord};
use std::ops::Range;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct SearchCursor {
    address: String,
    page_size: usize,
    /// Buffered records, oldest first; starts and ends on block boundaries.
    txs: Vec<TransactionRecord>,
    page_start: usize,
    page_end: usize,
    /// The buffer holds the address's earliest transaction.
    touches_first: bool,
    /// The buffer holds the address's latest transaction.
    touches_last: bool,
}

#[inline]
fn same_hash(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Index where the block containing `txs[i]` begins (`len` if `i == len`).
fn block_start(txs: &[TransactionRecord], i: usize) -> usize {
    if i >= txs.len() {
        return txs.len();
    }
    let block = txs[i].block_number;
    let mut j = i;
    while j > 0 && txs[j - 1].block_number == block {
        j -= 1;
    }
    j
}

/// Index one past the end of the block containing `txs[i - 1]` (`0` if `i == 0`).
fn block_end(txs: &[TransactionRecord], i: usize) -> usize {
    if i == 0 {
        return 0;
    }
    let block = txs[i - 1].block_number;
    let mut j = i;
    while j < txs.len() && txs[j].block_number == block {
        j += 1;
    }
    j
}

impl SearchCursor {
    fn with_window(
        address: String,
        page_size: usize,
        txs: Vec<TransactionRecord>,
        page: Range<usize>,
        touches_first: bool,
        touches_last: bool,
    ) -> Self {
        debug_assert!(page.start <= page.end && page.end <= txs.len());
        debug_assert!(page.end - page.start <= page_size);
        debug_assert!(txs.windows(2).all(|w| w[0].position() < w[1].position()));
        Self {
            address,
            page_size,
            txs,
            page_start: page.start,
            page_end: page.end,
            touches_first,
            touches_last,
        }
    }

    fn bound_to_start(address: String, page_size: usize, chunk: Chunk) -> Self {
        let end = chunk.txs.len().min(page_size);
        Self::with_window(
            address,
            page_size,
            chunk.txs,
            0..end,
            chunk.touches_first,
            chunk.touches_last,
        )
    }

    fn bound_to_end(address: String, page_size: usize, chunk: Chunk) -> Self {
        let len = chunk.txs.len();
        Self::with_window(
            address,
            page_size,
            chunk.txs,
            len.saturating_sub(page_size)..len,
            chunk.touches_first,
            chunk.touches_last,
        )
    }

    /// Page holding the oldest transactions of `address`.
    pub async fn open_first_page<F: ChunkFetcher + ?Sized>(
        fetcher: &F,
        address: &str,
        page_size: usize,
    ) -> Result<Arc<Self>, SearchError> {
        let page_size = page_size.max(1);
        let chunk = fetcher.fetch_after(address, 0, page_size).await?;
        log::debug!("{address}: opened first page ({} buffered)", chunk.txs.len());
        Ok(Arc::new(Self::bound_to_start(
            address.to_string(),
            page_size,
            chunk,
        )))
    }

    /// Page holding the newest transactions of `address`.
    pub async fn open_last_page<F: ChunkFetcher + ?Sized>(
        fetcher: &F,
        address: &str,
        page_size: usize,
    ) -> Result<Arc<Self>, SearchError> {
        let page_size = page_size.max(1);
        let chunk = fetcher.fetch_before(address, NEWEST_BLOCK_SENTINEL, page_size).await?;
        log::debug!("{address}: opened last page ({} buffered)", chunk.txs.len());
        Ok(Arc::new(Self::bound_to_end(
            address.to_string(),
            page_size,
            chunk,
        )))
    }

    /// Page anchored at transaction `hash`.
    ///
    /// With `seek_forward` the anchor is the first record of the page and the
    /// page continues towards newer transactions; otherwise the anchor is the
    /// last record and the page extends towards older ones. Fails with
    /// [`SearchError::NotFound`] when the hash does not resolve to a mined
    /// transaction.
    pub async fn open_around_transaction<F: ChunkFetcher + ?Sized>(
        fetcher: &F,
        address: &str,
        hash: &str,
        seek_forward: bool,
        page_size: usize,
    ) -> Result<Arc<Self>, SearchError> {
        let page_size = page_size.max(1);
        let block = fetcher
            .locate_transaction(hash)
            .await?
            .ok_or_else(|| SearchError::NotFound {
                hash: hash.to_string(),
            })?;

        // Fetches are exclusive, so step one block back/forward to include
        // the anchor's own block. Records sharing that block on the far side
        // of the anchor stay buffered as overflow.
        let cursor = if seek_forward {
            let chunk = fetcher
                .fetch_after(address, block.saturating_sub(1), page_size)
                .await?;
            let start = match chunk.txs.iter().position(|t| same_hash(&t.hash, hash)) {
                Some(i) => i,
                None => {
                    log::debug!("{address}: {hash} (block {block}) not in fetched chunk");
                    0
                }
            };
            let end = (start + page_size).min(chunk.txs.len());
            Self::with_window(
                address.to_string(),
                page_size,
                chunk.txs,
                start..end,
                chunk.touches_first,
                chunk.touches_last,
            )
        } else {
            let chunk = fetcher
                .fetch_before(address, block.saturating_add(1), page_size)
                .await?;
            let end = match chunk.txs.iter().position(|t| same_hash(&t.hash, hash)) {
                Some(i) => i + 1,
                None => {
                    log::debug!("{address}: {hash} (block {block}) not in fetched chunk");
                    chunk.txs.len()
                }
            };
            Self::with_window(
                address.to_string(),
                page_size,
                chunk.txs,
                end.saturating_sub(page_size)..end,
                chunk.touches_first,
                chunk.touches_last,
            )
        };
        log::debug!(
            "{address}: opened page around {hash} at block {block} (forward={seek_forward})"
        );
        Ok(Arc::new(cursor))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The visible page, oldest first.
    pub fn page(&self) -> &[TransactionRecord] {
        &self.txs[self.page_start..self.page_end]
    }

    /// Every buffered record, visible page and overflow.
    pub fn buffered(&self) -> &[TransactionRecord] {
        &self.txs
    }

    /// The visible page holds the address's earliest transaction.
    pub fn is_first(&self) -> bool {
        self.touches_first && self.page_start == 0
    }

    /// The visible page holds the address's latest transaction.
    pub fn is_last(&self) -> bool {
        self.touches_last && self.page_end == self.txs.len()
    }

    /// Anchor to hand to [`previous_page`](Self::previous_page).
    pub fn first_anchor(&self) -> Option<&str> {
        self.page().first().map(|t| t.hash.as_str())
    }

    /// Anchor to hand to [`next_page`](Self::next_page).
    pub fn last_anchor(&self) -> Option<&str> {
        self.page().last().map(|t| t.hash.as_str())
    }

    async fn fetch_beyond<F: ChunkFetcher + ?Sized>(
        &self,
        fetcher: &F,
        direction: Direction,
        block: u64,
    ) -> Result<Chunk, SearchError> {
        log::debug!("{}: fetching {direction} block {block}", self.address);
        Ok(fetcher
            .fetch(&self.address, direction, block, self.page_size)
            .await?)
    }

    /// Move one page towards older transactions.
    ///
    /// `anchor` is the first record of the displayed page. An anchor equal to
    /// the page's last record means the move already happened; any other
    /// anchor is stale. Both return `self` unchanged.
    pub async fn previous_page<F: ChunkFetcher + ?Sized>(
        self: &Arc<Self>,
        fetcher: &F,
        anchor: &str,
    ) -> Result<Arc<Self>, SearchError> {
        let page = self.page();
        let (Some(first), Some(last)) = (page.first(), page.last()) else {
            return Ok(Arc::clone(self));
        };
        if page.len() > 1 && same_hash(&last.hash, anchor) {
            // Already on this page
            return Ok(Arc::clone(self));
        }
        if !same_hash(&first.hash, anchor) {
            log::trace!("{}: previous_page ignoring stale anchor {anchor}", self.address);
            return Ok(Arc::clone(self));
        }
        if self.is_first() {
            return Ok(Arc::clone(self));
        }

        // The page being left stays as overflow, extended to the end of its
        // last block; anything newer than that is dropped.
        let keep_to = block_end(&self.txs, self.page_end);
        let behind = self.page_start;

        let mut txs = Vec::with_capacity(2 * self.page_size);
        let mut touches_first = self.touches_first;
        if !self.touches_first && behind < self.page_size {
            let edge = &self.txs[0];
            let chunk = if edge.block_number == 0 {
                Chunk {
                    txs: Vec::new(),
                    touches_first: true,
                    touches_last: false,
                }
            } else {
                log::debug!("{}: {behind} buffered behind page", self.address);
                self.fetch_beyond(fetcher, Direction::Before, edge.block_number)
                    .await?
            };
            touches_first = chunk.touches_first;
            txs.extend(
                chunk
                    .txs
                    .into_iter()
                    .filter(|t| t.position() < edge.position()),
            );
        }
        let prepended = txs.len();
        txs.extend_from_slice(&self.txs[..keep_to]);

        let page_end = behind + prepended;
        if page_end == 0 {
            // Nothing older exists after all
            return Ok(Arc::new(Self {
                touches_first: true,
                ..(**self).clone()
            }));
        }
        let touches_last = self.touches_last && keep_to == self.txs.len();
        Ok(Arc::new(Self::with_window(
            self.address.clone(),
            self.page_size,
            txs,
            page_end.saturating_sub(self.page_size)..page_end,
            touches_first,
            touches_last,
        )))
    }

    /// Move one page towards newer transactions.
    ///
    /// `anchor` is the last record of the displayed page. An anchor equal to
    /// the page's first record means the move already happened; any other
    /// anchor is stale. Both return `self` unchanged.
    pub async fn next_page<F: ChunkFetcher + ?Sized>(
        self: &Arc<Self>,
        fetcher: &F,
        anchor: &str,
    ) -> Result<Arc<Self>, SearchError> {
        let page = self.page();
        let (Some(first), Some(last)) = (page.first(), page.last()) else {
            return Ok(Arc::clone(self));
        };
        if page.len() > 1 && same_hash(&first.hash, anchor) {
            // Already on this page
            return Ok(Arc::clone(self));
        }
        if !same_hash(&last.hash, anchor) {
            log::trace!("{}: next_page ignoring stale anchor {anchor}", self.address);
            return Ok(Arc::clone(self));
        }
        if self.is_last() {
            return Ok(Arc::clone(self));
        }

        // The page being left stays as overflow, back to the start of its
        // first block; anything older than that is dropped.
        let keep_from = block_start(&self.txs, self.page_start);
        let ahead = self.txs.len() - self.page_end;

        let mut txs = Vec::with_capacity(2 * self.page_size);
        txs.extend_from_slice(&self.txs[keep_from..]);
        let mut touches_last = self.touches_last;
        if !self.touches_last && ahead < self.page_size {
            // Non-empty: the page itself is buffered
            let edge = &self.txs[self.txs.len() - 1];
            log::debug!("{}: {ahead} buffered ahead of page", self.address);
            let chunk = self
                .fetch_beyond(fetcher, Direction::After, edge.block_number)
                .await?;
            touches_last = chunk.touches_last;
            txs.extend(
                chunk
                    .txs
                    .into_iter()
                    .filter(|t| t.position() > edge.position()),
            );
        }

        let page_start = self.page_end - keep_from;
        if page_start == txs.len() {
            // Nothing newer exists after all
            return Ok(Arc::new(Self {
                touches_last: true,
                ..(**self).clone()
            }));
        }
        let page_end = (page_start + self.page_size).min(txs.len());
        let touches_first = self.touches_first && keep_from == 0;
        Ok(Arc::new(Self::with_window(
            self.address.clone(),
            self.page_size,
            txs,
            page_start..page_end,
            touches_first,
            touches_last,
        )))
    }
}
