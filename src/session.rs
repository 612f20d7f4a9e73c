//! Latest-intent-wins holder for the cursor of one address search.
//!
//! Cursors never cancel their own fetches. A UI that fires a second
//! navigation before the first resolves must drop whichever result is no
//! longer wanted; [`SearchSession`] does that with a monotonically increasing
//! intent ticket.

use crate::error::SearchError;
use crate::fetcher::ChunkFetcher;
use crate::search::SearchCursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A navigation request, as produced by the deep-link router or a UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageRequest {
    /// Oldest transactions.
    First,
    /// Newest transactions.
    Last,
    /// Page after the one ending with `anchor`.
    Next { anchor: String },
    /// Page before the one starting with `anchor`.
    Previous { anchor: String },
    /// Page anchored at a specific transaction.
    Around { anchor: String, seek_forward: bool },
}

pub struct SearchSession<F: ChunkFetcher + ?Sized> {
    fetcher: Arc<F>,
    address: String,
    page_size: usize,
    current: Mutex<Option<Arc<SearchCursor>>>,
    intent: AtomicU64,
}

impl<F: ChunkFetcher + ?Sized> SearchSession<F> {
    pub fn new(fetcher: Arc<F>, address: impl Into<String>, page_size: usize) -> Self {
        Self {
            fetcher,
            address: address.into(),
            page_size,
            current: Mutex::new(None),
            intent: AtomicU64::new(0),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Cursor of the most recent navigation that was applied.
    pub fn current(&self) -> Option<Arc<SearchCursor>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve `request` and make it current.
    ///
    /// Returns `Ok(None)` when a newer `navigate` call started while this one
    /// was in flight; its outcome, error or not, is discarded.
    pub async fn navigate(
        &self,
        request: PageRequest,
    ) -> Result<Option<Arc<SearchCursor>>, SearchError> {
        let ticket = self.intent.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.current();
        let fetcher = &*self.fetcher;
        let addr = self.address.as_str();

        let result = match (request, current) {
            (PageRequest::First, _) => {
                SearchCursor::open_first_page(fetcher, addr, self.page_size).await
            }
            (PageRequest::Last, _) => {
                SearchCursor::open_last_page(fetcher, addr, self.page_size).await
            }
            (PageRequest::Next { anchor }, Some(cursor)) => {
                cursor.next_page(fetcher, &anchor).await
            }
            (PageRequest::Next { anchor }, None) => {
                // Rebuild the page ending at the anchor, then step past it
                match SearchCursor::open_around_transaction(
                    fetcher,
                    addr,
                    &anchor,
                    false,
                    self.page_size,
                )
                .await
                {
                    Ok(cursor) => cursor.next_page(fetcher, &anchor).await,
                    Err(e) => Err(e),
                }
            }
            (PageRequest::Previous { anchor }, Some(cursor)) => {
                cursor.previous_page(fetcher, &anchor).await
            }
            (PageRequest::Previous { anchor }, None) => {
                match SearchCursor::open_around_transaction(
                    fetcher,
                    addr,
                    &anchor,
                    true,
                    self.page_size,
                )
                .await
                {
                    Ok(cursor) => cursor.previous_page(fetcher, &anchor).await,
                    Err(e) => Err(e),
                }
            }
            (
                PageRequest::Around {
                    anchor,
                    seek_forward,
                },
                _,
            ) => {
                SearchCursor::open_around_transaction(
                    fetcher,
                    addr,
                    &anchor,
                    seek_forward,
                    self.page_size,
                )
                .await
            }
        };

        let mut slot = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let latest = self.intent.load(Ordering::SeqCst);
        if latest != ticket {
            log::debug!("{addr}: dropping navigation #{ticket}, superseded by #{latest}");
            return Ok(None);
        }

        let cursor = result?;
        *slot = Some(Arc::clone(&cursor));
        Ok(Some(cursor))
    }
}
