use async_trait::async_trait;
use std::time::Duration;

use crate::book::{Book, FetchDiag};

/// Per-exchange order-book fetcher, normalized to the canonical [`Book`]
/// shape. One implementation per venue; adding a venue means adding a new
/// impl of this trait, nothing else.
///
/// Contract: `fetch` never returns `Err` and never panics. Any I/O
/// failure, non-2xx status, per-venue error envelope, or empty book is
/// folded into an empty `Book` plus a non-"ok" `FetchDiag`.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    /// Stable venue identifier used in legs, diagnostics, and the
    /// collector's deterministic venue-name tie-break.
    fn name(&self) -> &'static str;

    /// Maximum depth this venue's API accepts; requested depth is clamped
    /// to this before the request is issued.
    fn max_depth(&self) -> u32;

    /// Fetches the order book for `coin`/USDT, clamping `depth` to
    /// [`VenueAdapter::max_depth`] and aborting once `timeout` elapses.
    async fn fetch(&self, coin: &str, depth: u32, timeout: Duration) -> (Book, FetchDiag);
}
