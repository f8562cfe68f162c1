use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::info;
use venues::{Book, FetchDiag, VenueAdapter};

use crate::types::Direction;

/// Tuning knobs for a single [`collect`] call.
#[derive(Debug, Clone, Copy)]
pub struct CollectorConfig {
    pub per_call_deadline: Duration,
    pub fan_in_deadline: Duration,
    pub depth: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            per_call_deadline: Duration::from_secs(8),
            fan_in_deadline: Duration::from_secs(3),
            depth: 100,
        }
    }
}

/// Fans out to every adapter in `registry` concurrently, collecting
/// whatever arrives before `config.fan_in_deadline` elapses. Late
/// responses are discarded; a `timeout` diagnostic is recorded for them.
///
/// Books are included only if they carry at least one level on the side
/// `direction` will consume, then sorted ascending by `(best_ask, venue)`
/// for determinism per spec §4.2/§5, regardless of `direction` — the tie
/// break is always by best ask so ordering is stable across Buy and Sell
/// requests for the same venue set.
pub async fn collect(
    registry: &[Arc<dyn VenueAdapter>],
    coin: &str,
    direction: Direction,
    config: CollectorConfig,
) -> (Vec<Book>, Vec<FetchDiag>) {
    let start = Instant::now();
    let (tx, mut rx) = mpsc::channel::<(Book, FetchDiag)>(registry.len().max(1));

    for adapter in registry {
        let adapter = Arc::clone(adapter);
        let coin = coin.to_string();
        let tx = tx.clone();
        let deadline = config.per_call_deadline;
        let depth = config.depth;
        tokio::spawn(async move {
            let (book, diag) = adapter.fetch(&coin, depth, deadline).await;
            let _ = tx.send((book, diag)).await;
        });
    }
    drop(tx);

    let mut books = Vec::new();
    let mut diagnostics = Vec::new();
    let mut reported = std::collections::HashSet::new();
    let deadline = tokio::time::sleep(config.fan_in_deadline);
    tokio::pin!(deadline);

    loop {
        if reported.len() == registry.len() {
            break;
        }
        tokio::select! {
            maybe = rx.recv() => {
                match maybe {
                    Some((book, diag)) => {
                        reported.insert(diag.venue.clone());
                        let usable = match direction {
                            Direction::Buy => !book.asks.is_empty(),
                            Direction::Sell => !book.bids.is_empty(),
                        };
                        if usable {
                            books.push(book);
                        }
                        diagnostics.push(diag);
                    }
                    None => break,
                }
            }
            _ = &mut deadline => break,
        }
    }

    for adapter in registry {
        if !reported.contains(adapter.name()) {
            diagnostics.push(FetchDiag::timeout(adapter.name()));
        }
    }

    books.sort_by(|a, b| {
        let a_ask = a.best_ask().map(|l| l.price).unwrap_or(f64::INFINITY);
        let b_ask = b.best_ask().map(|l| l.price).unwrap_or(f64::INFINITY);
        a_ask.total_cmp(&b_ask).then_with(|| a.venue.cmp(&b.venue))
    });

    info!(
        coin,
        venues_attempted = registry.len(),
        venues_usable = books.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "book collection complete"
    );

    (books, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FakeAdapter {
        name: &'static str,
        book: Book,
        delay: Duration,
    }

    #[async_trait]
    impl VenueAdapter for FakeAdapter {
        fn name(&self) -> &'static str {
            self.name
        }

        fn max_depth(&self) -> u32 {
            100
        }

        async fn fetch(&self, _coin: &str, _depth: u32, _timeout: Duration) -> (Book, FetchDiag) {
            tokio::time::sleep(self.delay).await;
            if self.book.asks.is_empty() && self.book.bids.is_empty() {
                (self.book.clone(), FetchDiag::empty(self.name))
            } else {
                (self.book.clone(), FetchDiag::ok(self.name))
            }
        }
    }

    fn book_with_ask(venue: &str, price: f64) -> Book {
        Book::from_levels(venue, vec![venues::Level::new(price, 1.0)], vec![])
    }

    #[tokio::test]
    async fn sorts_by_best_ask_then_venue() {
        let registry: Vec<Arc<dyn VenueAdapter>> = vec![
            Arc::new(FakeAdapter {
                name: "b",
                book: book_with_ask("b", 100.0),
                delay: Duration::from_millis(0),
            }),
            Arc::new(FakeAdapter {
                name: "a",
                book: book_with_ask("a", 100.0),
                delay: Duration::from_millis(0),
            }),
            Arc::new(FakeAdapter {
                name: "c",
                book: book_with_ask("c", 99.0),
                delay: Duration::from_millis(0),
            }),
        ];
        let (books, diags) = collect(&registry, "BTC", Direction::Buy, CollectorConfig::default()).await;
        assert_eq!(diags.len(), 3);
        assert_eq!(
            books.iter().map(|b| b.venue.as_str()).collect::<Vec<_>>(),
            vec!["c", "a", "b"]
        );
    }

    #[tokio::test]
    async fn slow_adapter_is_reported_as_timeout() {
        static CALLS: AtomicU32 = AtomicU32::new(0);
        CALLS.fetch_add(1, Ordering::SeqCst);

        let registry: Vec<Arc<dyn VenueAdapter>> = vec![
            Arc::new(FakeAdapter {
                name: "slow",
                book: book_with_ask("slow", 100.0),
                delay: Duration::from_millis(200),
            }),
            Arc::new(FakeAdapter {
                name: "fast",
                book: book_with_ask("fast", 100.0),
                delay: Duration::from_millis(0),
            }),
        ];
        let config = CollectorConfig {
            per_call_deadline: Duration::from_secs(8),
            fan_in_deadline: Duration::from_millis(20),
            depth: 100,
        };
        let (books, diags) = collect(&registry, "BTC", Direction::Buy, config).await;
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].venue, "fast");
        assert!(diags.iter().any(|d| d.venue == "slow" && d.status == "timeout"));
    }

    #[tokio::test]
    async fn excludes_books_with_no_usable_side() {
        let registry: Vec<Arc<dyn VenueAdapter>> = vec![Arc::new(FakeAdapter {
            name: "nobids",
            book: book_with_ask("nobids", 100.0),
            delay: Duration::from_millis(0),
        })];
        let (books, _diags) = collect(&registry, "BTC", Direction::Sell, CollectorConfig::default()).await;
        assert!(books.is_empty());
    }
}
