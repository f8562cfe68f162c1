use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::adapter::VenueAdapter;
use crate::book::{Book, FetchDiag, Level};
use crate::error::VenueError;
use crate::http::{get_json, log_outcome};

/// HTX's depth endpoint returns levels as `[price, qty]` floats, unlike
/// every other venue in this crate, which use string numerics.
#[derive(Debug, Deserialize)]
struct Tick {
    asks: Vec<(f64, f64)>,
    bids: Vec<(f64, f64)>,
}

#[derive(Debug, Deserialize)]
struct DepthResponse {
    status: String,
    tick: Tick,
}

#[derive(Debug, Clone)]
pub struct Htx {
    client: reqwest::Client,
    base_url: String,
}

impl Htx {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, "https://api.huobi.pro".to_string())
    }

    pub fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

fn float_levels(raw: &[(f64, f64)]) -> Vec<Level> {
    raw.iter()
        .filter(|(p, q)| *p > 0.0 && *q > 0.0 && p.is_finite() && q.is_finite())
        .map(|(p, q)| Level::new(*p, *q))
        .collect()
}

#[async_trait]
impl VenueAdapter for Htx {
    fn name(&self) -> &'static str {
        "htx"
    }

    fn max_depth(&self) -> u32 {
        200
    }

    async fn fetch(&self, coin: &str, depth: u32, timeout: Duration) -> (Book, FetchDiag) {
        let start = Instant::now();
        let symbol = coin.to_lowercase() + "usdt";
        // HTX's step0 depth endpoint ignores a depth parameter and always
        // returns its full merged book; we clamp after the fact.
        let limit = depth.min(self.max_depth());
        let url = format!("{}/market/depth?symbol={}&type=step0", self.base_url, symbol);

        let outcome: Result<Book, VenueError> = async {
            let raw = get_json::<DepthResponse>(&self.client, &url, timeout).await?;
            if raw.status != "ok" {
                return Err(VenueError::Api(format!("status={}", raw.status)));
            }
            let mut book = Book::from_levels(self.name(), float_levels(&raw.tick.asks), float_levels(&raw.tick.bids));
            book.asks.truncate(limit as usize);
            book.bids.truncate(limit as usize);
            Ok(book)
        }
        .await;

        match outcome {
            Ok(book) if book.asks.is_empty() && book.bids.is_empty() => {
                let diag = FetchDiag::empty(self.name());
                log_outcome(self.name(), coin, start.elapsed(), &diag.status);
                (book, diag)
            }
            Ok(book) => {
                let diag = FetchDiag::ok(self.name());
                log_outcome(self.name(), coin, start.elapsed(), &diag.status);
                (book, diag)
            }
            Err(e) => {
                let diag = if matches!(e, VenueError::Timeout) {
                    FetchDiag::timeout(self.name())
                } else {
                    FetchDiag::error(self.name(), e.diag_reason())
                };
                log_outcome(self.name(), coin, start.elapsed(), &diag.status);
                (Book::empty(self.name()), diag)
            }
        }
    }
}
