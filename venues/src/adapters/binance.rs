use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::adapter::VenueAdapter;
use crate::book::{Book, FetchDiag};
use crate::http::{get_json, log_outcome};

/// `GET /api/v3/depth` — see
/// <https://developers.binance.com/docs/binance-spot-api-docs/rest-api/public-api-endpoints#order-book>
#[derive(Debug, Deserialize)]
struct DepthResponse {
    asks: Vec<(String, String)>,
    bids: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Binance {
    client: reqwest::Client,
    base_url: String,
}

impl Binance {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, "https://api.binance.com".to_string())
    }

    pub fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl VenueAdapter for Binance {
    fn name(&self) -> &'static str {
        "binance"
    }

    fn max_depth(&self) -> u32 {
        5000
    }

    async fn fetch(&self, coin: &str, depth: u32, timeout: Duration) -> (Book, FetchDiag) {
        let start = Instant::now();
        let symbol = format!("{}USDT", coin.to_uppercase());
        let limit = depth.min(self.max_depth());
        let url = format!("{}/api/v3/depth?symbol={}&limit={}", self.base_url, symbol, limit);

        match get_json::<DepthResponse>(&self.client, &url, timeout).await {
            Ok(raw) => {
                let mut book = Book::from_raw_str_levels(self.name(), &raw.asks, &raw.bids);
                book.asks.truncate(limit as usize);
                book.bids.truncate(limit as usize);
                let diag = if book.asks.is_empty() && book.bids.is_empty() {
                    FetchDiag::empty(self.name())
                } else {
                    FetchDiag::ok(self.name())
                };
                log_outcome(self.name(), coin, start.elapsed(), &diag.status);
                (book, diag)
            }
            Err(e) => {
                let diag = if matches!(e, crate::error::VenueError::Timeout) {
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
