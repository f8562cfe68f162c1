use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::adapter::VenueAdapter;
use crate::book::{Book, FetchDiag};
use crate::http::{get_json, log_outcome};

#[derive(Debug, Deserialize)]
struct OrderBookResponse {
    asks: Vec<(String, String)>,
    bids: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Gate {
    client: reqwest::Client,
    base_url: String,
}

impl Gate {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, "https://api.gateio.ws".to_string())
    }

    pub fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl VenueAdapter for Gate {
    fn name(&self) -> &'static str {
        "gate"
    }

    fn max_depth(&self) -> u32 {
        200
    }

    async fn fetch(&self, coin: &str, depth: u32, timeout: Duration) -> (Book, FetchDiag) {
        let start = Instant::now();
        let pair = format!("{}_USDT", coin.to_uppercase());
        let limit = depth.min(self.max_depth());
        let url = format!(
            "{}/api/v4/spot/order_book?currency_pair={}&limit={}",
            self.base_url, pair, limit
        );

        match get_json::<OrderBookResponse>(&self.client, &url, timeout).await {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_order_book_response() {
        let json = r#"{"id":"1","asks":[["100.0","1.0"]],"bids":[["99.0","2.0"]]}"#;
        let raw: OrderBookResponse = serde_json::from_str(json).unwrap();
        let book = Book::from_raw_str_levels("gate", &raw.asks, &raw.bids);
        assert_eq!(book.asks[0].price, 100.0);
    }
}
