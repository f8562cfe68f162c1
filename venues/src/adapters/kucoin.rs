use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::adapter::VenueAdapter;
use crate::book::{Book, FetchDiag};
use crate::error::VenueError;
use crate::http::{get_json, log_outcome};

#[derive(Debug, Deserialize)]
struct Level2Data {
    asks: Vec<(String, String)>,
    bids: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct Level2Response {
    code: String,
    data: Level2Data,
}

#[derive(Debug, Clone)]
pub struct Kucoin {
    client: reqwest::Client,
    base_url: String,
}

impl Kucoin {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, "https://api.kucoin.com".to_string())
    }

    pub fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl VenueAdapter for Kucoin {
    fn name(&self) -> &'static str {
        "kucoin"
    }

    fn max_depth(&self) -> u32 {
        100
    }

    async fn fetch(&self, coin: &str, depth: u32, timeout: Duration) -> (Book, FetchDiag) {
        let start = Instant::now();
        let symbol = format!("{}-USDT", coin.to_uppercase());
        let n = depth.min(self.max_depth());
        let url = format!(
            "{}/api/v1/market/orderbook/level2_{}?symbol={}",
            self.base_url, n, symbol
        );

        let outcome: Result<Book, VenueError> = async {
            let raw = get_json::<Level2Response>(&self.client, &url, timeout).await?;
            if raw.code != "200000" {
                return Err(VenueError::Api(format!("code={}", raw.code)));
            }
            let mut book = Book::from_raw_str_levels(self.name(), &raw.data.asks, &raw.data.bids);
            book.asks.truncate(n as usize);
            book.bids.truncate(n as usize);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_200000_code() {
        let json = r#"{"code":"400100","data":{"asks":[],"bids":[]}}"#;
        let raw: Level2Response = serde_json::from_str(json).unwrap();
        assert_ne!(raw.code, "200000");
    }
}
