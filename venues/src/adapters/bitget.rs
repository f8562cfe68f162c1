use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::adapter::VenueAdapter;
use crate::book::{Book, FetchDiag};
use crate::error::VenueError;
use crate::http::{get_json, log_outcome};

#[derive(Debug, Deserialize)]
struct DepthData {
    asks: Vec<(String, String)>,
    bids: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct DepthResponse {
    code: String,
    data: DepthData,
}

#[derive(Debug, Clone)]
pub struct Bitget {
    client: reqwest::Client,
    base_url: String,
}

impl Bitget {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, "https://api.bitget.com".to_string())
    }

    pub fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl VenueAdapter for Bitget {
    fn name(&self) -> &'static str {
        "bitget"
    }

    fn max_depth(&self) -> u32 {
        100
    }

    async fn fetch(&self, coin: &str, depth: u32, timeout: Duration) -> (Book, FetchDiag) {
        let start = Instant::now();
        let symbol = format!("{}USDT", coin.to_uppercase());
        let limit = depth.min(self.max_depth());
        let url = format!(
            "{}/api/spot/v1/market/depth?symbol={}&limit={}",
            self.base_url, symbol, limit
        );

        let outcome: Result<Book, VenueError> = async {
            let raw = get_json::<DepthResponse>(&self.client, &url, timeout).await?;
            if raw.code != "00000" {
                return Err(VenueError::Api(format!("code={}", raw.code)));
            }
            let mut book = Book::from_raw_str_levels(self.name(), &raw.data.asks, &raw.data.bids);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_00000_code() {
        let json = r#"{"code":"40001","data":{"asks":[],"bids":[]}}"#;
        let raw: DepthResponse = serde_json::from_str(json).unwrap();
        assert_ne!(raw.code, "00000");
    }
}
