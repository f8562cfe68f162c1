use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::adapter::VenueAdapter;
use crate::book::{Book, FetchDiag};
use crate::error::VenueError;
use crate::http::{get_json, log_outcome};

#[derive(Debug, Deserialize)]
struct OrderbookData {
    #[serde(rename = "a")]
    asks: Vec<(String, String)>,
    #[serde(rename = "b")]
    bids: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct OrderbookResponse {
    #[serde(rename = "retCode")]
    ret_code: i32,
    result: OrderbookData,
}

#[derive(Debug, Clone)]
pub struct Bybit {
    client: reqwest::Client,
    base_url: String,
}

impl Bybit {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, "https://api.bybit.com".to_string())
    }

    pub fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl VenueAdapter for Bybit {
    fn name(&self) -> &'static str {
        "bybit"
    }

    fn max_depth(&self) -> u32 {
        200
    }

    async fn fetch(&self, coin: &str, depth: u32, timeout: Duration) -> (Book, FetchDiag) {
        let start = Instant::now();
        let symbol = format!("{}USDT", coin.to_uppercase());
        let limit = depth.min(self.max_depth());
        let url = format!(
            "{}/v5/market/orderbook?category=spot&symbol={}&limit={}",
            self.base_url, symbol, limit
        );

        let outcome: Result<Book, VenueError> = async {
            let raw = get_json::<OrderbookResponse>(&self.client, &url, timeout).await?;
            if raw.ret_code != 0 {
                return Err(VenueError::Api(format!("retCode={}", raw.ret_code)));
            }
            let mut book = Book::from_raw_str_levels(self.name(), &raw.result.asks, &raw.result.bids);
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
    fn parses_orderbook_response() {
        let json = r#"{"retCode":0,"retMsg":"OK","result":{"s":"BTCUSDT","b":[["65485.47","47.081829"]],"a":[["65557.7","16.606555"]],"ts":1,"u":1,"seq":1,"cts":1},"retExtInfo":{},"time":1}"#;
        let raw: OrderbookResponse = serde_json::from_str(json).unwrap();
        assert_eq!(raw.ret_code, 0);
        let book = Book::from_raw_str_levels("bybit", &raw.result.asks, &raw.result.bids);
        assert_eq!(book.asks[0].price, 65557.7);
        assert_eq!(book.bids[0].price, 65485.47);
    }
}
