use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::adapter::VenueAdapter;
use crate::book::{Book, FetchDiag};
use crate::error::VenueError;
use crate::http::{get_json, log_outcome};

/// `GET /api/v5/market/books` — asks/bids entries are `[price, qty, ...]`
/// with extra fields OKX documents but we don't need.
#[derive(Debug, Deserialize)]
struct BooksData {
    asks: Vec<Vec<String>>,
    bids: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct BooksResponse {
    code: String,
    data: Vec<BooksData>,
}

#[derive(Debug, Clone)]
pub struct Okx {
    client: reqwest::Client,
    base_url: String,
}

impl Okx {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, "https://www.okx.com".to_string())
    }

    pub fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

fn pairs(levels: &[Vec<String>]) -> Vec<(String, String)> {
    levels
        .iter()
        .filter(|l| l.len() >= 2)
        .map(|l| (l[0].clone(), l[1].clone()))
        .collect()
}

#[async_trait]
impl VenueAdapter for Okx {
    fn name(&self) -> &'static str {
        "okx"
    }

    fn max_depth(&self) -> u32 {
        400
    }

    async fn fetch(&self, coin: &str, depth: u32, timeout: Duration) -> (Book, FetchDiag) {
        let start = Instant::now();
        let inst_id = format!("{}-USDT", coin.to_uppercase());
        let sz = depth.min(self.max_depth());
        let url = format!("{}/api/v5/market/books?instId={}&sz={}", self.base_url, inst_id, sz);

        let outcome: Result<Book, VenueError> = async {
            let raw = get_json::<BooksResponse>(&self.client, &url, timeout).await?;
            if raw.code != "0" {
                return Err(VenueError::Api(format!("code={}", raw.code)));
            }
            let first = raw
                .data
                .first()
                .ok_or_else(|| VenueError::Api("empty data".to_string()))?;
            let asks = pairs(&first.asks);
            let bids = pairs(&first.bids);
            let mut book = Book::from_raw_str_levels(self.name(), &asks, &bids);
            book.asks.truncate(sz as usize);
            book.bids.truncate(sz as usize);
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
    fn rejects_non_zero_code() {
        let json = r#"{"code":"1","msg":"bad","data":[]}"#;
        let raw: BooksResponse = serde_json::from_str(json).unwrap();
        assert_ne!(raw.code, "0");
    }

    #[test]
    fn parses_books_response() {
        let json = r#"{"code":"0","msg":"","data":[{"asks":[["100.0","1.0","0","1"]],"bids":[["99.0","2.0","0","1"]],"ts":"1"}]}"#;
        let raw: BooksResponse = serde_json::from_str(json).unwrap();
        let asks = pairs(&raw.data[0].asks);
        assert_eq!(asks[0], ("100.0".to_string(), "1.0".to_string()));
    }
}
