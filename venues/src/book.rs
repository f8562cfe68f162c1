use serde::Serialize;

/// One (price, quantity) point of a venue's ladder.
///
/// `price` and `quantity` are always strictly positive; adapters drop
/// any level that fails that check before it ever reaches a `Book`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Level {
    pub price: f64,
    pub quantity: f64,
}

impl Level {
    pub fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }

    pub fn notional(&self) -> f64 {
        self.price * self.quantity
    }
}

/// A single venue's order book snapshot: asks ascending by price, bids
/// descending. Produced by one fetch, immutable thereafter, and discarded
/// once the request that produced it completes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Book {
    pub venue: String,
    pub asks: Vec<Level>,
    pub bids: Vec<Level>,
}

impl Book {
    pub fn empty(venue: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            asks: Vec::new(),
            bids: Vec::new(),
        }
    }

    pub fn best_ask(&self) -> Option<Level> {
        self.asks.first().copied()
    }

    pub fn best_bid(&self) -> Option<Level> {
        self.bids.first().copied()
    }

    /// Builds a Book from raw (price, qty) string pairs, dropping anything
    /// that fails to parse or is non-positive, then sorting into the
    /// canonical order for its side.
    pub fn from_raw_str_levels(
        venue: impl Into<String>,
        raw_asks: &[(String, String)],
        raw_bids: &[(String, String)],
    ) -> Self {
        let asks = parse_levels(raw_asks.iter().map(|(p, q)| (p.as_str(), q.as_str())));
        let bids = parse_levels(raw_bids.iter().map(|(p, q)| (p.as_str(), q.as_str())));
        Self::from_levels(venue, asks, bids)
    }

    pub fn from_levels(venue: impl Into<String>, mut asks: Vec<Level>, mut bids: Vec<Level>) -> Self {
        asks.sort_by(|a, b| a.price.total_cmp(&b.price));
        bids.sort_by(|a, b| b.price.total_cmp(&a.price));
        Self {
            venue: venue.into(),
            asks,
            bids,
        }
    }
}

/// Parses `(price, qty)` string pairs into `Level`s, dropping anything
/// that fails to parse or is non-positive or non-finite.
pub fn parse_levels<'a, I>(raw: I) -> Vec<Level>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    raw.into_iter()
        .filter_map(|(p, q)| {
            let price: f64 = p.parse().ok()?;
            let qty: f64 = q.parse().ok()?;
            if price > 0.0 && qty > 0.0 && price.is_finite() && qty.is_finite() {
                Some(Level::new(price, qty))
            } else {
                None
            }
        })
        .collect()
}

/// Per-venue fetch outcome, used only for explanation — never for
/// correctness of a plan.
#[derive(Debug, Clone, Serialize)]
pub struct FetchDiag {
    pub venue: String,
    pub status: String,
}

impl FetchDiag {
    pub fn ok(venue: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            status: "ok".to_string(),
        }
    }

    pub fn empty(venue: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            status: "empty".to_string(),
        }
    }

    pub fn timeout(venue: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            status: "timeout".to_string(),
        }
    }

    pub fn error(venue: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            status: reason.into(),
        }
    }
}

impl std::fmt::Display for FetchDiag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.venue, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_unparseable_and_non_positive_levels() {
        let raw_asks = vec![
            ("100.0".to_string(), "1.0".to_string()),
            ("bad".to_string(), "1.0".to_string()),
            ("0".to_string(), "1.0".to_string()),
            ("-5".to_string(), "1.0".to_string()),
            ("50.0".to_string(), "0".to_string()),
        ];
        let book = Book::from_raw_str_levels("test", &raw_asks, &[]);
        assert_eq!(book.asks.len(), 1);
        assert_eq!(book.asks[0].price, 100.0);
    }

    #[test]
    fn sorts_asks_ascending_and_bids_descending() {
        let raw_asks = vec![
            ("102.0".to_string(), "1.0".to_string()),
            ("100.0".to_string(), "1.0".to_string()),
            ("101.0".to_string(), "1.0".to_string()),
        ];
        let raw_bids = vec![
            ("98.0".to_string(), "1.0".to_string()),
            ("99.5".to_string(), "1.0".to_string()),
            ("97.0".to_string(), "1.0".to_string()),
        ];
        let book = Book::from_raw_str_levels("test", &raw_asks, &raw_bids);
        assert_eq!(
            book.asks.iter().map(|l| l.price).collect::<Vec<_>>(),
            vec![100.0, 101.0, 102.0]
        );
        assert_eq!(
            book.bids.iter().map(|l| l.price).collect::<Vec<_>>(),
            vec![99.5, 98.0, 97.0]
        );
    }
}
