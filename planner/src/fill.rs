use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::HashMap;

use venues::Book;

/// Tolerance on "is there still budget/quantity left" comparisons, so
/// floating-point rounding never causes an extra zero-sized partial fill
/// or an infinite loop. Budgets (USDT) use `BUDGET_EPS`; coin quantities
/// use the tighter `QTY_EPS`.
const BUDGET_EPS: f64 = 1e-9;
const QTY_EPS: f64 = 1e-12;

/// Transient heap entry: one venue's current best unconsumed level.
/// Owned entirely by one Fill Engine invocation.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    venue_idx: usize,
    level_idx: usize,
    price: f64,
    qty: f64,
}

/// Min-heap ordering by price (lowest ask wins) for the buy side.
#[derive(Debug, Clone, Copy)]
struct MinEntry(HeapEntry);

impl PartialEq for MinEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0.price == other.0.price
    }
}
impl Eq for MinEntry {}
impl PartialOrd for MinEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for MinEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) pops the smallest price.
        other.0.price.total_cmp(&self.0.price)
    }
}

/// Max-heap ordering by price (highest bid wins) for the sell side.
#[derive(Debug, Clone, Copy)]
struct MaxEntry(HeapEntry);

impl PartialEq for MaxEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0.price == other.0.price
    }
}
impl Eq for MaxEntry {}
impl PartialOrd for MaxEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for MaxEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.price.total_cmp(&other.0.price)
    }
}

/// Outcome of a single Fill Engine invocation: quantity contributed per
/// venue (insertion order preserved for callers that need it), the
/// consideration-weighted average price, and the consumption total
/// (USDT spent for buy, USDT proceeds for sell).
#[derive(Debug, Clone, Default)]
pub struct FillOutcome {
    pub per_venue_qty: Vec<(String, f64)>,
    pub vwap: f64,
    pub total: f64,
}

/// k-way greedy walk over the merged ask ladder across `books`, spending
/// up to `budget_usdt`. Never materializes the full merged ladder — pops
/// the cheapest unconsumed level from a binary heap one at a time.
pub fn buy_usd(books: &[Book], budget_usdt: f64) -> FillOutcome {
    let mut heap = BinaryHeap::new();
    for (venue_idx, book) in books.iter().enumerate() {
        if let Some(level) = book.asks.first() {
            heap.push(MinEntry(HeapEntry {
                venue_idx,
                level_idx: 0,
                price: level.price,
                qty: level.quantity,
            }));
        }
    }

    let mut per_venue: HashMap<usize, f64> = HashMap::new();
    let mut order: Vec<usize> = Vec::new();
    let mut spent = 0.0;
    let mut got = 0.0;
    let mut remaining = budget_usdt;

    while remaining > BUDGET_EPS {
        let Some(MinEntry(entry)) = heap.pop() else {
            break;
        };
        let level_cap = entry.price * entry.qty;

        if remaining >= level_cap {
            *per_venue.entry(entry.venue_idx).or_insert_with(|| {
                order.push(entry.venue_idx);
                0.0
            }) += entry.qty;
            spent += level_cap;
            got += entry.qty;
            remaining -= level_cap;

            if let Some(next) = books[entry.venue_idx].asks.get(entry.level_idx + 1) {
                heap.push(MinEntry(HeapEntry {
                    venue_idx: entry.venue_idx,
                    level_idx: entry.level_idx + 1,
                    price: next.price,
                    qty: next.quantity,
                }));
            }
        } else {
            let partial_qty = remaining / entry.price;
            *per_venue.entry(entry.venue_idx).or_insert_with(|| {
                order.push(entry.venue_idx);
                0.0
            }) += partial_qty;
            spent += remaining;
            got += partial_qty;
            remaining = 0.0;
        }
    }

    let vwap = if got > 0.0 { spent / got } else { 0.0 };
    let per_venue_qty = order
        .into_iter()
        .map(|idx| (books[idx].venue.clone(), per_venue[&idx]))
        .collect();

    FillOutcome {
        per_venue_qty,
        vwap,
        total: spent,
    }
}

/// Dual of [`buy_usd`]: walks the merged bid ladder across `books`,
/// selling up to `amount_coin` units of base.
pub fn sell_coin(books: &[Book], amount_coin: f64) -> FillOutcome {
    let mut heap = BinaryHeap::new();
    for (venue_idx, book) in books.iter().enumerate() {
        if let Some(level) = book.bids.first() {
            heap.push(MaxEntry(HeapEntry {
                venue_idx,
                level_idx: 0,
                price: level.price,
                qty: level.quantity,
            }));
        }
    }

    let mut per_venue: HashMap<usize, f64> = HashMap::new();
    let mut order: Vec<usize> = Vec::new();
    let mut proceeds = 0.0;
    let mut sold = 0.0;
    let mut remaining = amount_coin;

    while remaining > QTY_EPS {
        let Some(MaxEntry(entry)) = heap.pop() else {
            break;
        };

        if remaining >= entry.qty {
            *per_venue.entry(entry.venue_idx).or_insert_with(|| {
                order.push(entry.venue_idx);
                0.0
            }) += entry.qty;
            proceeds += entry.price * entry.qty;
            sold += entry.qty;
            remaining -= entry.qty;

            if let Some(next) = books[entry.venue_idx].bids.get(entry.level_idx + 1) {
                heap.push(MaxEntry(HeapEntry {
                    venue_idx: entry.venue_idx,
                    level_idx: entry.level_idx + 1,
                    price: next.price,
                    qty: next.quantity,
                }));
            }
        } else {
            *per_venue.entry(entry.venue_idx).or_insert_with(|| {
                order.push(entry.venue_idx);
                0.0
            }) += remaining;
            proceeds += entry.price * remaining;
            sold += remaining;
            remaining = 0.0;
        }
    }

    let vwap = if sold > 0.0 { proceeds / sold } else { 0.0 };
    let per_venue_qty = order
        .into_iter()
        .map(|idx| (books[idx].venue.clone(), per_venue[&idx]))
        .collect();

    FillOutcome {
        per_venue_qty,
        vwap,
        total: proceeds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venues::Level;

    fn book(venue: &str, asks: &[(f64, f64)]) -> Book {
        Book::from_levels(
            venue,
            asks.iter().map(|(p, q)| Level::new(*p, *q)).collect(),
            vec![],
        )
    }

    fn bid_book(venue: &str, bids: &[(f64, f64)]) -> Book {
        Book::from_levels(
            venue,
            vec![],
            bids.iter().map(|(p, q)| Level::new(*p, *q)).collect(),
        )
    }

    #[test]
    fn s1_optimal_buy_two_venues_one_partial() {
        let books = vec![
            book("EX1", &[(100.0, 1.0)]),
            book("EX2", &[(99.0, 2.0), (101.0, 5.0)]),
        ];
        let out = buy_usd(&books, 250.0);
        assert!((out.total - 250.0).abs() < 1e-6);
        let by_venue: HashMap<_, _> = out.per_venue_qty.into_iter().collect();
        assert!((by_venue["EX2"] - (2.0 + (250.0 - 99.0 * 2.0 - 100.0) / 101.0)).abs() < 1e-9);
        assert!((by_venue["EX1"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn s4_sell_single_venue_depth() {
        let books = vec![bid_book("EX1", &[(100.0, 1.0), (90.0, 10.0)])];
        let out = sell_coin(&books, 0.4);
        assert_eq!(out.per_venue_qty.len(), 1);
        assert!((out.per_venue_qty[0].1 - 0.4).abs() < 1e-12);
        assert!((out.total - 40.0).abs() < 1e-9);
        assert!((out.vwap - 100.0).abs() < 1e-9);
    }

    #[test]
    fn at_most_one_partial_and_it_is_last() {
        let books = vec![book("EX1", &[(100.0, 1.0), (101.0, 1.0), (102.0, 1.0)])];
        // Budget lands mid-third-level: two whole levels then one partial.
        let out = buy_usd(&books, 100.0 + 101.0 + 50.0);
        assert!((out.total - (100.0 + 101.0 + 50.0)).abs() < 1e-6);
    }

    #[test]
    fn empty_books_yield_zero_vwap() {
        let out = buy_usd(&[], 100.0);
        assert_eq!(out.vwap, 0.0);
        assert_eq!(out.total, 0.0);
        assert!(out.per_venue_qty.is_empty());
    }

    #[test]
    fn exhausted_depth_stops_without_looping() {
        let books = vec![book("EX1", &[(100.0, 1.0)])];
        let out = buy_usd(&books, 1_000_000.0);
        assert!((out.total - 100.0).abs() < 1e-9);
        assert!((out.per_venue_qty[0].1 - 1.0).abs() < 1e-9);
    }
}
