use venues::Book;

use crate::fill::{buy_usd, sell_coin, FillOutcome};
use crate::types::{Direction, Leg, Scenario, StrategyFill};

fn fill(books: &[Book], amount: f64, direction: Direction) -> FillOutcome {
    match direction {
        Direction::Buy => buy_usd(books, amount),
        Direction::Sell => sell_coin(books, amount),
    }
}

/// Runs a single book through the Fill Engine with the full amount for
/// each eligible book, and keeps the one with the best effective price.
/// Ties broken by larger filled quantity (spec §4.4.1).
fn best_single(books: &[Book], amount: f64, direction: Direction) -> StrategyFill {
    let mut best: Option<(FillOutcome, f64)> = None;

    for book in books {
        let outcome = fill(std::slice::from_ref(book), amount, direction);
        let filled: f64 = outcome.per_venue_qty.iter().map(|(_, q)| q).sum();
        if filled <= 0.0 {
            continue;
        }
        let better = match &best {
            None => true,
            Some((cur, cur_qty)) => match direction {
                Direction::Buy => {
                    outcome.vwap < cur.vwap || (outcome.vwap == cur.vwap && filled > *cur_qty)
                }
                Direction::Sell => {
                    outcome.vwap > cur.vwap || (outcome.vwap == cur.vwap && filled > *cur_qty)
                }
            },
        };
        if better {
            best = Some((outcome, filled));
        }
    }

    match best {
        None => StrategyFill::default(),
        Some((outcome, filled)) => {
            let leg_venue = outcome
                .per_venue_qty
                .first()
                .map(|(v, _)| v.clone())
                .unwrap_or_default();
            let legs = vec![Leg {
                exchange: leg_venue,
                amount: filled,
                price: outcome.vwap,
            }];
            let unspent = match direction {
                Direction::Buy => (amount - outcome.total).max(0.0),
                Direction::Sell => 0.0,
            };
            StrategyFill {
                legs,
                vwap: outcome.vwap,
                total: outcome.total,
                filled_qty: filled,
                unspent,
            }
        }
    }
}

/// Splits `amount` equally across every eligible book, runs the Fill
/// Engine on each share independently, and concatenates the resulting
/// legs in ascending venue-name order (spec §4.4.2).
fn equal_split(books: &[Book], amount: f64, direction: Direction) -> StrategyFill {
    if books.is_empty() {
        return StrategyFill::default();
    }
    let share = amount / books.len() as f64;

    let mut per_venue: Vec<(String, FillOutcome)> = books
        .iter()
        .map(|b| (b.venue.clone(), fill(std::slice::from_ref(b), share, direction)))
        .collect();
    per_venue.sort_by(|a, b| a.0.cmp(&b.0));

    let mut legs = Vec::new();
    let mut total_qty = 0.0;
    let mut total_spend = 0.0;
    let mut unspent = 0.0;

    for (venue, outcome) in &per_venue {
        let qty: f64 = outcome.per_venue_qty.iter().map(|(_, q)| q).sum();
        if qty > 0.0 {
            legs.push(Leg {
                exchange: venue.clone(),
                amount: qty,
                price: outcome.vwap,
            });
        }
        total_qty += qty;
        total_spend += outcome.total;
        if direction == Direction::Buy {
            unspent += (share - outcome.total).max(0.0);
        }
    }

    let vwap = if total_qty > 0.0 { total_spend / total_qty } else { 0.0 };

    StrategyFill {
        legs,
        vwap,
        total: total_spend,
        filled_qty: total_qty,
        unspent,
    }
}

/// Builds legs priced at each contributing venue's own top-of-book,
/// rather than the blended VWAP the Fill Engine reports for the whole
/// fill. Shared by the `optimal` strategy and the Router's route legs.
pub(crate) fn cosmetic_legs(books: &[Book], outcome: &FillOutcome, direction: Direction) -> Vec<Leg> {
    outcome
        .per_venue_qty
        .iter()
        .filter(|(_, q)| *q > 0.0)
        .map(|(venue, qty)| {
            let top = books
                .iter()
                .find(|b| &b.venue == venue)
                .and_then(|b| match direction {
                    Direction::Buy => b.best_ask(),
                    Direction::Sell => b.best_bid(),
                })
                .map(|l| l.price)
                .unwrap_or(outcome.vwap);
            Leg {
                exchange: venue.clone(),
                amount: *qty,
                price: top,
            }
        })
        .collect()
}

/// Single k-way Fill Engine run across all eligible books with the full
/// amount; one leg per venue with positive fill (spec §4.4.3).
fn optimal(books: &[Book], amount: f64, direction: Direction) -> StrategyFill {
    let outcome = fill(books, amount, direction);
    let total_qty: f64 = outcome.per_venue_qty.iter().map(|(_, q)| q).sum();
    let legs = cosmetic_legs(books, &outcome, direction);

    let unspent = match direction {
        Direction::Buy => (amount - outcome.total).max(0.0),
        Direction::Sell => 0.0,
    };

    StrategyFill {
        legs,
        vwap: outcome.vwap,
        total: outcome.total,
        filled_qty: total_qty,
        unspent,
    }
}

/// Runs `scenario` over `books` for `amount` in the given `direction`.
pub fn run(scenario: Scenario, books: &[Book], amount: f64, direction: Direction) -> StrategyFill {
    match scenario {
        Scenario::BestSingle => best_single(books, amount, direction),
        Scenario::EqualSplit => equal_split(books, amount, direction),
        Scenario::Optimal => optimal(books, amount, direction),
    }
}
