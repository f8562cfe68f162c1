use std::sync::Arc;

use chrono::Local;
use tracing::info_span;
use tracing::Instrument;
use venues::VenueAdapter;

use crate::collector::{collect, CollectorConfig};
use crate::error::PlanError;
use crate::fill::{buy_usd, sell_coin};
use crate::strategy::{self, cosmetic_legs};
use crate::types::{round_cents, Direction, Leg, PlanRequest, PlanResult, Scenario};

const USDT: &str = "USDT";

struct Validated {
    base: String,
    quote: String,
    amount: f64,
    scenario: Scenario,
}

fn validate(req: &PlanRequest) -> Result<Validated, PlanError> {
    let base = req.base.trim().to_uppercase();
    let quote = req.quote.trim().to_uppercase();

    let is_symbol = |s: &str| s.len() >= 3 && s.len() <= 10 && s.chars().all(|c| c.is_ascii_alphabetic());
    if !is_symbol(&base) {
        return Err(PlanError::Validation(format!("invalid base symbol: {}", req.base)));
    }
    if !is_symbol(&quote) {
        return Err(PlanError::Validation(format!("invalid quote symbol: {}", req.quote)));
    }
    if base == quote {
        return Err(PlanError::Validation("base and quote must differ".to_string()));
    }
    if !(req.amount > 0.0) || !req.amount.is_finite() {
        return Err(PlanError::Validation("amount must be positive".to_string()));
    }
    let scenario = Scenario::parse(req.scenario.trim())
        .ok_or_else(|| PlanError::Validation(format!("unknown scenario: {}", req.scenario)))?;

    Ok(Validated {
        base,
        quote,
        amount: req.amount,
        scenario,
    })
}

fn format_generated_at() -> String {
    Local::now().format("%H:%M %d.%m.%Y").to_string()
}

fn legs_rounded(legs: Vec<Leg>) -> Vec<Leg> {
    legs.into_iter()
        .filter(|l| l.amount > 0.0)
        .map(|l| Leg {
            price: round_cents(l.price),
            ..l
        })
        .collect()
}

/// Classifies and executes a Plan request per spec §4.5.
pub async fn plan(
    request: PlanRequest,
    registry: &[Arc<dyn VenueAdapter>],
    config: CollectorConfig,
) -> Result<PlanResult, PlanError> {
    let validated = validate(&request)?;

    let span = info_span!(
        "plan",
        base = %validated.base,
        quote = %validated.quote,
        amount = validated.amount,
        scenario = validated.scenario.as_str()
    );

    async move {
        if validated.quote == USDT && validated.base != USDT {
            plan_buy(validated, registry, config).await
        } else if validated.base == USDT && validated.quote != USDT {
            plan_sell(validated, registry, config).await
        } else {
            plan_route(validated, registry, config).await
        }
    }
    .instrument(span)
    .await
}

async fn plan_buy(
    v: Validated,
    registry: &[Arc<dyn VenueAdapter>],
    config: CollectorConfig,
) -> Result<PlanResult, PlanError> {
    let (books, diags) = collect(registry, &v.base, Direction::Buy, config).await;
    if books.is_empty() {
        let joined = diags.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ");
        return Err(PlanError::NoLiquidity(joined));
    }

    let result = strategy::run(v.scenario, &books, v.amount, Direction::Buy);

    Ok(PlanResult {
        base: v.base,
        quote: v.quote,
        amount: v.amount,
        scenario: v.scenario.as_str().to_string(),
        vwap: round_cents(result.vwap),
        total_cost: round_cents(result.total),
        unspent: round_cents(result.unspent),
        legs: legs_rounded(result.legs),
        generated_at: format_generated_at(),
        diagnostics: diags.iter().map(|d| d.to_string()).collect(),
    })
}

async fn plan_sell(
    v: Validated,
    registry: &[Arc<dyn VenueAdapter>],
    config: CollectorConfig,
) -> Result<PlanResult, PlanError> {
    let (books, diags) = collect(registry, &v.quote, Direction::Sell, config).await;
    if books.is_empty() {
        let joined = diags.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ");
        return Err(PlanError::NoLiquidity(joined));
    }

    let result = strategy::run(v.scenario, &books, v.amount, Direction::Sell);
    let sold: f64 = result.filled_qty;
    let unspent = (v.amount - sold).max(0.0);

    Ok(PlanResult {
        base: v.base,
        quote: v.quote,
        amount: v.amount,
        scenario: v.scenario.as_str().to_string(),
        vwap: round_cents(result.vwap),
        total_cost: round_cents(result.total),
        unspent: round_cents(unspent),
        legs: legs_rounded(result.legs),
        generated_at: format_generated_at(),
        diagnostics: diags.iter().map(|d| d.to_string()).collect(),
    })
}

async fn plan_route(
    v: Validated,
    registry: &[Arc<dyn VenueAdapter>],
    config: CollectorConfig,
) -> Result<PlanResult, PlanError> {
    let (quote_fut, base_fut) = tokio::join!(
        collect(registry, &v.quote, Direction::Sell, config),
        collect(registry, &v.base, Direction::Buy, config),
    );
    let (quote_books, quote_diags) = quote_fut;
    let (base_books, base_diags) = base_fut;

    let mut diagnostics: Vec<String> = quote_diags.iter().map(|d| d.to_string()).collect();
    diagnostics.extend(base_diags.iter().map(|d| d.to_string()));

    if quote_books.is_empty() {
        let joined = quote_diags.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ");
        return Err(PlanError::NoLiquidity(joined));
    }

    let sell_outcome = sell_coin(&quote_books, v.amount);
    let sold_quote: f64 = sell_outcome.per_venue_qty.iter().map(|(_, q)| q).sum();
    let usd_proceeds = sell_outcome.total;
    if usd_proceeds <= 0.0 || sold_quote <= 0.0 {
        return Err(PlanError::InsufficientDepth("QUOTE->USDT"));
    }

    if base_books.is_empty() {
        let joined = base_diags.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ");
        return Err(PlanError::NoLiquidity(joined));
    }

    let buy_outcome = buy_usd(&base_books, usd_proceeds);
    let got_base: f64 = buy_outcome.per_venue_qty.iter().map(|(_, q)| q).sum();
    if got_base <= 0.0 {
        return Err(PlanError::InsufficientDepth("USDT->BASE"));
    }

    let mut legs = cosmetic_legs(&quote_books, &sell_outcome, Direction::Sell);
    legs.extend(cosmetic_legs(&base_books, &buy_outcome, Direction::Buy));

    let vwap = sold_quote / got_base;
    let unspent = (v.amount - sold_quote).max(0.0);

    Ok(PlanResult {
        base: v.base,
        quote: v.quote,
        amount: v.amount,
        scenario: v.scenario.as_str().to_string(),
        vwap: round_cents(vwap),
        total_cost: round_cents(sold_quote),
        unspent: round_cents(unspent),
        legs: legs_rounded(legs),
        generated_at: format_generated_at(),
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_identical_base_and_quote() {
        let req = PlanRequest {
            base: "BTC".to_string(),
            quote: "btc".to_string(),
            amount: 10.0,
            scenario: "".to_string(),
        };
        assert!(matches!(validate(&req), Err(PlanError::Validation(_))));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let req = PlanRequest {
            base: "BTC".to_string(),
            quote: "USDT".to_string(),
            amount: 0.0,
            scenario: "".to_string(),
        };
        assert!(matches!(validate(&req), Err(PlanError::Validation(_))));
    }

    #[test]
    fn defaults_missing_scenario_to_optimal() {
        let req = PlanRequest {
            base: "BTC".to_string(),
            quote: "USDT".to_string(),
            amount: 10.0,
            scenario: "".to_string(),
        };
        let v = validate(&req).unwrap();
        assert_eq!(v.scenario, Scenario::Optimal);
    }

    #[test]
    fn rejects_unknown_scenario() {
        let req = PlanRequest {
            base: "BTC".to_string(),
            quote: "USDT".to_string(),
            amount: 10.0,
            scenario: "yolo".to_string(),
        };
        assert!(matches!(validate(&req), Err(PlanError::Validation(_))));
    }
}
