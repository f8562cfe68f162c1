//! k-way greedy fill engine, the three named strategies, and the
//! buy/sell/route classifier that composes them into a full execution
//! plan.

mod collector;
mod error;
mod fill;
mod router;
mod strategy;
mod types;

pub use collector::{collect, CollectorConfig};
pub use error::PlanError;
pub use fill::{buy_usd, sell_coin, FillOutcome};
pub use router::plan;
pub use types::{round_cents, Direction, Leg, PlanRequest, PlanResult, Scenario, StrategyFill};
