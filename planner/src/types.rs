use serde::{Deserialize, Serialize};

/// Which side of the book a fill consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

/// The three named strategies from spec §4.4, modeled as a closed set
/// rather than an open-ended trait — the set is intrinsically small.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    BestSingle,
    EqualSplit,
    Optimal,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::BestSingle => "best_single",
            Scenario::EqualSplit => "equal_split",
            Scenario::Optimal => "optimal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => Some(Scenario::Optimal),
            "best_single" => Some(Scenario::BestSingle),
            "equal_split" => Some(Scenario::EqualSplit),
            "optimal" => Some(Scenario::Optimal),
            _ => None,
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::Optimal
    }
}

/// One venue's portion of an execution plan.
#[derive(Debug, Clone, Serialize)]
pub struct Leg {
    pub exchange: String,
    pub amount: f64,
    pub price: f64,
}

/// The result of a single Fill Engine invocation over one or more books.
#[derive(Debug, Clone, Default)]
pub struct StrategyFill {
    pub legs: Vec<Leg>,
    pub vwap: f64,
    pub total: f64,
    pub filled_qty: f64,
    pub unspent: f64,
}

/// A validated, classified plan request.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub base: String,
    pub quote: String,
    pub amount: f64,
    #[serde(default)]
    pub scenario: String,
}

/// Final response envelope (spec §6).
#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    pub base: String,
    pub quote: String,
    pub amount: f64,
    pub scenario: String,
    pub vwap: f64,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
    pub unspent: f64,
    pub legs: Vec<Leg>,
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

pub fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
