use thiserror::Error;

/// Error taxonomy classes 1-3 from spec §7. Classes 4 (venue-transient)
/// and 5 (server) are handled inside `venues` and the HTTP layer
/// respectively and never surface as a `PlanError`.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("{0}")]
    Validation(String),

    #[error("no order books ({0})")]
    NoLiquidity(String),

    #[error("insufficient depth on {0} leg")]
    InsufficientDepth(&'static str),
}
