use thiserror::Error;

/// Internal error type for a single adapter fetch.
///
/// This never escapes [`crate::VenueAdapter::fetch`] as a `Result::Err` —
/// adapters are contractually required to turn every variant into an empty
/// [`crate::Book`] plus a [`crate::FetchDiag`]. It exists so adapter code
/// can use `?` internally instead of threading status strings by hand.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VenueError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("api error: {0}")]
    Api(String),

    #[error("timeout")]
    Timeout,
}

impl VenueError {
    /// Short reason string suitable for a [`crate::FetchDiag`].
    pub fn diag_reason(&self) -> String {
        match self {
            VenueError::Http(e) => format!("http: {e}"),
            VenueError::Decode(e) => format!("decode: {e}"),
            VenueError::Api(msg) => msg.clone(),
            VenueError::Timeout => "timeout".to_string(),
        }
    }
}
