use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::VenueError;

pub const USER_AGENT: &str = concat!("spotrouter/", env!("CARGO_PKG_VERSION"));

/// GETs `url` and decodes the JSON body into `T`, retrying once with a
/// short backoff on transient failure (connect error, non-2xx, decode
/// failure), budgeted against the caller's overall `timeout`.
pub async fn get_json<T>(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<T, VenueError>
where
    T: serde::de::DeserializeOwned,
{
    let deadline = Instant::now() + timeout;
    let mut last_err = None;

    for attempt in 0..2 {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(last_err.unwrap_or(VenueError::Timeout));
        }

        let sent = client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(remaining)
            .send()
            .await;

        let result = match sent {
            Ok(resp) if !resp.status().is_success() => {
                Err(VenueError::Api(format!("http {}", resp.status())))
            }
            Ok(resp) => match resp.bytes().await {
                Ok(bytes) => serde_json::from_slice::<T>(&bytes).map_err(VenueError::from),
                Err(e) if e.is_timeout() => Err(VenueError::Timeout),
                Err(e) => Err(VenueError::from(e)),
            },
            Err(e) if e.is_timeout() => Err(VenueError::Timeout),
            Err(e) => Err(VenueError::from(e)),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(VenueError::Timeout) => return Err(VenueError::Timeout),
            Err(e) => {
                warn!(url, attempt, error = %e, "venue fetch attempt failed");
                last_err = Some(e);
                if attempt == 0 {
                    tokio::time::sleep(Duration::from_millis(400)).await;
                }
            }
        }
    }

    Err(last_err.unwrap_or(VenueError::Timeout))
}

pub fn log_outcome(venue: &str, coin: &str, elapsed: Duration, outcome: &str) {
    debug!(venue, coin, elapsed_ms = elapsed.as_millis() as u64, outcome, "venue fetch complete");
}
