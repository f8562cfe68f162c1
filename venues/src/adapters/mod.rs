mod binance;
mod bitget;
mod bybit;
mod gate;
mod htx;
mod kucoin;
mod okx;

pub use binance::Binance;
pub use bitget::Bitget;
pub use bybit::Bybit;
pub use gate::Gate;
pub use htx::Htx;
pub use kucoin::Kucoin;
pub use okx::Okx;

use std::sync::Arc;

use crate::adapter::VenueAdapter;

/// Builds the default registry of all seven shipped venues, each with its
/// own `reqwest::Client` per spec §5 ("no mutable state is shared between
/// adapters").
pub fn default_registry() -> Vec<Arc<dyn VenueAdapter>> {
    vec![
        Arc::new(Binance::new(reqwest::Client::new())),
        Arc::new(Okx::new(reqwest::Client::new())),
        Arc::new(Bybit::new(reqwest::Client::new())),
        Arc::new(Kucoin::new(reqwest::Client::new())),
        Arc::new(Gate::new(reqwest::Client::new())),
        Arc::new(Htx::new(reqwest::Client::new())),
        Arc::new(Bitget::new(reqwest::Client::new())),
    ]
}
