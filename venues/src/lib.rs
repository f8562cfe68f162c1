//! Per-exchange order-book adapters, normalized to a canonical [`Book`]
//! shape. See each submodule under `adapters` for the venue-specific
//! symbol encoding and response envelope.

mod adapter;
mod adapters;
mod book;
mod error;
mod http;

pub use adapter::VenueAdapter;
pub use adapters::{default_registry, Binance, Bitget, Bybit, Gate, Htx, Kucoin, Okx};
pub use book::{parse_levels, Book, FetchDiag, Level};
pub use error::VenueError;
