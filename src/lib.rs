//! HTTP/JSON presentation layer wrapping the multi-venue execution
//! planner: request routing, configuration, and logging setup. The
//! planning algorithm itself lives in the `planner` and `venues` crates.

pub mod config;
pub mod http;

pub use config::Config;
