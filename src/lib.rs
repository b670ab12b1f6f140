//! CORS relay library.
//!
//! Fetches the URL given in the `u` query parameter and returns the
//! upstream response with permissive CORS headers added.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
