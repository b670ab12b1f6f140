//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (extract `u`, validate, build outbound headers)
//!     → client.rs (shared upstream client, timeouts)
//!     → response.rs (status, CORS + upstream headers, streamed body)
//!     → Send to client
//!
//! Local failures:
//!     error.rs → 400/500 plain-text reply (CORS headers still added)
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::RelayError;
pub use request::{MakeRelayRequestId, OutboundPolicy, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer, ServerError};
