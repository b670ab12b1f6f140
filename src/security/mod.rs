//! Header policy subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream response headers
//!     → headers.rs (strip hop-by-hop, copy every value)
//!     → cors.rs (inject Access-Control-* headers)
//!     → Reply to caller
//! ```

pub mod cors;
pub mod headers;

pub use cors::CorsPolicy;
pub use headers::{copy_headers, strip_hop_by_hop};
