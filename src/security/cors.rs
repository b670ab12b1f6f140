//! Permissive CORS headers added to every reply.
//!
//! The relay always answers `Access-Control-Allow-Origin: *`. With full
//! headers enabled it also advertises a fixed method list and echoes the
//! caller's `Access-Control-Request-Headers`, so browser preflight checks
//! pass even though only GET is relayed.

use axum::http::header::{self, HeaderMap, HeaderValue, InvalidHeaderValue};

use crate::config::schema::RelayOptions;

/// CORS headers resolved once from configuration.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    full: bool,
    allow_methods: HeaderValue,
}

impl CorsPolicy {
    pub fn from_options(options: &RelayOptions) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            full: options.full_cors_headers(),
            allow_methods: HeaderValue::from_str(&options.allow_methods)?,
        })
    }

    /// Write the CORS headers for a reply to a request carrying `request_headers`.
    pub fn apply(&self, request_headers: &HeaderMap, reply: &mut HeaderMap) {
        reply.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );

        if !self.full {
            return;
        }

        reply.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            self.allow_methods.clone(),
        );
        for requested in request_headers.get_all(header::ACCESS_CONTROL_REQUEST_HEADERS) {
            reply.append(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
        }
    }
}
