//! Errors raised while relaying a single request.
//!
//! Every variant is terminal for the current request only and is turned
//! into a plain-text reply where it occurs.

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// The `u` query parameter is absent or empty.
    #[error("400 - URL is missing")]
    MissingUrl,

    /// The `u` query parameter is not an absolute URI.
    #[error("400 - bad URL: {source}")]
    InvalidUrl {
        target: String,
        #[source]
        source: url::ParseError,
    },

    /// The outbound request could not be constructed.
    #[error("{0}")]
    OutboundRequest(String),

    /// The upstream could not be reached or did not answer in time.
    #[error("{0}")]
    Upstream(String),
}

impl RelayError {
    /// Classify a client error by whether the request ever left the relay.
    pub fn from_client(err: reqwest::Error) -> Self {
        if err.is_builder() {
            RelayError::OutboundRequest(error_chain(&err))
        } else {
            RelayError::Upstream(error_chain(&err))
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingUrl | RelayError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
            RelayError::OutboundRequest(_) | RelayError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The rejected target, when the caller sent one.
    pub fn target(&self) -> Option<&str> {
        match self {
            RelayError::InvalidUrl { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MissingUrl => "missing_url",
            RelayError::InvalidUrl { .. } => "invalid_url",
            RelayError::OutboundRequest(_) => "outbound_request",
            RelayError::Upstream(_) => "upstream",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Render an error and all of its sources as one line.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
