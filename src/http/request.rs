//! Inbound request handling and outbound request construction.
//!
//! # Responsibilities
//! - Tag each inbound request with a unique request ID
//! - Extract and validate the relay target from the `u` query parameter
//! - Decide the User-Agent and Referer sent upstream
//!
//! # Design Decisions
//! - Validation happens before any network I/O
//! - Only the first `u` value counts
//! - Header values are resolved once at startup, not per request

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use axum::http::{Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

use crate::config::RelayOptions;
use crate::http::error::RelayError;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRelayRequestId;

impl MakeRequestId for MakeRelayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID assigned to an inbound request.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// The decoded first `u` value, exactly as the caller sent it.
pub fn requested_target(uri: &Uri) -> Option<String> {
    let query = uri.query().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "u")
        .map(|(_, value)| value.into_owned())
}

/// Validate a requested target as an absolute URI.
pub fn parse_target(requested: Option<&str>) -> Result<Url, RelayError> {
    let target = requested
        .filter(|value| !value.is_empty())
        .ok_or(RelayError::MissingUrl)?;

    Url::parse(target).map_err(|source| RelayError::InvalidUrl {
        target: target.to_string(),
        source,
    })
}

/// Outbound header rules resolved from [`RelayOptions`].
#[derive(Debug, Clone)]
pub struct OutboundPolicy {
    default_user_agent: Option<HeaderValue>,
    referer: Option<HeaderValue>,
}

impl OutboundPolicy {
    pub fn from_options(options: &RelayOptions) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            default_user_agent: options
                .default_user_agent()
                .map(HeaderValue::from_str)
                .transpose()?,
            referer: options.referer().map(HeaderValue::from_str).transpose()?,
        })
    }

    /// Headers for the upstream request derived from the inbound ones.
    ///
    /// The inbound User-Agent is forwarded verbatim when non-empty. The
    /// Referer, when configured, is set regardless of the target.
    pub fn headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let user_agent = inbound
            .get(header::USER_AGENT)
            .filter(|ua| !ua.is_empty())
            .or(self.default_user_agent.as_ref());
        if let Some(ua) = user_agent {
            headers.insert(header::USER_AGENT, ua.clone());
        }

        if let Some(referer) = &self.referer {
            headers.insert(header::REFERER, referer.clone());
        }

        headers
    }
}
