//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parseable)
//! - Check that configured header values can be sent on the wire
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{SocketAddr, ToSocketAddrs};

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    BindAddress(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("relay.{0} is not a valid header value")]
    HeaderValue(&'static str),

    #[error("relay.fixed_referer '{0}' is not an absolute URL")]
    Referer(String),

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind = config.listener.socket_address();
    if bind.to_socket_addrs().map(|mut a| a.next().is_none()).unwrap_or(true) {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if HeaderValue::from_str(&config.relay.allow_methods).is_err() {
        errors.push(ValidationError::HeaderValue("allow_methods"));
    }
    if HeaderValue::from_str(&config.relay.default_user_agent).is_err() {
        errors.push(ValidationError::HeaderValue("default_user_agent"));
    }
    if let Some(referer) = config.relay.referer() {
        if url::Url::parse(referer).is_err() {
            errors.push(ValidationError::Referer(referer.to_string()));
        } else if HeaderValue::from_str(referer).is_err() {
            errors.push(ValidationError::HeaderValue("fixed_referer"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
