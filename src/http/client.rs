//! Shared upstream HTTP client.
//!
//! One client is built at startup and cloned into every handler so
//! connections to the same upstream are pooled.

use std::time::Duration;

use reqwest::redirect::Policy;

use crate::config::{TimeoutConfig, UpstreamConfig};

/// Build the upstream client from configuration.
///
/// `request_secs` bounds the whole exchange including the streamed body,
/// so a stalled upstream cannot hold a relay task forever.
pub fn build_client(
    timeouts: &TimeoutConfig,
    upstream: &UpstreamConfig,
) -> Result<reqwest::Client, reqwest::Error> {
    let redirect = if upstream.max_redirects == 0 {
        Policy::none()
    } else {
        Policy::limited(upstream.max_redirects)
    };

    let mut builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.request_secs))
        .redirect(redirect);

    if !upstream.use_env_proxy {
        builder = builder.no_proxy();
    }

    builder.build()
}
