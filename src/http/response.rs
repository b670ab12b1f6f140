//! Reply assembly from an upstream response.
//!
//! # Responsibilities
//! - Mirror the upstream status code
//! - Inject CORS headers, then append every upstream header value
//! - Stream the upstream body to the caller unmodified
//!
//! # Design Decisions
//! - The body is never buffered; backpressure comes from the transport
//! - A body failure after headers are sent can only truncate the reply,
//!   so it is logged and counted instead of returned
//! - Dropping the reply body drops the upstream stream, which releases
//!   the upstream connection on every path

use axum::body::Body;
use axum::http::HeaderMap;
use axum::response::Response;
use futures_util::TryStreamExt;
use url::Url;

use crate::http::error::error_chain;
use crate::observability::metrics;
use crate::security::{copy_headers, strip_hop_by_hop, CorsPolicy};

/// Turn an upstream response into the reply for the caller.
pub fn build_reply(
    mut upstream: reqwest::Response,
    cors: &CorsPolicy,
    inbound: &HeaderMap,
    target: &Url,
) -> Response {
    let status = upstream.status();
    let mut upstream_headers = std::mem::take(upstream.headers_mut());
    strip_hop_by_hop(&mut upstream_headers);

    let target_url = target.to_string();
    let body = upstream.bytes_stream().inspect_err(move |err| {
        tracing::warn!(
            target_url = %target_url,
            error = %error_chain(err),
            "Upstream body failed mid-stream, reply truncated"
        );
        metrics::record_body_error();
    });

    let mut reply = Response::new(Body::from_stream(body));
    *reply.status_mut() = status;
    cors.apply(inbound, reply.headers_mut());
    copy_headers(&upstream_headers, reply.headers_mut());
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayOptions;
    use axum::http::{header, StatusCode};

    fn upstream(status: u16, headers: &[(&'static str, &'static str)], body: &'static str) -> reqwest::Response {
        let mut builder = axum::http::Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        reqwest::Response::from(builder.body(body).unwrap())
    }

    fn target() -> Url {
        Url::parse("http://upstream.test/feed").unwrap()
    }

    #[tokio::test]
    async fn mirrors_status_headers_and_body() {
        let cors = CorsPolicy::from_options(&RelayOptions::default()).unwrap();
        let reply = build_reply(
            upstream(200, &[("x-test", "abc")], "hello"),
            &cors,
            &HeaderMap::new(),
            &target(),
        );

        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(reply.headers()["x-test"], "abc");
        assert_eq!(reply.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let body = axum::body::to_bytes(reply.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn keeps_upstream_error_status() {
        let cors = CorsPolicy::from_options(&RelayOptions::default()).unwrap();
        let reply = build_reply(upstream(404, &[], "gone"), &cors, &HeaderMap::new(), &target());

        assert_eq!(reply.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(reply.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"gone");
    }

    #[test]
    fn upstream_cors_header_is_appended() {
        let cors = CorsPolicy::from_options(&RelayOptions::default()).unwrap();
        let reply = build_reply(
            upstream(
                200,
                &[
                    ("access-control-allow-origin", "https://site.test"),
                    ("connection", "keep-alive"),
                    ("set-cookie", "a=1"),
                    ("set-cookie", "b=2"),
                ],
                "",
            ),
            &cors,
            &HeaderMap::new(),
            &target(),
        );

        let origins: Vec<_> = reply
            .headers()
            .get_all(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(origins, vec!["*", "https://site.test"]);
        assert_eq!(reply.headers().get_all(header::SET_COOKIE).iter().count(), 2);
        assert!(!reply.headers().contains_key(header::CONNECTION));
    }

    #[tokio::test]
    async fn body_failure_truncates_reply() {
        let chunks = futures_util::stream::iter(vec![
            Ok::<&'static str, std::io::Error>("hel"),
            Err(std::io::Error::other("connection reset")),
        ]);
        let failing = axum::http::Response::builder()
            .status(200)
            .header("content-length", "100")
            .body(reqwest::Body::wrap_stream(chunks))
            .unwrap();

        let cors = CorsPolicy::from_options(&RelayOptions::default()).unwrap();
        let reply = build_reply(
            reqwest::Response::from(failing),
            &cors,
            &HeaderMap::new(),
            &target(),
        );

        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(reply.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(axum::body::to_bytes(reply.into_body(), usize::MAX).await.is_err());
    }
}
