//! Outbound transport seam.
//!
//! # Responsibilities
//! - Turn a `ForwardRequest` into a transport request (`prepare`)
//! - Send it and hand back status, headers and a body stream (`execute`)
//!
//! # Design Decisions
//! - Two phases so request construction failures stay distinguishable
//!   from fetch failures
//! - A failed fetch may still carry a partial response
//! - Bodies are streamed, never buffered or decoded

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::BoxError;
use futures_util::{Stream, TryStreamExt};

use crate::relay::target::TargetReference;

/// Upstream body as a stream of chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// Outbound fetch descriptor.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub target: TargetReference,
    pub headers: HeaderMap,
}

/// Status, headers and body as received from upstream.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// A fetch that reported an error, possibly after receiving a response.
#[derive(Debug)]
pub struct TransportFailure {
    pub error: BoxError,
    pub partial: Option<UpstreamResponse>,
}

impl TransportFailure {
    /// Failure that left nothing to relay.
    pub fn without_response(error: impl Into<BoxError>) -> Self {
        Self {
            error: error.into(),
            partial: None,
        }
    }
}

/// Performs upstream fetches for the executor.
pub trait Transport: Send + Sync + 'static {
    /// Transport-specific request, ready to send.
    type Prepared: Send + 'static;

    /// Build the outbound request.
    fn prepare(&self, request: ForwardRequest) -> Result<Self::Prepared, BoxError>;

    /// Send the request and wait for the upstream response head.
    fn execute(
        &self,
        prepared: Self::Prepared,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportFailure>> + Send;
}

/// Transport backed by a `reqwest::Client`.
///
/// The client is built without decompression features, so bodies and
/// `Content-Encoding` reach the caller exactly as the upstream sent them.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    type Prepared = reqwest::Request;

    fn prepare(&self, request: ForwardRequest) -> Result<Self::Prepared, BoxError> {
        let ForwardRequest {
            method,
            target,
            headers,
        } = request;

        let prepared = self
            .client
            .request(method, target.into_url())
            .headers(headers)
            .build()?;
        Ok(prepared)
    }

    fn execute(
        &self,
        prepared: Self::Prepared,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportFailure>> + Send {
        async move {
            let mut response = self
                .client
                .execute(prepared)
                .await
                .map_err(TransportFailure::without_response)?;

            let status = response.status();
            let headers = std::mem::take(response.headers_mut());
            let body = response.bytes_stream().map_err(BoxError::from);

            Ok(UpstreamResponse {
                status,
                headers,
                body: Box::pin(body),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::target::{normalize, DefaultScheme};
    use axum::http::header;

    #[test]
    fn test_prepare_carries_method_url_and_headers() {
        let transport = ReqwestTransport::new().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, "relay-test".parse().unwrap());
        headers.append(header::ACCEPT_LANGUAGE, "en".parse().unwrap());
        headers.append(header::ACCEPT_LANGUAGE, "fr".parse().unwrap());

        let request = ForwardRequest {
            method: Method::GET,
            target: normalize("example.com/page?q=1", DefaultScheme::Https).unwrap(),
            headers,
        };

        let prepared = transport.prepare(request).unwrap();
        assert_eq!(prepared.method(), Method::GET);
        assert_eq!(prepared.url().as_str(), "https://example.com/page?q=1");
        assert_eq!(prepared.headers()[header::USER_AGENT], "relay-test");

        let languages: Vec<_> = prepared
            .headers()
            .get_all(header::ACCEPT_LANGUAGE)
            .iter()
            .collect();
        assert_eq!(languages, ["en", "fr"]);
    }

    #[tokio::test]
    async fn test_connection_refused_has_no_partial_response() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let transport = ReqwestTransport::from_client(client);
        let request = ForwardRequest {
            method: Method::GET,
            target: normalize(&format!("{}/", addr), DefaultScheme::Http).unwrap(),
            headers: HeaderMap::new(),
        };

        let prepared = transport.prepare(request).unwrap();
        let failure = transport.execute(prepared).await.unwrap_err();
        assert!(failure.partial.is_none());
    }
}
