//! Forwarding executor.
//!
//! # Responsibilities
//! - Build the outbound request from the inbound headers
//! - Force the crawler identity onto `User-Agent`
//! - Run the fetch through the transport
//! - Decide what, if anything, is left to relay after a transport failure
//!
//! # Design Decisions
//! - Headers are rebuilt from scratch, then the identity is set, not added
//! - Headers the transport must own for the new request are not copied
//! - Body stream failures are reported once the status is already committed,
//!   so they only reach the log

use axum::http::{header, HeaderMap, HeaderName, Method};
use futures_util::TryStreamExt;

use crate::relay::error::ExecutionError;
use crate::relay::identity::Identity;
use crate::relay::target::TargetReference;
use crate::relay::transport::{ForwardRequest, Transport, TransportFailure, UpstreamResponse};

const OPERATION: &str = "forward";

/// Inbound headers the transport regenerates for the outbound request.
const TRANSPORT_MANAGED: [HeaderName; 4] = [
    header::HOST,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::TRAILER,
];

/// Result of a forward attempt that got past request construction.
#[derive(Debug)]
pub enum ForwardOutcome {
    /// Upstream response to transcribe to the client.
    Relay(UpstreamResponse),
    /// Response the transport left behind when the fetch failed. Only its
    /// status and body are relayed.
    Partial(UpstreamResponse),
    /// The fetch failed and left no response behind.
    Aborted,
}

/// Performs upstream fetches with a fixed identity.
#[derive(Debug)]
pub struct Executor<T> {
    transport: T,
    identity: Identity,
}

impl<T: Transport> Executor<T> {
    pub fn new(transport: T, identity: Identity) -> Self {
        Self {
            transport,
            identity,
        }
    }

    /// Outbound GET for `target` carrying the inbound headers and the identity.
    pub fn forward_request(&self, target: TargetReference, inbound: &HeaderMap) -> ForwardRequest {
        let mut headers = HeaderMap::with_capacity(inbound.len());
        for (name, value) in inbound {
            if TRANSPORT_MANAGED.contains(name) {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
        headers.insert(header::USER_AGENT, self.identity.user_agent().clone());

        ForwardRequest {
            method: Method::GET,
            target,
            headers,
        }
    }

    /// Fetch `target` and return what should be relayed.
    pub async fn forward(
        &self,
        target: TargetReference,
        inbound: &HeaderMap,
    ) -> Result<ForwardOutcome, ExecutionError> {
        let request = self.forward_request(target, inbound);
        let prepared = self
            .transport
            .prepare(request)
            .map_err(ExecutionError::RequestBuildFailed)?;

        match self.transport.execute(prepared).await {
            Ok(response) => Ok(ForwardOutcome::Relay(watch_body(response))),
            Err(TransportFailure { error, partial }) => {
                tracing::error!(operation = OPERATION, error = %error, "Upstream fetch failed");
                Ok(match partial {
                    Some(response) => ForwardOutcome::Partial(watch_body(response)),
                    None => ForwardOutcome::Aborted,
                })
            }
        }
    }
}

/// Log body stream failures; by then the status line is already sent.
fn watch_body(response: UpstreamResponse) -> UpstreamResponse {
    let UpstreamResponse {
        status,
        headers,
        body,
    } = response;

    let body = body.inspect_err(move |error| {
        tracing::error!(
            operation = OPERATION,
            status = status.as_u16(),
            error = %error,
            "Upstream body stream failed after status was committed"
        );
    });

    UpstreamResponse {
        status,
        headers,
        body: Box::pin(body),
    }
}
