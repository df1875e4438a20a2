//! Relay error taxonomies.
//!
//! Input errors are detected before any network I/O and rendered as 400.
//! Execution errors cover the outbound request that could not be built and
//! are rendered as 500. Transport failures are not errors at this level:
//! the executor relays whatever the transport left behind.

use axum::BoxError;
use thiserror::Error;

/// Failure to turn the inbound path segment into a target URL.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("malformed percent-encoding: {0}")]
    MalformedEncoding(String),

    #[error("empty target URL")]
    EmptyTarget,

    #[error("cannot parse target URL {input:?}: {source}")]
    UnparsableUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure attributable to the outbound fetch attempt.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to build upstream request: {0}")]
    RequestBuildFailed(#[source] BoxError),
}
