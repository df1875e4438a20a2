//! Relay core: target recovery and upstream forwarding.
//!
//! # Data Flow
//! ```text
//! raw path segment (/pages/<target>)
//!     → target.rs (percent-decode, default scheme, parse)
//!     → TargetReference
//!     → executor.rs (headers + identity → ForwardRequest)
//!     → transport.rs (prepare → execute)
//!     → ForwardOutcome (relay upstream response, or aborted)
//! ```
//!
//! # Design Decisions
//! - Both stages are stateless; the only shared value is the identity header
//! - Input errors are raised before any network activity
//! - Upstream status, headers and body are relayed without reinterpretation
//! - Failures after the status is committed are logged, never corrected

pub mod error;
pub mod executor;
pub mod identity;
pub mod target;
pub mod transport;

pub use error::{ExecutionError, InputError};
pub use executor::{Executor, ForwardOutcome};
pub use identity::{Identity, GOOGLEBOT_USER_AGENT};
pub use target::{normalize, DefaultScheme, TargetReference};
pub use transport::{
    BodyStream, ForwardRequest, ReqwestTransport, Transport, TransportFailure, UpstreamResponse,
};
