//! HTTP boundary of the relay.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, /pages/ handler, first percent-decoding)
//!     → relay::normalize (400 on input error)
//!     → relay::Executor::forward (500 if the request cannot be built)
//!     → response.rs (transcribe upstream status/headers/body, or the
//!       status/body of a partial response, or an empty 200)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
