//! Response transcription and boundary error pages.
//!
//! # Responsibilities
//! - Transcribe upstream status, headers and body into the client response
//! - Render the two synthesized error pages (400 and 500)
//! - Serve the embedded form page
//!
//! # Design Decisions
//! - Outbound headers are replaced wholesale by the upstream set
//! - The body is streamed as it arrives, never buffered
//! - A partial response left by a failed fetch relays status and body only
//! - A failed fetch with nothing to relay gets an empty 200, no error page

use axum::{
    body::Body,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::relay::UpstreamResponse;

const INDEX_HTML: &str = include_str!("../../public/index.html");

/// Client response carrying the upstream status, headers and body verbatim.
pub fn relay(upstream: UpstreamResponse) -> Response {
    let UpstreamResponse {
        status,
        headers,
        body,
    } = upstream;

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Status and body of the response a failed fetch left behind.
pub fn relay_partial(partial: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from_stream(partial.body));
    *response.status_mut() = partial.status;
    response
}

/// The target could not be recovered from the path.
pub fn invalid_target() -> Response {
    (StatusCode::BAD_REQUEST, Html("<h1>Invalid Origin URL</h1>")).into_response()
}

/// The outbound request could not be constructed.
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<h1>Internal Server Error</h1>"),
    )
        .into_response()
}

/// The upstream fetch failed and left no response to relay.
pub fn aborted() -> Response {
    Response::new(Body::empty())
}

/// Form page that sends the visitor to `/pages/<url>`.
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}
