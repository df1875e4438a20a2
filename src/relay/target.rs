//! Target URL recovery from the inbound path segment.
//!
//! # Responsibilities
//! - Percent-decode the segment once more (strictly; malformed escapes are rejected)
//! - Strip the single leading `/` left behind by the route
//! - Default the scheme when the target carries none
//! - Parse into an absolute `http`/`https` URL
//!
//! # Design Decisions
//! - Scheme detection is anchored and ASCII case-insensitive
//! - `+` is not translated to a space; only `%XX` escapes are decoded
//! - The default scheme is chosen by the caller, never by this module

use std::borrow::Cow;
use std::fmt;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::relay::error::InputError;

const SCHEMES: [&str; 2] = ["http://", "https://"];

/// Scheme prepended to targets that arrive without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultScheme {
    #[default]
    Https,
    /// Plain HTTP, for test and bench harnesses only.
    Http,
}

impl DefaultScheme {
    /// Prefix form, e.g. `https://`.
    pub fn prefix(self) -> &'static str {
        match self {
            DefaultScheme::Https => "https://",
            DefaultScheme::Http => "http://",
        }
    }
}

/// Absolute URL the relay fetches on behalf of the caller.
///
/// The scheme is always `http` or `https`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReference(Url);

impl TargetReference {
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_url(self) -> Url {
        self.0
    }
}

impl fmt::Display for TargetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Rebuild an absolute target URL from a raw path segment.
pub fn normalize(raw: &str, default_scheme: DefaultScheme) -> Result<TargetReference, InputError> {
    let decoded = percent_decode(raw)?;
    if decoded.is_empty() {
        return Err(InputError::EmptyTarget);
    }

    let rest = decoded.strip_prefix('/').unwrap_or(&decoded);
    let candidate = if has_http_scheme(rest) {
        rest.to_string()
    } else {
        format!("{}{}", default_scheme.prefix(), rest)
    };

    match Url::parse(&candidate) {
        Ok(url) => Ok(TargetReference(url)),
        Err(source) => Err(InputError::UnparsableUrl {
            input: candidate,
            source,
        }),
    }
}

fn has_http_scheme(s: &str) -> bool {
    SCHEMES.iter().any(|scheme| {
        s.get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

fn percent_decode(raw: &str) -> Result<Cow<'_, str>, InputError> {
    let bytes = raw.as_bytes();
    if let Some(at) = bytes.iter().enumerate().position(|(i, b)| {
        *b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    }) {
        let end = (at + 3).min(bytes.len());
        return Err(InputError::MalformedEncoding(format!(
            "invalid escape {:?} at byte {}",
            String::from_utf8_lossy(&bytes[at..end]),
            at
        )));
    }

    percent_decode_str(raw).decode_utf8().map_err(|e| {
        InputError::MalformedEncoding(format!(
            "decoded target is not UTF-8 after byte {}",
            e.valid_up_to()
        ))
    })
}
