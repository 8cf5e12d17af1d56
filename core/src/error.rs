//! Error types for the request pipeline.
//!
//! # Design
//! `NetworkError` is the closed taxonomy every pipeline stage reports into:
//! request construction, transport and status validation. It carries no
//! payload except a status code, so callers can match on it exhaustively and
//! copy it freely. Construction and transport failures keep their detail in
//! `BuildError` / `TransportError`, which are logged and then collapsed into
//! the taxonomy.
//!
//! Decoding is a separate category (`DecodeError`). `RequestError` joins the
//! two for `NetworkService::execute`, so "got a response" and "response was
//! malformed" remain distinguishable.

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// Unified failure taxonomy of the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum NetworkError {
    /// The endpoint's base URL and path did not resolve to an absolute URL.
    #[error("failed to construct request")]
    FailedToConstructRequest,

    /// A body parameter could not be serialized to JSON.
    #[error("request body could not be serialized")]
    InvalidBody,

    /// Reserved.
    #[error("invalid endpoint")]
    InvalidEndpoint,

    /// Reserved.
    #[error("invalid URL")]
    InvalidUrl,

    /// Reserved.
    #[error("response contained no data")]
    EmptyData,

    /// Reserved.
    #[error("response contained invalid JSON")]
    InvalidJson,

    /// The transport returned something that is not an HTTP response.
    #[error("response was not an HTTP response")]
    InvalidResponse,

    /// Reserved. Status validation reports 401 as `StatusCode(401)`.
    #[error("unauthorized")]
    Unauthorized,

    /// No network connectivity.
    #[error("network connection unavailable")]
    NetworkFailure,

    /// The transport deadline elapsed.
    #[error("request timed out")]
    Timeout,

    #[error("unknown network error")]
    Unknown,

    /// A non-2xx HTTP status, or a transport error code standing in for one.
    #[error("unexpected status code {0}")]
    StatusCode(i32),
}

impl NetworkError {
    /// Map a transport failure into the taxonomy.
    ///
    /// Anything that is neither a connectivity loss nor a timeout reports the
    /// transport's own error code as `StatusCode`. That code is not an HTTP
    /// status; it is the closest thing the transport offers.
    pub fn classify(error: &TransportError) -> Self {
        match error {
            TransportError::NotConnected(_) => NetworkError::NetworkFailure,
            TransportError::TimedOut => NetworkError::Timeout,
            TransportError::Other { code, .. } => NetworkError::StatusCode(*code),
        }
    }

    /// The HTTP status carried by `StatusCode`, if any.
    pub fn status(&self) -> Option<i32> {
        match self {
            NetworkError::StatusCode(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<TransportError> for NetworkError {
    fn from(error: TransportError) -> Self {
        NetworkError::classify(&error)
    }
}

impl From<&TransportError> for NetworkError {
    fn from(error: &TransportError) -> Self {
        NetworkError::classify(error)
    }
}

/// Failures raised by a `Transport` before any HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The host could not be reached.
    #[error("not connected: {0}")]
    NotConnected(String),

    #[error("operation timed out")]
    TimedOut,

    /// Any other transport failure, with the transport's native error code.
    #[error("transport error ({code}): {message}")]
    Other { code: i32, message: String },
}

impl TransportError {
    /// Code reported when the transport has none of its own.
    pub const UNKNOWN_CODE: i32 = -1;

    pub fn other(message: impl Into<String>) -> Self {
        TransportError::Other {
            code: Self::UNKNOWN_CODE,
            message: message.into(),
        }
    }
}

/// Only a missing route to the network counts as `NotConnected`. A refused
/// connection or an unresolvable host reports its OS error code instead.
impl From<&io::Error> for TransportError {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkDown => TransportError::NotConnected(err.to_string()),
            io::ErrorKind::TimedOut => TransportError::TimedOut,
            _ => TransportError::Other {
                code: err.raw_os_error().unwrap_or(Self::UNKNOWN_CODE),
                message: err.to_string(),
            },
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        TransportError::from(&err)
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportError::TimedOut;
        }
        if let Some(io) = io_source(&err) {
            return TransportError::from(io);
        }
        TransportError::Other {
            code: err
                .status()
                .map(|status| i32::from(status.as_u16()))
                .unwrap_or(Self::UNKNOWN_CODE),
            message: err.to_string(),
        }
    }
}

/// The first `io::Error` in `err`'s source chain.
#[cfg(any(feature = "reqwest", test))]
fn io_source<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a io::Error> {
    let mut cause = err.source();
    while let Some(current) = cause {
        if let Some(io) = current.downcast_ref::<io::Error>() {
            return Some(io);
        }
        cause = current.source();
    }
    None
}

/// Reasons an endpoint could not be turned into an `HttpRequest`.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// The base URL parsed but cannot carry path segments (e.g. `mailto:`).
    #[error("base URL cannot be a base: {0}")]
    CannotBeABase(String),

    /// A body parameter has no JSON representation.
    #[error("invalid body parameter `{key}`: {reason}")]
    InvalidBody { key: String, reason: String },
}

impl From<BuildError> for NetworkError {
    fn from(error: BuildError) -> Self {
        match error {
            BuildError::InvalidBaseUrl(_) | BuildError::CannotBeABase(_) => {
                NetworkError::FailedToConstructRequest
            }
            BuildError::InvalidBody { .. } => NetworkError::InvalidBody,
        }
    }
}

/// The response body could not be decoded into the requested type.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response body was empty")]
    EmptyBody,

    #[error("failed to decode response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned by `NetworkService::execute`.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl RequestError {
    /// The network-taxonomy member, when this is not a decode failure.
    pub fn network(&self) -> Option<NetworkError> {
        match self {
            RequestError::Network(error) => Some(*error),
            RequestError::Decode(_) => None,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, RequestError::Decode(_))
    }
}
