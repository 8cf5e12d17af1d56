//! Typed HTTP request pipeline.
//!
//! # Overview
//! Callers describe an API call declaratively by implementing [`Endpoint`]
//! (base URL, path, method, headers, parameters). [`RequestBuilder`] turns
//! that description into an [`HttpRequest`]; [`NetworkService`] executes it,
//! optionally answering from a [`CacheStore`], validates the status and
//! decodes the body into a typed value.
//!
//! # Design
//! - Building is pure and separate from execution, so requests can be
//!   inspected and tested without any I/O.
//! - The network and the cache are collaborators behind traits
//!   ([`Transport`], [`CacheStore`]); `ReqwestTransport` and [`MemoryCache`]
//!   are the provided implementations.
//! - Failures from every stage land in the closed [`NetworkError`] taxonomy.
//!   Decode failures stay separate ([`DecodeError`]) and the two meet in
//!   [`RequestError`].
//! - Default headers and the key decoding strategy are explicit
//!   configuration ([`ServiceConfig`]), not process-wide state.

pub mod builder;
pub mod cache;
pub mod config;
pub mod decoder;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod params;
pub mod service;
pub mod transport;

pub use builder::RequestBuilder;
pub use cache::{CacheStore, MemoryCache};
pub use config::{ServiceConfig, TransportConfig};
pub use decoder::{JsonDecoder, KeyDecodingStrategy};
pub use endpoint::Endpoint;
pub use error::{BuildError, DecodeError, NetworkError, RequestError, TransportError};
pub use http::{
    header, ContentType, Headers, HttpMethod, HttpRequest, RawResponse, Response,
    ResponseMetadata, ResponseSource,
};
pub use params::{ParameterValue, Parameters, RequestParameters};
pub use service::{validate, NetworkService};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
