//! HTTP data types shared by the builder, transports and caches.
//!
//! # Design
//! Requests and responses are plain data. `RequestBuilder` produces an
//! `HttpRequest`; a `Transport` turns it into a `Response`; a `CacheStore`
//! keeps `Response` values keyed by request. None of these types perform I/O.
//!
//! All fields use owned types (`String`, `Vec`, `Url`) so values can be moved
//! across tasks and stored without lifetime concerns.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Well-known header names.
pub mod header {
    pub const AUTHENTICATION: &str = "Authentication";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const ACCEPT: &str = "Accept";
    pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const ACCEPT_LANGUAGE: &str = "Accept-Language";
    pub const USER_AGENT: &str = "User-Agent";
    pub const CACHE_CONTROL: &str = "Cache-Control";
    pub const VARY: &str = "Vary";
}

/// Media types used in `Content-Type` and `Accept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    FormUrlEncoded,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl HttpMethod {
    /// Canonical upper-case method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "reqwest")]
impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Connect => reqwest::Method::CONNECT,
            HttpMethod::Options => reqwest::Method::OPTIONS,
            HttpMethod::Trace => reqwest::Method::TRACE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Header name to value mapping.
///
/// Names compare case-insensitively, the way HTTP matches them on the wire.
/// A map never holds two names that differ only in case: inserting replaces
/// any existing spelling, and the new spelling is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Content-Type` and `Accept` both set to `application/json`.
    pub fn json() -> Self {
        Self::new()
            .with(header::CONTENT_TYPE, ContentType::Json.as_str())
            .with(header::ACCEPT, ContentType::Json.as_str())
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a header, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let replaced = self.remove(&name);
        self.0.insert(name, value.into());
        replaced
    }

    /// Add a value for `name`, joining it to any existing value with `", "`.
    ///
    /// Repeated header lines in a response combine this way.
    pub fn append(&mut self, name: impl Into<String>, value: impl AsRef<str>) {
        let name = name.into();
        let value = value.as_ref();
        let combined = match self.remove(&name) {
            Some(existing) => format!("{existing}, {value}"),
            None => value.to_string(),
        };
        self.0.insert(name, combined);
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let key = self
            .0
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()?;
        self.0.remove(&key)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `other` onto `self`; values from `other` win on collision.
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Non-mutating form of [`Headers::merge`].
    pub fn merging(&self, other: &Headers) -> Headers {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A fully resolved request, ready for a `Transport`.
///
/// Built by `RequestBuilder::build`; never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

/// What a transport reports about a response besides its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseMetadata {
    Http { status: u16, headers: Headers },
    /// The transport produced a response that is not HTTP-shaped.
    NonHttp,
}

impl ResponseMetadata {
    pub fn status(&self) -> Option<u16> {
        match self {
            ResponseMetadata::Http { status, .. } => Some(*status),
            ResponseMetadata::NonHttp => None,
        }
    }

    pub fn headers(&self) -> Option<&Headers> {
        match self {
            ResponseMetadata::Http { headers, .. } => Some(headers),
            ResponseMetadata::NonHttp => None,
        }
    }
}

/// Response metadata and body as produced by a transport or a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub metadata: ResponseMetadata,
    pub body: Vec<u8>,
}

impl Response {
    pub fn http(status: u16, headers: Headers, body: impl Into<Vec<u8>>) -> Self {
        Self {
            metadata: ResponseMetadata::Http { status, headers },
            body: body.into(),
        }
    }
}

/// Where a `RawResponse` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    /// Served by the cache; the transport was not contacted.
    Cache,
}

/// A response as returned by `NetworkService::fetch_raw`, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub response: Response,
    pub source: ResponseSource,
}

impl RawResponse {
    pub fn is_cached(&self) -> bool {
        self.source == ResponseSource::Cache
    }
}
