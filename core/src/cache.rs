//! Response caching collaborator.
//!
//! # Design
//! `CacheStore` is consulted synchronously, so serving a hit never suspends.
//! The service trusts the store completely: whatever `lookup` returns is
//! served as-is, and every transport response is offered to `store` before
//! its status is validated. Keying, freshness and eviction are the store's
//! business.
//!
//! `MemoryCache` is a bounded in-process store. It keeps only `GET`
//! responses, skips anything marked `no-store`, and keys entries on method and
//! URL plus the request headers the response names in `Vary`.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use crate::http::{header, Headers, HttpMethod, HttpRequest, Response};

/// Request-keyed storage of prior responses.
///
/// Implementations are shared across concurrent requests and must do their
/// own synchronization.
pub trait CacheStore: Send + Sync {
    fn lookup(&self, request: &HttpRequest) -> Option<Response>;

    fn store(&self, request: &HttpRequest, response: &Response);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    method: HttpMethod,
    url: String,
}

impl CacheKey {
    fn of(request: &HttpRequest) -> Self {
        Self {
            method: request.method,
            url: request.url.as_str().to_string(),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    response: Response,
    /// Request header values captured for each name listed in `Vary`.
    vary: Vec<(String, Option<String>)>,
}

impl CacheEntry {
    fn matches(&self, request: &HttpRequest) -> bool {
        self.vary
            .iter()
            .all(|(name, value)| request.headers.get(name) == value.as_deref())
    }
}

/// In-memory LRU `CacheStore`.
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl MemoryCache {
    pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
        Some(capacity) => capacity,
        None => unreachable!(),
    };

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

fn no_store(headers: &Headers) -> bool {
    headers.get(header::CACHE_CONTROL).is_some_and(|value| {
        value
            .split(',')
            .any(|directive| directive.trim().eq_ignore_ascii_case("no-store"))
    })
}

impl CacheStore for MemoryCache {
    fn lookup(&self, request: &HttpRequest) -> Option<Response> {
        if request.method != HttpMethod::Get || no_store(&request.headers) {
            return None;
        }
        let mut entries = self.entries.lock();
        let entry = entries.get(&CacheKey::of(request))?;
        entry.matches(request).then(|| entry.response.clone())
    }

    fn store(&self, request: &HttpRequest, response: &Response) {
        if request.method != HttpMethod::Get || no_store(&request.headers) {
            return;
        }
        let mut vary = Vec::new();
        if let Some(headers) = response.metadata.headers() {
            if no_store(headers) {
                return;
            }
            if let Some(names) = headers.get(header::VARY) {
                for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                    if name == "*" {
                        return;
                    }
                    vary.push((
                        name.to_string(),
                        request.headers.get(name).map(str::to_string),
                    ));
                }
            }
        }

        trace!(url = %request.url, "caching response");
        self.entries.lock().put(
            CacheKey::of(request),
            CacheEntry {
                response: response.clone(),
                vary,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: Url::parse(url).unwrap(),
            headers: Headers::json(),
            body: None,
        }
    }

    fn ok(body: &str) -> Response {
        Response::http(200, Headers::new(), body.as_bytes())
    }

    #[test]
    fn stores_and_serves_get_responses() {
        let cache = MemoryCache::new();
        let request = get("https://api.example.com/episode");
        assert!(cache.lookup(&request).is_none());

        cache.store(&request, &ok("[]"));
        assert_eq!(cache.lookup(&request), Some(ok("[]")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_include_the_query() {
        let cache = MemoryCache::new();
        cache.store(&get("https://api.example.com/episode?page=1"), &ok("1"));
        assert!(cache.lookup(&get("https://api.example.com/episode?page=2")).is_none());
    }

    #[test]
    fn non_get_requests_are_not_cached() {
        let cache = MemoryCache::new();
        let mut request = get("https://api.example.com/episode");
        request.method = HttpMethod::Post;
        cache.store(&request, &ok("{}"));
        assert!(cache.is_empty());
        assert!(cache.lookup(&request).is_none());
    }

    #[test]
    fn error_statuses_are_kept() {
        let cache = MemoryCache::new();
        let request = get("https://api.example.com/episode/99");
        let missing = Response::http(404, Headers::new(), "not found");
        cache.store(&request, &missing);
        assert_eq!(cache.lookup(&request), Some(missing));
    }

    #[test]
    fn no_store_is_honoured() {
        let cache = MemoryCache::new();
        let request = get("https://api.example.com/episode");
        let response = Response::http(
            200,
            Headers::new().with("cache-control", "private, no-store"),
            "[]",
        );
        cache.store(&request, &response);
        assert!(cache.is_empty());

        let mut request = get("https://api.example.com/episode");
        request.headers.insert(header::CACHE_CONTROL, "no-store");
        cache.store(&request, &ok("[]"));
        assert!(cache.is_empty());
    }

    #[test]
    fn vary_headers_must_match() {
        let cache = MemoryCache::new();
        let mut english = get("https://api.example.com/episode");
        english.headers.insert(header::ACCEPT_LANGUAGE, "en");
        let response = Response::http(200, Headers::new().with(header::VARY, "Accept-Language"), "[]");
        cache.store(&english, &response);

        assert_eq!(cache.lookup(&english), Some(response));

        let mut german = english.clone();
        german.headers.insert(header::ACCEPT_LANGUAGE, "de");
        assert!(cache.lookup(&german).is_none());
    }

    #[test]
    fn repeated_cache_control_lines_are_all_honoured() {
        let cache = MemoryCache::new();
        let request = get("https://api.example.com/episode");
        let mut headers = Headers::new();
        headers.append(header::CACHE_CONTROL, "no-store");
        headers.append(header::CACHE_CONTROL, "private");

        cache.store(&request, &Response::http(200, headers, "[]"));
        assert!(cache.is_empty());
    }

    #[test]
    fn repeated_vary_lines_are_all_matched() {
        let cache = MemoryCache::new();
        let mut request = get("https://api.example.com/episode");
        request.headers.insert(header::ACCEPT_LANGUAGE, "en");
        request.headers.insert(header::ACCEPT_ENCODING, "gzip");
        let mut headers = Headers::new();
        headers.append(header::VARY, "Accept-Language");
        headers.append(header::VARY, "Accept-Encoding");
        cache.store(&request, &Response::http(200, headers, "[]"));
        assert!(cache.lookup(&request).is_some());

        let mut other_language = request.clone();
        other_language.headers.insert(header::ACCEPT_LANGUAGE, "de");
        assert!(cache.lookup(&other_language).is_none());

        let mut other_encoding = request.clone();
        other_encoding.headers.insert(header::ACCEPT_ENCODING, "br");
        assert!(cache.lookup(&other_encoding).is_none());
    }

    #[test]
    fn vary_star_is_never_cached() {
        let cache = MemoryCache::new();
        let request = get("https://api.example.com/episode");
        cache.store(&request, &Response::http(200, Headers::new().with(header::VARY, "*"), "[]"));
        assert!(cache.is_empty());
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let cache = MemoryCache::with_capacity(NonZeroUsize::new(2).unwrap());
        let one = get("https://api.example.com/1");
        let two = get("https://api.example.com/2");
        let three = get("https://api.example.com/3");

        cache.store(&one, &ok("1"));
        cache.store(&two, &ok("2"));
        assert!(cache.lookup(&one).is_some());
        cache.store(&three, &ok("3"));

        assert_eq!(cache.len(), 2);
        assert!(cache.lookup(&two).is_none());
        assert!(cache.lookup(&one).is_some());
        assert!(cache.lookup(&three).is_some());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = MemoryCache::new();
        cache.store(&get("https://api.example.com/episode"), &ok("[]"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
