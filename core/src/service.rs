//! Request execution: build, consult cache, send, validate, decode.
//!
//! # Design
//! `NetworkService` owns no mutable state. Each call builds its own request
//! and either answers from the cache without suspending or awaits exactly one
//! transport call. Concurrent calls for the same endpoint are not coalesced.
//!
//! Every transport response is offered to the cache before its status is
//! validated, so a store that accepts everything will also keep 4xx/5xx
//! responses and serve them back as the same `StatusCode` error. Stores that
//! want only successes must filter in `CacheStore::store`.
//!
//! If the future returned by `execute` is dropped while the transport call is
//! pending, the transport future is dropped with it and nothing is cached.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::builder::RequestBuilder;
use crate::cache::CacheStore;
use crate::config::ServiceConfig;
use crate::decoder::JsonDecoder;
use crate::endpoint::Endpoint;
use crate::error::{NetworkError, RequestError, TransportError};
use crate::http::{HttpRequest, RawResponse, Response, ResponseMetadata, ResponseSource};
use crate::transport::Transport;

/// Executes endpoints over a transport, with an optional response cache.
#[derive(Clone)]
pub struct NetworkService {
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn CacheStore>>,
    builder: RequestBuilder,
    decoder: JsonDecoder,
}

impl std::fmt::Debug for NetworkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkService")
            .field("cache", &self.cache.is_some())
            .field("builder", &self.builder)
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

impl NetworkService {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_config(transport, ServiceConfig::default())
    }

    pub fn with_config(transport: impl Transport + 'static, config: ServiceConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            cache: None,
            builder: RequestBuilder::new(config.default_headers),
            decoder: JsonDecoder::new(config.key_decoding),
        }
    }

    /// Service over a `reqwest` transport built from `transport`.
    #[cfg(feature = "reqwest")]
    pub fn reqwest(
        config: ServiceConfig,
        transport: &crate::config::TransportConfig,
    ) -> Result<Self, TransportError> {
        let transport = crate::transport::ReqwestTransport::new(transport)?;
        Ok(Self::with_config(transport, config))
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<dyn CacheStore>> {
        self.cache.as_ref()
    }

    pub fn build_request<E: Endpoint + ?Sized>(
        &self,
        endpoint: &E,
    ) -> Result<HttpRequest, NetworkError> {
        match self.builder.build(endpoint) {
            Ok(request) => {
                debug!(method = %request.method, url = %request.url, "built request");
                Ok(request)
            }
            Err(e) => {
                warn!(error = %e, "failed to build request");
                Err(e.into())
            }
        }
    }

    /// The unvalidated response, from the cache when it has one.
    pub async fn fetch_raw<E: Endpoint + ?Sized>(
        &self,
        endpoint: &E,
    ) -> Result<RawResponse, NetworkError> {
        let request = self.build_request(endpoint)?;

        if let Some(cache) = &self.cache {
            if let Some(response) = cache.lookup(&request) {
                debug!(url = %request.url, "serving cached response");
                return Ok(RawResponse {
                    response,
                    source: ResponseSource::Cache,
                });
            }
        }

        let response = self.transport.send(&request).await.map_err(|e| {
            warn!(url = %request.url, error = %e, "transport failed");
            NetworkError::from(e)
        })?;

        if let Some(cache) = &self.cache {
            cache.store(&request, &response);
        }

        Ok(RawResponse {
            response,
            source: ResponseSource::Network,
        })
    }

    /// The validated response body, undecoded.
    pub async fn execute_data<E: Endpoint + ?Sized>(
        &self,
        endpoint: &E,
    ) -> Result<Vec<u8>, NetworkError> {
        let raw = self.fetch_raw(endpoint).await?;
        validate(raw.response)
    }

    /// Fetch, validate and decode the response into `T`.
    pub async fn execute<T, E>(&self, endpoint: &E) -> Result<T, RequestError>
    where
        T: DeserializeOwned,
        E: Endpoint + ?Sized,
    {
        let body = self.execute_data(endpoint).await?;
        Ok(self.decoder.decode(&body)?)
    }
}

/// Check that `response` is HTTP with a 2xx status and hand back its body.
pub fn validate(response: Response) -> Result<Vec<u8>, NetworkError> {
    match response.metadata {
        ResponseMetadata::Http { status, .. } if (200..300).contains(&status) => Ok(response.body),
        ResponseMetadata::Http { status, .. } => {
            debug!(status, "rejecting non-success status");
            Err(NetworkError::StatusCode(i32::from(status)))
        }
        ResponseMetadata::NonHttp => Err(NetworkError::InvalidResponse),
    }
}
