//! The network I/O seam.
//!
//! # Design
//! `Transport` is the only place the pipeline suspends. Implementations must
//! be `Send + Sync`: one transport is shared by every in-flight request and is
//! responsible for its own connection pooling and synchronization.
//!
//! A transport reports any HTTP exchange, whatever its status, as `Ok`.
//! `Err` is reserved for failures where no response arrived at all.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, Response};

/// Performs one HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<Response, TransportError>;
}

#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use async_trait::async_trait;
    use tracing::trace;

    use super::Transport;
    use crate::config::TransportConfig;
    use crate::error::TransportError;
    use crate::http::{Headers, HttpRequest, Response, ResponseMetadata};

    /// `Transport` backed by a pooled `reqwest::Client`.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
            let client = reqwest::Client::builder()
                .timeout(config.timeout)
                .connect_timeout(config.connect_timeout)
                .user_agent(config.user_agent.as_str())
                .build()
                .map_err(|e| TransportError::other(format!("failed to build client: {e}")))?;
            Ok(Self { client })
        }

        pub fn from_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn send(&self, request: &HttpRequest) -> Result<Response, TransportError> {
            let mut builder = self
                .client
                .request(request.method.into(), request.url.clone());
            for (name, value) in request.headers.iter() {
                builder = builder.header(name, value);
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = response_headers(response.headers());
            let body = response.bytes().await?.to_vec();
            trace!(status, bytes = body.len(), "received response");

            Ok(Response {
                metadata: ResponseMetadata::Http { status, headers },
                body,
            })
        }
    }

    /// Repeated header lines are joined into one comma-separated value.
    fn response_headers(map: &reqwest::header::HeaderMap) -> Headers {
        let mut headers = Headers::new();
        for (name, value) in map {
            if let Ok(value) = value.to_str() {
                headers.append(name.as_str(), value);
            }
        }
        headers
    }

}
