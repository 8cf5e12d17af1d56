//! Service and transport configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::decoder::KeyDecodingStrategy;
use crate::http::Headers;

/// Settings fixed for the lifetime of a `NetworkService`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Headers every request starts from; endpoint headers override them.
    pub default_headers: Headers,
    /// Key mapping applied when decoding response bodies.
    pub key_decoding: KeyDecodingStrategy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_headers: Headers::json(),
            key_decoding: KeyDecodingStrategy::ConvertFromSnakeCase,
        }
    }
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Replace the default header set entirely.
    pub fn default_headers(mut self, headers: Headers) -> Self {
        self.config.default_headers = headers;
        self
    }

    /// Add or override one default header.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(name, value);
        self
    }

    pub fn key_decoding(mut self, strategy: KeyDecodingStrategy) -> Self {
        self.config.key_decoding = strategy;
        self
    }

    pub fn build(self) -> ServiceConfig {
        self.config
    }
}

/// Settings for `ReqwestTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Deadline for a whole request, surfaced as `NetworkError::Timeout`.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("netkit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl TransportConfig {
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// Builder for [`TransportConfig`].
#[derive(Debug, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> TransportConfig {
        self.config
    }
}
