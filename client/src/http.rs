//! reqwest-backed shortener client

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shortener_bench_core::{ServiceClient, ServiceError, TransportConfig};
use tokio::sync::Semaphore;

use crate::error::ClientError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EncodeRequest<'a> {
    original_url: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncodeResponse {
    shortened_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecodeResponse {
    original_url: String,
}

/// Shortener client over a shared reqwest connection pool
///
/// Cloning is cheap; clones share the pool and the connection limit.
#[derive(Clone)]
pub struct HttpServiceClient {
    client: Client,
    base_url: String,
    connections: Arc<Semaphore>,
    max_connections: usize,
}

impl HttpServiceClient {
    /// Build a client for `base_url` with the given transport settings
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL or the
    /// underlying reqwest client cannot be built.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .connect_timeout(transport.connect_timeout())
            .read_timeout(transport.read_timeout())
            .pool_max_idle_per_host(transport.max_connections_per_host)
            .build()?;

        tracing::debug!(
            base_url,
            max_connections = transport.max_connections,
            max_connections_per_host = transport.max_connections_per_host,
            "HTTP client ready"
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            connections: Arc::new(Semaphore::new(transport.max_connections.max(1))),
            max_connections: transport.max_connections,
        })
    }

    /// Base URL requests are sent to, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn encode_url(&self) -> String {
        format!("{}/encode", self.base_url)
    }

    fn decode_url(&self, shortened: &str) -> String {
        format!(
            "{}/decode?shortenedUrl={}",
            self.base_url,
            urlencoding::encode(shortened)
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ServiceError> {
        // Held until the body is read so the limit covers the whole exchange
        let _permit = self
            .connections
            .acquire()
            .await
            .map_err(ServiceError::transport)?;

        let response = request.send().await.map_err(ServiceError::transport)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ServiceError::Status {
                code: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(ServiceError::transport)?;
        serde_json::from_slice(&body).map_err(ServiceError::decode)
    }
}

#[async_trait]
impl ServiceClient for HttpServiceClient {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn transform(&self, input: &str) -> Result<String, ServiceError> {
        let request = self
            .client
            .post(self.encode_url())
            .json(&EncodeRequest { original_url: input });
        let response: EncodeResponse = self.send(request).await?;
        Ok(response.shortened_url)
    }

    async fn inverse(&self, value: &str) -> Result<String, ServiceError> {
        let request = self.client.get(self.decode_url(value));
        let response: DecodeResponse = self.send(request).await?;
        Ok(response.original_url)
    }
}

impl std::fmt::Debug for HttpServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServiceClient")
            .field("base_url", &self.base_url)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}
