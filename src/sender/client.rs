use crate::domain::Category;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

/// Per-attempt deadline mandated by the ingestion endpoint contract.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Request timeout after {0:?}")]
    RequestTimeout(Duration),
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("rask-log-shipper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// One delivery attempt of an encoded record.
///
/// Implementations report only whether the endpoint accepted the body; every
/// fault is absorbed and reported as `false`.
pub trait Transport: Send + 'static {
    fn attempt_delivery(
        &self,
        category: Category,
        body: Bytes,
    ) -> impl Future<Output = bool> + Send;
}

/// Transport that POSTs to `{endpoint}/api/ingestion/{app_id}/{queue_path}`.
///
/// Idle connections are not pooled, so every attempt dials a fresh
/// connection and a broken socket cannot leak into the next attempt.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
    logs_url: Url,
    performances_url: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &Url, app_id: &str, config: ClientConfig) -> Result<Self, ClientError> {
        let logs_url = ingestion_url(endpoint, app_id, Category::Log)?;
        let performances_url = ingestion_url(endpoint, app_id, Category::Performance)?;

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ClientError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            logs_url,
            performances_url,
        })
    }

    pub fn ingestion_url(&self, category: Category) -> &Url {
        match category {
            Category::Log => &self.logs_url,
            Category::Performance => &self.performances_url,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends one body and classifies the response.
    pub async fn post(&self, category: Category, body: Bytes) -> Result<StatusCode, ClientError> {
        let request = self
            .client
            .post(self.ingestion_url(category).clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .body(body);

        let response = timeout(self.config.timeout, request.send())
            .await
            .map_err(|_| ClientError::RequestTimeout(self.config.timeout))?
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::RequestTimeout(self.config.timeout)
                } else {
                    ClientError::NetworkError(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            Err(ClientError::HttpError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            })
        }
    }
}

impl Transport for HttpTransport {
    async fn attempt_delivery(&self, category: Category, body: Bytes) -> bool {
        let bytes = body.len();
        let start = Instant::now();

        match self.post(category, body).await {
            Ok(status) => {
                debug!(
                    queue = %category,
                    status = status.as_u16(),
                    bytes,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Record delivered"
                );
                true
            }
            Err(e) => {
                warn!(queue = %category, bytes, error = %e, "Delivery attempt failed");
                false
            }
        }
    }
}

fn ingestion_url(endpoint: &Url, app_id: &str, category: Category) -> Result<Url, ClientError> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|()| {
            ClientError::InvalidConfiguration(format!(
                "Endpoint cannot carry an ingestion path: {endpoint}"
            ))
        })?
        .pop_if_empty()
        .extend(["api", "ingestion", app_id, category.queue_path()]);
    Ok(url)
}
