// ==============================================================================
// client.rs - NCBI Variation Services Client
// ==============================================================================
// Description: HTTP client for ALFA allele frequencies (RefSNP frequency API)
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Endpoint: GET {base_url}/refsnp/{numeric id}/frequency
// Docs: https://api.ncbi.nlm.nih.gov/variation/v0
// ==============================================================================

use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::frequency::FrequencyResponse;

pub const DEFAULT_BASE_URL: &str = "https://api.ncbi.nlm.nih.gov/variation/v0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Longest error body kept in ClientError::Api
const MAX_ERROR_BODY: usize = 200;

/// Client settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Service root, without the trailing "/refsnp"
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Errors that can occur while calling the variation service
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Network error for rs{id}: {source}")]
    Network {
        id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API returned HTTP {status} for rs{id}")]
    Api { id: String, status: u16, body: String },

    #[error("Invalid JSON for rs{id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of RefSNP frequency payloads
#[allow(async_fn_in_trait)]
pub trait FrequencySource {
    /// Fetch the frequency payload for a numeric RefSNP id ("12345" for rs12345)
    async fn fetch_frequency(&self, numeric_id: &str) -> Result<FrequencyResponse, ClientError>;
}

/// ALFA client backed by reqwest
#[derive(Debug, Clone)]
pub struct AlfaClient {
    http: Client,
    base_url: String,
}

impl AlfaClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|_| ClientError::InvalidBaseUrl(config.base_url.clone()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(config.base_url));
        }

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("alff/", env!("CARGO_PKG_VERSION")));

        // Local mirrors and test servers bypass any system proxy
        if matches!(
            parsed.host_str(),
            Some("localhost") | Some("127.0.0.1") | Some("[::1]")
        ) {
            builder = builder.no_proxy();
        }

        let http = builder.build().map_err(ClientError::Build)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn frequency_url(&self, numeric_id: &str) -> String {
        format!("{}/refsnp/{}/frequency", self.base_url, numeric_id)
    }
}

impl FrequencySource for AlfaClient {
    async fn fetch_frequency(&self, numeric_id: &str) -> Result<FrequencyResponse, ClientError> {
        let url = self.frequency_url(numeric_id);
        debug!("GET {}", url);

        let network = |source| ClientError::Network {
            id: numeric_id.to_string(),
            source,
        };

        let response = self.http.get(&url).send().await.map_err(network)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                id: numeric_id.to_string(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body = response.text().await.map_err(network)?;

        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            id: numeric_id.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{alfa_payload, spawn_mock};
    use serde_json::json;

    fn client_for(base_url: &str) -> AlfaClient {
        AlfaClient::new(ClientConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.ncbi.nlm.nih.gov/variation/v0");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_frequency_url() {
        let client = client_for("https://api.ncbi.nlm.nih.gov/variation/v0/");
        assert_eq!(client.base_url(), "https://api.ncbi.nlm.nih.gov/variation/v0");
        assert_eq!(
            client.frequency_url("429358"),
            "https://api.ncbi.nlm.nih.gov/variation/v0/refsnp/429358/frequency"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = AlfaClient::new(ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        });
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl(_))));

        let result = AlfaClient::new(ClientConfig {
            base_url: "ftp://example.org".to_string(),
            ..ClientConfig::default()
        });
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_frequency() {
        let mock = spawn_mock(vec![(
            "429358",
            200,
            alfa_payload("T", vec![("SAMN10492695", vec![("T", 86), ("C", 14)])]),
        )])
        .await;

        let response = client_for(&mock.base_url)
            .fetch_frequency("429358")
            .await
            .unwrap();

        let interval = response.first_interval().unwrap();
        assert_eq!(interval.reference.as_deref(), Some("T"));
        assert_eq!(
            interval.counts["PRJNA507278"].allele_counts["SAMN10492695"]["C"],
            14
        );
        assert_eq!(mock.hits(), 1);
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let mock = spawn_mock(vec![]).await;

        let result = client_for(&mock.base_url).fetch_frequency("1").await;
        match result {
            Err(ClientError::Api { id, status, body }) => {
                assert_eq!(id, "1");
                assert_eq!(status, 404);
                assert!(body.contains("Unknown"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decode_error() {
        let mock = spawn_mock(vec![("7", 200, json!(["not", "an", "object"]))]).await;

        let result = client_for(&mock.base_url).fetch_frequency("7").await;
        assert!(matches!(result, Err(ClientError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_network_error() {
        // Bind then drop a listener so the port is closed
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client_for(&format!("http://{}", addr))
            .fetch_frequency("1")
            .await;
        assert!(matches!(result, Err(ClientError::Network { .. })));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        // Accepts the connection but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let client = AlfaClient::new(ClientConfig {
            base_url: format!("http://{}", addr),
            timeout: Duration::from_millis(300),
        })
        .unwrap();

        let started = std::time::Instant::now();
        let result = client.fetch_frequency("1").await;

        assert!(matches!(result, Err(ClientError::Network { .. })));
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }
}
