use serde_json::Value;

use bcv_core::NetworkError;
use bcv_validation::JsonFetcher;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::HttpClient;

/// Fetches issuer profiles and revocation lists over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpJsonFetcher {
    http: HttpClient,
}

impl HttpJsonFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }
}

impl JsonFetcher for HttpJsonFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, NetworkError> {
        self.http.get_json(url).await
    }
}
