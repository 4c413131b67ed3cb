//! Shared GET-and-decode path with consistent error mapping.
//!
//! | Failure | Error |
//! |---|---|
//! | unparseable URL, non-HTTP scheme | `BadRequestTarget` |
//! | transport failure, timeout, empty body | `MissingBody` |
//! | non-2xx status | `NonSuccessStatus` |
//! | body is not JSON or has the wrong shape | `MalformedBody` |

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use bcv_core::NetworkError;

use crate::config::ClientConfig;
use crate::error::ClientError;

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub(crate) fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("bcv/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub(crate) async fn get_json(&self, target: &str) -> Result<Value, NetworkError> {
        let url = Url::parse(target)
            .map_err(|e| NetworkError::BadRequestTarget(format!("{target}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NetworkError::BadRequestTarget(format!(
                "{target}: unsupported scheme {}",
                url.scheme()
            )));
        }

        tracing::debug!(%url, "GET");
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %target, error = %e, "request failed");
                NetworkError::MissingBody(target.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NetworkError::NonSuccessStatus {
                target: target.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|_| NetworkError::MissingBody(target.to_string()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(NetworkError::MissingBody(target.to_string()));
        }
        serde_json::from_slice(&body).map_err(|e| NetworkError::MalformedBody {
            target: target.to_string(),
            reason: e.to_string(),
        })
    }

    /// GET `target` and decode the body into `T`.
    pub(crate) async fn get<T: DeserializeOwned>(&self, target: &str) -> Result<T, NetworkError> {
        let value = self.get_json(target).await?;
        serde_json::from_value(value).map_err(|e| NetworkError::MalformedBody {
            target: target.to_string(),
            reason: e.to_string(),
        })
    }
}
