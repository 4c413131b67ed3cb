use thiserror::Error;

/// Failure constructing a client. Request failures are reported as
/// [`bcv_core::NetworkError`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
