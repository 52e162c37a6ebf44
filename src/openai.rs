//! OpenAI client configuration with sensible defaults.

use crate::error::{Result, TubeQueryError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub type OpenAIClient = Client<OpenAIConfig>;

/// Create an OpenAI client with configured timeout.
///
/// The API key is read from `OPENAI_API_KEY`.
pub fn create_client() -> Result<OpenAIClient> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<OpenAIClient> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TubeQueryError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}
