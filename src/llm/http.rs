//! Shared HTTP plumbing for the provider backends.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{ConfigError, GenerationError};

/// Build a client whose every request is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::Http(e.to_string()))
}

/// Map a send/read failure to a generation error.
pub(crate) fn transport_error(
    provider: &'static str,
    err: reqwest::Error,
    timeout: Duration,
) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout {
            provider,
            seconds: timeout.as_secs(),
        }
    } else {
        GenerationError::Transport {
            provider,
            message: err.to_string(),
        }
    }
}

/// Read the body, fail on a non-2xx status, and decode JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: Response,
    timeout: Duration,
) -> Result<T, GenerationError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e, timeout))?;

    if !status.is_success() {
        return Err(GenerationError::Http {
            provider,
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| GenerationError::InvalidResponse {
        provider,
        message: e.to_string(),
    })
}

/// Pull `error.message` out of a JSON error body, else return the body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
