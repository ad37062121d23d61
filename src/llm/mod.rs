//! Commit message generation through an AI provider.
//!
//! The workflow only sees [`MessageGenerator`]. The two HTTP backends
//! implement the smaller [`ChatBackend`] and are wrapped by
//! [`CommitGenerator`], which owns prompt building, retries, and cleanup.

pub mod anthropic;
pub mod http;
pub mod openai;
pub mod prompt;
pub mod retry;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ConfigError, GenerationError};

pub use anthropic::AnthropicBackend;
pub use openai::OpenAiBackend;
pub use prompt::{MAX_DIFF_LENGTH, TRUNCATION_MARKER, build_commit_prompt, truncate_diff};

use self::prompt::clean_message;
use self::retry::retry_with_backoff;

/// Supported AI providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    /// Identifier used in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }

    /// Build the generator for this provider against its public API.
    pub fn generator(
        &self,
        api_key: &str,
        model: Option<&str>,
        timeout: Duration,
    ) -> Result<Box<dyn MessageGenerator>, ConfigError> {
        let base_url = match self {
            Provider::OpenAi => openai::DEFAULT_BASE_URL,
            Provider::Anthropic => anthropic::DEFAULT_BASE_URL,
        };
        self.generator_at(base_url, api_key, model, timeout)
    }

    /// Build the generator for this provider against `base_url`.
    pub fn generator_at(
        &self,
        base_url: &str,
        api_key: &str,
        model: Option<&str>,
        timeout: Duration,
    ) -> Result<Box<dyn MessageGenerator>, ConfigError> {
        let client = http::build_client(timeout)?;
        let model = model.unwrap_or(self.default_model());

        Ok(match self {
            Provider::OpenAi => Box::new(CommitGenerator::new(OpenAiBackend::new(
                client, base_url, api_key, model, timeout,
            ))),
            Provider::Anthropic => Box::new(CommitGenerator::new(AnthropicBackend::new(
                client, base_url, api_key, model, timeout,
            ))),
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(ConfigError::InvalidProvider(other.to_string())),
        }
    }
}

/// Turns a diff into one commit message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(
        &self,
        diff: &str,
        changed_files: &[String],
    ) -> Result<String, GenerationError>;
}

/// One prompt in, one completion out.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Display name used in errors and logs.
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// [`MessageGenerator`] over any [`ChatBackend`].
pub struct CommitGenerator<B> {
    backend: B,
}

impl<B: ChatBackend> CommitGenerator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<B: ChatBackend> MessageGenerator for CommitGenerator<B> {
    async fn generate(
        &self,
        diff: &str,
        changed_files: &[String],
    ) -> Result<String, GenerationError> {
        if diff.trim().is_empty() {
            return Err(GenerationError::EmptyDiff);
        }

        let prompt = build_commit_prompt(diff, changed_files);
        debug!(
            provider = self.backend.name(),
            prompt_len = prompt.len(),
            files = changed_files.len(),
            "Built commit prompt"
        );

        let raw = retry_with_backoff(
            || self.backend.complete(&prompt),
            GenerationError::is_transient,
            |e| GenerationError::RetriesExhausted(Box::new(e)),
        )
        .await?;

        let message = clean_message(&raw);
        if message.is_empty() {
            return Err(GenerationError::EmptyResponse(self.backend.name()));
        }

        Ok(message)
    }
}
