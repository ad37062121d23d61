//! User settings: AI provider credentials and Jira integration.
//!
//! Settings live in a flat TOML file (`~/.gh-assistant.toml` by default).
//! Environment variables fill in the API key and provider when the file
//! does not set them.

pub mod file;

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::jira::JiraConfig;
use crate::llm::Provider;

pub use file::{ConfigUpdate, apply_update};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV_VAR: &str = "GH_ASSISTANT_CONFIG";

/// Config file name inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".gh-assistant.toml";

/// Default timeout for AI and Jira requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable to override the default request timeout.
const TIMEOUT_ENV_VAR: &str = "GH_ASSISTANT_AI_TIMEOUT";

const OPENAI_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
const ANTHROPIC_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";

/// Values read from the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub jira_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub jira_project: Option<String>,
}

/// Resolve the config file path.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = non_empty_env(CONFIG_PATH_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::HomeDirNotFound)
}

impl Settings {
    /// Load settings from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }

    /// Load settings from `path`. A missing file yields empty settings.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// API key from the file, then `OPENAI_API_KEY`, then `ANTHROPIC_API_KEY`.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        non_empty(self.api_key.as_deref())
            .map(String::from)
            .or_else(|| non_empty_env(OPENAI_KEY_ENV_VAR))
            .or_else(|| non_empty_env(ANTHROPIC_KEY_ENV_VAR))
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Provider from the file; otherwise Anthropic when its key is in the
    /// environment, else OpenAI.
    pub fn resolve_provider(&self) -> Result<Provider, ConfigError> {
        if let Some(name) = non_empty(self.provider.as_deref()) {
            return name.parse();
        }

        if non_empty_env(ANTHROPIC_KEY_ENV_VAR).is_some() {
            Ok(Provider::Anthropic)
        } else {
            Ok(Provider::OpenAi)
        }
    }

    /// Model override, if one is set.
    pub fn model_override(&self) -> Option<&str> {
        non_empty(self.model.as_deref())
    }

    /// Jira connection details; unset keys become empty strings.
    pub fn jira(&self) -> JiraConfig {
        JiraConfig {
            base_url: self
                .jira_url
                .as_deref()
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            email: self.jira_email.clone().unwrap_or_default(),
            api_token: self.jira_token.clone().unwrap_or_default(),
            project: self.jira_project.clone().unwrap_or_default(),
        }
    }
}

/// Request timeout for the AI backend and Jira.
///
/// Reads `GH_ASSISTANT_AI_TIMEOUT` (seconds) and logs a warning when the
/// value is not a number.
pub fn request_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Mask a secret for display: `sk-a...wxyz`, or `****` when short.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "****".to_string()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
