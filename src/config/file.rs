//! Writing settings back to the config file.
//!
//! Uses `toml_edit` so unrelated keys and comments survive an update, and
//! writes through a temp file in the same directory so a crash never leaves
//! a half-written config behind.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use toml_edit::{DocumentMut, value};

use crate::error::ConfigError;
use crate::llm::Provider;

/// Values to store. `None` leaves the existing key untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub api_key: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub jira_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub jira_project: Option<String>,
}

impl ConfigUpdate {
    /// `(key, value)` pairs that are set, in file order.
    fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("api_key", &self.api_key),
            ("provider", &self.provider),
            ("model", &self.model),
            ("jira_url", &self.jira_url),
            ("jira_email", &self.jira_email),
            ("jira_token", &self.jira_token),
            ("jira_project", &self.jira_project),
        ]
        .into_iter()
        .filter_map(|(key, v)| v.as_deref().map(|v| (key, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Apply `update` to the file at `path`, creating it if needed.
///
/// Returns the keys that were written. The provider name is validated
/// before anything touches the disk.
pub fn apply_update(path: &Path, update: &ConfigUpdate) -> Result<Vec<&'static str>, ConfigError> {
    if let Some(provider) = update.provider.as_deref() {
        provider.parse::<Provider>()?;
    }

    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut doc = existing
        .parse::<DocumentMut>()
        .map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut written = Vec::new();
    for (key, v) in update.entries() {
        doc[key] = value(v);
        written.push(key);
    }

    if !written.is_empty() {
        write_atomic(path, &doc.to_string())?;
    }

    Ok(written)
}

/// Write `content` to `path` via a temp file and rename.
///
/// `NamedTempFile` is created with mode 0600 on Unix, which the renamed
/// file keeps; the config holds API tokens.
fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let write_err = |message: String| ConfigError::Write {
        path: path.to_path_buf(),
        message,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| write_err(e.to_string()))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| write_err(e.to_string()))?;
    tmp.persist(path).map_err(|e| write_err(e.error.to_string()))?;

    Ok(())
}
