//! Error types for gh-assistant modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git queries and mutations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git not found on PATH. Install git and try again.")]
    NotInstalled,

    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("`{command}` failed: {cause}")]
    Query { command: String, cause: String },

    #[error("`{command}` failed: {cause}")]
    Mutation { command: String, cause: String },

    #[error("Failed to commit: {cause}")]
    Commit { cause: String },

    #[error("No git remote configured. Add one with `git remote add origin <url>`.")]
    NoRemote,
}

/// Errors from commit message generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No diff provided")]
    EmptyDiff,

    #[error("{provider} API returned status {status}: {message}")]
    Http {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} API error: {message}")]
    Api {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} request timed out after {seconds} seconds")]
    Timeout { provider: &'static str, seconds: u64 },

    #[error("No response from {0} API")]
    EmptyResponse(&'static str),

    #[error("Failed to parse {provider} response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<GenerationError>),
}

impl GenerationError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Timeout { .. } | GenerationError::Transport { .. } => true,
            GenerationError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors from Jira API operations.
#[derive(Error, Debug)]
pub enum TicketError {
    #[error("Jira request failed: {0}")]
    Request(String),

    #[error("Jira API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse Jira response: {0}")]
    InvalidResponse(String),

    #[error("No 'In Progress' transition available for issue {0}")]
    NoTransition(String),
}

/// Errors from loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    HomeDirNotFound,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to save config file {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Invalid provider: {0} (use 'openai' or 'anthropic')")]
    InvalidProvider(String),

    #[error(
        "API key not configured. Set it up using one of:\n  \
         1. Run: gh-assistant config --api-key YOUR_KEY\n  \
         2. Set environment variable: export OPENAI_API_KEY=your_key\n  \
         3. Set environment variable: export ANTHROPIC_API_KEY=your_key"
    )]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    Http(String),
}

/// Errors from the commit-and-push workflow.
#[derive(Error, Debug)]
pub enum PushError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("Failed to generate commit message: {0}")]
    Generation(#[from] GenerationError),

    #[error("No changes to commit or push")]
    NoChanges,

    #[error(
        "You have unstaged changes. Use -a flag to stage all, or stage manually with 'git add'"
    )]
    NoStagedChanges,

    #[error("No changes detected")]
    EmptyDiff,

    #[error("Failed to push: {upstream} (plain push also failed: {plain})")]
    PushFailed {
        #[source]
        upstream: GitError,
        plain: GitError,
    },
}
