//! gh-assistant - commit staged work with an AI-generated message, push it,
//! and open a Jira ticket for new branches.
//!
//! # Overview
//!
//! The `push` pipeline inspects the working tree through [`git::RepoInspector`],
//! asks a [`llm::MessageGenerator`] (OpenAI or Anthropic) for a conventional
//! commit message, confirms it with the user, commits, pushes, and on the first
//! push of a feature branch creates a ticket through [`jira::TicketService`].

pub mod config;
pub mod error;
pub mod git;
pub mod jira;
pub mod llm;
pub mod push;

// Re-export commonly used types
pub use error::{ConfigError, GenerationError, GitError, PushError, TicketError};
pub use git::{BranchContext, GitCli, RepoInspector, UnpushedCommit};
pub use jira::{JiraClient, JiraConfig, TicketService};
pub use llm::{MessageGenerator, Provider};
pub use push::{PushReport, PushRequest, PushSummary, run_push};
