//! Jira integration: open a ticket for a newly pushed branch.

pub mod client;

use async_trait::async_trait;

use crate::error::TicketError;

pub use client::JiraClient;

/// Separator between the issue key and the message in a ticket title.
pub const TITLE_SEPARATOR: &str = " - ";

/// Jira connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JiraConfig {
    /// e.g. `https://yourcompany.atlassian.net`
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    /// Project key, e.g. `PROJ`.
    pub project: String,
}

impl JiraConfig {
    /// All four settings are present.
    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty()
            && !self.email.is_empty()
            && !self.api_token.is_empty()
            && !self.project.is_empty()
    }
}

/// A tracker that can open work items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketService: Send + Sync {
    /// Whether enough settings exist to talk to the tracker.
    fn is_configured(&self) -> bool;

    /// Create an item titled `message`, move it to "In Progress" if possible,
    /// and return `"<KEY> - <message>"`.
    async fn create_with_title(&self, message: &str) -> Result<String, TicketError>;

    /// Browser URL for an issue key.
    fn issue_url(&self, key: &str) -> String;
}

/// Split `"<KEY> - <message>"` into its key.
///
/// Without the separator the whole title is taken as the key.
pub fn parse_ticket_key(title: &str) -> &str {
    title
        .split_once(TITLE_SEPARATOR)
        .map(|(key, _)| key)
        .unwrap_or(title)
}
