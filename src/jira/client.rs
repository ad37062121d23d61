//! Jira Cloud REST client (API v3).

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::TicketError;
use crate::jira::{JiraConfig, TITLE_SEPARATOR, TicketService};

/// Issue type used for every ticket.
const ISSUE_TYPE: &str = "Task";

/// Status that marks work as started.
const IN_PROGRESS: &str = "In Progress";

/// Transition names that move an issue into progress on common workflows.
const START_TRANSITIONS: [&str; 3] = [IN_PROGRESS, "Start Progress", "Start"];

/// A created issue.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    #[serde(rename = "self")]
    pub self_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransitionsResponse {
    #[serde(default)]
    transitions: Vec<Transition>,
}

#[derive(Debug, Clone, Deserialize)]
struct Transition {
    id: String,
    name: String,
    to: Option<TransitionTarget>,
}

#[derive(Debug, Clone, Deserialize)]
struct TransitionTarget {
    name: String,
}

#[derive(Serialize)]
struct TransitionRequest<'a> {
    transition: TransitionId<'a>,
}

#[derive(Serialize)]
struct TransitionId<'a> {
    id: &'a str,
}

pub struct JiraClient {
    client: Client,
    config: JiraConfig,
}

impl JiraClient {
    /// `client` should carry the same request timeout as the AI backend.
    pub fn new(client: Client, config: JiraConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/api/3/{}", self.config.base_url, path)
    }

    /// Create a Task in the configured project.
    pub async fn create_issue(&self, summary: &str) -> Result<Issue, TicketError> {
        let body = json!({
            "fields": {
                "project": { "key": self.config.project },
                "summary": summary,
                "issuetype": { "name": ISSUE_TYPE },
            }
        });

        let response = self
            .client
            .post(self.url("issue"))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| TicketError::Request(e.to_string()))?;

        let issue: Issue = read_json(response).await?;
        debug!(key = %issue.key, id = %issue.id, "Created Jira issue");
        Ok(issue)
    }

    /// Move an issue to "In Progress".
    pub async fn transition_to_in_progress(&self, key: &str) -> Result<(), TicketError> {
        let transitions = self.transitions(key).await?;
        let transition = pick_in_progress(&transitions)
            .ok_or_else(|| TicketError::NoTransition(key.to_string()))?;

        debug!(key, transition = %transition.name, "Transitioning Jira issue");

        let response = self
            .client
            .post(self.url(&format!("issue/{}/transitions", key)))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header("Accept", "application/json")
            .json(&TransitionRequest {
                transition: TransitionId { id: &transition.id },
            })
            .send()
            .await
            .map_err(|e| TicketError::Request(e.to_string()))?;

        ensure_success(response).await.map(|_| ())
    }

    async fn transitions(&self, key: &str) -> Result<Vec<Transition>, TicketError> {
        let response = self
            .client
            .get(self.url(&format!("issue/{}/transitions", key)))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TicketError::Request(e.to_string()))?;

        let parsed: TransitionsResponse = read_json(response).await?;
        Ok(parsed.transitions)
    }
}

#[async_trait]
impl TicketService for JiraClient {
    fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    async fn create_with_title(&self, message: &str) -> Result<String, TicketError> {
        let issue = self.create_issue(message).await?;

        // The issue exists at this point; a stuck workflow is not worth failing over.
        if let Err(e) = self.transition_to_in_progress(&issue.key).await {
            warn!(key = %issue.key, "Could not transition to In Progress: {}", e);
            eprintln!("Warning: Could not transition {} to In Progress: {}", issue.key, e);
        }

        Ok(format!("{}{}{}", issue.key, TITLE_SEPARATOR, message))
    }

    fn issue_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.config.base_url, key)
    }
}

/// First transition that starts work: by transition name, else by target status.
fn pick_in_progress(transitions: &[Transition]) -> Option<&Transition> {
    transitions
        .iter()
        .find(|t| {
            START_TRANSITIONS.contains(&t.name.as_str())
                || t.to.as_ref().is_some_and(|to| to.name == IN_PROGRESS)
        })
}

async fn ensure_success(response: Response) -> Result<String, TicketError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TicketError::Request(e.to_string()))?;

    if !status.is_success() {
        return Err(TicketError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TicketError> {
    let body = ensure_success(response).await?;
    serde_json::from_str(&body).map_err(|e| TicketError::InvalidResponse(e.to_string()))
}
