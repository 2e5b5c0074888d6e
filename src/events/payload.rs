//! Parsing of the GitHub Actions event file (`GITHUB_EVENT_PATH`).

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::{EventPayload, EventState, IssueEvent, PullRequestEvent};
use crate::error::PayloadError;

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    pull_request: Option<RawPullRequest>,
    #[serde(default)]
    issue: Option<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    html_url: String,
    #[serde(default)]
    title: Option<String>,
    state: String,
    head: RawHead,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawHead {
    #[serde(rename = "ref")]
    git_ref: String,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    html_url: String,
    #[serde(default)]
    title: Option<String>,
    state: String,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
    #[serde(default)]
    name: Option<String>,
}

impl RawUser {
    fn display_name(self) -> String {
        self.name.filter(|n| !n.is_empty()).unwrap_or(self.login)
    }
}

fn parse_state(field: &str, raw: &str) -> Result<EventState, PayloadError> {
    EventState::parse(raw).ok_or_else(|| PayloadError::InvalidField {
        field: field.to_string(),
        reason: format!("expected \"open\" or \"closed\", got {raw:?}"),
    })
}

/// Title with surrounding whitespace removed, or `None` if nothing is left.
fn non_empty_title(title: Option<String>) -> Option<String> {
    title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl EventPayload {
    /// Parse a GitHub event body. Commits are not read from the event;
    /// attach them with [`EventPayload::with_commits`].
    pub fn from_github_event(json: &str) -> Result<Self, PayloadError> {
        let raw: RawEvent = serde_json::from_str(json)?;

        let pull_request = match raw.pull_request {
            Some(pr) => match non_empty_title(pr.title) {
                Some(title) => Some(PullRequestEvent {
                    url: pr.html_url,
                    title,
                    state: parse_state("pull_request.state", &pr.state)?,
                    head_ref: pr.head.git_ref,
                    user: pr.user.display_name(),
                }),
                None => {
                    debug!(url = %pr.html_url, "Pull request has no title, skipping");
                    None
                }
            },
            None => None,
        };

        let issue = match raw.issue {
            Some(issue) => match non_empty_title(issue.title) {
                Some(title) => Some(IssueEvent {
                    url: issue.html_url,
                    title,
                    state: parse_state("issue.state", &issue.state)?,
                    user: issue.user.display_name(),
                }),
                None => {
                    debug!(url = %issue.html_url, "Issue has no title, skipping");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            commits: Vec::new(),
            pull_request,
            issue,
        })
    }

    /// Read and parse an event file.
    pub async fn from_event_file(path: &Path) -> Result<Self, PayloadError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PayloadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_github_event(&json)
    }
}
