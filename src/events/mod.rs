//! Source-control events that can reference Trello cards.
//!
//! Commits come from local git history, pull requests and issues from the
//! CI event payload. Everything is validated into these types before it
//! reaches the sync engine.

mod payload;

use std::fmt;

/// The three kinds of event the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Commit,
    PullRequest,
    Issue,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Commit => "commit",
            EventKind::PullRequest => "pull request",
            EventKind::Issue => "issue",
        })
    }
}

/// Open/closed state of a pull request or issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventState {
    Open,
    Closed,
}

impl EventState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(EventState::Open),
            "closed" => Some(EventState::Closed),
            _ => None,
        }
    }
}

/// A commit from local history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    /// Browser URL of the commit.
    pub url: String,
    /// Full commit message.
    pub message: String,
    /// Author name.
    pub author: String,
}

/// A pull request from the CI event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub url: String,
    pub title: String,
    pub state: EventState,
    /// Name of the head branch.
    pub head_ref: String,
    pub user: String,
}

/// An issue from the CI event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueEvent {
    pub url: String,
    pub title: String,
    pub state: EventState,
    pub user: String,
}

/// Any single event, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Commit(CommitEvent),
    PullRequest(PullRequestEvent),
    Issue(IssueEvent),
}

impl SyncEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SyncEvent::Commit(_) => EventKind::Commit,
            SyncEvent::PullRequest(_) => EventKind::PullRequest,
            SyncEvent::Issue(_) => EventKind::Issue,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            SyncEvent::Commit(c) => &c.url,
            SyncEvent::PullRequest(pr) => &pr.url,
            SyncEvent::Issue(issue) => &issue.url,
        }
    }

    /// Who authored the event.
    pub fn user(&self) -> &str {
        match self {
            SyncEvent::Commit(c) => &c.author,
            SyncEvent::PullRequest(pr) => &pr.user,
            SyncEvent::Issue(issue) => &issue.user,
        }
    }

    /// Commit message, or pull request / issue title.
    pub fn text(&self) -> &str {
        match self {
            SyncEvent::Commit(c) => &c.message,
            SyncEvent::PullRequest(pr) => &pr.title,
            SyncEvent::Issue(issue) => &issue.title,
        }
    }
}

/// Everything one CI run has to sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPayload {
    /// Commits, oldest first.
    pub commits: Vec<CommitEvent>,
    pub pull_request: Option<PullRequestEvent>,
    pub issue: Option<IssueEvent>,
}

impl EventPayload {
    pub fn with_commits(mut self, commits: Vec<CommitEvent>) -> Self {
        self.commits = commits;
        self
    }

    /// Flatten into processing order: commits, then the pull request, then the issue.
    pub fn into_events(self) -> Vec<SyncEvent> {
        let mut events: Vec<SyncEvent> = self.commits.into_iter().map(SyncEvent::Commit).collect();
        events.extend(self.pull_request.map(SyncEvent::PullRequest));
        events.extend(self.issue.map(SyncEvent::Issue));
        events
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.pull_request.is_none() && self.issue.is_none()
    }
}
