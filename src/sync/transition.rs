//! Which list a card moves to after an event.
//!
//! | event        | condition                 | list                |
//! |--------------|---------------------------|---------------------|
//! | commit       | GitHub merge commit       | pull request closed |
//! | commit       | otherwise                 | commit              |
//! | pull request | open / closed             | pr open / pr closed |
//! | issue        | open / closed             | pr open / pr closed |
//!
//! Nothing is stored: the target is derived from the event on every run.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::lookup::CardLookup;
use crate::config::ListNames;
use crate::events::{EventState, SyncEvent};
use crate::references::is_merge_commit;
use crate::trello::TrelloApi;

/// Configured list an event maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTarget {
    Commit,
    PullRequestOpen,
    PullRequestClosed,
}

impl ListTarget {
    /// Target list for an event, from its current fields.
    pub fn for_event(event: &SyncEvent) -> Self {
        match event {
            SyncEvent::Commit(commit) if is_merge_commit(&commit.message) => {
                ListTarget::PullRequestClosed
            }
            SyncEvent::Commit(_) => ListTarget::Commit,
            SyncEvent::PullRequest(pr) => Self::for_state(pr.state),
            SyncEvent::Issue(issue) => Self::for_state(issue.state),
        }
    }

    fn for_state(state: EventState) -> Self {
        match state {
            EventState::Open => ListTarget::PullRequestOpen,
            EventState::Closed => ListTarget::PullRequestClosed,
        }
    }
}

/// Moves cards to the list configured for an event.
#[derive(Clone)]
pub struct ListTransitionPolicy {
    trello: Arc<dyn TrelloApi>,
    lookup: CardLookup,
    lists: ListNames,
}

impl ListTransitionPolicy {
    pub fn new(trello: Arc<dyn TrelloApi>, lookup: CardLookup, lists: ListNames) -> Self {
        Self {
            trello,
            lookup,
            lists,
        }
    }

    /// Configured list name for a target.
    pub fn list_name(&self, target: ListTarget) -> Option<&str> {
        match target {
            ListTarget::Commit => self.lists.commit.as_deref(),
            ListTarget::PullRequestOpen => self.lists.pull_request_open.as_deref(),
            ListTarget::PullRequestClosed => self.lists.pull_request_closed.as_deref(),
        }
    }

    /// Move `card_id` to the list for `event`. Returns whether a move happened.
    ///
    /// An unconfigured or unknown list is not an error; a failed move is logged.
    pub async fn apply(&self, card_id: &str, event: &SyncEvent) -> bool {
        let target = ListTarget::for_event(event);
        let Some(name) = self.list_name(target) else {
            debug!(card = %card_id, ?target, "No list configured for this event");
            return false;
        };
        let Some(list_id) = self.lookup.resolve_list(Some(name)).await else {
            return false;
        };

        match self.trello.move_card(card_id, &list_id).await {
            Ok(()) => {
                info!(card = %card_id, list = %name, "Moved card");
                true
            }
            Err(e) => {
                error!(card = %card_id, list = %name, error = %e, "Failed to move card");
                false
            }
        }
    }
}
