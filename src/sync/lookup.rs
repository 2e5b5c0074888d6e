//! Card and list resolution on the configured board.
//!
//! Lookup failures are never fatal: they are logged and reported as "not
//! found" so the remaining cards of an event still get synced.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::trello::{Card, TrelloApi};

/// Resolves card numbers and list names on one board.
#[derive(Clone)]
pub struct CardLookup {
    trello: Arc<dyn TrelloApi>,
    board_id: String,
}

impl CardLookup {
    pub fn new(trello: Arc<dyn TrelloApi>, board_id: impl Into<String>) -> Self {
        Self {
            trello,
            board_id: board_id.into(),
        }
    }

    /// The card with board-local number `candidate_id`, if it exists.
    pub async fn resolve_card(&self, candidate_id: &str) -> Option<Card> {
        if candidate_id.is_empty() {
            return None;
        }

        match self.trello.find_card(&self.board_id, candidate_id).await {
            Ok(Some(card)) => {
                debug!(short_id = %candidate_id, card = %card.id, "Resolved card");
                Some(card)
            }
            Ok(None) => {
                warn!(
                    short_id = %candidate_id,
                    board = %self.board_id,
                    "No card with this number on the board"
                );
                None
            }
            Err(e) => {
                error!(short_id = %candidate_id, error = %e, "Card lookup failed");
                None
            }
        }
    }

    /// Id of the open list called exactly `list_name`.
    ///
    /// `None` without a network call when no name is configured.
    pub async fn resolve_list(&self, list_name: Option<&str>) -> Option<String> {
        let name = list_name.filter(|n| !n.is_empty())?;

        let lists = match self.trello.lists_on_board(&self.board_id).await {
            Ok(lists) => lists,
            Err(e) => {
                error!(list = %name, error = %e, "Failed to fetch board lists");
                return None;
            }
        };

        let found = lists
            .into_iter()
            .filter(|l| !l.closed)
            .find(|l| l.name == name)
            .map(|l| l.id);

        if found.is_none() {
            warn!(list = %name, board = %self.board_id, "No open list with this name");
        }
        found
    }
}
