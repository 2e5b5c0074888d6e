//! Trello capabilities consumed by the sync engine.
//!
//! The engine only talks to [`TrelloApi`]; [`TrelloClient`] is the REST
//! implementation used in production.

mod client;
#[cfg(test)]
pub(crate) mod fake;

pub use client::{TrelloClient, DEFAULT_API_BASE_URL};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TrelloError;

/// A card as returned by Trello.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Long Trello id.
    pub id: String,
}

/// A list (column) on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
}

/// A link attached to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub url: String,
}

/// A `commentCard` action on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub data: CommentData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub text: String,
}

impl Comment {
    pub fn text(&self) -> &str {
        &self.data.text
    }
}

/// The Trello operations the engine needs.
#[async_trait]
pub trait TrelloApi: Send + Sync {
    /// Look up a card by its board-local number. `Ok(None)` if no such card.
    async fn find_card(&self, board_id: &str, short_id: &str) -> Result<Option<Card>, TrelloError>;

    /// All lists on a board, including closed ones.
    async fn lists_on_board(&self, board_id: &str) -> Result<Vec<BoardList>, TrelloError>;

    async fn list_attachments(&self, card_id: &str) -> Result<Vec<Attachment>, TrelloError>;

    async fn add_attachment(&self, card_id: &str, url: &str) -> Result<(), TrelloError>;

    async fn list_comments(&self, card_id: &str) -> Result<Vec<Comment>, TrelloError>;

    async fn add_comment(&self, card_id: &str, text: &str) -> Result<(), TrelloError>;

    /// Put a card on another list.
    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<(), TrelloError>;
}
