//! Read-before-write duplicate check.
//!
//! Trello itself is the only record of what was already synced, so every
//! write is preceded by a read of the card's current attachments or
//! comments. Two concurrent runs can still both pass the check.

use std::sync::Arc;

use crate::error::TrelloError;
use crate::trello::TrelloApi;

/// Text of the comment posted for an event.
pub fn compose_comment(user: &str, message: &str, url: &str) -> String {
    format!("{user}: {message} {url}")
}

/// Checks whether an equivalent attachment or comment already exists.
#[derive(Clone)]
pub struct IdempotencyGuard {
    trello: Arc<dyn TrelloApi>,
}

impl IdempotencyGuard {
    pub fn new(trello: Arc<dyn TrelloApi>) -> Self {
        Self { trello }
    }

    /// True if the card already has an attachment with exactly this URL.
    pub async fn has_attachment(&self, card_id: &str, url: &str) -> Result<bool, TrelloError> {
        let attachments = self.trello.list_attachments(card_id).await?;
        Ok(attachments.iter().any(|a| a.url == url))
    }

    /// True if the card already has a comment with exactly this text.
    pub async fn has_comment(&self, card_id: &str, composed_text: &str) -> Result<bool, TrelloError> {
        let comments = self.trello.list_comments(card_id).await?;
        Ok(comments.iter().any(|c| c.text() == composed_text))
    }
}
