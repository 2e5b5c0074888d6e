//! Applies the configured card action (attachment or comment).

use std::sync::Arc;

use tracing::{debug, error, info};

use super::guard::{IdempotencyGuard, compose_comment};
use crate::config::CardAction;
use crate::trello::TrelloApi;

/// What an event contributes to a card.
#[derive(Debug, Clone, Copy)]
pub struct ActionPayload<'a> {
    pub user: &'a str,
    pub message: &'a str,
    pub url: &'a str,
}

/// Result of applying an action to one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A new attachment or comment was written.
    Written,
    /// An identical attachment or comment already existed.
    AlreadyPresent,
    /// The configured action kind does nothing.
    Skipped,
    /// Trello rejected the read or the write. Already logged.
    Failed,
}

impl ActionOutcome {
    /// True unless the call failed.
    pub fn is_ok(self) -> bool {
        !matches!(self, ActionOutcome::Failed)
    }
}

/// Applies one [`CardAction`] to resolved cards.
#[derive(Clone)]
pub struct ActionDispatcher {
    trello: Arc<dyn TrelloApi>,
    guard: IdempotencyGuard,
    action: CardAction,
}

impl ActionDispatcher {
    pub fn new(trello: Arc<dyn TrelloApi>, action: CardAction) -> Self {
        Self {
            guard: IdempotencyGuard::new(trello.clone()),
            trello,
            action,
        }
    }

    pub async fn apply_action(&self, card_id: &str, payload: ActionPayload<'_>) -> ActionOutcome {
        match &self.action {
            CardAction::Attachment => self.attach(card_id, payload.url).await,
            CardAction::Comment => {
                let text = compose_comment(payload.user, payload.message, payload.url);
                self.comment(card_id, &text).await
            }
            CardAction::NotConfigured | CardAction::Unsupported(_) => {
                debug!(card = %card_id, action = %self.action.label(), "No card action to apply");
                ActionOutcome::Skipped
            }
        }
    }

    async fn attach(&self, card_id: &str, url: &str) -> ActionOutcome {
        match self.guard.has_attachment(card_id, url).await {
            Ok(true) => {
                info!(card = %card_id, url = %url, "Attachment already present");
                return ActionOutcome::AlreadyPresent;
            }
            Ok(false) => {}
            Err(e) => {
                error!(card = %card_id, error = %e, "Failed to read attachments");
                return ActionOutcome::Failed;
            }
        }

        match self.trello.add_attachment(card_id, url).await {
            Ok(()) => {
                info!(card = %card_id, url = %url, "Attached link to card");
                ActionOutcome::Written
            }
            Err(e) => {
                error!(card = %card_id, url = %url, error = %e, "Failed to add attachment");
                ActionOutcome::Failed
            }
        }
    }

    async fn comment(&self, card_id: &str, text: &str) -> ActionOutcome {
        match self.guard.has_comment(card_id, text).await {
            Ok(true) => {
                info!(card = %card_id, "Comment already present");
                return ActionOutcome::AlreadyPresent;
            }
            Ok(false) => {}
            Err(e) => {
                error!(card = %card_id, error = %e, "Failed to read comments");
                return ActionOutcome::Failed;
            }
        }

        match self.trello.add_comment(card_id, text).await {
            Ok(()) => {
                info!(card = %card_id, "Commented on card");
                ActionOutcome::Written
            }
            Err(e) => {
                error!(card = %card_id, error = %e, "Failed to add comment");
                ActionOutcome::Failed
            }
        }
    }
}
