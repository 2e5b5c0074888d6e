//! Event processor: syncs every event of a CI run to its Trello cards.
//!
//! Flow per event:
//! 1. Extract card ids from the commit message / title (+ branch)
//! 2. Resolve each id on the board
//! 3. Apply the card action (read-before-write)
//! 4. Move the card to the list for the event
//!
//! Events run strictly in order (commits oldest first, then the pull
//! request, then the issue) and each finishes before the next starts, so
//! the last event touching a card decides where it ends up.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::dispatch::{ActionDispatcher, ActionOutcome, ActionPayload};
use super::lookup::CardLookup;
use super::transition::ListTransitionPolicy;
use crate::config::{ReferenceRequirement, SyncConfig};
use crate::error::{ConfigError, SyncError};
use crate::events::{EventPayload, SyncEvent};
use crate::references::CardReferenceExtractor;
use crate::trello::TrelloApi;

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub events: usize,
    pub cards_resolved: usize,
    pub actions_written: usize,
    pub actions_already_present: usize,
    pub actions_failed: usize,
    pub cards_moved: usize,
}

impl SyncSummary {
    fn record_action(&mut self, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Written => self.actions_written += 1,
            ActionOutcome::AlreadyPresent => self.actions_already_present += 1,
            ActionOutcome::Failed => self.actions_failed += 1,
            ActionOutcome::Skipped => {}
        }
    }
}

/// Orchestrates extraction, lookup, actions and list moves.
pub struct EventProcessor {
    extractor: CardReferenceExtractor,
    requirement: ReferenceRequirement,
    lookup: CardLookup,
    dispatcher: ActionDispatcher,
    transitions: ListTransitionPolicy,
}

impl EventProcessor {
    /// Wire all components to one Trello client and configuration.
    pub fn new(trello: Arc<dyn TrelloApi>, config: &SyncConfig) -> Result<Self, ConfigError> {
        let extractor = CardReferenceExtractor::new(&config.card_id_pattern)?;
        let lookup = CardLookup::new(trello.clone(), config.board_id.clone());
        let dispatcher = ActionDispatcher::new(trello.clone(), config.card_action.clone());
        let transitions = ListTransitionPolicy::new(trello, lookup.clone(), config.lists.clone());

        Ok(Self {
            extractor,
            requirement: config.reference_requirement,
            lookup,
            dispatcher,
            transitions,
        })
    }

    /// Sync a whole payload.
    ///
    /// A pull request or issue without the required card reference stops
    /// processing with [`SyncError::MissingCardReference`]; every Trello
    /// failure is logged and skipped.
    pub async fn process(&self, payload: EventPayload) -> Result<SyncSummary, SyncError> {
        let mut summary = SyncSummary::default();
        let events = payload.into_events();
        info!(count = events.len(), "Syncing events to Trello");

        for event in &events {
            self.process_event(event, &mut summary).await?;
        }

        info!(
            events = summary.events,
            cards = summary.cards_resolved,
            written = summary.actions_written,
            already_present = summary.actions_already_present,
            failed = summary.actions_failed,
            moved = summary.cards_moved,
            "Trello sync complete"
        );
        Ok(summary)
    }

    /// Sync a single event into `summary`.
    pub async fn process_event(
        &self,
        event: &SyncEvent,
        summary: &mut SyncSummary,
    ) -> Result<(), SyncError> {
        summary.events += 1;
        let ids = self.card_ids(event)?;

        if ids.is_empty() {
            debug!(kind = %event.kind(), url = %event.url(), "No card references");
            return Ok(());
        }
        info!(
            kind = %event.kind(),
            url = %event.url(),
            cards = ?ids,
            "Found card references"
        );

        for short_id in &ids {
            self.sync_card(short_id, event, summary).await;
        }
        Ok(())
    }

    /// Card ids referenced by an event.
    fn card_ids(&self, event: &SyncEvent) -> Result<BTreeSet<String>, SyncError> {
        let (title, branch) = match event {
            SyncEvent::Commit(commit) => {
                return Ok(self.extractor.extract_ids(&commit.message, true));
            }
            SyncEvent::PullRequest(pr) => (pr.title.as_str(), Some(pr.head_ref.as_str())),
            SyncEvent::Issue(issue) => (issue.title.as_str(), None),
        };

        self.extractor
            .extract_all_ids(title, branch, self.requirement)
            .ok_or_else(|| {
                warn!(
                    kind = %event.kind(),
                    url = %event.url(),
                    prefix = %self.extractor.prefix(),
                    "Missing card reference"
                );
                SyncError::MissingCardReference {
                    kind: event.kind(),
                    url: event.url().to_string(),
                    checked: std::iter::once(title)
                        .chain(branch)
                        .map(String::from)
                        .collect(),
                }
            })
    }

    /// Resolve, annotate and move one card. Never fails.
    async fn sync_card(&self, short_id: &str, event: &SyncEvent, summary: &mut SyncSummary) {
        let Some(card) = self.lookup.resolve_card(short_id).await else {
            return;
        };
        summary.cards_resolved += 1;

        let payload = ActionPayload {
            user: event.user(),
            message: event.text(),
            url: event.url(),
        };
        let outcome = self.dispatcher.apply_action(&card.id, payload).await;
        summary.record_action(outcome);

        if self.transitions.apply(&card.id, event).await {
            summary.cards_moved += 1;
        }
    }
}
