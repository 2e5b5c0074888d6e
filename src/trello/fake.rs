//! In-memory Trello used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Attachment, BoardList, Card, Comment, CommentData, TrelloApi};
use crate::error::TrelloError;

#[derive(Default)]
struct State {
    /// short id -> card id
    cards: HashMap<String, String>,
    lists: Vec<BoardList>,
    attachments: HashMap<String, Vec<String>>,
    comments: HashMap<String, Vec<String>>,
    moves: Vec<(String, String)>,
    /// Card lookups that fail with a server error.
    broken_lookups: HashSet<String>,
    /// Card ids whose writes fail.
    broken_writes: HashSet<String>,
    broken_lists: bool,
    calls: Vec<String>,
}

/// Records every call; failures are injected per card.
#[derive(Default)]
pub(crate) struct FakeTrello {
    state: Mutex<State>,
}

fn server_error(endpoint: String) -> TrelloError {
    TrelloError::Status {
        status: 500,
        endpoint,
        body: "boom".into(),
    }
}

impl FakeTrello {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_card(self, short_id: &str, card_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .cards
            .insert(short_id.into(), card_id.into());
        self
    }

    pub fn with_list(self, id: &str, name: &str, closed: bool) -> Self {
        self.state.lock().unwrap().lists.push(BoardList {
            id: id.into(),
            name: name.into(),
            closed,
        });
        self
    }

    pub fn with_attachment(self, card_id: &str, url: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .attachments
            .entry(card_id.into())
            .or_default()
            .push(url.into());
        self
    }

    pub fn with_comment(self, card_id: &str, text: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .comments
            .entry(card_id.into())
            .or_default()
            .push(text.into());
        self
    }

    pub fn with_broken_lookup(self, short_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .broken_lookups
            .insert(short_id.into());
        self
    }

    pub fn with_broken_writes(self, card_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .broken_writes
            .insert(card_id.into());
        self
    }

    pub fn with_broken_lists(self) -> Self {
        self.state.lock().unwrap().broken_lists = true;
        self
    }

    pub fn attachments(&self, card_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.attachments.get(card_id).cloned().unwrap_or_default()
    }

    pub fn comments(&self, card_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.comments.get(card_id).cloned().unwrap_or_default()
    }

    /// `(card_id, list_id)` for every successful move, in order.
    pub fn moves(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().moves.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn check_write(&self, card_id: &str, endpoint: &str) -> Result<(), TrelloError> {
        if self.state.lock().unwrap().broken_writes.contains(card_id) {
            return Err(server_error(endpoint.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TrelloApi for FakeTrello {
    async fn find_card(&self, board_id: &str, short_id: &str) -> Result<Option<Card>, TrelloError> {
        self.record(format!("find_card {board_id} {short_id}"));
        let state = self.state.lock().unwrap();
        if state.broken_lookups.contains(short_id) {
            return Err(server_error(format!("/boards/{board_id}/cards/{short_id}")));
        }
        Ok(state.cards.get(short_id).map(|id| Card { id: id.clone() }))
    }

    async fn lists_on_board(&self, board_id: &str) -> Result<Vec<BoardList>, TrelloError> {
        self.record(format!("lists_on_board {board_id}"));
        let state = self.state.lock().unwrap();
        if state.broken_lists {
            return Err(server_error(format!("/boards/{board_id}/lists")));
        }
        Ok(state.lists.clone())
    }

    async fn list_attachments(&self, card_id: &str) -> Result<Vec<Attachment>, TrelloError> {
        self.record(format!("list_attachments {card_id}"));
        Ok(self
            .attachments(card_id)
            .into_iter()
            .map(|url| Attachment { url })
            .collect())
    }

    async fn add_attachment(&self, card_id: &str, url: &str) -> Result<(), TrelloError> {
        self.record(format!("add_attachment {card_id} {url}"));
        self.check_write(card_id, "attachments")?;
        self.state
            .lock()
            .unwrap()
            .attachments
            .entry(card_id.into())
            .or_default()
            .push(url.into());
        Ok(())
    }

    async fn list_comments(&self, card_id: &str) -> Result<Vec<Comment>, TrelloError> {
        self.record(format!("list_comments {card_id}"));
        Ok(self
            .comments(card_id)
            .into_iter()
            .map(|text| Comment {
                data: CommentData { text },
            })
            .collect())
    }

    async fn add_comment(&self, card_id: &str, text: &str) -> Result<(), TrelloError> {
        self.record(format!("add_comment {card_id} {text}"));
        self.check_write(card_id, "comments")?;
        self.state
            .lock()
            .unwrap()
            .comments
            .entry(card_id.into())
            .or_default()
            .push(text.into());
        Ok(())
    }

    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<(), TrelloError> {
        self.record(format!("move_card {card_id} {list_id}"));
        self.check_write(card_id, "move")?;
        self.state
            .lock()
            .unwrap()
            .moves
            .push((card_id.into(), list_id.into()));
        Ok(())
    }
}
