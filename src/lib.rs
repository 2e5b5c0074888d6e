//! trello-sync: links commits, pull requests and issues to Trello cards.

pub mod config;
pub mod error;
pub mod events;
pub mod git;
pub mod references;
pub mod sync;
pub mod trello;
