//! The sync engine: resolves referenced cards, annotates them and moves
//! them between lists.

pub mod dispatch;
pub mod guard;
pub mod lookup;
pub mod processor;
pub mod transition;

pub use dispatch::{ActionDispatcher, ActionOutcome, ActionPayload};
pub use guard::{IdempotencyGuard, compose_comment};
pub use lookup::CardLookup;
pub use processor::{EventProcessor, SyncSummary};
pub use transition::{ListTarget, ListTransitionPolicy};
