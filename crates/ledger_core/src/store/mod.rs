//! Stores the engine writes to but does not own.
//!
//! Standings rows and player match records outlive any single match, so they
//! live behind these traits and are injected into `MatchLedger`. The
//! in-memory implementations are the default and what tests use; a persistent
//! backend can be swapped in without touching the engine.

mod memory;

use std::fmt;

use crate::models::{GroupLink, PlayerMatchRecord, StandingsDelta, StandingsRow};

pub use memory::{MemoryGroupStandingsStore, MemoryPlayerHistoryStore, MemoryStandingsStore};

/// Store-side failure. Match finalization treats these as log-and-continue;
/// see `MatchLedger::end_match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T = ()> = std::result::Result<T, StoreError>;

/// Global league table.
pub trait StandingsStore: Send + Sync {
    /// Fold one finished match into `team`'s row, creating it if absent.
    fn record_result(&self, team: &str, delta: &StandingsDelta) -> StoreResult;

    /// Current table, sorted by points then goal difference, descending.
    fn table(&self) -> StoreResult<Vec<StandingsRow>>;
}

/// Per-tournament group tables, independent of the league table.
pub trait GroupStandingsStore: Send + Sync {
    fn record_result(&self, link: &GroupLink, team: &str, delta: &StandingsDelta) -> StoreResult;

    fn group_table(&self, link: &GroupLink) -> StoreResult<Vec<StandingsRow>>;
}

/// Append-only per-player match history.
pub trait PlayerHistoryStore: Send + Sync {
    fn append(&self, record: PlayerMatchRecord) -> StoreResult;

    fn records(&self) -> StoreResult<Vec<PlayerMatchRecord>>;
}
