pub mod event;
pub mod history;
pub mod match_state;
pub mod roster;
pub mod standings;

pub use event::{EventKind, EventPayload, LedgerEvent};
pub use history::{PlayerMatchRecord, PlayerTotals};
pub use match_state::{
    ExcludedPlayer, GroupLink, Match, MatchOutcome, MatchStatus, Referees, Side,
};
pub use roster::{Roster, RosterPlayer};
pub use standings::{StandingsDelta, StandingsRow};
