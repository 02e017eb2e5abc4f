use thiserror::Error;

/// Errors returned by ledger operations.
///
/// Every variant is terminal for the call that produced it; the engine never
/// retries internally. Callers decide how to surface them.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("match not found: {0}")]
    MatchNotFound(String),

    #[error("match {id} is not active (status: {status})")]
    MatchNotActive { id: String, status: String },

    #[error("could not resolve team \"{given}\" for match {team_a} vs {team_b}")]
    AmbiguousTeam {
        given: String,
        team_a: String,
        team_b: String,
    },

    #[error("no goal to cancel in match {0}")]
    NoGoalToCancel(String),

    #[error("player {player_id} is not tracked in match {match_id}")]
    PlayerNotTracked { match_id: String, player_id: u64 },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
