use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row per player per finished match. Append-only historical ledger;
/// created at match finalization and never edited afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerMatchRecord {
    pub player_id: u64,
    pub player_name: String,
    pub match_id: String,
    /// Name of the team the player appeared for.
    pub player_team: String,
    pub team_a: String,
    pub team_b: String,
    pub score_a: u32,
    pub score_b: u32,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub minutes_played: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament: Option<String>,
    pub played_at: DateTime<Utc>,
}

/// Cross-match aggregate for one player, derived from history records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerTotals {
    pub player_id: u64,
    pub player_name: String,
    pub total_minutes: u32,
    pub match_count: u32,
    pub avg_minutes_per_match: u32,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}
