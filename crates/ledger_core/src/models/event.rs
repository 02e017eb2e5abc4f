use serde::{Deserialize, Serialize};

use super::match_state::Side;

/// Canonical event vocabulary. External callers use varying spellings;
/// ingestion maps them onto this set before anything is stored (see
/// `ledger::normalize`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Goal,
    OwnGoal,
    /// A goal-type event whose type tag was rewritten by goal cancellation.
    /// Never produced by ingestion.
    CancelledGoal,
    YellowCard,
    RedCard,
    Substitution,
    /// Period marker (kick-off, half-time, full-time...).
    Period,
}

impl EventKind {
    /// Goal-type events count towards the score and are cancellable.
    pub fn is_goal(&self) -> bool {
        matches!(self, EventKind::Goal | EventKind::OwnGoal)
    }
}

/// Type-specific event payload, fully normalized at ingestion. No field
/// aliases survive past that point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    Goal {
        /// Raw scorer token as supplied; resolved against rosters for
        /// display only.
        #[serde(skip_serializing_if = "Option::is_none")]
        scorer: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        player_id: Option<u64>,
        /// For own goals this is the side of the player who scored, NOT the
        /// beneficiary.
        side: Side,
        #[serde(default)]
        penalty: bool,
    },
    Card {
        #[serde(skip_serializing_if = "Option::is_none")]
        player: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        player_id: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        side: Option<Side>,
    },
    Substitution {
        #[serde(skip_serializing_if = "Option::is_none")]
        player_out: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        player_in: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        side: Option<Side>,
    },
    Period {
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        score_a: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        score_b: Option<u32>,
    },
}

/// One logged occurrence within a match.
///
/// Immutable once stored, with a single exception: goal cancellation rewrites
/// `kind` from `Goal`/`OwnGoal` to `CancelledGoal`. The record itself is
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEvent {
    /// Per-match insertion sequence, the tiebreak for same-minute ordering.
    pub seq: u64,
    /// Match-clock minute, not wall clock.
    pub minute: u32,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub payload: EventPayload,
}

impl LedgerEvent {
    /// Side whose score this event moved, if any. For own goals the
    /// beneficiary is the opposite of the payload side.
    pub fn scoring_side(&self) -> Option<Side> {
        match (&self.kind, &self.payload) {
            (EventKind::Goal, EventPayload::Goal { side, .. }) => Some(*side),
            (EventKind::OwnGoal, EventPayload::Goal { side, .. }) => Some(side.opposite()),
            _ => None,
        }
    }
}
