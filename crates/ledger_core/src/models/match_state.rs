use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::roster::Roster;

/// Which side of the fixture a team, player or event belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Active,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Active => "active",
            MatchStatus::Finished => "finished",
        }
    }
}

/// Result class for one team of a finished match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Won,
    Drawn,
    Lost,
}

impl MatchOutcome {
    /// League points for this outcome (win 3, draw 1, loss 0).
    pub fn points(&self) -> u32 {
        match self {
            MatchOutcome::Won => 3,
            MatchOutcome::Drawn => 1,
            MatchOutcome::Lost => 0,
        }
    }

    pub fn from_scores(goals_for: u32, goals_against: u32) -> Self {
        match goals_for.cmp(&goals_against) {
            std::cmp::Ordering::Greater => MatchOutcome::Won,
            std::cmp::Ordering::Equal => MatchOutcome::Drawn,
            std::cmp::Ordering::Less => MatchOutcome::Lost,
        }
    }
}

/// Referee assignments for a match. Opaque to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Referees {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fourth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avar: Option<String>,
}

/// A player barred from the match (suspension, registration issue...).
/// Display metadata only, never consulted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExcludedPlayer {
    pub name: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

/// Links a match to a tournament group so that finishing it also updates
/// that group's table in addition to the league table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GroupLink {
    pub tournament: String,
    pub group: String,
}

/// One live or completed fixture.
///
/// Score is maintained incrementally from goal events but can be overridden
/// by an external scoreboard sync; see `MatchLedger::override_score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Stable external match token. Either caller-supplied or a generated
    /// UUID v4.
    pub id: String,
    pub team_a: String,
    pub team_b: String,
    pub score_a: u32,
    pub score_b: u32,
    pub status: MatchStatus,
    pub roster_a: Roster,
    pub roster_b: Roster,
    /// Display clock, "MM:SS". Synced from the outside, never ticked here.
    pub timer: String,
    /// Display period label ("First half", "Half-time", ...).
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_time: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referees: Option<Referees>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_players: Vec<ExcludedPlayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_link: Option<GroupLink>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn team_name(&self, side: Side) -> &str {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    pub fn roster(&self, side: Side) -> &Roster {
        match side {
            Side::A => &self.roster_a,
            Side::B => &self.roster_b,
        }
    }

    pub fn roster_mut(&mut self, side: Side) -> &mut Roster {
        match side {
            Side::A => &mut self.roster_a,
            Side::B => &mut self.roster_b,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::A => self.score_a,
            Side::B => self.score_b,
        }
    }

    pub fn outcome_for(&self, side: Side) -> MatchOutcome {
        MatchOutcome::from_scores(self.score(side), self.score(side.opposite()))
    }

    /// Minute component of the synced display clock, if it parses.
    pub fn clock_minute(&self) -> Option<u32> {
        let (minutes, _) = self.timer.split_once(':')?;
        minutes.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_scores() {
        assert_eq!(MatchOutcome::from_scores(2, 1), MatchOutcome::Won);
        assert_eq!(MatchOutcome::from_scores(1, 1), MatchOutcome::Drawn);
        assert_eq!(MatchOutcome::from_scores(0, 3), MatchOutcome::Lost);
    }

    #[test]
    fn test_outcome_points() {
        assert_eq!(MatchOutcome::Won.points(), 3);
        assert_eq!(MatchOutcome::Drawn.points(), 1);
        assert_eq!(MatchOutcome::Lost.points(), 0);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::A.opposite(), Side::B);
        assert_eq!(Side::B.opposite(), Side::A);
    }
}
