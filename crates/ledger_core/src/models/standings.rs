use serde::{Deserialize, Serialize};

use super::match_state::MatchOutcome;

/// One team's aggregated record within a competition or group.
///
/// Invariants: `played == won + drawn + lost` and
/// `points == 3 * won + drawn`, both preserved by `apply`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandingsRow {
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl StandingsRow {
    pub fn new(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
        }
    }

    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    /// Fold one finished match into the row.
    pub fn apply(&mut self, delta: &StandingsDelta) {
        self.played += 1;
        match delta.outcome {
            MatchOutcome::Won => self.won += 1,
            MatchOutcome::Drawn => self.drawn += 1,
            MatchOutcome::Lost => self.lost += 1,
        }
        self.goals_for += delta.goals_for;
        self.goals_against += delta.goals_against;
        self.points += delta.outcome.points();
    }
}

/// The standings contribution of exactly one finished match for one team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StandingsDelta {
    pub outcome: MatchOutcome,
    pub goals_for: u32,
    pub goals_against: u32,
}

/// League ordering: points, then goal difference, both descending.
pub fn sort_table(rows: &mut [StandingsRow]) {
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference().cmp(&a.goal_difference()))
    });
}
