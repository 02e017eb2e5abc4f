//! End-of-match settlement: standings deltas and the per-player history
//! records emitted exactly once when a match finishes.

use std::collections::HashMap;

use chrono::Utc;

use crate::ledger::tracking::FinalizedMinutes;
use crate::models::{
    EventKind, EventPayload, LedgerEvent, Match, PlayerMatchRecord, Side, StandingsDelta,
};

/// Standings contribution of this match for one side.
pub fn delta_for(m: &Match, side: Side) -> StandingsDelta {
    StandingsDelta {
        outcome: m.outcome_for(side),
        goals_for: m.score(side),
        goals_against: m.score(side.opposite()),
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct EventTally {
    goals: u32,
    yellow_cards: u32,
    red_cards: u32,
}

/// Aggregate goals and cards per roster player from the event log.
///
/// Correlation is by player id when the payload carries one; otherwise the
/// payload name is treated as a case-insensitive prefix of the roster name,
/// the same rule display resolution uses. Cancelled goals do not count.
fn tally_for(player_id: u64, player_name: &str, events: &[LedgerEvent]) -> EventTally {
    let mut tally = EventTally::default();
    for event in events {
        let (event_player_id, event_player_name) = match &event.payload {
            EventPayload::Goal {
                player_id, scorer, ..
            } => (*player_id, scorer.as_deref()),
            EventPayload::Card {
                player_id, player, ..
            } => (*player_id, player.as_deref()),
            _ => continue,
        };
        let matches_player = match (event_player_id, event_player_name) {
            (Some(id), _) => id == player_id,
            (None, Some(name)) => {
                !name.is_empty()
                    && player_name
                        .to_lowercase()
                        .starts_with(&name.to_lowercase())
            }
            (None, None) => false,
        };
        if !matches_player {
            continue;
        }
        match event.kind {
            EventKind::Goal => tally.goals += 1,
            EventKind::YellowCard => tally.yellow_cards += 1,
            EventKind::RedCard => tally.red_cards += 1,
            _ => {}
        }
    }
    tally
}

/// One history record per roster player (both sides, starters and bench).
///
/// Minutes come from the finalized tracking map; roster players the tracker
/// never saw get zero. Players without an external id cannot be correlated
/// across matches and are skipped.
pub fn build_player_records(
    m: &Match,
    events: &[LedgerEvent],
    minutes: &[FinalizedMinutes],
) -> Vec<PlayerMatchRecord> {
    let minutes_by_id: HashMap<u64, u32> =
        minutes.iter().map(|f| (f.player_id, f.minutes)).collect();
    let played_at = Utc::now();

    let mut records = Vec::new();
    for side in [Side::A, Side::B] {
        let roster = m.roster(side);
        for player in roster.all_players() {
            let Some(player_id) = player.id else {
                tracing::debug!(
                    player = %player.name,
                    match_id = %m.id,
                    "skipping history record for player without external id"
                );
                continue;
            };
            let tally = tally_for(player_id, &player.name, events);
            records.push(PlayerMatchRecord {
                player_id,
                player_name: player.name.clone(),
                match_id: m.id.clone(),
                player_team: m.team_name(side).to_string(),
                team_a: m.team_a.clone(),
                team_b: m.team_b.clone(),
                score_a: m.score_a,
                score_b: m.score_b,
                goals: tally.goals,
                assists: 0,
                yellow_cards: tally.yellow_cards,
                red_cards: tally.red_cards,
                minutes_played: minutes_by_id.get(&player_id).copied().unwrap_or(0),
                tournament: m.group_link.as_ref().map(|l| l.tournament.clone()),
                played_at,
            });
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchOutcome, MatchStatus, Roster, RosterPlayer};

    fn finished_match() -> Match {
        Match {
            id: "m1".to_string(),
            team_a: "Lechia".to_string(),
            team_b: "Arka".to_string(),
            score_a: 2,
            score_b: 1,
            status: MatchStatus::Finished,
            roster_a: Roster {
                starters: vec![
                    RosterPlayer::new("Nowak").with_id(1),
                    RosterPlayer::new("NoId"),
                ],
                bench: vec![RosterPlayer::new("Wisniewski").with_id(2)],
                formation: "4-4-2".to_string(),
            },
            roster_b: Roster {
                starters: vec![RosterPlayer::new("Kaczmarek").with_id(3)],
                bench: Vec::new(),
                formation: "4-4-2".to_string(),
            },
            timer: "40:00".to_string(),
            period: "Full time".to_string(),
            added_time: None,
            referees: None,
            excluded_players: Vec::new(),
            group_link: None,
            created_at: Utc::now(),
        }
    }

    fn goal_by(seq: u64, id: Option<u64>, scorer: &str, side: Side) -> LedgerEvent {
        LedgerEvent {
            seq,
            minute: 10 + seq as u32,
            kind: EventKind::Goal,
            payload: EventPayload::Goal {
                scorer: Some(scorer.to_string()),
                player_id: id,
                side,
                penalty: false,
            },
        }
    }

    #[test]
    fn test_delta_reflects_final_score() {
        let m = finished_match();
        let delta_a = delta_for(&m, Side::A);
        assert_eq!(delta_a.outcome, MatchOutcome::Won);
        assert_eq!(delta_a.goals_for, 2);
        assert_eq!(delta_a.goals_against, 1);

        let delta_b = delta_for(&m, Side::B);
        assert_eq!(delta_b.outcome, MatchOutcome::Lost);
    }

    #[test]
    fn test_records_correlate_by_id_then_name() {
        let m = finished_match();
        let events = vec![
            goal_by(0, Some(1), "X.", Side::A), // id match despite name mismatch
            goal_by(1, None, "Kaczmarek", Side::B), // name match, no id
        ];
        let records = build_player_records(&m, &events, &[]);

        let nowak = records.iter().find(|r| r.player_id == 1).unwrap();
        assert_eq!(nowak.goals, 1);
        let kaczmarek = records.iter().find(|r| r.player_id == 3).unwrap();
        assert_eq!(kaczmarek.goals, 1);
    }

    #[test]
    fn test_name_correlation_accepts_prefix() {
        let m = finished_match();
        let events = vec![goal_by(0, None, "kacz", Side::B)];
        let records = build_player_records(&m, &events, &[]);
        let kaczmarek = records.iter().find(|r| r.player_id == 3).unwrap();
        assert_eq!(kaczmarek.goals, 1);
    }

    #[test]
    fn test_players_without_id_are_skipped() {
        let m = finished_match();
        let records = build_player_records(&m, &[], &[]);
        // Three roster players carry ids; "NoId" does not.
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_minutes_come_from_finalized_tracking() {
        let m = finished_match();
        let minutes = vec![FinalizedMinutes {
            player_id: 1,
            name: "Nowak".to_string(),
            side: Side::A,
            minutes: 73,
        }];
        let records = build_player_records(&m, &[], &minutes);
        let nowak = records.iter().find(|r| r.player_id == 1).unwrap();
        assert_eq!(nowak.minutes_played, 73);
        let wisniewski = records.iter().find(|r| r.player_id == 2).unwrap();
        assert_eq!(wisniewski.minutes_played, 0);
    }

    #[test]
    fn test_cancelled_goal_not_counted() {
        let m = finished_match();
        let mut event = goal_by(0, Some(1), "Nowak", Side::A);
        event.kind = EventKind::CancelledGoal;
        let records = build_player_records(&m, &[event], &[]);
        let nowak = records.iter().find(|r| r.player_id == 1).unwrap();
        assert_eq!(nowak.goals, 0);
    }
}
