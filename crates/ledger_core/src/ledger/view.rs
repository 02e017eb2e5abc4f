//! Read-side projection of a match: the raw event log partitioned and
//! enriched for display.
//!
//! Everything here is display-only. Player-name resolution is a best-effort
//! prefix search over the rosters and never feeds back into the score or
//! standings, which operate exclusively on the canonical side tags.

use serde::Serialize;

use crate::models::{EventKind, EventPayload, LedgerEvent, Match, Side};

#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    #[serde(rename = "match")]
    pub match_state: Match,
    pub events: EventGroups,
}

/// Convenience partitions of the event log, each minute-descending
/// (most recent first).
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct EventGroups {
    pub goals: Vec<GoalView>,
    pub cards: Vec<CardView>,
    pub substitutions: Vec<SubstitutionView>,
    pub periods: Vec<PeriodView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalView {
    pub minute: u32,
    pub player: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u8>,
    /// Display team name. For own goals this is the beneficiary, i.e. the
    /// opponent of the player who scored.
    pub team: String,
    pub is_penalty: bool,
    pub is_own_goal: bool,
    pub is_cancelled: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Yellow,
    Red,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CardView {
    pub minute: u32,
    pub player: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u8>,
    pub team: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubstitutionView {
    pub minute: u32,
    pub team: String,
    pub player_out: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_out_number: Option<u8>,
    pub player_in: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_in_number: Option<u8>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeriodView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub minute: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_a: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_b: Option<u32>,
}

struct ResolvedPlayer {
    name: String,
    number: Option<u8>,
}

/// Resolve a raw name token against both rosters: roster A starters, A bench,
/// B starters, B bench, first case-insensitive prefix hit wins. Unresolved
/// tokens pass through unchanged.
fn resolve_player(token: &str, m: &Match) -> ResolvedPlayer {
    for roster in [&m.roster_a, &m.roster_b] {
        if let Some(player) = roster.find_by_prefix(token) {
            return ResolvedPlayer {
                name: player.name.clone(),
                number: player.number,
            };
        }
    }
    ResolvedPlayer {
        name: token.to_string(),
        number: None,
    }
}

/// Display team name: explicit side tag first, then roster membership of the
/// resolved name, then team A as the historical default.
fn resolve_team(side: Option<Side>, resolved_name: &str, m: &Match) -> String {
    if let Some(side) = side {
        return m.team_name(side).to_string();
    }
    if m.roster_a.contains_name(resolved_name) {
        return m.team_a.clone();
    }
    if m.roster_b.contains_name(resolved_name) {
        return m.team_b.clone();
    }
    m.team_a.clone()
}

/// Partition and enrich the event log for display.
///
/// Entries missing their identity-bearing payload (a goal without a scorer,
/// a card without a player, a substitution missing either name) are skipped,
/// never surfaced half-empty.
pub fn build_groups(m: &Match, events: &[LedgerEvent]) -> EventGroups {
    let mut groups = EventGroups::default();

    for event in events {
        match (&event.kind, &event.payload) {
            (
                EventKind::Goal | EventKind::OwnGoal | EventKind::CancelledGoal,
                EventPayload::Goal {
                    scorer,
                    side,
                    penalty,
                    ..
                },
            ) => {
                let Some(scorer) = scorer else { continue };
                let resolved = resolve_player(scorer, m);
                let is_own_goal = event.kind == EventKind::OwnGoal;
                // The payload side of an own goal is the player's own team;
                // the goal is displayed for the opponent.
                let team = if is_own_goal {
                    m.team_name(side.opposite()).to_string()
                } else {
                    m.team_name(*side).to_string()
                };
                groups.goals.push(GoalView {
                    minute: event.minute,
                    player: resolved.name,
                    number: resolved.number,
                    team,
                    is_penalty: *penalty,
                    is_own_goal,
                    is_cancelled: event.kind == EventKind::CancelledGoal,
                });
            }
            (
                EventKind::YellowCard | EventKind::RedCard,
                EventPayload::Card { player, side, .. },
            ) => {
                let Some(player) = player else { continue };
                let resolved = resolve_player(player, m);
                let team = resolve_team(*side, &resolved.name, m);
                groups.cards.push(CardView {
                    minute: event.minute,
                    player: resolved.name,
                    number: resolved.number,
                    team,
                    kind: if event.kind == EventKind::RedCard {
                        CardKind::Red
                    } else {
                        CardKind::Yellow
                    },
                });
            }
            (
                EventKind::Substitution,
                EventPayload::Substitution {
                    player_out,
                    player_in,
                    side,
                },
            ) => {
                let (Some(out), Some(in_)) = (player_out, player_in) else {
                    continue;
                };
                let resolved_out = resolve_player(out, m);
                let resolved_in = resolve_player(in_, m);
                let team = resolve_team(*side, &resolved_out.name, m);
                groups.substitutions.push(SubstitutionView {
                    minute: event.minute,
                    team,
                    player_out: resolved_out.name,
                    player_out_number: resolved_out.number,
                    player_in: resolved_in.name,
                    player_in_number: resolved_in.number,
                });
            }
            (
                EventKind::Period,
                EventPayload::Period {
                    label,
                    score_a,
                    score_b,
                },
            ) => {
                groups.periods.push(PeriodView {
                    label: label.clone(),
                    minute: event.minute,
                    score_a: *score_a,
                    score_b: *score_b,
                });
            }
            // Kind/payload mismatches cannot be constructed through
            // ingestion; ignore rather than panic.
            _ => {}
        }
    }

    groups.goals.sort_by(|a, b| b.minute.cmp(&a.minute));
    groups.cards.sort_by(|a, b| b.minute.cmp(&a.minute));
    groups.substitutions.sort_by(|a, b| b.minute.cmp(&a.minute));
    groups.periods.sort_by(|a, b| b.minute.cmp(&a.minute));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchStatus, Roster, RosterPlayer};
    use chrono::Utc;

    fn test_match() -> Match {
        Match {
            id: "m1".to_string(),
            team_a: "Lechia".to_string(),
            team_b: "Arka".to_string(),
            score_a: 0,
            score_b: 0,
            status: MatchStatus::Active,
            roster_a: Roster {
                starters: vec![RosterPlayer::new("Piotrowski").with_id(1).with_number(9)],
                bench: Vec::new(),
                formation: "4-4-2".to_string(),
            },
            roster_b: Roster::default(),
            timer: "00:00".to_string(),
            period: "First half".to_string(),
            added_time: None,
            referees: None,
            excluded_players: Vec::new(),
            group_link: None,
            created_at: Utc::now(),
        }
    }

    fn goal_event(seq: u64, minute: u32, scorer: &str, side: Side) -> LedgerEvent {
        LedgerEvent {
            seq,
            minute,
            kind: EventKind::Goal,
            payload: EventPayload::Goal {
                scorer: Some(scorer.to_string()),
                player_id: None,
                side,
                penalty: false,
            },
        }
    }

    #[test]
    fn test_goal_view_resolves_prefix_and_number() {
        let m = test_match();
        let events = vec![goal_event(0, 30, "Piotr", Side::A)];
        let groups = build_groups(&m, &events);

        assert_eq!(groups.goals.len(), 1);
        let g = &groups.goals[0];
        assert_eq!(g.player, "Piotrowski");
        assert_eq!(g.number, Some(9));
        assert_eq!(g.team, "Lechia");
        assert_eq!(g.minute, 30);
    }

    #[test]
    fn test_own_goal_displays_beneficiary_team() {
        let m = test_match();
        let events = vec![LedgerEvent {
            seq: 0,
            minute: 12,
            kind: EventKind::OwnGoal,
            payload: EventPayload::Goal {
                scorer: Some("Piotrowski".to_string()),
                player_id: None,
                side: Side::A,
                penalty: false,
            },
        }];
        let groups = build_groups(&m, &events);
        assert_eq!(groups.goals[0].team, "Arka");
        assert!(groups.goals[0].is_own_goal);
    }

    #[test]
    fn test_goals_sorted_minute_descending() {
        let m = test_match();
        let events = vec![
            goal_event(0, 10, "X", Side::A),
            goal_event(1, 44, "Y", Side::A),
            goal_event(2, 21, "Z", Side::B),
        ];
        let groups = build_groups(&m, &events);
        let minutes: Vec<u32> = groups.goals.iter().map(|g| g.minute).collect();
        assert_eq!(minutes, vec![44, 21, 10]);
    }

    #[test]
    fn test_goal_without_scorer_is_skipped() {
        let m = test_match();
        let events = vec![LedgerEvent {
            seq: 0,
            minute: 5,
            kind: EventKind::Goal,
            payload: EventPayload::Goal {
                scorer: None,
                player_id: None,
                side: Side::A,
                penalty: false,
            },
        }];
        assert!(build_groups(&m, &events).goals.is_empty());
    }

    #[test]
    fn test_substitution_missing_either_name_is_skipped() {
        let m = test_match();
        let events = vec![LedgerEvent {
            seq: 0,
            minute: 60,
            kind: EventKind::Substitution,
            payload: EventPayload::Substitution {
                player_out: Some("Piotrowski".to_string()),
                player_in: None,
                side: Some(Side::A),
            },
        }];
        assert!(build_groups(&m, &events).substitutions.is_empty());
    }

    #[test]
    fn test_unresolved_token_passes_through() {
        let m = test_match();
        let events = vec![goal_event(0, 30, "Ghost", Side::B)];
        let groups = build_groups(&m, &events);
        assert_eq!(groups.goals[0].player, "Ghost");
        assert_eq!(groups.goals[0].number, None);
        assert_eq!(groups.goals[0].team, "Arka");
    }

    #[test]
    fn test_card_team_falls_back_to_roster_membership() {
        let m = test_match();
        let events = vec![LedgerEvent {
            seq: 0,
            minute: 70,
            kind: EventKind::YellowCard,
            payload: EventPayload::Card {
                player: Some("Piotrowski".to_string()),
                player_id: None,
                side: None,
            },
        }];
        let groups = build_groups(&m, &events);
        assert_eq!(groups.cards[0].team, "Lechia");
        assert_eq!(groups.cards[0].kind, CardKind::Yellow);
    }
}
