//! Ingestion normalization.
//!
//! External callers (game servers, bots) speak different dialects: `"score"`
//! vs `"goal"`, `data.player` vs `data.scorer`, `data.in` vs `data.playerIn`.
//! Everything is mapped onto the canonical [`EventKind`] / [`EventPayload`]
//! here, once, before an event is ever stored. Past this point no field
//! aliases exist.

use serde_json::Value;

use crate::error::{LedgerError, Result};
use crate::models::{EventKind, EventPayload, Side};

/// Map an external type token onto the canonical event vocabulary.
pub fn normalize_kind(token: &str) -> Result<EventKind> {
    let kind = match token.trim().to_lowercase().as_str() {
        "goal" | "score" | "goal_scored" => EventKind::Goal,
        "own_goal" | "owngoal" => EventKind::OwnGoal,
        "yellow_card" | "yellow" => EventKind::YellowCard,
        "red_card" | "red" => EventKind::RedCard,
        "substitution" | "sub" => EventKind::Substitution,
        "period" | "half" => EventKind::Period,
        other => {
            return Err(LedgerError::Validation(format!(
                "unknown event type: {other:?}"
            )))
        }
    };
    Ok(kind)
}

/// Build the canonical payload for `kind` from a loosely-typed JSON blob.
pub fn normalize_payload(kind: EventKind, data: &Value) -> Result<EventPayload> {
    let payload = match kind {
        EventKind::Goal | EventKind::OwnGoal => EventPayload::Goal {
            scorer: first_str(data, &["scorer", "player"]),
            player_id: first_u64(data, &["robloxId", "id", "playerId"]),
            side: side_tag(data).ok_or_else(|| {
                LedgerError::Validation(
                    "goal events require a team side tag (\"A\" or \"B\")".to_string(),
                )
            })?,
            penalty: first_bool(data, &["isPenalty", "penalty"]).unwrap_or(false),
        },
        EventKind::CancelledGoal => {
            // Only ever produced by goal cancellation rewriting a stored event.
            return Err(LedgerError::Validation(
                "cancelled_goal cannot be ingested directly".to_string(),
            ));
        }
        EventKind::YellowCard | EventKind::RedCard => EventPayload::Card {
            player: first_str(data, &["player", "name"]),
            player_id: first_u64(data, &["robloxId", "id", "playerId"]),
            side: side_tag(data),
        },
        EventKind::Substitution => EventPayload::Substitution {
            player_out: first_str(data, &["out", "playerOut", "player_out"]),
            player_in: first_str(data, &["in", "in_player", "playerIn", "player_in"]),
            side: side_tag(data),
        },
        EventKind::Period => EventPayload::Period {
            label: first_str(data, &["type", "label"]),
            score_a: first_u64(data, &["scoreA", "score_a"]).map(|v| v as u32),
            score_b: first_u64(data, &["scoreB", "score_b"]).map(|v| v as u32),
        },
    };
    Ok(payload)
}

/// Explicit `A`/`B` side tag from the payload, if present.
fn side_tag(data: &Value) -> Option<Side> {
    match data.get("team").and_then(Value::as_str)?.trim() {
        "A" | "a" => Some(Side::A),
        "B" | "b" => Some(Side::B),
        _ => None,
    }
}

fn first_str(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| data.get(k).and_then(Value::as_str))
        .map(|s| s.to_string())
        .find(|s| !s.is_empty())
}

fn first_u64(data: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| data.get(k).and_then(Value::as_u64))
}

fn first_bool(data: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|k| data.get(k).and_then(Value::as_bool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_synonyms() {
        assert_eq!(normalize_kind("goal").unwrap(), EventKind::Goal);
        assert_eq!(normalize_kind("score").unwrap(), EventKind::Goal);
        assert_eq!(normalize_kind("GOAL_SCORED").unwrap(), EventKind::Goal);
        assert_eq!(normalize_kind("yellow").unwrap(), EventKind::YellowCard);
        assert_eq!(normalize_kind("red").unwrap(), EventKind::RedCard);
        assert_eq!(normalize_kind("sub").unwrap(), EventKind::Substitution);
        assert_eq!(normalize_kind("own_goal").unwrap(), EventKind::OwnGoal);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(normalize_kind("throw_in").is_err());
    }

    #[test]
    fn test_goal_scorer_aliases() {
        let from_scorer =
            normalize_payload(EventKind::Goal, &json!({"scorer": "Nowak", "team": "A"})).unwrap();
        let from_player =
            normalize_payload(EventKind::Goal, &json!({"player": "Nowak", "team": "A"})).unwrap();
        assert_eq!(from_scorer, from_player);
    }

    #[test]
    fn test_goal_requires_side() {
        let err = normalize_payload(EventKind::Goal, &json!({"scorer": "Nowak"})).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn test_substitution_in_aliases() {
        for key in ["in", "in_player", "playerIn"] {
            let payload = normalize_payload(
                EventKind::Substitution,
                &json!({"out": "Nowak", key: "Kowalski", "team": "B"}),
            )
            .unwrap();
            match payload {
                EventPayload::Substitution {
                    player_in,
                    player_out,
                    side,
                } => {
                    assert_eq!(player_in.as_deref(), Some("Kowalski"));
                    assert_eq!(player_out.as_deref(), Some("Nowak"));
                    assert_eq!(side, Some(Side::B));
                }
                other => panic!("unexpected payload: {other:?}"),
            }
        }
    }

    #[test]
    fn test_card_side_is_optional() {
        let payload =
            normalize_payload(EventKind::YellowCard, &json!({"player": "Nowak"})).unwrap();
        match payload {
            EventPayload::Card { side, player, .. } => {
                assert_eq!(side, None);
                assert_eq!(player.as_deref(), Some("Nowak"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_goal_not_ingestable() {
        assert!(normalize_payload(EventKind::CancelledGoal, &json!({})).is_err());
    }
}
