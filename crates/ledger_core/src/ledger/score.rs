//! Score derivation and goal cancellation.
//!
//! The score is maintained incrementally as goal events arrive, but it must
//! always equal a full recount over the event log. `recount` is that ground
//! truth; the incremental path and the cancellation path both agree with it.
//! The one sanctioned exception is the scoreboard-sync override, which is
//! "last write wins" and lives in `MatchLedger::override_score`.

use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::models::{EventKind, EventPayload, LedgerEvent, Side};

/// Full recount of (score_a, score_b) from the event log. Cancelled goals
/// contribute nothing.
pub fn recount(events: &[LedgerEvent]) -> (u32, u32) {
    let mut score_a = 0;
    let mut score_b = 0;
    for event in events {
        match event.scoring_side() {
            Some(Side::A) => score_a += 1,
            Some(Side::B) => score_b += 1,
            None => {}
        }
    }
    (score_a, score_b)
}

/// Outcome of a goal cancellation, echoed back to the caller.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CancelledGoal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    pub minute: u32,
    pub was_own_goal: bool,
    pub new_score: (u32, u32),
}

/// Rewrite the most recent uncancelled goal-type event to `CancelledGoal`
/// and report which side's counter must be decremented.
///
/// "Most recent" is by minute with insertion order as the tiebreak, across
/// the whole match. It is deliberately NOT scoped to a team: if both teams
/// scored in the same minute, insertion order decides which goal goes first.
pub fn cancel_last_goal(match_id: &str, events: &mut [LedgerEvent]) -> Result<(Side, CancelledGoal)> {
    let target = events
        .iter_mut()
        .filter(|e| e.kind.is_goal())
        .max_by_key(|e| (e.minute, e.seq))
        .ok_or_else(|| LedgerError::NoGoalToCancel(match_id.to_string()))?;

    let was_own_goal = target.kind == EventKind::OwnGoal;
    // For a plain goal the scoring side loses the goal; for an own goal the
    // beneficiary (the opposite side) does.
    let decrement_side = target
        .scoring_side()
        .expect("goal-type event always has a scoring side");

    let player = match &target.payload {
        EventPayload::Goal { scorer, .. } => scorer.clone(),
        _ => None,
    };
    let minute = target.minute;
    target.kind = EventKind::CancelledGoal;

    Ok((
        decrement_side,
        CancelledGoal {
            player,
            minute,
            was_own_goal,
            // Filled in by the caller once the counter is adjusted.
            new_score: (0, 0),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(seq: u64, minute: u32, kind: EventKind, side: Side) -> LedgerEvent {
        LedgerEvent {
            seq,
            minute,
            kind,
            payload: EventPayload::Goal {
                scorer: Some(format!("scorer{seq}")),
                player_id: None,
                side,
                penalty: false,
            },
        }
    }

    #[test]
    fn test_recount_mixed_goals() {
        let events = vec![
            goal(0, 5, EventKind::Goal, Side::A),
            goal(1, 12, EventKind::OwnGoal, Side::A), // credits B
            goal(2, 30, EventKind::Goal, Side::B),
            goal(3, 40, EventKind::CancelledGoal, Side::B),
        ];
        assert_eq!(recount(&events), (1, 2));
    }

    #[test]
    fn test_cancel_picks_latest_minute_regardless_of_insertion() {
        let mut events = vec![
            goal(0, 44, EventKind::Goal, Side::A),
            goal(1, 12, EventKind::Goal, Side::B), // inserted later, earlier minute
        ];
        let (side, cancelled) = cancel_last_goal("m", &mut events).unwrap();
        assert_eq!(side, Side::A);
        assert_eq!(cancelled.minute, 44);
        assert_eq!(events[0].kind, EventKind::CancelledGoal);
    }

    #[test]
    fn test_cancel_same_minute_tiebreak_is_insertion_order() {
        // Both teams score in minute 30. Cancellation takes the later
        // insertion, whichever team it belongs to. Known quirk, kept as-is.
        let mut events = vec![
            goal(0, 30, EventKind::Goal, Side::A),
            goal(1, 30, EventKind::Goal, Side::B),
        ];
        let (side, _) = cancel_last_goal("m", &mut events).unwrap();
        assert_eq!(side, Side::B);
        assert_eq!(events[1].kind, EventKind::CancelledGoal);
        assert_eq!(events[0].kind, EventKind::Goal);
    }

    #[test]
    fn test_cancel_own_goal_reports_beneficiary() {
        let mut events = vec![goal(0, 10, EventKind::OwnGoal, Side::A)];
        let (side, cancelled) = cancel_last_goal("m", &mut events).unwrap();
        assert_eq!(side, Side::B);
        assert!(cancelled.was_own_goal);
    }

    #[test]
    fn test_cancel_with_no_goals_fails() {
        let mut events: Vec<LedgerEvent> = Vec::new();
        assert!(matches!(
            cancel_last_goal("m", &mut events),
            Err(LedgerError::NoGoalToCancel(_))
        ));
    }

    #[test]
    fn test_cancelled_goals_are_not_cancellable_again() {
        let mut events = vec![goal(0, 10, EventKind::Goal, Side::A)];
        cancel_last_goal("m", &mut events).unwrap();
        assert!(cancel_last_goal("m", &mut events).is_err());
    }
}
