//! Per-match player-minutes bookkeeping.
//!
//! Tracking state is process-local and ephemeral: it exists only while a
//! match is active and is consumed at finalization. Losing it (a restart)
//! is tolerated, not prevented; finalization falls back to the roster in
//! that case (see `finalize_minutes`).

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Roster, Side};

/// One player's on-pitch state within an active match.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrackingEntry {
    pub player_id: u64,
    pub name: String,
    pub side: Side,
    /// Match minute the current interval opened at. Meaningless while
    /// `on_pitch` is false.
    pub entered_at: u32,
    /// Minutes summed across all closed intervals so far.
    pub accumulated: u32,
    pub on_pitch: bool,
}

impl TrackingEntry {
    pub fn starter(player_id: u64, name: impl Into<String>, side: Side) -> Self {
        Self {
            player_id,
            name: name.into(),
            side,
            entered_at: 0,
            accumulated: 0,
            on_pitch: true,
        }
    }

    /// Open a new on-pitch interval. No-op when already on the pitch.
    pub fn enter(&mut self, minute: u32) {
        if self.on_pitch {
            return;
        }
        self.entered_at = minute;
        self.on_pitch = true;
    }

    /// Close the current interval and return the minutes it contributed.
    /// No-op (returns 0) when already off the pitch.
    pub fn exit(&mut self, minute: u32) -> u32 {
        if !self.on_pitch {
            return 0;
        }
        let played = minute.saturating_sub(self.entered_at);
        self.accumulated += played;
        self.on_pitch = false;
        played
    }
}

/// Minutes credited to one player at finalization.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FinalizedMinutes {
    pub player_id: u64,
    pub name: String,
    pub side: Side,
    pub minutes: u32,
}

/// Consume the tracking map into final per-player minutes, closing any open
/// intervals at `final_minute`.
///
/// Degraded mode: when the map is completely empty (the process restarted
/// mid-match and in-memory state was lost), reconstruct from the rosters —
/// every starter is assumed to have played the full duration, bench players
/// zero minutes. This is best effort, not a guarantee of accuracy. The
/// fallback is all-or-nothing: a partially populated map is used as-is and
/// untracked players simply get no entry.
pub fn finalize_minutes(
    mut tracking: HashMap<u64, TrackingEntry>,
    roster_a: &Roster,
    roster_b: &Roster,
    final_minute: u32,
) -> Vec<FinalizedMinutes> {
    if tracking.is_empty() {
        return roster_fallback(roster_a, roster_b, final_minute);
    }

    let mut out: Vec<FinalizedMinutes> = tracking
        .values_mut()
        .map(|entry| {
            entry.exit(final_minute);
            FinalizedMinutes {
                player_id: entry.player_id,
                name: entry.name.clone(),
                side: entry.side,
                minutes: entry.accumulated,
            }
        })
        .collect();
    out.sort_by_key(|f| f.player_id);
    out
}

fn roster_fallback(roster_a: &Roster, roster_b: &Roster, final_minute: u32) -> Vec<FinalizedMinutes> {
    let mut out = Vec::new();
    for (roster, side) in [(roster_a, Side::A), (roster_b, Side::B)] {
        for starter in &roster.starters {
            if let Some(id) = starter.id {
                out.push(FinalizedMinutes {
                    player_id: id,
                    name: starter.name.clone(),
                    side,
                    minutes: final_minute,
                });
            }
        }
        for bench in &roster.bench {
            if let Some(id) = bench.id {
                out.push(FinalizedMinutes {
                    player_id: id,
                    name: bench.name.clone(),
                    side,
                    minutes: 0,
                });
            }
        }
    }
    out
}
