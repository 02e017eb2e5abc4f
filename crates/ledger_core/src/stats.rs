//! Cross-match aggregates derived from player history records.
//!
//! Pure projections: the history store is the source of truth and totals are
//! recomputed on demand, never cached.

use std::collections::HashMap;

use crate::models::{PlayerMatchRecord, PlayerTotals};

/// Aggregate all records into per-player totals, most minutes first.
///
/// The name on the most recent record wins, so a player renamed between
/// matches shows up once under their latest name.
pub fn player_totals(records: &[PlayerMatchRecord]) -> Vec<PlayerTotals> {
    let mut by_player: HashMap<u64, PlayerTotals> = HashMap::new();
    for record in records {
        let totals = by_player
            .entry(record.player_id)
            .or_insert_with(|| PlayerTotals {
                player_id: record.player_id,
                player_name: record.player_name.clone(),
                total_minutes: 0,
                match_count: 0,
                avg_minutes_per_match: 0,
                goals: 0,
                assists: 0,
                yellow_cards: 0,
                red_cards: 0,
            });
        totals.player_name = record.player_name.clone();
        totals.total_minutes += record.minutes_played;
        totals.match_count += 1;
        totals.goals += record.goals;
        totals.assists += record.assists;
        totals.yellow_cards += record.yellow_cards;
        totals.red_cards += record.red_cards;
    }

    let mut out: Vec<PlayerTotals> = by_player
        .into_values()
        .map(|mut totals| {
            totals.avg_minutes_per_match = rounded_avg(totals.total_minutes, totals.match_count);
            totals
        })
        .collect();
    out.sort_by(|a, b| {
        b.total_minutes
            .cmp(&a.total_minutes)
            .then(a.player_id.cmp(&b.player_id))
    });
    out
}

/// Totals restricted to one tournament's records.
pub fn player_totals_for_tournament(
    records: &[PlayerMatchRecord],
    tournament: &str,
) -> Vec<PlayerTotals> {
    let filtered: Vec<PlayerMatchRecord> = records
        .iter()
        .filter(|r| r.tournament.as_deref() == Some(tournament))
        .cloned()
        .collect();
    player_totals(&filtered)
}

/// All records for one player, most recent match first.
pub fn records_for_player(records: &[PlayerMatchRecord], player_id: u64) -> Vec<PlayerMatchRecord> {
    let mut out: Vec<PlayerMatchRecord> = records
        .iter()
        .filter(|r| r.player_id == player_id)
        .cloned()
        .collect();
    out.sort_by(|a, b| b.played_at.cmp(&a.played_at));
    out
}

fn rounded_avg(total: u32, count: u32) -> u32 {
    if count == 0 {
        return 0;
    }
    (total + count / 2) / count
}
