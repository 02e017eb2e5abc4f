//! The Match Ledger engine.
//!
//! `MatchLedger` owns every live match: rosters, the append-only event log,
//! the derived score and the player-minutes tracker. Standings and player
//! history outlive matches and live behind injected stores.
//!
//! Concurrency model: the match map is a `RwLock<HashMap>` of per-match
//! `Mutex`es. Every mutating operation on one match runs under that match's
//! mutex, so racing calls (a goal append against a goal cancel) always see a
//! fully updated state. Operations on different matches do not contend.

pub mod normalize;
pub mod score;
pub mod settlement;
pub mod tracking;
pub mod view;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::models::roster::DEFAULT_FORMATION;
use crate::models::{
    ExcludedPlayer, GroupLink, LedgerEvent, Match, MatchStatus, Referees, Roster, RosterPlayer,
    Side, StandingsRow,
};
use crate::store::{
    GroupStandingsStore, MemoryGroupStandingsStore, MemoryPlayerHistoryStore, MemoryStandingsStore,
    PlayerHistoryStore, StandingsStore,
};

pub use score::CancelledGoal;
pub use tracking::{FinalizedMinutes, TrackingEntry};
pub use view::{CardKind, CardView, EventGroups, GoalView, MatchView, PeriodView, SubstitutionView};

/// Engine configuration. Plain data, no environment reads here.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Minutes assumed when a match ends without a usable clock (2x20 league
    /// format).
    pub default_duration_min: u32,
    pub default_formation: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_duration_min: 40,
            default_formation: DEFAULT_FORMATION.to_string(),
        }
    }
}

/// Everything owned by one match, guarded by a single mutex.
#[derive(Debug)]
struct MatchEntry {
    state: Match,
    events: Vec<LedgerEvent>,
    next_seq: u64,
    tracking: HashMap<u64, TrackingEntry>,
}

pub struct MatchLedger {
    config: LedgerConfig,
    matches: RwLock<HashMap<String, Arc<Mutex<MatchEntry>>>>,
    league: Arc<dyn StandingsStore>,
    groups: Arc<dyn GroupStandingsStore>,
    history: Arc<dyn PlayerHistoryStore>,
}

impl MatchLedger {
    pub fn new(
        config: LedgerConfig,
        league: Arc<dyn StandingsStore>,
        groups: Arc<dyn GroupStandingsStore>,
        history: Arc<dyn PlayerHistoryStore>,
    ) -> Self {
        Self {
            config,
            matches: RwLock::new(HashMap::new()),
            league,
            groups,
            history,
        }
    }

    /// Ledger backed by fresh in-memory stores. What tests and the CLI use.
    pub fn in_memory() -> Self {
        Self::new(
            LedgerConfig::default(),
            Arc::new(MemoryStandingsStore::new()),
            Arc::new(MemoryGroupStandingsStore::new()),
            Arc::new(MemoryPlayerHistoryStore::new()),
        )
    }

    // ========================
    // Lifecycle
    // ========================

    /// Create a match in `active` state and return its token.
    pub fn start_match(
        &self,
        team_a: &str,
        team_b: &str,
        external_id: Option<String>,
    ) -> Result<String> {
        let id = self.create_match(team_a, team_b, external_id, MatchStatus::Active)?;
        info!(match_id = %id, team_a, team_b, "match started");
        Ok(id)
    }

    /// Create a match in `scheduled` state (fixture opened ahead of play).
    pub fn schedule_match(
        &self,
        team_a: &str,
        team_b: &str,
        external_id: Option<String>,
    ) -> Result<String> {
        let id = self.create_match(team_a, team_b, external_id, MatchStatus::Scheduled)?;
        info!(match_id = %id, team_a, team_b, "match scheduled");
        Ok(id)
    }

    fn create_match(
        &self,
        team_a: &str,
        team_b: &str,
        external_id: Option<String>,
        status: MatchStatus,
    ) -> Result<String> {
        if team_a.trim().is_empty() || team_b.trim().is_empty() {
            return Err(LedgerError::Validation(
                "both team names are required".to_string(),
            ));
        }
        let id = external_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let entry = MatchEntry {
            state: Match {
                id: id.clone(),
                team_a: team_a.to_string(),
                team_b: team_b.to_string(),
                score_a: 0,
                score_b: 0,
                status,
                roster_a: Roster {
                    formation: self.config.default_formation.clone(),
                    ..Roster::default()
                },
                roster_b: Roster {
                    formation: self.config.default_formation.clone(),
                    ..Roster::default()
                },
                timer: "00:00".to_string(),
                period: "First half".to_string(),
                added_time: None,
                referees: None,
                excluded_players: Vec::new(),
                group_link: None,
                created_at: Utc::now(),
            },
            events: Vec::new(),
            next_seq: 0,
            tracking: HashMap::new(),
        };

        let mut matches = self.matches.write().expect("match map lock poisoned");
        if matches.contains_key(&id) {
            return Err(LedgerError::Validation(format!(
                "match token already in use: {id}"
            )));
        }
        matches.insert(id.clone(), Arc::new(Mutex::new(entry)));
        Ok(id)
    }

    /// Transition a scheduled match to active. No-op when already active.
    pub fn kick_off(&self, match_id: &str) -> Result<()> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        match entry.state.status {
            MatchStatus::Scheduled => {
                entry.state.status = MatchStatus::Active;
                info!(match_id, "match kicked off");
                Ok(())
            }
            MatchStatus::Active => Ok(()),
            MatchStatus::Finished => Err(self.not_active(&entry.state)),
        }
    }

    // ========================
    // Roster registry
    // ========================

    /// Set one side's lineup, fully replacing any previous one.
    ///
    /// `side_token` is `"A"`/`"B"` or a team name resolved by substring
    /// match. Starters with an external id are auto-enrolled in minutes
    /// tracking at minute 0 unless already tracked.
    pub fn set_lineup(
        &self,
        match_id: &str,
        side_token: &str,
        starters: Vec<RosterPlayer>,
        bench: Vec<RosterPlayer>,
        formation: Option<String>,
    ) -> Result<Side> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        let side = resolve_side(side_token, &entry.state)?;

        let roster = Roster {
            starters,
            bench,
            formation: formation.unwrap_or_else(|| self.config.default_formation.clone()),
        };

        for starter in &roster.starters {
            let Some(id) = starter.id else { continue };
            if entry.tracking.contains_key(&id) {
                continue;
            }
            entry
                .tracking
                .insert(id, TrackingEntry::starter(id, starter.name.clone(), side));
            debug!(match_id, player_id = id, player = %starter.name, "starter auto-tracked from lineup");
        }

        *entry.state.roster_mut(side) = roster;
        info!(match_id, ?side, "lineup set");
        Ok(side)
    }

    // ========================
    // Match metadata
    // ========================

    /// Referees and excluded players. Opaque to the engine's invariants.
    pub fn set_match_info(
        &self,
        match_id: &str,
        referees: Option<Referees>,
        excluded_players: Option<Vec<ExcludedPlayer>>,
    ) -> Result<()> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        if let Some(referees) = referees {
            entry.state.referees = Some(referees);
        }
        if let Some(excluded) = excluded_players {
            entry.state.excluded_players = excluded;
        }
        Ok(())
    }

    /// Link the match to a tournament group; its table is then updated at
    /// finalization alongside the league table.
    pub fn link_group(&self, match_id: &str, link: GroupLink) -> Result<()> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        entry.state.group_link = Some(link);
        Ok(())
    }

    /// Sync the display clock from an external scoreboard. An optional score
    /// pair applies the same last-write-wins override as `override_score`.
    pub fn sync_clock(
        &self,
        match_id: &str,
        timer: &str,
        period: Option<&str>,
        added_time: Option<u8>,
        score: Option<(u32, u32)>,
    ) -> Result<()> {
        if !timer.contains(':') {
            return Err(LedgerError::Validation(format!(
                "timer must be \"MM:SS\", got {timer:?}"
            )));
        }
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        entry.state.timer = timer.to_string();
        if let Some(period) = period {
            entry.state.period = period.to_string();
        }
        entry.state.added_time = added_time;
        if let Some((a, b)) = score {
            entry.state.score_a = a;
            entry.state.score_b = b;
        }
        Ok(())
    }

    // ========================
    // Event log
    // ========================

    /// Append one event to an active match.
    ///
    /// `type_token` and the payload fields accept the external synonyms
    /// (see `normalize`); the stored event is fully canonical. Goal-type
    /// events move the score incrementally, equivalent to a full recount.
    pub fn append_event(
        &self,
        match_id: &str,
        type_token: &str,
        minute: u32,
        data: &Value,
    ) -> Result<()> {
        let kind = normalize::normalize_kind(type_token)?;
        let payload = normalize::normalize_payload(kind, data)?;

        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        if entry.state.status != MatchStatus::Active {
            return Err(self.not_active(&entry.state));
        }

        let seq = entry.next_seq;
        entry.next_seq += 1;
        let event = LedgerEvent {
            seq,
            minute,
            kind,
            payload,
        };

        match event.scoring_side() {
            Some(Side::A) => entry.state.score_a += 1,
            Some(Side::B) => entry.state.score_b += 1,
            None => {}
        }
        debug!(match_id, ?kind, minute, seq, "event appended");
        entry.events.push(event);
        Ok(())
    }

    /// Cancel the most recent uncancelled goal and adjust the score,
    /// clamped at zero.
    pub fn cancel_last_goal(&self, match_id: &str) -> Result<CancelledGoal> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        if entry.state.status != MatchStatus::Active {
            return Err(self.not_active(&entry.state));
        }

        let (decrement_side, mut cancelled) = score::cancel_last_goal(match_id, &mut entry.events)?;
        match decrement_side {
            Side::A => entry.state.score_a = entry.state.score_a.saturating_sub(1),
            Side::B => entry.state.score_b = entry.state.score_b.saturating_sub(1),
        }
        cancelled.new_score = (entry.state.score_a, entry.state.score_b);
        info!(
            match_id,
            minute = cancelled.minute,
            was_own_goal = cancelled.was_own_goal,
            "goal cancelled"
        );
        Ok(cancelled)
    }

    // ========================
    // Score
    // ========================

    /// Authoritative score override from an external scoreboard sync.
    /// Last write wins; deliberately independent of the event ledger.
    pub fn override_score(&self, match_id: &str, score_a: u32, score_b: u32) -> Result<()> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        entry.state.score_a = score_a;
        entry.state.score_b = score_b;
        debug!(match_id, score_a, score_b, "score overridden");
        Ok(())
    }

    /// Recompute the score from the event log, store it, and return it.
    /// Discards any prior override.
    pub fn recompute_from_ledger(&self, match_id: &str) -> Result<(u32, u32)> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        let (a, b) = score::recount(&entry.events);
        entry.state.score_a = a;
        entry.state.score_b = b;
        Ok((a, b))
    }

    // ========================
    // Finalization
    // ========================

    /// End a match: freeze the score, apply standings deltas, finalize
    /// minutes and emit player history records.
    ///
    /// Idempotent at the status gate: ending an already finished match
    /// returns `Ok(false)` without re-applying anything. The settlement
    /// steps are best effort — a failing store write is logged and the
    /// remaining steps still run.
    pub fn end_match(&self, match_id: &str, final_score: Option<(u32, u32)>) -> Result<bool> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        if entry.state.status == MatchStatus::Finished {
            return Ok(false);
        }

        if let Some((a, b)) = final_score {
            entry.state.score_a = a;
            entry.state.score_b = b;
        }
        entry.state.status = MatchStatus::Finished;
        info!(
            match_id,
            team_a = %entry.state.team_a,
            team_b = %entry.state.team_b,
            score_a = entry.state.score_a,
            score_b = entry.state.score_b,
            "match ended"
        );

        // League standings, one delta per team.
        for side in [Side::A, Side::B] {
            let team = entry.state.team_name(side).to_string();
            let delta = settlement::delta_for(&entry.state, side);
            if let Err(e) = self.league.record_result(&team, &delta) {
                warn!(match_id, team = %team, error = %e, "league standings update failed");
            }
        }

        // Tournament group standings, when linked. Independent of the
        // league table; both get the same delta.
        if let Some(link) = entry.state.group_link.clone() {
            for side in [Side::A, Side::B] {
                let team = entry.state.team_name(side).to_string();
                let delta = settlement::delta_for(&entry.state, side);
                if let Err(e) = self.groups.record_result(&link, &team, &delta) {
                    warn!(match_id, team = %team, error = %e, "group standings update failed");
                }
            }
        }

        // Minutes, then one history record per roster player.
        let final_minute = entry
            .state
            .clock_minute()
            .filter(|m| *m > 0)
            .unwrap_or(self.config.default_duration_min);
        let tracking = std::mem::take(&mut entry.tracking);
        if tracking.is_empty() {
            warn!(
                match_id,
                "no tracking entries at finalization, reconstructing minutes from rosters"
            );
        }
        let minutes = tracking::finalize_minutes(
            tracking,
            &entry.state.roster_a,
            &entry.state.roster_b,
            final_minute,
        );
        let records = settlement::build_player_records(&entry.state, &entry.events, &minutes);
        for record in records {
            if let Err(e) = self.history.append(record) {
                warn!(match_id, error = %e, "player history append failed");
            }
        }

        Ok(true)
    }

    /// End every active match, tolerating per-match failures. Returns the
    /// number actually ended.
    pub fn end_all_active(&self) -> usize {
        let active_ids: Vec<String> = {
            let matches = self.matches.read().expect("match map lock poisoned");
            matches
                .iter()
                .filter(|(_, entry)| lock(entry).state.status == MatchStatus::Active)
                .map(|(id, _)| id.clone())
                .collect()
        };

        let mut ended = 0;
        for id in &active_ids {
            match self.end_match(id, None) {
                Ok(true) => ended += 1,
                Ok(false) => {}
                Err(e) => warn!(match_id = %id, error = %e, "failed to end match"),
            }
        }
        info!(ended, total = active_ids.len(), "ended all active matches");
        ended
    }

    // ========================
    // Player-minutes tracker
    // ========================

    /// Record a player stepping onto the pitch. Idempotent while on pitch.
    ///
    /// The side is taken from `side_hint`, else from roster membership,
    /// else team A (the historical loose default).
    pub fn player_enters(
        &self,
        match_id: &str,
        player_id: u64,
        name: Option<&str>,
        side_hint: Option<Side>,
        minute: u32,
    ) -> Result<()> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);

        if let Some(tracked) = entry.tracking.get_mut(&player_id) {
            tracked.enter(minute);
            debug!(match_id, player_id, minute, "player re-entered");
            return Ok(());
        }

        let side = side_hint
            .or_else(|| {
                if entry.state.roster_a.find_by_id(player_id).is_some() {
                    Some(Side::A)
                } else if entry.state.roster_b.find_by_id(player_id).is_some() {
                    Some(Side::B)
                } else {
                    None
                }
            })
            .unwrap_or(Side::A);
        let name = name
            .map(str::to_string)
            .or_else(|| {
                entry
                    .state
                    .roster(side)
                    .find_by_id(player_id)
                    .map(|p| p.name.clone())
            })
            .unwrap_or_else(|| format!("Player{player_id}"));

        let mut tracked = TrackingEntry::starter(player_id, name, side);
        tracked.entered_at = minute;
        entry.tracking.insert(player_id, tracked);
        debug!(match_id, player_id, minute, "player entered");
        Ok(())
    }

    /// Record a player leaving the pitch. Returns (minutes this interval,
    /// accumulated minutes). No-op when already off pitch.
    pub fn player_exits(&self, match_id: &str, player_id: u64, minute: u32) -> Result<(u32, u32)> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        let tracked = entry.tracking.get_mut(&player_id).ok_or_else(|| {
            LedgerError::PlayerNotTracked {
                match_id: match_id.to_string(),
                player_id,
            }
        })?;
        let played = tracked.exit(minute);
        let total = tracked.accumulated;
        debug!(match_id, player_id, minute, played, total, "player exited");
        Ok((played, total))
    }

    /// Close all open intervals at `final_minute` and discard tracking
    /// state for the match. Standalone variant of what `end_match` does;
    /// emits no history records.
    pub fn finalize_tracking(
        &self,
        match_id: &str,
        final_minute: u32,
    ) -> Result<Vec<FinalizedMinutes>> {
        let entry = self.entry(match_id)?;
        let mut entry = lock(&entry);
        let tracking = std::mem::take(&mut entry.tracking);
        Ok(tracking::finalize_minutes(
            tracking,
            &entry.state.roster_a,
            &entry.state.roster_b,
            final_minute,
        ))
    }

    /// Current tracking entries for the match. Empty once finalized.
    pub fn tracking_snapshot(&self, match_id: &str) -> Result<Vec<TrackingEntry>> {
        let entry = self.entry(match_id)?;
        let entry = lock(&entry);
        let mut snapshot: Vec<TrackingEntry> = entry.tracking.values().cloned().collect();
        snapshot.sort_by_key(|t| t.player_id);
        Ok(snapshot)
    }

    // ========================
    // Queries
    // ========================

    pub fn get_match(&self, match_id: &str) -> Result<Match> {
        let entry = self.entry(match_id)?;
        let entry = lock(&entry);
        Ok(entry.state.clone())
    }

    /// Full display view: match state plus partitioned, enriched events.
    pub fn match_view(&self, match_id: &str) -> Result<MatchView> {
        let entry = self.entry(match_id)?;
        let entry = lock(&entry);
        Ok(MatchView {
            events: view::build_groups(&entry.state, &entry.events),
            match_state: entry.state.clone(),
        })
    }

    /// All matches, active first, then most recently created.
    pub fn matches(&self) -> Vec<Match> {
        let matches = self.matches.read().expect("match map lock poisoned");
        let mut all: Vec<Match> = matches.values().map(|e| lock(e).state.clone()).collect();
        all.sort_by(|a, b| {
            let active_a = a.status == MatchStatus::Active;
            let active_b = b.status == MatchStatus::Active;
            active_b
                .cmp(&active_a)
                .then(b.created_at.cmp(&a.created_at))
        });
        all
    }

    pub fn league_table(&self) -> Vec<StandingsRow> {
        self.league.table().unwrap_or_else(|e| {
            warn!(error = %e, "league table read failed");
            Vec::new()
        })
    }

    pub fn group_table(&self, link: &GroupLink) -> Vec<StandingsRow> {
        self.groups.group_table(link).unwrap_or_else(|e| {
            warn!(error = %e, "group table read failed");
            Vec::new()
        })
    }

    pub fn history(&self) -> &Arc<dyn PlayerHistoryStore> {
        &self.history
    }

    // ========================
    // Internals
    // ========================

    fn entry(&self, match_id: &str) -> Result<Arc<Mutex<MatchEntry>>> {
        let matches = self.matches.read().expect("match map lock poisoned");
        matches
            .get(match_id)
            .cloned()
            .ok_or_else(|| LedgerError::MatchNotFound(match_id.to_string()))
    }

    fn not_active(&self, state: &Match) -> LedgerError {
        LedgerError::MatchNotActive {
            id: state.id.clone(),
            status: state.status.as_str().to_string(),
        }
    }
}

fn lock(entry: &Arc<Mutex<MatchEntry>>) -> MutexGuard<'_, MatchEntry> {
    entry.lock().expect("match entry lock poisoned")
}

/// Resolve a side token: exact `A`/`B` tag first, then case-insensitive
/// substring match against the team names (either direction of containment).
fn resolve_side(token: &str, m: &Match) -> Result<Side> {
    let trimmed = token.trim();
    match trimmed {
        "A" | "a" => return Ok(Side::A),
        "B" | "b" => return Ok(Side::B),
        _ => {}
    }

    let given = trimmed.to_lowercase();
    if given.is_empty() {
        return Err(LedgerError::Validation("team is required".to_string()));
    }
    let team_a = m.team_a.to_lowercase();
    let team_b = m.team_b.to_lowercase();
    if team_a.contains(&given) || given.contains(&team_a) {
        Ok(Side::A)
    } else if team_b.contains(&given) || given.contains(&team_b) {
        Ok(Side::B)
    } else {
        Err(LedgerError::AmbiguousTeam {
            given: trimmed.to_string(),
            team_a: m.team_a.clone(),
            team_b: m.team_b.clone(),
        })
    }
}
