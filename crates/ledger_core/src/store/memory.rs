use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::standings::sort_table;
use crate::models::{GroupLink, PlayerMatchRecord, StandingsDelta, StandingsRow};

use super::{GroupStandingsStore, PlayerHistoryStore, StandingsStore, StoreResult};

/// League table kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStandingsStore {
    rows: RwLock<HashMap<String, StandingsRow>>,
}

impl MemoryStandingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StandingsStore for MemoryStandingsStore {
    fn record_result(&self, team: &str, delta: &StandingsDelta) -> StoreResult {
        let mut rows = self.rows.write().expect("standings lock poisoned");
        rows.entry(team.to_string())
            .or_insert_with(|| StandingsRow::new(team))
            .apply(delta);
        Ok(())
    }

    fn table(&self) -> StoreResult<Vec<StandingsRow>> {
        let rows = self.rows.read().expect("standings lock poisoned");
        let mut table: Vec<StandingsRow> = rows.values().cloned().collect();
        sort_table(&mut table);
        Ok(table)
    }
}

/// Group tables keyed by (tournament, group).
#[derive(Debug, Default)]
pub struct MemoryGroupStandingsStore {
    groups: RwLock<HashMap<GroupLink, HashMap<String, StandingsRow>>>,
}

impl MemoryGroupStandingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GroupStandingsStore for MemoryGroupStandingsStore {
    fn record_result(&self, link: &GroupLink, team: &str, delta: &StandingsDelta) -> StoreResult {
        let mut groups = self.groups.write().expect("group standings lock poisoned");
        groups
            .entry(link.clone())
            .or_default()
            .entry(team.to_string())
            .or_insert_with(|| StandingsRow::new(team))
            .apply(delta);
        Ok(())
    }

    fn group_table(&self, link: &GroupLink) -> StoreResult<Vec<StandingsRow>> {
        let groups = self.groups.read().expect("group standings lock poisoned");
        let mut table: Vec<StandingsRow> = groups
            .get(link)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default();
        sort_table(&mut table);
        Ok(table)
    }
}

/// Append-only history ledger in process memory.
#[derive(Debug, Default)]
pub struct MemoryPlayerHistoryStore {
    records: RwLock<Vec<PlayerMatchRecord>>,
}

impl MemoryPlayerHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlayerHistoryStore for MemoryPlayerHistoryStore {
    fn append(&self, record: PlayerMatchRecord) -> StoreResult {
        let mut records = self.records.write().expect("history lock poisoned");
        records.push(record);
        Ok(())
    }

    fn records(&self) -> StoreResult<Vec<PlayerMatchRecord>> {
        let records = self.records.read().expect("history lock poisoned");
        Ok(records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchOutcome;

    #[test]
    fn test_standings_store_creates_rows_on_demand() {
        let store = MemoryStandingsStore::new();
        store
            .record_result(
                "Lechia",
                &StandingsDelta {
                    outcome: MatchOutcome::Won,
                    goals_for: 2,
                    goals_against: 0,
                },
            )
            .unwrap();

        let table = store.table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].team, "Lechia");
        assert_eq!(table[0].points, 3);
        assert_eq!(table[0].played, 1);
    }

    #[test]
    fn test_group_tables_are_independent() {
        let store = MemoryGroupStandingsStore::new();
        let group_a = GroupLink {
            tournament: "Cup".to_string(),
            group: "A".to_string(),
        };
        let group_b = GroupLink {
            tournament: "Cup".to_string(),
            group: "B".to_string(),
        };
        let delta = StandingsDelta {
            outcome: MatchOutcome::Drawn,
            goals_for: 1,
            goals_against: 1,
        };

        store.record_result(&group_a, "Arka", &delta).unwrap();

        assert_eq!(store.group_table(&group_a).unwrap().len(), 1);
        assert!(store.group_table(&group_b).unwrap().is_empty());
    }
}
