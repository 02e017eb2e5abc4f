use serde::{Deserialize, Serialize};

pub const DEFAULT_FORMATION: &str = "4-4-2";

/// One roster entry. The external numeric id is the identity key across
/// matches; the name doubles as a best-effort correlation key for events
/// that only carry a display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterPlayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl RosterPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            number: None,
            position: None,
            country: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_number(mut self, number: u8) -> Self {
        self.number = Some(number);
        self
    }
}

/// Starters plus bench for one side of a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Roster {
    pub starters: Vec<RosterPlayer>,
    pub bench: Vec<RosterPlayer>,
    pub formation: String,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            starters: Vec::new(),
            bench: Vec::new(),
            formation: DEFAULT_FORMATION.to_string(),
        }
    }
}

impl Roster {
    /// All players, starters first then bench, in declared order.
    pub fn all_players(&self) -> impl Iterator<Item = &RosterPlayer> {
        self.starters.iter().chain(self.bench.iter())
    }

    /// First player whose name starts with `token`, case-insensitively.
    /// Starters take precedence over the bench.
    pub fn find_by_prefix(&self, token: &str) -> Option<&RosterPlayer> {
        let lower = token.to_lowercase();
        self.all_players()
            .find(|p| p.name.to_lowercase().starts_with(&lower))
    }

    pub fn find_by_id(&self, id: u64) -> Option<&RosterPlayer> {
        self.all_players().find(|p| p.id == Some(id))
    }

    /// Exact-name membership check, used by the display-team fallback.
    pub fn contains_name(&self, name: &str) -> bool {
        self.all_players().any(|p| p.name == name)
    }
}
