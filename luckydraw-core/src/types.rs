use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Participant identity. Never empty, always trimmed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantName(String);

impl ParticipantName {
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParticipantName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One entry of the loaded roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    name: ParticipantName,
    identifier: Option<String>,
}

impl Participant {
    pub fn new(name: ParticipantName, identifier: Option<String>) -> Self {
        let identifier = identifier
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Self { name, identifier }
    }

    pub fn name(&self) -> &ParticipantName {
        &self.name
    }

    /// Key used for winner exclusion
    pub fn identity(&self) -> &str {
        self.name.as_str()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identifier {
            Some(id) => write!(f, "{} ({})", self.name, id),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Identity -> won. Only ever grows during a session.
///
/// Serialized as a flat JSON object (`{"Alice": true}`); `false` entries
/// found in a stored slot are dropped on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct WinnerRecord {
    won: BTreeMap<String, bool>,
}

impl WinnerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the identity was not already recorded.
    pub fn insert(&mut self, identity: &str) -> bool {
        if self.contains(identity) {
            return false;
        }
        self.won.insert(identity.to_string(), true);
        true
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.won.get(identity).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.won.len()
    }

    pub fn is_empty(&self) -> bool {
        self.won.is_empty()
    }
}

impl From<BTreeMap<String, bool>> for WinnerRecord {
    fn from(mut won: BTreeMap<String, bool>) -> Self {
        won.retain(|_, has_won| *has_won);
        Self { won }
    }
}

impl From<WinnerRecord> for BTreeMap<String, bool> {
    fn from(record: WinnerRecord) -> Self {
        record.won
    }
}

/// A committed winner as kept in the history log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerEntry {
    pub name: String,
    pub identifier: Option<String>,
    pub won_at: DateTime<Utc>,
}

impl WinnerEntry {
    pub fn now(participant: &Participant) -> Self {
        Self {
            name: participant.identity().to_string(),
            identifier: participant.identifier().map(str::to_string),
            won_at: Utc::now(),
        }
    }
}
