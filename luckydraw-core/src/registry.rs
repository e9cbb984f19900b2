use crate::types::{Participant, WinnerRecord};

/// The loaded roster. Replaced wholesale on every load.
#[derive(Debug, Default, Clone)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, participants: Vec<Participant>) {
        tracing::info!(
            "Roster replaced: {} -> {} participants",
            self.participants.len(),
            participants.len()
        );
        self.participants = participants;
    }

    /// Participants that have not won yet, in load order
    pub fn eligible<'a>(&'a self, winners: &WinnerRecord) -> Vec<&'a Participant> {
        self.participants
            .iter()
            .filter(|p| !winners.contains(p.identity()))
            .collect()
    }

    pub fn eligible_count(&self, winners: &WinnerRecord) -> usize {
        self.participants
            .iter()
            .filter(|p| !winners.contains(p.identity()))
            .count()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
