//! Conversation state — the append-only turn log of a thread.

use serde::{Deserialize, Serialize};

use crate::message::Turn;

/// Ordered, append-only sequence of turns.
///
/// The sequence never shrinks or reorders. Updates are concatenated to the
/// end by [`ConversationState::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine a state with an incremental update: `self` followed by `update`.
    pub fn merge(mut self, update: impl IntoIterator<Item = Turn>) -> Self {
        self.turns.extend(update);
        self
    }

    /// Append a single turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<Turn>> for ConversationState {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl<'a> IntoIterator for &'a ConversationState {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
