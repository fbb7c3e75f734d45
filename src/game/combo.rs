//! Combo recognition
//!
//! Each player has a rolling history of side-independent symbols. Movement
//! presses are normalized to forward/backward from the player's facing at
//! press time, so a move typed on the right side of the arena matches the
//! same catalog entry as one typed on the left.

use tracing::debug;

use crate::catalog::{CharacterCatalog, MoveSequence, StateId, Symbol};
use crate::input::Action;
use crate::util::time::{MsTimer, COMBO_WINDOW_MS};

use super::physics::Facing;

/// Minimum symbols kept per player. A recognizer built for a catalog keeps
/// at least as many as its longest special.
pub const MAX_HISTORY: usize = 16;

/// Symbol for `action` pressed while facing `facing`
pub fn normalize(action: Action, facing: Facing) -> Symbol {
    match (action, facing) {
        (Action::Attack, _) => Symbol::Attack,
        (Action::MoveRight, Facing::Right) | (Action::MoveLeft, Facing::Left) => Symbol::Forward,
        (Action::MoveLeft, Facing::Right) | (Action::MoveRight, Facing::Left) => Symbol::Backward,
    }
}

/// Inverse of [`normalize`]
pub fn action_for(symbol: Symbol, facing: Facing) -> Action {
    match (symbol, facing) {
        (Symbol::Attack, _) => Action::Attack,
        (Symbol::Forward, Facing::Right) | (Symbol::Backward, Facing::Left) => Action::MoveRight,
        (Symbol::Forward, Facing::Left) | (Symbol::Backward, Facing::Right) => Action::MoveLeft,
    }
}

/// One player's combo window
#[derive(Debug, Clone)]
pub struct ComboRecognizer {
    history: Vec<Symbol>,
    age: MsTimer,
    capacity: usize,
}

impl Default for ComboRecognizer {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl ComboRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognizer keeping up to `capacity` symbols (never fewer than one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: Vec::with_capacity(capacity),
            age: MsTimer::default(),
            capacity,
        }
    }

    /// Recognizer able to hold every special of `catalog`
    pub fn for_catalog(catalog: &CharacterCatalog) -> Self {
        Self::with_capacity(catalog.longest_sequence().max(MAX_HISTORY))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn history(&self) -> &[Symbol] {
        &self.history
    }

    pub fn age_ms(&self) -> f32 {
        self.age.elapsed_ms()
    }

    /// Age the window; drop the whole history once no key arrived for longer
    /// than the combo window
    pub fn advance(&mut self, delta_ms: f32) {
        self.age.advance(delta_ms);
        if self.age.exceeded(COMBO_WINDOW_MS) {
            self.clear();
        }
    }

    /// Record a normalized symbol and restart the window
    pub fn push(&mut self, symbol: Symbol) {
        if self.history.len() >= self.capacity {
            self.history.remove(0);
        }
        self.history.push(symbol);
        self.age.reset();
    }

    pub fn press(&mut self, action: Action, facing: Facing) {
        self.push(normalize(action, facing));
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.age.reset();
    }

    /// True if `sequence` ends the live history
    pub fn matches(&self, sequence: &MoveSequence) -> bool {
        !self.age.exceeded(COMBO_WINDOW_MS) && sequence.is_suffix_of(&self.history)
    }

    /// First special (in catalog order) completed by the history. Clears the
    /// history on a match.
    pub fn recognize(&mut self, catalog: &CharacterCatalog) -> Option<(StateId, MoveSequence)> {
        let (id, sequence) = catalog
            .specials()
            .find(|(_, state)| self.matches(&state.sequence))
            .map(|(id, state)| (id, state.sequence.clone()))?;

        debug!(character = %catalog.name(), sequence = %sequence, "Combo recognized");
        self.clear();
        Some((id, sequence))
    }
}
