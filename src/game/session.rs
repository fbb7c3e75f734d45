//! Game session: character selection, battle and victory

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::catalog::{CharacterCatalog, Roster};
use crate::input::InputFrame;

use super::battle::Battle;
use super::events::BattleEvent;
use super::snapshot::BattleSnapshot;
use super::{Arena, PlayerSlot};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GamePhase {
    /// Players are picking characters
    Selecting,
    /// Battle in progress
    Battle,
    /// Battle decided, waiting for a reset
    Victory { winner: PlayerSlot },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown character: {0}")]
    UnknownCharacter(String),

    #[error("both players must select a character first")]
    SelectionIncomplete,

    #[error("not allowed in the {0:?} phase")]
    WrongPhase(GamePhase),
}

/// Owns the roster and at most one battle at a time
#[derive(Debug)]
pub struct GameSession {
    roster: Roster,
    arena: Arena,
    phase: GamePhase,
    selections: [Option<Arc<CharacterCatalog>>; 2],
    battle: Option<Battle>,
}

impl GameSession {
    pub fn new(roster: Roster, arena: Arena) -> Self {
        Self {
            roster,
            arena,
            phase: GamePhase::Selecting,
            selections: [None, None],
            battle: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    pub fn battle_mut(&mut self) -> Option<&mut Battle> {
        self.battle.as_mut()
    }

    pub fn selection(&self, slot: PlayerSlot) -> Option<&str> {
        self.selections[slot.index()].as_deref().map(|c| c.name())
    }

    /// Select `name` for `slot`, or clear the selection if `name` is already
    /// selected. Returns the selection after the toggle.
    pub fn toggle_selection(
        &mut self,
        slot: PlayerSlot,
        name: &str,
    ) -> Result<Option<&str>, SessionError> {
        if self.phase != GamePhase::Selecting {
            return Err(SessionError::WrongPhase(self.phase));
        }
        let catalog = self
            .roster
            .get(name)
            .ok_or_else(|| SessionError::UnknownCharacter(name.to_string()))?;

        let selection = &mut self.selections[slot.index()];
        if selection.as_ref().is_some_and(|c| c.name() == name) {
            *selection = None;
            info!(player = ?slot, character = %name, "Character deselected");
        } else {
            *selection = Some(catalog);
            info!(player = ?slot, character = %name, "Character selected");
        }

        Ok(self.selection(slot))
    }

    pub fn is_selection_complete(&self) -> bool {
        self.selections.iter().all(Option::is_some)
    }

    /// Spawn both fighters and enter the battle phase
    pub fn start_battle(&mut self) -> Result<&Battle, SessionError> {
        if self.phase != GamePhase::Selecting {
            return Err(SessionError::WrongPhase(self.phase));
        }
        let [Some(one), Some(two)] = self.selections.clone() else {
            return Err(SessionError::SelectionIncomplete);
        };

        self.phase = GamePhase::Battle;
        Ok(&*self.battle.insert(Battle::new(one, two, self.arena)))
    }

    /// Advance the battle. Outside the battle phase this does nothing.
    pub fn update(&mut self, delta_ms: f32, input: &InputFrame) -> Vec<BattleEvent> {
        if self.phase != GamePhase::Battle {
            return Vec::new();
        }
        let Some(battle) = self.battle.as_mut() else {
            return Vec::new();
        };

        let events = battle.update(delta_ms, input);
        if let Some(winner) = battle.winner() {
            self.phase = GamePhase::Victory { winner };
            info!(battle_id = %battle.id(), winner = ?winner, "Victory");
        }
        events
    }

    pub fn snapshot(&self) -> Option<BattleSnapshot> {
        self.battle.as_ref().map(BattleSnapshot::capture)
    }

    /// Drop the battle and selections and return to character selection
    pub fn reset(&mut self) {
        self.selections = [None, None];
        self.battle = None;
        self.phase = GamePhase::Selecting;
        info!("Session reset");
    }
}
