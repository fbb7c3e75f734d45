//! Combat simulation modules

pub mod battle;
pub mod combat;
pub mod combatant;
pub mod combo;
pub mod events;
pub mod physics;
pub mod session;
pub mod snapshot;

pub use battle::Battle;
pub use combat::{HitFlash, HitResolver};
pub use combatant::{Combatant, DamageOutcome, Transition};
pub use combo::ComboRecognizer;
pub use events::BattleEvent;
pub use physics::{Facing, Knockback};
pub use session::{GamePhase, GameSession, SessionError};
pub use snapshot::BattleSnapshot;

use serde::{Deserialize, Serialize};

/// Distance of each spawn point from its arena edge
pub const SPAWN_OFFSET: f32 = 100.0;
/// Distance of the ground line from the arena bottom
pub const GROUND_OFFSET: f32 = 200.0;

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSlot {
    /// Starts on the left
    One,
    /// Starts on the right
    Two,
}

impl PlayerSlot {
    pub const BOTH: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn index(&self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    pub fn opponent(&self) -> PlayerSlot {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }
}

/// Arena bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(0.0, self.width)
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    pub fn spawn_x(&self, slot: PlayerSlot) -> f32 {
        match slot {
            PlayerSlot::One => SPAWN_OFFSET,
            PlayerSlot::Two => self.width - SPAWN_OFFSET,
        }
    }

    pub fn ground_y(&self) -> f32 {
        self.height - GROUND_OFFSET
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
