//! Things that happened during a battle tick

use serde::{Deserialize, Serialize};

use super::PlayerSlot;

/// Battle events, in the order they happened within a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BattleEvent {
    /// A move sequence was recognized and its state entered
    SpecialMove {
        player: PlayerSlot,
        /// Comma-joined symbols, e.g. "F,F,A"
        sequence: String,
    },

    /// Attack landed
    Hit {
        attacker: PlayerSlot,
        defender: PlayerSlot,
        damage: u32,
        defender_health: u32,
    },

    /// Health reached zero
    KnockedDown {
        player: PlayerSlot,
        knockdowns: u8,
    },

    /// Pushback finished, both fighters free to act again
    KnockbackFinished,

    /// Back on their feet after the first knockdown
    Revived {
        player: PlayerSlot,
    },

    /// Battle decided
    Victory {
        winner: PlayerSlot,
    },
}
