//! Presentation snapshots and their cadence

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::StateKind;

use super::battle::Battle;
use super::physics::Facing;
use super::PlayerSlot;

/// Everything a renderer needs to draw one fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub slot: PlayerSlot,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub state: StateKind,
    /// Kind name or move sequence
    pub state_label: String,
    pub frame_index: Option<usize>,
    pub sprite: Option<String>,
    pub health: u32,
    pub max_health: u32,
    pub knockdowns: u8,
    pub invincible: bool,
    pub knocked_back: bool,
}

/// Battle state for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub battle_id: Uuid,
    pub tick: u64,
    pub fighters: [FighterSnapshot; 2],
    /// Who is flashing, if anyone
    pub hit_flash: Option<PlayerSlot>,
    pub knockback_active: bool,
    pub winner: Option<PlayerSlot>,
}

impl BattleSnapshot {
    pub fn capture(battle: &Battle) -> Self {
        Self {
            battle_id: battle.id(),
            tick: battle.tick(),
            fighters: PlayerSlot::BOTH.map(|slot| capture_fighter(battle, slot)),
            hit_flash: battle.hit_flash().map(|flash| flash.target),
            knockback_active: battle.knockback().is_some(),
            winner: battle.winner(),
        }
    }

    pub fn fighter(&self, slot: PlayerSlot) -> &FighterSnapshot {
        &self.fighters[slot.index()]
    }
}

fn capture_fighter(battle: &Battle, slot: PlayerSlot) -> FighterSnapshot {
    let fighter = battle.fighter(slot);
    let opponent_x = Some(battle.fighter(slot.opponent()).x());

    FighterSnapshot {
        slot,
        name: fighter.name().to_string(),
        x: fighter.x(),
        y: fighter.y(),
        facing: fighter.facing(opponent_x),
        state: fighter.kind(),
        state_label: fighter.state_label(),
        frame_index: fighter.current_frame_index(),
        sprite: fighter.current_sprite(opponent_x).map(str::to_string),
        health: fighter.health(),
        max_health: fighter.max_health(),
        knockdowns: fighter.knockdowns(),
        invincible: fighter.is_invincible(),
        knocked_back: fighter.is_knocked_back(),
    }
}

/// Decides which ticks get a snapshot
#[derive(Debug, Clone)]
pub struct SnapshotCadence {
    /// Ticks since the last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotCadence {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Count a tick; true when it is time for a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force a snapshot on the next check (hits, knockdowns)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }
}
