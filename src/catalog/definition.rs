//! Roster file wire types
//!
//! These mirror the on-disk character JSON. They are converted into
//! validated [`CharacterCatalog`]s and never used by the simulation directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    CatalogError, CharacterCatalog, CharacterState, Frame, MoveSequence, Rect, Roster, StateKind,
};

/// Whole roster file: character name -> definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterDefinition {
    pub characters: BTreeMap<String, CharacterDefinition>,
}

/// One character entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterDefinition {
    /// Maximum health
    #[serde(rename = "point")]
    pub max_health: u32,
    /// Portrait for the selection screen
    #[serde(rename = "url", default)]
    pub portrait: Option<String>,
    /// All states of this character
    #[serde(rename = "status")]
    pub states: Vec<StateDefinition>,
}

/// One state entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDefinition {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: StateKind,
    /// Move symbols (`F`, `B`, `A`); empty for non-special states
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(rename = "imgs", default)]
    pub frames: Vec<FrameDefinition>,
    /// Hit volume
    #[serde(rename = "block", default)]
    pub hit_volume: Option<Rect>,
    /// Attack volume
    #[serde(rename = "attack", default)]
    pub attack_volume: Option<Rect>,
    #[serde(default)]
    pub power: u32,
}

fn default_kind() -> StateKind {
    StateKind::Normal
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameDefinition {
    pub left_url: String,
    pub right_url: String,
    pub duration: f32,
}

impl RosterDefinition {
    pub fn into_roster(self) -> Result<Roster, CatalogError> {
        let characters = self
            .characters
            .into_iter()
            .map(|(name, def)| def.into_catalog(name))
            .collect::<Result<Vec<_>, _>>()?;
        Roster::new(characters)
    }
}

impl CharacterDefinition {
    pub fn into_catalog(self, name: String) -> Result<CharacterCatalog, CatalogError> {
        let states = self
            .states
            .into_iter()
            .map(StateDefinition::into_state)
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = CharacterCatalog::new(name, self.max_health, states)?;
        Ok(match self.portrait {
            Some(portrait) => catalog.with_portrait(portrait),
            None => catalog,
        })
    }
}

impl StateDefinition {
    fn into_state(self) -> Result<CharacterState, CatalogError> {
        let sequence = self
            .keys
            .iter()
            .map(|key| key.parse())
            .collect::<Result<Vec<_>, _>>()
            .map(MoveSequence::new)?;

        let frames = self
            .frames
            .into_iter()
            .map(|f| Frame {
                duration_ms: f.duration,
                left_sprite: f.left_url,
                right_sprite: f.right_url,
            })
            .collect();

        Ok(CharacterState {
            kind: self.kind,
            sequence,
            frames,
            hit_volume: self.hit_volume,
            attack_volume: self.attack_volume,
            power: self.power,
        })
    }
}
