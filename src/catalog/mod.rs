//! Character move/state catalog
//!
//! A catalog is built once per character from validated definitions and is
//! shared read-only (behind `Arc`) by every combatant using that character.
//! Move sequences are resolved to typed [`StateId`]s here, at load time, so
//! nothing downstream looks states up by string.

pub mod definition;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use definition::{CharacterDefinition, RosterDefinition, StateDefinition};

/// Broad category of a character state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// Idle / walking
    Normal,
    /// Basic or special attack in progress
    Attacking,
    /// Reeling from a hit
    Attacked,
    /// Health reached zero
    Knocked,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Normal => "normal",
            StateKind::Attacking => "attacking",
            StateKind::Attacked => "attacked",
            StateKind::Knocked => "knocked",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side-independent combo symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Toward the opponent
    #[serde(rename = "F")]
    Forward,
    /// Away from the opponent
    #[serde(rename = "B")]
    Backward,
    #[serde(rename = "A")]
    Attack,
}

impl Symbol {
    pub fn as_char(&self) -> char {
        match self {
            Symbol::Forward => 'F',
            Symbol::Backward => 'B',
            Symbol::Attack => 'A',
        }
    }
}

impl FromStr for Symbol {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "F" | "f" => Ok(Symbol::Forward),
            "B" | "b" => Ok(Symbol::Backward),
            "A" | "a" => Ok(Symbol::Attack),
            other => Err(CatalogError::UnknownSymbol(other.to_string())),
        }
    }
}

/// Ordered symbols that trigger a special move
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveSequence(Vec<Symbol>);

impl MoveSequence {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if this sequence ends `history`.
    ///
    /// An empty sequence never matches.
    pub fn is_suffix_of(&self, history: &[Symbol]) -> bool {
        !self.0.is_empty() && history.ends_with(&self.0)
    }
}

impl From<Vec<Symbol>> for MoveSequence {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, symbol) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for MoveSequence {
    type Err = CatalogError;

    /// Parses the comma-joined form, e.g. `F,F,A`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Symbol::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Typed handle to a catalog state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "id", content = "index", rename_all = "snake_case")]
pub enum StateId {
    Normal,
    /// The default basic attack
    Attack,
    Attacked,
    Knocked,
    /// A special move, indexed in definition order
    Special(usize),
}

/// Axis-aligned box relative to the combatant origin (or in world space
/// once translated)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// One animation frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Display time (ms)
    pub duration_ms: f32,
    /// Sprite shown while facing right
    pub left_sprite: String,
    /// Sprite shown while facing left
    pub right_sprite: String,
}

/// A named state in a character's catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterState {
    pub kind: StateKind,
    /// Empty for everything except special attacks
    pub sequence: MoveSequence,
    pub frames: Vec<Frame>,
    pub hit_volume: Option<Rect>,
    pub attack_volume: Option<Rect>,
    /// Damage dealt while this state is active
    pub power: u32,
}

impl CharacterState {
    pub fn total_duration(&self) -> f32 {
        self.frames.iter().map(|f| f.duration_ms).sum()
    }

    /// Frame whose cumulative duration range contains `timer`; clamps to the
    /// last frame once the animation has run out
    pub fn frame_index(&self, timer: f32) -> Option<usize> {
        if self.frames.is_empty() {
            return None;
        }

        let mut accumulated = 0.0;
        for (i, frame) in self.frames.iter().enumerate() {
            accumulated += frame.duration_ms;
            if timer < accumulated {
                return Some(i);
            }
        }

        Some(self.frames.len() - 1)
    }

    pub fn is_complete(&self, timer: f32) -> bool {
        timer >= self.total_duration()
    }
}

/// Immutable, validated state table for one character
#[derive(Debug, Clone)]
pub struct CharacterCatalog {
    name: String,
    max_health: u32,
    portrait: Option<String>,
    normal: CharacterState,
    attack: Option<CharacterState>,
    attacked: CharacterState,
    knocked: CharacterState,
    specials: Vec<CharacterState>,
    by_sequence: HashMap<MoveSequence, StateId>,
}

impl CharacterCatalog {
    /// Build a catalog, rejecting configuration defects.
    ///
    /// Requires exactly one `normal`, `attacked` and `knocked` state, at most
    /// one default attack, and unique special sequences.
    pub fn new(
        name: impl Into<String>,
        max_health: u32,
        states: Vec<CharacterState>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        if max_health == 0 {
            return Err(CatalogError::InvalidHealth { character: name });
        }

        let mut normal = Vec::new();
        let mut attacked = Vec::new();
        let mut knocked = Vec::new();
        let mut attack = None;
        let mut specials = Vec::new();
        let mut by_sequence = HashMap::new();

        for state in states {
            if state
                .frames
                .iter()
                .any(|f| !f.duration_ms.is_finite() || f.duration_ms < 0.0)
            {
                return Err(CatalogError::InvalidFrame { character: name });
            }
            if state.kind != StateKind::Attacking && !state.sequence.is_empty() {
                return Err(CatalogError::SequenceOnNonAttack {
                    character: name,
                    kind: state.kind,
                });
            }

            match state.kind {
                StateKind::Normal => normal.push(state),
                StateKind::Attacked => attacked.push(state),
                StateKind::Knocked => knocked.push(state),
                StateKind::Attacking if state.sequence.is_empty() => {
                    if attack.is_some() {
                        return Err(CatalogError::DuplicateDefaultAttack { character: name });
                    }
                    attack = Some(state);
                }
                StateKind::Attacking => {
                    let id = StateId::Special(specials.len());
                    if by_sequence.insert(state.sequence.clone(), id).is_some() {
                        return Err(CatalogError::DuplicateSequence {
                            character: name,
                            sequence: state.sequence.to_string(),
                        });
                    }
                    specials.push(state);
                }
            }
        }

        let normal = exactly_one(&name, StateKind::Normal, normal)?;
        let attacked = exactly_one(&name, StateKind::Attacked, attacked)?;
        let knocked = exactly_one(&name, StateKind::Knocked, knocked)?;

        Ok(Self {
            name,
            max_health,
            portrait: None,
            normal,
            attack,
            attacked,
            knocked,
            specials,
            by_sequence,
        })
    }

    pub fn with_portrait(mut self, portrait: impl Into<String>) -> Self {
        self.portrait = Some(portrait.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn portrait(&self) -> Option<&str> {
        self.portrait.as_deref()
    }

    pub fn state(&self, id: StateId) -> Option<&CharacterState> {
        match id {
            StateId::Normal => Some(&self.normal),
            StateId::Attack => self.attack.as_ref(),
            StateId::Attacked => Some(&self.attacked),
            StateId::Knocked => Some(&self.knocked),
            StateId::Special(index) => self.specials.get(index),
        }
    }

    pub fn normal_state(&self) -> &CharacterState {
        &self.normal
    }

    pub fn has_default_attack(&self) -> bool {
        self.attack.is_some()
    }

    /// Special move registered under exactly this sequence
    pub fn special_for(&self, sequence: &MoveSequence) -> Option<StateId> {
        self.by_sequence.get(sequence).copied()
    }

    /// Special moves in definition order
    pub fn specials(&self) -> impl Iterator<Item = (StateId, &CharacterState)> {
        self.specials
            .iter()
            .enumerate()
            .map(|(i, state)| (StateId::Special(i), state))
    }

    /// Symbol count of the longest special sequence (0 without specials)
    pub fn longest_sequence(&self) -> usize {
        self.specials.iter().map(|s| s.sequence.len()).max().unwrap_or(0)
    }

    /// Resolve a label (`normal`, `attacking`, `attacked`, `knocked`, or a
    /// comma-joined sequence such as `F,F,A`)
    pub fn resolve(&self, label: &str) -> Option<StateId> {
        let id = match label {
            "normal" => StateId::Normal,
            "attacking" => StateId::Attack,
            "attacked" => StateId::Attacked,
            "knocked" => StateId::Knocked,
            other => {
                let sequence = MoveSequence::from_str(other).ok()?;
                return self.special_for(&sequence);
            }
        };
        self.state(id).map(|_| id)
    }

    /// Human-readable label for a state id
    pub fn label(&self, id: StateId) -> String {
        match id {
            StateId::Special(_) => self
                .state(id)
                .map(|s| s.sequence.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            StateId::Normal => "normal".to_string(),
            StateId::Attack => "attacking".to_string(),
            StateId::Attacked => "attacked".to_string(),
            StateId::Knocked => "knocked".to_string(),
        }
    }
}

fn exactly_one(
    character: &str,
    kind: StateKind,
    mut found: Vec<CharacterState>,
) -> Result<CharacterState, CatalogError> {
    if found.len() != 1 {
        return Err(CatalogError::StateCount {
            character: character.to_string(),
            kind,
            found: found.len(),
        });
    }
    Ok(found.remove(0))
}

/// Every selectable character, in roster order
#[derive(Debug, Clone, Default)]
pub struct Roster {
    characters: Vec<Arc<CharacterCatalog>>,
}

impl Roster {
    pub fn new(characters: Vec<CharacterCatalog>) -> Result<Self, CatalogError> {
        if characters.is_empty() {
            return Err(CatalogError::EmptyRoster);
        }
        Ok(Self {
            characters: characters.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse and validate a roster from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let definition: RosterDefinition = serde_json::from_str(json)?;
        definition.into_roster()
    }

    /// Read, parse and validate a roster file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn get(&self, name: &str) -> Option<Arc<CharacterCatalog>> {
        self.characters.iter().find(|c| c.name() == name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.characters.iter().map(|c| c.name())
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

/// Configuration defects found while building a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read roster file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed roster JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Roster contains no characters")]
    EmptyRoster,

    #[error("Character {character} must have exactly one {kind} state (found {found})")]
    StateCount {
        character: String,
        kind: StateKind,
        found: usize,
    },

    #[error("Character {character} defines more than one default attack")]
    DuplicateDefaultAttack { character: String },

    #[error("Character {character} registers move {sequence} more than once")]
    DuplicateSequence { character: String, sequence: String },

    #[error("Character {character} puts a move sequence on a {kind} state")]
    SequenceOnNonAttack { character: String, kind: StateKind },

    #[error("Character {character} must have positive health")]
    InvalidHealth { character: String },

    #[error("Character {character} has a frame with a negative or non-finite duration")]
    InvalidFrame { character: String },

    #[error("Unknown move symbol {0:?}")]
    UnknownSymbol(String),
}
