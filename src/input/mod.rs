//! Per-tick input facts
//!
//! Device capture and debouncing happen elsewhere. The simulation receives,
//! per player, which actions are held this tick and which were freshly
//! pressed since the previous tick (the latter feed the combo recognizer).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game::PlayerSlot;

/// Something a player can ask their fighter to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveLeft,
    MoveRight,
    Attack,
}

/// Actions held down this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldActions {
    pub move_left: bool,
    pub move_right: bool,
    pub attack: bool,
}

impl HeldActions {
    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_left,
            Action::MoveRight => self.move_right,
            Action::Attack => self.attack,
        }
    }

    pub fn set(&mut self, action: Action, held: bool) {
        match action {
            Action::MoveLeft => self.move_left = held,
            Action::MoveRight => self.move_right = held,
            Action::Attack => self.attack = held,
        }
    }
}

/// One player's input for one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub held: HeldActions,
    /// Fresh presses, in order
    pub pressed: Vec<Action>,
}

impl PlayerInput {
    /// Press `action` this tick and keep it held
    pub fn press(&mut self, action: Action) {
        self.held.set(action, true);
        self.pressed.push(action);
    }

    pub fn hold(&mut self, action: Action) {
        self.held.set(action, true);
    }
}

/// Both players' input for one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    players: [PlayerInput; 2],
}

impl InputFrame {
    pub fn new(one: PlayerInput, two: PlayerInput) -> Self {
        Self {
            players: [one, two],
        }
    }

    pub fn player(&self, slot: PlayerSlot) -> &PlayerInput {
        &self.players[slot.index()]
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut PlayerInput {
        &mut self.players[slot.index()]
    }
}

/// Raw key name -> (player, action)
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<String, (PlayerSlot, Action)>,
}

impl Default for KeyBindings {
    /// Player one on `a`/`s`/`d`, player two on `k`/`l`/`j`
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
        };
        bindings.bind("a", PlayerSlot::One, Action::MoveLeft);
        bindings.bind("s", PlayerSlot::One, Action::MoveRight);
        bindings.bind("d", PlayerSlot::One, Action::Attack);
        bindings.bind("k", PlayerSlot::Two, Action::MoveLeft);
        bindings.bind("l", PlayerSlot::Two, Action::MoveRight);
        bindings.bind("j", PlayerSlot::Two, Action::Attack);
        bindings
    }
}

impl KeyBindings {
    /// Bind a key, replacing any earlier binding for it
    pub fn bind(&mut self, key: &str, slot: PlayerSlot, action: Action) {
        self.bindings.insert(key.to_lowercase(), (slot, action));
    }

    /// Case-insensitive lookup
    pub fn resolve(&self, key: &str) -> Option<(PlayerSlot, Action)> {
        self.bindings.get(&key.to_lowercase()).copied()
    }

    /// Build a frame from the keys currently held and the keys pressed since
    /// the last tick. Unbound keys are ignored.
    pub fn frame<'a>(
        &self,
        held: impl IntoIterator<Item = &'a str>,
        pressed: impl IntoIterator<Item = &'a str>,
    ) -> InputFrame {
        let mut frame = InputFrame::default();
        for (slot, action) in held.into_iter().filter_map(|k| self.resolve(k)) {
            frame.player_mut(slot).hold(action);
        }
        for (slot, action) in pressed.into_iter().filter_map(|k| self.resolve(k)) {
            frame.player_mut(slot).press(action);
        }
        frame
    }
}
