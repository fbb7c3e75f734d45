//! Seeded demo bot
//!
//! Walks toward the opponent, jabs in range, now and then steps back or
//! types one of its character's special sequences, one key per tick.

use std::collections::VecDeque;

use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::catalog::{CharacterCatalog, StateId, StateKind, Symbol};
use crate::game::combo::action_for;
use crate::game::{Battle, PlayerSlot};
use crate::input::{Action, PlayerInput};

/// Reach used when a character has no attack volumes at all
const DEFAULT_REACH: f32 = 80.0;
/// Per-tick odds, when in range, of starting a special
const SPECIAL_CHANCE: f64 = 0.05;
/// Per-tick odds, when in range, of stepping back
const RETREAT_CHANCE: f64 = 0.15;
/// Per-tick odds, when in range, of jabbing
const JAB_CHANCE: f64 = 0.3;

pub struct Bot {
    slot: PlayerSlot,
    rng: ChaCha8Rng,
    /// Remaining keys of a special being typed
    queued: VecDeque<Action>,
}

impl Bot {
    pub fn new(slot: PlayerSlot, seed: u64) -> Self {
        Self {
            slot,
            rng: ChaCha8Rng::seed_from_u64(seed),
            queued: VecDeque::new(),
        }
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    /// Decide this tick's input from the current battle state
    pub fn next_input(&mut self, battle: &Battle) -> PlayerInput {
        let me = battle.fighter(self.slot);
        let opponent = battle.fighter(self.slot.opponent());
        let mut input = PlayerInput::default();

        if !me.can_act() {
            self.queued.clear();
            return input;
        }
        if let Some(action) = self.queued.pop_front() {
            input.press(action);
            return input;
        }

        let facing = me.facing(Some(opponent.x()));
        let distance = (opponent.x() - me.x()).abs();
        if distance > reach(me.catalog()) {
            input.hold(action_for(Symbol::Forward, facing));
            return input;
        }

        let roll: f64 = self.rng.gen();
        if roll < SPECIAL_CHANCE {
            let sequence = me
                .catalog()
                .specials()
                .map(|(_, state)| state.sequence.clone())
                .choose(&mut self.rng);
            if let Some(sequence) = sequence {
                self.queued
                    .extend(sequence.symbols().iter().map(|s| action_for(*s, facing)));
                if let Some(action) = self.queued.pop_front() {
                    input.press(action);
                }
            }
        } else if roll < SPECIAL_CHANCE + RETREAT_CHANCE {
            input.hold(action_for(Symbol::Backward, facing));
        } else if roll < SPECIAL_CHANCE + RETREAT_CHANCE + JAB_CHANCE {
            if me.kind() == StateKind::Normal {
                input.press(Action::Attack);
            }
        }

        input
    }
}

/// Furthest an attack volume reaches in front of the character's origin
fn reach(catalog: &CharacterCatalog) -> f32 {
    let attack_states = catalog
        .state(StateId::Attack)
        .into_iter()
        .chain(catalog.specials().map(|(_, state)| state));

    attack_states
        .filter_map(|state| state.attack_volume)
        .map(|volume| volume.x + volume.w)
        .reduce(f32::max)
        .unwrap_or(DEFAULT_REACH)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::fixtures::fighter;
    use crate::game::Arena;

    fn battle() -> Battle {
        Battle::new(
            Arc::new(fighter("ryu")),
            Arc::new(fighter("ken")),
            Arena::default(),
        )
    }

    #[test]
    fn test_reach_from_attack_volumes() {
        assert_eq!(reach(&fighter("ryu")), 100.0);
    }

    #[test]
    fn test_walks_toward_opponent_when_far() {
        let b = battle();
        let mut one = Bot::new(PlayerSlot::One, 1);
        let mut two = Bot::new(PlayerSlot::Two, 2);

        assert!(one.next_input(&b).held.move_right);
        assert!(two.next_input(&b).held.move_left);
    }

    #[test]
    fn test_idle_while_knocked_back() {
        let mut b = battle();
        b.fighter_mut(PlayerSlot::One).set_knocked_back(true);
        let mut bot = Bot::new(PlayerSlot::One, 1);
        assert_eq!(bot.next_input(&b), PlayerInput::default());
    }

    #[test]
    fn test_same_seed_same_choices() {
        let mut b = battle();
        b.fighter_mut(PlayerSlot::One).place_at(350.0);
        b.fighter_mut(PlayerSlot::Two).place_at(400.0);

        let mut first = Bot::new(PlayerSlot::One, 42);
        let mut second = Bot::new(PlayerSlot::One, 42);
        for _ in 0..50 {
            assert_eq!(first.next_input(&b), second.next_input(&b));
        }
    }
}
