//! Character instance: health, position, state and timers

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{CharacterCatalog, CharacterState, MoveSequence, Rect, StateId, StateKind};
use crate::util::time::{MsTimer, INVINCIBILITY_MS};

use super::physics::{Facing, PhysicsSystem, MOVE_SPEED};
use super::{Arena, PlayerSlot};

/// Knockdowns after which a combatant is out of the match
pub const ELIMINATION_KNOCKDOWNS: u8 = 2;

/// Result of a state change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Changed,
    /// Target not in the catalog; the combatant stays where it was
    NotFound,
}

/// Result of `take_damage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageOutcome {
    /// Invincible or already knocked
    Ignored,
    /// Health left, now in `attacked`
    Staggered,
    /// Health reached zero, now in `knocked`
    KnockedDown,
}

/// A fighter in the arena
#[derive(Debug, Clone)]
pub struct Combatant {
    slot: PlayerSlot,
    catalog: Arc<CharacterCatalog>,
    arena: Arena,

    health: u32,
    knockdowns: u8,

    x: f32,
    y: f32,

    state: StateId,
    state_timer: MsTimer,
    animation_timer: MsTimer,

    invincible: bool,
    invincibility_timer: MsTimer,
    knocked_back: bool,
}

impl Combatant {
    /// Spawn on `slot`'s side of the arena in the `normal` state
    pub fn new(slot: PlayerSlot, catalog: Arc<CharacterCatalog>, arena: Arena) -> Self {
        Self {
            slot,
            health: catalog.max_health(),
            catalog,
            arena,
            knockdowns: 0,
            x: arena.spawn_x(slot),
            y: arena.ground_y(),
            state: StateId::Normal,
            state_timer: MsTimer::new(),
            animation_timer: MsTimer::new(),
            invincible: false,
            invincibility_timer: MsTimer::new(),
            knocked_back: false,
        }
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn name(&self) -> &str {
        self.catalog.name()
    }

    pub fn catalog(&self) -> &Arc<CharacterCatalog> {
        &self.catalog
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.catalog.max_health()
    }

    pub fn knockdowns(&self) -> u8 {
        self.knockdowns
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn state_id(&self) -> StateId {
        self.state
    }

    /// Current catalog entry
    pub fn state(&self) -> &CharacterState {
        // `state` only ever holds ids the catalog resolved
        self.catalog
            .state(self.state)
            .unwrap_or_else(|| self.catalog.normal_state())
    }

    pub fn kind(&self) -> StateKind {
        self.state().kind
    }

    pub fn state_label(&self) -> String {
        self.catalog.label(self.state)
    }

    pub fn state_timer_ms(&self) -> f32 {
        self.state_timer.elapsed_ms()
    }

    pub fn animation_timer_ms(&self) -> f32 {
        self.animation_timer.elapsed_ms()
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    pub fn is_knocked_back(&self) -> bool {
        self.knocked_back
    }

    pub fn set_knocked_back(&mut self, knocked_back: bool) {
        self.knocked_back = knocked_back;
    }

    /// Teleport horizontally (clamped to the arena)
    pub fn place_at(&mut self, x: f32) {
        self.x = self.arena.clamp_x(x);
    }

    /// Advance timers and run automatic recoveries
    pub fn update(&mut self, delta_ms: f32) {
        self.state_timer.advance(delta_ms);
        self.animation_timer.advance(delta_ms);

        if self.invincible {
            self.invincibility_timer.advance(delta_ms);
            if self.invincibility_timer.reached(INVINCIBILITY_MS) {
                self.invincible = false;
                self.invincibility_timer.reset();
            }
        }

        let state = self.state();
        if matches!(state.kind, StateKind::Attacking | StateKind::Attacked)
            && state.is_complete(self.animation_timer.elapsed_ms())
        {
            self.change_state(StateId::Normal);
        }
    }

    /// Switch to `id`, resetting both timers
    pub fn change_state(&mut self, id: StateId) -> Transition {
        if self.catalog.state(id).is_none() {
            warn!(
                character = %self.name(),
                state = ?id,
                "State not found, keeping current state"
            );
            return Transition::NotFound;
        }

        self.state = id;
        self.state_timer.reset();
        self.animation_timer.reset();
        Transition::Changed
    }

    /// Switch by label: a kind name or a comma-joined move sequence
    pub fn change_state_named(&mut self, label: &str) -> Transition {
        match self.catalog.resolve(label) {
            Some(id) => self.change_state(id),
            None => {
                warn!(
                    character = %self.name(),
                    state = %label,
                    "State not found, keeping current state"
                );
                Transition::NotFound
            }
        }
    }

    /// Voluntary movement and attacks are suppressed while knocked down or
    /// being pushed back
    pub fn can_act(&self) -> bool {
        self.kind() != StateKind::Knocked && !self.knocked_back
    }

    pub fn move_left(&mut self) -> bool {
        self.step(-MOVE_SPEED)
    }

    pub fn move_right(&mut self) -> bool {
        self.step(MOVE_SPEED)
    }

    fn step(&mut self, dx: f32) -> bool {
        if !self.can_act() {
            return false;
        }
        self.x = PhysicsSystem::step_x(self.x, dx, &self.arena);
        true
    }

    /// Start the special registered under `sequence`, or the default attack.
    /// Returns the state entered, if any.
    pub fn attack(&mut self, sequence: Option<&MoveSequence>) -> Option<StateId> {
        if !self.can_act() {
            return None;
        }

        let special = sequence
            .and_then(|seq| self.catalog.special_for(seq))
            .filter(|id| {
                self.catalog
                    .state(*id)
                    .is_some_and(|s| s.kind == StateKind::Attacking)
            });
        let target = special
            .or_else(|| self.catalog.has_default_attack().then_some(StateId::Attack))?;

        match self.change_state(target) {
            Transition::Changed => Some(target),
            Transition::NotFound => None,
        }
    }

    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.invincible || self.kind() == StateKind::Knocked {
            return DamageOutcome::Ignored;
        }

        self.health = self.health.saturating_sub(amount);
        self.invincible = true;
        self.invincibility_timer.reset();

        if self.health == 0 {
            self.knockdowns = self.knockdowns.saturating_add(1);
            self.change_state(StateId::Knocked);
            DamageOutcome::KnockedDown
        } else {
            self.change_state(StateId::Attacked);
            DamageOutcome::Staggered
        }
    }

    /// Facing toward `opponent_x`, or toward the arena center without one
    pub fn facing(&self, opponent_x: Option<f32>) -> Facing {
        let reference = opponent_x.unwrap_or_else(|| self.arena.center_x());
        Facing::toward(self.x, reference)
    }

    /// Current hit volume in world coordinates
    pub fn hit_volume(&self, opponent_x: Option<f32>) -> Option<Rect> {
        self.state()
            .hit_volume
            .map(|v| PhysicsSystem::world_volume(v, self.x, self.y, self.facing(opponent_x)))
    }

    /// Current attack volume in world coordinates
    pub fn attack_volume(&self, opponent_x: Option<f32>) -> Option<Rect> {
        self.state()
            .attack_volume
            .map(|v| PhysicsSystem::world_volume(v, self.x, self.y, self.facing(opponent_x)))
    }

    pub fn current_frame_index(&self) -> Option<usize> {
        self.state().frame_index(self.animation_timer.elapsed_ms())
    }

    /// Sprite for the current frame, picked with the same facing as the
    /// hit volumes
    pub fn current_sprite(&self, opponent_x: Option<f32>) -> Option<&str> {
        let index = self.current_frame_index()?;
        let frame = self.state().frames.get(index)?;
        Some(match self.facing(opponent_x) {
            Facing::Right => frame.left_sprite.as_str(),
            Facing::Left => frame.right_sprite.as_str(),
        })
    }

    /// Restore full health and return to `normal`.
    ///
    /// Callers only revive after the first knockdown.
    pub fn revive(&mut self) {
        self.health = self.catalog.max_health();
        self.invincible = false;
        self.invincibility_timer.reset();
        self.change_state(StateId::Normal);
    }

    pub fn is_eliminated(&self) -> bool {
        self.knockdowns >= ELIMINATION_KNOCKDOWNS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::fighter;

    fn combatant(slot: PlayerSlot) -> Combatant {
        Combatant::new(slot, Arc::new(fighter("ryu")), Arena::new(800.0, 600.0))
    }

    #[test]
    fn test_spawn_positions() {
        let one = combatant(PlayerSlot::One);
        let two = combatant(PlayerSlot::Two);
        assert_eq!((one.x(), one.y()), (100.0, 400.0));
        assert_eq!((two.x(), two.y()), (700.0, 400.0));
        assert_eq!(one.kind(), StateKind::Normal);
        assert_eq!(one.health(), 100);
    }

    #[test]
    fn test_damage_sequence_to_knockdown() {
        let mut c = combatant(PlayerSlot::One);

        assert_eq!(c.take_damage(40), DamageOutcome::Staggered);
        assert_eq!(c.health(), 60);
        assert_eq!(c.kind(), StateKind::Attacked);
        c.update(100.0);

        assert_eq!(c.take_damage(40), DamageOutcome::Staggered);
        assert_eq!(c.health(), 20);
        c.update(100.0);

        assert_eq!(c.take_damage(40), DamageOutcome::KnockedDown);
        assert_eq!(c.health(), 0);
        assert_eq!(c.knockdowns(), 1);
        assert_eq!(c.kind(), StateKind::Knocked);
        assert!(!c.is_eliminated());
    }

    #[test]
    fn test_invincibility_window() {
        let mut c = combatant(PlayerSlot::One);
        c.take_damage(10);
        assert!(c.is_invincible());

        c.update(99.0);
        assert_eq!(c.take_damage(10), DamageOutcome::Ignored);
        assert_eq!(c.health(), 90);

        c.update(1.0);
        assert!(!c.is_invincible());
        assert_eq!(c.take_damage(10), DamageOutcome::Staggered);
        assert_eq!(c.health(), 80);
    }

    #[test]
    fn test_knocked_ignores_damage_and_actions() {
        let mut c = combatant(PlayerSlot::One);
        c.take_damage(500);
        assert_eq!(c.health(), 0);
        c.update(200.0);

        assert_eq!(c.take_damage(10), DamageOutcome::Ignored);
        assert!(!c.move_right());
        assert_eq!(c.x(), 100.0);
        assert_eq!(c.attack(None), None);
        assert_eq!(c.kind(), StateKind::Knocked);
    }

    #[test]
    fn test_knocked_back_suppresses_movement() {
        let mut c = combatant(PlayerSlot::One);
        c.set_knocked_back(true);
        assert!(!c.move_left());
        assert_eq!(c.attack(None), None);

        c.set_knocked_back(false);
        assert!(c.move_left());
        assert_eq!(c.x(), 95.0);
    }

    #[test]
    fn test_movement_clamped_to_arena() {
        let mut c = combatant(PlayerSlot::One);
        c.place_at(3.0);
        c.move_left();
        assert_eq!(c.x(), 0.0);

        c.place_at(798.0);
        c.move_right();
        assert_eq!(c.x(), 800.0);
    }

    #[test]
    fn test_attack_prefers_special() {
        let mut c = combatant(PlayerSlot::One);
        let special: MoveSequence = "F,F,A".parse().unwrap();
        assert_eq!(c.attack(Some(&special)), Some(StateId::Special(0)));
        assert_eq!(c.state().power, 25);

        let unknown: MoveSequence = "B,B,A".parse().unwrap();
        assert_eq!(c.attack(Some(&unknown)), Some(StateId::Attack));
        assert_eq!(c.attack(None), Some(StateId::Attack));
    }

    #[test]
    fn test_attack_returns_to_normal_after_animation() {
        let mut c = combatant(PlayerSlot::One);
        c.attack(None);
        c.update(150.0);
        assert_eq!(c.kind(), StateKind::Attacking);
        assert_eq!(c.current_frame_index(), Some(1));
        c.update(50.0);
        assert_eq!(c.kind(), StateKind::Normal);
        assert_eq!(c.animation_timer_ms(), 0.0);
    }

    #[test]
    fn test_unknown_state_is_reported() {
        let mut c = combatant(PlayerSlot::One);
        c.attack(None);
        c.update(50.0);
        assert_eq!(c.change_state_named("jump"), Transition::NotFound);
        assert_eq!(c.kind(), StateKind::Attacking);
        assert_eq!(c.state_timer_ms(), 50.0);

        assert_eq!(c.change_state(StateId::Special(9)), Transition::NotFound);
        assert_eq!(c.change_state_named("F,F,A"), Transition::Changed);
        assert_eq!(c.state_label(), "F,F,A");
    }

    #[test]
    fn test_volumes_follow_opponent() {
        let mut c = combatant(PlayerSlot::One);
        c.attack(None);

        let toward_right = c.attack_volume(Some(300.0)).unwrap();
        assert_eq!(toward_right, Rect::new(140.0, 420.0, 60.0, 30.0));

        let toward_left = c.attack_volume(Some(20.0)).unwrap();
        assert_eq!(toward_left, Rect::new(0.0, 420.0, 60.0, 30.0));

        // No opponent: face the arena center
        assert_eq!(c.attack_volume(None), Some(toward_right));
        assert_eq!(c.current_sprite(Some(300.0)), Some("l0.png"));
        assert_eq!(c.current_sprite(Some(20.0)), Some("r0.png"));
    }

    #[test]
    fn test_knocked_has_no_hit_volume() {
        let mut c = combatant(PlayerSlot::Two);
        assert!(c.hit_volume(None).is_some());
        c.take_damage(100);
        assert!(c.hit_volume(None).is_none());
        assert!(c.attack_volume(None).is_none());
    }

    #[test]
    fn test_revive_and_elimination() {
        let mut c = combatant(PlayerSlot::One);
        c.take_damage(100);
        c.revive();
        assert_eq!(c.health(), 100);
        assert_eq!(c.kind(), StateKind::Normal);
        assert!(!c.is_invincible());

        c.take_damage(100);
        assert_eq!(c.knockdowns(), 2);
        assert!(c.is_eliminated());
    }
}
