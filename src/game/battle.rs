//! Battle state and per-tick orchestration

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{CharacterCatalog, StateId, StateKind};
use crate::input::{Action, InputFrame};
use crate::util::time::REVIVAL_DELAY_MS;

use super::combat::{HitFlash, HitResolver};
use super::combatant::{Combatant, DamageOutcome};
use super::combo::ComboRecognizer;
use super::events::BattleEvent;
use super::physics::Knockback;
use super::{Arena, PlayerSlot};

/// One battle between two fighters. Sole owner of both combatants and of
/// the transient knockback/hit-flash records.
#[derive(Debug, Clone)]
pub struct Battle {
    id: Uuid,
    tick: u64,
    fighters: [Combatant; 2],
    combos: [ComboRecognizer; 2],
    knockback: Option<Knockback>,
    hit_flash: Option<HitFlash>,
    winner: Option<PlayerSlot>,
}

impl Battle {
    pub fn new(one: Arc<CharacterCatalog>, two: Arc<CharacterCatalog>, arena: Arena) -> Self {
        let combos = [
            ComboRecognizer::for_catalog(&one),
            ComboRecognizer::for_catalog(&two),
        ];
        let battle = Self {
            id: Uuid::new_v4(),
            tick: 0,
            fighters: [
                Combatant::new(PlayerSlot::One, one, arena),
                Combatant::new(PlayerSlot::Two, two, arena),
            ],
            combos,
            knockback: None,
            hit_flash: None,
            winner: None,
        };

        info!(
            battle_id = %battle.id,
            player1 = %battle.fighters[0].name(),
            player2 = %battle.fighters[1].name(),
            "Battle started"
        );
        battle
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn fighter(&self, slot: PlayerSlot) -> &Combatant {
        &self.fighters[slot.index()]
    }

    pub fn fighter_mut(&mut self, slot: PlayerSlot) -> &mut Combatant {
        &mut self.fighters[slot.index()]
    }

    pub fn combo(&self, slot: PlayerSlot) -> &ComboRecognizer {
        &self.combos[slot.index()]
    }

    pub fn knockback(&self) -> Option<&Knockback> {
        self.knockback.as_ref()
    }

    pub fn hit_flash(&self) -> Option<&HitFlash> {
        self.hit_flash.as_ref()
    }

    pub fn winner(&self) -> Option<PlayerSlot> {
        self.winner
    }

    /// Run one simulation tick of `delta_ms`. Does nothing once decided.
    pub fn update(&mut self, delta_ms: f32, input: &InputFrame) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        if self.winner.is_some() {
            return events;
        }
        self.tick += 1;

        // Key presses always feed the combo windows, even mid-knockback
        self.record_presses(delta_ms, input);

        if self.knockback.is_none() {
            for slot in PlayerSlot::BOTH {
                self.apply_actions(slot, input, &mut events);
            }
        }

        for fighter in &mut self.fighters {
            fighter.update(delta_ms);
        }

        if self.knockback.is_none() {
            for (attacker, defender) in [
                (PlayerSlot::One, PlayerSlot::Two),
                (PlayerSlot::Two, PlayerSlot::One),
            ] {
                if HitResolver::check_attack_hit(self.fighter(attacker), self.fighter(defender)) {
                    self.handle_hit(attacker, defender, &mut events);
                }
            }
        }

        self.update_knockback(delta_ms, &mut events);
        self.hit_flash = self.hit_flash.take().and_then(|flash| flash.advance(delta_ms));
        self.check_revival(&mut events);
        self.check_elimination(&mut events);

        events
    }

    fn record_presses(&mut self, delta_ms: f32, input: &InputFrame) {
        for slot in PlayerSlot::BOTH {
            let facing = self
                .fighter(slot)
                .facing(Some(self.fighter(slot.opponent()).x()));
            let combo = &mut self.combos[slot.index()];
            combo.advance(delta_ms);
            for action in &input.player(slot).pressed {
                combo.press(*action, facing);
            }
        }
    }

    /// A recognized special takes priority over plain movement and attack
    fn apply_actions(
        &mut self,
        slot: PlayerSlot,
        input: &InputFrame,
        events: &mut Vec<BattleEvent>,
    ) {
        let i = slot.index();
        let special = self.combos[i].recognize(self.fighters[i].catalog());
        let fighter = &mut self.fighters[i];

        if let Some((_, sequence)) = special {
            if fighter.attack(Some(&sequence)).is_some() {
                info!(
                    battle_id = %self.id,
                    player = ?slot,
                    sequence = %sequence,
                    "Special move"
                );
                events.push(BattleEvent::SpecialMove {
                    player: slot,
                    sequence: sequence.to_string(),
                });
            }
            return;
        }

        let held = &input.player(slot).held;
        if held.is_held(Action::MoveLeft) {
            fighter.move_left();
        }
        if held.is_held(Action::MoveRight) {
            fighter.move_right();
        }
        if held.is_held(Action::Attack) {
            fighter.attack(None);
        }
    }

    fn handle_hit(
        &mut self,
        attacker: PlayerSlot,
        defender: PlayerSlot,
        events: &mut Vec<BattleEvent>,
    ) {
        let damage = HitResolver::damage_for(self.fighter(attacker));
        let outcome = self.fighter_mut(defender).take_damage(damage);
        self.hit_flash = Some(HitFlash::new(defender));

        let plan = HitResolver::calculate_knockback(self.fighter(attacker), self.fighter(defender));
        let mut target = [0.0; 2];
        target[attacker.index()] = plan.attacker_target;
        target[defender.index()] = plan.defender_target;
        let start = [self.fighters[0].x(), self.fighters[1].x()];
        self.knockback = Some(Knockback::new(start, target, plan.duration_ms));
        for fighter in &mut self.fighters {
            fighter.set_knocked_back(true);
        }

        let defender_health = self.fighter(defender).health();
        info!(
            battle_id = %self.id,
            attacker = %self.fighter(attacker).name(),
            defender = %self.fighter(defender).name(),
            damage,
            defender_health,
            "Hit"
        );
        events.push(BattleEvent::Hit {
            attacker,
            defender,
            damage,
            defender_health,
        });

        if outcome == DamageOutcome::KnockedDown {
            let knockdowns = self.fighter(defender).knockdowns();
            info!(battle_id = %self.id, player = ?defender, knockdowns, "Knocked down");
            events.push(BattleEvent::KnockedDown {
                player: defender,
                knockdowns,
            });
        }
    }

    fn update_knockback(&mut self, delta_ms: f32, events: &mut Vec<BattleEvent>) {
        let Some(knockback) = self.knockback.take() else {
            return;
        };

        let step = knockback.advance(delta_ms);
        for (fighter, x) in self.fighters.iter_mut().zip(step.positions) {
            fighter.place_at(x);
        }
        self.knockback = step.remaining;

        if self.knockback.is_none() {
            for fighter in &mut self.fighters {
                fighter.set_knocked_back(false);
                if fighter.kind() == StateKind::Attacked {
                    fighter.change_state(StateId::Normal);
                }
            }
            debug!(battle_id = %self.id, "Knockback finished");
            events.push(BattleEvent::KnockbackFinished);
        }
    }

    /// First knockdown only; a second one is terminal
    fn check_revival(&mut self, events: &mut Vec<BattleEvent>) {
        for fighter in &mut self.fighters {
            if fighter.kind() == StateKind::Knocked
                && fighter.knockdowns() == 1
                && fighter.health() == 0
                && fighter.state_timer_ms() >= REVIVAL_DELAY_MS
            {
                fighter.revive();
                info!(battle_id = %self.id, character = %fighter.name(), "Revived");
                events.push(BattleEvent::Revived {
                    player: fighter.slot(),
                });
            }
        }
    }

    fn check_elimination(&mut self, events: &mut Vec<BattleEvent>) {
        let winner = if self.fighters[0].is_eliminated() {
            PlayerSlot::Two
        } else if self.fighters[1].is_eliminated() {
            PlayerSlot::One
        } else {
            return;
        };

        self.winner = Some(winner);
        info!(
            battle_id = %self.id,
            winner = %self.fighter(winner).name(),
            ticks = self.tick,
            "Battle ended"
        );
        events.push(BattleEvent::Victory { winner });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::fighter;
    use crate::input::PlayerInput;

    const DT: f32 = 10.0;

    fn battle() -> Battle {
        Battle::new(
            Arc::new(fighter("ryu")),
            Arc::new(fighter("ken")),
            Arena::new(800.0, 600.0),
        )
    }

    fn idle() -> InputFrame {
        InputFrame::default()
    }

    fn attack_by(slot: PlayerSlot) -> InputFrame {
        let mut frame = InputFrame::default();
        frame.player_mut(slot).press(Action::Attack);
        frame
    }

    fn close_in(battle: &mut Battle) {
        battle.fighter_mut(PlayerSlot::One).place_at(300.0);
        battle.fighter_mut(PlayerSlot::Two).place_at(360.0);
    }

    #[test]
    fn test_held_keys_move_fighters() {
        let mut b = battle();
        let mut frame = InputFrame::default();
        frame.player_mut(PlayerSlot::One).hold(Action::MoveRight);
        frame.player_mut(PlayerSlot::Two).hold(Action::MoveLeft);

        b.update(DT, &frame);
        assert_eq!(b.fighter(PlayerSlot::One).x(), 105.0);
        assert_eq!(b.fighter(PlayerSlot::Two).x(), 695.0);
        assert_eq!(b.tick(), 1);
    }

    #[test]
    fn test_hit_starts_knockback_for_both() {
        let mut b = battle();
        close_in(&mut b);

        let events = b.update(DT, &attack_by(PlayerSlot::One));
        assert_eq!(
            events[0],
            BattleEvent::Hit {
                attacker: PlayerSlot::One,
                defender: PlayerSlot::Two,
                damage: 10,
                defender_health: 90,
            }
        );

        assert!(b.fighter(PlayerSlot::One).is_knocked_back());
        assert!(b.fighter(PlayerSlot::Two).is_knocked_back());
        assert_eq!(b.hit_flash().map(|f| f.target), Some(PlayerSlot::Two));
        let knockback = b.knockback().unwrap();
        assert_eq!(knockback.target(PlayerSlot::One), 270.0);
        assert_eq!(knockback.target(PlayerSlot::Two), 430.0);
        assert_eq!(b.fighter(PlayerSlot::Two).kind(), StateKind::Attacked);
    }

    #[test]
    fn test_knockback_completes_and_clears_flags() {
        let mut b = battle();
        close_in(&mut b);
        b.update(DT, &attack_by(PlayerSlot::One));

        // Input is ignored while pushed back
        let mut finished = false;
        for _ in 0..24 {
            let events = b.update(DT, &attack_by(PlayerSlot::Two));
            finished |= events.contains(&BattleEvent::KnockbackFinished);
        }
        assert!(finished);
        assert!(b.knockback().is_none());
        assert!(b.hit_flash().is_none());
        assert_eq!(b.fighter(PlayerSlot::One).x(), 270.0);
        assert_eq!(b.fighter(PlayerSlot::Two).x(), 430.0);
        assert!(!b.fighter(PlayerSlot::Two).is_knocked_back());
        assert_eq!(b.fighter(PlayerSlot::Two).kind(), StateKind::Normal);
        assert_eq!(b.fighter(PlayerSlot::Two).health(), 90);
    }

    #[test]
    fn test_special_move_takes_priority() {
        let mut b = battle();
        close_in(&mut b);
        let mut frame = InputFrame::default();
        frame.player_mut(PlayerSlot::One).press(Action::MoveRight);
        b.update(DT, &frame);
        let moved_to = b.fighter(PlayerSlot::One).x();
        b.update(DT, &frame);

        let mut frame = InputFrame::new(PlayerInput::default(), PlayerInput::default());
        frame.player_mut(PlayerSlot::One).press(Action::Attack);
        frame.player_mut(PlayerSlot::One).hold(Action::MoveRight);
        let events = b.update(DT, &frame);

        assert_eq!(
            events[0],
            BattleEvent::SpecialMove {
                player: PlayerSlot::One,
                sequence: "F,F,A".to_string(),
            }
        );
        // The held move key is ignored on the tick the special fires; the
        // pushback then starts from where the fighter stood
        assert_eq!(b.knockback().unwrap().start(PlayerSlot::One), moved_to + 5.0);
        assert!(matches!(events[1], BattleEvent::Hit { damage: 25, .. }));
    }

    #[test]
    fn test_revival_after_delay() {
        let mut b = battle();
        b.fighter_mut(PlayerSlot::Two).take_damage(100);

        let mut revived_at = None;
        for tick in 1..=200 {
            let events = b.update(DT, &idle());
            if events.contains(&BattleEvent::Revived {
                player: PlayerSlot::Two,
            }) {
                revived_at = Some(tick);
                break;
            }
        }

        assert_eq!(revived_at, Some(200));
        let two = b.fighter(PlayerSlot::Two);
        assert_eq!(two.health(), 100);
        assert_eq!(two.kind(), StateKind::Normal);
        assert_eq!(two.knockdowns(), 1);
    }

    #[test]
    fn test_second_knockdown_wins() {
        let mut b = battle();
        b.fighter_mut(PlayerSlot::One).take_damage(100);
        b.fighter_mut(PlayerSlot::One).revive();
        b.fighter_mut(PlayerSlot::One).take_damage(100);

        let events = b.update(DT, &idle());
        assert_eq!(
            events,
            vec![BattleEvent::Victory {
                winner: PlayerSlot::Two
            }]
        );
        assert_eq!(b.winner(), Some(PlayerSlot::Two));

        // Decided battles no longer tick
        assert!(b.update(DT, &attack_by(PlayerSlot::Two)).is_empty());
        assert_eq!(b.tick(), 1);
        assert_eq!(b.fighter(PlayerSlot::One).state_id(), StateId::Knocked);
    }
}
