//! Combat system - hit detection, damage and pushback

use serde::{Deserialize, Serialize};

use crate::catalog::{Rect, StateKind};
use crate::util::time::{MsTimer, HIT_FLASH_MS, KNOCKBACK_MS};

use super::combatant::Combatant;
use super::PlayerSlot;

/// Pushback applied to the attacker on a hit
pub const ATTACKER_PUSHBACK: f32 = 30.0;
/// Pushback applied to the defender on a hit
pub const DEFENDER_PUSHBACK: f32 = 70.0;
/// Damage used when the attacking state has no power set
pub const DEFAULT_HIT_POWER: u32 = 10;

/// Pushback targets for one hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockbackPlan {
    pub duration_ms: f32,
    pub attacker_target: f32,
    pub defender_target: f32,
}

/// Hit resolution between two combatants
pub struct HitResolver;

impl HitResolver {
    /// Boxes overlap unless one lies strictly left of, right of, above or
    /// below the other. Touching edges count as overlap.
    pub fn check_collision(a: &Rect, b: &Rect) -> bool {
        let separated = a.x + a.w < b.x
            || a.x > b.x + b.w
            || a.y + a.h < b.y
            || a.y > b.y + b.h;
        !separated
    }

    /// Attacker must be attacking and its attack volume must overlap the
    /// defender's hit volume (facing each other)
    pub fn check_attack_hit(attacker: &Combatant, defender: &Combatant) -> bool {
        if attacker.kind() != StateKind::Attacking {
            return false;
        }

        let Some(attack) = attacker.attack_volume(Some(defender.x())) else {
            return false;
        };
        let Some(hit) = defender.hit_volume(Some(attacker.x())) else {
            return false;
        };

        Self::check_collision(&attack, &hit)
    }

    /// Damage dealt by the attacker's current state
    pub fn damage_for(attacker: &Combatant) -> u32 {
        match attacker.state().power {
            0 => DEFAULT_HIT_POWER,
            power => power,
        }
    }

    /// Push attacker and defender apart along their current left/right
    /// relation, the defender further than the attacker
    pub fn calculate_knockback(attacker: &Combatant, defender: &Combatant) -> KnockbackPlan {
        let (attacker_target, defender_target) = if attacker.x() < defender.x() {
            (
                attacker.x() - ATTACKER_PUSHBACK,
                defender.x() + DEFENDER_PUSHBACK,
            )
        } else {
            (
                attacker.x() + ATTACKER_PUSHBACK,
                defender.x() - DEFENDER_PUSHBACK,
            )
        };

        KnockbackPlan {
            duration_ms: KNOCKBACK_MS,
            attacker_target: attacker.arena().clamp_x(attacker_target),
            defender_target: defender.arena().clamp_x(defender_target),
        }
    }
}

/// Visual-only signal that a combatant was just hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitFlash {
    pub target: PlayerSlot,
    #[serde(skip)]
    timer: MsTimer,
    pub duration_ms: f32,
}

impl HitFlash {
    pub fn new(target: PlayerSlot) -> Self {
        Self {
            target,
            timer: MsTimer::new(),
            duration_ms: HIT_FLASH_MS,
        }
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.timer.elapsed_ms()
    }

    /// Consume the flash and return it if it is still showing
    pub fn advance(mut self, delta_ms: f32) -> Option<Self> {
        self.timer.advance(delta_ms);
        (!self.timer.reached(self.duration_ms)).then_some(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::fixtures::fighter;
    use crate::game::Arena;

    fn pair() -> (Combatant, Combatant) {
        let arena = Arena::new(800.0, 600.0);
        let catalog = Arc::new(fighter("ryu"));
        (
            Combatant::new(PlayerSlot::One, catalog.clone(), arena),
            Combatant::new(PlayerSlot::Two, catalog, arena),
        )
    }

    #[test]
    fn test_collision_overlap_and_separation() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(HitResolver::check_collision(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(HitResolver::check_collision(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!HitResolver::check_collision(&a, &Rect::new(10.5, 0.0, 10.0, 10.0)));
        assert!(!HitResolver::check_collision(&a, &Rect::new(-20.0, 0.0, 10.0, 10.0)));
        assert!(!HitResolver::check_collision(&a, &Rect::new(0.0, 11.0, 10.0, 10.0)));
        assert!(!HitResolver::check_collision(&a, &Rect::new(0.0, -11.0, 10.0, 10.0)));
    }

    #[test]
    fn test_knockback_scenario() {
        let (mut attacker, mut defender) = pair();
        attacker.place_at(100.0);
        defender.place_at(140.0);

        let plan = HitResolver::calculate_knockback(&attacker, &defender);
        assert_eq!(plan.attacker_target, 70.0);
        assert_eq!(plan.defender_target, 210.0);
        assert_eq!(plan.duration_ms, 250.0);

        // Mirrored: attacker on the right
        let plan = HitResolver::calculate_knockback(&defender, &attacker);
        assert_eq!(plan.attacker_target, 170.0);
        assert_eq!(plan.defender_target, 30.0);
    }

    #[test]
    fn test_knockback_clamped() {
        let (mut attacker, mut defender) = pair();
        attacker.place_at(10.0);
        defender.place_at(780.0);
        let plan = HitResolver::calculate_knockback(&attacker, &defender);
        assert_eq!(plan.attacker_target, 0.0);
        assert_eq!(plan.defender_target, 800.0);
    }

    #[test]
    fn test_attack_hit_requires_attacking_state() {
        let (mut attacker, mut defender) = pair();
        attacker.place_at(300.0);
        defender.place_at(360.0);
        assert!(!HitResolver::check_attack_hit(&attacker, &defender));

        attacker.attack(None);
        assert!(HitResolver::check_attack_hit(&attacker, &defender));
        assert_eq!(HitResolver::damage_for(&attacker), 10);
    }

    #[test]
    fn test_attack_faces_opponent_behind_center() {
        let (mut attacker, mut defender) = pair();
        // Both right of center, attacker on the left: still faces right
        attacker.place_at(600.0);
        defender.place_at(660.0);
        attacker.attack(None);
        assert!(HitResolver::check_attack_hit(&attacker, &defender));
    }

    #[test]
    fn test_out_of_range_misses() {
        let (mut attacker, mut defender) = pair();
        attacker.place_at(100.0);
        defender.place_at(400.0);
        attacker.attack(None);
        assert!(!HitResolver::check_attack_hit(&attacker, &defender));
    }

    #[test]
    fn test_knocked_defender_cannot_be_hit() {
        let (mut attacker, mut defender) = pair();
        attacker.place_at(300.0);
        defender.place_at(360.0);
        defender.take_damage(1000);
        attacker.attack(None);
        assert!(!HitResolver::check_attack_hit(&attacker, &defender));
    }

    #[test]
    fn test_hit_flash_expires() {
        let flash = HitFlash::new(PlayerSlot::Two);
        let flash = flash.advance(60.0).expect("still showing");
        assert_eq!(flash.elapsed_ms(), 60.0);
        assert!(flash.advance(40.0).is_none());
    }
}
