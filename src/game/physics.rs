//! Horizontal movement, facing and knockback interpolation

use serde::{Deserialize, Serialize};

use crate::catalog::Rect;
use crate::util::time::MsTimer;

use super::{Arena, PlayerSlot};

/// Units moved per tick while a move key is held
pub const MOVE_SPEED: f32 = 5.0;

/// Which way a combatant looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Right,
    Left,
}

impl Facing {
    /// Face toward `reference_x`. Used for hit volumes, attack volumes, sprites
    /// and combo normalization alike so they can never disagree.
    pub fn toward(x: f32, reference_x: f32) -> Self {
        if x < reference_x {
            Facing::Right
        } else {
            Facing::Left
        }
    }
}

/// Physics helpers for the arena
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Shift `x` by `dx`, clamped to the arena
    pub fn step_x(x: f32, dx: f32, arena: &Arena) -> f32 {
        arena.clamp_x(x + dx)
    }

    /// Translate an origin-relative volume into world space, mirroring it
    /// around the origin when facing left
    pub fn world_volume(volume: Rect, origin_x: f32, origin_y: f32, facing: Facing) -> Rect {
        let x = match facing {
            Facing::Right => origin_x + volume.x,
            Facing::Left => origin_x - volume.x - volume.w,
        };
        Rect::new(x, origin_y + volume.y, volume.w, volume.h)
    }

    /// `1 - (1 - t)^3`, with `t` clamped to `[0, 1]`
    pub fn ease_out_cubic(t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        1.0 - (1.0 - t).powi(3)
    }

    pub fn lerp(start: f32, target: f32, progress: f32) -> f32 {
        start + (target - start) * progress
    }
}

/// Pushback in progress. Exists only while positions are being interpolated.
#[derive(Debug, Clone, PartialEq)]
pub struct Knockback {
    timer: MsTimer,
    duration_ms: f32,
    start: [f32; 2],
    target: [f32; 2],
}

/// Result of advancing a knockback by one tick
#[derive(Debug, Clone, PartialEq)]
pub struct KnockbackStep {
    /// Positions for player one and two after this tick
    pub positions: [f32; 2],
    /// Remaining knockback, `None` once the timer reached the duration
    pub remaining: Option<Knockback>,
}

impl Knockback {
    /// `start`/`target` are indexed by [`PlayerSlot::index`]
    pub fn new(start: [f32; 2], target: [f32; 2], duration_ms: f32) -> Self {
        Self {
            timer: MsTimer::new(),
            duration_ms,
            start,
            target,
        }
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.timer.elapsed_ms()
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    pub fn start(&self, slot: PlayerSlot) -> f32 {
        self.start[slot.index()]
    }

    pub fn target(&self, slot: PlayerSlot) -> f32 {
        self.target[slot.index()]
    }

    /// Eased position of `slot` after `elapsed_ms`
    pub fn position_at(&self, slot: PlayerSlot, elapsed_ms: f32) -> f32 {
        let i = slot.index();
        if elapsed_ms >= self.duration_ms {
            return self.target[i];
        }
        let progress = if self.duration_ms > 0.0 {
            elapsed_ms / self.duration_ms
        } else {
            1.0
        };
        PhysicsSystem::lerp(
            self.start[i],
            self.target[i],
            PhysicsSystem::ease_out_cubic(progress),
        )
    }

    /// Consume the record, advance it by `delta_ms` and hand back what is left
    pub fn advance(mut self, delta_ms: f32) -> KnockbackStep {
        let elapsed = self.timer.advance(delta_ms);
        let positions = [
            self.position_at(PlayerSlot::One, elapsed),
            self.position_at(PlayerSlot::Two, elapsed),
        ];
        let remaining = if self.timer.reached(self.duration_ms) {
            None
        } else {
            Some(self)
        };
        KnockbackStep {
            positions,
            remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_toward_reference() {
        assert_eq!(Facing::toward(100.0, 400.0), Facing::Right);
        assert_eq!(Facing::toward(500.0, 400.0), Facing::Left);
        assert_eq!(Facing::toward(400.0, 400.0), Facing::Left);
    }

    #[test]
    fn test_world_volume_mirrors() {
        let volume = Rect::new(40.0, 20.0, 60.0, 30.0);
        let right = PhysicsSystem::world_volume(volume, 100.0, 400.0, Facing::Right);
        assert_eq!(right, Rect::new(140.0, 420.0, 60.0, 30.0));

        let left = PhysicsSystem::world_volume(volume, 100.0, 400.0, Facing::Left);
        assert_eq!(left, Rect::new(0.0, 420.0, 60.0, 30.0));
    }

    #[test]
    fn test_step_x_clamps() {
        let arena = Arena::new(800.0, 600.0);
        assert_eq!(PhysicsSystem::step_x(2.0, -MOVE_SPEED, &arena), 0.0);
        assert_eq!(PhysicsSystem::step_x(798.0, MOVE_SPEED, &arena), 800.0);
        assert_eq!(PhysicsSystem::step_x(100.0, MOVE_SPEED, &arena), 105.0);
    }

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(PhysicsSystem::ease_out_cubic(0.0), 0.0);
        assert_eq!(PhysicsSystem::ease_out_cubic(1.0), 1.0);
        assert_eq!(PhysicsSystem::ease_out_cubic(0.5), 0.875);
        assert_eq!(PhysicsSystem::ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn test_knockback_is_monotonic_and_ends_on_target() {
        let knockback = Knockback::new([100.0, 140.0], [70.0, 210.0], 250.0);
        assert_eq!(knockback.position_at(PlayerSlot::One, 0.0), 100.0);
        assert_eq!(knockback.position_at(PlayerSlot::Two, 0.0), 140.0);

        let mut previous = [100.0, 140.0];
        let mut current = Some(knockback);
        let mut ticks = 0;
        while let Some(kb) = current.take() {
            let step = kb.advance(10.0);
            assert!(step.positions[0] <= previous[0]);
            assert!(step.positions[1] >= previous[1]);
            previous = step.positions;
            current = step.remaining;
            ticks += 1;
        }

        assert_eq!(ticks, 25);
        assert_eq!(previous, [70.0, 210.0]);
    }

    #[test]
    fn test_knockback_overshooting_tick_lands_on_target() {
        let knockback = Knockback::new([300.0, 500.0], [330.0, 430.0], 250.0);
        let step = knockback.advance(400.0);
        assert_eq!(step.positions, [330.0, 430.0]);
        assert!(step.remaining.is_none());
    }
}
