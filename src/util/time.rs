//! Time utilities for the combat simulation
//!
//! The simulation never reads a clock. Every timer is a millisecond counter
//! advanced by the caller-supplied delta and compared against a fixed window.

/// Combo key window (ms without a new key press before the sequence is dropped)
pub const COMBO_WINDOW_MS: f32 = 500.0;
/// Invincibility after a successful hit (ms)
pub const INVINCIBILITY_MS: f32 = 100.0;
/// Knockback interpolation length (ms)
pub const KNOCKBACK_MS: f32 = 250.0;
/// Hit flash length (ms)
pub const HIT_FLASH_MS: f32 = 100.0;
/// Time spent knocked down before the first revival (ms)
pub const REVIVAL_DELAY_MS: f32 = 2000.0;

/// Default tick rate for the headless runner
pub const DEFAULT_TPS: u32 = 60;

/// Delta for one tick at the given rate (in milliseconds)
pub fn tick_delta_ms(tps: u32) -> f32 {
    1000.0 / tps.max(1) as f32
}

/// Accumulating millisecond counter
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MsTimer {
    elapsed: f32,
}

impl MsTimer {
    pub fn new() -> Self {
        Self { elapsed: 0.0 }
    }

    /// Add `delta_ms` and return the new elapsed value
    pub fn advance(&mut self, delta_ms: f32) -> f32 {
        self.elapsed += delta_ms.max(0.0);
        self.elapsed
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed
    }

    /// True once at least `window_ms` has accumulated
    pub fn reached(&self, window_ms: f32) -> bool {
        self.elapsed >= window_ms
    }

    /// True once strictly more than `window_ms` has accumulated
    pub fn exceeded(&self, window_ms: f32) -> bool {
        self.elapsed > window_ms
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_delta() {
        assert_eq!(tick_delta_ms(50), 20.0);
        assert_eq!(tick_delta_ms(0), 1000.0);
    }

    #[test]
    fn test_timer_thresholds() {
        let mut timer = MsTimer::new();
        timer.advance(250.0);
        timer.advance(250.0);
        assert!(timer.reached(COMBO_WINDOW_MS));
        assert!(!timer.exceeded(COMBO_WINDOW_MS));

        timer.advance(1.0);
        assert!(timer.exceeded(COMBO_WINDOW_MS));

        timer.reset();
        assert_eq!(timer.elapsed_ms(), 0.0);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut timer = MsTimer::new();
        timer.advance(-50.0);
        assert_eq!(timer.elapsed_ms(), 0.0);
    }
}
