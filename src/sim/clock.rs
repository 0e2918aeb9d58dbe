//! Frame clock
//!
//! Turns display-callback timestamps into frame-rate independent tick deltas.

use crate::consts::{MAX_DELTA_TICKS, TICK_UNIT_MS};

/// Normalizes wall-clock gaps to nominal ticks
#[derive(Debug, Clone)]
pub struct FrameClock {
    tick_unit_ms: f64,
    max_delta_ticks: f32,
    last_ms: Option<f64>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TICK_UNIT_MS, MAX_DELTA_TICKS)
    }
}

impl FrameClock {
    pub fn new(tick_unit_ms: f32, max_delta_ticks: f32) -> Self {
        Self {
            tick_unit_ms: f64::from(tick_unit_ms.max(f32::EPSILON)),
            max_delta_ticks: max_delta_ticks.max(0.0),
            last_ms: None,
        }
    }

    /// Ticks elapsed since the previous call, clamped to `[0, max_delta_ticks]`.
    ///
    /// The first call after construction or `reset()` counts as one nominal tick.
    pub fn delta_ticks(&mut self, now_ms: f64) -> f32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 1.0_f32.min(self.max_delta_ticks);
        };
        self.clamp(((now_ms - last) / self.tick_unit_ms) as f32)
    }

    /// Clamp a raw delta (negative, NaN or huge gaps from tab suspend)
    pub fn clamp(&self, delta_ticks: f32) -> f32 {
        if delta_ticks.is_nan() {
            return 0.0;
        }
        delta_ticks.clamp(0.0, self.max_delta_ticks)
    }

    /// Forget the previous timestamp (after a pause in scheduling)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_frame_is_nominal() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.delta_ticks(12_345.0), 1.0);
    }

    #[test]
    fn test_normalizes_to_tick_unit() {
        let mut clock = FrameClock::new(16.67, 4.0);
        clock.delta_ticks(1000.0);
        assert!((clock.delta_ticks(1016.67) - 1.0).abs() < 1e-4);
        // 120 Hz display
        assert!((clock.delta_ticks(1025.005) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_clamps_gaps() {
        let mut clock = FrameClock::new(16.67, 4.0);
        clock.delta_ticks(1000.0);
        // Tab was suspended for a minute
        assert_eq!(clock.delta_ticks(61_000.0), 4.0);
        // Clock went backwards
        assert_eq!(clock.delta_ticks(60_000.0), 0.0);
        assert_eq!(clock.clamp(f32::NAN), 0.0);
    }

    #[test]
    fn test_reset_reprimes() {
        let mut clock = FrameClock::default();
        clock.delta_ticks(0.0);
        clock.reset();
        assert_eq!(clock.delta_ticks(50_000.0), 1.0);
    }

    proptest! {
        #[test]
        fn prop_delta_always_bounded(a in -1e9f64..1e9, b in -1e9f64..1e9) {
            let mut clock = FrameClock::default();
            clock.delta_ticks(a);
            let dt = clock.delta_ticks(b);
            prop_assert!((0.0..=MAX_DELTA_TICKS).contains(&dt));
        }
    }
}
