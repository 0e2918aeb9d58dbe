//! Event horizon growth state machine
//!
//! Idle → Growing → Exhausted, with `reset()` back to Idle from anywhere.

use glam::Vec2;

use crate::consts::{GROWTH_DURATION_MS, IDLE_RADIUS, MAX_RADIUS_FACTOR, TICK_UNIT_MS};

/// Current phase of the black hole
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthState {
    /// Resting at the idle radius, waiting for `start()`
    Idle,
    /// Radius increasing linearly with time
    Growing {
        start_radius: f32,
        /// Progress toward the final radius (0-1)
        elapsed_fraction: f32,
    },
    /// The screen is consumed; animation halted
    Exhausted,
}

/// Result of advancing one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStep {
    Continue,
    /// Entered `Exhausted` on this tick
    Exhausted,
}

/// Owns the single authoritative horizon radius
#[derive(Debug, Clone)]
pub struct GrowthController {
    state: GrowthState,
    radius: f32,
    /// Radius increase per tick, fixed at `start()`
    growth_rate: f32,
    /// Exhaustion threshold, fixed at `start()`
    max_radius: f32,
    duration_ms: f32,
    tick_unit_ms: f32,
}

impl Default for GrowthController {
    fn default() -> Self {
        Self::new(GROWTH_DURATION_MS, TICK_UNIT_MS)
    }
}

impl GrowthController {
    pub fn new(duration_ms: f32, tick_unit_ms: f32) -> Self {
        Self {
            state: GrowthState::Idle,
            radius: IDLE_RADIUS,
            growth_rate: 0.0,
            max_radius: IDLE_RADIUS,
            duration_ms: duration_ms.max(f32::EPSILON),
            tick_unit_ms: tick_unit_ms.max(f32::EPSILON),
        }
    }

    pub fn state(&self) -> GrowthState {
        self.state
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    pub fn growth_rate(&self) -> f32 {
        self.growth_rate
    }

    pub fn is_growing(&self) -> bool {
        matches!(self.state, GrowthState::Growing { .. })
    }

    /// True while growing or exhausted (the host hides its chrome)
    pub fn is_active(&self) -> bool {
        !matches!(self.state, GrowthState::Idle)
    }

    /// Final radius for a surface of the given size
    pub fn max_radius_for(surface_size: Vec2) -> f32 {
        MAX_RADIUS_FACTOR * surface_size.x.hypot(surface_size.y)
    }

    /// Growth duration expressed in ticks
    pub fn duration_ticks(&self) -> f32 {
        self.duration_ms / self.tick_unit_ms
    }

    /// Begin growing. Only leaves `Idle`; returns whether the state changed.
    pub fn start(&mut self, surface_size: Vec2) -> bool {
        if self.state != GrowthState::Idle {
            log::debug!("Ignoring start() while {:?}", self.state);
            return false;
        }

        self.max_radius = Self::max_radius_for(surface_size);
        self.growth_rate = (self.max_radius - IDLE_RADIUS) / self.duration_ticks();
        self.state = GrowthState::Growing {
            start_radius: self.radius,
            elapsed_fraction: 0.0,
        };
        log::info!(
            "Black hole growing: {:.1} -> {:.1} px at {:.3} px/tick",
            self.radius,
            self.max_radius,
            self.growth_rate
        );
        true
    }

    /// Advance the radius by `dt` ticks
    pub fn advance(&mut self, dt: f32) -> GrowthStep {
        let GrowthState::Growing { start_radius, .. } = self.state else {
            return GrowthStep::Continue;
        };

        // A surface smaller than the idle horizon gives a negative rate
        self.radius += (self.growth_rate * dt).max(0.0);

        if self.radius > self.max_radius {
            self.state = GrowthState::Exhausted;
            log::info!("Black hole exhausted at radius {:.1}", self.radius);
            return GrowthStep::Exhausted;
        }

        let span = self.max_radius - start_radius;
        let elapsed_fraction = if span > 0.0 {
            ((self.radius - start_radius) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.state = GrowthState::Growing {
            start_radius,
            elapsed_fraction,
        };
        GrowthStep::Continue
    }

    /// Back to `Idle` at the idle radius, from any state
    pub fn reset(&mut self) {
        self.state = GrowthState::Idle;
        self.radius = IDLE_RADIUS;
        self.growth_rate = 0.0;
        self.max_radius = IDLE_RADIUS;
    }
}
