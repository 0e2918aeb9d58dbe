//! Black Hole Calc - a calculator that collapses into a black hole
//!
//! Core modules:
//! - `sim`: Star field kinematics, horizon growth state machine, frame clock
//! - `renderer`: CPU pixel surfaces and the four layer painters
//! - `animation`: Per-frame driver that owns all animation state
//! - `calc`: Four-function evaluator that detects division by zero
//! - `app`: Host glue wiring calculator, animation and audio together
//! - `audio`: Fire-and-forget sound effects

pub mod animation;
pub mod app;
pub mod audio;
pub mod calc;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use animation::{AnimationLoop, FrameOutcome, FrameRequest, FrameScheduler, ManualScheduler};
pub use app::{App, Key};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Animation constants
pub mod consts {
    /// Nominal duration of one tick in milliseconds (60 Hz display refresh)
    pub const TICK_UNIT_MS: f32 = 16.67;
    /// Largest delta a single frame may contribute, in ticks
    pub const MAX_DELTA_TICKS: f32 = 4.0;

    /// Horizon radius while idle and after reset
    pub const IDLE_RADIUS: f32 = 50.0;
    /// Final radius as a fraction of the surface diagonal
    pub const MAX_RADIUS_FACTOR: f32 = 0.6;
    /// Wall-clock length of the growth phase
    pub const GROWTH_DURATION_MS: f32 = 4500.0;

    /// Default star count
    pub const NUM_STARS: usize = 300;
    /// Particles within this margin of the horizon are consumed
    pub const CONSUME_EPSILON: f32 = 0.5;

    /// Accretion disk rotation per tick (radians)
    pub const DISK_SPIN_PER_TICK: f32 = 0.006;

    /// Number of annuli approximating the gravitational lens
    pub const LENS_RINGS: usize = 12;
    /// Magnification added at the horizon edge
    pub const LENS_STRENGTH: f32 = 0.25;
    /// Falloff exponent of the lens magnification
    pub const LENS_FALLOFF: f32 = 1.8;
}

/// Wrap an angle into (-π, π]
#[inline]
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    if angle.abs() > 4.0 * TAU {
        angle %= TAU;
    }
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta), theta in (-π, π]
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), wrap_angle(pos.y.atan2(pos.x)))
}
