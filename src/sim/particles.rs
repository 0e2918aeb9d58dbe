//! Star field particles
//!
//! Stars live in polar coordinates around the shared center and are only
//! converted to screen space at paint time.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use crate::consts::CONSUME_EPSILON;
use crate::{cartesian_to_polar, polar_to_cartesian, wrap_angle};

/// Smallest star radius
pub const MIN_STAR_SIZE: f32 = 0.6;
/// Spread of star radii above the minimum
pub const STAR_SIZE_SPREAD: f32 = 1.6;
/// Slowest orbital drift factor
pub const MIN_ANGULAR_SPEED: f32 = 0.01;
/// Spread of orbital drift factors above the minimum
pub const ANGULAR_SPEED_SPREAD: f32 = 0.06;

/// Twinkle phase advance per tick
const TWINKLE_RATE: f32 = 0.04;
/// Orbital drift multiplier while the horizon is idle
const AMBIENT_DRIFT: f32 = 0.02;
/// Gravity never drops below this factor
const MIN_GRAVITY: f32 = 0.02;
/// Numerator of the 1/r gravity falloff
const GRAVITY_REACH: f32 = 200.0;
/// Angular acceleration from gravity
const SWIRL: f32 = 0.8;
/// Radial infall speed from gravity
const INFALL: f32 = 0.25;

/// A single star
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position around the center (radians)
    pub angle: f32,
    /// Pixels from the center
    pub distance: f32,
    /// Render radius
    pub size: f32,
    /// Drives the opacity oscillation
    pub twinkle_phase: f32,
    /// Scales orbital drift
    pub base_angular_speed: f32,
}

impl Particle {
    /// Screen position relative to `center`
    #[inline]
    pub fn position(&self, center: Vec2) -> Vec2 {
        center + polar_to_cartesian(self.distance, self.angle)
    }

    /// Pull toward the center for `dt` ticks
    fn fall(&mut self, dt: f32) {
        let gravity = (GRAVITY_REACH / (self.distance + 1.0)).max(MIN_GRAVITY);
        self.angle = wrap_angle(self.angle + self.base_angular_speed * gravity * SWIRL * dt);
        self.distance -= INFALL * gravity * dt;
    }

    /// Slow orbit while nothing is pulling
    fn drift(&mut self, dt: f32) {
        self.angle = wrap_angle(self.angle + self.base_angular_speed * AMBIENT_DRIFT * dt);
    }
}

/// The full star field
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the field with `count` stars spread uniformly over the surface
    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        surface_size: Vec2,
        center: Vec2,
        rng: &mut R,
    ) {
        self.particles.clear();
        self.particles.reserve(count);

        for _ in 0..count {
            let pos = Vec2::new(
                rng.random::<f32>() * surface_size.x,
                rng.random::<f32>() * surface_size.y,
            );
            let (mut distance, mut angle) = cartesian_to_polar(pos - center);
            if distance <= 0.0 {
                // Landed exactly on the center
                distance = f32::EPSILON;
                angle = 0.0;
            }

            self.particles.push(Particle {
                angle,
                distance,
                size: MIN_STAR_SIZE + rng.random::<f32>() * STAR_SIZE_SPREAD,
                twinkle_phase: rng.random::<f32>() * TAU,
                base_angular_speed: MIN_ANGULAR_SPEED + rng.random::<f32>() * ANGULAR_SPEED_SPREAD,
            });
        }
    }

    /// Advance every star by `dt` ticks, then drop the ones the horizon swallowed.
    ///
    /// Returns how many stars were consumed this tick.
    pub fn update(&mut self, dt: f32, growth_active: bool, radius: f32) -> usize {
        for particle in &mut self.particles {
            particle.twinkle_phase += TWINKLE_RATE * dt;
            if growth_active {
                particle.fall(dt);
            } else {
                particle.drift(dt);
            }
        }

        let before = self.particles.len();
        let threshold = radius + CONSUME_EPSILON;
        self.particles.retain(|p| p.distance > threshold);
        before - self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Screen positions of all stars around `center`
    pub fn positions(&self, center: Vec2) -> impl Iterator<Item = Vec2> + '_ {
        self.particles.iter().map(move |p| p.position(center))
    }

    #[cfg(test)]
    pub(crate) fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }
}
