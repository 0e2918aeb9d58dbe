//! Star layer painter

use glam::Vec2;

use super::color::colors::{SPACE, STAR};
use super::surface::Surface;
use crate::sim::Particle;

/// Opacity of a star at the given twinkle phase, always within [0.4, 1.0]
#[inline]
pub fn twinkle_alpha(phase: f32) -> f32 {
    0.4 + 0.6 * (0.5 + 0.5 * phase.sin())
}

/// Clears the background to space black and draws every star
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundRenderer;

impl BackgroundRenderer {
    pub fn paint(&self, surface: &mut Surface, particles: &[Particle], center: Vec2) {
        surface.fill(SPACE);
        for star in particles {
            let [r, g, b] = STAR;
            surface.fill_circle(
                star.position(center),
                star.size,
                [r, g, b, twinkle_alpha(star.twinkle_phase)],
            );
        }
    }
}
