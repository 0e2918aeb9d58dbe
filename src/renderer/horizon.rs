//! Event horizon painter

use glam::Vec2;

use super::color::colors::EVENT_HORIZON;
use super::surface::Surface;

/// The opaque disk of the black hole itself, painted last
#[derive(Debug, Clone, Copy, Default)]
pub struct EventHorizon;

impl EventHorizon {
    pub fn paint(&self, foreground: &mut Surface, center: Vec2, radius: f32) {
        foreground.fill_circle(center, radius, EVENT_HORIZON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::color::Rgba;

    #[test]
    fn test_occludes_everything_inside() {
        let mut fg = Surface::new(64, 64);
        fg.fill([1.0, 0.5, 0.0, 1.0]);
        let center = Vec2::new(32.0, 32.0);
        EventHorizon.paint(&mut fg, center, 10.0);

        for y in 0..64 {
            for x in 0..64 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = (p - center).length();
                let px = fg.pixel(x, y).unwrap();
                if d < 9.5 {
                    assert_eq!(px, Rgba::BLACK);
                } else if d > 10.5 {
                    assert_ne!(px, Rgba::BLACK);
                }
            }
        }
    }
}
