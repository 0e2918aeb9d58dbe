//! Accretion disk painter
//!
//! Four concentric, vertically flattened ellipse strokes. Each is shaded with a
//! horizontal blue → white-hot → orange gradient and the whole set rotates as
//! the animation runs.

use glam::Vec2;

use super::color::{LinearGradient, rgba};
use super::surface::{EllipseStroke, Surface};

/// Number of rings in the disk
pub const DISK_RINGS: usize = 4;
/// Gap between the horizon and the innermost ring
pub const DISK_INNER_GAP: f32 = 12.0;
/// Radial span from the innermost to the outermost ring
pub const DISK_SPAN: f32 = 34.0;
/// Vertical radius relative to the horizontal one (perspective tilt)
pub const DISK_FLATTENING: f32 = 0.28;

/// Geometry and colors of one disk ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskRing {
    /// Horizontal radius
    pub radius: f32,
    pub width: f32,
    /// Cool edge of the gradient (left)
    pub cool: [f32; 4],
    /// White-hot middle
    pub hot: [f32; 4],
    /// Warm edge of the gradient (right)
    pub warm: [f32; 4],
}

/// Ring layout for a horizon of the given radius, innermost first
pub fn ring_specs(horizon_radius: f32) -> [DiskRing; DISK_RINGS] {
    std::array::from_fn(|i| {
        let fi = i as f32;
        let t = fi / (DISK_RINGS - 1) as f32;
        DiskRing {
            radius: horizon_radius + DISK_INNER_GAP + DISK_SPAN * t,
            width: 18.0 - 3.0 * fi,
            cool: rgba(
                (20.0 * (1.0 - t)).floor(),
                (180.0 * (1.0 - t) + 50.0 * t).floor(),
                255.0,
                0.9 - 0.12 * fi,
            ),
            hot: rgba(255.0, 220.0 - 20.0 * fi, 180.0 - 12.0 * fi, 0.95 - 0.12 * fi),
            warm: rgba(255.0, 120.0 + 20.0 * fi, 20.0 + 10.0 * fi, 0.9 - 0.12 * fi),
        }
    })
}

/// Paints the rotating accretion disk onto the foreground
#[derive(Debug, Clone, Copy, Default)]
pub struct AccretionDiskRenderer;

impl AccretionDiskRenderer {
    pub fn paint(&self, surface: &mut Surface, center: Vec2, radius: f32, rotation: f32) {
        for ring in ring_specs(radius) {
            // Gradient spans the unrotated horizontal extent
            let gradient = LinearGradient::new(
                center - Vec2::new(ring.radius, 0.0),
                center + Vec2::new(ring.radius, 0.0),
            )
            .with_stop(0.0, ring.cool)
            .with_stop(0.5, ring.hot)
            .with_stop(1.0, ring.warm);

            surface.stroke_ellipse(
                &EllipseStroke {
                    center,
                    radii: Vec2::new(ring.radius, ring.radius * DISK_FLATTENING),
                    rotation,
                    width: ring.width,
                },
                &gradient,
            );
        }
    }
}
