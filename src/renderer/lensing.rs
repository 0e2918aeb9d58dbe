//! Gravitational lensing compositor
//!
//! Approximates a continuous lens with concentric annuli. Each annulus shows the
//! background magnified about the center, strongest at the horizon edge and
//! fading to no magnification at the outer bound. The whole lens is drawn in a
//! single pass, each pixel looking up the annulus it falls in.

use glam::Vec2;

use super::surface::Surface;
use crate::consts::{LENS_FALLOFF, LENS_RINGS, LENS_STRENGTH};

/// The lens never reaches less than this far from the center
pub const MIN_LENS_REACH: f32 = 150.0;
/// Lens reach as a multiple of the horizon radius
pub const LENS_REACH_FACTOR: f32 = 3.0;

/// One annulus of the lens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensRing {
    pub inner: f32,
    pub outer: f32,
    /// 1 at the horizon edge, approaching 0 at the outer bound
    pub normalized: f32,
    pub scale: f32,
}

/// Outer bound of the lens for a horizon of `radius` on a surface of `surface_size`
pub fn lens_max(radius: f32, surface_size: Vec2) -> f32 {
    let reach = (LENS_REACH_FACTOR * radius)
        .max(MIN_LENS_REACH)
        .min(surface_size.max_element());
    // Keep a non-empty window once the horizon outgrows the surface
    reach.max(radius + 2.0)
}

/// Magnification for a normalized lens position (1 = horizon edge)
#[inline]
pub fn lens_scale(normalized: f32) -> f32 {
    1.0 + LENS_STRENGTH * normalized.clamp(0.0, 1.0).powf(LENS_FALLOFF)
}

/// All annuli, innermost first
pub fn lens_rings(radius: f32, surface_size: Vec2) -> Vec<LensRing> {
    let inner_edge = radius + 1.0;
    let span = lens_max(radius, surface_size) - inner_edge;
    let steps = LENS_RINGS as f32;

    (0..LENS_RINGS)
        .map(|i| {
            let inner = inner_edge + span * (i as f32 / steps);
            let outer = inner_edge + span * ((i + 1) as f32 / steps);
            let normalized = 1.0 - (inner - inner_edge) / span;
            LensRing {
                inner,
                outer,
                normalized,
                scale: lens_scale(normalized),
            }
        })
        .collect()
}

/// The ring containing distance `d`, if any
pub fn ring_at(rings: &[LensRing], d: f32) -> Option<&LensRing> {
    let (first, last) = (rings.first()?, rings.last()?);
    if !(d >= first.inner && d < last.outer) {
        return None;
    }
    let t = (d - first.inner) / (last.outer - first.inner);
    let mut i = ((t * rings.len() as f32) as usize).min(rings.len() - 1);
    // Rounding can land one ring off right at a boundary
    while i > 0 && d < rings[i].inner {
        i -= 1;
    }
    while i + 1 < rings.len() && d >= rings[i].outer {
        i += 1;
    }
    Some(&rings[i])
}

/// Writes the lensed background into the foreground
#[derive(Debug, Clone, Copy, Default)]
pub struct LensingCompositor;

impl LensingCompositor {
    pub fn paint(
        &self,
        foreground: &mut Surface,
        background: &Surface,
        center: Vec2,
        radius: f32,
        surface_size: Vec2,
    ) {
        let rings = lens_rings(radius, surface_size);
        let (Some(first), Some(last)) = (rings.first(), rings.last()) else {
            return;
        };
        foreground.draw_magnified_in_annulus(background, center, first.inner, last.outer, |d| {
            ring_at(&rings, d).map(|ring| ring.scale)
        });
    }
}
