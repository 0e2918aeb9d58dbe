//! Pixel and color types for the CPU surfaces

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// One straight-alpha RGBA8 pixel, laid out like canvas `ImageData`
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert from normalized `[r, g, b, a]`
    pub fn from_color(color: [f32; 4]) -> Self {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(q(color[0]), q(color[1]), q(color[2]), q(color[3]))
    }

    /// Normalized `[r, g, b, a]`
    pub fn to_color(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

/// Normalized color from 0-255 channels and a 0-1 alpha (CSS `rgba()` style)
pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> [f32; 4] {
    [r / 255.0, g / 255.0, b / 255.0, a]
}

/// Source-over blend of `src` (scaled by `coverage`) onto `dst`
pub fn blend_over(dst: Rgba, src: [f32; 4], coverage: f32) -> Rgba {
    let sa = src[3] * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    if sa >= 1.0 {
        return Rgba::from_color([src[0], src[1], src[2], 1.0]);
    }

    let d = dst.to_color();
    let out_a = sa + d[3] * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba::TRANSPARENT;
    }
    let mix = |s: f32, dc: f32| (s * sa + dc * d[3] * (1.0 - sa)) / out_a;
    Rgba::from_color([mix(src[0], d[0]), mix(src[1], d[1]), mix(src[2], d[2]), out_a])
}

/// Linear interpolation between two normalized colors
#[inline]
pub fn lerp_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// A color stop at `offset` (0-1) along a gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: [f32; 4],
}

/// Canvas-style linear gradient between two points
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    /// Sorted by offset
    pub stops: Vec<ColorStop>,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    pub fn with_stop(mut self, offset: f32, color: [f32; 4]) -> Self {
        self.stops.push(ColorStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
        self.stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self
    }

    /// Position of `p` projected onto the gradient axis (0-1, clamped)
    pub fn t_at(&self, p: Vec2) -> f32 {
        let axis = self.end - self.start;
        let len_sq = axis.length_squared();
        if len_sq <= f32::EPSILON {
            return 0.0;
        }
        ((p - self.start).dot(axis) / len_sq).clamp(0.0, 1.0)
    }

    /// Color at point `p`
    pub fn color_at(&self, p: Vec2) -> [f32; 4] {
        let t = self.t_at(p);
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return [0.0; 4];
        };
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let u = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
                return lerp_color(a.color, b.color, u);
            }
        }
        last.color
    }
}

/// Colors for scene elements
pub mod colors {
    pub const SPACE: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const EVENT_HORIZON: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const STAR: [f32; 3] = [1.0, 1.0, 1.0];
}
