//! CPU drawing surfaces
//!
//! A `Surface` is an RGBA8 pixel buffer with the handful of canvas-like
//! operations the layer painters need. Pixel `(x, y)` is sampled at its center
//! `(x + 0.5, y + 0.5)`.

use glam::Vec2;

use super::color::{LinearGradient, Rgba, blend_over};
use super::sdf::{
    circle_chord, ellipse_outline_distance, ellipse_row_span, fill_coverage, sd_circle,
    stroke_coverage,
};

/// Geometry of one rotated ellipse stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseStroke {
    pub center: Vec2,
    pub radii: Vec2,
    /// Rotation of the ellipse axes (radians)
    pub rotation: f32,
    pub width: f32,
}

/// RGBA8 pixel buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

/// Clamped pixel range covering `[center - extent, center + extent]`
struct PixelBounds {
    x0: u32,
    x1: u32,
    y0: u32,
    y1: u32,
}

impl PixelBounds {
    /// Columns whose pixel centers lie in `[lo, hi]`, widened by `slack` pixels
    /// on each side (negative shrinks), clamped to the bounds
    fn columns(&self, lo: f32, hi: f32, slack: f32) -> Option<(u32, u32)> {
        let first = ((lo - 0.5).ceil() - slack).max(self.x0 as f32);
        let last = ((hi - 0.5).floor() + slack).min(self.x1 as f32);
        if !(first <= last) {
            return None;
        }
        Some((first as u32, last as u32))
    }
}

/// Visit the columns of `span` that are not in `skip`
fn visit_band(span: (u32, u32), skip: Option<(u32, u32)>, mut visit: impl FnMut(u32)) {
    let (x0, x1) = span;
    match skip {
        Some((s0, s1)) => {
            for x in x0..s0.clamp(x0, x1 + 1) {
                visit(x);
            }
            for x in (s1 + 1).max(x0)..=x1 {
                visit(x);
            }
        }
        None => {
            for x in x0..=x1 {
                visit(x);
            }
        }
    }
}

impl Surface {
    /// New fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Change dimensions; contents are discarded like a resized canvas
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize(width as usize * height as usize, Rgba::TRANSPARENT);
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major (what canvas `ImageData` expects)
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Blend `color` onto one pixel with the given coverage
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], coverage: f32) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = blend_over(self.pixels[idx], color, coverage);
        }
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    /// Paint the whole surface with `color` (source-over)
    pub fn fill(&mut self, color: [f32; 4]) {
        if color[3] >= 1.0 {
            self.pixels.fill(Rgba::from_color(color));
            return;
        }
        for px in &mut self.pixels {
            *px = blend_over(*px, color, 1.0);
        }
    }

    fn bounds(&self, center: Vec2, extent: f32) -> Option<PixelBounds> {
        self.bounds_rect(center, Vec2::splat(extent))
    }

    fn bounds_rect(&self, center: Vec2, half_extent: Vec2) -> Option<PixelBounds> {
        if self.width == 0 || self.height == 0 || !half_extent.is_finite() || !center.is_finite()
        {
            return None;
        }
        let lo = (center - half_extent).floor();
        let hi = (center + half_extent).ceil();
        if hi.x < 0.0 || hi.y < 0.0 || lo.x >= self.width as f32 || lo.y >= self.height as f32 {
            return None;
        }
        Some(PixelBounds {
            x0: lo.x.max(0.0) as u32,
            y0: lo.y.max(0.0) as u32,
            x1: (hi.x as u32).min(self.width - 1),
            y1: (hi.y as u32).min(self.height - 1),
        })
    }

    /// Antialiased filled circle
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let Some(b) = self.bounds(center, radius + 1.0) else {
            return;
        };
        let solid = (color[3] >= 1.0).then(|| Rgba::from_color(color));
        for y in b.y0..=b.y1 {
            let dy = y as f32 + 0.5 - center.y;
            // Coverage is zero past radius + 0.5 and full inside radius - 0.5
            let Some(edge) = circle_chord(radius + 0.5, dy)
                .and_then(|h| b.columns(center.x - h, center.x + h, 1.0))
            else {
                continue;
            };
            let core = circle_chord(radius - 0.5, dy)
                .and_then(|h| b.columns(center.x - h, center.x + h, -1.0));

            if let Some((c0, c1)) = core {
                match solid {
                    Some(px) => {
                        let row = self.index(0, y);
                        self.pixels[row + c0 as usize..=row + c1 as usize].fill(px);
                    }
                    None => {
                        for x in c0..=c1 {
                            self.blend_pixel(x, y, color, 1.0);
                        }
                    }
                }
            }
            visit_band(edge, core, |x| {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = fill_coverage(sd_circle(p, center, radius));
                if coverage > 0.0 {
                    self.blend_pixel(x, y, color, coverage);
                }
            });
        }
    }

    /// Stroke the outline of a rotated ellipse with a gradient paint
    pub fn stroke_ellipse(&mut self, stroke: &EllipseStroke, paint: &LinearGradient) {
        let r = stroke.radii;
        let min_radius = r.min_element();
        if !(min_radius > 0.0) {
            return;
        }
        // |sd| >= |k0 - 1| * min_radius, so covered pixels have k0 = |p / r|
        // within 1 +- reach: between two scaled copies of the ellipse, each
        // padded by a pixel for rounding
        let reach = (stroke.width * 0.5 + 0.5) / min_radius;
        let outer = r * (1.0 + reach) + Vec2::ONE;
        let hole = r * (1.0 - reach) - Vec2::ONE;

        let (sin, cos) = stroke.rotation.sin_cos();
        let half_extent = Vec2::new(
            (outer.x * outer.x * cos * cos + outer.y * outer.y * sin * sin).sqrt(),
            (outer.x * outer.x * sin * sin + outer.y * outer.y * cos * cos).sqrt(),
        ) + Vec2::ONE;
        let Some(b) = self.bounds_rect(stroke.center, half_extent) else {
            return;
        };
        let cx = stroke.center.x;
        for y in b.y0..=b.y1 {
            let dy = y as f32 + 0.5 - stroke.center.y;
            let Some(band) = ellipse_row_span(dy, outer, stroke.rotation)
                .and_then(|(lo, hi)| b.columns(cx + lo, cx + hi, 1.0))
            else {
                continue;
            };
            let inside = ellipse_row_span(dy, hole, stroke.rotation)
                .and_then(|(lo, hi)| b.columns(cx + lo, cx + hi, -1.0));
            visit_band(band, inside, |x| {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = ellipse_outline_distance(p, stroke.center, stroke.radii, stroke.rotation);
                let coverage = stroke_coverage(d, stroke.width);
                if coverage > 0.0 {
                    self.blend_pixel(x, y, paint.color_at(p), coverage);
                }
            });
        }
    }

    /// Bilinear sample at continuous coordinates; `None` outside the image
    pub fn sample(&self, p: Vec2) -> Option<Rgba> {
        if !(p.x >= 0.0 && p.y >= 0.0 && p.x < self.width as f32 && p.y < self.height as f32) {
            return None;
        }
        let max_x = self.width - 1;
        let max_y = self.height - 1;
        let q = (p - Vec2::splat(0.5)).max(Vec2::ZERO);
        let x0 = (q.x as u32).min(max_x);
        let y0 = (q.y as u32).min(max_y);
        let x1 = (x0 + 1).min(max_x);
        let y1 = (y0 + 1).min(max_y);
        // 8-bit fixed point weights
        let fx = ((q.x - x0 as f32).clamp(0.0, 1.0) * 256.0) as u32;
        let fy = ((q.y - y0 as f32).clamp(0.0, 1.0) * 256.0) as u32;

        let [a, b, c, d] = [(x0, y0), (x1, y0), (x0, y1), (x1, y1)]
            .map(|(x, y)| self.pixels[self.index(x, y)]);
        let mix = |a: u8, b: u8, c: u8, d: u8| {
            let top = a as u32 * (256 - fx) + b as u32 * fx;
            let bottom = c as u32 * (256 - fx) + d as u32 * fx;
            ((top * (256 - fy) + bottom * fy + (1 << 15)) >> 16) as u8
        };
        Some(Rgba::new(
            mix(a.r, b.r, c.r, d.r),
            mix(a.g, b.g, c.g, d.g),
            mix(a.b, b.b, c.b, d.b),
            mix(a.a, b.a, c.a, d.a),
        ))
    }

    /// Draw `src` magnified about `center` into the annulus
    /// `inner <= |p - center| < outer`, in one pass.
    ///
    /// `scale_at` picks the magnification from a pixel's distance to `center`;
    /// `None` leaves the pixel alone. Nothing outside the annulus is touched.
    pub fn draw_magnified_in_annulus(
        &mut self,
        src: &Surface,
        center: Vec2,
        inner: f32,
        outer: f32,
        scale_at: impl Fn(f32) -> Option<f32>,
    ) {
        if !(outer > inner) {
            return;
        }
        let Some(b) = self.bounds(center, outer + 1.0) else {
            return;
        };
        for y in b.y0..=b.y1 {
            let dy = y as f32 + 0.5 - center.y;
            let Some(ring) = circle_chord(outer, dy)
                .and_then(|h| b.columns(center.x - h, center.x + h, 1.0))
            else {
                continue;
            };
            let hole = circle_chord(inner, dy)
                .and_then(|h| b.columns(center.x - h, center.x + h, -1.0));
            visit_band(ring, hole, |x| {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = (p - center).length();
                if d < inner || d >= outer {
                    return;
                }
                let Some(scale) = scale_at(d).filter(|s| *s > 0.0) else {
                    return;
                };
                if let Some(color) = src.sample(center + (p - center) / scale) {
                    let idx = self.index(x, y);
                    self.pixels[idx] = if color.is_opaque() {
                        color
                    } else {
                        blend_over(self.pixels[idx], color.to_color(), 1.0)
                    };
                }
            });
        }
    }

    /// Blend another surface of the same size over this one
    pub fn draw_over(&mut self, top: &Surface) {
        if top.width != self.width || top.height != self.height {
            log::warn!(
                "Skipping composite of mismatched surfaces ({}x{} over {}x{})",
                top.width,
                top.height,
                self.width,
                self.height
            );
            return;
        }
        for (dst, src) in self.pixels.iter_mut().zip(&top.pixels) {
            *dst = blend_over(*dst, src.to_color(), 1.0);
        }
    }

    /// Binary PPM (P6) encoding; alpha is dropped
    pub fn to_ppm(&self) -> Vec<u8> {
        let mut out = format!("P6\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.reserve(self.pixels.len() * 3);
        for px in &self.pixels {
            out.extend_from_slice(&[px.r, px.g, px.b]);
        }
        out
    }
}

/// The background (stars) and foreground (disk, lensing, horizon) layers
#[derive(Debug, Clone)]
pub struct RenderSurfacePair {
    pub background: Surface,
    pub foreground: Surface,
}

impl RenderSurfacePair {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            background: Surface::new(width, height),
            foreground: Surface::new(width, height),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.background.size()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.background.resize(width, height);
        self.foreground.resize(width, height);
    }

    /// Paint both layers solid with `color`
    pub fn fill(&mut self, color: [f32; 4]) {
        self.background.fill(color);
        self.foreground.fill(color);
    }

    /// Foreground over background, as the host would display them stacked
    pub fn composite(&self) -> Surface {
        let mut out = self.background.clone();
        out.draw_over(&self.foreground);
        out
    }
}
