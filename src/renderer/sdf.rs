//! Signed distance functions used for rasterization
//!
//! Every shape is rasterized by evaluating its SDF at pixel centers and turning
//! the distance into a one-pixel antialiased coverage value.

use glam::Vec2;

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Approximate signed distance to an axis-aligned ellipse centered at the origin.
///
/// Exact on the axes and close enough elsewhere for strokes a few pixels wide.
pub fn sd_ellipse(p: Vec2, radii: Vec2) -> f32 {
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return p.length();
    }
    let k0 = (p / radii).length();
    let k1 = (p / (radii * radii)).length();
    if k1 <= f32::EPSILON {
        // At the center
        return -radii.min_element();
    }
    k0 * (k0 - 1.0) / k1
}

/// Unsigned distance to the outline of a rotated ellipse
#[inline]
pub fn ellipse_outline_distance(p: Vec2, center: Vec2, radii: Vec2, rotation: f32) -> f32 {
    let local = Vec2::from_angle(-rotation).rotate(p - center);
    sd_ellipse(local, radii).abs()
}

/// Half-width of a circle of `radius` on a line `dy` from its center
#[inline]
pub fn circle_chord(radius: f32, dy: f32) -> Option<f32> {
    let sq = radius * radius - dy * dy;
    (radius > 0.0 && sq > 0.0).then(|| sq.sqrt())
}

/// Horizontal extent `(lo, hi)`, relative to the center, of a rotated ellipse
/// on the line `dy` from its center
pub fn ellipse_row_span(dy: f32, radii: Vec2, rotation: f32) -> Option<(f32, f32)> {
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return None;
    }
    // Quadratic in dx of (u/rx)^2 + (v/ry)^2 = 1 with (u, v) the unrotated point
    let (sin, cos) = rotation.sin_cos();
    let inv_x = 1.0 / (radii.x * radii.x);
    let inv_y = 1.0 / (radii.y * radii.y);
    let a = cos * cos * inv_x + sin * sin * inv_y;
    let b = 2.0 * dy * sin * cos * (inv_x - inv_y);
    let c = dy * dy * (sin * sin * inv_x + cos * cos * inv_y) - 1.0;
    let disc = b * b - 4.0 * a * c;
    if !(disc >= 0.0) {
        return None;
    }
    let root = disc.sqrt();
    Some(((-b - root) / (2.0 * a), (-b + root) / (2.0 * a)))
}

/// Coverage (0-1) of a pixel whose center is `sd` away from a filled shape's edge
#[inline]
pub fn fill_coverage(sd: f32) -> f32 {
    (0.5 - sd).clamp(0.0, 1.0)
}

/// Coverage (0-1) of a pixel `distance` away from the centerline of a stroke
#[inline]
pub fn stroke_coverage(distance: f32, width: f32) -> f32 {
    (width * 0.5 + 0.5 - distance).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_sd_circle() {
        assert_eq!(sd_circle(Vec2::new(10.0, 0.0), Vec2::ZERO, 4.0), 6.0);
        assert_eq!(sd_circle(Vec2::ZERO, Vec2::ZERO, 4.0), -4.0);
    }

    #[test]
    fn test_sd_ellipse_on_axes() {
        let radii = Vec2::new(100.0, 28.0);
        assert!(sd_ellipse(Vec2::new(100.0, 0.0), radii).abs() < 1e-3);
        assert!(sd_ellipse(Vec2::new(0.0, 28.0), radii).abs() < 1e-3);
        assert!((sd_ellipse(Vec2::new(110.0, 0.0), radii) - 10.0).abs() < 0.5);
        assert!(sd_ellipse(Vec2::new(0.0, 10.0), radii) < 0.0);
        assert!(sd_ellipse(Vec2::ZERO, radii) < 0.0);
    }

    #[test]
    fn test_rotated_outline() {
        // Rotated a quarter turn, the long axis points down the y axis
        let d = ellipse_outline_distance(
            Vec2::new(0.0, 100.0),
            Vec2::ZERO,
            Vec2::new(100.0, 28.0),
            FRAC_PI_2,
        );
        assert!(d < 1e-2);
    }

    #[test]
    fn test_circle_chord() {
        assert_eq!(circle_chord(5.0, 0.0), Some(5.0));
        assert_eq!(circle_chord(5.0, 3.0), Some(4.0));
        assert_eq!(circle_chord(5.0, 5.0), None);
        assert_eq!(circle_chord(0.0, 0.0), None);
    }

    #[test]
    fn test_ellipse_row_span() {
        let radii = Vec2::new(100.0, 28.0);
        let (lo, hi) = ellipse_row_span(0.0, radii, 0.0).unwrap();
        assert!((lo + 100.0).abs() < 1e-3 && (hi - 100.0).abs() < 1e-3);

        // A quarter turn swaps the axes
        let (lo, hi) = ellipse_row_span(0.0, radii, FRAC_PI_2).unwrap();
        assert!((lo + 28.0).abs() < 1e-2 && (hi - 28.0).abs() < 1e-2);
        assert!(ellipse_row_span(29.0, radii, 0.0).is_none());

        // Both ends of a tilted span sit on the outline
        let rotation = 0.7;
        let (lo, hi) = ellipse_row_span(20.0, radii, rotation).unwrap();
        for dx in [lo, hi] {
            let d = ellipse_outline_distance(Vec2::new(dx, 20.0), Vec2::ZERO, radii, rotation);
            assert!(d < 0.5, "dx={dx} is {d} off the outline");
        }
    }

    #[test]
    fn test_coverage_ramps() {
        assert_eq!(fill_coverage(-3.0), 1.0);
        assert_eq!(fill_coverage(3.0), 0.0);
        assert_eq!(fill_coverage(0.0), 0.5);
        assert_eq!(stroke_coverage(0.0, 18.0), 1.0);
        assert_eq!(stroke_coverage(20.0, 18.0), 0.0);
    }
}
