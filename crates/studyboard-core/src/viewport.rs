//! Viewport: the pan/zoom transform between screen and canvas-local space.

use crate::config::ViewportConfig;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Viewport maps canvas-local coordinates to screen pixels.
///
/// `screen = local * scale + origin_offset`. Strokes and objects are stored
/// in local space, so changing the viewport never distorts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom factor.
    pub scale: f64,
    /// Screen position of the local origin.
    pub origin_offset: Vec2,
    /// Canvas size in screen pixels.
    pub size: Size,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale multiplier per wheel unit.
    pub sensitivity: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Size::new(800.0, 600.0), &ViewportConfig::default())
    }
}

impl Viewport {
    /// Create a viewport of the given canvas size at scale 1. Invalid zoom
    /// limits are replaced by the defaults.
    pub fn new(size: Size, config: &ViewportConfig) -> Self {
        let fallback;
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("Ignoring viewport config: {err}");
                fallback = ViewportConfig::default();
                &fallback
            }
        };
        Self {
            scale: 1.0_f64.clamp(config.min_scale, config.max_scale),
            origin_offset: Vec2::ZERO,
            size,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            sensitivity: config.wheel_sensitivity,
        }
    }

    /// Local-to-screen transform used for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.origin_offset) * Affine::scale(self.scale)
    }

    /// Screen-to-local transform used for input.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.origin_offset)
    }

    pub fn screen_to_local(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.origin_offset.x) / self.scale,
            (screen.y - self.origin_offset.y) / self.scale,
        )
    }

    pub fn local_to_screen(&self, local: Point) -> Point {
        Point::new(
            local.x * self.scale + self.origin_offset.x,
            local.y * self.scale + self.origin_offset.y,
        )
    }

    /// Canvas midpoint in screen coordinates.
    pub fn midpoint(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Local-space rectangle currently visible on screen.
    pub fn visible_rect(&self) -> kurbo::Rect {
        let top_left = self.screen_to_local(Point::ZERO);
        let bottom_right = self.screen_to_local(Point::new(self.size.width, self.size.height));
        kurbo::Rect::from_points(top_left, bottom_right)
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.origin_offset += delta;
    }

    /// Set the zoom factor, keeping the canvas midpoint fixed.
    ///
    /// Returns `true` if the scale changed.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() {
            return false;
        }
        let new_scale = scale.clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }

        let mid = self.midpoint();
        let anchor = self.screen_to_local(mid);
        self.scale = new_scale;
        self.origin_offset = Vec2::new(mid.x - anchor.x * new_scale, mid.y - anchor.y * new_scale);
        true
    }

    /// Restore a saved zoom and pan, keeping this viewport's limits.
    ///
    /// The scale is clamped into the limits; non-finite values are ignored.
    pub fn restore(&mut self, scale: f64, origin_offset: Vec2) {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale.clamp(self.min_scale, self.max_scale);
        }
        if origin_offset.is_finite() {
            self.origin_offset = origin_offset;
        }
    }

    /// Apply a wheel delta: `scale * sensitivity^delta`, clamped.
    pub fn zoom_by_wheel(&mut self, delta: f64) -> bool {
        self.set_scale(self.scale * self.sensitivity.powf(delta))
    }

    /// Update the canvas size, shifting the origin so content stays centred.
    pub fn resize(&mut self, size: Size) {
        let old_mid = self.midpoint();
        self.size = size;
        self.origin_offset += self.midpoint() - old_mid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(Size::new(800.0, 600.0), &ViewportConfig::default())
    }

    #[test]
    fn test_identity_at_start() {
        let vp = viewport();
        let p = Point::new(123.0, 45.0);
        assert_eq!(vp.screen_to_local(p), p);
    }

    #[test]
    fn test_screen_to_local_formula() {
        let mut vp = viewport();
        vp.origin_offset = Vec2::new(50.0, 100.0);
        vp.scale = 2.0;
        let local = vp.screen_to_local(Point::new(150.0, 300.0));
        assert!((local.x - 50.0).abs() < f64::EPSILON);
        assert!((local.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_across_scale_range() {
        let mut vp = viewport();
        vp.origin_offset = Vec2::new(30.0, -20.0);
        let mut scale = vp.min_scale;
        while scale <= vp.max_scale {
            vp.scale = scale;
            for original in [Point::new(0.0, 0.0), Point::new(123.0, 456.0), Point::new(-7.5, 799.0)] {
                let back = vp.local_to_screen(vp.screen_to_local(original));
                assert!((back.x - original.x).abs() < 1e-9);
                assert!((back.y - original.y).abs() < 1e-9);
            }
            scale += 0.25;
        }
    }

    #[test]
    fn test_transforms_agree_with_conversions() {
        let mut vp = viewport();
        vp.origin_offset = Vec2::new(12.0, 34.0);
        vp.scale = 1.5;
        let p = Point::new(10.0, 20.0);
        let a = vp.transform() * p;
        let b = vp.local_to_screen(p);
        assert!((a - b).hypot() < 1e-9);
        let c = vp.inverse_transform() * a;
        assert!((c - p).hypot() < 1e-9);
    }

    #[test]
    fn test_wheel_zoom_saturates() {
        let mut vp = viewport();
        for _ in 0..100 {
            vp.zoom_by_wheel(-1000.0);
        }
        assert_eq!(vp.scale, vp.max_scale);
        for _ in 0..100 {
            vp.zoom_by_wheel(1000.0);
        }
        assert_eq!(vp.scale, vp.min_scale);
        assert!(!vp.zoom_by_wheel(1000.0));
    }

    #[test]
    fn test_wheel_zoom_keeps_midpoint_fixed() {
        let mut vp = viewport();
        let mid = vp.midpoint();
        let before = vp.screen_to_local(mid);
        assert!(vp.zoom_by_wheel(-200.0));
        let after = vp.screen_to_local(mid);
        assert!((before - after).hypot() < 1e-9);
        assert!(vp.scale > 1.0);
    }

    #[test]
    fn test_resize_keeps_content_centred() {
        let mut vp = viewport();
        vp.zoom_by_wheel(-300.0);
        let centre_local = vp.screen_to_local(vp.midpoint());
        vp.resize(Size::new(1000.0, 900.0));
        let after = vp.screen_to_local(vp.midpoint());
        assert!((centre_local - after).hypot() < 1e-9);
    }

    #[test]
    fn test_restore_clamps_to_own_limits() {
        let mut vp = viewport();
        vp.restore(50.0, Vec2::new(5.0, 6.0));
        assert_eq!(vp.scale, 4.0);
        assert_eq!(vp.origin_offset, Vec2::new(5.0, 6.0));

        vp.restore(f64::NAN, Vec2::new(f64::INFINITY, 0.0));
        assert_eq!(vp.scale, 4.0);
        assert_eq!(vp.origin_offset, Vec2::new(5.0, 6.0));
    }

    #[test]
    fn test_inverted_limits_fall_back_to_defaults() {
        let config = ViewportConfig {
            min_scale: 5.0,
            max_scale: 1.0,
            ..ViewportConfig::default()
        };
        let mut vp = Viewport::new(Size::new(800.0, 600.0), &config);
        assert_eq!((vp.min_scale, vp.max_scale), (0.25, 4.0));
        assert!(vp.zoom_by_wheel(-200.0));
    }

    #[test]
    fn test_pan() {
        let mut vp = viewport();
        vp.pan(Vec2::new(10.0, 20.0));
        assert_eq!(vp.origin_offset, Vec2::new(10.0, 20.0));
    }
}
