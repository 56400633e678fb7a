//! Camera for the accelerated tier
//!
//! Thin wrapper over `glam`: a right-handed perspective with the OpenGL clip
//! range, looking down -z at the particle volume.

use glam::{Mat4, Vec3};

/// Largest device pixel ratio the canvas is rendered at
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Perspective camera looking down -z at the particle volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the camera to the origin along +z
    pub distance: f32,
}

impl Camera {
    pub fn new(width: f64, height: f64) -> Self {
        let mut camera = Self::default();
        camera.set_viewport(width, height);
        camera
    }

    /// Update the aspect ratio for a new viewport; a degenerate viewport
    /// keeps the previous aspect
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.aspect = (width / height) as f32;
        }
    }

    /// Projection scale, `1 / tan(fov / 2)`
    pub fn focal_length(&self) -> f32 {
        1.0 / (self.fov_y_deg.to_radians() / 2.0).tan()
    }

    /// Numerator for the vertex shader's point size: a sprite of
    /// `world_size` units covers `point_scale / w` pixels at clip depth `w`
    pub fn point_scale(&self, backing_height: f64, world_size: f32) -> f32 {
        world_size * 0.5 * backing_height as f32 * self.focal_length()
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    /// Projection * view * model for a field turned by `rotation` (x, y)
    pub fn model_view_projection(&self, rotation: [f32; 2]) -> Mat4 {
        self.projection()
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * Mat4::from_rotation_x(rotation[0])
            * Mat4::from_rotation_y(rotation[1])
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            distance: 30.0,
        }
    }
}

/// Backing-store size for a CSS-sized canvas, with the pixel ratio capped
pub fn backing_size(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> (u32, u32) {
    let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    };
    (
        (css_width.max(0.0) * ratio).round() as u32,
        (css_height.max(0.0) * ratio).round() as u32,
    )
}
