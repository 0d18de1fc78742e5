use std::ops::{Add, Mul, Sub};

use super::input::InputSnapshot;
use super::rendering::{Frame, SurfaceSize};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn manhattan(self) -> f32 {
        self.x.abs() + self.y.abs()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.5;
pub const CAMERA_ZOOM_MAX: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        clamp_camera_zoom(self.zoom)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
    }

    /// Moves the camera opposite to a screen-space drag so content follows the pointer.
    pub fn pan_by_screen_delta(&mut self, screen_delta: Vec2) {
        if !screen_delta.is_finite() {
            return;
        }
        let zoom = self.effective_zoom();
        self.position.x -= screen_delta.x / zoom;
        self.position.y -= screen_delta.y / zoom;
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

/// Host-facing contract: the loop runner feeds one input snapshot and one
/// clamped delta per frame, then asks for a frame to present.
pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, dt_seconds: f32, input: &InputSnapshot);
    fn render(&mut self, surface: SurfaceSize, frame: &mut Frame);
    fn unload(&mut self);
    fn title(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_zoom_clamps_at_bounds() {
        let mut camera = Camera2D::default();
        camera.set_zoom_clamped(10.0);
        assert_eq!(camera.zoom, CAMERA_ZOOM_MAX);
        camera.set_zoom_clamped(0.01);
        assert_eq!(camera.zoom, CAMERA_ZOOM_MIN);
        camera.set_zoom_clamped(f32::NAN);
        assert_eq!(camera.zoom, CAMERA_ZOOM_DEFAULT);
    }

    #[test]
    fn pan_moves_opposite_to_drag_scaled_by_zoom() {
        let mut camera = Camera2D {
            position: Vec2::new(10.0, 10.0),
            zoom: 2.0,
        };
        camera.pan_by_screen_delta(Vec2::new(20.0, -8.0));
        assert_eq!(camera.position, Vec2::new(0.0, 14.0));
    }

    #[test]
    fn pan_ignores_non_finite_delta() {
        let mut camera = Camera2D::default();
        camera.pan_by_screen_delta(Vec2::new(f32::INFINITY, 1.0));
        assert_eq!(camera.position, Vec2::ZERO);
    }

    #[test]
    fn vec2_distance_and_manhattan() {
        let a = Vec2::new(3.0, 4.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(a.distance(Vec2::ZERO), 5.0);
        assert_eq!(Vec2::new(-3.0, 4.0).manhattan(), 7.0);
    }
}
