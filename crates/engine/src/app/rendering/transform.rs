use crate::app::{Camera2D, Vec2};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32 * 0.5, self.height as f32 * 0.5)
    }
}

/// `screen = center + (world - camera) * zoom`
pub fn world_to_screen(world: Vec2, camera: &Camera2D, surface: SurfaceSize) -> Vec2 {
    let zoom = camera.effective_zoom();
    let center = surface.center();
    Vec2::new(
        center.x + (world.x - camera.position.x) * zoom,
        center.y + (world.y - camera.position.y) * zoom,
    )
}

pub fn screen_to_world(screen: Vec2, camera: &Camera2D, surface: SurfaceSize) -> Vec2 {
    let zoom = camera.effective_zoom();
    let center = surface.center();
    Vec2::new(
        (screen.x - center.x) / zoom + camera.position.x,
        (screen.y - center.y) / zoom + camera.position.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            (actual.x - expected.x).abs() < 1e-3 && (actual.y - expected.y).abs() < 1e-3,
            "{actual:?} vs {expected:?}"
        );
    }

    #[test]
    fn origin_maps_to_surface_center() {
        let surface = SurfaceSize::new(800, 600);
        let camera = Camera2D::default();
        let screen = world_to_screen(Vec2::ZERO, &camera, surface);
        assert_eq!(screen, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn camera_offset_and_zoom_shift_screen_position() {
        let surface = SurfaceSize::new(800, 600);
        let camera = Camera2D {
            position: Vec2::new(10.0, -5.0),
            zoom: 2.0,
        };
        let screen = world_to_screen(Vec2::new(12.0, -4.0), &camera, surface);
        assert_eq!(screen, Vec2::new(404.0, 302.0));
    }

    #[test]
    fn screen_to_world_inverts_world_to_screen() {
        let surface = SurfaceSize::new(1280, 720);
        for zoom in [0.5_f32, 1.0, 1.6, 2.0] {
            let camera = Camera2D {
                position: Vec2::new(-37.5, 112.25),
                zoom,
            };
            for world in [
                Vec2::ZERO,
                Vec2::new(100.0, 0.0),
                Vec2::new(-180.0, 240.0),
            ] {
                let screen = world_to_screen(world, &camera, surface);
                assert_close(screen_to_world(screen, &camera, surface), world);
            }
        }
    }

    #[test]
    fn empty_surface_is_detected() {
        assert!(SurfaceSize::new(0, 720).is_empty());
        assert!(SurfaceSize::default().is_empty());
        assert!(!SurfaceSize::new(1, 1).is_empty());
    }
}
