use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::backdrop::lerp_rgba;
use super::{BackdropState, DrawCommand, Frame, Rgba, SurfaceSize};
use crate::app::Vec2;

const CLEAR_COLOR_FALLBACK: Rgba = [12, 12, 20, 255];
const SKYLINE_COLOR: Rgba = [6, 6, 14, 255];
const SCAN_BAND_COLOR: Rgba = [255, 60, 170, 28];
const SCAN_BAND_HEIGHT_PX: i32 = 6;
const SCAN_BAND_SPEED_PX_PER_SECOND: f32 = 40.0;
const SKYLINE_BLOCK_WIDTH_PX: i32 = 48;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    surface: SurfaceSize,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            surface: SurfaceSize::new(size.width, size.height),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.surface = SurfaceSize::new(width, height);
        Ok(())
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn render(&mut self, frame: &Frame, backdrop: Option<BackdropState>) -> Result<(), Error> {
        let surface = self.surface;
        rasterize_frame(self.pixels.frame_mut(), surface, frame, backdrop);
        self.pixels.render()
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }
}

pub(crate) fn rasterize_frame(
    buffer: &mut [u8],
    surface: SurfaceSize,
    frame: &Frame,
    backdrop: Option<BackdropState>,
) {
    if surface.is_empty() {
        return;
    }
    match (frame.clear_color(), backdrop) {
        (Some(color), _) => fill_buffer(buffer, color),
        (None, Some(state)) => draw_backdrop(buffer, surface, &state),
        (None, None) => fill_buffer(buffer, CLEAR_COLOR_FALLBACK),
    }

    for command in frame.commands() {
        match *command {
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => draw_ring(buffer, surface, center, radius, radius, color),
            DrawCommand::Ring {
                center,
                radius,
                thickness,
                color,
            } => draw_ring(buffer, surface, center, radius, thickness, color),
            DrawCommand::Line { from, to, color } => draw_line(buffer, surface, from, to, color),
            DrawCommand::FillRect { min, max, color } => {
                draw_rect(buffer, surface, min, max, color)
            }
        }
    }
}

fn fill_buffer(buffer: &mut [u8], color: Rgba) {
    for pixel in buffer.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

fn draw_backdrop(buffer: &mut [u8], surface: SurfaceSize, state: &BackdropState) {
    let (top, bottom) = state.sky_colors();
    let width = surface.width;
    let height = surface.height as i32;
    for y in 0..height {
        let t = y as f32 / (height.max(2) - 1) as f32;
        draw_horizontal_line_clipped(buffer, surface, y, lerp_rgba(top, bottom, t));
    }

    // Deterministic skyline silhouette along the lower third.
    let base = height - height / 8;
    let mut block = 0;
    let mut x = 0;
    while x < width as i32 {
        let rise = (((block * 37 + 11) % 9) + 2) * height / 40;
        draw_rect(
            buffer,
            surface,
            Vec2::new(x as f32, (base - rise) as f32),
            Vec2::new((x + SKYLINE_BLOCK_WIDTH_PX - 4) as f32, height as f32),
            SKYLINE_COLOR,
        );
        x += SKYLINE_BLOCK_WIDTH_PX;
        block += 1;
    }

    if state.running {
        let travel = height.max(1) as f32;
        let band_top = (state.phase_seconds * SCAN_BAND_SPEED_PX_PER_SECOND) % travel;
        for offset in 0..SCAN_BAND_HEIGHT_PX {
            draw_horizontal_line_clipped(buffer, surface, band_top as i32 + offset, SCAN_BAND_COLOR);
        }
    }
}

fn draw_horizontal_line_clipped(buffer: &mut [u8], surface: SurfaceSize, y: i32, color: Rgba) {
    if y < 0 || y >= surface.height as i32 {
        return;
    }
    for x in 0..surface.width as i32 {
        write_pixel_rgba_clipped(buffer, surface.width as usize, x, y, color);
    }
}

/// Filled annulus; `thickness >= radius` gives a solid disc.
fn draw_ring(
    buffer: &mut [u8],
    surface: SurfaceSize,
    center: Vec2,
    radius: f32,
    thickness: f32,
    color: Rgba,
) {
    if !center.is_finite() || !radius.is_finite() || radius <= 0.0 || !thickness.is_finite() {
        return;
    }
    let outer_sq = radius * radius;
    let inner = (radius - thickness.max(0.0)).max(0.0);
    let inner_sq = inner * inner;
    let Some((x0, y0, x1, y1)) = clip_box(
        surface,
        center.x - radius,
        center.y - radius,
        center.x + radius,
        center.y + radius,
    ) else {
        return;
    };
    for y in y0..=y1 {
        let dy = y as f32 + 0.5 - center.y;
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - center.x;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= outer_sq && dist_sq >= inner_sq {
                write_pixel_rgba_clipped(buffer, surface.width as usize, x, y, color);
            }
        }
    }
}

fn draw_rect(buffer: &mut [u8], surface: SurfaceSize, min: Vec2, max: Vec2, color: Rgba) {
    if !min.is_finite() || !max.is_finite() {
        return;
    }
    let Some((x0, y0, x1, y1)) = clip_box(
        surface,
        min.x.min(max.x),
        min.y.min(max.y),
        min.x.max(max.x) - 1.0,
        min.y.max(max.y) - 1.0,
    ) else {
        return;
    };
    for y in y0..=y1 {
        for x in x0..=x1 {
            write_pixel_rgba_clipped(buffer, surface.width as usize, x, y, color);
        }
    }
}

fn draw_line(buffer: &mut [u8], surface: SurfaceSize, from: Vec2, to: Vec2, color: Rgba) {
    if !from.is_finite() || !to.is_finite() {
        return;
    }
    let limit = (surface.width.max(surface.height) as f32) * 4.0;
    if from.manhattan() > limit * 2.0 || to.manhattan() > limit * 2.0 {
        return;
    }
    let (mut x, mut y) = (from.x.round() as i32, from.y.round() as i32);
    let (x_end, y_end) = (to.x.round() as i32, to.y.round() as i32);
    let dx = (x_end - x).abs();
    let dy = -(y_end - y).abs();
    let step_x = if x < x_end { 1 } else { -1 };
    let step_y = if y < y_end { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        write_pixel_rgba_clipped(buffer, surface.width as usize, x, y, color);
        if x == x_end && y == y_end {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += step_x;
        }
        if doubled <= dx {
            err += dx;
            y += step_y;
        }
    }
}

fn clip_box(
    surface: SurfaceSize,
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
) -> Option<(i32, i32, i32, i32)> {
    let x0 = min_x.floor().max(0.0);
    let y0 = min_y.floor().max(0.0);
    let x1 = max_x.ceil().min(surface.width as f32 - 1.0);
    let y1 = max_y.ceil().min(surface.height as f32 - 1.0);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some((x0 as i32, y0 as i32, x1 as i32, y1 as i32))
}

/// Source-over blend; opaque colors overwrite.
fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: Rgba) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    let pixel = &mut frame[byte_offset..end];
    match color[3] {
        255 => pixel.copy_from_slice(&color),
        0 => {}
        alpha => {
            let a = alpha as u32;
            for channel in 0..3 {
                let blended = (color[channel] as u32 * a + pixel[channel] as u32 * (255 - a)) / 255;
                pixel[channel] = blended as u8;
            }
            pixel[3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba = [255, 255, 255, 255];
    const BLACK: Rgba = [0, 0, 0, 255];

    fn pixel_at(buffer: &[u8], surface: SurfaceSize, x: usize, y: usize) -> Rgba {
        let offset = (y * surface.width as usize + x) * 4;
        [
            buffer[offset],
            buffer[offset + 1],
            buffer[offset + 2],
            buffer[offset + 3],
        ]
    }

    fn buffer_for(surface: SurfaceSize) -> Vec<u8> {
        vec![0; surface.width as usize * surface.height as usize * 4]
    }

    #[test]
    fn renderer_type_is_non_generic() {
        let _renderer: Option<Renderer> = None;
    }

    #[test]
    fn filled_circle_covers_center_but_not_corners() {
        let surface = SurfaceSize::new(32, 32);
        let mut buffer = buffer_for(surface);
        let mut frame = Frame::new();
        frame.set_clear_color(BLACK);
        frame.fill_circle(Vec2::new(16.0, 16.0), 6.0, WHITE);
        rasterize_frame(&mut buffer, surface, &frame, None);

        assert_eq!(pixel_at(&buffer, surface, 16, 16), WHITE);
        assert_eq!(pixel_at(&buffer, surface, 0, 0), BLACK);
        assert_eq!(pixel_at(&buffer, surface, 16, 2), BLACK);
    }

    #[test]
    fn ring_leaves_its_center_untouched() {
        let surface = SurfaceSize::new(40, 40);
        let mut buffer = buffer_for(surface);
        let mut frame = Frame::new();
        frame.set_clear_color(BLACK);
        frame.ring(Vec2::new(20.0, 20.0), 12.0, 2.0, WHITE);
        rasterize_frame(&mut buffer, surface, &frame, None);

        assert_eq!(pixel_at(&buffer, surface, 20, 20), BLACK);
        assert_eq!(pixel_at(&buffer, surface, 20, 9), WHITE);
    }

    #[test]
    fn offscreen_and_non_finite_shapes_are_clipped() {
        let surface = SurfaceSize::new(8, 8);
        let mut buffer = buffer_for(surface);
        let mut frame = Frame::new();
        frame.set_clear_color(BLACK);
        frame.fill_circle(Vec2::new(-500.0, -500.0), 20.0, WHITE);
        frame.fill_rect(Vec2::new(f32::NAN, 0.0), Vec2::new(4.0, 4.0), WHITE);
        frame.line(Vec2::new(-4.0, -4.0), Vec2::new(f32::INFINITY, 3.0), WHITE);
        rasterize_frame(&mut buffer, surface, &frame, None);

        assert!(buffer.chunks_exact(4).all(|pixel| pixel == BLACK));
    }

    #[test]
    fn line_hits_both_endpoints() {
        let surface = SurfaceSize::new(16, 16);
        let mut buffer = buffer_for(surface);
        let mut frame = Frame::new();
        frame.set_clear_color(BLACK);
        frame.line(Vec2::new(1.0, 2.0), Vec2::new(12.0, 9.0), WHITE);
        rasterize_frame(&mut buffer, surface, &frame, None);

        assert_eq!(pixel_at(&buffer, surface, 1, 2), WHITE);
        assert_eq!(pixel_at(&buffer, surface, 12, 9), WHITE);
    }

    #[test]
    fn translucent_rect_blends_over_clear_color() {
        let surface = SurfaceSize::new(4, 4);
        let mut buffer = buffer_for(surface);
        let mut frame = Frame::new();
        frame.set_clear_color(BLACK);
        frame.fill_rect(Vec2::ZERO, Vec2::new(4.0, 4.0), [255, 0, 0, 51]);
        rasterize_frame(&mut buffer, surface, &frame, None);

        assert_eq!(pixel_at(&buffer, surface, 2, 2), [51, 0, 0, 255]);
    }

    #[test]
    fn backdrop_gradient_shows_when_frame_has_no_clear_color() {
        let surface = SurfaceSize::new(16, 64);
        let mut buffer = buffer_for(surface);
        let frame = Frame::new();
        let state = BackdropState {
            running: false,
            ..BackdropState::default()
        };
        rasterize_frame(&mut buffer, surface, &frame, Some(state));

        let (top, _) = state.sky_colors();
        assert_eq!(pixel_at(&buffer, surface, 3, 0), top);
        assert_ne!(pixel_at(&buffer, surface, 3, 0), pixel_at(&buffer, surface, 3, 40));
    }
}
