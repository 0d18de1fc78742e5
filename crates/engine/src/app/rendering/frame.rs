use crate::app::Vec2;

pub type Rgba = [u8; 4];

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    Ring {
        center: Vec2,
        radius: f32,
        thickness: f32,
        color: Rgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
    },
    FillRect {
        min: Vec2,
        max: Vec2,
        color: Rgba,
    },
}

/// Draw list produced by a scene for one presented frame.
///
/// `clear` of `None` leaves the ambient backdrop visible underneath.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    clear: Option<Rgba>,
    commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.clear = None;
        self.commands.clear();
    }

    pub fn set_clear_color(&mut self, color: Rgba) {
        self.clear = Some(color);
    }

    pub fn clear_color(&self) -> Option<Rgba> {
        self.clear
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    pub fn ring(&mut self, center: Vec2, radius: f32, thickness: f32, color: Rgba) {
        self.commands.push(DrawCommand::Ring {
            center,
            radius,
            thickness,
            color,
        });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }

    pub fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { min, max, color });
    }

    /// Horizontal meter: a track rect with a fill proportional to `fraction`.
    pub fn meter(&mut self, min: Vec2, max: Vec2, fraction: f32, track: Rgba, fill: Rgba) {
        self.fill_rect(min, max, track);
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if fraction > 0.0 {
            let fill_max = Vec2::new(min.x + (max.x - min.x) * fraction, max.y);
            self.fill_rect(min, fill_max, fill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_emits_track_and_proportional_fill() {
        let mut frame = Frame::new();
        frame.meter(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 10.0),
            0.25,
            [0, 0, 0, 255],
            [255, 255, 255, 255],
        );
        assert_eq!(frame.commands().len(), 2);
        assert_eq!(
            frame.commands()[1],
            DrawCommand::FillRect {
                min: Vec2::new(0.0, 0.0),
                max: Vec2::new(25.0, 10.0),
                color: [255, 255, 255, 255],
            }
        );
    }

    #[test]
    fn empty_meter_draws_only_track() {
        let mut frame = Frame::new();
        frame.meter(Vec2::ZERO, Vec2::new(10.0, 2.0), f32::NAN, [1, 1, 1, 255], [2, 2, 2, 255]);
        assert_eq!(frame.commands().len(), 1);
    }

    #[test]
    fn reset_drops_commands_and_clear_color() {
        let mut frame = Frame::new();
        frame.set_clear_color([9, 9, 9, 255]);
        frame.fill_circle(Vec2::ZERO, 3.0, [1, 2, 3, 255]);
        frame.reset();
        assert!(frame.is_empty());
        assert_eq!(frame.clear_color(), None);
    }
}
