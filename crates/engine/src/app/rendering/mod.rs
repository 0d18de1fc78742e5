mod backdrop;
mod frame;
mod renderer;
mod transform;

pub use backdrop::{BackdropError, BackdropHandle, BackdropState};
pub use frame::{DrawCommand, Frame, Rgba};
pub use renderer::Renderer;
pub use transform::{screen_to_world, world_to_screen, SurfaceSize};
