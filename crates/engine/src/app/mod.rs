mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputSnapshot, KeyIntent, PointerCapture, PointerEvent, PointerId, PointerPhase};
pub use loop_runner::{
    clamp_frame_delta, run_app, AppError, FrameClock, LoopConfig, DEFAULT_MAX_FRAME_DELTA,
};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    screen_to_world, world_to_screen, BackdropError, BackdropHandle, BackdropState, DrawCommand,
    Frame, Renderer, Rgba, SurfaceSize,
};
pub use scene::{Camera2D, Scene, Vec2, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN};
