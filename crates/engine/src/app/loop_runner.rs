use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::metrics::MetricsAccumulator;
use super::{
    BackdropHandle, Frame, InputSnapshot, KeyIntent, PointerEvent, PointerId, PointerPhase,
    Renderer, Scene, SurfaceSize, Vec2,
};

pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(33);

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub max_frame_delta: Duration,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Neon Alley".to_string(),
            window_width: 1280,
            window_height: 720,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Clamps a frame delta in seconds to `[0, max_seconds]`; non-finite input yields zero.
pub fn clamp_frame_delta(dt_seconds: f32, max_seconds: f32) -> f32 {
    if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
        return 0.0;
    }
    let max_seconds = if max_seconds.is_finite() && max_seconds > 0.0 {
        max_seconds
    } else {
        DEFAULT_MAX_FRAME_DELTA.as_secs_f32()
    };
    dt_seconds.min(max_seconds)
}

#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last_frame: Instant,
    max_frame_delta: Duration,
}

impl FrameClock {
    pub fn new(now: Instant, max_frame_delta: Duration) -> Self {
        Self {
            last_frame: now,
            max_frame_delta: normalize_non_zero_duration(max_frame_delta, DEFAULT_MAX_FRAME_DELTA),
        }
    }

    /// Returns the raw wall-clock delta and the clamped simulation delta in seconds.
    pub fn advance(&mut self, now: Instant) -> (Duration, f32) {
        let raw = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        let dt = clamp_frame_delta(raw.as_secs_f32(), self.max_frame_delta.as_secs_f32());
        (raw, dt)
    }

    pub fn max_frame_delta(&self) -> Duration {
        self.max_frame_delta
    }
}

pub fn run_app(
    config: LoopConfig,
    mut scene: Box<dyn Scene>,
    backdrop: Option<BackdropHandle>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let initial_surface = renderer.surface();
    let mut input_collector = InputCollector::new(initial_surface);
    let mut clock = FrameClock::new(Instant::now(), config.max_frame_delta);

    info!(
        max_frame_delta_ms = clock.max_frame_delta().as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        backdrop = backdrop.is_some(),
        "loop_config"
    );

    scene.load();
    info!(
        width = initial_surface.width,
        height = initial_surface.height,
        "scene_loaded"
    );

    let mut frame = Frame::new();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input_collector.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        input_collector.set_surface_size(new_size.width, new_size.height);
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        input_collector.set_surface_size(size.width, size.height);
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::Focused(false) => {
                        input_collector.cancel_all_pointers();
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input_collector.handle_cursor_moved(position.x as f32, position.y as f32);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input_collector.handle_cursor_left();
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                    }
                    WindowEvent::Touch(touch) => {
                        input_collector.handle_touch(
                            touch.id,
                            touch.phase,
                            touch.location.x as f32,
                            touch.location.y as f32,
                        );
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if let PhysicalKey::Code(code) = event.physical_key {
                            input_collector.handle_key(code, event.state);
                        }
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let (raw_frame_dt, dt_seconds) = clock.advance(now);
                        let clamped = Duration::from_secs_f32(dt_seconds);
                        let dropped = raw_frame_dt.saturating_sub(clamped);
                        if dropped > Duration::ZERO {
                            debug!(
                                raw_frame_ms = raw_frame_dt.as_millis() as u64,
                                dropped_ms = dropped.as_millis() as u64,
                                "frame_delta_clamped"
                            );
                        }

                        let input_snapshot = input_collector
                            .snapshot_for_frame()
                            .with_frame_seconds(raw_frame_dt.as_secs_f32());
                        scene.update(dt_seconds, &input_snapshot);

                        // Single authoritative FPS cap sleep point for render pacing.
                        let elapsed_since_last_present =
                            Instant::now().saturating_duration_since(last_present_instant);
                        let cap_sleep =
                            compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                        if cap_sleep > Duration::ZERO {
                            thread::sleep(cap_sleep);
                        }

                        frame.reset();
                        scene.render(renderer.surface(), &mut frame);
                        let backdrop_state = backdrop.as_ref().map(|handle| {
                            handle.advance(dt_seconds);
                            handle.snapshot()
                        });
                        if let Err(error) = renderer.render(&frame, backdrop_state) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                        last_present_instant = Instant::now();

                        let next_title = scene.title();
                        if next_title != last_applied_title {
                            if let Some(title) = &next_title {
                                renderer.window().set_title(title);
                            } else {
                                renderer.window().set_title(&config.window_title);
                            }
                            last_applied_title = next_title;
                        }

                        metrics_accumulator.record_frame(raw_frame_dt, dropped);
                        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                            info!(
                                fps = snapshot.fps,
                                frame_time_ms = snapshot.frame_time_ms,
                                dropped_ms = snapshot.dropped_ms,
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Turns raw window events into the per-frame snapshot scenes consume.
///
/// Keys are edge-latched: a held key yields one intent until it is released.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    held_keys: HashSet<KeyCode>,
    pending_intents: Vec<KeyIntent>,
    pending_pointer_events: Vec<PointerEvent>,
    cursor_position_px: Option<Vec2>,
    mouse_is_down: bool,
    active_touches: BTreeMap<u64, Vec2>,
    surface: SurfaceSize,
}

impl InputCollector {
    fn new(surface: SurfaceSize) -> Self {
        Self {
            surface,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface = SurfaceSize::new(width, height);
    }

    fn handle_key(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.held_keys.insert(code) {
                    return;
                }
                if code == KeyCode::Escape {
                    self.mark_quit_requested();
                } else if let Some(intent) = intent_for_key(code) {
                    self.pending_intents.push(intent);
                }
            }
            ElementState::Released => {
                self.held_keys.remove(&code);
            }
        }
    }

    fn handle_cursor_moved(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        self.cursor_position_px = Some(position);
        if self.mouse_is_down {
            self.pending_pointer_events
                .push(PointerEvent::moved(position, PointerId::MOUSE));
        }
    }

    fn handle_cursor_left(&mut self) {
        if self.mouse_is_down {
            let position = self.cursor_position_px.unwrap_or_default();
            self.pending_pointer_events
                .push(PointerEvent::cancel(position, PointerId::MOUSE));
            self.mouse_is_down = false;
        }
        self.cursor_position_px = None;
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        let Some(position) = self.cursor_position_px else {
            return;
        };
        match state {
            ElementState::Pressed => {
                if !self.mouse_is_down {
                    self.mouse_is_down = true;
                    self.pending_pointer_events
                        .push(PointerEvent::down(position, PointerId::MOUSE));
                }
            }
            ElementState::Released => {
                if self.mouse_is_down {
                    self.mouse_is_down = false;
                    self.pending_pointer_events
                        .push(PointerEvent::up(position, PointerId::MOUSE));
                }
            }
        }
    }

    fn handle_touch(&mut self, touch_id: u64, phase: TouchPhase, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        let pointer_phase = match phase {
            TouchPhase::Started => {
                if self.active_touches.insert(touch_id, position).is_some() {
                    return;
                }
                PointerPhase::Down
            }
            TouchPhase::Moved => match self.active_touches.get_mut(&touch_id) {
                Some(last) => {
                    *last = position;
                    PointerPhase::Move
                }
                None => return,
            },
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.active_touches.remove(&touch_id).is_none() {
                    return;
                }
                if phase == TouchPhase::Ended {
                    PointerPhase::Up
                } else {
                    PointerPhase::Cancel
                }
            }
        };
        self.pending_pointer_events
            .push(PointerEvent::new(pointer_phase, position, touch_pointer_id(touch_id)));
    }

    fn cancel_all_pointers(&mut self) {
        if self.mouse_is_down {
            let position = self.cursor_position_px.unwrap_or_default();
            self.pending_pointer_events
                .push(PointerEvent::cancel(position, PointerId::MOUSE));
            self.mouse_is_down = false;
        }
        for (touch_id, position) in std::mem::take(&mut self.active_touches) {
            self.pending_pointer_events
                .push(PointerEvent::cancel(position, touch_pointer_id(touch_id)));
        }
        self.held_keys.clear();
    }

    fn snapshot_for_frame(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.quit_requested,
            std::mem::take(&mut self.pending_pointer_events),
            std::mem::take(&mut self.pending_intents),
            self.surface,
        )
    }
}

/// Touch ids are shifted by one so they never collide with the mouse pointer.
fn touch_pointer_id(touch_id: u64) -> PointerId {
    PointerId(touch_id.saturating_add(1))
}

fn intent_for_key(code: KeyCode) -> Option<KeyIntent> {
    let intent = match code {
        KeyCode::Enter | KeyCode::NumpadEnter => KeyIntent::Confirm,
        KeyCode::Backspace => KeyIntent::Back,
        KeyCode::Space | KeyCode::KeyP => KeyIntent::TogglePause,
        KeyCode::KeyZ => KeyIntent::ToggleFocus,
        KeyCode::Tab => KeyIntent::CycleSelection,
        KeyCode::Digit1 => KeyIntent::Choice(0),
        KeyCode::Digit2 => KeyIntent::Choice(1),
        KeyCode::Digit3 => KeyIntent::Choice(2),
        KeyCode::Digit4 => KeyIntent::Choice(3),
        KeyCode::F1 => KeyIntent::BuyUpgrade(0),
        KeyCode::F2 => KeyIntent::BuyUpgrade(1),
        KeyCode::F3 => KeyIntent::BuyUpgrade(2),
        KeyCode::KeyC => KeyIntent::Chain,
        KeyCode::F5 => KeyIntent::Save,
        KeyCode::Delete => KeyIntent::ResetSave,
        _ => return None,
    };
    Some(intent)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases(snapshot: &InputSnapshot) -> Vec<PointerPhase> {
        snapshot
            .pointer_events()
            .iter()
            .map(|event| event.phase)
            .collect()
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        assert_eq!(clamp_frame_delta(0.6, 0.033), 0.033);
        assert_eq!(clamp_frame_delta(0.016, 0.033), 0.016);
    }

    #[test]
    fn clamp_frame_delta_zeroes_invalid_input() {
        assert_eq!(clamp_frame_delta(f32::NAN, 0.033), 0.0);
        assert_eq!(clamp_frame_delta(-1.0, 0.033), 0.0);
        assert_eq!(clamp_frame_delta(f32::INFINITY, 0.033), 0.0);
    }

    #[test]
    fn frame_clock_reports_raw_and_clamped_delta() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start, Duration::from_millis(33));
        let (raw, dt) = clock.advance(start + Duration::from_millis(500));
        assert_eq!(raw, Duration::from_millis(500));
        assert!((dt - 0.033).abs() < 1e-6);

        let (raw, dt) = clock.advance(start + Duration::from_millis(510));
        assert_eq!(raw, Duration::from_millis(10));
        assert!((dt - 0.010).abs() < 1e-6);
    }

    #[test]
    fn key_press_is_edge_triggered_for_single_frame() {
        let mut input = InputCollector::default();
        input.handle_key(KeyCode::Enter, ElementState::Pressed);

        let first = input.snapshot_for_frame();
        let second = input.snapshot_for_frame();

        assert_eq!(first.intents(), &[KeyIntent::Confirm]);
        assert!(second.intents().is_empty());
    }

    #[test]
    fn held_key_does_not_repeat_until_released() {
        let mut input = InputCollector::default();
        input.handle_key(KeyCode::Space, ElementState::Pressed);
        input.handle_key(KeyCode::Space, ElementState::Pressed);
        assert_eq!(input.snapshot_for_frame().intents(), &[KeyIntent::TogglePause]);

        input.handle_key(KeyCode::Space, ElementState::Pressed);
        assert!(input.snapshot_for_frame().intents().is_empty());

        input.handle_key(KeyCode::Space, ElementState::Released);
        input.handle_key(KeyCode::Space, ElementState::Pressed);
        assert_eq!(input.snapshot_for_frame().intents(), &[KeyIntent::TogglePause]);
    }

    #[test]
    fn number_and_function_keys_map_to_indexed_intents() {
        assert_eq!(intent_for_key(KeyCode::Digit3), Some(KeyIntent::Choice(2)));
        assert_eq!(intent_for_key(KeyCode::F2), Some(KeyIntent::BuyUpgrade(1)));
        assert_eq!(intent_for_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn escape_requests_quit_without_intent() {
        let mut input = InputCollector::default();
        input.handle_key(KeyCode::Escape, ElementState::Pressed);
        let snapshot = input.snapshot_for_frame();
        assert!(snapshot.quit_requested());
        assert!(snapshot.intents().is_empty());
    }

    #[test]
    fn mouse_press_drag_release_emits_pointer_sequence() {
        let mut input = InputCollector::default();
        input.handle_cursor_moved(10.0, 10.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_cursor_moved(20.0, 15.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);

        let snapshot = input.snapshot_for_frame();
        assert_eq!(
            phases(&snapshot),
            vec![PointerPhase::Down, PointerPhase::Move, PointerPhase::Up]
        );
        assert_eq!(snapshot.pointer_events()[2].position, Vec2::new(20.0, 15.0));
        assert!(snapshot
            .pointer_events()
            .iter()
            .all(|event| event.pointer_id == PointerId::MOUSE));
    }

    #[test]
    fn hover_without_press_emits_nothing() {
        let mut input = InputCollector::default();
        input.handle_cursor_moved(10.0, 10.0);
        input.handle_cursor_moved(30.0, 10.0);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        assert!(input.snapshot_for_frame().pointer_events().is_empty());
    }

    #[test]
    fn cursor_leaving_mid_press_cancels_gesture() {
        let mut input = InputCollector::default();
        input.handle_cursor_moved(5.0, 5.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_cursor_left();
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);

        assert_eq!(
            phases(&input.snapshot_for_frame()),
            vec![PointerPhase::Down, PointerPhase::Cancel]
        );
    }

    #[test]
    fn touches_get_distinct_pointer_ids() {
        let mut input = InputCollector::default();
        input.handle_touch(0, TouchPhase::Started, 1.0, 1.0);
        input.handle_touch(4, TouchPhase::Started, 9.0, 9.0);
        input.handle_touch(0, TouchPhase::Ended, 2.0, 2.0);

        let snapshot = input.snapshot_for_frame();
        let ids: Vec<_> = snapshot
            .pointer_events()
            .iter()
            .map(|event| event.pointer_id)
            .collect();
        assert_eq!(ids, vec![PointerId(1), PointerId(5), PointerId(1)]);
        assert_eq!(
            phases(&snapshot),
            vec![PointerPhase::Down, PointerPhase::Down, PointerPhase::Up]
        );
    }

    #[test]
    fn focus_loss_cancels_every_pressed_pointer() {
        let mut input = InputCollector::default();
        input.handle_cursor_moved(3.0, 3.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_touch(2, TouchPhase::Started, 7.0, 7.0);
        let _ = input.snapshot_for_frame();

        input.cancel_all_pointers();
        let snapshot = input.snapshot_for_frame();
        assert_eq!(
            phases(&snapshot),
            vec![PointerPhase::Cancel, PointerPhase::Cancel]
        );
        assert_eq!(snapshot.pointer_events()[1].pointer_id, PointerId(3));
        assert_eq!(snapshot.pointer_events()[1].position, Vec2::new(7.0, 7.0));
    }

    #[test]
    fn snapshot_carries_surface_size() {
        let mut input = InputCollector::new(SurfaceSize::new(320, 200));
        assert_eq!(input.snapshot_for_frame().surface_size(), SurfaceSize::new(320, 200));
        input.set_surface_size(640, 480);
        assert_eq!(input.snapshot_for_frame().surface_size(), SurfaceSize::new(640, 480));
    }

    #[test]
    fn target_frame_duration_none_when_cap_off() {
        assert_eq!(target_frame_duration(None), None);
    }

    #[test]
    fn compute_cap_sleep_zero_when_over_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(20), Some(Duration::from_millis(16)));
        assert_eq!(sleep, Duration::ZERO);
    }

    #[test]
    fn compute_cap_sleep_positive_when_under_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(10), Some(Duration::from_millis(16)));
        assert_eq!(sleep, Duration::from_millis(6));
    }

    #[test]
    fn normalize_render_fps_cap_disables_zero() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(normalize_render_fps_cap(Some(144)), Some(144));
    }
}
