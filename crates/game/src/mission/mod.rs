//! Mission Engine: one bounded-time mini-game run at a time.
//!
//! A run goes `Inactive -> Active -> Finished(outcome)`. `tick` reports the
//! terminal result exactly once; afterwards the run is frozen until the next
//! `start`. Starting while a run is active resets it cleanly.

mod kind;
mod targets;
mod variants;

use engine::{Frame, PointerCapture, PointerEvent, PointerPhase, Rgba, SurfaceSize, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::economy::{self, EconomyDelta, MissionOutcome, PayoutModifiers};

pub use kind::{
    DifficultyContext, MissionKind, AMPLIFIER_RADIUS_PER_LEVEL, BUFFER_SECONDS_PER_LEVEL,
};
pub use targets::{PlayArea, Target, TargetId, TargetPool};

use variants::VariantState;

pub const PULSE_ZONE_PX: f32 = 90.0;
pub const PULSE_SECONDS: f32 = 3.0;
pub const PULSE_TIME_SCALE: f32 = 0.5;

const OVERLAY_COLOR: Rgba = [0, 0, 0, 64];
const TARGET_RING_COLOR: Rgba = [0, 243, 255, 216];
const TARGET_CORE_COLOR: Rgba = [255, 0, 124, 190];
const METER_TRACK_COLOR: Rgba = [255, 255, 255, 40];
const TIME_FILL_COLOR: Rgba = [0, 243, 255, 200];
const PROGRESS_FILL_COLOR: Rgba = [255, 0, 124, 200];
const HOLD_FILL_COLOR: Rgba = [255, 196, 0, 220];
const SWEET_SPOT_COLOR: Rgba = [255, 255, 255, 230];
const PULSE_READY_COLOR: Rgba = [0, 243, 255, 60];
const PULSE_ACTIVE_COLOR: Rgba = [0, 243, 255, 140];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionPhase {
    Inactive,
    Active,
    Finished(MissionOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseState {
    Unavailable,
    Ready,
    Active { remaining: f32 },
    Spent,
}

impl PulseState {
    pub fn label(self) -> &'static str {
        match self {
            PulseState::Ready => "PULSE(RDY)",
            PulseState::Active { .. } => "PULSE(ON)",
            PulseState::Unavailable | PulseState::Spent => "NONE",
        }
    }

    fn time_scale(self) -> f32 {
        match self {
            PulseState::Active { .. } => PULSE_TIME_SCALE,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionRun {
    pub kind: MissionKind,
    pub context: DifficultyContext,
    pub elapsed: f32,
    pub time_limit: f32,
    pub score: u32,
    pub objective_progress: f32,
    pub objective_target: u32,
    pub targets: TargetPool,
}

impl MissionRun {
    pub fn time_left(&self) -> f32 {
        (self.time_limit - self.elapsed).max(0.0)
    }

    pub fn objective_met(&self) -> bool {
        self.objective_progress >= self.objective_target as f32
    }

    /// `progress/target` with progress floored to a whole step.
    pub fn progress_label(&self) -> String {
        format!(
            "{}/{}",
            self.objective_progress.floor() as u32,
            self.objective_target
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub score: u32,
    pub objective_progress: f32,
    pub objective_target: u32,
    pub elapsed: f32,
    pub time_limit: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionResult {
    pub kind: MissionKind,
    pub outcome: MissionOutcome,
    pub summary: ScoreSummary,
    pub economy_delta: EconomyDelta,
    pub boss: bool,
}

impl MissionResult {
    pub fn success(&self) -> bool {
        self.outcome.is_success()
    }
}

#[derive(Debug, Clone)]
pub struct MissionEngine {
    rng: ChaCha8Rng,
    phase: MissionPhase,
    run: Option<MissionRun>,
    variant: VariantState,
    capture: PointerCapture,
    paused: bool,
    surface: SurfaceSize,
    spawn_timer: f32,
    pulse: PulseState,
}

impl MissionEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: MissionPhase::Inactive,
            run: None,
            variant: VariantState::CachePop,
            capture: PointerCapture::default(),
            paused: false,
            surface: SurfaceSize::default(),
            spawn_timer: 0.0,
            pulse: PulseState::Unavailable,
        }
    }

    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == MissionPhase::Active
    }

    pub fn run(&self) -> Option<&MissionRun> {
        self.run.as_ref()
    }

    pub fn hold_power(&self) -> f32 {
        self.variant.hold_power()
    }

    pub fn pulse_state(&self) -> PulseState {
        self.pulse
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_surface_size(&mut self, surface: SurfaceSize) {
        if surface == self.surface {
            return;
        }
        self.surface = surface;
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let moved = run.targets.clamp_into(&PlayArea::for_surface(surface));
        if moved > 0 {
            debug!(
                moved,
                width = surface.width,
                height = surface.height,
                "targets_clamped_to_surface"
            );
        }
    }

    pub fn start(&mut self, kind: MissionKind, context: DifficultyContext) {
        if self.phase == MissionPhase::Active {
            warn!(kind = kind.token(), "mission_restarted_while_active");
        }
        let tuning = variants::tuning(kind);
        let mut run = MissionRun {
            kind,
            context,
            elapsed: 0.0,
            time_limit: context.time_limit(kind),
            score: 0,
            objective_progress: 0.0,
            objective_target: context.objective_target(kind),
            targets: TargetPool::new(tuning.cap),
        };
        let area = PlayArea::for_surface(self.surface);
        for _ in 0..tuning.initial {
            variants::spawn_target(&mut run, &area, &mut self.rng);
        }

        info!(
            kind = kind.token(),
            time_limit = run.time_limit,
            objective = run.objective_target,
            boss = context.boss,
            "mission_started"
        );

        self.capture.force_release();
        self.variant = VariantState::for_kind(kind);
        self.spawn_timer = 0.0;
        self.paused = false;
        self.pulse = if context.pulse_available {
            PulseState::Ready
        } else {
            PulseState::Unavailable
        };
        self.run = Some(run);
        self.phase = MissionPhase::Active;
    }

    /// Drops an active run without producing a result.
    pub fn abort(&mut self) {
        if let Some(run) = self.run.as_ref().filter(|_| self.is_active()) {
            info!(kind = run.kind.token(), elapsed = run.elapsed, "mission_aborted");
        }
        self.reset();
    }

    pub fn reset(&mut self) {
        self.cancel_pointer();
        self.run = None;
        self.phase = MissionPhase::Inactive;
        self.pulse = PulseState::Unavailable;
        self.spawn_timer = 0.0;
    }

    /// Clears any in-flight hold or trace and releases the capture token.
    pub fn cancel_pointer(&mut self) {
        self.variant.cancel();
        self.capture.force_release();
    }

    pub fn pointer_event(&mut self, event: PointerEvent) {
        if self.paused || !self.is_active() {
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };
        if run.objective_met() {
            return;
        }
        let area = PlayArea::for_surface(self.surface);

        match event.phase {
            PointerPhase::Down => {
                if self.pulse == PulseState::Ready && in_pulse_zone(event.position) {
                    self.pulse = PulseState::Active {
                        remaining: PULSE_SECONDS,
                    };
                    info!(elapsed = run.elapsed, "pulse_activated");
                    return;
                }
                if !self.capture.try_claim(event.pointer_id) {
                    debug!(pointer = event.pointer_id.0, "mission_pointer_refused");
                    return;
                }
                self.variant
                    .pointer_down(run, event.position, &area, &mut self.rng);
            }
            PointerPhase::Move => {
                if self.capture.owns(event.pointer_id) {
                    self.variant
                        .pointer_move(run, event.position, &area, &mut self.rng);
                }
            }
            PointerPhase::Up => {
                if self.capture.release(event.pointer_id) {
                    self.variant.pointer_up(run, &area, &mut self.rng);
                }
            }
            PointerPhase::Cancel => {
                if self.capture.release(event.pointer_id) {
                    self.variant.cancel();
                }
            }
        }
    }

    /// Advances the active run. Returns the result on the tick the run ends
    /// and `None` on every other call.
    pub fn tick(&mut self, dt_seconds: f32) -> Option<MissionResult> {
        self.tick_with_wall_time(dt_seconds, dt_seconds)
    }

    /// Like [`MissionEngine::tick`], with `wall_seconds` carrying the frame
    /// time before clamping. Only the trace speed check reads it.
    pub fn tick_with_wall_time(
        &mut self,
        dt_seconds: f32,
        wall_seconds: f32,
    ) -> Option<MissionResult> {
        if self.paused || !self.is_active() {
            return None;
        }
        let real_dt = if dt_seconds.is_finite() {
            dt_seconds.max(0.0)
        } else {
            0.0
        };
        let wall_dt = if wall_seconds.is_finite() {
            wall_seconds.max(real_dt)
        } else {
            real_dt
        };
        let run = self.run.as_mut()?;

        let sim_dt = real_dt * self.pulse.time_scale();
        if let PulseState::Active { remaining } = self.pulse {
            let remaining = remaining - real_dt;
            self.pulse = if remaining > 0.0 {
                PulseState::Active { remaining }
            } else {
                PulseState::Spent
            };
        }

        run.elapsed += sim_dt;
        self.variant.tick(run, sim_dt, wall_dt);

        let tuning = variants::tuning(run.kind);
        let area = PlayArea::for_surface(self.surface);
        self.spawn_timer += sim_dt;
        if self.spawn_timer >= tuning.spawn_every {
            self.spawn_timer -= tuning.spawn_every;
            variants::spawn_target(run, &area, &mut self.rng);
        }
        run.targets.age(sim_dt);
        run.targets.compact();

        let outcome = if run.objective_met() {
            MissionOutcome::Success
        } else if run.elapsed >= run.time_limit {
            MissionOutcome::Timeout
        } else {
            return None;
        };

        let result = MissionResult {
            kind: run.kind,
            outcome,
            summary: ScoreSummary {
                score: run.score,
                objective_progress: run.objective_progress,
                objective_target: run.objective_target,
                elapsed: run.elapsed,
                time_limit: run.time_limit,
            },
            economy_delta: economy::resolve(
                outcome,
                run.score,
                PayoutModifiers {
                    boss: run.context.boss,
                    bargain: run.context.bargain,
                },
            ),
            boss: run.context.boss,
        };
        info!(
            kind = run.kind.token(),
            outcome = ?outcome,
            score = run.score,
            elapsed = run.elapsed,
            "mission_finished"
        );

        self.variant.cancel();
        self.capture.force_release();
        self.phase = MissionPhase::Finished(outcome);
        Some(result)
    }

    /// Draws the run whether or not it is advancing.
    pub fn render(&self, frame: &mut Frame) {
        let Some(run) = self.run.as_ref() else {
            return;
        };
        if self.surface.is_empty() {
            return;
        }
        let width = self.surface.width as f32;
        let height = self.surface.height as f32;
        frame.fill_rect(Vec2::ZERO, Vec2::new(width, height), OVERLAY_COLOR);

        for target in run.targets.alive() {
            frame.ring(target.position, target.hit_radius, 3.0, TARGET_RING_COLOR);
            frame.fill_circle(target.position, target.inner_radius, TARGET_CORE_COLOR);
        }

        let meter_left = PULSE_ZONE_PX + 20.0;
        let meter_right = width - 20.0;
        let time_fraction = if run.time_limit > 0.0 {
            run.time_left() / run.time_limit
        } else {
            0.0
        };
        frame.meter(
            Vec2::new(meter_left, 24.0),
            Vec2::new(meter_right, 34.0),
            time_fraction,
            METER_TRACK_COLOR,
            TIME_FILL_COLOR,
        );
        let progress_fraction = if run.objective_target > 0 {
            run.objective_progress / run.objective_target as f32
        } else {
            1.0
        };
        frame.meter(
            Vec2::new(meter_left, 44.0),
            Vec2::new(meter_right, 54.0),
            progress_fraction,
            METER_TRACK_COLOR,
            PROGRESS_FILL_COLOR,
        );

        if run.kind == MissionKind::Burst {
            let left = width * 0.5 - 150.0;
            let right = width * 0.5 + 150.0;
            let top = height - 60.0;
            frame.meter(
                Vec2::new(left, top),
                Vec2::new(right, top + 16.0),
                self.hold_power(),
                METER_TRACK_COLOR,
                HOLD_FILL_COLOR,
            );
            let sweet_x = left + (right - left) * variants::BURST_SWEET_SPOT;
            frame.line(
                Vec2::new(sweet_x, top - 4.0),
                Vec2::new(sweet_x, top + 20.0),
                SWEET_SPOT_COLOR,
            );
        }

        let pulse_color = match self.pulse {
            PulseState::Ready => Some(PULSE_READY_COLOR),
            PulseState::Active { .. } => Some(PULSE_ACTIVE_COLOR),
            PulseState::Unavailable | PulseState::Spent => None,
        };
        if let Some(color) = pulse_color {
            frame.fill_rect(Vec2::ZERO, Vec2::new(PULSE_ZONE_PX, PULSE_ZONE_PX), color);
        }
    }
}

fn in_pulse_zone(position: Vec2) -> bool {
    position.x >= 0.0
        && position.y >= 0.0
        && position.x < PULSE_ZONE_PX
        && position.y < PULSE_ZONE_PX
}
