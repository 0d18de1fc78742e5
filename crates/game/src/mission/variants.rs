//! Per-variant input interpretation. Every variant shares the run, the
//! target pool and the terminal evaluation in `MissionEngine`; only the
//! meaning of pointer input and the spawn cadence differ.

use engine::Vec2;
use rand::Rng;

use super::kind::MissionKind;
use super::targets::{PlayArea, TargetId};
use super::MissionRun;

const TOUCH_MARGIN: f32 = 12.0;

pub(crate) const CACHE_MISS_PENALTY_SECONDS: f32 = 0.25;

pub(crate) const BURST_SWEET_SPOT: f32 = 0.75;
pub(crate) const BURST_TIGHT_BAND: f32 = 0.06;
pub(crate) const BURST_WIDE_BAND: f32 = 0.16;
pub(crate) const BURST_CHARGE_PER_SECOND: f32 = 1.2;
pub(crate) const BURST_DECAY_PER_SECOND: f32 = 0.9;
pub(crate) const BURST_TIGHT_SCORE: u32 = 3;
pub(crate) const BURST_WIDE_SCORE: u32 = 1;
pub(crate) const BURST_MISS_PENALTY_SECONDS: f32 = 1.0;

pub(crate) const TRACE_PROGRESS_PER_PX: f32 = 0.08;
pub(crate) const TRACE_RELAY_PROGRESS: f32 = 8.0;
pub(crate) const TRACE_MAX_SPEED_PX_PER_SECOND: f32 = 1400.0;
pub(crate) const TRACE_SPEED_PENALTY_PROGRESS: f32 = 3.0;
pub(crate) const TRACE_SPEED_PENALTY_SECONDS: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct VariantTuning {
    pub cap: usize,
    pub initial: usize,
    pub spawn_every: f32,
    pub ttl: Option<f32>,
}

pub(crate) fn tuning(kind: MissionKind) -> VariantTuning {
    match kind {
        MissionKind::CachePop => VariantTuning {
            cap: 6,
            initial: 6,
            spawn_every: 0.5,
            ttl: None,
        },
        MissionKind::Burst => VariantTuning {
            cap: 3,
            initial: 3,
            spawn_every: 1.0,
            ttl: None,
        },
        MissionKind::Trace => VariantTuning {
            cap: 4,
            initial: 2,
            spawn_every: 1.5,
            ttl: Some(5.0),
        },
    }
}

pub(crate) fn spawn_target(
    run: &mut MissionRun,
    area: &PlayArea,
    rng: &mut impl Rng,
) -> Option<TargetId> {
    let bonus = run.context.hit_radius_bonus();
    let (outer, inner) = match run.kind {
        MissionKind::CachePop => (rng.gen_range(56.0..76.0), rng.gen_range(22.0..32.0)),
        MissionKind::Burst => (rng.gen_range(34.0..44.0), rng.gen_range(12.0..18.0)),
        MissionKind::Trace => (rng.gen_range(18.0..24.0), 6.0),
    };
    let position = area.sample(rng);
    run.targets.spawn(
        position,
        outer + TOUCH_MARGIN + bonus,
        inner,
        tuning(run.kind).ttl,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum VariantState {
    CachePop,
    Burst {
        charging: Option<TargetId>,
        hold_power: f32,
    },
    Trace {
        last: Option<Vec2>,
        pending_px: f32,
    },
}

impl VariantState {
    pub fn for_kind(kind: MissionKind) -> Self {
        match kind {
            MissionKind::CachePop => VariantState::CachePop,
            MissionKind::Burst => VariantState::Burst {
                charging: None,
                hold_power: 0.0,
            },
            MissionKind::Trace => VariantState::Trace {
                last: None,
                pending_px: 0.0,
            },
        }
    }

    pub fn hold_power(&self) -> f32 {
        match self {
            VariantState::Burst { hold_power, .. } => *hold_power,
            _ => 0.0,
        }
    }

    pub fn pointer_down(
        &mut self,
        run: &mut MissionRun,
        position: Vec2,
        area: &PlayArea,
        rng: &mut impl Rng,
    ) {
        match self {
            VariantState::CachePop => match run.targets.hit_test(position) {
                Some(id) => {
                    run.targets.consume(id);
                    run.score += 1;
                    run.objective_progress += 1.0;
                    spawn_target(run, area, rng);
                }
                None => run.elapsed += CACHE_MISS_PENALTY_SECONDS,
            },
            VariantState::Burst {
                charging,
                hold_power,
            } => {
                // Empty space neither charges nor costs time.
                if let Some(id) = run.targets.hit_test(position) {
                    *charging = Some(id);
                    *hold_power = 0.0;
                }
            }
            VariantState::Trace { last, pending_px } => {
                *last = Some(position);
                *pending_px = 0.0;
                touch_relay(run, position, area, rng);
            }
        }
    }

    pub fn pointer_move(
        &mut self,
        run: &mut MissionRun,
        position: Vec2,
        area: &PlayArea,
        rng: &mut impl Rng,
    ) {
        // Tap and charge variants never score on drag.
        let VariantState::Trace { last, pending_px } = self else {
            return;
        };
        let Some(previous) = *last else {
            return;
        };
        let step = position.distance(previous);
        if !step.is_finite() {
            return;
        }
        *last = Some(position);
        *pending_px += step;
        run.objective_progress += step * TRACE_PROGRESS_PER_PX;
        touch_relay(run, position, area, rng);
    }

    pub fn pointer_up(
        &mut self,
        run: &mut MissionRun,
        area: &PlayArea,
        rng: &mut impl Rng,
    ) {
        match self {
            VariantState::CachePop => {}
            VariantState::Burst {
                charging,
                hold_power,
            } => {
                let Some(id) = charging.take() else {
                    return;
                };
                let miss = (*hold_power - BURST_SWEET_SPOT).abs();
                let reward = if miss <= BURST_TIGHT_BAND {
                    Some(BURST_TIGHT_SCORE)
                } else if miss <= BURST_WIDE_BAND {
                    Some(BURST_WIDE_SCORE)
                } else {
                    None
                };
                match reward {
                    Some(score) => {
                        run.score += score;
                        run.objective_progress += 1.0;
                        run.targets.consume(id);
                        spawn_target(run, area, rng);
                    }
                    None => run.elapsed += BURST_MISS_PENALTY_SECONDS,
                }
            }
            VariantState::Trace { last, .. } => *last = None,
        }
    }

    /// Drops the gesture without evaluating it.
    pub fn cancel(&mut self) {
        match self {
            VariantState::CachePop => {}
            VariantState::Burst { charging, .. } => *charging = None,
            VariantState::Trace { last, pending_px } => {
                *last = None;
                *pending_px = 0.0;
            }
        }
    }

    /// `sim_dt` is mission time (slowed by pulse); `wall_dt` is the unclamped
    /// frame time the pending drag distance was gathered over.
    pub fn tick(&mut self, run: &mut MissionRun, sim_dt: f32, wall_dt: f32) {
        match self {
            VariantState::CachePop => {}
            VariantState::Burst {
                charging,
                hold_power,
            } => {
                if charging.is_some_and(|id| run.targets.get(id).is_none()) {
                    *charging = None;
                }
                *hold_power = if charging.is_some() {
                    (*hold_power + BURST_CHARGE_PER_SECOND * sim_dt).min(1.0)
                } else {
                    (*hold_power - BURST_DECAY_PER_SECOND * sim_dt).max(0.0)
                };
            }
            VariantState::Trace { pending_px, .. } => {
                if wall_dt > 0.0 {
                    let speed = *pending_px / wall_dt;
                    if speed > TRACE_MAX_SPEED_PX_PER_SECOND {
                        run.objective_progress =
                            (run.objective_progress - TRACE_SPEED_PENALTY_PROGRESS).max(0.0);
                        run.elapsed += TRACE_SPEED_PENALTY_SECONDS;
                    }
                }
                *pending_px = 0.0;
            }
        }
    }
}

fn touch_relay(run: &mut MissionRun, position: Vec2, area: &PlayArea, rng: &mut impl Rng) {
    if let Some(id) = run.targets.hit_test(position) {
        run.targets.consume(id);
        run.score += 1;
        run.objective_progress += TRACE_RELAY_PROGRESS;
        spawn_target(run, area, rng);
    }
}
