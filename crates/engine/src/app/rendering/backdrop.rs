use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use super::Rgba;

const DAY_SKY: (Rgba, Rgba) = ([38, 62, 96, 255], [96, 120, 150, 255]);
const SUNSET_SKY: (Rgba, Rgba) = ([70, 36, 88, 255], [196, 92, 86, 255]);
const NIGHT_SKY: (Rgba, Rgba) = ([8, 8, 20, 255], [34, 18, 52, 255]);
const SUNSET_AT: f32 = 0.35;
const NIGHT_AT: f32 = 0.7;
const PHASE_WRAP_SECONDS: f32 = 3600.0;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum BackdropError {
    #[error("backdrop state is already borrowed")]
    Busy,
    #[error("mood progress must be finite, got {0}")]
    NonFiniteMood(f32),
}

/// City-skyline backdrop drawn behind the 2D frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropState {
    pub running: bool,
    pub mood_progress: f32,
    pub phase_seconds: f32,
}

impl Default for BackdropState {
    fn default() -> Self {
        Self {
            running: true,
            mood_progress: 0.0,
            phase_seconds: 0.0,
        }
    }
}

impl BackdropState {
    pub fn advance(&mut self, dt_seconds: f32) {
        if !self.running || !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return;
        }
        self.phase_seconds = (self.phase_seconds + dt_seconds) % PHASE_WRAP_SECONDS;
    }

    /// Top and bottom gradient colors, blended day -> sunset -> night by mood.
    pub fn sky_colors(&self) -> (Rgba, Rgba) {
        let mood = self.mood_progress.clamp(0.0, 1.0);
        if mood < SUNSET_AT {
            let t = mood / SUNSET_AT;
            lerp_pair(DAY_SKY, SUNSET_SKY, t)
        } else if mood < NIGHT_AT {
            let t = (mood - SUNSET_AT) / (NIGHT_AT - SUNSET_AT);
            lerp_pair(SUNSET_SKY, NIGHT_SKY, t)
        } else {
            NIGHT_SKY
        }
    }
}

/// Shared handle between the session (writer) and the renderer (reader).
#[derive(Debug, Clone, Default)]
pub struct BackdropHandle {
    state: Rc<RefCell<BackdropState>>,
}

impl BackdropHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_running(&self, running: bool) -> Result<(), BackdropError> {
        let mut state = self.state.try_borrow_mut().map_err(|_| BackdropError::Busy)?;
        state.running = running;
        Ok(())
    }

    pub fn set_mood_progress(&self, progress: f32) -> Result<(), BackdropError> {
        if !progress.is_finite() {
            return Err(BackdropError::NonFiniteMood(progress));
        }
        let mut state = self.state.try_borrow_mut().map_err(|_| BackdropError::Busy)?;
        state.mood_progress = progress.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn advance(&self, dt_seconds: f32) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.advance(dt_seconds);
        }
    }

    pub fn snapshot(&self) -> BackdropState {
        self.state
            .try_borrow()
            .map(|state| *state)
            .unwrap_or_default()
    }
}

fn lerp_pair(a: (Rgba, Rgba), b: (Rgba, Rgba), t: f32) -> (Rgba, Rgba) {
    (lerp_rgba(a.0, b.0, t), lerp_rgba(a.1, b.1, t))
}

pub(crate) fn lerp_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 4];
    for channel in 0..4 {
        let value = a[channel] as f32 + (b[channel] as f32 - a[channel] as f32) * t;
        out[channel] = value.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_reaches_night_palette_at_full_progress() {
        let state = BackdropState {
            mood_progress: 1.0,
            ..BackdropState::default()
        };
        assert_eq!(state.sky_colors(), NIGHT_SKY);
        assert_eq!(BackdropState::default().sky_colors(), DAY_SKY);
    }

    #[test]
    fn paused_backdrop_does_not_advance_phase() {
        let mut state = BackdropState {
            running: false,
            ..BackdropState::default()
        };
        state.advance(0.5);
        assert_eq!(state.phase_seconds, 0.0);
        state.running = true;
        state.advance(0.5);
        assert_eq!(state.phase_seconds, 0.5);
    }

    #[test]
    fn handle_rejects_non_finite_mood() {
        let handle = BackdropHandle::new();
        assert_eq!(
            handle.set_mood_progress(f32::NAN).map_err(|err| matches!(err, BackdropError::NonFiniteMood(_))),
            Err(true)
        );
        handle.set_mood_progress(2.0).expect("finite mood");
        assert_eq!(handle.snapshot().mood_progress, 1.0);
    }

    #[test]
    fn handle_reports_busy_while_borrowed() {
        let handle = BackdropHandle::new();
        let _guard = handle.state.borrow();
        assert_eq!(handle.set_running(false), Err(BackdropError::Busy));
    }

    #[test]
    fn cloned_handles_share_state() {
        let handle = BackdropHandle::new();
        let reader = handle.clone();
        handle.set_running(false).expect("set running");
        assert!(!reader.snapshot().running);
    }
}
