use serde::{Deserialize, Serialize};

use crate::economy::EconomyDelta;
use crate::world_map::NodeId;

/// Missions needed before global progress reaches 1.0.
pub const PROGRESS_DIVISOR: u32 = 12;
pub const HEAT_MAX: u32 = 100;
pub const HEAT_WARNING_ABOVE: u32 = 80;
const SUNSET_FROM: f32 = 0.35;
const NIGHT_FROM: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    Title,
    World,
    Mission,
    Result,
}

impl GameMode {
    pub fn label(self) -> &'static str {
        match self {
            GameMode::Title => "TITLE",
            GameMode::World => "WORLD",
            GameMode::Mission => "MISSION",
            GameMode::Result => "RESULT",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Economy {
    pub money: u64,
    pub heat: u32,
    pub frags: u64,
}

impl Economy {
    /// Raw deltas saturate at zero; heat is clamped into `[0, HEAT_MAX]`.
    pub fn apply_delta(&mut self, delta: EconomyDelta) {
        self.money = self.money.saturating_add_signed(delta.money);
        self.frags = self.frags.saturating_add_signed(delta.frags);
        self.heat = self.heat.saturating_add_signed(delta.heat).min(HEAT_MAX);
    }

    pub fn clamp(&mut self) {
        self.heat = self.heat.min(HEAT_MAX);
    }

    pub fn heat_warning(&self) -> bool {
        self.heat > HEAT_WARNING_ABOVE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub missions_done: u32,
    pub district: u32,
    #[serde(skip)]
    pub global_progress: f32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            missions_done: 0,
            district: 1,
            global_progress: 0.0,
        }
    }
}

impl Progress {
    pub fn recompute(&mut self) {
        self.district = self.district.max(1);
        let ratio = self.missions_done as f32 / PROGRESS_DIVISOR as f32;
        self.global_progress = if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn time_label(&self) -> &'static str {
        let p = self.global_progress;
        if p > NIGHT_FROM {
            "NIGHT"
        } else if p > SUNSET_FROM {
            "SUNSET"
        } else {
            "DAY"
        }
    }

    pub fn district_label(&self) -> String {
        format!("Sector-{:02}", self.district)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub buffer: u32,
    pub amplifier: u32,
    pub pulse: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Skips the world grid.
    pub perf_mode: bool,
    pub ambient_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            perf_mode: false,
            ambient_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub mode: GameMode,
    pub paused: bool,
    pub economy: Economy,
    pub progress: Progress,
    pub upgrades: Upgrades,
    pub settings: Settings,
    /// Weak reference into the node map; re-resolve before every use.
    pub selected_node_id: Option<NodeId>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            mode: GameMode::Title,
            paused: false,
            economy: Economy::default(),
            progress: Progress::default(),
            upgrades: Upgrades::default(),
            settings: Settings::default(),
            selected_node_id: None,
        }
    }
}

impl GameState {
    pub fn apply_economy_delta(&mut self, delta: EconomyDelta) {
        self.economy.apply_delta(delta);
        self.enforce_invariants();
    }

    pub fn enforce_invariants(&mut self) {
        self.economy.clamp();
        self.upgrades.clamp_levels();
        self.progress.recompute();
    }
}
