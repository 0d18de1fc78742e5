//! Read-only projection handed to presentation once per tick.

use std::fmt::Write as _;

use crate::dialog::Dialog;
use crate::economy::EconomyDelta;
use crate::mission::{MissionEngine, MissionKind, MissionResult};
use crate::shop::ShopOffer;
use crate::state::{GameMode, GameState};
use crate::world_map::{NodeId, NodeMap};

pub const WINDOW_TITLE_PREFIX: &str = "Neon Alley";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudView {
    pub money: u64,
    pub heat: u32,
    pub frags: u64,
    pub missions_done: u32,
    pub district_label: String,
    pub time_label: &'static str,
    pub heat_warning: bool,
}

impl HudView {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            money: state.economy.money,
            heat: state.economy.heat,
            frags: state.economy.frags,
            missions_done: state.progress.missions_done,
            district_label: state.progress.district_label(),
            time_label: state.progress.time_label(),
            heat_warning: state.economy.heat_warning(),
        }
    }
}

impl Default for HudView {
    fn default() -> Self {
        Self::from_state(&GameState::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCard {
    pub id: NodeId,
    pub name: String,
    pub tag: String,
    pub badge: &'static str,
    pub selected: bool,
}

pub fn node_cards(node_map: &NodeMap, selected: Option<&NodeId>) -> Vec<NodeCard> {
    node_map
        .nodes()
        .iter()
        .filter(|node| node.alive)
        .map(|node| NodeCard {
            id: node.id.clone(),
            name: node.name.clone(),
            tag: node.tag.clone(),
            badge: node.kind.badge(),
            selected: selected == Some(&node.id),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionHud {
    pub label: &'static str,
    pub progress: String,
    pub time_left: f32,
    pub score: u32,
    pub hold_power: f32,
    pub ability: &'static str,
}

impl MissionHud {
    pub fn from_engine(missions: &MissionEngine) -> Option<Self> {
        let run = missions.run()?;
        Some(Self {
            label: run.kind.label(),
            progress: run.progress_label(),
            time_left: run.time_left(),
            score: run.score,
            hold_power: missions.hold_power(),
            ability: missions.pulse_state().label(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub kind: MissionKind,
    pub success: bool,
    pub boss: bool,
    pub score: u32,
    pub delta: EconomyDelta,
}

impl ResultView {
    pub fn from_result(result: &MissionResult) -> Self {
        Self {
            kind: result.kind,
            success: result.success(),
            boss: result.boss,
            score: result.summary.score,
            delta: result.economy_delta,
        }
    }

    pub fn headline(&self) -> &'static str {
        if self.success {
            "MISSION COMPLETE"
        } else {
            "SIGNAL LOST"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub mode: GameMode,
    pub paused: bool,
    pub hud: HudView,
    pub nodes: Vec<NodeCard>,
    pub dialog: Option<Dialog>,
    pub mission: Option<MissionHud>,
    pub result: Option<ResultView>,
    pub shop: Vec<ShopOffer>,
    pub toast: Option<Notice>,
    pub archive: Vec<String>,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            mode: GameMode::Title,
            paused: false,
            hud: HudView::default(),
            nodes: Vec::new(),
            dialog: None,
            mission: None,
            result: None,
            shop: Vec::new(),
            toast: None,
            archive: Vec::new(),
        }
    }
}

impl SessionView {
    /// One-line summary for the window title bar.
    pub fn title_line(&self) -> String {
        let hud = &self.hud;
        let mut line = format!(
            "{WINDOW_TITLE_PREFIX} | {} | E$ {} | HEAT {}%{} | FRAGS {} | {} {}",
            self.mode.label(),
            hud.money,
            hud.heat,
            if hud.heat_warning { "!" } else { "" },
            hud.frags,
            hud.district_label,
            hud.time_label,
        );
        match self.mode {
            GameMode::Mission => {
                if let Some(mission) = &self.mission {
                    let _ = write!(
                        line,
                        " | {} {} {:.1}s SCORE {} {}",
                        mission.label,
                        mission.progress,
                        mission.time_left,
                        mission.score,
                        mission.ability
                    );
                }
            }
            GameMode::Result => {
                if let Some(result) = &self.result {
                    let _ = write!(
                        line,
                        " | {} +{} E$ +{} FRAGS",
                        result.headline(),
                        result.delta.money,
                        result.delta.frags
                    );
                }
            }
            GameMode::World => {
                if let Some(dialog) = &self.dialog {
                    let _ = write!(line, " | {}", dialog.speaker);
                    for (index, option) in dialog.choices.iter().enumerate() {
                        let _ = write!(line, " [{}] {}", index + 1, option.label);
                    }
                }
            }
            GameMode::Title => {}
        }
        if self.paused {
            line.push_str(" | PAUSED");
        }
        if let Some(toast) = &self.toast {
            let _ = write!(line, " | {}", toast.text);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_line_summarises_hud_and_flags() {
        let mut view = SessionView {
            mode: GameMode::World,
            paused: true,
            toast: Some(Notice {
                text: "NODE LOCKED.".to_string(),
                severity: Severity::Info,
            }),
            ..SessionView::default()
        };
        view.hud.money = 120;
        view.hud.heat = 85;
        view.hud.heat_warning = true;
        assert_eq!(
            view.title_line(),
            "Neon Alley | WORLD | E$ 120 | HEAT 85%! | FRAGS 0 | Sector-01 DAY | PAUSED | NODE LOCKED."
        );
    }

    #[test]
    fn default_view_starts_on_title() {
        let view = SessionView::default();
        assert_eq!(view.mode, GameMode::Title);
        assert_eq!(
            view.title_line(),
            "Neon Alley | TITLE | E$ 0 | HEAT 0% | FRAGS 0 | Sector-01 DAY"
        );
    }
}
