//! Session State Machine: owns [`GameState`], the Node Map and the Mission
//! Engine, routes pointer input to exactly one of them and mediates mode
//! transitions.

mod routing;
mod scene_impl;
mod view;

use std::collections::VecDeque;

use engine::{clamp_frame_delta, BackdropError, BackdropHandle, Frame, PointerEvent, SurfaceSize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dialog::{self, open_dialog, ChoiceEffect, Dialog};
use crate::economy::EconomyDelta;
use crate::mission::{DifficultyContext, MissionEngine, MissionResult};
use crate::persistence::{PersistenceError, SaveRecord, SaveStore};
use crate::shop::{self, PurchaseError, UpgradeKind};
use crate::state::{GameMode, GameState, Settings};
use crate::world_map::{Node, NodeId, NodeKind, NodeMap};

pub use routing::{route_for_mode, InputRouter, Route};
pub use view::{
    node_cards, HudView, MissionHud, NodeCard, Notice, ResultView, SessionView, Severity,
    WINDOW_TITLE_PREFIX,
};

/// Upper bound on one simulation step, in seconds.
pub const MAX_TICK_SECONDS: f32 = 0.033;
pub const NOTICE_CAPACITY: usize = 16;
pub const ARCHIVE_CAPACITY: usize = 32;
pub const TOAST_SECONDS: f32 = 2.0;
pub const CHAIN_HEAT: i32 = 15;
pub const NPC_VISIT_DELTA: EconomyDelta = EconomyDelta::new(10, 3, 0);
pub const MISSION_VISIT_DELTA: EconomyDelta = EconomyDelta::heat(8);
pub const AMBIENT_OFFLINE_NOTICE: &str = "3D OFFLINE - 2D WORLD ACTIVE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("NOT AVAILABLE IN {}.", .0.label())]
    WrongMode(GameMode),
    #[error("NO NODE SELECTED.")]
    NoNodeSelected,
    #[error("NODE {0} IS GONE.")]
    StaleNode(NodeId),
    #[error("UNKNOWN NODE {0}.")]
    UnknownNode(NodeId),
    #[error("{0} OFFERS NO MISSION.")]
    NodeOffersNoMission(NodeId),
    #[error("INSUFFICIENT FUNDS. NEED {needed} E$.")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("{0} IS MAXED.")]
    UpgradeMaxed(&'static str),
    #[error("NO DIALOG OPEN.")]
    NoDialog,
    #[error("NO CHOICE {}.", .0 + 1)]
    InvalidChoice(usize),
}

impl From<PurchaseError> for IntentError {
    fn from(error: PurchaseError) -> Self {
        match error {
            PurchaseError::Maxed(kind) => IntentError::UpgradeMaxed(kind.title()),
            PurchaseError::InsufficientFunds { cost, available } => IntentError::InsufficientFunds {
                needed: cost,
                available,
            },
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmbientError {
    #[error(transparent)]
    Backdrop(#[from] BackdropError),
    #[error("ambient renderer offline: {0}")]
    Offline(String),
}

/// Background ambience collaborator. Receives a run flag and the mood
/// scalar; never reports anything back except failure.
pub trait AmbientSink {
    fn set_running(&mut self, running: bool) -> Result<(), AmbientError>;
    fn set_mood_progress(&mut self, progress: f32) -> Result<(), AmbientError>;
}

impl AmbientSink for BackdropHandle {
    fn set_running(&mut self, running: bool) -> Result<(), AmbientError> {
        BackdropHandle::set_running(self, running).map_err(AmbientError::from)
    }

    fn set_mood_progress(&mut self, progress: f32) -> Result<(), AmbientError> {
        BackdropHandle::set_mood_progress(self, progress).map_err(AmbientError::from)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Toast {
    notice: Notice,
    remaining: f32,
}

pub struct Session {
    state: GameState,
    node_map: NodeMap,
    missions: MissionEngine,
    router: InputRouter,
    store: Box<dyn SaveStore>,
    ambient: Option<Box<dyn AmbientSink>>,
    notices: VecDeque<Notice>,
    toast: Option<Toast>,
    dialog: Option<Dialog>,
    archive: VecDeque<String>,
    last_result: Option<MissionResult>,
    mission_node: Option<NodeId>,
    bargain_node: Option<NodeId>,
    surface: SurfaceSize,
    surface_warned: bool,
    view: SessionView,
    ambient_mood_sent: Option<f32>,
}

impl Session {
    pub fn new(nodes: Vec<Node>, store: Box<dyn SaveStore>, rng_seed: u64) -> Self {
        let mut session = Self {
            state: GameState::default(),
            node_map: NodeMap::new(nodes),
            missions: MissionEngine::new(rng_seed),
            router: InputRouter::default(),
            store,
            ambient: None,
            notices: VecDeque::with_capacity(NOTICE_CAPACITY),
            toast: None,
            dialog: None,
            archive: VecDeque::with_capacity(ARCHIVE_CAPACITY),
            last_result: None,
            mission_node: None,
            bargain_node: None,
            surface: SurfaceSize::default(),
            surface_warned: false,
            view: SessionView::default(),
            ambient_mood_sent: None,
        };
        session.load_save();
        session.notify(Severity::Info, "SYSTEM READY. TAP ENTER.");
        session.refresh_view();
        session
    }

    pub fn with_ambient(mut self, ambient: Box<dyn AmbientSink>) -> Self {
        self.ambient = Some(ambient);
        self.ambient_mood_sent = None;
        self.sync_ambient();
        self.refresh_view();
        self
    }

    fn load_save(&mut self) {
        match self.store.load() {
            Ok(Some(record)) => {
                record.apply_to(&mut self.state);
                info!(
                    money = self.state.economy.money,
                    heat = self.state.economy.heat,
                    missions_done = self.state.progress.missions_done,
                    "save_loaded"
                );
            }
            Ok(None) => info!("save_missing"),
            Err(error) => {
                warn!(error = %error, "save_corrupt");
                self.state = GameState::default();
            }
        }
        self.state.enforce_invariants();
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn node_map(&self) -> &NodeMap {
        &self.node_map
    }

    pub fn missions(&self) -> &MissionEngine {
        &self.missions
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn last_result(&self) -> Option<&MissionResult> {
        self.last_result.as_ref()
    }

    pub fn archive(&self) -> impl Iterator<Item = &str> {
        self.archive.iter().map(String::as_str)
    }

    pub fn has_ambient(&self) -> bool {
        self.ambient.is_some()
    }

    pub fn view(&self) -> &SessionView {
        &self.view
    }

    /// Selected node re-resolved against the live node set.
    pub fn selected_node(&self) -> Option<&Node> {
        self.state
            .selected_node_id
            .as_ref()
            .and_then(|id| self.node_map.node(id))
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Returns `false` when already in `next`.
    pub fn set_mode(&mut self, next: GameMode) -> bool {
        let previous = self.state.mode;
        if previous == next {
            return false;
        }

        self.node_map.cancel_pointer();
        self.missions.cancel_pointer();
        self.router.suppress_pressed();
        if previous == GameMode::Mission {
            self.missions.abort();
        }
        if next != GameMode::World {
            self.dialog = None;
        }

        self.state.mode = next;
        self.state.paused = false;
        self.missions.set_paused(false);
        info!(from = previous.label(), to = next.label(), "mode_changed");

        self.sync_ambient();
        self.refresh_view();
        true
    }

    /// Returns `false` when the flag already had that value.
    pub fn set_paused(&mut self, paused: bool) -> bool {
        if self.state.paused == paused {
            return false;
        }
        self.state.paused = paused;
        self.missions.set_paused(paused);
        self.node_map.cancel_pointer();
        self.missions.cancel_pointer();
        self.router.suppress_pressed();
        info!(paused, mode = self.state.mode.label(), "pause_changed");

        self.sync_ambient();
        self.refresh_view();
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.state.paused);
        self.state.paused
    }

    pub fn set_surface_size(&mut self, surface: SurfaceSize) {
        self.surface = surface;
        if !surface.is_empty() {
            self.surface_warned = false;
        }
        self.node_map.set_surface_size(surface);
        self.missions.set_surface_size(surface);
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.state.settings = settings;
        info!(
            perf_mode = settings.perf_mode,
            ambient_enabled = settings.ambient_enabled,
            "settings_changed"
        );
        self.sync_ambient();
        self.persist("settings");
        self.refresh_view();
    }

    /// One simulation step. `dt_seconds` is clamped to [`MAX_TICK_SECONDS`];
    /// missed time is dropped. Returns the mission result on the tick a run
    /// finishes.
    pub fn tick(&mut self, dt_seconds: f32) -> Option<MissionResult> {
        self.tick_frame(dt_seconds, dt_seconds)
    }

    /// `wall_seconds` is the frame time before any clamping; it only feeds
    /// the trace speed check.
    fn tick_frame(&mut self, dt_seconds: f32, wall_seconds: f32) -> Option<MissionResult> {
        let dt = clamp_frame_delta(dt_seconds, MAX_TICK_SECONDS);
        self.state.enforce_invariants();
        self.tick_toast(dt);

        let mut finished = None;
        if !self.state.paused {
            match self.state.mode {
                GameMode::Title | GameMode::World => self.node_map.tick(dt),
                GameMode::Mission => {
                    finished = self.missions.tick_with_wall_time(dt, wall_seconds)
                }
                GameMode::Result => {}
            }
        }
        if let Some(result) = finished {
            self.complete_mission(result);
        }

        self.refresh_view();
        finished
    }

    fn complete_mission(&mut self, result: MissionResult) {
        let delta = result.economy_delta;
        self.state.apply_economy_delta(delta);
        let progress = &mut self.state.progress;
        progress.missions_done = progress.missions_done.saturating_add(1);
        if result.boss && result.success() {
            progress.district = progress.district.saturating_add(1);
        }
        self.state.enforce_invariants();

        info!(
            kind = result.kind.token(),
            success = result.success(),
            money = delta.money,
            heat = delta.heat,
            frags = delta.frags,
            missions_done = self.state.progress.missions_done,
            "mission_resolved"
        );
        if result.success() {
            self.notify(
                Severity::Info,
                format!("MISSION COMPLETE: +{} FRAGS", delta.frags),
            );
        } else {
            self.notify(
                Severity::Warning,
                format!("SIGNAL LOST: +{} FRAGS", delta.frags),
            );
        }

        self.last_result = Some(result);
        self.persist("mission_complete");
        self.set_mode(GameMode::Result);
    }

    pub fn pointer_event(&mut self, event: PointerEvent) {
        let route = self.router.route(self.state.mode, event);
        if self.state.paused {
            return;
        }
        match route {
            Route::NodeMap => {
                if let Some(id) = self.node_map.pointer_event(event) {
                    let _ = self.select_node(&id);
                }
            }
            Route::Mission => self.missions.pointer_event(event),
            Route::Drop => {}
        }
    }

    pub fn enter_world(&mut self) -> Result<(), IntentError> {
        let result = self.require_mode(GameMode::Title).map(|()| {
            self.set_mode(GameMode::World);
            self.notify(Severity::Info, "NIGHT CITY ONLINE. TAP A NODE.");
        });
        self.settle("enter_world", result)
    }

    pub fn select_node(&mut self, id: &NodeId) -> Result<(), IntentError> {
        let result = self.try_select_node(id);
        self.settle("select_node", result)
    }

    fn try_select_node(&mut self, id: &NodeId) -> Result<(), IntentError> {
        self.require_mode(GameMode::World)?;
        let node = self
            .node_map
            .node(id)
            .cloned()
            .ok_or_else(|| IntentError::UnknownNode(id.clone()))?;

        self.state.selected_node_id = Some(node.id.clone());
        let (delta, text) = match node.kind {
            NodeKind::Npc => (NPC_VISIT_DELTA, "NODE LOCKED."),
            NodeKind::Mission | NodeKind::Boss => (MISSION_VISIT_DELTA, "MISSION NODE LOCKED."),
        };
        self.state.apply_economy_delta(delta);
        self.dialog = Some(open_dialog(
            &node,
            self.state.progress.missions_done,
            self.state.progress.global_progress,
        ));
        info!(node = %node.id, kind = node.kind.badge(), "node_selected");
        self.notify(Severity::Info, text);
        Ok(())
    }

    pub fn cycle_selection(&mut self) -> Result<(), IntentError> {
        let next = self.require_mode(GameMode::World).and_then(|()| {
            let current = self.selected_node().map(|node| node.id.clone());
            self.node_map
                .next_node_after(current.as_ref())
                .ok_or(IntentError::NoNodeSelected)
        });
        match next {
            Ok(id) => self.select_node(&id),
            Err(error) => self.settle("cycle_selection", Err(error)),
        }
    }

    /// Starts the mission offered by the selected node.
    pub fn start_mission(&mut self) -> Result<(), IntentError> {
        let result = self.require_mode(GameMode::World).and_then(|()| {
            let id = self
                .state
                .selected_node_id
                .clone()
                .ok_or(IntentError::NoNodeSelected)?;
            self.start_mission_on(&id)
        });
        self.settle("start_mission", result)
    }

    fn start_mission_on(&mut self, id: &NodeId) -> Result<(), IntentError> {
        let node = self
            .node_map
            .node(id)
            .ok_or_else(|| IntentError::StaleNode(id.clone()))?;
        let kind = node
            .mission
            .filter(|_| node.kind.offers_mission())
            .ok_or_else(|| IntentError::NodeOffersNoMission(id.clone()))?;
        let boss = node.kind == NodeKind::Boss;

        let bargain = self.bargain_node.as_ref() == Some(id);
        self.bargain_node = None;
        let upgrades = self.state.upgrades;
        let context = DifficultyContext {
            buffer_level: upgrades.buffer,
            amplifier_level: upgrades.amplifier,
            pulse_available: upgrades.pulse > 0,
            boss,
            bargain,
        };

        self.set_mode(GameMode::Mission);
        self.missions.set_surface_size(self.surface);
        self.missions.start(kind, context);
        self.mission_node = Some(id.clone());
        self.last_result = None;
        self.notify(Severity::Info, format!("MISSION START: {}", kind.label()));
        self.refresh_view();
        Ok(())
    }

    /// Applies dialog option `index` (zero-based) of the open dialog.
    pub fn choose(&mut self, index: usize) -> Result<(), IntentError> {
        let result = self.try_choose(index);
        self.settle("choose", result)
    }

    fn try_choose(&mut self, index: usize) -> Result<(), IntentError> {
        self.require_mode(GameMode::World)?;
        let dialog = self.dialog.as_ref().ok_or(IntentError::NoDialog)?;
        let option = dialog
            .option(index)
            .ok_or(IntentError::InvalidChoice(index))?;
        let node_id = dialog.node_id.clone();
        let speaker = dialog.speaker.clone();
        if self.node_map.node(&node_id).is_none() {
            self.dialog = None;
            return Err(IntentError::StaleNode(node_id));
        }

        match dialog::resolve_choice(option.choice, &self.state.economy) {
            ChoiceEffect::StartMission => {
                self.push_archive(dialog::archive_line(&speaker, option.label, "LINK ESTABLISHED"));
                self.state.selected_node_id = Some(node_id.clone());
                self.start_mission_on(&node_id)
            }
            ChoiceEffect::Apply {
                delta,
                notice,
                bargain,
            } => {
                self.state.apply_economy_delta(delta);
                if bargain {
                    self.bargain_node = Some(node_id);
                }
                self.push_archive(dialog::archive_line(&speaker, option.label, notice));
                self.notify(Severity::Info, notice);
                self.persist("dialog_choice");
                Ok(())
            }
            ChoiceEffect::Insufficient { needed } => Err(IntentError::InsufficientFunds {
                needed,
                available: self.state.economy.money,
            }),
        }
    }

    pub fn buy_upgrade(&mut self, kind: UpgradeKind) -> Result<(), IntentError> {
        let result = self.try_buy_upgrade(kind);
        self.settle("buy_upgrade", result)
    }

    fn try_buy_upgrade(&mut self, kind: UpgradeKind) -> Result<(), IntentError> {
        if self.state.mode == GameMode::Mission {
            return Err(IntentError::WrongMode(GameMode::Mission));
        }
        let cost = shop::purchase(&mut self.state.upgrades, &mut self.state.economy, kind)?;
        info!(
            upgrade = kind.title(),
            level = self.state.upgrades.level(kind),
            cost,
            "upgrade_purchased"
        );
        self.notify(Severity::Info, format!("UPGRADE INSTALLED: {}", kind.title()));
        self.persist("upgrade");
        Ok(())
    }

    /// From RESULT: raise heat and rerun the node that was just played.
    pub fn chain_mission(&mut self) -> Result<(), IntentError> {
        let result = self.require_mode(GameMode::Result).and_then(|()| {
            let id = self
                .mission_node
                .clone()
                .ok_or(IntentError::NoNodeSelected)?;
            if self.node_map.node(&id).is_none() {
                return Err(IntentError::StaleNode(id));
            }
            self.state.apply_economy_delta(EconomyDelta::heat(CHAIN_HEAT));
            self.notify(Severity::Warning, "CHAINING... HEAT SPIKE DETECTED.");
            self.start_mission_on(&id)
        });
        self.settle("chain_mission", result)
    }

    pub fn back_to_world(&mut self) -> Result<(), IntentError> {
        let result = self.require_mode(GameMode::Result).map(|()| {
            self.set_mode(GameMode::World);
            self.notify(Severity::Info, "Back in the alley.");
        });
        self.settle("back_to_world", result)
    }

    /// Steps one level out: dialog, then mode.
    pub fn back(&mut self) -> Result<(), IntentError> {
        match self.state.mode {
            GameMode::Result => self.back_to_world(),
            GameMode::Mission => {
                self.set_mode(GameMode::World);
                self.notify(Severity::Warning, "MISSION ABORTED.");
                Ok(())
            }
            GameMode::World if self.dialog.is_some() => {
                self.dialog = None;
                self.refresh_view();
                Ok(())
            }
            GameMode::World => {
                self.set_mode(GameMode::Title);
                Ok(())
            }
            GameMode::Title => Ok(()),
        }
    }

    /// Enter: the primary action of the current mode.
    pub fn confirm(&mut self) -> Result<(), IntentError> {
        match self.state.mode {
            GameMode::Title => self.enter_world(),
            GameMode::World => self.start_mission(),
            GameMode::Result => self.back_to_world(),
            GameMode::Mission => self.settle("confirm", Err(IntentError::WrongMode(GameMode::Mission))),
        }
    }

    pub fn toggle_focus(&mut self) -> bool {
        let focus = self.node_map.toggle_focus();
        self.notify(Severity::Info, if focus { "FOCUS ON." } else { "FOCUS OFF." });
        focus
    }

    pub fn save_now(&mut self) -> Result<(), PersistenceError> {
        let record = SaveRecord::from_state(&self.state);
        match self.store.save(&record) {
            Ok(()) => {
                info!(reason = "manual", "save_written");
                self.notify(Severity::Info, "GAME SAVED.");
                Ok(())
            }
            Err(error) => {
                warn!(reason = "manual", error = %error, "save_failed");
                self.notify(Severity::Warning, "SAVE FAILED.");
                Err(error)
            }
        }
    }

    /// Wipes the stored record and returns to a fresh TITLE session.
    pub fn reset_save(&mut self) {
        self.set_mode(GameMode::Title);
        self.set_paused(false);
        if let Err(error) = self.store.clear() {
            warn!(error = %error, "save_clear_failed");
        }
        self.missions.reset();
        self.node_map.cancel_pointer();
        self.state = GameState::default();
        self.state.enforce_invariants();
        self.dialog = None;
        self.archive.clear();
        self.last_result = None;
        self.mission_node = None;
        self.bargain_node = None;
        info!("save_reset");
        self.notify(Severity::Warning, "SAVE PURGED.");
        self.sync_ambient();
        self.refresh_view();
    }

    /// Draws the active subsystem. Runs whether or not the session is paused.
    /// Without a surface nothing is drawn and one warning is raised until a
    /// surface arrives.
    pub fn render(&mut self, frame: &mut Frame) {
        if self.surface.is_empty() {
            debug!(mode = self.state.mode.label(), "render_skipped_missing_surface");
            if !self.surface_warned {
                self.surface_warned = true;
                self.notify(Severity::Warning, "DISPLAY OFFLINE. WAITING FOR SURFACE.");
                self.refresh_view();
            }
            return;
        }
        match self.state.mode {
            GameMode::Title | GameMode::World | GameMode::Result => {
                let selected = self.selected_node().map(|node| &node.id);
                self.node_map
                    .render(frame, selected, self.state.settings.perf_mode);
            }
            GameMode::Mission => self.missions.render(frame),
        }
    }

    fn require_mode(&self, expected: GameMode) -> Result<(), IntentError> {
        if self.state.mode == expected {
            Ok(())
        } else {
            Err(IntentError::WrongMode(self.state.mode))
        }
    }

    /// Logs and surfaces a rejected intent; passes the result through.
    fn settle(
        &mut self,
        intent: &'static str,
        result: Result<(), IntentError>,
    ) -> Result<(), IntentError> {
        if let Err(error) = &result {
            warn!(intent, mode = self.state.mode.label(), reason = %error, "intent_rejected");
            self.notify(Severity::Warning, error.to_string());
        }
        self.refresh_view();
        result
    }

    fn persist(&mut self, reason: &'static str) {
        let record = SaveRecord::from_state(&self.state);
        match self.store.save(&record) {
            Ok(()) => debug!(reason, "save_written"),
            Err(error) => warn!(reason, error = %error, "save_failed"),
        }
    }

    fn notify(&mut self, severity: Severity, text: impl Into<String>) {
        let notice = Notice {
            text: text.into(),
            severity,
        };
        if self.notices.len() >= NOTICE_CAPACITY {
            self.notices.pop_front();
        }
        self.notices.push_back(notice.clone());
        self.toast = Some(Toast {
            notice,
            remaining: TOAST_SECONDS,
        });
    }

    fn tick_toast(&mut self, dt: f32) {
        if let Some(toast) = self.toast.as_mut() {
            toast.remaining -= dt;
            if toast.remaining <= 0.0 {
                self.toast = None;
            }
        }
    }

    fn push_archive(&mut self, line: String) {
        if self.archive.len() >= ARCHIVE_CAPACITY {
            self.archive.pop_front();
        }
        self.archive.push_back(line);
    }

    fn ambient_running(&self) -> bool {
        self.state.mode != GameMode::Mission
            && !self.state.paused
            && self.state.settings.ambient_enabled
    }

    /// Pushes the run flag and, when it moved, the mood scalar. A failing
    /// collaborator is detached and gameplay continues without it.
    fn sync_ambient(&mut self) {
        let running = self.ambient_running();
        let mood = self.state.progress.global_progress;
        let mood_changed = self.ambient_mood_sent != Some(mood);
        let Some(ambient) = self.ambient.as_mut() else {
            return;
        };

        let outcome = ambient.set_running(running).and_then(|()| {
            if mood_changed {
                ambient.set_mood_progress(mood)
            } else {
                Ok(())
            }
        });
        match outcome {
            Ok(()) => self.ambient_mood_sent = Some(mood),
            Err(error) => {
                warn!(error = %error, "ambient_failed");
                self.ambient = None;
                self.ambient_mood_sent = None;
                self.notify(Severity::Warning, AMBIENT_OFFLINE_NOTICE);
            }
        }
    }

    fn refresh_view(&mut self) {
        let selected = self.selected_node().map(|node| node.id.clone());
        self.view = SessionView {
            mode: self.state.mode,
            paused: self.state.paused,
            hud: HudView::from_state(&self.state),
            nodes: node_cards(&self.node_map, selected.as_ref()),
            dialog: self.dialog.clone(),
            mission: MissionHud::from_engine(&self.missions),
            result: self.last_result.as_ref().map(ResultView::from_result),
            shop: shop::offers(&self.state.upgrades, &self.state.economy),
            toast: self.toast.as_ref().map(|toast| toast.notice.clone()),
            archive: self.archive.iter().cloned().collect(),
        };
    }
}
