use std::f32::consts::TAU;
use std::fmt;

use engine::{
    screen_to_world, world_to_screen, Camera2D, Frame, NodeDef, PointerCapture, PointerEvent,
    PointerId, PointerPhase, Rgba, SurfaceSize, Vec2, CAMERA_ZOOM_DEFAULT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::mission::MissionKind;

pub const NODE_RADIUS: f32 = 16.0;
pub const TOUCH_TOLERANCE: f32 = 12.0;
/// Manhattan screen distance below which a gesture counts as a tap.
pub const TAP_THRESHOLD_PX: f32 = 10.0;
pub const FOCUS_ZOOM: f32 = 1.6;
const GRID_STEP_WORLD: f32 = 60.0;
const GRID_COLOR: Rgba = [0, 243, 255, 26];
const NPC_COLOR: Rgba = [255, 0, 124, 140];
const MISSION_COLOR: Rgba = [0, 243, 255, 140];
const BOSS_COLOR: Rgba = [255, 196, 0, 160];
const SELECTED_COLOR: Rgba = [255, 255, 255, 255];
const SELECTION_RING_COLOR: Rgba = [255, 255, 255, 120];
const LINK_COLOR: Rgba = [0, 243, 255, 48];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Npc,
    Mission,
    Boss,
}

impl NodeKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "npc" => Some(NodeKind::Npc),
            "mission" => Some(NodeKind::Mission),
            "boss" => Some(NodeKind::Boss),
            _ => None,
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            NodeKind::Npc => "NPC",
            NodeKind::Mission => "MISSION",
            NodeKind::Boss => "BOSS",
        }
    }

    pub fn offers_mission(self) -> bool {
        matches!(self, NodeKind::Mission | NodeKind::Boss)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub speaker: String,
    pub tag: String,
    pub position: Vec2,
    pub mission: Option<MissionKind>,
    pub alive: bool,
}

impl Node {
    pub fn hit_radius(&self) -> f32 {
        NODE_RADIUS + TOUCH_TOLERANCE
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeBuildError {
    #[error("node '{id}' has unknown kind '{kind}'")]
    UnknownKind { id: String, kind: String },
    #[error("node '{id}' names unknown mission kind '{mission}'")]
    UnknownMission { id: String, mission: String },
    #[error("{kind} node '{id}' must name a mission kind")]
    MissionMissing { id: String, kind: &'static str },
}

pub fn nodes_from_defs(defs: &[NodeDef]) -> Result<Vec<Node>, NodeBuildError> {
    defs.iter()
        .map(|def| {
            let kind = NodeKind::from_token(&def.kind).ok_or_else(|| NodeBuildError::UnknownKind {
                id: def.id.clone(),
                kind: def.kind.clone(),
            })?;
            let mission = match def.mission.as_deref() {
                Some(token) => Some(MissionKind::from_token(token).ok_or_else(|| {
                    NodeBuildError::UnknownMission {
                        id: def.id.clone(),
                        mission: token.to_string(),
                    }
                })?),
                None => None,
            };
            if kind.offers_mission() && mission.is_none() {
                return Err(NodeBuildError::MissionMissing {
                    id: def.id.clone(),
                    kind: kind.badge(),
                });
            }
            Ok(Node {
                id: NodeId::new(def.id.clone()),
                kind,
                name: def.name.clone(),
                speaker: def.speaker.clone(),
                tag: def.tag.clone(),
                position: Vec2::new(def.x, def.y),
                mission,
                alive: true,
            })
        })
        .collect()
}

/// Built-in district used when content cannot be loaded.
pub fn default_nodes() -> Vec<Node> {
    let base: [(&str, NodeKind, &str, &str, &str, Option<MissionKind>); 4] = [
        ("A1", NodeKind::Npc, "Neon Gate", "NYX", "Clean start. Too clean.", None),
        (
            "M1",
            NodeKind::Mission,
            "Cache Pop",
            "NYX",
            "Pop caches. Stay sharp.",
            Some(MissionKind::CachePop),
        ),
        ("B1", NodeKind::Npc, "Alley Market", "GHOST", "Dirty deals. Quick money.", None),
        (
            "M2",
            NodeKind::Mission,
            "Relay Tap",
            "GHOST",
            "Trace the signal.",
            Some(MissionKind::Trace),
        ),
    ];
    let mut nodes: Vec<Node> = base
        .into_iter()
        .enumerate()
        .map(|(index, (id, kind, name, speaker, tag, mission))| {
            let i = index as f32;
            let column = if index % 2 == 1 { 180.0 } else { -180.0 };
            Node {
                id: NodeId::new(id),
                kind,
                name: name.to_string(),
                speaker: speaker.to_string(),
                tag: tag.to_string(),
                position: Vec2::new(column + i * 20.0, -120.0 + i * 120.0),
                mission,
                alive: true,
            }
        })
        .collect();
    nodes.push(Node {
        id: NodeId::new("X1"),
        kind: NodeKind::Boss,
        name: "Spire Vault".to_string(),
        speaker: "ARASAKA".to_string(),
        tag: "Corporate ice. Hold your nerve.".to_string(),
        position: Vec2::new(-100.0, 360.0),
        mission: Some(MissionKind::Burst),
        alive: true,
    });
    nodes
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Gesture {
    pointer_id: PointerId,
    last: Vec2,
    drag_distance: f32,
}

/// World navigation: camera pan on drag, node selection on tap.
#[derive(Debug, Clone)]
pub struct NodeMap {
    nodes: Vec<Node>,
    camera: Camera2D,
    capture: PointerCapture,
    gesture: Option<Gesture>,
    focus: bool,
    surface: SurfaceSize,
    pulse_phase: f32,
}

impl NodeMap {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            camera: Camera2D::default(),
            capture: PointerCapture::default(),
            gesture: None,
            focus: false,
            surface: SurfaceSize::default(),
            pulse_phase: 0.0,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Resolves an id against the live node set.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.alive && &node.id == id)
    }

    pub fn camera(&self) -> Camera2D {
        self.camera
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn set_surface_size(&mut self, surface: SurfaceSize) {
        self.surface = surface;
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn focus_enabled(&self) -> bool {
        self.focus
    }

    pub fn screen_position(&self, id: &NodeId) -> Option<Vec2> {
        self.node(id)
            .map(|node| world_to_screen(node.position, &self.camera, self.surface))
    }

    /// Returns the id of a tapped node when a gesture ends as a tap.
    pub fn pointer_event(&mut self, event: PointerEvent) -> Option<NodeId> {
        match event.phase {
            PointerPhase::Down => {
                if !self.capture.try_claim(event.pointer_id) {
                    debug!(pointer = event.pointer_id.0, "world_pointer_refused");
                    return None;
                }
                self.gesture = Some(Gesture {
                    pointer_id: event.pointer_id,
                    last: event.position,
                    drag_distance: 0.0,
                });
                None
            }
            PointerPhase::Move => {
                let gesture = self
                    .gesture
                    .as_mut()
                    .filter(|gesture| gesture.pointer_id == event.pointer_id)?;
                let delta = event.position - gesture.last;
                if !delta.is_finite() {
                    return None;
                }
                gesture.drag_distance += delta.manhattan();
                gesture.last = event.position;
                self.camera.pan_by_screen_delta(delta);
                None
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                if !self.capture.release(event.pointer_id) {
                    return None;
                }
                let gesture = self.gesture.take()?;
                if gesture.drag_distance < TAP_THRESHOLD_PX {
                    self.hit_test(event.position)
                } else {
                    None
                }
            }
        }
    }

    /// Nearest live node whose hit radius contains the screen point.
    pub fn hit_test(&self, screen: Vec2) -> Option<NodeId> {
        if !screen.is_finite() {
            return None;
        }
        let world = screen_to_world(screen, &self.camera, self.surface);
        self.nodes
            .iter()
            .filter(|node| node.alive)
            .map(|node| (node, node.position.distance(world)))
            .filter(|(node, distance)| *distance <= node.hit_radius())
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node.id.clone())
    }

    pub fn cancel_pointer(&mut self) {
        self.gesture = None;
        self.capture.force_release();
    }

    pub fn toggle_focus(&mut self) -> bool {
        self.focus = !self.focus;
        let zoom = if self.focus {
            FOCUS_ZOOM
        } else {
            CAMERA_ZOOM_DEFAULT
        };
        self.camera.set_zoom_clamped(zoom);
        self.focus
    }

    /// Next live node in declaration order, wrapping around.
    pub fn next_node_after(&self, current: Option<&NodeId>) -> Option<NodeId> {
        let live: Vec<&Node> = self.nodes.iter().filter(|node| node.alive).collect();
        if live.is_empty() {
            return None;
        }
        let next_index = current
            .and_then(|id| live.iter().position(|node| &node.id == id))
            .map_or(0, |index| (index + 1) % live.len());
        Some(live[next_index].id.clone())
    }

    pub fn tick(&mut self, dt_seconds: f32) {
        if dt_seconds.is_finite() && dt_seconds > 0.0 {
            self.pulse_phase = (self.pulse_phase + dt_seconds) % 1.0;
        }
    }

    pub fn render(&self, frame: &mut Frame, selected: Option<&NodeId>, perf_mode: bool) {
        let zoom = self.camera.effective_zoom();
        if !perf_mode {
            self.render_grid(frame, zoom);
        }

        let live: Vec<&Node> = self.nodes.iter().filter(|node| node.alive).collect();
        for pair in live.windows(2) {
            let from = world_to_screen(pair[0].position, &self.camera, self.surface);
            let to = world_to_screen(pair[1].position, &self.camera, self.surface);
            frame.line(from, to, LINK_COLOR);
        }

        for node in live {
            let center = world_to_screen(node.position, &self.camera, self.surface);
            let is_selected = selected == Some(&node.id);
            let color = if is_selected {
                SELECTED_COLOR
            } else {
                match node.kind {
                    NodeKind::Npc => NPC_COLOR,
                    NodeKind::Mission => MISSION_COLOR,
                    NodeKind::Boss => BOSS_COLOR,
                }
            };
            frame.fill_circle(center, NODE_RADIUS * zoom, color);
            if is_selected {
                let pulse = 1.0 + 0.15 * (self.pulse_phase * TAU).sin();
                frame.ring(
                    center,
                    node.hit_radius() * zoom * pulse,
                    2.0,
                    SELECTION_RING_COLOR,
                );
            }
        }
    }

    fn render_grid(&self, frame: &mut Frame, zoom: f32) {
        let width = self.surface.width as f32;
        let height = self.surface.height as f32;
        let step = GRID_STEP_WORLD * zoom;
        if step < 4.0 {
            return;
        }
        let origin = world_to_screen(Vec2::ZERO, &self.camera, self.surface);
        let mut x = origin.x.rem_euclid(step);
        while x < width {
            frame.line(Vec2::new(x, 0.0), Vec2::new(x, height), GRID_COLOR);
            x += step;
        }
        let mut y = origin.y.rem_euclid(step);
        while y < height {
            frame.line(Vec2::new(0.0, y), Vec2::new(width, y), GRID_COLOR);
            y += step;
        }
    }
}
