//! Neon Alley game core: a four-mode session (TITLE, WORLD, MISSION,
//! RESULT) over a pannable node map, three arcade mission variants, a pure
//! payout resolver and a flat JSON save record.

pub mod config;
pub mod dialog;
pub mod economy;
pub mod mission;
pub mod persistence;
pub mod session;
pub mod shop;
pub mod state;
pub mod world_map;

pub use config::GameConfig;
pub use economy::{resolve, EconomyDelta, MissionOutcome, PayoutModifiers};
pub use mission::{DifficultyContext, MissionEngine, MissionKind, MissionPhase, MissionResult};
pub use persistence::{JsonFileStore, MemoryStore, PersistenceError, SaveRecord, SaveStore};
pub use session::{AmbientError, AmbientSink, IntentError, Notice, Session, SessionView, Severity};
pub use state::{Economy, GameMode, GameState, Progress, Settings, Upgrades};
pub use world_map::{default_nodes, nodes_from_defs, Node, NodeId, NodeKind, NodeMap};
