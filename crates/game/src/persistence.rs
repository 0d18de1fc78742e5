//! Save gateway. One JSON document per store; last write wins.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use engine::write_text_atomic;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::state::{Economy, GameState, Progress, Settings, Upgrades};
use crate::world_map::NodeId;

/// Storage key; also the save file stem.
pub const SAVE_KEY: &str = "neon_alley_v1";

/// Persisted subset of [`GameState`]. Mode, pause, camera and any active
/// mission are runtime-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub economy: Economy,
    pub progress: Progress,
    pub upgrades: Upgrades,
    pub selected_node_id: Option<NodeId>,
    pub settings: Settings,
}

impl SaveRecord {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            economy: state.economy,
            progress: state.progress,
            upgrades: state.upgrades,
            selected_node_id: state.selected_node_id.clone(),
            settings: state.settings,
        }
    }

    /// Overwrites persisted fields only, then re-derives clamps.
    pub fn apply_to(&self, state: &mut GameState) {
        state.economy = self.economy;
        state.progress = self.progress;
        state.upgrades = self.upgrades;
        state.selected_node_id = self.selected_node_id.clone();
        state.settings = self.settings;
        state.enforce_invariants();
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("read save '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write save '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("remove save '{path}': {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("encode save json: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("corrupt save: {0}")]
    Corrupt(String),
}

pub fn encode_save(record: &SaveRecord) -> Result<String, PersistenceError> {
    serde_json::to_string_pretty(record).map_err(PersistenceError::Encode)
}

/// Lenient decode: the document must be a JSON object, but each section
/// that fails to decode falls back to its default on its own.
pub fn decode_save(raw: &str) -> Result<SaveRecord, PersistenceError> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|error| PersistenceError::Corrupt(format!("parse save json: {error}")))?;
    let Value::Object(sections) = document else {
        return Err(PersistenceError::Corrupt(
            "save document is not an object".to_string(),
        ));
    };

    Ok(SaveRecord {
        economy: decode_section(&sections, "economy"),
        progress: decode_section(&sections, "progress"),
        upgrades: decode_section(&sections, "upgrades"),
        selected_node_id: decode_section(&sections, "selected_node_id"),
        settings: decode_section(&sections, "settings"),
    })
}

fn decode_section<T>(sections: &Map<String, Value>, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(value) = sections.get(key) else {
        return T::default();
    };
    match serde_path_to_error::deserialize::<_, T>(value.clone()) {
        Ok(section) => section,
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                warn!(section = key, error = %source, "save_section_invalid");
            } else {
                warn!(section = key, at = %path, error = %source, "save_section_invalid");
            }
            T::default()
        }
    }
}

pub trait SaveStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&mut self) -> Result<Option<SaveRecord>, PersistenceError>;
    fn save(&mut self, record: &SaveRecord) -> Result<(), PersistenceError>;
    fn clear(&mut self) -> Result<(), PersistenceError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<SaveRecord>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        decode_save(&raw).map(Some)
    }

    fn save(&mut self, record: &SaveRecord) -> Result<(), PersistenceError> {
        let json = encode_save(record)?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write_text_atomic(&self.path, &json).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[derive(Debug, Default)]
struct MemorySlot {
    blob: Option<String>,
    save_count: usize,
    fail_writes: bool,
}

/// In-process store. Clones share one slot, so a test can keep a handle
/// while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<MemorySlot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        let store = Self::default();
        store.slot.borrow_mut().blob = Some(blob.into());
        store
    }

    pub fn blob(&self) -> Option<String> {
        self.slot.borrow().blob.clone()
    }

    pub fn save_count(&self) -> usize {
        self.slot.borrow().save_count
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.slot.borrow_mut().fail_writes = fail;
    }
}

impl SaveStore for MemoryStore {
    fn load(&mut self) -> Result<Option<SaveRecord>, PersistenceError> {
        match self.slot.borrow().blob.as_deref() {
            Some(raw) => decode_save(raw).map(Some),
            None => Ok(None),
        }
    }

    fn save(&mut self, record: &SaveRecord) -> Result<(), PersistenceError> {
        let json = encode_save(record)?;
        let mut slot = self.slot.borrow_mut();
        if slot.fail_writes {
            return Err(PersistenceError::Write {
                path: PathBuf::from(SAVE_KEY),
                source: io::Error::new(io::ErrorKind::Other, "memory store rejects writes"),
            });
        }
        slot.blob = Some(json);
        slot.save_count += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        self.slot.borrow_mut().blob = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> SaveRecord {
        SaveRecord {
            economy: Economy {
                money: 420,
                heat: 37,
                frags: 9,
            },
            progress: Progress {
                missions_done: 5,
                district: 2,
                global_progress: 0.0,
            },
            upgrades: Upgrades {
                buffer: 2,
                amplifier: 1,
                pulse: 1,
            },
            selected_node_id: Some(NodeId::new("M2")),
            settings: Settings {
                perf_mode: true,
                ambient_enabled: false,
            },
        }
    }

    #[test]
    fn file_store_round_trips_persisted_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::new(dir.path().join("saves").join("slot.json"));
        assert!(store.load().expect("load empty").is_none());

        store.save(&sample_record()).expect("save");
        let loaded = store.load().expect("load").expect("record");
        assert_eq!(loaded, sample_record());
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::new(dir.path().join("slot.json"));
        store.save(&sample_record()).expect("save");
        store.clear().expect("clear");
        store.clear().expect("clear again");
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn apply_to_keeps_runtime_fields() {
        let mut state = GameState {
            paused: true,
            ..GameState::default()
        };
        state.mode = crate::state::GameMode::Mission;
        sample_record().apply_to(&mut state);

        assert_eq!(state.mode, crate::state::GameMode::Mission);
        assert!(state.paused);
        assert_eq!(state.economy.money, 420);
        assert!((state.progress.global_progress - 5.0 / 12.0).abs() < 1e-6);
    }

    #[test]
    fn oversized_upgrade_levels_are_capped_on_apply() {
        let raw = r#"{ "upgrades": { "buffer": 1000, "amplifier": 2, "pulse": 7 } }"#;
        let mut state = GameState::default();
        decode_save(raw).expect("decode").apply_to(&mut state);
        assert_eq!(state.upgrades.buffer, 5);
        assert_eq!(state.upgrades.amplifier, 2);
        assert_eq!(state.upgrades.pulse, 1);
    }

    #[test]
    fn partial_document_merges_known_sections() {
        let raw = r#"{
            "economy": { "money": 77 },
            "progress": "not an object",
            "camera": { "x": 10 },
            "settings": { "perf_mode": true }
        }"#;
        let record = decode_save(raw).expect("decode");
        assert_eq!(record.economy.money, 77);
        assert_eq!(record.economy.heat, 0);
        assert_eq!(record.progress, Progress::default());
        assert!(record.settings.perf_mode);
        assert!(record.settings.ambient_enabled);
        assert_eq!(record.selected_node_id, None);
    }

    #[test]
    fn wrong_field_type_only_resets_that_section() {
        let raw = r#"{ "economy": { "money": "lots" }, "upgrades": { "buffer": 3 } }"#;
        let record = decode_save(raw).expect("decode");
        assert_eq!(record.economy, Economy::default());
        assert_eq!(record.upgrades.buffer, 3);
    }

    #[test]
    fn non_object_documents_are_corrupt() {
        for raw in ["", "{ broken", "[1, 2]", "42"] {
            assert!(
                matches!(decode_save(raw), Err(PersistenceError::Corrupt(_))),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn memory_store_shares_slot_between_clones() {
        let handle = MemoryStore::new();
        let mut store = handle.clone();
        store.save(&sample_record()).expect("save");
        assert_eq!(handle.save_count(), 1);
        assert!(handle.blob().is_some_and(|blob| blob.contains("\"money\": 420")));

        handle.set_fail_writes(true);
        assert!(matches!(
            store.save(&sample_record()),
            Err(PersistenceError::Write { .. })
        ));
        assert_eq!(handle.save_count(), 1);
    }
}
