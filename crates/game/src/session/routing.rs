use std::collections::BTreeSet;

use engine::{PointerEvent, PointerId, PointerPhase};

use crate::state::GameMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    NodeMap,
    Mission,
    Drop,
}

/// Picks the single subsystem allowed to see a pointer event.
///
/// Pointers that were pressed across a mode switch stay suppressed until
/// they lift, so the tail of an old gesture never reaches the new mode.
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    pressed: BTreeSet<PointerId>,
    suppressed: BTreeSet<PointerId>,
}

impl InputRouter {
    pub fn route(&mut self, mode: GameMode, event: PointerEvent) -> Route {
        let id = event.pointer_id;
        match event.phase {
            PointerPhase::Down => {
                self.suppressed.remove(&id);
                self.pressed.insert(id);
            }
            PointerPhase::Move => {
                if self.suppressed.contains(&id) {
                    return Route::Drop;
                }
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                self.pressed.remove(&id);
                if self.suppressed.remove(&id) {
                    return Route::Drop;
                }
            }
        }
        route_for_mode(mode)
    }

    pub fn suppress_pressed(&mut self) {
        self.suppressed.extend(self.pressed.iter().copied());
    }

    pub fn is_suppressed(&self, pointer_id: PointerId) -> bool {
        self.suppressed.contains(&pointer_id)
    }

    pub fn pressed_count(&self) -> usize {
        self.pressed.len()
    }
}

pub fn route_for_mode(mode: GameMode) -> Route {
    match mode {
        GameMode::World => Route::NodeMap,
        GameMode::Mission => Route::Mission,
        GameMode::Title | GameMode::Result => Route::Drop,
    }
}
