use engine::{Frame, InputSnapshot, KeyIntent, Scene, SurfaceSize};
use tracing::info;

use super::Session;
use crate::shop::UpgradeKind;

impl Session {
    fn apply_intent(&mut self, intent: KeyIntent) {
        // Rejections are already logged and surfaced as notices.
        let _ = match intent {
            KeyIntent::Confirm => self.confirm(),
            KeyIntent::Back => self.back(),
            KeyIntent::TogglePause => {
                self.toggle_pause();
                Ok(())
            }
            KeyIntent::ToggleFocus => {
                self.toggle_focus();
                Ok(())
            }
            KeyIntent::CycleSelection => self.cycle_selection(),
            KeyIntent::Choice(index) => self.choose(usize::from(index)),
            KeyIntent::BuyUpgrade(index) => match UpgradeKind::from_index(usize::from(index)) {
                Some(kind) => self.buy_upgrade(kind),
                None => Ok(()),
            },
            KeyIntent::Chain => self.chain_mission(),
            KeyIntent::Save => {
                let _ = self.save_now();
                Ok(())
            }
            KeyIntent::ResetSave => {
                self.reset_save();
                Ok(())
            }
        };
    }

    fn sync_surface(&mut self, surface: SurfaceSize) {
        if surface != self.surface {
            self.set_surface_size(surface);
        }
    }
}

impl Scene for Session {
    fn load(&mut self) {
        info!(
            mode = self.mode().label(),
            nodes = self.node_map().nodes().len(),
            "session_loaded"
        );
        self.ambient_mood_sent = None;
        self.sync_ambient();
    }

    fn update(&mut self, dt_seconds: f32, input: &InputSnapshot) {
        self.sync_surface(input.surface_size());
        for event in input.pointer_events() {
            self.pointer_event(*event);
        }
        for intent in input.intents() {
            self.apply_intent(*intent);
        }
        let wall_seconds = input.frame_seconds().max(dt_seconds);
        self.tick_frame(dt_seconds, wall_seconds);
    }

    fn render(&mut self, surface: SurfaceSize, frame: &mut Frame) {
        self.sync_surface(surface);
        Session::render(self, frame);
    }

    fn unload(&mut self) {
        self.persist("unload");
        info!("session_unloaded");
    }

    fn title(&self) -> Option<String> {
        Some(self.view().title_line())
    }
}
