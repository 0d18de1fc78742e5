use super::{SurfaceSize, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

impl PointerId {
    pub const MOUSE: PointerId = PointerId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Vec2,
    pub pointer_id: PointerId,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, position: Vec2, pointer_id: PointerId) -> Self {
        Self {
            phase,
            position,
            pointer_id,
        }
    }

    pub fn down(position: Vec2, pointer_id: PointerId) -> Self {
        Self::new(PointerPhase::Down, position, pointer_id)
    }

    pub fn moved(position: Vec2, pointer_id: PointerId) -> Self {
        Self::new(PointerPhase::Move, position, pointer_id)
    }

    pub fn up(position: Vec2, pointer_id: PointerId) -> Self {
        Self::new(PointerPhase::Up, position, pointer_id)
    }

    pub fn cancel(position: Vec2, pointer_id: PointerId) -> Self {
        Self::new(PointerPhase::Cancel, position, pointer_id)
    }
}

/// Exclusive gesture claim over one drawing surface.
///
/// A second pointer pressing while another owns the surface is refused; the
/// owning pointer pressing again re-claims it (capture hand-off).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerCapture {
    owner: Option<PointerId>,
}

impl PointerCapture {
    pub fn try_claim(&mut self, pointer_id: PointerId) -> bool {
        match self.owner {
            Some(owner) if owner != pointer_id => false,
            _ => {
                self.owner = Some(pointer_id);
                true
            }
        }
    }

    pub fn owns(&self, pointer_id: PointerId) -> bool {
        self.owner == Some(pointer_id)
    }

    pub fn release(&mut self, pointer_id: PointerId) -> bool {
        if self.owns(pointer_id) {
            self.owner = None;
            true
        } else {
            false
        }
    }

    pub fn force_release(&mut self) -> Option<PointerId> {
        self.owner.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIntent {
    Confirm,
    Back,
    TogglePause,
    ToggleFocus,
    CycleSelection,
    Choice(u8),
    BuyUpgrade(u8),
    Chain,
    Save,
    ResetSave,
}

#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    pointer_events: Vec<PointerEvent>,
    intents: Vec<KeyIntent>,
    surface: SurfaceSize,
    frame_seconds: f32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        pointer_events: Vec<PointerEvent>,
        intents: Vec<KeyIntent>,
        surface: SurfaceSize,
    ) -> Self {
        Self {
            quit_requested,
            pointer_events,
            intents,
            surface,
            frame_seconds: 0.0,
        }
    }

    pub fn with_pointer_event(mut self, event: PointerEvent) -> Self {
        self.pointer_events.push(event);
        self
    }

    pub fn with_intent(mut self, intent: KeyIntent) -> Self {
        self.intents.push(intent);
        self
    }

    pub fn with_surface_size(mut self, surface: SurfaceSize) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_frame_seconds(mut self, frame_seconds: f32) -> Self {
        self.frame_seconds = frame_seconds;
        self
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn pointer_events(&self) -> &[PointerEvent] {
        &self.pointer_events
    }

    pub fn intents(&self) -> &[KeyIntent] {
        &self.intents
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    /// Wall-clock length of the frame before the host clamped it; zero when
    /// the host did not record one.
    pub fn frame_seconds(&self) -> f32 {
        self.frame_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_refuses_second_pointer_while_owned() {
        let mut capture = PointerCapture::default();
        assert!(capture.try_claim(PointerId(1)));
        assert!(!capture.try_claim(PointerId(2)));
        assert!(capture.owns(PointerId(1)));
    }

    #[test]
    fn capture_same_pointer_reclaims() {
        let mut capture = PointerCapture::default();
        assert!(capture.try_claim(PointerId(3)));
        assert!(capture.try_claim(PointerId(3)));
        assert!(capture.owns(PointerId(3)));
    }

    #[test]
    fn release_by_non_owner_is_ignored() {
        let mut capture = PointerCapture::default();
        capture.try_claim(PointerId(1));
        assert!(!capture.release(PointerId(2)));
        assert!(capture.release(PointerId(1)));
        assert!(capture.try_claim(PointerId(2)));
    }

    #[test]
    fn force_release_clears_owner() {
        let mut capture = PointerCapture::default();
        capture.try_claim(PointerId(9));
        assert_eq!(capture.force_release(), Some(PointerId(9)));
        assert_eq!(capture.force_release(), None);
        assert!(capture.try_claim(PointerId(4)));
    }

    #[test]
    fn snapshot_builder_keeps_event_order() {
        let snapshot = InputSnapshot::empty()
            .with_pointer_event(PointerEvent::down(Vec2::new(1.0, 2.0), PointerId::MOUSE))
            .with_pointer_event(PointerEvent::up(Vec2::new(1.0, 2.0), PointerId::MOUSE))
            .with_intent(KeyIntent::TogglePause)
            .with_surface_size(SurfaceSize::new(640, 480))
            .with_frame_seconds(0.25);

        let phases: Vec<_> = snapshot
            .pointer_events()
            .iter()
            .map(|event| event.phase)
            .collect();
        assert_eq!(phases, vec![PointerPhase::Down, PointerPhase::Up]);
        assert_eq!(snapshot.intents(), &[KeyIntent::TogglePause]);
        assert_eq!(snapshot.surface_size(), SurfaceSize::new(640, 480));
        assert_eq!(snapshot.frame_seconds(), 0.25);
        assert_eq!(InputSnapshot::empty().frame_seconds(), 0.0);
    }
}
