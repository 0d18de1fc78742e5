use std::fmt;

/// Closed set of mini-game variants. Chosen once at `start`, dispatched by
/// `match` everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionKind {
    /// Tap-target: score on pointer-down.
    CachePop,
    /// Hold-and-release charge against a sweet spot.
    Burst,
    /// Continuous trace with a velocity penalty.
    Trace,
}

impl MissionKind {
    pub const ALL: [MissionKind; 3] = [MissionKind::CachePop, MissionKind::Burst, MissionKind::Trace];

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "cache" | "cache-pop" | "cache_pop" | "tap-target" => Some(MissionKind::CachePop),
            "burst" | "hold-release" => Some(MissionKind::Burst),
            "trace" | "relay" => Some(MissionKind::Trace),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            MissionKind::CachePop => "cache-pop",
            MissionKind::Burst => "burst",
            MissionKind::Trace => "trace",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MissionKind::CachePop => "CACHE POP",
            MissionKind::Burst => "BURST",
            MissionKind::Trace => "RELAY TRACE",
        }
    }

    pub fn base_time_limit(self) -> f32 {
        match self {
            MissionKind::CachePop => 10.0,
            MissionKind::Burst => 18.0,
            MissionKind::Trace => 15.0,
        }
    }

    pub fn base_objective(self) -> u32 {
        match self {
            MissionKind::CachePop => 20,
            MissionKind::Burst => 8,
            MissionKind::Trace => 100,
        }
    }
}

impl fmt::Display for MissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const BUFFER_SECONDS_PER_LEVEL: f32 = 2.0;
pub const AMPLIFIER_RADIUS_PER_LEVEL: f32 = 6.0;

/// Persistent modifiers captured when a run starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DifficultyContext {
    pub buffer_level: u32,
    pub amplifier_level: u32,
    pub pulse_available: bool,
    pub boss: bool,
    pub bargain: bool,
}

impl DifficultyContext {
    /// Never shorter than the base limit; grows with every buffer level.
    pub fn time_limit(&self, kind: MissionKind) -> f32 {
        kind.base_time_limit() + BUFFER_SECONDS_PER_LEVEL * self.buffer_level as f32
    }

    /// Boss runs need half as much again, rounded up.
    pub fn objective_target(&self, kind: MissionKind) -> u32 {
        let base = kind.base_objective();
        if self.boss {
            (base * 3 + 1) / 2
        } else {
            base
        }
    }

    pub fn hit_radius_bonus(&self) -> f32 {
        AMPLIFIER_RADIUS_PER_LEVEL * self.amplifier_level as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_map_to_variants() {
        assert_eq!(MissionKind::from_token("tap-target"), Some(MissionKind::CachePop));
        assert_eq!(MissionKind::from_token(" Cache "), Some(MissionKind::CachePop));
        assert_eq!(MissionKind::from_token("hold-release"), Some(MissionKind::Burst));
        assert_eq!(MissionKind::from_token("relay"), Some(MissionKind::Trace));
        assert_eq!(MissionKind::from_token("rhythm"), None);
        for kind in MissionKind::ALL {
            assert_eq!(MissionKind::from_token(kind.token()), Some(kind));
        }
    }

    #[test]
    fn tap_target_defaults_match_scenario() {
        let context = DifficultyContext::default();
        assert_eq!(context.time_limit(MissionKind::CachePop), 10.0);
        assert_eq!(context.objective_target(MissionKind::CachePop), 20);
    }

    #[test]
    fn buffer_levels_only_extend_time_limit() {
        for kind in MissionKind::ALL {
            let mut previous = 0.0;
            for buffer_level in 0..=5 {
                let context = DifficultyContext {
                    buffer_level,
                    ..DifficultyContext::default()
                };
                let limit = context.time_limit(kind);
                assert!(limit >= kind.base_time_limit());
                assert!(limit > previous);
                previous = limit;
            }
        }
    }

    #[test]
    fn boss_objective_rounds_up() {
        let boss = DifficultyContext {
            boss: true,
            ..DifficultyContext::default()
        };
        assert_eq!(boss.objective_target(MissionKind::Burst), 12);
        assert_eq!(boss.objective_target(MissionKind::CachePop), 30);
        assert_eq!(boss.objective_target(MissionKind::Trace), 150);
    }
}
