use std::env;
use std::path::PathBuf;

use engine::AppPaths;
use tracing::warn;

use crate::persistence::SAVE_KEY;

pub const SAVE_FILE_ENV_VAR: &str = "NEON_ALLEY_SAVE_FILE";
pub const SEED_ENV_VAR: &str = "NEON_ALLEY_SEED";
pub const DEFAULT_RNG_SEED: u64 = 0x6E30_6E41;
pub const NODES_FILE_NAME: &str = "world_nodes.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub save_file: PathBuf,
    pub nodes_file: PathBuf,
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            save_file: PathBuf::from("saves").join(format!("{SAVE_KEY}.json")),
            nodes_file: PathBuf::from("assets").join("base").join(NODES_FILE_NAME),
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

impl GameConfig {
    pub fn for_paths(paths: &AppPaths) -> Self {
        Self {
            save_file: paths.save_dir.join(format!("{SAVE_KEY}.json")),
            nodes_file: paths.base_content_dir.join(NODES_FILE_NAME),
            rng_seed: DEFAULT_RNG_SEED,
        }
    }

    pub fn from_env(paths: &AppPaths) -> Self {
        Self::from_env_values(
            paths,
            env::var(SAVE_FILE_ENV_VAR).ok(),
            env::var(SEED_ENV_VAR).ok(),
        )
    }

    /// Invalid overrides are logged and ignored.
    pub fn from_env_values(
        paths: &AppPaths,
        save_file: Option<String>,
        seed: Option<String>,
    ) -> Self {
        let mut config = Self::for_paths(paths);
        match save_file.as_deref().map(str::trim) {
            Some("") => warn!(var = SAVE_FILE_ENV_VAR, "config_override_empty"),
            Some(value) => config.save_file = PathBuf::from(value),
            None => {}
        }
        if let Some(raw) = seed {
            match parse_seed(&raw) {
                Some(value) => config.rng_seed = value,
                None => warn!(var = SEED_ENV_VAR, value = %raw, "config_override_invalid"),
            }
        }
        config
    }
}

/// Accepts decimal or `0x`-prefixed hex.
pub fn parse_seed(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => trimmed.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> AppPaths {
        AppPaths {
            root: PathBuf::from("/game"),
            base_content_dir: PathBuf::from("/game/assets/base"),
            save_dir: PathBuf::from("/game/saves"),
        }
    }

    #[test]
    fn defaults_follow_app_paths() {
        let config = GameConfig::from_env_values(&paths(), None, None);
        assert_eq!(config.save_file, PathBuf::from("/game/saves/neon_alley_v1.json"));
        assert_eq!(
            config.nodes_file,
            PathBuf::from("/game/assets/base/world_nodes.xml")
        );
        assert_eq!(config.rng_seed, DEFAULT_RNG_SEED);
    }

    #[test]
    fn overrides_apply_when_valid() {
        let config = GameConfig::from_env_values(
            &paths(),
            Some("/tmp/alt.json".to_string()),
            Some("0x2A".to_string()),
        );
        assert_eq!(config.save_file, PathBuf::from("/tmp/alt.json"));
        assert_eq!(config.rng_seed, 42);
    }

    #[test]
    fn invalid_overrides_fall_back() {
        let config = GameConfig::from_env_values(
            &paths(),
            Some("   ".to_string()),
            Some("seven".to_string()),
        );
        assert_eq!(config, GameConfig::for_paths(&paths()));
    }

    #[test]
    fn seed_parser_accepts_decimal_and_hex() {
        assert_eq!(parse_seed(" 17 "), Some(17));
        assert_eq!(parse_seed("0XfF"), Some(255));
        assert_eq!(parse_seed("-1"), None);
        assert_eq!(parse_seed("0x"), None);
    }
}
