use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Per-game processing knobs, supplied as data by the operator. Capture
/// frame rates vary between source files, so the pass-duration window is a
/// per-game setting rather than a constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub bad_events: Vec<i64>,
    #[serde(default = "default_moment_range")]
    pub moment_range: usize,
    #[serde(default)]
    pub event_offset: i64,
}

fn default_moment_range() -> usize {
    8
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bad_events: Vec::new(),
            moment_range: default_moment_range(),
            event_offset: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameRegistry {
    games: HashMap<String, GameConfig>,
}

impl GameRegistry {
    pub fn new(games: HashMap<String, GameConfig>) -> Self {
        Self { games }
    }

    pub fn insert(&mut self, game_key: impl Into<String>, config: GameConfig) {
        self.games.insert(game_key.into(), config);
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Unknown keys are a hard error: guessing a config would silently
    /// produce a whole game's worth of invalid candidates.
    pub fn config_for(&self, game_key: &str) -> Result<&GameConfig, EngineError> {
        self.games
            .get(game_key)
            .ok_or_else(|| EngineError::Config(format!("unknown game key {game_key}")))
    }
}

pub fn load_registry(path: &Path) -> Result<GameRegistry> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read game registry {}", path.display()))?;
    let games = serde_json::from_str::<HashMap<String, GameConfig>>(&raw)
        .with_context(|| format!("parse game registry {}", path.display()))?;
    Ok(GameRegistry::new(games))
}

pub fn save_registry(registry: &GameRegistry, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(&registry.games).context("serialize game registry")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write game registry")?;
    fs::rename(&tmp, path).context("swap game registry")?;
    Ok(())
}
