use std::path::PathBuf;

use anyhow::{Context, Result};
use colorbet_execution::round_scheduler::DEFAULT_LOCK_WINDOW_SECS;
use colorbet_types::GameMode;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BET_AMOUNT: u64 = 10;
pub const DEFAULT_BALANCE: u64 = 1_000;

/// Settings remembered between runs. Flags given on the command line win.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConfig {
    pub mode: Option<GameMode>,
    pub seed: Option<u64>,
    pub verbose: Option<bool>,
    pub lock_window_secs: Option<u32>,
    pub bet_amount: Option<u64>,
    pub starting_balance: Option<u64>,
}

/// Flags that override the persisted file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub mode: Option<GameMode>,
    pub seed: Option<u64>,
    pub verbose: bool,
    pub lock_window_secs: Option<u32>,
    pub bet_amount: Option<u64>,
    pub starting_balance: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub mode: GameMode,
    /// `None` draws a fresh seed per run.
    pub seed: Option<u64>,
    pub verbose: bool,
    pub lock_window_secs: u32,
    pub bet_amount: u64,
    pub starting_balance: u64,
}

impl ResolvedConfig {
    pub fn resolve(cli: &Overrides, file: &PersistedConfig) -> Self {
        Self {
            mode: cli.mode.or(file.mode).unwrap_or(GameMode::Fast),
            seed: cli.seed.or(file.seed),
            verbose: cli.verbose || file.verbose.unwrap_or(false),
            lock_window_secs: cli
                .lock_window_secs
                .or(file.lock_window_secs)
                .unwrap_or(DEFAULT_LOCK_WINDOW_SECS),
            bet_amount: cli
                .bet_amount
                .or(file.bet_amount)
                .unwrap_or(DEFAULT_BET_AMOUNT),
            starting_balance: cli
                .starting_balance
                .or(file.starting_balance)
                .unwrap_or(DEFAULT_BALANCE),
        }
    }

    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    pub fn to_persisted(&self) -> PersistedConfig {
        PersistedConfig {
            mode: Some(self.mode),
            seed: self.seed,
            verbose: Some(self.verbose),
            lock_window_secs: Some(self.lock_window_secs),
            bet_amount: Some(self.bet_amount),
            starting_balance: Some(self.starting_balance),
        }
    }
}

pub fn load_config() -> Option<PersistedConfig> {
    let path = config_path()?;
    let data = std::fs::read(path).ok()?;
    serde_json::from_slice(&data).ok()
}

pub fn save_config(cfg: &PersistedConfig) -> Result<Option<PathBuf>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create config dir {}", dir.display()))?;
    }
    let data = serde_json::to_vec_pretty(cfg)?;
    std::fs::write(&path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(Some(path))
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "colorbet", "colorbet").map(|d| d.config_dir().join("config.json"))
}
