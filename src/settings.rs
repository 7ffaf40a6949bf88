//! Arena settings with persistence
//!
//! Settings are read from `~/.config/riposte/arena.toml` and the combat
//! tuning from `~/.config/riposte/combat.toml` unless a path overrides them.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use riposte_combat::CombatConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything the arena harness needs to stage a fight
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub run: RunSettings,
    pub scenario: ScenarioSettings,
}

impl ArenaSettings {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("riposte"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("arena.toml"))
    }

    /// Load settings from the config directory, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from `path`, or return defaults if it is missing or broken
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No arena settings at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded arena settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse arena settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read arena settings: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("arena.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved arena settings to {:?}", path);
        Ok(())
    }

    /// Combat tuning named by the run settings, falling back to the config directory
    pub fn combat_config(&self) -> CombatConfig {
        let path = self
            .run
            .combat_config
            .clone()
            .or_else(|| Self::config_dir().map(|p| p.join("combat.toml")));
        match path {
            Some(path) => CombatConfig::load_or_default(&path),
            None => CombatConfig::default(),
        }
    }
}

/// How long and how fast the fight runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Seed for every random choice in the fight
    pub seed: u64,
    /// Number of frames to simulate
    pub frames: u32,
    /// Simulated frames per second
    pub frame_rate: f32,
    /// Combat tuning file, `combat.toml` in the config directory if unset
    pub combat_config: Option<PathBuf>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            seed: 7,
            frames: 3600, // one minute
            frame_rate: 60.0,
            combat_config: None,
        }
    }
}

impl RunSettings {
    pub fn frame_time(&self) -> f32 {
        1.0 / self.frame_rate.max(1.0)
    }
}

/// Where everyone starts and what they carry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSettings {
    pub player_start: Vec3,
    pub player_weapon_damage: f32,
    pub player_speed: f32,
    /// Enemies notice the player inside this distance
    pub sight_radius: f32,
    /// Weapon volumes overlap anything this close to the wielder
    pub weapon_reach: f32,
    /// Pickups are collected inside this distance
    pub pickup_radius: f32,
    pub enemies: Vec<EnemySpawn>,
    pub props: Vec<PropSpawn>,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            player_start: Vec3::new(0.0, 0.0, 900.0),
            player_weapon_damage: 25.0,
            player_speed: 400.0,
            sight_radius: 450.0,
            weapon_reach: 160.0,
            pickup_radius: 100.0,
            enemies: vec![
                EnemySpawn {
                    position: Vec3::new(-150.0, 0.0, 0.0),
                    route: vec![Vec3::new(-150.0, 0.0, 0.0), Vec3::new(-150.0, 0.0, -600.0)],
                    weapon_damage: Some(15.0),
                },
                EnemySpawn {
                    position: Vec3::new(250.0, 0.0, -300.0),
                    route: vec![
                        Vec3::new(250.0, 0.0, -300.0),
                        Vec3::new(600.0, 0.0, -300.0),
                        Vec3::new(600.0, 0.0, 200.0),
                    ],
                    weapon_damage: Some(20.0),
                },
            ],
            props: vec![PropSpawn {
                position: Vec3::new(0.0, 0.0, 700.0),
                treasure: vec![5, 10, 25],
            }],
        }
    }
}

/// One enemy placed in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub position: Vec3,
    #[serde(default)]
    pub route: Vec<Vec3>,
    /// Damage of the held weapon, unarmed if unset
    #[serde(default)]
    pub weapon_damage: Option<f32>,
}

/// One breakable prop placed in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropSpawn {
    pub position: Vec3,
    #[serde(default)]
    pub treasure: Vec<u32>,
}
