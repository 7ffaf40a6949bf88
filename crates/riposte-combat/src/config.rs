//! Combat tuning
//!
//! Every section falls back to its defaults when missing from the TOML
//! document, so a config file only needs the values it overrides.

use std::fs;
use std::path::Path;

use riposte_core::TimeConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

/// All combat tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub time: TimeConfig,
    pub attributes: AttributeDefaults,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub warp: WarpTuning,
    pub cues: CueNames,
    pub props: PropTuning,
}

/// Starting values for every combatant's attribute ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeDefaults {
    pub health: f32,
    pub max_health: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    /// Stamina regained per second
    pub stamina_regen_rate: f32,
    pub souls: u32,
    pub gold: u32,
}

impl Default for AttributeDefaults {
    fn default() -> Self {
        Self {
            health: 100.0,
            max_health: 100.0,
            stamina: 100.0,
            max_stamina: 100.0,
            stamina_regen_rate: 8.0,
            souls: 0,
            gold: 0,
        }
    }
}

/// Player-only tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Stamina spent per dodge; a dodge needs strictly more than this
    pub dodge_cost: f32,
    /// Blend-out time when a hit interrupts an attack
    pub hit_react_blend: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            dodge_cost: 14.0,
            hit_react_blend: 0.25,
        }
    }
}

/// Enemy AI distances, speeds and timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Distance at which a patrol waypoint counts as reached
    pub patrol_radius: f32,
    pub wait_min: f32,
    pub wait_max: f32,
    /// Beyond this distance the enemy loses interest in its target
    pub combat_radius: f32,
    /// Within this distance the enemy commits to attacking
    pub attack_radius: f32,
    pub attack_min: f32,
    pub attack_max: f32,
    pub patrolling_speed: f32,
    pub chasing_speed: f32,
    pub acceptance_radius: f32,
    /// Seconds a corpse remains before it is removed
    pub death_life_span: f32,
    /// Height above the corpse at which the soul drop appears
    pub drop_height_offset: f32,
    pub stop_attack_blend: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            patrol_radius: 200.0,
            wait_min: 5.0,
            wait_max: 10.0,
            combat_radius: 500.0,
            attack_radius: 150.0,
            attack_min: 0.5,
            attack_max: 1.0,
            patrolling_speed: 125.0,
            chasing_speed: 300.0,
            acceptance_radius: 50.0,
            death_life_span: 8.0,
            drop_height_offset: 125.0,
            stop_attack_blend: 0.24,
        }
    }
}

/// Motion-warp tuning shared by all combatants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpTuning {
    /// How far in front of the target an attacker stops
    pub target_distance: f32,
}

impl Default for WarpTuning {
    fn default() -> Self {
        Self {
            target_distance: 75.0,
        }
    }
}

/// Animation section names requested from the animation driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CueNames {
    pub attack_sections: Vec<String>,
    pub death_sections: Vec<String>,
    pub dodge_section: String,
    pub equip_section: String,
    pub unequip_section: String,
}

impl Default for CueNames {
    fn default() -> Self {
        Self {
            attack_sections: vec!["Attack1".into(), "Attack2".into()],
            death_sections: (1..=6).map(|i| format!("Death{}", i)).collect(),
            dodge_section: "Default".into(),
            equip_section: "Equip".into(),
            unequip_section: "Unequip".into(),
        }
    }
}

/// Breakable prop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropTuning {
    /// Height above the prop at which its treasure appears
    pub treasure_height_offset: f32,
}

impl Default for PropTuning {
    fn default() -> Self {
        Self {
            treasure_height_offset: 75.0,
        }
    }
}

impl CombatConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded combat config from {:?}", path);
        Ok(config)
    }

    /// Load a config file, or return defaults if it is missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No combat config at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Every tuning number, named for error messages
    fn numbers(&self) -> [(&'static str, f32); 24] {
        let (a, p, e) = (&self.attributes, &self.player, &self.enemy);
        [
            ("attributes.health", a.health),
            ("attributes.max_health", a.max_health),
            ("attributes.stamina", a.stamina),
            ("attributes.max_stamina", a.max_stamina),
            ("attributes.stamina_regen_rate", a.stamina_regen_rate),
            ("player.dodge_cost", p.dodge_cost),
            ("player.hit_react_blend", p.hit_react_blend),
            ("enemy.patrol_radius", e.patrol_radius),
            ("enemy.wait_min", e.wait_min),
            ("enemy.wait_max", e.wait_max),
            ("enemy.combat_radius", e.combat_radius),
            ("enemy.attack_radius", e.attack_radius),
            ("enemy.attack_min", e.attack_min),
            ("enemy.attack_max", e.attack_max),
            ("enemy.patrolling_speed", e.patrolling_speed),
            ("enemy.chasing_speed", e.chasing_speed),
            ("enemy.acceptance_radius", e.acceptance_radius),
            ("enemy.death_life_span", e.death_life_span),
            ("enemy.drop_height_offset", e.drop_height_offset),
            ("enemy.stop_attack_blend", e.stop_attack_blend),
            ("warp.target_distance", self.warp.target_distance),
            ("props.treasure_height_offset", self.props.treasure_height_offset),
            ("time.time_scale", self.time.time_scale),
            ("time.max_delta_time", self.time.max_delta_time),
        ]
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((name, _)) = self.numbers().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{} must be a finite number", name)));
        }

        let a = &self.attributes;
        if a.max_health < 0.0 || a.max_stamina < 0.0 || a.stamina_regen_rate < 0.0 {
            return Err(invalid("attribute maxima and regen rate must be non-negative"));
        }
        if self.player.dodge_cost < 0.0 {
            return Err(invalid("player.dodge_cost must be non-negative"));
        }

        let e = &self.enemy;
        let radii = [
            e.patrol_radius,
            e.combat_radius,
            e.attack_radius,
            e.acceptance_radius,
        ];
        if radii.iter().any(|r| *r < 0.0) {
            return Err(invalid("enemy radii must be non-negative"));
        }
        if e.wait_min < 0.0 || e.wait_min > e.wait_max {
            return Err(invalid("enemy.wait_min must be in [0, wait_max]"));
        }
        if e.attack_min < 0.0 || e.attack_min > e.attack_max {
            return Err(invalid("enemy.attack_min must be in [0, attack_max]"));
        }
        if e.attack_radius > e.combat_radius {
            return Err(invalid("enemy.attack_radius must not exceed combat_radius"));
        }
        if e.death_life_span < 0.0 {
            return Err(invalid("enemy.death_life_span must be non-negative"));
        }

        let c = &self.cues;
        if c.dodge_section.is_empty() || c.equip_section.is_empty() || c.unequip_section.is_empty() {
            return Err(invalid("dodge, equip and unequip section names are required"));
        }
        if self.time.max_delta_time < 0.0 || self.time.time_scale < 0.0 {
            return Err(invalid("time settings must be non-negative"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}
