//! Riposte Combat - decision core for real-time melee
//!
//! Resource ledgers, the directional hit-reaction solver, animation cue
//! selection, the player and enemy state machines and the scheduler that
//! defers their transitions. Everything the core cannot do itself (animation,
//! movement, collision, effects, HUD) is requested through the traits in
//! [`host`].

pub mod attributes;
pub mod breakable;
pub mod combatant;
pub mod config;
pub mod cues;
pub mod enemy;
pub mod error;
pub mod hit_reaction;
pub mod host;
pub mod pickup;
pub mod player;
pub mod scheduler;
pub mod simulation;
pub mod weapon;

pub use attributes::AttributeLedger;
pub use breakable::{BreakOutcome, BreakableProp, PropId};
pub use combatant::{
    ActionState, Attacker, CombatContext, CombatantCore, CombatantId, DamageOutcome, Damageable,
    Equippable, Faction, HitOutcome, LifeState, Roster, Tag, TagSet, TargetView,
};
pub use config::{
    AttributeDefaults, CombatConfig, CueNames, EnemyTuning, PlayerTuning, PropTuning, WarpTuning,
};
pub use cues::{CueKind, CueSelector, DeathPose};
pub use enemy::{BehaviorState, EnemyBehaviorController, PatrolRoute};
pub use error::ConfigError;
pub use hit_reaction::HitDirection;
pub use host::{CombatHost, CommandLog, HostCommand};
pub use pickup::{Pickup, PickupId, PickupKind};
pub use player::{AnimationSignal, EquipState, PlayerActionController, PlayerInput};
pub use scheduler::{Scheduler, TimerKey, TimerKind};
pub use simulation::{CombatSimulation, Combatant, CombatantSummary, SimulationSummary};
pub use weapon::{Weapon, WeaponGrip, WeaponSocket};
