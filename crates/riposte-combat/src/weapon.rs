//! Weapon binding: grip, damage and the hit volume's per-swing ignore set

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;

/// How a weapon is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponGrip {
    OneHanded,
    TwoHanded,
}

/// Where a held weapon is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponSocket {
    Hand,
    Back,
}

/// A weapon owned by exactly one combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub grip: WeaponGrip,
    pub damage: f32,
    socket: WeaponSocket,
    hit_volume_enabled: bool,
    /// Targets already struck during the current swing
    #[serde(skip)]
    ignore_set: HashSet<CombatantId>,
}

impl Weapon {
    pub fn new(name: impl Into<String>, grip: WeaponGrip, damage: f32) -> Self {
        Self {
            name: name.into(),
            grip,
            damage: damage.max(0.0),
            socket: WeaponSocket::Hand,
            hit_volume_enabled: false,
            ignore_set: HashSet::new(),
        }
    }

    pub fn one_handed(name: impl Into<String>, damage: f32) -> Self {
        Self::new(name, WeaponGrip::OneHanded, damage)
    }

    pub fn two_handed(name: impl Into<String>, damage: f32) -> Self {
        Self::new(name, WeaponGrip::TwoHanded, damage)
    }

    /// Toggle the hit volume. Either direction forgets everything struck so far.
    pub fn set_collision(&mut self, enabled: bool) {
        self.hit_volume_enabled = enabled;
        self.ignore_set.clear();
    }

    /// Record a strike on `target`. Returns false while the volume is off or
    /// if `target` was already struck during this swing.
    pub fn register_hit(&mut self, target: CombatantId) -> bool {
        self.hit_volume_enabled && self.ignore_set.insert(target)
    }

    pub fn attach(&mut self, socket: WeaponSocket) {
        self.socket = socket;
    }

    pub fn socket(&self) -> WeaponSocket {
        self.socket
    }

    pub fn hit_volume_enabled(&self) -> bool {
        self.hit_volume_enabled
    }
}
