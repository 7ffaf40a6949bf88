//! Boundary traits towards the engine hosting the combat core.
//!
//! The core never renders, animates, moves or collides anything itself. It
//! issues requests through these traits and receives callbacks (animation
//! signals, overlaps, perception) through `CombatSimulation`.

use glam::Vec3;
use serde::Serialize;

use crate::combatant::CombatantId;
use crate::cues::CueKind;
use crate::pickup::{PickupId, PickupKind};
use crate::weapon::WeaponSocket;

/// Plays and stops named animation sections
pub trait AnimationDriver {
    fn play_section(&mut self, owner: CombatantId, cue: CueKind, section: &str);
    fn stop_cue(&mut self, owner: CombatantId, cue: CueKind, blend_time: f32);
}

/// Fire-and-forget movement requests
pub trait Navigator {
    fn move_to(&mut self, owner: CombatantId, target: Vec3, acceptance_radius: f32);
    fn set_max_speed(&mut self, owner: CombatantId, speed: f32);
    fn set_orient_to_movement(&mut self, owner: CombatantId, enabled: bool);
}

/// Physical collision switches
pub trait CollisionToggles {
    fn set_capsule_collision(&mut self, owner: CombatantId, enabled: bool);
    fn set_weapon_collision(&mut self, owner: CombatantId, enabled: bool);
}

/// Moves a held weapon between sockets on the owner's skeleton
pub trait WeaponAttachment {
    fn attach_weapon(&mut self, owner: CombatantId, socket: WeaponSocket);
}

/// HUD and overhead widgets
pub trait Presentation {
    fn set_health_percent(&mut self, owner: CombatantId, percent: f32);
    fn set_stamina_percent(&mut self, owner: CombatantId, percent: f32);
    fn set_souls(&mut self, owner: CombatantId, souls: u32);
    fn set_gold(&mut self, owner: CombatantId, gold: u32);
    fn set_health_bar_visible(&mut self, owner: CombatantId, visible: bool);
}

/// Creates and removes world objects
pub trait Spawner {
    fn spawn_pickup(&mut self, pickup: PickupId, kind: PickupKind, amount: u32, position: Vec3);
    fn despawn_pickup(&mut self, pickup: PickupId);
    fn despawn_combatant(&mut self, id: CombatantId);
}

/// Audio and particle feedback
pub trait Effects {
    fn play_hit_sound(&mut self, position: Vec3);
    fn spawn_hit_particles(&mut self, position: Vec3);
}

/// Everything the core asks of its host
pub trait CombatHost:
    AnimationDriver + Navigator + CollisionToggles + WeaponAttachment + Presentation + Spawner + Effects
{
}

impl<T> CombatHost for T where
    T: AnimationDriver
        + Navigator
        + CollisionToggles
        + WeaponAttachment
        + Presentation
        + Spawner
        + Effects
{
}

/// One recorded host request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HostCommand {
    PlaySection {
        owner: CombatantId,
        cue: CueKind,
        section: String,
    },
    StopCue {
        owner: CombatantId,
        cue: CueKind,
        blend_time: f32,
    },
    MoveTo {
        owner: CombatantId,
        target: Vec3,
        acceptance_radius: f32,
    },
    SetMaxSpeed {
        owner: CombatantId,
        speed: f32,
    },
    SetOrientToMovement {
        owner: CombatantId,
        enabled: bool,
    },
    SetCapsuleCollision {
        owner: CombatantId,
        enabled: bool,
    },
    SetWeaponCollision {
        owner: CombatantId,
        enabled: bool,
    },
    AttachWeapon {
        owner: CombatantId,
        socket: WeaponSocket,
    },
    HealthPercent {
        owner: CombatantId,
        percent: f32,
    },
    StaminaPercent {
        owner: CombatantId,
        percent: f32,
    },
    Souls {
        owner: CombatantId,
        souls: u32,
    },
    Gold {
        owner: CombatantId,
        gold: u32,
    },
    HealthBarVisible {
        owner: CombatantId,
        visible: bool,
    },
    SpawnPickup {
        pickup: PickupId,
        kind: PickupKind,
        amount: u32,
        position: Vec3,
    },
    DespawnPickup {
        pickup: PickupId,
    },
    DespawnCombatant {
        id: CombatantId,
    },
    HitSound {
        position: Vec3,
    },
    HitParticles {
        position: Vec3,
    },
}

/// A host that only records what it was asked to do.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CommandLog {
    pub commands: Vec<HostCommand>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Drain everything recorded so far
    pub fn take(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Sections requested for `owner` on `cue`, oldest first
    pub fn sections(&self, owner: CombatantId, cue: CueKind) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                HostCommand::PlaySection {
                    owner: o,
                    cue: k,
                    section,
                } if *o == owner && *k == cue => Some(section.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Most recent move-to target issued for `owner`
    pub fn last_move_to(&self, owner: CombatantId) -> Option<Vec3> {
        self.commands.iter().rev().find_map(|c| match c {
            HostCommand::MoveTo { owner: o, target, .. } if *o == owner => Some(*target),
            _ => None,
        })
    }

    /// Most recent health percent pushed for `owner`
    pub fn last_health_percent(&self, owner: CombatantId) -> Option<f32> {
        self.commands.iter().rev().find_map(|c| match c {
            HostCommand::HealthPercent { owner: o, percent } if *o == owner => Some(*percent),
            _ => None,
        })
    }

    pub fn contains(&self, command: &HostCommand) -> bool {
        self.commands.contains(command)
    }

    pub fn count(&self, pred: impl Fn(&HostCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl AnimationDriver for CommandLog {
    fn play_section(&mut self, owner: CombatantId, cue: CueKind, section: &str) {
        self.commands.push(HostCommand::PlaySection {
            owner,
            cue,
            section: section.to_string(),
        });
    }

    fn stop_cue(&mut self, owner: CombatantId, cue: CueKind, blend_time: f32) {
        self.commands.push(HostCommand::StopCue {
            owner,
            cue,
            blend_time,
        });
    }
}

impl Navigator for CommandLog {
    fn move_to(&mut self, owner: CombatantId, target: Vec3, acceptance_radius: f32) {
        self.commands.push(HostCommand::MoveTo {
            owner,
            target,
            acceptance_radius,
        });
    }

    fn set_max_speed(&mut self, owner: CombatantId, speed: f32) {
        self.commands.push(HostCommand::SetMaxSpeed { owner, speed });
    }

    fn set_orient_to_movement(&mut self, owner: CombatantId, enabled: bool) {
        self.commands
            .push(HostCommand::SetOrientToMovement { owner, enabled });
    }
}

impl CollisionToggles for CommandLog {
    fn set_capsule_collision(&mut self, owner: CombatantId, enabled: bool) {
        self.commands
            .push(HostCommand::SetCapsuleCollision { owner, enabled });
    }

    fn set_weapon_collision(&mut self, owner: CombatantId, enabled: bool) {
        self.commands
            .push(HostCommand::SetWeaponCollision { owner, enabled });
    }
}

impl WeaponAttachment for CommandLog {
    fn attach_weapon(&mut self, owner: CombatantId, socket: WeaponSocket) {
        self.commands.push(HostCommand::AttachWeapon { owner, socket });
    }
}

impl Presentation for CommandLog {
    fn set_health_percent(&mut self, owner: CombatantId, percent: f32) {
        self.commands
            .push(HostCommand::HealthPercent { owner, percent });
    }

    fn set_stamina_percent(&mut self, owner: CombatantId, percent: f32) {
        self.commands
            .push(HostCommand::StaminaPercent { owner, percent });
    }

    fn set_souls(&mut self, owner: CombatantId, souls: u32) {
        self.commands.push(HostCommand::Souls { owner, souls });
    }

    fn set_gold(&mut self, owner: CombatantId, gold: u32) {
        self.commands.push(HostCommand::Gold { owner, gold });
    }

    fn set_health_bar_visible(&mut self, owner: CombatantId, visible: bool) {
        self.commands
            .push(HostCommand::HealthBarVisible { owner, visible });
    }
}

impl Spawner for CommandLog {
    fn spawn_pickup(&mut self, pickup: PickupId, kind: PickupKind, amount: u32, position: Vec3) {
        self.commands.push(HostCommand::SpawnPickup {
            pickup,
            kind,
            amount,
            position,
        });
    }

    fn despawn_pickup(&mut self, pickup: PickupId) {
        self.commands.push(HostCommand::DespawnPickup { pickup });
    }

    fn despawn_combatant(&mut self, id: CombatantId) {
        self.commands.push(HostCommand::DespawnCombatant { id });
    }
}

impl Effects for CommandLog {
    fn play_hit_sound(&mut self, position: Vec3) {
        self.commands.push(HostCommand::HitSound { position });
    }

    fn spawn_hit_particles(&mut self, position: Vec3) {
        self.commands.push(HostCommand::HitParticles { position });
    }
}
