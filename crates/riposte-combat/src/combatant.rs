//! State and behaviour shared by every combatant
//!
//! Player and enemy controllers each embed a `CombatantCore` and build their
//! own decisions on top of it. Cross-combatant references are handles that
//! are resolved through a per-frame `Roster` snapshot, so a despawned target
//! simply reads as absent.

use std::collections::{BTreeSet, HashMap};

use glam::Vec3;
use rand_chacha::ChaCha8Rng;
use riposte_core::Transform;
use riposte_ecs::Handle;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::attributes::AttributeLedger;
use crate::config::CombatConfig;
use crate::cues::{CueKind, CueSelector, DeathPose};
use crate::hit_reaction::{self, HitDirection};
use crate::host::CombatHost;
use crate::scheduler::Scheduler;
use crate::weapon::Weapon;

pub type CombatantId = Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Dead,
}

/// Short-lived activity. Everything except `Dead` returns to `Unoccupied`
/// only through an animation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionState {
    Unoccupied,
    Attacking,
    Equipping,
    Dodging,
    HitReaction,
    Dead,
}

/// Combatants never damage members of their own faction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Hostile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    /// Enemies may pick this combatant as a target
    EngageableTarget,
    Enemy,
    Dead,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag) -> bool {
        self.0.insert(tag)
    }

    pub fn remove(&mut self, tag: Tag) -> bool {
        self.0.remove(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of `take_damage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DamageOutcome {
    /// Already dead; nothing changed
    Ignored,
    Survived,
    /// Health reached zero. Death itself happens in `get_hit`.
    Killed,
}

/// Result of `get_hit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HitOutcome {
    Ignored,
    Reacted(HitDirection),
    Died,
}

/// What one combatant can observe about another
#[derive(Debug, Clone)]
pub struct TargetView {
    pub position: Vec3,
    pub tags: TagSet,
    pub alive: bool,
    pub faction: Faction,
}

/// Per-frame snapshot of every live combatant
pub type Roster = HashMap<CombatantId, TargetView>;

/// Services a controller may use while handling one event
pub struct CombatContext<'a> {
    pub scheduler: &'a mut Scheduler,
    pub rng: &'a mut ChaCha8Rng,
    pub host: &'a mut dyn CombatHost,
    pub config: &'a CombatConfig,
    pub roster: &'a Roster,
}

#[derive(Debug, Clone)]
pub struct CombatantCore {
    pub id: CombatantId,
    pub transform: Transform,
    pub attributes: AttributeLedger,
    pub weapon: Option<Weapon>,
    pub combat_target: Option<CombatantId>,
    pub tags: TagSet,
    pub faction: Faction,
    life: LifeState,
    action: ActionState,
    death_pose: Option<DeathPose>,
}

impl CombatantCore {
    pub fn new(
        id: CombatantId,
        transform: Transform,
        attributes: AttributeLedger,
        faction: Faction,
    ) -> Self {
        Self {
            id,
            transform,
            attributes,
            weapon: None,
            combat_target: None,
            tags: TagSet::new(),
            faction,
            life: LifeState::Alive,
            action: ActionState::Unoccupied,
            death_pose: None,
        }
    }

    pub fn life(&self) -> LifeState {
        self.life
    }

    pub fn action(&self) -> ActionState {
        self.action
    }

    pub fn death_pose(&self) -> Option<DeathPose> {
        self.death_pose
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Alive and not busy with another action
    pub fn can_begin_action(&self) -> bool {
        self.is_alive() && self.action == ActionState::Unoccupied
    }

    /// Enter `phase` if the combatant is free to act
    pub fn begin_action(&mut self, phase: ActionState) -> bool {
        if !self.can_begin_action() || phase == ActionState::Dead {
            trace!("{} cannot begin {:?} while {:?}", self.id, phase, self.action);
            return false;
        }
        debug!("{} {:?} -> {:?}", self.id, self.action, phase);
        self.action = phase;
        true
    }

    /// Force an action regardless of the current one. Dead stays dead.
    pub(crate) fn interrupt(&mut self, phase: ActionState) {
        if self.is_alive() && phase != ActionState::Dead {
            debug!("{} {:?} interrupted by {:?}", self.id, self.action, phase);
            self.action = phase;
        }
    }

    /// End-of-cue signal for `phase`. Signals for other phases are ignored.
    pub fn finish_phase(&mut self, phase: ActionState) -> bool {
        if !self.is_alive() || phase == ActionState::Dead || self.action != phase {
            return false;
        }
        debug!("{} {:?} -> Unoccupied", self.id, phase);
        self.action = ActionState::Unoccupied;
        true
    }

    /// Debit health and push the new percentage in one step
    pub fn apply_damage(&mut self, amount: f32, host: &mut dyn CombatHost) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Ignored;
        }
        self.attributes.receive_damage(amount);
        host.set_health_percent(self.id, self.attributes.health_percent());
        if self.attributes.is_alive() {
            DamageOutcome::Survived
        } else {
            DamageOutcome::Killed
        }
    }

    /// Play the directional reaction for an impact
    pub fn play_reaction(&mut self, impact: Vec3, host: &mut dyn CombatHost) -> HitDirection {
        let direction = hit_reaction::solve(self.transform.forward(), self.position(), impact);
        CueSelector::play_section(host, self.id, CueKind::HitReact, direction.section_name());
        direction
    }

    pub fn play_hit_effects(&self, impact: Vec3, host: &mut dyn CombatHost) {
        host.play_hit_sound(impact);
        host.spawn_hit_particles(impact);
    }

    /// Enable or disable the held weapon's hit volume. No-op without a weapon.
    pub fn set_weapon_collision(&mut self, enabled: bool, host: &mut dyn CombatHost) {
        if let Some(weapon) = self.weapon.as_mut() {
            weapon.set_collision(enabled);
            host.set_weapon_collision(self.id, enabled);
        }
    }

    /// Die: tag, death cue and pose, collision off, timers cancelled.
    /// Returns false if already dead.
    pub fn start_death(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.tags.insert(Tag::Dead);
        let index = CueSelector::select_random_section(
            &mut *ctx.rng,
            &mut *ctx.host,
            self.id,
            CueKind::Death,
            &ctx.config.cues.death_sections,
        );
        self.death_pose = index.and_then(DeathPose::from_index);
        self.set_weapon_collision(false, ctx.host);
        ctx.host.set_capsule_collision(self.id, false);
        ctx.host.set_orient_to_movement(self.id, false);
        ctx.scheduler.cancel_owner(self.id);
        self.combat_target = None;
        self.life = LifeState::Dead;
        self.action = ActionState::Dead;
        info!("{} died ({:?})", self.id, self.death_pose);
        true
    }

    /// The current target as seen this frame, if it still exists
    pub fn target_view<'r>(&self, roster: &'r Roster) -> Option<&'r TargetView> {
        roster.get(&self.combat_target?)
    }

    /// Whether the current target is within `radius`. False without a target.
    pub fn target_in_range(&self, roster: &Roster, radius: f32) -> bool {
        self.target_view(roster)
            .is_some_and(|t| self.position().distance(t.position) <= radius)
    }

    pub fn translation_warp_target(&self, roster: &Roster, distance: f32) -> Option<Vec3> {
        let target = self.target_view(roster).map(|t| t.position);
        hit_reaction::translation_warp_target(self.position(), target, distance)
    }

    pub fn rotation_warp_target(&self, roster: &Roster) -> Option<Vec3> {
        hit_reaction::rotation_warp_target(self.target_view(roster).map(|t| t.position))
    }

    /// This combatant as others see it
    pub fn view(&self) -> TargetView {
        TargetView {
            position: self.position(),
            tags: self.tags.clone(),
            alive: self.is_alive(),
            faction: self.faction,
        }
    }
}

/// Can be hurt
pub trait Damageable {
    /// Apply `amount` damage dealt by `instigator`
    fn take_damage(
        &mut self,
        amount: f32,
        instigator: Option<CombatantId>,
        ctx: &mut CombatContext<'_>,
    ) -> DamageOutcome;

    /// React to an impact, or die if health is gone
    fn get_hit(
        &mut self,
        impact: Vec3,
        hitter: Option<CombatantId>,
        ctx: &mut CombatContext<'_>,
    ) -> HitOutcome;
}

/// Can swing a weapon
pub trait Attacker {
    fn can_attack(&self, ctx: &CombatContext<'_>) -> bool;
    fn attack(&mut self, ctx: &mut CombatContext<'_>) -> bool;
    fn attack_end(&mut self, ctx: &mut CombatContext<'_>);
}

/// Can draw, sheathe and pick up weapons
pub trait Equippable {
    fn arm(&mut self, ctx: &mut CombatContext<'_>) -> bool;
    fn disarm(&mut self, ctx: &mut CombatContext<'_>) -> bool;
    fn equip_weapon(&mut self, weapon: Weapon, ctx: &mut CombatContext<'_>) -> bool;
}
