//! Enemy behaviour controller
//!
//! A patrol/chase/attack loop driven by distance thresholds and two timers.
//! While patrolling the enemy walks between waypoints and waits at each one.
//! Once it has a target it chases, commits to an attack after a short random
//! delay, and re-evaluates as soon as the swing ends.

use glam::Vec3;
use rand::Rng;
use riposte_core::Transform;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::attributes::AttributeLedger;
use crate::combatant::{
    ActionState, Attacker, CombatContext, CombatantCore, CombatantId, DamageOutcome, Damageable,
    Faction, HitOutcome, Tag, TagSet,
};
use crate::config::CombatConfig;
use crate::cues::{random_delay, CueKind, CueSelector};
use crate::host::CombatHost;
use crate::player::AnimationSignal;
use crate::scheduler::{TimerKey, TimerKind};
use crate::weapon::{Weapon, WeaponSocket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Between a finished swing and the next decision
    Idle,
    Patrolling,
    Chasing,
    /// Waiting on the attack timer
    Attacking,
    /// Swinging
    Engaged,
    Dead,
}

impl BehaviorState {
    /// States in which the enemy tracks a combat target
    pub fn is_combat_aware(self) -> bool {
        matches!(
            self,
            BehaviorState::Chasing | BehaviorState::Attacking | BehaviorState::Engaged
        )
    }

    /// Attacking and Engaged are two halves of one commitment
    pub fn is_committed(self) -> bool {
        matches!(self, BehaviorState::Attacking | BehaviorState::Engaged)
    }
}

/// Ordered waypoints an enemy wanders between
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatrolRoute {
    waypoints: Vec<Vec3>,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.waypoints.get(index).copied()
    }

    /// Uniformly pick a waypoint other than `current`. Routes with fewer than
    /// two waypoints have nowhere else to go.
    pub fn choose_next<R: Rng + ?Sized>(&self, current: Option<usize>, rng: &mut R) -> Option<usize> {
        if self.waypoints.len() <= 1 {
            return None;
        }
        let candidates: Vec<usize> = (0..self.waypoints.len())
            .filter(|i| Some(*i) != current)
            .collect();
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}

#[derive(Debug, Clone)]
pub struct EnemyBehaviorController {
    pub core: CombatantCore,
    behavior: BehaviorState,
    route: PatrolRoute,
    patrol_target: Option<usize>,
    health_bar_visible: bool,
}

impl EnemyBehaviorController {
    /// Create an enemy holding `weapon` and start it walking its route
    pub fn spawn(
        id: CombatantId,
        transform: Transform,
        attributes: AttributeLedger,
        route: PatrolRoute,
        weapon: Option<Weapon>,
        config: &CombatConfig,
        host: &mut dyn CombatHost,
    ) -> Self {
        let mut core = CombatantCore::new(id, transform, attributes, Faction::Hostile);
        core.tags.insert(Tag::Enemy);
        if let Some(mut weapon) = weapon {
            weapon.attach(WeaponSocket::Hand);
            host.attach_weapon(id, WeaponSocket::Hand);
            core.weapon = Some(weapon);
        }

        let mut enemy = Self {
            core,
            behavior: BehaviorState::Patrolling,
            patrol_target: if route.is_empty() { None } else { Some(0) },
            route,
            health_bar_visible: true,
        };
        enemy.hide_health_bar(host);
        host.set_max_speed(id, config.enemy.patrolling_speed);
        enemy.move_to_patrol_target(config, host);
        enemy
    }

    pub fn behavior(&self) -> BehaviorState {
        self.behavior
    }

    pub fn patrol_target(&self) -> Option<usize> {
        self.patrol_target
    }

    pub fn route(&self) -> &PatrolRoute {
        &self.route
    }

    pub fn health_bar_visible(&self) -> bool {
        self.health_bar_visible
    }

    fn set_behavior(&mut self, next: BehaviorState) {
        if self.behavior != next {
            debug!("{} {:?} -> {:?}", self.core.id, self.behavior, next);
            self.behavior = next;
        }
    }

    fn timer(&self, kind: TimerKind) -> TimerKey {
        TimerKey::new(self.core.id, kind)
    }

    /// Per-frame decision
    pub fn tick(&mut self, ctx: &mut CombatContext<'_>) {
        match self.behavior {
            BehaviorState::Dead => {}
            BehaviorState::Patrolling => self.check_patrol_target(ctx),
            _ => self.check_combat_target(ctx),
        }
    }

    /// Pick the next waypoint and start waiting once the current one is reached
    pub fn check_patrol_target(&mut self, ctx: &mut CombatContext<'_>) {
        let Some(target) = self.patrol_target.and_then(|i| self.route.get(i)) else {
            return;
        };
        if self.core.position().distance(target) > ctx.config.enemy.patrol_radius {
            return;
        }
        self.patrol_target = self.route.choose_next(self.patrol_target, &mut *ctx.rng);
        let tuning = &ctx.config.enemy;
        let wait = random_delay(&mut *ctx.rng, tuning.wait_min, tuning.wait_max);
        ctx.scheduler.arm(self.timer(TimerKind::Patrol), wait);
    }

    /// The patrol wait is over
    pub fn on_patrol_timer(&mut self, ctx: &mut CombatContext<'_>) {
        if self.behavior != BehaviorState::Patrolling {
            return;
        }
        self.move_to_patrol_target(ctx.config, ctx.host);
    }

    /// Re-evaluate the combat target against the combat and attack radii
    pub fn check_combat_target(&mut self, ctx: &mut CombatContext<'_>) {
        let combat_radius = ctx.config.enemy.combat_radius;
        let attack_radius = ctx.config.enemy.attack_radius;
        if !self.core.target_in_range(ctx.roster, combat_radius) {
            ctx.scheduler.cancel(self.timer(TimerKind::Attack));
            self.lose_interest(ctx.host);
            if self.behavior != BehaviorState::Engaged {
                self.start_patrolling(ctx);
            }
        } else if !self.core.target_in_range(ctx.roster, attack_radius)
            && self.behavior != BehaviorState::Chasing
        {
            ctx.scheduler.cancel(self.timer(TimerKind::Attack));
            if self.behavior != BehaviorState::Engaged {
                self.chase_target(ctx);
            }
        } else if self.can_attack(ctx) {
            self.start_attack_timer(ctx);
        }
    }

    fn lose_interest(&mut self, host: &mut dyn CombatHost) {
        if let Some(target) = self.core.combat_target.take() {
            debug!("{} lost interest in {}", self.core.id, target);
        }
        self.hide_health_bar(host);
    }

    fn start_patrolling(&mut self, ctx: &mut CombatContext<'_>) {
        self.set_behavior(BehaviorState::Patrolling);
        ctx.host
            .set_max_speed(self.core.id, ctx.config.enemy.patrolling_speed);
        self.move_to_patrol_target(ctx.config, ctx.host);
    }

    fn chase_target(&mut self, ctx: &mut CombatContext<'_>) {
        self.set_behavior(BehaviorState::Chasing);
        ctx.host
            .set_max_speed(self.core.id, ctx.config.enemy.chasing_speed);
        if let Some(target) = self.core.target_view(ctx.roster) {
            ctx.host.move_to(
                self.core.id,
                target.position,
                ctx.config.enemy.acceptance_radius,
            );
        }
    }

    fn start_attack_timer(&mut self, ctx: &mut CombatContext<'_>) {
        self.set_behavior(BehaviorState::Attacking);
        let tuning = &ctx.config.enemy;
        let delay = random_delay(&mut *ctx.rng, tuning.attack_min, tuning.attack_max);
        ctx.scheduler.arm(self.timer(TimerKind::Attack), delay);
    }

    /// The attack delay is over
    pub fn on_attack_timer(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        self.core.is_alive() && self.attack(ctx)
    }

    fn move_to_patrol_target(&self, config: &CombatConfig, host: &mut dyn CombatHost) {
        if let Some(target) = self.patrol_target.and_then(|i| self.route.get(i)) {
            host.move_to(self.core.id, target, config.enemy.acceptance_radius);
        }
    }

    fn show_health_bar(&mut self, host: &mut dyn CombatHost) {
        if !self.health_bar_visible {
            self.health_bar_visible = true;
            host.set_health_bar_visible(self.core.id, true);
        }
    }

    fn hide_health_bar(&mut self, host: &mut dyn CombatHost) {
        if self.health_bar_visible {
            self.health_bar_visible = false;
            host.set_health_bar_visible(self.core.id, false);
        }
    }

    /// Perception reported `seen`. Only a patrolling enemy reacts.
    pub fn actor_seen(
        &mut self,
        seen: CombatantId,
        tags: &TagSet,
        ctx: &mut CombatContext<'_>,
    ) -> bool {
        let should_chase = self.behavior == BehaviorState::Patrolling
            && seen != self.core.id
            && tags.contains(Tag::EngageableTarget)
            && !tags.contains(Tag::Dead);
        if !should_chase {
            trace!("{} ignores {}", self.core.id, seen);
            return false;
        }
        self.core.combat_target = Some(seen);
        ctx.scheduler.cancel(self.timer(TimerKind::Patrol));
        self.chase_target(ctx);
        true
    }

    pub fn on_animation_signal(&mut self, signal: AnimationSignal, ctx: &mut CombatContext<'_>) {
        match signal {
            AnimationSignal::AttackEnd => self.attack_end(ctx),
            AnimationSignal::HitReactEnd => {
                self.core.finish_phase(ActionState::HitReaction);
            }
            AnimationSignal::SwingWindow(open) => {
                if !open || self.behavior == BehaviorState::Engaged {
                    self.core.set_weapon_collision(open, ctx.host);
                }
            }
            AnimationSignal::DodgeEnd
            | AnimationSignal::EquipFinished
            | AnimationSignal::AttachWeaponToBack
            | AnimationSignal::AttachWeaponToHand => {}
        }
    }

    fn die(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        if !self.core.start_death(ctx) {
            return false;
        }
        self.set_behavior(BehaviorState::Dead);
        self.hide_health_bar(ctx.host);
        true
    }
}

impl Attacker for EnemyBehaviorController {
    fn can_attack(&self, ctx: &CombatContext<'_>) -> bool {
        self.core.is_alive()
            && !self.behavior.is_committed()
            && self.behavior != BehaviorState::Dead
            && self
                .core
                .target_in_range(ctx.roster, ctx.config.enemy.attack_radius)
    }

    fn attack(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        if self
            .core
            .target_view(ctx.roster)
            .is_some_and(|t| !t.alive || t.tags.contains(Tag::Dead))
        {
            self.core.combat_target = None;
        }
        if self.core.target_view(ctx.roster).is_none() {
            trace!("{} has nothing to attack", self.core.id);
            return false;
        }
        self.set_behavior(BehaviorState::Engaged);
        CueSelector::select_random_section(
            &mut *ctx.rng,
            &mut *ctx.host,
            self.core.id,
            CueKind::Attack,
            &ctx.config.cues.attack_sections,
        );
        self.core.interrupt(ActionState::Attacking);
        true
    }

    fn attack_end(&mut self, ctx: &mut CombatContext<'_>) {
        if self.behavior != BehaviorState::Engaged {
            return;
        }
        self.core.finish_phase(ActionState::Attacking);
        self.set_behavior(BehaviorState::Idle);
        self.check_combat_target(ctx);
    }
}

impl Damageable for EnemyBehaviorController {
    fn take_damage(
        &mut self,
        amount: f32,
        instigator: Option<CombatantId>,
        ctx: &mut CombatContext<'_>,
    ) -> DamageOutcome {
        let outcome = self.core.apply_damage(amount, ctx.host);
        if outcome == DamageOutcome::Ignored {
            return outcome;
        }
        if let Some(instigator) = instigator.filter(|i| *i != self.core.id) {
            self.core.combat_target = Some(instigator);
        }
        if self.core.target_view(ctx.roster).is_some() {
            if self.core.target_in_range(ctx.roster, ctx.config.enemy.attack_radius) {
                self.set_behavior(BehaviorState::Attacking);
            } else {
                self.chase_target(ctx);
            }
        }
        outcome
    }

    fn get_hit(
        &mut self,
        impact: Vec3,
        _hitter: Option<CombatantId>,
        ctx: &mut CombatContext<'_>,
    ) -> HitOutcome {
        if !self.core.is_alive() {
            return HitOutcome::Ignored;
        }

        let outcome = if self.core.attributes.is_alive() {
            if self.behavior != BehaviorState::Patrolling {
                self.show_health_bar(ctx.host);
            }
            HitOutcome::Reacted(self.core.play_reaction(impact, ctx.host))
        } else {
            self.die(ctx);
            HitOutcome::Died
        };
        self.core.play_hit_effects(impact, ctx.host);

        // A hit with nobody to blame leaves the patrol wait running.
        if self.behavior != BehaviorState::Patrolling {
            ctx.scheduler.cancel(self.timer(TimerKind::Patrol));
        }
        ctx.scheduler.cancel(self.timer(TimerKind::Attack));
        self.core.set_weapon_collision(false, ctx.host);
        ctx.host.stop_cue(
            self.core.id,
            CueKind::Attack,
            ctx.config.enemy.stop_attack_blend,
        );

        if self.core.is_alive() {
            // A stopped swing never raises AttackEnd, so release the commitment here.
            if self.core.action() == ActionState::Attacking {
                self.core.interrupt(ActionState::Unoccupied);
            }
            if self.behavior == BehaviorState::Engaged {
                self.set_behavior(BehaviorState::Idle);
            }
            if self.core.target_in_range(ctx.roster, ctx.config.enemy.attack_radius) {
                self.start_attack_timer(ctx);
            }
        }
        outcome
    }
}
