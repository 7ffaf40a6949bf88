//! The combat simulation
//!
//! Owns every combatant, pickup and prop together with the scheduler, the
//! seeded random source and the frame clock. The host drives it with
//! `tick` once per frame and forwards engine callbacks (animation signals,
//! overlaps, perception) through the event methods. Each call runs to
//! completion on the caller's thread; nothing here is shared or locked.

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use riposte_core::{GameTime, Transform};
use riposte_ecs::Registry;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::attributes::AttributeLedger;
use crate::breakable::{BreakOutcome, BreakableProp, PropId};
use crate::combatant::{
    ActionState, CombatContext, CombatantCore, CombatantId, DamageOutcome, Damageable, HitOutcome,
    LifeState, Roster, TagSet,
};
use crate::config::CombatConfig;
use crate::enemy::{BehaviorState, EnemyBehaviorController, PatrolRoute};
use crate::host::CombatHost;
use crate::pickup::{Pickup, PickupId, PickupKind};
use crate::player::{AnimationSignal, PlayerActionController, PlayerInput};
use crate::scheduler::{FiredTimer, Scheduler, TimerKind};
use crate::weapon::Weapon;

/// Any combatant the simulation owns
#[derive(Debug, Clone)]
pub enum Combatant {
    Player(PlayerActionController),
    Enemy(EnemyBehaviorController),
}

impl Combatant {
    pub fn core(&self) -> &CombatantCore {
        match self {
            Combatant::Player(p) => &p.core,
            Combatant::Enemy(e) => &e.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut CombatantCore {
        match self {
            Combatant::Player(p) => &mut p.core,
            Combatant::Enemy(e) => &mut e.core,
        }
    }

    pub fn as_player(&self) -> Option<&PlayerActionController> {
        match self {
            Combatant::Player(p) => Some(p),
            Combatant::Enemy(_) => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyBehaviorController> {
        match self {
            Combatant::Enemy(e) => Some(e),
            Combatant::Player(_) => None,
        }
    }

    fn tick(&mut self, dt: f32, ctx: &mut CombatContext<'_>) {
        match self {
            Combatant::Player(p) => p.tick(dt, ctx),
            Combatant::Enemy(e) => e.tick(ctx),
        }
    }

    fn on_animation_signal(&mut self, signal: AnimationSignal, ctx: &mut CombatContext<'_>) {
        match self {
            Combatant::Player(p) => p.on_animation_signal(signal, ctx),
            Combatant::Enemy(e) => e.on_animation_signal(signal, ctx),
        }
    }
}

impl Damageable for Combatant {
    fn take_damage(
        &mut self,
        amount: f32,
        instigator: Option<CombatantId>,
        ctx: &mut CombatContext<'_>,
    ) -> DamageOutcome {
        match self {
            Combatant::Player(p) => p.take_damage(amount, instigator, ctx),
            Combatant::Enemy(e) => e.take_damage(amount, instigator, ctx),
        }
    }

    fn get_hit(
        &mut self,
        impact: Vec3,
        hitter: Option<CombatantId>,
        ctx: &mut CombatContext<'_>,
    ) -> HitOutcome {
        match self {
            Combatant::Player(p) => p.get_hit(impact, hitter, ctx),
            Combatant::Enemy(e) => e.get_hit(impact, hitter, ctx),
        }
    }
}

/// Per-simulation services handed to controllers
struct Services {
    scheduler: Scheduler,
    rng: ChaCha8Rng,
    config: CombatConfig,
}

impl Services {
    fn context<'a>(
        &'a mut self,
        host: &'a mut dyn CombatHost,
        roster: &'a Roster,
    ) -> CombatContext<'a> {
        CombatContext {
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            host,
            config: &self.config,
            roster,
        }
    }
}

pub struct CombatSimulation {
    combatants: Registry<Combatant>,
    pickups: Registry<Pickup>,
    props: Registry<BreakableProp>,
    services: Services,
    time: GameTime,
    /// Corpses awaiting removal, with seconds left
    lifespans: Vec<(CombatantId, f32)>,
}

impl CombatSimulation {
    /// Create an empty simulation. The same config and seed replay the same fight.
    pub fn new(config: CombatConfig, seed: u64) -> Self {
        Self {
            combatants: Registry::new(),
            pickups: Registry::new(),
            props: Registry::new(),
            time: GameTime::new(config.time.clone()),
            services: Services {
                scheduler: Scheduler::new(),
                rng: ChaCha8Rng::seed_from_u64(seed),
                config,
            },
            lifespans: Vec::new(),
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.services.config
    }

    pub fn time(&self) -> &GameTime {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut GameTime {
        &mut self.time
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.services.scheduler
    }

    pub fn spawn_player(&mut self, transform: Transform, host: &mut dyn CombatHost) -> CombatantId {
        let attributes = AttributeLedger::from(&self.services.config.attributes);
        let id = self.combatants.insert_with(|id| {
            Combatant::Player(PlayerActionController::spawn(id, transform, attributes, host))
        });
        info!("Spawned player {}", id);
        id
    }

    pub fn spawn_enemy(
        &mut self,
        transform: Transform,
        route: PatrolRoute,
        weapon: Option<Weapon>,
        host: &mut dyn CombatHost,
    ) -> CombatantId {
        let config = &self.services.config;
        let attributes = AttributeLedger::from(&config.attributes);
        let id = self.combatants.insert_with(|id| {
            Combatant::Enemy(EnemyBehaviorController::spawn(
                id, transform, attributes, route, weapon, config, host,
            ))
        });
        info!("Spawned enemy {}", id);
        id
    }

    pub fn spawn_breakable(&mut self, position: Vec3, treasure_values: Vec<u32>) -> PropId {
        self.props
            .insert(BreakableProp::new(position, treasure_values))
    }

    /// Snapshot of what every combatant looks like right now
    fn roster(&self) -> Roster {
        self.combatants
            .iter()
            .map(|(id, c)| (id, c.core().view()))
            .collect()
    }

    /// Advance one frame: clock, combatant decisions, due timers, corpse removal
    pub fn tick(&mut self, raw_dt: f32, host: &mut dyn CombatHost) {
        self.time.update(raw_dt);
        let dt = self.time.delta;

        for id in self.combatants.handles() {
            let roster = self.roster();
            let mut ctx = self.services.context(host, &roster);
            if let Some(combatant) = self.combatants.get_mut(id) {
                combatant.tick(dt, &mut ctx);
            }
        }

        for timer in self.services.scheduler.advance(dt) {
            self.dispatch_timer(timer, host);
        }

        self.expire_lifespans(dt, host);
    }

    fn dispatch_timer(&mut self, timer: FiredTimer, host: &mut dyn CombatHost) {
        let roster = self.roster();
        let mut ctx = self.services.context(host, &roster);
        let Some(Combatant::Enemy(enemy)) = self.combatants.get_mut(timer.key.owner) else {
            trace!("Dropping {:?} timer for missing {}", timer.key.kind, timer.key.owner);
            return;
        };
        match timer.key.kind {
            TimerKind::Patrol => enemy.on_patrol_timer(&mut ctx),
            TimerKind::Attack => {
                enemy.on_attack_timer(&mut ctx);
            }
        }
    }

    fn expire_lifespans(&mut self, dt: f32, host: &mut dyn CombatHost) {
        let mut expired = Vec::new();
        self.lifespans.retain_mut(|(id, remaining)| {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(*id);
                false
            } else {
                true
            }
        });

        for id in expired {
            if self.services.scheduler.owner_has_timers(id) {
                warn!("{} still held timers at removal", id);
                self.services.scheduler.cancel_owner(id);
            }
            if self.combatants.remove(id).is_some() {
                host.despawn_combatant(id);
                info!("Removed {}", id);
            }
        }
    }

    /// Player button press. Returns whether the action was accepted.
    pub fn input(&mut self, player: CombatantId, input: PlayerInput, host: &mut dyn CombatHost) -> bool {
        let roster = self.roster();
        let mut ctx = self.services.context(host, &roster);
        match self.combatants.get_mut(player) {
            Some(Combatant::Player(p)) => p.handle_input(input, &mut ctx),
            _ => false,
        }
    }

    /// End-of-cue and notify callbacks from the animation driver
    pub fn animation_signal(&mut self, id: CombatantId, signal: AnimationSignal, host: &mut dyn CombatHost) {
        let roster = self.roster();
        let mut ctx = self.services.context(host, &roster);
        if let Some(combatant) = self.combatants.get_mut(id) {
            combatant.on_animation_signal(signal, &mut ctx);
        }
    }

    /// Perception: `observer` noticed `seen` carrying `tags`
    pub fn actor_seen(
        &mut self,
        observer: CombatantId,
        seen: CombatantId,
        tags: &TagSet,
        host: &mut dyn CombatHost,
    ) -> bool {
        if !self.combatants.contains(seen) {
            return false;
        }
        let roster = self.roster();
        let mut ctx = self.services.context(host, &roster);
        match self.combatants.get_mut(observer) {
            Some(Combatant::Enemy(e)) => e.actor_seen(seen, tags, &mut ctx),
            _ => false,
        }
    }

    /// `attacker`'s weapon volume overlapped `victim` at `impact`
    pub fn weapon_overlap(
        &mut self,
        attacker: CombatantId,
        victim: CombatantId,
        impact: Vec3,
        host: &mut dyn CombatHost,
    ) -> HitOutcome {
        if attacker == victim {
            return HitOutcome::Ignored;
        }
        let Some(victim_view) = self.combatants.get(victim).map(|c| c.core().view()) else {
            return HitOutcome::Ignored;
        };
        let Some(core) = self.combatants.get_mut(attacker).map(|c| c.core_mut()) else {
            return HitOutcome::Ignored;
        };
        if !core.is_alive() || !victim_view.alive || core.faction == victim_view.faction {
            trace!("{} -> {} overlap ignored", attacker, victim);
            return HitOutcome::Ignored;
        }
        let Some(weapon) = core.weapon.as_mut() else {
            return HitOutcome::Ignored;
        };
        if !weapon.register_hit(victim) {
            return HitOutcome::Ignored;
        }
        let damage = weapon.damage;
        self.apply_hit(victim, Some(attacker), damage, impact, host)
    }

    /// Damage then hit reaction as one step
    pub fn apply_hit(
        &mut self,
        victim: CombatantId,
        instigator: Option<CombatantId>,
        damage: f32,
        impact: Vec3,
        host: &mut dyn CombatHost,
    ) -> HitOutcome {
        let roster = self.roster();
        let mut ctx = self.services.context(host, &roster);
        let Some(combatant) = self.combatants.get_mut(victim) else {
            return HitOutcome::Ignored;
        };
        combatant.take_damage(damage, instigator, &mut ctx);
        let outcome = combatant.get_hit(impact, instigator, &mut ctx);
        debug!("{} hit for {:.1}: {:?}", victim, damage, outcome);

        if outcome == HitOutcome::Died {
            if let Combatant::Enemy(enemy) = combatant {
                let (souls, gold) = (enemy.core.attributes.souls(), enemy.core.attributes.gold());
                let position = enemy.core.position()
                    + Vec3::Y * self.services.config.enemy.drop_height_offset;
                self.lifespans
                    .push((victim, self.services.config.enemy.death_life_span));
                self.spawn_pickup(Pickup::souls(souls, position), host);
                if gold > 0 {
                    self.spawn_pickup(Pickup::gold(gold, position), host);
                }
            }
        }
        outcome
    }

    /// `attacker`'s weapon volume overlapped a breakable prop
    pub fn prop_overlap(
        &mut self,
        attacker: CombatantId,
        prop: PropId,
        impact: Vec3,
        host: &mut dyn CombatHost,
    ) -> bool {
        let swinging = self
            .combatants
            .get(attacker)
            .and_then(|c| c.core().weapon.as_ref())
            .is_some_and(|w| w.hit_volume_enabled());
        if !swinging {
            return false;
        }
        let Some(target) = self.props.get_mut(prop) else {
            return false;
        };
        match target.break_open(&mut self.services.rng) {
            BreakOutcome::AlreadyBroken => false,
            BreakOutcome::Broken(treasure) => {
                let position = target.position;
                host.play_hit_sound(impact);
                info!("Prop {} broken", prop);
                if let Some(gold) = treasure {
                    let drop_at = position + Vec3::Y * self.services.config.props.treasure_height_offset;
                    self.spawn_pickup(Pickup::gold(gold, drop_at), host);
                }
                true
            }
        }
    }

    fn spawn_pickup(&mut self, pickup: Pickup, host: &mut dyn CombatHost) -> PickupId {
        let (kind, amount, position) = (pickup.kind, pickup.amount, pickup.position);
        let id = self.pickups.insert(pickup);
        host.spawn_pickup(id, kind, amount, position);
        debug!("Spawned {:?} x{} as {}", kind, amount, id);
        id
    }

    /// The player walked into a pickup
    pub fn pickup_overlap(&mut self, player: CombatantId, pickup: PickupId, host: &mut dyn CombatHost) -> bool {
        let Some(Combatant::Player(p)) = self.combatants.get_mut(player) else {
            return false;
        };
        if !p.core.is_alive() {
            return false;
        }
        let Some(item) = self.pickups.remove(pickup) else {
            return false;
        };
        match item.kind {
            PickupKind::Souls => p.add_souls(item.amount, host),
            PickupKind::Gold => p.add_gold(item.amount, host),
        }
        host.despawn_pickup(pickup);
        true
    }

    /// A world weapon came into (or left) the player's reach
    pub fn set_overlapping_weapon(&mut self, player: CombatantId, weapon: Option<Weapon>) -> bool {
        match self.combatants.get_mut(player) {
            Some(Combatant::Player(p)) => {
                p.set_overlapping_weapon(weapon);
                true
            }
            _ => false,
        }
    }

    /// Movement is executed by the host; it reports the result here
    pub fn set_transform(&mut self, id: CombatantId, transform: Transform) -> bool {
        match self.combatants.get_mut(id) {
            Some(c) => {
                c.core_mut().transform = transform;
                true
            }
            None => false,
        }
    }

    /// Where `id` should lunge to and face while attacking its target
    pub fn warp_targets(&self, id: CombatantId) -> Option<(Vec3, Vec3)> {
        let roster = self.roster();
        let core = self.combatants.get(id)?.core();
        let translation =
            core.translation_warp_target(&roster, self.services.config.warp.target_distance)?;
        let rotation = core.rotation_warp_target(&roster)?;
        Some((translation, rotation))
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(id)
    }

    pub fn player(&self, id: CombatantId) -> Option<&PlayerActionController> {
        self.combatants.get(id)?.as_player()
    }

    pub fn enemy(&self, id: CombatantId) -> Option<&EnemyBehaviorController> {
        self.combatants.get(id)?.as_enemy()
    }

    pub fn combatants(&self) -> impl Iterator<Item = (CombatantId, &Combatant)> {
        self.combatants.iter()
    }

    pub fn pickups(&self) -> impl Iterator<Item = (PickupId, &Pickup)> {
        self.pickups.iter()
    }

    pub fn prop(&self, id: PropId) -> Option<&BreakableProp> {
        self.props.get(id)
    }

    /// Serializable snapshot of the whole fight
    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            elapsed: self.time.elapsed,
            frames: self.time.frames,
            combatants: self
                .combatants
                .iter()
                .map(|(id, c)| CombatantSummary::new(id, c))
                .collect(),
            pickups: self
                .pickups
                .iter()
                .map(|(_, p)| (p.kind, p.amount))
                .collect(),
            armed_timers: self.services.scheduler.armed_count(),
            pending_removals: self.lifespans.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub elapsed: f64,
    pub frames: u64,
    pub combatants: Vec<CombatantSummary>,
    pub pickups: Vec<(PickupKind, u32)>,
    pub armed_timers: usize,
    pub pending_removals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatantSummary {
    pub id: CombatantId,
    pub kind: &'static str,
    pub life: LifeState,
    pub action: ActionState,
    pub behavior: Option<BehaviorState>,
    pub health: f32,
    pub stamina: f32,
    pub souls: u32,
    pub gold: u32,
    pub position: Vec3,
}

impl CombatantSummary {
    fn new(id: CombatantId, combatant: &Combatant) -> Self {
        let core = combatant.core();
        Self {
            id,
            kind: match combatant {
                Combatant::Player(_) => "player",
                Combatant::Enemy(_) => "enemy",
            },
            life: core.life(),
            action: core.action(),
            behavior: combatant.as_enemy().map(|e| e.behavior()),
            health: core.attributes.health(),
            stamina: core.attributes.stamina(),
            souls: core.attributes.souls(),
            gold: core.attributes.gold(),
            position: core.position(),
        }
    }
}
