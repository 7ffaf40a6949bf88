//! Headless arena
//!
//! Stands in for the engine around the combat core. Commands the core issues
//! are recorded in a `CommandLog` and played back here: bodies walk towards
//! their move targets, animation sections raise their signals after a fixed
//! delay and open weapon volumes overlap anything within reach. A small
//! scripted brain drives the player.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use riposte_combat::{
    AnimationSignal, CombatConfig, CombatSimulation, CombatantId, CommandLog, CueKind, HitOutcome,
    HostCommand, PatrolRoute, PlayerInput, PropId, SimulationSummary, Weapon,
};
use riposte_core::Transform;
use serde::Serialize;
use tracing::{debug, info};

use crate::settings::{ArenaSettings, ScenarioSettings};

/// Signal delays after a section starts, in seconds
const ATTACK_SIGNALS: [(f64, AnimationSignal); 3] = [
    (0.25, AnimationSignal::SwingWindow(true)),
    (0.45, AnimationSignal::SwingWindow(false)),
    (0.7, AnimationSignal::AttackEnd),
];
const HIT_REACT_END: f64 = 0.4;
const DODGE_END: f64 = 0.5;
const WEAPON_SWAP: f64 = 0.3;
const EQUIP_END: f64 = 0.6;

/// Height above the feet where strikes land
const STRIKE_HEIGHT: f32 = 50.0;

#[derive(Debug, Clone)]
struct PendingSignal {
    at: f64,
    owner: CombatantId,
    cue: CueKind,
    signal: AnimationSignal,
}

/// Movement state the navigator would own
#[derive(Debug, Clone, Copy, Default)]
struct Body {
    destination: Option<Vec3>,
    acceptance_radius: f32,
    max_speed: f32,
}

/// Tallies printed at the end of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArenaReport {
    pub hits: u32,
    pub kills: u32,
    pub props_broken: u32,
    pub pickups_collected: u32,
    pub host_commands: usize,
    pub summary: Option<SimulationSummary>,
}

pub struct Arena {
    sim: CombatSimulation,
    log: CommandLog,
    scenario: ScenarioSettings,
    unequip_section: String,
    player: CombatantId,
    enemies: Vec<CombatantId>,
    props: Vec<PropId>,
    bodies: HashMap<CombatantId, Body>,
    open_weapons: HashSet<CombatantId>,
    pending: Vec<PendingSignal>,
    clock: f64,
    report: ArenaReport,
}

impl Arena {
    /// Stage the scenario described by `settings`
    pub fn new(settings: &ArenaSettings, config: CombatConfig) -> Self {
        let scenario = settings.scenario.clone();
        let unequip_section = config.cues.unequip_section.clone();
        let mut sim = CombatSimulation::new(config, settings.run.seed);
        let mut log = CommandLog::new();

        let player = sim.spawn_player(Transform::from_position(scenario.player_start), &mut log);
        sim.set_overlapping_weapon(
            player,
            Some(Weapon::one_handed("Longsword", scenario.player_weapon_damage)),
        );

        let enemies = scenario
            .enemies
            .iter()
            .map(|spawn| {
                sim.spawn_enemy(
                    Transform::from_position(spawn.position),
                    PatrolRoute::new(spawn.route.clone()),
                    spawn.weapon_damage.map(|d| Weapon::one_handed("Cleaver", d)),
                    &mut log,
                )
            })
            .collect();

        let props = scenario
            .props
            .iter()
            .map(|p| sim.spawn_breakable(p.position, p.treasure.clone()))
            .collect();

        let mut arena = Self {
            sim,
            log,
            scenario,
            unequip_section,
            player,
            enemies,
            props,
            bodies: HashMap::new(),
            open_weapons: HashSet::new(),
            pending: Vec::new(),
            clock: 0.0,
            report: ArenaReport::default(),
        };
        arena.absorb_commands();
        info!(
            "Arena staged: {} enemies, {} props",
            arena.enemies.len(),
            arena.props.len()
        );
        arena
    }

    /// Run `frames` frames of `dt` seconds, stopping early once the fight is decided
    pub fn run(&mut self, frames: u32, dt: f32) -> &ArenaReport {
        for frame in 0..frames {
            self.step(dt);
            if self.decided() {
                info!("Fight decided after {} frames", frame + 1);
                break;
            }
        }
        self.report.summary = Some(self.sim.summary());
        &self.report
    }

    fn decided(&self) -> bool {
        let player_down = self.sim.player(self.player).map_or(true, |p| !p.core.is_alive());
        let enemies_down = self
            .enemies
            .iter()
            .all(|e| self.sim.enemy(*e).map_or(true, |e| !e.core.is_alive()));
        let corpses_cleared = self.sim.summary().pending_removals == 0;
        player_down || (enemies_down && corpses_cleared)
    }

    /// One frame: player brain, perception, engine playback, then the core's tick
    pub fn step(&mut self, dt: f32) {
        self.clock += f64::from(dt);
        self.drive_player(dt);
        self.perceive();
        self.move_bodies(dt);
        self.raise_signals();
        self.resolve_overlaps();
        self.sim.tick(dt, &mut self.log);
        self.absorb_commands();
    }

    fn position(&self, id: CombatantId) -> Option<Vec3> {
        self.sim.combatant(id).map(|c| c.core().position())
    }

    fn drive_player(&mut self, dt: f32) {
        let Some(hero) = self.sim.player(self.player) else {
            return;
        };
        if !hero.core.is_alive() || !hero.can_move() {
            return;
        }
        let armed = hero.core.weapon.is_some();
        let start = hero.core.transform;

        if !armed {
            self.sim.input(self.player, PlayerInput::Interact, &mut self.log);
            self.absorb_commands();
            return;
        }

        let goal = self.player_goal(start.position);
        let Some((goal, engage)) = goal else {
            return;
        };
        let distance = start.position.distance(goal);
        let mut transform = start;
        transform.face_towards(goal);
        if engage && distance <= self.scenario.weapon_reach * 0.8 {
            self.sim.set_transform(self.player, transform);
            self.sim.input(self.player, PlayerInput::Attack, &mut self.log);
        } else {
            let step = (self.scenario.player_speed * dt).min(distance);
            transform.translate((goal - start.position).normalize_or_zero() * step);
            self.sim.set_transform(self.player, transform);
        }
        self.absorb_commands();
    }

    /// Nearest unbroken prop, then nearest pickup, then nearest live enemy
    fn player_goal(&self, from: Vec3) -> Option<(Vec3, bool)> {
        let nearest = |points: Vec<Vec3>| {
            points
                .into_iter()
                .min_by(|a, b| a.distance(from).total_cmp(&b.distance(from)))
        };

        let props: Vec<Vec3> = self
            .props
            .iter()
            .filter_map(|id| self.sim.prop(*id))
            .filter(|p| !p.is_broken())
            .map(|p| p.position)
            .collect();
        if let Some(prop) = nearest(props) {
            return Some((prop, true));
        }

        let pickups: Vec<Vec3> = self.sim.pickups().map(|(_, p)| p.position).collect();
        if let Some(pickup) = nearest(pickups) {
            return Some((Vec3::new(pickup.x, from.y, pickup.z), false));
        }

        let foes: Vec<Vec3> = self
            .enemies
            .iter()
            .filter_map(|id| self.sim.enemy(*id))
            .filter(|e| e.core.is_alive())
            .map(|e| e.core.position())
            .collect();
        nearest(foes).map(|foe| (foe, true))
    }

    fn perceive(&mut self) {
        let Some(hero) = self.sim.combatant(self.player) else {
            return;
        };
        let tags = hero.core().tags.clone();
        let seen_at = hero.core().position();
        for enemy in self.enemies.clone() {
            let close = self
                .position(enemy)
                .is_some_and(|p| p.distance(seen_at) <= self.scenario.sight_radius);
            if close && self.sim.actor_seen(enemy, self.player, &tags, &mut self.log) {
                debug!("{} spotted the player", enemy);
            }
        }
        self.absorb_commands();
    }

    fn move_bodies(&mut self, dt: f32) {
        let mut moves = Vec::new();
        for (id, body) in &mut self.bodies {
            let Some(destination) = body.destination else {
                continue;
            };
            let Some(combatant) = self.sim.combatant(*id) else {
                continue;
            };
            let core = combatant.core();
            if !core.is_alive() || !core.can_begin_action() {
                continue;
            }
            let mut transform = core.transform;
            let to_go = transform.position.distance(destination);
            if to_go <= body.acceptance_radius {
                body.destination = None;
                continue;
            }
            let step = (body.max_speed * dt).min(to_go - body.acceptance_radius);
            transform.face_towards(destination);
            transform.translate((destination - transform.position).normalize_or_zero() * step);
            moves.push((*id, transform));
        }
        for (id, transform) in moves {
            self.sim.set_transform(id, transform);
        }
    }

    fn raise_signals(&mut self) {
        let now = self.clock;
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.at <= now);
        self.pending = waiting;
        for signal in due {
            self.sim
                .animation_signal(signal.owner, signal.signal, &mut self.log);
            self.absorb_commands();
        }
    }

    fn resolve_overlaps(&mut self) {
        let mut wielders: Vec<CombatantId> = self.open_weapons.iter().copied().collect();
        wielders.sort();

        for attacker in wielders {
            let Some(origin) = self.position(attacker) else {
                continue;
            };
            let victims: Vec<(CombatantId, Vec3)> = self
                .sim
                .combatants()
                .filter(|(id, _)| *id != attacker)
                .map(|(id, c)| (id, c.core().position()))
                .filter(|(_, p)| p.distance(origin) <= self.scenario.weapon_reach)
                .collect();
            for (victim, at) in victims {
                let impact = at
                    + (origin - at).normalize_or_zero() * 30.0
                    + Vec3::Y * STRIKE_HEIGHT;
                match self.sim.weapon_overlap(attacker, victim, impact, &mut self.log) {
                    HitOutcome::Ignored => {}
                    HitOutcome::Reacted(direction) => {
                        self.report.hits += 1;
                        debug!("{} struck {} from {:?}", attacker, victim, direction);
                    }
                    HitOutcome::Died => {
                        self.report.hits += 1;
                        self.report.kills += 1;
                        info!("{} killed {}", attacker, victim);
                    }
                }
            }

            if attacker == self.player {
                for prop in self.props.clone() {
                    let near = self
                        .sim
                        .prop(prop)
                        .is_some_and(|p| p.position.distance(origin) <= self.scenario.weapon_reach);
                    if near && self.sim.prop_overlap(attacker, prop, origin, &mut self.log) {
                        self.report.props_broken += 1;
                    }
                }
            }
        }

        if let Some(at) = self.position(self.player) {
            let reachable: Vec<_> = self
                .sim
                .pickups()
                .filter(|(_, p)| {
                    Vec3::new(p.position.x, at.y, p.position.z).distance(at)
                        <= self.scenario.pickup_radius
                })
                .map(|(id, _)| id)
                .collect();
            for pickup in reachable {
                if self.sim.pickup_overlap(self.player, pickup, &mut self.log) {
                    self.report.pickups_collected += 1;
                }
            }
        }
        self.absorb_commands();
    }

    /// Play back everything the core asked for since the last call
    fn absorb_commands(&mut self) {
        let commands = self.log.take();
        self.report.host_commands += commands.len();
        for command in commands {
            self.absorb(command);
        }
    }

    fn absorb(&mut self, command: HostCommand) {
        match command {
            HostCommand::PlaySection {
                owner,
                cue,
                section,
            } => self.schedule_signals(owner, cue, &section),
            HostCommand::StopCue { owner, cue, .. } => {
                self.pending.retain(|s| s.owner != owner || s.cue != cue);
                if cue == CueKind::Attack {
                    self.open_weapons.remove(&owner);
                }
            }
            HostCommand::MoveTo {
                owner,
                target,
                acceptance_radius,
            } => {
                let body = self.bodies.entry(owner).or_default();
                body.destination = Some(target);
                body.acceptance_radius = acceptance_radius;
            }
            HostCommand::SetMaxSpeed { owner, speed } => {
                self.bodies.entry(owner).or_default().max_speed = speed;
            }
            HostCommand::SetWeaponCollision { owner, enabled } => {
                if enabled {
                    self.open_weapons.insert(owner);
                } else {
                    self.open_weapons.remove(&owner);
                }
            }
            HostCommand::DespawnCombatant { id } => {
                self.bodies.remove(&id);
                self.open_weapons.remove(&id);
                self.pending.retain(|s| s.owner != id);
            }
            other => debug!("host: {:?}", other),
        }
    }

    fn schedule_signals(&mut self, owner: CombatantId, cue: CueKind, section: &str) {
        let at = |delay: f64| self.clock + delay;
        let signals: Vec<(f64, AnimationSignal)> = match cue {
            CueKind::Attack => ATTACK_SIGNALS.iter().map(|(d, s)| (at(*d), *s)).collect(),
            CueKind::HitReact => {
                // A reaction cuts any swing in progress short.
                self.pending
                    .retain(|s| s.owner != owner || s.cue != CueKind::Attack);
                vec![(at(HIT_REACT_END), AnimationSignal::HitReactEnd)]
            }
            CueKind::Dodge => vec![(at(DODGE_END), AnimationSignal::DodgeEnd)],
            CueKind::Equip => {
                let swap = if section == self.unequip_section {
                    AnimationSignal::AttachWeaponToBack
                } else {
                    AnimationSignal::AttachWeaponToHand
                };
                vec![(at(WEAPON_SWAP), swap), (at(EQUIP_END), AnimationSignal::EquipFinished)]
            }
            CueKind::Death => {
                self.pending.retain(|s| s.owner != owner);
                Vec::new()
            }
        };
        self.pending.extend(signals.into_iter().map(|(at, signal)| PendingSignal {
            at,
            owner,
            cue,
            signal,
        }));
    }
}
