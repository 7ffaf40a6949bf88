//! Enemy AI driven through the full simulation

use glam::Vec3;
use riposte_combat::{
    ActionState, AnimationSignal, BehaviorState, CombatConfig, CombatSimulation, CombatantId,
    CommandLog, CueKind, HitOutcome, HostCommand, LifeState, PatrolRoute, PickupKind, Tag, TagSet,
    TimerKey, TimerKind, Weapon,
};
use riposte_core::Transform;

const DT: f32 = 0.1;

struct Arena {
    sim: CombatSimulation,
    log: CommandLog,
    player: CombatantId,
    enemy: CombatantId,
}

impl Arena {
    /// Player `distance` units in front of an enemy standing on its first waypoint
    fn new(distance: f32) -> Self {
        let mut sim = CombatSimulation::new(CombatConfig::default(), 42);
        let mut log = CommandLog::new();
        let player = sim.spawn_player(
            Transform::from_position(Vec3::new(0.0, 0.0, -distance)),
            &mut log,
        );
        let enemy = sim.spawn_enemy(
            Transform::default(),
            PatrolRoute::new(vec![Vec3::ZERO, Vec3::new(800.0, 0.0, 0.0)]),
            Some(Weapon::one_handed("Blade", 25.0)),
            &mut log,
        );
        Self {
            sim,
            log,
            player,
            enemy,
        }
    }

    fn behavior(&self) -> BehaviorState {
        self.sim.enemy(self.enemy).unwrap().behavior()
    }

    fn move_player(&mut self, distance: f32) {
        self.sim.set_transform(
            self.player,
            Transform::from_position(Vec3::new(0.0, 0.0, -distance)),
        );
    }

    fn player_tags(&self) -> TagSet {
        self.sim.combatant(self.player).unwrap().core().tags.clone()
    }

    fn spot_player(&mut self) -> bool {
        let tags = self.player_tags();
        self.sim
            .actor_seen(self.enemy, self.player, &tags, &mut self.log)
    }

    fn tick(&mut self, frames: usize) {
        for _ in 0..frames {
            self.sim.tick(DT, &mut self.log);
        }
    }

    fn attack_timer(&self) -> TimerKey {
        TimerKey::new(self.enemy, TimerKind::Attack)
    }

    /// Tick until the attack timer fires and the enemy swings
    fn wait_for_swing(&mut self) {
        for _ in 0..20 {
            self.tick(1);
            if self.behavior() == BehaviorState::Engaged {
                return;
            }
        }
        panic!("enemy never swung");
    }
}

#[test]
fn target_beyond_combat_radius_is_dropped() {
    let mut arena = Arena::new(300.0);
    assert!(arena.spot_player());
    assert_eq!(arena.behavior(), BehaviorState::Chasing);

    arena.move_player(600.0);
    arena.tick(1);
    assert_eq!(arena.behavior(), BehaviorState::Patrolling);
    assert_eq!(arena.sim.enemy(arena.enemy).unwrap().core.combat_target, None);
    assert!(!arena.sim.scheduler().is_armed(arena.attack_timer()));
}

#[test]
fn target_between_radii_is_chased() {
    let mut arena = Arena::new(300.0);
    arena.spot_player();
    arena.tick(3);
    assert_eq!(arena.behavior(), BehaviorState::Chasing);
    assert!(!arena.sim.scheduler().is_armed(arena.attack_timer()));
    assert_eq!(
        arena.log.last_move_to(arena.enemy),
        Some(Vec3::new(0.0, 0.0, -300.0))
    );
}

#[test]
fn target_inside_attack_radius_arms_attack_timer() {
    let mut arena = Arena::new(100.0);
    arena.spot_player();
    arena.tick(1);
    assert_eq!(arena.behavior(), BehaviorState::Attacking);
    assert!(arena.sim.scheduler().is_armed(arena.attack_timer()));

    arena.wait_for_swing();
    let enemy = arena.sim.enemy(arena.enemy).unwrap();
    assert_eq!(enemy.core.action(), ActionState::Attacking);
    assert_eq!(arena.log.sections(arena.enemy, CueKind::Attack).len(), 1);
}

#[test]
fn finished_swing_rearms_without_delay() {
    let mut arena = Arena::new(100.0);
    arena.spot_player();
    arena.wait_for_swing();

    arena
        .sim
        .animation_signal(arena.enemy, AnimationSignal::AttackEnd, &mut arena.log);
    assert_eq!(arena.behavior(), BehaviorState::Attacking);
    assert!(arena.sim.scheduler().is_armed(arena.attack_timer()));
}

#[test]
fn engaged_enemy_finishes_swing_before_patrolling() {
    let mut arena = Arena::new(100.0);
    arena.spot_player();
    arena.wait_for_swing();

    arena.move_player(600.0);
    arena.tick(1);
    // Still committed to the swing, but the target is already forgotten.
    assert_eq!(arena.behavior(), BehaviorState::Engaged);
    assert_eq!(arena.sim.enemy(arena.enemy).unwrap().core.combat_target, None);

    arena
        .sim
        .animation_signal(arena.enemy, AnimationSignal::AttackEnd, &mut arena.log);
    assert_eq!(arena.behavior(), BehaviorState::Patrolling);
}

#[test]
fn enemy_swing_hits_player_once() {
    let mut arena = Arena::new(100.0);
    arena.spot_player();
    arena.wait_for_swing();

    let impact = Vec3::new(0.0, 50.0, -90.0);
    arena
        .sim
        .animation_signal(arena.enemy, AnimationSignal::SwingWindow(true), &mut arena.log);
    let first = arena
        .sim
        .weapon_overlap(arena.enemy, arena.player, impact, &mut arena.log);
    let second = arena
        .sim
        .weapon_overlap(arena.enemy, arena.player, impact, &mut arena.log);

    assert!(matches!(first, HitOutcome::Reacted(_)));
    assert_eq!(second, HitOutcome::Ignored);
    let player = arena.sim.player(arena.player).unwrap();
    assert_eq!(player.core.attributes.health(), 75.0);
    assert_eq!(player.core.action(), ActionState::HitReaction);
    assert_eq!(arena.log.last_health_percent(arena.player), Some(0.75));
}

#[test]
fn patrol_waits_then_walks_on() {
    let mut arena = Arena::new(2000.0);
    arena.tick(1);
    let patrol = TimerKey::new(arena.enemy, TimerKind::Patrol);
    assert!(arena.sim.scheduler().is_armed(patrol));
    assert_eq!(arena.sim.enemy(arena.enemy).unwrap().patrol_target(), Some(1));

    // Longest possible wait is ten seconds.
    arena.tick(101);
    assert!(!arena.sim.scheduler().is_armed(patrol));
    assert_eq!(
        arena.log.last_move_to(arena.enemy),
        Some(Vec3::new(800.0, 0.0, 0.0))
    );
}

#[test]
fn anonymous_hit_keeps_patrol_going() {
    let mut arena = Arena::new(2000.0);
    arena.tick(1);
    let patrol = TimerKey::new(arena.enemy, TimerKind::Patrol);
    assert!(arena.sim.scheduler().is_armed(patrol));

    let outcome = arena.sim.apply_hit(
        arena.enemy,
        None,
        10.0,
        Vec3::new(0.0, 50.0, -10.0),
        &mut arena.log,
    );
    assert!(matches!(outcome, HitOutcome::Reacted(_)));
    let enemy = arena.sim.enemy(arena.enemy).unwrap();
    assert_eq!(enemy.behavior(), BehaviorState::Patrolling);
    assert_eq!(enemy.core.attributes.health(), 90.0);
    assert!(!enemy.health_bar_visible());
    assert!(arena.sim.scheduler().is_armed(patrol));

    arena.tick(101);
    assert_eq!(
        arena.log.last_move_to(arena.enemy),
        Some(Vec3::new(800.0, 0.0, 0.0))
    );
}

#[test]
fn dead_actors_are_not_engaged() {
    let mut arena = Arena::new(300.0);
    let mut tags = arena.player_tags();
    tags.insert(Tag::Dead);
    assert!(!arena
        .sim
        .actor_seen(arena.enemy, arena.player, &tags, &mut arena.log));
    assert_eq!(arena.behavior(), BehaviorState::Patrolling);
}

#[test]
fn enemies_ignore_each_other() {
    let mut arena = Arena::new(300.0);
    let ally = arena.sim.spawn_enemy(
        Transform::from_position(Vec3::new(50.0, 0.0, 0.0)),
        PatrolRoute::default(),
        Some(Weapon::one_handed("Club", 10.0)),
        &mut arena.log,
    );
    let ally_tags = arena.sim.combatant(ally).unwrap().core().tags.clone();
    assert!(!arena
        .sim
        .actor_seen(arena.enemy, ally, &ally_tags, &mut arena.log));

    let outcome = arena
        .sim
        .weapon_overlap(arena.enemy, ally, Vec3::new(50.0, 50.0, 0.0), &mut arena.log);
    assert_eq!(outcome, HitOutcome::Ignored);
    assert_eq!(
        arena.sim.combatant(ally).unwrap().core().attributes.health(),
        100.0
    );
}

#[test]
fn death_is_terminal_and_corpse_is_removed() {
    let mut arena = Arena::new(100.0);
    arena.spot_player();
    arena.tick(1);

    let outcome = arena.sim.apply_hit(
        arena.enemy,
        Some(arena.player),
        1000.0,
        Vec3::new(0.0, 50.0, -50.0),
        &mut arena.log,
    );
    assert_eq!(outcome, HitOutcome::Died);

    let enemy = arena.sim.enemy(arena.enemy).unwrap();
    assert_eq!(enemy.behavior(), BehaviorState::Dead);
    assert_eq!(enemy.core.life(), LifeState::Dead);
    assert!(enemy.core.death_pose().is_some());
    assert!(!arena.sim.scheduler().owner_has_timers(arena.enemy));

    // Nothing revives it.
    assert!(!arena.spot_player());
    assert_eq!(
        arena.sim.apply_hit(arena.enemy, Some(arena.player), 5.0, Vec3::ZERO, &mut arena.log),
        HitOutcome::Ignored
    );
    arena
        .sim
        .animation_signal(arena.enemy, AnimationSignal::AttackEnd, &mut arena.log);
    arena.tick(10);
    let enemy = arena.sim.enemy(arena.enemy).unwrap();
    assert_eq!(enemy.behavior(), BehaviorState::Dead);
    assert_eq!(enemy.core.action(), ActionState::Dead);
    assert_eq!(arena.sim.summary().pending_removals, 1);

    // Death life span is eight seconds.
    arena.tick(75);
    assert!(arena.sim.combatant(arena.enemy).is_none());
    assert!(arena.log.contains(&HostCommand::DespawnCombatant { id: arena.enemy }));
    assert_eq!(arena.sim.summary().pending_removals, 0);

    // The stale handle now resolves to nothing.
    assert_eq!(
        arena.sim.apply_hit(arena.enemy, None, 5.0, Vec3::ZERO, &mut arena.log),
        HitOutcome::Ignored
    );
    assert!(!arena
        .sim
        .set_transform(arena.enemy, Transform::default()));
}

#[test]
fn corpse_drops_souls() {
    let mut config = CombatConfig::default();
    config.attributes.souls = 7;
    let mut sim = CombatSimulation::new(config, 1);
    let mut log = CommandLog::new();
    let player = sim.spawn_player(Transform::default(), &mut log);
    let enemy = sim.spawn_enemy(
        Transform::from_position(Vec3::new(10.0, 0.0, -100.0)),
        PatrolRoute::default(),
        None,
        &mut log,
    );

    sim.apply_hit(enemy, Some(player), 1000.0, Vec3::new(10.0, 50.0, -50.0), &mut log);

    let drops: Vec<_> = sim.pickups().map(|(id, p)| (id, p.clone())).collect();
    assert_eq!(drops.len(), 1);
    let (drop_id, soul) = &drops[0];
    assert_eq!(soul.amount, 7);
    assert_eq!(soul.position, Vec3::new(10.0, 125.0, -100.0));

    assert!(sim.pickup_overlap(player, *drop_id, &mut log));
    assert_eq!(sim.player(player).unwrap().core.attributes.souls(), 14);
    assert!(!sim.pickup_overlap(player, *drop_id, &mut log));
    assert!(log.contains(&HostCommand::DespawnPickup { pickup: *drop_id }));
}

#[test]
fn corpse_drops_its_gold_too() {
    let mut config = CombatConfig::default();
    config.attributes.souls = 3;
    config.attributes.gold = 12;
    let mut sim = CombatSimulation::new(config, 1);
    let mut log = CommandLog::new();
    let player = sim.spawn_player(Transform::default(), &mut log);
    let enemy = sim.spawn_enemy(
        Transform::from_position(Vec3::new(10.0, 0.0, -100.0)),
        PatrolRoute::default(),
        None,
        &mut log,
    );

    sim.apply_hit(enemy, Some(player), 1000.0, Vec3::new(10.0, 50.0, -50.0), &mut log);

    let mut drops: Vec<_> = sim.pickups().map(|(id, p)| (id, p.clone())).collect();
    assert_eq!(drops.len(), 2);
    drops.sort_by_key(|(_, p)| p.amount);
    assert_eq!(drops[0].1.kind, PickupKind::Souls);
    assert_eq!(drops[1].1.kind, PickupKind::Gold);
    assert_eq!(drops[1].1.amount, 12);
    assert_eq!(drops[1].1.position, Vec3::new(10.0, 125.0, -100.0));

    assert!(sim.pickup_overlap(player, drops[1].0, &mut log));
    assert_eq!(sim.player(player).unwrap().core.attributes.gold(), 24);
}
