//! Player action controller
//!
//! Input requests (interact, attack, dodge) are accepted or silently rejected
//! by guards on the action and equip states. Every accepted action stays in
//! progress until the matching animation signal arrives.

use glam::Vec3;
use riposte_core::Transform;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::attributes::AttributeLedger;
use crate::combatant::{
    ActionState, Attacker, CombatContext, CombatantCore, CombatantId, DamageOutcome, Damageable,
    Equippable, Faction, HitOutcome, Tag,
};
use crate::cues::{CueKind, CueSelector};
use crate::host::CombatHost;
use crate::weapon::{Weapon, WeaponGrip, WeaponSocket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipState {
    Unarmed,
    OneHanded,
    TwoHanded,
}

impl EquipState {
    fn for_grip(grip: WeaponGrip) -> Self {
        match grip {
            WeaponGrip::OneHanded => EquipState::OneHanded,
            WeaponGrip::TwoHanded => EquipState::TwoHanded,
        }
    }
}

/// Player button presses the core reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerInput {
    /// Pick up the overlapping weapon, or draw/sheathe the held one
    Interact,
    Attack,
    Dodge,
}

/// Notifies raised by the animation driver while sections play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationSignal {
    AttackEnd,
    DodgeEnd,
    EquipFinished,
    HitReactEnd,
    /// The swing's damaging frames start (`true`) or stop (`false`)
    SwingWindow(bool),
    AttachWeaponToBack,
    AttachWeaponToHand,
}

#[derive(Debug, Clone)]
pub struct PlayerActionController {
    pub core: CombatantCore,
    equip: EquipState,
    overlapping_weapon: Option<Weapon>,
}

impl PlayerActionController {
    /// Create the player and fill the HUD
    pub fn spawn(
        id: CombatantId,
        transform: Transform,
        attributes: AttributeLedger,
        host: &mut dyn CombatHost,
    ) -> Self {
        let mut core = CombatantCore::new(id, transform, attributes, Faction::Player);
        core.tags.insert(Tag::EngageableTarget);

        let a = &core.attributes;
        host.set_health_percent(id, a.health_percent());
        host.set_stamina_percent(id, a.stamina_percent());
        host.set_souls(id, a.souls());
        host.set_gold(id, a.gold());

        Self {
            core,
            equip: EquipState::Unarmed,
            overlapping_weapon: None,
        }
    }

    pub fn equip_state(&self) -> EquipState {
        self.equip
    }

    pub fn overlapping_weapon(&self) -> Option<&Weapon> {
        self.overlapping_weapon.as_ref()
    }

    /// A weapon lying within reach, or `None` once the player walks away
    pub fn set_overlapping_weapon(&mut self, weapon: Option<Weapon>) {
        self.overlapping_weapon = weapon;
    }

    /// Per-frame stamina regeneration
    pub fn tick(&mut self, dt: f32, ctx: &mut CombatContext<'_>) {
        if !self.core.is_alive() {
            return;
        }
        self.core.attributes.regen_stamina(dt);
        ctx.host
            .set_stamina_percent(self.core.id, self.core.attributes.stamina_percent());
    }

    pub fn handle_input(&mut self, input: PlayerInput, ctx: &mut CombatContext<'_>) -> bool {
        match input {
            PlayerInput::Interact => self.interact(ctx),
            PlayerInput::Attack => self.attack(ctx),
            PlayerInput::Dodge => self.dodge(ctx),
        }
    }

    /// Pick up what is in reach, otherwise sheathe or draw
    pub fn interact(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        if !self.core.is_alive() {
            return false;
        }
        if let Some(weapon) = self.overlapping_weapon.take() {
            return self.equip_weapon(weapon, ctx);
        }
        if self.can_disarm() {
            self.disarm(ctx)
        } else if self.can_arm() {
            self.arm(ctx)
        } else {
            trace!("{} interact rejected", self.core.id);
            false
        }
    }

    fn can_disarm(&self) -> bool {
        self.core.can_begin_action() && self.equip != EquipState::Unarmed
    }

    fn can_arm(&self) -> bool {
        self.core.can_begin_action()
            && self.equip == EquipState::Unarmed
            && self.core.weapon.is_some()
    }

    pub fn dodge(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        let cost = ctx.config.player.dodge_cost;
        if !self.core.can_begin_action() || !self.core.attributes.has_stamina_for(cost) {
            trace!("{} dodge rejected", self.core.id);
            return false;
        }
        let id = self.core.id;
        CueSelector::play_section(
            &mut *ctx.host,
            id,
            CueKind::Dodge,
            &ctx.config.cues.dodge_section,
        );
        self.core.begin_action(ActionState::Dodging);
        self.core.attributes.use_stamina(cost);
        ctx.host
            .set_stamina_percent(id, self.core.attributes.stamina_percent());
        true
    }

    pub fn can_move(&self) -> bool {
        self.core.can_begin_action()
    }

    pub fn can_jump(&self) -> bool {
        self.core.can_begin_action()
    }

    pub fn on_animation_signal(&mut self, signal: AnimationSignal, ctx: &mut CombatContext<'_>) {
        match signal {
            AnimationSignal::AttackEnd => self.attack_end(ctx),
            AnimationSignal::DodgeEnd => {
                self.core.finish_phase(ActionState::Dodging);
            }
            AnimationSignal::EquipFinished => {
                self.core.finish_phase(ActionState::Equipping);
            }
            AnimationSignal::HitReactEnd => {
                self.core.finish_phase(ActionState::HitReaction);
            }
            AnimationSignal::SwingWindow(open) => {
                if !open || self.core.action() == ActionState::Attacking {
                    self.core.set_weapon_collision(open, ctx.host);
                }
            }
            AnimationSignal::AttachWeaponToBack => self.attach_weapon(WeaponSocket::Back, ctx.host),
            AnimationSignal::AttachWeaponToHand => self.attach_weapon(WeaponSocket::Hand, ctx.host),
        }
    }

    fn attach_weapon(&mut self, socket: WeaponSocket, host: &mut dyn CombatHost) {
        if let Some(weapon) = self.core.weapon.as_mut() {
            weapon.attach(socket);
            host.attach_weapon(self.core.id, socket);
        }
    }

    pub fn add_souls(&mut self, amount: u32, host: &mut dyn CombatHost) {
        self.core.attributes.add_souls(amount);
        host.set_souls(self.core.id, self.core.attributes.souls());
    }

    pub fn add_gold(&mut self, amount: u32, host: &mut dyn CombatHost) {
        self.core.attributes.add_gold(amount);
        host.set_gold(self.core.id, self.core.attributes.gold());
    }

    fn die(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        self.core.start_death(ctx)
    }
}

impl Attacker for PlayerActionController {
    fn can_attack(&self, _ctx: &CombatContext<'_>) -> bool {
        self.core.can_begin_action() && self.equip != EquipState::Unarmed
    }

    fn attack(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        if !self.can_attack(ctx) {
            trace!("{} attack rejected", self.core.id);
            return false;
        }
        CueSelector::select_random_section(
            &mut *ctx.rng,
            &mut *ctx.host,
            self.core.id,
            CueKind::Attack,
            &ctx.config.cues.attack_sections,
        );
        self.core.begin_action(ActionState::Attacking)
    }

    fn attack_end(&mut self, _ctx: &mut CombatContext<'_>) {
        self.core.finish_phase(ActionState::Attacking);
    }
}

impl Equippable for PlayerActionController {
    /// Draw the held weapon
    fn arm(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        let Some(grip) = self.core.weapon.as_ref().map(|w| w.grip) else {
            return false;
        };
        if !self.can_arm() {
            return false;
        }
        CueSelector::play_section(
            &mut *ctx.host,
            self.core.id,
            CueKind::Equip,
            &ctx.config.cues.equip_section,
        );
        self.equip = EquipState::for_grip(grip);
        self.core.begin_action(ActionState::Equipping)
    }

    /// Sheathe the held weapon
    fn disarm(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        if !self.can_disarm() {
            return false;
        }
        CueSelector::play_section(
            &mut *ctx.host,
            self.core.id,
            CueKind::Equip,
            &ctx.config.cues.unequip_section,
        );
        self.equip = EquipState::Unarmed;
        self.core.begin_action(ActionState::Equipping)
    }

    /// Take a new weapon straight into the hand, dropping any held one
    fn equip_weapon(&mut self, mut weapon: Weapon, ctx: &mut CombatContext<'_>) -> bool {
        if !self.core.is_alive() {
            return false;
        }
        if let Some(old) = self.core.weapon.take() {
            debug!("{} drops {}", self.core.id, old.name);
        }
        weapon.set_collision(false);
        weapon.attach(WeaponSocket::Hand);
        ctx.host.attach_weapon(self.core.id, WeaponSocket::Hand);
        self.equip = EquipState::for_grip(weapon.grip);
        debug!("{} equips {} ({:?})", self.core.id, weapon.name, self.equip);
        self.core.weapon = Some(weapon);
        true
    }
}

impl Damageable for PlayerActionController {
    fn take_damage(
        &mut self,
        amount: f32,
        _instigator: Option<CombatantId>,
        ctx: &mut CombatContext<'_>,
    ) -> DamageOutcome {
        self.core.apply_damage(amount, ctx.host)
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
            if self.core.action() == ActionState::Attacking {
                ctx.host.stop_cue(
                    self.core.id,
                    CueKind::Attack,
                    ctx.config.player.hit_react_blend,
                );
            }
            let direction = self.core.play_reaction(impact, ctx.host);
            self.core.set_weapon_collision(false, ctx.host);
            self.core.interrupt(ActionState::HitReaction);
            HitOutcome::Reacted(direction)
        } else {
            self.die(ctx);
            HitOutcome::Died
        };
        self.core.play_hit_effects(impact, ctx.host);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{LifeState, Roster};
    use crate::config::CombatConfig;
    use crate::host::{CommandLog, HostCommand};
    use crate::scheduler::Scheduler;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use riposte_ecs::Handle;

    struct Fixture {
        scheduler: Scheduler,
        rng: ChaCha8Rng,
        log: CommandLog,
        config: CombatConfig,
        roster: Roster,
        player: PlayerActionController,
    }

    impl Fixture {
        fn new() -> Self {
            let mut log = CommandLog::new();
            let player = PlayerActionController::spawn(
                Handle::from_raw(0, 0),
                Transform::default(),
                AttributeLedger::default(),
                &mut log,
            );
            Self {
                scheduler: Scheduler::new(),
                rng: ChaCha8Rng::seed_from_u64(3),
                log,
                config: CombatConfig::default(),
                roster: Roster::new(),
                player,
            }
        }

        fn with<T>(&mut self, f: impl FnOnce(&mut PlayerActionController, &mut CombatContext<'_>) -> T) -> T {
            let mut ctx = CombatContext {
                scheduler: &mut self.scheduler,
                rng: &mut self.rng,
                host: &mut self.log,
                config: &self.config,
                roster: &self.roster,
            };
            f(&mut self.player, &mut ctx)
        }

        fn armed() -> Self {
            let mut fx = Self::new();
            fx.player
                .set_overlapping_weapon(Some(Weapon::one_handed("Sword", 20.0)));
            assert!(fx.with(|p, ctx| p.interact(ctx)));
            fx
        }
    }

    #[test]
    fn test_spawn_fills_hud() {
        let fx = Fixture::new();
        let id = fx.player.core.id;
        assert!(fx.log.contains(&HostCommand::HealthPercent { owner: id, percent: 1.0 }));
        assert!(fx.log.contains(&HostCommand::Souls { owner: id, souls: 0 }));
        assert!(fx.player.core.tags.contains(Tag::EngageableTarget));
        assert_eq!(fx.player.equip_state(), EquipState::Unarmed);
    }

    #[test]
    fn test_attack_requires_weapon() {
        let mut fx = Fixture::new();
        assert!(!fx.with(|p, ctx| p.attack(ctx)));
        assert_eq!(fx.player.core.action(), ActionState::Unoccupied);
    }

    #[test]
    fn test_pickup_equips_into_hand() {
        let fx = Fixture::armed();
        assert_eq!(fx.player.equip_state(), EquipState::OneHanded);
        assert!(fx.player.overlapping_weapon().is_none());
        assert_eq!(
            fx.player.core.weapon.as_ref().map(|w| w.socket()),
            Some(WeaponSocket::Hand)
        );
        assert_eq!(fx.player.core.action(), ActionState::Unoccupied);
    }

    #[test]
    fn test_two_handed_pickup() {
        let mut fx = Fixture::new();
        fx.player
            .set_overlapping_weapon(Some(Weapon::two_handed("Greatsword", 40.0)));
        fx.with(|p, ctx| p.interact(ctx));
        assert_eq!(fx.player.equip_state(), EquipState::TwoHanded);
    }

    #[test]
    fn test_attack_cycle() {
        let mut fx = Fixture::armed();
        assert!(fx.with(|p, ctx| p.attack(ctx)));
        assert_eq!(fx.player.core.action(), ActionState::Attacking);
        assert!(!fx.with(|p, ctx| p.attack(ctx)));
        assert!(!fx.with(|p, ctx| p.dodge(ctx)));

        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::SwingWindow(true), ctx));
        assert!(fx.player.core.weapon.as_ref().unwrap().hit_volume_enabled());
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::SwingWindow(false), ctx));
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::DodgeEnd, ctx));
        assert_eq!(fx.player.core.action(), ActionState::Attacking);
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::AttackEnd, ctx));
        assert_eq!(fx.player.core.action(), ActionState::Unoccupied);

        let attacks = fx.log.sections(fx.player.core.id, CueKind::Attack);
        assert_eq!(attacks.len(), 1);
        assert!(attacks[0] == "Attack1" || attacks[0] == "Attack2");
    }

    #[test]
    fn test_swing_window_ignored_outside_attack() {
        let mut fx = Fixture::armed();
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::SwingWindow(true), ctx));
        assert!(!fx.player.core.weapon.as_ref().unwrap().hit_volume_enabled());
    }

    #[test]
    fn test_disarm_then_arm() {
        let mut fx = Fixture::armed();
        let id = fx.player.core.id;

        assert!(fx.with(|p, ctx| p.interact(ctx)));
        assert_eq!(fx.player.equip_state(), EquipState::Unarmed);
        assert_eq!(fx.player.core.action(), ActionState::Equipping);
        assert!(!fx.with(|p, ctx| p.interact(ctx)));

        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::AttachWeaponToBack, ctx));
        assert_eq!(
            fx.player.core.weapon.as_ref().map(|w| w.socket()),
            Some(WeaponSocket::Back)
        );
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::EquipFinished, ctx));
        assert_eq!(fx.player.core.action(), ActionState::Unoccupied);

        assert!(fx.with(|p, ctx| p.interact(ctx)));
        assert_eq!(fx.player.equip_state(), EquipState::OneHanded);
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::AttachWeaponToHand, ctx));
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::EquipFinished, ctx));

        assert_eq!(fx.log.sections(id, CueKind::Equip), vec!["Unequip", "Equip"]);
    }

    #[test]
    fn test_dodge_debits_stamina_immediately() {
        let mut fx = Fixture::new();
        assert!(fx.with(|p, ctx| p.dodge(ctx)));
        assert_eq!(fx.player.core.action(), ActionState::Dodging);
        assert_eq!(fx.player.core.attributes.stamina(), 86.0);
        assert!(!fx.player.can_move());
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::DodgeEnd, ctx));
        assert!(fx.player.can_jump());
    }

    #[test]
    fn test_dodge_needs_more_than_cost() {
        let mut fx = Fixture::new();
        fx.player.core.attributes.use_stamina(86.0);
        assert!(!fx.with(|p, ctx| p.dodge(ctx)));
        assert_eq!(fx.player.core.action(), ActionState::Unoccupied);
        assert_eq!(fx.player.core.attributes.stamina(), 14.0);
    }

    #[test]
    fn test_tick_regenerates_stamina() {
        let mut fx = Fixture::new();
        fx.player.core.attributes.use_stamina(50.0);
        fx.with(|p, ctx| p.tick(2.0, ctx));
        assert_eq!(fx.player.core.attributes.stamina(), 66.0);
    }

    #[test]
    fn test_hit_preempts_attack() {
        let mut fx = Fixture::armed();
        fx.with(|p, ctx| p.attack(ctx));
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::SwingWindow(true), ctx));

        fx.with(|p, ctx| p.take_damage(30.0, None, ctx));
        let outcome = fx.with(|p, ctx| p.get_hit(Vec3::new(-50.0, 0.0, 0.0), None, ctx));
        assert_eq!(outcome, HitOutcome::Reacted(crate::hit_reaction::HitDirection::Left));
        assert_eq!(fx.player.core.action(), ActionState::HitReaction);
        assert!(!fx.player.core.weapon.as_ref().unwrap().hit_volume_enabled());

        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::AttackEnd, ctx));
        assert_eq!(fx.player.core.action(), ActionState::HitReaction);
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::HitReactEnd, ctx));
        assert_eq!(fx.player.core.action(), ActionState::Unoccupied);
    }

    #[test]
    fn test_lethal_hit_kills() {
        let mut fx = Fixture::armed();
        assert_eq!(
            fx.with(|p, ctx| p.take_damage(150.0, None, ctx)),
            DamageOutcome::Killed
        );
        assert_eq!(
            fx.with(|p, ctx| p.get_hit(Vec3::new(0.0, 0.0, -10.0), None, ctx)),
            HitOutcome::Died
        );
        assert_eq!(fx.player.core.life(), LifeState::Dead);
        assert_eq!(fx.player.core.action(), ActionState::Dead);

        assert!(!fx.with(|p, ctx| p.attack(ctx)));
        assert!(!fx.with(|p, ctx| p.dodge(ctx)));
        assert!(!fx.with(|p, ctx| p.interact(ctx)));
        fx.with(|p, ctx| p.on_animation_signal(AnimationSignal::HitReactEnd, ctx));
        assert_eq!(fx.player.core.action(), ActionState::Dead);
        assert_eq!(
            fx.with(|p, ctx| p.take_damage(10.0, None, ctx)),
            DamageOutcome::Ignored
        );
        assert_eq!(
            fx.with(|p, ctx| p.get_hit(Vec3::ZERO, None, ctx)),
            HitOutcome::Ignored
        );
    }

    #[test]
    fn test_currency_updates_hud() {
        let mut fx = Fixture::new();
        let id = fx.player.core.id;
        fx.player.add_souls(12, &mut fx.log);
        fx.player.add_gold(30, &mut fx.log);
        assert!(fx.log.contains(&HostCommand::Souls { owner: id, souls: 12 }));
        assert!(fx.log.contains(&HostCommand::Gold { owner: id, gold: 30 }));
    }
}
