//! Per-combatant resource ledger: health, stamina and currency.
//!
//! Values are only changed through the mutators below, which clamp so that
//! `0 <= health <= max_health` and `0 <= stamina <= max_stamina` always hold.
//! Callers push percentages to presentation themselves.

use serde::{Deserialize, Serialize};

use crate::config::AttributeDefaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeLedger {
    health: f32,
    max_health: f32,
    stamina: f32,
    max_stamina: f32,
    stamina_regen_rate: f32,
    souls: u32,
    gold: u32,
}

impl AttributeLedger {
    /// A ledger with full health and stamina and no currency
    pub fn new(max_health: f32, max_stamina: f32, stamina_regen_rate: f32) -> Self {
        let max_health = non_negative(max_health);
        let max_stamina = non_negative(max_stamina);
        Self {
            health: max_health,
            max_health,
            stamina: max_stamina,
            max_stamina,
            stamina_regen_rate: non_negative(stamina_regen_rate),
            souls: 0,
            gold: 0,
        }
    }

    /// Subtract damage, saturating at zero
    pub fn receive_damage(&mut self, amount: f32) {
        self.health = (self.health - non_negative(amount)).clamp(0.0, self.max_health);
    }

    /// Spend stamina. Sufficiency is the caller's check.
    pub fn use_stamina(&mut self, cost: f32) {
        self.stamina = (self.stamina - non_negative(cost)).clamp(0.0, self.max_stamina);
    }

    /// Regenerate stamina over `dt` seconds
    pub fn regen_stamina(&mut self, dt: f32) {
        self.stamina =
            (self.stamina + self.stamina_regen_rate * non_negative(dt)).clamp(0.0, self.max_stamina);
    }

    pub fn add_souls(&mut self, amount: u32) {
        self.souls = self.souls.saturating_add(amount);
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Whether current stamina strictly exceeds `cost`
    pub fn has_stamina_for(&self, cost: f32) -> bool {
        self.stamina > cost
    }

    /// Health as a 0.0-1.0 fraction
    pub fn health_percent(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    /// Stamina as a 0.0-1.0 fraction
    pub fn stamina_percent(&self) -> f32 {
        if self.max_stamina <= 0.0 {
            return 0.0;
        }
        self.stamina / self.max_stamina
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn max_stamina(&self) -> f32 {
        self.max_stamina
    }

    pub fn souls(&self) -> u32 {
        self.souls
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }
}

impl From<&AttributeDefaults> for AttributeLedger {
    fn from(defaults: &AttributeDefaults) -> Self {
        let mut ledger = Self::new(
            defaults.max_health,
            defaults.max_stamina,
            defaults.stamina_regen_rate,
        );
        ledger.health = non_negative(defaults.health).min(ledger.max_health);
        ledger.stamina = non_negative(defaults.stamina).min(ledger.max_stamina);
        ledger.souls = defaults.souls;
        ledger.gold = defaults.gold;
        ledger
    }
}

impl Default for AttributeLedger {
    fn default() -> Self {
        Self::from(&AttributeDefaults::default())
    }
}

/// Negative and NaN inputs degrade to zero.
fn non_negative(value: f32) -> f32 {
    value.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_damage_saturates_at_zero() {
        let mut ledger = AttributeLedger::new(100.0, 100.0, 8.0);
        ledger.receive_damage(30.0);
        assert_eq!(ledger.health(), 70.0);
        assert!(ledger.is_alive());

        ledger.receive_damage(500.0);
        assert_eq!(ledger.health(), 0.0);
        assert!(!ledger.is_alive());
        assert_eq!(ledger.health_percent(), 0.0);
    }

    #[test]
    fn test_zero_damage_is_noop() {
        let mut ledger = AttributeLedger::new(100.0, 100.0, 8.0);
        ledger.receive_damage(25.0);
        let before = ledger.clone();
        for _ in 0..10 {
            ledger.receive_damage(0.0);
        }
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_negative_inputs_do_nothing() {
        let mut ledger = AttributeLedger::new(100.0, 100.0, 8.0);
        ledger.use_stamina(40.0);
        let before = ledger.clone();
        ledger.receive_damage(-10.0);
        ledger.use_stamina(-10.0);
        ledger.regen_stamina(-1.0);
        ledger.receive_damage(f32::NAN);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_stamina_drain_then_refill() {
        let mut ledger = AttributeLedger::new(100.0, 100.0, 8.0);
        ledger.use_stamina(1000.0);
        assert_eq!(ledger.stamina(), 0.0);
        assert!(!ledger.has_stamina_for(0.0));

        ledger.regen_stamina(5.0);
        assert_eq!(ledger.stamina(), 40.0);
        ledger.regen_stamina(100.0);
        assert_eq!(ledger.stamina(), 100.0);
        assert_eq!(ledger.stamina_percent(), 1.0);
    }

    #[test]
    fn test_stamina_check_is_strict() {
        let mut ledger = AttributeLedger::new(100.0, 100.0, 0.0);
        ledger.use_stamina(86.0);
        assert_eq!(ledger.stamina(), 14.0);
        assert!(!ledger.has_stamina_for(14.0));
        assert!(ledger.has_stamina_for(13.9));
    }

    #[test]
    fn test_currency_saturates() {
        let mut ledger = AttributeLedger::default();
        ledger.add_souls(5);
        ledger.add_gold(u32::MAX);
        ledger.add_gold(10);
        assert_eq!(ledger.souls(), 5);
        assert_eq!(ledger.gold(), u32::MAX);
    }

    #[test]
    fn test_from_defaults_clamps_start_values() {
        let defaults = AttributeDefaults {
            health: 250.0,
            stamina: -5.0,
            souls: 3,
            ..Default::default()
        };
        let ledger = AttributeLedger::from(&defaults);
        assert_eq!(ledger.health(), 100.0);
        assert_eq!(ledger.stamina(), 0.0);
        assert_eq!(ledger.souls(), 3);
    }

    #[test]
    fn test_zero_max_reports_zero_percent() {
        let ledger = AttributeLedger::new(0.0, 0.0, 1.0);
        assert_eq!(ledger.health_percent(), 0.0);
        assert_eq!(ledger.stamina_percent(), 0.0);
        assert!(!ledger.is_alive());
    }

    #[derive(Debug, Clone)]
    enum StaminaOp {
        Use(f32),
        Regen(f32),
    }

    fn stamina_op() -> impl Strategy<Value = StaminaOp> {
        prop_oneof![
            (0.0f32..200.0).prop_map(StaminaOp::Use),
            (0.0f32..30.0).prop_map(StaminaOp::Regen),
        ]
    }

    proptest! {
        #[test]
        fn damage_matches_clamp(max in 1.0f32..1000.0, dealt in 0.0f32..1000.0, d in 0.0f32..2000.0) {
            let mut ledger = AttributeLedger::new(max, 100.0, 0.0);
            ledger.receive_damage(dealt);
            let h = ledger.health();
            ledger.receive_damage(d);
            prop_assert_eq!(ledger.health(), (h - d).clamp(0.0, max));
        }

        #[test]
        fn stamina_stays_in_bounds(
            max in 0.0f32..500.0,
            rate in 0.0f32..50.0,
            ops in prop::collection::vec(stamina_op(), 0..64),
        ) {
            let mut ledger = AttributeLedger::new(100.0, max, rate);
            for op in ops {
                match op {
                    StaminaOp::Use(c) => ledger.use_stamina(c),
                    StaminaOp::Regen(dt) => ledger.regen_stamina(dt),
                }
                prop_assert!(ledger.stamina() >= 0.0);
                prop_assert!(ledger.stamina() <= ledger.max_stamina());
            }
        }
    }
}
