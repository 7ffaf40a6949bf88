//! Named, cancellable delayed callbacks
//!
//! One scheduler lives in each simulation and is handed to controllers
//! through their context. A timer is identified by its owner and kind; arming
//! a key that is already armed replaces the previous instance. Timers only
//! fire from `advance`, i.e. on frame boundaries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combatant::CombatantId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimerKind {
    /// Wait at a patrol waypoint before walking on
    Patrol,
    /// Delay before committing to an attack
    Attack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerKey {
    pub owner: CombatantId,
    pub kind: TimerKind,
}

impl TimerKey {
    pub fn new(owner: CombatantId, kind: TimerKind) -> Self {
        Self { owner, kind }
    }
}

/// A timer that came due during `advance`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredTimer {
    pub key: TimerKey,
    pub due: f64,
}

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    due: f64,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    next_seq: u64,
    armed: HashMap<TimerKey, ArmedTimer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire `delay` seconds from now, replacing any armed
    /// instance. Negative delays fire on the next advance.
    pub fn arm(&mut self, key: TimerKey, delay: f32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now + delay.max(0.0) as f64;
        if self.armed.insert(key, ArmedTimer { due, seq }).is_some() {
            debug!("{:?} timer for {} re-armed, {:.2}s", key.kind, key.owner, delay);
        } else {
            debug!("{:?} timer for {} armed, {:.2}s", key.kind, key.owner, delay);
        }
    }

    /// Cancel one timer. Returns false if it was not armed.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        let removed = self.armed.remove(&key).is_some();
        if removed {
            debug!("{:?} timer for {} cancelled", key.kind, key.owner);
        }
        removed
    }

    /// Cancel every timer `owner` holds, returning how many were armed
    pub fn cancel_owner(&mut self, owner: CombatantId) -> usize {
        let before = self.armed.len();
        self.armed.retain(|key, _| key.owner != owner);
        let cancelled = before - self.armed.len();
        if cancelled > 0 {
            debug!("Cancelled {} timers for {}", cancelled, owner);
        }
        cancelled
    }

    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.armed.contains_key(&key)
    }

    /// Seconds until `key` fires
    pub fn remaining(&self, key: TimerKey) -> Option<f32> {
        self.armed
            .get(&key)
            .map(|t| (t.due - self.now).max(0.0) as f32)
    }

    /// Move the clock forward and return everything that came due, ordered by
    /// due time then arming order. Fired timers are disarmed before return.
    pub fn advance(&mut self, dt: f32) -> Vec<FiredTimer> {
        self.now += dt.max(0.0) as f64;

        let mut due: Vec<(TimerKey, ArmedTimer)> = self
            .armed
            .iter()
            .filter(|(_, t)| t.due <= self.now)
            .map(|(k, t)| (*k, *t))
            .collect();
        due.sort_by(|a, b| a.1.due.total_cmp(&b.1.due).then(a.1.seq.cmp(&b.1.seq)));

        due.into_iter()
            .map(|(key, timer)| {
                self.armed.remove(&key);
                debug!("{:?} timer for {} fired", key.kind, key.owner);
                FiredTimer { key, due: timer.due }
            })
            .collect()
    }

    /// Scheduler clock in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Whether `owner` holds any armed timer
    pub fn owner_has_timers(&self, owner: CombatantId) -> bool {
        self.armed.keys().any(|k| k.owner == owner)
    }
}
