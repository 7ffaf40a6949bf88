//! Props that shatter on the first weapon hit and may leave treasure behind

use glam::Vec3;
use rand::Rng;
use riposte_ecs::Handle;
use serde::{Deserialize, Serialize};

pub type PropId = Handle;

/// Result of striking a prop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakOutcome {
    AlreadyBroken,
    /// Broke now; carries the gold value of the dropped treasure, if any
    Broken(Option<u32>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakableProp {
    pub position: Vec3,
    broken: bool,
    /// Gold values the treasure is drawn from
    treasure_values: Vec<u32>,
}

impl BreakableProp {
    pub fn new(position: Vec3, treasure_values: Vec<u32>) -> Self {
        Self {
            position,
            broken: false,
            treasure_values,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Break the prop. Only the first hit counts.
    pub fn break_open<R: Rng + ?Sized>(&mut self, rng: &mut R) -> BreakOutcome {
        if self.broken {
            return BreakOutcome::AlreadyBroken;
        }
        self.broken = true;
        if self.treasure_values.is_empty() {
            return BreakOutcome::Broken(None);
        }
        let pick = rng.gen_range(0..self.treasure_values.len());
        BreakOutcome::Broken(Some(self.treasure_values[pick]))
    }
}
