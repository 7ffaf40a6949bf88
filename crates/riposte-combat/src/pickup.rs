//! Currency drops left by fallen enemies and broken props

use glam::Vec3;
use riposte_ecs::Handle;
use serde::{Deserialize, Serialize};

pub type PickupId = Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Souls,
    Gold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub amount: u32,
    pub position: Vec3,
}

impl Pickup {
    pub fn souls(amount: u32, position: Vec3) -> Self {
        Self {
            kind: PickupKind::Souls,
            amount,
            position,
        }
    }

    pub fn gold(amount: u32, position: Vec3) -> Self {
        Self {
            kind: PickupKind::Gold,
            amount,
            position,
        }
    }
}
