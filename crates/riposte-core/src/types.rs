//! Spatial types shared by combatants
//!
//! The world is right-handed with +Y up. A transform faces down its local -Z
//! axis, so a yaw of zero looks along world -Z and positive yaw turns left.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a combatant or prop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Transform at `position` facing world -Z
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Unit vector the transform faces
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Turn to face `target` on the horizontal plane. No-op if the target is
    /// directly above or below.
    pub fn face_towards(&mut self, target: Vec3) {
        let flat = Vec3::new(target.x - self.position.x, 0.0, target.z - self.position.z);
        if flat.length_squared() <= f32::EPSILON {
            return;
        }
        let dir = flat.normalize();
        // forward = (-sin(yaw), 0, -cos(yaw))
        let yaw = (-dir.x).atan2(-dir.z);
        self.rotation = Quat::from_rotation_y(yaw);
    }
}
