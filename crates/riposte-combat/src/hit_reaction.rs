//! Directional hit reactions
//!
//! Turns an impact point into one of four reaction buckets relative to the
//! victim's facing. The world is right-handed with +Y up, so the impact is
//! flattened onto the victim's horizontal plane and the sign of the angle is
//! taken from the Y component of `forward x to_hit`. Positive angles lie on
//! the victim's right.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which side of the victim an impact came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitDirection {
    Front,
    Back,
    Left,
    Right,
}

impl HitDirection {
    /// Animation section that plays this reaction
    pub fn section_name(self) -> &'static str {
        match self {
            HitDirection::Front => "FromFront",
            HitDirection::Back => "FromBack",
            HitDirection::Left => "FromLeft",
            HitDirection::Right => "FromRight",
        }
    }
}

/// Signed horizontal angle in degrees from `forward` to the impact.
///
/// Returns `None` when the impact sits on the victim's vertical axis or the
/// facing has no horizontal component.
pub fn signed_angle(forward: Vec3, position: Vec3, impact: Vec3) -> Option<f32> {
    let lowered = Vec3::new(impact.x, position.y, impact.z);
    let to_hit = (lowered - position).try_normalize()?;
    let forward = Vec3::new(forward.x, 0.0, forward.z).try_normalize()?;

    let mut theta = forward.dot(to_hit).clamp(-1.0, 1.0).acos().to_degrees();
    if forward.cross(to_hit).y > 0.0 {
        theta = -theta;
    }
    Some(theta)
}

/// Bucket a signed angle. Front owns both of its 45 degree edges, Right owns
/// nothing at 135 and everything else falls through to Back.
pub fn bucket_for_angle(theta: f32) -> HitDirection {
    if (-45.0..=45.0).contains(&theta) {
        HitDirection::Front
    } else if (-135.0..-45.0).contains(&theta) {
        HitDirection::Left
    } else if (45.0..135.0).contains(&theta) {
        HitDirection::Right
    } else {
        HitDirection::Back
    }
}

/// Reaction for an impact. Degenerate geometry reads as a frontal hit.
pub fn solve(forward: Vec3, position: Vec3, impact: Vec3) -> HitDirection {
    signed_angle(forward, position, impact)
        .map(bucket_for_angle)
        .unwrap_or(HitDirection::Front)
}

/// Where an attacker should stop when lunging at `target`: `distance` units
/// short of it, on the attacker's side.
pub fn translation_warp_target(attacker: Vec3, target: Option<Vec3>, distance: f32) -> Option<Vec3> {
    let target = target?;
    let target_to_attacker = (attacker - target).normalize_or_zero();
    Some(target + target_to_attacker * distance)
}

/// Point an attacker should turn towards while lunging.
pub fn rotation_warp_target(target: Option<Vec3>) -> Option<Vec3> {
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Impact `deg` degrees clockwise (towards the right) from `forward`
    fn impact_at(forward: Vec3, position: Vec3, deg: f32) -> Vec3 {
        let right = forward.cross(Vec3::Y);
        let rad = deg.to_radians();
        position + (forward * rad.cos() + right * rad.sin()) * 100.0
    }

    #[test]
    fn test_cardinal_directions() {
        let fwd = Vec3::NEG_Z;
        let pos = Vec3::new(10.0, 0.0, 10.0);
        assert_eq!(solve(fwd, pos, pos + Vec3::NEG_Z * 50.0), HitDirection::Front);
        assert_eq!(solve(fwd, pos, pos + Vec3::Z * 50.0), HitDirection::Back);
        assert_eq!(solve(fwd, pos, pos + Vec3::NEG_X * 50.0), HitDirection::Left);
        assert_eq!(solve(fwd, pos, pos + Vec3::X * 50.0), HitDirection::Right);
    }

    #[test]
    fn test_impact_height_is_ignored() {
        let pos = Vec3::ZERO;
        let high_right = Vec3::new(30.0, 500.0, 0.0);
        assert_eq!(solve(Vec3::NEG_Z, pos, high_right), HitDirection::Right);
    }

    #[test]
    fn test_degenerate_is_front() {
        let pos = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(solve(Vec3::NEG_Z, pos, pos), HitDirection::Front);
        assert_eq!(solve(Vec3::NEG_Z, pos, pos + Vec3::Y * 10.0), HitDirection::Front);
        assert_eq!(solve(Vec3::Y, pos, pos + Vec3::Z), HitDirection::Front);
        assert_eq!(signed_angle(Vec3::NEG_Z, pos, pos), None);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(bucket_for_angle(0.0), HitDirection::Front);
        assert_eq!(bucket_for_angle(45.0), HitDirection::Front);
        assert_eq!(bucket_for_angle(-45.0), HitDirection::Front);
        assert_eq!(bucket_for_angle(45.01), HitDirection::Right);
        assert_eq!(bucket_for_angle(-45.01), HitDirection::Left);
        assert_eq!(bucket_for_angle(-135.0), HitDirection::Left);
        assert_eq!(bucket_for_angle(134.99), HitDirection::Right);
        assert_eq!(bucket_for_angle(135.0), HitDirection::Back);
        assert_eq!(bucket_for_angle(-135.01), HitDirection::Back);
        assert_eq!(bucket_for_angle(180.0), HitDirection::Back);
    }

    #[test]
    fn test_section_names() {
        assert_eq!(HitDirection::Front.section_name(), "FromFront");
        assert_eq!(HitDirection::Back.section_name(), "FromBack");
        assert_eq!(HitDirection::Left.section_name(), "FromLeft");
        assert_eq!(HitDirection::Right.section_name(), "FromRight");
    }

    #[test]
    fn test_translation_warp_target() {
        let attacker = Vec3::new(0.0, 0.0, 300.0);
        let target = Vec3::ZERO;
        let warp = translation_warp_target(attacker, Some(target), 75.0).unwrap();
        assert!((warp - Vec3::new(0.0, 0.0, 75.0)).length() < 1e-4);
        assert_eq!(translation_warp_target(attacker, None, 75.0), None);
        assert_eq!(rotation_warp_target(Some(target)), Some(target));
    }

    proptest! {
        #[test]
        fn rotated_victims_agree_with_buckets(yaw in -3.1f32..3.1, deg in -179.0f32..179.0) {
            prop_assume!([-135.0f32, -45.0, 45.0, 135.0].iter().all(|b| (deg - b).abs() > 0.5));
            let forward = glam::Quat::from_rotation_y(yaw) * Vec3::NEG_Z;
            let pos = Vec3::new(5.0, 1.0, -3.0);
            let impact = impact_at(forward, pos, deg);
            prop_assert_eq!(solve(forward, pos, impact), bucket_for_angle(deg));
        }

        #[test]
        fn buckets_partition_the_circle(theta in -180.0f32..=180.0) {
            let expected = if (-45.0..=45.0).contains(&theta) {
                HitDirection::Front
            } else if theta < -45.0 && theta >= -135.0 {
                HitDirection::Left
            } else if theta > 45.0 && theta < 135.0 {
                HitDirection::Right
            } else {
                HitDirection::Back
            };
            prop_assert_eq!(bucket_for_angle(theta), expected);
        }
    }
}
