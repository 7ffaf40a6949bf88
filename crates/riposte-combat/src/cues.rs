//! Animation cue selection

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;
use crate::host::AnimationDriver;

/// Animation slot a section belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CueKind {
    Attack,
    HitReact,
    Death,
    Dodge,
    Equip,
}

/// Pose a corpse settles in, chosen once by the death section that played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathPose {
    Death1,
    Death2,
    Death3,
    Death4,
    Death5,
    Death6,
}

impl DeathPose {
    pub const ALL: [DeathPose; 6] = [
        DeathPose::Death1,
        DeathPose::Death2,
        DeathPose::Death3,
        DeathPose::Death4,
        DeathPose::Death5,
        DeathPose::Death6,
    ];

    /// Pose for a death-section index. Indices past the known poses have none.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

pub struct CueSelector;

impl CueSelector {
    /// Pick a section uniformly from `pool`, request it and return its index.
    /// An empty pool requests nothing.
    pub fn select_random_section<R, H>(
        rng: &mut R,
        anim: &mut H,
        owner: CombatantId,
        cue: CueKind,
        pool: &[String],
    ) -> Option<usize>
    where
        R: Rng + ?Sized,
        H: AnimationDriver + ?Sized,
    {
        if pool.is_empty() {
            tracing::trace!("{} has no {:?} sections to choose from", owner, cue);
            return None;
        }
        let index = rng.gen_range(0..pool.len());
        anim.play_section(owner, cue, &pool[index]);
        Some(index)
    }

    /// Request a section chosen by the caller (reaction bucket, equip phase)
    pub fn play_section<H>(anim: &mut H, owner: CombatantId, cue: CueKind, section: &str)
    where
        H: AnimationDriver + ?Sized,
    {
        if section.is_empty() {
            return;
        }
        anim.play_section(owner, cue, section);
    }
}

/// Uniform delay in `[min, max]`; a collapsed, inverted or unbounded range
/// yields `min`, and a non-finite `min` yields no delay.
pub fn random_delay<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if !min.is_finite() {
        return 0.0;
    }
    if !max.is_finite() || max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}
