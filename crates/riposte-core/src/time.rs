//! Frame clock for the combat simulation
//!
//! Converts the raw frame delta handed in by the host into the clamped,
//! scaled delta that controllers and the scheduler consume.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Simulated seconds per real second
    pub time_scale: f32,
    /// Longest frame the clock accepts; slower frames are cut to this
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta_time: 0.25,
        }
    }
}

/// Simulated time, advanced once per frame
#[derive(Debug, Clone, Default)]
pub struct GameTime {
    pub config: TimeConfig,
    /// Simulated seconds since the clock started
    pub elapsed: f64,
    /// Scaled step of the last frame, zero while paused
    pub delta: f32,
    pub frames: u64,
    pub paused: bool,
}

impl GameTime {
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Count a frame of `raw_delta` real seconds and return the simulated step.
    /// Negative and non-finite deltas count as an empty frame.
    pub fn update(&mut self, raw_delta: f32) -> f32 {
        self.frames += 1;
        let raw = if raw_delta.is_finite() { raw_delta } else { 0.0 };
        self.delta = if self.paused {
            0.0
        } else {
            raw.clamp(0.0, self.config.max_delta_time) * self.config.time_scale
        };
        self.elapsed += f64::from(self.delta);
        self.delta
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// 0 freezes, 1 is real time. Negative scales are treated as 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.config.time_scale = scale.max(0.0);
    }
}
