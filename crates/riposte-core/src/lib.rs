//! Riposte Core - Core types shared by the combat crates
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam)
//! - Transform with facing helpers for combatants
//! - Frame clock driving the simulation tick

pub mod time;
pub mod types;

pub use glam::{Quat, Vec3};
pub use time::{GameTime, TimeConfig};
pub use types::Transform;
