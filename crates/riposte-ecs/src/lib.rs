//! Riposte ECS - Handle registries
//!
//! Combatants, pickups and props refer to one another through generational
//! handles instead of owning pointers. A handle whose slot was freed (and
//! possibly reused) resolves to `None`, so a target that is removed mid-fight
//! simply reads as absent.

mod handle;
mod registry;

pub use handle::{Handle, HandleAllocator};
pub use registry::Registry;
