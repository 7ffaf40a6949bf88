use std::fmt;

use serde::{Deserialize, Serialize};

/// A generational handle. Compact u32 slot index + generation counter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Handle {
    /// Build a handle from raw parts (mainly for testing).
    pub const fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The slot index of this handle.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation of this handle (bumped every time the slot is freed).
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out slots and tracks which generation of each slot is live.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    generations: Vec<u32>,
    live: Vec<bool>,
    free_list: Vec<u32>,
    len: usize,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle, reusing a freed slot if one is available.
    pub fn allocate(&mut self) -> Handle {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            self.live[index as usize] = true;
            return Handle {
                index,
                generation: self.generations[index as usize],
            };
        }
        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        Handle {
            index,
            generation: 0,
        }
    }

    /// Free a handle's slot. Returns `false` for stale or unknown handles.
    pub fn release(&mut self, handle: Handle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        let idx = handle.index as usize;
        self.live[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(handle.index);
        self.len -= 1;
        true
    }

    /// Whether the handle still refers to the current occupant of its slot.
    pub fn is_live(&self, handle: Handle) -> bool {
        let idx = handle.index as usize;
        idx < self.live.len() && self.live[idx] && self.generations[idx] == handle.generation
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
