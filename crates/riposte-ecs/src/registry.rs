use crate::handle::{Handle, HandleAllocator};

/// Owns values of one kind and hands out generational handles to them.
///
/// Storage is a sparse set: `sparse` maps slot index to a position in the
/// packed `dense` array, so lookups are O(1) and iteration walks only live
/// values, in insertion order until a removal swaps the tail into the gap.
pub struct Registry<T> {
    handles: HandleAllocator,
    sparse: Vec<Option<usize>>,
    dense: Vec<T>,
    owners: Vec<Handle>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            handles: HandleAllocator::new(),
            sparse: Vec::new(),
            dense: Vec::new(),
            owners: Vec::new(),
        }
    }

    /// Store a value and return its handle.
    pub fn insert(&mut self, value: T) -> Handle {
        self.insert_with(|_| value)
    }

    /// Store a value that needs to know its own handle.
    pub fn insert_with(&mut self, build: impl FnOnce(Handle) -> T) -> Handle {
        let handle = self.handles.allocate();
        let idx = handle.index as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, None);
        }
        self.sparse[idx] = Some(self.dense.len());
        self.dense.push(build(handle));
        self.owners.push(handle);
        handle
    }

    /// Remove and return the value behind a handle. Stale handles yield `None`.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.handles.release(handle) {
            return None;
        }
        let idx = handle.index as usize;
        let dense_idx = self.sparse[idx].take()?;
        let last = self.dense.len() - 1;
        if dense_idx != last {
            // Swap-remove: the tail value moves into the freed position.
            self.dense.swap(dense_idx, last);
            self.owners.swap(dense_idx, last);
            let moved = self.owners[dense_idx];
            self.sparse[moved.index as usize] = Some(dense_idx);
        }
        self.owners.pop();
        self.dense.pop()
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        if !self.handles.is_live(handle) {
            return None;
        }
        let dense_idx = (*self.sparse.get(handle.index as usize)?)?;
        self.dense.get(dense_idx)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if !self.handles.is_live(handle) {
            return None;
        }
        let dense_idx = (*self.sparse.get(handle.index as usize)?)?;
        self.dense.get_mut(dense_idx)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.handles.is_live(handle)
    }

    /// Iterate over `(handle, &value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    /// Iterate over `(handle, &mut value)` pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.owners.iter().copied().zip(self.dense.iter_mut())
    }

    /// Snapshot of all live handles, for loops that need to mutate the
    /// registry while walking it.
    pub fn handles(&self) -> Vec<Handle> {
        self.owners.clone()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
