//! Index-stable slot storage backing the network's nodes and edges.
//!
//! Slots are never reused, so handles stay unique for the lifetime of the
//! network even after deletions. A dense `live` list mirrors the occupied
//! slots so uniform sampling stays O(1).

#[derive(Clone, Debug)]
pub(super) struct Arena<T> {
    slots: Vec<Option<T>>,
    live: Vec<usize>,
    position: Vec<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            live: Vec::new(),
            position: Vec::new(),
        }
    }
}

impl<T> Arena<T> {
    /// Allocates the next slot, building the value from its index.
    pub(super) fn insert_with(&mut self, make: impl FnOnce(usize) -> T) -> usize {
        let index = self.slots.len();
        self.slots.push(Some(make(index)));
        self.position.push(self.live.len());
        self.live.push(index);
        index
    }

    pub(super) fn remove(&mut self, index: usize) -> Option<T> {
        let value = self.slots.get_mut(index)?.take()?;
        let pos = self.position[index];
        self.live.swap_remove(pos);
        if let Some(&moved) = self.live.get(pos) {
            self.position[moved] = pos;
        }
        Some(value)
    }

    pub(super) fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub(super) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub(super) fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub(super) fn len(&self) -> usize {
        self.live.len()
    }

    /// Occupied indices in allocation-independent (sampling) order.
    pub(super) fn live(&self) -> &[usize] {
        &self.live
    }

    /// Occupied values in ascending index order.
    pub(super) fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub(super) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Drops every value while keeping the index counter monotonic.
    pub(super) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.live.clear();
    }
}
