use std::collections::TryReserveError;
use std::ops::{Index, IndexMut};

// We use a u32 here instead of usize under the assumption there simply won't be that many entries
// and so that we can save some bytes in the nodes that hold these indices.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FVIndex(pub u32);

enum Slot<V> {
    Occupied(V),
    // Vacant slots form an intrusive free list, so freeing never allocates.
    Vacant { next_free: Option<u32> },
}

/// A place to store (owned) values that can be accessed by an index, with holes being re-used.
/// A poor man's slot map or arena, really. Capacity can be reserved fallibly ahead of a batch of
/// `add` calls, after which those calls will not allocate.
pub struct FillVector<V> {
    values: Vec<Slot<V>>,
    free_head: Option<u32>,
    free_count: usize,
    size: usize,
    /// Slots beyond this would not fit an `FVIndex`.
    max_slots: usize,
}

impl<V> FillVector<V> {
    pub fn new() -> Self {
        Self {
            values: vec![],
            free_head: None,
            free_count: 0,
            size: 0,
            max_slots: u32::MAX as usize,
        }
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut fv = Self::new();
        fv.values.try_reserve_exact(capacity)?;
        Ok(fv)
    }

    /// Make sure the next `additional` calls to `add` can be satisfied without allocating, and
    /// without running out of indices.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let needed = additional.saturating_sub(self.free_count);
        if self.values.len().saturating_add(needed) > self.max_slots {
            // Asking for usize::MAX more slots always fails with a capacity overflow.
            return self.values.try_reserve(usize::MAX);
        }
        self.values.try_reserve(needed)
    }

    /// Cap the number of slots, so tests can run out of room without running out of memory.
    #[cfg(test)]
    pub(crate) fn set_max_slots(&mut self, max_slots: usize) {
        self.max_slots = max_slots;
    }

    pub fn add(&mut self, value: V) -> FVIndex {
        let id = match self.free_head {
            None => {
                debug_assert!(self.values.len() < self.max_slots, "slot index overflow");
                let id = FVIndex(self.values.len() as u32);
                self.values.push(Slot::Occupied(value));
                id
            }
            Some(idx) => {
                let slot = std::mem::replace(&mut self.values[idx as usize], Slot::Occupied(value));
                debug_assert!(matches!(slot, Slot::Vacant { .. }), "free list hit an occupied slot");
                self.free_head = match slot {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => None,
                };
                self.free_count -= 1;
                FVIndex(idx)
            }
        };
        self.size += 1;
        id
    }

    /// Release the slot at `id`, handing back what was stored there. Returns `None` if the slot
    /// was already free.
    pub fn free(&mut self, id: FVIndex) -> Option<V> {
        let slot = self.values.get_mut(id.0 as usize)?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let old = std::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id.0);
        self.free_count += 1;
        self.size -= 1;
        match old {
            Slot::Occupied(v) => Some(v),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, id: FVIndex) -> Option<&V> {
        match self.values.get(id.0 as usize)? {
            Slot::Occupied(v) => Some(v),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, id: FVIndex) -> Option<&mut V> {
        match self.values.get_mut(id.0 as usize)? {
            Slot::Occupied(v) => Some(v),
            Slot::Vacant { .. } => None,
        }
    }

    /// Drop every value and forget all slots, keeping the allocation.
    pub fn clear(&mut self) {
        self.values.clear();
        self.free_head = None;
        self.free_count = 0;
        self.size = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl<V> Index<FVIndex> for FillVector<V> {
    type Output = V;

    fn index(&self, index: FVIndex) -> &Self::Output {
        match self.get(index) {
            Some(v) => v,
            None => panic!("access to free slot {}", index.0),
        }
    }
}

impl<V> IndexMut<FVIndex> for FillVector<V> {
    fn index_mut(&mut self, index: FVIndex) -> &mut Self::Output {
        match self.get_mut(index) {
            Some(v) => v,
            None => panic!("access to free slot {}", index.0),
        }
    }
}

impl<V> Default for FillVector<V> {
    fn default() -> Self {
        Self::new()
    }
}
