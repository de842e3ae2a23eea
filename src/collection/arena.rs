//! A slot allocator handing out stable integer handles.
//!
//! Freed slots are chained into an intrusive free list and reused last-in
//! first-out, so `add` never shifts existing entries and an index stays valid
//! until its slot is freed. Reading a freed slot is a usage bug and panics.

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied(T),
    Free { next_free: Option<usize> },
}

#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    first_free: Option<usize>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            first_free: None,
            len: 0,
        }
    }

    /// Stores `value`, reusing the most recently freed slot if there is one.
    pub fn add(&mut self, value: T) -> usize {
        self.len += 1;
        match self.first_free {
            Some(index) => {
                if let Slot::Free { next_free } = self.slots[index] {
                    self.first_free = next_free;
                }
                self.slots[index] = Slot::Occupied(value);
                index
            }
            None => {
                self.slots.push(Slot::Occupied(value));
                self.slots.len() - 1
            }
        }
    }

    /// Frees the slot at `index` and returns its payload.
    ///
    /// # Panics
    /// If `index` is out of range or already free.
    pub fn free(&mut self, index: usize) -> T {
        let slot = self
            .slots
            .get_mut(index)
            .unwrap_or_else(|| panic!("arena index {index} out of range"));
        let freed = std::mem::replace(
            slot,
            Slot::Free {
                next_free: self.first_free,
            },
        );
        match freed {
            Slot::Occupied(value) => {
                self.first_free = Some(index);
                self.len -= 1;
                value
            }
            Slot::Free { next_free } => {
                // Put the link back before reporting the misuse
                *slot = Slot::Free { next_free };
                panic!("arena index {index} freed twice");
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        match self.slots.get(index) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        match self.slots.get_mut(index) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Borrows two distinct live slots mutably at once.
    ///
    /// # Panics
    /// If `a == b` or either slot is free.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> (&mut T, &mut T) {
        assert_ne!(a, b, "pair_mut needs two distinct indices");
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(high);
        let (low_ref, high_ref) = match (&mut head[low], &mut tail[0]) {
            (Slot::Occupied(l), Slot::Occupied(h)) => (l, h),
            _ => panic!("arena slots {a} and {b} must both be occupied"),
        };
        if a < b {
            (low_ref, high_ref)
        } else {
            (high_ref, low_ref)
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Occupied(_)))
    }

    /// Number of live payloads.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots ever allocated, free or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.first_free = None;
        self.len = 0;
    }

    /// Iterates `(index, &payload)` over live slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(value) => Some((i, value)),
            Slot::Free { .. } => None,
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Slot::Occupied(value) => Some((i, value)),
                Slot::Free { .. } => None,
            })
    }

    /// Iterates the live payloads only.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|(_, value)| value)
    }
}

impl<T> Index<usize> for Arena<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.slots.get(index) {
            Some(Slot::Occupied(value)) => value,
            Some(Slot::Free { .. }) => panic!("arena index {index} read after free"),
            None => panic!("arena index {index} out of range"),
        }
    }
}

impl<T> IndexMut<usize> for Arena<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.slots.get_mut(index) {
            Some(Slot::Occupied(value)) => value,
            Some(Slot::Free { .. }) => panic!("arena index {index} read after free"),
            None => panic!("arena index {index} out of range"),
        }
    }
}
