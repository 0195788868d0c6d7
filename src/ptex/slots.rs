use crate::foundation::core::Slot;

/// Fixed-capacity LIFO pool of 1-based slot ids.
///
/// The pool is seeded so the first acquisitions hand out `1, 2, 3, ...`. Released slots go back on
/// top and are the next to be reused.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    free: Vec<u32>,
    in_use: Vec<bool>,
}

impl SlotAllocator {
    pub fn new(capacity: u32) -> Self {
        Self {
            free: (1..=capacity).rev().collect(),
            in_use: vec![false; capacity as usize],
        }
    }

    pub fn capacity(&self) -> u32 {
        self.in_use.len() as u32
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    pub fn in_use_len(&self) -> usize {
        self.in_use.len() - self.free.len()
    }

    pub fn is_in_use(&self, slot: Slot) -> bool {
        slot.row()
            .and_then(|r| self.in_use.get(r))
            .copied()
            .unwrap_or(false)
    }

    /// Pop a free slot, or `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<Slot> {
        let id = self.free.pop()?;
        self.in_use[(id - 1) as usize] = true;
        Some(Slot(id))
    }

    /// Return a held slot to the pool.
    ///
    /// Releasing [`Slot::NONE`], an out-of-range slot, or a slot that is already free is a no-op
    /// and returns `false`.
    pub fn release(&mut self, slot: Slot) -> bool {
        let Some(flag) = slot.row().and_then(|r| self.in_use.get_mut(r)) else {
            return false;
        };
        if !*flag {
            return false;
        }
        *flag = false;
        self.free.push(slot.0);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ptex/slots.rs"]
mod tests;
