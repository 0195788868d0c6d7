use std::collections::BTreeSet;

use crate::foundation::core::{Slot, quantize_unorm8};
use crate::ptex::layout::PtexLayout;

/// Result of a single channel write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The byte changed and its texel group is now dirty.
    Written,
    /// The stored byte already had this value; nothing is marked dirty.
    Unchanged,
    /// The instance holds no slot.
    Unregistered,
    /// The channel does not exist in this layout.
    ChannelOutOfRange,
}

impl WriteOutcome {
    pub fn is_written(self) -> bool {
        matches!(self, Self::Written)
    }
}

/// Byte buffer addressed by `(slot, channel)` plus the set of texel groups changed since the last
/// flush.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    layout: PtexLayout,
    buffer: Vec<u8>,
    // Ordered so flushes emit cells deterministically.
    dirty: BTreeSet<u32>,
}

impl ParameterStore {
    pub fn new(layout: PtexLayout) -> Self {
        Self {
            layout,
            buffer: vec![0; layout.buffer_len()],
            dirty: BTreeSet::new(),
        }
    }

    pub fn layout(&self) -> PtexLayout {
        self.layout
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn set_byte(&mut self, slot: Slot, channel: u32, value: u8) -> WriteOutcome {
        if !slot.is_assigned() {
            return WriteOutcome::Unregistered;
        }
        let (Some(at), Some(texel)) = (
            self.layout.byte_index(slot, channel),
            self.layout.texel_index(slot, channel),
        ) else {
            return WriteOutcome::ChannelOutOfRange;
        };
        if self.buffer[at] == value {
            return WriteOutcome::Unchanged;
        }
        self.buffer[at] = value;
        self.dirty.insert(texel);
        WriteOutcome::Written
    }

    /// Clamp to `[0, 1]`, quantize to a byte, then [`Self::set_byte`].
    pub fn set_float(&mut self, slot: Slot, channel: u32, value: f32) -> WriteOutcome {
        self.set_byte(slot, channel, quantize_unorm8(value))
    }

    pub fn byte(&self, slot: Slot, channel: u32) -> Option<u8> {
        let at = self.layout.byte_index(slot, channel)?;
        self.buffer.get(at).copied()
    }

    /// The 4 bytes of texel group `index`.
    pub fn texel(&self, index: u32) -> Option<[u8; 4]> {
        let start = (index as usize).checked_mul(4)?;
        let bytes = self.buffer.get(start..start + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_dirty(&self, index: u32) -> bool {
        self.dirty.contains(&index)
    }

    pub fn dirty_cells(&self) -> impl Iterator<Item = u32> + '_ {
        self.dirty.iter().copied()
    }

    /// Dirty texel groups with their current bytes, in ascending index order.
    pub fn dirty_texels(&self) -> impl Iterator<Item = (u32, [u8; 4])> + '_ {
        self.dirty
            .iter()
            .filter_map(|&i| self.texel(i).map(|t| (i, t)))
    }

    /// Forget all pending cells and return how many there were.
    pub fn clear_dirty(&mut self) -> usize {
        let n = self.dirty.len();
        self.dirty.clear();
        n
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ptex/store.rs"]
mod tests;
