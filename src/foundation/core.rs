use std::sync::atomic::{AtomicU64, Ordering};

/// 1-based row index of an instance inside a parameter texture.
///
/// `Slot::NONE` (0) marks an instance that holds no row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(pub u32);

impl Slot {
    /// The "unregistered" sentinel.
    pub const NONE: Slot = Slot(0);

    /// Return `true` when this slot addresses a real row.
    pub fn is_assigned(self) -> bool {
        self.0 > 0
    }

    /// 0-based row in the parameter buffer, or `None` for [`Slot::NONE`].
    pub fn row(self) -> Option<usize> {
        self.0.checked_sub(1).map(|r| r as usize)
    }
}

/// Identity of one parameter texture within a [`crate::FrameScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PtexId(pub u64);

/// Backend-agnostic name of a render target.
///
/// Materials bind handles; backends map handles to concrete textures on first draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(pub u64);

static NEXT_TEXTURE_HANDLE: AtomicU64 = AtomicU64::new(1);

impl TextureHandle {
    /// A handle unique within the process, across every scheduler and backend.
    pub fn allocate() -> Self {
        Self(NEXT_TEXTURE_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Clamp `value` to `[0, 1]` and quantize to a byte. NaN maps to 0.
pub fn quantize_unorm8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Inverse of [`quantize_unorm8`].
pub fn unorm8_to_f32(value: u8) -> f32 {
    value as f32 / 255.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
