use kurbo::Affine;

use crate::foundation::core::Slot;
use crate::foundation::error::{UifxError, UifxResult};

/// Shader property a parameter texture binds to unless configured otherwise.
pub const DEFAULT_PROPERTY_NAME: &str = "_ParamTex";

/// User-facing sizing of one parameter texture.
///
/// Values are rounded by [`PtexLayout::from_config`]: channels up to a multiple of 4, instance
/// limit up to a multiple of 2.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PtexConfig {
    /// Byte channels per instance.
    pub channels: u32,
    /// Maximum number of concurrently registered instances.
    pub instance_limit: u32,
    /// Shader property the texture is bound to on materials.
    pub property_name: String,
}

impl Default for PtexConfig {
    fn default() -> Self {
        Self {
            channels: 4,
            instance_limit: 128,
            property_name: DEFAULT_PROPERTY_NAME.to_string(),
        }
    }
}

impl PtexConfig {
    pub fn new(channels: u32, instance_limit: u32, property_name: impl Into<String>) -> Self {
        Self {
            channels,
            instance_limit,
            property_name: property_name.into(),
        }
    }

    pub fn validate(&self) -> UifxResult<()> {
        PtexLayout::from_config(self).map(|_| ())
    }
}

/// Validated geometry of a parameter texture.
///
/// One texel row per slot; each row holds `channel_count / 4` RGBA texel groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PtexLayout {
    channel_count: u32,
    instance_capacity: u32,
}

impl PtexLayout {
    pub fn from_config(config: &PtexConfig) -> UifxResult<Self> {
        if config.channels == 0 {
            return Err(UifxError::validation("ptex channels must be >= 1"));
        }
        if config.instance_limit == 0 {
            return Err(UifxError::validation("ptex instance_limit must be >= 1"));
        }
        if config.property_name.trim().is_empty() {
            return Err(UifxError::validation("ptex property_name must be non-empty"));
        }

        let channel_count = config
            .channels
            .div_ceil(4)
            .checked_mul(4)
            .ok_or_else(|| UifxError::validation("ptex channels overflow"))?;
        let instance_capacity = config
            .instance_limit
            .div_ceil(2)
            .checked_mul(2)
            .ok_or_else(|| UifxError::validation("ptex instance_limit overflow"))?;

        (channel_count as usize)
            .checked_mul(instance_capacity as usize)
            .ok_or_else(|| UifxError::validation("ptex buffer size overflow"))?;
        // Texel-group indices are u32.
        (channel_count / 4)
            .checked_mul(instance_capacity)
            .ok_or_else(|| UifxError::validation("ptex texel count overflow"))?;

        Ok(Self {
            channel_count,
            instance_capacity,
        })
    }

    pub fn channel_count(self) -> u32 {
        self.channel_count
    }

    pub fn instance_capacity(self) -> u32 {
        self.instance_capacity
    }

    /// Texel groups per slot, which is also the texture width.
    pub fn width(self) -> u32 {
        self.channel_count / 4
    }

    /// Texture height: one row per slot.
    pub fn height(self) -> u32 {
        self.instance_capacity
    }

    pub fn buffer_len(self) -> usize {
        self.channel_count as usize * self.instance_capacity as usize
    }

    /// Byte offset of `(slot, channel)` in the buffer.
    pub fn byte_index(self, slot: Slot, channel: u32) -> Option<usize> {
        let row = slot.row()?;
        if row >= self.instance_capacity as usize || channel >= self.channel_count {
            return None;
        }
        Some(row * self.channel_count as usize + channel as usize)
    }

    /// Texel-group index containing `(slot, channel)`.
    pub fn texel_index(self, slot: Slot, channel: u32) -> Option<u32> {
        self.byte_index(slot, channel)?;
        let row = slot.0 - 1;
        Some(row * self.width() + channel / 4)
    }

    /// `(x, y)` texel of a texel-group index (`index = y * width + x`).
    pub fn cell_of(self, index: u32) -> (u32, u32) {
        let width = self.width();
        (index % width, index / width)
    }

    /// Row lookup coordinate for a slot: `(slot - 0.5) / capacity`.
    ///
    /// Unassigned slots yield a negative value that samples clamp to the first row.
    pub fn normalized_row(self, slot: Slot) -> f32 {
        (slot.0 as f32 - 0.5) / self.instance_capacity as f32
    }

    /// Maps texel-grid coordinates (x right, y down, one unit per texel) into clip space.
    pub fn grid_to_clip(self) -> Affine {
        let sx = 2.0 / self.width() as f64;
        let sy = -2.0 / self.height() as f64;
        Affine::new([sx, 0.0, 0.0, sy, -1.0, 1.0])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ptex/layout.rs"]
mod tests;
