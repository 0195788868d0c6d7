use std::rc::Rc;

use crate::effects::{EffectKind, approximately};
use crate::foundation::core::Slot;
use crate::material::Material;
use crate::ptex::store::WriteOutcome;
use crate::ptex::target::ParameterTarget;
use crate::ptex::texture::{ParameterTexture, Registration};

/// How an effect color combines with the graphic's color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Multiply = 0,
    Fill = 1,
    Add = 2,
    Subtract = 3,
}

impl ColorMode {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Multiply => "MULTIPLY",
            Self::Fill => "FILL",
            Self::Add => "ADD",
            Self::Subtract => "SUBTRACT",
        }
    }
}

/// State every effect shares: its texture row, its material variant and whether it is enabled.
///
/// Dropping an effect releases its row.
#[derive(Debug)]
pub struct EffectBase {
    kind: EffectKind,
    ptex: Rc<ParameterTexture>,
    slot: Slot,
    material: Option<Material>,
    enabled: bool,
}

impl EffectBase {
    pub fn new(kind: EffectKind, ptex: &Rc<ParameterTexture>) -> Self {
        Self {
            kind,
            ptex: Rc::clone(ptex),
            slot: Slot::NONE,
            material: None,
            enabled: false,
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    /// Normalized row coordinate vertex data carries to the shader.
    pub fn param_row(&self) -> f32 {
        self.ptex.normalized_slot_coordinate(self)
    }

    /// Install `material` and take a row. The material is bound during registration.
    pub fn enable(&mut self, material: Material) -> Registration {
        self.material = Some(material);
        self.enabled = true;
        let ptex = Rc::clone(&self.ptex);
        ptex.register(self)
    }

    /// Drop the material and give the row back.
    pub fn disable(&mut self) -> bool {
        self.material = None;
        self.enabled = false;
        let ptex = Rc::clone(&self.ptex);
        ptex.unregister(self)
    }

    /// Swap in a new material variant while enabled.
    pub fn replace_material(&mut self, mut material: Material) {
        if !self.enabled {
            return;
        }
        self.ptex.bind_texture(&mut material);
        self.material = Some(material);
    }

    pub fn write(&self, channel: u32, value: f32) -> WriteOutcome {
        self.ptex.set_float(self, channel, value)
    }

    pub fn write_all(&self, values: &[(u32, f32)]) {
        for &(channel, value) in values {
            self.write(channel, value);
        }
    }
}

impl ParameterTarget for EffectBase {
    fn parameter_slot(&self) -> Slot {
        self.slot
    }

    fn set_parameter_slot(&mut self, slot: Slot) {
        self.slot = slot;
    }

    fn ptex(&self) -> &Rc<ParameterTexture> {
        &self.ptex
    }

    fn ptex_material(&mut self) -> Option<&mut Material> {
        self.material.as_mut()
    }
}

impl Drop for EffectBase {
    fn drop(&mut self) {
        if self.slot.is_assigned() {
            let ptex = Rc::clone(&self.ptex);
            ptex.unregister(self);
        }
    }
}

/// Clamp `value` into `[0, 1]` and store it in `field`.
///
/// Returns `true` when the stored value changed.
pub(crate) fn set_unit(field: &mut f32, value: f32) -> bool {
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    if approximately(*field, value) {
        return false;
    }
    *field = value;
    true
}

pub(crate) fn set_unit_rgb(field: &mut [f32; 3], value: [f32; 3]) -> bool {
    let mut changed = false;
    for (slot, v) in field.iter_mut().zip(value) {
        changed |= set_unit(slot, v);
    }
    changed
}

/// Delegates [`ParameterTarget`] to the effect's `base` field.
macro_rules! delegate_parameter_target {
    ($ty:ty) => {
        impl $crate::ptex::target::ParameterTarget for $ty {
            fn parameter_slot(&self) -> $crate::foundation::core::Slot {
                self.base.slot()
            }

            fn set_parameter_slot(&mut self, slot: $crate::foundation::core::Slot) {
                $crate::ptex::target::ParameterTarget::set_parameter_slot(&mut self.base, slot);
            }

            fn ptex(&self) -> &std::rc::Rc<$crate::ptex::texture::ParameterTexture> {
                $crate::ptex::target::ParameterTarget::ptex(&self.base)
            }

            fn ptex_material(&mut self) -> Option<&mut $crate::material::Material> {
                $crate::ptex::target::ParameterTarget::ptex_material(&mut self.base)
            }
        }
    };
}

pub(crate) use delegate_parameter_target;
