use std::rc::Rc;

use crate::effects::EffectKind;
use crate::effects::base::{EffectBase, delegate_parameter_target, set_unit, set_unit_rgb};
use crate::foundation::core::TextureHandle;
use crate::material::{Material, PropertyId};
use crate::ptex::texture::{ParameterTexture, Registration};

pub const CH_EFFECT_FACTOR: u32 = 0;
pub const CH_DISSOLVE_WIDTH: u32 = 1;
pub const CH_DISSOLVE_SOFTNESS: u32 = 2;
pub const CH_DISSOLVE_RED: u32 = 4;
pub const CH_DISSOLVE_GREEN: u32 = 5;
pub const CH_DISSOLVE_BLUE: u32 = 6;

pub const TRANSITION_TEXTURE_PROPERTY: &str = "_TransitionTexture";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionMode {
    None = 0,
    Fade = 1,
    #[default]
    Cutoff = 2,
    Dissolve = 3,
}

impl TransitionMode {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Fade => "FADE",
            Self::Cutoff => "CUTOFF",
            Self::Dissolve => "DISSOLVE",
        }
    }
}

/// Show/hide transition driven by `effect_factor`.
///
/// Only the dissolve mode uses the edge channels; other modes leave them untouched.
#[derive(Debug)]
pub struct Transition {
    base: EffectBase,
    effect_factor: f32,
    mode: TransitionMode,
    dissolve_width: f32,
    dissolve_softness: f32,
    dissolve_color: [f32; 3],
    transition_texture: Option<TextureHandle>,
}

impl Transition {
    pub fn new(ptex: &Rc<ParameterTexture>) -> Self {
        Self {
            base: EffectBase::new(EffectKind::Transition, ptex),
            effect_factor: 1.0,
            mode: TransitionMode::Cutoff,
            dissolve_width: 0.5,
            dissolve_softness: 0.5,
            dissolve_color: [0.0, 0.25, 1.0],
            transition_texture: None,
        }
    }

    pub fn base(&self) -> &EffectBase {
        &self.base
    }

    pub fn enable(&mut self) -> Registration {
        let registration = self.base.enable(self.build_material());
        self.push_parameters();
        registration
    }

    pub fn disable(&mut self) -> bool {
        self.base.disable()
    }

    pub fn effect_factor(&self) -> f32 {
        self.effect_factor
    }

    pub fn set_effect_factor(&mut self, value: f32) {
        if set_unit(&mut self.effect_factor, value) {
            self.base.write(CH_EFFECT_FACTOR, self.effect_factor);
        }
    }

    pub fn mode(&self) -> TransitionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TransitionMode) {
        if self.mode != mode {
            self.mode = mode;
            self.base.replace_material(self.build_material());
            self.push_parameters();
        }
    }

    pub fn dissolve_width(&self) -> f32 {
        self.dissolve_width
    }

    pub fn set_dissolve_width(&mut self, value: f32) {
        if set_unit(&mut self.dissolve_width, value) {
            self.push_parameters();
        }
    }

    pub fn dissolve_softness(&self) -> f32 {
        self.dissolve_softness
    }

    pub fn set_dissolve_softness(&mut self, value: f32) {
        if set_unit(&mut self.dissolve_softness, value) {
            self.push_parameters();
        }
    }

    pub fn dissolve_color(&self) -> [f32; 3] {
        self.dissolve_color
    }

    pub fn set_dissolve_color(&mut self, rgb: [f32; 3]) {
        if set_unit_rgb(&mut self.dissolve_color, rgb) {
            self.push_parameters();
        }
    }

    pub fn transition_texture(&self) -> Option<TextureHandle> {
        self.transition_texture
    }

    pub fn set_transition_texture(&mut self, texture: Option<TextureHandle>) {
        if self.transition_texture != texture {
            self.transition_texture = texture;
            self.base.replace_material(self.build_material());
        }
    }

    pub fn param_row(&self) -> f32 {
        self.base.param_row()
    }

    pub fn effect_hash(&self) -> u64 {
        let texture = self
            .transition_texture
            .map_or(0, |t| (t.0 as u32 as u64) << 8);
        EffectKind::Transition.hash_tag() + ((self.mode as u64) << 4) + texture
    }

    fn build_material(&self) -> Material {
        let mut material =
            Material::variant(EffectKind::Transition.material_name(), self.effect_hash());
        material.enable_keyword(self.mode.keyword());
        if let Some(texture) = self.transition_texture {
            material.set_texture(PropertyId::from_name(TRANSITION_TEXTURE_PROPERTY), texture);
        }
        material
    }

    fn push_parameters(&self) {
        self.base.write(CH_EFFECT_FACTOR, self.effect_factor);
        if self.mode == TransitionMode::Dissolve {
            let [r, g, b] = self.dissolve_color;
            self.base.write_all(&[
                (CH_DISSOLVE_WIDTH, self.dissolve_width),
                (CH_DISSOLVE_SOFTNESS, self.dissolve_softness),
                (CH_DISSOLVE_RED, r),
                (CH_DISSOLVE_GREEN, g),
                (CH_DISSOLVE_BLUE, b),
            ]);
        }
    }
}

delegate_parameter_target!(Transition);

#[cfg(test)]
#[path = "../../tests/unit/effects/transition.rs"]
mod tests;
