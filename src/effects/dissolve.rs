use std::rc::Rc;

use crate::effects::EffectKind;
use crate::effects::base::{
    ColorMode, EffectBase, delegate_parameter_target, set_unit, set_unit_rgb,
};
use crate::foundation::core::TextureHandle;
use crate::material::{Material, PropertyId};
use crate::ptex::texture::{ParameterTexture, Registration};

pub const CH_LOCATION: u32 = 0;
pub const CH_WIDTH: u32 = 1;
pub const CH_SOFTNESS: u32 = 2;
pub const CH_RED: u32 = 4;
pub const CH_GREEN: u32 = 5;
pub const CH_BLUE: u32 = 6;

pub const NOISE_TEXTURE_PROPERTY: &str = "_NoiseTex";

/// Dissolve: the graphic burns away from `location`, with a colored edge of `width`.
#[derive(Debug)]
pub struct Dissolve {
    base: EffectBase,
    location: f32,
    width: f32,
    softness: f32,
    color: [f32; 3],
    color_mode: ColorMode,
    noise_texture: Option<TextureHandle>,
}

impl Dissolve {
    pub fn new(ptex: &Rc<ParameterTexture>) -> Self {
        Self {
            base: EffectBase::new(EffectKind::Dissolve, ptex),
            location: 0.5,
            width: 0.5,
            softness: 0.5,
            color: [0.0, 0.25, 1.0],
            color_mode: ColorMode::Add,
            noise_texture: None,
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

    pub fn location(&self) -> f32 {
        self.location
    }

    pub fn set_location(&mut self, value: f32) {
        if set_unit(&mut self.location, value) {
            self.base.write(CH_LOCATION, self.location);
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_width(&mut self, value: f32) {
        if set_unit(&mut self.width, value) {
            self.base.write(CH_WIDTH, self.width);
        }
    }

    pub fn softness(&self) -> f32 {
        self.softness
    }

    pub fn set_softness(&mut self, value: f32) {
        if set_unit(&mut self.softness, value) {
            self.base.write(CH_SOFTNESS, self.softness);
        }
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn set_color(&mut self, rgb: [f32; 3]) {
        if set_unit_rgb(&mut self.color, rgb) {
            self.push_parameters();
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        if self.color_mode != mode {
            self.color_mode = mode;
            self.base.replace_material(self.build_material());
        }
    }

    pub fn noise_texture(&self) -> Option<TextureHandle> {
        self.noise_texture
    }

    pub fn set_noise_texture(&mut self, texture: Option<TextureHandle>) {
        if self.noise_texture != texture {
            self.noise_texture = texture;
            self.base.replace_material(self.build_material());
        }
    }

    pub fn param_row(&self) -> f32 {
        self.base.param_row()
    }

    /// Material variant key: effect tag, color mode and noise texture.
    pub fn effect_hash(&self) -> u64 {
        let noise = self.noise_texture.map_or(0, |t| (t.0 as u32 as u64) << 8);
        EffectKind::Dissolve.hash_tag() + ((self.color_mode as u64) << 4) + noise
    }

    fn build_material(&self) -> Material {
        let mut material = Material::variant(EffectKind::Dissolve.material_name(), self.effect_hash());
        material.enable_keyword(self.color_mode.keyword());
        if let Some(noise) = self.noise_texture {
            material.set_texture(PropertyId::from_name(NOISE_TEXTURE_PROPERTY), noise);
        }
        material
    }

    fn push_parameters(&self) {
        let [r, g, b] = self.color;
        self.base.write_all(&[
            (CH_LOCATION, self.location),
            (CH_WIDTH, self.width),
            (CH_SOFTNESS, self.softness),
            (CH_RED, r),
            (CH_GREEN, g),
            (CH_BLUE, b),
        ]);
    }
}

delegate_parameter_target!(Dissolve);

#[cfg(test)]
#[path = "../../tests/unit/effects/dissolve.rs"]
mod tests;
