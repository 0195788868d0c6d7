use std::rc::Rc;

use crate::effects::EffectKind;
use crate::effects::base::{ColorMode, EffectBase, delegate_parameter_target, set_unit};
use crate::material::Material;
use crate::ptex::texture::{ParameterTexture, Registration};

pub const CH_TONE_LEVEL: u32 = 0;
pub const CH_COLOR_FACTOR: u32 = 1;
pub const CH_BLUR: u32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToneMode {
    #[default]
    None = 0,
    Grayscale = 1,
    Sepia = 2,
    Nega = 3,
    Pixel = 4,
    Mono = 5,
    Cutoff = 6,
    Hue = 7,
}

impl ToneMode {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Grayscale => "GRAYSCALE",
            Self::Sepia => "SEPIA",
            Self::Nega => "NEGA",
            Self::Pixel => "PIXEL",
            Self::Mono => "MONO",
            Self::Cutoff => "CUTOFF",
            Self::Hue => "HUE",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlurMode {
    #[default]
    None = 0,
    Fast = 1,
    Medium = 2,
    Detail = 3,
}

impl BlurMode {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Fast => "FASTBLUR",
            Self::Medium => "MEDIUMBLUR",
            Self::Detail => "DETAILBLUR",
        }
    }
}

/// Keyword enabled for the advanced blur variant.
pub const ADVANCED_BLUR_KEYWORD: &str = "EX";

/// Tone, color and blur filter.
#[derive(Debug)]
pub struct Tone {
    base: EffectBase,
    tone_level: f32,
    color_factor: f32,
    blur: f32,
    tone_mode: ToneMode,
    color_mode: ColorMode,
    blur_mode: BlurMode,
    advanced_blur: bool,
}

impl Tone {
    pub fn new(ptex: &Rc<ParameterTexture>) -> Self {
        Self {
            base: EffectBase::new(EffectKind::Tone, ptex),
            tone_level: 1.0,
            color_factor: 1.0,
            blur: 1.0,
            tone_mode: ToneMode::None,
            color_mode: ColorMode::Multiply,
            blur_mode: BlurMode::None,
            advanced_blur: false,
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

    pub fn tone_level(&self) -> f32 {
        self.tone_level
    }

    pub fn set_tone_level(&mut self, value: f32) {
        if set_unit(&mut self.tone_level, value) {
            self.base.write(CH_TONE_LEVEL, self.tone_level);
        }
    }

    pub fn color_factor(&self) -> f32 {
        self.color_factor
    }

    pub fn set_color_factor(&mut self, value: f32) {
        if set_unit(&mut self.color_factor, value) {
            self.base.write(CH_COLOR_FACTOR, self.color_factor);
        }
    }

    pub fn blur(&self) -> f32 {
        self.blur
    }

    pub fn set_blur(&mut self, value: f32) {
        if set_unit(&mut self.blur, value) {
            self.base.write(CH_BLUR, self.blur);
        }
    }

    pub fn tone_mode(&self) -> ToneMode {
        self.tone_mode
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn blur_mode(&self) -> BlurMode {
        self.blur_mode
    }

    pub fn advanced_blur(&self) -> bool {
        self.advanced_blur
    }

    /// Change the shader variant. The material is rebuilt only when something differs.
    pub fn set_modes(
        &mut self,
        tone: ToneMode,
        color: ColorMode,
        blur: BlurMode,
        advanced_blur: bool,
    ) {
        let current = (self.tone_mode, self.color_mode, self.blur_mode, self.advanced_blur);
        if current == (tone, color, blur, advanced_blur) {
            return;
        }
        self.tone_mode = tone;
        self.color_mode = color;
        self.blur_mode = blur;
        self.advanced_blur = advanced_blur;
        self.base.replace_material(self.build_material());
    }

    pub fn param_row(&self) -> f32 {
        self.base.param_row()
    }

    pub fn effect_hash(&self) -> u64 {
        let advanced = u64::from(self.blur_mode != BlurMode::None && self.advanced_blur);
        EffectKind::Tone.hash_tag()
            + ((self.tone_mode as u64) << 4)
            + ((self.color_mode as u64) << 8)
            + ((self.blur_mode as u64) << 12)
            + (advanced << 16)
    }

    fn build_material(&self) -> Material {
        let mut material = Material::variant(EffectKind::Tone.material_name(), self.effect_hash());
        material.enable_keyword(self.tone_mode.keyword());
        material.enable_keyword(self.color_mode.keyword());
        material.enable_keyword(self.blur_mode.keyword());
        if self.advanced_blur {
            material.enable_keyword(ADVANCED_BLUR_KEYWORD);
        }
        material
    }

    fn push_parameters(&self) {
        self.base.write_all(&[
            (CH_TONE_LEVEL, self.tone_level),
            (CH_COLOR_FACTOR, self.color_factor),
            (CH_BLUR, self.blur),
        ]);
    }
}

delegate_parameter_target!(Tone);

#[cfg(test)]
#[path = "../../tests/unit/effects/tone.rs"]
mod tests;
