//! UI effects that keep their per-instance parameters in a shared [`ParameterTexture`].
//!
//! Each effect type owns one texture. [`EffectTextures`] builds all three from a [`UifxConfig`]
//! and shares one [`FrameScheduler`] between them.

pub mod base;
pub mod dissolve;
pub mod tone;
pub mod transition;

use std::rc::Rc;

use crate::config::UifxConfig;
use crate::foundation::error::UifxResult;
use crate::ptex::layout::PtexConfig;
use crate::ptex::texture::ParameterTexture;
use crate::render::backend::RenderBackend;
use crate::schedule::frame::{FrameReport, FrameScheduler};

pub use base::{ColorMode, EffectBase};
pub use dissolve::Dissolve;
pub use tone::{BlurMode, Tone, ToneMode};
pub use transition::{Transition, TransitionMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Dissolve,
    Tone,
    Transition,
}

impl EffectKind {
    pub const ALL: [EffectKind; 3] = [Self::Dissolve, Self::Tone, Self::Transition];

    /// Name of the base material variants are derived from.
    pub fn material_name(self) -> &'static str {
        match self {
            Self::Dissolve => "UIDissolve",
            Self::Tone => "UIEffect",
            Self::Transition => "UITransitionEffect",
        }
    }

    /// Low bits of every material hash of this kind.
    pub fn hash_tag(self) -> u64 {
        match self {
            Self::Dissolve => 2,
            Self::Tone => 1,
            Self::Transition => 4,
        }
    }

    pub fn default_config(self) -> PtexConfig {
        match self {
            Self::Dissolve | Self::Transition => PtexConfig::new(8, 128, "_ParamTex"),
            Self::Tone => PtexConfig::new(4, 1024, "_ParamTex"),
        }
    }
}

/// Float equality with a relative tolerance, used to suppress redundant parameter writes.
pub fn approximately(a: f32, b: f32) -> bool {
    (b - a).abs() < (1e-6 * a.abs().max(b.abs())).max(f32::EPSILON * 8.0)
}

/// The three per-type parameter textures and their shared scheduler.
pub struct EffectTextures {
    scheduler: Rc<FrameScheduler>,
    dissolve: Rc<ParameterTexture>,
    tone: Rc<ParameterTexture>,
    transition: Rc<ParameterTexture>,
}

impl EffectTextures {
    pub fn new(config: &UifxConfig, scheduler: Rc<FrameScheduler>) -> UifxResult<Self> {
        config.validate()?;
        Ok(Self {
            dissolve: ParameterTexture::new(&config.dissolve, &scheduler)?,
            tone: ParameterTexture::new(&config.tone, &scheduler)?,
            transition: ParameterTexture::new(&config.transition, &scheduler)?,
            scheduler,
        })
    }

    pub fn with_defaults(scheduler: Rc<FrameScheduler>) -> UifxResult<Self> {
        Self::new(&UifxConfig::default(), scheduler)
    }

    pub fn get(&self, kind: EffectKind) -> &Rc<ParameterTexture> {
        match kind {
            EffectKind::Dissolve => &self.dissolve,
            EffectKind::Tone => &self.tone,
            EffectKind::Transition => &self.transition,
        }
    }

    pub fn scheduler(&self) -> &Rc<FrameScheduler> {
        &self.scheduler
    }

    pub fn will_render(&self, backend: &mut dyn RenderBackend) -> UifxResult<FrameReport> {
        self.scheduler.will_render(backend)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/textures.rs"]
mod tests;
