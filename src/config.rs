use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::effects::EffectKind;
use crate::foundation::error::{UifxError, UifxResult};
use crate::ptex::layout::PtexConfig;

/// Texture layout of every effect type.
///
/// Missing sections fall back to the built-in layout of that effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UifxConfig {
    pub dissolve: PtexConfig,
    pub tone: PtexConfig,
    pub transition: PtexConfig,
}

impl Default for UifxConfig {
    fn default() -> Self {
        Self {
            dissolve: EffectKind::Dissolve.default_config(),
            tone: EffectKind::Tone.default_config(),
            transition: EffectKind::Transition.default_config(),
        }
    }
}

impl UifxConfig {
    pub fn from_json_str(s: &str) -> UifxResult<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| UifxError::config(format!("invalid config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> UifxResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn get(&self, kind: EffectKind) -> &PtexConfig {
        match kind {
            EffectKind::Dissolve => &self.dissolve,
            EffectKind::Tone => &self.tone,
            EffectKind::Transition => &self.transition,
        }
    }

    pub fn validate(&self) -> UifxResult<()> {
        for kind in EffectKind::ALL {
            self.get(kind).validate().map_err(|e| {
                UifxError::config(format!("{} texture: {e}", kind.material_name()))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
