//! Scripted replay of registrations and parameter writes over frames.
//!
//! A scenario drives one parameter texture through a [`FrameScheduler`] the way a host would:
//! each frame applies its ops, then runs the pre-render hook.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::core::Slot;
use crate::foundation::error::{UifxError, UifxResult};
use crate::ptex::layout::PtexConfig;
use crate::ptex::store::WriteOutcome;
use crate::ptex::target::ParameterTarget;
use crate::ptex::texture::{ParameterTexture, PtexStats, Registration};
use crate::render::backend::{RenderBackend, TexturePixels};
use crate::schedule::frame::{FrameReport, FrameScheduler};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub texture: PtexConfig,
    pub frames: Vec<ScenarioFrame>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFrame {
    #[serde(default)]
    pub ops: Vec<ScenarioOp>,
}

/// One host action. Instances are named; `register` creates the instance on first use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum ScenarioOp {
    Register {
        instance: String,
    },
    Unregister {
        instance: String,
    },
    SetFloat {
        instance: String,
        channel: u32,
        value: f32,
    },
    SetByte {
        instance: String,
        channel: u32,
        value: u8,
    },
}

impl Scenario {
    pub fn from_json_str(s: &str) -> UifxResult<Self> {
        let scenario: Self = serde_json::from_str(s)
            .map_err(|e| UifxError::validation(format!("invalid scenario json: {e}")))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_path(path: impl AsRef<Path>) -> UifxResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> UifxResult<()> {
        self.texture.validate()?;
        for (i, frame) in self.frames.iter().enumerate() {
            for op in &frame.ops {
                if op.instance().is_empty() {
                    return Err(UifxError::validation(format!(
                        "frame {i}: instance name must be non-empty"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl ScenarioOp {
    pub fn instance(&self) -> &str {
        match self {
            Self::Register { instance }
            | Self::Unregister { instance }
            | Self::SetFloat { instance, .. }
            | Self::SetByte { instance, .. } => instance,
        }
    }
}

struct Instance {
    slot: Slot,
    ptex: Rc<ParameterTexture>,
}

impl ParameterTarget for Instance {
    fn parameter_slot(&self) -> Slot {
        self.slot
    }

    fn set_parameter_slot(&mut self, slot: Slot) {
        self.slot = slot;
    }

    fn ptex(&self) -> &Rc<ParameterTexture> {
        &self.ptex
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OpOutcome {
    Registered(Registration),
    Unregistered(bool),
    Write(WriteOutcome),
}

/// What happened in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameTrace {
    pub outcomes: Vec<OpOutcome>,
    /// Pending texel groups right before the pre-render hook ran.
    pub dirty_before_flush: Vec<u32>,
    pub report: FrameReport,
}

#[derive(Clone, Debug)]
pub struct ScenarioRun {
    pub frames: Vec<FrameTrace>,
    /// Final slot of every instance the scenario named.
    pub slots: BTreeMap<String, u32>,
    pub stats: PtexStats,
    /// CPU-side buffer after the last frame.
    pub buffer: Vec<u8>,
    /// Texture contents after the last frame.
    pub pixels: TexturePixels,
}

pub struct ScenarioRunner {
    scheduler: Rc<FrameScheduler>,
    ptex: Rc<ParameterTexture>,
    instances: BTreeMap<String, Instance>,
}

impl ScenarioRunner {
    pub fn new(scenario: &Scenario) -> UifxResult<Self> {
        let scheduler = Rc::new(FrameScheduler::new());
        let ptex = ParameterTexture::new(&scenario.texture, &scheduler)?;
        Ok(Self {
            scheduler,
            ptex,
            instances: BTreeMap::new(),
        })
    }

    pub fn ptex(&self) -> &Rc<ParameterTexture> {
        &self.ptex
    }

    pub fn apply(&mut self, op: &ScenarioOp) -> UifxResult<OpOutcome> {
        Ok(match op {
            ScenarioOp::Register { instance } => {
                let ptex = &self.ptex;
                let target = self
                    .instances
                    .entry(instance.clone())
                    .or_insert_with(|| Instance {
                        slot: Slot::NONE,
                        ptex: Rc::clone(ptex),
                    });
                OpOutcome::Registered(ptex.register(target))
            }
            ScenarioOp::Unregister { instance } => {
                let target = lookup(&mut self.instances, instance)?;
                OpOutcome::Unregistered(self.ptex.unregister(target))
            }
            ScenarioOp::SetFloat {
                instance,
                channel,
                value,
            } => {
                let target = lookup(&mut self.instances, instance)?;
                OpOutcome::Write(self.ptex.set_float(target, *channel, *value))
            }
            ScenarioOp::SetByte {
                instance,
                channel,
                value,
            } => {
                let target = lookup(&mut self.instances, instance)?;
                OpOutcome::Write(self.ptex.set_byte(target, *channel, *value))
            }
        })
    }

    #[tracing::instrument(skip_all, fields(ops = frame.ops.len()))]
    pub fn run_frame(
        &mut self,
        frame: &ScenarioFrame,
        backend: &mut dyn RenderBackend,
    ) -> UifxResult<FrameTrace> {
        let mut outcomes = Vec::with_capacity(frame.ops.len());
        for op in &frame.ops {
            outcomes.push(self.apply(op)?);
        }
        let dirty_before_flush = self.ptex.dirty_cells();
        let report = self.scheduler.will_render(backend)?;
        Ok(FrameTrace {
            outcomes,
            dirty_before_flush,
            report,
        })
    }

    /// Run every frame, then read the texture back.
    pub fn run(
        mut self,
        scenario: &Scenario,
        backend: &mut dyn RenderBackend,
    ) -> UifxResult<ScenarioRun> {
        let mut frames = Vec::with_capacity(scenario.frames.len());
        for frame in &scenario.frames {
            frames.push(self.run_frame(frame, backend)?);
        }

        let handle = self.ptex.ensure_texture();
        backend.ensure_target(handle, &self.ptex.target_desc())?;
        let pixels = backend.readback_rgba8(handle)?;

        Ok(ScenarioRun {
            frames,
            slots: self
                .instances
                .iter()
                .map(|(name, inst)| (name.clone(), inst.slot.0))
                .collect(),
            stats: self.ptex.stats(),
            buffer: self.ptex.buffer_snapshot(),
            pixels,
        })
    }
}

fn lookup<'a>(
    instances: &'a mut BTreeMap<String, Instance>,
    name: &str,
) -> UifxResult<&'a mut Instance> {
    instances
        .get_mut(name)
        .ok_or_else(|| UifxError::validation(format!("unknown instance '{name}'")))
}

/// Convenience wrapper: build a runner and run `scenario` on `backend`.
pub fn run_scenario(scenario: &Scenario, backend: &mut dyn RenderBackend) -> UifxResult<ScenarioRun> {
    ScenarioRunner::new(scenario)?.run(scenario, backend)
}

#[cfg(test)]
#[path = "../tests/unit/scenario.rs"]
mod tests;
