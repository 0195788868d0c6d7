#![forbid(unsafe_code)]
//! `uifx` keeps the per-instance parameters of UI effects in one shared texture per effect type.
//!
//! Instances register with a [`ParameterTexture`] and receive a row (slot). Parameter writes land
//! in a CPU buffer and mark texel groups dirty. Once per frame, the [`FrameScheduler`] flushes every
//! texture: dirty groups become a small triangle mesh drawn into the texture with one draw call.
//!
//! Backends:
//! - [`CpuBackend`]: reference rasterizer, always available.
//! - `WgpuBackend`: feature `gpu`.

pub mod config;
pub mod effects;
pub mod foundation;
pub mod material;
pub mod ptex;
pub mod render;
pub mod scenario;
pub mod schedule;

pub use config::UifxConfig;
pub use effects::{
    BlurMode, ColorMode, Dissolve, EffectKind, EffectTextures, Tone, ToneMode, Transition,
    TransitionMode,
};
pub use foundation::core::{PtexId, Slot, TextureHandle};
pub use foundation::error::{UifxError, UifxResult};
pub use material::{Material, PropertyId};
pub use ptex::{
    ParameterStore, ParameterTarget, ParameterTexture, PtexConfig, PtexLayout, PtexStats,
    Registration, SlotAllocator, WriteOutcome,
};
pub use render::backend::{
    BackendKind, BackendStats, DrawCommand, RenderBackend, TargetDesc, TexturePixels,
    create_backend,
};
pub use render::cpu::CpuBackend;
#[cfg(feature = "gpu")]
pub use render::gpu::WgpuBackend;
pub use render::mesh::{CellMesh, CellVertex};
pub use scenario::{Scenario, ScenarioOp, ScenarioRun, run_scenario};
pub use schedule::frame::{FlushOutcome, FrameFlush, FrameReport, FrameScheduler};
