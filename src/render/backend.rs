use kurbo::Affine;

use crate::foundation::core::TextureHandle;
use crate::foundation::error::{UifxError, UifxResult};
use crate::ptex::layout::PtexLayout;
use crate::render::mesh::CellMesh;

/// Bytes per texel of every parameter render target (RGBA8).
pub const TARGET_BYTES_PER_TEXEL: u32 = 4;

/// Size of a parameter render target.
///
/// Targets are always RGBA8, point-sampled, clamp-to-edge, single mip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDesc {
    pub width: u32,
    pub height: u32,
}

impl TargetDesc {
    pub fn for_layout(layout: PtexLayout) -> Self {
        Self {
            width: layout.width(),
            height: layout.height(),
        }
    }

    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(TARGET_BYTES_PER_TEXEL as usize)
    }
}

/// One recorded draw: the cell mesh rendered into `target` through `transform`.
///
/// `transform` maps mesh positions (texel-grid space) into clip space.
#[derive(Clone, Copy, Debug)]
pub struct DrawCommand<'a> {
    pub target: TextureHandle,
    pub mesh: &'a CellMesh,
    pub transform: Affine,
}

/// Render target contents read back to the CPU.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TexturePixels {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, row 0 first.
    pub data: Vec<u8>,
}

impl TexturePixels {
    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.data.get(start..start + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Counters every backend maintains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub targets_created: u64,
    pub draws: u64,
    pub triangles: u64,
}

/// GPU-side half of the parameter texture pipeline.
pub trait RenderBackend {
    /// Create the target for `handle` unless one of the same size already exists.
    fn ensure_target(&mut self, handle: TextureHandle, desc: &TargetDesc) -> UifxResult<()>;

    /// Upload the command's mesh and draw it into its target. Must not blend.
    fn draw_cells(&mut self, cmd: &DrawCommand<'_>) -> UifxResult<()>;

    /// Read the target's texels back to the CPU.
    fn readback_rgba8(&mut self, handle: TextureHandle) -> UifxResult<TexturePixels>;

    fn stats(&self) -> BackendStats;
}

/// Available backend kinds.
///
/// - `Cpu` is always available.
/// - `Gpu` requires the `gpu` feature and a usable adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Cpu,
    #[cfg(feature = "gpu")]
    Gpu,
}

pub fn create_backend(kind: BackendKind) -> UifxResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new())),
        #[cfg(feature = "gpu")]
        BackendKind::Gpu => Ok(Box::new(crate::render::gpu::WgpuBackend::new()?)),
        #[allow(unreachable_patterns)]
        _ => Err(UifxError::render("requested backend is not available")),
    }
}
