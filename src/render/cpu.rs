use std::collections::HashMap;

use kurbo::{Affine, Point};

use crate::foundation::core::TextureHandle;
use crate::foundation::error::{UifxError, UifxResult};
use crate::render::backend::{BackendStats, DrawCommand, RenderBackend, TargetDesc, TexturePixels};

struct CpuTarget {
    desc: TargetDesc,
    data: Vec<u8>,
}

/// Reference rasterizer for parameter targets.
///
/// Coverage is sampled at texel centres and colors are written without blending, which is what
/// the GPU pipeline does with blending disabled.
#[derive(Default)]
pub struct CpuBackend {
    targets: HashMap<TextureHandle, CpuTarget>,
    stats: BackendStats,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_target(&self, handle: TextureHandle) -> bool {
        self.targets.contains_key(&handle)
    }
}

impl RenderBackend for CpuBackend {
    fn ensure_target(&mut self, handle: TextureHandle, desc: &TargetDesc) -> UifxResult<()> {
        if self.targets.get(&handle).is_some_and(|t| t.desc == *desc) {
            return Ok(());
        }
        if desc.width == 0 || desc.height == 0 {
            return Err(UifxError::render("render target must be at least 1x1"));
        }
        tracing::debug!(
            target_id = handle.0,
            width = desc.width,
            height = desc.height,
            "create cpu parameter target"
        );
        self.targets.insert(
            handle,
            CpuTarget {
                desc: *desc,
                data: vec![0; desc.byte_len()],
            },
        );
        self.stats.targets_created = self.stats.targets_created.saturating_add(1);
        Ok(())
    }

    fn draw_cells(&mut self, cmd: &DrawCommand<'_>) -> UifxResult<()> {
        let target = self.targets.get_mut(&cmd.target).ok_or_else(|| {
            UifxError::render(format!(
                "draw target {:?} was not initialized",
                cmd.target
            ))
        })?;

        for tri in cmd.mesh.triangles() {
            let pts = tri.map(|v| to_pixel(cmd.transform, v.position, target.desc));
            fill_triangle(target, pts, tri[0].color);
        }

        self.stats.draws = self.stats.draws.saturating_add(1);
        self.stats.triangles = self
            .stats
            .triangles
            .saturating_add(cmd.mesh.triangle_count() as u64);
        Ok(())
    }

    fn readback_rgba8(&mut self, handle: TextureHandle) -> UifxResult<TexturePixels> {
        let target = self.targets.get(&handle).ok_or_else(|| {
            UifxError::render(format!("readback target {handle:?} was not initialized"))
        })?;
        Ok(TexturePixels {
            width: target.desc.width,
            height: target.desc.height,
            data: target.data.clone(),
        })
    }

    fn stats(&self) -> BackendStats {
        self.stats
    }
}

// Clip space has y up; pixel rows grow downward.
fn to_pixel(transform: Affine, position: [f32; 2], desc: TargetDesc) -> Point {
    let clip = transform * Point::new(position[0] as f64, position[1] as f64);
    Point::new(
        (clip.x + 1.0) * 0.5 * desc.width as f64,
        (1.0 - clip.y) * 0.5 * desc.height as f64,
    )
}

fn edge(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn fill_triangle(target: &mut CpuTarget, [a, b, c]: [Point; 3], color: [u8; 4]) {
    let area = edge(a, b, c);
    if area.abs() < 1e-12 {
        return;
    }
    let sign = area.signum();

    let w = target.desc.width as f64;
    let h = target.desc.height as f64;
    let x0 = a.x.min(b.x).min(c.x).floor().clamp(0.0, w) as u32;
    let x1 = a.x.max(b.x).max(c.x).ceil().clamp(0.0, w) as u32;
    let y0 = a.y.min(b.y).min(c.y).floor().clamp(0.0, h) as u32;
    let y1 = a.y.max(b.y).max(c.y).ceil().clamp(0.0, h) as u32;

    let stride = target.desc.width as usize * 4;
    for py in y0..y1 {
        for px in x0..x1 {
            let p = Point::new(px as f64 + 0.5, py as f64 + 0.5);
            let inside = edge(b, c, p) * sign >= 0.0
                && edge(c, a, p) * sign >= 0.0
                && edge(a, b, p) * sign >= 0.0;
            if inside {
                let at = py as usize * stride + px as usize * 4;
                target.data[at..at + 4].copy_from_slice(&color);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
