use crate::ptex::layout::PtexLayout;

/// Horizontal shift, in texels, applied to every cell triangle.
///
/// A cell triangle covers the lower-left half of its texel. Without the shift the texel centre
/// sits exactly on the hypotenuse; a quarter texel moves it strictly inside.
pub const CELL_X_BIAS: f32 = 0.25;

/// One vertex of a flat-colored cell triangle, in texel-grid space (x right, y down).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "gpu", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct CellVertex {
    pub position: [f32; 2],
    pub color: [u8; 4],
}

/// Dynamic mesh holding one triangle per dirty texel group.
///
/// Reused across flushes; [`CellMesh::rebuild`] clears it before emitting.
#[derive(Debug, Clone, Default)]
pub struct CellMesh {
    vertices: Vec<CellVertex>,
    indices: Vec<u32>,
    rebuilds: u64,
}

impl CellMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Emit the triangle for texel `(x, y)` carrying `color`.
    pub fn push_cell(&mut self, x: u32, y: u32, color: [u8; 4]) {
        let x0 = x as f32 + CELL_X_BIAS;
        let x1 = x0 + 1.0;
        let y0 = y as f32;
        let y1 = y0 + 1.0;
        for position in [[x0, y0], [x0, y1], [x1, y1]] {
            let next = self.vertices.len() as u32;
            self.vertices.push(CellVertex { position, color });
            self.indices.push(next);
        }
    }

    /// Replace the mesh contents with one triangle per `(texel_index, bytes)` cell.
    pub fn rebuild(
        &mut self,
        layout: PtexLayout,
        cells: impl IntoIterator<Item = (u32, [u8; 4])>,
    ) -> usize {
        self.clear();
        for (index, color) in cells {
            let (x, y) = layout.cell_of(index);
            self.push_cell(x, y, color);
        }
        self.rebuilds = self.rebuilds.saturating_add(1);
        self.triangle_count()
    }

    pub fn vertices(&self) -> &[CellVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of times [`Self::rebuild`] ran.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Iterate triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [CellVertex; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.vertices.get(tri[0] as usize)?,
                *self.vertices.get(tri[1] as usize)?,
                *self.vertices.get(tri[2] as usize)?,
            ])
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/mesh.rs"]
mod tests;
