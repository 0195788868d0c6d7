use super::*;
use crate::ptex::layout::{PtexConfig, PtexLayout};
use crate::render::mesh::CellMesh;

fn layout(channels: u32, limit: u32) -> PtexLayout {
    PtexLayout::from_config(&PtexConfig::new(channels, limit, "_ParamTex")).unwrap()
}

#[test]
fn each_cell_triangle_writes_exactly_one_texel() {
    let l = layout(12, 6);
    let handle = TextureHandle(1);
    let mut be = CpuBackend::new();
    be.ensure_target(handle, &TargetDesc::for_layout(l)).unwrap();

    let mut mesh = CellMesh::new();
    mesh.rebuild(l, [(4, [10, 20, 30, 40])]);
    be.draw_cells(&DrawCommand {
        target: handle,
        mesh: &mesh,
        transform: l.grid_to_clip(),
    })
    .unwrap();

    let px = be.readback_rgba8(handle).unwrap();
    assert_eq!((px.width, px.height), (3, 6));
    for y in 0..6 {
        for x in 0..3 {
            let expected = if (x, y) == (1, 1) { [10, 20, 30, 40] } else { [0; 4] };
            assert_eq!(px.texel(x, y), Some(expected), "texel ({x},{y})");
        }
    }
}

#[test]
fn full_grid_of_cells_covers_every_texel_once() {
    let l = layout(8, 4);
    let handle = TextureHandle(7);
    let mut be = CpuBackend::new();
    be.ensure_target(handle, &TargetDesc::for_layout(l)).unwrap();

    let mut mesh = CellMesh::new();
    mesh.rebuild(l, (0..l.width() * l.height()).map(|i| (i, [i as u8, 0, 0, 255])));
    be.draw_cells(&DrawCommand {
        target: handle,
        mesh: &mesh,
        transform: l.grid_to_clip(),
    })
    .unwrap();

    let px = be.readback_rgba8(handle).unwrap();
    for i in 0..l.width() * l.height() {
        let (x, y) = l.cell_of(i);
        assert_eq!(px.texel(x, y), Some([i as u8, 0, 0, 255]));
    }
    assert_eq!(be.stats().draws, 1);
    assert_eq!(be.stats().triangles, 8);
}

#[test]
fn ensure_target_is_idempotent_and_draw_requires_target() {
    let mut be = CpuBackend::new();
    let desc = TargetDesc {
        width: 2,
        height: 2,
    };
    be.ensure_target(TextureHandle(1), &desc).unwrap();
    be.ensure_target(TextureHandle(1), &desc).unwrap();
    assert_eq!(be.stats().targets_created, 1);
    assert!(be.has_target(TextureHandle(1)));

    let mesh = CellMesh::new();
    let err = be
        .draw_cells(&DrawCommand {
            target: TextureHandle(2),
            mesh: &mesh,
            transform: Affine::IDENTITY,
        })
        .unwrap_err();
    assert!(err.to_string().contains("not initialized"));
    assert!(be.readback_rgba8(TextureHandle(2)).is_err());
}
