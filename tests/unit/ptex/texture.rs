use std::cell::Cell;

use super::*;
use crate::render::cpu::CpuBackend;

struct Widget {
    slot: Slot,
    ptex: Rc<ParameterTexture>,
    material: Option<Material>,
}

impl Widget {
    fn new(ptex: &Rc<ParameterTexture>) -> Self {
        Self {
            slot: Slot::NONE,
            ptex: Rc::clone(ptex),
            material: None,
        }
    }
}

impl ParameterTarget for Widget {
    fn parameter_slot(&self) -> Slot {
        self.slot
    }

    fn set_parameter_slot(&mut self, slot: Slot) {
        self.slot = slot;
    }

    fn ptex(&self) -> &Rc<ParameterTexture> {
        &self.ptex
    }

    fn ptex_material(&mut self) -> Option<&mut Material> {
        self.material.as_mut()
    }
}

fn ptex(channels: u32, limit: u32) -> (Rc<FrameScheduler>, Rc<ParameterTexture>) {
    let scheduler = Rc::new(FrameScheduler::new());
    let ptex = ParameterTexture::new(&PtexConfig::new(channels, limit, "_ParamTex"), &scheduler)
        .unwrap();
    (scheduler, ptex)
}

#[test]
fn invalid_config_is_rejected() {
    let scheduler = Rc::new(FrameScheduler::new());
    assert!(ParameterTexture::new(&PtexConfig::new(0, 4, "_ParamTex"), &scheduler).is_err());
    assert!(ParameterTexture::new(&PtexConfig::new(4, 0, "_ParamTex"), &scheduler).is_err());
    assert!(ParameterTexture::new(&PtexConfig::new(4, 4, ""), &scheduler).is_err());
}

#[test]
fn register_assigns_and_reuses_slots() {
    let (_s, p) = ptex(4, 2);
    let mut a = Widget::new(&p);
    let mut b = Widget::new(&p);

    assert_eq!(p.register(&mut a), Registration::Assigned(Slot(1)));
    assert_eq!(p.register(&mut a), Registration::AlreadyRegistered(Slot(1)));
    assert_eq!(p.register(&mut b), Registration::Assigned(Slot(2)));
    assert_eq!(p.free_slots(), 0);

    assert!(p.unregister(&mut a));
    assert_eq!(a.slot, Slot::NONE);
    assert!(!p.unregister(&mut a));
    assert_eq!(p.register(&mut a), Registration::Assigned(Slot(1)));

    let stats = p.stats();
    assert_eq!(stats.registrations, 3);
    assert_eq!(stats.releases, 1);
}

#[test]
fn exhaustion_leaves_target_unregistered() {
    let (_s, p) = ptex(4, 2);
    let mut widgets: Vec<Widget> = (0..3).map(|_| Widget::new(&p)).collect();
    let outcomes: Vec<Registration> = widgets.iter_mut().map(|t| p.register(t)).collect();

    assert_eq!(outcomes[2], Registration::Exhausted);
    assert_eq!(outcomes[2].slot(), Slot::NONE);
    assert_eq!(widgets[2].slot, Slot::NONE);
    assert_eq!(p.stats().exhausted_registrations, 1);
    assert_eq!(
        p.set_float(&widgets[2], 0, 1.0),
        WriteOutcome::Unregistered
    );
    assert!(p.dirty_cells().is_empty());
}

#[test]
fn normalized_coordinate_tracks_slot() {
    let (_s, p) = ptex(4, 4);
    let mut a = Widget::new(&p);
    p.register(&mut a);
    assert!((p.normalized_slot_coordinate(&a) - 0.125).abs() < 1e-6);

    p.set_float(&a, 1, 0.3);
    let v = p.value(Slot(1), 1).unwrap();
    assert!((v - 0.3).abs() <= 1.0 / 255.0);
}

#[test]
fn registration_schedules_flush_once() {
    let (s, p) = ptex(4, 4);
    assert!(!s.is_scheduled(p.id()));

    let mut a = Widget::new(&p);
    let mut b = Widget::new(&p);
    p.register(&mut a);
    p.register(&mut b);
    assert!(s.is_scheduled(p.id()));
    assert_eq!(s.scheduled_len(), 1);
    assert!(p.texture().is_some());
    assert_eq!(p.texture(), Some(p.ensure_texture()));
}

#[test]
fn registration_while_not_ticking_defers_scheduling() {
    let ticking = Rc::new(Cell::new(false));
    let gate = Rc::clone(&ticking);
    let s = Rc::new(FrameScheduler::with_gate(move || gate.get()));
    let p = ParameterTexture::new(&PtexConfig::new(4, 2, "_ParamTex"), &s).unwrap();

    let mut a = Widget::new(&p);
    assert_eq!(p.register(&mut a), Registration::Assigned(Slot(1)));
    assert!(!s.is_initialized());

    ticking.set(true);
    let mut b = Widget::new(&p);
    p.register(&mut b);
    assert!(s.is_scheduled(p.id()));
}

#[test]
fn registration_binds_target_material() {
    let (_s, p) = ptex(8, 4);
    let mut a = Widget::new(&p);
    a.material = Some(Material::new("UI/Dissolve"));
    p.register(&mut a);

    let material = a.material.as_ref().unwrap();
    assert_eq!(material.texture(p.property_id()), p.texture());
    assert_eq!(p.property_id(), PropertyId::from_name("_ParamTex"));
}

#[test]
fn flush_draws_dirty_cells_once() {
    let (_s, p) = ptex(8, 2);
    let mut a = Widget::new(&p);
    p.register(&mut a);
    p.set_float(&a, 0, 0.5);
    p.set_byte(&a, 1, 7);
    p.set_byte(&a, 6, 200);
    assert_eq!(p.dirty_cells(), vec![0, 1]);

    let mut backend = CpuBackend::new();
    assert_eq!(p.flush(&mut backend).unwrap(), FlushOutcome::Drawn { cells: 2 });
    assert!(p.dirty_cells().is_empty());
    assert_eq!(backend.stats().draws, 1);
    assert_eq!(backend.stats().triangles, 2);

    let pixels = backend.readback_rgba8(p.texture().unwrap()).unwrap();
    assert_eq!(pixels.texel(0, 0), Some([128, 7, 0, 0]));
    assert_eq!(pixels.texel(1, 0), Some([0, 0, 200, 0]));
    assert_eq!(pixels.data, p.buffer_snapshot());
}

#[test]
fn clean_flush_skips_draw() {
    let (_s, p) = ptex(4, 2);
    let mut backend = CpuBackend::new();
    assert_eq!(p.flush(&mut backend).unwrap(), FlushOutcome::Clean);
    assert_eq!(backend.stats().draws, 0);
    assert_eq!(backend.stats().targets_created, 0);
    assert_eq!(p.mesh_rebuilds(), 0);
    assert_eq!(p.stats().clean_flushes, 1);
}

#[test]
fn out_of_range_channel_is_reported() {
    let (_s, p) = ptex(4, 2);
    let mut a = Widget::new(&p);
    p.register(&mut a);
    assert_eq!(p.set_byte(&a, 4, 1), WriteOutcome::ChannelOutOfRange);
    assert_eq!(p.byte(Slot(2), 0), Some(0));
}

#[test]
fn scheduler_prunes_dropped_texture() {
    let (s, p) = ptex(4, 2);
    let mut a = Widget::new(&p);
    p.register(&mut a);
    drop(a);
    drop(p);

    let mut backend = CpuBackend::new();
    let report = s.will_render(&mut backend).unwrap();
    assert_eq!(report.pruned, 1);
    assert_eq!(s.scheduled_len(), 0);
}

#[test]
fn textures_under_different_schedulers_keep_separate_targets() {
    let (s1, a) = ptex(4, 2);
    let (s2, b) = ptex(4, 2);
    assert_eq!(a.id(), b.id());

    let mut ia = Widget::new(&a);
    let mut ib = Widget::new(&b);
    a.register(&mut ia);
    b.register(&mut ib);
    assert_ne!(a.texture(), b.texture());

    a.set_byte(&ia, 0, 11);
    b.set_byte(&ib, 0, 99);

    let mut backend = CpuBackend::new();
    s1.will_render(&mut backend).unwrap();
    s2.will_render(&mut backend).unwrap();

    let pa = backend.readback_rgba8(a.texture().unwrap()).unwrap();
    let pb = backend.readback_rgba8(b.texture().unwrap()).unwrap();
    assert_eq!(pa.texel(0, 0), Some([11, 0, 0, 0]));
    assert_eq!(pb.texel(0, 0), Some([99, 0, 0, 0]));
    assert_eq!(pa.data, a.buffer_snapshot());
    assert_eq!(pb.data, b.buffer_snapshot());
    assert_eq!(backend.stats().targets_created, 2);
}
