use super::*;
use crate::ptex::layout::PtexConfig;

fn store(channels: u32, limit: u32) -> ParameterStore {
    ParameterStore::new(PtexLayout::from_config(&PtexConfig::new(channels, limit, "_ParamTex")).unwrap())
}

#[test]
fn write_marks_containing_texel_group_dirty() {
    let mut s = store(8, 4);
    assert_eq!(s.set_byte(Slot(2), 5, 9), WriteOutcome::Written);
    assert_eq!(s.byte(Slot(2), 5), Some(9));
    assert_eq!(s.buffer()[13], 9);
    assert_eq!(s.dirty_cells().collect::<Vec<_>>(), vec![3]);
}

#[test]
fn identical_write_is_not_dirty() {
    let mut s = store(4, 2);
    assert_eq!(s.set_byte(Slot(1), 0, 0), WriteOutcome::Unchanged);
    assert_eq!(s.dirty_len(), 0);

    assert!(s.set_byte(Slot(1), 0, 7).is_written());
    s.clear_dirty();
    assert_eq!(s.set_byte(Slot(1), 0, 7), WriteOutcome::Unchanged);
    assert_eq!(s.dirty_len(), 0);
}

#[test]
fn unregistered_and_out_of_range_writes_are_ignored() {
    let mut s = store(4, 2);
    assert_eq!(s.set_byte(Slot::NONE, 0, 1), WriteOutcome::Unregistered);
    assert_eq!(s.set_byte(Slot(1), 4, 1), WriteOutcome::ChannelOutOfRange);
    assert_eq!(s.set_byte(Slot(3), 0, 1), WriteOutcome::ChannelOutOfRange);
    assert!(s.buffer().iter().all(|&b| b == 0));
    assert_eq!(s.dirty_len(), 0);
}

#[test]
fn writes_to_one_group_coalesce() {
    let mut s = store(8, 2);
    for c in 0..4 {
        s.set_float(Slot(1), c, 0.25 * (c + 1) as f32);
    }
    assert_eq!(s.dirty_len(), 1);
    assert_eq!(s.texel(0), Some([64, 128, 191, 255]));
}

#[test]
fn set_float_round_trips_within_one_step() {
    let mut s = store(4, 2);
    for i in 0..=100 {
        let f = i as f32 / 100.0;
        s.set_float(Slot(1), 0, f);
        let back = s.byte(Slot(1), 0).unwrap() as f32 / 255.0;
        assert!((back - f).abs() <= 1.0 / 255.0);
    }
}

#[test]
fn dirty_texels_are_ordered() {
    let mut s = store(8, 4);
    s.set_byte(Slot(3), 4, 1);
    s.set_byte(Slot(1), 0, 2);
    s.set_byte(Slot(2), 7, 3);
    let got: Vec<_> = s.dirty_texels().collect();
    assert_eq!(
        got,
        vec![(0, [2, 0, 0, 0]), (3, [0, 0, 0, 3]), (5, [1, 0, 0, 0])]
    );
    assert_eq!(s.clear_dirty(), 3);
    assert_eq!(s.dirty_len(), 0);
}
