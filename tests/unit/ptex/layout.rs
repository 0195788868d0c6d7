use super::*;
use kurbo::Point;

fn layout(channels: u32, limit: u32) -> PtexLayout {
    PtexLayout::from_config(&PtexConfig::new(channels, limit, "_ParamTex")).unwrap()
}

#[test]
fn rounds_channels_and_capacity() {
    let l = layout(3, 127);
    assert_eq!(l.channel_count(), 4);
    assert_eq!(l.instance_capacity(), 128);

    let l = layout(8, 128);
    assert_eq!(l.channel_count(), 8);
    assert_eq!(l.instance_capacity(), 128);
    assert_eq!(l.width(), 2);
    assert_eq!(l.height(), 128);
    assert_eq!(l.buffer_len(), 8 * 128);

    let l = layout(5, 1);
    assert_eq!(l.channel_count(), 8);
    assert_eq!(l.instance_capacity(), 2);
}

#[test]
fn rejects_degenerate_configs() {
    assert!(PtexLayout::from_config(&PtexConfig::new(0, 4, "_ParamTex")).is_err());
    assert!(PtexLayout::from_config(&PtexConfig::new(4, 0, "_ParamTex")).is_err());
    assert!(PtexLayout::from_config(&PtexConfig::new(4, 4, "  ")).is_err());
    assert!(PtexLayout::from_config(&PtexConfig::new(u32::MAX, 4, "_ParamTex")).is_err());
}

#[test]
fn rejects_texel_count_beyond_u32() {
    // 2^20 texels wide, 2^13 rows.
    assert!(PtexLayout::from_config(&PtexConfig::new(1 << 22, 1 << 13, "_ParamTex")).is_err());
    assert!(PtexLayout::from_config(&PtexConfig::new(1 << 22, 1 << 11, "_ParamTex")).is_ok());
}

#[test]
fn byte_and_texel_indices_follow_row_major_layout() {
    let l = layout(8, 4);
    assert_eq!(l.byte_index(Slot(1), 0), Some(0));
    assert_eq!(l.byte_index(Slot(2), 5), Some(13));
    assert_eq!(l.texel_index(Slot(1), 3), Some(0));
    assert_eq!(l.texel_index(Slot(1), 4), Some(1));
    assert_eq!(l.texel_index(Slot(3), 6), Some(5));
    assert_eq!(l.cell_of(5), (1, 2));

    assert_eq!(l.byte_index(Slot::NONE, 0), None);
    assert_eq!(l.byte_index(Slot(1), 8), None);
    assert_eq!(l.byte_index(Slot(5), 0), None);
    assert_eq!(l.texel_index(Slot(1), 8), None);
}

#[test]
fn normalized_row_is_increasing_and_bounded() {
    let l = layout(4, 16);
    let mut prev = 0.0f32;
    for s in 1..=16 {
        let v = l.normalized_row(Slot(s));
        assert!((v - (s as f32 - 0.5) / 16.0).abs() < 1e-6);
        assert!(v > 0.0 && v < 1.0);
        assert!(v > prev);
        prev = v;
    }
}

#[test]
fn grid_to_clip_maps_texture_corners() {
    let l = layout(8, 4);
    let m = l.grid_to_clip();
    let top_left = m * Point::new(0.0, 0.0);
    let bottom_right = m * Point::new(2.0, 4.0);
    assert!((top_left.x + 1.0).abs() < 1e-9 && (top_left.y - 1.0).abs() < 1e-9);
    assert!((bottom_right.x - 1.0).abs() < 1e-9 && (bottom_right.y + 1.0).abs() < 1e-9);
}

#[test]
fn config_defaults_fill_missing_fields() {
    let cfg: PtexConfig = serde_json::from_str(r#"{ "channels": 8 }"#).unwrap();
    assert_eq!(cfg.channels, 8);
    assert_eq!(cfg.instance_limit, 128);
    assert_eq!(cfg.property_name, DEFAULT_PROPERTY_NAME);
}
