use super::*;

#[test]
fn defaults_match_effect_layouts() {
    let c = UifxConfig::default();
    assert_eq!(c.dissolve, PtexConfig::new(8, 128, "_ParamTex"));
    assert_eq!(c.tone, PtexConfig::new(4, 1024, "_ParamTex"));
    assert_eq!(c.transition, PtexConfig::new(8, 128, "_ParamTex"));
    c.validate().unwrap();
}

#[test]
fn missing_sections_keep_defaults() {
    let c = UifxConfig::from_json_str(
        r#"{ "tone": { "channels": 8, "instance_limit": 64, "property_name": "_ToneTex" } }"#,
    )
    .unwrap();
    assert_eq!(c.tone, PtexConfig::new(8, 64, "_ToneTex"));
    assert_eq!(c.dissolve, UifxConfig::default().dissolve);
}

#[test]
fn invalid_section_is_a_config_error() {
    let err = UifxConfig::from_json_str(r#"{ "dissolve": { "channels": 0 } }"#).unwrap_err();
    assert!(matches!(err, UifxError::Config(_)));
    assert!(err.to_string().contains("UIDissolve"));

    let err = UifxConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, UifxError::Config(_)));
}

#[test]
fn from_path_reports_missing_file() {
    let err = UifxConfig::from_path("target/does-not-exist/uifx.json").unwrap_err();
    assert!(matches!(err, UifxError::Other(_)));
    assert!(err.to_string().contains("failed to read config"));
}
