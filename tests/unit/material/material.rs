use super::*;

#[test]
fn property_ids_are_stable_per_name() {
    assert_eq!(
        PropertyId::from_name("_ParamTex"),
        PropertyId::from_name("_ParamTex")
    );
    assert_ne!(
        PropertyId::from_name("_ParamTex"),
        PropertyId::from_name("_NoiseTex")
    );
}

#[test]
fn keywords_are_deduplicated() {
    let mut m = Material::variant("UIDissolve", 42);
    assert_eq!(m.name(), "UIDissolve_42");
    m.enable_keyword("ADD");
    m.enable_keyword("ADD");
    assert!(m.is_keyword_enabled("ADD"));
    assert_eq!(m.keywords().count(), 1);
}

#[test]
fn texture_binding_overwrites_previous() {
    let mut m = Material::new("m");
    let p = PropertyId::from_name("_ParamTex");
    assert_eq!(m.texture(p), None);
    m.set_texture(p, TextureHandle(1));
    m.set_texture(p, TextureHandle(2));
    assert_eq!(m.texture(p), Some(TextureHandle(2)));
}
