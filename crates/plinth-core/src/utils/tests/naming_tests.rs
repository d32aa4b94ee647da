use crate::utils::naming::{
    class_basename, join_identifier, namespace_of, normalize_identifier, slugify, snake_case, title_case,
};

#[test]
fn test_normalize_identifier_strips_separators() {
    assert_eq!(normalize_identifier("\\Module\\Banner\\Banner"), "Module\\Banner\\Banner");
    assert_eq!(normalize_identifier("  Extensions\\ "), "Extensions");
}

#[test]
fn test_join_identifier_skips_empty_segments() {
    assert_eq!(
        join_identifier(&["\\Extensions\\", "Module", "", "Banner", "Banner"]),
        "Extensions\\Module\\Banner\\Banner"
    );
}

#[test]
fn test_class_basename_and_namespace() {
    assert_eq!(class_basename("Extensions\\Module\\Banner\\Banner"), "Banner");
    assert_eq!(class_basename("Banner"), "Banner");
    assert_eq!(namespace_of("\\Extensions\\Module\\Slider\\Slider").as_deref(), Some("Extensions\\Module\\Slider"));
    assert_eq!(namespace_of("Slider"), None);
}

#[test]
fn test_case_helpers() {
    assert_eq!(snake_case("BannerSlider"), "banner_slider");
    assert_eq!(snake_case("Module"), "module");
    assert_eq!(snake_case("image gallery"), "image_gallery");
    assert_eq!(slugify("Image Gallery!", '_'), "image_gallery");
    assert_eq!(slugify("  --Hero--Banner", '-'), "hero-banner");
    assert_eq!(title_case("module"), "Module");
    assert_eq!(title_case("page block"), "Page Block");
}
