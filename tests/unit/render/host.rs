use super::*;

#[test]
fn export_defaults_match_delivery_format() {
    let s = ExportSettings::default();
    assert_eq!(s.format, ExportFormat::Jpeg);
    assert_eq!(s.quality, 92);
    assert_eq!(s.pixel_ratio, 2.0);
    s.validate().unwrap();
}

#[test]
fn export_settings_parse_partial_json() {
    let s: ExportSettings = serde_json::from_str(r#"{ "format": "png", "pixel_ratio": 1 }"#).unwrap();
    assert_eq!(s.format, ExportFormat::Png);
    assert_eq!(s.pixel_ratio, 1.0);
    assert_eq!(s.quality, 92);
    assert_eq!(s.format.extension(), "png");
    assert_eq!(ExportFormat::Jpeg.mime(), "image/jpeg");
}

#[test]
fn export_settings_validation() {
    let mut s = ExportSettings::default();
    s.quality = 0;
    assert!(s.validate().is_err());
    let mut s = ExportSettings::default();
    s.pixel_ratio = 0.0;
    assert!(s.validate().is_err());
    s.pixel_ratio = f64::INFINITY;
    assert!(s.validate().is_err());
}
