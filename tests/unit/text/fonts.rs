use super::*;

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "formatizer_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn empty_library_measures_with_fixed_advance() {
    let mut lib = FontLibrary::new();
    assert_eq!(lib.face_count(), 0);
    assert!(lib.families().is_empty());
    let w = lib.line_width("abcd", &FontSpec::new("Inter", 400, 10.0));
    assert!((w - 4.0 * 10.0 * UNREGISTERED_ADVANCE_EM).abs() < 1e-4);
}

#[test]
fn empty_library_cannot_shape() {
    let mut lib = FontLibrary::new();
    let err = lib
        .shape_line("hello", &FontSpec::new("Inter", 400, 20.0))
        .unwrap_err();
    assert!(err.to_string().contains("no fonts registered"));
}

#[test]
fn shape_line_rejects_bad_size() {
    let mut lib = FontLibrary::new();
    assert!(
        lib.shape_line("x", &FontSpec::new("Inter", 400, f32::NAN))
            .is_err()
    );
}

#[test]
fn garbage_bytes_register_nothing() {
    let mut lib = FontLibrary::new();
    assert!(lib.register_bytes(b"definitely not a font".to_vec()).is_err());
    assert_eq!(lib.face_count(), 0);
}

#[test]
fn load_dir_skips_non_font_files() {
    let dir = temp_dir("fonts_dir");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("readme.txt"), b"hi").unwrap();

    let mut lib = FontLibrary::new();
    assert_eq!(lib.load_dir(&dir).unwrap(), 0);
    assert!(lib.load_dir(&dir.join("missing")).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
