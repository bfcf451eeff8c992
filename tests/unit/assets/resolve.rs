use super::*;

fn temp_dir(name: &str) -> PathBuf {
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
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("a/./b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("./").is_err());
    assert!(normalize_rel_path("").is_err());
}

#[test]
fn fs_resolver_reads_relative_and_file_urls() {
    let dir = temp_dir("fs_resolver");
    std::fs::create_dir_all(dir.join("img")).unwrap();
    std::fs::write(dir.join("img/bg.bin"), [1u8, 2, 3]).unwrap();

    let mut r = FsImageResolver::new(&dir);
    assert_eq!(r.resolve("img/bg.bin").unwrap(), vec![1, 2, 3]);

    let abs = format!("file://{}", dir.join("img/bg.bin").display());
    assert_eq!(r.resolve(&abs).unwrap(), vec![1, 2, 3]);

    assert!(r.resolve("img/missing.bin").is_err());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn fs_resolver_refuses_network_urls() {
    let mut r = FsImageResolver::new(".");
    let err = r.resolve("https://example.com/a.png").unwrap_err();
    assert!(err.to_string().contains("network url"));
}

#[test]
fn data_urls_decode_base64_and_plain() {
    let mut r = MemoryImageResolver::new();
    assert_eq!(
        r.resolve("data:application/octet-stream;base64,AQID").unwrap(),
        vec![1, 2, 3]
    );
    assert_eq!(
        r.resolve("data:text/plain,abc").unwrap(),
        b"abc".to_vec()
    );
    assert!(r.resolve("data:image/png;base64").is_err());
    assert!(r.resolve("data:image/png;base64,@@@").is_err());
}

#[test]
fn memory_resolver_looks_up_registered_urls() {
    let mut r = MemoryImageResolver::new().with("logo", vec![9]);
    assert_eq!(r.len(), 1);
    assert_eq!(r.resolve("logo").unwrap(), vec![9]);
    assert!(r.resolve("other").is_err());
}
