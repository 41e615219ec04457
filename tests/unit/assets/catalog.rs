use super::*;

use crate::assets::decode::save_png;

fn temp_root(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("imagehelper-catalog-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b").unwrap(), "a/b");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("").is_err());
}

#[test]
fn loads_by_bare_name_and_memoizes() {
    let root = temp_root("bare");
    let img = RasterBuffer::from_premul_rgba8(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
    save_png(&img, root.join("beach.png")).unwrap();

    let catalog = AssetCatalog::new(&root);
    let first = catalog.image_named("beach").unwrap();
    assert_eq!(first.to_premul_rgba8(), img.to_premul_rgba8());

    std::fs::remove_file(root.join("beach.png")).unwrap();
    let second = catalog.image_named("beach").unwrap();
    assert_eq!(first, second);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn missing_asset_is_an_error() {
    let root = temp_root("missing");
    let catalog = AssetCatalog::new(&root);
    assert!(catalog.image_named("nothing").is_err());
    assert!(catalog.image_named("nothing.png").is_err());
    let _ = std::fs::remove_dir_all(&root);
}
