use super::*;

use crate::assets::decode::encode_png;

#[test]
fn file_urls_and_plain_paths_resolve() {
    assert_eq!(FileFetcher::resolve("/tmp/a.png").unwrap(), PathBuf::from("/tmp/a.png"));
    assert_eq!(FileFetcher::resolve("file:///tmp/a.png").unwrap(), PathBuf::from("/tmp/a.png"));
    assert_eq!(
        FileFetcher::resolve("file://localhost/tmp/a.png").unwrap(),
        PathBuf::from("/tmp/a.png")
    );
}

#[test]
fn network_schemes_are_fetch_failures() {
    let err = FileFetcher.fetch("https://example.com/a.png").unwrap_err();
    assert!(matches!(err, ImageError::FetchFailure(_)));
}

#[test]
fn missing_file_is_a_fetch_failure() {
    let err = FileFetcher.fetch("/definitely/not/here.png").unwrap_err();
    assert!(matches!(err, ImageError::FetchFailure(_)));
}

#[test]
fn fetch_then_decode_local_png() {
    let img = RasterBuffer::from_premul_rgba8(1, 1, vec![0, 255, 0, 255]).unwrap();
    let path = std::env::temp_dir().join(format!("imagehelper-fetch-{}.png", std::process::id()));
    std::fs::write(&path, encode_png(&img).unwrap()).unwrap();

    let bytes = FileFetcher.fetch(&format!("file://{}", path.display())).unwrap();
    let decoded = DefaultCodec.decode(&bytes).unwrap();
    assert_eq!(decoded.to_premul_rgba8(), vec![0, 255, 0, 255]);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn default_codec_rejects_garbage() {
    let err = DefaultCodec.decode(b"not an image").unwrap_err();
    assert!(matches!(err, ImageError::DecodeFailure(_)));
}
