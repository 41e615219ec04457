use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ImageError::invalid_image("x")
            .to_string()
            .contains("invalid image:")
    );
    assert!(
        ImageError::invalid_bounds("x")
            .to_string()
            .contains("invalid bounds:")
    );
    assert!(
        ImageError::decode("x")
            .to_string()
            .contains("decode failure:")
    );
    assert!(
        ImageError::fetch("x")
            .to_string()
            .contains("fetch failure:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ImageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
