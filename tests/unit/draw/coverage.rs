use super::*;

#[test]
fn clips_multiply() {
    let a = ClipMask::from_coverage(2, vec![255, 128]);
    let b = ClipMask::from_coverage(2, vec![128, 0]);
    let c = ClipMask::intersect(Some(&a), b);
    assert_eq!(c.at(0, 0), 128);
    assert_eq!(c.at(1, 0), 0);
}

#[test]
fn first_clip_is_taken_as_is() {
    let only = ClipMask::from_coverage(3, vec![0, 64, 255]);
    let c = ClipMask::intersect(None, only.clone());
    assert_eq!(c, only);
    assert_eq!(c.unit_at(2, 0), 1.0);
}
