use crate::foundation::error::{ImageError, ImageResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Premultiplied RGBA with `f32` components in `[0, 1]`.
pub type PremulF32 = [f32; 4];

/// Compositing operator used when painting into a drawing context.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    SoftLight,
    HardLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    Clear,
    Copy,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Xor,
    PlusDarker,
    PlusLighter,
}

impl BlendMode {
    pub const ALL: [BlendMode; 28] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::SoftLight,
        BlendMode::HardLight,
        BlendMode::Difference,
        BlendMode::Exclusion,
        BlendMode::Hue,
        BlendMode::Saturation,
        BlendMode::Color,
        BlendMode::Luminosity,
        BlendMode::Clear,
        BlendMode::Copy,
        BlendMode::SourceIn,
        BlendMode::SourceOut,
        BlendMode::SourceAtop,
        BlendMode::DestinationOver,
        BlendMode::DestinationIn,
        BlendMode::DestinationOut,
        BlendMode::DestinationAtop,
        BlendMode::Xor,
        BlendMode::PlusDarker,
        BlendMode::PlusLighter,
    ];

    /// Parse the snake_case name used on the command line.
    pub fn from_name(name: &str) -> ImageResult<Self> {
        serde_json::from_value(serde_json::Value::String(name.trim().to_ascii_lowercase()))
            .map_err(|_| ImageError::invalid_image(format!("unknown blend mode '{name}'")))
    }
}

/// Combine a premultiplied source with a premultiplied destination.
pub fn blend(mode: BlendMode, src: PremulF32, dst: PremulF32) -> PremulF32 {
    let (sa, da) = (src[3], dst[3]);
    match mode {
        BlendMode::Normal => porter_duff(src, dst, 1.0, 1.0 - sa),
        BlendMode::Clear => [0.0; 4],
        BlendMode::Copy => src,
        BlendMode::SourceIn => porter_duff(src, dst, da, 0.0),
        BlendMode::SourceOut => porter_duff(src, dst, 1.0 - da, 0.0),
        BlendMode::SourceAtop => porter_duff(src, dst, da, 1.0 - sa),
        BlendMode::DestinationOver => porter_duff(src, dst, 1.0 - da, 1.0),
        BlendMode::DestinationIn => porter_duff(src, dst, 0.0, sa),
        BlendMode::DestinationOut => porter_duff(src, dst, 0.0, 1.0 - sa),
        BlendMode::DestinationAtop => porter_duff(src, dst, 1.0 - da, sa),
        BlendMode::Xor => porter_duff(src, dst, 1.0 - da, 1.0 - sa),
        BlendMode::PlusLighter => {
            let mut out = [0.0; 4];
            for i in 0..4 {
                out[i] = (src[i] + dst[i]).min(1.0);
            }
            out
        }
        BlendMode::PlusDarker => {
            let a = (sa + da).min(1.0);
            let mut out = [0.0; 4];
            for i in 0..3 {
                out[i] = (a - ((sa - src[i]) + (da - dst[i]))).max(0.0);
            }
            out[3] = a;
            out
        }
        BlendMode::Hue | BlendMode::Saturation | BlendMode::Color | BlendMode::Luminosity => {
            non_separable(mode, src, dst)
        }
        _ => separable(mode, src, dst),
    }
}

fn porter_duff(src: PremulF32, dst: PremulF32, fa: f32, fb: f32) -> PremulF32 {
    let mut out = [0.0; 4];
    for i in 0..4 {
        out[i] = (src[i] * fa + dst[i] * fb).clamp(0.0, 1.0);
    }
    out
}

fn unpremul3(px: PremulF32) -> [f32; 3] {
    if px[3] <= 0.0 {
        return [0.0; 3];
    }
    [
        (px[0] / px[3]).min(1.0),
        (px[1] / px[3]).min(1.0),
        (px[2] / px[3]).min(1.0),
    ]
}

// Shared by separable and non-separable modes: co = cs(1-ab) + cb(1-as) + as*ab*B(cb, cs).
fn mix(src: PremulF32, dst: PremulF32, mixed: [f32; 3]) -> PremulF32 {
    let (sa, da) = (src[3], dst[3]);
    let mut out = [0.0; 4];
    for i in 0..3 {
        out[i] = (src[i] * (1.0 - da) + dst[i] * (1.0 - sa) + sa * da * mixed[i]).clamp(0.0, 1.0);
    }
    out[3] = (sa + da - sa * da).clamp(0.0, 1.0);
    out
}

fn separable(mode: BlendMode, src: PremulF32, dst: PremulF32) -> PremulF32 {
    let cs = unpremul3(src);
    let cb = unpremul3(dst);
    let mut mixed = [0.0; 3];
    for i in 0..3 {
        mixed[i] = separable_channel(mode, cb[i], cs[i]);
    }
    mix(src, dst, mixed)
}

fn separable_channel(mode: BlendMode, cb: f32, cs: f32) -> f32 {
    match mode {
        BlendMode::Multiply => cb * cs,
        BlendMode::Screen => cb + cs - cb * cs,
        BlendMode::Overlay => hard_light(cs, cb),
        BlendMode::Darken => cb.min(cs),
        BlendMode::Lighten => cb.max(cs),
        BlendMode::ColorDodge => {
            if cb <= 0.0 {
                0.0
            } else if cs >= 1.0 {
                1.0
            } else {
                (cb / (1.0 - cs)).min(1.0)
            }
        }
        BlendMode::ColorBurn => {
            if cb >= 1.0 {
                1.0
            } else if cs <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - cb) / cs).min(1.0)
            }
        }
        BlendMode::HardLight => hard_light(cb, cs),
        BlendMode::SoftLight => {
            if cs <= 0.5 {
                cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
            } else {
                let d = if cb <= 0.25 {
                    ((16.0 * cb - 12.0) * cb + 4.0) * cb
                } else {
                    cb.sqrt()
                };
                cb + (2.0 * cs - 1.0) * (d - cb)
            }
        }
        BlendMode::Difference => (cb - cs).abs(),
        BlendMode::Exclusion => cb + cs - 2.0 * cb * cs,
        _ => cs,
    }
}

fn hard_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb * 2.0 * cs
    } else {
        let s = 2.0 * cs - 1.0;
        cb + s - cb * s
    }
}

fn non_separable(mode: BlendMode, src: PremulF32, dst: PremulF32) -> PremulF32 {
    let cs = unpremul3(src);
    let cb = unpremul3(dst);
    let mixed = match mode {
        BlendMode::Hue => set_lum(set_sat(cs, sat(cb)), lum(cb)),
        BlendMode::Saturation => set_lum(set_sat(cb, sat(cs)), lum(cb)),
        BlendMode::Color => set_lum(cs, lum(cb)),
        _ => set_lum(cb, lum(cs)),
    };
    mix(src, dst, mixed)
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    for v in &mut out {
        if n < 0.0 && l - n > 0.0 {
            *v = l + (*v - l) * l / (l - n);
        }
        if x > 1.0 && x - l > 0.0 {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    if max - min <= 0.0 {
        return [0.0; 3];
    }
    let mut out = [0.0; 3];
    for i in 0..3 {
        out[i] = (c[i] - min) * s / (max - min);
    }
    out
}

/// Source-over with a global opacity, on 8-bit premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = u16::from(crate::foundation::math::unit_to_u8(opacity));
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Linear mix of two premultiplied pixels; `t = 0` yields `a`, `t = 1` yields `b`.
pub fn crossfade(a: PremulRgba8, b: PremulRgba8, t: f32) -> PremulRgba8 {
    let tt = u16::from(crate::foundation::math::unit_to_u8(t));
    let it = 255u16 - tt;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = mul_div255_u8(u16::from(a[i]), it);
        let bv = mul_div255_u8(u16::from(b[i]), tt);
        out[i] = av.saturating_add(bv);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> ImageResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ImageError::invalid_image(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Replace `dst` with the crossfade of `a` and `b`.
pub fn crossfade_in_place(dst: &mut [u8], a: &[u8], b: &[u8], t: f32) -> ImageResult<()> {
    if dst.len() != a.len() || dst.len() != b.len() || !dst.len().is_multiple_of(4) {
        return Err(ImageError::invalid_image(
            "crossfade_in_place expects equal-length rgba8 buffers",
        ));
    }
    for ((d, a), b) in dst
        .chunks_exact_mut(4)
        .zip(a.chunks_exact(4))
        .zip(b.chunks_exact(4))
    {
        let out = crossfade([a[0], a[1], a[2], a[3]], [b[0], b[1], b[2], b[3]], t);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
