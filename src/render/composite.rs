use crate::design::snapshot::BlendMode;
use crate::foundation::error::{FormatizerError, FormatizerResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Source-over for a single premultiplied pixel with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = opacity_u8(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }
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

fn opacity_u8(opacity: f32) -> u16 {
    ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

fn check_buffers(dst: &[u8], src: &[u8], what: &str) -> FormatizerResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FormatizerError::render(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

/// Source-over `src` onto `dst`, both premultiplied RGBA8 of the same size.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> FormatizerResult<()> {
    check_buffers(dst, src, "over_in_place")?;
    if opacity_u8(opacity) == 0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Composite a premultiplied layer onto `dst` with a separable blend mode.
pub fn blend_in_place(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
    blend: BlendMode,
) -> FormatizerResult<()> {
    check_buffers(dst, src, "blend_in_place")?;

    // Dispatch once per layer; each arm monomorphizes its own kernel.
    match blend {
        BlendMode::Normal => over_in_place(dst, src, opacity),
        BlendMode::Multiply => {
            composite_over_rgba8_premul_blend(dst, src, opacity, |s, d| s * d);
            Ok(())
        }
        BlendMode::Screen => {
            composite_over_rgba8_premul_blend(dst, src, opacity, |s, d| s + d - s * d);
            Ok(())
        }
        BlendMode::Overlay => {
            composite_over_rgba8_premul_blend(dst, src, opacity, |s, d| {
                if d <= 0.5 {
                    2.0 * s * d
                } else {
                    1.0 - 2.0 * (1.0 - s) * (1.0 - d)
                }
            });
            Ok(())
        }
        BlendMode::SoftLight => {
            composite_over_rgba8_premul_blend(dst, src, opacity, |s, d| {
                if s <= 0.5 {
                    d - (1.0 - 2.0 * s) * d * (1.0 - d)
                } else {
                    let g = if d <= 0.25 {
                        ((16.0 * d - 12.0) * d + 4.0) * d
                    } else {
                        d.sqrt()
                    };
                    d + (2.0 * s - 1.0) * (g - d)
                }
            });
            Ok(())
        }
        BlendMode::Darken => {
            composite_over_rgba8_premul_blend(dst, src, opacity, |s, d| s.min(d));
            Ok(())
        }
        BlendMode::Lighten => {
            composite_over_rgba8_premul_blend(dst, src, opacity, |s, d| s.max(d));
            Ok(())
        }
    }
}

#[inline(always)]
fn composite_over_rgba8_premul_blend<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F)
where
    F: Fn(f32, f32) -> f32,
{
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }

    let unpremul = |p: f32, a: f32| if a > 0.0 { (p / a).clamp(0.0, 1.0) } else { 0.0 };
    let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        // Source-over with the blend applied to straight channels:
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = (f32::from(s[3]) / 255.0) * opacity;
        let da = f32::from(d[3]) / 255.0;
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

        for c in 0..3 {
            let sp = (f32::from(s[c]) / 255.0) * opacity;
            let dp = f32::from(d[c]) / 255.0;
            let b = blend_fn(unpremul(sp, sa), unpremul(dp, da)).clamp(0.0, 1.0);
            d[c] = to_u8((sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, 1.0));
        }
        d[3] = to_u8(out_a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
