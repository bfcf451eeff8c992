use crate::design::snapshot::{OverlayKind, OverlayMode, OverlaySettings};
use crate::foundation::core::Rgba8;

/// Inner edge of the vignette falloff, as a fraction of the half diagonal.
const VIGNETTE_INNER: f32 = 0.35;

fn smoothstep(a: f32, b: f32, x: f32) -> f32 {
    if x <= a {
        return 0.0;
    }
    if x >= b {
        return 1.0;
    }
    let t = (x - a) / (b - a);
    (t * t * (3.0 - 2.0 * t)).clamp(0.0, 1.0)
}

pub fn overlay_color(mode: OverlayMode) -> Rgba8 {
    match mode {
        OverlayMode::Dark => Rgba8::BLACK,
        OverlayMode::Light => Rgba8::WHITE,
    }
}

/// Premultiplied RGBA8 overlay layer of `width × height` pixels, or `None` when nothing would be
/// painted.
///
/// `Solid` is uniform. `LinearGradient` is strongest at the top edge, where the content group
/// sits, and fades to clear at the bottom. `Vignette` is clear in the centre and strongest in the
/// corners.
pub fn synthesize_overlay(settings: &OverlaySettings, width: u32, height: u32) -> Option<Vec<u8>> {
    if !settings.is_visible() || width == 0 || height == 0 {
        return None;
    }
    let strength = (settings.intensity / 100.0).clamp(0.0, 1.0) as f32;
    let color = overlay_color(settings.mode);

    let px = |alpha: f32| -> [u8; 4] {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        color.with_alpha(a).to_premul()
    };

    let w = width as usize;
    let h = height as usize;
    let mut out = vec![0u8; w * h * 4];

    match settings.kind {
        OverlayKind::None => return None,
        OverlayKind::Solid => {
            let p = px(strength);
            for chunk in out.chunks_exact_mut(4) {
                chunk.copy_from_slice(&p);
            }
        }
        OverlayKind::LinearGradient => {
            let denom = (h.saturating_sub(1)).max(1) as f32;
            for (y, row) in out.chunks_exact_mut(w * 4).enumerate() {
                let p = px(strength * (1.0 - y as f32 / denom));
                for chunk in row.chunks_exact_mut(4) {
                    chunk.copy_from_slice(&p);
                }
            }
        }
        OverlayKind::Vignette => {
            let cx = (w as f32 - 1.0) / 2.0;
            let cy = (h as f32 - 1.0) / 2.0;
            let max_d = (cx * cx + cy * cy).sqrt().max(1.0);
            for (y, row) in out.chunks_exact_mut(w * 4).enumerate() {
                let dy = y as f32 - cy;
                for (x, chunk) in row.chunks_exact_mut(4).enumerate() {
                    let dx = x as f32 - cx;
                    let d = (dx * dx + dy * dy).sqrt() / max_d;
                    chunk.copy_from_slice(&px(strength * smoothstep(VIGNETTE_INNER, 1.0, d)));
                }
            }
        }
    }

    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
