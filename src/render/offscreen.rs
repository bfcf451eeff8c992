use crate::assets::decode::{DecodedImage, decode_image, looks_like_svg, parse_svg, rasterize_svg};
use crate::assets::resolve::ImageResolver;
use crate::design::format::FormatTarget;
use crate::design::snapshot::{DesignSnapshot, OverlayMode};
use crate::foundation::core::{Affine, Point, Rect, Rgba8};
use crate::foundation::error::{FormatizerError, FormatizerResult};
use crate::layout::background_fit::compute_fit;
use crate::layout::engine::{LayoutResult, TextBlockLayout};
use crate::render::batch::CancelToken;
use crate::render::host::{ExportSettings, ExportedBitmap, PreviewHandle, RenderHost, SceneSurface};
use crate::render::overlay::synthesize_overlay;
use crate::text::fonts::ShapedLine;
use crate::text::measure::FontSpec;

/// Output of one successful target render.
#[derive(Clone, Debug)]
pub struct RenderedFormat {
    pub bitmap: ExportedBitmap,
    pub preview: Option<PreviewHandle>,
    /// Layers that were omitted, with reasons.
    pub warnings: Vec<String>,
}

/// Text and button colors for one overlay mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextPalette {
    pub text: Rgba8,
    pub tagline: Rgba8,
    pub button_fill: Rgba8,
    pub button_label: Rgba8,
    pub credit: Rgba8,
}

impl TextPalette {
    /// Light text over dark overlays, dark text over light ones. The tagline and button use the
    /// accent; the button label takes whichever of dark/light contrasts with it.
    pub fn for_snapshot(snapshot: &DesignSnapshot) -> Self {
        let c = snapshot.brand.colors;
        let text = match snapshot.overlay.mode {
            OverlayMode::Dark => c.light,
            OverlayMode::Light => c.dark,
        };
        let button_label = if c.accent.luma() > 0.6 { c.dark } else { c.light };
        Self {
            text,
            tagline: c.accent,
            button_fill: c.accent,
            button_label,
            credit: text.with_alpha(200),
        }
    }
}

/// Baseline that vertically centres `shaped` in a row starting at `row_top`.
fn baseline_in_row(row_top: f64, line_height: f64, shaped: &ShapedLine) -> f64 {
    let ascent = f64::from(shaped.ascent);
    let descent = f64::from(shaped.descent);
    row_top + (line_height - (ascent + descent)) / 2.0 + ascent
}

fn load_image(
    resolver: &mut dyn ImageResolver,
    url: &str,
) -> FormatizerResult<LoadedImage> {
    let bytes = resolver.resolve(url)?;
    if looks_like_svg(&bytes) {
        Ok(LoadedImage::Svg(parse_svg(&bytes)?))
    } else {
        Ok(LoadedImage::Raster(decode_image(&bytes)?))
    }
}

enum LoadedImage {
    Raster(DecodedImage),
    Svg(usvg::Tree),
}

impl LoadedImage {
    fn natural_size(&self) -> (f64, f64) {
        match self {
            Self::Raster(img) => (f64::from(img.width), f64::from(img.height)),
            Self::Svg(tree) => (
                f64::from(tree.size().width()),
                f64::from(tree.size().height()),
            ),
        }
    }
}

fn paint_block<H: RenderHost>(
    host: &mut H,
    surface: &mut H::Surface,
    layout: &LayoutResult,
    block: &TextBlockLayout,
    color: Rgba8,
) -> FormatizerResult<()> {
    let spec = block.font_spec();
    for (i, line) in block.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let shaped = host.shape_line(line, &spec)?;
        let row_top = layout.group_y + block.y + block.line_height * i as f64;
        let baseline = baseline_in_row(row_top, block.line_height, &shaped);
        surface.fill_glyphs(&shaped, Point::new(layout.group_x, baseline), color)?;
    }
    Ok(())
}

fn paint_background<S: SceneSurface>(
    surface: &mut S,
    snapshot: &DesignSnapshot,
    target: &FormatTarget,
    resolver: &mut dyn ImageResolver,
    pixel_ratio: f64,
) -> FormatizerResult<()> {
    let Some(bg) = &snapshot.background else {
        return Ok(());
    };
    let loaded = load_image(resolver, &bg.url)?;
    let (nw, nh) = loaded.natural_size();
    let fit = compute_fit(
        nw,
        nh,
        f64::from(target.width),
        f64::from(target.height),
        &bg.transform,
        f64::from(snapshot.source_canvas.width),
        f64::from(snapshot.source_canvas.height),
    );

    let image = match loaded {
        LoadedImage::Raster(img) => img,
        LoadedImage::Svg(tree) => {
            // Rasterize at the covered size so vector backgrounds stay sharp.
            let w = (fit.width * pixel_ratio).ceil().clamp(1.0, 16_384.0) as u32;
            let h = (fit.height * pixel_ratio).ceil().clamp(1.0, 16_384.0) as u32;
            rasterize_svg(&tree, w, h)?
        }
    };
    surface.draw_image(
        &image,
        fit.image_affine(f64::from(image.width), f64::from(image.height)),
    )
}

/// Draw a logo bottom-left in `bounds`, shrunk to fit but never enlarged past its natural size.
/// SVG logos are rasterized at the drawn size times `pixel_ratio`.
fn paint_logo<S: SceneSurface>(
    surface: &mut S,
    url: &str,
    bounds: Rect,
    resolver: &mut dyn ImageResolver,
    pixel_ratio: f64,
) -> FormatizerResult<()> {
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return Ok(());
    }
    let loaded = load_image(resolver, url)?;
    let (nw, nh) = loaded.natural_size();
    if nw <= 0.0 || nh <= 0.0 {
        return Err(FormatizerError::asset(format!("logo '{url}' has no size")));
    }

    let fit_scale = (bounds.width() / nw).min(bounds.height() / nh).min(1.0);
    let (image, scale) = match loaded {
        LoadedImage::Raster(img) => (img, fit_scale),
        LoadedImage::Svg(tree) => {
            let w = (nw * fit_scale * pixel_ratio).round().max(1.0) as u32;
            let h = (nh * fit_scale * pixel_ratio).round().max(1.0) as u32;
            let img = rasterize_svg(&tree, w, h)?;
            let s = (nw * fit_scale) / f64::from(img.width);
            (img, s)
        }
    };

    let drawn_h = f64::from(image.height) * scale;
    let origin = Point::new(bounds.x0, bounds.y1 - drawn_h);
    surface.draw_image(
        &image,
        Affine::translate(origin.to_vec2()) * Affine::scale(scale),
    )
}

fn paint_credit<H: RenderHost>(
    host: &mut H,
    surface: &mut H::Surface,
    snapshot: &DesignSnapshot,
    layout: &LayoutResult,
    text: &str,
    color: Rgba8,
) -> FormatizerResult<()> {
    let f = &snapshot.brand.fonts.credit;
    let spec = FontSpec::new(f.family.clone(), f.weight, layout.credit_font_size as f32);
    let shaped = host.shape_line(text, &spec)?;
    let right = f64::from(layout.target_width) - layout.padding.right;
    let baseline = f64::from(layout.target_height) - layout.padding.bottom
        - f64::from(shaped.descent);
    let x = (right - f64::from(shaped.width)).max(0.0);
    surface.fill_glyphs(&shaped, Point::new(x, baseline), color)
}

/// Fonts the host must have ready before painting `layout`.
pub fn required_fonts(snapshot: &DesignSnapshot, layout: &LayoutResult) -> Vec<FontSpec> {
    let mut out: Vec<FontSpec> = layout.text_blocks().map(TextBlockLayout::font_spec).collect();
    if let Some(b) = &layout.button {
        out.push(b.font_spec());
    }
    if !out.is_empty() && snapshot.credit_text().is_some() {
        let f = &snapshot.brand.fonts.credit;
        out.push(FontSpec::new(
            f.family.clone(),
            f.weight,
            layout.credit_font_size as f32,
        ));
    }
    out
}

/// Render one target into an encoded bitmap on a surface owned by this call.
///
/// Background, logo and credit failures omit that layer and add a warning. Font readiness, text
/// painting and export failures fail the target. The surface is dropped on every path, including
/// early returns.
#[tracing::instrument(skip_all, fields(ratio = %target.ratio_id, level = %layout.level))]
pub fn render_format<H: RenderHost>(
    target: &FormatTarget,
    snapshot: &DesignSnapshot,
    layout: &LayoutResult,
    host: &mut H,
    resolver: &mut dyn ImageResolver,
    settings: &ExportSettings,
    cancel: &CancelToken,
) -> FormatizerResult<RenderedFormat> {
    let mut warnings = Vec::<String>::new();
    let mut omit = |layer: &str, err: FormatizerError| {
        tracing::warn!(layer, error = %err, "layer omitted");
        warnings.push(format!("{layer} omitted: {err}"));
    };

    cancel.check("waiting for fonts")?;
    host.fonts_ready(&required_fonts(snapshot, layout))?;

    let mut surface = host.create_surface(target.width, target.height, settings.pixel_ratio)?;
    let (w, h) = surface.size();
    let full = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));

    surface.fill_rect(full, snapshot.background_color)?;

    if snapshot.background.is_some() {
        cancel.check("resolving background image")?;
        if let Err(e) = paint_background(&mut surface, snapshot, target, resolver, settings.pixel_ratio) {
            omit("Background image", e);
        }
    }

    let (lw, lh) = surface.layer_size();
    if let Some(layer) = synthesize_overlay(&snapshot.overlay, lw, lh) {
        surface.composite_layer(&layer, snapshot.overlay.blend, 1.0)?;
    }

    let palette = TextPalette::for_snapshot(snapshot);
    if layout.level.includes_text() {
        if let Some(b) = &layout.tagline {
            paint_block(host, &mut surface, layout, b, palette.tagline)?;
        }
        if let Some(b) = &layout.headline {
            paint_block(host, &mut surface, layout, b, palette.text)?;
        }
        if let Some(b) = &layout.body {
            paint_block(host, &mut surface, layout, b, palette.text)?;
        }
        if let Some(b) = &layout.button {
            let rect = Rect::new(
                layout.group_x,
                layout.group_y + b.y,
                layout.group_x + b.width,
                layout.group_y + b.y + b.height,
            );
            surface.fill_rounded_rect(rect, b.radius, palette.button_fill)?;
            let shaped = host.shape_line(&b.label, &b.font_spec())?;
            let x = rect.x0 + (b.width - f64::from(shaped.width)) / 2.0;
            let baseline = baseline_in_row(rect.y0, b.height, &shaped);
            surface.fill_glyphs(&shaped, Point::new(x, baseline), palette.button_label)?;
        }
    }

    if let Some(url) = snapshot.logo_url() {
        cancel.check("resolving logo")?;
        if let Err(e) = paint_logo(&mut surface, url, layout.logo_bounds, resolver, settings.pixel_ratio) {
            omit("Logo", e);
        }
    }

    if let Some(credit) = snapshot.credit_text()
        && let Err(e) = paint_credit(host, &mut surface, snapshot, layout, &credit, palette.credit)
    {
        omit("Photo credit", e);
    }

    cancel.check("exporting")?;
    let bitmap = surface
        .export(settings)?
        .ok_or_else(|| FormatizerError::export("host produced no bitmap"))?;

    let preview = match surface.preview(settings.preview_max_edge) {
        Ok(p) => p,
        Err(e) => {
            omit("Preview", e);
            None
        }
    };

    tracing::debug!(
        bytes = bitmap.bytes.len(),
        width = bitmap.width,
        height = bitmap.height,
        "target exported"
    );
    Ok(RenderedFormat {
        bitmap,
        preview,
        warnings,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/offscreen.rs"]
mod tests;
