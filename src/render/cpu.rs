use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::assets::decode::DecodedImage;
use crate::design::snapshot::BlendMode;
use crate::foundation::core::{Affine, Point, Rect, Rgba8};
use crate::foundation::error::{FormatizerError, FormatizerResult};
use crate::foundation::math::unpremultiply_rgba8;
use crate::render::composite::{blend_in_place, over_in_place};
use crate::render::host::{
    ExportFormat, ExportSettings, ExportedBitmap, PreviewHandle, RenderHost, SceneSurface,
};
use crate::text::fonts::{FontLibrary, ShapedLine};
use crate::text::measure::{FontSpec, TextMeasurer};

#[derive(Debug, Default)]
struct SurfaceCounters {
    created: AtomicU64,
    released: AtomicU64,
}

/// Surfaces created and released by one host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub created: u64,
    pub released: u64,
}

impl SurfaceStats {
    /// Surfaces still alive.
    pub fn live(&self) -> u64 {
        self.created.saturating_sub(self.released)
    }
}

/// Render host backed by `vello_cpu` raster surfaces and a [`FontLibrary`].
#[derive(Debug)]
pub struct CpuHost {
    fonts: FontLibrary,
    counters: Arc<SurfaceCounters>,
}

impl Default for CpuHost {
    fn default() -> Self {
        Self::new(FontLibrary::new())
    }
}

impl CpuHost {
    pub fn new(fonts: FontLibrary) -> Self {
        Self {
            fonts,
            counters: Arc::new(SurfaceCounters::default()),
        }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontLibrary {
        &mut self.fonts
    }

    pub fn stats(&self) -> SurfaceStats {
        SurfaceStats {
            created: self.counters.created.load(Ordering::SeqCst),
            released: self.counters.released.load(Ordering::SeqCst),
        }
    }
}

impl TextMeasurer for CpuHost {
    fn line_width(&mut self, text: &str, font: &FontSpec) -> f32 {
        self.fonts.line_width(text, font)
    }
}

impl RenderHost for CpuHost {
    type Surface = CpuSurface;

    fn fonts_ready(&mut self, fonts: &[FontSpec]) -> FormatizerResult<()> {
        if fonts.is_empty() {
            return Ok(());
        }
        if self.fonts.face_count() == 0 {
            return Err(FormatizerError::asset(
                "no fonts registered; text cannot be painted",
            ));
        }
        for f in fonts {
            if !self.fonts.has_family(&f.family) {
                tracing::warn!(family = %f.family, "font family not registered, text will use a fallback face");
            }
        }
        Ok(())
    }

    fn create_surface(
        &mut self,
        width: u32,
        height: u32,
        pixel_ratio: f64,
    ) -> FormatizerResult<CpuSurface> {
        CpuSurface::new(width, height, pixel_ratio, Arc::clone(&self.counters))
    }

    fn shape_line(&mut self, text: &str, font: &FontSpec) -> FormatizerResult<ShapedLine> {
        self.fonts.shape_line(text, font)
    }
}

/// Offscreen raster surface.
///
/// Draw calls are recorded into a `vello_cpu` context and flushed onto the base pixmap before any
/// pixel-level composite or export. Dropping the surface frees both pixmaps and counts a release
/// on the owning host.
pub struct CpuSurface {
    width: u32,
    height: u32,
    pixel_ratio: f64,
    px_w: u16,
    px_h: u16,
    base: vello_cpu::Pixmap,
    ctx: vello_cpu::RenderContext,
    pending: bool,
    counters: Arc<SurfaceCounters>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_ratio", &self.pixel_ratio)
            .finish()
    }
}

fn to_px(v: u32, ratio: f64, what: &str) -> FormatizerResult<u16> {
    let px = (f64::from(v) * ratio).round();
    if !(1.0..=f64::from(u16::MAX)).contains(&px) {
        return Err(FormatizerError::render(format!(
            "surface {what} {px} px is out of range"
        )));
    }
    Ok(px as u16)
}

impl CpuSurface {
    fn new(
        width: u32,
        height: u32,
        pixel_ratio: f64,
        counters: Arc<SurfaceCounters>,
    ) -> FormatizerResult<Self> {
        if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
            return Err(FormatizerError::render(
                "surface pixel_ratio must be finite and > 0",
            ));
        }
        let px_w = to_px(width, pixel_ratio, "width")?;
        let px_h = to_px(height, pixel_ratio, "height")?;

        let surface = Self {
            width,
            height,
            pixel_ratio,
            px_w,
            px_h,
            base: vello_cpu::Pixmap::new(px_w, px_h),
            ctx: vello_cpu::RenderContext::new(px_w, px_h),
            pending: false,
            counters,
        };
        surface.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(surface)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn device(&self) -> Affine {
        Affine::scale(self.pixel_ratio)
    }

    fn flush(&mut self) -> FormatizerResult<()> {
        if !self.pending {
            return Ok(());
        }
        self.ctx.flush();
        let mut layer = vello_cpu::Pixmap::new(self.px_w, self.px_h);
        self.ctx.render_to_pixmap(&mut layer);
        over_in_place(
            self.base.data_as_u8_slice_mut(),
            layer.data_as_u8_slice(),
            1.0,
        )?;
        self.ctx.reset();
        self.pending = false;
        Ok(())
    }

    /// Premultiplied RGBA8 pixels at device resolution, with pending draws applied.
    pub fn premul_pixels(&mut self) -> FormatizerResult<&[u8]> {
        self.flush()?;
        Ok(self.base.data_as_u8_slice())
    }

    /// Premultiplied pixel at device coordinates.
    pub fn pixel(&mut self, x: u32, y: u32) -> FormatizerResult<[u8; 4]> {
        let (w, h) = self.layer_size();
        if x >= w || y >= h {
            return Err(FormatizerError::render(format!(
                "pixel ({x}, {y}) outside {w}x{h} surface"
            )));
        }
        let i = ((y * w + x) * 4) as usize;
        let px = self.premul_pixels()?;
        Ok([px[i], px[i + 1], px[i + 2], px[i + 3]])
    }

    fn straight_pixels(&mut self) -> FormatizerResult<Vec<u8>> {
        Ok(unpremultiply_rgba8(self.premul_pixels()?))
    }
}

impl Drop for CpuSurface {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FormatizerResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FormatizerError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FormatizerError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(FormatizerError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let opaque = bytes.chunks_exact(4).all(|px| px[3] == 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, !opaque,
    ))
}

impl SceneSurface for CpuSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> FormatizerResult<()> {
        if color.a == 0 || rect.area() <= 0.0 {
            return Ok(());
        }
        self.ctx.set_transform(affine_to_cpu(self.device()));
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
        self.pending = true;
        Ok(())
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Rgba8) -> FormatizerResult<()> {
        use vello_cpu::kurbo::Shape as _;

        if color.a == 0 || rect.area() <= 0.0 {
            return Ok(());
        }
        let r = radius.max(0.0).min(rect.width().min(rect.height()) / 2.0);
        let rr = vello_cpu::kurbo::RoundedRect::new(rect.x0, rect.y0, rect.x1, rect.y1, r);
        self.ctx.set_transform(affine_to_cpu(self.device()));
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_path(&rr.to_path(0.1));
        self.pending = true;
        Ok(())
    }

    fn draw_image(&mut self, image: &DecodedImage, transform: Affine) -> FormatizerResult<()> {
        if !image.has_natural_size() {
            return Ok(());
        }
        let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        self.ctx
            .set_transform(affine_to_cpu(self.device() * transform));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        });
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        self.pending = true;
        Ok(())
    }

    fn layer_size(&self) -> (u32, u32) {
        (u32::from(self.px_w), u32::from(self.px_h))
    }

    fn composite_layer(
        &mut self,
        rgba8_premul: &[u8],
        blend: BlendMode,
        opacity: f32,
    ) -> FormatizerResult<()> {
        self.flush()?;
        blend_in_place(self.base.data_as_u8_slice_mut(), rgba8_premul, opacity, blend)
    }

    fn fill_glyphs(
        &mut self,
        line: &ShapedLine,
        baseline_origin: Point,
        color: Rgba8,
    ) -> FormatizerResult<()> {
        if line.glyphs.is_empty() || color.a == 0 {
            return Ok(());
        }
        let tr = self.device() * Affine::translate(baseline_origin.to_vec2());
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx
            .glyph_run(&line.font)
            .font_size(line.font_size)
            .fill_glyphs(line.glyphs.iter().copied());
        self.pending = true;
        Ok(())
    }

    fn export(&mut self, settings: &ExportSettings) -> FormatizerResult<Option<ExportedBitmap>> {
        let (width, height) = self.layer_size();
        let rgba = self.straight_pixels()?;
        let img = image::RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| FormatizerError::export("surface buffer does not match its size"))?;

        let mut bytes = Vec::new();
        let mut cursor = Cursor::new(&mut bytes);
        match settings.format {
            ExportFormat::Png => {
                image::DynamicImage::ImageRgba8(img)
                    .write_to(&mut cursor, image::ImageFormat::Png)
                    .map_err(|e| FormatizerError::export(format!("encode png: {e}")))?;
            }
            ExportFormat::Jpeg => {
                let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut cursor,
                    settings.quality.clamp(1, 100),
                );
                rgb.write_with_encoder(encoder)
                    .map_err(|e| FormatizerError::export(format!("encode jpeg: {e}")))?;
            }
        }

        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(ExportedBitmap {
            bytes,
            width,
            height,
            format: settings.format,
        }))
    }

    fn preview(&mut self, max_edge: u32) -> FormatizerResult<Option<PreviewHandle>> {
        if max_edge == 0 {
            return Ok(None);
        }
        let (width, height) = self.layer_size();
        let rgba = self.straight_pixels()?;
        let img = image::RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| FormatizerError::render("surface buffer does not match its size"))?;

        let scale = (f64::from(max_edge) / f64::from(width.max(height))).min(1.0);
        let tw = ((f64::from(width) * scale).round() as u32).max(1);
        let th = ((f64::from(height) * scale).round() as u32).max(1);
        let thumb = image::imageops::thumbnail(&img, tw, th);
        Ok(Some(PreviewHandle {
            width: tw,
            height: th,
            rgba8: Arc::new(thumb.into_raw()),
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
