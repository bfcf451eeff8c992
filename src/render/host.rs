use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::decode::DecodedImage;
use crate::design::snapshot::BlendMode;
use crate::foundation::core::{Affine, Point, Rect, Rgba8};
use crate::foundation::error::{FormatizerError, FormatizerResult};
use crate::text::fonts::ShapedLine;
use crate::text::measure::{FontSpec, TextMeasurer};

/// Compressed output encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    #[default]
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Output encoding, density and preview size for a batch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub format: ExportFormat,
    /// JPEG quality in `1..=100`.
    pub quality: u8,
    /// Output pixels per layout pixel.
    pub pixel_ratio: f64,
    /// Longest edge of the preview thumbnail, in pixels.
    pub preview_max_edge: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: 92,
            pixel_ratio: 2.0,
            preview_max_edge: 320,
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> FormatizerResult<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(FormatizerError::validation("export quality must be in 1..=100"));
        }
        if !self.pixel_ratio.is_finite() || self.pixel_ratio <= 0.0 || self.pixel_ratio > 4.0 {
            return Err(FormatizerError::validation(
                "export pixel_ratio must be in (0, 4]",
            ));
        }
        Ok(())
    }
}

/// Encoded output for one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedBitmap {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
}

/// Small straight-alpha RGBA8 thumbnail. Dropping it releases the pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    pub width: u32,
    pub height: u32,
    pub rgba8: Arc<Vec<u8>>,
}

/// One isolated, invisible drawing surface, owned by a single target render.
///
/// Coordinates are layout pixels; the surface applies its pixel ratio internally. Dropping the
/// surface releases everything it allocated.
pub trait SceneSurface {
    /// Logical size in layout pixels.
    fn size(&self) -> (u32, u32);

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> FormatizerResult<()>;

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Rgba8) -> FormatizerResult<()>;

    /// Draw `image` with `transform` mapping image pixels to layout pixels.
    fn draw_image(&mut self, image: &DecodedImage, transform: Affine) -> FormatizerResult<()>;

    /// Pixel size of layers passed to [`SceneSurface::composite_layer`].
    fn layer_size(&self) -> (u32, u32);

    /// Composite a premultiplied RGBA8 layer covering the whole surface.
    fn composite_layer(
        &mut self,
        rgba8_premul: &[u8],
        blend: BlendMode,
        opacity: f32,
    ) -> FormatizerResult<()>;

    /// Paint a shaped line with its baseline starting at `baseline_origin`.
    fn fill_glyphs(
        &mut self,
        line: &ShapedLine,
        baseline_origin: Point,
        color: Rgba8,
    ) -> FormatizerResult<()>;

    /// Encode the surface. `Ok(None)` means the host produced no bitmap.
    fn export(&mut self, settings: &ExportSettings) -> FormatizerResult<Option<ExportedBitmap>>;

    fn preview(&mut self, max_edge: u32) -> FormatizerResult<Option<PreviewHandle>>;
}

/// Host environment the renderer draws through.
///
/// The same host measures text for layout and shapes it for painting, so both stages wrap lines
/// identically.
pub trait RenderHost: TextMeasurer {
    type Surface: SceneSurface;

    /// Block until the requested fonts can be measured accurately.
    fn fonts_ready(&mut self, fonts: &[FontSpec]) -> FormatizerResult<()>;

    fn create_surface(
        &mut self,
        width: u32,
        height: u32,
        pixel_ratio: f64,
    ) -> FormatizerResult<Self::Surface>;

    fn shape_line(&mut self, text: &str, font: &FontSpec) -> FormatizerResult<ShapedLine>;
}

#[cfg(test)]
#[path = "../../tests/unit/render/host.rs"]
mod tests;
