#![forbid(unsafe_code)]
//! Adaptive multi-format layout and offscreen rendering for marketing graphics.
//!
//! One [`DesignSnapshot`] is laid out for every [`FormatTarget`], degraded to the richest
//! [`ContentLevel`] that fits, painted on an isolated surface and exported as PNG or JPEG.

mod assets;
mod design;
mod foundation;
mod job;
mod layout;
mod render;
mod text;

pub use assets::decode::{DecodedImage, decode_image, looks_like_svg, parse_svg, rasterize_svg};
pub use assets::resolve::{FsImageResolver, ImageResolver, MemoryImageResolver, normalize_rel_path};
pub use design::format::{ContentLevel, FormatTarget, MAX_TARGET_DIM};
pub use design::snapshot::{
    Attribution, BackgroundImage, BlendMode, Brand, BrandFont, BrandFonts, BrandGeometry,
    ButtonGeometry, CanvasSize, ColorTriad, ContentBlock, DesignSnapshot, ImageTransform, LogoSet,
    OverlayKind, OverlayMode, OverlaySettings, TypeScale,
};
pub use foundation::core::{Affine, Edges, Point, Rect, Rgba8, Vec2};
pub use foundation::error::{FormatizerError, FormatizerResult};
pub use job::ExportJob;
pub use layout::background_fit::{CoverFit, compute_fit};
pub use layout::engine::{ButtonLayout, LayoutResult, REFERENCE_DIM, TextBlockLayout, compute_layout};
pub use layout::reducer::{
    MIN_IMAGE_ONLY_DIM, Reduction, WARN_ALL_TEXT_REMOVED, WARN_CTA_REMOVED,
    WARN_HEADLINE_TOO_WIDE, WARN_SKIP_NO_FIT, WARN_SKIP_TOO_SMALL, WARN_SUPPORTING_TEXT_REMOVED,
    WARN_TEXT_TOO_WIDE, determine_content_level, reduce_all_targets,
};
pub use render::batch::{
    BatchOrchestrator, BatchSummary, CancelToken, RenderResult, RenderStatus, WARN_CANCELLED,
};
pub use render::composite::{PremulRgba8, blend_in_place, over, over_in_place};
pub use render::cpu::{CpuHost, CpuSurface, SurfaceStats};
pub use render::host::{
    ExportFormat, ExportSettings, ExportedBitmap, PreviewHandle, RenderHost, SceneSurface,
};
pub use render::offscreen::{RenderedFormat, TextPalette, render_format, required_fonts};
pub use render::overlay::{overlay_color, synthesize_overlay};
pub use text::fonts::{FONTS_DIR_ENV, FontLibrary, ShapedLine};
pub use text::measure::{
    FixedAdvanceMeasurer, FontSpec, TextMeasurer, WrappedText, measure_text_lines, wrap_text,
};
