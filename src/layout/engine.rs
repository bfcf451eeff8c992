use crate::design::format::ContentLevel;
use crate::design::snapshot::{BrandFont, DesignSnapshot, TypeScale};
use crate::foundation::core::{Edges, Rect};
use crate::foundation::math::scale_px;
use crate::text::measure::{FontSpec, TextMeasurer, wrap_text};

/// Short edge all brand geometry is authored against.
pub const REFERENCE_DIM: f64 = 1080.0;

/// One wrapped text element of the content group.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlockLayout {
    /// Offset from the top of the content group.
    pub y: f64,
    pub font: BrandFont,
    pub font_size: f64,
    pub line_height: f64,
    /// Lines exactly as painted.
    pub lines: Vec<String>,
    pub widest: f64,
    pub overflows: bool,
}

impl TextBlockLayout {
    pub fn height(&self) -> f64 {
        self.line_height * self.lines.len() as f64
    }

    pub fn font_spec(&self) -> FontSpec {
        FontSpec::new(
            self.font.family.clone(),
            self.font.weight,
            self.font_size as f32,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ButtonLayout {
    /// Offset from the top of the content group.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub padding_x: f64,
    pub radius: f64,
    pub font: BrandFont,
    pub font_size: f64,
    pub label: String,
    pub label_width: f64,
}

impl ButtonLayout {
    pub fn font_spec(&self) -> FontSpec {
        FontSpec::new(
            self.font.family.clone(),
            self.font.weight,
            self.font_size as f32,
        )
    }
}

/// Geometry for one (target, content level) pair. Recomputed per attempt, never cached.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutResult {
    pub target_width: u32,
    pub target_height: u32,
    pub level: ContentLevel,
    pub scale_factor: f64,
    pub padding: Edges,
    pub gap: f64,
    pub content_width: f64,
    /// Top-left corner of the content group.
    pub group_x: f64,
    pub group_y: f64,
    pub group_height: f64,
    pub tagline: Option<TextBlockLayout>,
    pub headline: Option<TextBlockLayout>,
    pub body: Option<TextBlockLayout>,
    pub button: Option<ButtonLayout>,
    /// Maximum logo box, bottom-left inside the padding.
    pub logo_bounds: Rect,
    pub credit_font_size: f64,
    pub fits_vertically: bool,
    /// A word or the button is wider than the content width.
    pub overflows_horizontally: bool,
}

impl LayoutResult {
    /// Text blocks in paint order.
    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlockLayout> {
        [&self.tagline, &self.headline, &self.body]
            .into_iter()
            .filter_map(Option::as_ref)
    }
}

fn scaled_font(base: f64, scale: f64, floor: f64) -> f64 {
    scale_px(base, scale).max(floor)
}

struct Stack {
    y: f64,
    occupied: bool,
    gap: f64,
}

impl Stack {
    /// Reserve `height` at the running offset and return the element's y.
    fn place(&mut self, height: f64) -> f64 {
        if height <= 0.0 {
            return self.y;
        }
        if self.occupied {
            self.y += self.gap;
        }
        let y = self.y;
        self.y += height;
        self.occupied = true;
        y
    }
}

fn text_block(
    measurer: &mut dyn TextMeasurer,
    text: &str,
    font: &BrandFont,
    scale: &TypeScale,
    base_size: f64,
    factor: f64,
    max_width: f64,
) -> TextBlockLayout {
    let font_size = scaled_font(base_size, factor, scale.min_size);
    let line_height = (font_size * scale.line_height).round();
    let spec = FontSpec::new(font.family.clone(), font.weight, font_size as f32);
    let wrapped = wrap_text(measurer, text, &spec, max_width as f32);
    TextBlockLayout {
        y: 0.0,
        font: font.clone(),
        font_size,
        line_height,
        lines: wrapped.lines,
        widest: f64::from(wrapped.widest),
        overflows: wrapped.overflows,
    }
}

/// Lay out the content group for `level` on a `target_w × target_h` canvas.
///
/// All brand geometry is scaled by `min(target_w, target_h) / 1080` and rounded to whole pixels,
/// so canvases sharing a short edge get identical type sizes. Elements stack top-down:
/// tagline, headline, body, button, separated by the scaled gap. The content fits when
/// `padding.top + group + logo_max_height + padding.bottom <= target_h`.
pub fn compute_layout(
    target_w: u32,
    target_h: u32,
    level: ContentLevel,
    snapshot: &DesignSnapshot,
    measurer: &mut dyn TextMeasurer,
) -> LayoutResult {
    let w = f64::from(target_w);
    let h = f64::from(target_h);
    let factor = w.min(h) / REFERENCE_DIM;

    let geo = &snapshot.brand.geometry;
    let fonts = &snapshot.brand.fonts;
    let content = &snapshot.content;

    let padding = geo.padding.scaled(factor);
    let gap = scale_px(geo.gap, factor);
    let content_width = (w - padding.horizontal()).max(0.0);
    let logo_w = scale_px(geo.logo_max_width, factor).min(content_width);
    let logo_h = scale_px(geo.logo_max_height, factor);

    let mut stack = Stack {
        y: 0.0,
        occupied: false,
        gap,
    };
    let mut tagline = None;
    let mut headline = None;
    let mut body = None;
    let mut button = None;

    if level.includes_supporting_text() && content.has_tagline() {
        let mut b = text_block(
            measurer,
            &content.tagline,
            &fonts.tagline,
            &geo.tagline,
            geo.tagline.size,
            factor,
            content_width,
        );
        b.y = stack.place(b.height());
        tagline = Some(b);
    }

    if level.includes_text() {
        let mut b = text_block(
            measurer,
            &content.headline,
            &fonts.headline,
            &geo.headline,
            content.headline_size.unwrap_or(geo.headline.size),
            factor,
            content_width,
        );
        b.y = stack.place(b.height());
        headline = Some(b);
    }

    if level.includes_supporting_text() && content.has_body() {
        let mut b = text_block(
            measurer,
            &content.body,
            &fonts.body,
            &geo.body,
            geo.body.size,
            factor,
            content_width,
        );
        b.y = stack.place(b.height());
        body = Some(b);
    }

    if level.includes_button() && content.has_button() {
        let g = geo.button;
        let font_size = scaled_font(g.font_size, factor, g.min_font_size);
        let label = content.button_text.trim().to_string();
        let spec = FontSpec::new(fonts.button.family.clone(), fonts.button.weight, font_size as f32);
        let label_width = f64::from(measurer.line_width(&label, &spec));
        let padding_x = scale_px(g.padding_x, factor);
        let height = scale_px(g.height, factor);
        let y = stack.place(height);
        button = Some(ButtonLayout {
            y,
            width: label_width.ceil() + 2.0 * padding_x,
            height,
            padding_x,
            radius: scale_px(g.radius, factor),
            font: fonts.button.clone(),
            font_size,
            label,
            label_width,
        });
    }

    let group_height = stack.y;
    let fits_vertically = padding.top + group_height + logo_h + padding.bottom <= h;

    let text_overflow = [&tagline, &headline, &body]
        .into_iter()
        .flatten()
        .any(|b| b.overflows);
    let button_overflow = button.as_ref().is_some_and(|b| b.width > content_width);

    LayoutResult {
        target_width: target_w,
        target_height: target_h,
        level,
        scale_factor: factor,
        padding,
        gap,
        content_width,
        group_x: padding.left,
        group_y: padding.top,
        group_height,
        tagline,
        headline,
        body,
        button,
        logo_bounds: Rect::new(
            padding.left,
            h - padding.bottom - logo_h,
            padding.left + logo_w,
            h - padding.bottom,
        ),
        credit_font_size: scaled_font(geo.credit_font_size, factor, geo.credit_min_font_size),
        fits_vertically,
        overflows_horizontally: text_overflow || button_overflow,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
