use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Edges, Rgba8};
use crate::foundation::error::{FormatizerError, FormatizerResult};

/// Point-in-time copy of everything needed to render any format.
///
/// A batch holds one snapshot by shared reference for its whole run and never mutates it, so the
/// live editing session is never touched by export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignSnapshot {
    #[serde(default)]
    pub content: ContentBlock,
    #[serde(default)]
    pub background: Option<BackgroundImage>,
    #[serde(default)]
    pub overlay: OverlaySettings,
    #[serde(default = "default_background_color")]
    pub background_color: Rgba8,
    /// Canvas the background transform was authored against.
    #[serde(default)]
    pub source_canvas: CanvasSize,
    #[serde(default)]
    pub brand: Brand,
}

fn default_background_color() -> Rgba8 {
    Rgba8::rgb(0x22, 0x22, 0x22)
}

impl Default for DesignSnapshot {
    fn default() -> Self {
        Self {
            content: ContentBlock::default(),
            background: None,
            overlay: OverlaySettings::default(),
            background_color: default_background_color(),
            source_canvas: CanvasSize::default(),
            brand: Brand::default(),
        }
    }
}

impl DesignSnapshot {
    /// Parse a snapshot from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FormatizerResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FormatizerError::serde(format!("parse design snapshot JSON: {e}")))
    }

    /// Parse a snapshot from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FormatizerResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FormatizerError::validation(format!(
                "open design snapshot JSON '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> FormatizerResult<()> {
        if self.source_canvas.width == 0 || self.source_canvas.height == 0 {
            return Err(FormatizerError::validation(
                "source_canvas width/height must be > 0",
            ));
        }
        if let Some(size) = self.content.headline_size
            && (!size.is_finite() || size <= 0.0)
        {
            return Err(FormatizerError::validation(
                "content.headline_size must be finite and > 0",
            ));
        }
        if let Some(bg) = &self.background {
            if bg.url.trim().is_empty() {
                return Err(FormatizerError::validation("background.url must be non-empty"));
            }
            let t = bg.transform;
            if !t.scale.is_finite() || !t.position_x.is_finite() || !t.position_y.is_finite() {
                return Err(FormatizerError::validation(
                    "background.transform values must be finite",
                ));
            }
        }
        if !self.overlay.intensity.is_finite() || !(0.0..=100.0).contains(&self.overlay.intensity)
        {
            return Err(FormatizerError::validation(
                "overlay.intensity must be in 0..=100",
            ));
        }
        self.brand.geometry.validate()
    }

    /// Logo URL for the overlay mode: light variant over dark overlays, dark variant over light
    /// overlays, falling back to the base logo.
    pub fn logo_url(&self) -> Option<&str> {
        let logo = &self.brand.logo;
        let variant = match self.overlay.mode {
            OverlayMode::Dark => logo.light_url.as_deref(),
            OverlayMode::Light => logo.dark_url.as_deref(),
        };
        variant
            .or(logo.url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }

    /// Attribution text, when the background carries any.
    pub fn credit_text(&self) -> Option<String> {
        self.background
            .as_ref()
            .and_then(|bg| bg.attribution.as_ref())
            .and_then(Attribution::label)
    }
}

/// Editable copy in the content block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub button_text: String,
    #[serde(default)]
    pub show_button: bool,
    /// Overrides the brand's headline size, in reference pixels.
    #[serde(default)]
    pub headline_size: Option<f64>,
}

impl ContentBlock {
    pub fn has_tagline(&self) -> bool {
        !self.tagline.trim().is_empty()
    }

    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }

    pub fn has_button(&self) -> bool {
        self.show_button && !self.button_text.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub url: String,
    #[serde(default)]
    pub transform: ImageTransform,
    #[serde(default)]
    pub attribution: Option<Attribution>,
}

/// User zoom/pan/flip, with pan in source-canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageTransform {
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default)]
    pub flip_x: bool,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            position_x: 0.0,
            position_y: 0.0,
            flip_x: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    #[serde(default)]
    pub photographer: String,
    #[serde(default)]
    pub source: String,
}

impl Attribution {
    /// "Photo by {photographer} on {source}", dropping whichever part is blank.
    pub fn label(&self) -> Option<String> {
        let who = self.photographer.trim();
        let src = self.source.trim();
        match (who.is_empty(), src.is_empty()) {
            (false, false) => Some(format!("Photo by {who} on {src}")),
            (false, true) => Some(format!("Photo by {who}")),
            (true, false) => Some(format!("Photo: {src}")),
            (true, true) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    #[default]
    None,
    Solid,
    LinearGradient,
    Vignette,
}

/// Whether the overlay darkens or lightens the background; drives text and logo contrast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    #[default]
    Dark,
    Light,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    SoftLight,
    Darken,
    Lighten,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    #[serde(default)]
    pub kind: OverlayKind,
    #[serde(default)]
    pub mode: OverlayMode,
    /// Strength in `0..=100`.
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    #[serde(default)]
    pub blend: BlendMode,
}

fn default_intensity() -> f64 {
    40.0
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            kind: OverlayKind::None,
            mode: OverlayMode::Dark,
            intensity: default_intensity(),
            blend: BlendMode::Normal,
        }
    }
}

impl OverlaySettings {
    pub fn is_visible(&self) -> bool {
        self.kind != OverlayKind::None && self.intensity > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
        }
    }
}

/// Brand data resolved from the brand-token store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(default)]
    pub logo: LogoSet,
    #[serde(default)]
    pub colors: ColorTriad,
    #[serde(default)]
    pub fonts: BrandFonts,
    #[serde(default)]
    pub geometry: BrandGeometry,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogoSet {
    #[serde(default)]
    pub url: Option<String>,
    /// Variant for dark backgrounds.
    #[serde(default)]
    pub light_url: Option<String>,
    /// Variant for light backgrounds.
    #[serde(default)]
    pub dark_url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorTriad {
    #[serde(default = "default_dark")]
    pub dark: Rgba8,
    #[serde(default = "default_light")]
    pub light: Rgba8,
    #[serde(default = "default_accent")]
    pub accent: Rgba8,
}

fn default_dark() -> Rgba8 {
    Rgba8::rgb(0x11, 0x11, 0x11)
}

fn default_light() -> Rgba8 {
    Rgba8::WHITE
}

fn default_accent() -> Rgba8 {
    Rgba8::rgb(0xff, 0x5a, 0x36)
}

impl Default for ColorTriad {
    fn default() -> Self {
        Self {
            dark: default_dark(),
            light: default_light(),
            accent: default_accent(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrandFont {
    pub family: String,
    #[serde(default = "default_weight")]
    pub weight: u16,
}

fn default_weight() -> u16 {
    400
}

impl BrandFont {
    pub fn new(family: impl Into<String>, weight: u16) -> Self {
        Self {
            family: family.into(),
            weight,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrandFonts {
    #[serde(default = "default_tagline_font")]
    pub tagline: BrandFont,
    #[serde(default = "default_headline_font")]
    pub headline: BrandFont,
    #[serde(default = "default_body_font")]
    pub body: BrandFont,
    #[serde(default = "default_button_font")]
    pub button: BrandFont,
    #[serde(default = "default_body_font")]
    pub credit: BrandFont,
}

fn default_tagline_font() -> BrandFont {
    BrandFont::new("Inter", 600)
}

fn default_headline_font() -> BrandFont {
    BrandFont::new("Inter", 700)
}

fn default_body_font() -> BrandFont {
    BrandFont::new("Inter", 400)
}

fn default_button_font() -> BrandFont {
    BrandFont::new("Inter", 600)
}

impl Default for BrandFonts {
    fn default() -> Self {
        Self {
            tagline: default_tagline_font(),
            headline: default_headline_font(),
            body: default_body_font(),
            button: default_button_font(),
            credit: default_body_font(),
        }
    }
}

impl BrandFonts {
    /// Every family name referenced, deduplicated, in role order.
    pub fn families(&self) -> Vec<String> {
        let mut out = Vec::<String>::new();
        for f in [
            &self.tagline,
            &self.headline,
            &self.body,
            &self.button,
            &self.credit,
        ] {
            if !out.contains(&f.family) {
                out.push(f.family.clone());
            }
        }
        out
    }
}

/// Font size, line-height multiplier and legibility floor for one text role.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeScale {
    /// Size in reference pixels.
    pub size: f64,
    pub line_height: f64,
    /// Smallest size in output pixels the role may shrink to.
    pub min_size: f64,
}

impl TypeScale {
    pub const fn new(size: f64, line_height: f64, min_size: f64) -> Self {
        Self {
            size,
            line_height,
            min_size,
        }
    }

    fn is_valid(&self) -> bool {
        self.size.is_finite()
            && self.size > 0.0
            && self.line_height.is_finite()
            && self.line_height > 0.0
            && self.min_size.is_finite()
            && self.min_size >= 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonGeometry {
    pub height: f64,
    pub padding_x: f64,
    pub radius: f64,
    pub font_size: f64,
    pub min_font_size: f64,
}

impl Default for ButtonGeometry {
    fn default() -> Self {
        Self {
            height: 72.0,
            padding_x: 40.0,
            radius: 12.0,
            font_size: 28.0,
            min_font_size: 12.0,
        }
    }
}

/// Brand spacing and type sizes, authored against the 1080px reference canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandGeometry {
    pub padding: Edges,
    pub gap: f64,
    pub tagline: TypeScale,
    pub headline: TypeScale,
    pub body: TypeScale,
    pub button: ButtonGeometry,
    pub logo_max_width: f64,
    pub logo_max_height: f64,
    pub credit_font_size: f64,
    pub credit_min_font_size: f64,
}

impl Default for BrandGeometry {
    fn default() -> Self {
        Self {
            padding: Edges::uniform(64.0),
            gap: 24.0,
            tagline: TypeScale::new(28.0, 1.4, 12.0),
            headline: TypeScale::new(72.0, 1.15, 24.0),
            body: TypeScale::new(32.0, 1.4, 12.0),
            button: ButtonGeometry::default(),
            logo_max_width: 240.0,
            logo_max_height: 80.0,
            credit_font_size: 14.0,
            credit_min_font_size: 10.0,
        }
    }
}

impl BrandGeometry {
    pub fn validate(&self) -> FormatizerResult<()> {
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !self.padding.is_finite()
            || ![
                self.padding.top,
                self.padding.right,
                self.padding.bottom,
                self.padding.left,
            ]
            .into_iter()
            .all(non_negative)
        {
            return Err(FormatizerError::validation(
                "brand padding must be finite and >= 0",
            ));
        }
        if !non_negative(self.gap) {
            return Err(FormatizerError::validation("brand gap must be finite and >= 0"));
        }
        for (name, ts) in [
            ("tagline", self.tagline),
            ("headline", self.headline),
            ("body", self.body),
        ] {
            if !ts.is_valid() {
                return Err(FormatizerError::validation(format!(
                    "brand {name} type scale must have finite size/line_height > 0"
                )));
            }
        }
        let b = self.button;
        if ![b.height, b.padding_x, b.radius, b.min_font_size]
            .into_iter()
            .all(non_negative)
            || !(b.font_size.is_finite() && b.font_size > 0.0)
        {
            return Err(FormatizerError::validation(
                "brand button geometry must be finite and >= 0",
            ));
        }
        if ![
            self.logo_max_width,
            self.logo_max_height,
            self.credit_min_font_size,
        ]
        .into_iter()
        .all(non_negative)
            || !(self.credit_font_size.is_finite() && self.credit_font_size > 0.0)
        {
            return Err(FormatizerError::validation(
                "brand logo/credit geometry must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/design/snapshot.rs"]
mod tests;
