use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{FormatizerError, FormatizerResult};
use crate::text::measure::{FontSpec, TextMeasurer};

/// Environment variable naming a directory of `.ttf`/`.otf`/`.ttc` files to register on startup.
pub const FONTS_DIR_ENV: &str = "FORMATIZER_FONTS_DIR";

/// Advance used when no font is registered at all, as a fraction of the font size.
const UNREGISTERED_ADVANCE_EM: f32 = 0.55;

#[derive(Clone, Debug)]
struct FontFace {
    family: String,
    weight: u16,
    data: vello_cpu::peniko::FontData,
}

/// One line of text shaped with a registered face, ready for `vello_cpu` glyph drawing.
#[derive(Clone, Debug)]
pub struct ShapedLine {
    /// Face data used by the glyph ids below.
    pub font: vello_cpu::peniko::FontData,
    pub font_size: f32,
    /// Glyphs with `x` relative to the line start and `y` relative to the baseline.
    pub glyphs: Vec<vello_cpu::Glyph>,
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

/// Registered font faces plus the parley contexts used to measure and shape with them.
///
/// The collection only contains explicitly registered faces, so measurement and painting never
/// disagree because of a system font the painter cannot access.
pub struct FontLibrary {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    faces: Vec<FontFace>,
    warned: HashSet<String>,
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.faces.len())
            .field("families", &self.families())
            .finish()
    }
}

impl FontLibrary {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext {
                collection: parley::fontique::Collection::new(parley::fontique::CollectionOptions {
                    shared: false,
                    system_fonts: false,
                }),
                source_cache: parley::fontique::SourceCache::default(),
            },
            layout_ctx: parley::LayoutContext::new(),
            faces: Vec::new(),
            warned: HashSet::new(),
        }
    }

    /// Build a library from [`FONTS_DIR_ENV`] when it is set.
    pub fn from_env() -> FormatizerResult<Self> {
        let mut lib = Self::new();
        if let Some(dir) = std::env::var_os(FONTS_DIR_ENV) {
            lib.load_dir(Path::new(&dir))?;
        }
        Ok(lib)
    }

    /// Register every face in a font file's bytes. Returns the family names found.
    pub fn register_bytes(&mut self, bytes: Vec<u8>) -> FormatizerResult<Vec<String>> {
        let blob = vello_cpu::peniko::Blob::from(bytes.clone());
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        if families.is_empty() {
            return Err(FormatizerError::asset(
                "no font families registered from font bytes",
            ));
        }

        let mut names = Vec::with_capacity(families.len());
        for (family_id, infos) in families {
            let name = self
                .font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| FormatizerError::asset("registered font family has no name"))?
                .to_string();
            for info in infos {
                self.faces.push(FontFace {
                    family: name.clone(),
                    weight: info.weight().value().round().clamp(1.0, 1000.0) as u16,
                    data: vello_cpu::peniko::FontData::new(blob.clone(), info.index()),
                });
            }
            if !names.contains(&name) {
                names.push(name);
            }
        }
        tracing::debug!(families = ?names, "registered font bytes");
        Ok(names)
    }

    pub fn register_file(&mut self, path: &Path) -> FormatizerResult<Vec<String>> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font file '{}'", path.display()))?;
        self.register_bytes(bytes)
    }

    /// Register all font files directly inside `dir`, in file-name order. Returns the face count.
    pub fn load_dir(&mut self, dir: &Path) -> FormatizerResult<usize> {
        let mut paths = std::fs::read_dir(dir)
            .with_context(|| format!("read font dir '{}'", dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
            })
            .collect::<Vec<_>>();
        paths.sort();

        let before = self.faces.len();
        for p in &paths {
            self.register_file(p)?;
        }
        Ok(self.faces.len() - before)
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Distinct registered family names in registration order.
    pub fn families(&self) -> Vec<String> {
        let mut out = Vec::<String>::new();
        for f in &self.faces {
            if !out.contains(&f.family) {
                out.push(f.family.clone());
            }
        }
        out
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.faces
            .iter()
            .any(|f| f.family.eq_ignore_ascii_case(family))
    }

    /// Pick the face for `spec`: same family with the nearest weight, else the first registered face.
    fn resolve_face(&mut self, spec: &FontSpec) -> Option<FontFace> {
        let exact = self
            .faces
            .iter()
            .filter(|f| f.family.eq_ignore_ascii_case(&spec.family))
            .min_by_key(|f| f.weight.abs_diff(spec.weight));
        if let Some(face) = exact {
            return Some(face.clone());
        }

        let fallback = self.faces.first().cloned()?;
        if self.warned.insert(spec.family.clone()) {
            tracing::warn!(
                requested = %spec.family,
                fallback = %fallback.family,
                "font family not registered, using fallback"
            );
        }
        Some(fallback)
    }

    fn build_layout(&mut self, text: &str, face: &FontFace, size_px: f32) -> parley::Layout<()> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight)),
        ));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Shape `text` as a single line. Fails when no font is registered.
    pub fn shape_line(&mut self, text: &str, spec: &FontSpec) -> FormatizerResult<ShapedLine> {
        if !spec.size_px.is_finite() || spec.size_px <= 0.0 {
            return Err(FormatizerError::validation(
                "font size_px must be finite and > 0",
            ));
        }
        let face = self
            .resolve_face(spec)
            .ok_or_else(|| FormatizerError::asset("no fonts registered"))?;
        let layout = self.build_layout(text, &face, spec.size_px);

        let mut out = ShapedLine {
            font: face.data.clone(),
            font_size: spec.size_px,
            glyphs: Vec::new(),
            width: 0.0,
            ascent: 0.0,
            descent: 0.0,
        };
        for (i, line) in layout.lines().enumerate() {
            let m = line.metrics();
            out.width = out.width.max(m.advance);
            if i == 0 {
                out.ascent = m.ascent;
                out.descent = m.descent;
            }
            let baseline = m.baseline;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                out.glyphs
                    .extend(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y - baseline,
                    }));
            }
        }
        Ok(out)
    }
}

impl TextMeasurer for FontLibrary {
    fn line_width(&mut self, text: &str, font: &FontSpec) -> f32 {
        let Some(face) = self.resolve_face(font) else {
            if self.warned.insert(String::new()) {
                tracing::warn!("no fonts registered, measuring with a fixed advance");
            }
            return text.chars().count() as f32 * font.size_px * UNREGISTERED_ADVANCE_EM;
        };
        let layout = self.build_layout(text, &face, font.size_px);
        layout
            .lines()
            .map(|l| l.metrics().advance)
            .fold(0.0f32, f32::max)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
