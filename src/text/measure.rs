/// Font selection for one measurement or shaping call.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Family name as registered with the host.
    pub family: String,
    /// CSS-style weight (100..=900).
    pub weight: u16,
    /// Font size in output pixels.
    pub size_px: f32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, weight: u16, size_px: f32) -> Self {
        Self {
            family: family.into(),
            weight,
            size_px,
        }
    }
}

/// Glyph-measurement capability.
///
/// Layout and rendering must share one implementation so both stages agree on where lines wrap.
pub trait TextMeasurer {
    /// Advance width of `text` set on a single line.
    fn line_width(&mut self, text: &str, font: &FontSpec) -> f32;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &mut T {
    fn line_width(&mut self, text: &str, font: &FontSpec) -> f32 {
        (**self).line_width(text, font)
    }
}

/// Measures every character as a fixed fraction of the font size.
///
/// Useful for headless planning where no font files are available, and for deterministic tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMeasurer {
    advance_em: f32,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl FixedAdvanceMeasurer {
    pub fn new(advance_em: f32) -> Self {
        Self {
            advance_em: if advance_em.is_finite() && advance_em > 0.0 {
                advance_em
            } else {
                0.5
            },
        }
    }

    pub fn advance_em(&self) -> f32 {
        self.advance_em
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn line_width(&mut self, text: &str, font: &FontSpec) -> f32 {
        text.chars().count() as f32 * font.size_px * self.advance_em
    }
}

/// Result of greedy word packing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedText {
    /// Lines in paint order.
    pub lines: Vec<String>,
    /// Widest measured line.
    pub widest: f32,
    /// A single word did not fit `max_width` and was set on its own line.
    pub overflows: bool,
}

impl WrappedText {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Greedily pack words into lines no wider than `max_width`.
///
/// Explicit newlines start a new paragraph; an empty paragraph becomes an empty line. Words are
/// never split, so a word wider than `max_width` occupies its own line and marks the result as
/// overflowing. Blank input produces no lines.
pub fn wrap_text(
    measurer: &mut dyn TextMeasurer,
    text: &str,
    font: &FontSpec,
    max_width: f32,
) -> WrappedText {
    let mut out = WrappedText::default();
    if text.trim().is_empty() {
        return out;
    }

    for paragraph in text.trim().lines() {
        let mut current = String::new();
        let mut current_w = 0.0f32;
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                current_w = measurer.line_width(&current, font);
                continue;
            }
            let candidate = format!("{current} {word}");
            let candidate_w = measurer.line_width(&candidate, font);
            if candidate_w <= max_width {
                current = candidate;
                current_w = candidate_w;
            } else {
                push_line(&mut out, std::mem::take(&mut current), current_w, max_width);
                current.push_str(word);
                current_w = measurer.line_width(&current, font);
            }
        }
        push_line(&mut out, current, current_w, max_width);
    }

    out
}

fn push_line(out: &mut WrappedText, line: String, width: f32, max_width: f32) {
    if width > max_width {
        out.overflows = true;
    }
    out.widest = out.widest.max(width);
    out.lines.push(line);
}

/// Number of lines `text` wraps to; see [`wrap_text`].
pub fn measure_text_lines(
    measurer: &mut dyn TextMeasurer,
    text: &str,
    font: &FontSpec,
    max_width: f32,
) -> usize {
    wrap_text(measurer, text, font, max_width).line_count()
}

#[cfg(test)]
#[path = "../../tests/unit/text/measure.rs"]
mod tests;
