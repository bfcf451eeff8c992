use serde::{Deserialize, Serialize};

use crate::foundation::error::{FormatizerError, FormatizerResult};

/// Largest accepted target edge in pixels.
pub const MAX_TARGET_DIM: u32 = 8192;

/// Ordered degradation tier controlling which content elements are included.
///
/// Variants are declared richest first, so `Ord` sorts `Full` lowest and `Skip` highest.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentLevel {
    Full,
    ReducedNoCta,
    HeadlineOnly,
    ImageOnlyLogo,
    Skip,
}

impl ContentLevel {
    /// Every level, richest first.
    pub const ALL: [Self; 5] = [
        Self::Full,
        Self::ReducedNoCta,
        Self::HeadlineOnly,
        Self::ImageOnlyLogo,
        Self::Skip,
    ];

    pub fn next_sparser(self) -> Option<Self> {
        match self {
            Self::Full => Some(Self::ReducedNoCta),
            Self::ReducedNoCta => Some(Self::HeadlineOnly),
            Self::HeadlineOnly => Some(Self::ImageOnlyLogo),
            Self::ImageOnlyLogo => Some(Self::Skip),
            Self::Skip => None,
        }
    }

    /// Headline (and possibly more) is painted.
    pub fn includes_text(self) -> bool {
        matches!(self, Self::Full | Self::ReducedNoCta | Self::HeadlineOnly)
    }

    /// Tagline and body are painted.
    pub fn includes_supporting_text(self) -> bool {
        matches!(self, Self::Full | Self::ReducedNoCta)
    }

    pub fn includes_button(self) -> bool {
        self == Self::Full
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::ReducedNoCta => "REDUCED_NO_CTA",
            Self::HeadlineOnly => "HEADLINE_ONLY",
            Self::ImageOnlyLogo => "IMAGE_ONLY_LOGO",
            Self::Skip => "SKIP",
        }
    }
}

impl std::fmt::Display for ContentLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested output resolution plus its resolved content level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatTarget {
    pub ratio_id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub label: String,
    /// Written once by the content reducer.
    #[serde(default)]
    pub content_level: Option<ContentLevel>,
    /// Degradation warnings recorded when `content_level` was committed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub level_warnings: Vec<String>,
}

impl FormatTarget {
    pub fn new(ratio_id: impl Into<String>, width: u32, height: u32, label: impl Into<String>) -> Self {
        Self {
            ratio_id: ratio_id.into(),
            width,
            height,
            label: label.into(),
            content_level: None,
            level_warnings: Vec::new(),
        }
    }

    /// Commit a reduced level together with the warnings that explain it.
    pub fn commit_level(&mut self, level: ContentLevel, warnings: Vec<String>) {
        self.content_level = Some(level);
        self.level_warnings = warnings;
    }

    /// 1:1, 4:5, 9:16, 16:9 and 1.91:1 social formats.
    pub fn standard_catalog() -> Vec<Self> {
        vec![
            Self::new("1:1", 1080, 1080, "Square"),
            Self::new("4:5", 1080, 1350, "Portrait"),
            Self::new("9:16", 1080, 1920, "Story"),
            Self::new("16:9", 1920, 1080, "Landscape"),
            Self::new("1.91:1", 1200, 628, "Link preview"),
        ]
    }

    pub fn short_edge(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn validate(&self) -> FormatizerResult<()> {
        if self.ratio_id.trim().is_empty() {
            return Err(FormatizerError::validation("target ratio_id must be non-empty"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(FormatizerError::validation(format!(
                "target '{}' width/height must be > 0",
                self.ratio_id
            )));
        }
        if self.width > MAX_TARGET_DIM || self.height > MAX_TARGET_DIM {
            return Err(FormatizerError::validation(format!(
                "target '{}' exceeds {MAX_TARGET_DIM}px",
                self.ratio_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/design/format.rs"]
mod tests;
