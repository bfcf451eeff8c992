use std::collections::BTreeMap;

use crate::design::format::{ContentLevel, FormatTarget};
use crate::design::snapshot::DesignSnapshot;
use crate::layout::engine::compute_layout;
use crate::text::measure::TextMeasurer;

pub const WARN_CTA_REMOVED: &str = "CTA button removed: insufficient height";
pub const WARN_SUPPORTING_TEXT_REMOVED: &str =
    "Body text and tagline removed: insufficient height";
pub const WARN_ALL_TEXT_REMOVED: &str =
    "All text removed: insufficient height, showing image and logo only";
pub const WARN_SKIP_TOO_SMALL: &str = "Format skipped: canvas too small for any content";
pub const WARN_SKIP_NO_FIT: &str = "Format skipped: content does not fit even for image and logo";
pub const WARN_HEADLINE_TOO_WIDE: &str = "Headline contains a word wider than the canvas";
pub const WARN_TEXT_TOO_WIDE: &str = "Some text is wider than the canvas";

/// Smallest edge on which an image-and-logo-only render is still worthwhile.
pub const MIN_IMAGE_ONLY_DIM: u32 = 300;

/// Committed level for one target plus the reasons it degraded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reduction {
    pub content_level: ContentLevel,
    pub warnings: Vec<String>,
}

impl Reduction {
    fn skip(reason: &str) -> Self {
        Self {
            content_level: ContentLevel::Skip,
            warnings: vec![reason.to_string()],
        }
    }
}

fn transition_warning(from: ContentLevel, snapshot: &DesignSnapshot) -> Option<&'static str> {
    let c = &snapshot.content;
    match from {
        ContentLevel::Full if c.has_button() => Some(WARN_CTA_REMOVED),
        ContentLevel::ReducedNoCta if c.has_tagline() || c.has_body() => {
            Some(WARN_SUPPORTING_TEXT_REMOVED)
        }
        ContentLevel::HeadlineOnly if !c.headline.trim().is_empty() => Some(WARN_ALL_TEXT_REMOVED),
        _ => None,
    }
}

/// Walk levels from richest to sparsest and commit the first whose layout fits vertically.
///
/// Image-and-logo-only output additionally requires both edges to be at least
/// [`MIN_IMAGE_ONLY_DIM`]. Skipping is a valid outcome, not an error.
pub fn determine_content_level(
    target: &FormatTarget,
    snapshot: &DesignSnapshot,
    measurer: &mut dyn TextMeasurer,
) -> Reduction {
    let mut warnings = Vec::<String>::new();
    let mut level = ContentLevel::Full;

    loop {
        match level {
            ContentLevel::Skip => return Reduction::skip(WARN_SKIP_NO_FIT),
            ContentLevel::ImageOnlyLogo
                if target.width < MIN_IMAGE_ONLY_DIM || target.height < MIN_IMAGE_ONLY_DIM =>
            {
                return Reduction::skip(WARN_SKIP_TOO_SMALL);
            }
            _ => {}
        }

        let layout = compute_layout(target.width, target.height, level, snapshot, measurer);
        if layout.fits_vertically {
            if layout.overflows_horizontally {
                let headline = layout.headline.as_ref().is_some_and(|b| b.overflows);
                warnings.push(
                    if headline {
                        WARN_HEADLINE_TOO_WIDE
                    } else {
                        WARN_TEXT_TOO_WIDE
                    }
                    .to_string(),
                );
            }
            tracing::debug!(
                ratio = %target.ratio_id,
                level = %level,
                warnings = warnings.len(),
                "content level committed"
            );
            return Reduction {
                content_level: level,
                warnings,
            };
        }

        if let Some(w) = transition_warning(level, snapshot) {
            warnings.push(w.to_string());
        }
        level = match level.next_sparser() {
            Some(next) => next,
            None => return Reduction::skip(WARN_SKIP_NO_FIT),
        };
    }
}

/// Reduce every target independently, writing its committed level and warnings.
///
/// Returns warnings keyed by ratio id; targets sharing an id have their warnings concatenated.
pub fn reduce_all_targets(
    targets: &mut [FormatTarget],
    snapshot: &DesignSnapshot,
    measurer: &mut dyn TextMeasurer,
) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::<String, Vec<String>>::new();
    for target in targets.iter_mut() {
        let r = determine_content_level(target, snapshot, measurer);
        out.entry(target.ratio_id.clone())
            .or_default()
            .extend(r.warnings.iter().cloned());
        target.commit_level(r.content_level, r.warnings);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/reducer.rs"]
mod tests;
