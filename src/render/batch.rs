use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::assets::resolve::ImageResolver;
use crate::design::format::{ContentLevel, FormatTarget};
use crate::design::snapshot::DesignSnapshot;
use crate::foundation::error::{FormatizerError, FormatizerResult};
use crate::layout::engine::compute_layout;
use crate::layout::reducer::determine_content_level;
use crate::render::host::{ExportSettings, ExportedBitmap, PreviewHandle, RenderHost};
use crate::render::offscreen::render_format;

pub const WARN_CANCELLED: &str = "Export cancelled before this format finished";

/// Shared flag checked at every suspension point of a batch.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the token has tripped.
    pub fn check(&self, stage: &str) -> FormatizerResult<()> {
        if self.is_cancelled() {
            return Err(FormatizerError::cancelled(format!("cancelled while {stage}")));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Pending,
    Rendering,
    Done,
    Error,
    Skipped,
    Cancelled,
}

impl RenderStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::Rendering)
    }
}

/// Output record for one target, owned by the caller once the batch returns.
#[derive(Clone, Debug)]
pub struct RenderResult {
    pub ratio_id: String,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub content_level: Option<ContentLevel>,
    pub bitmap: Option<ExportedBitmap>,
    pub preview: Option<PreviewHandle>,
    pub status: RenderStatus,
    pub warnings: Vec<String>,
}

impl RenderResult {
    pub fn pending(target: &FormatTarget) -> Self {
        Self {
            ratio_id: target.ratio_id.clone(),
            label: target.label.clone(),
            width: target.width,
            height: target.height,
            content_level: target.content_level,
            bitmap: None,
            preview: None,
            status: RenderStatus::Pending,
            warnings: Vec::new(),
        }
    }
}

/// Outcome counts for logging and UI badges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub done: usize,
    /// Done, but with at least one warning.
    pub degraded: usize,
    pub skipped: usize,
    pub errors: usize,
    pub cancelled: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[RenderResult]) -> Self {
        let mut s = Self {
            total: results.len(),
            ..Self::default()
        };
        for r in results {
            match r.status {
                RenderStatus::Done => {
                    s.done += 1;
                    if !r.warnings.is_empty() {
                        s.degraded += 1;
                    }
                }
                RenderStatus::Skipped => s.skipped += 1,
                RenderStatus::Error => s.errors += 1,
                RenderStatus::Cancelled => s.cancelled += 1,
                RenderStatus::Pending | RenderStatus::Rendering => {}
            }
        }
        s
    }
}

/// Drives [`render_format`] over a list of targets, one at a time, in submission order.
pub struct BatchOrchestrator<'a, H: RenderHost> {
    host: &'a mut H,
    resolver: &'a mut dyn ImageResolver,
    settings: ExportSettings,
    cancel: CancelToken,
}

impl<'a, H: RenderHost> BatchOrchestrator<'a, H> {
    pub fn new(host: &'a mut H, resolver: &'a mut dyn ImageResolver) -> Self {
        Self {
            host,
            resolver,
            settings: ExportSettings::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_settings(mut self, settings: ExportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Render every target and return one result per target, in order.
    ///
    /// Each target moves `Pending → Rendering → Done | Error`, or straight to `Skipped` when its
    /// content level is `Skip`; `on_progress` sees every transition. Targets without a level are
    /// reduced first; degradation warnings recorded on the target lead each result's warnings.
    /// After the cancel token trips, the target in flight and every remaining one end as
    /// `Cancelled`.
    #[tracing::instrument(skip_all, fields(targets = targets.len()))]
    pub fn render_all_formats(
        &mut self,
        targets: &mut [FormatTarget],
        snapshot: &DesignSnapshot,
        on_progress: &mut dyn FnMut(usize, &RenderResult),
    ) -> Vec<RenderResult> {
        let batch_error = snapshot
            .validate()
            .and_then(|()| self.settings.validate())
            .err()
            .map(|e| e.to_string());

        let mut results = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter_mut().enumerate() {
            let result = self.run_target(index, target, snapshot, batch_error.as_deref(), on_progress);
            results.push(result);
        }

        let summary = BatchSummary::from_results(&results);
        tracing::info!(
            total = summary.total,
            done = summary.done,
            degraded = summary.degraded,
            skipped = summary.skipped,
            errors = summary.errors,
            cancelled = summary.cancelled,
            "batch finished"
        );
        results
    }

    /// Re-render a single target through the same per-target boundary as a full batch.
    pub fn rerender_one(
        &mut self,
        targets: &mut [FormatTarget],
        index: usize,
        snapshot: &DesignSnapshot,
        on_progress: &mut dyn FnMut(usize, &RenderResult),
    ) -> FormatizerResult<RenderResult> {
        let len = targets.len();
        let target = targets.get_mut(index).ok_or_else(|| {
            FormatizerError::validation(format!("target index {index} out of range (len {len})"))
        })?;
        let batch_error = snapshot
            .validate()
            .and_then(|()| self.settings.validate())
            .err()
            .map(|e| e.to_string());
        Ok(self.run_target(index, target, snapshot, batch_error.as_deref(), on_progress))
    }

    #[tracing::instrument(skip_all, fields(index = index, ratio = %target.ratio_id))]
    fn run_target(
        &mut self,
        index: usize,
        target: &mut FormatTarget,
        snapshot: &DesignSnapshot,
        batch_error: Option<&str>,
        on_progress: &mut dyn FnMut(usize, &RenderResult),
    ) -> RenderResult {
        let mut result = RenderResult::pending(target);
        on_progress(index, &result);

        if self.cancel.is_cancelled() {
            result.warnings.push(WARN_CANCELLED.to_string());
            return finish(index, result, RenderStatus::Cancelled, on_progress);
        }
        if let Some(reason) = batch_error {
            result.warnings.push(format!("Render failed: {reason}"));
            return finish(index, result, RenderStatus::Error, on_progress);
        }
        if let Err(e) = target.validate() {
            result.warnings.push(format!("Render failed: {e}"));
            return finish(index, result, RenderStatus::Error, on_progress);
        }

        let level = match target.content_level {
            Some(level) => level,
            None => {
                let reduction = determine_content_level(target, snapshot, &mut *self.host);
                target.commit_level(reduction.content_level, reduction.warnings);
                reduction.content_level
            }
        };
        result.warnings.extend(target.level_warnings.iter().cloned());
        result.content_level = Some(level);

        if level == ContentLevel::Skip {
            tracing::debug!("target skipped");
            return finish(index, result, RenderStatus::Skipped, on_progress);
        }

        result.status = RenderStatus::Rendering;
        on_progress(index, &result);

        let layout = compute_layout(target.width, target.height, level, snapshot, &mut *self.host);
        match render_format(
            target,
            snapshot,
            &layout,
            &mut *self.host,
            &mut *self.resolver,
            &self.settings,
            &self.cancel,
        ) {
            Ok(rendered) => {
                result.bitmap = Some(rendered.bitmap);
                result.preview = rendered.preview;
                result.warnings.extend(rendered.warnings);
                finish(index, result, RenderStatus::Done, on_progress)
            }
            Err(e) if e.is_cancelled() => {
                result.warnings.push(WARN_CANCELLED.to_string());
                finish(index, result, RenderStatus::Cancelled, on_progress)
            }
            Err(e) => {
                tracing::warn!(error = %e, "target failed");
                result.warnings.push(format!("Render failed: {e}"));
                finish(index, result, RenderStatus::Error, on_progress)
            }
        }
    }
}

fn finish(
    index: usize,
    mut result: RenderResult,
    status: RenderStatus,
    on_progress: &mut dyn FnMut(usize, &RenderResult),
) -> RenderResult {
    result.status = status;
    on_progress(index, &result);
    result
}

#[cfg(test)]
#[path = "../../tests/unit/render/batch.rs"]
mod tests;
