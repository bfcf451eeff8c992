use super::*;
use crate::assets::resolve::MemoryImageResolver;
use crate::layout::reducer::{WARN_CTA_REMOVED, reduce_all_targets};

#[path = "support.rs"]
mod support;

use support::{FakeHost, campaign_snapshot};

fn mixed_targets() -> Vec<FormatTarget> {
    vec![
        FormatTarget::new("1:1", 1080, 1080, "Square"),
        FormatTarget::new("9:16", 1080, 1920, "Story"),
        FormatTarget::new("4:5", 1080, 1350, "Portrait"),
        FormatTarget::new("thumb", 200, 200, "Thumbnail"),
    ]
}

fn statuses(results: &[RenderResult]) -> Vec<RenderStatus> {
    results.iter().map(|r| r.status).collect()
}

#[test]
fn mixed_batch_degrades_and_skips_independently() {
    let mut host = FakeHost::new();
    let mut resolver = MemoryImageResolver::new();
    let mut targets = mixed_targets();
    let snapshot = campaign_snapshot();

    let results = BatchOrchestrator::new(&mut host, &mut resolver).render_all_formats(
        &mut targets,
        &snapshot,
        &mut |_, _| {},
    );

    assert_eq!(
        statuses(&results),
        vec![
            RenderStatus::Done,
            RenderStatus::Done,
            RenderStatus::Done,
            RenderStatus::Skipped
        ]
    );
    let levels: Vec<_> = results.iter().map(|r| r.content_level).collect();
    assert_eq!(
        levels,
        vec![
            Some(ContentLevel::ReducedNoCta),
            Some(ContentLevel::Full),
            Some(ContentLevel::Full),
            Some(ContentLevel::Skip)
        ]
    );
    let cta_warnings = results
        .iter()
        .flat_map(|r| r.warnings.iter())
        .filter(|w| *w == WARN_CTA_REMOVED)
        .count();
    assert_eq!(cta_warnings, 1);
    assert!(results[3].bitmap.is_none());
    assert!(results[..3].iter().all(|r| r.bitmap.is_some()));

    // Committed levels are written back onto the targets.
    assert_eq!(targets[0].content_level, Some(ContentLevel::ReducedNoCta));
    assert_eq!(targets[3].content_level, Some(ContentLevel::Skip));

    let log = host.log();
    assert_eq!(log.surfaces_created, 3);
    assert_eq!(log.surfaces_released, 3);

    let summary = BatchSummary::from_results(&results);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.done, 3);
    assert_eq!(summary.degraded, 1);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn progress_reports_every_transition_in_order() {
    let mut host = FakeHost::new();
    let mut resolver = MemoryImageResolver::new();
    let mut targets = vec![
        FormatTarget::new("4:5", 1080, 1350, "Portrait"),
        FormatTarget::new("thumb", 200, 200, "Thumbnail"),
    ];
    let mut events = Vec::new();

    BatchOrchestrator::new(&mut host, &mut resolver).render_all_formats(
        &mut targets,
        &campaign_snapshot(),
        &mut |i, r| events.push((i, r.status)),
    );

    assert_eq!(
        events,
        vec![
            (0, RenderStatus::Pending),
            (0, RenderStatus::Rendering),
            (0, RenderStatus::Done),
            (1, RenderStatus::Pending),
            (1, RenderStatus::Skipped),
        ]
    );
}

#[test]
fn cancelling_mid_batch_cancels_the_rest() {
    let cancel = CancelToken::new();
    let mut host = FakeHost::new();
    host.trip_on_fonts_ready = Some(cancel.clone());
    let mut resolver = MemoryImageResolver::new();
    let mut targets = mixed_targets();

    let results = BatchOrchestrator::new(&mut host, &mut resolver)
        .with_cancel_token(cancel)
        .render_all_formats(&mut targets, &campaign_snapshot(), &mut |_, _| {});

    assert!(results.iter().all(|r| r.status == RenderStatus::Cancelled));
    assert!(results.iter().all(|r| r.bitmap.is_none()));
    assert_eq!(BatchSummary::from_results(&results).cancelled, 4);

    let log = host.log();
    assert_eq!(log.fonts_ready.len(), 1);
    assert_eq!(log.surfaces_created, log.surfaces_released);
    assert_eq!(log.exports, 0);
}

#[test]
fn preset_levels_skip_reduction() {
    let mut host = FakeHost::new();
    let mut resolver = MemoryImageResolver::new();
    let mut target = FormatTarget::new("1:1", 1080, 1080, "Square");
    target.content_level = Some(ContentLevel::HeadlineOnly);
    let mut targets = vec![target];

    let results = BatchOrchestrator::new(&mut host, &mut resolver).render_all_formats(
        &mut targets,
        &campaign_snapshot(),
        &mut |_, _| {},
    );

    assert_eq!(results[0].status, RenderStatus::Done);
    assert_eq!(results[0].content_level, Some(ContentLevel::HeadlineOnly));
    assert!(results[0].warnings.is_empty());
    assert!(host.log().shaped.iter().all(|s| s != "Shop now"));
}

#[test]
fn planned_levels_keep_their_degradation_warnings() {
    let mut host = FakeHost::new();
    let mut resolver = MemoryImageResolver::new();
    let mut targets = mixed_targets();
    let snapshot = campaign_snapshot();

    let planned = reduce_all_targets(&mut targets, &snapshot, &mut host);
    assert_eq!(planned["1:1"], vec![WARN_CTA_REMOVED.to_string()]);
    assert_eq!(targets[0].level_warnings, planned["1:1"]);

    let results = BatchOrchestrator::new(&mut host, &mut resolver).render_all_formats(
        &mut targets,
        &snapshot,
        &mut |_, _| {},
    );

    assert_eq!(results[0].status, RenderStatus::Done);
    assert_eq!(results[0].content_level, Some(ContentLevel::ReducedNoCta));
    assert_eq!(results[0].warnings[0], WARN_CTA_REMOVED);
    assert_eq!(results[3].status, RenderStatus::Skipped);
    assert_eq!(results[3].warnings, planned["thumb"]);
    assert!(results[1].warnings.is_empty());

    // A single re-render reports the same degradation.
    let again = BatchOrchestrator::new(&mut host, &mut resolver)
        .rerender_one(&mut targets, 0, &snapshot, &mut |_, _| {})
        .unwrap();
    assert_eq!(again.warnings, vec![WARN_CTA_REMOVED.to_string()]);
}

#[test]
fn invalid_settings_fail_every_target() {
    let mut host = FakeHost::new();
    let mut resolver = MemoryImageResolver::new();
    let mut targets = mixed_targets();
    let settings = ExportSettings {
        quality: 0,
        ..ExportSettings::default()
    };

    let results = BatchOrchestrator::new(&mut host, &mut resolver)
        .with_settings(settings)
        .render_all_formats(&mut targets, &campaign_snapshot(), &mut |_, _| {});

    assert!(results.iter().all(|r| r.status == RenderStatus::Error));
    assert!(results[0].warnings[0].starts_with("Render failed: validation error"));
    assert_eq!(host.log().surfaces_created, 0);
}

#[test]
fn failed_export_isolated_per_target() {
    let mut host = FakeHost::new();
    host.export_none = true;
    let mut resolver = MemoryImageResolver::new();
    let mut targets = mixed_targets();

    let results = BatchOrchestrator::new(&mut host, &mut resolver).render_all_formats(
        &mut targets,
        &campaign_snapshot(),
        &mut |_, _| {},
    );

    assert_eq!(
        statuses(&results),
        vec![
            RenderStatus::Error,
            RenderStatus::Error,
            RenderStatus::Error,
            RenderStatus::Skipped
        ]
    );
    assert!(
        results[1]
            .warnings
            .iter()
            .any(|w| w.starts_with("Render failed: export error"))
    );
    let log = host.log();
    assert_eq!(log.exports, 3);
    assert_eq!(log.surfaces_created, log.surfaces_released);
}

#[test]
fn invalid_target_fails_alone() {
    let mut host = FakeHost::new();
    let mut resolver = MemoryImageResolver::new();
    let mut targets = vec![
        FormatTarget::new("bad", 0, 1080, "Broken"),
        FormatTarget::new("4:5", 1080, 1350, "Portrait"),
    ];

    let results = BatchOrchestrator::new(&mut host, &mut resolver).render_all_formats(
        &mut targets,
        &campaign_snapshot(),
        &mut |_, _| {},
    );
    assert_eq!(
        statuses(&results),
        vec![RenderStatus::Error, RenderStatus::Done]
    );
}

#[test]
fn rerender_one_reuses_the_committed_level() {
    let mut host = FakeHost::new();
    let mut resolver = MemoryImageResolver::new();
    let mut targets = mixed_targets();
    let snapshot = campaign_snapshot();
    let mut orchestrator = BatchOrchestrator::new(&mut host, &mut resolver);

    orchestrator.render_all_formats(&mut targets, &snapshot, &mut |_, _| {});
    let again = orchestrator
        .rerender_one(&mut targets, 0, &snapshot, &mut |_, _| {})
        .unwrap();
    assert_eq!(again.status, RenderStatus::Done);
    assert_eq!(again.content_level, Some(ContentLevel::ReducedNoCta));
    // Level was already committed, so no reduction warnings the second time.
    assert!(again.warnings.is_empty());

    assert!(
        orchestrator
            .rerender_one(&mut targets, 9, &snapshot, &mut |_, _| {})
            .is_err()
    );
}

#[test]
fn cancel_token_is_shared_between_clones() {
    let a = CancelToken::new();
    let b = a.clone();
    assert!(a.check("idle").is_ok());
    b.cancel();
    assert!(a.is_cancelled());
    assert!(a.check("idle").unwrap_err().is_cancelled());
}

#[test]
fn terminal_statuses() {
    assert!(!RenderStatus::Pending.is_terminal());
    assert!(!RenderStatus::Rendering.is_terminal());
    assert!(RenderStatus::Done.is_terminal());
    assert!(RenderStatus::Cancelled.is_terminal());
}
