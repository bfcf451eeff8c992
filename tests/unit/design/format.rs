use super::*;

#[test]
fn levels_are_ordered_richest_first() {
    assert!(ContentLevel::Full < ContentLevel::ReducedNoCta);
    assert!(ContentLevel::ImageOnlyLogo < ContentLevel::Skip);

    let mut walked = vec![ContentLevel::Full];
    while let Some(next) = walked.last().unwrap().next_sparser() {
        walked.push(next);
    }
    assert_eq!(walked, ContentLevel::ALL.to_vec());
}

#[test]
fn level_capabilities() {
    assert!(ContentLevel::Full.includes_button());
    assert!(!ContentLevel::ReducedNoCta.includes_button());
    assert!(ContentLevel::ReducedNoCta.includes_supporting_text());
    assert!(!ContentLevel::HeadlineOnly.includes_supporting_text());
    assert!(ContentLevel::HeadlineOnly.includes_text());
    assert!(!ContentLevel::ImageOnlyLogo.includes_text());
    assert!(!ContentLevel::Skip.includes_text());
}

#[test]
fn level_serde_uses_screaming_case() {
    assert_eq!(
        serde_json::to_string(&ContentLevel::ReducedNoCta).unwrap(),
        "\"REDUCED_NO_CTA\""
    );
    let lvl: ContentLevel = serde_json::from_str("\"IMAGE_ONLY_LOGO\"").unwrap();
    assert_eq!(lvl, ContentLevel::ImageOnlyLogo);
    assert_eq!(ContentLevel::Skip.to_string(), "SKIP");
}

#[test]
fn standard_catalog_dimensions() {
    let cat = FormatTarget::standard_catalog();
    let dims: Vec<_> = cat
        .iter()
        .map(|t| (t.ratio_id.as_str(), t.width, t.height))
        .collect();
    assert_eq!(
        dims,
        vec![
            ("1:1", 1080, 1080),
            ("4:5", 1080, 1350),
            ("9:16", 1080, 1920),
            ("16:9", 1920, 1080),
            ("1.91:1", 1200, 628),
        ]
    );
    assert!(cat.iter().all(|t| t.content_level.is_none()));
    assert!(cat.iter().all(|t| t.validate().is_ok()));
}

#[test]
fn target_validation() {
    assert!(FormatTarget::new("x", 0, 10, "").validate().is_err());
    assert!(FormatTarget::new("", 10, 10, "").validate().is_err());
    assert!(FormatTarget::new("x", MAX_TARGET_DIM + 1, 10, "").validate().is_err());
    assert_eq!(FormatTarget::new("x", 300, 200, "").short_edge(), 200);
}
