use super::*;

fn font(size: f32) -> FontSpec {
    FontSpec::new("Inter", 400, size)
}

#[test]
fn fixed_advance_counts_chars() {
    let mut m = FixedAdvanceMeasurer::new(0.5);
    assert_eq!(m.line_width("abcd", &font(10.0)), 20.0);
    assert_eq!(m.line_width("", &font(10.0)), 0.0);
    assert_eq!(FixedAdvanceMeasurer::new(f32::NAN).advance_em(), 0.5);
}

#[test]
fn greedy_packing_breaks_at_width() {
    let mut m = FixedAdvanceMeasurer::new(0.5);
    // Each char is 5px; 30px fits "aa bb" (5 chars = 25px) but not "aa bb cc" (40px).
    let w = wrap_text(&mut m, "aa bb cc dd", &font(10.0), 30.0);
    assert_eq!(w.lines, vec!["aa bb", "cc dd"]);
    assert_eq!(w.widest, 25.0);
    assert!(!w.overflows);
}

#[test]
fn long_word_gets_its_own_line_and_flags_overflow() {
    let mut m = FixedAdvanceMeasurer::new(0.5);
    let w = wrap_text(&mut m, "a supercalifragilistic b", &font(10.0), 30.0);
    assert_eq!(w.lines, vec!["a", "supercalifragilistic", "b"]);
    assert!(w.overflows);
}

#[test]
fn explicit_newlines_start_paragraphs() {
    let mut m = FixedAdvanceMeasurer::new(0.5);
    let w = wrap_text(&mut m, "one\n\ntwo", &font(10.0), 1000.0);
    assert_eq!(w.lines, vec!["one", "", "two"]);
}

#[test]
fn blank_text_has_no_lines() {
    let mut m = FixedAdvanceMeasurer::default();
    assert_eq!(measure_text_lines(&mut m, "   \n ", &font(10.0), 100.0), 0);
}

#[test]
fn measure_text_lines_is_deterministic() {
    let mut m = FixedAdvanceMeasurer::default();
    let text = "The quick brown fox jumps over the lazy dog again and again";
    let first = measure_text_lines(&mut m, text, &font(32.0), 300.0);
    for _ in 0..16 {
        assert_eq!(measure_text_lines(&mut m, text, &font(32.0), 300.0), first);
    }
    assert!(first > 1);
}
