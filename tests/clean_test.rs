//! Normalization pipeline tests over realistic mixed input.

use narro::clean;
use proptest::prelude::*;

#[test]
fn test_full_pipeline_on_marked_up_text() {
    let input = r#"<div><p>Dr. Harris (Chen, 2021) wrote&nbsp;&mdash;&nbsp;at length[3] about tides.</p>
<p>Details at https://tides.example.org or via harbor@example.org.</p></div>"#;

    let out = clean(input);

    assert!(out.contains("Doctor Harris"));
    assert!(!out.contains("Chen"));
    assert!(!out.contains("[3]"));
    assert!(out.contains("link"));
    assert!(out.contains("email address"));
    assert!(!out.contains('<'));
    assert!(!out.contains("&nbsp;"));
    assert!(!out.contains('\u{2014}'));
}

#[test]
fn test_author_year_citation_removed() {
    assert_eq!(clean("The result (Smith, 2020) held."), "The result held.");
}

#[test]
fn test_title_abbreviations_expanded() {
    let out = clean("Dr. Smith met Mrs. Jones.");
    assert!(out.contains("Doctor Smith"));
    assert!(out.contains("Misses Jones"));
    assert!(!out.contains("Dr."));
    assert!(!out.contains("Mrs."));
}

#[test]
fn test_already_plain_input_untouched() {
    let text = "The harbor was quiet that morning. Boats drifted at anchor.\n\nBy noon the wind rose.";
    assert_eq!(clean(text), text);
}

#[test]
fn test_idempotent_on_cleaned_output() {
    let messy = "<p>He paused\u{2014}briefly\u{2014}then(see note 2) said:Hello.World</p>";
    let once = clean(messy);
    let twice = clean(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_table_like_block_removed_prose_kept() {
    let input = "The figures told the story.\n\
| Year | Revenue | Cost |\n\
| 1901 | 4,200   | 900  |\n\
Still, the crew pressed on through winter.";

    let out = clean(input);
    assert!(out.contains("figures told the story"));
    assert!(out.contains("pressed on through winter"));
    // The digit row is symbol-dense and dropped; the header row is mostly
    // words and survives the ratio check.
    assert!(!out.contains("4,200"));
    assert!(!out.contains("1901"));
    assert!(out.contains("Revenue"));
}

#[test]
fn test_paragraph_breaks_survive_for_prosody() {
    let input = "First paragraph of narration.\n\n\n\nSecond paragraph of narration.";
    assert_eq!(
        clean(input),
        "First paragraph of narration.\n\nSecond paragraph of narration."
    );
}

proptest! {
    // Stages 1-4 are no-ops on symbol-free prose, so a second pass over any
    // cleaned output must be a fixed point.
    #[test]
    fn prop_clean_is_idempotent_on_prose(input in "[a-zA-Z ,.!?'\\n]{0,300}") {
        let once = clean(&input);
        prop_assert_eq!(clean(&once), once);
    }

    #[test]
    fn prop_clean_never_panics(input in "\\PC{0,200}") {
        let _ = clean(&input);
    }
}
