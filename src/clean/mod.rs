//! Five-stage text normalization for speech synthesis.
//!
//! [`clean`] turns arbitrary extracted markup or plain text into
//! narration-ready prose. Each stage is a total function over strings; the
//! whole pipeline never fails and passes already-clean input through
//! unchanged. Stage order matters: citations are stripped while original
//! punctuation is intact, abbreviations are expanded before punctuation
//! normalization so their periods are still visible, and punctuation
//! normalization runs after URL/citation removal so it can sweep up the
//! spacing artifacts those removals leave behind.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static RE_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Common named entities, decoded in this fixed order (`&amp;` late so it
/// cannot manufacture new entities out of `&amp;lt;`).
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&mdash;", "\u{2014}"),
    ("&ndash;", "\u{2013}"),
    ("&ldquo;", "\u{201C}"),
    ("&rdquo;", "\u{201D}"),
    ("&lsquo;", "\u{2018}"),
    ("&rsquo;", "\u{2019}"),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

static RE_AUTHOR_YEAR_CITATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([A-Z][a-z]+(?:\s+et al\.)?,?\s+\d{4}[a-z]?\)").unwrap());
static RE_NUMERIC_FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());
static RE_LETTER_FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[a-z]\]").unwrap());
static RE_SUPERSCRIPT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\u{00B9}\u{00B2}\u{00B3}\u{2074}\u{2075}\u{2076}\u{2077}\u{2078}\u{2079}\u{2070}]+").unwrap());
static RE_SEE_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\(see [^)]+\)").unwrap());

static RE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static RE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

/// Titles and Latin shorthand expanded to their spoken forms, matched at word
/// boundaries case-insensitively.
static ABBREVIATIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"Dr\.", "Doctor"),
        (r"Mr\.", "Mister"),
        (r"Mrs\.", "Misses"),
        (r"Ms\.", "Miss"),
        (r"Prof\.", "Professor"),
        (r"etc\.", "et cetera"),
        (r"i\.e\.", "that is"),
        (r"e\.g\.", "for example"),
        (r"vs\.", "versus"),
    ]
    .iter()
    .map(|(pattern, full)| (Regex::new(&format!(r"(?i)\b{pattern}")).unwrap(), *full))
    .collect()
});

static RE_HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static RE_MISSING_SENTENCE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?])([A-Z])").unwrap());
static RE_MISSING_COMMA_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r",([^\s0-9])").unwrap());
static RE_SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.,!?;:])").unwrap());

static RE_EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Ratio of non-alphabetic to total non-whitespace characters at which a
/// line is presumed to be a table row, code, or other symbol noise.
const NON_NARRATIVE_RATIO: f64 = 0.5;

/// Stage 1: strip markup and decode common entities.
///
/// Tags are replaced with a space, never deleted, so adjacent words cannot
/// merge. Safe on input that contains no markup at all.
pub fn strip_markup(text: &str) -> String {
    let text = RE_SCRIPT.replace_all(text, "");
    let text = RE_STYLE.replace_all(&text, "");
    let mut text = RE_TAG.replace_all(&text, " ").into_owned();

    for (entity, literal) in ENTITIES {
        text = text.replace(entity, literal);
    }

    text
}

/// Stage 2: remove citations and footnote markers.
///
/// Covers parenthetical author-year citations, bracketed numeric and
/// single-letter markers, Unicode superscript runs, and `(see ...)` asides.
pub fn strip_citations(text: &str) -> String {
    let text = RE_AUTHOR_YEAR_CITATION.replace_all(text, "");
    let text = RE_NUMERIC_FOOTNOTE.replace_all(&text, "");
    let text = RE_LETTER_FOOTNOTE.replace_all(&text, "");
    let text = RE_SUPERSCRIPT_RUN.replace_all(&text, "");
    RE_SEE_REFERENCE.replace_all(&text, "").into_owned()
}

/// Stage 3: replace content that should not be read literally.
///
/// URLs and email addresses become spoken placeholders; titles and Latin
/// abbreviations expand to full words.
pub fn substitute_special(text: &str) -> String {
    let text = RE_URL.replace_all(text, " link ");
    let mut text = RE_EMAIL.replace_all(&text, " email address ").into_owned();

    for (pattern, full) in ABBREVIATIONS.iter() {
        text = pattern.replace_all(&text, *full).into_owned();
    }

    text
}

/// Stage 4: normalize punctuation for natural pauses.
///
/// Em-dashes (and the `--` ASCII fallback) become comma pauses; horizontal
/// whitespace collapses while newlines survive; missing spaces after
/// sentence-terminal punctuation and commas are inserted; whitespace before
/// punctuation is dropped.
pub fn normalize_punctuation(text: &str) -> String {
    let text = text.replace('\u{2014}', ", ").replace("--", ", ");
    let text = RE_HORIZONTAL_WS.replace_all(&text, " ");
    let text = RE_MISSING_SENTENCE_SPACE.replace_all(&text, "${1} ${2}");
    let text = RE_MISSING_COMMA_SPACE.replace_all(&text, ", ${1}");
    RE_SPACE_BEFORE_PUNCT.replace_all(&text, "${1}").into_owned()
}

/// Stage 5: drop lines that are mostly symbols or digits.
///
/// Table rows, code, and page furniture have a high ratio of non-alphabetic
/// characters; prose does not. Blank lines always pass through to preserve
/// paragraph breaks.
pub fn filter_non_narrative(text: &str) -> String {
    let kept: Vec<&str> = text
        .split('\n')
        .filter(|line| {
            let content: String = line.chars().filter(|c| !c.is_whitespace()).collect();
            if content.is_empty() {
                return true;
            }
            let non_alpha = content.chars().filter(|c| !c.is_ascii_alphabetic()).count();
            (non_alpha as f64 / content.chars().count() as f64) < NON_NARRATIVE_RATIO
        })
        .collect();

    kept.join("\n")
}

/// Apply all five stages in order, then trim and cap paragraph breaks.
///
/// Total function: empty input yields empty output, and input that is
/// already clean prose passes through unchanged.
pub fn clean(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = strip_markup(raw);
    let text = strip_citations(&text);
    let text = substitute_special(&text);
    let text = normalize_punctuation(&text);
    let text = filter_non_narrative(&text);

    RE_EXCESS_NEWLINES
        .replace_all(text.trim(), "\n\n")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_citation_stripping() {
        assert_eq!(clean("The result (Smith, 2020) held."), "The result held.");
        assert_eq!(
            clean("Prior work (Jones et al., 2019a) agrees."),
            "Prior work agrees."
        );
    }

    #[test]
    fn test_footnote_markers_removed() {
        assert_eq!(clean("A fact[1] and another[a]."), "A fact and another.");
        assert_eq!(clean("Noted\u{00B9}\u{00B2} here."), "Noted here.");
    }

    #[test]
    fn test_see_reference_removed() {
        assert_eq!(clean("It rains (see Figure 3) often."), "It rains often.");
    }

    #[test]
    fn test_abbreviation_expansion() {
        let out = clean("Dr. Smith met Mrs. Jones.");
        assert!(out.contains("Doctor Smith"));
        assert!(out.contains("Misses Jones"));
        assert!(!out.contains("Dr."));
        assert!(!out.contains("Mrs."));
    }

    #[test]
    fn test_latin_abbreviations() {
        let out = clean("Fruit, e.g. apples, ripen fast, i.e. quickly.");
        assert!(out.contains("for example"));
        assert!(out.contains("that is"));
    }

    #[test]
    fn test_url_and_email_placeholders() {
        assert_eq!(clean("Visit https://example.com/page now."), "Visit link now.");
        assert_eq!(clean("Write to someone@example.com now."), "Write to email address now.");
    }

    #[test]
    fn test_entities_decoded() {
        let out = clean("Fish &amp; chips&nbsp;&mdash;&nbsp;classic.");
        // The decoded em-dash then becomes a comma pause.
        assert_eq!(out, "Fish & chips, classic.");
    }

    #[test]
    fn test_em_dash_becomes_pause() {
        assert_eq!(
            clean("He said\u{2014}without thinking\u{2014}yes."),
            "He said, without thinking, yes."
        );
        assert_eq!(clean("He said--maybe--no."), "He said, maybe, no.");
    }

    #[test]
    fn test_missing_sentence_space_inserted() {
        assert_eq!(clean("Hello.World"), "Hello. World");
    }

    #[test]
    fn test_missing_comma_space_inserted() {
        assert_eq!(clean("one,two"), "one, two");
        // Numbers keep their grouping commas.
        assert_eq!(clean("It cost 1,200 dollars"), "It cost 1,200 dollars");
    }

    #[test]
    fn test_space_before_punctuation_removed() {
        assert_eq!(clean("Wait , what ?"), "Wait, what?");
    }

    #[test]
    fn test_symbol_dense_lines_dropped() {
        let input = "Real prose stays here.\n| 12 | 34 | 56 |\nMore prose survives.";
        let out = clean(input);
        assert!(out.contains("Real prose stays here."));
        assert!(out.contains("More prose survives."));
        assert!(!out.contains("12"));
    }

    #[test]
    fn test_blank_lines_preserved() {
        let out = clean("First paragraph.\n\nSecond paragraph.");
        assert_eq!(out, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn test_excess_newlines_capped() {
        let out = clean("One.\n\n\n\nTwo.");
        assert_eq!(out, "One.\n\nTwo.");
    }

    #[test]
    fn test_idempotent_on_clean_prose() {
        let text = "A quiet morning. The harbor lay still, and the boats waited.\n\nNothing moved until noon.";
        let once = clean(text);
        assert_eq!(clean(&once), once);
        assert_eq!(once, text);
    }

    #[test]
    fn test_tags_stripped_with_spacing() {
        let out = clean("<p>Hello <em>world</em>.</p>");
        assert_eq!(out, "Hello world.");
    }
}
