//! Exclusion signals for standard-book scoring.
//!
//! Each signal inspects one aspect of a fragment (semantic annotation, title
//! and filename patterns, content shape) and reports whether it argues for
//! exclusion, with what confidence, and why. Signals are independent; the
//! caller combines them with the weights below.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::book::SemanticMap;

use super::ClassifierConfig;

/// Per-signal weights applied when summing the exclusion score.
pub(crate) const SEMANTIC_WEIGHT: f32 = 1.0;
pub(crate) const PATTERN_WEIGHT: f32 = 0.7;
pub(crate) const CONTENT_WEIGHT: f32 = 0.5;

/// Weighted exclusion scores above this threshold exclude the fragment.
pub(crate) const EXCLUDE_THRESHOLD: f32 = 0.6;

/// Outcome of one signal check.
pub(crate) struct Signal {
    pub exclude: bool,
    pub reason: Option<String>,
    pub confidence: f32,
}

impl Signal {
    fn none() -> Self {
        Self {
            exclude: false,
            reason: None,
            confidence: 0.0,
        }
    }

    fn exclude(reason: String, confidence: f32) -> Self {
        Self {
            exclude: true,
            reason: Some(reason),
            confidence,
        }
    }

    fn include(reason: String, confidence: f32) -> Self {
        Self {
            exclude: false,
            reason: Some(reason),
            confidence,
        }
    }
}

/// Semantic types that are never narrated.
const SEMANTIC_EXCLUDE_TYPES: &[&str] = &[
    "toc",
    "loi",
    "lot",
    "index",
    "glossary",
    "bibliography",
    "copyright-page",
    "colophon",
    "cover",
    "titlepage",
];

/// Semantic types that usually precede the narrative; excluded with reduced
/// confidence so other signals can still tip the balance.
const SEMANTIC_BORDERLINE_TYPES: &[&str] = &[
    "dedication",
    "acknowledgements",
    "preface",
    "foreword",
    "epigraph",
];

/// Semantic types that are always narrative body matter.
const SEMANTIC_INCLUDE_TYPES: &[&str] = &["text", "bodymatter", "chapter"];

const SEMANTIC_EXCLUDE_CONFIDENCE: f32 = 1.0;
const SEMANTIC_INCLUDE_CONFIDENCE: f32 = 1.0;
const SEMANTIC_BORDERLINE_CONFIDENCE: f32 = 0.7;

/// Title patterns for boilerplate sections, checked in order.
static TITLE_EXCLUDE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Legal/Copyright
        r"(?i)copyright",
        r"(?i)all rights reserved",
        r"(?i)published by",
        r"(?i)isbn",
        r"(?i)colophon",
        r"(?i)imprint",
        // Navigation
        r"(?i)table of contents",
        r"(?i)^contents$",
        r"(?i)^toc$",
        r"(?i)list of (illustrations|figures|tables|maps)",
        // Front matter
        r"(?i)^dedication$",
        r"(?i)^acknowledgements?$",
        r"(?i)^preface$",
        r"(?i)^foreword$",
        r"(?i)^prologue$",
        r"(?i)^introduction$",
        r"(?i)about (the author|this book)",
        r"(?i)author'?s? notes?",
        // Back matter
        r"(?i)^appendix",
        r"(?i)^glossary$",
        r"(?i)^bibliography$",
        r"(?i)^references$",
        r"(?i)^works cited$",
        r"(?i)^endnotes?$",
        r"(?i)^index$",
        r"(?i)about the publisher",
        r"(?i)also by",
        r"(?i)other (books|titles)",
        r"(?i)coming soon",
        r"(?i)^preview$",
        r"(?i)excerpt from",
        // Visual content
        r"(?i)^maps?$",
        r"(?i)^illustrations?$",
        r"(?i)^diagrams?$",
        r"(?i)^charts?$",
        r"(?i)family tree",
        r"(?i)character list",
        // Academic
        r"(?i)^abstract$",
        r"(?i)^keywords?$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Filename conventions for non-narrative documents.
static FILENAME_EXCLUDE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)cover\.(xhtml|html)",
        r"(?i)title(page)?\.(xhtml|html)",
        r"(?i)copyright\.(xhtml|html)",
        r"(?i)toc\.(xhtml|html)",
        r"(?i)frontmatter\.(xhtml|html)",
        r"(?i)backmatter\.(xhtml|html)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const TITLE_PATTERN_CONFIDENCE: f32 = 0.9;
const FILENAME_PATTERN_CONFIDENCE: f32 = 0.85;

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_HYPERLINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<a\s+[^>]*href").unwrap());

static COPYRIGHT_INDICATORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)copyright\s*\u{00A9}", r"(?i)all rights reserved"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

const TOO_SHORT_CONFIDENCE: f32 = 0.8;
const LINK_DENSITY_CONFIDENCE: f32 = 0.85;
const COPYRIGHT_NOTICE_CONFIDENCE: f32 = 0.9;

/// Look the fragment path up in the semantic map (exact, then basename) and
/// translate the annotation through the closed vocabularies.
pub(crate) fn check_semantic_type(path: &str, semantics: &SemanticMap) -> Signal {
    let Some(semantic_type) = semantics.lookup(path) else {
        return Signal::none();
    };

    if SEMANTIC_EXCLUDE_TYPES.contains(&semantic_type) {
        return Signal::exclude(
            format!("Semantic type: {semantic_type}"),
            SEMANTIC_EXCLUDE_CONFIDENCE,
        );
    }
    if SEMANTIC_INCLUDE_TYPES.contains(&semantic_type) {
        return Signal::include(
            format!("Semantic type: {semantic_type}"),
            SEMANTIC_INCLUDE_CONFIDENCE,
        );
    }
    if SEMANTIC_BORDERLINE_TYPES.contains(&semantic_type) {
        return Signal::exclude(
            format!("Borderline: {semantic_type}"),
            SEMANTIC_BORDERLINE_CONFIDENCE,
        );
    }

    // Unknown tags carry no signal.
    Signal::none()
}

/// Test the title, then the filename, against the boilerplate pattern tables.
/// First match wins.
pub(crate) fn check_patterns(title: &str, path: &str) -> Signal {
    for pattern in TITLE_EXCLUDE_PATTERNS.iter() {
        if pattern.is_match(title) {
            return Signal::exclude(
                format!("Title matches: {}", pattern.as_str()),
                TITLE_PATTERN_CONFIDENCE,
            );
        }
    }
    for pattern in FILENAME_EXCLUDE_PATTERNS.iter() {
        if pattern.is_match(path) {
            return Signal::exclude(
                format!("Filename matches: {}", pattern.as_str()),
                FILENAME_PATTERN_CONFIDENCE,
            );
        }
    }
    Signal::none()
}

/// Content-shape heuristics: very short sections, link farms, and copyright
/// notices read poorly as narration.
pub(crate) fn analyze_content(raw: &str, config: &ClassifierConfig) -> Signal {
    let plain = RE_TAG.replace_all(raw, " ");
    let word_count = plain.split_whitespace().count();

    if word_count < config.min_words {
        return Signal::exclude(format!("Too short: {word_count} words"), TOO_SHORT_CONFIDENCE);
    }

    let link_count = RE_HYPERLINK.find_iter(raw).count();
    if link_count as f32 / word_count as f32 > config.max_link_ratio {
        return Signal::exclude("High link density".to_string(), LINK_DENSITY_CONFIDENCE);
    }

    for pattern in COPYRIGHT_INDICATORS.iter() {
        if pattern.is_match(&plain) {
            return Signal::exclude("Copyright notice".to_string(), COPYRIGHT_NOTICE_CONFIDENCE);
        }
    }

    Signal::none()
}
