//! Heuristic classification of fragments into narrative and boilerplate.
//!
//! The classifier is advisory: it annotates every fragment with an
//! include/exclude verdict and never gates anything itself. Callers decide
//! what to do with the verdicts (the CLI just prints them).

mod signals;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::book::{Book, Fragment, SemanticMap};
use signals::{
    CONTENT_WEIGHT, EXCLUDE_THRESHOLD, PATTERN_WEIGHT, SEMANTIC_WEIGHT, Signal, analyze_content,
    check_patterns, check_semantic_type,
};

/// Per-fragment verdict. Recomputable: classification is a pure function of
/// the book and the configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ClassificationResult {
    /// Whether the fragment should become narrated audio.
    pub include: bool,
    /// Confidence of the strongest individual signal (not the weighted sum).
    pub confidence: f32,
    /// Reason from the strongest signal, when the fragment is excluded.
    pub reason: Option<String>,
}

/// Detected document shape, checked in fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Paper-like structure: abstract/methods/results section titles.
    Academic,
    /// Serialized fiction with metadata sections (story notes, tags).
    Serial,
    /// Everything else: multi-signal scoring applies.
    Standard,
}

/// Tunable content-heuristic thresholds. The defaults mirror the shipped
/// behavior; they are heuristics, not validated optima.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Fragments with fewer words than this are presumed non-narrative.
    pub min_words: usize,
    /// Hyperlinks-per-word ratio above which a fragment reads as navigation.
    pub max_link_ratio: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_words: 100,
            max_link_ratio: 0.1,
        }
    }
}

/// How many paper-section titles mark a document as academic.
const ACADEMIC_SECTION_MINIMUM: usize = 4;

/// Fragments this early in reading order get first-chapter protection.
const FIRST_CHAPTER_WINDOW: usize = 6;

/// A signal at or above this confidence overrides first-chapter protection.
const FIRST_CHAPTER_OVERRIDE_CONFIDENCE: f32 = 0.95;

static RE_ACADEMIC_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)abstract|introduction|methods|results|discussion|conclusion|references")
        .unwrap()
});
static RE_ACADEMIC_INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)abstract|introduction|methods|results|discussion|conclusion").unwrap()
});
static RE_ACADEMIC_EXCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)references|bibliography|appendix").unwrap());

static RE_SERIAL_METADATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)story\s*notes|tags|relationships|fandom").unwrap());
static RE_SERIAL_EXCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)story notes|summary|tags|relationships").unwrap());
static RE_SERIAL_CHAPTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)chapter\s+\d+").unwrap());

static RE_FIRST_CHAPTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)chapter\s*1").unwrap());

const KIND_RULE_CONFIDENCE: f32 = 0.9;

/// Classify every fragment of `book` with the default configuration.
///
/// Pure and deterministic: identical books yield identical result sequences.
pub fn classify(book: &Book) -> Vec<ClassificationResult> {
    classify_with(book, &ClassifierConfig::default())
}

/// Classify every fragment of `book` with explicit thresholds.
pub fn classify_with(book: &Book, config: &ClassifierConfig) -> Vec<ClassificationResult> {
    match detect_kind(book) {
        DocumentKind::Academic => book.fragments.iter().map(|f| academic_rule(&f.title)).collect(),
        DocumentKind::Serial => book.fragments.iter().map(|f| serial_rule(&f.title)).collect(),
        DocumentKind::Standard => book
            .fragments
            .iter()
            .enumerate()
            .map(|(index, fragment)| score_fragment(index, fragment, &book.semantics, config))
            .collect(),
    }
}

/// Detect the document shape. First matching kind wins.
pub fn detect_kind(book: &Book) -> DocumentKind {
    let academic_titles = book
        .fragments
        .iter()
        .filter(|f| RE_ACADEMIC_SECTION.is_match(&f.title))
        .count();
    if academic_titles >= ACADEMIC_SECTION_MINIMUM {
        return DocumentKind::Academic;
    }

    if book
        .fragments
        .iter()
        .any(|f| RE_SERIAL_METADATA.is_match(&f.title))
    {
        return DocumentKind::Serial;
    }

    DocumentKind::Standard
}

/// Academic papers use a plain allow-list: narrate the canonical sections,
/// drop references/bibliography/appendix, keep anything unrecognized.
fn academic_rule(title: &str) -> ClassificationResult {
    let include = RE_ACADEMIC_INCLUDE.is_match(title);
    let exclude = RE_ACADEMIC_EXCLUDE.is_match(title);
    let verdict = include || !exclude;

    ClassificationResult {
        include: verdict,
        confidence: KIND_RULE_CONFIDENCE,
        reason: (!verdict).then(|| "Academic back matter".to_string()),
    }
}

/// Serialized fiction: narrate numbered chapters, drop the metadata sections.
fn serial_rule(title: &str) -> ClassificationResult {
    let is_chapter = RE_SERIAL_CHAPTER.is_match(title);
    let exclude = RE_SERIAL_EXCLUDE.is_match(title);
    let verdict = is_chapter || !exclude;

    ClassificationResult {
        include: verdict,
        confidence: KIND_RULE_CONFIDENCE,
        reason: (!verdict).then(|| "Serial metadata".to_string()),
    }
}

fn score_fragment(
    index: usize,
    fragment: &Fragment,
    semantics: &SemanticMap,
    config: &ClassifierConfig,
) -> ClassificationResult {
    let checks: [(Signal, f32); 3] = [
        (check_semantic_type(&fragment.path, semantics), SEMANTIC_WEIGHT),
        (
            check_patterns(&fragment.title, &fragment.path),
            PATTERN_WEIGHT,
        ),
        (analyze_content(&fragment.raw, config), CONTENT_WEIGHT),
    ];

    let mut exclude_score = 0.0f32;
    let mut max_confidence = 0.0f32;
    let mut primary_reason: Option<String> = None;

    for (signal, weight) in checks {
        if signal.exclude {
            exclude_score += signal.confidence * weight;
            if signal.confidence > max_confidence {
                max_confidence = signal.confidence;
                primary_reason = signal.reason;
            }
        }
    }

    let should_exclude = exclude_score > EXCLUDE_THRESHOLD;

    // The canonical opening chapter is protected from weak-heuristic false
    // positives: only a near-certain signal may exclude it.
    let is_likely_first_chapter =
        index < FIRST_CHAPTER_WINDOW && RE_FIRST_CHAPTER.is_match(&fragment.title);
    if is_likely_first_chapter && max_confidence < FIRST_CHAPTER_OVERRIDE_CONFIDENCE {
        return ClassificationResult {
            include: true,
            confidence: 0.0,
            reason: None,
        };
    }

    ClassificationResult {
        include: !should_exclude,
        confidence: max_confidence,
        reason: should_exclude.then_some(primary_reason).flatten(),
    }
}
