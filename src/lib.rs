//! # narro
//!
//! A library for turning EPUB files into narration-ready text.
//!
//! narro does three things:
//!
//! - Parses the zip container, package document, and navigation metadata
//!   into an ordered sequence of content [`Fragment`]s with resolved titles
//!   and a semantic map of structural annotations.
//! - Classifies each fragment as narrative or boilerplate (covers, tables of
//!   contents, copyright pages) using semantic, pattern, and content signals.
//! - Normalizes extracted text for clean speech synthesis: entity decoding,
//!   citation stripping, abbreviation expansion, punctuation normalization,
//!   and symbol-dense line filtering.
//!
//! ## Quick Start
//!
//! ```no_run
//! use narro::{classify, clean, read_epub};
//!
//! let book = read_epub("input.epub")?;
//! let verdicts = classify(&book);
//!
//! for (fragment, verdict) in book.fragments.iter().zip(&verdicts) {
//!     if verdict.include {
//!         let narration = clean(&fragment.plain);
//!         println!("{}: {} chars", fragment.title, narration.len());
//!     }
//! }
//! # Ok::<(), narro::Error>(())
//! ```
//!
//! Classification is advisory: every fragment gets a verdict, and callers
//! decide whether to honor it.

pub mod book;
pub mod classify;
pub mod clean;
pub mod epub;
pub mod error;
pub mod narrate;
pub mod select;
pub(crate) mod util;

pub use book::{Book, Fragment, SemanticMap};
pub use classify::{
    ClassificationResult, ClassifierConfig, DocumentKind, classify, classify_with, detect_kind,
};
pub use clean::clean;
pub use epub::{read_epub, read_epub_from_reader};
pub use error::{Error, Result};
pub use select::parse_selection;
