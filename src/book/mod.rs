use std::collections::HashMap;

/// A parsed book: metadata plus the spine-ordered content fragments.
/// The unit passed between the reader, the classifier, and exporters.
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub fragments: Vec<Fragment>,
    pub semantics: SemanticMap,
}

/// One spine-ordered content unit (a chapter, page, or section).
///
/// Immutable once constructed: the reader builds fragments during archive
/// traversal and downstream passes only read them.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Resolved display title (navigation label, heading, `<title>`, or a
    /// synthesized "Section N" placeholder).
    pub title: String,
    /// Manifest-relative path, used as the classification key.
    pub path: String,
    /// Original markup as stored in the archive.
    pub raw: String,
    /// HTML-stripped, newline-normalized text.
    pub plain: String,
}

/// Path -> semantic-type annotations merged from OPF guide references and
/// EPUB 3 landmark navigation entries.
///
/// Each reference is indexed under its anchor-stripped href and, separately,
/// under its basename; lookups try the exact path first, then the basename.
#[derive(Debug, Clone, Default)]
pub struct SemanticMap {
    entries: HashMap<String, String>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fragment {
    pub fn new(
        title: impl Into<String>,
        path: impl Into<String>,
        raw: impl Into<String>,
        plain: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            raw: raw.into(),
            plain: plain.into(),
        }
    }
}

impl SemanticMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a guide/landmark reference. The target href is normalized by
    /// stripping any in-document `#anchor`; the basename is indexed as well so
    /// fragments keyed by bare filename still match.
    pub fn insert_reference(&mut self, href: &str, semantic_type: impl Into<String>) {
        let semantic_type = semantic_type.into();
        let target = href.split('#').next().unwrap_or(href);
        if target.is_empty() {
            return;
        }
        self.entries
            .insert(target.to_string(), semantic_type.clone());
        if let Some(basename) = target.rsplit('/').next()
            && basename != target
        {
            self.entries.insert(basename.to_string(), semantic_type);
        }
    }

    /// Look up the semantic type for a content path: exact match first, then
    /// the path's basename.
    pub fn lookup(&self, path: &str) -> Option<&str> {
        if let Some(t) = self.entries.get(path) {
            return Some(t.as_str());
        }
        let basename = path.rsplit('/').next().unwrap_or(path);
        self.entries.get(basename).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
