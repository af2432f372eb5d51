//! Per-section search records

use log::debug;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::doc::Document;
use crate::heading::FenceTracker;
use crate::sections::INTRODUCTION_SLUG;
use crate::slug::slugify;

/// One searchable section of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub document_slug: String,
    pub section_slug: String,
    pub section_title: String,
    pub section_level: u8,
    pub section_body: String,
    /// `title + " " + body`
    pub searchable_text: String,
}

impl SearchRecord {
    fn new(document_slug: &str, slug: String, title: String, level: u8, body: String) -> Self {
        let searchable_text = format!("{title} {body}");
        Self {
            document_slug: document_slug.to_string(),
            section_slug: slug,
            section_title: title,
            section_level: level,
            section_body: body,
            searchable_text,
        }
    }
}

/// Records for every section of a document set.
///
/// Sections here end at the next heading of any level, independent of the
/// navigation breaking point.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    records: Vec<SearchRecord>,
    fingerprint: u64,
}

impl SearchIndex {
    /// Index `documents` in order, each in source order
    pub fn build(documents: &[Document]) -> Self {
        let records: Vec<SearchRecord> = documents.iter().flat_map(index_document).collect();
        debug!(
            "indexed {} sections from {} documents",
            records.len(),
            documents.len()
        );

        Self {
            records,
            fingerprint: fingerprint(documents),
        }
    }

    pub fn records(&self) -> &[SearchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `documents` differs from the set this index was built from
    pub fn is_stale(&self, documents: &[Document]) -> bool {
        self.fingerprint != fingerprint(documents)
    }
}

fn fingerprint(documents: &[Document]) -> u64 {
    let mut hasher = DefaultHasher::new();
    documents.len().hash(&mut hasher);
    for doc in documents {
        doc.slug.hash(&mut hasher);
        doc.title.hash(&mut hasher);
        doc.raw_content.hash(&mut hasher);
    }
    hasher.finish()
}

/// Section being accumulated
struct OpenRecord<'a> {
    slug: String,
    title: String,
    level: u8,
    lines: Vec<&'a str>,
}

impl OpenRecord<'_> {
    fn finish(self, document_slug: &str) -> SearchRecord {
        let body = self.lines.join("\n").trim().to_string();
        SearchRecord::new(document_slug, self.slug, self.title, self.level, body)
    }
}

fn index_document(doc: &Document) -> Vec<SearchRecord> {
    let mut records = Vec::new();
    let mut fences = FenceTracker::default();
    let mut current = OpenRecord {
        slug: INTRODUCTION_SLUG.to_string(),
        title: doc.title.clone(),
        level: 1,
        lines: Vec::new(),
    };
    let mut in_lead_in = true;

    for line in doc.raw_content.lines() {
        let Some((level, title)) = fences.heading(line) else {
            current.lines.push(line);
            continue;
        };

        let next = OpenRecord {
            slug: slugify(title),
            title: title.to_string(),
            level,
            lines: Vec::new(),
        };
        let finished = std::mem::replace(&mut current, next);
        if !in_lead_in || finished.lines.iter().any(|l| !l.trim().is_empty()) {
            records.push(finished.finish(&doc.slug));
        }
        in_lead_in = false;
    }

    if !in_lead_in || current.lines.iter().any(|l| !l.trim().is_empty()) {
        records.push(current.finish(&doc.slug));
    }

    records
}
