//! Loaded documents

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::front_matter;
use crate::heading::HeadingScanner;
use crate::slug::slugify;

/// A loaded Markdown or MDX file; immutable once created
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub slug: String,
    pub title: String,
    pub raw_content: String,
    /// MDX with import/export statements
    pub is_component_source: bool,
}

impl Document {
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        raw_content: impl Into<String>,
        is_component_source: bool,
    ) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            raw_content: raw_content.into(),
            is_component_source,
        }
    }

    /// Load a document from a file path.
    ///
    /// The slug comes from the file stem and `.mdx` files are component
    /// sources. The title is the front matter `title`, else the first H1,
    /// else the file stem.
    pub fn load(path: &Path) -> Result<Self> {
        let raw_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let is_component_source = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mdx"));
        let title = derive_title(&raw_content).unwrap_or_else(|| stem.clone());

        Ok(Self {
            slug: slugify(&stem),
            title,
            raw_content,
            is_component_source,
        })
    }

    /// Load several documents, preserving order
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Self>> {
        paths.iter().map(|p| Self::load(p.as_ref())).collect()
    }

    pub fn line_count(&self) -> usize {
        self.raw_content.lines().count()
    }
}

fn derive_title(content: &str) -> Option<String> {
    if let Some(title) = front_matter::detect_front_matter(content).and_then(|fm| fm.title()) {
        return Some(title);
    }

    HeadingScanner::new(content)
        .find(|&(_, level, _)| level == 1)
        .map(|(_, _, title)| title.to_string())
}
