//! Front matter detection and parsing.
//!
//! `---` blocks are parsed as YAML and `+++` blocks as TOML. Only the fields
//! docpane uses are deserialized; unknown keys are ignored.

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::fmt;

/// Types of front matter markers that docpane recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterKind {
    Yaml,
    Toml,
}

impl FrontMatterKind {
    fn as_str(&self) -> &'static str {
        match self {
            FrontMatterKind::Yaml => "yaml",
            FrontMatterKind::Toml => "toml",
        }
    }

    fn marker(&self) -> &'static str {
        match self {
            FrontMatterKind::Yaml => "---",
            FrontMatterKind::Toml => "+++",
        }
    }
}

impl fmt::Display for FrontMatterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Front matter fields docpane reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrontMatterFields {
    pub title: Option<String>,
}

/// A front matter block at the top of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    pub kind: FrontMatterKind,
    pub start_line: usize,
    pub end_line: usize,
    /// Lines between the markers
    pub body: Vec<&'a str>,
}

impl FrontMatter<'_> {
    /// Inclusive range of line numbers covered by the front matter block.
    pub fn line_range(&self) -> std::ops::RangeInclusive<usize> {
        self.start_line..=self.end_line
    }

    /// Deserialize the block with the parser matching its marker
    pub fn fields(&self) -> Result<FrontMatterFields> {
        let source = self.body.join("\n");
        if source.trim().is_empty() {
            return Ok(FrontMatterFields::default());
        }

        match self.kind {
            FrontMatterKind::Yaml => {
                serde_yaml::from_str(&source).context("Invalid YAML front matter")
            }
            FrontMatterKind::Toml => toml::from_str(&source).context("Invalid TOML front matter"),
        }
    }

    /// The `title` field; malformed front matter is logged and yields `None`
    pub fn title(&self) -> Option<String> {
        match self.fields() {
            Ok(fields) => fields.title,
            Err(err) => {
                warn!("ignoring {} front matter: {err:#}", self.kind);
                None
            }
        }
    }
}

/// Detects front matter at the top of a document.
pub fn detect_front_matter(text: &str) -> Option<FrontMatter<'_>> {
    let mut lines = text.lines();
    let first = normalize_line(lines.next()?);

    let kind = [FrontMatterKind::Yaml, FrontMatterKind::Toml]
        .into_iter()
        .find(|kind| first == kind.marker())?;

    let mut body = Vec::new();
    for (idx, line) in lines.enumerate() {
        if normalize_line(line) == kind.marker() {
            return Some(FrontMatter {
                kind,
                start_line: 0,
                end_line: idx + 1,
                body,
            });
        }
        body.push(line);
    }

    None
}

fn normalize_line(line: &str) -> &str {
    line.trim().trim_start_matches('\u{feff}')
}
