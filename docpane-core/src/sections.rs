//! Splitting documents into navigable sections at a breaking-point heading

use anyhow::{bail, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::heading::{FenceTracker, HeadingRecord, HeadingScanner};
use crate::mdx::{self, ExportBlock, ImportStatement};
use crate::reconstruct::build_section_mdx;
use crate::slug::slugify;

pub const INTRODUCTION_SLUG: &str = "introduction";
pub const INTRODUCTION_TITLE: &str = "Introduction";
pub const PLACEHOLDER_SLUG: &str = "content";
pub const PLACEHOLDER_TITLE: &str = "Content";

/// Heading level at which documents are partitioned into pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakingPoint {
    H1,
    #[default]
    H2,
    H3,
    H4,
}

impl BreakingPoint {
    pub fn level(self) -> u8 {
        match self {
            BreakingPoint::H1 => 1,
            BreakingPoint::H2 => 2,
            BreakingPoint::H3 => 3,
            BreakingPoint::H4 => 4,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            BreakingPoint::H1 => "h1",
            BreakingPoint::H2 => "h2",
            BreakingPoint::H3 => "h3",
            BreakingPoint::H4 => "h4",
        }
    }
}

impl fmt::Display for BreakingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakingPoint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h1" => Ok(BreakingPoint::H1),
            "h2" => Ok(BreakingPoint::H2),
            "h3" => Ok(BreakingPoint::H3),
            "h4" => Ok(BreakingPoint::H4),
            other => bail!("Invalid breaking point `{other}`: expected one of h1, h2, h3, h4"),
        }
    }
}

impl TryFrom<u8> for BreakingPoint {
    type Error = anyhow::Error;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            1 => Ok(BreakingPoint::H1),
            2 => Ok(BreakingPoint::H2),
            3 => Ok(BreakingPoint::H3),
            4 => Ok(BreakingPoint::H4),
            other => bail!("Invalid break level {other}: expected 1 to 4"),
        }
    }
}

/// A navigable page of a document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentSection {
    pub slug: String,
    pub title: String,
    pub level: u8,
    pub body: String,
    /// Headings deeper than the break level, in source order
    pub subsections: Vec<HeadingRecord>,
}

impl ContentSection {
    fn placeholder() -> Self {
        Self {
            slug: PLACEHOLDER_SLUG.to_string(),
            title: PLACEHOLDER_TITLE.to_string(),
            level: 1,
            body: String::new(),
            subsections: Vec::new(),
        }
    }

    pub fn is_introduction(&self) -> bool {
        self.slug == INTRODUCTION_SLUG
    }

    /// Identifiers for this section's subsections, unique within one render
    /// pass over a document set
    pub fn subsection_ids(&self, document_index: usize, section_index: usize) -> Vec<String> {
        self.subsections
            .iter()
            .enumerate()
            .map(|(heading_index, heading)| {
                subsection_id(&heading.slug, document_index, section_index, heading_index)
            })
            .collect()
    }
}

/// Deterministic subsection identifier
pub fn subsection_id(
    slug: &str,
    document_index: usize,
    section_index: usize,
    heading_index: usize,
) -> String {
    format!("{slug}-{document_index}-{section_index}-{heading_index}")
}

/// Result of parsing an MDX source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedMdx {
    pub imports: Vec<ImportStatement>,
    pub exports: Vec<ExportBlock>,
    /// Sections of the prose with statements removed; bodies are not
    /// reconstructed
    pub sections: Vec<ContentSection>,
}

/// Split `raw_content` into sections at `breaking_point`.
///
/// Never returns an empty vector. For component sources every section body is
/// the full reconstructed MDX source (shared imports and exports prepended).
pub fn split_content_by_sections(
    raw_content: &str,
    breaking_point: BreakingPoint,
    is_component_source: bool,
) -> Vec<ContentSection> {
    if !is_component_source {
        return split_markdown(raw_content, breaking_point.level());
    }

    let parsed = parse_mdx(raw_content, breaking_point);
    parsed
        .sections
        .into_iter()
        .map(|mut section| {
            section.body =
                build_section_mdx(&section, &parsed.imports, &parsed.exports).full_source;
            section
        })
        .collect()
}

/// Headings at exactly the break level, in source order
pub fn get_main_navigation(raw_content: &str, breaking_point: BreakingPoint) -> Vec<HeadingRecord> {
    let break_level = breaking_point.level();
    HeadingScanner::new(raw_content)
        .filter(|&(_, level, _)| level == break_level)
        .map(|(line, level, title)| HeadingRecord::new(level, title, line))
        .collect()
}

/// Split the prose of an MDX source, leaving section bodies bare
pub fn split_into_sections(
    raw_content: &str,
    breaking_point: BreakingPoint,
) -> Vec<ContentSection> {
    split_markdown(&mdx::strip_statements(raw_content), breaking_point.level())
}

/// Extract statements and split the prose of an MDX source
pub fn parse_mdx(raw_content: &str, breaking_point: BreakingPoint) -> ParsedMdx {
    let imports = mdx::extract_imports(raw_content);
    let exports = mdx::extract_exports(raw_content);
    let sections = split_into_sections(raw_content, breaking_point);
    debug!(
        "parsed mdx: {} imports, {} exports, {} sections",
        imports.len(),
        exports.len(),
        sections.len()
    );

    ParsedMdx {
        imports,
        exports,
        sections,
    }
}

/// Section accumulating lines
struct OpenSection<'a> {
    title: &'a str,
    lines: Vec<&'a str>,
}

fn split_markdown(content: &str, break_level: u8) -> Vec<ContentSection> {
    if content.trim().is_empty() {
        return vec![ContentSection::placeholder()];
    }

    let mut intro_lines: Vec<&str> = Vec::new();
    let mut sections = Vec::new();
    let mut current: Option<OpenSection<'_>> = None;
    let mut fences = FenceTracker::default();

    for line in content.split('\n') {
        if let Some((level, title)) = fences.heading(line) {
            if level == break_level {
                if let Some(open) = current.take() {
                    sections.push(finish_section(open, break_level));
                }
                // A blank lead-in belongs to the first section
                let mut lines = Vec::new();
                if sections.is_empty() && intro_lines.iter().all(|l| l.trim().is_empty()) {
                    lines.append(&mut intro_lines);
                }
                lines.push(line);
                current = Some(OpenSection { title, lines });
                continue;
            }
        }

        match current.as_mut() {
            Some(open) => open.lines.push(line),
            None => intro_lines.push(line),
        }
    }

    if let Some(open) = current.take() {
        sections.push(finish_section(open, break_level));
    }

    let intro_body = intro_lines.join("\n");
    if !intro_body.trim().is_empty() {
        sections.insert(0, introduction_section(intro_body, break_level));
    }

    debug!("split {} sections at level {}", sections.len(), break_level);
    sections
}

fn finish_section(open: OpenSection<'_>, break_level: u8) -> ContentSection {
    let body = open.lines.join("\n");
    let subsections = subsections_of(&body, break_level);

    ContentSection {
        slug: slugify(open.title),
        title: open.title.to_string(),
        level: break_level,
        body,
        subsections,
    }
}

fn introduction_section(body: String, break_level: u8) -> ContentSection {
    let title = HeadingScanner::new(&body)
        .find(|&(_, level, _)| level == 1)
        .map(|(_, _, title)| title.to_string())
        .unwrap_or_else(|| INTRODUCTION_TITLE.to_string());
    let subsections = subsections_of(&body, break_level);

    ContentSection {
        slug: INTRODUCTION_SLUG.to_string(),
        title,
        level: 1,
        body,
        subsections,
    }
}

fn subsections_of(body: &str, break_level: u8) -> Vec<HeadingRecord> {
    HeadingScanner::new(body)
        .filter(|&(_, level, _)| level > break_level)
        .map(|(line, level, title)| HeadingRecord::new(level, title, line))
        .collect()
}
