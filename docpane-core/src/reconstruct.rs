//! Rebuilding self-contained MDX sources for each section

use crate::mdx::{ExportBlock, ImportStatement};
use crate::sections::{parse_mdx, BreakingPoint, ContentSection};

/// A section whose source repeats the full import/export preamble
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconstructedSection {
    pub slug: String,
    pub title: String,
    pub level: u8,
    pub full_source: String,
}

/// Prepend every import line and export block to the section body.
///
/// Layout: imports (one per line), blank line, export blocks separated by
/// blank lines, blank line, body. Blank lines are omitted for empty groups.
pub fn build_section_mdx(
    section: &ContentSection,
    imports: &[ImportStatement],
    exports: &[ExportBlock],
) -> ReconstructedSection {
    let mut full_source = String::new();

    if !imports.is_empty() {
        for import in imports {
            full_source.push_str(&import.text);
            full_source.push('\n');
        }
        full_source.push('\n');
    }

    if !exports.is_empty() {
        let blocks: Vec<&str> = exports.iter().map(|e| e.text.as_str()).collect();
        full_source.push_str(&blocks.join("\n\n"));
        full_source.push_str("\n\n");
    }

    full_source.push_str(&section.body);

    ReconstructedSection {
        slug: section.slug.clone(),
        title: section.title.clone(),
        level: section.level,
        full_source,
    }
}

/// Reconstruct every section of an MDX source
pub fn build_all_sections(
    raw_content: &str,
    breaking_point: BreakingPoint,
) -> Vec<ReconstructedSection> {
    let parsed = parse_mdx(raw_content, breaking_point);
    parsed
        .sections
        .iter()
        .map(|section| build_section_mdx(section, &parsed.imports, &parsed.exports))
        .collect()
}

/// Reconstruct the introduction section, if the source has one
pub fn build_intro_section(
    raw_content: &str,
    breaking_point: BreakingPoint,
) -> Option<ReconstructedSection> {
    let parsed = parse_mdx(raw_content, breaking_point);
    parsed
        .sections
        .iter()
        .find(|section| section.is_introduction())
        .map(|section| build_section_mdx(section, &parsed.imports, &parsed.exports))
}
