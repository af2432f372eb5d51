//! docpane core - section splitting and search for documentation sets
//!
//! This crate contains the content pipeline of the docpane browser,
//! independent of any presentation layer:
//! - Heading scanning with fenced code tracking, and slugs
//! - MDX import/export extraction and self-contained section reconstruction
//! - Splitting documents into pages at a breaking-point heading
//! - Section search (exact and fuzzy) with sanitized highlights
//! - Markdown rendering with a memoizing render cache
//! - Configuration management

pub mod cache;
pub mod config;
pub mod doc;
pub mod front_matter;
pub mod heading;
pub mod mdx;
pub mod reconstruct;
pub mod render;
pub mod sanitize;
pub mod search;
pub mod sections;
pub mod security;
pub mod slug;

// Re-export commonly used types
pub use config::{Config, SearchConfig};
pub use doc::Document;
pub use heading::{HeadingRecord, HeadingScanner};
pub use mdx::{extract_exports, extract_imports, ExportBlock, ImportStatement};
pub use reconstruct::{
    build_all_sections, build_intro_section, build_section_mdx, ReconstructedSection,
};
pub use render::Renderer;
pub use search::{search, SearchEngine, SearchMode, SearchResult};
pub use sections::{
    get_main_navigation, parse_mdx, split_content_by_sections, split_into_sections, BreakingPoint,
    ContentSection, ParsedMdx,
};
pub use slug::slugify;
