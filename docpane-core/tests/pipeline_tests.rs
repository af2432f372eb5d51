//! End-to-end tests for docpane-core
//!
//! These exercise the full content pipeline: loading, splitting, MDX
//! reconstruction, navigation and search across a document set.

use anyhow::Result;
use docpane_core::search::MatchKind;
use docpane_core::{
    build_all_sections, extract_exports, extract_imports, get_main_navigation, search,
    split_content_by_sections, BreakingPoint, Config, Document, HeadingScanner, SearchConfig,
    SearchEngine, SearchMode,
};
use std::io::Write as _;
use tempfile::Builder;

const COMPONENT_DOC: &str = "import { Tabs, Tab } from './tabs'\n\
import Callout from './callout'\n\
\n\
export const Alert = ({ type='info' }) => {\n\
  const colors = { info: { bg: 'blue' } };\n\
  return <div style={{ color: colors[type].bg }} />;\n\
};\n\
\n\
# Components\n\
\n\
Overview of the kit.\n\
\n\
## Tabs\n\
\n\
<Tabs><Tab>One</Tab></Tabs>\n\
\n\
### Props\n\
\n\
```jsx\n\
## not a section\n\
```\n\
\n\
## Alerts\n\
\n\
<Alert type=\"info\" />\n";

const BREAKING_POINTS: [BreakingPoint; 4] = [
    BreakingPoint::H1,
    BreakingPoint::H2,
    BreakingPoint::H3,
    BreakingPoint::H4,
];

#[test]
fn integration_scenario_sections_with_intro() {
    let content = "# T\n\n## A\n\n### A1\n\n## B";
    let sections = split_content_by_sections(content, BreakingPoint::H2, false);

    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0].slug, "introduction");
    assert_eq!(sections[0].level, 1);
    assert_eq!(sections[0].title, "T");
    assert_eq!(sections[1].slug, "a");
    assert_eq!(sections[2].slug, "b");

    let sub = &sections[1].subsections;
    assert_eq!(sub.len(), 1);
    assert_eq!((sub[0].title.as_str(), sub[0].level, sub[0].slug.as_str()), ("A1", 3, "a1"));
}

#[test]
fn integration_fence_immunity_all_levels() {
    let contents = [
        "## Real\n\n```\n# fake1\n## fake2\n### fake3\n#### fake4\n```\n",
        "## Real\n````md\n~~~\n# fake1\n```\n## fake2\n~~~\n````\n",
    ];

    for content in contents {
        let nav = get_main_navigation(content, BreakingPoint::H2);
        assert_eq!(nav.len(), 1);
        assert_eq!(nav[0].title, "Real");

        for bp in BREAKING_POINTS {
            for section in split_content_by_sections(content, bp, false) {
                assert!(!section.title.starts_with("fake"));
                assert!(section.subsections.iter().all(|h| !h.title.starts_with("fake")));
            }
        }
    }
}

#[test]
fn integration_partition_reproduces_content() {
    for content in [
        "# Title\nlead\n## A\ntext\n### A.1\n#### deep\n## B\n```\n## code\n```\nend",
        "\n\n## A\ntext\n### A.1\n",
    ] {
        assert_partition(content);
    }
}

fn assert_partition(content: &str) {
    for bp in BREAKING_POINTS {
        let sections = split_content_by_sections(content, bp, false);
        let bodies: Vec<&str> = sections.iter().map(|s| s.body.as_str()).collect();
        assert_eq!(bodies.join("\n"), content, "breaking point {bp}");

        let level = bp.level();
        let expected = HeadingScanner::new(content)
            .filter(|&(_, l, _)| l == level)
            .count();
        let found: usize = sections
            .iter()
            .map(|s| HeadingScanner::new(&s.body).filter(|&(_, l, _)| l == level).count())
            .sum();
        assert_eq!(found, expected, "breaking point {bp}");
    }
}

#[test]
fn integration_code_span_heading() {
    let nav = get_main_navigation("## `/src/pages/`\n", BreakingPoint::H2);
    assert_eq!(nav[0].slug, "src-pages");
    assert_eq!(nav[0].title, "`/src/pages/`");
}

#[test]
fn integration_empty_input_placeholder() {
    let sections = split_content_by_sections("", BreakingPoint::H2, false);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].slug, "content");
    assert_eq!(sections[0].title, "Content");
    assert!(sections[0].body.is_empty());
}

#[test]
fn integration_nested_export_single_block() {
    let exports = extract_exports(COMPONENT_DOC);
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].name, "Alert");
    assert_eq!(exports[0].line_range(), 3..=6);
}

#[test]
fn integration_component_sections_self_sufficient() {
    let imports = extract_imports(COMPONENT_DOC);
    let exports = extract_exports(COMPONENT_DOC);
    assert_eq!(imports.len(), 2);

    let rebuilt = build_all_sections(COMPONENT_DOC, BreakingPoint::H2);
    let slugs: Vec<_> = rebuilt.iter().map(|s| s.slug.as_str()).collect();
    assert_eq!(slugs, vec!["introduction", "tabs", "alerts"]);

    for section in &rebuilt {
        for import in &imports {
            assert!(section.full_source.contains(&import.text));
        }
        for export in &exports {
            assert!(section.full_source.contains(&export.text));
        }
    }

    let split = split_content_by_sections(COMPONENT_DOC, BreakingPoint::H2, true);
    assert_eq!(split.len(), rebuilt.len());
    for (section, rebuilt) in split.iter().zip(&rebuilt) {
        assert_eq!(section.body, rebuilt.full_source);
    }
    assert_eq!(split[1].subsections.len(), 1);
    assert_eq!(split[1].subsections[0].title, "Props");
}

#[test]
fn integration_search_title_outranks_content() {
    let docs = vec![
        Document::new("start", "Start", "# Start\n\n## What's Next?\n\nKeep reading.\n", false),
        Document::new("more", "More", "# More\n\nThe next page covers deployment.\n", false),
    ];

    let results = search(&docs, &SearchConfig::default(), "next");
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].section.slug, "what-s-next");
    assert_eq!(results[0].score, 5.0);
    assert_eq!(results[0].matches[0].kind, MatchKind::Title);

    assert_eq!(results[1].score, 0.5);
    assert_eq!(results[1].matches[0].kind, MatchKind::Content);
    assert!(results[1].matches[0].highlighted_html.contains("<mark>next</mark>"));
}

#[test]
fn integration_search_deterministic_and_fuzzy_safe() {
    let docs = vec![
        Document::new("a", "A", COMPONENT_DOC, true),
        Document::new("b", "B", "# Alerts\n\nAlert usage notes.\n", false),
    ];
    let engine = SearchEngine::new(&docs, SearchConfig::default());

    let first = engine.search("alert", SearchMode::Exact);
    let second = engine.search("alert", SearchMode::Exact);
    assert_eq!(first, second);
    assert!(!first.is_empty());

    // Fuzzy never errors, whichever engine is compiled in
    let fuzzy = engine.search("alrt", SearchMode::Fuzzy);
    for result in &fuzzy {
        assert!(result.score > 0.0);
        assert!(!result.matches.is_empty());
    }
}

#[test]
fn integration_load_files_and_search() -> Result<()> {
    let mut md = Builder::new().suffix(".md").tempfile()?;
    md.write_all(b"# Install\n\nRun the installer.\n")?;
    let mut mdx = Builder::new().suffix(".mdx").tempfile()?;
    mdx.write_all(COMPONENT_DOC.as_bytes())?;

    let docs = Document::load_all(&[md.path(), mdx.path()])?;
    assert!(!docs[0].is_component_source);
    assert!(docs[1].is_component_source);
    assert_eq!(docs[1].title, "Components");

    let config = Config::default();
    let engine = SearchEngine::new(&docs, config.search.clone());
    let results = engine.search("installer", config.search.mode);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document_slug, docs[0].slug);
    Ok(())
}
