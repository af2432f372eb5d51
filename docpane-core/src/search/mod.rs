//! Section search over a loaded document set
//!
//! Records are built once per document set ([`SearchIndex`]) and queried by a
//! [`SearchEngine`] in one of two modes:
//! - exact: case-insensitive substring over `title + " " + body`
//! - fuzzy: candidates and base scores come from a [`FuzzyEngine`]; any engine
//!   failure falls back to exact mode
//!
//! Both modes score a title hit by heading level (`7 - level`) and each
//! content hit at `0.5`. Highlighted snippets are sanitized before they are
//! stored on a result.

pub mod fuzzy;
pub mod highlight;
pub mod index;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::doc::Document;
use crate::sanitize::{AllowListSanitizer, HtmlSanitizer};

pub use fuzzy::{default_engine, FuzzyCandidate, FuzzyEngine, UnavailableFuzzyEngine};
#[cfg(feature = "fuzzy")]
pub use fuzzy::SkimFuzzyEngine;
pub use index::{SearchIndex, SearchRecord};

use self::highlight::{contains_ignore_case, highlight_sanitized};

/// Weight of a single content match
pub const CONTENT_MATCH_WEIGHT: f64 = 0.5;

/// Weight of a title match at heading `level`: H1 scores 6, H6 scores 1
pub fn level_weight(level: u8) -> f64 {
    f64::from(7u8.saturating_sub(level.clamp(1, 6)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Title,
    Content,
}

/// A matched fragment of a section
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    pub text: String,
    /// Sanitized markup with the query wrapped in `<mark>`
    pub highlighted_html: String,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRef {
    pub title: String,
    pub level: u8,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub document_slug: String,
    pub section: SectionRef,
    pub matches: Vec<SearchMatch>,
    pub score: f64,
}

/// Answers ranked queries against a [`SearchIndex`]
pub struct SearchEngine {
    index: SearchIndex,
    config: SearchConfig,
    fuzzy: Box<dyn FuzzyEngine>,
    sanitizer: Box<dyn HtmlSanitizer>,
}

impl SearchEngine {
    /// Index `documents` with the default fuzzy engine and sanitizer
    pub fn new(documents: &[Document], config: SearchConfig) -> Self {
        Self::with_collaborators(
            SearchIndex::build(documents),
            config,
            default_engine(),
            Box::new(AllowListSanitizer::default()),
        )
    }

    pub fn with_collaborators(
        index: SearchIndex,
        config: SearchConfig,
        fuzzy: Box<dyn FuzzyEngine>,
        sanitizer: Box<dyn HtmlSanitizer>,
    ) -> Self {
        Self {
            index,
            config,
            fuzzy,
            sanitizer,
        }
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Rebuild the index if `documents` is not the set it was built from.
    /// Returns whether a rebuild happened.
    pub fn refresh(&mut self, documents: &[Document]) -> bool {
        if !self.index.is_stale(documents) {
            return false;
        }
        self.index = SearchIndex::build(documents);
        true
    }

    /// Ranked results for `query`; an empty query yields no results
    pub fn search(&self, query: &str, mode: SearchMode) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let mut results = match mode {
            SearchMode::Exact => self.search_exact(query),
            SearchMode::Fuzzy => match self.search_fuzzy(query) {
                Ok(results) => results,
                Err(err) => {
                    warn!("fuzzy search failed, falling back to exact: {err:#}");
                    self.search_exact(query)
                }
            },
        };

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(self.config.max_results);
        debug!("query {query:?} ({mode:?}) matched {} sections", results.len());
        results
    }

    fn search_exact(&self, query: &str) -> Vec<SearchResult> {
        self.index
            .records()
            .iter()
            .filter(|record| contains_ignore_case(&record.searchable_text, query))
            .filter_map(|record| self.score_record(record, query, 0.0))
            .collect()
    }

    fn search_fuzzy(&self, query: &str) -> anyhow::Result<Vec<SearchResult>> {
        let records = self.index.records();
        let corpus: Vec<&str> = records.iter().map(|r| r.searchable_text.as_str()).collect();
        let mut candidates = self.fuzzy.rank(&corpus, query)?;

        // Ties keep index order
        candidates.sort_by_key(|c| c.index);
        let best = candidates
            .iter()
            .map(|c| c.score)
            .fold(0.0_f64, f64::max);

        let results = candidates
            .iter()
            .filter_map(|candidate| {
                let record = records.get(candidate.index)?;
                let base = if best > 0.0 { candidate.score / best } else { 0.0 };
                self.score_record(record, query, base)
                    .or_else(|| Some(self.fuzzy_only_result(record, query, base)))
            })
            .collect();

        Ok(results)
    }

    /// Title and content matches for `record`; `None` when nothing matched
    fn score_record(&self, record: &SearchRecord, query: &str, base: f64) -> Option<SearchResult> {
        let mut matches = Vec::new();
        let mut score = base;

        if contains_ignore_case(&record.section_title, query) {
            matches.push(self.make_match(&record.section_title, query, MatchKind::Title));
            score += level_weight(record.section_level);
        }

        for snippet in content_snippets(
            &record.section_body,
            query,
            self.config.context_lines,
            self.config.max_content_matches,
        ) {
            matches.push(self.make_match(&snippet, query, MatchKind::Content));
            score += CONTENT_MATCH_WEIGHT;
        }

        if matches.is_empty() {
            return None;
        }

        Some(result_for(record, matches, score))
    }

    /// Result for a record the fuzzy engine accepted without a literal hit
    fn fuzzy_only_result(&self, record: &SearchRecord, query: &str, base: f64) -> SearchResult {
        let text = record
            .section_body
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or(record.section_title.as_str());
        let matches = vec![self.make_match(text, query, MatchKind::Content)];
        result_for(record, matches, base + CONTENT_MATCH_WEIGHT)
    }

    fn make_match(&self, text: &str, query: &str, kind: MatchKind) -> SearchMatch {
        SearchMatch {
            text: text.to_string(),
            highlighted_html: highlight_sanitized(text, query, self.sanitizer.as_ref()),
            kind,
        }
    }
}

fn result_for(record: &SearchRecord, matches: Vec<SearchMatch>, score: f64) -> SearchResult {
    SearchResult {
        document_slug: record.document_slug.clone(),
        section: SectionRef {
            title: record.section_title.clone(),
            level: record.section_level,
            slug: record.section_slug.clone(),
        },
        matches,
        score,
    }
}

/// Context windows of `context` lines around each matching line, at most
/// `limit` of them
fn content_snippets(body: &str, query: &str, context: usize, limit: usize) -> Vec<String> {
    let lines: Vec<&str> = body.lines().collect();
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| contains_ignore_case(line, query))
        .take(limit)
        .map(|(idx, _)| {
            let start = idx.saturating_sub(context);
            let end = (idx + context + 1).min(lines.len());
            lines[start..end].join("\n").trim().to_string()
        })
        .collect()
}

/// Index `documents` and run `query` with the configured mode
pub fn search(documents: &[Document], config: &SearchConfig, query: &str) -> Vec<SearchResult> {
    SearchEngine::new(documents, config.clone()).search(query, config.mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn docs() -> Vec<Document> {
        vec![
            Document::new(
                "intro",
                "Intro",
                "# Getting Started\nInstall the package.\n\n## What's Next?\nRead on.\n",
                false,
            ),
            Document::new(
                "guide",
                "Guide",
                "# Guide\nline one\nthe next step\nline three\n\n## Other\nnext time, next place\n",
                false,
            ),
        ]
    }

    struct FailingEngine;

    impl FuzzyEngine for FailingEngine {
        fn rank(&self, _corpus: &[&str], _query: &str) -> anyhow::Result<Vec<FuzzyCandidate>> {
            bail!("engine exploded")
        }
    }

    /// Accepts every record containing the first query character
    struct FirstCharEngine;

    impl FuzzyEngine for FirstCharEngine {
        fn rank(&self, corpus: &[&str], query: &str) -> anyhow::Result<Vec<FuzzyCandidate>> {
            let first = query.chars().next().unwrap_or(' ');
            Ok(corpus
                .iter()
                .enumerate()
                .filter(|(_, text)| text.contains(first))
                .map(|(index, text)| FuzzyCandidate {
                    index,
                    display: text.to_string(),
                    score: 10.0,
                })
                .collect())
        }
    }

    fn engine_with(fuzzy: Box<dyn FuzzyEngine>) -> SearchEngine {
        SearchEngine::with_collaborators(
            SearchIndex::build(&docs()),
            SearchConfig::default(),
            fuzzy,
            Box::new(AllowListSanitizer::default()),
        )
    }

    #[test]
    fn test_level_weight() {
        assert_eq!(level_weight(1), 6.0);
        assert_eq!(level_weight(2), 5.0);
        assert_eq!(level_weight(6), 1.0);
    }

    #[test]
    fn test_empty_query() {
        let engine = SearchEngine::new(&docs(), SearchConfig::default());
        assert!(engine.search("", SearchMode::Exact).is_empty());
        assert!(engine.search("   ", SearchMode::Fuzzy).is_empty());
    }

    #[test]
    fn test_title_match_outranks_content() {
        let engine = SearchEngine::new(&docs(), SearchConfig::default());
        let results = engine.search("next", SearchMode::Exact);

        let top = &results[0];
        assert_eq!(top.document_slug, "intro");
        assert_eq!(top.section.slug, "what-s-next");
        assert_eq!(top.section.level, 2);
        assert_eq!(top.score, 5.0);
        assert_eq!(top.matches.len(), 1);
        assert_eq!(top.matches[0].kind, MatchKind::Title);
        assert_eq!(top.matches[0].highlighted_html, "What's <mark>Next</mark>?");

        let content_only = results
            .iter()
            .find(|r| r.section.slug == "guide")
            .expect("guide section matches");
        assert_eq!(content_only.score, 0.5);
        assert_eq!(content_only.matches[0].kind, MatchKind::Content);
        assert_eq!(content_only.matches[0].text, "line one\nthe next step\nline three");
    }

    #[test]
    fn test_content_matches_capped() {
        let docs = vec![Document::new("d", "D", "# Head\na x\nb x\nc x\nd x\ne x\n", false)];
        let engine = SearchEngine::new(&docs, SearchConfig::default());
        let results = engine.search("x", SearchMode::Exact);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matches.len(), 3);
        assert_eq!(results[0].score, 1.5);
    }

    #[test]
    fn test_straddling_match_excluded() {
        let docs = vec![Document::new("d", "D", "## Alpha\nbeta\n", false)];
        let engine = SearchEngine::new(&docs, SearchConfig::default());
        assert!(engine.search("alpha beta", SearchMode::Exact).is_empty());
    }

    #[test]
    fn test_results_truncated() {
        let content: String = (0..30).map(|i| format!("## Topic {i}\nbody\n")).collect();
        let docs = vec![Document::new("d", "D", content, false)];
        let engine = SearchEngine::new(&docs, SearchConfig::default());
        assert_eq!(engine.search("topic", SearchMode::Exact).len(), 20);
    }

    #[test]
    fn test_exact_is_deterministic() {
        let engine = SearchEngine::new(&docs(), SearchConfig::default());
        let first = engine.search("next", SearchMode::Exact);
        let second = engine.search("next", SearchMode::Exact);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let docs = vec![
            Document::new("a", "A", "## One\nshared\n", false),
            Document::new("b", "B", "## Two\nshared\n", false),
        ];
        let engine = SearchEngine::new(&docs, SearchConfig::default());
        let slugs: Vec<_> = engine
            .search("shared", SearchMode::Exact)
            .into_iter()
            .map(|r| r.document_slug)
            .collect();
        assert_eq!(slugs, vec!["a", "b"]);
    }

    #[test]
    fn test_fuzzy_failure_falls_back_to_exact() {
        let exact = engine_with(Box::new(FailingEngine)).search("next", SearchMode::Exact);
        let fuzzy = engine_with(Box::new(FailingEngine)).search("next", SearchMode::Fuzzy);
        assert_eq!(exact, fuzzy);
    }

    #[test]
    fn test_fuzzy_adds_base_score() {
        let engine = engine_with(Box::new(FirstCharEngine));
        let results = engine.search("next", SearchMode::Fuzzy);

        let title_hit = results
            .iter()
            .find(|r| r.section.slug == "what-s-next")
            .expect("title hit present");
        assert_eq!(title_hit.score, 6.0);
        assert_eq!(results[0].section.slug, "what-s-next");
    }

    #[test]
    fn test_fuzzy_only_candidates_included() {
        let engine = engine_with(Box::new(FirstCharEngine));
        let results = engine.search("nzz", SearchMode::Fuzzy);

        assert!(!results.is_empty());
        for result in &results {
            assert_eq!(result.matches.len(), 1);
            assert_eq!(result.matches[0].kind, MatchKind::Content);
            assert_eq!(result.score, 1.5);
        }
    }

    #[test]
    fn test_highlights_are_sanitized() {
        let docs = vec![Document::new("x", "X", "## Safe\n<script>find me</script>\n", false)];
        let engine = SearchEngine::new(&docs, SearchConfig::default());
        let results = engine.search("find", SearchMode::Exact);

        let html = &results[0].matches[0].highlighted_html;
        assert!(!html.contains("<script>"));
        assert!(html.contains("<mark>find</mark>"));
    }

    #[test]
    fn test_refresh_rebuilds_on_change() {
        let mut engine = SearchEngine::new(&docs(), SearchConfig::default());
        assert!(!engine.refresh(&docs()));

        let changed = vec![Document::new("new", "New", "## Fresh\n", false)];
        assert!(engine.refresh(&changed));
        assert_eq!(engine.search("fresh", SearchMode::Exact).len(), 1);
    }

    #[test]
    fn test_search_function_uses_config_mode() {
        let config = SearchConfig {
            max_results: 1,
            ..SearchConfig::default()
        };
        let results = search(&docs(), &config, "next");
        assert_eq!(results.len(), 1);
    }
}
