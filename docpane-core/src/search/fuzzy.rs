//! Pluggable fuzzy ranking of the search corpus

use anyhow::Result;

/// One corpus entry accepted by a fuzzy engine
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyCandidate {
    /// Position in the corpus passed to [`FuzzyEngine::rank`]
    pub index: usize,
    pub display: String,
    pub score: f64,
}

/// Approximate matcher over a corpus of strings.
///
/// Returns candidates ordered best first. Errors are recovered by the query
/// engine, which falls back to exact matching.
pub trait FuzzyEngine {
    fn rank(&self, corpus: &[&str], query: &str) -> Result<Vec<FuzzyCandidate>>;
}

/// Order candidates best first, keeping corpus order for ties
fn sort_candidates(candidates: &mut [FuzzyCandidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(feature = "fuzzy")]
mod skim {
    use anyhow::Result;
    use fuzzy_matcher::skim::SkimMatcherV2;
    use fuzzy_matcher::FuzzyMatcher;

    use super::{sort_candidates, FuzzyCandidate, FuzzyEngine};

    /// Fuzzy engine backed by the skim v2 algorithm
    pub struct SkimFuzzyEngine {
        matcher: SkimMatcherV2,
    }

    impl SkimFuzzyEngine {
        pub fn new() -> Self {
            Self {
                matcher: SkimMatcherV2::default().ignore_case(),
            }
        }
    }

    impl Default for SkimFuzzyEngine {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FuzzyEngine for SkimFuzzyEngine {
        fn rank(&self, corpus: &[&str], query: &str) -> Result<Vec<FuzzyCandidate>> {
            let query = query.trim();
            let mut candidates: Vec<FuzzyCandidate> = corpus
                .iter()
                .enumerate()
                .filter_map(|(index, text)| {
                    self.matcher
                        .fuzzy_match(text, query)
                        .map(|score| FuzzyCandidate {
                            index,
                            display: text.to_string(),
                            score: score as f64,
                        })
                })
                .collect();

            sort_candidates(&mut candidates);
            Ok(candidates)
        }
    }
}

#[cfg(feature = "fuzzy")]
pub use skim::SkimFuzzyEngine;

/// Stand-in when the crate is built without the `fuzzy` feature; every
/// query fails so searches fall back to exact matching
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableFuzzyEngine;

impl FuzzyEngine for UnavailableFuzzyEngine {
    fn rank(&self, _corpus: &[&str], _query: &str) -> Result<Vec<FuzzyCandidate>> {
        anyhow::bail!("fuzzy matching is not available in this build")
    }
}

/// The engine used when none is injected
pub fn default_engine() -> Box<dyn FuzzyEngine> {
    #[cfg(feature = "fuzzy")]
    {
        Box::new(SkimFuzzyEngine::new())
    }
    #[cfg(not(feature = "fuzzy"))]
    {
        Box::new(UnavailableFuzzyEngine)
    }
}
