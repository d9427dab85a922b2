//! Lexical relevance ranking of code units against a free-text question
//!
//! Scoring is a weighted sum over a normalized term set: an exact-name bonus,
//! the token-overlap ratio between question and unit, and a small bonus for
//! definition units when the question asks about behavior. Units at or below
//! the relevance floor are excluded even if the result limit is unfilled;
//! padding the context with irrelevant units degrades the model's grounding
//! more than returning fewer results does.

use crate::config::RetrievalConfig;
use crate::error::{QaError, QaResult};
use crate::index_store::IndexStore;
use crate::types::CodeUnit;
use std::collections::HashSet;

/// Question words that signal the asker wants a definition rather than
/// surrounding top-level code
const DEFINITION_HINTS: &[&str] = &[
    "where", "what", "how", "which", "why", "define", "defined", "definition", "declared",
    "implement", "implemented", "implementation", "function", "method", "class", "called", "does",
    "do", "work", "works",
];

/// One ranked unit with its relevance score
#[derive(Debug, Clone)]
pub struct ScoredUnit {
    pub unit: CodeUnit,
    pub score: f32,
}

/// Result of a retrieval call
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Distinguishes "no project" from "no matches"
    pub project_known: bool,
    /// Score descending; ties broken by shorter unit, then file path, then
    /// start line, so repeated calls are bit-identical
    pub hits: Vec<ScoredUnit>,
}

/// Ranks code units against queries using the configured weights
#[derive(Debug, Clone)]
pub struct Retriever {
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    /// Rank the project's units against `query_text` and keep the top `k`
    pub fn retrieve(
        &self,
        store: &IndexStore,
        project_id: &str,
        query_text: &str,
        k: usize,
    ) -> QaResult<Retrieval> {
        if query_text.trim().is_empty() {
            return Err(QaError::InvalidQuery);
        }

        let Some(index) = store.get(project_id) else {
            tracing::debug!("retrieve against unknown project '{}'", project_id);
            return Ok(Retrieval {
                project_known: false,
                hits: Vec::new(),
            });
        };

        let query_tokens = tokenize(query_text);
        let wants_definition = query_tokens.iter().any(|t| DEFINITION_HINTS.contains(&t.as_str()));

        let mut hits: Vec<ScoredUnit> = index
            .units()
            .iter()
            .filter_map(|unit| {
                let score = self.score_unit(unit, &query_tokens, wants_definition);
                (score > self.config.min_score).then(|| ScoredUnit {
                    unit: unit.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.unit.line_count().cmp(&b.unit.line_count()))
                .then_with(|| a.unit.file_path.cmp(&b.unit.file_path))
                .then_with(|| a.unit.start_line.cmp(&b.unit.start_line))
        });
        hits.truncate(k);

        Ok(Retrieval {
            project_known: true,
            hits,
        })
    }

    fn score_unit(
        &self,
        unit: &CodeUnit,
        query_tokens: &HashSet<String>,
        wants_definition: bool,
    ) -> f32 {
        if query_tokens.is_empty() {
            return 0.0;
        }

        let mut unit_tokens = tokenize(&unit.name);
        unit_tokens.extend(tokenize(&unit.source_text));

        let overlap = query_tokens.intersection(&unit_tokens).count() as f32
            / query_tokens.len() as f32;
        let mut score = overlap * self.config.overlap_weight;

        if !unit.name.is_empty() {
            let name_lower = unit.name.to_lowercase();
            if query_tokens.contains(&name_lower) {
                // The question mentions the identifier as its own term;
                // substring containment would fire on e.g. "run" in "pruning"
                score += self.config.name_weight;
            } else {
                let name_tokens = tokenize(&unit.name);
                if !name_tokens.is_empty() && name_tokens.is_subset(query_tokens) {
                    // All parts of the identifier appear, just not joined
                    score += self.config.name_weight * 0.5;
                }
            }
        }

        // The kind bonus only nudges units that already matched; it must not
        // lift zero-overlap units past the relevance floor
        if score > 0.0 && wants_definition && unit.kind.is_definition() {
            score += self.config.kind_bonus;
        }

        score
    }
}

/// Normalize text into a lexical term set: case-folded, split on
/// non-alphanumeric characters and on camelCase boundaries. Compound
/// identifiers contribute both the whole identifier and its parts, so
/// `parseConfig` matches "parse", "config", and "parseconfig".
pub fn tokenize(text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    for word in text.split(|c: char| !c.is_alphanumeric()) {
        if word.len() < 2 {
            continue;
        }
        tokens.insert(word.to_lowercase());
        for part in split_camel_case(word) {
            if part.len() >= 2 {
                tokens.insert(part);
            }
        }
    }
    tokens
}

/// Split a single word on lower-to-upper and acronym boundaries,
/// lowercasing the parts (HTTPServer -> [http, server])
fn split_camel_case(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let starts_part = c.is_uppercase()
            && i > 0
            && (chars[i - 1].is_lowercase()
                || chars[i - 1].is_numeric()
                || (i + 1 < chars.len() && chars[i + 1].is_lowercase()));
        if starts_part && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
