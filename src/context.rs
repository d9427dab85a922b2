//! Bounded context assembly with parallel citation records
//!
//! Selected units are concatenated in rank order, each prefixed by a
//! `file_path:start-end` header. A unit whose block would push the running
//! total past the character budget is dropped whole and assembly continues
//! with later, smaller units; a truncated function body grounds the model
//! worse than no body at all. Citations cover exactly the units that made it
//! into the context.

use crate::retriever::ScoredUnit;
use crate::types::Citation;

/// Assemble the prompt context and its citations from ranked units.
///
/// Deterministic given identical ranked input and budget. With
/// `include_snippets` false only the headers are emitted, yielding a
/// citation-only context for callers that want references without code.
pub fn assemble(
    hits: &[ScoredUnit],
    char_budget: usize,
    include_snippets: bool,
) -> (String, Vec<Citation>) {
    let mut context = String::new();
    let mut citations = Vec::new();
    let mut used = 0usize;

    for hit in hits {
        let unit = &hit.unit;
        let block = if include_snippets {
            format!(
                "{}:{}-{}\n{}\n\n",
                unit.file_path, unit.start_line, unit.end_line, unit.source_text
            )
        } else {
            format!("{}:{}-{}\n", unit.file_path, unit.start_line, unit.end_line)
        };

        let block_chars = block.chars().count();
        if used + block_chars > char_budget {
            tracing::debug!(
                "dropping {}:{} from context: {} chars over budget",
                unit.file_path,
                unit.start_line,
                used + block_chars - char_budget
            );
            continue;
        }

        used += block_chars;
        context.push_str(&block);
        citations.push(Citation::from(unit));
    }

    (context, citations)
}
