use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Structural category of an indexed unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Coalesced top-level statements not owned by any definition
    Module,
    /// Class-like container (class, struct, trait, impl, interface, namespace)
    Class,
    /// Free-standing function
    Function,
    /// Callable nested inside a class-like container
    Method,
    /// Other named block
    Block,
    /// Whole-file fallback for files the grammar could not parse
    Unparsed,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Module => "module",
            UnitKind::Class => "class",
            UnitKind::Function => "function",
            UnitKind::Method => "method",
            UnitKind::Block => "block",
            UnitKind::Unparsed => "unparsed",
        }
    }

    /// Whether this unit is a named definition rather than a coalesced block
    pub fn is_definition(&self) -> bool {
        matches!(self, UnitKind::Class | UnitKind::Function | UnitKind::Method)
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The atomic indexed entity: a named, line-bounded span of one source file.
///
/// Immutable after build. `source_text` is the verbatim line slice
/// `[start_line, end_line]` captured at index time; it is never re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeUnit {
    pub project_id: String,
    /// Relative, pre-validated path supplied by the upload collaborator
    pub file_path: String,
    /// Language tag resolved from the file extension
    pub language: String,
    pub kind: UnitKind,
    /// Identifier; empty for anonymous and module-level blocks
    pub name: String,
    /// 1-based, inclusive
    pub start_line: usize,
    /// 1-based, inclusive, `end_line >= start_line`
    pub end_line: usize,
    pub source_text: String,
    /// Enclosing class-like container for methods; relation only
    pub parent_name: Option<String>,
}

impl CodeUnit {
    /// Number of lines spanned (used for shorter-unit tie-breaking)
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// Whether the unit's line range contains the given 1-based line
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}

/// One uploaded file: a pre-validated relative path plus raw bytes.
///
/// Archive extraction and path sanitation are the upload collaborator's
/// responsibility; the core treats `path` as already safe.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: content.into(),
        }
    }

    /// File content decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Transient question value object; never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub project_id: String,
    pub question: String,
    /// When false, the assembled context carries citation headers only
    #[serde(default = "default_include_snippets")]
    pub include_snippets: bool,
}

fn default_include_snippets() -> bool {
    true
}

impl Query {
    pub fn new(project_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            question: question.into(),
            include_snippets: true,
        }
    }
}

/// Reference pointing a generated answer back to its source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub file: String,
    /// Name of the cited unit; empty for module blocks
    pub element: String,
    #[serde(rename = "type")]
    pub kind: UnitKind,
    /// `[start_line, end_line]`, 1-based inclusive
    pub lines: [usize; 2],
}

impl From<&CodeUnit> for Citation {
    fn from(unit: &CodeUnit) -> Self {
        Self {
            file: unit.file_path.clone(),
            element: unit.name.clone(),
            kind: unit.kind,
            lines: [unit.start_line, unit.end_line],
        }
    }
}

/// Why a file was left out of the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    UnsupportedLanguage,
}

/// A file recorded as skipped during build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub file_path: String,
    pub reason: SkipReason,
}

/// Outcome of building one project index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResult {
    pub project_id: String,
    /// Number of code units in the new index
    pub unit_count: usize,
    /// Number of files that produced units
    pub file_count: usize,
    /// Sorted, deduplicated language tags seen across indexed files
    pub languages: Vec<String>,
    /// Files excluded from the index, with reasons
    #[serde(default)]
    pub skipped_files: Vec<SkippedFile>,
    /// Non-fatal per-file problems (e.g. parse failures that fell back to an
    /// unparsed whole-file unit)
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Summary row for listing loaded projects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub file_count: usize,
    pub unit_count: usize,
    pub languages: Vec<String>,
}

/// The exact hand-off to the language-model collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPayload {
    pub question: String,
    /// Bounded context window assembled from the top-ranked units
    pub context: String,
    /// Citations for exactly the units present in `context`
    pub citations: Vec<Citation>,
    /// False when the queried project id has no index
    pub project_known: bool,
}

/// Answer shape exposed to the presentation collaborator. The core pairs
/// fields; it never interprets the model output or timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer_text: String,
    pub citations: Vec<Citation>,
    pub model_used: String,
    pub processing_time_ms: u64,
}

impl Answer {
    /// Pair a model completion with the citations from its prompt payload
    pub fn from_completion(
        payload: PromptPayload,
        answer_text: impl Into<String>,
        model_used: impl Into<String>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            answer_text: answer_text.into(),
            citations: payload.citations,
            model_used: model_used.into(),
            processing_time_ms,
        }
    }
}
