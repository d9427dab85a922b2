//! Per-project storage of code units with atomic replacement
//!
//! The store is an explicitly owned value passed by reference into both the
//! build and retrieve paths; there is no ambient global index. A build
//! parses files in parallel, normalizes the unit order, and swaps the new
//! index in as one `Arc` replacement, so readers only ever observe the old
//! index or the complete new one. Builds for the same project id are
//! mutually exclusive: the first writer wins and the loser is rejected.

use crate::error::{QaError, QaResult};
use crate::indexer::language::Language;
use crate::indexer::segmenter;
use crate::types::{CodeUnit, IndexResult, ProjectSummary, SkipReason, SkippedFile, SourceFile};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// The full set of code units for one project, immutable after build
#[derive(Debug)]
pub struct ProjectIndex {
    pub project_id: String,
    /// Stable order: (file_path ascending, start_line ascending)
    units: Vec<CodeUnit>,
    file_count: usize,
    languages: Vec<String>,
}

impl ProjectIndex {
    /// All units in stable order
    pub fn units(&self) -> &[CodeUnit] {
        &self.units
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Sorted, deduplicated language tags present in this index
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Exact and case-insensitive substring match over unit names
    pub fn lookup_by_name(&self, identifier: &str) -> Vec<&CodeUnit> {
        let needle = identifier.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.units
            .iter()
            .filter(|u| !u.name.is_empty() && u.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// The innermost unit whose range contains the given line of a file.
    /// The coverage invariant guarantees some unit matches for any line of
    /// an indexed file.
    pub fn unit_at(&self, file_path: &str, line: usize) -> Option<&CodeUnit> {
        self.units
            .iter()
            .filter(|u| u.file_path == file_path && u.contains_line(line))
            .min_by_key(|u| u.line_count())
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            project_id: self.project_id.clone(),
            file_count: self.file_count,
            unit_count: self.units.len(),
            languages: self.languages.clone(),
        }
    }
}

/// Outcome of indexing a single file inside a build
struct FileOutcome {
    units: Vec<CodeUnit>,
    language: Option<String>,
    skipped: Option<SkippedFile>,
    error: Option<String>,
}

/// Store of project indices, keyed by project id
#[derive(Debug, Default)]
pub struct IndexStore {
    projects: RwLock<HashMap<String, Arc<ProjectIndex>>>,
    /// Project ids with a build currently in flight
    building: Mutex<HashSet<String>>,
}

/// Removes the project id from the in-flight set when the build exits,
/// including on panic
struct BuildGuard<'a> {
    store: &'a IndexStore,
    project_id: String,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        let mut building = self
            .store
            .building
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        building.remove(&self.project_id);
    }
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build (or rebuild) the index for a project from uploaded files.
    ///
    /// Per-file problems never abort the build: unsupported extensions are
    /// recorded under `skipped_files`, parse failures degrade to a single
    /// unparsed unit and are recorded under `errors`. The previous index for
    /// the same id, if any, stays visible to readers until the complete new
    /// one is swapped in.
    pub fn build(&self, project_id: &str, files: &[SourceFile]) -> QaResult<IndexResult> {
        {
            let mut building = self
                .building
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !building.insert(project_id.to_string()) {
                return Err(QaError::BuildConflict(project_id.to_string()));
            }
        }
        let _guard = BuildGuard {
            store: self,
            project_id: project_id.to_string(),
        };

        tracing::info!("building index for '{}' ({} files)", project_id, files.len());

        // Files are independent; parse them in parallel and normalize the
        // order afterwards so the result does not depend on completion order
        let outcomes: Vec<FileOutcome> = files
            .par_iter()
            .map(|file| index_file(project_id, file))
            .collect();

        let mut units = Vec::new();
        let mut skipped_files = Vec::new();
        let mut errors = Vec::new();
        let mut languages = Vec::new();
        let mut file_count = 0usize;

        for outcome in outcomes {
            if let Some(skipped) = outcome.skipped {
                skipped_files.push(skipped);
                continue;
            }
            if let Some(error) = outcome.error {
                errors.push(error);
            }
            if let Some(language) = outcome.language {
                languages.push(language);
            }
            file_count += 1;
            units.extend(outcome.units);
        }

        units.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then(a.start_line.cmp(&b.start_line))
                .then(b.end_line.cmp(&a.end_line))
        });
        languages.sort();
        languages.dedup();

        let result = IndexResult {
            project_id: project_id.to_string(),
            unit_count: units.len(),
            file_count,
            languages: languages.clone(),
            skipped_files,
            errors,
        };

        let index = Arc::new(ProjectIndex {
            project_id: project_id.to_string(),
            units,
            file_count,
            languages,
        });

        // Atomic swap: readers see either the old index or this one
        let mut projects = self
            .projects
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        projects.insert(project_id.to_string(), index);

        tracing::info!(
            "index for '{}' ready: {} units, {} skipped, {} errors",
            project_id,
            result.unit_count,
            result.skipped_files.len(),
            result.errors.len()
        );

        Ok(result)
    }

    /// The current index for a project, if one has been built
    pub fn get(&self, project_id: &str) -> Option<Arc<ProjectIndex>> {
        let projects = self
            .projects
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        projects.get(project_id).cloned()
    }

    /// Whether a project id has an index. Absence is a valid state, not a
    /// fault; reads against an unknown id return empty results.
    pub fn project_known(&self, project_id: &str) -> bool {
        let projects = self
            .projects
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        projects.contains_key(project_id)
    }

    /// All units of a project in stable order; empty for unknown ids
    pub fn all_units(&self, project_id: &str) -> Vec<CodeUnit> {
        self.get(project_id)
            .map(|index| index.units().to_vec())
            .unwrap_or_default()
    }

    /// Name lookup across a project; empty for unknown ids
    pub fn lookup_by_name(&self, project_id: &str, identifier: &str) -> Vec<CodeUnit> {
        self.get(project_id)
            .map(|index| index.lookup_by_name(identifier).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Summaries of every loaded project, ordered by project id
    pub fn projects(&self) -> Vec<ProjectSummary> {
        let projects = self
            .projects
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut summaries: Vec<ProjectSummary> =
            projects.values().map(|index| index.summary()).collect();
        summaries.sort_by(|a, b| a.project_id.cmp(&b.project_id));
        summaries
    }

    /// Tear down a project's index; returns whether one existed
    pub fn remove(&self, project_id: &str) -> bool {
        let mut projects = self
            .projects
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        projects.remove(project_id).is_some()
    }
}

fn index_file(project_id: &str, file: &SourceFile) -> FileOutcome {
    let Some(language) = Language::from_path(&file.path) else {
        tracing::debug!("skipping unsupported file: {}", file.path);
        return FileOutcome {
            units: Vec::new(),
            language: None,
            skipped: Some(SkippedFile {
                file_path: file.path.clone(),
                reason: SkipReason::UnsupportedLanguage,
            }),
            error: None,
        };
    };

    let text = file.text();
    let segmented = segmenter::segment(project_id, &file.path, language, &text);
    let error = if segmented.parse_failed {
        Some(format!(
            "failed to parse {}: indexed as plain text",
            file.path
        ))
    } else {
        None
    };

    FileOutcome {
        units: segmented.units,
        language: Some(language.name().to_string()),
        skipped: None,
        error,
    }
}
