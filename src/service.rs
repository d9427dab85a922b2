//! High-level façade wiring indexing and retrieval together
//!
//! [`QaService`] is what the enclosing HTTP layer talks to: analyze an
//! uploaded project, prepare a prompt payload for a question, and pair the
//! external model's completion with the citations. The model call itself
//! never happens here; the service stops at the `(question, context,
//! citations)` hand-off.

use crate::config::Config;
use crate::context;
use crate::error::QaResult;
use crate::index_store::IndexStore;
use crate::retriever::{Retrieval, Retriever};
use crate::types::{
    Answer, IndexResult, ProjectSummary, PromptPayload, Query, SourceFile,
};

pub struct QaService {
    store: IndexStore,
    retriever: Retriever,
    config: Config,
}

impl QaService {
    pub fn new(config: Config) -> Self {
        let retriever = Retriever::new(config.retrieval.clone());
        Self {
            store: IndexStore::new(),
            retriever,
            config,
        }
    }

    /// Service with built-in defaults, no config file required
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    /// Index an uploaded project, replacing any previous index for the id
    pub fn analyze(&self, project_id: &str, files: &[SourceFile]) -> QaResult<IndexResult> {
        self.store.build(project_id, files)
    }

    /// Rank units against the question without assembling a context
    pub fn search(&self, query: &Query, k: Option<usize>) -> QaResult<Retrieval> {
        let k = k.unwrap_or(self.config.retrieval.default_top_k);
        self.retriever
            .retrieve(&self.store, &query.project_id, &query.question, k)
    }

    /// Retrieve and assemble the payload handed to the model collaborator
    pub fn prepare(&self, query: &Query, k: Option<usize>) -> QaResult<PromptPayload> {
        let retrieval = self.search(query, k)?;
        let (context, citations) = context::assemble(
            &retrieval.hits,
            self.config.context.char_budget,
            query.include_snippets,
        );
        Ok(PromptPayload {
            question: query.question.clone(),
            context,
            citations,
            project_known: retrieval.project_known,
        })
    }

    /// Pair a model completion with its payload's citations for presentation
    pub fn complete(
        &self,
        payload: PromptPayload,
        answer_text: impl Into<String>,
        model_used: impl Into<String>,
        processing_time_ms: u64,
    ) -> Answer {
        Answer::from_completion(payload, answer_text, model_used, processing_time_ms)
    }

    /// Summaries of loaded projects
    pub fn projects(&self) -> Vec<ProjectSummary> {
        self.store.projects()
    }

    /// Tear down one project's session storage
    pub fn remove_project(&self, project_id: &str) -> bool {
        self.store.remove(project_id)
    }

    /// Direct access to the underlying store (lookups, unit scans)
    pub fn store(&self) -> &IndexStore {
        &self.store
    }
}
