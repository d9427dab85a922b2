//! # Project QA - Code Indexing and Retrieval for Grounded Question Answering
//!
//! The core behind a "upload a project, ask questions about it" service.
//! Uploaded source files are parsed into structural units (functions, classes,
//! methods, module blocks) with stable line-range provenance, stored per
//! project, and ranked against free-text questions so that a language model
//! receives a bounded, citable context window.
//!
//! The HTTP layer, the language-model client, and the answer presentation are
//! external collaborators. This crate only produces the `(context, citations)`
//! pair they exchange.
//!
//! ## Architecture
//!
//! ```text
//! (file_path, bytes) pairs
//!          │
//! ┌────────▼────────┐    ┌──────────────┐
//! │ Grammar Registry│───▶│  Segmenter   │  tree-sitter, 12 languages
//! └─────────────────┘    └──────┬───────┘
//!                               │ CodeUnits
//!                        ┌──────▼───────┐
//!                        │  IndexStore  │  per-project, atomic swap
//!                        └──────┬───────┘
//!        question               │
//!          │             ┌──────▼───────┐    ┌───────────────────┐
//!          └────────────▶│  Retriever   │───▶│ Context Assembler │
//!                        └──────────────┘    └───────────────────┘
//!                                             (context, citations)
//! ```
//!
//! ## Modules
//!
//! - [`indexer`]: language detection and structural segmentation
//! - [`index_store`]: per-project unit storage with atomic replacement
//! - [`retriever`]: lexical relevance ranking
//! - [`context`]: bounded context assembly with citations
//! - [`service`]: façade wiring indexing and retrieval together
//! - [`config`]: tunable scoring weights and budgets
//! - [`types`]: boundary data model (units, citations, results)
//! - [`error`]: error types and result alias
//!
//! ## Usage Example
//!
//! ```no_run
//! use project_qa::service::QaService;
//! use project_qa::types::{Query, SourceFile};
//!
//! fn main() -> anyhow::Result<()> {
//!     let service = QaService::with_defaults();
//!     let files = vec![SourceFile::new("src/app.py", "def run():\n    pass\n")];
//!     let result = service.analyze("demo", &files)?;
//!     println!("indexed {} units", result.unit_count);
//!
//!     let payload = service.prepare(&Query::new("demo", "where is run defined"), None)?;
//!     println!("{}", payload.context);
//!     Ok(())
//! }
//! ```

/// Tunable retrieval weights and context budgets
pub mod config;

/// Bounded context assembly with parallel citation records
pub mod context;

/// Error types and utilities
pub mod error;

/// Per-project unit storage with atomic replacement
pub mod index_store;

/// Language detection and structural segmentation
pub mod indexer;

/// Lexical relevance ranking over indexed units
pub mod retriever;

/// High-level façade over indexing and retrieval
pub mod service;

/// Boundary data model shared with external collaborators
pub mod types;
