//! gocodeai - function-level Go code review.
//!
//! gocodeai walks Go sources, runs a fixed set of heuristics against every
//! function declaration and, optionally, asks a language model for a
//! summary, a doc comment and refactoring ideas.
//!
//! # Architecture
//!
//! - `files`: selects `.go` files under a path, skipping `_test.go`
//! - `analysis`: tree-sitter walker producing function declaration facts
//! - `detect`: heuristics that consume those facts and emit findings
//! - `extract`: re-reads a declaration's exact source text
//! - `prompt`: renders the operator's prompt template
//! - `llm`: backends (Ollama, Gemini) and completion parsing
//! - `pipeline`: runs everything per function and aggregates results
//! - `report`: output formatting (text, JSON)
//!
//! # Example
//!
//! ```no_run
//! use gocodeai::{AnalyzeOptions, Analyzer, TaskMode};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), gocodeai::AnalysisError> {
//! let options = AnalyzeOptions {
//!     task: TaskMode::Static,
//!     ..Default::default()
//! };
//! let analysis = Analyzer::new(options)
//!     .analyze_path("src".as_ref(), &CancellationToken::new())
//!     .await?;
//! for result in analysis.results() {
//!     println!("{} {}: {} findings", result.file, result.function, result.findings.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod files;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod report;

pub use analysis::{FunctionDeclaration, GoWalker, ParsedFile};
pub use config::{AnalyzeOptions, BackendConfig, FileConfig, Focus, TaskMode};
pub use detect::{Detector, Finding, FindingKind};
pub use error::AnalysisError;
pub use llm::{create_backend, AiSuggestion, Backend, BackendError, BackendKind};
pub use pipeline::{Analysis, AnalysisResult, Analyzer, FileAnalysis};
pub use prompt::{PromptBuilder, PromptContext};
