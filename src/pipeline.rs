//! Per-function analysis pipeline.
//!
//! For each selected file the walker yields function declarations; each
//! declaration runs through the detector and, depending on the task mode,
//! the AI stage (extract source, render prompt, call backend, parse reply).
//! Failures are isolated: a file that cannot be read or parsed is recorded
//! in its [`FileAnalysis`], and an AI-stage failure becomes an `ai_error`
//! finding on that function's result.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analysis::{FunctionDeclaration, GoWalker};
use crate::config::AnalyzeOptions;
use crate::detect::{Detector, Finding};
use crate::error::AnalysisError;
use crate::extract::extract_source;
use crate::files::select_files;
use crate::llm::{parse_response, AiSuggestion, Backend, BackendError};
use crate::prompt::{PromptBuilder, PromptContext};

/// Result for one function declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub file: String,
    pub function: String,
    /// Receiver type for methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Detected findings in detection order, then any `ai_error`.
    #[serde(rename = "issues")]
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiSuggestion>,
}

/// Outcome of analyzing one file.
#[derive(Debug)]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub outcome: Result<Vec<AnalysisResult>, AnalysisError>,
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct Analysis {
    pub files: Vec<FileAnalysis>,
    /// Set when the run stopped early on cancellation.
    pub cancelled: bool,
}

impl Analysis {
    /// Successful results in file-then-declaration order.
    pub fn results(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.files
            .iter()
            .filter_map(|f| f.outcome.as_ref().ok())
            .flatten()
    }

    /// Files that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &AnalysisError)> {
        self.files
            .iter()
            .filter_map(|f| f.outcome.as_ref().err().map(|e| (f.path.as_path(), e)))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Runs the pipeline over files and directories.
pub struct Analyzer {
    walker: GoWalker,
    detector: Detector,
    prompts: PromptBuilder,
    options: AnalyzeOptions,
    backend: Option<Box<dyn Backend>>,
}

impl Analyzer {
    /// Create an analyzer without a backend. Call [`Analyzer::with_backend`]
    /// for task modes that run the AI stage.
    pub fn new(options: AnalyzeOptions) -> Self {
        Self {
            walker: GoWalker::new(),
            detector: Detector::new().param_threshold(options.param_threshold),
            prompts: PromptBuilder::new(options.prompt_path.clone()),
            options,
            backend: None,
        }
    }

    pub fn with_backend(mut self, backend: Box<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    /// Analyze a file or a directory tree.
    ///
    /// Fails only when `root` itself cannot be read; per-file failures are
    /// recorded in the returned [`Analysis`].
    pub async fn analyze_path(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<Analysis, AnalysisError> {
        let files = select_files(root)?;
        info!(count = files.len(), root = %root.display(), "selected files");

        let mut analysis = Analysis::default();
        for path in files {
            if cancel.is_cancelled() {
                break;
            }
            let outcome = self.analyze_file(&path, cancel).await;
            if let Err(e) = &outcome {
                warn!(path = %path.display(), error = %e, "file analysis failed");
            }
            analysis.files.push(FileAnalysis { path, outcome });
        }
        analysis.cancelled = cancel.is_cancelled();
        Ok(analysis)
    }

    /// Analyze every matching function declaration in one file.
    pub async fn analyze_file(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<AnalysisResult>, AnalysisError> {
        let decls: Vec<FunctionDeclaration> = {
            let parsed = self.walker.parse_file(path)?;
            parsed
                .functions(self.options.name_filter.as_deref())
                .collect()
        };
        debug!(path = %path.display(), functions = decls.len(), "parsed file");

        let mut results = Vec::with_capacity(decls.len());
        for decl in decls {
            if cancel.is_cancelled() {
                break;
            }
            results.push(self.analyze_function(path, decl, cancel).await);
        }
        Ok(results)
    }

    async fn analyze_function(
        &self,
        path: &Path,
        decl: FunctionDeclaration,
        cancel: &CancellationToken,
    ) -> AnalysisResult {
        let mut findings = self.detector.run(&decl);
        let mut ai = None;

        if self.options.task.runs_ai() {
            match self.suggest(path, &decl, &findings, cancel).await {
                Ok(suggestion) => ai = Some(suggestion),
                Err(e) => {
                    warn!(function = %decl.qualified_name(), error = %e, "AI stage failed");
                    findings.push(Finding::ai_error(e.to_string()));
                }
            }
        }

        AnalysisResult {
            file: decl.file,
            function: decl.name,
            receiver: decl.receiver,
            findings,
            ai,
        }
    }

    async fn suggest(
        &self,
        path: &Path,
        decl: &FunctionDeclaration,
        findings: &[Finding],
        cancel: &CancellationToken,
    ) -> Result<AiSuggestion, AnalysisError> {
        let backend = self
            .backend
            .as_deref()
            .ok_or(AnalysisError::Backend(BackendError::NotConfigured))?;

        let code = extract_source(path, decl);
        let forwarded: &[Finding] = if self.options.task.forwards_findings() {
            findings
        } else {
            &[]
        };
        let prompt = self.prompts.render(&PromptContext {
            code: &code,
            findings: forwarded,
            task: self.options.task,
            focus: self.options.focus,
        })?;

        debug!(
            function = %decl.qualified_name(),
            backend = %backend.kind(),
            model = backend.model(),
            "requesting suggestion"
        );
        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BackendError::Cancelled.into()),
            reply = backend.generate(&prompt, self.options.temperature) => reply?,
        };

        Ok(parse_response(&raw, backend.response_format()))
    }
}
