//! Prompt rendering from an operator-supplied template.
//!
//! The template is read from disk on every render so edits take effect
//! between functions without restarting a run.

use std::fs;
use std::path::PathBuf;

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::config::{Focus, TaskMode};
use crate::detect::Finding;
use crate::error::AnalysisError;

const TEMPLATE_NAME: &str = "prompt";

/// Values exposed to the template.
#[derive(Debug, Serialize)]
pub struct PromptContext<'a> {
    pub code: &'a str,
    pub findings: &'a [Finding],
    pub task: TaskMode,
    pub focus: Focus,
}

/// Renders prompts from a template file.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    path: PathBuf,
}

impl PromptBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Render the template against `ctx`.
    ///
    /// A missing or unparsable template is a `Template` error; referencing a
    /// variable that is not in `ctx` is a `Render` error.
    pub fn render(&self, ctx: &PromptContext<'_>) -> Result<String, AnalysisError> {
        let source = fs::read_to_string(&self.path).map_err(|e| {
            AnalysisError::Template(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(TEMPLATE_NAME, &source)
            .map_err(|e| AnalysisError::Template(format!("{}: {}", self.path.display(), e)))?;

        let template = env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| AnalysisError::Template(e.to_string()))?;
        template
            .render(ctx)
            .map_err(|e| AnalysisError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::FindingKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn template(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn findings() -> Vec<Finding> {
        vec![Finding::new(
            FindingKind::MissingComment,
            "a.go:3:1",
            "add has no doc comment",
        )]
    }

    #[test]
    fn test_render_substitutes_all_fields() {
        let file = template(
            "task={{ task }} focus={{ focus }}\n{% for f in findings %}[{{ f.kind }}] {{ f.pos }}: {{ f.message }}\n{% endfor %}{{ code }}",
        );
        let findings = findings();
        let out = PromptBuilder::new(file.path())
            .render(&PromptContext {
                code: "func add() {}",
                findings: &findings,
                task: TaskMode::Both,
                focus: Focus::Refactor,
            })
            .unwrap();
        assert_eq!(
            out,
            "task=both focus=refactor\n[missing_comment] a.go:3:1: add has no doc comment\nfunc add() {}"
        );
    }

    #[test]
    fn test_missing_template() {
        let err = PromptBuilder::new("/nonexistent/prompt.txt")
            .render(&PromptContext {
                code: "",
                findings: &[],
                task: TaskMode::Both,
                focus: Focus::All,
            })
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Template(_)));
    }

    #[test]
    fn test_syntax_error_is_template_error() {
        let file = template("{% for f in findings %}unterminated");
        let err = PromptBuilder::new(file.path())
            .render(&PromptContext {
                code: "",
                findings: &[],
                task: TaskMode::Ai,
                focus: Focus::All,
            })
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Template(_)));
    }

    #[test]
    fn test_unknown_field_is_render_error() {
        let file = template("{{ code }} {{ issues }}");
        let err = PromptBuilder::new(file.path())
            .render(&PromptContext {
                code: "x",
                findings: &[],
                task: TaskMode::Both,
                focus: Focus::All,
            })
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Render(_)));
    }

    #[test]
    fn test_template_is_reread() {
        let file = template("one");
        let builder = PromptBuilder::new(file.path());
        let ctx = PromptContext {
            code: "",
            findings: &[],
            task: TaskMode::Both,
            focus: Focus::All,
        };
        assert_eq!(builder.render(&ctx).unwrap(), "one");

        fs::write(file.path(), "two").unwrap();
        assert_eq!(builder.render(&ctx).unwrap(), "two");
    }
}
