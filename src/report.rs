//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - Pretty: colored, grouped per function for terminals
//! - JSON: an array of `{file, function, issues, ai}` records

use colored::*;
use std::fmt::Write as _;
use std::path::Path;

use crate::detect::FindingKind;
use crate::error::AnalysisError;
use crate::llm::AiSuggestion;
use crate::pipeline::{Analysis, AnalysisResult};

// =============================================================================
// JSON Format
// =============================================================================

/// Serialize results as a pretty-printed JSON array.
pub fn to_json(results: &[&AnalysisResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// Write results in JSON format to stdout.
pub fn write_json(analysis: &Analysis) -> anyhow::Result<()> {
    let results: Vec<&AnalysisResult> = analysis.results().collect();
    println!("{}", to_json(&results)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Render results as grouped text, one block per function.
pub fn render_pretty(results: &[&AnalysisResult]) -> String {
    let mut out = String::new();
    for r in results {
        let _ = writeln!(out);
        let name = match &r.receiver {
            Some(recv) => format!("({}).{}", recv, r.function),
            None => r.function.clone(),
        };
        let _ = writeln!(out, "== {} {} ==", r.file.blue(), name.bold());

        for f in &r.findings {
            let kind = format!("[{}]", f.kind);
            let kind = if f.kind == FindingKind::AiError {
                kind.red()
            } else {
                kind.yellow()
            };
            let _ = writeln!(out, "- {} {}: {}", kind, f.pos.dimmed(), f.message);
        }

        if let Some(ai) = &r.ai {
            let _ = writeln!(out, "{}", "-- AI Suggestions --".cyan());
            render_suggestion(&mut out, ai);
        }
    }
    out
}

fn render_suggestion(out: &mut String, ai: &AiSuggestion) {
    match ai {
        AiSuggestion::Structured(s) => {
            if !s.summary.is_empty() {
                let _ = writeln!(out, "{} {}", "Summary:".bold(), s.summary);
            }
            if !s.comment_suggestion.is_empty() {
                let _ = writeln!(out, "{} {}", "Comment:".bold(), s.comment_suggestion);
            }
            render_list(out, "Better Var Names:", &s.better_var_names);
            render_list(out, "Improvements:", &s.improvements);
        }
        AiSuggestion::Raw { output, truncated } => {
            let _ = writeln!(out, "{}", output);
            if *truncated {
                let _ = writeln!(out, "{}", "(truncated)".dimmed());
            }
        }
    }
}

fn render_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}", title.bold());
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

/// Write results in pretty format to stdout.
pub fn write_pretty(analysis: &Analysis) {
    let results: Vec<&AnalysisResult> = analysis.results().collect();
    print!("{}", render_pretty(&results));

    if results.is_empty() {
        println!("{}", "No functions analyzed.".dimmed());
    }
}

/// List failed files on stderr.
pub fn write_failures(analysis: &Analysis) {
    for (path, err) in analysis.failures() {
        write_failure(path, err);
    }
    if analysis.cancelled {
        eprintln!("{}", "Run cancelled; results are partial.".yellow());
    }
}

fn write_failure(path: &Path, err: &AnalysisError) {
    eprintln!("{} {}: {}", "error".red().bold(), path.display(), err);
}
