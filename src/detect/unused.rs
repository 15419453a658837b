//! Detection of possibly unused local variables.
//!
//! This is a syntactic membership test: a name bound by a top-level
//! assignment counts as used if the same identifier text occurs anywhere
//! else in the body, including as a later assignment target. Shadowing is
//! not tracked, so the check under-reports.

use std::collections::HashMap;

use crate::analysis::{FunctionDeclaration, Span};

use super::{Finding, FindingKind};

/// The blank identifier.
const DISCARD: &str = "_";

/// Flag names bound by top-level assignments that never occur elsewhere.
pub fn detect_unused_vars(decl: &FunctionDeclaration) -> Vec<Finding> {
    let mut occurrences: HashMap<&str, Vec<&Span>> = HashMap::new();
    for ident in decl.body_identifiers() {
        occurrences
            .entry(ident.name.as_str())
            .or_default()
            .push(&ident.span);
    }

    let mut findings = Vec::new();
    for stmt in decl.statements() {
        let Some(assign) = &stmt.assignment else {
            continue;
        };
        for target in &assign.targets {
            if target.name == DISCARD {
                continue;
            }
            let used_elsewhere = occurrences
                .get(target.name.as_str())
                .is_some_and(|spans| spans.iter().any(|s| **s != target.span));
            if !used_elsewhere {
                findings.push(Finding::new(
                    FindingKind::UnusedVar,
                    decl.position(&target.span),
                    format!("possibly unused variable: {}", target.name),
                ));
            }
        }
    }
    findings
}
