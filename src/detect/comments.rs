//! Detection of functions without a doc comment.

use crate::analysis::FunctionDeclaration;

use super::{Finding, FindingKind};

/// Flag a declaration with no leading doc comment, or a blank one.
pub fn detect_missing_comment(decl: &FunctionDeclaration) -> Option<Finding> {
    if decl.has_doc() {
        return None;
    }
    Some(Finding::new(
        FindingKind::MissingComment,
        decl.position(&decl.span),
        format!("{} has no doc comment", decl.name),
    ))
}
