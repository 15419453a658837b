//! Detection of long parameter lists.

use crate::analysis::FunctionDeclaration;

use super::{Finding, FindingKind};

/// Parameter count at which a function is flagged.
pub const DEFAULT_PARAM_THRESHOLD: usize = 5;

/// Flag a declaration binding `threshold` or more parameter names.
///
/// `a, b int` counts as two; an unnamed parameter counts as one. The
/// receiver of a method is not a parameter.
pub fn detect_too_many_params(decl: &FunctionDeclaration, threshold: usize) -> Option<Finding> {
    let count = decl.param_count();
    if count < threshold {
        return None;
    }
    Some(Finding::new(
        FindingKind::TooManyParams,
        decl.position(&decl.span),
        format!("too many parameters: {}", count),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testutil::parse_one;

    #[test]
    fn test_grouped_params_counted_individually() {
        let decl = parse_one("package main\nfunc f(a, b, c int, d, e string) {}\n");
        let finding = detect_too_many_params(&decl, DEFAULT_PARAM_THRESHOLD).unwrap();
        assert_eq!(finding.kind, FindingKind::TooManyParams);
        assert!(finding.message.contains('5'));
    }

    #[test]
    fn test_below_threshold() {
        let decl = parse_one("package main\nfunc f(a, b, c, d int) {}\n");
        assert!(detect_too_many_params(&decl, DEFAULT_PARAM_THRESHOLD).is_none());
    }

    #[test]
    fn test_receiver_not_counted() {
        let decl = parse_one("package main\nfunc (s *S) f(a, b, c, d int) {}\n");
        assert!(detect_too_many_params(&decl, DEFAULT_PARAM_THRESHOLD).is_none());
    }

    #[test]
    fn test_unnamed_params() {
        let decl = parse_one("package main\nfunc f(int, int, string, bool, error) {}\n");
        assert!(detect_too_many_params(&decl, DEFAULT_PARAM_THRESHOLD).is_some());
    }
}
