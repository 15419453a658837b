//! Detection runner that applies every heuristic to one declaration.

use crate::analysis::FunctionDeclaration;

use super::{
    detect_missing_comment, detect_too_many_params, detect_unhandled_errors, detect_unused_vars,
    Finding, DEFAULT_PARAM_THRESHOLD,
};

/// Runs the four function-level heuristics.
///
/// Findings come back in a fixed order: doc comment, parameter count,
/// unused variables, then unhandled errors. Nothing is deduplicated.
#[derive(Debug, Clone)]
pub struct Detector {
    param_threshold: usize,
}

impl Detector {
    /// Create a detector with default thresholds.
    pub fn new() -> Self {
        Self {
            param_threshold: DEFAULT_PARAM_THRESHOLD,
        }
    }

    /// Set the parameter count at which `too_many_params` fires.
    pub fn param_threshold(mut self, threshold: usize) -> Self {
        self.param_threshold = threshold;
        self
    }

    /// Run all checks against a declaration.
    pub fn run(&self, decl: &FunctionDeclaration) -> Vec<Finding> {
        let mut findings = Vec::new();
        findings.extend(detect_missing_comment(decl));
        findings.extend(detect_too_many_params(decl, self.param_threshold));
        findings.extend(detect_unused_vars(decl));
        findings.extend(detect_unhandled_errors(decl));
        findings
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testutil::parse_one;
    use crate::detect::FindingKind;

    fn kinds(findings: &[Finding]) -> Vec<FindingKind> {
        findings.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn test_zero_params_undocumented() {
        let decl = parse_one("package main\nfunc noop() {}\n");
        let findings = Detector::new().run(&decl);
        assert_eq!(kinds(&findings), vec![FindingKind::MissingComment]);
    }

    #[test]
    fn test_detection_order() {
        let decl = parse_one(
            r#"package main

func process(data []int, flag bool, name string, retry int, verbose bool) (int, error) {
	sum := 0
	err := doSomething(sum)
	unused := 2
	return sum, err
}
"#,
        );
        let findings = Detector::new().run(&decl);
        assert_eq!(
            kinds(&findings),
            vec![
                FindingKind::MissingComment,
                FindingKind::TooManyParams,
                FindingKind::UnusedVar,
                FindingKind::UnhandledError,
            ]
        );
    }

    #[test]
    fn test_repeat_runs_identical() {
        let decl = parse_one("package main\nfunc f() {\n\terr := g()\n\t_ = err\n}\n");
        let detector = Detector::new();
        assert_eq!(detector.run(&decl), detector.run(&decl));
    }

    #[test]
    fn test_custom_threshold() {
        let decl = parse_one("package main\n\n// f does it.\nfunc f(a, b int) {}\n");
        assert!(Detector::new().run(&decl).is_empty());
        let findings = Detector::new().param_threshold(2).run(&decl);
        assert_eq!(kinds(&findings), vec![FindingKind::TooManyParams]);
    }

    #[test]
    fn test_forward_declaration_without_body() {
        let decl = parse_one("package main\n\n// now is implemented in assembly.\nfunc now() int64\n");
        assert!(decl.body.is_none());
        assert!(Detector::new().run(&decl).is_empty());
    }
}
