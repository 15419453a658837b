//! Detection of error values that may be left unhandled.
//!
//! Any assignment to `err`, at any nesting depth, is flagged, whether or
//! not the value is checked afterwards. It points a reviewer at every
//! error binding rather than proving one is ignored.

use crate::analysis::FunctionDeclaration;

use super::{Finding, FindingKind};

/// Conventional name of an error-carrying variable.
const ERROR_NAME: &str = "err";

/// Flag every `err` assignment target in the body.
pub fn detect_unhandled_errors(decl: &FunctionDeclaration) -> Vec<Finding> {
    decl.statements()
        .iter()
        .flat_map(|stmt| stmt.assignments())
        .flat_map(|assign| assign.targets.iter())
        .filter(|target| target.name == ERROR_NAME)
        .map(|target| {
            Finding::new(
                FindingKind::UnhandledError,
                decl.position(&target.span),
                "check how this error is handled",
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testutil::parse_one;

    #[test]
    fn test_flags_even_when_checked() {
        let decl = parse_one(
            "package main\nfunc f() error {\n\terr := doWork()\n\tif err != nil {\n\t\treturn err\n\t}\n\treturn nil\n}\n",
        );
        let findings = detect_unhandled_errors(&decl);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::UnhandledError);
        assert_eq!(findings[0].pos, "test.go:3:2");
    }

    #[test]
    fn test_nested_and_multi_target() {
        let decl = parse_one(
            "package main\nfunc f() {\n\tv, err := a()\n\tfor {\n\t\tif err = b(v); err != nil {\n\t\t\tbreak\n\t\t}\n\t}\n}\n",
        );
        assert_eq!(detect_unhandled_errors(&decl).len(), 2);
    }

    #[test]
    fn test_other_names_ignored() {
        let decl = parse_one("package main\nfunc f() {\n\terror2 := a()\n\t_ = error2\n}\n");
        assert!(detect_unhandled_errors(&decl).is_empty());
    }
}
