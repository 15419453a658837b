//! Fact structures extracted from a Go function declaration.
//!
//! Everything here is owned data copied out of the tree-sitter tree, so a
//! `FunctionDeclaration` outlives the parse that produced it.

use std::fmt;

/// Source location: byte range plus the 1-indexed start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed, in bytes).
    pub start_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// One parameter group, e.g. `a, b, c int` or an unnamed `string`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Names bound by this group; empty for an unnamed parameter.
    pub names: Vec<String>,
}

impl Parameter {
    /// Number of parameters this group contributes to the signature.
    pub fn arity(&self) -> usize {
        self.names.len().max(1)
    }
}

/// An assignment (`=`, `:=`, `op=`) or a `case v := <-ch` receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Plain identifiers on the left-hand side, in order.
    /// Selector and index targets are not included.
    pub targets: Vec<Ident>,
}

/// A statement directly inside a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Set when the statement itself is an assignment.
    pub assignment: Option<Assignment>,
    /// Assignments nested anywhere inside the statement, in source order.
    pub nested: Vec<Assignment>,
}

impl Statement {
    /// All assignments in this statement, own first, then nested.
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignment.iter().chain(self.nested.iter())
    }
}

/// The body of a function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionBody {
    /// Top-level statements, comments excluded.
    pub statements: Vec<Statement>,
    /// Every identifier occurrence in the body, in source order. Includes
    /// field, type and package identifiers.
    pub identifiers: Vec<Ident>,
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    /// File path as given to the walker, used in positions.
    pub file: String,
    pub name: String,
    /// Receiver type name for methods (e.g. `Config` for `func (c *Config) Run()`).
    pub receiver: Option<String>,
    pub params: Vec<Parameter>,
    /// Text of the leading doc comment group, markers stripped.
    pub doc: Option<String>,
    /// Span of the whole declaration, from `func` to the closing brace.
    pub span: Span,
    /// `None` for declarations without a body (e.g. assembly-backed funcs).
    pub body: Option<FunctionBody>,
}

impl FunctionDeclaration {
    /// Name qualified by receiver for methods (`Config.Run`).
    pub fn qualified_name(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{}.{}", recv, self.name),
            None => self.name.clone(),
        }
    }

    /// Human-readable `file:line:column` for a span in this declaration.
    pub fn position(&self, span: &Span) -> String {
        format!("{}:{}", self.file, span)
    }

    /// Number of bound parameter names.
    pub fn param_count(&self) -> usize {
        self.params.iter().map(Parameter::arity).sum()
    }

    /// Body statements; empty when the declaration has no body.
    pub fn statements(&self) -> &[Statement] {
        self.body
            .as_ref()
            .map(|b| b.statements.as_slice())
            .unwrap_or(&[])
    }

    /// Identifier occurrences in the body; empty when there is no body.
    pub fn body_identifiers(&self) -> &[Ident] {
        self.body
            .as_ref()
            .map(|b| b.identifiers.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a non-empty doc comment is attached.
    pub fn has_doc(&self) -> bool {
        self.doc.as_deref().is_some_and(|d| !d.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: usize, col: usize) -> Span {
        Span {
            start_line: line,
            start_col: col,
            ..Default::default()
        }
    }

    fn decl(params: Vec<Parameter>) -> FunctionDeclaration {
        FunctionDeclaration {
            file: "main.go".to_string(),
            name: "Run".to_string(),
            receiver: None,
            params,
            doc: None,
            span: span(3, 1),
            body: None,
        }
    }

    #[test]
    fn test_param_count_groups() {
        let d = decl(vec![
            Parameter {
                names: vec!["a".into(), "b".into(), "c".into()],
            },
            Parameter { names: vec![] },
        ]);
        assert_eq!(d.param_count(), 4);
    }

    #[test]
    fn test_position_and_qualified_name() {
        let mut d = decl(vec![]);
        assert_eq!(d.position(&d.span), "main.go:3:1");
        assert_eq!(d.qualified_name(), "Run");

        d.receiver = Some("Server".into());
        assert_eq!(d.qualified_name(), "Server.Run");
    }

    #[test]
    fn test_missing_body_is_empty() {
        let d = decl(vec![]);
        assert!(d.statements().is_empty());
        assert!(d.body_identifiers().is_empty());
    }

    #[test]
    fn test_blank_doc_is_not_doc() {
        let mut d = decl(vec![]);
        d.doc = Some("   ".into());
        assert!(!d.has_doc());
        d.doc = Some("Run starts the server.".into());
        assert!(d.has_doc());
    }
}
