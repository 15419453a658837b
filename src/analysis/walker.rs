//! Go declaration walker using tree-sitter.
//!
//! Parses a Go file and yields its function and method declarations lazily,
//! in source order. Each declaration is copied out of the tree as owned
//! facts (parameters, leading doc comment, body statements, identifiers).

use std::path::Path;

use tracing::debug;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::analysis::{
    Assignment, FunctionBody, FunctionDeclaration, Ident, Parameter, Span, Statement,
};
use crate::error::AnalysisError;

/// Node kinds allowed directly inside a `source_file`.
const TOP_LEVEL_KINDS: &[&str] = &[
    "package_clause",
    "import_declaration",
    "function_declaration",
    "method_declaration",
    "type_declaration",
    "var_declaration",
    "const_declaration",
    "comment",
];

/// Node kinds that count as identifier occurrences inside a body.
const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "field_identifier",
    "type_identifier",
    "package_identifier",
];

/// Holds a parsed tree-sitter tree and the bytes it was parsed from.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path, as given by the caller.
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Lazily iterate over function and method declarations in source order.
    ///
    /// With a `name_filter`, only declarations whose name matches exactly are
    /// yielded.
    pub fn functions<'a>(&'a self, name_filter: Option<&'a str>) -> Functions<'a> {
        Functions {
            parsed: self,
            stack: vec![self.tree.root_node()],
            name_filter,
        }
    }
}

/// Iterator over the function declarations of a [`ParsedFile`].
pub struct Functions<'a> {
    parsed: &'a ParsedFile,
    stack: Vec<Node<'a>>,
    name_filter: Option<&'a str>,
}

impl Iterator for Functions<'_> {
    type Item = FunctionDeclaration;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if matches!(node.kind(), "function_declaration" | "method_declaration") {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.parsed.node_text(n))
                    .unwrap_or("");
                if self.name_filter.is_some_and(|f| f != name) {
                    continue;
                }
                return Some(extract_declaration(self.parsed, node));
            }

            // Push children in reverse so they pop in source order.
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            self.stack.extend(children.into_iter().rev());
        }
        None
    }
}

/// Go declaration walker.
pub struct GoWalker {
    language: Language,
}

impl GoWalker {
    /// Create a new Go walker.
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Create a new parser for this call.
    fn create_parser(&self, path: &Path) -> Result<Parser, AnalysisError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| AnalysisError::Syntax {
                path: path.to_path_buf(),
                line: 0,
                column: 0,
                message: format!("loading Go grammar: {}", e),
            })?;
        Ok(parser)
    }

    /// Read and parse a Go file.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedFile, AnalysisError> {
        let source = std::fs::read(path).map_err(|e| AnalysisError::io(path, e))?;
        self.parse_source(path, source)
    }

    /// Parse Go source. Fails with `Syntax` if the tree contains any error,
    /// if the file does not start with a package clause, or if a statement
    /// appears outside a function.
    pub fn parse_source(&self, path: &Path, source: Vec<u8>) -> Result<ParsedFile, AnalysisError> {
        let mut parser = self.create_parser(path)?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| AnalysisError::Syntax {
                path: path.to_path_buf(),
                line: 0,
                column: 0,
                message: "parser returned no tree".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let bad = first_error_node(root).unwrap_or(root);
            let pos = bad.start_position();
            let message = if bad.is_missing() {
                format!("missing {}", bad.kind())
            } else {
                let text = bad.utf8_text(&source).unwrap_or("");
                let snippet: String = text.chars().take(40).collect();
                format!("unexpected `{}`", snippet.trim())
            };
            debug!(path = %path.display(), line = pos.row + 1, "syntax error");
            return Err(AnalysisError::Syntax {
                path: path.to_path_buf(),
                line: pos.row + 1,
                column: pos.column + 1,
                message,
            });
        }

        check_top_level(path, root)?;

        Ok(ParsedFile {
            tree,
            source,
            path: path.to_string_lossy().to_string(),
        })
    }
}

impl Default for GoWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject files tree-sitter accepts but the Go compiler does not: a missing
/// package clause and statements at file scope.
fn check_top_level(path: &Path, root: Node) -> Result<(), AnalysisError> {
    let syntax = |node: Node, message: String| AnalysisError::Syntax {
        path: path.to_path_buf(),
        line: node.start_position().row + 1,
        column: node.start_position().column + 1,
        message,
    };

    let mut cursor = root.walk();
    let mut seen_package = false;
    for child in root.named_children(&mut cursor) {
        let kind = child.kind();
        if kind == "comment" {
            continue;
        }
        if !seen_package {
            if kind != "package_clause" {
                return Err(syntax(child, "expected package clause".to_string()));
            }
            seen_package = true;
        } else if kind == "package_clause" || !TOP_LEVEL_KINDS.contains(&kind) {
            return Err(syntax(child, format!("unexpected {} at top level", kind)));
        }
    }

    if !seen_package {
        return Err(syntax(root, "expected package clause".to_string()));
    }
    Ok(())
}

/// Find the first ERROR or MISSING node in preorder.
fn first_error_node(root: Node) -> Option<Node> {
    if root.is_error() || root.is_missing() {
        return Some(root);
    }
    let mut cursor = root.walk();
    let children: Vec<_> = root.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(first_error_node)
}

/// Visit every descendant of `node` in preorder, excluding `node` itself.
fn visit_descendants<'t>(node: Node<'t>, f: &mut impl FnMut(Node<'t>)) {
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    for child in children {
        f(child);
        visit_descendants(child, f);
    }
}

fn extract_declaration(parsed: &ParsedFile, node: Node) -> FunctionDeclaration {
    let name = node
        .child_by_field_name("name")
        .map(|n| parsed.node_text(n).to_string())
        .unwrap_or_default();

    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|r| extract_receiver_type(parsed, r));

    let params = node
        .child_by_field_name("parameters")
        .map(|p| extract_parameters(parsed, p))
        .unwrap_or_default();

    let body = node
        .child_by_field_name("body")
        .map(|b| extract_body(parsed, b));

    FunctionDeclaration {
        file: parsed.path.clone(),
        name,
        receiver,
        params,
        doc: extract_doc_comment(parsed, node),
        span: Span::from_node(node),
        body,
    }
}

/// Receiver base type, with pointer and type arguments removed.
fn extract_receiver_type(parsed: &ParsedFile, receiver: Node) -> Option<String> {
    let mut cursor = receiver.walk();
    let param = receiver
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;
    let mut ty = param.child_by_field_name("type")?;
    loop {
        match ty.kind() {
            "pointer_type" => ty = ty.named_child(0)?,
            "generic_type" => ty = ty.child_by_field_name("type")?,
            _ => break,
        }
    }
    Some(parsed.node_text(ty).to_string())
}

fn extract_parameters(parsed: &ParsedFile, list: Node) -> Vec<Parameter> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|n| {
            matches!(
                n.kind(),
                "parameter_declaration" | "variadic_parameter_declaration"
            )
        })
        .map(|p| {
            let mut names_cursor = p.walk();
            let names = p
                .children_by_field_name("name", &mut names_cursor)
                .map(|n| parsed.node_text(n).to_string())
                .collect();
            Parameter { names }
        })
        .collect()
}

/// Collect the comment group that ends on the line right above `decl`.
///
/// A comment sharing a line with preceding code (including a `;`) is a
/// trailing comment and ends the group.
fn extract_doc_comment(parsed: &ParsedFile, decl: Node) -> Option<String> {
    let mut lines = Vec::new();
    let mut expected_row = decl.start_position().row;
    let mut current = decl.prev_sibling();

    while let Some(prev) = current {
        if prev.kind() != "comment" || prev.end_position().row + 1 != expected_row {
            break;
        }
        if let Some(before) = prev.prev_sibling() {
            // A newline terminator ends on the comment's row but holds no code.
            if before.kind() != "comment"
                && before.end_position().row == prev.start_position().row
                && !parsed.node_text(before).trim().is_empty()
            {
                break;
            }
        }
        lines.push(strip_comment_markers(parsed.node_text(prev)));
        expected_row = prev.start_position().row;
        current = prev.prev_sibling();
    }

    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n").trim().to_string())
}

fn strip_comment_markers(text: &str) -> String {
    if let Some(rest) = text.strip_prefix("//") {
        rest.trim().to_string()
    } else {
        let inner = text.strip_prefix("/*").unwrap_or(text);
        let inner = inner.strip_suffix("*/").unwrap_or(inner);
        inner
            .lines()
            .map(|l| l.trim().trim_start_matches('*').trim())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

fn extract_body(parsed: &ParsedFile, block: Node) -> FunctionBody {
    let statements = top_level_statements(block)
        .into_iter()
        .map(|stmt| {
            let mut nested = Vec::new();
            visit_descendants(stmt, &mut |n| {
                if is_assignment(n) {
                    nested.push(extract_assignment(parsed, n));
                }
            });
            Statement {
                assignment: is_assignment(stmt).then(|| extract_assignment(parsed, stmt)),
                nested,
            }
        })
        .collect();

    let mut identifiers = Vec::new();
    visit_descendants(block, &mut |n| {
        if IDENTIFIER_KINDS.contains(&n.kind()) {
            identifiers.push(Ident {
                name: parsed.node_text(n).to_string(),
                span: Span::from_node(n),
            });
        }
    });

    FunctionBody {
        statements,
        identifiers,
    }
}

/// Statements directly inside a block, flattening a `statement_list` wrapper.
fn top_level_statements(block: Node) -> Vec<Node> {
    let mut cursor = block.walk();
    let mut out = Vec::new();
    for child in block.named_children(&mut cursor) {
        match child.kind() {
            "comment" => {}
            "statement_list" => {
                let mut inner = child.walk();
                out.extend(
                    child
                        .named_children(&mut inner)
                        .filter(|n| n.kind() != "comment"),
                );
            }
            _ => out.push(child),
        }
    }
    out
}

fn is_assignment(node: Node) -> bool {
    match node.kind() {
        "short_var_declaration" | "assignment_statement" => true,
        "receive_statement" => node.child_by_field_name("left").is_some(),
        _ => false,
    }
}

fn extract_assignment(parsed: &ParsedFile, node: Node) -> Assignment {
    let targets = match node.child_by_field_name("left") {
        Some(left) if left.kind() == "identifier" => vec![ident(parsed, left)],
        Some(left) => {
            let mut cursor = left.walk();
            left.named_children(&mut cursor)
                .filter(|n| n.kind() == "identifier")
                .map(|n| ident(parsed, n))
                .collect()
        }
        None => Vec::new(),
    };

    Assignment { targets }
}

fn ident(parsed: &ParsedFile, node: Node) -> Ident {
    Ident {
        name: parsed.node_text(node).to_string(),
        span: Span::from_node(node),
    }
}
