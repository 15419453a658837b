//! AST-backed Go declaration analysis.
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌─────────────────────┐
//! │ Go source file  │────▶│ GoWalker     │────▶│ FunctionDeclaration │
//! └─────────────────┘     │ (tree-sitter)│     │ (params, doc, body) │
//!                         └──────────────┘     └─────────────────────┘
//! ```
//!
//! The walker copies everything the detectors need out of the tree, so the
//! tree can be dropped as soon as a declaration has been produced.

mod facts;
mod walker;

pub use facts::{
    Assignment, FunctionBody, FunctionDeclaration, Ident, Parameter, Span, Statement,
};
pub use walker::{Functions, GoWalker, ParsedFile};
