//! Extraction of a declaration's source text.

use std::path::Path;

use tracing::warn;

use crate::analysis::FunctionDeclaration;

/// Re-read `path` and return the text of `decl`'s span.
///
/// Falls back to the function name if the file cannot be read or the span
/// does not fit the file as it is now.
pub fn extract_source(path: &Path, decl: &FunctionDeclaration) -> String {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot re-read source, using function name");
            return decl.name.clone();
        }
    };

    let (start, end) = (decl.span.start_byte, decl.span.end_byte);
    if start >= end || end > bytes.len() {
        warn!(path = %path.display(), function = %decl.name, "declaration span out of range");
        return decl.name.clone();
    }
    String::from_utf8_lossy(&bytes[start..end]).into_owned()
}
