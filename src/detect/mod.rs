//! Heuristic checks run against each function declaration.

mod comments;
mod errors;
mod params;
mod runner;
mod types;
mod unused;

pub use comments::detect_missing_comment;
pub use errors::detect_unhandled_errors;
pub use params::{detect_too_many_params, DEFAULT_PARAM_THRESHOLD};
pub use runner::Detector;
pub use types::{Finding, FindingKind};
pub use unused::detect_unused_vars;
