//! Structured error kinds shared by every fallible operation in the engine.
//!
//! Solvers never catch their own errors; a caller sees exactly one of
//! these per failed request.

use thiserror::Error;

/// The single error type returned across parsing, construction and
/// solving. No partial state is left behind on any of these.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed graph/grammar/regex/query input.
    #[error("parse error: {0}")]
    Parse(String),

    /// The JSON query lacks a recognized key set.
    #[error("invalid query shape: {0}")]
    InvalidQuery(String),

    /// A dialect feature the regex/grammar normalizer cannot translate.
    #[error("unsupported regex feature: {0}")]
    UnsupportedRegexFeature(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
