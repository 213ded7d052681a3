//! Domain error types.

use std::fmt;

/// Which validation rule a formula broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaErrorKind {
    /// Malformed tokens, unbalanced parentheses, trailing input.
    Syntax,
    /// Identifier in field position that is not an OHLCV field.
    UnknownField,
    /// Call syntax with a name outside the fixed function library.
    UnknownFunction,
    /// Wrong argument count or type for a library function.
    BadArguments,
}

impl fmt::Display for FormulaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormulaErrorKind::Syntax => "syntax error",
            FormulaErrorKind::UnknownField => "unknown field",
            FormulaErrorKind::UnknownFunction => "unknown function",
            FormulaErrorKind::BadArguments => "bad arguments",
        };
        f.write_str(s)
    }
}

/// A formula compile error with position information.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} at position {position}: {message}")]
pub struct FormulaError {
    pub kind: FormulaErrorKind,
    pub message: String,
    pub position: usize,
}

impl FormulaError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for chartmath.
#[derive(Debug, thiserror::Error)]
pub enum ChartmathError {
    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error("no indicator with id {id}")]
    NotFound { id: u64 },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ChartmathError> for std::process::ExitCode {
    fn from(err: &ChartmathError) -> Self {
        let code: u8 = match err {
            ChartmathError::Io(_) => 1,
            ChartmathError::ConfigParse { .. }
            | ChartmathError::ConfigMissing { .. }
            | ChartmathError::ConfigInvalid { .. } => 2,
            ChartmathError::Data { .. } => 3,
            ChartmathError::Formula(_) => 4,
            ChartmathError::NotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
