#![forbid(unsafe_code)]

//! Error type shared by every fallible ANSI operation.

use std::fmt;

/// Errors raised while lexing, resolving, or splicing ANSI text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnsiError {
    /// An SGR parameter matches no opener, no closer of an open attribute,
    /// and no universal closer.
    InvalidCode {
        /// The offending parameter value.
        code: u32,
        /// Index of the parameter in the resolved code history.
        position: usize,
    },
    /// An SGR parameter too large to represent. Carries the digits as
    /// written.
    CodeOutOfRange {
        /// The parameter text.
        digits: String,
        /// Index of the parameter in the code history.
        position: usize,
    },
    /// A decoration (or other collaborator) was configured with values it
    /// cannot honour. Raised before any text is processed.
    InvalidConstruction {
        /// What was wrong.
        reason: String,
    },
    /// An internal invariant did not hold. Never caused by user input.
    ImpossibleState {
        /// Where the invariant broke.
        context: &'static str,
    },
}

impl AnsiError {
    /// Shorthand for an [`AnsiError::InvalidConstruction`].
    pub fn invalid_construction(reason: impl Into<String>) -> Self {
        Self::InvalidConstruction {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AnsiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCode { code, position } => {
                write!(f, "invalid SGR code {code} at parameter {position}")
            }
            Self::CodeOutOfRange { digits, position } => {
                write!(f, "SGR code {digits} at parameter {position} is out of range")
            }
            Self::InvalidConstruction { reason } => write!(f, "invalid construction: {reason}"),
            Self::ImpossibleState { context } => write!(f, "impossible state: {context}"),
        }
    }
}

impl std::error::Error for AnsiError {}

/// Result alias for ANSI operations.
pub type Result<T> = std::result::Result<T, AnsiError>;
