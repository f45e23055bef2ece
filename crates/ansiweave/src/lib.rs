#![forbid(unsafe_code)]

//! ansiweave public facade crate.
//!
//! Re-exports the token-stream primitives from `ansiweave-core` and the
//! layout operations from `ansiweave-text`, plus a prelude for everyday
//! use.
//!
//! # Example
//! ```
//! use ansiweave::prelude::*;
//!
//! fn banner(title: &str) -> Result<String> {
//!     let line = truncate(title, 12, TruncatePosition::End)?;
//!     Ok(encapsulate(&line, &rounded_box()))
//! }
//!
//! let out = banner("\x1b[1mRelease notes for 0.1\x1b[22m").unwrap();
//! assert_eq!(
//!     strip_ansi(&out),
//!     "╭────────────╮\n│Release not…│\n╰────────────╯\n"
//! );
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use ansiweave_core::{
    AnsiError, EscapeKind, EscapeToken, LinkIdCounter, Matcher, Postprocess, Recognize, Registry,
    RegistryBuilder, StateTracker, TextToken, Token, TokenStream, ansi_position, insert_at, parse,
    strip_ansi, stringify,
};

// --- Text re-exports -------------------------------------------------------

pub use ansiweave_text::{
    BoxChars, BreakMode, Decorator, EncapsulateDecorator, Encapsulation, GreedyWordBreaker,
    LineBreaker, MultiDecorator, TruncatePosition, Truncator, WhiteSpace, WrapDecorator,
    WrapOptions, Wrapper, ascii_box, box_chars, curly_bracket, double_square_box, encapsulate,
    hard_wrap, padding, rounded_box, soft_wrap, square_box, truncate, truncate_with, wrap,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for ansiweave callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed escape data or a rejected decoration.
    Ansi(AnsiError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ansi(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ansi(err) => Some(err),
        }
    }
}

impl From<AnsiError> for Error {
    fn from(err: AnsiError) -> Self {
        Self::Ansi(err)
    }
}

/// Standard result type for ansiweave APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Decorator, Error, Registry, Result, TokenStream, TruncatePosition, WhiteSpace,
        WrapOptions, encapsulate, insert_at, parse, rounded_box, strip_ansi, truncate, wrap,
    };

    pub use crate::{core, text};
}

pub use ansiweave_core as core;
pub use ansiweave_text as text;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn shout(text: &str) -> Result<String> {
        Ok(insert_at(text, 0, "! ")?)
    }

    #[test]
    fn core_errors_convert() {
        let err = shout("\x1b[999mhi").unwrap_err();
        assert_eq!(
            err,
            Error::Ansi(AnsiError::InvalidCode {
                code: 999,
                position: 0
            })
        );
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), AnsiError::InvalidCode { code: 999, position: 0 }.to_string());
    }

    #[test]
    fn construction_errors_convert() {
        let chars = BoxChars {
            top: "==",
            ..BoxChars::ASCII
        };
        let err: Error = box_chars(&chars).unwrap_err().into();
        assert!(matches!(err, Error::Ansi(AnsiError::InvalidConstruction { .. })));
    }

    #[test]
    fn modules_are_reachable() {
        assert_eq!(crate::core::sgr::SGR_RESET, "\x1b[0m");
        assert_eq!(crate::text::truncate::DEFAULT_MARKER, "\x1b[2m…\x1b[0m");
    }
}
