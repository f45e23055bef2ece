#![forbid(unsafe_code)]

//! ANSI-aware token streams.
//!
//! `ansiweave-core` splits text interleaved with terminal escape sequences
//! into tokens, tracks the styling and hyperlink state those sequences
//! encode, and splices new text in without corrupting that state.
//!
//! # Primary responsibilities
//!
//! - **Catalog**: escape introducers and the recognizers for SGR, OSC 8
//!   hyperlinks, and pass-through cursor/status forms.
//! - **Registry**: immutable set of matchers, postprocessors, and state
//!   trackers; extensible by third parties.
//! - **Lexer**: earliest-then-longest matching into a contiguous
//!   [`TokenStream`].
//! - **SGR**: simplify/close algebra over code histories.
//! - **Hyperlink**: id normalization and open-link tracking.
//! - **Splice**: visible-to-raw position mapping and safe insertion.
//!
//! # Example
//! ```
//! use ansiweave_core::{insert_at, strip_ansi};
//!
//! let text = "\x1b[31mredred\x1b[39m";
//! assert_eq!(strip_ansi(text), "redred");
//! assert_eq!(
//!     insert_at(text, 3, "|").unwrap(),
//!     "\x1b[31mred\x1b[39m|\x1b[31mred\x1b[39m"
//! );
//! ```

pub mod catalog;
pub mod error;
pub mod hyperlink;
pub mod lexer;
pub mod matcher;
pub mod registry;
pub mod sgr;
pub mod splice;
pub mod token;

pub use catalog::EscapeKind;
pub use error::{AnsiError, Result};
pub use hyperlink::{HyperlinkNormalize, HyperlinkTracker, LinkIdCounter, last_open_link};
pub use matcher::{Matcher, Recognize};
pub use registry::{Postprocess, Registry, RegistryBuilder, StateTracker};
pub use sgr::{SgrMerge, SgrTracker, close_codes, get_codes, simplify_codes};
pub use token::{EscapeToken, TextToken, Token, TokenStream};

/// Parse `text` with the standard registry.
pub fn parse(text: &str) -> Result<TokenStream> {
    Registry::standard().parse(text)
}

/// Render tokens back to a string.
#[must_use]
pub fn stringify(stream: &TokenStream) -> String {
    stream.to_string()
}

/// Visible text of `text`.
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    Registry::standard().strip_ansi(text)
}

/// Raw offset of a visible position, see [`Registry::ansi_position`].
pub fn ansi_position(text: &str, visible_pos: usize) -> Result<usize> {
    Registry::standard().ansi_position(text, visible_pos)
}

/// Insert at a visible position, see [`Registry::insert_at`].
pub fn insert_at(text: &str, visible_pos: usize, value: &str) -> Result<String> {
    Registry::standard().insert_at(text, visible_pos, value)
}
