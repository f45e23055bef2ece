#![forbid(unsafe_code)]

//! Layout operations over ANSI-styled text.
//!
//! Everything here measures visible chars and cuts through
//! [`ansiweave_core::Registry::insert_at`], so styles and hyperlinks stay
//! balanced on every produced line:
//! - [`wrap`] - hard and soft wrapping with whitespace policies
//! - [`truncate`] - start, middle, or end truncation with a marker
//! - [`breaker`] - word-boundary selection used by soft wrapping
//! - [`decorate`] - boxes, brackets, padding, and decorator chains
//!
//! # Example
//! ```
//! use ansiweave_text::{TruncatePosition, WrapOptions, truncate, wrap};
//!
//! let text = "\x1b[1mLorem ipsum dolor\x1b[22m";
//! assert_eq!(
//!     wrap(text, 12, &WrapOptions::new()).unwrap(),
//!     "\x1b[1mLorem ipsum \x1b[22m\n\x1b[1mdolor\x1b[22m"
//! );
//! assert_eq!(
//!     truncate(text, 6, TruncatePosition::End).unwrap(),
//!     "\x1b[1mLorem\x1b[22m\x1b[2m…\x1b[0m"
//! );
//! ```

pub mod breaker;
pub mod decorate;
pub mod truncate;
pub mod wrap;

pub use breaker::{GreedyWordBreaker, LineBreaker};
pub use decorate::{
    BoxChars, Decorator, EncapsulateDecorator, Encapsulation, MultiDecorator, WrapDecorator,
    ascii_box, box_chars, curly_bracket, double_square_box, encapsulate, padding, rounded_box,
    square_box,
};
pub use truncate::{DEFAULT_MARKER, TruncatePosition, Truncator, truncate, truncate_with};
pub use wrap::{BreakMode, WhiteSpace, WrapOptions, Wrapper, hard_wrap, soft_wrap, wrap};
