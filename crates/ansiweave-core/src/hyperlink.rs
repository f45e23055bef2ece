#![forbid(unsafe_code)]

//! OSC 8 hyperlink tracking.
//!
//! Terminals group link fragments by their `id` parameter, so a link cut in
//! two (by a wrap or an insertion) must be reopened with the same id. The
//! [`HyperlinkNormalize`] postprocessor gives every open sequence an id,
//! drawing synthetic ones (`__1`, `__2`, ...) from a [`LinkIdCounter`].
//!
//! # Usage
//!
//! ```
//! use ansiweave_core::{LinkIdCounter, Registry};
//!
//! let mut ids = LinkIdCounter::new();
//! let registry = Registry::standard();
//! let first = registry.parse_with("\x1b]8;;https://a\x07a\x1b]8;;\x07", &mut ids).unwrap();
//! let second = registry.parse_with("\x1b]8;;https://b\x07b\x1b]8;;\x07", &mut ids).unwrap();
//! assert!(first.to_string().contains("id=__1"));
//! assert!(second.to_string().contains("id=__2"));
//! ```

use crate::catalog::{
    EscapeKind, HYPERLINK_PREFIX, is_hyperlink_close_sequence, split_hyperlink_open,
};
use crate::error::{AnsiError, Result};
use crate::registry::{Postprocess, StateTracker};
use crate::token::{EscapeToken, Token, TokenStream};

/// Source of synthetic hyperlink ids.
///
/// A fresh counter starts at zero; the first id handed out is `1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkIdCounter {
    last: u64,
}

impl LinkIdCounter {
    /// Create a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Advance and return the next id.
    pub fn next_id(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// The most recently issued id (0 if none).
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.last
    }

    /// Start over from zero.
    pub fn reset(&mut self) {
        self.last = 0;
    }
}

/// Whether `token` opens a hyperlink. The whole sequence must be one
/// OSC 8 open; tokens with trailing bytes are not links.
#[must_use]
pub fn is_link_open(token: &EscapeToken) -> bool {
    token.kind == EscapeKind::Osc && split_hyperlink_open(&token.sequence).is_some()
}

/// Whether `token` closes a hyperlink.
#[must_use]
pub fn is_link_close(token: &EscapeToken) -> bool {
    token.kind == EscapeKind::Osc && is_hyperlink_close_sequence(&token.sequence)
}

/// The hyperlink still open at the end of `tokens`, if any.
#[must_use]
pub fn last_open_link(tokens: &[Token]) -> Option<&EscapeToken> {
    let mut open = None;
    for escape in tokens.iter().filter_map(Token::as_escape) {
        if is_link_open(escape) {
            open = Some(escape);
        } else if is_link_close(escape) {
            open = None;
        }
    }
    open
}

/// Ensures every hyperlink open sequence carries an `id` parameter.
///
/// Existing parameters and the terminator are kept as written; a missing
/// id is appended as `id=__<n>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperlinkNormalize;

impl Postprocess for HyperlinkNormalize {
    fn process(&self, stream: TokenStream, ids: &mut LinkIdCounter) -> Result<TokenStream> {
        stream
            .into_iter()
            .map(|token| match token {
                Token::Escape(e) if is_link_open(&e) => normalize_open(e, ids).map(Token::Escape),
                other => Ok(other),
            })
            .collect()
    }
}

fn normalize_open(token: EscapeToken, ids: &mut LinkIdCounter) -> Result<EscapeToken> {
    let parts = split_hyperlink_open(&token.sequence).ok_or(AnsiError::ImpossibleState {
        context: "hyperlink open sequence does not re-parse",
    })?;

    let has_id = parts
        .params
        .split(':')
        .any(|param| param.split_once('=').is_some_and(|(key, _)| key == "id"));
    if has_id {
        return Ok(token);
    }

    let id = ids.next_id();
    #[cfg(feature = "tracing")]
    tracing::debug!(id, uri = parts.uri, "assigned hyperlink id");

    let params = if parts.params.is_empty() {
        format!("id=__{id}")
    } else {
        format!("{}:id=__{id}", parts.params)
    };
    let sequence = format!(
        "{HYPERLINK_PREFIX}{params};{}{}",
        parts.uri, parts.terminator
    );
    Ok(EscapeToken::new(EscapeKind::Osc, sequence, token.start))
}

/// Closes and reopens the hyperlink open at a split.
///
/// The close uses the open sequence's own terminator; the reopen repeats
/// the open sequence verbatim, id included.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperlinkTracker;

impl StateTracker for HyperlinkTracker {
    fn to_close(&self, stream: &TokenStream, offset: usize) -> Result<Vec<EscapeToken>> {
        let Some(open) = last_open_link(stream.tokens()) else {
            return Ok(Vec::new());
        };
        let parts = split_hyperlink_open(&open.sequence).ok_or(AnsiError::ImpossibleState {
            context: "open hyperlink does not re-parse",
        })?;
        Ok(vec![EscapeToken::new(
            EscapeKind::Osc,
            format!("{HYPERLINK_PREFIX};{}", parts.terminator),
            stream.raw_len() + offset,
        )])
    }

    fn to_reopen(&self, stream: &TokenStream, offset: usize) -> Result<Vec<EscapeToken>> {
        Ok(last_open_link(stream.tokens())
            .map(|open| {
                EscapeToken::new(EscapeKind::Osc, open.sequence.clone(), stream.raw_len() + offset)
            })
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TextToken;

    fn osc(seq: &str, start: usize) -> Token {
        EscapeToken::new(EscapeKind::Osc, seq, start).into()
    }

    fn normalize(tokens: Vec<Token>, ids: &mut LinkIdCounter) -> Vec<String> {
        HyperlinkNormalize
            .process(TokenStream::from_tokens(tokens), ids)
            .unwrap()
            .iter()
            .map(|t| t.raw().to_owned())
            .collect()
    }

    #[test]
    fn counter_lifecycle() {
        let mut ids = LinkIdCounter::new();
        assert_eq!(ids.peek(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        ids.reset();
        assert_eq!(ids.next_id(), 1);
    }

    #[test]
    fn injects_missing_id_and_keeps_terminator() {
        let mut ids = LinkIdCounter::new();
        let out = normalize(
            vec![
                osc("\x1b]8;;https://a\x07", 0),
                TextToken::new("a", 16).into(),
                osc("\x1b]8;;\x07", 17),
                osc("\x1b]8;foo=bar;https://b\x1b\\", 23),
            ],
            &mut ids,
        );
        assert_eq!(out[0], "\x1b]8;id=__1;https://a\x07");
        assert_eq!(out[2], "\x1b]8;;\x07");
        assert_eq!(out[3], "\x1b]8;foo=bar:id=__2;https://b\x1b\\");
        assert_eq!(ids.peek(), 2);
    }

    #[test]
    fn existing_id_is_untouched() {
        let mut ids = LinkIdCounter::new();
        let out = normalize(vec![osc("\x1b]8;id=home:x=a=b;https://a\u{9c}", 0)], &mut ids);
        assert_eq!(out[0], "\x1b]8;id=home:x=a=b;https://a\u{9c}");
        assert_eq!(ids.peek(), 0);
    }

    #[test]
    fn other_osc_passes_through() {
        let mut ids = LinkIdCounter::new();
        let out = normalize(vec![osc("\x1b]0;title\x07", 0)], &mut ids);
        assert_eq!(out[0], "\x1b]0;title\x07");
    }

    #[test]
    fn open_with_trailing_bytes_is_not_a_link() {
        let token = EscapeToken::new(EscapeKind::Osc, "\x1b]8;;https://a\x07tail", 0);
        assert!(!is_link_open(&token));

        let mut ids = LinkIdCounter::new();
        let out = normalize(vec![token.into()], &mut ids);
        assert_eq!(out[0], "\x1b]8;;https://a\x07tail");
        assert_eq!(ids.peek(), 0);
    }

    #[test]
    fn last_open_link_tracks_close() {
        let open = osc("\x1b]8;id=1;https://a\x07", 0);
        let close = osc("\x1b]8;;\x07", 18);
        let tokens = vec![open.clone(), TextToken::new("a", 17).into()];
        assert_eq!(last_open_link(&tokens), open.as_escape());

        let closed = vec![open.clone(), close.clone()];
        assert!(last_open_link(&closed).is_none());

        let reopened = vec![open.clone(), close, osc("\x1b]8;id=2;https://b\x07", 24)];
        assert_eq!(
            last_open_link(&reopened).map(|e| e.sequence.as_str()),
            Some("\x1b]8;id=2;https://b\x07")
        );
    }

    #[test]
    fn tracker_close_and_reopen() {
        let stream = TokenStream::from_tokens(vec![
            osc("\x1b]8;id=1;https://a\x1b\\", 0),
            TextToken::new("ab", 20).into(),
        ]);
        let close = HyperlinkTracker.to_close(&stream, 5).unwrap();
        assert_eq!(close, vec![EscapeToken::new(EscapeKind::Osc, "\x1b]8;;\x1b\\", 27)]);
        let reopen = HyperlinkTracker.to_reopen(&stream, 0).unwrap();
        assert_eq!(
            reopen,
            vec![EscapeToken::new(EscapeKind::Osc, "\x1b]8;id=1;https://a\x1b\\", 22)]
        );
    }

    #[test]
    fn tracker_silent_without_open_link() {
        let stream = TokenStream::from_tokens(vec![TextToken::new("ab", 0).into()]);
        assert!(HyperlinkTracker.to_close(&stream, 0).unwrap().is_empty());
        assert!(HyperlinkTracker.to_reopen(&stream, 0).unwrap().is_empty());
    }
}
