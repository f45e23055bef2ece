#![forbid(unsafe_code)]

//! Tokens and token streams.
//!
//! A [`TokenStream`] is an ordered list of [`Token`]s whose raw substrings
//! concatenate to the text they were lexed from. Offsets (`start`, `end`)
//! are byte offsets into that text; visible positions count `char`s.

use std::fmt;

use crate::catalog::EscapeKind;

/// A run of plain, visible content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextToken {
    /// The raw content.
    pub text: String,
    /// Byte offset of the first byte.
    pub start: usize,
}

impl TextToken {
    /// Create a text token.
    pub fn new(text: impl Into<String>, start: usize) -> Self {
        Self {
            text: text.into(),
            start,
        }
    }

    /// Byte offset one past the last byte.
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Number of visible characters.
    #[inline]
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// One recognized escape sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeToken {
    /// Introducer kind.
    pub kind: EscapeKind,
    /// The full sequence, introducer and terminator included.
    pub sequence: String,
    /// Byte offset of the introducer.
    pub start: usize,
}

impl EscapeToken {
    /// Create an escape token.
    pub fn new(kind: EscapeKind, sequence: impl Into<String>, start: usize) -> Self {
        Self {
            kind,
            sequence: sequence.into(),
            start,
        }
    }

    /// Byte offset one past the last byte.
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.sequence.len()
    }
}

/// Either plain text or an escape sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Visible text.
    Text(TextToken),
    /// A recognized escape sequence.
    Escape(EscapeToken),
}

impl Token {
    /// Raw substring.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Text(t) => &t.text,
            Self::Escape(e) => &e.sequence,
        }
    }

    /// Byte offset of the first byte.
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        match self {
            Self::Text(t) => t.start,
            Self::Escape(e) => e.start,
        }
    }

    /// Byte offset one past the last byte.
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.start() + self.raw().len()
    }

    /// Raw length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw().len()
    }

    /// Whether the raw substring is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw().is_empty()
    }

    /// Move the token to a new start offset.
    pub fn set_start(&mut self, start: usize) {
        match self {
            Self::Text(t) => t.start = start,
            Self::Escape(e) => e.start = start,
        }
    }

    /// The escape token, if this is one.
    #[must_use]
    pub fn as_escape(&self) -> Option<&EscapeToken> {
        match self {
            Self::Escape(e) => Some(e),
            Self::Text(_) => None,
        }
    }

    /// The text token, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextToken> {
        match self {
            Self::Text(t) => Some(t),
            Self::Escape(_) => None,
        }
    }
}

impl From<TextToken> for Token {
    fn from(token: TextToken) -> Self {
        Self::Text(token)
    }
}

impl From<EscapeToken> for Token {
    fn from(token: EscapeToken) -> Self {
        Self::Escape(token)
    }
}

/// An ordered sequence of tokens.
///
/// `Display` renders the stream back to a string (stringify).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap tokens as-is; offsets are not touched.
    #[must_use]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Append a token.
    pub fn push(&mut self, token: impl Into<Token>) {
        self.tokens.push(token.into());
    }

    /// Borrow the tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Take the tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Iterate over tokens.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the stream has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Total raw length in bytes.
    #[must_use]
    pub fn raw_len(&self) -> usize {
        self.tokens.iter().map(Token::len).sum()
    }

    /// End offset of the last token, or 0 for an empty stream.
    #[must_use]
    pub fn sequences_length(&self) -> usize {
        self.tokens.last().map_or(0, Token::end)
    }

    /// Number of visible characters.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.texts().map(TextToken::visible_len).sum()
    }

    /// Visible text: the text tokens concatenated.
    #[must_use]
    pub fn strip(&self) -> String {
        self.texts().map(|t| t.text.as_str()).collect()
    }

    /// Escape tokens in order.
    pub fn escapes(&self) -> impl Iterator<Item = &EscapeToken> + '_ {
        self.tokens.iter().filter_map(Token::as_escape)
    }

    /// Text tokens in order.
    pub fn texts(&self) -> impl Iterator<Item = &TextToken> + '_ {
        self.tokens.iter().filter_map(Token::as_text)
    }

    /// Whether any escape token is present.
    #[must_use]
    pub fn has_escapes(&self) -> bool {
        self.escapes().next().is_some()
    }

    /// Reassign every start to the running total of prior lengths.
    pub fn recalculate_positions(&mut self) {
        let mut offset = 0;
        for token in &mut self.tokens {
            token.set_start(offset);
            offset += token.len();
        }
    }

    /// Map a visible position to a raw byte offset.
    ///
    /// Escapes before the position are skipped over; a position on the
    /// boundary of a text run maps to the end of that run, before any
    /// escape that follows it. Positions past the visible end clamp to
    /// the raw length.
    #[must_use]
    pub fn ansi_position(&self, visible_pos: usize) -> usize {
        let mut visible = 0;
        let mut raw = 0;
        for token in &self.tokens {
            match token {
                Token::Escape(e) => raw += e.sequence.len(),
                Token::Text(t) => {
                    let chars = t.visible_len();
                    if visible_pos > visible + chars {
                        visible += chars;
                        raw += t.text.len();
                        continue;
                    }
                    return raw + char_to_byte(&t.text, visible_pos - visible);
                }
            }
        }
        self.raw_len()
    }
}

/// Byte offset of the `index`th char, or the string length past the end.
pub(crate) fn char_to_byte(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map_or(text.len(), |(offset, _)| offset)
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str(token.raw())?;
        }
        Ok(())
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl Extend<Token> for TokenStream {
    fn extend<I: IntoIterator<Item = Token>>(&mut self, iter: I) {
        self.tokens.extend(iter);
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TokenStream {
        let mut stream = TokenStream::new();
        stream.push(EscapeToken::new(EscapeKind::Csi, "\x1b[31m", 0));
        stream.push(TextToken::new("héllo", 5));
        stream.push(EscapeToken::new(EscapeKind::Csi, "\x1b[39m", 11));
        stream.push(TextToken::new(" you", 16));
        stream
    }

    #[test]
    fn ends_and_lengths() {
        let stream = sample();
        assert_eq!(stream.tokens()[1].end(), 11);
        assert_eq!(stream.raw_len(), 20);
        assert_eq!(stream.sequences_length(), 20);
        assert_eq!(stream.visible_len(), 9);
    }

    #[test]
    fn display_is_stringify() {
        assert_eq!(sample().to_string(), "\x1b[31mhéllo\x1b[39m you");
    }

    #[test]
    fn strip_keeps_text_only() {
        assert_eq!(sample().strip(), "héllo you");
        assert!(sample().has_escapes());
        assert_eq!(sample().escapes().count(), 2);
    }

    #[test]
    fn recalculate_positions_restores_contiguity() {
        let mut stream = TokenStream::from_tokens(vec![
            TextToken::new("ab", 7).into(),
            EscapeToken::new(EscapeKind::Csi, "\x1b[1m", 42).into(),
            TextToken::new("c", 0).into(),
        ]);
        stream.recalculate_positions();
        let starts: Vec<_> = stream.iter().map(Token::start).collect();
        assert_eq!(starts, vec![0, 2, 6]);
    }

    #[test]
    fn position_skips_leading_escape() {
        let stream = sample();
        assert_eq!(stream.ansi_position(0), 5);
        assert_eq!(stream.ansi_position(2), 8);
    }

    #[test]
    fn position_boundary_stays_before_following_escape() {
        assert_eq!(sample().ansi_position(5), 11);
        assert_eq!(sample().ansi_position(6), 17);
    }

    #[test]
    fn position_clamps() {
        assert_eq!(sample().ansi_position(100), 20);
        assert_eq!(TokenStream::new().ansi_position(3), 0);
    }

    #[test]
    fn position_without_escapes_is_identity() {
        let stream = TokenStream::from_tokens(vec![TextToken::new("abcdef", 0).into()]);
        for i in 0..=6 {
            assert_eq!(stream.ansi_position(i), i);
        }
        assert_eq!(stream.ansi_position(9), 6);
    }
}
