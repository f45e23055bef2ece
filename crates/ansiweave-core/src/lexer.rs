#![forbid(unsafe_code)]

//! Lexer: splits raw text into alternating text and escape tokens.
//!
//! At each step every matcher searches the remaining text; the match with
//! the smallest start wins, and on a tied start the longest match wins.
//! Bytes no matcher claims (including unknown escape introducers) stay in
//! text tokens.

use std::ops::Range;

use crate::catalog::EscapeKind;
use crate::error::Result;
use crate::hyperlink::LinkIdCounter;
use crate::registry::Registry;
use crate::token::{EscapeToken, TextToken, TokenStream};

impl Registry {
    /// Lex `text` without postprocessing.
    ///
    /// The tokens concatenate to `text` exactly and cover it without gaps.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> TokenStream {
        let mut stream = TokenStream::new();
        let mut offset = 0;

        while offset < text.len() {
            let Some((kind, range)) = self.find_next_escape(text, offset) else {
                break;
            };
            if range.start > offset {
                stream.push(TextToken::new(&text[offset..range.start], offset));
            }
            stream.push(EscapeToken::new(kind, &text[range.clone()], range.start));
            offset = range.end;
        }
        if offset < text.len() {
            stream.push(TextToken::new(&text[offset..], offset));
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            bytes = text.len(),
            tokens = stream.len(),
            escapes = stream.escapes().count(),
            "tokenized"
        );

        stream
    }

    /// Lex `text` and run every postprocessor with a fresh id counter.
    pub fn parse(&self, text: &str) -> Result<TokenStream> {
        self.parse_with(text, &mut LinkIdCounter::new())
    }

    /// Lex `text` and run every postprocessor, drawing hyperlink ids from
    /// `ids`.
    pub fn parse_with(&self, text: &str, ids: &mut LinkIdCounter) -> Result<TokenStream> {
        let mut stream = self.tokenize(text);
        for postprocessor in &self.postprocessors {
            stream = postprocessor.process(stream, ids)?;
            stream.recalculate_positions();
        }
        Ok(stream)
    }

    /// Earliest match at or after `offset`; longest on a tied start.
    /// Among identical ranges the first matcher in priority order wins.
    fn find_next_escape(&self, text: &str, offset: usize) -> Option<(EscapeKind, Range<usize>)> {
        let mut best: Option<(EscapeKind, Range<usize>)> = None;
        for matcher in &self.matchers {
            let Some(found) = matcher.find_in(text, offset) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((_, current)) => {
                    found.start < current.start
                        || (found.start == current.start && found.end > current.end)
                }
            };
            if better {
                best = Some((matcher.kind(), found));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LiteralPattern;
    use crate::matcher::Matcher;
    use crate::token::Token;

    fn starts(stream: &TokenStream) -> Vec<(bool, usize)> {
        stream
            .iter()
            .map(|t| (matches!(t, Token::Escape(_)), t.start()))
            .collect()
    }

    #[test]
    fn plain_text_is_one_token() {
        let stream = Registry::standard().tokenize("hello world");
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.to_string(), "hello world");
    }

    #[test]
    fn empty_text_is_empty_stream() {
        assert!(Registry::standard().tokenize("").is_empty());
    }

    #[test]
    fn text_fills_gaps() {
        let text = "\x1b[31mred\x1b[39m\x1b[1mbold";
        let stream = Registry::standard().tokenize(text);
        assert_eq!(
            starts(&stream),
            vec![(true, 0), (false, 5), (true, 8), (true, 13), (false, 17)]
        );
        assert_eq!(stream.to_string(), text);
    }

    #[test]
    fn sgr_sample_positions() {
        let text = "The quick brown \x1b[31mfox jumped over \x1b[39mthe lazy \x1b[32mdog and then ran away with the unicorn.\x1b[39m";
        let stream = Registry::standard().parse(text).unwrap();
        assert_eq!(
            starts(&stream),
            vec![
                (false, 0),
                (true, 16),
                (false, 21),
                (true, 37),
                (false, 42),
                (true, 51),
                (false, 56),
                (true, 95),
            ]
        );
    }

    #[test]
    fn unknown_escapes_stay_text() {
        let stream = Registry::standard().tokenize("a\x1b[?25lb\x1bZ");
        assert_eq!(stream.len(), 1);
        assert!(!stream.has_escapes());
    }

    #[test]
    fn longest_match_wins_on_tied_start() {
        let registry = Registry::builder()
            .matcher(Matcher::new(EscapeKind::Csi, LiteralPattern("\x1b[1"), ""))
            .matcher(Matcher::new(EscapeKind::Csi, LiteralPattern("\x1b[1m"), ""))
            .build();
        let stream = registry.tokenize("\x1b[1mx");
        assert_eq!(stream.tokens()[0].raw(), "\x1b[1m");
    }

    #[test]
    fn earliest_match_wins() {
        let stream = Registry::standard().tokenize("ab\x1b[2Jc\x1b[1m");
        assert_eq!(stream.tokens()[1].raw(), "\x1b[2J");
        assert_eq!(stream.tokens()[3].raw(), "\x1b[1m");
    }

    #[test]
    fn cursor_forms_pass_through() {
        let text = "\x1b[10;4H\x1b[6n\x1b[5i\x1b[3A";
        let stream = Registry::standard().parse(text).unwrap();
        assert_eq!(stream.escapes().count(), 4);
        assert_eq!(stream.to_string(), text);
    }

    #[test]
    fn multibyte_offsets_are_bytes() {
        let stream = Registry::standard().tokenize("é\x1b[1m");
        assert_eq!(stream.tokens()[1].start(), 2);
    }
}
