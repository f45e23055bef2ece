#![forbid(unsafe_code)]

//! Line-break selection for soft wrapping.
//!
//! A [`LineBreaker`] works on plain text only. Its output must be its input
//! with `\n` inserted at the chosen break points: nothing removed, nothing
//! reordered. The soft wrapper replays those breaks onto the styled text.
//!
//! # Example
//! ```
//! use ansiweave_text::breaker::{GreedyWordBreaker, LineBreaker};
//!
//! let broken = GreedyWordBreaker.break_lines("Lorem ipsum dolor sit", 10);
//! assert_eq!(broken, "Lorem \nipsum \ndolor sit");
//! ```

use smallvec::SmallVec;

/// Chooses break points in plain text.
pub trait LineBreaker {
    /// Return `text` with a `\n` inserted at every break so that no line
    /// is longer than `width` chars.
    fn break_lines(&self, text: &str, width: usize) -> String;
}

impl<F> LineBreaker for F
where
    F: Fn(&str, usize) -> String,
{
    fn break_lines(&self, text: &str, width: usize) -> String {
        self(text, width)
    }
}

/// Greedy word-boundary breaker.
///
/// Each input line is cut into chunks: a word part ending in a hyphen that
/// is followed by a word char, a run of non-whitespace, or a run of
/// whitespace. Chunks longer than `width` are cut every `width` chars.
/// Chunks are then packed greedily; whitespace stays where it was, so a
/// line may end (or start) with spaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GreedyWordBreaker;

impl LineBreaker for GreedyWordBreaker {
    fn break_lines(&self, text: &str, width: usize) -> String {
        if width == 0 {
            return text.to_owned();
        }

        let mut out = String::with_capacity(text.len() + text.len() / width.max(1));
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                out.push('\n');
            }
            pack_line(line, width, &mut out);
        }
        out
    }
}

fn pack_line(line: &str, width: usize, out: &mut String) {
    let mut current = 0;
    for chunk in chunks(line) {
        for piece in pieces(chunk, width) {
            let len = piece.chars().count();
            if current > 0 && current + len > width {
                out.push('\n');
                current = 0;
            }
            out.push_str(piece);
            current += len;
        }
    }
}

/// Split a line into word, hyphenated word-part, and whitespace chunks.
fn chunks(line: &str) -> SmallVec<[&str; 16]> {
    let mut out = SmallVec::new();
    let mut rest = line;
    while let Some(first) = rest.chars().next() {
        let end = if first.is_whitespace() {
            rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len())
        } else {
            let run = rest.find(char::is_whitespace).unwrap_or(rest.len());
            hyphen_break(&rest[..run]).unwrap_or(run)
        };
        out.push(&rest[..end]);
        rest = &rest[end..];
    }
    out
}

/// End of a leading `word-` part when the hyphen is followed by a word char.
fn hyphen_break(run: &str) -> Option<usize> {
    let hyphen = run.find('-')?;
    if hyphen == 0 {
        return None;
    }
    let next = run[hyphen + 1..].chars().next()?;
    is_word_char(next).then_some(hyphen + 1)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Cut `chunk` into pieces of at most `width` chars.
fn pieces(chunk: &str, width: usize) -> impl Iterator<Item = &str> {
    let mut rest = chunk;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let cut = rest
            .char_indices()
            .nth(width)
            .map_or(rest.len(), |(offset, _)| offset);
        let (piece, tail) = rest.split_at(cut);
        rest = tail;
        Some(piece)
    })
}
