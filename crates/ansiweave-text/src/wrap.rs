#![forbid(unsafe_code)]

//! ANSI-aware line wrapping.
//!
//! Breaks are chosen on the visible text and replayed onto the styled text
//! with [`Registry::insert_at`], so every produced line closes the styles
//! and hyperlinks it opened and the next line reopens them.
//!
//! # Example
//! ```
//! use ansiweave_text::wrap::{BreakMode, WrapOptions, wrap};
//!
//! let text = "\x1b[31mLorem ipsum dolor\x1b[39m";
//! let wrapped = wrap(text, 10, &WrapOptions::new().break_mode(BreakMode::Word)).unwrap();
//! assert_eq!(
//!     wrapped,
//!     "\x1b[31mLorem \x1b[39m\n\x1b[31mipsum \x1b[39m\n\x1b[31mdolor\x1b[39m"
//! );
//! ```

use ansiweave_core::{AnsiError, LinkIdCounter, Registry, Result, Token, TokenStream};

use crate::breaker::{GreedyWordBreaker, LineBreaker};

/// What to do with the whitespace at the edges of each produced line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhiteSpace {
    /// Remove leading and trailing visible whitespace.
    Trim,
    /// Trim, then pad with spaces up to the wrap width.
    Fill,
    /// Leave lines as produced.
    #[default]
    Preserve,
}

/// Where lines may be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakMode {
    /// Prefer word boundaries (soft wrap).
    #[default]
    Word,
    /// Break exactly at the width (hard wrap).
    Char,
}

/// Options for [`wrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WrapOptions {
    /// Whitespace policy applied to every line.
    pub whitespace: WhiteSpace,
    /// Break strategy.
    pub break_mode: BreakMode,
}

impl WrapOptions {
    /// Word breaks, whitespace preserved.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the whitespace policy.
    #[must_use]
    pub fn whitespace(mut self, whitespace: WhiteSpace) -> Self {
        self.whitespace = whitespace;
        self
    }

    /// Set the break strategy.
    #[must_use]
    pub fn break_mode(mut self, break_mode: BreakMode) -> Self {
        self.break_mode = break_mode;
        self
    }
}

/// Wraps text against a registry with a chosen [`LineBreaker`].
#[derive(Debug, Clone)]
pub struct Wrapper<'r, B = GreedyWordBreaker> {
    registry: &'r Registry,
    breaker: B,
}

impl<'r> Wrapper<'r> {
    /// Wrapper using the greedy word breaker.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            breaker: GreedyWordBreaker,
        }
    }
}

impl<'r, B: LineBreaker> Wrapper<'r, B> {
    /// Swap the line breaker used by soft wrapping.
    #[must_use]
    pub fn with_breaker<C: LineBreaker>(self, breaker: C) -> Wrapper<'r, C> {
        Wrapper {
            registry: self.registry,
            breaker,
        }
    }

    /// Wrap `text` to `width` visible chars, dispatching on
    /// [`WrapOptions::break_mode`].
    ///
    /// A width of zero returns the text unchanged.
    pub fn wrap(&self, text: &str, width: usize, options: &WrapOptions) -> Result<String> {
        match options.break_mode {
            BreakMode::Word => self.soft_wrap(text, width, options.whitespace),
            BreakMode::Char => self.hard_wrap(text, width, options.whitespace),
        }
    }

    /// Cut every input line each `width` visible chars.
    ///
    /// Hyperlink ids are drawn from one counter for the whole text, so
    /// links on different input lines keep distinct ids.
    pub fn hard_wrap(&self, text: &str, width: usize, whitespace: WhiteSpace) -> Result<String> {
        if width == 0 {
            return Ok(text.to_owned());
        }

        let mut ids = LinkIdCounter::new();
        let mut lines = Vec::new();
        for line in text.split('\n') {
            let stream = self.registry.parse_with(line, &mut ids)?;
            let mut remaining = stream.visible_len();
            let mut working = stream.to_string();
            while remaining > width {
                let (done, left) = self.split_at(&working, width)?;
                lines.push(self.edit_line(&done, width, whitespace));
                working = left;
                remaining -= width;
            }
            lines.push(self.edit_line(&working, width, whitespace));
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(width, lines = lines.len(), "hard wrapped");

        Ok(lines.join("\n"))
    }

    /// Break at the positions chosen by the line breaker.
    pub fn soft_wrap(&self, text: &str, width: usize, whitespace: WhiteSpace) -> Result<String> {
        if width == 0 {
            return Ok(text.to_owned());
        }

        let stream = self.registry.parse(text)?;
        let visible = stream.strip();
        let broken = self.breaker.break_lines(&visible, width);
        if broken.replace('\n', "") != visible.replace('\n', "") {
            return Err(AnsiError::ImpossibleState {
                context: "line breaker changed the visible text",
            });
        }

        let mut working = stream.to_string().replace('\n', "");
        let mut segments = broken.split('\n').peekable();
        let mut lines = Vec::new();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                break;
            }
            let (done, left) = self.split_at(&working, segment.chars().count())?;
            lines.push(self.edit_line(&done, width, whitespace));
            working = left;
        }
        lines.push(self.edit_line(&working, width, whitespace));

        #[cfg(feature = "tracing")]
        tracing::trace!(width, lines = lines.len(), "soft wrapped");

        Ok(lines.join("\n"))
    }

    /// Insert a break at `visible_pos` and return both halves.
    fn split_at(&self, text: &str, visible_pos: usize) -> Result<(String, String)> {
        let spliced = self.registry.insert_at(text, visible_pos, "\n")?;
        match spliced.split_once('\n') {
            Some((done, left)) => Ok((done.to_owned(), left.to_owned())),
            None => Err(AnsiError::ImpossibleState {
                context: "inserted line break is missing",
            }),
        }
    }

    fn edit_line(&self, line: &str, width: usize, whitespace: WhiteSpace) -> String {
        match whitespace {
            WhiteSpace::Preserve => line.to_owned(),
            WhiteSpace::Trim => trim_visible(&self.registry.tokenize(line)).0,
            WhiteSpace::Fill => {
                let (mut trimmed, visible) = trim_visible(&self.registry.tokenize(line));
                trimmed.extend(std::iter::repeat_n(' ', width.saturating_sub(visible)));
                trimmed
            }
        }
    }
}

/// Trim whitespace off the visible edges of a line, keeping every escape.
///
/// Returns the trimmed line and its visible length.
fn trim_visible(stream: &TokenStream) -> (String, usize) {
    let has_ink = |token: &Token| {
        token
            .as_text()
            .is_some_and(|t| t.text.chars().any(|c| !c.is_whitespace()))
    };
    let first = stream.iter().position(has_ink);
    let last = stream.iter().rposition(has_ink);

    let mut out = String::with_capacity(stream.raw_len());
    let mut visible = 0;
    for (index, token) in stream.iter().enumerate() {
        let text = match token {
            Token::Escape(e) => {
                out.push_str(&e.sequence);
                continue;
            }
            Token::Text(t) => t.text.as_str(),
        };
        let (Some(first), Some(last)) = (first, last) else {
            continue;
        };
        if index < first || index > last {
            continue;
        }
        let mut kept = text;
        if index == first {
            kept = kept.trim_start();
        }
        if index == last {
            kept = kept.trim_end();
        }
        visible += kept.chars().count();
        out.push_str(kept);
    }
    (out, visible)
}

/// Wrap with the standard registry, see [`Wrapper::wrap`].
pub fn wrap(text: &str, width: usize, options: &WrapOptions) -> Result<String> {
    Wrapper::new(Registry::standard()).wrap(text, width, options)
}

/// Hard wrap with the standard registry.
pub fn hard_wrap(text: &str, width: usize, whitespace: WhiteSpace) -> Result<String> {
    Wrapper::new(Registry::standard()).hard_wrap(text, width, whitespace)
}

/// Soft wrap with the standard registry and greedy word breaks.
pub fn soft_wrap(text: &str, width: usize, whitespace: WhiteSpace) -> Result<String> {
    Wrapper::new(Registry::standard()).soft_wrap(text, width, whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.";

    fn visible_lines(out: &str) -> Vec<String> {
        let registry = Registry::standard();
        out.split('\n').map(|l| registry.strip_ansi(l)).collect()
    }

    // ========================================================================
    // Hard wrap
    // ========================================================================

    #[test]
    fn hard_wrap_plain() {
        assert_eq!(
            hard_wrap(LOREM, 10, WhiteSpace::Preserve).unwrap(),
            "Lorem ipsu\nm dolor si\nt amet, co\nnsectetur \nadipiscing\n elit."
        );
    }

    #[test]
    fn hard_wrap_trim() {
        assert_eq!(
            hard_wrap(LOREM, 10, WhiteSpace::Trim).unwrap(),
            "Lorem ipsu\nm dolor si\nt amet, co\nnsectetur\nadipiscing\nelit."
        );
    }

    #[test]
    fn hard_wrap_keeps_existing_lines() {
        assert_eq!(
            hard_wrap("abcdef\ngh", 4, WhiteSpace::Preserve).unwrap(),
            "abcd\nef\ngh"
        );
    }

    #[test]
    fn hard_wrap_exact_width_is_untouched() {
        assert_eq!(hard_wrap("abcd", 4, WhiteSpace::Preserve).unwrap(), "abcd");
    }

    #[test]
    fn hard_wrap_styled() {
        let out = hard_wrap("\x1b[1mabcdef\x1b[22m", 3, WhiteSpace::Preserve).unwrap();
        assert_eq!(out, "\x1b[1mabc\x1b[22m\n\x1b[1mdef\x1b[22m");
    }

    #[test]
    fn hard_wrap_numbers_links_across_lines() {
        let text = "\x1b]8;;https://a\x07abc\x1b]8;;\x07\n\x1b]8;;https://b\x07def\x1b]8;;\x07";
        let out = hard_wrap(text, 5, WhiteSpace::Preserve).unwrap();
        assert_eq!(
            out,
            "\x1b]8;id=__1;https://a\x07abc\x1b]8;;\x07\n\x1b]8;id=__2;https://b\x07def\x1b]8;;\x07"
        );
    }

    // ========================================================================
    // Soft wrap
    // ========================================================================

    #[test]
    fn soft_wrap_plain() {
        assert_eq!(
            soft_wrap(LOREM, 10, WhiteSpace::Preserve).unwrap(),
            "Lorem \nipsum \ndolor sit \namet, \nconsectetu\nr \nadipiscing\n elit."
        );
    }

    #[test]
    fn soft_wrap_fill_pads_every_line() {
        let out = soft_wrap(LOREM, 10, WhiteSpace::Fill).unwrap();
        assert_eq!(
            out,
            "Lorem     \nipsum     \ndolor sit \namet,     \nconsectetu\nr         \nadipiscing\nelit.     "
        );
    }

    #[test]
    fn soft_wrap_keeps_existing_lines() {
        let out = soft_wrap("ab\ncd ef", 3, WhiteSpace::Preserve).unwrap();
        assert_eq!(out, "ab\ncd \nef");
    }

    #[test]
    fn soft_wrap_style_crossing_break() {
        let out = soft_wrap("\x1b[32mgreen grass\x1b[39m", 6, WhiteSpace::Trim).unwrap();
        assert_eq!(out, "\x1b[32mgreen\x1b[39m\n\x1b[32mgrass\x1b[39m");
        assert_eq!(visible_lines(&out), vec!["green", "grass"]);
    }

    #[test]
    fn custom_breaker_is_used() {
        let every_word = |text: &str, _width: usize| text.replace(' ', " \n");
        let out = Wrapper::new(Registry::standard())
            .with_breaker(every_word)
            .soft_wrap("a b c", 80, WhiteSpace::Trim)
            .unwrap();
        assert_eq!(out, "a\nb\nc");
    }

    #[test]
    fn lossy_breaker_is_rejected() {
        let lossy = |text: &str, _width: usize| text.replace(' ', "\n");
        let err = Wrapper::new(Registry::standard())
            .with_breaker(lossy)
            .soft_wrap("a b", 80, WhiteSpace::Preserve)
            .unwrap_err();
        assert!(matches!(err, AnsiError::ImpossibleState { .. }));
    }

    // ========================================================================
    // Options and edge cases
    // ========================================================================

    #[test]
    fn wrap_dispatches_on_break_mode() {
        let char_mode = WrapOptions::new().break_mode(BreakMode::Char);
        assert_eq!(wrap("ab cd", 3, &char_mode).unwrap(), "ab \ncd");
        assert_eq!(wrap("ab cd", 3, &WrapOptions::new()).unwrap(), "ab \ncd");
        assert_eq!(wrap("abcd ef", 3, &char_mode).unwrap(), "abc\nd e\nf");
    }

    #[test]
    fn default_options() {
        let options = WrapOptions::default();
        assert_eq!(options.break_mode, BreakMode::Word);
        assert_eq!(options.whitespace, WhiteSpace::Preserve);
        assert_eq!(WrapOptions::new(), options);
    }

    #[test]
    fn zero_width_is_identity() {
        assert_eq!(wrap(LOREM, 0, &WrapOptions::new()).unwrap(), LOREM);
        assert_eq!(hard_wrap(LOREM, 0, WhiteSpace::Trim).unwrap(), LOREM);
    }

    #[test]
    fn empty_text() {
        assert_eq!(wrap("", 5, &WrapOptions::new()).unwrap(), "");
        assert_eq!(hard_wrap("", 5, WhiteSpace::Fill).unwrap(), "     ");
    }

    #[test]
    fn invalid_sgr_propagates() {
        assert!(matches!(
            soft_wrap("\x1b[999mab cd", 3, WhiteSpace::Preserve),
            Err(AnsiError::InvalidCode { code: 999, .. })
        ));
    }

    // ========================================================================
    // Visible trimming
    // ========================================================================

    #[test]
    fn trim_skips_escapes() {
        let stream = Registry::standard().tokenize("\x1b[1m  bold \x1b[22m ");
        assert_eq!(trim_visible(&stream), ("\x1b[1mbold\x1b[22m".to_owned(), 4));
    }

    #[test]
    fn trim_blank_line_keeps_escapes() {
        let stream = Registry::standard().tokenize("  \x1b[1m \x1b[22m");
        assert_eq!(trim_visible(&stream), ("\x1b[1m\x1b[22m".to_owned(), 0));
    }

    #[test]
    fn fill_pads_after_closing_sequences() {
        let wrapper = Wrapper::new(Registry::standard());
        assert_eq!(
            wrapper.edit_line(" \x1b[4mab\x1b[24m ", 5, WhiteSpace::Fill),
            "\x1b[4mab\x1b[24m   "
        );
    }
}
