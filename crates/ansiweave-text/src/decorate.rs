#![forbid(unsafe_code)]

//! Frames, brackets, and padding around blocks of lines.
//!
//! An [`Encapsulation`] says which sides of a block get decorated and asks
//! a callback for each decorated cell. The callback receives
//! `(line, col, lines, cols)`: rows run from `-1` (the row above the block)
//! to `lines` (the row below), columns from `-1` (left of each line) to
//! `cols` (right of each line). Line widths are measured on visible text,
//! so styled input and styled border glyphs line up.
//!
//! # Example
//! ```
//! use ansiweave_text::decorate::{ascii_box, encapsulate};
//!
//! assert_eq!(encapsulate("ab\nc", &ascii_box()), "+--+\n|ab|\n|c |\n+--+\n");
//! ```

use std::fmt;
use std::sync::Arc;

use ansiweave_core::{AnsiError, Registry, Result};

use crate::wrap::{WrapOptions, wrap};

type CellFn = dyn Fn(isize, isize, usize, usize) -> String + Send + Sync;

/// Which sides of a block are decorated, and with what.
#[derive(Clone)]
pub struct Encapsulation {
    before_line: bool,
    after_line: bool,
    before_col: bool,
    after_col: bool,
    decorator: Arc<CellFn>,
}

impl Encapsulation {
    /// An encapsulation with no decorated side yet.
    pub fn new<F>(decorator: F) -> Self
    where
        F: Fn(isize, isize, usize, usize) -> String + Send + Sync + 'static,
    {
        Self {
            before_line: false,
            after_line: false,
            before_col: false,
            after_col: false,
            decorator: Arc::new(decorator),
        }
    }

    /// Add a row above the block.
    #[must_use]
    pub fn before_line(mut self, enabled: bool) -> Self {
        self.before_line = enabled;
        self
    }

    /// Add a row below the block.
    #[must_use]
    pub fn after_line(mut self, enabled: bool) -> Self {
        self.after_line = enabled;
        self
    }

    /// Prefix every line.
    #[must_use]
    pub fn before_col(mut self, enabled: bool) -> Self {
        self.before_col = enabled;
        self
    }

    /// Pad every line to the block width and suffix it.
    #[must_use]
    pub fn after_col(mut self, enabled: bool) -> Self {
        self.after_col = enabled;
        self
    }

    /// Decoration for one cell.
    #[must_use]
    pub fn cell(&self, line: isize, col: isize, lines: usize, cols: usize) -> String {
        (self.decorator)(line, col, lines, cols)
    }

    fn frame(&self, lines: &[&str], cols: usize) -> String {
        let registry = Registry::standard();
        let count = lines.len();
        let first_col = if self.before_col { -1 } else { 0 };
        let end_col = cols as isize + isize::from(self.after_col);

        let mut out = String::new();
        let rule = |out: &mut String, line: isize| {
            for col in first_col..end_col {
                out.push_str(&self.cell(line, col, count, cols));
            }
            out.push('\n');
        };

        if self.before_line {
            rule(&mut out, -1);
        }
        for (index, line) in lines.iter().enumerate() {
            let row = index as isize;
            if self.before_col {
                out.push_str(&self.cell(row, -1, count, cols));
            }
            out.push_str(line);
            if self.after_col {
                let width = registry.strip_ansi(line).chars().count();
                out.extend(std::iter::repeat_n(' ', cols.saturating_sub(width)));
                out.push_str(&self.cell(row, cols as isize, count, cols));
            }
            out.push('\n');
        }
        if self.after_line {
            rule(&mut out, count as isize);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(lines = count, cols, "framed block");

        out
    }
}

impl fmt::Debug for Encapsulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encapsulation")
            .field("before_line", &self.before_line)
            .field("after_line", &self.after_line)
            .field("before_col", &self.before_col)
            .field("after_col", &self.after_col)
            .finish_non_exhaustive()
    }
}

/// Glyphs for a box border. Corners and sides may be styled and may be
/// several chars wide; `top` and `bottom` repeat once per column and must
/// be at most one visible char.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxChars<'a> {
    /// Top-left corner.
    pub top_left: &'a str,
    /// Top-right corner.
    pub top_right: &'a str,
    /// Bottom-left corner.
    pub bottom_left: &'a str,
    /// Bottom-right corner.
    pub bottom_right: &'a str,
    /// Top edge, one per column.
    pub top: &'a str,
    /// Bottom edge, one per column.
    pub bottom: &'a str,
    /// Left side of every line.
    pub left: &'a str,
    /// Right side of every line.
    pub right: &'a str,
}

impl BoxChars<'static> {
    /// `+`, `-` and `|`.
    pub const ASCII: Self = Self::uniform("+", "+", "+", "+", "-", "|");
    /// Light lines with rounded corners.
    pub const ROUNDED: Self = Self::uniform("╭", "╮", "╰", "╯", "─", "│");
    /// Double lines.
    pub const DOUBLE_SQUARE: Self = Self::uniform("╔", "╗", "╚", "╝", "═", "║");
    /// Light lines with square corners.
    pub const SQUARE: Self = Self::uniform("┌", "┐", "└", "┘", "─", "│");

    const fn uniform(
        top_left: &'static str,
        top_right: &'static str,
        bottom_left: &'static str,
        bottom_right: &'static str,
        horizontal: &'static str,
        vertical: &'static str,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            top: horizontal,
            bottom: horizontal,
            left: vertical,
            right: vertical,
        }
    }
}

/// Build a box border from `chars`.
///
/// # Errors
///
/// [`AnsiError::InvalidConstruction`] if a glyph contains a newline, or
/// if `top` or `bottom` is wider than one visible char.
pub fn box_chars(chars: &BoxChars<'_>) -> Result<Encapsulation> {
    let glyphs = [
        chars.top_left,
        chars.top_right,
        chars.bottom_left,
        chars.bottom_right,
        chars.top,
        chars.bottom,
        chars.left,
        chars.right,
    ];
    if glyphs.iter().any(|g| g.contains('\n')) {
        return Err(AnsiError::invalid_construction(
            "box glyphs can't contain a new line",
        ));
    }
    let registry = Registry::standard();
    if [chars.top, chars.bottom]
        .iter()
        .any(|g| registry.strip_ansi(g).chars().count() > 1)
    {
        return Err(AnsiError::invalid_construction(
            "top and bottom box glyphs must be a single char",
        ));
    }
    Ok(border(chars))
}

fn border(chars: &BoxChars<'_>) -> Encapsulation {
    let [top_left, top_right, bottom_left, bottom_right, top, bottom, left, right] = [
        chars.top_left,
        chars.top_right,
        chars.bottom_left,
        chars.bottom_right,
        chars.top,
        chars.bottom,
        chars.left,
        chars.right,
    ]
    .map(str::to_owned);

    let flags = (
        !top.is_empty(),
        !bottom.is_empty(),
        !left.is_empty(),
        !right.is_empty(),
    );
    Encapsulation::new(move |line, col, lines, cols| {
        let below = line == lines as isize;
        let right_edge = col == cols as isize;
        let glyph = match (line, col) {
            (-1, -1) => &top_left,
            (-1, _) if right_edge => &top_right,
            (_, -1) if below => &bottom_left,
            _ if below && right_edge => &bottom_right,
            (-1, _) => &top,
            _ if below => &bottom,
            (_, -1) => &left,
            _ if right_edge => &right,
            _ => return " ".to_owned(),
        };
        glyph.clone()
    })
    .before_line(flags.0)
    .after_line(flags.1)
    .before_col(flags.2)
    .after_col(flags.3)
}

/// `+--+` style box.
#[must_use]
pub fn ascii_box() -> Encapsulation {
    border(&BoxChars::ASCII)
}

/// Box with rounded corners.
#[must_use]
pub fn rounded_box() -> Encapsulation {
    border(&BoxChars::ROUNDED)
}

/// Box drawn with double lines.
#[must_use]
pub fn double_square_box() -> Encapsulation {
    border(&BoxChars::DOUBLE_SQUARE)
}

/// Box drawn with single lines.
#[must_use]
pub fn square_box() -> Encapsulation {
    border(&BoxChars::SQUARE)
}

/// A curly bracket spanning the block on its left.
#[must_use]
pub fn curly_bracket() -> Encapsulation {
    Encapsulation::new(|line, _col, lines, _cols| {
        let line = line.max(0).unsigned_abs();
        let piece = match lines {
            0 | 1 => "{ ",
            2 if line == 0 => "⎰ ",
            2 => "⎱ ",
            _ if line == 0 => "⎧ ",
            _ if line == lines - 1 => "⎩ ",
            _ if lines % 2 == 1 && line == lines / 2 => "⎨ ",
            _ if lines % 2 == 0 && line == lines / 2 - 1 => "⎭ ",
            _ if lines % 2 == 0 && line == lines / 2 => "⎫ ",
            _ => "⎪ ",
        };
        piece.to_owned()
    })
    .before_col(true)
}

/// Blank space around the block: `top` and `bottom` rows, `left` and
/// `right` columns.
#[must_use]
pub fn padding(top: usize, right: usize, bottom: usize, left: usize) -> Encapsulation {
    let first_col = if left > 0 { -1 } else { 0 };
    Encapsulation::new(move |line, col, lines, cols| {
        let width = match col {
            -1 => left,
            c if c == cols as isize => right,
            _ => 1,
        };
        let extra_rows = match line {
            -1 => top.saturating_sub(1),
            l if l == lines as isize => bottom.saturating_sub(1),
            _ => 0,
        };

        let mut cell = String::new();
        if col == first_col {
            for _ in 0..extra_rows {
                cell.extend(std::iter::repeat_n(' ', left + cols + right));
                cell.push('\n');
            }
        }
        cell.extend(std::iter::repeat_n(' ', width));
        cell
    })
    .before_line(top > 0)
    .after_line(bottom > 0)
    .before_col(left > 0)
    .after_col(right > 0)
}

/// Decorate `text` as one block, as wide as its widest line.
///
/// Every output line, including the last, ends with `\n`.
#[must_use]
pub fn encapsulate(text: &str, encapsulation: &Encapsulation) -> String {
    let registry = Registry::standard();
    let lines: Vec<&str> = text.split('\n').collect();
    let cols = lines
        .iter()
        .map(|line| registry.strip_ansi(line).chars().count())
        .max()
        .unwrap_or(0);
    encapsulation.frame(&lines, cols)
}

// ============================================================================
// Decorators
// ============================================================================

/// A text transformation that can be chained.
pub trait Decorator: Send + Sync {
    /// Transform `input`, or fail without partial output.
    fn decorate(&self, input: &str) -> Result<String>;
}

impl<F> Decorator for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn decorate(&self, input: &str) -> Result<String> {
        self(input)
    }
}

/// Wraps its input, see [`wrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapDecorator {
    /// Wrap width in visible chars.
    pub width: usize,
    /// Whitespace and break options.
    pub options: WrapOptions,
}

impl WrapDecorator {
    /// Wrap at `width` with `options`.
    #[must_use]
    pub fn new(width: usize, options: WrapOptions) -> Self {
        Self { width, options }
    }
}

impl Decorator for WrapDecorator {
    fn decorate(&self, input: &str) -> Result<String> {
        wrap(input, self.width, &self.options)
    }
}

/// Frames its input at a fixed width. Unlike [`encapsulate`], the output
/// has no trailing newline, so decorators compose.
#[derive(Debug, Clone)]
pub struct EncapsulateDecorator {
    /// Column count of the framed block.
    pub width: usize,
    /// Frame to draw.
    pub encapsulation: Encapsulation,
}

impl EncapsulateDecorator {
    /// Frame `width` columns with `encapsulation`.
    #[must_use]
    pub fn new(width: usize, encapsulation: Encapsulation) -> Self {
        Self {
            width,
            encapsulation,
        }
    }
}

impl Decorator for EncapsulateDecorator {
    fn decorate(&self, input: &str) -> Result<String> {
        let lines: Vec<&str> = input.split('\n').collect();
        let mut out = self.encapsulation.frame(&lines, self.width);
        out.pop();
        Ok(out)
    }
}

/// Runs decorators in order, feeding each the previous output.
#[derive(Default)]
pub struct MultiDecorator {
    stages: Vec<Box<dyn Decorator>>,
}

impl MultiDecorator {
    /// Empty chain; decorating returns the input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    #[must_use]
    pub fn then(mut self, decorator: impl Decorator + 'static) -> Self {
        self.stages.push(Box::new(decorator));
        self
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether there are no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Decorator for MultiDecorator {
    fn decorate(&self, input: &str) -> Result<String> {
        self.stages
            .iter()
            .try_fold(input.to_owned(), |text, stage| stage.decorate(&text))
    }
}

impl fmt::Debug for MultiDecorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiDecorator")
            .field("stages", &self.stages.len())
            .finish()
    }
}
