#![forbid(unsafe_code)]

//! SGR (Select Graphic Rendition) state algebra.
//!
//! Every SGR attribute slot is described by a static [`SgrDefinition`]: the
//! parameter pattern that opens it, the canonical code that closes it, and
//! the parameter groups that count as closing it (reset, its own close code,
//! and sibling openers that take the slot over).
//!
//! Resolving a code history walks the codes left to right and keeps an
//! ordered list of actions:
//!
//! 1. A universal closer (`0` or any definition's close code) that closes
//!    at least one open action closes every such action.
//! 2. Otherwise the first definition (most parameters first) whose pattern
//!    matches the next codes opens a new action, closing any open action
//!    those parameters close.
//! 3. Otherwise a universal closer with nothing to close is skipped.
//! 4. Anything else is [`AnsiError::InvalidCode`].
//!
//! [`simplify_codes`] returns the parameters of the actions left open;
//! [`close_codes`] returns their canonical close codes.

use std::fmt::Write as _;
use std::sync::OnceLock;

use smallvec::SmallVec;

use crate::catalog::{CSI, EscapeKind, SGR_FINAL, is_sgr_sequence};
use crate::error::{AnsiError, Result};
use crate::hyperlink::LinkIdCounter;
use crate::registry::{Postprocess, StateTracker};
use crate::token::{EscapeToken, Token, TokenStream};

/// SGR reset.
pub const SGR_RESET: &str = "\x1b[0m";

// =============================================================================
// Definitions
// =============================================================================

/// One position in a parameter pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Must equal this code.
    Exact(u32),
    /// Matches any single code.
    Any,
}

impl Param {
    #[inline]
    const fn accepts(self, code: u32) -> bool {
        match self {
            Self::Exact(expected) => expected == code,
            Self::Any => true,
        }
    }
}

macro_rules! param {
    (_) => {
        Param::Any
    };
    ($code:literal) => {
        Param::Exact($code)
    };
}

macro_rules! pattern {
    ($($p:tt),+ $(,)?) => {
        &[$(param!($p)),+]
    };
}

/// A stylable slot.
#[derive(Debug, Clone, Copy)]
pub struct SgrDefinition {
    params: &'static [Param],
    close: u32,
    close_by: &'static [&'static [Param]],
}

impl SgrDefinition {
    const fn new(
        params: &'static [Param],
        close: u32,
        close_by: &'static [&'static [Param]],
    ) -> Self {
        Self {
            params,
            close,
            close_by,
        }
    }

    /// Opening parameter pattern.
    #[must_use]
    pub fn params(&self) -> &'static [Param] {
        self.params
    }

    /// Canonical close code.
    #[must_use]
    pub fn close(&self) -> u32 {
        self.close
    }

    /// Number of codes an opener consumes.
    #[inline]
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }

    /// Whether the pattern matches the first codes of `codes`.
    fn opens(&self, codes: &[u32]) -> bool {
        fills(self.params, codes.get(..self.params.len()).unwrap_or(&[]))
    }

    /// Whether an action of this definition is closed by `params`.
    fn closable_by(&self, params: &[u32]) -> bool {
        self.close_by.iter().any(|group| fills(group, params))
    }
}

/// Positional match with the full parameter count.
fn fills(pattern: &[Param], values: &[u32]) -> bool {
    pattern.len() == values.len()
        && pattern
            .iter()
            .zip(values)
            .all(|(param, &code)| param.accepts(code))
}

const BOLD_DIM_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![1], pattern![2], pattern![22]];
const ITALIC_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![23], pattern![3]];
const UNDERLINE_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![24]];
const BLINK_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![25], pattern![5], pattern![6]];
const INVERT_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![27], pattern![7]];
const HIDE_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![28], pattern![8]];
const STRIKE_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![29], pattern![9]];
const SPACING_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![50], pattern![26]];
const FONT_CLOSE_BY: &[&[Param]] = &[
    pattern![0],
    pattern![10],
    pattern![11],
    pattern![12],
    pattern![13],
    pattern![14],
    pattern![15],
    pattern![16],
    pattern![17],
    pattern![18],
    pattern![19],
];
const FOREGROUND_CLOSE_BY: &[&[Param]] = &[
    pattern![0],
    pattern![39],
    pattern![30],
    pattern![31],
    pattern![32],
    pattern![33],
    pattern![34],
    pattern![35],
    pattern![36],
    pattern![37],
    pattern![38, 5, _],
    pattern![38, 2, _, _, _],
    pattern![90],
    pattern![91],
    pattern![92],
    pattern![93],
    pattern![94],
    pattern![95],
    pattern![96],
    pattern![97],
];
const BACKGROUND_CLOSE_BY: &[&[Param]] = &[
    pattern![0],
    pattern![49],
    pattern![40],
    pattern![41],
    pattern![42],
    pattern![43],
    pattern![44],
    pattern![45],
    pattern![46],
    pattern![47],
    pattern![48, 5, _],
    pattern![48, 2, _, _, _],
    pattern![100],
    pattern![101],
    pattern![102],
    pattern![103],
    pattern![104],
    pattern![105],
    pattern![106],
    pattern![107],
];
const FRAME_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![51], pattern![52], pattern![54]];
const OVERLINE_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![53], pattern![55]];
const UNDERLINE_COLOR_CLOSE_BY: &[&[Param]] = &[
    pattern![0],
    pattern![59],
    pattern![58, 5, _],
    pattern![58, 2, _, _, _],
];
const IDEOGRAM_CLOSE_BY: &[&[Param]] = &[
    pattern![0],
    pattern![60],
    pattern![61],
    pattern![62],
    pattern![63],
    pattern![64],
    pattern![65],
];
const SCRIPT_CLOSE_BY: &[&[Param]] = &[pattern![0], pattern![73], pattern![74], pattern![75]];

/// Every known attribute slot.
pub static DEFINITIONS: &[SgrDefinition] = &[
    // Bold, dim
    SgrDefinition::new(pattern![1], 22, BOLD_DIM_CLOSE_BY),
    SgrDefinition::new(pattern![2], 22, BOLD_DIM_CLOSE_BY),
    SgrDefinition::new(pattern![3], 23, ITALIC_CLOSE_BY),
    SgrDefinition::new(pattern![4], 24, UNDERLINE_CLOSE_BY),
    // Slow, rapid blink
    SgrDefinition::new(pattern![5], 25, BLINK_CLOSE_BY),
    SgrDefinition::new(pattern![6], 25, BLINK_CLOSE_BY),
    SgrDefinition::new(pattern![7], 27, INVERT_CLOSE_BY),
    SgrDefinition::new(pattern![8], 28, HIDE_CLOSE_BY),
    SgrDefinition::new(pattern![9], 29, STRIKE_CLOSE_BY),
    // Proportional spacing
    SgrDefinition::new(pattern![26], 50, SPACING_CLOSE_BY),
    // Primary and alternative fonts
    SgrDefinition::new(pattern![10], 10, FONT_CLOSE_BY),
    SgrDefinition::new(pattern![11], 10, FONT_CLOSE_BY),
    SgrDefinition::new(pattern![12], 10, FONT_CLOSE_BY),
    SgrDefinition::new(pattern![13], 10, FONT_CLOSE_BY),
    SgrDefinition::new(pattern![14], 10, FONT_CLOSE_BY),
    SgrDefinition::new(pattern![15], 10, FONT_CLOSE_BY),
    SgrDefinition::new(pattern![16], 10, FONT_CLOSE_BY),
    SgrDefinition::new(pattern![17], 10, FONT_CLOSE_BY),
    SgrDefinition::new(pattern![18], 10, FONT_CLOSE_BY),
    SgrDefinition::new(pattern![19], 10, FONT_CLOSE_BY),
    // Foreground
    SgrDefinition::new(pattern![30], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![31], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![32], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![33], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![34], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![35], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![36], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![37], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![38, 5, _], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![38, 2, _, _, _], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![90], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![91], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![92], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![93], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![94], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![95], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![96], 39, FOREGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![97], 39, FOREGROUND_CLOSE_BY),
    // Background
    SgrDefinition::new(pattern![40], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![41], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![42], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![43], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![44], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![45], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![46], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![47], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![48, 5, _], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![48, 2, _, _, _], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![100], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![101], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![102], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![103], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![104], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![105], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![106], 49, BACKGROUND_CLOSE_BY),
    SgrDefinition::new(pattern![107], 49, BACKGROUND_CLOSE_BY),
    // Framed, encircled
    SgrDefinition::new(pattern![51], 54, FRAME_CLOSE_BY),
    SgrDefinition::new(pattern![52], 54, FRAME_CLOSE_BY),
    SgrDefinition::new(pattern![53], 55, OVERLINE_CLOSE_BY),
    // Underline color
    SgrDefinition::new(pattern![58, 5, _], 59, UNDERLINE_COLOR_CLOSE_BY),
    SgrDefinition::new(pattern![58, 2, _, _, _], 59, UNDERLINE_COLOR_CLOSE_BY),
    // Ideogram
    SgrDefinition::new(pattern![60], 65, IDEOGRAM_CLOSE_BY),
    SgrDefinition::new(pattern![61], 65, IDEOGRAM_CLOSE_BY),
    SgrDefinition::new(pattern![62], 65, IDEOGRAM_CLOSE_BY),
    SgrDefinition::new(pattern![63], 65, IDEOGRAM_CLOSE_BY),
    SgrDefinition::new(pattern![64], 65, IDEOGRAM_CLOSE_BY),
    // Superscript, subscript
    SgrDefinition::new(pattern![73], 75, SCRIPT_CLOSE_BY),
    SgrDefinition::new(pattern![74], 75, SCRIPT_CLOSE_BY),
];

/// Definitions with the most parameters first; ties keep table order.
fn by_parameter_count() -> &'static [&'static SgrDefinition] {
    static SORTED: OnceLock<Vec<&'static SgrDefinition>> = OnceLock::new();
    SORTED.get_or_init(|| {
        let mut sorted: Vec<_> = DEFINITIONS.iter().collect();
        sorted.sort_by_key(|def| std::cmp::Reverse(def.parameter_count()));
        sorted
    })
}

/// Whether `code` is the global reset or some definition's close code.
#[must_use]
pub fn is_universal_closer(code: u32) -> bool {
    code == 0 || DEFINITIONS.iter().any(|def| def.close == code)
}

// =============================================================================
// Code extraction
// =============================================================================

/// Parameters of one SGR sequence. `ESC [ m` is `[0]`; empty list
/// elements count as `0`.
///
/// Returns an empty list for anything that is not an SGR sequence.
///
/// # Errors
///
/// [`AnsiError::CodeOutOfRange`] if a parameter does not fit in a `u32`.
pub fn extract_codes(sequence: &str) -> Result<Vec<u32>> {
    let mut codes = Vec::new();
    extract_into(sequence, &mut codes)?;
    Ok(codes)
}

/// Append the parameters of `sequence` to `codes`. Error positions index
/// into `codes`.
fn extract_into(sequence: &str, codes: &mut Vec<u32>) -> Result<()> {
    if !is_sgr_sequence(sequence) {
        return Ok(());
    }
    let body = &sequence[CSI.len()..sequence.len() - SGR_FINAL.len_utf8()];
    for digits in body.split(';') {
        if digits.is_empty() {
            codes.push(0);
            continue;
        }
        let code = digits.parse().map_err(|_| AnsiError::CodeOutOfRange {
            digits: digits.to_owned(),
            position: codes.len(),
        })?;
        codes.push(code);
    }
    Ok(())
}

/// Concatenated parameters of every SGR escape token, in order.
///
/// # Errors
///
/// [`AnsiError::CodeOutOfRange`] if a parameter does not fit in a `u32`.
pub fn get_codes(tokens: &[Token]) -> Result<Vec<u32>> {
    let mut codes = Vec::new();
    for escape in tokens.iter().filter_map(Token::as_escape) {
        extract_into(&escape.sequence, &mut codes)?;
    }
    Ok(codes)
}

/// Render codes as one SGR sequence.
#[must_use]
pub fn sgr_sequence(codes: &[u32]) -> String {
    let mut out = String::with_capacity(CSI.len() + codes.len() * 4 + 1);
    out.push_str(CSI);
    for (i, code) in codes.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        let _ = write!(out, "{code}");
    }
    out.push(SGR_FINAL);
    out
}

// =============================================================================
// Resolution
// =============================================================================

#[derive(Debug)]
struct Action {
    def: &'static SgrDefinition,
    params: SmallVec<[u32; 5]>,
    closed: bool,
}

fn close_matching(actions: &mut [Action], params: &[u32]) -> bool {
    let mut any = false;
    for action in actions.iter_mut().filter(|a| !a.closed) {
        if action.def.closable_by(params) {
            action.closed = true;
            any = true;
        }
    }
    any
}

fn resolve(codes: &[u32]) -> Result<Vec<Action>> {
    let mut actions: Vec<Action> = Vec::new();
    let mut index = 0;
    let mut iterations = 0;

    while index < codes.len() {
        iterations += 1;
        if iterations > codes.len() {
            return Err(AnsiError::ImpossibleState {
                context: "SGR resolution stopped advancing",
            });
        }

        let code = codes[index];
        let universal = is_universal_closer(code);
        if universal && close_matching(&mut actions, &[code]) {
            index += 1;
            continue;
        }

        let rest = &codes[index..];
        if let Some(&def) = by_parameter_count().iter().find(|def| def.opens(rest)) {
            let params = &rest[..def.parameter_count()];
            close_matching(&mut actions, params);
            actions.push(Action {
                def,
                params: SmallVec::from_slice(params),
                closed: false,
            });
            index += params.len();
            continue;
        }

        if universal {
            index += 1;
            continue;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(code, position = index, "unknown SGR code");

        return Err(AnsiError::InvalidCode {
            code,
            position: index,
        });
    }

    Ok(actions)
}

/// Parameters still active after applying `codes` in order.
///
/// # Errors
///
/// [`AnsiError::InvalidCode`] if a code is neither an opener nor a closer.
pub fn simplify_codes(codes: &[u32]) -> Result<Vec<u32>> {
    Ok(resolve(codes)?
        .iter()
        .filter(|a| !a.closed)
        .flat_map(|a| a.params.iter().copied())
        .collect())
}

/// Close codes that turn off everything still active after `codes`.
///
/// # Errors
///
/// [`AnsiError::InvalidCode`] if a code is neither an opener nor a closer.
pub fn close_codes(codes: &[u32]) -> Result<Vec<u32>> {
    Ok(resolve(codes)?
        .iter()
        .filter(|a| !a.closed)
        .map(|a| a.def.close)
        .collect())
}

// =============================================================================
// Postprocessor and tracker
// =============================================================================

/// Folds every run of adjacent SGR tokens into a single SGR token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SgrMerge;

impl Postprocess for SgrMerge {
    fn process(&self, stream: TokenStream, _ids: &mut LinkIdCounter) -> Result<TokenStream> {
        let mut out: Vec<Token> = Vec::with_capacity(stream.len());
        let mut run: Vec<EscapeToken> = Vec::new();

        for token in stream {
            match token {
                Token::Escape(e) if is_sgr_sequence(&e.sequence) => run.push(e),
                other => {
                    flush_run(&mut run, &mut out);
                    out.push(other);
                }
            }
        }
        flush_run(&mut run, &mut out);

        Ok(TokenStream::from_tokens(out))
    }
}

fn flush_run(run: &mut Vec<EscapeToken>, out: &mut Vec<Token>) {
    if run.len() < 2 {
        out.extend(run.drain(..).map(Token::Escape));
        return;
    }

    let mut codes = Vec::new();
    if run
        .iter()
        .try_for_each(|e| extract_into(&e.sequence, &mut codes))
        .is_err()
    {
        // Oversized parameters cannot be re-rendered; keep the run as written.
        #[cfg(feature = "tracing")]
        tracing::debug!(tokens = run.len(), "left SGR run unmerged");
        out.extend(run.drain(..).map(Token::Escape));
        return;
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(tokens = run.len(), codes = codes.len(), "merged SGR run");

    let start = run[0].start;
    run.clear();
    out.push(Token::Escape(EscapeToken::new(
        EscapeKind::Csi,
        sgr_sequence(&codes),
        start,
    )));
}

/// Closes and reopens SGR state across a split.
#[derive(Debug, Clone, Copy, Default)]
pub struct SgrTracker;

impl StateTracker for SgrTracker {
    fn to_close(&self, stream: &TokenStream, offset: usize) -> Result<Vec<EscapeToken>> {
        let codes = close_codes(&get_codes(stream.tokens())?)?;
        Ok(synthesize(&codes, stream.raw_len() + offset))
    }

    fn to_reopen(&self, stream: &TokenStream, offset: usize) -> Result<Vec<EscapeToken>> {
        let codes = simplify_codes(&get_codes(stream.tokens())?)?;
        Ok(synthesize(&codes, stream.raw_len() + offset))
    }
}

fn synthesize(codes: &[u32], start: usize) -> Vec<EscapeToken> {
    if codes.is_empty() {
        return Vec::new();
    }
    vec![EscapeToken::new(EscapeKind::Csi, sgr_sequence(codes), start)]
}
