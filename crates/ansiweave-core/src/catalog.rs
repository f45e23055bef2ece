#![forbid(unsafe_code)]

//! Escape catalog: introducer kinds and the recognizers for every escape
//! family understood out of the box.
//!
//! # Sequence Reference
//!
//! | Family | Sequence | Recognizer |
//! |--------|----------|------------|
//! | SGR | `ESC [ n ; n m` / `ESC [ m` | [`SgrPattern`] |
//! | OSC 8 open | `ESC ] 8 ; params ; uri ST` | [`HyperlinkOpenPattern`] |
//! | OSC 8 close | `ESC ] 8 ; ; ST` | [`HyperlinkClosePattern`] |
//! | CUU..SD | `ESC [ n A` .. `ESC [ n T` | [`CsiPattern::numeric`] |
//! | CUP / HVP | `ESC [ row ; col H` / `f` | [`CsiPattern::position`] |
//! | AUX on/off, DSR | `ESC [ 5 i`, `ESC [ 4 i`, `ESC [ 6 n` | [`LiteralPattern`] |
//!
//! `ST` is any of `ESC \`, `0x9C`, or `BEL`.

use std::fmt;
use std::ops::Range;

use crate::matcher::{Matcher, Recognize};

/// Escape introducer kinds (C1 controls in their 7-bit `ESC Fe` form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeKind {
    /// Single Shift Two (`ESC N`)
    Ss2,
    /// Single Shift Three (`ESC O`)
    Ss3,
    /// Device Control String (`ESC P`)
    Dcs,
    /// Control Sequence Introducer (`ESC [`)
    Csi,
    /// String Terminator (`ESC \`)
    St,
    /// Operating System Command (`ESC ]`)
    Osc,
    /// Start of String (`ESC X`)
    Sos,
    /// Privacy Message (`ESC ^`)
    Pm,
    /// Application Program Command (`ESC _`)
    Apc,
}

impl EscapeKind {
    /// Every introducer kind, in catalog order.
    pub const ALL: [Self; 9] = [
        Self::Ss2,
        Self::Ss3,
        Self::Dcs,
        Self::Csi,
        Self::St,
        Self::Osc,
        Self::Sos,
        Self::Pm,
        Self::Apc,
    ];

    /// The two-byte introducer for this kind.
    #[must_use]
    pub const fn introducer(self) -> &'static str {
        match self {
            Self::Ss2 => "\x1bN",
            Self::Ss3 => "\x1bO",
            Self::Dcs => "\x1bP",
            Self::Csi => CSI,
            Self::St => ST,
            Self::Osc => OSC,
            Self::Sos => "\x1bX",
            Self::Pm => "\x1b^",
            Self::Apc => "\x1b_",
        }
    }
}

impl fmt::Display for EscapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ss2 => "SS2",
            Self::Ss3 => "SS3",
            Self::Dcs => "DCS",
            Self::Csi => "CSI",
            Self::St => "ST",
            Self::Osc => "OSC",
            Self::Sos => "SOS",
            Self::Pm => "PM",
            Self::Apc => "APC",
        };
        f.write_str(name)
    }
}

/// Escape byte.
pub const ESC: char = '\x1b';
/// Control Sequence Introducer.
pub const CSI: &str = "\x1b[";
/// Operating System Command introducer.
pub const OSC: &str = "\x1b]";
/// 7-bit String Terminator.
pub const ST: &str = "\x1b\\";
/// 8-bit String Terminator.
pub const ST_C1: &str = "\u{9c}";
/// Bell, accepted as an OSC terminator.
pub const BEL: &str = "\x07";
/// Final byte of an SGR sequence.
pub const SGR_FINAL: char = 'm';
/// Prefix shared by both hyperlink forms.
pub const HYPERLINK_PREFIX: &str = "\x1b]8;";

const LINK_TERMINATORS: [&str; 3] = [ST, ST_C1, BEL];

/// Final bytes of the single-parameter cursor/erase/scroll forms.
const CSI_NUMERIC_FINALS: &[u8] = b"ABCDEFGJKST";
/// Final bytes of the two-parameter position forms (CUP, HVP).
const CSI_POSITION_FINALS: &[u8] = b"Hf";

// =============================================================================
// Recognizers
// =============================================================================

/// SGR: `ESC [` digits, then zero or more `; digits`, then `m`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SgrPattern;

impl Recognize for SgrPattern {
    fn find(&self, haystack: &str) -> Option<Range<usize>> {
        haystack
            .match_indices(CSI)
            .find_map(|(start, _)| match_sgr_at(haystack.as_bytes(), start).map(|end| start..end))
    }
}

/// CSI forms with optional numeric parameters and a single-letter final.
#[derive(Debug, Clone, Copy)]
pub struct CsiPattern {
    finals: &'static [u8],
    allow_second: bool,
}

impl CsiPattern {
    /// `ESC [ n X` where `X` is one of `A B C D E F G J K S T`.
    #[must_use]
    pub const fn numeric() -> Self {
        Self {
            finals: CSI_NUMERIC_FINALS,
            allow_second: false,
        }
    }

    /// `ESC [ row ; col H` and `ESC [ row ; col f`.
    #[must_use]
    pub const fn position() -> Self {
        Self {
            finals: CSI_POSITION_FINALS,
            allow_second: true,
        }
    }

    fn match_at(&self, bytes: &[u8], start: usize) -> Option<usize> {
        let mut i = skip_digits(bytes, start + CSI.len());
        if self.allow_second && bytes.get(i) == Some(&b';') {
            i = skip_digits(bytes, i + 1);
        }
        let last = *bytes.get(i)?;
        self.finals.contains(&last).then_some(i + 1)
    }
}

impl Recognize for CsiPattern {
    fn find(&self, haystack: &str) -> Option<Range<usize>> {
        haystack
            .match_indices(CSI)
            .find_map(|(start, _)| self.match_at(haystack.as_bytes(), start).map(|end| start..end))
    }
}

/// A fixed escape sequence.
#[derive(Debug, Clone, Copy)]
pub struct LiteralPattern(pub &'static str);

impl Recognize for LiteralPattern {
    fn find(&self, haystack: &str) -> Option<Range<usize>> {
        haystack
            .find(self.0)
            .map(|start| start..start + self.0.len())
    }
}

/// OSC 8 hyperlink open: `ESC ] 8 ; params ; uri ST` with a non-empty,
/// single-line `uri` ending at the first terminator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperlinkOpenPattern;

impl Recognize for HyperlinkOpenPattern {
    fn find(&self, haystack: &str) -> Option<Range<usize>> {
        haystack.match_indices(HYPERLINK_PREFIX).find_map(|(start, _)| {
            split_hyperlink_at(haystack, start).map(|parts| start..parts.end)
        })
    }
}

/// OSC 8 hyperlink close: `ESC ] 8 ; ; ST`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperlinkClosePattern;

impl Recognize for HyperlinkClosePattern {
    fn find(&self, haystack: &str) -> Option<Range<usize>> {
        haystack.match_indices("\x1b]8;;").find_map(|(start, prefix)| {
            let body = start + prefix.len();
            terminator_at(haystack, body).map(|term| start..body + term.len())
        })
    }
}

/// The matchers registered by [`crate::RegistryBuilder::with_standard`].
#[must_use]
pub fn standard_matchers() -> Vec<Matcher> {
    vec![
        Matcher::new(EscapeKind::Csi, CsiPattern::numeric(), CSI),
        Matcher::new(EscapeKind::Csi, CsiPattern::position(), CSI),
        Matcher::new(EscapeKind::Csi, LiteralPattern("\x1b[5i"), "\x1b[5i"),
        Matcher::new(EscapeKind::Csi, LiteralPattern("\x1b[4i"), "\x1b[4i"),
        Matcher::new(EscapeKind::Csi, LiteralPattern("\x1b[6n"), "\x1b[6n"),
        Matcher::new(EscapeKind::Csi, SgrPattern, CSI),
        Matcher::new(EscapeKind::Osc, HyperlinkOpenPattern, HYPERLINK_PREFIX),
        Matcher::new(EscapeKind::Osc, HyperlinkClosePattern, "\x1b]8;;"),
    ]
}

// =============================================================================
// Whole-sequence checks
// =============================================================================

/// Whether `sequence` is exactly one SGR sequence.
#[must_use]
pub fn is_sgr_sequence(sequence: &str) -> bool {
    sequence.starts_with(CSI) && match_sgr_at(sequence.as_bytes(), 0) == Some(sequence.len())
}

/// Whether `sequence` is exactly one hyperlink close sequence.
#[must_use]
pub fn is_hyperlink_close_sequence(sequence: &str) -> bool {
    sequence
        .strip_prefix("\x1b]8;;")
        .is_some_and(|rest| LINK_TERMINATORS.contains(&rest))
}

/// Parts of a hyperlink open sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HyperlinkParts<'a> {
    /// Raw `key=value:key=value` parameter list (may be empty).
    pub params: &'a str,
    /// Link target.
    pub uri: &'a str,
    /// The terminator that closed the sequence.
    pub terminator: &'a str,
    end: usize,
}

/// Split a whole hyperlink open sequence into its parts.
///
/// Returns `None` unless `sequence` is exactly one hyperlink open.
#[must_use]
pub fn split_hyperlink_open(sequence: &str) -> Option<HyperlinkParts<'_>> {
    if !sequence.starts_with(HYPERLINK_PREFIX) {
        return None;
    }
    split_hyperlink_at(sequence, 0).filter(|parts| parts.end == sequence.len())
}

// =============================================================================
// Scanning helpers
// =============================================================================

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}

/// Match `ESC [ d* (; d+)* m` at `start`, returning the end offset.
fn match_sgr_at(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = skip_digits(bytes, start + CSI.len());
    while bytes.get(i) == Some(&b';') {
        let digits = i + 1;
        i = skip_digits(bytes, digits);
        if i == digits {
            return None;
        }
    }
    (bytes.get(i) == Some(&b'm')).then_some(i + 1)
}

fn terminator_at(haystack: &str, at: usize) -> Option<&'static str> {
    let rest = haystack.get(at..)?;
    LINK_TERMINATORS
        .into_iter()
        .find(|term| rest.starts_with(term))
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn split_hyperlink_at(haystack: &str, start: usize) -> Option<HyperlinkParts<'_>> {
    let params_start = start + HYPERLINK_PREFIX.len();
    let params_len = haystack[params_start..].find(';')?;
    let params_end = params_start + params_len;
    let uri_start = params_end + 1;

    if terminator_at(haystack, uri_start).is_some() {
        return None;
    }

    // Lazy match: the URI ends at the first terminator after one character.
    let mut chars = haystack[uri_start..].char_indices();
    let (_, first) = chars.next()?;
    if is_line_terminator(first) {
        return None;
    }
    for (offset, c) in chars {
        let at = uri_start + offset;
        if let Some(term) = terminator_at(haystack, at) {
            return Some(HyperlinkParts {
                params: &haystack[params_start..params_end],
                uri: &haystack[uri_start..at],
                terminator: term,
                end: at + term.len(),
            });
        }
        if is_line_terminator(c) {
            return None;
        }
    }
    None
}
