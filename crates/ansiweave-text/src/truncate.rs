#![forbid(unsafe_code)]

//! Truncation with an ellipsis marker.
//!
//! Each `\n`-separated line is shortened independently. Styles and links
//! open at the cut are closed before the marker, and the part kept after
//! the marker (for [`TruncatePosition::Start`] and
//! [`TruncatePosition::Middle`]) starts with the state it had in the
//! original line.

use std::borrow::Cow;

use ansiweave_core::{EscapeToken, LinkIdCounter, Registry, Result, TokenStream};

/// Dim ellipsis followed by a reset.
pub const DEFAULT_MARKER: &str = "\x1b[2m…\x1b[0m";

/// Which part of a line is replaced by the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncatePosition {
    /// Keep the tail.
    Start,
    /// Keep both ends.
    Middle,
    /// Keep the head.
    #[default]
    End,
}

/// Shortens lines against a registry.
#[derive(Debug, Clone)]
pub struct Truncator<'r> {
    registry: &'r Registry,
    marker: Cow<'r, str>,
}

impl Default for Truncator<'static> {
    fn default() -> Self {
        Self::new(Registry::standard())
    }
}

impl<'r> Truncator<'r> {
    /// Truncator with the [`DEFAULT_MARKER`].
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            marker: Cow::Borrowed(DEFAULT_MARKER),
        }
    }

    /// Use a different marker. Its visible length is subtracted from the
    /// kept text; a marker wider than the width is cut down to it.
    #[must_use]
    pub fn marker(mut self, marker: impl Into<Cow<'r, str>>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Limit every line of `text` to `width` visible chars.
    ///
    /// Lines that already fit are returned as they are; a width of zero
    /// empties every line. Hyperlink ids are drawn from one counter for the
    /// whole text.
    pub fn truncate(&self, text: &str, width: usize, position: TruncatePosition) -> Result<String> {
        let mut ids = LinkIdCounter::new();
        let lines = text
            .split('\n')
            .map(|line| self.truncate_line(line, width, position, &mut ids))
            .collect::<Result<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }

    fn truncate_line(
        &self,
        line: &str,
        width: usize,
        position: TruncatePosition,
        ids: &mut LinkIdCounter,
    ) -> Result<String> {
        let stream = self.registry.parse_with(line, ids)?;
        let visible = stream.visible_len();
        if visible <= width {
            return Ok(line.to_owned());
        }
        if width == 0 {
            return Ok(String::new());
        }

        let marker = self.tokenize(&self.marker);
        let marker_len = marker.visible_len();
        if marker_len > width {
            let cut = &self.marker[..marker.ansi_position(width)];
            let mut out = cut.to_owned();
            push_all(&mut out, &self.close(cut)?);
            return Ok(out);
        }
        let keep = width - marker_len;
        let (lead, trail) = match position {
            TruncatePosition::End => (keep, 0),
            TruncatePosition::Start => (0, keep),
            TruncatePosition::Middle => (keep - keep.div_ceil(2), keep.div_ceil(2)),
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(visible, width, lead, trail, ?position, "truncating line");

        let rendered = stream.to_string();
        let head = if lead == 0 {
            ""
        } else {
            &rendered[..stream.ansi_position(lead)]
        };
        let (skipped, tail) = rendered.split_at(stream.ansi_position(visible - trail));

        let mut out = String::with_capacity(head.len() + self.marker.len() + tail.len() + 16);
        out.push_str(head);
        push_all(&mut out, &self.close(head)?);
        out.push_str(&self.marker);
        push_all(&mut out, &self.close(&self.marker)?);
        if trail > 0 {
            push_all(&mut out, &self.registry.reopen_sequences(&self.tokenize(skipped))?);
            out.push_str(tail);
        }
        Ok(out)
    }

    fn close(&self, text: &str) -> Result<Vec<EscapeToken>> {
        self.registry.close_sequences(&self.tokenize(text))
    }

    fn tokenize(&self, text: &str) -> TokenStream {
        self.registry.tokenize(text)
    }
}

fn push_all(out: &mut String, tokens: &[EscapeToken]) {
    for token in tokens {
        out.push_str(&token.sequence);
    }
}

/// Truncate with the standard registry and [`DEFAULT_MARKER`].
pub fn truncate(text: &str, width: usize, position: TruncatePosition) -> Result<String> {
    Truncator::default().truncate(text, width, position)
}

/// Truncate with the standard registry and a custom marker.
pub fn truncate_with(
    text: &str,
    width: usize,
    position: TruncatePosition,
    marker: &str,
) -> Result<String> {
    Truncator::new(Registry::standard())
        .marker(marker)
        .truncate(text, width, position)
}
