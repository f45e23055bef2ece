#![forbid(unsafe_code)]

//! Position mapping and splicing.
//!
//! Inserting at a visible position closes whatever state is active before
//! the split, renders the value from a clean state, closes anything the
//! value left open, then reopens the earlier state for the remainder.

use crate::error::Result;
use crate::registry::{Registry, StateTracker};
use crate::token::{EscapeToken, TokenStream};

impl Registry {
    /// Sequences that turn off every tracked state active at the end of
    /// `stream`, in tracker order.
    pub fn close_sequences(&self, stream: &TokenStream) -> Result<Vec<EscapeToken>> {
        self.synthesize(stream, |tracker, offset| tracker.to_close(stream, offset))
    }

    /// Sequences that restore every tracked state active at the end of
    /// `stream`, in tracker order.
    pub fn reopen_sequences(&self, stream: &TokenStream) -> Result<Vec<EscapeToken>> {
        self.synthesize(stream, |tracker, offset| tracker.to_reopen(stream, offset))
    }

    fn synthesize<F>(&self, stream: &TokenStream, mut emit: F) -> Result<Vec<EscapeToken>>
    where
        F: FnMut(&dyn StateTracker, usize) -> Result<Vec<EscapeToken>>,
    {
        let mut out = Vec::new();
        let mut offset = 0;
        for tracker in &self.trackers {
            let produced = emit(tracker.as_ref(), offset)?;
            offset += produced.iter().map(|e| e.sequence.len()).sum::<usize>();
            out.extend(produced);
        }
        debug_assert!(out.iter().all(|e| e.start >= stream.raw_len()));
        Ok(out)
    }

    /// Visible text of `text`.
    #[must_use]
    pub fn strip_ansi(&self, text: &str) -> String {
        self.tokenize(text).strip()
    }

    /// Raw byte offset of visible position `visible_pos` in the normalized
    /// rendering of `text`.
    pub fn ansi_position(&self, text: &str, visible_pos: usize) -> Result<usize> {
        Ok(self.parse(text)?.ansi_position(visible_pos))
    }

    /// Insert `value` at visible position `visible_pos` of `text`.
    ///
    /// The result is based on the normalized rendering of `text`.
    pub fn insert_at(&self, text: &str, visible_pos: usize, value: &str) -> Result<String> {
        self.insert_at_stream(&self.parse(text)?, visible_pos, value)
    }

    /// Insert `value` at visible position `visible_pos` of `stream`.
    pub fn insert_at_stream(
        &self,
        stream: &TokenStream,
        visible_pos: usize,
        value: &str,
    ) -> Result<String> {
        let rendered = stream.to_string();
        let split = stream.ansi_position(visible_pos);
        let (before, after) = rendered.split_at(split);

        let before_stream = self.tokenize(before);
        let value_stream = self.tokenize(value);

        let mut out = String::with_capacity(rendered.len() + value.len() + 32);
        out.push_str(before);
        push_all(&mut out, &self.close_sequences(&before_stream)?);
        out.push_str(value);
        push_all(&mut out, &self.close_sequences(&value_stream)?);
        push_all(&mut out, &self.reopen_sequences(&before_stream)?);
        out.push_str(after);
        Ok(out)
    }
}

fn push_all(out: &mut String, tokens: &[EscapeToken]) {
    for token in tokens {
        out.push_str(&token.sequence);
    }
}
