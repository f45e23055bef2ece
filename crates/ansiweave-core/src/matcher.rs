#![forbid(unsafe_code)]

//! Escape matchers.
//!
//! A [`Matcher`] pairs an [`EscapeKind`] with a recognizer and a *quick
//! string*: a literal that every match contains. The quick string is also
//! the priority key, since longer quick strings are more specific.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::catalog::EscapeKind;

/// Finds the first occurrence of one escape family in a haystack.
///
/// Implementations return byte ranges into `haystack`.
pub trait Recognize: fmt::Debug + Send + Sync {
    /// Byte range of the first match, if any.
    fn find(&self, haystack: &str) -> Option<Range<usize>>;
}

#[cfg(feature = "regex")]
impl Recognize for regex::Regex {
    fn find(&self, haystack: &str) -> Option<Range<usize>> {
        regex::Regex::find(self, haystack).map(|m| m.range())
    }
}

/// An escape kind, a recognizer, and the quick string used for ordering.
#[derive(Clone)]
pub struct Matcher {
    kind: EscapeKind,
    recognizer: Arc<dyn Recognize>,
    quick: Cow<'static, str>,
}

impl Matcher {
    /// Create a matcher.
    pub fn new(
        kind: EscapeKind,
        recognizer: impl Recognize + 'static,
        quick: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            recognizer: Arc::new(recognizer),
            quick: quick.into(),
        }
    }

    /// The escape kind attached to matched tokens.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EscapeKind {
        self.kind
    }

    /// The literal every match contains.
    #[inline]
    #[must_use]
    pub fn quick(&self) -> &str {
        &self.quick
    }

    /// First non-empty match at or after byte `offset`, in absolute offsets.
    ///
    /// The quick string gates the search: when it does not occur in the
    /// remaining text the recognizer is never run.
    #[must_use]
    pub fn find_in(&self, text: &str, offset: usize) -> Option<Range<usize>> {
        let mut from = offset;
        loop {
            let rest = text.get(from..)?;
            if !self.quick.is_empty() && !rest.contains(self.quick.as_ref()) {
                return None;
            }
            let found = self.recognizer.find(rest)?;
            if !found.is_empty() {
                return Some(from + found.start..from + found.end);
            }
            // Skip past an empty match by one character.
            let step = rest[found.start..].chars().next()?.len_utf8();
            from += found.start + step;
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("kind", &self.kind)
            .field("quick", &self.quick)
            .field("recognizer", &self.recognizer)
            .finish()
    }
}
