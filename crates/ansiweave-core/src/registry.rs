#![forbid(unsafe_code)]

//! Registry: the immutable set of matchers, postprocessors, and state
//! trackers that drive lexing and splicing.
//!
//! Build one with [`RegistryBuilder`] at startup and share it by reference;
//! [`Registry::standard`] is the process-wide default with SGR and OSC 8
//! hyperlink support.
//!
//! # Example
//!
//! ```
//! use ansiweave_core::{EscapeKind, Matcher, Registry, catalog::LiteralPattern};
//!
//! // Teach the lexer "save cursor" in addition to the standard families.
//! let registry = Registry::builder()
//!     .with_standard()
//!     .matcher(Matcher::new(EscapeKind::Csi, LiteralPattern("\x1b[s"), "\x1b[s"))
//!     .build();
//! assert_eq!(registry.parse("a\x1b[sb").unwrap().len(), 3);
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::catalog::standard_matchers;
use crate::error::Result;
use crate::hyperlink::{HyperlinkNormalize, HyperlinkTracker, LinkIdCounter};
use crate::matcher::Matcher;
use crate::sgr::{SgrMerge, SgrTracker};
use crate::token::{EscapeToken, TokenStream};

/// A token-stream transform run after lexing.
///
/// The lexer recomputes offsets after every transform, so implementations
/// may change token lengths freely.
pub trait Postprocess: fmt::Debug + Send + Sync {
    /// Transform the stream.
    fn process(&self, stream: TokenStream, ids: &mut LinkIdCounter) -> Result<TokenStream>;
}

/// Synthesizes the sequences that end or resume one kind of escape state.
///
/// Returned tokens are positioned at `stream.raw_len() + offset`, where
/// `offset` is the length of whatever other trackers already emitted.
pub trait StateTracker: fmt::Debug + Send + Sync {
    /// Sequences that turn off the state active at the end of `stream`.
    fn to_close(&self, stream: &TokenStream, offset: usize) -> Result<Vec<EscapeToken>>;

    /// Sequences that restore the state active at the end of `stream`.
    fn to_reopen(&self, stream: &TokenStream, offset: usize) -> Result<Vec<EscapeToken>>;
}

/// Immutable lexing and splicing configuration.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub(crate) matchers: Vec<Matcher>,
    pub(crate) postprocessors: Vec<Arc<dyn Postprocess>>,
    pub(crate) trackers: Vec<Arc<dyn StateTracker>>,
}

impl Registry {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The shared registry with the standard escape families.
    pub fn standard() -> &'static Registry {
        static STANDARD: OnceLock<Registry> = OnceLock::new();
        STANDARD.get_or_init(|| Registry::builder().with_standard().build())
    }

    /// Matchers, most specific quick string first.
    #[must_use]
    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// Postprocessors in run order.
    #[must_use]
    pub fn postprocessors(&self) -> &[Arc<dyn Postprocess>] {
        &self.postprocessors
    }

    /// State trackers in emission order.
    #[must_use]
    pub fn trackers(&self) -> &[Arc<dyn StateTracker>] {
        &self.trackers
    }
}

/// Builder for [`Registry`].
///
/// Registration is append-only. Matchers are kept sorted by descending
/// quick-string length; ties keep registration order.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Register SGR and OSC 8 hyperlink support plus the pass-through
    /// cursor and status forms.
    #[must_use]
    pub fn with_standard(self) -> Self {
        let mut builder = self
            .postprocessor(SgrMerge)
            .state_tracker(SgrTracker)
            .postprocessor(HyperlinkNormalize)
            .state_tracker(HyperlinkTracker);
        builder.registry.matchers.extend(standard_matchers());
        builder.sort_matchers();
        builder
    }

    /// Register a matcher.
    #[must_use]
    pub fn matcher(mut self, matcher: Matcher) -> Self {
        self.registry.matchers.push(matcher);
        self.sort_matchers();
        self
    }

    /// Register a postprocessor, run after those already registered.
    #[must_use]
    pub fn postprocessor(mut self, postprocessor: impl Postprocess + 'static) -> Self {
        self.registry.postprocessors.push(Arc::new(postprocessor));
        self
    }

    /// Register a close/reopen provider.
    #[must_use]
    pub fn state_tracker(mut self, tracker: impl StateTracker + 'static) -> Self {
        self.registry.trackers.push(Arc::new(tracker));
        self
    }

    /// Freeze the configuration.
    #[must_use]
    pub fn build(self) -> Registry {
        self.registry
    }

    fn sort_matchers(&mut self) {
        // `sort_by_key` is stable.
        self.registry
            .matchers
            .sort_by_key(|m| std::cmp::Reverse(m.quick().len()));
    }
}
