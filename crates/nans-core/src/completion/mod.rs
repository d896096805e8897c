//! Completion engine.
//!
//! [`CompletionEngine::completions`] rebuilds the [`AliasTable`] from the
//! document, classifies the cursor [`CompletionContext`], and dispatches to
//! one of three strategies:
//!
//! - **attribute**: members of the object behind a dotted path, resolved
//!   through aliases and the [`ObjectIntrospector`];
//! - **import**: installed top-level modules from the [`ModuleIndex`];
//! - **word**: reserved words and builtins, with `print` promoted first.
//!
//! Nothing in here fails. A path that cannot be resolved simply produces no
//! candidates.

pub mod alias;
pub mod context;
pub mod vocabulary;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::introspect::{ModuleIndex, ObjectIntrospector};

pub use alias::{AliasEntry, AliasTable};
pub use context::{CompletionContext, ImportKeyword, classify};

/// What a candidate completes to, for styling in the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    Keyword,
    Builtin,
    Module,
    Attribute,
}

/// One proposed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Text inserted at the cursor.
    pub insert_text: String,
    /// Text shown in the popup.
    pub display_label: String,
    /// Characters before the cursor to overwrite, as a non-positive offset:
    /// `0` for attribute completion, `-len(prefix)` otherwise.
    pub replace_from: isize,
    pub kind: CandidateKind,
}

impl Candidate {
    /// Number of characters before the cursor this candidate replaces.
    pub fn replace_len(&self) -> usize {
        self.replace_from.unsigned_abs()
    }
}

/// Lazily produced candidates for one request.
///
/// Ordering is fixed when the request is made; per-candidate work such as
/// documentation lookup happens as the iterator is advanced.
pub struct Completions<'a> {
    context: CompletionContext,
    inner: Box<dyn Iterator<Item = Candidate> + 'a>,
}

impl<'a> Completions<'a> {
    fn new(context: CompletionContext, inner: impl Iterator<Item = Candidate> + 'a) -> Self {
        Self {
            context,
            inner: Box::new(inner),
        }
    }

    /// The context the request was classified as.
    pub fn context(&self) -> &CompletionContext {
        &self.context
    }
}

impl Iterator for Completions<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        self.inner.next()
    }
}

/// Sort names case-insensitively; names equal ignoring case fall back to
/// byte order so the result is deterministic.
pub fn sort_case_insensitive(names: &mut [String]) {
    names.sort_by_cached_key(|name| (name.to_lowercase(), name.clone()));
}

/// Classifies cursor context and produces candidates.
///
/// The engine holds only read-only collaborators; the alias table is
/// rebuilt on every call and dropped afterwards.
pub struct CompletionEngine {
    introspector: Arc<dyn ObjectIntrospector>,
    modules: Arc<ModuleIndex>,
    words: Vec<&'static str>,
}

impl CompletionEngine {
    pub fn new(introspector: Arc<dyn ObjectIntrospector>, modules: Arc<ModuleIndex>) -> Self {
        let words: BTreeSet<&'static str> = vocabulary::KEYWORDS
            .iter()
            .chain(vocabulary::BUILTINS)
            .copied()
            .collect();
        Self {
            introspector,
            modules,
            words: words.into_iter().collect(),
        }
    }

    /// The installed-module index this engine completes imports from.
    pub fn modules(&self) -> &ModuleIndex {
        &self.modules
    }

    /// Candidates for the cursor at byte `offset` in `text`.
    pub fn completions(&self, text: &str, offset: usize) -> Completions<'_> {
        let aliases = AliasTable::refresh(text);
        let context = classify(text, offset);
        debug!(
            kind = context.kind(),
            prefix = context.prefix(),
            aliases = aliases.len(),
            "Completion request"
        );

        match &context {
            CompletionContext::AttributePath { path } => {
                let iter = self.attribute_candidates(&aliases, path);
                Completions::new(context, iter)
            }
            CompletionContext::ImportClause { prefix, .. } => {
                let iter = self.module_candidates(prefix);
                Completions::new(context, iter)
            }
            CompletionContext::PlainWord { prefix } => {
                let iter = self.word_candidates(prefix);
                Completions::new(context, iter)
            }
        }
    }

    /// Resolve `path[0]` through `aliases`, then walk the rest.
    fn attribute_candidates<'s>(
        &'s self,
        aliases: &AliasTable,
        path: &[String],
    ) -> impl Iterator<Item = Candidate> + use<'s> {
        let root = aliases.resolve(&path[0]).unwrap_or(&path[0]);
        let mut full = root.to_string();
        for segment in &path[1..] {
            full.push('.');
            full.push_str(segment);
        }

        let resolution = self.introspector.resolve(&full);
        debug!(path = %full, members = resolution.members.len(), "Resolved attribute path");

        let mut members = resolution.members;
        sort_case_insensitive(&mut members);
        let handle = resolution.handle;

        members.into_iter().map(move |name| {
            let doc = handle
                .as_ref()
                .map(|h| self.introspector.doc_first_line(h, &name))
                .unwrap_or_default();
            let display_label = if doc.is_empty() {
                name.clone()
            } else {
                format!("{name} - {doc}")
            };
            Candidate {
                insert_text: name,
                display_label,
                replace_from: 0,
                kind: CandidateKind::Attribute,
            }
        })
    }

    fn module_candidates(&self, prefix: &str) -> impl Iterator<Item = Candidate> + use<> {
        let replace_from = -(prefix.chars().count() as isize);
        self.modules
            .matching(prefix)
            .into_iter()
            .map(move |name| Candidate {
                display_label: name.clone(),
                insert_text: name,
                replace_from,
                kind: CandidateKind::Module,
            })
    }

    fn word_candidates(&self, prefix: &str) -> impl Iterator<Item = Candidate> + use<> {
        let replace_from = -(prefix.chars().count() as isize);
        let lowered = prefix.to_lowercase();

        let mut matches: Vec<String> = self
            .words
            .iter()
            .filter(|w| w.to_lowercase().starts_with(&lowered))
            .map(|w| w.to_string())
            .collect();

        let has_print = matches.iter().any(|w| w == "print");
        matches.retain(|w| w != "print");
        sort_case_insensitive(&mut matches);
        if has_print {
            matches.insert(0, "print".to_string());
        }

        matches.into_iter().map(move |word| Candidate {
            kind: if vocabulary::is_keyword(&word) {
                CandidateKind::Keyword
            } else {
                CandidateKind::Builtin
            },
            display_label: word.clone(),
            insert_text: word,
            replace_from,
        })
    }
}
