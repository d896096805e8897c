//! Cursor context classification.
//!
//! Every `(text, cursor)` pair maps to exactly one [`CompletionContext`].
//! The rules are tried in order against the text before the cursor:
//!
//! 1. `ident(.ident)*.` right before the cursor, not glued to a preceding
//!    digit, identifier char or dot: [`CompletionContext::AttributePath`].
//! 2. The current line starts with `import` or `from` plus whitespace:
//!    [`CompletionContext::ImportClause`].
//! 3. Anything else: [`CompletionContext::PlainWord`].

use std::sync::LazyLock;

use regex::Regex;

static DOTTED_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_.])([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)\.$")
        .expect("dotted path pattern compiles")
});

/// Keyword that opened an import clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKeyword {
    Import,
    From,
}

impl ImportKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportKeyword::Import => "import",
            ImportKeyword::From => "from",
        }
    }
}

/// What the user is completing at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// Cursor sits right after a trailing dot; `path` holds the segments
    /// before it (never empty).
    AttributePath { path: Vec<String> },
    /// Cursor is inside an `import`/`from` statement.
    ImportClause {
        keyword: ImportKeyword,
        prefix: String,
    },
    /// Keyword, builtin, or arbitrary identifier prefix.
    PlainWord { prefix: String },
}

impl CompletionContext {
    /// The typed text the candidates will overwrite.
    pub fn prefix(&self) -> &str {
        match self {
            CompletionContext::AttributePath { .. } => "",
            CompletionContext::ImportClause { prefix, .. } => prefix,
            CompletionContext::PlainWord { prefix } => prefix,
        }
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionContext::AttributePath { .. } => "attribute",
            CompletionContext::ImportClause { .. } => "import",
            CompletionContext::PlainWord { .. } => "word",
        }
    }
}

/// Clamp `offset` into `text` and move it back onto a char boundary.
pub fn clamp_offset(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Classify the cursor position `offset` (a byte offset) within `text`.
pub fn classify(text: &str, offset: usize) -> CompletionContext {
    let before = &text[..clamp_offset(text, offset)];

    if let Some(caps) = DOTTED_PATH.captures(before) {
        let path = caps[1].split('.').map(str::to_string).collect();
        return CompletionContext::AttributePath { path };
    }

    let line = before.rsplit('\n').next().unwrap_or(before);
    if let Some(keyword) = import_keyword(line) {
        return CompletionContext::ImportClause {
            keyword,
            prefix: import_prefix(line),
        };
    }

    CompletionContext::PlainWord {
        prefix: identifier_prefix(before).to_string(),
    }
}

fn import_keyword(line: &str) -> Option<ImportKeyword> {
    let trimmed = line.trim_start();
    [ImportKeyword::Import, ImportKeyword::From]
        .into_iter()
        .find(|kw| {
            trimmed
                .strip_prefix(kw.as_str())
                .and_then(|rest| rest.chars().next())
                .is_some_and(char::is_whitespace)
        })
}

/// The token being typed: empty right after whitespace, otherwise the last
/// whitespace-delimited token of the line.
fn import_prefix(line: &str) -> String {
    if line.ends_with(char::is_whitespace) {
        return String::new();
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() > 1 {
        tokens[tokens.len() - 1].to_string()
    } else {
        String::new()
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The run of identifier characters ending at the end of `before`.
fn identifier_prefix(before: &str) -> &str {
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_identifier_char(*c))
        .last()
        .map_or(before.len(), |(i, _)| i);
    &before[start..]
}
