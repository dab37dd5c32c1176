//! Surrounding specifications: how an identifier resolves to a searchable
//! input and an insertable output.
//!
//! Builtin identifiers and user registrations live in the same lookup
//! table; any single character with no entry falls back to a literal
//! identical pair (so `*`, `_`, `"` all work without configuration).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::search::SearchWindow;
use crate::traits::InputSource;
use crate::types::RegionPair;

/// How to locate a surrounding's delimiter pair in buffer text.
#[derive(Clone)]
pub enum InputSpec {
    /// Regex alternatives whose capture groups mark the delimiter spans:
    /// two groups capture the delimiter texts themselves, four groups must
    /// be empty markers for the boundary offsets. Compiled lazily, at the
    /// moment the spec is used.
    Pattern(Vec<String>),
    /// A balanced delimiter pair. Distinct open/close match depth-aware;
    /// identical open/close pair consecutive occurrences without nesting.
    Balanced { open: char, close: char },
    /// Prompt the user for literal left/right delimiters, then search for
    /// them as an escaped pattern.
    Ask,
    /// Host-computed candidates over the search window.
    Query(Arc<dyn Fn(&SearchWindow) -> Vec<RegionPair> + Send + Sync>),
}

impl fmt::Debug for InputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSpec::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
            InputSpec::Balanced { open, close } => f
                .debug_struct("Balanced")
                .field("open", open)
                .field("close", close)
                .finish(),
            InputSpec::Ask => f.write_str("Ask"),
            InputSpec::Query(_) => f.write_str("Query(..)"),
        }
    }
}

/// How to produce a surrounding's delimiter strings for insertion.
#[derive(Clone)]
pub enum OutputSpec {
    Literal { left: String, right: String },
    /// Prompt the user for both delimiters.
    Ask,
    /// Computed, possibly via prompts. `None` means the user cancelled.
    Call(Arc<dyn Fn(&mut dyn InputSource) -> Option<(String, String)> + Send + Sync>),
}

impl fmt::Debug for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSpec::Literal { left, right } => f
                .debug_struct("Literal")
                .field("left", left)
                .field("right", right)
                .finish(),
            OutputSpec::Ask => f.write_str("Ask"),
            OutputSpec::Call(_) => f.write_str("Call(..)"),
        }
    }
}

/// A complete surrounding specification. Mutable at the configuration
/// level; immutable once resolved for a single operation.
#[derive(Debug, Clone)]
pub struct SurroundingSpec {
    pub input: InputSpec,
    pub output: OutputSpec,
}

impl SurroundingSpec {
    /// The fallback for unregistered single-character identifiers: the
    /// character is both delimiters, paired without nesting.
    pub fn literal_pair(c: char) -> Self {
        Self {
            input: InputSpec::Balanced { open: c, close: c },
            output: OutputSpec::Literal {
                left: c.to_string(),
                right: c.to_string(),
            },
        }
    }
}

/// Lookup table from identifier to specification. Builtins are ordinary
/// entries; user registrations override them.
#[derive(Debug, Default)]
pub struct SurroundingRegistry {
    entries: HashMap<String, SurroundingSpec>,
}

impl SurroundingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the builtin surroundings: the four
    /// bracket pairs (open variants pad the inner edge with one space),
    /// function call `f`, tag `t`, and interactive `?`.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        for (open, close) in [('(', ')'), ('[', ']'), ('{', '}'), ('<', '>')] {
            reg.register(
                open.to_string(),
                SurroundingSpec {
                    input: InputSpec::Balanced { open, close },
                    output: OutputSpec::Literal {
                        left: format!("{open} "),
                        right: format!(" {close}"),
                    },
                },
            );
            reg.register(
                close.to_string(),
                SurroundingSpec {
                    input: InputSpec::Balanced { open, close },
                    output: OutputSpec::Literal {
                        left: open.to_string(),
                        right: close.to_string(),
                    },
                },
            );
        }

        reg.register(
            "f",
            SurroundingSpec {
                input: InputSpec::Pattern(vec![r"(?s)\b([\w.]+\().*?(\))".to_string()]),
                output: OutputSpec::Call(Arc::new(|input: &mut dyn InputSource| {
                    let name = input.read_string("Function name: ")?;
                    Some((format!("{name}("), ")".to_string()))
                })),
            },
        );

        reg.register(
            "t",
            SurroundingSpec {
                input: InputSpec::Pattern(vec![
                    r"(?s)(<[A-Za-z][^<>]*>).*?(</[^<>]*>)".to_string(),
                ]),
                output: OutputSpec::Call(Arc::new(|input: &mut dyn InputSource| {
                    let name = input.read_string("Tag name: ")?;
                    Some((format!("<{name}>"), format!("</{name}>")))
                })),
            },
        );

        reg.register(
            "?",
            SurroundingSpec {
                input: InputSpec::Ask,
                output: OutputSpec::Ask,
            },
        );

        reg
    }

    pub fn register(&mut self, id: impl Into<String>, spec: SurroundingSpec) {
        self.entries.insert(id.into(), spec);
    }

    pub fn remove(&mut self, id: &str) -> Option<SurroundingSpec> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&SurroundingSpec> {
        self.entries.get(id)
    }

    /// Whether `partial` is a proper prefix of some registered identifier.
    pub(crate) fn has_prefix(&self, partial: &str) -> bool {
        self.entries
            .keys()
            .any(|k| k.len() > partial.len() && k.starts_with(partial))
    }
}

/// Build the escaped-literal search pattern for interactively supplied
/// delimiters.
pub(crate) fn literal_input_pattern(left: &str, right: &str) -> String {
    format!("(?s)({}).*?({})", regex::escape(left), regex::escape(right))
}
