use crate::types::SearchMethod;

/// Errors surfaced by the surround and key-sequence engines.
///
/// `NotFound` and `Cancelled` are recoverable outcomes of normal use;
/// `Spec` and `InvalidInput` indicate configuration or caller mistakes. No
/// variant leaves the buffer partially edited: edits are applied only after
/// every input and search has succeeded.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The search window was exhausted without a valid candidate.
    #[error(
        "No surrounding '{}{id}' found within {n_lines} lines and search_method='{method}'",
        CountPrefix(.count)
    )]
    NotFound {
        id: String,
        count: usize,
        n_lines: usize,
        method: SearchMethod,
    },

    /// Malformed custom surrounding pattern. Raised at the moment the spec
    /// is used, since specs may be lazily constructed.
    #[error("malformed surrounding pattern: {0}")]
    Spec(String),

    /// `<Esc>`/`<C-c>` during an awaiting-input phase. A no-op abort.
    #[error("operation cancelled")]
    Cancelled,

    /// Wrong-shaped input at the API boundary, raised before any search or
    /// edit begins.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

struct CountPrefix<'a>(&'a usize);

impl std::fmt::Display for CountPrefix<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self.0 > 1 {
            write!(f, "{}", self.0)?;
        }
        Ok(())
    }
}
