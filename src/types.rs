use std::fmt;

use unicode_segmentation::UnicodeSegmentation;

/// A position within a text buffer.
///
/// Lines are 1-indexed and columns are 0-indexed byte offsets into the
/// line, matching host buffer addressing. Ordering is line-major, then
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// One-based line number.
    pub line: usize,
    /// Zero-based byte offset within the line.
    pub col: usize,
}

impl Position {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A span of buffer text, inclusive on both ends.
///
/// `to == None` encodes a zero-width region anchored at `from`, used for
/// degenerate delimiters such as a tag with no body, where the region marks
/// an insertion point rather than any text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub from: Position,
    pub to: Option<Position>,
}

impl Region {
    /// A region covering `from..=to`.
    pub const fn span(from: Position, to: Position) -> Self {
        Self { from, to: Some(to) }
    }

    /// A zero-width region anchored at `at`.
    pub const fn empty(at: Position) -> Self {
        Self { from: at, to: None }
    }

    pub const fn is_empty(&self) -> bool {
        self.to.is_none()
    }
}

/// The delimiting pair of a surrounding: `left` strictly precedes `right`
/// unless either side is zero-width. Constructed fresh per search; never
/// persisted across operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionPair {
    pub left: Region,
    pub right: Region,
}

/// How a region's boundaries are interpreted for editing.
///
/// Hosts expose three incompatible selection/operator kinds; the submode
/// must travel with any region so insertion and deletion can treat newline
/// boundaries and indentation correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submode {
    Charwise,
    Linewise,
    Blockwise,
}

/// Tie-break policy for resolving candidate surroundings relative to the
/// cursor. Exactly one method is active per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMethod {
    /// Smallest candidate covering the cursor, or fail.
    #[default]
    Cover,
    /// Covering candidate if any (same line preferred), else nearest after.
    CoverOrNext,
    /// Covering candidate if any (same line preferred), else nearest before.
    CoverOrPrev,
    /// Covering candidate if any (same line preferred), else whichever of
    /// next/prev is closer to the cursor's left edge.
    CoverOrNearest,
    /// Nearest candidate strictly after the cursor.
    Next,
    /// Nearest candidate strictly before the cursor.
    Prev,
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMethod::Cover => "cover",
            SearchMethod::CoverOrNext => "cover_or_next",
            SearchMethod::CoverOrPrev => "cover_or_prev",
            SearchMethod::CoverOrNearest => "cover_or_nearest",
            SearchMethod::Next => "next",
            SearchMethod::Prev => "prev",
        };
        f.write_str(name)
    }
}

/// Engine configuration. Hosts wanting buffer-local overrides construct a
/// per-buffer `Config` and pass it at operation time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Search window half-width in lines.
    pub n_lines: usize,
    /// Tie-break policy for surround searches.
    pub search_method: SearchMethod,
    /// Whether linewise/blockwise add/delete reindents.
    pub respect_selection_type: bool,
    /// Milliseconds before a transient highlight auto-clears.
    pub highlight_duration_ms: u64,
    /// Suppress informational messages.
    pub silent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            n_lines: 20,
            search_method: SearchMethod::Cover,
            respect_selection_type: false,
            highlight_duration_ms: 500,
            silent: false,
        }
    }
}

/// Snap `col` down to the start of the grapheme cluster containing it.
pub(crate) fn grapheme_floor(line: &str, col: usize) -> usize {
    let col = col.min(line.len());
    for (idx, g) in line.grapheme_indices(true) {
        if idx == col {
            return idx;
        }
        if idx + g.len() > col {
            return idx;
        }
    }
    line.len()
}

/// Byte offset just past the grapheme cluster starting at (or containing)
/// `col`.
pub(crate) fn grapheme_end(line: &str, col: usize) -> usize {
    let col = grapheme_floor(line, col);
    line[col..]
        .graphemes(true)
        .next()
        .map_or(col, |g| col + g.len())
}
