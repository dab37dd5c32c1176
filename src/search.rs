//! Span search: candidate enumeration and search-method selection.
//!
//! A search runs over a bounded window of buffer text around the cursor.
//! Candidate region pairs come from regex patterns with boundary captures,
//! balanced brackets, consecutive quote pairing, or a host-supplied query
//! function; then exactly one candidate is picked according to the active
//! [`SearchMethod`].

use log::{debug, trace};

use crate::error::Error;
use crate::spec::InputSpec;
use crate::traits::BufferOps;
use crate::types::{Position, Region, SearchMethod};

/// Half-open byte span within a search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub(crate) fn width(&self) -> usize {
        self.end - self.start
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One candidate surrounding: the outer span plus the two delimiter spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Candidate {
    pub outer: Span,
    pub left: Span,
    pub right: Span,
}

/// The bounded chunk of buffer text a search runs over: the cursor line
/// plus `n_lines` in each direction, joined with `\n`.
pub struct SearchWindow {
    text: String,
    first_line: usize,
    line_starts: Vec<usize>,
    cursor: usize,
}

impl SearchWindow {
    pub fn new<B: BufferOps + ?Sized>(buf: &B, cursor: Position, n_lines: usize) -> Self {
        let last = buf.line_count().max(1);
        let cursor_line = cursor.line.clamp(1, last);
        let first_line = cursor_line.saturating_sub(n_lines).max(1);
        let last_line = (cursor_line + n_lines).min(last);

        let mut text = String::new();
        let mut line_starts = Vec::with_capacity(last_line - first_line + 1);
        for l in first_line..=last_line {
            if l > first_line {
                text.push('\n');
            }
            line_starts.push(text.len());
            text.push_str(&buf.line(l).unwrap_or_default());
        }

        let line_start = line_starts[cursor_line - first_line];
        let line_len = line_starts
            .get(cursor_line - first_line + 1)
            .map_or(text.len(), |next| next - 1)
            - line_start;
        // The cursor sits on a character: snap past-end columns back onto
        // the line's last grapheme.
        let col = if line_len == 0 {
            0
        } else {
            crate::types::grapheme_floor(
                &text[line_start..line_start + line_len],
                cursor.col.min(line_len - 1),
            )
        };
        let cursor = line_start + col;

        Self {
            text,
            first_line,
            line_starts,
            cursor,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of the cursor within the window text.
    pub fn cursor_offset(&self) -> usize {
        self.cursor
    }

    /// Buffer position of a byte offset in the window text.
    pub fn offset_to_pos(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Position::new(self.first_line + idx, offset - self.line_starts[idx])
    }

    /// Byte offset of a buffer position, if it falls inside the window.
    pub fn pos_to_offset(&self, pos: Position) -> Option<usize> {
        if pos.line < self.first_line {
            return None;
        }
        let idx = pos.line - self.first_line;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(self.text.len(), |next| next - 1);
        (start + pos.col <= end).then_some(start + pos.col)
    }

    /// Window-relative line index containing `offset`.
    fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset.min(self.text.len())) {
            Ok(i) => i,
            Err(i) => i - 1,
        }
    }

    /// Convert a delimiter span to a buffer region. Empty spans become
    /// zero-width regions anchored at the span start.
    pub(crate) fn span_to_region(&self, span: Span) -> Region {
        if span.is_empty() {
            return Region::empty(self.offset_to_pos(span.start));
        }
        let last = prev_char_boundary(&self.text, span.end);
        Region::span(self.offset_to_pos(span.start), self.offset_to_pos(last))
    }
}

fn prev_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len()).saturating_sub(1);
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn next_char_boundary(text: &str, mut idx: usize) -> usize {
    idx += 1;
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx.min(text.len())
}

/// Enumerate all candidates in the window for one input spec.
pub(crate) fn candidates(window: &SearchWindow, input: &InputSpec) -> Result<Vec<Candidate>, Error> {
    let mut found = match input {
        InputSpec::Pattern(patterns) => pattern_candidates(window.text(), patterns)?,
        InputSpec::Balanced { open, close } if open == close => {
            quote_candidates(window.text(), *open)
        }
        InputSpec::Balanced { open, close } => balanced_candidates(window.text(), *open, *close),
        InputSpec::Query(f) => f(window)
            .into_iter()
            .filter_map(|pair| {
                let left = region_to_span(window, pair.left)?;
                let right = region_to_span(window, pair.right)?;
                (left.start <= right.start && left.end <= right.end).then_some(Candidate {
                    outer: Span { start: left.start, end: right.end.max(left.end) },
                    left,
                    right,
                })
            })
            .collect(),
        InputSpec::Ask => {
            return Err(Error::Spec(
                "InputSpec::Ask must be resolved before searching".into(),
            ));
        }
    };
    found.sort_unstable();
    found.dedup();
    debug!("span search produced {} candidate(s)", found.len());
    Ok(found)
}

fn region_to_span(window: &SearchWindow, region: Region) -> Option<Span> {
    let start = window.pos_to_offset(region.from)?;
    let end = match region.to {
        Some(to) => next_char_boundary(window.text(), window.pos_to_offset(to)?),
        None => start,
    };
    Some(Span { start, end })
}

/// Enumerate overlapping regex matches, interpreting capture groups as
/// delimiter spans: two groups are the delimiter texts themselves, four
/// groups must be empty markers for the four boundary offsets.
fn pattern_candidates(text: &str, patterns: &[String]) -> Result<Vec<Candidate>, Error> {
    let mut out = Vec::new();
    for pattern in patterns {
        let re = regex::Regex::new(pattern)
            .map_err(|e| Error::Spec(format!("invalid pattern '{pattern}': {e}")))?;
        let mut start = 0;
        while start <= text.len() {
            let Some(caps) = re.captures_at(text, start) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            out.push(candidate_from_captures(pattern, &caps, whole)?);
            if whole.start() >= text.len() {
                break;
            }
            start = next_char_boundary(text, whole.start());
        }
    }
    Ok(out)
}

fn candidate_from_captures(
    pattern: &str,
    caps: &regex::Captures<'_>,
    whole: regex::Match<'_>,
) -> Result<Candidate, Error> {
    let groups: Vec<regex::Match<'_>> = caps.iter().skip(1).flatten().collect();
    let outer = Span { start: whole.start(), end: whole.end() };
    match groups.as_slice() {
        [left, right] => Ok(Candidate {
            outer,
            left: Span { start: left.start(), end: left.end() },
            right: Span { start: right.start(), end: right.end() },
        }),
        [a, b, c, d] => {
            if groups.iter().any(|g| g.start() != g.end()) {
                return Err(Error::Spec(format!(
                    "pattern '{pattern}': four-capture form requires empty boundary markers"
                )));
            }
            Ok(Candidate {
                outer,
                left: Span { start: a.start(), end: b.start() },
                right: Span { start: c.start(), end: d.start() },
            })
        }
        other => Err(Error::Spec(format!(
            "pattern '{pattern}' resolved {} capture group(s), expected 2 or 4",
            other.len()
        ))),
    }
}

/// Depth-aware scan for distinct open/close delimiters: a candidate's open
/// and close are at the same nesting depth.
fn balanced_candidates(text: &str, open: char, close: char) -> Vec<Candidate> {
    let mut stack = Vec::new();
    let mut out = Vec::new();
    for (i, c) in text.char_indices() {
        if c == open {
            stack.push(i);
        } else if c == close {
            if let Some(o) = stack.pop() {
                out.push(Candidate {
                    outer: Span { start: o, end: i + close.len_utf8() },
                    left: Span { start: o, end: o + open.len_utf8() },
                    right: Span { start: i, end: i + close.len_utf8() },
                });
            }
        }
    }
    out
}

/// Identical delimiters do not nest: every pair of consecutive occurrences
/// is a candidate, so the cursor always sees the Nth occurrence on either
/// side of it.
fn quote_candidates(text: &str, ch: char) -> Vec<Candidate> {
    let offsets: Vec<usize> = text.char_indices().filter(|&(_, c)| c == ch).map(|(i, _)| i).collect();
    let w = ch.len_utf8();
    offsets
        .windows(2)
        .map(|pair| Candidate {
            outer: Span { start: pair[0], end: pair[1] + w },
            left: Span { start: pair[0], end: pair[0] + w },
            right: Span { start: pair[1], end: pair[1] + w },
        })
        .collect()
}

/// Pick one candidate per the method's tie-break policy, `count` times: each
/// iteration continues strictly outside the previously found span.
pub(crate) fn select(
    window: &SearchWindow,
    candidates: &[Candidate],
    method: SearchMethod,
    count: usize,
) -> Option<Candidate> {
    let cursor = window.cursor_offset();
    let mut reference = Span { start: cursor, end: cursor + 1 };
    let mut found = None;
    for _ in 0..count.max(1) {
        let best = select_once(window, candidates, reference, method)?;
        trace!(
            "selected candidate {:?} (method {method}, reference {:?})",
            best.outer, reference
        );
        reference = best.outer;
        found = Some(best);
    }
    found
}

fn covers(c: &Candidate, reference: Span) -> bool {
    c.outer.start <= reference.start && c.outer.end >= reference.end && c.outer != reference
}

fn select_once(
    window: &SearchWindow,
    candidates: &[Candidate],
    reference: Span,
    method: SearchMethod,
) -> Option<Candidate> {
    match method {
        SearchMethod::Cover => covering(candidates, reference),
        SearchMethod::Next => next(candidates, reference),
        SearchMethod::Prev => prev(candidates, reference),
        SearchMethod::CoverOrNext => covering_same_line_first(window, candidates, reference)
            .or_else(|| next(candidates, reference)),
        SearchMethod::CoverOrPrev => covering_same_line_first(window, candidates, reference)
            .or_else(|| prev(candidates, reference)),
        SearchMethod::CoverOrNearest => covering_same_line_first(window, candidates, reference)
            .or_else(|| nearest(candidates, reference)),
    }
}

/// Smallest-width covering candidate.
fn covering(candidates: &[Candidate], reference: Span) -> Option<Candidate> {
    candidates
        .iter()
        .filter(|c| covers(c, reference))
        .min_by_key(|c| (c.outer.width(), c.outer.start))
        .copied()
}

/// Covering candidate, preferring ones entirely on the reference line.
fn covering_same_line_first(
    window: &SearchWindow,
    candidates: &[Candidate],
    reference: Span,
) -> Option<Candidate> {
    let line = window.line_index(reference.start);
    candidates
        .iter()
        .filter(|c| covers(c, reference))
        .filter(|c| {
            window.line_index(c.outer.start) == line
                && window.line_index(c.outer.end.saturating_sub(1)) == line
        })
        .min_by_key(|c| (c.outer.width(), c.outer.start))
        .copied()
        .or_else(|| covering(candidates, reference))
}

/// Nearest candidate starting strictly past the reference span; ties broken
/// by smallest width.
fn next(candidates: &[Candidate], reference: Span) -> Option<Candidate> {
    candidates
        .iter()
        .filter(|c| c.outer.start >= reference.end)
        .min_by_key(|c| (c.outer.start - reference.start, c.outer.width()))
        .copied()
}

/// Nearest candidate ending strictly before the reference span; ties broken
/// by smallest width.
fn prev(candidates: &[Candidate], reference: Span) -> Option<Candidate> {
    candidates
        .iter()
        .filter(|c| c.outer.end <= reference.start)
        .min_by_key(|c| {
            (
                reference.start.saturating_sub(c.outer.end.saturating_sub(1)),
                c.outer.width(),
            )
        })
        .copied()
}

/// Whichever of next/prev has the smaller distance measured from the
/// reference's left edge to the candidate's nearest boundary. The left-edge
/// asymmetry is intentional and preserved; equal distances resolve toward
/// `next` so a tie never errors.
fn nearest(candidates: &[Candidate], reference: Span) -> Option<Candidate> {
    let n = next(candidates, reference);
    let p = prev(candidates, reference);
    match (n, p) {
        (Some(n), Some(p)) => {
            let dn = n.outer.start - reference.start;
            let dp = reference.start.saturating_sub(p.outer.end.saturating_sub(1));
            Some(if dn <= dp { n } else { p })
        }
        (n, p) => n.or(p),
    }
}
