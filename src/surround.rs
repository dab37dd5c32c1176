//! Surround operations: add, delete, replace, find and highlight a
//! delimiter pair around the cursor.
//!
//! Each operation is a sequence of awaiting-input phases (blocking reads
//! through [`InputSource`]) followed by a search and a single edit. No
//! buffer mutation happens until every input and search has succeeded, so a
//! cancel or a failed search always leaves the buffer untouched.

use std::collections::HashMap;

use log::debug;

use crate::error::Error;
use crate::key::KeyCode;
use crate::search::{self, SearchWindow};
use crate::spec::{InputSpec, OutputSpec, SurroundingRegistry, SurroundingSpec, literal_input_pattern};
use crate::traits::{BufferOps, InputSource};
use crate::types::{Config, Position, Region, SearchMethod, Submode, grapheme_end};

/// What an operation did, from the host's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpOutcome {
    /// Where the cursor should land, if the operation moves it.
    pub cursor: Option<Position>,
    /// A transient highlight to draw, for the highlight operation.
    pub highlight: Option<Highlight>,
}

/// A transient highlight over the two delimiter regions. The host draws it
/// and schedules a timer for `duration_ms`; when the timer fires it calls
/// [`Surround::end_highlight`] and clears only if that returns true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub buffer: u64,
    pub generation: u64,
    pub left: Region,
    pub right: Region,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Add,
    Delete,
    Replace,
    Find,
    FindLeft,
    Highlight,
}

/// A fully resolved input side: the identifier the user typed plus the
/// concrete spec (interactive inputs already concretized to a pattern).
#[derive(Debug, Clone)]
struct ResolvedInput {
    id: String,
    spec: InputSpec,
}

#[derive(Debug, Clone)]
struct ResolvedOutput {
    left: String,
    right: String,
}

/// Cached parameters of the last completed operation, replayed verbatim by
/// dot-repeat with no prompting.
#[derive(Debug, Clone)]
struct RepeatState {
    kind: OpKind,
    input: Option<ResolvedInput>,
    output: Option<ResolvedOutput>,
    count: usize,
    method: SearchMethod,
    buffer_id: u64,
}

/// The delimiter pair a search resolved to, in buffer coordinates.
#[derive(Debug, Clone, Copy)]
struct Found {
    left: Region,
    right: Region,
}

/// The surround engine: configuration, the surrounding registry, the
/// dot-repeat cache and per-buffer highlight generations. All state is
/// explicit here; operations take the engine by reference, nothing is
/// ambient.
#[derive(Debug)]
pub struct Surround {
    config: Config,
    registry: SurroundingRegistry,
    last: Option<RepeatState>,
    highlight_generations: HashMap<u64, u64>,
}

pub struct SurroundBuilder {
    config: Config,
    registry: Option<SurroundingRegistry>,
}

impl Default for SurroundBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            registry: None,
        }
    }
}

impl SurroundBuilder {
    pub fn n_lines(mut self, n_lines: usize) -> Self {
        self.config.n_lines = n_lines;
        self
    }

    pub fn search_method(mut self, method: SearchMethod) -> Self {
        self.config.search_method = method;
        self
    }

    pub fn respect_selection_type(mut self, on: bool) -> Self {
        self.config.respect_selection_type = on;
        self
    }

    pub fn highlight_duration_ms(mut self, ms: u64) -> Self {
        self.config.highlight_duration_ms = ms;
        self
    }

    pub fn silent(mut self, on: bool) -> Self {
        self.config.silent = on;
        self
    }

    pub fn registry(mut self, registry: SurroundingRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Surround {
        Surround {
            config: self.config,
            registry: self.registry.unwrap_or_else(SurroundingRegistry::with_builtins),
            last: None,
            highlight_generations: HashMap::new(),
        }
    }
}

impl Default for Surround {
    fn default() -> Self {
        SurroundBuilder::default().build()
    }
}

impl Surround {
    pub fn new(config: Config) -> Self {
        Surround {
            config,
            registry: SurroundingRegistry::with_builtins(),
            last: None,
            highlight_generations: HashMap::new(),
        }
    }

    pub fn builder() -> SurroundBuilder {
        SurroundBuilder::default()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry_mut(&mut self) -> &mut SurroundingRegistry {
        &mut self.registry
    }

    /// The informational text for a recoverable error, or `None` when
    /// `silent` is set or nothing should be shown (cancel is silent by
    /// design).
    pub fn user_message(&self, err: &Error) -> Option<String> {
        if self.config.silent || matches!(err, Error::Cancelled) {
            return None;
        }
        Some(err.to_string())
    }

    // ----- operations ------------------------------------------------

    /// Wrap `target` with a prompted output surrounding.
    pub fn add<B, I>(
        &mut self,
        buf: &mut B,
        input: &mut I,
        target: Region,
        submode: Submode,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource,
    {
        let output = self.read_output(input)?;
        let outcome = self.do_add(buf, &output, target, submode)?;
        self.last = Some(RepeatState {
            kind: OpKind::Add,
            input: None,
            output: Some(output),
            count: 1,
            method: self.config.search_method,
            buffer_id: 0,
        });
        Ok(outcome)
    }

    /// Delete the delimiters of a prompted surrounding around the cursor.
    pub fn delete<B, I>(
        &mut self,
        buf: &mut B,
        input: &mut I,
        cursor: Position,
        count: usize,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource + ?Sized,
    {
        self.delete_with(buf, input, cursor, count, self.config.search_method)
    }

    /// Like [`Surround::delete`] with an explicit search method, for hosts
    /// exposing "search previous/next" operator variants.
    pub fn delete_with<B, I>(
        &mut self,
        buf: &mut B,
        input: &mut I,
        cursor: Position,
        count: usize,
        method: SearchMethod,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource + ?Sized,
    {
        validate_count(count)?;
        let resolved = self.read_input(input, "delete")?;
        let outcome = self.do_delete(buf, &resolved, cursor, count, method)?;
        self.last = Some(RepeatState {
            kind: OpKind::Delete,
            input: Some(resolved),
            output: None,
            count,
            method,
            buffer_id: 0,
        });
        Ok(outcome)
    }

    /// Replace the delimiters of one prompted surrounding with another.
    pub fn replace<B, I>(
        &mut self,
        buf: &mut B,
        input: &mut I,
        cursor: Position,
        count: usize,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource,
    {
        self.replace_with(buf, input, cursor, count, self.config.search_method)
    }

    pub fn replace_with<B, I>(
        &mut self,
        buf: &mut B,
        input: &mut I,
        cursor: Position,
        count: usize,
        method: SearchMethod,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource,
    {
        validate_count(count)?;
        let resolved = self.read_input(input, "replace")?;
        let output = self.read_output(input)?;
        let outcome = self.do_replace(buf, &resolved, &output, cursor, count, method)?;
        self.last = Some(RepeatState {
            kind: OpKind::Replace,
            input: Some(resolved),
            output: Some(output),
            count,
            method,
            buffer_id: 0,
        });
        Ok(outcome)
    }

    /// Move the cursor to the right edge of the pair's left delimiter.
    pub fn find<B, I>(
        &mut self,
        buf: &B,
        input: &mut I,
        cursor: Position,
        count: usize,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource + ?Sized,
    {
        self.find_with(buf, input, cursor, count, self.config.search_method)
    }

    pub fn find_with<B, I>(
        &mut self,
        buf: &B,
        input: &mut I,
        cursor: Position,
        count: usize,
        method: SearchMethod,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource + ?Sized,
    {
        validate_count(count)?;
        let resolved = self.read_input(input, "find")?;
        let outcome = self.do_find(buf, &resolved, cursor, count, method, OpKind::Find)?;
        self.last = Some(RepeatState {
            kind: OpKind::Find,
            input: Some(resolved),
            output: None,
            count,
            method,
            buffer_id: 0,
        });
        Ok(outcome)
    }

    /// Move the cursor to the left edge of the pair's right delimiter.
    pub fn find_left<B, I>(
        &mut self,
        buf: &B,
        input: &mut I,
        cursor: Position,
        count: usize,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource + ?Sized,
    {
        self.find_left_with(buf, input, cursor, count, self.config.search_method)
    }

    pub fn find_left_with<B, I>(
        &mut self,
        buf: &B,
        input: &mut I,
        cursor: Position,
        count: usize,
        method: SearchMethod,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource + ?Sized,
    {
        validate_count(count)?;
        let resolved = self.read_input(input, "find")?;
        let outcome = self.do_find(buf, &resolved, cursor, count, method, OpKind::FindLeft)?;
        self.last = Some(RepeatState {
            kind: OpKind::FindLeft,
            input: Some(resolved),
            output: None,
            count,
            method,
            buffer_id: 0,
        });
        Ok(outcome)
    }

    /// Transiently highlight the pair's delimiters.
    pub fn highlight<B, I>(
        &mut self,
        buf: &B,
        input: &mut I,
        cursor: Position,
        count: usize,
        buffer_id: u64,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource + ?Sized,
    {
        self.highlight_with(buf, input, cursor, count, buffer_id, self.config.search_method)
    }

    pub fn highlight_with<B, I>(
        &mut self,
        buf: &B,
        input: &mut I,
        cursor: Position,
        count: usize,
        buffer_id: u64,
        method: SearchMethod,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
        I: InputSource + ?Sized,
    {
        validate_count(count)?;
        let resolved = self.read_input(input, "highlight")?;
        let outcome = self.do_highlight(buf, &resolved, cursor, count, method, buffer_id)?;
        self.last = Some(RepeatState {
            kind: OpKind::Highlight,
            input: Some(resolved),
            output: None,
            count,
            method,
            buffer_id,
        });
        Ok(outcome)
    }

    /// Whether a highlight started with `generation` is still the current
    /// one for `buffer`. Timers call this before clearing, so a timer for
    /// a superseded highlight never clears its successor.
    pub fn end_highlight(&mut self, buffer: u64, generation: u64) -> bool {
        self.highlight_generations.get(&buffer) == Some(&generation)
    }

    /// Replay the last completed operation verbatim: same identifiers, same
    /// prompted strings, same count, no prompting. An add replays onto
    /// `add_target`, which the host obtains by replaying the original
    /// motion or selection.
    pub fn repeat_last<B>(
        &mut self,
        buf: &mut B,
        cursor: Position,
        add_target: Option<(Region, Submode)>,
    ) -> Result<OpOutcome, Error>
    where
        B: BufferOps + ?Sized,
    {
        let Some(last) = self.last.clone() else {
            return Err(Error::InvalidInput("nothing to repeat".into()));
        };
        match last.kind {
            OpKind::Add => {
                let output = last
                    .output
                    .as_ref()
                    .ok_or_else(|| Error::InvalidInput("nothing to repeat".into()))?;
                let (target, submode) = add_target.ok_or_else(|| {
                    Error::InvalidInput("repeating an add requires a target region".into())
                })?;
                self.do_add(buf, output, target, submode)
            }
            OpKind::Delete => {
                let input = expect_input(&last)?;
                self.do_delete(buf, input, cursor, last.count, last.method)
            }
            OpKind::Replace => {
                let input = expect_input(&last)?;
                let output = last
                    .output
                    .as_ref()
                    .ok_or_else(|| Error::InvalidInput("nothing to repeat".into()))?;
                self.do_replace(buf, input, output, cursor, last.count, last.method)
            }
            OpKind::Find | OpKind::FindLeft => {
                let input = expect_input(&last)?;
                self.do_find(buf, input, cursor, last.count, last.method, last.kind)
            }
            OpKind::Highlight => {
                let input = expect_input(&last)?;
                self.do_highlight(buf, input, cursor, last.count, last.method, last.buffer_id)
            }
        }
    }

    // ----- core (prompt-free) implementations ------------------------

    fn do_add<B: BufferOps + ?Sized>(
        &mut self,
        buf: &mut B,
        output: &ResolvedOutput,
        target: Region,
        submode: Submode,
    ) -> Result<OpOutcome, Error> {
        let last_line = buf.line_count();
        if target.from.line == 0 || target.from.line > last_line {
            return Err(Error::InvalidInput(format!(
                "target line {} outside buffer",
                target.from.line
            )));
        }
        match submode {
            Submode::Charwise => self.add_charwise(buf, output, target),
            Submode::Linewise => self.add_linewise(buf, output, target),
            Submode::Blockwise => self.add_blockwise(buf, output, target),
        }
    }

    fn add_charwise<B: BufferOps + ?Sized>(
        &mut self,
        buf: &mut B,
        output: &ResolvedOutput,
        target: Region,
    ) -> Result<OpOutcome, Error> {
        let last_line = target.to.map_or(target.from.line, |to| to.line);
        let snap = Snapshot::new(buf, target.from.line, last_line);
        let mut text = snap.joined();

        let left_at = snap.offset(target.from);
        let right_at = match target.to {
            Some(to) => snap.offset_past(to),
            None => left_at,
        };
        text.insert_str(right_at, &output.right);
        text.insert_str(left_at, &output.left);

        snap.commit(buf, &text);
        Ok(OpOutcome {
            cursor: Some(target.from),
            highlight: None,
        })
    }

    fn add_linewise<B: BufferOps + ?Sized>(
        &mut self,
        buf: &mut B,
        output: &ResolvedOutput,
        target: Region,
    ) -> Result<OpOutcome, Error> {
        let first = target.from.line;
        let last = target.to.map_or(first, |to| to.line);
        let snap = Snapshot::new(buf, first, last);

        let mut lines: Vec<String> = Vec::new();
        if self.config.respect_selection_type {
            let indent = leading_whitespace(snap.lines.first().map_or("", |l| l.as_str()));
            let one_level = indent_unit(buf);
            for part in output.left.split('\n') {
                lines.push(format!("{indent}{part}"));
            }
            for inner in &snap.lines {
                if inner.is_empty() {
                    lines.push(String::new());
                } else {
                    lines.push(format!("{one_level}{inner}"));
                }
            }
            for part in output.right.split('\n') {
                lines.push(format!("{indent}{part}"));
            }
        } else {
            lines.extend(output.left.split('\n').map(String::from));
            lines.extend(snap.lines.iter().cloned());
            lines.extend(output.right.split('\n').map(String::from));
        }

        buf.set_lines(first, last, &lines);
        Ok(OpOutcome {
            cursor: Some(Position::new(first, 0)),
            highlight: None,
        })
    }

    fn add_blockwise<B: BufferOps + ?Sized>(
        &mut self,
        buf: &mut B,
        output: &ResolvedOutput,
        target: Region,
    ) -> Result<OpOutcome, Error> {
        let first = target.from.line;
        let to = target.to.unwrap_or(target.from);
        let snap = Snapshot::new(buf, first, to.line);

        let lines: Vec<String> = snap
            .lines
            .iter()
            .map(|line| {
                let mut line = line.clone();
                let right_at = if to.col < line.len() {
                    grapheme_end(&line, to.col)
                } else {
                    line.len()
                };
                let left_at = target.from.col.min(line.len());
                line.insert_str(right_at, &output.right);
                line.insert_str(left_at, &output.left);
                line
            })
            .collect();

        buf.set_lines(first, to.line, &lines);
        Ok(OpOutcome {
            cursor: Some(Position::new(first, target.from.col)),
            highlight: None,
        })
    }

    fn do_delete<B: BufferOps + ?Sized>(
        &mut self,
        buf: &mut B,
        resolved: &ResolvedInput,
        cursor: Position,
        count: usize,
        method: SearchMethod,
    ) -> Result<OpOutcome, Error> {
        let found = self.search_pair(buf, resolved, cursor, count, method)?;
        let first = found.left.from.line;
        let last = region_last_line(&found.right);
        let snap = Snapshot::new(buf, first, last);

        if self.config.respect_selection_type
            && snap.is_line_region(&found.left)
            && snap.is_line_region(&found.right)
        {
            return Ok(self.delete_linewise(buf, &snap, &found));
        }

        let mut text = snap.joined();
        let (ls, le) = snap.region_span(&found.left);
        let (rs, re) = snap.region_span(&found.right);
        text.replace_range(rs..re, "");
        text.replace_range(ls..le, "");
        snap.commit(buf, &text);

        Ok(OpOutcome {
            cursor: Some(clamp_to(buf, found.left.from)),
            highlight: None,
        })
    }

    /// Both delimiters occupy whole lines by themselves: drop those lines
    /// and dedent the freed inner lines by the old/new indent delta.
    fn delete_linewise<B: BufferOps + ?Sized>(
        &mut self,
        buf: &mut B,
        snap: &Snapshot,
        found: &Found,
    ) -> OpOutcome {
        let left_lines = region_last_line(&found.left) - found.left.from.line + 1;
        let right_first = (found.right.from.line - snap.first).max(left_lines);
        let inner: &[String] = &snap.lines[left_lines..right_first];

        let tabstop = buf.tabstop();
        let old_indent = inner
            .iter()
            .find(|l| !l.trim().is_empty())
            .map_or(0, |l| display_width(&leading_whitespace(l), tabstop));
        let new_indent = display_width(
            &leading_whitespace(snap.lines.first().map_or("", |l| l.as_str())),
            tabstop,
        );
        let delta = old_indent.saturating_sub(new_indent);

        let lines: Vec<String> = inner
            .iter()
            .map(|l| strip_display_cols(l, delta, tabstop))
            .collect();
        buf.set_lines(snap.first, snap.first + snap.lines.len() - 1, &lines);

        OpOutcome {
            cursor: Some(clamp_to(buf, Position::new(snap.first, 0))),
            highlight: None,
        }
    }

    fn do_replace<B: BufferOps + ?Sized>(
        &mut self,
        buf: &mut B,
        resolved: &ResolvedInput,
        output: &ResolvedOutput,
        cursor: Position,
        count: usize,
        method: SearchMethod,
    ) -> Result<OpOutcome, Error> {
        let found = self.search_pair(buf, resolved, cursor, count, method)?;
        let first = found.left.from.line;
        let last = region_last_line(&found.right);
        let snap = Snapshot::new(buf, first, last);

        let mut text = snap.joined();
        let (ls, le) = snap.region_span(&found.left);
        let (rs, re) = snap.region_span(&found.right);
        text.replace_range(rs..re, &output.right);
        text.replace_range(ls..le, &output.left);
        snap.commit(buf, &text);

        // Cursor immediately after the newly inserted left delimiter.
        let cursor = offset_to_pos(first, &text, ls + output.left.len());
        Ok(OpOutcome {
            cursor: Some(clamp_to(buf, cursor)),
            highlight: None,
        })
    }

    fn do_find<B: BufferOps + ?Sized>(
        &mut self,
        buf: &B,
        resolved: &ResolvedInput,
        cursor: Position,
        count: usize,
        method: SearchMethod,
        kind: OpKind,
    ) -> Result<OpOutcome, Error> {
        let found = self.search_pair(buf, resolved, cursor, count, method)?;
        let target = match kind {
            OpKind::FindLeft => found.right.from,
            _ => found.left.to.unwrap_or(found.left.from),
        };
        Ok(OpOutcome {
            cursor: Some(clamp_to(buf, target)),
            highlight: None,
        })
    }

    fn do_highlight<B: BufferOps + ?Sized>(
        &mut self,
        buf: &B,
        resolved: &ResolvedInput,
        cursor: Position,
        count: usize,
        method: SearchMethod,
        buffer_id: u64,
    ) -> Result<OpOutcome, Error> {
        let found = self.search_pair(buf, resolved, cursor, count, method)?;
        let generation = {
            let g = self
                .highlight_generations
                .entry(buffer_id)
                .and_modify(|g| *g += 1)
                .or_insert(1);
            *g
        };
        Ok(OpOutcome {
            cursor: None,
            highlight: Some(Highlight {
                buffer: buffer_id,
                generation,
                left: found.left,
                right: found.right,
                duration_ms: self.config.highlight_duration_ms,
            }),
        })
    }

    // ----- shared phases ---------------------------------------------

    fn search_pair<B: BufferOps + ?Sized>(
        &self,
        buf: &B,
        resolved: &ResolvedInput,
        cursor: Position,
        count: usize,
        method: SearchMethod,
    ) -> Result<Found, Error> {
        let window = SearchWindow::new(buf, cursor, self.config.n_lines);
        let candidates = search::candidates(&window, &resolved.spec)?;
        let best = search::select(&window, &candidates, method, count).ok_or_else(|| {
            debug!("no surrounding '{}' found", resolved.id);
            Error::NotFound {
                id: resolved.id.clone(),
                count,
                n_lines: self.config.n_lines,
                method,
            }
        })?;
        Ok(Found {
            left: window.span_to_region(best.left),
            right: window.span_to_region(best.right),
        })
    }

    /// Read a surrounding identifier: single keystroke, extended while the
    /// read is a proper prefix of a registered multi-character identifier.
    fn read_identifier<I: InputSource + ?Sized>(
        &self,
        input: &mut I,
        what: &str,
    ) -> Result<String, Error> {
        let help = format!("Enter {what} surrounding identifier (single character)");
        let mut id = String::new();
        loop {
            let key = input.read_key(&help);
            if key.is_cancel() {
                return Err(Error::Cancelled);
            }
            let KeyCode::Char(c) = key.code else {
                return Err(Error::InvalidInput(
                    "surrounding identifier must be a printable character".into(),
                ));
            };
            if c.is_control() {
                return Err(Error::InvalidInput(
                    "surrounding identifier must be a printable character".into(),
                ));
            }
            id.push(c);
            if self.registry.get(&id).is_some() {
                return Ok(id);
            }
            if self.registry.has_prefix(&id) {
                continue;
            }
            if id.chars().count() == 1 {
                return Ok(id); // fallback literal rule
            }
            return Err(Error::InvalidInput(format!("unknown surrounding '{id}'")));
        }
    }

    fn read_input<I: InputSource + ?Sized>(
        &self,
        input: &mut I,
        what: &str,
    ) -> Result<ResolvedInput, Error> {
        let id = self.read_identifier(input, what)?;
        let spec = match self.registry.get(&id) {
            Some(spec) => spec.input.clone(),
            None => {
                let c = id.chars().next().ok_or_else(|| {
                    Error::InvalidInput("surrounding identifier cannot be empty".into())
                })?;
                SurroundingSpec::literal_pair(c).input
            }
        };
        let spec = match spec {
            InputSpec::Ask => {
                let left = prompt_nonempty(input, "Left surrounding: ")?;
                let right = prompt_nonempty(input, "Right surrounding: ")?;
                InputSpec::Pattern(vec![literal_input_pattern(&left, &right)])
            }
            other => other,
        };
        Ok(ResolvedInput { id, spec })
    }

    fn read_output<I: InputSource>(&self, input: &mut I) -> Result<ResolvedOutput, Error> {
        let id = self.read_identifier(input, "output")?;
        let output = match self.registry.get(&id) {
            Some(spec) => spec.output.clone(),
            None => {
                let c = id.chars().next().ok_or_else(|| {
                    Error::InvalidInput("surrounding identifier cannot be empty".into())
                })?;
                SurroundingSpec::literal_pair(c).output
            }
        };
        match output {
            OutputSpec::Literal { left, right } => Ok(ResolvedOutput { left, right }),
            OutputSpec::Ask => {
                let left = input
                    .read_string("Left surrounding: ")
                    .ok_or(Error::Cancelled)?;
                let right = input
                    .read_string("Right surrounding: ")
                    .ok_or(Error::Cancelled)?;
                Ok(ResolvedOutput { left, right })
            }
            OutputSpec::Call(f) => {
                let (left, right) = f(input).ok_or(Error::Cancelled)?;
                Ok(ResolvedOutput { left, right })
            }
        }
    }
}

fn expect_input(last: &RepeatState) -> Result<&ResolvedInput, Error> {
    last.input
        .as_ref()
        .ok_or_else(|| Error::InvalidInput("nothing to repeat".into()))
}

fn validate_count(count: usize) -> Result<(), Error> {
    if count == 0 {
        return Err(Error::InvalidInput("count must be positive".into()));
    }
    Ok(())
}

fn prompt_nonempty<I: InputSource + ?Sized>(input: &mut I, prompt: &str) -> Result<String, Error> {
    let s = input.read_string(prompt).ok_or(Error::Cancelled)?;
    if s.is_empty() {
        return Err(Error::InvalidInput(
            "surrounding delimiter cannot be empty".into(),
        ));
    }
    Ok(s)
}

fn region_last_line(region: &Region) -> usize {
    region.to.map_or(region.from.line, |to| to.line)
}

fn clamp_to<B: BufferOps + ?Sized>(buf: &B, pos: Position) -> Position {
    let line = pos.line.clamp(1, buf.line_count().max(1));
    let len = buf.line(line).map_or(0, |l| l.len());
    Position::new(line, pos.col.min(len.saturating_sub(1)))
}

/// A snapshot of the affected line range, edited as one joined string and
/// written back with a single `set_lines` call.
struct Snapshot {
    first: usize,
    lines: Vec<String>,
    starts: Vec<usize>,
}

impl Snapshot {
    fn new<B: BufferOps + ?Sized>(buf: &B, first: usize, last: usize) -> Self {
        let mut lines = Vec::with_capacity(last.saturating_sub(first) + 1);
        let mut starts = Vec::with_capacity(lines.capacity());
        let mut offset = 0;
        for l in first..=last.max(first) {
            let line = buf.line(l).unwrap_or_default();
            starts.push(offset);
            offset += line.len() + 1;
            lines.push(line);
        }
        Self { first, lines, starts }
    }

    fn joined(&self) -> String {
        self.lines.join("\n")
    }

    /// Byte offset of `pos` within the joined text, clamped to line ends.
    fn offset(&self, pos: Position) -> usize {
        let idx = pos.line.saturating_sub(self.first).min(self.lines.len() - 1);
        self.starts[idx] + pos.col.min(self.lines[idx].len())
    }

    /// Byte offset just past the grapheme cluster at `pos`.
    fn offset_past(&self, pos: Position) -> usize {
        let idx = pos.line.saturating_sub(self.first).min(self.lines.len() - 1);
        self.starts[idx] + grapheme_end(&self.lines[idx], pos.col.min(self.lines[idx].len()))
    }

    /// Half-open byte span of a region within the joined text.
    fn region_span(&self, region: &Region) -> (usize, usize) {
        let start = self.offset(region.from);
        match region.to {
            Some(to) => (start, self.offset_past(to)),
            None => (start, start),
        }
    }

    /// Whether a region covers one or more whole lines and nothing else.
    fn is_line_region(&self, region: &Region) -> bool {
        let Some(to) = region.to else {
            return false;
        };
        if region.from.col != 0 {
            return false;
        }
        let idx = to.line.saturating_sub(self.first);
        self.lines
            .get(idx)
            .is_some_and(|l| grapheme_end(l, to.col.min(l.len())) == l.len())
    }

    fn commit<B: BufferOps + ?Sized>(&self, buf: &mut B, text: &str) {
        let lines: Vec<String> = text.split('\n').map(String::from).collect();
        buf.set_lines(self.first, self.first + self.lines.len() - 1, &lines);
    }
}

fn offset_to_pos(first_line: usize, text: &str, offset: usize) -> Position {
    let offset = offset.min(text.len());
    let prefix = &text[..offset];
    let line = first_line + prefix.matches('\n').count();
    let col = offset - prefix.rfind('\n').map_or(0, |i| i + 1);
    Position::new(line, col)
}

fn leading_whitespace(line: &str) -> String {
    line.chars().take_while(|c| c.is_whitespace()).collect()
}

fn display_width(ws: &str, tabstop: usize) -> usize {
    ws.chars()
        .map(|c| if c == '\t' { tabstop } else { 1 })
        .sum()
}

/// One indent level, honoring `expandtab`/`shiftwidth`.
fn indent_unit<B: BufferOps + ?Sized>(buf: &B) -> String {
    if buf.expandtab() {
        " ".repeat(buf.shiftwidth())
    } else {
        "\t".to_string()
    }
}

/// Remove up to `cols` display columns of leading whitespace.
fn strip_display_cols(line: &str, cols: usize, tabstop: usize) -> String {
    let mut removed = 0;
    let mut rest = line;
    while removed < cols {
        let mut chars = rest.chars();
        match chars.next() {
            Some('\t') => removed += tabstop,
            Some(' ') => removed += 1,
            _ => break,
        }
        rest = chars.as_str();
    }
    rest.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_display_cols_handles_tabs() {
        assert_eq!(strip_display_cols("\t\tx", 8, 8), "\tx");
        assert_eq!(strip_display_cols("    x", 2, 8), "  x");
        assert_eq!(strip_display_cols("x", 4, 8), "x");
    }

    #[test]
    fn offset_to_pos_counts_embedded_newlines() {
        assert_eq!(offset_to_pos(3, "ab\ncd", 4), Position::new(4, 1));
        assert_eq!(offset_to_pos(3, "ab\ncd", 1), Position::new(3, 1));
    }
}
