//! Multistep dispatch: an ordered list of (condition, action) steps bound
//! to one key, evaluated first-match on every press.

use std::fmt;

use log::trace;

use crate::traits::EditorHost;

/// What a step's action decided.
pub enum StepResult<H: ?Sized> {
    /// Stop processing; the step's side effects are the entire result.
    Stop,
    /// Treat as pass-through: keep evaluating later steps as if this one's
    /// condition had been false. Side effects that already ran stand.
    Fallthrough,
    /// Emulate these keys as typed input. Embedded `<Cmd>…<CR>` segments
    /// are executed as commands rather than typed key by key.
    Keys(String),
    /// Run this after the current key-processing cycle completes, via the
    /// host's scheduler.
    Defer(Box<dyn FnOnce(&mut H)>),
}

impl<H: ?Sized> fmt::Debug for StepResult<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResult::Stop => f.write_str("Stop"),
            StepResult::Fallthrough => f.write_str("Fallthrough"),
            StepResult::Keys(s) => f.debug_tuple("Keys").field(s).finish(),
            StepResult::Defer(_) => f.write_str("Defer(..)"),
        }
    }
}

/// One condition/action pair. Stateless between invocations except for
/// whatever host state the closures reach through.
pub struct Step<H: ?Sized> {
    name: String,
    condition: Box<dyn Fn(&mut H) -> bool>,
    action: Box<dyn FnMut(&mut H) -> StepResult<H>>,
}

impl<H: ?Sized> Step<H> {
    pub fn new(
        name: impl Into<String>,
        condition: impl Fn(&mut H) -> bool + 'static,
        action: impl FnMut(&mut H) -> StepResult<H> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            condition: Box::new(condition),
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<H: ?Sized> fmt::Debug for Step<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}

/// A parsed piece of a `StepResult::Keys` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// Emulate as typed input (through normal mapping resolution).
    Keys(String),
    /// Execute as a command.
    Command(String),
}

/// What the host should do after a dispatch.
pub enum Dispatch<H: ?Sized> {
    /// A step handled the key; nothing further.
    Handled,
    /// Act as if the mapping did not exist: emulate the key's default
    /// behavior.
    Passthrough,
    /// Feed these segments.
    Feed(Vec<Feed>),
    /// Schedule this on the host's task queue.
    Defer(Box<dyn FnOnce(&mut H)>),
}

impl<H: ?Sized> fmt::Debug for Dispatch<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Handled => f.write_str("Handled"),
            Dispatch::Passthrough => f.write_str("Passthrough"),
            Dispatch::Feed(segs) => f.debug_tuple("Feed").field(segs).finish(),
            Dispatch::Defer(_) => f.write_str("Defer(..)"),
        }
    }
}

/// The ordered step list bound to one key.
#[derive(Debug)]
pub struct Multistep<H: ?Sized> {
    steps: Vec<Step<H>>,
}

impl<H: EditorHost + ?Sized> Multistep<H> {
    pub fn new(steps: Vec<Step<H>>) -> Self {
        Self { steps }
    }

    /// Evaluate steps in order on one key press.
    pub fn dispatch(&mut self, host: &mut H) -> Dispatch<H> {
        if host.dispatch_disabled() || host.buffer_dispatch_disabled() {
            return Dispatch::Passthrough;
        }
        for step in &mut self.steps {
            if !(step.condition)(host) {
                continue;
            }
            trace!("multistep: running '{}'", step.name);
            match (step.action)(host) {
                StepResult::Stop => return Dispatch::Handled,
                StepResult::Fallthrough => continue,
                StepResult::Keys(s) => return Dispatch::Feed(parse_feed(&s)),
                StepResult::Defer(f) => return Dispatch::Defer(f),
            }
        }
        Dispatch::Passthrough
    }
}

/// Split a key string into literal-key and `<Cmd>…<CR>` command segments.
/// A `<Cmd>` with no closing `<CR>` degrades to literal keys.
pub fn parse_feed(keys: &str) -> Vec<Feed> {
    let mut out = Vec::new();
    let mut rest = keys;
    while let Some(open) = rest.find("<Cmd>") {
        if let Some(close) = rest[open..].find("<CR>") {
            if open > 0 {
                out.push(Feed::Keys(rest[..open].to_string()));
            }
            out.push(Feed::Command(rest[open + 5..open + close].to_string()));
            rest = &rest[open + close + 4..];
        } else {
            break;
        }
    }
    if !rest.is_empty() {
        out.push(Feed::Keys(rest.to_string()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_feed_plain_keys() {
        assert_eq!(parse_feed("abc"), vec![Feed::Keys("abc".into())]);
    }

    #[test]
    fn parse_feed_extracts_commands() {
        assert_eq!(
            parse_feed("ab<Cmd>undo<CR>cd"),
            vec![
                Feed::Keys("ab".into()),
                Feed::Command("undo".into()),
                Feed::Keys("cd".into()),
            ]
        );
    }

    #[test]
    fn parse_feed_unterminated_cmd_is_literal() {
        assert_eq!(
            parse_feed("<Cmd>oops"),
            vec![Feed::Keys("<Cmd>oops".into())]
        );
    }
}
