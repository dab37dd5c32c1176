//! Builtin multistep steps.
//!
//! Each step queries exactly one collaborator. When the collaborator is
//! absent the condition is false and the dispatcher moves on; a missing
//! plugin is never an error.

use crate::multistep::{Step, StepResult};
use crate::traits::EditorHost;

/// Select the next completion-menu entry while the menu is visible.
pub fn pmenu_next<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "pmenu_next",
        |h: &mut H| h.completion().is_some_and(|c| c.is_visible()),
        |h: &mut H| {
            if let Some(c) = h.completion() {
                c.select_next();
            }
            StepResult::Stop
        },
    )
}

/// Select the previous completion-menu entry while the menu is visible.
pub fn pmenu_prev<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "pmenu_prev",
        |h: &mut H| h.completion().is_some_and(|c| c.is_visible()),
        |h: &mut H| {
            if let Some(c) = h.completion() {
                c.select_prev();
            }
            StepResult::Stop
        },
    )
}

/// Confirm the selected completion entry. Visible menu with no selection
/// passes through, so the key keeps its default behavior.
pub fn pmenu_accept<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "pmenu_accept",
        |h: &mut H| {
            h.completion()
                .is_some_and(|c| c.is_visible() && c.has_selection())
        },
        |h: &mut H| {
            if let Some(c) = h.completion() {
                c.accept();
            }
            StepResult::Stop
        },
    )
}

/// Expand the snippet at the cursor.
pub fn snippet_expand<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "snippet_expand",
        |h: &mut H| h.snippets().is_some_and(|s| s.can_expand()),
        |h: &mut H| {
            if let Some(s) = h.snippets() {
                s.expand();
            }
            StepResult::Stop
        },
    )
}

/// Jump to the next snippet tabstop.
pub fn snippet_next<H: EditorHost + ?Sized>() -> Step<H> {
    snippet_jump("snippet_next", 1)
}

/// Jump to the previous snippet tabstop.
pub fn snippet_prev<H: EditorHost + ?Sized>() -> Step<H> {
    snippet_jump("snippet_prev", -1)
}

fn snippet_jump<H: EditorHost + ?Sized>(name: &'static str, dir: i8) -> Step<H> {
    Step::new(
        name,
        move |h: &mut H| h.snippets().is_some_and(|s| s.can_jump(dir)),
        move |h: &mut H| {
            if let Some(s) = h.snippets() {
                s.jump(dir);
            }
            StepResult::Stop
        },
    )
}

/// Cancel the active snippet session.
pub fn snippet_stop<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "snippet_stop",
        |h: &mut H| h.snippets().is_some_and(|s| s.is_active()),
        |h: &mut H| {
            if let Some(s) = h.snippets() {
                s.stop();
            }
            StepResult::Stop
        },
    )
}

/// Let the auto-pairs plugin handle `<CR>` between brackets.
pub fn pairs_cr<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "pairs_cr",
        |h: &mut H| h.pairs().is_some_and(|p| p.cr_keys().is_some()),
        |h: &mut H| {
            match h.pairs().and_then(|p| p.cr_keys()) {
                Some(keys) => StepResult::Keys(keys),
                None => StepResult::Fallthrough,
            }
        },
    )
}

/// Let the auto-pairs plugin handle `<BS>` inside an empty pair.
pub fn pairs_bs<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "pairs_bs",
        |h: &mut H| h.pairs().is_some_and(|p| p.bs_keys().is_some()),
        |h: &mut H| {
            match h.pairs().and_then(|p| p.bs_keys()) {
                Some(keys) => StepResult::Keys(keys),
                None => StepResult::Fallthrough,
            }
        },
    )
}

/// Shift the line right while the cursor sits in its leading indent.
pub fn increase_indent<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "increase_indent",
        |h: &mut H| cursor_in_indent(h),
        |_h: &mut H| StepResult::Keys("<C-t>".to_string()),
    )
}

/// Shift the line left while the cursor sits in its leading indent.
pub fn decrease_indent<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "decrease_indent",
        |h: &mut H| cursor_in_indent(h) && !h.current_line().is_empty(),
        |_h: &mut H| StepResult::Keys("<C-d>".to_string()),
    )
}

fn cursor_in_indent<H: EditorHost + ?Sized>(h: &mut H) -> bool {
    let line = h.current_line();
    let indent_len = line.len() - line.trim_start().len();
    h.cursor().col <= indent_len
}

/// Move the cursor past the end of the next named syntax node. The motion
/// runs deferred, after the current key-processing cycle.
pub fn jump_after_node<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "jump_after_node",
        |h: &mut H| {
            let cursor = h.cursor();
            h.syntax()
                .is_some_and(|t| t.next_node_boundary(cursor).is_some())
        },
        |h: &mut H| {
            let cursor = h.cursor();
            match h.syntax().and_then(|t| t.next_node_boundary(cursor)) {
                Some(target) => StepResult::Defer(Box::new(move |h: &mut H| h.set_cursor(target))),
                None => StepResult::Fallthrough,
            }
        },
    )
}

/// Move the cursor before the start of the previous named syntax node,
/// deferred like [`jump_after_node`].
pub fn jump_before_node<H: EditorHost + ?Sized>() -> Step<H> {
    Step::new(
        "jump_before_node",
        |h: &mut H| {
            let cursor = h.cursor();
            h.syntax()
                .is_some_and(|t| t.prev_node_boundary(cursor).is_some())
        },
        |h: &mut H| {
            let cursor = h.cursor();
            match h.syntax().and_then(|t| t.prev_node_boundary(cursor)) {
                Some(target) => StepResult::Defer(Box::new(move |h: &mut H| h.set_cursor(target))),
                None => StepResult::Fallthrough,
            }
        },
    )
}
