use crate::key::KeyEvent;
use crate::types::Position;

/// Host buffer access, expressed in whole lines.
///
/// Lines are 1-indexed and returned without their trailing newline. All
/// edits go through [`BufferOps::set_lines`]; an operation performs at most
/// one such call, after every required input and search has succeeded.
pub trait BufferOps {
    fn line_count(&self) -> usize;

    /// The content of `line` (1-indexed), or `None` past the end.
    fn line(&self, line: usize) -> Option<String>;

    /// Replace lines `first..=last` (1-indexed, inclusive) with `lines`.
    /// `lines` may be shorter or longer than the replaced range.
    fn set_lines(&mut self, first: usize, last: usize, lines: &[String]);

    // Indent options, used when `respect_selection_type` reindents.
    fn shiftwidth(&self) -> usize {
        8
    }

    fn tabstop(&self) -> usize {
        8
    }

    fn expandtab(&self) -> bool {
        false
    }
}

/// Blocking user input during an operation.
///
/// Both reads suspend the host's input loop, as modal-editing UI does. A
/// cancel (`<Esc>` / `<C-c>` keystroke, or `None` from a prompt) aborts the
/// whole operation with no buffer mutation.
pub trait InputSource {
    /// Read one keystroke. `help` is a message the host may surface if the
    /// user hesitates (conventionally after about a second).
    fn read_key(&mut self, help: &str) -> KeyEvent;

    /// Read a full line of input under `prompt`. `None` means cancel.
    fn read_string(&mut self, prompt: &str) -> Option<String>;
}

/// Completion-menu collaborator (optional plugin).
pub trait CompletionMenu {
    fn is_visible(&self) -> bool;
    fn has_selection(&self) -> bool;
    fn select_next(&mut self);
    fn select_prev(&mut self);
    /// Confirm the selected entry.
    fn accept(&mut self);
}

/// Snippet-engine collaborator (optional plugin).
pub trait SnippetEngine {
    fn can_expand(&self) -> bool;
    fn expand(&mut self);
    /// Whether a jump in `dir` (+1 forward, -1 backward) is possible.
    fn can_jump(&self, dir: i8) -> bool;
    fn jump(&mut self, dir: i8);
    fn is_active(&self) -> bool;
    /// Cancel the active snippet session.
    fn stop(&mut self);
}

/// Auto-pairs collaborator (optional plugin). Each accessor returns the key
/// string the plugin wants fed for the respective key, or `None` when the
/// plugin has nothing special to do at the cursor.
pub trait AutoPairs {
    fn cr_keys(&self) -> Option<String>;
    fn bs_keys(&self) -> Option<String>;
}

/// Tree-sitter collaborator (optional feature): named-node boundaries
/// relative to a position.
pub trait SyntaxTree {
    fn next_node_boundary(&self, pos: Position) -> Option<Position>;
    fn prev_node_boundary(&self, pos: Position) -> Option<Position>;
}

/// The editor state a multistep dispatcher runs against.
///
/// Collaborator accessors default to `None`: an absent plugin makes the
/// steps that query it evaluate to a false condition, never an error.
pub trait EditorHost {
    fn cursor(&self) -> Position;
    fn set_cursor(&mut self, pos: Position);
    /// Content of the cursor line, without trailing newline.
    fn current_line(&self) -> String;
    fn shiftwidth(&self) -> usize {
        8
    }

    /// Global kill switch; checked before any step runs.
    fn dispatch_disabled(&self) -> bool {
        false
    }

    /// Buffer-local kill switch; checked after the global one.
    fn buffer_dispatch_disabled(&self) -> bool {
        false
    }

    fn completion(&mut self) -> Option<&mut dyn CompletionMenu> {
        None
    }

    fn snippets(&mut self) -> Option<&mut dyn SnippetEngine> {
        None
    }

    fn pairs(&mut self) -> Option<&mut dyn AutoPairs> {
        None
    }

    fn syntax(&mut self) -> Option<&mut dyn SyntaxTree> {
        None
    }
}
