use keyspan::{AutoPairs, CompletionMenu, EditorHost, Position, SnippetEngine, SyntaxTree};

#[derive(Default)]
pub struct MockCompletion {
    pub visible: bool,
    pub selected: bool,
    pub log: Vec<&'static str>,
}

impl CompletionMenu for MockCompletion {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn has_selection(&self) -> bool {
        self.selected
    }

    fn select_next(&mut self) {
        self.log.push("select_next");
    }

    fn select_prev(&mut self) {
        self.log.push("select_prev");
    }

    fn accept(&mut self) {
        self.log.push("accept");
    }
}

#[derive(Default)]
pub struct MockSnippets {
    pub expandable: bool,
    pub forward: bool,
    pub backward: bool,
    pub active: bool,
    pub log: Vec<String>,
}

impl SnippetEngine for MockSnippets {
    fn can_expand(&self) -> bool {
        self.expandable
    }

    fn expand(&mut self) {
        self.log.push("expand".into());
    }

    fn can_jump(&self, dir: i8) -> bool {
        if dir > 0 { self.forward } else { self.backward }
    }

    fn jump(&mut self, dir: i8) {
        self.log.push(format!("jump({dir})"));
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn stop(&mut self) {
        self.log.push("stop".into());
    }
}

#[derive(Default)]
pub struct MockPairs {
    pub cr: Option<String>,
    pub bs: Option<String>,
}

impl AutoPairs for MockPairs {
    fn cr_keys(&self) -> Option<String> {
        self.cr.clone()
    }

    fn bs_keys(&self) -> Option<String> {
        self.bs.clone()
    }
}

#[derive(Default)]
pub struct MockSyntax {
    pub next: Option<Position>,
    pub prev: Option<Position>,
}

impl SyntaxTree for MockSyntax {
    fn next_node_boundary(&self, _pos: Position) -> Option<Position> {
        self.next
    }

    fn prev_node_boundary(&self, _pos: Position) -> Option<Position> {
        self.prev
    }
}

/// Editor host with scriptable collaborators: `None` models an absent
/// plugin.
pub struct MockHost {
    pub cursor: Position,
    pub line: String,
    pub shiftwidth: usize,
    pub disabled: bool,
    pub buffer_disabled: bool,
    pub completion: Option<MockCompletion>,
    pub snippets: Option<MockSnippets>,
    pub pairs: Option<MockPairs>,
    pub syntax: Option<MockSyntax>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            cursor: Position::new(1, 0),
            line: String::new(),
            shiftwidth: 4,
            disabled: false,
            buffer_disabled: false,
            completion: None,
            snippets: None,
            pairs: None,
            syntax: None,
        }
    }
}

impl EditorHost for MockHost {
    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos;
    }

    fn current_line(&self) -> String {
        self.line.clone()
    }

    fn shiftwidth(&self) -> usize {
        self.shiftwidth
    }

    fn dispatch_disabled(&self) -> bool {
        self.disabled
    }

    fn buffer_dispatch_disabled(&self) -> bool {
        self.buffer_disabled
    }

    fn completion(&mut self) -> Option<&mut dyn CompletionMenu> {
        self.completion.as_mut().map(|c| c as &mut dyn CompletionMenu)
    }

    fn snippets(&mut self) -> Option<&mut dyn SnippetEngine> {
        self.snippets.as_mut().map(|s| s as &mut dyn SnippetEngine)
    }

    fn pairs(&mut self) -> Option<&mut dyn AutoPairs> {
        self.pairs.as_mut().map(|p| p as &mut dyn AutoPairs)
    }

    fn syntax(&mut self) -> Option<&mut dyn SyntaxTree> {
        self.syntax.as_mut().map(|t| t as &mut dyn SyntaxTree)
    }
}
